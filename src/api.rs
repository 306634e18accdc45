//! Typed client surface for the book-recommendation service.
//!
//! Session bootstrap and teardown live here: login and registration are the only flows that
//! mint a token pair, logout is the only other writer that destroys one. Recommendation
//! calls travel through the [`Gateway`] and inherit its bearer-injection and single-retry
//! contract; catalog search is a public endpoint and carries no token.

pub mod wire;

pub use wire::{
	Book, BookSummary, LoginRequest, RecommendationRequest, RegisterRequest, SearchResponse,
};

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	api::wire::{ErrorBody, TokenPair},
	endpoints::ServiceEndpoints,
	error::ApiError,
	gateway::Gateway,
	http::{GatewayHttpClient, HttpResponse, RequestDescriptor},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::SessionTokens,
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Api client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// High-level client for the book-recommendation service.
#[derive(Clone)]
pub struct ApiClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	gateway: Gateway<C>,
	endpoints: ServiceEndpoints,
}
impl<C> ApiClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn SessionStore>,
		endpoints: ServiceEndpoints,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let gateway = Gateway::with_http_client(store, endpoints.refresh.clone(), http_client);

		Self { gateway, endpoints }
	}

	/// Installs a session-expiry hook on the underlying gateway.
	pub fn with_expiry_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
		self.gateway = self.gateway.with_expiry_hook(hook);

		self
	}

	/// Returns the underlying request gateway.
	pub fn gateway(&self) -> &Gateway<C> {
		&self.gateway
	}

	/// Returns the resolved endpoint set.
	pub fn endpoints(&self) -> &ServiceEndpoints {
		&self.endpoints
	}

	/// Authenticates the user and stores the minted token pair.
	///
	/// The pair is written to the session store before this returns, so the first
	/// authenticated call never races the bootstrap.
	pub async fn login(&self, request: &LoginRequest) -> Result<SessionTokens> {
		const ENDPOINT: &str = "login";
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let descriptor =
					RequestDescriptor::post(self.endpoints.login.clone()).json(request)?;
				let response = self.gateway.execute(&descriptor, None).await?;

				if !response.status().is_success() {
					return Err(endpoint_error(ENDPOINT, &response));
				}

				let pair: TokenPair = parse_json(ENDPOINT, response.body())?;
				let tokens = SessionTokens::new(pair.access, pair.refresh);

				self.gateway.store.save(tokens.clone()).await?;

				Ok(tokens)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Creates a new account. Registration does not log the user in.
	pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
		const ENDPOINT: &str = "register";
		const KIND: FlowKind = FlowKind::Register;

		let span = FlowSpan::new(KIND, "register");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let descriptor =
					RequestDescriptor::post(self.endpoints.register.clone()).json(request)?;
				let response = self.gateway.execute(&descriptor, None).await?;

				if !response.status().is_success() {
					return Err(endpoint_error(ENDPOINT, &response));
				}

				Ok(())
			})
			.await;

		match &result {
			Ok(()) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Ends the session by destroying both stored tokens.
	pub async fn logout(&self) -> Result<()> {
		self.gateway.store.clear().await?;

		Ok(())
	}

	/// Requests personalized recommendations through the authenticated gateway.
	pub async fn recommendations(&self, request: &RecommendationRequest) -> Result<Vec<Book>> {
		const ENDPOINT: &str = "recommendations";
		const KIND: FlowKind = FlowKind::Recommendations;

		let span = FlowSpan::new(KIND, "recommendations");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let descriptor =
					RequestDescriptor::post(self.endpoints.recommendations.clone()).json(request)?;
				let response = self.gateway.send(&descriptor).await?;

				if !response.status().is_success() {
					return Err(endpoint_error(ENDPOINT, &response));
				}

				let payload: wire::RecommendationResponse = parse_json(ENDPOINT, response.body())?;

				Ok(payload.recommendations)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Searches the public catalog. No bearer token is attached.
	pub async fn search(&self, query: &str) -> Result<Vec<BookSummary>> {
		const ENDPOINT: &str = "search";
		const KIND: FlowKind = FlowKind::Search;

		let span = FlowSpan::new(KIND, "search");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let descriptor = RequestDescriptor::get(self.endpoints.search_query(query));
				let response = self.gateway.execute(&descriptor, None).await?;

				if !response.status().is_success() {
					return Err(endpoint_error(ENDPOINT, &response));
				}

				let payload: SearchResponse = parse_json(ENDPOINT, response.body())?;

				Ok(payload.results)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient> {
	/// Creates a client with a default reqwest transport.
	pub fn new(store: Arc<dyn SessionStore>, endpoints: ServiceEndpoints) -> Self {
		Self::with_http_client(store, endpoints, ReqwestHttpClient::default())
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("gateway", &self.gateway)
			.field("base", &self.endpoints.base.as_str())
			.finish()
	}
}

fn parse_json<T>(endpoint: &'static str, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ApiError::ResponseParse { endpoint, source }.into())
}

fn endpoint_error(endpoint: &'static str, response: &HttpResponse) -> Error {
	let message = serde_json::from_slice::<ErrorBody>(response.body())
		.ok()
		.and_then(ErrorBody::into_message)
		.unwrap_or_else(|| "no error detail provided".into());

	ApiError::Endpoint { endpoint, status: response.status().as_u16(), message }.into()
}
