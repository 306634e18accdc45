//! Authenticated request gateway: bearer injection, 401 detection, and a single retry.

pub mod refresh;

mod metrics;

pub use metrics::GatewayMetrics;

// self
use crate::{
	_prelude::*,
	error::TransportError,
	http::{GatewayHttpClient, HttpResponse, RequestDescriptor},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::TokenSecret,
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestHttpClient>;

type ExpiryHook = Arc<dyn Fn() + Send + Sync>;

/// Wraps outbound requests with the current session's bearer token.
///
/// The gateway owns the HTTP transport, the session store, and the refresh endpoint so a
/// single value covers the whole authenticated-request contract: read the access token,
/// issue the request, and on a 401 run one refresh followed by exactly one retry. The store
/// is the only shared mutable state; the refresh guard serializes rotations so concurrent
/// 401s cannot race two replacement tokens into it.
#[derive(Clone)]
pub struct Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// HTTP transport used for every outbound request, including the refresh exchange.
	pub http_client: Arc<C>,
	/// Session store holding the access/refresh token pair.
	pub store: Arc<dyn SessionStore>,
	/// Absolute URL of the token refresh endpoint.
	pub refresh_endpoint: Url,
	/// Shared counters for request and refresh outcomes.
	pub metrics: Arc<GatewayMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
	expiry_hook: Option<ExpiryHook>,
}
impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn SessionStore>,
		refresh_endpoint: Url,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			refresh_endpoint,
			metrics: Default::default(),
			refresh_guard: Default::default(),
			expiry_hook: None,
		}
	}

	/// Installs a hook invoked when a rejected refresh tears the session down.
	///
	/// The gateway itself never navigates; the embedding layer maps this callback (or the
	/// typed `Unauthorized` error) to its login entry point.
	pub fn with_expiry_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
		self.expiry_hook = Some(Arc::new(hook));

		self
	}

	/// Issues `request` with the current access token, retrying once after a 401.
	///
	/// Any status other than 401 (success or not) is returned as-is with no refresh call.
	/// A 401 triggers the refresh procedure; on success the identical request is re-issued
	/// with the fresh token and that response is returned, even if it is another 401. When
	/// the refresh path fails the call surfaces [`Error::Unauthorized`] and no retry is
	/// issued. Transport failures on either attempt propagate unchanged.
	pub async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.metrics.record_request();

				let bearer = self.store.access_token().await?;
				let first = self.execute(request, bearer.as_ref()).await?;

				if first.status() != StatusCode::UNAUTHORIZED {
					return Ok(first);
				}

				let fresh = self
					.refresh_after_unauthorized(bearer.as_ref())
					.await
					.map_err(Error::unauthorized)?;

				self.metrics.record_retry();
				self.execute(request, Some(&fresh)).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	pub(crate) async fn execute(
		&self,
		request: &RequestDescriptor,
		bearer: Option<&TokenSecret>,
	) -> Result<HttpResponse> {
		let request = request.to_http_request(bearer)?;

		self.http_client
			.execute(request)
			.await
			.map_err(|err| TransportError::network(err).into())
	}

	pub(crate) fn notify_session_expired(&self) {
		if let Some(hook) = &self.expiry_hook {
			hook();
		}
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient> {
	/// Creates a gateway with a default reqwest transport.
	pub fn new(store: Arc<dyn SessionStore>, refresh_endpoint: Url) -> Self {
		Self::with_http_client(store, refresh_endpoint, ReqwestHttpClient::default())
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("refresh_endpoint", &self.refresh_endpoint.as_str())
			.field("expiry_hook_set", &self.expiry_hook.is_some())
			.finish()
	}
}
