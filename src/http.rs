//! Transport primitives for the request gateway.
//!
//! The module exposes [`GatewayHttpClient`] alongside [`RequestDescriptor`] so downstream
//! crates can integrate custom HTTP clients. The trait works on buffered
//! [`http::Request`]/[`http::Response`] values; implementations execute the request, collect
//! the body, and hand back status, headers, and bytes in one piece so the gateway can inspect
//! the status and re-issue the identical request after a refresh.

// std
use std::ops::Deref;
// crates.io
use http::{
	HeaderName, HeaderValue,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{_prelude::*, error::ConfigError, session::TokenSecret};

/// Buffered outbound request handed to the transport.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Buffered response returned by the transport.
pub type HttpResponse = http::Response<Vec<u8>>;
/// Future returned by [`GatewayHttpClient::execute`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing gateway requests.
///
/// The trait is the crate's only dependency on an HTTP stack. Callers provide an
/// implementation (typically behind `Arc<T>` where `T: GatewayHttpClient`) and the gateway
/// dispatches every outbound request through it: the caller's own requests, the single 401
/// retry, and the refresh exchange. Implementations must be `Send + Sync + 'static` so one
/// transport can be shared across gateways, and the returned futures must be `Send` so
/// gateway calls can hop executors.
pub trait GatewayHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes the request and buffers the full response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Caller-supplied description of an outbound request.
///
/// The gateway treats the descriptor as immutable except for header augmentation: it always
/// sets `Content-Type: application/json` and overwrites `Authorization` with the current
/// bearer token (or strips it when no token is stored). Callers must not rely on a
/// pre-existing `Authorization` header surviving.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Target URL.
	pub url: Url,
	/// Caller-supplied headers, copied onto every attempt.
	pub headers: HeaderMap,
	/// Optional request body bytes.
	pub body: Option<Vec<u8>>,
}
impl RequestDescriptor {
	/// Creates a descriptor for the provided method and URL.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: None }
	}

	/// Creates a GET descriptor.
	pub fn get(url: Url) -> Self {
		Self::new(Method::GET, url)
	}

	/// Creates a POST descriptor.
	pub fn post(url: Url) -> Self {
		Self::new(Method::POST, url)
	}

	/// Appends a header to the descriptor.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `payload` as the JSON request body.
	pub fn json<T>(mut self, payload: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(payload)?);

		Ok(self)
	}

	/// Builds the buffered request for one attempt, applying header augmentation.
	pub(crate) fn to_http_request(
		&self,
		bearer: Option<&TokenSecret>,
	) -> Result<HttpRequest, ConfigError> {
		let mut request = http::Request::builder()
			.method(self.method.clone())
			.uri(self.url.as_str())
			.body(self.body.clone().unwrap_or_default())?;

		*request.headers_mut() = self.headers.clone();

		request.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		match bearer {
			Some(token) => {
				let value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
					.map_err(http::Error::from)?;

				request.headers_mut().insert(AUTHORIZATION, value);
			},
			None => {
				request.headers_mut().remove(AUTHORIZATION);
			},
		}

		Ok(request)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The gateway's retry contract assumes the transport reports status codes rather than
/// following cross-origin auth redirects; configure any custom [`ReqwestClient`] accordingly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl GatewayHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
