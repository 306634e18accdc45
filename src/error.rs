//! Client-level error types shared across the gateway, api surface, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Session lifecycle failure raised by the refresh procedure.
	#[error(transparent)]
	Session(#[from] SessionError),
	/// Endpoint-level failure raised by the typed api surface.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The request stayed unauthorized because the refresh path failed.
	///
	/// Callers treat this as session termination and route the user back to their login
	/// entry point; the token store has already been handled by the refresh procedure.
	#[error("Unauthorized.")]
	Unauthorized {
		/// Failure that aborted the refresh path.
		#[source]
		source: Box<Error>,
	},
}
impl Error {
	/// Wraps a refresh-path failure so it surfaces as an unauthorized request.
	pub(crate) fn unauthorized(source: Error) -> Self {
		Self::Unauthorized { source: Box::new(source) }
	}

	/// Returns `true` when the error represents a terminally unauthorized request.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized { .. })
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	RequestSerialize(#[from] serde_json::Error),
	/// Service base URL cannot carry endpoint path segments.
	#[error("Service base URL `{base}` cannot carry endpoint path segments.")]
	InvalidBaseUrl {
		/// Offending base URL string.
		base: String,
	},
	/// An endpoint URL derived from the base failed to parse.
	#[error("Endpoint path could not be joined onto the service base URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Session lifecycle failures raised by the refresh procedure.
#[derive(Debug, ThisError)]
pub enum SessionError {
	/// No refresh token is present in the session store; refresh fails before any network call.
	#[error("No refresh token is available for the current session.")]
	MissingRefreshToken,
	/// Refresh endpoint rejected the session; the store has been cleared (fail closed).
	#[error("Refresh endpoint rejected the session with HTTP {status}.")]
	RefreshRejected {
		/// HTTP status returned by the refresh endpoint.
		status: u16,
	},
	/// Refresh endpoint accepted the call but returned a body the client could not parse.
	#[error("Refresh endpoint returned malformed JSON.")]
	RefreshResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status carried by the malformed response.
		status: u16,
	},
}

/// Endpoint failures raised by the typed api surface.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Service endpoint answered with a non-success status.
	#[error("The {endpoint} endpoint returned HTTP {status}: {message}")]
	Endpoint {
		/// Stable endpoint label (`login`, `register`, ...).
		endpoint: &'static str,
		/// HTTP status returned by the endpoint.
		status: u16,
		/// Error message extracted from the response body, or a generic fallback.
		message: String,
	},
	/// Service endpoint returned a success status with a body the client could not parse.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Stable endpoint label (`login`, `register`, ...).
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unauthorized_preserves_the_refresh_failure_as_source() {
		let rejected: Error = SessionError::RefreshRejected { status: 403 }.into();
		let unauthorized = Error::unauthorized(rejected);

		assert!(unauthorized.is_unauthorized());
		assert_eq!(unauthorized.to_string(), "Unauthorized.");

		let source = StdError::source(&unauthorized)
			.expect("Unauthorized errors should expose the refresh failure as their source.");

		assert!(source.to_string().contains("403"));
	}

	#[test]
	fn missing_refresh_token_is_not_unauthorized() {
		let missing: Error = SessionError::MissingRefreshToken.into();

		assert!(!missing.is_unauthorized());
	}
}
