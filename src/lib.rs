//! Async client for a book-recommendation service—bearer-token request gateway with
//! single-retry on 401, single-flight refresh rotation, and pluggable session stores.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		api::ApiClient,
		endpoints::ServiceEndpoints,
		gateway::Gateway,
		http::ReqwestHttpClient,
		store::{MemoryStore, SessionStore},
	};

	/// Gateway type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGateway = Gateway<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`Gateway`] backed by an in-memory store and the reqwest transport used
	/// across integration tests.
	pub fn build_reqwest_test_gateway(refresh_endpoint: Url) -> (ReqwestTestGateway, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let gateway = Gateway::with_http_client(store, refresh_endpoint, test_reqwest_http_client());

		(gateway, store_backend)
	}

	/// Constructs an [`ApiClient`] backed by an in-memory store and the reqwest transport used
	/// across integration tests.
	pub fn build_reqwest_test_client(
		endpoints: ServiceEndpoints,
	) -> (ApiClient<ReqwestHttpClient>, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let client = ApiClient::with_http_client(store, endpoints, test_reqwest_http_client());

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use http::{HeaderMap, Method, StatusCode};
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {bookrec_client as _, color_eyre as _, httpmock as _};
