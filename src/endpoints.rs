//! Service endpoint configuration derived from a single base URL.

// self
use crate::{_prelude::*, error::ConfigError};

const LOGIN_PATH: &str = "auth/login/";
const REGISTER_PATH: &str = "auth/register/";
const REFRESH_PATH: &str = "auth/refresh/";
const RECOMMENDATIONS_PATH: &str = "recommendations/ai/";
const SEARCH_PATH: &str = "recommendations/search/";

/// Resolved URLs for every endpoint the client talks to.
///
/// The paths are fixed by the service's HTTP contract; only the base varies per deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoints {
	/// Base URL all endpoint paths are joined onto.
	pub base: Url,
	/// Login endpoint (`auth/login/`).
	pub login: Url,
	/// Registration endpoint (`auth/register/`).
	pub register: Url,
	/// Token refresh endpoint (`auth/refresh/`).
	pub refresh: Url,
	/// Recommendation endpoint (`recommendations/ai/`).
	pub recommendations: Url,
	/// Catalog search endpoint (`recommendations/search/`).
	pub search: Url,
}
impl ServiceEndpoints {
	/// Derives the endpoint set from a service base URL.
	///
	/// The base must be able to carry path segments (e.g. `http://127.0.0.1:8000/`); a
	/// trailing slash is applied if missing so joining never truncates existing segments.
	pub fn from_base(base: Url) -> Result<Self, ConfigError> {
		if base.cannot_be_a_base() {
			return Err(ConfigError::InvalidBaseUrl { base: base.to_string() });
		}

		let base = if base.path().ends_with('/') {
			base
		} else {
			let mut slashed = base.clone();

			slashed.set_path(&format!("{}/", base.path()));

			slashed
		};
		Ok(Self {
			login: join(&base, LOGIN_PATH)?,
			register: join(&base, REGISTER_PATH)?,
			refresh: join(&base, REFRESH_PATH)?,
			recommendations: join(&base, RECOMMENDATIONS_PATH)?,
			search: join(&base, SEARCH_PATH)?,
			base,
		})
	}

	/// Returns the search endpoint with the query string applied.
	pub fn search_query(&self, query: &str) -> Url {
		let mut url = self.search.clone();

		url.query_pairs_mut().append_pair("q", query);

		url
	}
}

fn join(base: &Url, path: &str) -> Result<Url, ConfigError> {
	base.join(path).map_err(|source| ConfigError::InvalidEndpoint { source })
}
