//! Wire types matching the service's JSON contracts field-for-field.

// self
use crate::_prelude::*;

/// Credentials submitted to the login endpoint.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
	/// Account username.
	pub username: String,
	/// Account password.
	pub password: String,
}
impl LoginRequest {
	/// Builds a login payload.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: username.into(), password: password.into() }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Payload submitted to the registration endpoint.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
	/// Desired username.
	pub username: String,
	/// Contact email address.
	pub email: String,
	/// Account password.
	pub password: String,
}
impl RegisterRequest {
	/// Builds a registration payload.
	pub fn new(
		username: impl Into<String>,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self { username: username.into(), email: email.into(), password: password.into() }
	}
}
impl Debug for RegisterRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RegisterRequest")
			.field("username", &self.username)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Token pair minted by the login endpoint.
#[derive(Deserialize)]
pub(crate) struct TokenPair {
	pub access: String,
	pub refresh: String,
}

/// User preferences submitted to the recommendation endpoint.
///
/// Field names mirror the service contract exactly; free-form values (`genres`, `mood`,
/// `length`, `release_preference`) pass through as the user typed or selected them.
#[derive(Clone, Debug, Serialize)]
pub struct RecommendationRequest {
	/// Identifier of the user the recommendations are for.
	pub user_id: u64,
	/// Comma-separated genre preferences.
	pub genres: String,
	/// Preferred reading mood (`relaxing`, `thrilling`, `intellectual`, or empty).
	pub mood: String,
	/// Titles the user already enjoyed.
	pub favorite_books: Vec<String>,
	/// Preferred book length (`short`, `medium`, `long`, or empty).
	pub length: String,
	/// Whether to favor `new` releases or `classic` titles.
	pub release_preference: String,
}
impl RecommendationRequest {
	/// Builds an empty preference set for the given user.
	pub fn new(user_id: u64) -> Self {
		Self {
			user_id,
			genres: String::new(),
			mood: String::new(),
			favorite_books: Vec::new(),
			length: String::new(),
			release_preference: "new".into(),
		}
	}
}

/// A recommended title returned by the recommendation endpoint.
///
/// Upstream augmentation occasionally omits fields; absent values fall back to the same
/// placeholders the service's own front end renders.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Book {
	/// Book title.
	#[serde(default = "unknown_title")]
	pub title: String,
	/// Book authors.
	#[serde(default = "unknown_authors")]
	pub authors: Vec<String>,
	/// Short description blurb.
	#[serde(default = "missing_description")]
	pub description: String,
	/// Cover thumbnail URL; empty when none is available.
	#[serde(default)]
	pub thumbnail: String,
}

/// Response envelope of the recommendation endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationResponse {
	#[serde(default)]
	pub recommendations: Vec<Book>,
}

/// A catalog entry returned by the search endpoint.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BookSummary {
	/// Book title.
	#[serde(default)]
	pub title: String,
	/// Book authors.
	#[serde(default)]
	pub authors: Vec<String>,
}

/// Response envelope of the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
	/// Matching catalog entries; empty when the service omits the field.
	#[serde(default)]
	pub results: Vec<BookSummary>,
}

/// Error payload carried by non-success endpoint responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	detail: Option<String>,
}
impl ErrorBody {
	pub fn into_message(self) -> Option<String> {
		self.error.or(self.detail)
	}
}

fn unknown_title() -> String {
	"Unknown Title".into()
}

fn unknown_authors() -> Vec<String> {
	vec!["Unknown Author".into()]
}

fn missing_description() -> String {
	"No description available.".into()
}
