//! Persisted session shapes: the full token pair and the optional-slot snapshot.

// self
use crate::{_prelude::*, session::secret::TokenSecret};

/// Access/refresh token pair minted by a successful login or registration.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
	/// Short-lived bearer credential sent with each authenticated request.
	pub access_token: TokenSecret,
	/// Longer-lived credential used solely to mint a new access token.
	pub refresh_token: TokenSecret,
}
impl SessionTokens {
	/// Builds a pair from the two credential values.
	pub fn new(access: impl Into<TokenSecret>, refresh: impl Into<TokenSecret>) -> Self {
		Self { access_token: access.into(), refresh_token: refresh.into() }
	}
}
impl Debug for SessionTokens {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTokens")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.finish()
	}
}

/// Point-in-time view of the session store.
///
/// The serialized field names are fixed at `accessToken`/`refreshToken`; session snapshots
/// written by one client build stay readable by the next. Either slot may be absent: refresh
/// rewrites only the access slot, and teardown empties both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
	/// Current access token, if one is stored.
	#[serde(default, rename = "accessToken", skip_serializing_if = "Option::is_none")]
	pub access_token: Option<TokenSecret>,
	/// Current refresh token, if one is stored.
	#[serde(default, rename = "refreshToken", skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
}
impl SessionSnapshot {
	/// Returns `true` when neither token is stored.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none()
	}
}
impl From<SessionTokens> for SessionSnapshot {
	fn from(tokens: SessionTokens) -> Self {
		Self { access_token: Some(tokens.access_token), refresh_token: Some(tokens.refresh_token) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn snapshot_serializes_with_browser_era_key_names() {
		let snapshot: SessionSnapshot = SessionTokens::new("A1", "R1").into();
		let payload = serde_json::to_string(&snapshot)
			.expect("Session snapshot should serialize to JSON.");

		assert_eq!(payload, "{\"accessToken\":\"A1\",\"refreshToken\":\"R1\"}");
	}

	#[test]
	fn snapshot_omits_absent_slots() {
		let empty = SessionSnapshot::default();

		assert!(empty.is_empty());
		assert_eq!(
			serde_json::to_string(&empty).expect("Empty snapshot should serialize to JSON."),
			"{}",
		);

		let partial: SessionSnapshot =
			serde_json::from_str("{\"refreshToken\":\"R1\"}")
				.expect("Partial snapshot should deserialize from JSON.");

		assert_eq!(partial.access_token, None);
		assert_eq!(partial.refresh_token, Some(TokenSecret::from("R1")));
		assert!(!partial.is_empty());
	}

	#[test]
	fn debug_output_redacts_both_tokens() {
		let tokens = SessionTokens::new("A1", "R1");

		assert!(!format!("{tokens:?}").contains("A1"));
	}
}
