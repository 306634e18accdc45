//! Storage contracts and built-in store implementations for session tokens.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	session::{SessionSnapshot, SessionTokens, TokenSecret},
};

/// Persistence contract future for session store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by session token stores.
///
/// A store holds at most one session: the `accessToken`/`refreshToken` slot pair. The
/// gateway's refresh procedure and the api login/logout surface are its only writers.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the current access token, if one is stored.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Returns the current refresh token, if one is stored.
	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Returns a point-in-time view of both slots.
	fn snapshot(&self) -> StoreFuture<'_, SessionSnapshot>;

	/// Persists a freshly minted token pair, replacing any previous session.
	fn save(&self, tokens: SessionTokens) -> StoreFuture<'_, ()>;

	/// Replaces the access token slot, leaving the refresh token untouched.
	///
	/// Last write wins: duplicate refreshes may race replacements in, and the slot must end
	/// up holding whichever token was written most recently, never a partial value.
	fn swap_access(&self, replacement: TokenSecret) -> StoreFuture<'_, AccessSwapOutcome>;

	/// Destroys both slots (logout, or fail-closed refresh teardown).
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Result of an access-token swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessSwapOutcome {
	/// A previous access token was present and has been replaced.
	Replaced,
	/// The slot was empty; the replacement is now the first stored access token.
	Inserted,
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
