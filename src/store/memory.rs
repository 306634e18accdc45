//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	session::{SessionSnapshot, SessionTokens, TokenSecret},
	store::{AccessSwapOutcome, SessionStore, StoreFuture},
};

type Slots = Arc<RwLock<SessionSnapshot>>;

/// Thread-safe storage backend that keeps the session in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slots);
impl MemoryStore {
	fn swap_access_now(slots: Slots, replacement: TokenSecret) -> AccessSwapOutcome {
		let mut guard = slots.write();
		let outcome = match guard.access_token {
			Some(_) => AccessSwapOutcome::Replaced,
			None => AccessSwapOutcome::Inserted,
		};

		guard.access_token = Some(replacement);

		outcome
	}
}
impl SessionStore for MemoryStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slots = self.0.clone();

		Box::pin(async move { Ok(slots.read().access_token.clone()) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slots = self.0.clone();

		Box::pin(async move { Ok(slots.read().refresh_token.clone()) })
	}

	fn snapshot(&self) -> StoreFuture<'_, SessionSnapshot> {
		let slots = self.0.clone();

		Box::pin(async move { Ok(slots.read().clone()) })
	}

	fn save(&self, tokens: SessionTokens) -> StoreFuture<'_, ()> {
		let slots = self.0.clone();

		Box::pin(async move {
			*slots.write() = tokens.into();

			Ok(())
		})
	}

	fn swap_access(&self, replacement: TokenSecret) -> StoreFuture<'_, AccessSwapOutcome> {
		let slots = self.0.clone();

		Box::pin(async move { Ok(Self::swap_access_now(slots, replacement)) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slots = self.0.clone();

		Box::pin(async move {
			*slots.write() = SessionSnapshot::default();

			Ok(())
		})
	}
}
