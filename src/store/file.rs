//! Simple file-backed [`SessionStore`] for CLI tools and long-lived desktop sessions.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	session::{SessionSnapshot, SessionTokens, TokenSecret},
	store::{AccessSwapOutcome, SessionStore, StoreError, StoreFuture},
};

/// Persists the session to a JSON file after each mutation.
///
/// The on-disk document is the plain `{"accessToken": ..., "refreshToken": ...}` object, so
/// snapshots stay readable across client versions. Every flush writes a sibling temp file and
/// renames it over the target, so a replacement access token becomes visible atomically.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<SessionSnapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading an existing session.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot =
			if path.exists() { Self::load_snapshot(&path)? } else { SessionSnapshot::default() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<SessionSnapshot, StoreError> {
		if !path.exists() {
			return Ok(SessionSnapshot::default());
		}

		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(SessionSnapshot::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize session snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl SessionStore for FileStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.inner.read().access_token.clone()) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.inner.read().refresh_token.clone()) })
	}

	fn snapshot(&self) -> StoreFuture<'_, SessionSnapshot> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn save(&self, tokens: SessionTokens) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			*guard = tokens.into();
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn swap_access(&self, replacement: TokenSecret) -> StoreFuture<'_, AccessSwapOutcome> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let outcome = match guard.access_token {
				Some(_) => AccessSwapOutcome::Replaced,
				None => AccessSwapOutcome::Inserted,
			};

			guard.access_token = Some(replacement);
			self.persist_locked(&guard)?;

			Ok(outcome)
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			*guard = SessionSnapshot::default();
			self.persist_locked(&guard)?;

			Ok(())
		})
	}
}
