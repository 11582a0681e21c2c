//! Simple file-backed [`CredentialStore`] for lightweight deployments and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialId, ScopeSet, TokenState},
	store::{CredentialStore, StoreError, StoreFuture, StoreKey},
};

/// Persists token state to a JSON snapshot after each mutation.
///
/// Writes go to a sibling temp file first and are swapped in with an atomic rename, so a
/// crash mid-refresh leaves either the old or the new generation on disk, never a torn
/// record. That property is what makes the client's persist-then-use ordering meaningful.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<StoreKey, TokenState>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { HashMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<StoreKey, TokenState>, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let entries: Vec<(StoreKey, TokenState)> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<StoreKey, TokenState>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: Vec<_> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
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
impl CredentialStore for FileStore {
	fn save<'a>(
		&'a self,
		id: &'a CredentialId,
		scope: &'a ScopeSet,
		state: TokenState,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let key = StoreKey::new(id, scope);
			let mut guard = self.inner.write();

			guard.insert(key, state);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn load<'a>(
		&'a self,
		id: &'a CredentialId,
		scope: &'a ScopeSet,
	) -> StoreFuture<'a, Option<TokenState>> {
		Box::pin(async move {
			let key = StoreKey::new(id, scope);

			Ok(self.inner.read().get(&key).cloned())
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"deezer_client_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn fixtures() -> (CredentialId, ScopeSet, TokenState) {
		let id = CredentialId::new("deezer-file").expect("Credential fixture should be valid.");
		let scope = ScopeSet::new(["basic_access"]).expect("Scope fixture should be valid.");
		let state = TokenState::with_access_token("persisted-access").and_refresh_token("persisted-refresh");

		(id, scope, state)
	}

	#[tokio::test]
	async fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let (id, scope, state) = fixtures();

		store.save(&id, &scope, state.clone()).await.expect("Failed to save fixture state.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = reopened
			.load(&id, &scope)
			.await
			.expect("Failed to load fixture state.")
			.expect("File store lost state after reopen.");

		assert_eq!(
			fetched.access_token.as_ref().map(|s| s.expose()),
			state.access_token.as_ref().map(|s| s.expose()),
		);
		assert_eq!(
			fetched.refresh_token.as_ref().map(|s| s.expose()),
			state.refresh_token.as_ref().map(|s| s.expose()),
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
