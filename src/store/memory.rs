//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialId, ScopeSet, TokenState},
	store::{CredentialStore, StoreError, StoreFuture, StoreKey},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, TokenState>>>;

/// Thread-safe storage backend that keeps token state in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns the number of records currently held.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when no records are held.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn save_now(map: StoreMap, key: StoreKey, state: TokenState) -> Result<(), StoreError> {
		map.write().insert(key, state);

		Ok(())
	}

	fn load_now(map: StoreMap, key: StoreKey) -> Option<TokenState> {
		map.read().get(&key).cloned()
	}
}
impl CredentialStore for MemoryStore {
	fn save<'a>(
		&'a self,
		id: &'a CredentialId,
		scope: &'a ScopeSet,
		state: TokenState,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = StoreKey::new(id, scope);

		Box::pin(async move { Self::save_now(map, key, state) })
	}

	fn load<'a>(
		&'a self,
		id: &'a CredentialId,
		scope: &'a ScopeSet,
	) -> StoreFuture<'a, Option<TokenState>> {
		let map = self.0.clone();
		let key = StoreKey::new(id, scope);

		Box::pin(async move { Ok(Self::load_now(map, key)) })
	}
}
