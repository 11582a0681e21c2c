//! Storage contracts and built-in store implementations for persisted token state.
//!
//! The host's credential vault sits behind [`CredentialStore`]; the client reads once at
//! construction and writes back whenever a refresh succeeds, always before the refreshed
//! token signs its first request.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialId, ScopeSet, TokenState},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract implemented by credential-record backends.
///
/// A `save` replaces the record wholesale; there is no merge operation, because every
/// refresh fully supersedes the previous token generation.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the token state for the provided credential + scope.
	fn save<'a>(
		&'a self,
		id: &'a CredentialId,
		scope: &'a ScopeSet,
		state: TokenState,
	) -> StoreFuture<'a, ()>;

	/// Fetches the state associated with the credential + scope, if present.
	fn load<'a>(
		&'a self,
		id: &'a CredentialId,
		scope: &'a ScopeSet,
	) -> StoreFuture<'a, Option<TokenState>>;
}

/// Error type produced by [`CredentialStore`] implementations.
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

/// Unique key identifying a stored token state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Credential record component.
	pub credential: CredentialId,
	/// Scope fingerprint used for partitioning.
	pub scope_fingerprint: String,
}
impl StoreKey {
	/// Builds a key using the provided credential and scope fingerprint.
	pub fn new(id: &CredentialId, scope: &ScopeSet) -> Self {
		Self { credential: id.clone(), scope_fingerprint: scope.fingerprint() }
	}
}
