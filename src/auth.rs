//! Auth-domain identifiers, scope sets, credential configuration, and token state.

pub mod config;
pub mod id;
pub mod scope;
pub mod secret;
pub mod token;

pub use config::*;
pub use id::*;
pub use scope::*;
pub use secret::*;
pub use token::*;
