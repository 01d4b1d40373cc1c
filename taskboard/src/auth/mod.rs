//! Authentication: the session store and the local user directory it
//! checks credentials against.

pub mod directory;
pub mod store;

pub use store::{AuthState, AuthStore};
