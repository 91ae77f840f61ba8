//! Client core for the eco-tourism missions platform.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends (the bundled CLI, or any UI shell) hold one [`SessionContext`]
//! and pass it explicitly to the API client and the submission pipeline.
//! Every auth-dependent read funnels through that context so a logout or a
//! 401 is observed by all consumers before they read stale state.

pub mod api;
pub mod badges;
pub mod cache;
pub mod config;
pub mod date;
pub mod error;
pub mod forms;
pub mod geocode;
pub mod missions;
pub mod redirect;
pub mod session;
pub mod submit;
pub mod token;
pub mod tours;
pub mod types;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ErrorCode};
pub use session::{AuthHandle, AuthState, SessionContext, SessionEvent, SessionPhase};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
