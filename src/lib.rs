//! LinkVault client: session-bound access to the LinkVault API.
//!
//! ARCHITECTURE
//! ============
//! View -> [`state::session::Session`] -> [`net::auth::AuthClient`] ->
//! [`net::gateway::Gateway`] -> network. Responses flow back into the session
//! container, which publishes snapshots to subscribed views.

pub mod config;
pub mod net;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::{ClientConfig, ConfigError};
pub use net::auth::AuthClient;
pub use net::error::ApiError;
pub use net::gateway::{Gateway, RequestOptions};
pub use net::types::User;
pub use state::nav::{Navigator, Route};
pub use state::session::{Session, SessionPhase, SessionState};
