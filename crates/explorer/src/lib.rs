// CLI-side state (configuration, paths)
pub mod state;

// Session handling shared by every command
pub mod session;

pub use session::{connector_for, SessionError, SessionManager};
pub use state::{AppConfig, AppState, StateError};
