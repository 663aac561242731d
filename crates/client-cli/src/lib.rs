//! Client for the adforge marketing-content backend: session handling,
//! the REST gateway and the helpers the command-line front end builds on.

pub mod api;
pub mod config;
pub mod format;
pub mod notify;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiError, ApiResult, ClientConfig};
pub use notify::{ConsoleNotifier, Notice, Notifier};
pub use session::{landing_route, Access, AuthError, SessionState, SessionStore};
pub use storage::{CredentialStore, FileStore, MemoryStore};
