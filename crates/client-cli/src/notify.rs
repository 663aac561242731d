//! Transient, non-blocking user notifications.

use std::fmt;

/// Where the front end sends the user when the session is rejected
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Session rejected by the server, user must sign in again
    SignInRequired,
    RateLimited,
    ServerError,
    Timeout,
    Offline,
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Success(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SignInRequired => write!(f, "Session expired. Please sign in again."),
            Notice::RateLimited => write!(f, "Rate limit exceeded. Please try again later."),
            Notice::ServerError => write!(f, "Server error. Please try again later."),
            Notice::Timeout => write!(f, "Request timeout. Please try again."),
            Notice::Offline => write!(f, "Network error. Please check your connection."),
            Notice::Success(msg) | Notice::Failure(msg) => write!(f, "{}", msg),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Prints notices to stderr
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Success(_) => eprintln!("\x1b[32m✅ {}\x1b[0m", notice),
            Notice::SignInRequired => {
                eprintln!("\x1b[33m🔐 {}\x1b[0m", notice);
                eprintln!("   Run '\x1b[1madforge login\x1b[0m' to authenticate.");
            }
            _ => eprintln!("\x1b[31m✗ {}\x1b[0m", notice),
        }
    }
}

/// Drops every notice; for embedding where the host reports errors itself
#[derive(Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!("notice suppressed: {}", notice);
    }
}
