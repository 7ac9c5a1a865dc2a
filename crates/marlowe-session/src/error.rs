//! Error types for session management

use thiserror::Error;

/// Errors that can occur around investigation sessions
#[derive(Error, Debug)]
pub enum SessionError {
    /// No session with the given id
    #[error("Unknown session: {0}")]
    NotFound(String),

    /// The session store is unusable
    #[error("Store error: {0}")]
    Store(String),
}
