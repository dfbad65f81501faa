use thiserror::Error;

/// Message shown when a failure carries no text of its own.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Error, Debug)]
pub enum AuthError {
    /// A required callback parameter was absent.
    #[error("{0}")]
    MissingInput(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error("Session storage failed: {0}")]
    Storage(String),
}

impl AuthError {
    /// Text suitable for the callback's error state.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNEXPECTED_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
