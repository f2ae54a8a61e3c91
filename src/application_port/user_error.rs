/// Message carried by [`UserNotFound`] when the caller does not supply one.
pub const USER_NOT_FOUND: &str = "User not found";

/// Raised when a user lookup matches nothing.
///
/// The message is fixed at construction. Lookups return it as the `Err` arm
/// and let `?` carry it to the HTTP boundary, which renders it as a 404.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UserNotFound {
    message: String,
}

impl UserNotFound {
    pub fn new(message: impl Into<String>) -> Self {
        UserNotFound {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for UserNotFound {
    fn default() -> Self {
        UserNotFound::new(USER_NOT_FOUND)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    NotFound(#[from] UserNotFound),
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid username: {0}")]
    InvalidUsername(String),
    #[error("store error: {0}")]
    Store(String),
}

impl UserError {
    pub fn not_found() -> Self {
        UserError::NotFound(UserNotFound::default())
    }
}
