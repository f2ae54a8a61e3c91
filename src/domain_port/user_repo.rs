use crate::application_port::UserError;
use crate::domain_model::*;

/// Storage for user records.
///
/// A missing row is `Ok(None)`, not an error. Deciding that a miss is a
/// failure belongs to the service making the lookup.
#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError>;

    /// Fails with [`UserError::UsernameTaken`] when the username is in use.
    async fn insert(&self, user: &User) -> Result<(), UserError>;

    async fn count(&self) -> Result<u64, UserError>;
}
