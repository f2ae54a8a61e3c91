use crate::application_port::UserError;
use crate::domain_model::{NewUser, User, UserId};

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, user_id: &UserId) -> Result<User, UserError>;
    async fn resolve_username(&self, username: &str) -> Result<User, UserError>;
    async fn create_user(&self, input: NewUser) -> Result<User, UserError>;
    async fn count_users(&self) -> Result<u64, UserError>;
}
