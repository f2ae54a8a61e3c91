use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::UserRepo;
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    detailed_not_found: bool,
}

impl RealUserService {
    pub fn new(user_repo: Arc<dyn UserRepo>) -> RealUserService {
        RealUserService {
            user_repo,
            detailed_not_found: false,
        }
    }

    /// Name the lookup key in not-found messages instead of using
    /// [`USER_NOT_FOUND`].
    pub fn with_detailed_not_found(mut self, detailed: bool) -> Self {
        self.detailed_not_found = detailed;
        self
    }

    fn not_found(&self, detail: impl FnOnce() -> String) -> UserNotFound {
        if self.detailed_not_found {
            UserNotFound::new(detail())
        } else {
            UserNotFound::default()
        }
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn get_user(&self, user_id: &UserId) -> Result<User, UserError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| self.not_found(|| format!("No user with id {user_id}")))?;
        Ok(user)
    }

    async fn resolve_username(&self, username: &str) -> Result<User, UserError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| self.not_found(|| format!("No user with username {username}")))?;
        Ok(user)
    }

    async fn create_user(&self, input: NewUser) -> Result<User, UserError> {
        let username = normalize_username(&input.username).map_err(UserError::InvalidUsername)?;

        let user = User {
            id: UserId::generate(),
            username,
            created_at: Utc::now(),
        };
        self.user_repo.insert(&user).await?;

        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    async fn count_users(&self) -> Result<u64, UserError> {
        self.user_repo.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::InMemoryUserRepo;

    struct BrokenRepo;

    #[async_trait::async_trait]
    impl UserRepo for BrokenRepo {
        async fn find_by_id(&self, _: &UserId) -> Result<Option<User>, UserError> {
            Err(UserError::Store("connection refused".into()))
        }

        async fn find_by_username(&self, _: &str) -> Result<Option<User>, UserError> {
            Err(UserError::Store("connection refused".into()))
        }

        async fn insert(&self, _: &User) -> Result<(), UserError> {
            Err(UserError::Store("connection refused".into()))
        }

        async fn count(&self) -> Result<u64, UserError> {
            Err(UserError::Store("connection refused".into()))
        }
    }

    fn service() -> RealUserService {
        RealUserService::new(Arc::new(InMemoryUserRepo::new()))
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_owned(),
        }
    }

    #[tokio::test]
    async fn unknown_id_raises_default_signal() {
        let err = service().get_user(&UserId::from("u-404")).await.unwrap_err();
        match err {
            UserError::NotFound(signal) => assert_eq!(signal.message(), "User not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn detailed_mode_names_the_missing_id() {
        let service = service().with_detailed_not_found(true);
        let err = service.get_user(&UserId::from("u-404")).await.unwrap_err();
        match err {
            UserError::NotFound(signal) => assert_eq!(signal.message(), "No user with id u-404"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = service.resolve_username("ghost").await.unwrap_err();
        match err {
            UserError::NotFound(signal) => {
                assert_eq!(signal.message(), "No user with username ghost")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn created_user_can_be_looked_up() {
        let service = service();
        let created = service.create_user(new_user("  carol ")).await.unwrap();
        assert_eq!(created.username, "carol");

        assert_eq!(service.get_user(&created.id).await.unwrap(), created);
        assert_eq!(service.resolve_username("carol").await.unwrap(), created);
        assert_eq!(service.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn create_rejects_bad_and_duplicate_names() {
        let service = service();
        assert!(matches!(
            service.create_user(new_user("x")).await,
            Err(UserError::InvalidUsername(_))
        ));

        service.create_user(new_user("dave")).await.unwrap();
        assert!(matches!(
            service.create_user(new_user("dave")).await,
            Err(UserError::UsernameTaken)
        ));
    }

    #[tokio::test]
    async fn store_failure_is_not_reported_as_missing() {
        let service = RealUserService::new(Arc::new(BrokenRepo));
        assert!(matches!(
            service.get_user(&UserId::from("u-1")).await,
            Err(UserError::Store(_))
        ));
        assert!(matches!(
            service.resolve_username("erin").await,
            Err(UserError::Store(_))
        ));
    }
}
