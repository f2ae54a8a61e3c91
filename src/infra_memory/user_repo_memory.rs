use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Process-local user storage backing the `fake` user backend.
#[derive(Debug, Default)]
pub struct InMemoryUserRepo {
    users: DashMap<UserId, User>,
    ids_by_username: DashMap<String, UserId>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.get(user_id).map(|user| user.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        let Some(user_id) = self
            .ids_by_username
            .get(username)
            .map(|id| id.value().clone())
        else {
            return Ok(None);
        };
        self.find_by_id(&user_id).await
    }

    async fn insert(&self, user: &User) -> Result<(), UserError> {
        // The username index is the uniqueness guard. The record is stored
        // while the index entry is still locked, so a name is never visible
        // before the user it points to.
        let claimed = self
            .ids_by_username
            .entry(user.username.clone())
            .or_insert_with(|| {
                self.users.insert(user.id.clone(), user.clone());
                user.id.clone()
            })
            .value()
            .clone();
        if claimed != user.id {
            return Err(UserError::UsernameTaken);
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, UserError> {
        Ok(self.users.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn user(username: &str) -> User {
        User {
            id: UserId::generate(),
            username: username.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn miss_is_none() {
        let repo = InMemoryUserRepo::new();
        assert_eq!(repo.find_by_id(&UserId::from("u-404")).await.unwrap(), None);
        assert_eq!(repo.find_by_username("nobody").await.unwrap(), None);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn inserted_user_is_found_both_ways() {
        let repo = InMemoryUserRepo::new();
        let alice = user("alice");
        repo.insert(&alice).await.unwrap();

        assert_eq!(repo.find_by_id(&alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(repo.find_by_username("alice").await.unwrap(), Some(alice));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let repo = InMemoryUserRepo::new();
        let first = user("alice");
        repo.insert(&first).await.unwrap();

        let err = repo.insert(&user("alice")).await.unwrap_err();
        assert!(matches!(err, UserError::UsernameTaken));
        assert_eq!(repo.find_by_username("alice").await.unwrap(), Some(first));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn usernames_match_exactly() {
        let repo = InMemoryUserRepo::new();
        repo.insert(&user("alice")).await.unwrap();

        assert_eq!(repo.find_by_username("ALICE").await.unwrap(), None);
        assert_eq!(repo.find_by_username("alicé").await.unwrap(), None);
        repo.insert(&user("Alice")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn indexed_names_always_resolve() {
        let repo = Arc::new(InMemoryUserRepo::new());

        let writer = {
            let repo = repo.clone();
            tokio::spawn(async move {
                for i in 0..500 {
                    repo.insert(&user(&format!("user{i}"))).await.unwrap();
                }
            })
        };

        while !writer.is_finished() {
            let ids: Vec<UserId> = repo
                .ids_by_username
                .iter()
                .map(|entry| entry.value().clone())
                .collect();
            for id in ids {
                assert!(repo.users.contains_key(&id), "{id} indexed before stored");
            }
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();

        for i in 0..500 {
            let name = format!("user{i}");
            let found = repo.find_by_username(&name).await.unwrap();
            assert_eq!(found.map(|u| u.username), Some(name));
        }
    }

    #[tokio::test]
    async fn concurrent_claims_admit_one_winner() {
        let repo = Arc::new(InMemoryUserRepo::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.insert(&user("bob")).await }));
        }

        let mut won = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                won += 1;
            }
        }
        assert_eq!(won, 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
