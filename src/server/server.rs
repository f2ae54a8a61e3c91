use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::{Context, anyhow};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;

/// Wires the configured backends together and owns what must be closed on
/// shutdown.
pub struct Server {
    pub user_service: Arc<dyn UserService>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let mut pool = None;

        let user_repo: Arc<dyn UserRepo> = match settings.user.backend.as_str() {
            "fake" => Arc::new(InMemoryUserRepo::new()),
            "real" => {
                let database = settings
                    .database
                    .as_ref()
                    .ok_or_else(|| anyhow!("user backend \"real\" requires a [database] section"))?;
                let mysql = MySqlPoolOptions::new()
                    .max_connections(database.max_connections)
                    .connect(&database.url)
                    .await
                    .context("connecting to MySQL")?;
                let repo = MySqlUserRepo::new(mysql.clone());
                repo.migrate().await?;
                pool = Some(mysql);
                Arc::new(repo)
            }
            other => return Err(anyhow!("Unknown user backend: {}", other)),
        };

        let user_service: Arc<dyn UserService> = Arc::new(
            RealUserService::new(user_repo)
                .with_detailed_not_found(settings.user.detailed_not_found),
        );

        info!(backend = %settings.user.backend, "server started");

        Ok(Self { user_service, pool })
    }

    pub fn with_user_service(user_service: Arc<dyn UserService>) -> Self {
        Self {
            user_service,
            pool: None,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("database pool closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Http, Log, User};

    fn settings(backend: &str) -> Settings {
        Settings {
            http: Http {
                address: "127.0.0.1:0".into(),
                cert_path: None,
                key_path: None,
            },
            log: Log {
                filter: "info".into(),
                json: false,
            },
            user: User {
                backend: backend.into(),
                detailed_not_found: true,
            },
            database: None,
        }
    }

    #[tokio::test]
    async fn fake_backend_starts_empty() {
        let server = Server::try_new(&settings("fake")).await.unwrap();
        assert_eq!(server.user_service.count_users().await.unwrap(), 0);

        let err = server
            .user_service
            .get_user(&"u-404".into())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No user with id u-404");
        server.shutdown().await;
    }

    #[tokio::test]
    async fn real_backend_needs_database_section() {
        assert!(Server::try_new(&settings("real")).await.is_err());
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        assert!(Server::try_new(&settings("ldap")).await.is_err());
    }
}
