use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::access::Role;
use crate::auth::password;
use crate::config::AppConfig;
use crate::services::mailer::Mailer;

/// Errors raised while bringing up or talking to the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Process-scoped services shared by all handlers. Initialized once at
/// startup and injected through `axum::extract::State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Connect the pool and apply pending migrations.
    pub async fn init(config: &AppConfig, mailer: Arc<dyn Mailer>) -> Result<Self, StoreError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
            .connect(&database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        info!("Connected store pool ({} max connections)", config.database.max_connections);
        Ok(Self { pool, mailer })
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create the initial superadmin account when none exists, driven by
    /// BOOKBINDER_ADMIN_EMAIL / BOOKBINDER_ADMIN_PASSWORD. A no-op when the
    /// env vars are absent or a superadmin is already present.
    pub async fn bootstrap_superadmin(&self) -> Result<(), StoreError> {
        let (Ok(email), Ok(plain)) = (
            std::env::var("BOOKBINDER_ADMIN_EMAIL"),
            std::env::var("BOOKBINDER_ADMIN_PASSWORD"),
        ) else {
            return Ok(());
        };

        let existing: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE role_id = $1")
                .bind(Role::Superadmin as i32)
                .fetch_one(&self.pool)
                .await?;
        if existing.0 > 0 {
            return Ok(());
        }

        let username =
            std::env::var("BOOKBINDER_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let password_hash = password::hash_password(&plain)
            .map_err(|e| StoreError::Bootstrap(format!("failed to hash admin password: {}", e)))?;

        sqlx::query(
            "INSERT INTO users (username, email, password_hash, role_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(&username)
        .bind(&email)
        .bind(&password_hash)
        .bind(Role::Superadmin as i32)
        .execute(&self.pool)
        .await?;

        info!("Bootstrapped superadmin account '{}'", username);
        Ok(())
    }

    /// Close the pool on graceful shutdown
    pub async fn shutdown(&self) {
        self.pool.close().await;
        info!("Closed store connection pool");
    }
}
