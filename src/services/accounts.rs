// src/services/accounts.rs
//! SQLite-backed accounts with Argon2 password hashes

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{error, info};

use crate::core::flow::{LoginForm, SignupForm};
use crate::error::{CollaboratorError, CollaboratorResult};
use crate::services::CredentialVerifier;
use crate::types::VerifiedUser;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub struct SqliteAccounts {
    pool: SqlitePool,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn storage_error(e: sqlx::Error) -> CollaboratorError {
    error!("Account database error: {}", e);
    CollaboratorError::Unavailable(e.to_string())
}

impl SqliteAccounts {
    /// Open (creating if needed) the account database at `database_path`.
    pub async fn connect(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Account database opened: {}", database_url);
        Self::from_pool(pool).await
    }

    /// Private in-memory database, mainly for tests.
    pub async fn in_memory() -> Result<Self> {
        // One connection, otherwise every pooled connection sees its own empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory SQLite database")?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let accounts = Self { pool };
        accounts.migrate().await?;
        Ok(accounts)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create accounts table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_accounts_email
            ON accounts(email);
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create accounts index")?;

        info!("Account migrations completed");
        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> CollaboratorResult<Option<Account>> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM accounts
            WHERE email = ?
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)
    }

    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> CollaboratorResult<Account> {
        let email = normalize_email(email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(CollaboratorError::AccountExists(email));
        }

        let password_hash = hash_password(password)?;
        let created_at = Utc::now();
        let id = self
            .insert_account(username, &email, &password_hash, created_at)
            .await?;

        info!("Created account {} for {}", id, email);

        Ok(Account {
            id,
            username: username.to_string(),
            email,
            password_hash,
            created_at,
        })
    }

    /// A concurrent signup can pass the lookup in `create`; the UNIQUE constraint decides.
    async fn insert_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> CollaboratorResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(CollaboratorError::AccountExists(email.to_string()))
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    pub async fn count(&self) -> CollaboratorResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)
    }
}

fn hash_password(password: &str) -> CollaboratorResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CollaboratorError::Unavailable(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

impl From<Account> for VerifiedUser {
    fn from(account: Account) -> Self {
        Self {
            username: account.username,
            email: account.email,
        }
    }
}

#[rocket::async_trait]
impl CredentialVerifier for SqliteAccounts {
    async fn verify(&self, form: &LoginForm) -> CollaboratorResult<VerifiedUser> {
        let account = self
            .find_by_email(&form.email)
            .await?
            .ok_or(CollaboratorError::InvalidCredentials)?;

        if verify_password(&form.password, &account.password_hash) {
            Ok(account.into())
        } else {
            Err(CollaboratorError::InvalidCredentials)
        }
    }

    async fn register(&self, form: &SignupForm) -> CollaboratorResult<VerifiedUser> {
        self.create(&form.username, &form.email, &form.password)
            .await
            .map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_verify() {
        let accounts = SqliteAccounts::in_memory().await.unwrap();
        let form = SignupForm {
            username: "ada".to_string(),
            email: "Ada@Example.com ".to_string(),
            password: "analytical-engine".to_string(),
            confirm_password: "analytical-engine".to_string(),
        };

        let user = accounts.register(&form).await.unwrap();
        assert_eq!(user.email, "ada@example.com");

        let verified = accounts
            .verify(&login("ada@example.com", "analytical-engine"))
            .await
            .unwrap();
        assert_eq!(verified, user);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_rejected() {
        let accounts = SqliteAccounts::in_memory().await.unwrap();
        accounts
            .create("ada", "ada@example.com", "analytical-engine")
            .await
            .unwrap();

        let err = accounts
            .verify(&login("ada@example.com", "difference-engine"))
            .await
            .unwrap_err();
        assert_eq!(err, CollaboratorError::InvalidCredentials);

        let err = accounts
            .verify(&login("charles@example.com", "analytical-engine"))
            .await
            .unwrap_err();
        assert_eq!(err, CollaboratorError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let accounts = SqliteAccounts::in_memory().await.unwrap();
        accounts.create("ada", "ada@example.com", "one").await.unwrap();

        let err = accounts
            .create("ada2", "ADA@example.com", "two")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CollaboratorError::AccountExists("ada@example.com".to_string())
        );
        assert_eq!(accounts.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_password_is_not_stored_in_clear() {
        let accounts = SqliteAccounts::in_memory().await.unwrap();
        let account = accounts
            .create("ada", "ada@example.com", "analytical-engine")
            .await
            .unwrap();
        assert!(account.password_hash.starts_with("$argon2"));

        let stored = accounts
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.password_hash, account.password_hash);
    }

    #[tokio::test]
    async fn test_file_database_persists_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("accounts.db");

        {
            let accounts = SqliteAccounts::connect(&path).await.unwrap();
            accounts.create("ada", "ada@example.com", "pw").await.unwrap();
        }

        let accounts = SqliteAccounts::connect(&path).await.unwrap();
        assert!(accounts
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_duplicate_insert_reports_account_exists() {
        let accounts = SqliteAccounts::in_memory().await.unwrap();
        accounts
            .create("ada", "ada@example.com", "analytical-engine")
            .await
            .unwrap();

        // Same row as a signup that raced past the lookup
        let err = accounts
            .insert_account("ada2", "ada@example.com", "hash", Utc::now())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CollaboratorError::AccountExists("ada@example.com".to_string())
        );
        assert_eq!(accounts.count().await.unwrap(), 1);
    }
}
