//! PostgreSQL-backed identity store

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::IdentityStore;
use crate::models::{Account, NewAccount, NewUser, OAuthTokens, Provider, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_account(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        account: &NewAccount,
    ) -> DatabaseResult<Account> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (user_id, provider, provider_account_id, access_token,
                                  refresh_token, token_type, scope, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, provider, provider_account_id, access_token, refresh_token,
                      token_type, scope, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(account.provider.as_str())
        .bind(&account.provider_account_id)
        .bind(&account.tokens.access_token)
        .bind(&account.tokens.refresh_token)
        .bind(&account.tokens.token_type)
        .bind(&account.tokens.scope)
        .bind(account.tokens.expires_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(DatabaseError::from_query)?;

        account_from_row(&row)
    }
}

fn account_from_row(row: &PgRow) -> DatabaseResult<Account> {
    let provider: String = row.get("provider");
    let provider = provider
        .parse::<Provider>()
        .map_err(DatabaseError::Configuration)?;

    Ok(Account {
        id: row.get("id"),
        user_id: row.get("user_id"),
        provider,
        provider_account_id: row.get("provider_account_id"),
        tokens: OAuthTokens {
            access_token: row.get("access_token"),
            refresh_token: row.get("refresh_token"),
            token_type: row.get("token_type"),
            scope: row.get("scope"),
            expires_at: row.get("expires_at"),
        },
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl IdentityStore for UserRepository {
    async fn find_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        info!("Finding user by ID: {}", id);

        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, image, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        info!("Finding user by email: {}", email);

        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, image, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    async fn find_account(
        &self,
        provider: Provider,
        provider_account_id: &str,
    ) -> DatabaseResult<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, provider, provider_account_id, access_token, refresh_token,
                   token_type, scope, expires_at, created_at
            FROM accounts
            WHERE provider = $1 AND provider_account_id = $2
            "#,
        )
        .bind(provider.as_str())
        .bind(provider_account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn list_accounts(&self, user_id: Uuid) -> DatabaseResult<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, provider, provider_account_id, access_token, refresh_token,
                   token_type, scope, expires_at, created_at
            FROM accounts
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        rows.iter().map(account_from_row).collect()
    }

    async fn create_user_with_account(
        &self,
        new_user: &NewUser,
        account: &NewAccount,
    ) -> DatabaseResult<(User, Account)> {
        info!(
            "Creating new user {} with {} account",
            new_user.id, account.provider
        );

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, image, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, image, password_hash, created_at, updated_at
            "#,
        )
        .bind(new_user.id)
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.image)
        .bind(&new_user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_query)?;

        let account = Self::insert_account(&mut tx, user.id, account).await?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok((user, account))
    }

    async fn create_account(
        &self,
        user_id: Uuid,
        account: &NewAccount,
    ) -> DatabaseResult<Account> {
        info!("Linking {} account to user {}", account.provider, user_id);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;
        let account = Self::insert_account(&mut tx, user_id, account).await?;
        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok(account)
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        common::database::health_check(&self.pool).await
    }
}
