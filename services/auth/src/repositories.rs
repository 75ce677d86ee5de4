//! Identity store: users and their linked accounts

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{Account, NewAccount, NewUser, Provider, User};

#[cfg(test)]
pub mod memory;
pub mod user;

pub use user::UserRepository;

/// Persistence seam for users and accounts
///
/// Emails are passed in already normalized. Implementations must enforce
/// that an email belongs to at most one user, that a
/// (provider, provider_account_id) pair is linked at most once, and that a
/// user holds at most one account per provider, reporting violations as
/// `DatabaseError::Conflict`.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    async fn find_account(
        &self,
        provider: Provider,
        provider_account_id: &str,
    ) -> DatabaseResult<Option<Account>>;

    async fn list_accounts(&self, user_id: Uuid) -> DatabaseResult<Vec<Account>>;

    /// Create a user together with its first account, atomically
    async fn create_user_with_account(
        &self,
        user: &NewUser,
        account: &NewAccount,
    ) -> DatabaseResult<(User, Account)>;

    /// Link another account to an existing user
    async fn create_account(&self, user_id: Uuid, account: &NewAccount)
    -> DatabaseResult<Account>;

    async fn health_check(&self) -> DatabaseResult<bool>;
}
