//! In-memory identity store used by the tests

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::IdentityStore;
use crate::models::{Account, NewAccount, NewUser, Provider, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    accounts: Vec<Account>,
}

/// Identity store holding everything in process memory
#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    tables: Arc<Mutex<Tables>>,
    failing: Arc<AtomicBool>,
    failing_links: Arc<AtomicBool>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were down
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Make linking an account to an existing user fail
    pub fn fail_links(&self) {
        self.failing_links.store(true, Ordering::SeqCst);
    }

    pub async fn account_count(&self) -> usize {
        self.tables.lock().await.accounts.len()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    fn check(&self) -> DatabaseResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DatabaseError::Configuration(
                "store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_account_constraints(
    tables: &Tables,
    user_id: Uuid,
    account: &NewAccount,
) -> DatabaseResult<()> {
    let taken = tables.accounts.iter().any(|a| {
        a.provider == account.provider && a.provider_account_id == account.provider_account_id
    });
    if taken {
        return Err(DatabaseError::Conflict(
            "accounts_provider_account_key".to_string(),
        ));
    }

    let duplicate_provider = tables
        .accounts
        .iter()
        .any(|a| a.user_id == user_id && a.provider == account.provider);
    if duplicate_provider {
        return Err(DatabaseError::Conflict(
            "accounts_user_provider_key".to_string(),
        ));
    }

    Ok(())
}

fn build_account(user_id: Uuid, account: &NewAccount) -> Account {
    Account {
        id: Uuid::new_v4(),
        user_id,
        provider: account.provider,
        provider_account_id: account.provider_account_id.clone(),
        tokens: account.tokens.clone(),
        created_at: Utc::now(),
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_user_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_account(
        &self,
        provider: Provider,
        provider_account_id: &str,
    ) -> DatabaseResult<Option<Account>> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.provider == provider && a.provider_account_id == provider_account_id)
            .cloned())
    }

    async fn list_accounts(&self, user_id: Uuid) -> DatabaseResult<Vec<Account>> {
        self.check()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .accounts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_user_with_account(
        &self,
        new_user: &NewUser,
        account: &NewAccount,
    ) -> DatabaseResult<(User, Account)> {
        self.check()?;
        let mut tables = self.tables.lock().await;

        if let Some(email) = &new_user.email {
            if tables.users.iter().any(|u| u.email.as_ref() == Some(email)) {
                return Err(DatabaseError::Conflict("users_email_key".to_string()));
            }
        }
        check_account_constraints(&tables, new_user.id, account)?;

        let now = Utc::now();
        let user = User {
            id: new_user.id,
            email: new_user.email.clone(),
            name: new_user.name.clone(),
            image: new_user.image.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        let account = build_account(user.id, account);

        tables.users.push(user.clone());
        tables.accounts.push(account.clone());

        Ok((user, account))
    }

    async fn create_account(
        &self,
        user_id: Uuid,
        account: &NewAccount,
    ) -> DatabaseResult<Account> {
        self.check()?;
        if self.failing_links.load(Ordering::SeqCst) {
            return Err(DatabaseError::Configuration("link rejected".to_string()));
        }

        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(DatabaseError::MissingReference(
                "accounts_user_id_fkey".to_string(),
            ));
        }
        check_account_constraints(&tables, user_id, account)?;

        let account = build_account(user_id, account);
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(!self.failing.load(Ordering::SeqCst))
    }
}
