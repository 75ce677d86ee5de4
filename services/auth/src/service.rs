//! Authentication service: credentials sign-in, signup, and OAuth
//! account reconciliation against the identity store

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AuthError,
    models::{NewAccount, NewUser, OAuthIdentity, OAuthTokens, Provider, PublicUser, SignupRequest},
    password,
    repositories::IdentityStore,
    validation::{normalize_email, validate_email, validate_name, validate_password},
};

/// Validates credentials and reconciles external identities
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Register a credentials user
    pub async fn signup(&self, request: &SignupRequest) -> Result<PublicUser, AuthError> {
        let email = normalize_email(&request.email);
        validate_name(&request.name).map_err(AuthError::Validation)?;
        validate_email(&email).map_err(AuthError::Validation)?;
        validate_password(&request.password).map_err(AuthError::Validation)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash =
            password::hash_password(&request.password).map_err(|e| AuthError::Internal(e.to_string()))?;

        let id = Uuid::new_v4();
        let new_user = NewUser {
            id,
            email: Some(email),
            name: Some(request.name.trim().to_string()),
            image: None,
            password_hash: Some(password_hash),
        };
        let account = NewAccount {
            provider: Provider::Credentials,
            provider_account_id: id.to_string(),
            tokens: OAuthTokens::default(),
        };

        let (user, _) = self
            .store
            .create_user_with_account(&new_user, &account)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AuthError::EmailTaken
                } else {
                    AuthError::AuthBackendError(e)
                }
            })?;

        info!("Registered user {}", user.id);
        Ok(user.into())
    }

    /// Credentials path: email and plaintext password
    pub async fn authenticate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            warn!("Sign-in attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(password_hash) = user.password_hash.as_deref() else {
            warn!("Credentials sign-in for user {} without a password", user.id);
            return Err(AuthError::InvalidCredentials);
        };

        let valid = password::verify_password(password, password_hash)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !valid {
            warn!("Wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user.into())
    }

    /// OAuth path: match a verified provider identity to a user, creating
    /// or linking as needed. An email already linked to a different
    /// account of the same provider is never relinked.
    pub async fn reconcile_oauth(&self, identity: &OAuthIdentity) -> Result<PublicUser, AuthError> {
        if identity.provider == Provider::Credentials {
            return Err(AuthError::Validation(
                "Credentials cannot be used as an OAuth provider".to_string(),
            ));
        }

        // Repeat sign-in with an already linked provider account
        if let Some(account) = self
            .store
            .find_account(identity.provider, &identity.provider_account_id)
            .await?
        {
            let user = self
                .store
                .find_user_by_id(account.user_id)
                .await?
                .ok_or_else(|| AuthError::Internal(format!("Account {} has no user", account.id)))?;
            info!("Repeat {} sign-in for user {}", identity.provider, user.id);
            return Ok(user.into());
        }

        let email = identity
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|email| !email.is_empty());

        let existing = match &email {
            Some(email) => self.store.find_user_by_email(email).await?,
            None => None,
        };

        let Some(user) = existing else {
            return self.create_oauth_user(identity, email).await;
        };

        let accounts = self.store.list_accounts(user.id).await?;

        if accounts.iter().any(|a| {
            a.provider == identity.provider && a.provider_account_id == identity.provider_account_id
        }) {
            return Ok(user.into());
        }

        if accounts.iter().any(|a| a.provider == identity.provider) {
            warn!(
                "User {} already has a different {} account linked",
                user.id, identity.provider
            );
            return Err(AuthError::AccountConflict(identity.provider));
        }

        self.store
            .create_account(user.id, &identity.new_account())
            .await
            .map_err(AuthError::LinkingFailed)?;

        info!("Linked {} account to user {}", identity.provider, user.id);
        Ok(user.into())
    }

    async fn create_oauth_user(
        &self,
        identity: &OAuthIdentity,
        email: Option<String>,
    ) -> Result<PublicUser, AuthError> {
        let new_user = NewUser {
            id: Uuid::new_v4(),
            email,
            name: identity.name.clone(),
            image: identity.image.clone(),
            password_hash: None,
        };

        let (user, _) = self
            .store
            .create_user_with_account(&new_user, &identity.new_account())
            .await?;

        info!("Created user {} from {} sign-in", user.id, identity.provider);
        Ok(user.into())
    }

    /// Look up the public identity behind a session
    pub async fn find_identity(&self, id: Uuid) -> Result<Option<PublicUser>, AuthError> {
        Ok(self.store.find_user_by_id(id).await?.map(Into::into))
    }

    pub async fn health_check(&self) -> Result<bool, AuthError> {
        Ok(self.store.health_check().await?)
    }
}
