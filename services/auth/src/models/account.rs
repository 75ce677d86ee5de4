//! Linked identity accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Identity providers an account can be linked through
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Credentials,
    Github,
}

impl Provider {
    /// Get the provider name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Credentials => "credentials",
            Provider::Github => "github",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credentials" => Ok(Provider::Credentials),
            "github" => Ok(Provider::Github),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// Tokens handed out by an OAuth provider during sign-in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    /// Unix timestamp (seconds)
    pub expires_at: Option<i64>,
}

/// Account entity: an external identity bound to exactly one user
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: Provider,
    pub provider_account_id: String,
    pub tokens: OAuthTokens,
    pub created_at: DateTime<Utc>,
}

/// New account creation payload
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub provider: Provider,
    pub provider_account_id: String,
    pub tokens: OAuthTokens,
}

/// A verified identity reported by an OAuth provider
#[derive(Debug, Clone)]
pub struct OAuthIdentity {
    pub provider: Provider,
    pub provider_account_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub tokens: OAuthTokens,
}

impl OAuthIdentity {
    pub fn new_account(&self) -> NewAccount {
        NewAccount {
            provider: self.provider,
            provider_account_id: self.provider_account_id.clone(),
            tokens: self.tokens.clone(),
        }
    }
}
