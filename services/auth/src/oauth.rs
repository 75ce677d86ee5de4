//! OAuth2 integration for the GitHub provider

use anyhow::Result;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
    basic::{BasicClient, BasicTokenResponse},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{OAuthIdentity, OAuthTokens, Provider};

const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_API_URL: &str = "https://api.github.com";

/// Lifetime of a pending authorization, in seconds
pub const OAUTH_STATE_TTL: u64 = 600;

/// OAuth2 configuration for GitHub
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl OAuthConfig {
    /// Create the GitHub configuration from environment variables
    ///
    /// Returns `None` when `GITHUB_CLIENT_ID` is unset, which disables
    /// GitHub sign-in.
    ///
    /// # Environment Variables
    /// - `GITHUB_CLIENT_ID`: OAuth app client id
    /// - `GITHUB_CLIENT_SECRET`: OAuth app client secret (required with the id)
    /// - `GITHUB_REDIRECT_URL`: Callback URL (default: "http://localhost:3000/auth/github/callback")
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(client_id) = std::env::var("GITHUB_CLIENT_ID") else {
            return Ok(None);
        };

        let client_secret = std::env::var("GITHUB_CLIENT_SECRET")
            .map_err(|_| anyhow::anyhow!("GITHUB_CLIENT_SECRET environment variable not set"))?;

        let redirect_url = std::env::var("GITHUB_REDIRECT_URL")
            .unwrap_or_else(|_| "http://localhost:3000/auth/github/callback".to_string());

        Ok(Some(OAuthConfig {
            client_id,
            client_secret,
            redirect_url,
        }))
    }
}

/// Pending authorization carried in a signed cookie between the redirect
/// and the callback
#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
    pub exp: u64,
}

/// OAuth2 client wrapper
#[derive(Clone)]
pub struct OAuthClient {
    client: BasicClient,
    http: reqwest::Client,
    api_url: String,
}

impl OAuthClient {
    /// Create a new OAuth2 client for GitHub
    pub fn new_github(config: &OAuthConfig) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(GITHUB_AUTH_URL.to_string())?,
            Some(TokenUrl::new(GITHUB_TOKEN_URL.to_string())?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone())?);

        let http = reqwest::Client::builder()
            .user_agent(concat!("forum-auth/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            http,
            api_url: GITHUB_API_URL.to_string(),
        })
    }

    /// Generate authorization URL with PKCE
    pub fn generate_auth_url(&self) -> (String, CsrfToken, PkceCodeVerifier) {
        info!("Generating authorization URL for {}", Provider::Github);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("read:user".to_string()))
            .add_scope(Scope::new("user:email".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    /// Exchange authorization code for access token
    pub async fn exchange_code(
        &self,
        code: String,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<BasicTokenResponse> {
        info!("Exchanging authorization code for {}", Provider::Github);

        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(oauth2::reqwest::async_http_client)
            .await?;

        Ok(token_response)
    }

    /// Resolve the GitHub identity behind an access token
    pub async fn fetch_identity(&self, token: &BasicTokenResponse) -> Result<OAuthIdentity> {
        let access_token = token.access_token().secret();

        let user: GithubUser = self
            .http
            .get(format!("{}/user", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = match user.email {
            Some(email) => Some(email),
            None => self.fetch_primary_email(access_token).await?,
        };

        Ok(OAuthIdentity {
            provider: Provider::Github,
            provider_account_id: user.id.to_string(),
            email,
            name: user.name.or(Some(user.login)),
            image: user.avatar_url,
            tokens: tokens_from_response(token),
        })
    }

    /// Private profile emails are only visible through `/user/emails`
    async fn fetch_primary_email(&self, access_token: &str) -> Result<Option<String>> {
        let emails: Vec<GithubEmail> = self
            .http
            .get(format!("{}/user/emails", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(primary_verified_email(emails))
    }
}

fn tokens_from_response(token: &BasicTokenResponse) -> OAuthTokens {
    let expires_at = token
        .expires_in()
        .and_then(|ttl| {
            common::jwt::now_secs()
                .ok()
                .map(|now| now + ttl.as_secs())
        })
        .and_then(|at| i64::try_from(at).ok());

    let scope = token.scopes().map(|scopes| {
        scopes
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    });

    OAuthTokens {
        access_token: Some(token.access_token().secret().clone()),
        refresh_token: token.refresh_token().map(|t| t.secret().clone()),
        token_type: Some(token.token_type().as_ref().to_string()),
        scope,
        expires_at,
    }
}

fn primary_verified_email(emails: Vec<GithubEmail>) -> Option<String> {
    emails
        .into_iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email)
}

/// GitHub user profile response
#[derive(Debug, Deserialize)]
struct GithubUser {
    id: u64,
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

/// Entry of the GitHub `/user/emails` response
#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}
