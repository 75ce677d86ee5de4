use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod error;
mod middleware;
mod models;
mod oauth;
mod password;
mod repositories;
mod routes;
mod service;
mod validation;

use common::{
    database,
    jwt::{JwtConfig, JwtService},
};
use tokio::net::TcpListener;

use crate::{
    config::ServerConfig,
    oauth::{OAuthClient, OAuthConfig},
    repositories::UserRepository,
    service::AuthService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub jwt_service: JwtService,
    pub oauth_client: Option<OAuthClient>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authentication service");

    let server_config = ServerConfig::from_env()?;

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    let oauth_client = match OAuthConfig::from_env()? {
        Some(config) => Some(OAuthClient::new_github(&config)?),
        None => {
            warn!("GITHUB_CLIENT_ID not set, GitHub sign-in disabled");
            None
        }
    };

    let auth_service = AuthService::new(Arc::new(UserRepository::new(pool)));

    let app_state = AppState {
        auth_service,
        jwt_service,
        oauth_client,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
