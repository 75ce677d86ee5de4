//! Authentication service models

pub mod account;
pub mod user;

// Re-export for convenience
pub use account::{Account, NewAccount, OAuthIdentity, OAuthTokens, Provider};
pub use user::{LoginCredentials, NewUser, PublicUser, SignupRequest, User};
