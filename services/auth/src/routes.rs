//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::{TypedHeader, extract::WithRejection, headers::Cookie};
use common::{
    jwt::{Claims, TokenSubject, TokenType, now_secs},
    response::ApiResponse,
};
use oauth2::PkceCodeVerifier;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::AuthError,
    middleware::auth_middleware,
    models::{LoginCredentials, PublicUser, SignupRequest},
    oauth::{OAUTH_STATE_TTL, OAuthState},
};

const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Response for token generation
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_expires_in: u64,
    pub user: PublicUser,
}

/// Request for token refresh
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response for token refresh
#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Query string GitHub appends to the callback URL; `error` replaces
/// `code` when the user declines
#[derive(Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

type JsonBody<T> = WithRejection<Json<T>, AuthError>;

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/github", get(github_authorize))
        .route("/auth/github/callback", get(github_callback))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.auth_service.health_check().await.unwrap_or(false);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(serde_json::json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "service": "auth-service"
        })),
    )
}

/// Credentials signup endpoint
pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Signup request");

    let user = state.auth_service.signup(&payload).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// Credentials login endpoint
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<LoginCredentials>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Login attempt");

    let user = state
        .auth_service
        .authenticate_credentials(&payload.email, &payload.password)
        .await?;

    let response = issue_tokens(&state, user)?;

    Ok((StatusCode::OK, Json(ApiResponse::ok(response))))
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Token refresh request");

    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    if claims.token_type != TokenType::Refresh {
        return Err(AuthError::Unauthorized);
    }

    // The user may have been removed since the token was issued
    let user = state
        .auth_service
        .find_identity(claims.sub)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    let access_token = state
        .jwt_service
        .generate_access_token(&subject(&user))
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::Internal(e.to_string())
        })?;

    let response = RefreshTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    };

    Ok((StatusCode::OK, Json(ApiResponse::ok(response))))
}

/// Current identity behind an access token
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state
        .auth_service
        .find_identity(claims.sub)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    Ok(Json(ApiResponse::ok(user)))
}

/// Start the GitHub authorization code flow
pub async fn github_authorize(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AuthError> {
    let client = state
        .oauth_client
        .as_ref()
        .ok_or(AuthError::OAuthNotConfigured)?;

    let (auth_url, csrf_token, pkce_verifier) = client.generate_auth_url();

    let now = now_secs().map_err(|e| AuthError::Internal(e.to_string()))?;
    let pending = OAuthState {
        csrf_token: csrf_token.secret().clone(),
        pkce_verifier: pkce_verifier.secret().clone(),
        exp: now + OAUTH_STATE_TTL,
    };
    let cookie_value = state
        .jwt_service
        .encode_claims(&pending)
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    let cookie = format!(
        "{}={}; Path=/auth/github; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
        OAUTH_STATE_COOKIE, cookie_value, OAUTH_STATE_TTL
    );

    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, auth_url), (header::SET_COOKIE, cookie)],
    ))
}

/// Finish the GitHub flow: verify state, exchange the code, reconcile
pub async fn github_callback(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
    WithRejection(Query(query), _): WithRejection<Query<OAuthCallbackQuery>, AuthError>,
) -> Result<impl IntoResponse, AuthError> {
    let client = state
        .oauth_client
        .as_ref()
        .ok_or(AuthError::OAuthNotConfigured)?;

    if let Some(reason) = query.error {
        warn!("GitHub sign-in declined: {}", reason);
        return Err(AuthError::Unauthorized);
    }
    let code = query
        .code
        .ok_or_else(|| AuthError::Validation("Missing authorization code".to_string()))?;

    let pending: OAuthState = cookies
        .as_ref()
        .and_then(|TypedHeader(cookies)| cookies.get(OAUTH_STATE_COOKIE))
        .and_then(|value| state.jwt_service.decode_claims::<OAuthState>(value).ok())
        .ok_or_else(|| {
            warn!("GitHub callback without a valid state cookie");
            AuthError::Unauthorized
        })?;

    if query.state.as_deref() != Some(pending.csrf_token.as_str()) {
        warn!("GitHub callback state mismatch");
        return Err(AuthError::Unauthorized);
    }

    let token = client
        .exchange_code(code, PkceCodeVerifier::new(pending.pkce_verifier))
        .await
        .map_err(|e| AuthError::OAuth(e.to_string()))?;

    let identity = client
        .fetch_identity(&token)
        .await
        .map_err(|e| AuthError::OAuth(e.to_string()))?;

    let user = state.auth_service.reconcile_oauth(&identity).await?;
    let response = issue_tokens(&state, user)?;

    let clear_cookie = format!(
        "{}=; Path=/auth/github; Max-Age=0; HttpOnly; Secure; SameSite=Lax",
        OAUTH_STATE_COOKIE
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_cookie)],
        Json(ApiResponse::ok(response)),
    ))
}

fn subject(user: &PublicUser) -> TokenSubject<'_> {
    TokenSubject {
        id: user.id,
        email: user.email.as_deref(),
        name: user.name.as_deref(),
    }
}

/// Generate the access/refresh pair for an authenticated user
fn issue_tokens(state: &AppState, user: PublicUser) -> Result<TokenResponse, AuthError> {
    let access_token = state
        .jwt_service
        .generate_access_token(&subject(&user))
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::Internal(e.to_string())
        })?;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(&subject(&user))
        .map_err(|e| {
            error!("Failed to generate refresh token: {}", e);
            AuthError::Internal(e.to_string())
        })?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        refresh_expires_in: state.jwt_service.refresh_token_expiry(),
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        oauth::{OAuthClient, OAuthConfig},
        repositories::memory::MemoryIdentityStore,
        service::AuthService,
    };
    use axum::{
        body::{Body, to_bytes},
        http::Request,
        response::Response,
    };
    use common::jwt::{JwtConfig, JwtService};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_state(oauth_client: Option<OAuthClient>) -> AppState {
        AppState {
            auth_service: AuthService::new(Arc::new(MemoryIdentityStore::new())),
            jwt_service: JwtService::new(JwtConfig {
                secret: "router-test-secret-with-enough-bytes".to_string(),
                access_token_expiry: 900,
                refresh_token_expiry: 3600,
            }),
            oauth_client,
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn signup_and_login(app: &Router) -> Value {
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/signup",
                json!({"name": "Ada", "email": "ada@example.com", "password": "hunter22"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "ada@example.com", "password": "hunter22"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    #[tokio::test]
    async fn signup_login_and_me() {
        let app = create_router(app_state(None));

        let login = signup_and_login(&app).await;
        assert_eq!(login["success"], true);
        assert_eq!(login["data"]["user"]["email"], "ada@example.com");
        assert!(login["data"]["user"].get("password_hash").is_none());
        assert_eq!(login["data"]["expires_in"], 900);
        assert_eq!(login["data"]["refresh_expires_in"], 3600);

        let token = login["data"]["access_token"].as_str().unwrap();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;
        assert_eq!(me["data"]["name"], "Ada");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = create_router(app_state(None));
        signup_and_login(&app).await;

        let response = app
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "ada@example.com", "password": "nope-nope"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({"success": false, "error": "Invalid email or password"})
        );
    }

    #[tokio::test]
    async fn refresh_issues_new_access_token() {
        let app = create_router(app_state(None));
        let login = signup_and_login(&app).await;

        let refresh = login["data"]["refresh_token"].as_str().unwrap();
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/refresh",
                json!({ "refresh_token": refresh }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // An access token is not a refresh token
        let access = login["data"]["access_token"].as_str().unwrap();
        let response = app
            .oneshot(post_json("/auth/refresh", json!({ "refresh_token": access })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_requires_token() {
        let app = create_router(app_state(None));

        let response = app
            .oneshot(Request::builder().uri("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn github_disabled_without_configuration() {
        let app = create_router(app_state(None));

        let response = app
            .oneshot(Request::builder().uri("/auth/github").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn github_client() -> OAuthClient {
        OAuthClient::new_github(&OAuthConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_url: "http://localhost:3000/auth/github/callback".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn malformed_bodies_are_validation_errors() {
        let app = create_router(app_state(None));

        for uri in ["/auth/login", "/auth/signup", "/auth/refresh"] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri(uri)
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from("{not json"))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body_json(response).await["success"], false);
        }

        let response = app
            .oneshot(post_json("/auth/login", json!({"email": 5, "password": "x"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn github_callback_handles_declined_and_missing_code() {
        let app = create_router(app_state(Some(github_client())));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/github/callback?error=access_denied&state=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "error": "Unauthorized"})
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/github/callback?state=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn github_authorize_redirects_with_state_cookie() {
        let state = app_state(Some(github_client()));
        let jwt = state.jwt_service.clone();
        let app = create_router(state);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/auth/github").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://github.com/login/oauth/authorize"));

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let value = cookie
            .strip_prefix("oauth_state=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        let pending: OAuthState = jwt.decode_claims(value).unwrap();
        assert!(location.contains(&format!("state={}", pending.csrf_token)));

        // A callback whose state does not match the cookie is rejected
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/github/callback?code=abc&state=forged")
                    .header(header::COOKIE, format!("oauth_state={}", value))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
