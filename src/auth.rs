//! JWT authentication: token issuance, verification middleware and the
//! request-scoped claims handlers receive.
//!
//! The verified claims are attached to the request extensions so every
//! handler gets an explicit, typed user context instead of ambient state.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use model::entities::user::{self, UserRole};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::schemas::AppState;

/// Access-token lifetime.
const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
/// Refresh-token lifetime.
const REFRESH_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 7;

/// Claims carried by every issued token and attached to authenticated
/// requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id as a string.
    pub sub: String,
    pub user_id: i32,
    pub email: String,
    pub role: String,
    /// "access" or "refresh".
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "ADMIN"
    }
}

/// Access + refresh token pair returned by the auth endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET not set, using insecure default!");
        "insecure-development-secret-change-me".to_string()
    })
}

pub fn role_str(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "ADMIN",
        UserRole::User => "USER",
    }
}

fn encode_token(
    secret: &str,
    user: &user::Model,
    token_type: &str,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        user_id: user.id,
        email: user.email.clone(),
        role: role_str(user.role).to_string(),
        token_type: token_type.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Issue an access/refresh token pair for a user.
pub fn issue_tokens(
    secret: &str,
    user: &user::Model,
) -> Result<AuthTokens, jsonwebtoken::errors::Error> {
    Ok(AuthTokens {
        access_token: encode_token(secret, user, "access", ACCESS_TOKEN_TTL_SECS)?,
        refresh_token: encode_token(secret, user, "refresh", REFRESH_TOKEN_TTL_SECS)?,
    })
}

/// Bearer-token middleware for the protected routes. Decodes the token and
/// attaches the claims to the request extensions; handlers extract them
/// with `Extension<Claims>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| {
        debug!(%err, "Rejected bearer token");
        StatusCode::UNAUTHORIZED
    })?;

    if token_data.claims.token_type != "access" {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert(token_data.claims);
    Ok(next.run(request).await)
}

/// Password hashing with argon2.
pub fn hash_password(password: &str) -> Result<String, String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("Failed to hash password: {e}"))
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
