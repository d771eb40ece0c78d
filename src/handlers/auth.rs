use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Local;
use model::entities::user::{self, UserRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{hash_password, issue_tokens, role_str, verify_password, AuthTokens};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for registering a new account
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub name: String,
    pub surname: String,
    pub company_name: String,
    pub phone: Option<String>,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account (never exposes the password hash)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub company_name: String,
    pub phone: Option<String>,
    pub role: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            surname: model.surname,
            company_name: model.company_name,
            phone: model.phone,
            role: role_str(model.role).to_string(),
        }
    }
}

/// Successful authentication: the account plus a fresh token pair
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: AuthTokens,
}

fn token_failure() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Failed to issue tokens", "TOKEN_ERROR")),
    )
}

fn invalid_credentials() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(
            "Invalid email or password",
            "INVALID_CREDENTIALS",
        )),
    )
}

/// Register a new bakery account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid email or password shape", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<RegisterRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Registering new account");

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(request.email.clone()))
        .one(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to look up email: {}", db_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
        })?;

    if existing.is_some() {
        warn!("Registration attempt with an email already in use");
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                "Email is already registered",
                "EMAIL_IN_USE",
            )),
        ));
    }

    let password_hash = hash_password(&request.password).map_err(|err| {
        error!("Password hashing failed: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
        )
    })?;

    let new_user = user::ActiveModel {
        email: Set(request.email),
        password_hash: Set(password_hash),
        name: Set(request.name),
        surname: Set(request.surname),
        company_name: Set(request.company_name),
        phone: Set(request.phone),
        role: Set(UserRole::User),
        created_at: Set(Local::now().naive_local()),
        ..Default::default()
    };

    match new_user.insert(&state.db).await {
        Ok(user_model) => {
            info!(user_id = user_model.id, "Account registered");
            let tokens =
                issue_tokens(&state.jwt_secret, &user_model).map_err(|_| token_failure())?;
            let response = ApiResponse::new(
                AuthResponse {
                    user: UserResponse::from(user_model),
                    tokens,
                },
                "Account registered successfully",
            );
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create account: {}", db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            ))
        }
    }
}

async fn authenticate(
    state: &AppState,
    request: LoginRequest,
) -> Result<user::Model, (StatusCode, Json<ErrorResponse>)> {
    let found = user::Entity::find()
        .filter(user::Column::Email.eq(request.email.clone()))
        .one(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to look up user: {}", db_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
        })?;

    let Some(user_model) = found else {
        // Same response as a bad password so the endpoint does not leak
        // which emails exist.
        debug!("Login attempt for unknown email");
        return Err(invalid_credentials());
    };

    if !verify_password(&request.password, &user_model.password_hash) {
        debug!(user_id = user_model.id, "Login attempt with bad password");
        return Err(invalid_credentials());
    }

    Ok(user_model)
}

/// Log into a bakery account
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let user_model = authenticate(&state, request).await?;

    let tokens = issue_tokens(&state.jwt_secret, &user_model).map_err(|_| token_failure())?;
    info!(user_id = user_model.id, "User logged in");
    Ok(Json(ApiResponse::new(
        AuthResponse {
            user: UserResponse::from(user_model),
            tokens,
        },
        "Login successful",
    )))
}

/// Log into the admin panel. Only ADMIN accounts pass.
#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Admin login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account is not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let user_model = authenticate(&state, request).await?;

    if user_model.role != UserRole::Admin {
        warn!(user_id = user_model.id, "Non-admin attempted admin login");
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Admin access required", "FORBIDDEN")),
        ));
    }

    let tokens = issue_tokens(&state.jwt_secret, &user_model).map_err(|_| token_failure())?;
    info!(user_id = user_model.id, "Admin logged in");
    Ok(Json(ApiResponse::new(
        AuthResponse {
            user: UserResponse::from(user_model),
            tokens,
        },
        "Admin login successful",
    )))
}
