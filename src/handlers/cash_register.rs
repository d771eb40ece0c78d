use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use compute::register;
use model::entities::cash_register::{self, RegisterStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::auth::Claims;
use crate::schemas::{compute_error_response, ApiResponse, AppState, ErrorResponse};

/// Request body for opening the daily register
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenRegisterRequest {
    /// Opening float in currency units
    pub initial_amount: i64,
}

/// Daily register response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: i32,
    pub date: chrono::NaiveDateTime,
    pub initial_amount: i64,
    pub cash_total: i64,
    pub card_total: i64,
    pub transfer_total: i64,
    pub running_total: i64,
    pub total_sales: i64,
    pub net_profit: i64,
    pub status: String,
}

impl From<cash_register::Model> for RegisterResponse {
    fn from(model: cash_register::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            initial_amount: model.initial_amount,
            cash_total: model.cash_total,
            card_total: model.card_total,
            transfer_total: model.transfer_total,
            running_total: model.running_total,
            total_sales: model.total_sales,
            net_profit: model.net_profit,
            status: match model.status {
                RegisterStatus::Open => "OPEN".to_string(),
                RegisterStatus::Closed => "CLOSED".to_string(),
            },
        }
    }
}

/// Get today's register, open or closed. No register yet today is a
/// routine state for the dashboard, so it answers 200 with null data
/// rather than an error.
#[utoipa::path(
    get,
    path = "/caja/hoy",
    tag = "caja",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Today's register; data is null when none was opened yet", body = ApiResponse<RegisterResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn get_today_register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Option<RegisterResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let register = register::get_today(&state.db, claims.user_id)
        .await
        .map_err(compute_error_response)?;

    match register {
        Some(register) => Ok(Json(ApiResponse::new(
            Some(RegisterResponse::from(register)),
            "Register retrieved successfully",
        ))),
        None => {
            debug!("No register opened today");
            Ok(Json(ApiResponse::new(None, "No register opened today")))
        }
    }
}

/// Open the daily register. Any stale OPEN register is force-closed first.
#[utoipa::path(
    post,
    path = "/caja/abrir",
    tag = "caja",
    request_body = OpenRegisterRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Register opened", body = ApiResponse<RegisterResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn open_register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<OpenRegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let opened = register::open(&state.db, claims.user_id, request.initial_amount)
        .await
        .map_err(compute_error_response)?;

    info!(register_id = opened.id, "Register opened");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            RegisterResponse::from(opened),
            "Register opened successfully",
        )),
    ))
}

/// Close the open register. Terminal for that register.
#[utoipa::path(
    post,
    path = "/caja/cerrar",
    tag = "caja",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Register closed", body = ApiResponse<RegisterResponse>),
        (status = 404, description = "No open register", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn close_register(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<RegisterResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let closed = register::close(&state.db, claims.user_id)
        .await
        .map_err(compute_error_response)?;

    info!(register_id = closed.id, "Register closed");
    Ok(Json(ApiResponse::new(
        RegisterResponse::from(closed),
        "Register closed successfully",
    )))
}

/// List all of the user's registers, newest first
#[utoipa::path(
    get,
    path = "/caja/historial",
    tag = "caja",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Register history", body = ApiResponse<Vec<RegisterResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn get_register_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<RegisterResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let registers = register::history(&state.db, claims.user_id)
        .await
        .map_err(compute_error_response)?;

    let response: Vec<RegisterResponse> =
        registers.into_iter().map(RegisterResponse::from).collect();
    Ok(Json(ApiResponse::new(
        response,
        "Register history retrieved successfully",
    )))
}
