use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use chrono::Local;
use compute::register;
use model::entities::{
    expense_entry,
    income_entry::{self, PaymentMethod},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use crate::auth::Claims;
use crate::schemas::{compute_error_response, ApiResponse, AppState, ErrorResponse};

/// Request body for recording an income (ingreso)
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostIncomeRequest {
    /// Amount in currency units; the fractional part is discarded
    pub amount: f64,
    pub description: String,
    /// "CASH", "CARD" or "TRANSFER"
    pub payment_method: String,
}

/// Request body for recording an expense (egreso)
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostExpenseRequest {
    /// Amount in currency units; the fractional part is discarded
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
}

/// Income entry response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeResponse {
    pub id: i32,
    pub amount: i64,
    pub description: String,
    pub payment_method: String,
    pub date: chrono::NaiveDateTime,
}

impl From<income_entry::Model> for IncomeResponse {
    fn from(model: income_entry::Model) -> Self {
        Self {
            id: model.id,
            amount: model.amount,
            description: model.description,
            payment_method: match model.payment_method {
                PaymentMethod::Cash => "CASH".to_string(),
                PaymentMethod::Card => "CARD".to_string(),
                PaymentMethod::Transfer => "TRANSFER".to_string(),
            },
            date: model.date,
        }
    }
}

/// Expense entry response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    pub id: i32,
    pub amount: i64,
    pub description: String,
    pub category: Option<String>,
    pub date: chrono::NaiveDateTime,
}

impl From<expense_entry::Model> for ExpenseResponse {
    fn from(model: expense_entry::Model) -> Self {
        Self {
            id: model.id,
            amount: model.amount,
            description: model.description,
            category: model.category,
            date: model.date,
        }
    }
}

fn parse_method(method: &str) -> Result<PaymentMethod, (StatusCode, Json<ErrorResponse>)> {
    match method {
        "CASH" => Ok(PaymentMethod::Cash),
        "CARD" => Ok(PaymentMethod::Card),
        "TRANSFER" => Ok(PaymentMethod::Transfer),
        other => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                format!("unknown payment method '{other}', expected CASH, CARD or TRANSFER"),
                "VALIDATION_ERROR",
            )),
        )),
    }
}

/// Record an income. With an open register the amount is folded into its
/// totals; without one the entry is still recorded.
#[utoipa::path(
    post,
    path = "/finanzas/ingreso",
    tag = "finanzas",
    request_body = PostIncomeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Income recorded", body = ApiResponse<IncomeResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn post_income(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<PostIncomeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<IncomeResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let method = parse_method(&request.payment_method)?;
    debug!(amount = request.amount, "Recording income");

    let entry = register::post_income(
        &state.db,
        claims.user_id,
        request.amount,
        request.description,
        method,
    )
    .await
    .map_err(compute_error_response)?;

    info!(entry_id = entry.id, "Income recorded");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            IncomeResponse::from(entry),
            "Income recorded successfully",
        )),
    ))
}

/// List today's income entries, newest first
#[utoipa::path(
    get,
    path = "/finanzas/movimientos/hoy",
    tag = "finanzas",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Today's incomes", body = ApiResponse<Vec<IncomeResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn get_today_incomes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<IncomeResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let midnight = Local::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
        })?;

    let entries = income_entry::Entity::find()
        .filter(income_entry::Column::UserId.eq(claims.user_id))
        .filter(income_entry::Column::Date.gte(midnight))
        .order_by_desc(income_entry::Column::Date)
        .order_by_desc(income_entry::Column::Id)
        .all(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to fetch today's incomes: {}", db_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
        })?;

    let response: Vec<IncomeResponse> = entries.into_iter().map(IncomeResponse::from).collect();
    Ok(Json(ApiResponse::new(
        response,
        "Today's incomes retrieved successfully",
    )))
}

/// Record an expense. Expenses never touch the register totals; they only
/// show up in the finance reports.
#[utoipa::path(
    post,
    path = "/finanzas/egreso",
    tag = "finanzas",
    request_body = PostExpenseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Expense recorded", body = ApiResponse<ExpenseResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn post_expense(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<PostExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let new_entry = expense_entry::ActiveModel {
        user_id: Set(claims.user_id),
        amount: Set(request.amount as i64),
        description: Set(request.description),
        category: Set(request.category),
        date: Set(Local::now().naive_local()),
        ..Default::default()
    };

    match new_entry.insert(&state.db).await {
        Ok(entry) => {
            info!(entry_id = entry.id, "Expense recorded");
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::new(
                    ExpenseResponse::from(entry),
                    "Expense recorded successfully",
                )),
            ))
        }
        Err(db_error) => {
            error!("Failed to record expense: {}", db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            ))
        }
    }
}
