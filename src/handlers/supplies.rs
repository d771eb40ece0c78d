use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use compute::supply::{self, SupplyInput};
use model::entities::supply::{self as supply_entity, SupplyUnit};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::auth::Claims;
use crate::schemas::{compute_error_response, ApiResponse, AppState, ErrorResponse};

/// Request body for creating or fully replacing a supply
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplyRequest {
    /// Supply name, e.g. "Harina"
    pub name: String,
    /// Presentation label, e.g. "bulto x 50kg"
    pub presentation: String,
    /// Quantity purchased, in the given unit
    pub purchase_quantity: f64,
    /// Purchase unit: "kg", "g" or "unit"
    pub unit: String,
    /// Purchase cost in currency units
    pub purchase_value: i64,
}

/// Supply response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplyResponse {
    pub id: i32,
    pub name: String,
    pub presentation: String,
    pub purchase_quantity: f64,
    pub unit: String,
    pub purchase_value: i64,
    pub stock_grams: f64,
    pub cost_per_gram: f64,
    pub created_at: chrono::NaiveDateTime,
}

impl From<supply_entity::Model> for SupplyResponse {
    fn from(model: supply_entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            presentation: model.presentation,
            purchase_quantity: model.purchase_quantity.to_f64().unwrap_or(0.0),
            unit: match model.unit {
                SupplyUnit::Kilogram => "kg".to_string(),
                SupplyUnit::Gram => "g".to_string(),
                SupplyUnit::Unit => "unit".to_string(),
            },
            purchase_value: model.purchase_value,
            stock_grams: model.stock_grams.to_f64().unwrap_or(0.0),
            cost_per_gram: model.cost_per_gram.to_f64().unwrap_or(0.0),
            created_at: model.created_at,
        }
    }
}

fn parse_request(request: CreateSupplyRequest) -> Result<SupplyInput, (StatusCode, Json<ErrorResponse>)> {
    let unit = match request.unit.as_str() {
        "kg" => SupplyUnit::Kilogram,
        "g" => SupplyUnit::Gram,
        "unit" => SupplyUnit::Unit,
        other => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    format!("unknown unit '{other}', expected kg, g or unit"),
                    "VALIDATION_ERROR",
                )),
            ))
        }
    };
    let purchase_quantity = Decimal::from_f64(request.purchase_quantity).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "purchase quantity is not a finite number",
                "VALIDATION_ERROR",
            )),
        )
    })?;

    Ok(SupplyInput {
        name: request.name,
        presentation: request.presentation,
        purchase_quantity,
        unit,
        purchase_value: request.purchase_value,
    })
}

/// Register a supply purchase
#[utoipa::path(
    post,
    path = "/insumos",
    tag = "supplies",
    request_body = CreateSupplyRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Supply created", body = ApiResponse<SupplyResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn create_supply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateSupplyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SupplyResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Creating supply: {}", request.name);
    let input = parse_request(request)?;

    let created = supply::create(&state.db, claims.user_id, input)
        .await
        .map_err(compute_error_response)?;

    info!(supply_id = created.id, "Supply created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            SupplyResponse::from(created),
            "Supply created successfully",
        )),
    ))
}

/// List the user's supplies, newest first
#[utoipa::path(
    get,
    path = "/insumos",
    tag = "supplies",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Supplies retrieved", body = ApiResponse<Vec<SupplyResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn get_supplies(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<SupplyResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let supplies = supply::list(&state.db, claims.user_id)
        .await
        .map_err(compute_error_response)?;

    let response: Vec<SupplyResponse> = supplies.into_iter().map(SupplyResponse::from).collect();
    Ok(Json(ApiResponse::new(
        response,
        "Supplies retrieved successfully",
    )))
}

/// Fully replace a supply; stock and cost figures are recomputed
#[utoipa::path(
    put,
    path = "/insumos/{id}",
    tag = "supplies",
    request_body = CreateSupplyRequest,
    params(("id" = i32, Path, description = "Supply ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Supply updated", body = ApiResponse<SupplyResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Supply not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn update_supply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(request): Json<CreateSupplyRequest>,
) -> Result<Json<ApiResponse<SupplyResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let input = parse_request(request)?;

    let updated = supply::update(&state.db, id, input)
        .await
        .map_err(compute_error_response)?;

    info!(supply_id = updated.id, "Supply updated");
    Ok(Json(ApiResponse::new(
        SupplyResponse::from(updated),
        "Supply updated successfully",
    )))
}

/// Delete a supply
#[utoipa::path(
    delete,
    path = "/insumos/{id}",
    tag = "supplies",
    params(("id" = i32, Path, description = "Supply ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Supply deleted"),
        (status = 404, description = "Supply not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn delete_supply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    supply::delete(&state.db, id)
        .await
        .map_err(compute_error_response)?;

    info!(supply_id = id, "Supply deleted");
    Ok(StatusCode::NO_CONTENT)
}
