use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use compute::register::{self, NewOrder};
use model::entities::{order, recipe};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use crate::auth::Claims;
use crate::schemas::{compute_error_response, ApiResponse, AppState, ErrorResponse};

/// Request body for placing an order
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Optional customer name, at most 15 characters
    pub customer_name: Option<String>,
    /// Units ordered
    pub quantity: i32,
    /// Sale total; rounded to the nearest currency unit
    pub total_amount: f64,
    pub recipe_id: i32,
    /// Consumed-supplies payload, stored verbatim as the order's snapshot.
    /// Either a JSON array `[{"supplyId": 1, "grams": 500.0}, ...]` or that
    /// same array serialized as a string.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub ingredients_summary: Value,
}

/// Order response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub customer_name: Option<String>,
    pub quantity: i32,
    pub total_amount: i64,
    /// Null once the recipe has been deleted; the order itself survives
    pub recipe_id: Option<i32>,
    /// Name of the recipe the order was placed against, when it still exists
    pub recipe_name: Option<String>,
    pub ingredients_summary: String,
    pub date: chrono::NaiveDateTime,
}

impl OrderResponse {
    fn from_parts(model: order::Model, recipe: Option<recipe::Model>) -> Self {
        Self {
            id: model.id,
            customer_name: model.customer_name,
            quantity: model.quantity,
            total_amount: model.total_amount,
            recipe_id: model.recipe_id,
            recipe_name: recipe.map(|r| r.name),
            ingredients_summary: model.ingredients_snapshot,
            date: model.date,
        }
    }
}

/// Place an order. One atomic transaction: order row, synthetic income,
/// register totals and supply stock move together or not at all.
#[utoipa::path(
    post,
    path = "/pedidos",
    tag = "pedidos",
    request_body = CreateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Order transaction failed", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims, request), fields(user_id = claims.user_id, recipe_id = request.recipe_id))]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!(quantity = request.quantity, "Placing order");

    // Clients send the summary either as the array itself or as a JSON
    // string holding it. Unwrap the string form here; serializing it with
    // to_string() would double-encode it and the snapshot would no longer
    // parse as a list.
    let ingredients_summary = match request.ingredients_summary {
        Value::String(raw) => raw,
        other => other.to_string(),
    };

    let input = NewOrder {
        customer_name: request.customer_name,
        quantity: request.quantity,
        total_amount: request.total_amount,
        recipe_id: request.recipe_id,
        ingredients_summary,
    };

    let created = register::create_order(&state.db, claims.user_id, input)
        .await
        .map_err(compute_error_response)?;

    let recipe = match created.recipe_id {
        Some(recipe_id) => recipe::Entity::find_by_id(recipe_id)
            .one(&state.db)
            .await
            .map_err(|db_error| {
                error!("Failed to load order recipe: {}", db_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
                )
            })?,
        None => None,
    };

    info!(order_id = created.id, "Order placed");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            OrderResponse::from_parts(created, recipe),
            "Order placed successfully",
        )),
    ))
}

/// List the user's orders, newest first
#[utoipa::path(
    get,
    path = "/pedidos",
    tag = "pedidos",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<Vec<OrderResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn get_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let orders = order::Entity::find()
        .filter(order::Column::UserId.eq(claims.user_id))
        .order_by_desc(order::Column::Date)
        .order_by_desc(order::Column::Id)
        .find_also_related(recipe::Entity)
        .all(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to fetch orders: {}", db_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
        })?;

    let response: Vec<OrderResponse> = orders
        .into_iter()
        .map(|(order, recipe)| OrderResponse::from_parts(order, recipe))
        .collect();
    Ok(Json(ApiResponse::new(
        response,
        "Orders retrieved successfully",
    )))
}
