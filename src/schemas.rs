use axum::{http::StatusCode, response::Json};
use compute::error::ComputeError;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::error;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: String,
}

/// API response wrapper
#[derive(Serialize, serde::Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, serde::Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            success: false,
        }
    }
}

/// Map a compute error to the HTTP error contract: validation problems are
/// 4xx with the message, missing records 404, and everything else a 500
/// with minimal detail. The order path is the exception: its transaction
/// failures surface the underlying cause.
pub fn compute_error_response(err: ComputeError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        ComputeError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(message, "VALIDATION_ERROR")),
        ),
        ComputeError::NotFound(message) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(message, "NOT_FOUND")),
        ),
        ComputeError::Transaction(message) => {
            error!("Transaction failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(message, "TRANSACTION_ERROR")),
            )
        }
        other => {
            error!("Unexpected compute error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            )
        }
    }
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Registers the bearer-token scheme the protected paths reference
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::admin_login,
        crate::handlers::supplies::create_supply,
        crate::handlers::supplies::get_supplies,
        crate::handlers::supplies::update_supply,
        crate::handlers::supplies::delete_supply,
        crate::handlers::recipes::create_recipe,
        crate::handlers::recipes::get_recipes,
        crate::handlers::recipes::update_recipe,
        crate::handlers::recipes::delete_recipe,
        crate::handlers::cash_register::get_today_register,
        crate::handlers::cash_register::open_register,
        crate::handlers::cash_register::close_register,
        crate::handlers::cash_register::get_register_history,
        crate::handlers::incomes::post_income,
        crate::handlers::incomes::get_today_incomes,
        crate::handlers::incomes::post_expense,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_orders,
        crate::handlers::reports::get_report,
        crate::handlers::admin::get_users,
        crate::handlers::admin::delete_user,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            crate::auth::AuthTokens,
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AuthResponse,
            crate::handlers::auth::UserResponse,
            crate::handlers::supplies::CreateSupplyRequest,
            crate::handlers::supplies::SupplyResponse,
            crate::handlers::recipes::CreateRecipeRequest,
            crate::handlers::recipes::IngredientRequest,
            crate::handlers::recipes::RecipeResponse,
            crate::handlers::recipes::IngredientResponse,
            crate::handlers::cash_register::OpenRegisterRequest,
            crate::handlers::cash_register::RegisterResponse,
            crate::handlers::incomes::PostIncomeRequest,
            crate::handlers::incomes::PostExpenseRequest,
            crate::handlers::incomes::IncomeResponse,
            crate::handlers::incomes::ExpenseResponse,
            crate::handlers::orders::CreateOrderRequest,
            crate::handlers::orders::OrderResponse,
            crate::handlers::reports::ReportQuery,
            crate::handlers::admin::AdminUserResponse,
            common::FinanceReport,
            common::ReportRange,
            common::ReportTotals,
            common::LedgerEntryDto,
            common::DateRange,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and admin login"),
        (name = "supplies", description = "Supply (insumo) ledger"),
        (name = "recipes", description = "Recipe book"),
        (name = "caja", description = "Daily cash register workflow"),
        (name = "finanzas", description = "Income and expense ledger"),
        (name = "pedidos", description = "Customer orders"),
        (name = "reportes", description = "Finance reports"),
        (name = "admin", description = "Tenant administration"),
    ),
    info(
        title = "Obrador API",
        description = "Bakery back-office API: supplies, recipes, orders, daily cash register and finance reports",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
