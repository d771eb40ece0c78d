use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{
    order, recipe, supply,
    user::{self, UserRole},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::{role_str, Claims};
use crate::handlers::supplies::SupplyResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Tenant account as seen from the admin panel: its supply list embedded,
/// plus counts of what else it owns
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub company_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: chrono::NaiveDateTime,
    pub supplies: Vec<SupplyResponse>,
    pub supply_count: u64,
    pub recipe_count: u64,
    pub order_count: u64,
}

fn require_admin(claims: &Claims) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if claims.is_admin() {
        Ok(())
    } else {
        warn!(user_id = claims.user_id, "Non-admin hit an admin endpoint");
        Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Admin access required", "FORBIDDEN")),
        ))
    }
}

fn internal_error(db_error: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    error!("Admin query failed: {}", db_error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
    )
}

/// List every tenant (non-admin) account with its supplies and entity
/// counts. Admin only.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users retrieved", body = ApiResponse<Vec<AdminUserResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn get_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<AdminUserResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    require_admin(&claims)?;

    let users = user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::User))
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    let mut response = Vec::with_capacity(users.len());
    for account in users {
        let supplies: Vec<SupplyResponse> = supply::Entity::find()
            .filter(supply::Column::UserId.eq(account.id))
            .order_by_desc(supply::Column::CreatedAt)
            .all(&state.db)
            .await
            .map_err(internal_error)?
            .into_iter()
            .map(SupplyResponse::from)
            .collect();
        let supply_count = supplies.len() as u64;
        let recipe_count = recipe::Entity::find()
            .filter(recipe::Column::UserId.eq(account.id))
            .count(&state.db)
            .await
            .map_err(internal_error)?;
        let order_count = order::Entity::find()
            .filter(order::Column::UserId.eq(account.id))
            .count(&state.db)
            .await
            .map_err(internal_error)?;

        response.push(AdminUserResponse {
            id: account.id,
            email: account.email,
            name: account.name,
            surname: account.surname,
            company_name: account.company_name,
            phone: account.phone,
            role: role_str(account.role).to_string(),
            created_at: account.created_at,
            supplies,
            supply_count,
            recipe_count,
            order_count,
        });
    }

    Ok(Json(ApiResponse::new(
        response,
        "Users retrieved successfully",
    )))
}

/// Delete a tenant account and everything it owns. Admin only.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "admin",
    params(("id" = i32, Path, description = "User ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    require_admin(&claims)?;

    match user::Entity::delete_by_id(id).exec(&state.db).await {
        Ok(result) if result.rows_affected == 0 => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("user {id} not found"),
                "NOT_FOUND",
            )),
        )),
        Ok(_) => {
            info!(deleted_user_id = id, "User deleted with all owned data");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(db_error) => {
            error!("Failed to delete user {}: {}", id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
            ))
        }
    }
}
