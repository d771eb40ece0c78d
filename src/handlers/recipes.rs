use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use compute::recipe::{self, IngredientInput, RecipeWithIngredients};
use model::entities::recipe_ingredient;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::auth::Claims;
use crate::schemas::{compute_error_response, ApiResponse, AppState, ErrorResponse};

/// One submitted ingredient line
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequest {
    pub supply_id: i32,
    pub grams_required: f64,
}

/// Request body for creating or fully replacing a recipe
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub name: String,
    /// Units produced by one batch
    pub base_yield: i32,
    pub ingredients: Vec<IngredientRequest>,
}

/// One ingredient line as stored
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    pub id: i32,
    pub supply_id: i32,
    pub grams_required: f64,
}

impl From<recipe_ingredient::Model> for IngredientResponse {
    fn from(model: recipe_ingredient::Model) -> Self {
        Self {
            id: model.id,
            supply_id: model.supply_id,
            grams_required: model.grams_required.to_f64().unwrap_or(0.0),
        }
    }
}

/// Recipe response model with its ingredient lines
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: i32,
    pub name: String,
    pub base_yield: i32,
    pub created_at: chrono::NaiveDateTime,
    pub ingredients: Vec<IngredientResponse>,
}

impl From<RecipeWithIngredients> for RecipeResponse {
    fn from(value: RecipeWithIngredients) -> Self {
        Self {
            id: value.recipe.id,
            name: value.recipe.name,
            base_yield: value.recipe.base_yield,
            created_at: value.recipe.created_at,
            ingredients: value
                .ingredients
                .into_iter()
                .map(IngredientResponse::from)
                .collect(),
        }
    }
}

fn parse_ingredients(
    lines: Vec<IngredientRequest>,
) -> Result<Vec<IngredientInput>, (StatusCode, Json<ErrorResponse>)> {
    lines
        .into_iter()
        .map(|line| {
            let grams_required = Decimal::from_f64(line.grams_required).ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(
                        "gramsRequired is not a finite number",
                        "VALIDATION_ERROR",
                    )),
                )
            })?;
            Ok(IngredientInput {
                supply_id: line.supply_id,
                grams_required,
            })
        })
        .collect()
}

/// Create a recipe with its ingredient lines
#[utoipa::path(
    post,
    path = "/recetas",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Recipe created", body = ApiResponse<RecipeResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeResponse>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Creating recipe: {}", request.name);
    let ingredients = parse_ingredients(request.ingredients)?;

    let created = recipe::create(
        &state.db,
        claims.user_id,
        request.name,
        request.base_yield,
        ingredients,
    )
    .await
    .map_err(compute_error_response)?;

    info!(recipe_id = created.recipe.id, "Recipe created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            RecipeResponse::from(created),
            "Recipe created successfully",
        )),
    ))
}

/// List the user's recipes with their ingredients, newest first
#[utoipa::path(
    get,
    path = "/recetas",
    tag = "recipes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Recipes retrieved", body = ApiResponse<Vec<RecipeResponse>>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn get_recipes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<RecipeResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let recipes = recipe::list(&state.db, claims.user_id)
        .await
        .map_err(compute_error_response)?;

    let response: Vec<RecipeResponse> = recipes.into_iter().map(RecipeResponse::from).collect();
    Ok(Json(ApiResponse::new(
        response,
        "Recipes retrieved successfully",
    )))
}

/// Fully replace a recipe; the ingredient list is replaced wholesale
#[utoipa::path(
    put,
    path = "/recetas/{id}",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    params(("id" = i32, Path, description = "Recipe ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Recipe updated", body = ApiResponse<RecipeResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims, request), fields(user_id = claims.user_id))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<Json<ApiResponse<RecipeResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let ingredients = parse_ingredients(request.ingredients)?;

    let updated = recipe::update(&state.db, id, request.name, request.base_yield, ingredients)
        .await
        .map_err(compute_error_response)?;

    info!(recipe_id = updated.recipe.id, "Recipe updated");
    Ok(Json(ApiResponse::new(
        RecipeResponse::from(updated),
        "Recipe updated successfully",
    )))
}

/// Delete a recipe; its ingredient lines cascade
#[utoipa::path(
    delete,
    path = "/recetas/{id}",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, claims), fields(user_id = claims.user_id))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i32>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    recipe::delete(&state.db, id)
        .await
        .map_err(compute_error_response)?;

    info!(recipe_id = id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
