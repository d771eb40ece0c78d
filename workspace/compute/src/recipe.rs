//! Recipe book: named yields with fixed ingredient lists.
//!
//! Ingredient updates are full-replace by design: the existing lines are
//! deleted and recreated from the submitted list inside one transaction.
//! Omitted ingredients are dropped and re-ordering has no semantic effect.

use chrono::Local;
use model::entities::{recipe, recipe_ingredient};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

use crate::error::{ComputeError, Result};
use crate::validation::{
    ensure_decimal_digits, ensure_digits, MAX_BASE_YIELD_DIGITS, MAX_GRAMS_DIGITS,
};

/// One submitted ingredient line.
#[derive(Debug, Clone)]
pub struct IngredientInput {
    pub supply_id: i32,
    pub grams_required: Decimal,
}

/// A recipe with its ingredient lines, as returned by reads.
#[derive(Debug, Clone)]
pub struct RecipeWithIngredients {
    pub recipe: recipe::Model,
    pub ingredients: Vec<recipe_ingredient::Model>,
}

fn validate(base_yield: i32, ingredients: &[IngredientInput]) -> Result<()> {
    ensure_digits("baseYield", i64::from(base_yield), MAX_BASE_YIELD_DIGITS)?;
    for ingredient in ingredients {
        ensure_decimal_digits("gramsRequired", ingredient.grams_required, MAX_GRAMS_DIGITS)?;
    }
    Ok(())
}

async fn insert_lines<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    ingredients: &[IngredientInput],
) -> Result<Vec<recipe_ingredient::Model>> {
    let mut lines = Vec::with_capacity(ingredients.len());
    for ingredient in ingredients {
        let line = recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            supply_id: Set(ingredient.supply_id),
            grams_required: Set(ingredient.grams_required),
            ..Default::default()
        }
        .insert(db)
        .await?;
        lines.push(line);
    }
    Ok(lines)
}

/// Create a recipe and its ingredient lines in one transaction.
#[instrument(skip(db, ingredients), fields(num_ingredients = ingredients.len()))]
pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    name: String,
    base_yield: i32,
    ingredients: Vec<IngredientInput>,
) -> Result<RecipeWithIngredients> {
    validate(base_yield, &ingredients)?;

    let txn = db.begin().await?;

    let created = recipe::ActiveModel {
        user_id: Set(user_id),
        name: Set(name),
        base_yield: Set(base_yield),
        created_at: Set(Local::now().naive_local()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let lines = insert_lines(&txn, created.id, &ingredients).await?;
    txn.commit().await?;

    info!(recipe_id = created.id, "Recipe created");
    Ok(RecipeWithIngredients {
        recipe: created,
        ingredients: lines,
    })
}

/// Update a recipe. The ingredient list is replaced wholesale: delete all
/// existing lines, then recreate from the submitted list, in one
/// transaction.
#[instrument(skip(db, ingredients), fields(num_ingredients = ingredients.len()))]
pub async fn update(
    db: &DatabaseConnection,
    recipe_id: i32,
    name: String,
    base_yield: i32,
    ingredients: Vec<IngredientInput>,
) -> Result<RecipeWithIngredients> {
    validate(base_yield, &ingredients)?;

    let existing = recipe::Entity::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or_else(|| ComputeError::NotFound(format!("recipe {recipe_id} not found")))?;

    let txn = db.begin().await?;

    let mut active: recipe::ActiveModel = existing.into();
    active.name = Set(name);
    active.base_yield = Set(base_yield);
    let updated = active.update(&txn).await?;

    let deleted = recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    debug!(
        rows = deleted.rows_affected,
        "Replaced existing ingredient lines"
    );

    let lines = insert_lines(&txn, recipe_id, &ingredients).await?;
    txn.commit().await?;

    Ok(RecipeWithIngredients {
        recipe: updated,
        ingredients: lines,
    })
}

/// Delete by id; ingredient lines cascade. No ownership filter at this
/// layer (preserved behavior, see DESIGN.md).
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, recipe_id: i32) -> Result<()> {
    let result = recipe::Entity::delete_by_id(recipe_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ComputeError::NotFound(format!(
            "recipe {recipe_id} not found"
        )));
    }
    Ok(())
}

/// All recipes for a user with their ingredient lines, newest first.
#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, user_id: i32) -> Result<Vec<RecipeWithIngredients>> {
    let rows = recipe::Entity::find()
        .filter(recipe::Column::UserId.eq(user_id))
        .order_by_desc(recipe::Column::CreatedAt)
        .order_by_desc(recipe::Column::Id)
        .find_with_related(recipe_ingredient::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(recipe, ingredients)| RecipeWithIngredients {
            recipe,
            ingredients,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply::{self, SupplyInput};
    use crate::test_support::{insert_user, setup_db};
    use model::entities::supply::SupplyUnit;

    async fn seed_supply(db: &DatabaseConnection, user_id: i32, name: &str) -> i32 {
        supply::create(
            db,
            user_id,
            SupplyInput {
                name: name.to_string(),
                presentation: "kg".to_string(),
                purchase_quantity: Decimal::from(10),
                unit: SupplyUnit::Kilogram,
                purchase_value: 50000,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn create_persists_recipe_and_lines() {
        let db = setup_db().await;
        let user = insert_user(&db, "recipe@test.com").await;
        let flour = seed_supply(&db, user.id, "Harina").await;

        let created = create(
            &db,
            user.id,
            "Pan campesino".to_string(),
            12,
            vec![IngredientInput {
                supply_id: flour,
                grams_required: Decimal::from(6000),
            }],
        )
        .await
        .unwrap();

        assert_eq!(created.recipe.base_yield, 12);
        assert_eq!(created.ingredients.len(), 1);
        assert_eq!(created.ingredients[0].supply_id, flour);
    }

    #[tokio::test]
    async fn base_yield_digit_limit_enforced() {
        let db = setup_db().await;
        let user = insert_user(&db, "recipe2@test.com").await;

        // 5 digits accepted
        assert!(create(&db, user.id, "Ok".to_string(), 12345, vec![])
            .await
            .is_ok());
        // 6 digits rejected
        let err = create(&db, user.id, "Too big".to_string(), 123456, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::Validation(_)));
    }

    #[tokio::test]
    async fn ingredient_grams_digit_limit_enforced() {
        let db = setup_db().await;
        let user = insert_user(&db, "recipe3@test.com").await;
        let flour = seed_supply(&db, user.id, "Harina").await;

        let err = create(
            &db,
            user.id,
            "Pan".to_string(),
            10,
            vec![IngredientInput {
                supply_id: flour,
                grams_required: Decimal::from(10_000_000),
            }],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ComputeError::Validation(_)));
    }

    #[tokio::test]
    async fn update_replaces_all_lines() {
        let db = setup_db().await;
        let user = insert_user(&db, "recipe4@test.com").await;
        let flour = seed_supply(&db, user.id, "Harina").await;
        let butter = seed_supply(&db, user.id, "Mantequilla").await;

        let created = create(
            &db,
            user.id,
            "Croissant".to_string(),
            20,
            vec![
                IngredientInput {
                    supply_id: flour,
                    grams_required: Decimal::from(5000),
                },
                IngredientInput {
                    supply_id: butter,
                    grams_required: Decimal::from(2500),
                },
            ],
        )
        .await
        .unwrap();

        // Update omitting butter: the omitted line must be gone, not merged
        let updated = update(
            &db,
            created.recipe.id,
            "Croissant".to_string(),
            24,
            vec![IngredientInput {
                supply_id: flour,
                grams_required: Decimal::from(5500),
            }],
        )
        .await
        .unwrap();

        assert_eq!(updated.recipe.base_yield, 24);
        assert_eq!(updated.ingredients.len(), 1);
        assert_eq!(updated.ingredients[0].supply_id, flour);
        assert_eq!(updated.ingredients[0].grams_required, Decimal::from(5500));

        let all_lines = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(created.recipe.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(all_lines.len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_to_lines() {
        let db = setup_db().await;
        let user = insert_user(&db, "recipe5@test.com").await;
        let flour = seed_supply(&db, user.id, "Harina").await;

        let created = create(
            &db,
            user.id,
            "Pan".to_string(),
            10,
            vec![IngredientInput {
                supply_id: flour,
                grams_required: Decimal::from(1000),
            }],
        )
        .await
        .unwrap();

        delete(&db, created.recipe.id).await.unwrap();

        let lines = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(created.recipe.id))
            .all(&db)
            .await
            .unwrap();
        assert!(lines.is_empty());
    }
}
