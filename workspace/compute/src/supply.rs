//! Supply ledger: purchase records and the derived stock/cost figures.

use chrono::Local;
use model::entities::supply::{self, SupplyUnit};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{ComputeError, Result};

/// Input for creating or fully replacing a supply record.
#[derive(Debug, Clone)]
pub struct SupplyInput {
    pub name: String,
    pub presentation: String,
    pub purchase_quantity: Decimal,
    pub unit: SupplyUnit,
    pub purchase_value: i64,
}

/// Stock in grams derived from the purchase figures: kilograms are scaled
/// by 1000, any other unit is taken as-is.
pub fn derive_stock_grams(unit: SupplyUnit, purchase_quantity: Decimal) -> Decimal {
    match unit {
        SupplyUnit::Kilogram => purchase_quantity * Decimal::from(1000),
        SupplyUnit::Gram | SupplyUnit::Unit => purchase_quantity,
    }
}

/// Cost per gram; zero when there is no stock to divide by.
pub fn derive_cost_per_gram(purchase_value: i64, stock_grams: Decimal) -> Decimal {
    if stock_grams.is_zero() {
        Decimal::ZERO
    } else {
        Decimal::from(purchase_value) / stock_grams
    }
}

fn validate_input(input: &SupplyInput) -> Result<()> {
    if input.purchase_quantity < Decimal::ZERO {
        return Err(ComputeError::Validation(
            "purchase quantity must be a non-negative number".to_string(),
        ));
    }
    if input.purchase_value < 0 {
        return Err(ComputeError::Validation(
            "purchase value must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// Create a supply, computing the derived stock and cost fields.
#[instrument(skip(db))]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    input: SupplyInput,
) -> Result<supply::Model> {
    validate_input(&input)?;

    let stock_grams = derive_stock_grams(input.unit, input.purchase_quantity);
    let cost_per_gram = derive_cost_per_gram(input.purchase_value, stock_grams);
    debug!(%stock_grams, %cost_per_gram, "Derived supply figures");

    let created = supply::ActiveModel {
        user_id: Set(user_id),
        name: Set(input.name),
        presentation: Set(input.presentation),
        purchase_quantity: Set(input.purchase_quantity),
        unit: Set(input.unit),
        purchase_value: Set(input.purchase_value),
        stock_grams: Set(stock_grams),
        cost_per_gram: Set(cost_per_gram),
        created_at: Set(Local::now().naive_local()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(supply_id = created.id, "Supply created");
    Ok(created)
}

/// All supplies for a user, newest first.
#[instrument(skip(db))]
pub async fn list<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<supply::Model>> {
    Ok(supply::Entity::find()
        .filter(supply::Column::UserId.eq(user_id))
        .order_by_desc(supply::Column::CreatedAt)
        .order_by_desc(supply::Column::Id)
        .all(db)
        .await?)
}

/// Full replace: every purchase field is overwritten and the derived stock
/// and cost figures are recomputed, as if the purchase were re-registered.
#[instrument(skip(db))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    supply_id: i32,
    input: SupplyInput,
) -> Result<supply::Model> {
    validate_input(&input)?;

    let existing = supply::Entity::find_by_id(supply_id)
        .one(db)
        .await?
        .ok_or_else(|| ComputeError::NotFound(format!("supply {supply_id} not found")))?;

    let stock_grams = derive_stock_grams(input.unit, input.purchase_quantity);
    let cost_per_gram = derive_cost_per_gram(input.purchase_value, stock_grams);

    let mut active: supply::ActiveModel = existing.into();
    active.name = Set(input.name);
    active.presentation = Set(input.presentation);
    active.purchase_quantity = Set(input.purchase_quantity);
    active.unit = Set(input.unit);
    active.purchase_value = Set(input.purchase_value);
    active.stock_grams = Set(stock_grams);
    active.cost_per_gram = Set(cost_per_gram);

    Ok(active.update(db).await?)
}

/// Delete by id. No ownership filter at this layer (preserved behavior of
/// the original endpoint, see DESIGN.md).
#[instrument(skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, supply_id: i32) -> Result<()> {
    let result = supply::Entity::delete_by_id(supply_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ComputeError::NotFound(format!(
            "supply {supply_id} not found"
        )));
    }
    Ok(())
}

/// Decrement a supply's stock by the consumed grams. No floor clamp: stock
/// may go negative, it is a costing figure rather than a hard limit.
#[instrument(skip(db))]
pub async fn decrement_stock<C: ConnectionTrait>(
    db: &C,
    supply_id: i32,
    grams: Decimal,
) -> Result<supply::Model> {
    let existing = supply::Entity::find_by_id(supply_id)
        .one(db)
        .await?
        .ok_or_else(|| ComputeError::NotFound(format!("supply {supply_id} not found")))?;

    let new_stock = existing.stock_grams - grams;
    if new_stock < Decimal::ZERO {
        warn!(supply_id, %new_stock, "Supply stock went negative");
    }

    let mut active: supply::ActiveModel = existing.into();
    active.stock_grams = Set(new_stock);
    Ok(active.update(db).await?)
}
