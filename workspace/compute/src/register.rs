//! Daily cash-register workflow: open, accumulate, close, and the atomic
//! multi-entity update performed when an order is placed.
//!
//! Order creation is the one place where several entities must move
//! together: the order row, a synthetic income entry, the open register's
//! running totals and the supply stock levels. The whole sequence runs
//! inside a single database transaction; a failure at any step rolls back
//! everything from that attempt.

use chrono::Local;
use model::entities::{
    cash_register::{self, RegisterStatus},
    income_entry::{self, PaymentMethod},
    order,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::error::{ComputeError, Result};
use crate::supply;
use crate::validation::{ensure_digits, MAX_CUSTOMER_NAME_LEN, MAX_QUANTITY_DIGITS};

/// Upper bound for the whole order-creation sequence. The stock-decrement
/// loop may touch many supply rows, so this is deliberately generous.
pub const ORDER_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(20);

/// Input for placing an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: Option<String>,
    pub quantity: i32,
    pub total_amount: f64,
    pub recipe_id: i32,
    /// JSON payload describing which supplies were consumed and how many
    /// grams. Stored verbatim on the order as its ingredients snapshot.
    pub ingredients_summary: String,
}

/// One consumed-supply line as parsed from the ingredients summary.
/// Lines without a resolvable supply id are skipped during the stock
/// decrement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumedIngredient {
    #[serde(default, alias = "supplyId", alias = "insumoId")]
    pub supply_id: Option<i32>,
    #[serde(default, alias = "gramos", alias = "gramsUsed")]
    pub grams: f64,
}

/// Defensive parse of the ingredients summary: a malformed payload
/// degrades to an empty list rather than failing the whole order.
pub fn parse_ingredients_summary(summary: &str) -> Vec<ConsumedIngredient> {
    match serde_json::from_str::<Vec<ConsumedIngredient>>(summary) {
        Ok(lines) => lines,
        Err(err) => {
            warn!(%err, "Malformed ingredients summary, treating as empty");
            Vec::new()
        }
    }
}

/// The user's currently OPEN register, if any.
pub async fn find_open<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<cash_register::Model>> {
    Ok(cash_register::Entity::find()
        .filter(cash_register::Column::UserId.eq(user_id))
        .filter(cash_register::Column::Status.eq(RegisterStatus::Open))
        .order_by_desc(cash_register::Column::Id)
        .one(db)
        .await?)
}

/// Today's register (date at or after local midnight) or None. Read-only.
#[instrument(skip(db))]
pub async fn get_today(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<cash_register::Model>> {
    let midnight = Local::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ComputeError::Date("could not compute local midnight".to_string()))?;

    Ok(cash_register::Entity::find()
        .filter(cash_register::Column::UserId.eq(user_id))
        .filter(cash_register::Column::Date.gte(midnight))
        .order_by_desc(cash_register::Column::Id)
        .one(db)
        .await?)
}

/// Open a fresh register. Any register still OPEN for this user is
/// force-closed first (safety net against orphaned registers from crashes
/// or skipped closes), so afterwards exactly one OPEN register exists.
#[instrument(skip(db))]
pub async fn open(
    db: &DatabaseConnection,
    user_id: i32,
    initial_amount: i64,
) -> Result<cash_register::Model> {
    let stale = cash_register::Entity::find()
        .filter(cash_register::Column::UserId.eq(user_id))
        .filter(cash_register::Column::Status.eq(RegisterStatus::Open))
        .all(db)
        .await?;

    for register in stale {
        warn!(register_id = register.id, "Force-closing stale open register");
        let mut active: cash_register::ActiveModel = register.into();
        active.status = Set(RegisterStatus::Closed);
        active.update(db).await?;
    }

    let created = cash_register::ActiveModel {
        user_id: Set(user_id),
        date: Set(Local::now().naive_local()),
        initial_amount: Set(initial_amount),
        cash_total: Set(0),
        card_total: Set(0),
        transfer_total: Set(0),
        running_total: Set(initial_amount),
        total_sales: Set(0),
        net_profit: Set(0),
        status: Set(RegisterStatus::Open),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(register_id = created.id, initial_amount, "Register opened");
    Ok(created)
}

/// Close the user's OPEN register. Terminal for that register.
#[instrument(skip(db))]
pub async fn close(db: &DatabaseConnection, user_id: i32) -> Result<cash_register::Model> {
    let register = find_open(db, user_id)
        .await?
        .ok_or_else(|| ComputeError::NotFound("no open register".to_string()))?;

    let mut active: cash_register::ActiveModel = register.into();
    active.status = Set(RegisterStatus::Closed);
    let closed = active.update(db).await?;

    info!(register_id = closed.id, "Register closed");
    Ok(closed)
}

/// All registers for the user, newest first.
#[instrument(skip(db))]
pub async fn history(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<cash_register::Model>> {
    Ok(cash_register::Entity::find()
        .filter(cash_register::Column::UserId.eq(user_id))
        .order_by_desc(cash_register::Column::Date)
        .order_by_desc(cash_register::Column::Id)
        .all(db)
        .await?)
}

/// Record an income entry and, when a register is open, fold the amount
/// into its running total and the method-specific bucket. With no open
/// register the entry is still recorded but no register is touched.
#[instrument(skip(db))]
pub async fn post_income(
    db: &DatabaseConnection,
    user_id: i32,
    amount: f64,
    description: String,
    method: PaymentMethod,
) -> Result<income_entry::Model> {
    // Cast to integer currency units
    let amount = amount as i64;

    let entry = income_entry::ActiveModel {
        user_id: Set(user_id),
        amount: Set(amount),
        description: Set(description),
        payment_method: Set(method),
        date: Set(Local::now().naive_local()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    match find_open(db, user_id).await? {
        Some(register) => {
            apply_income_to_register(db, register, amount, method, false).await?;
        }
        None => {
            warn!(entry_id = entry.id, "Income posted with no open register");
        }
    }

    info!(entry_id = entry.id, amount, "Income recorded");
    Ok(entry)
}

/// Increment the register's running total and the bucket matching the
/// payment method. Sale postings additionally move total_sales/net_profit.
async fn apply_income_to_register<C: ConnectionTrait>(
    db: &C,
    register: cash_register::Model,
    amount: i64,
    method: PaymentMethod,
    is_sale: bool,
) -> Result<cash_register::Model> {
    let mut active: cash_register::ActiveModel = register.clone().into();
    active.running_total = Set(register.running_total + amount);
    match method {
        PaymentMethod::Cash => active.cash_total = Set(register.cash_total + amount),
        PaymentMethod::Card => active.card_total = Set(register.card_total + amount),
        PaymentMethod::Transfer => active.transfer_total = Set(register.transfer_total + amount),
    }
    if is_sale {
        active.total_sales = Set(register.total_sales + amount);
        active.net_profit = Set(register.net_profit + amount);
    }
    Ok(active.update(db).await?)
}

/// Place an order: ONE atomic transaction inserting the order row and a
/// synthetic income entry, folding the amount into the open register and
/// decrementing the consumed supplies' stock. Rolls back wholesale on any
/// failure; the failure surfaces as a `Transaction` error carrying the
/// underlying cause.
#[instrument(skip(db, input), fields(recipe_id = input.recipe_id, quantity = input.quantity))]
pub async fn create_order(
    db: &DatabaseConnection,
    user_id: i32,
    input: NewOrder,
) -> Result<order::Model> {
    ensure_digits(
        "quantity",
        i64::from(input.quantity),
        MAX_QUANTITY_DIGITS,
    )?;
    if let Some(name) = &input.customer_name {
        if name.chars().count() > MAX_CUSTOMER_NAME_LEN {
            return Err(ComputeError::Validation(format!(
                "customer name exceeds {MAX_CUSTOMER_NAME_LEN} characters"
            )));
        }
    }

    let consumed = parse_ingredients_summary(&input.ingredients_summary);
    let rounded_total = input.total_amount.round() as i64;
    debug!(
        rounded_total,
        num_ingredients = consumed.len(),
        "Starting order transaction"
    );

    let outcome = timeout(ORDER_TRANSACTION_TIMEOUT, async {
        let txn = db.begin().await?;
        match order_sequence(&txn, user_id, &input, rounded_total, &consumed).await {
            Ok(created) => {
                txn.commit().await?;
                Ok(created)
            }
            Err(err) => {
                // Explicit rollback; dropping the txn would roll back too,
                // but we want the failure logged with its cause.
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(%rollback_err, "Rollback after failed order also failed");
                }
                Err(err)
            }
        }
    })
    .await;

    match outcome {
        Ok(Ok(created)) => {
            info!(order_id = created.id, rounded_total, "Order created");
            Ok(created)
        }
        Ok(Err(err)) => Err(ComputeError::Transaction(format!(
            "order processing failed: {err}"
        ))),
        Err(_) => Err(ComputeError::Transaction(
            "order processing failed: transaction timed out".to_string(),
        )),
    }
}

async fn order_sequence<C: ConnectionTrait>(
    txn: &C,
    user_id: i32,
    input: &NewOrder,
    rounded_total: i64,
    consumed: &[ConsumedIngredient],
) -> Result<order::Model> {
    let created = order::ActiveModel {
        user_id: Set(user_id),
        customer_name: Set(input.customer_name.clone()),
        quantity: Set(input.quantity),
        total_amount: Set(rounded_total),
        recipe_id: Set(Some(input.recipe_id)),
        ingredients_snapshot: Set(input.ingredients_summary.clone()),
        date: Set(Local::now().naive_local()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    // Synthetic income entry so the sale shows up in the ledger and the
    // finance reports, tagged as cash.
    let customer = input.customer_name.as_deref().unwrap_or("customer");
    income_entry::ActiveModel {
        user_id: Set(user_id),
        amount: Set(rounded_total),
        description: Set(format!(
            "Sale Order: {customer} ({} units)",
            input.quantity
        )),
        payment_method: Set(PaymentMethod::Cash),
        date: Set(Local::now().naive_local()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    if let Some(register) = find_open(txn, user_id).await? {
        apply_income_to_register(txn, register, rounded_total, PaymentMethod::Cash, true).await?;
    }

    for line in consumed {
        let Some(supply_id) = line.supply_id else {
            continue;
        };
        let grams = Decimal::try_from(line.grams)
            .map_err(|e| ComputeError::Parse(format!("invalid gram quantity: {e}")))?;
        supply::decrement_stock(txn, supply_id, grams).await?;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply::SupplyInput;
    use crate::test_support::{insert_user, setup_db};
    use model::entities::supply::SupplyUnit;

    async fn seed_order_fixtures(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> (i32, i32) {
        let flour = crate::supply::create(
            db,
            user_id,
            SupplyInput {
                name: "Harina".to_string(),
                presentation: "bulto x 50kg".to_string(),
                purchase_quantity: Decimal::from(50),
                unit: SupplyUnit::Kilogram,
                purchase_value: 120000,
            },
        )
        .await
        .unwrap();

        let bread = crate::recipe::create(
            db,
            user_id,
            "Pan campesino".to_string(),
            12,
            vec![crate::recipe::IngredientInput {
                supply_id: flour.id,
                grams_required: Decimal::from(6000),
            }],
        )
        .await
        .unwrap();

        (flour.id, bread.recipe.id)
    }

    #[tokio::test]
    async fn open_force_closes_previous_register() {
        let db = setup_db().await;
        let user = insert_user(&db, "caja@test.com").await;

        let first = open(&db, user.id, 10000).await.unwrap();
        let second = open(&db, user.id, 20000).await.unwrap();
        assert_ne!(first.id, second.id);

        let open_registers = cash_register::Entity::find()
            .filter(cash_register::Column::UserId.eq(user.id))
            .filter(cash_register::Column::Status.eq(RegisterStatus::Open))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(open_registers.len(), 1);
        assert_eq!(open_registers[0].id, second.id);
        assert_eq!(open_registers[0].running_total, 20000);
    }

    #[tokio::test]
    async fn close_without_open_register_is_not_found() {
        let db = setup_db().await;
        let user = insert_user(&db, "caja2@test.com").await;

        let err = close(&db, user.id).await.unwrap_err();
        assert!(matches!(err, ComputeError::NotFound(_)));
    }

    #[tokio::test]
    async fn close_is_terminal() {
        let db = setup_db().await;
        let user = insert_user(&db, "caja3@test.com").await;

        open(&db, user.id, 5000).await.unwrap();
        let closed = close(&db, user.id).await.unwrap();
        assert_eq!(closed.status, RegisterStatus::Closed);

        // Second close finds nothing open
        assert!(matches!(
            close(&db, user.id).await.unwrap_err(),
            ComputeError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn income_increments_running_total_and_method_bucket() {
        let db = setup_db().await;
        let user = insert_user(&db, "caja4@test.com").await;

        open(&db, user.id, 20000).await.unwrap();
        post_income(&db, user.id, 5000.0, "Venta mostrador".into(), PaymentMethod::Cash)
            .await
            .unwrap();

        let register = find_open(&db, user.id).await.unwrap().unwrap();
        assert_eq!(register.running_total, 25000);
        assert_eq!(register.cash_total, 5000);
        assert_eq!(register.card_total, 0);
        assert_eq!(register.transfer_total, 0);

        post_income(&db, user.id, 3000.0, "Pedido web".into(), PaymentMethod::Transfer)
            .await
            .unwrap();
        let register = find_open(&db, user.id).await.unwrap().unwrap();
        assert_eq!(register.running_total, 28000);
        assert_eq!(register.transfer_total, 3000);
    }

    #[tokio::test]
    async fn running_total_is_initial_plus_sum_of_postings() {
        let db = setup_db().await;
        let user = insert_user(&db, "caja5@test.com").await;

        open(&db, user.id, 1000).await.unwrap();
        let amounts = [250.0, 1300.0, 75.0, 4200.0];
        for (i, amount) in amounts.iter().enumerate() {
            post_income(&db, user.id, *amount, format!("venta {i}"), PaymentMethod::Cash)
                .await
                .unwrap();
        }

        let register = find_open(&db, user.id).await.unwrap().unwrap();
        let expected: i64 = 1000 + amounts.iter().map(|a| *a as i64).sum::<i64>();
        assert_eq!(register.running_total, expected);
    }

    #[tokio::test]
    async fn income_without_register_is_recorded_but_orphaned() {
        let db = setup_db().await;
        let user = insert_user(&db, "caja6@test.com").await;

        let entry = post_income(&db, user.id, 900.0, "sin caja".into(), PaymentMethod::Card)
            .await
            .unwrap();
        assert_eq!(entry.amount, 900);

        assert!(find_open(&db, user.id).await.unwrap().is_none());
        let registers = history(&db, user.id).await.unwrap();
        assert!(registers.is_empty());
    }

    #[tokio::test]
    async fn order_updates_ledger_register_and_stock() {
        let db = setup_db().await;
        let user = insert_user(&db, "pedido@test.com").await;
        let (flour_id, recipe_id) = seed_order_fixtures(&db, user.id).await;

        open(&db, user.id, 20000).await.unwrap();
        post_income(&db, user.id, 5000.0, "Venta".into(), PaymentMethod::Cash)
            .await
            .unwrap();

        let created = create_order(
            &db,
            user.id,
            NewOrder {
                customer_name: Some("Carlos".to_string()),
                quantity: 24,
                total_amount: 12345.6,
                recipe_id,
                ingredients_summary: format!(
                    "[{{\"supply_id\":{flour_id},\"grams\":12000}}]"
                ),
            },
        )
        .await
        .unwrap();

        // Rounded to the nearest integer unit
        assert_eq!(created.total_amount, 12346);

        let register = find_open(&db, user.id).await.unwrap().unwrap();
        assert_eq!(register.running_total, 37346);
        assert_eq!(register.cash_total, 17346);
        assert_eq!(register.total_sales, 12346);
        assert_eq!(register.net_profit, 12346);

        // Synthetic ledger entry
        let entries = income_entry::Entity::find()
            .filter(income_entry::Column::UserId.eq(user.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .any(|e| e.description == "Sale Order: Carlos (24 units)"));

        // Stock decremented: 50000 - 12000
        let flour = model::entities::supply::Entity::find_by_id(flour_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(flour.stock_grams, Decimal::from(38000));
    }

    #[tokio::test]
    async fn order_without_open_register_still_records_ledger() {
        let db = setup_db().await;
        let user = insert_user(&db, "pedido2@test.com").await;
        let (_, recipe_id) = seed_order_fixtures(&db, user.id).await;

        let created = create_order(
            &db,
            user.id,
            NewOrder {
                customer_name: None,
                quantity: 6,
                total_amount: 9000.0,
                recipe_id,
                ingredients_summary: "[]".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.total_amount, 9000);

        let entries = income_entry::Entity::find()
            .filter(income_entry::Column::UserId.eq(user.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "Sale Order: customer (6 units)");
    }

    #[tokio::test]
    async fn order_quantity_digit_limit_enforced() {
        let db = setup_db().await;
        let user = insert_user(&db, "pedido3@test.com").await;
        let (_, recipe_id) = seed_order_fixtures(&db, user.id).await;

        let err = create_order(
            &db,
            user.id,
            NewOrder {
                customer_name: None,
                quantity: 100000, // 6 digits
                total_amount: 100.0,
                recipe_id,
                ingredients_summary: "[]".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ComputeError::Validation(_)));
    }

    #[tokio::test]
    async fn order_customer_name_length_enforced() {
        let db = setup_db().await;
        let user = insert_user(&db, "pedido4@test.com").await;
        let (_, recipe_id) = seed_order_fixtures(&db, user.id).await;

        let err = create_order(
            &db,
            user.id,
            NewOrder {
                customer_name: Some("Un nombre demasiado largo".to_string()),
                quantity: 2,
                total_amount: 100.0,
                recipe_id,
                ingredients_summary: "[]".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ComputeError::Validation(_)));
    }

    #[tokio::test]
    async fn malformed_summary_degrades_to_empty_list() {
        let db = setup_db().await;
        let user = insert_user(&db, "pedido5@test.com").await;
        let (flour_id, recipe_id) = seed_order_fixtures(&db, user.id).await;

        create_order(
            &db,
            user.id,
            NewOrder {
                customer_name: None,
                quantity: 3,
                total_amount: 500.0,
                recipe_id,
                ingredients_summary: "not json at all {{{".to_string(),
            },
        )
        .await
        .unwrap();

        // No stock was touched
        let flour = model::entities::supply::Entity::find_by_id(flour_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(flour.stock_grams, Decimal::from(50000));
    }

    #[tokio::test]
    async fn failed_order_rolls_back_everything() {
        let db = setup_db().await;
        let user = insert_user(&db, "pedido6@test.com").await;
        let (flour_id, recipe_id) = seed_order_fixtures(&db, user.id).await;

        open(&db, user.id, 20000).await.unwrap();

        // Second line references a supply that does not exist, which fails
        // the stock-decrement step after the order, the income entry and
        // the register update have already been written.
        let err = create_order(
            &db,
            user.id,
            NewOrder {
                customer_name: Some("Ana".to_string()),
                quantity: 10,
                total_amount: 7000.0,
                recipe_id,
                ingredients_summary: format!(
                    "[{{\"supply_id\":{flour_id},\"grams\":1000}},{{\"supply_id\":999999,\"grams\":5}}]"
                ),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ComputeError::Transaction(_)));

        // Nothing from the attempt persisted
        assert_eq!(
            order::Entity::find()
                .filter(order::Column::UserId.eq(user.id))
                .all(&db)
                .await
                .unwrap()
                .len(),
            0
        );
        assert_eq!(
            income_entry::Entity::find()
                .filter(income_entry::Column::UserId.eq(user.id))
                .all(&db)
                .await
                .unwrap()
                .len(),
            0
        );
        let register = find_open(&db, user.id).await.unwrap().unwrap();
        assert_eq!(register.running_total, 20000);
        assert_eq!(register.total_sales, 0);
        let flour = model::entities::supply::Entity::find_by_id(flour_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(flour.stock_grams, Decimal::from(50000));
    }

    #[tokio::test]
    async fn deleting_recipe_keeps_order_history() {
        let db = setup_db().await;
        let user = insert_user(&db, "pedido7@test.com").await;
        let (_, recipe_id) = seed_order_fixtures(&db, user.id).await;

        let created = create_order(
            &db,
            user.id,
            NewOrder {
                customer_name: Some("Elena".to_string()),
                quantity: 4,
                total_amount: 3000.0,
                recipe_id,
                ingredients_summary: "[]".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.recipe_id, Some(recipe_id));

        crate::recipe::delete(&db, recipe_id).await.unwrap();

        // The order survives with its recipe link nulled, and the ledger
        // entry written alongside it is untouched
        let survivor = order::Entity::find_by_id(created.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(survivor.recipe_id, None);
        assert_eq!(survivor.total_amount, 3000);

        let entries = income_entry::Entity::find()
            .filter(income_entry::Column::UserId.eq(user.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn get_today_returns_register_opened_today() {
        let db = setup_db().await;
        let user = insert_user(&db, "caja7@test.com").await;

        assert!(get_today(&db, user.id).await.unwrap().is_none());
        let opened = open(&db, user.id, 1500).await.unwrap();
        let today = get_today(&db, user.id).await.unwrap().unwrap();
        assert_eq!(today.id, opened.id);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let db = setup_db().await;
        let user = insert_user(&db, "caja8@test.com").await;

        open(&db, user.id, 100).await.unwrap();
        let second = open(&db, user.id, 200).await.unwrap();

        let registers = history(&db, user.id).await.unwrap();
        assert_eq!(registers.len(), 2);
        assert_eq!(registers[0].id, second.id);
    }
}
