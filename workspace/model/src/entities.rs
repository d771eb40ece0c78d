//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the bakery back-office here: every entity
//! is exclusively owned by one user (multi-tenant by foreign key), and the
//! register and the order are the only entities whose creation has side
//! effects on siblings.

pub mod cash_register;
pub mod expense_entry;
pub mod income_entry;
pub mod order;
pub mod recipe;
pub mod recipe_ingredient;
pub mod supply;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::cash_register::Entity as CashRegister;
    pub use super::expense_entry::Entity as ExpenseEntry;
    pub use super::income_entry::Entity as IncomeEntry;
    pub use super::order::Entity as Order;
    pub use super::recipe::Entity as Recipe;
    pub use super::recipe_ingredient::Entity as RecipeIngredient;
    pub use super::supply::Entity as Supply;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn insert_user(db: &DatabaseConnection, email: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set("$argon2id$stub".to_string()),
            name: Set("Maria".to_string()),
            surname: Set("Lopez".to_string()),
            company_name: Set("Panaderia La Espiga".to_string()),
            phone: Set(None),
            role: Set(user::UserRole::User),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        // Setup database
        let db = setup_db().await?;

        let user1 = insert_user(&db, "maria@espiga.com").await?;
        let user2 = insert_user(&db, "jorge@espiga.com").await?;

        // Supplies
        let flour = supply::ActiveModel {
            user_id: Set(user1.id),
            name: Set("Harina".to_string()),
            presentation: Set("bulto x 50kg".to_string()),
            purchase_quantity: Set(Decimal::new(50, 0)),
            unit: Set(supply::SupplyUnit::Kilogram),
            purchase_value: Set(120000),
            stock_grams: Set(Decimal::new(50000, 0)),
            cost_per_gram: Set(Decimal::new(24, 1)), // 2.4
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Recipe with one ingredient line
        let bread = recipe::ActiveModel {
            user_id: Set(user1.id),
            name: Set("Pan campesino".to_string()),
            base_yield: Set(12),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        recipe_ingredient::ActiveModel {
            recipe_id: Set(bread.id),
            supply_id: Set(flour.id),
            grams_required: Set(Decimal::new(6000, 0)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Register, income, expense, order
        let register = cash_register::ActiveModel {
            user_id: Set(user1.id),
            date: Set(Utc::now().naive_utc()),
            initial_amount: Set(20000),
            cash_total: Set(0),
            card_total: Set(0),
            transfer_total: Set(0),
            running_total: Set(20000),
            total_sales: Set(0),
            net_profit: Set(0),
            status: Set(cash_register::RegisterStatus::Open),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        income_entry::ActiveModel {
            user_id: Set(user1.id),
            amount: Set(5000),
            description: Set("Venta mostrador".to_string()),
            payment_method: Set(income_entry::PaymentMethod::Cash),
            date: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        expense_entry::ActiveModel {
            user_id: Set(user1.id),
            amount: Set(3000),
            description: Set("Gas".to_string()),
            category: Set(Some("servicios".to_string())),
            date: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let order = order::ActiveModel {
            user_id: Set(user1.id),
            customer_name: Set(Some("Carlos".to_string())),
            quantity: Set(24),
            total_amount: Set(36000),
            recipe_id: Set(Some(bread.id)),
            ingredients_snapshot: Set("[]".to_string()),
            date: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify data
        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.email == "maria@espiga.com"));
        assert!(users.iter().any(|u| u.email == "jorge@espiga.com"));

        let supplies = Supply::find()
            .filter(supply::Column::UserId.eq(user1.id))
            .all(&db)
            .await?;
        assert_eq!(supplies.len(), 1);
        assert_eq!(supplies[0].stock_grams, Decimal::new(50000, 0));

        let lines = RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(bread.id))
            .all(&db)
            .await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].supply_id, flour.id);

        let registers = CashRegister::find().all(&db).await?;
        assert_eq!(registers.len(), 1);
        assert_eq!(registers[0].running_total, 20000);
        assert_eq!(registers[0].status, cash_register::RegisterStatus::Open);

        assert_eq!(IncomeEntry::find().all(&db).await?.len(), 1);
        assert_eq!(ExpenseEntry::find().all(&db).await?.len(), 1);

        let orders = Order::find().all(&db).await?;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].recipe_id, Some(bread.id));

        // Cascade: deleting the user removes everything it owns
        User::delete_by_id(user1.id).exec(&db).await?;
        assert_eq!(Supply::find().all(&db).await?.len(), 0);
        assert_eq!(Recipe::find().all(&db).await?.len(), 0);
        assert_eq!(CashRegister::find().all(&db).await?.len(), 0);
        assert_eq!(IncomeEntry::find().all(&db).await?.len(), 0);
        assert_eq!(Order::find().find_also_related(Recipe).all(&db).await?.len(), 0);
        let _ = order.id;
        let _ = register.id;

        Ok(())
    }
}
