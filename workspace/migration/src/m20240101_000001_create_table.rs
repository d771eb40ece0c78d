use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string(Users::Name))
                    .col(string(Users::Surname))
                    .col(string(Users::CompanyName))
                    .col(string_null(Users::Phone))
                    .col(string_len(Users::Role, 10))
                    .col(date_time(Users::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create supplies table
        manager
            .create_table(
                Table::create()
                    .table(Supplies::Table)
                    .if_not_exists()
                    .col(pk_auto(Supplies::Id))
                    .col(integer(Supplies::UserId))
                    .col(string(Supplies::Name))
                    .col(string(Supplies::Presentation))
                    .col(decimal(Supplies::PurchaseQuantity).decimal_len(16, 4))
                    .col(string_len(Supplies::Unit, 10))
                    .col(big_integer(Supplies::PurchaseValue))
                    .col(decimal(Supplies::StockGrams).decimal_len(16, 4))
                    .col(decimal(Supplies::CostPerGram).decimal_len(16, 4))
                    .col(date_time(Supplies::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supply_user")
                            .from(Supplies::Table, Supplies::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create recipes table
        manager
            .create_table(
                Table::create()
                    .table(Recipes::Table)
                    .if_not_exists()
                    .col(pk_auto(Recipes::Id))
                    .col(integer(Recipes::UserId))
                    .col(string(Recipes::Name))
                    .col(integer(Recipes::BaseYield))
                    .col(date_time(Recipes::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_user")
                            .from(Recipes::Table, Recipes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create recipe_ingredients table
        manager
            .create_table(
                Table::create()
                    .table(RecipeIngredients::Table)
                    .if_not_exists()
                    .col(pk_auto(RecipeIngredients::Id))
                    .col(integer(RecipeIngredients::RecipeId))
                    .col(integer(RecipeIngredients::SupplyId))
                    .col(decimal(RecipeIngredients::GramsRequired).decimal_len(16, 4))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_ingredient_recipe")
                            .from(RecipeIngredients::Table, RecipeIngredients::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_ingredient_supply")
                            .from(RecipeIngredients::Table, RecipeIngredients::SupplyId)
                            .to(Supplies::Table, Supplies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create cash_registers table
        manager
            .create_table(
                Table::create()
                    .table(CashRegisters::Table)
                    .if_not_exists()
                    .col(pk_auto(CashRegisters::Id))
                    .col(integer(CashRegisters::UserId))
                    .col(date_time(CashRegisters::Date))
                    .col(big_integer(CashRegisters::InitialAmount))
                    .col(big_integer(CashRegisters::CashTotal).default(0))
                    .col(big_integer(CashRegisters::CardTotal).default(0))
                    .col(big_integer(CashRegisters::TransferTotal).default(0))
                    .col(big_integer(CashRegisters::RunningTotal))
                    .col(big_integer(CashRegisters::TotalSales).default(0))
                    .col(big_integer(CashRegisters::NetProfit).default(0))
                    .col(string_len(CashRegisters::Status, 10))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cash_register_user")
                            .from(CashRegisters::Table, CashRegisters::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for the "find the open register for this user" lookup
        manager
            .create_index(
                Index::create()
                    .name("idx_cash_registers_user_status")
                    .table(CashRegisters::Table)
                    .col(CashRegisters::UserId)
                    .col(CashRegisters::Status)
                    .to_owned(),
            )
            .await?;

        // Create income_entries table
        manager
            .create_table(
                Table::create()
                    .table(IncomeEntries::Table)
                    .if_not_exists()
                    .col(pk_auto(IncomeEntries::Id))
                    .col(integer(IncomeEntries::UserId))
                    .col(big_integer(IncomeEntries::Amount))
                    .col(string(IncomeEntries::Description))
                    .col(string_len(IncomeEntries::PaymentMethod, 10))
                    .col(date_time(IncomeEntries::Date))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_income_entry_user")
                            .from(IncomeEntries::Table, IncomeEntries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create expense_entries table
        manager
            .create_table(
                Table::create()
                    .table(ExpenseEntries::Table)
                    .if_not_exists()
                    .col(pk_auto(ExpenseEntries::Id))
                    .col(integer(ExpenseEntries::UserId))
                    .col(big_integer(ExpenseEntries::Amount))
                    .col(string(ExpenseEntries::Description))
                    .col(string_null(ExpenseEntries::Category))
                    .col(date_time(ExpenseEntries::Date))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_entry_user")
                            .from(ExpenseEntries::Table, ExpenseEntries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create orders table
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(pk_auto(Orders::Id))
                    .col(integer(Orders::UserId))
                    .col(string_null(Orders::CustomerName))
                    .col(integer(Orders::Quantity))
                    .col(big_integer(Orders::TotalAmount))
                    .col(integer_null(Orders::RecipeId))
                    .col(text(Orders::IngredientsSnapshot))
                    .col(date_time(Orders::Date))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_user")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_recipe")
                            .from(Orders::Table, Orders::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            // Order history outlives the recipe it was
                            // placed against; the snapshot keeps the detail
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ExpenseEntries::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(IncomeEntries::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CashRegisters::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(RecipeIngredients::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Recipes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Supplies::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Name,
    Surname,
    CompanyName,
    Phone,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Supplies {
    Table,
    Id,
    UserId,
    Name,
    Presentation,
    PurchaseQuantity,
    Unit,
    PurchaseValue,
    StockGrams,
    CostPerGram,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Recipes {
    Table,
    Id,
    UserId,
    Name,
    BaseYield,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RecipeIngredients {
    Table,
    Id,
    RecipeId,
    SupplyId,
    GramsRequired,
}

#[derive(DeriveIden)]
enum CashRegisters {
    Table,
    Id,
    UserId,
    Date,
    InitialAmount,
    CashTotal,
    CardTotal,
    TransferTotal,
    RunningTotal,
    TotalSales,
    NetProfit,
    Status,
}

#[derive(DeriveIden)]
enum IncomeEntries {
    Table,
    Id,
    UserId,
    Amount,
    Description,
    PaymentMethod,
    Date,
}

#[derive(DeriveIden)]
enum ExpenseEntries {
    Table,
    Id,
    UserId,
    Amount,
    Description,
    Category,
    Date,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    CustomerName,
    Quantity,
    TotalAmount,
    RecipeId,
    IngredientsSnapshot,
    Date,
}
