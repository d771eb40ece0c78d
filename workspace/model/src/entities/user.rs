use sea_orm::entity::prelude::*;

/// Role attached to an account. Admins manage tenants, regular users run
/// their own bakery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum UserRole {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "USER")]
    User,
}

/// Represents a bakery owner account. Every other entity in the system is
/// owned by exactly one user; deleting a user cascades to everything it owns.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub company_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::supply::Entity")]
    Supply,
    #[sea_orm(has_many = "super::recipe::Entity")]
    Recipe,
    #[sea_orm(has_many = "super::cash_register::Entity")]
    CashRegister,
    #[sea_orm(has_many = "super::income_entry::Entity")]
    IncomeEntry,
    #[sea_orm(has_many = "super::expense_entry::Entity")]
    ExpenseEntry,
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::supply::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supply.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
