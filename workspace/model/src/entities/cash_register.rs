use super::user;
use sea_orm::entity::prelude::*;

/// Lifecycle state of a daily register. CLOSED is terminal for that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum RegisterStatus {
    #[sea_orm(string_value = "OPEN")]
    Open,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

/// The daily cash register (caja diaria). At most one OPEN register exists
/// per user at any time; opening a new one force-closes any prior OPEN
/// register.
///
/// `running_total` starts at `initial_amount` and is only ever incremented
/// by income postings, never recomputed from scratch. All amounts are
/// integer currency units.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_registers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub date: DateTime,
    pub initial_amount: i64,
    pub cash_total: i64,
    pub card_total: i64,
    pub transfer_total: i64,
    pub running_total: i64,
    pub total_sales: i64,
    pub net_profit: i64,
    pub status: RegisterStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
