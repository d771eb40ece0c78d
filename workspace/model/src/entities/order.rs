use super::{recipe, user};
use sea_orm::entity::prelude::*;

/// A customer order (pedido). Creating one is the single write that fans
/// out atomically to the income ledger, the open register's totals and the
/// supply stock levels.
///
/// `ingredients_snapshot` stores the consumed-supplies payload as the JSON
/// string the client submitted, so the order keeps a record of what was
/// decremented even if recipes change later. Deleting the recipe nulls
/// `recipe_id` but leaves the order in place.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub customer_name: Option<String>,
    pub quantity: i32,
    /// Rounded to the nearest integer currency unit on creation.
    pub total_amount: i64,
    pub recipe_id: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub ingredients_snapshot: String,
    pub date: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::Id"
    )]
    Recipe,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
