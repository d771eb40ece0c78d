use super::user;
use sea_orm::entity::prelude::*;

/// Unit the supply was purchased in. Kilograms are normalized to grams when
/// the stock figure is derived; any other unit is taken at face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum SupplyUnit {
    #[sea_orm(string_value = "kg")]
    Kilogram,
    #[sea_orm(string_value = "g")]
    Gram,
    #[sea_orm(string_value = "unit")]
    Unit,
}

/// A raw supply (insumo): flour, butter, yeast. Tracks the purchase figures
/// and the derived stock-in-grams and cost-per-gram used for costing.
///
/// `stock_grams` and `cost_per_gram` are computed when the record is created
/// (or fully replaced) and afterwards only mutated by order-fulfilment stock
/// decrements. Stock may go negative; it is a costing figure, not a hard
/// inventory limit.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "supplies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    /// Presentation label, e.g. "bulto x 50kg".
    pub presentation: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub purchase_quantity: Decimal,
    pub unit: SupplyUnit,
    /// Purchase cost in integer currency units.
    pub purchase_value: i64,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub stock_grams: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub cost_per_gram: Decimal,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    RecipeIngredient,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
