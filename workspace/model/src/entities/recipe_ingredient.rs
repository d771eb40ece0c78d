use sea_orm::entity::prelude::*;

/// One ingredient line of a recipe: a supply and the grams one batch needs.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recipe_ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub recipe_id: i32,
    pub supply_id: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub grams_required: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::Id"
    )]
    Recipe,
    #[sea_orm(
        belongs_to = "super::supply::Entity",
        from = "Column::SupplyId",
        to = "super::supply::Column::Id"
    )]
    Supply,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl Related<super::supply::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supply.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
