use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "product_components")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub parent_product_id: String,
    pub component_product_id: String,
    pub quantity: i32,
    pub is_required: bool,
    pub is_included: bool,
    pub price_override: Option<i64>,
    pub display_name: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
}

// Two foreign keys into the same table, so no `Related` impl: callers filter
// on ParentProductId / ComponentProductId explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ParentProductId",
        to = "super::products::Column::Id"
    )]
    ParentProduct,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ComponentProductId",
        to = "super::products::Column::Id"
    )]
    ComponentProduct,
}

impl ActiveModelBehavior for ActiveModel {}
