use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sku: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub component_price: Option<i64>,
    pub currency: String,
    pub status: String,
    pub is_available: bool,
    pub stock: i32,
    pub version: i32,
    pub base_product_id: Option<String>,
    pub previous_version_id: Option<String>,
    pub replaced_by: Option<String>,
    pub product_type: String,
    pub sunset_at: Option<DateTimeWithTimeZone>,
    pub sunset_reason: Option<String>,
    pub replacement_id: Option<String>,
    pub discontinued_at: Option<DateTimeWithTimeZone>,
    pub discontinued_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
