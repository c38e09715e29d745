use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Sunset,
    Discontinued,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Sunset => "sunset",
            ProductStatus::Discontinued => "discontinued",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ProductStatus::Active),
            "sunset" => Some(ProductStatus::Sunset),
            "discontinued" => Some(ProductStatus::Discontinued),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Standalone,
    Component,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Standalone => "standalone",
            ProductKind::Component => "component",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standalone" => Some(ProductKind::Standalone),
            "component" => Some(ProductKind::Component),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub component_price: Option<i64>,
    pub currency: String,
    pub status: ProductStatus,
    pub is_available: bool,
    pub stock: i32,
    pub version: i32,
    pub base_product_id: Option<String>,
    pub previous_version_id: Option<String>,
    pub replaced_by: Option<String>,
    pub product_type: ProductKind,
    pub sunset_at: Option<DateTime<Utc>>,
    pub sunset_reason: Option<String>,
    pub replacement_id: Option<String>,
    pub discontinued_at: Option<DateTime<Utc>>,
    pub discontinued_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One parent-includes-component edge of the composition graph.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComponentLink {
    pub id: Uuid,
    pub parent_product_id: String,
    pub component_product_id: String,
    pub quantity: i32,
    pub is_required: bool,
    pub is_included: bool,
    pub price_override: Option<i64>,
    pub display_name: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// A leaf of the component tree. Deliberately has no child list: the
/// composition depth is capped at two levels, and the shape of this type is
/// what enforces that cap on the read side.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubComponentNode {
    pub component: Product,
    pub link: ComponentLink,
}

/// A direct component of a product, together with that component's own
/// direct components.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComponentNode {
    pub component: Product,
    pub link: ComponentLink,
    pub sub_components: Vec<SubComponentNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ComponentsPrice {
    pub included_price: i64,
    pub optional_price: i64,
    pub total_price: i64,
}
