use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, ProductKind};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    /// Defaults to the slug when omitted.
    pub id: Option<String>,
    pub sku: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub component_price: Option<i64>,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    pub product_type: Option<ProductKind>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub component_price: Option<i64>,
    pub stock: Option<i32>,
    pub is_available: Option<bool>,
}

/// Result of an admin edit: `versioned` tells the caller whether the edit
/// landed in place or was forked into a new product version because the
/// original is referenced by order history.
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionedProduct {
    pub product: Product,
    pub versioned: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
