use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

/// Field overrides applied on top of the copied catalog row when forking a
/// new product version.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateVersionRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub component_price: Option<i64>,
    pub stock: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SunsetRequest {
    pub reason: String,
    pub replacement_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DiscontinueRequest {
    pub reason: String,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct VersionList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
