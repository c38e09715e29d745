use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::models::{ComponentLink, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddComponentRequest {
    pub component_product_id: String,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    /// Defaults to false.
    pub is_required: Option<bool>,
    /// Defaults to true (bundled rather than optional add-on).
    pub is_included: Option<bool>,
    pub price_override: Option<i64>,
    pub display_name: Option<String>,
    /// Defaults to 0.
    pub sort_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateComponentRequest {
    pub quantity: Option<i32>,
    pub is_required: Option<bool>,
    pub is_included: Option<bool>,
    /// Nullable: `null` clears the override, a missing field leaves it alone.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub price_override: Option<Option<i64>>,
    /// Nullable: `null` clears the display name.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub display_name: Option<Option<String>>,
    pub sort_order: Option<i32>,
}

/// Distinguishes an absent field (outer `None`) from an explicit JSON `null`
/// (`Some(None)`), so a patch can clear a nullable column.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Reverse lookup entry: a product that uses the queried one as a component.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParentProduct {
    pub product: Product,
    pub link: ComponentLink,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_null_from_missing() {
        let req: UpdateComponentRequest =
            serde_json::from_str(r#"{"price_override": null}"#).unwrap();
        assert_eq!(req.price_override, Some(None));
        assert_eq!(req.display_name, None);

        let req: UpdateComponentRequest =
            serde_json::from_str(r#"{"price_override": 5500, "display_name": "PSU"}"#).unwrap();
        assert_eq!(req.price_override, Some(Some(5500)));
        assert_eq!(req.display_name, Some(Some("PSU".to_string())));

        let req: UpdateComponentRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(req.price_override, None);
        assert_eq!(req.display_name, None);
    }
}
