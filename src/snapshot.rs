use serde::{Deserialize, Serialize};

use crate::models::ComponentNode;
use crate::services::pricing_service::effective_unit_price;

/// Current shape of the `order_items.component_tree` column. Historical rows
/// keep whatever schema version they were written with; readers must check
/// `schema_version` before assuming field layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Denormalized composition of a product at the time an order was placed.
/// Immutable once written: later edits to the live product or its component
/// links never touch these blobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentTreeSnapshot {
    pub schema_version: u32,
    pub items: Vec<SnapshotItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub is_included: bool,
    #[serde(default)]
    pub components: Vec<SnapshotLeaf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotLeaf {
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub is_included: bool,
}

/// Freeze a fetched component tree into the snapshot shape. Unit prices are
/// resolved here so the historical record is immune to later price edits.
pub fn capture(tree: &[ComponentNode]) -> ComponentTreeSnapshot {
    let items = tree
        .iter()
        .map(|node| SnapshotItem {
            product_id: node.component.id.clone(),
            name: node
                .link
                .display_name
                .clone()
                .unwrap_or_else(|| node.component.name.clone()),
            quantity: node.link.quantity,
            unit_price: effective_unit_price(&node.link, &node.component),
            is_included: node.link.is_included,
            components: node
                .sub_components
                .iter()
                .map(|sub| SnapshotLeaf {
                    product_id: sub.component.id.clone(),
                    name: sub
                        .link
                        .display_name
                        .clone()
                        .unwrap_or_else(|| sub.component.name.clone()),
                    quantity: sub.link.quantity,
                    unit_price: effective_unit_price(&sub.link, &sub.component),
                    is_included: sub.link.is_included,
                })
                .collect(),
        })
        .collect();

    ComponentTreeSnapshot {
        schema_version: SCHEMA_VERSION,
        items,
    }
}
