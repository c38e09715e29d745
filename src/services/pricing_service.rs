use sea_orm::EntityTrait;

use crate::{
    entity::products::Entity as Products,
    error::{AppError, AppResult},
    models::{ComponentLink, ComponentNode, ComponentsPrice, Product},
    response::ApiResponse,
    services::component_service::fetch_tree,
    state::AppState,
};

/// Price precedence for a component inside a composition: the relationship's
/// override, then the component's dedicated component price, then its list
/// price.
pub fn effective_unit_price(link: &ComponentLink, product: &Product) -> i64 {
    link.price_override
        .or(product.component_price)
        .unwrap_or(product.price)
}

/// Sum a fetched component tree into included / optional buckets. Pure; both
/// levels contribute independently.
pub fn aggregate(tree: &[ComponentNode]) -> ComponentsPrice {
    let mut included_price: i64 = 0;
    let mut optional_price: i64 = 0;

    let mut tally = |link: &ComponentLink, product: &Product| {
        let line = effective_unit_price(link, product) * link.quantity as i64;
        if link.is_included {
            included_price += line;
        } else {
            optional_price += line;
        }
    };

    for node in tree {
        tally(&node.link, &node.component);
        for sub in &node.sub_components {
            tally(&sub.link, &sub.component);
        }
    }

    ComponentsPrice {
        included_price,
        optional_price,
        total_price: included_price + optional_price,
    }
}

pub async fn calculate_components_price(
    state: &AppState,
    product_id: &str,
) -> AppResult<ApiResponse<ComponentsPrice>> {
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!(
            "product {product_id} does not exist"
        )));
    }

    let tree = fetch_tree(&state.orm, product_id).await?;
    Ok(ApiResponse::success(
        "Components price",
        aggregate(&tree),
        None,
    ))
}
