use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IsolationLevel, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::components::{AddComponentRequest, ParentProduct, UpdateComponentRequest},
    entity::{
        product_components::{
            ActiveModel as LinkActive, Column as LinkCol, Entity as ProductComponents,
            Model as LinkModel,
        },
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    models::{ComponentLink, ComponentNode, SubComponentNode},
    response::{ApiResponse, Meta},
    services::product_service::product_from_entity,
    state::AppState,
};

/// Safety cutoff for the descendant walk. The composition graph is capped at
/// two levels, so anything deeper than this is malformed data.
const MAX_TRAVERSAL_HOPS: usize = 10;

/// True if linking `component_id` under `parent_id` would close a cycle,
/// i.e. `parent_id` is already reachable as a descendant of `component_id`.
pub async fn would_create_cycle<C: ConnectionTrait>(
    conn: &C,
    parent_id: &str,
    component_id: &str,
) -> AppResult<bool> {
    if parent_id == component_id {
        return Ok(true);
    }

    let mut frontier = vec![component_id.to_string()];
    let mut seen: HashSet<String> = frontier.iter().cloned().collect();

    for _ in 0..MAX_TRAVERSAL_HOPS {
        if frontier.is_empty() {
            break;
        }
        let edges = ProductComponents::find()
            .filter(LinkCol::ParentProductId.is_in(frontier.clone()))
            .all(conn)
            .await?;

        let mut next = Vec::new();
        for edge in edges {
            if edge.component_product_id == parent_id {
                return Ok(true);
            }
            if seen.insert(edge.component_product_id.clone()) {
                next.push(edge.component_product_id);
            }
        }
        frontier = next;
    }

    Ok(false)
}

/// True if linking `component_id` under `parent_id` would produce a
/// root-to-leaf path longer than 2 edges. Both sides of the new edge count:
/// the candidate's own subtree depth and how deeply the parent is already
/// nested under other products.
pub async fn would_exceed_depth<C: ConnectionTrait>(
    conn: &C,
    parent_id: &str,
    component_id: &str,
) -> AppResult<bool> {
    let below = depth_below(conn, component_id).await?;
    let above = depth_above(conn, parent_id).await?;
    Ok(above + 1 + below > 2)
}

/// Longest path under a product, capped at 2.
async fn depth_below<C: ConnectionTrait>(conn: &C, product_id: &str) -> AppResult<u32> {
    let child_ids: Vec<String> = ProductComponents::find()
        .filter(LinkCol::ParentProductId.eq(product_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|edge| edge.component_product_id)
        .collect();

    if child_ids.is_empty() {
        return Ok(0);
    }

    let grandchildren = ProductComponents::find()
        .filter(LinkCol::ParentProductId.is_in(child_ids))
        .count(conn)
        .await?;

    Ok(if grandchildren > 0 { 2 } else { 1 })
}

/// Longest chain of parents above a product, capped at 2.
async fn depth_above<C: ConnectionTrait>(conn: &C, product_id: &str) -> AppResult<u32> {
    let parent_ids: Vec<String> = ProductComponents::find()
        .filter(LinkCol::ComponentProductId.eq(product_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|edge| edge.parent_product_id)
        .collect();

    if parent_ids.is_empty() {
        return Ok(0);
    }

    let grandparents = ProductComponents::find()
        .filter(LinkCol::ComponentProductId.is_in(parent_ids))
        .count(conn)
        .await?;

    Ok(if grandparents > 0 { 2 } else { 1 })
}

pub async fn add_component(
    state: &AppState,
    parent_id: &str,
    payload: AddComponentRequest,
) -> AppResult<ApiResponse<ComponentLink>> {
    let component_id = payload.component_product_id.clone();

    // Validation and insert share one SERIALIZABLE transaction. Weaker
    // levels allow write skew: two concurrent adds could each see an edge
    // set without the other's insert, both pass the cycle check, and commit
    // a cycle. Under serializable one of them fails instead.
    let txn = state
        .orm
        .begin_with_config(Some(IsolationLevel::Serializable), None)
        .await?;

    if Products::find_by_id(parent_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "parent product {parent_id} does not exist"
        )));
    }
    if Products::find_by_id(&component_id).one(&txn).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "component product {component_id} does not exist"
        )));
    }

    let duplicate = ProductComponents::find()
        .filter(LinkCol::ParentProductId.eq(parent_id))
        .filter(LinkCol::ComponentProductId.eq(&component_id))
        .one(&txn)
        .await?;
    if duplicate.is_some() {
        return Err(AppError::BadRequest(format!(
            "product {component_id} is already a component of {parent_id}"
        )));
    }

    if would_create_cycle(&txn, parent_id, &component_id).await? {
        return Err(AppError::CycleDetected(format!(
            "linking {component_id} under {parent_id} would make it contain its own ancestor"
        )));
    }
    if would_exceed_depth(&txn, parent_id, &component_id).await? {
        return Err(AppError::DepthExceeded(format!(
            "linking {component_id} under {parent_id} would exceed the 2-level composition limit"
        )));
    }

    let link = LinkActive {
        id: Set(Uuid::new_v4()),
        parent_product_id: Set(parent_id.to_string()),
        component_product_id: Set(component_id.clone()),
        quantity: Set(payload.quantity.unwrap_or(1)),
        is_required: Set(payload.is_required.unwrap_or(false)),
        is_included: Set(payload.is_included.unwrap_or(true)),
        price_override: Set(payload.price_override),
        display_name: Set(payload.display_name),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "component_add",
        Some("product_components"),
        Some(serde_json::json!({ "parent": parent_id, "component": component_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Component added",
        link_from_entity(link),
        Some(Meta::empty()),
    ))
}

pub async fn remove_component(
    state: &AppState,
    parent_id: &str,
    component_id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = ProductComponents::delete_many()
        .filter(LinkCol::ParentProductId.eq(parent_id))
        .filter(LinkCol::ComponentProductId.eq(component_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::RelationshipNotFound(format!(
            "{component_id} is not a component of {parent_id}"
        )));
    }

    if let Err(err) = log_audit(
        &state.pool,
        "component_remove",
        Some("product_components"),
        Some(serde_json::json!({ "parent": parent_id, "component": component_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Component removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn update_component(
    state: &AppState,
    parent_id: &str,
    component_id: &str,
    payload: UpdateComponentRequest,
) -> AppResult<ApiResponse<ComponentLink>> {
    let existing = ProductComponents::find()
        .filter(LinkCol::ParentProductId.eq(parent_id))
        .filter(LinkCol::ComponentProductId.eq(component_id))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(link) => link,
        None => {
            return Err(AppError::RelationshipNotFound(format!(
                "{component_id} is not a component of {parent_id}"
            )));
        }
    };

    let mut active: LinkActive = existing.into();
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(is_required) = payload.is_required {
        active.is_required = Set(is_required);
    }
    if let Some(is_included) = payload.is_included {
        active.is_included = Set(is_included);
    }
    // Double-Option fields: outer None leaves the column alone, an explicit
    // JSON null clears it.
    if let Some(price_override) = payload.price_override {
        active.price_override = Set(price_override);
    }
    if let Some(display_name) = payload.display_name {
        active.display_name = Set(display_name);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }

    let link = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "component_update",
        Some("product_components"),
        Some(serde_json::json!({ "parent": parent_id, "component": component_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Component updated",
        link_from_entity(link),
        Some(Meta::empty()),
    ))
}

pub async fn get_component_tree(
    state: &AppState,
    product_id: &str,
) -> AppResult<ApiResponse<Vec<ComponentNode>>> {
    let tree = fetch_tree(&state.orm, product_id).await?;
    Ok(ApiResponse::success("Component tree", tree, None))
}

pub async fn get_direct_components(
    state: &AppState,
    product_id: &str,
) -> AppResult<ApiResponse<Vec<ComponentNode>>> {
    let nodes = fetch_level(&state.orm, product_id)
        .await?
        .into_iter()
        .map(|(product, link)| ComponentNode {
            component: product,
            link,
            sub_components: Vec::new(),
        })
        .collect();
    Ok(ApiResponse::success("Direct components", nodes, None))
}

pub async fn get_parent_products(
    state: &AppState,
    component_id: &str,
) -> AppResult<ApiResponse<Vec<ParentProduct>>> {
    let edges = ProductComponents::find()
        .filter(LinkCol::ComponentProductId.eq(component_id))
        .order_by_asc(LinkCol::SortOrder)
        .all(&state.orm)
        .await?;

    let parent_ids: Vec<String> = edges.iter().map(|e| e.parent_product_id.clone()).collect();
    let products = load_products(&state.orm, parent_ids).await?;

    let parents = edges
        .into_iter()
        .filter_map(|edge| {
            products.get(&edge.parent_product_id).map(|product| ParentProduct {
                product: product.clone(),
                link: link_from_entity(edge),
            })
        })
        .collect();

    Ok(ApiResponse::success("Parent products", parents, None))
}

/// Materialize the two-level component tree of a product. Level 3 and below
/// are never queried, so deeper (malformed) data stays invisible to readers.
pub async fn fetch_tree<C: ConnectionTrait>(
    conn: &C,
    product_id: &str,
) -> AppResult<Vec<ComponentNode>> {
    let level1 = fetch_level(conn, product_id).await?;

    let level1_ids: Vec<String> = level1
        .iter()
        .map(|(product, _)| product.id.clone())
        .collect();

    let sub_edges = if level1_ids.is_empty() {
        Vec::new()
    } else {
        ProductComponents::find()
            .filter(LinkCol::ParentProductId.is_in(level1_ids))
            .order_by_asc(LinkCol::SortOrder)
            .all(conn)
            .await?
    };

    let sub_product_ids: Vec<String> = sub_edges
        .iter()
        .map(|e| e.component_product_id.clone())
        .collect();
    let sub_products = load_products(conn, sub_product_ids).await?;

    let mut subs_by_parent: HashMap<String, Vec<SubComponentNode>> = HashMap::new();
    for edge in sub_edges {
        if let Some(product) = sub_products.get(&edge.component_product_id) {
            subs_by_parent
                .entry(edge.parent_product_id.clone())
                .or_default()
                .push(SubComponentNode {
                    component: product.clone(),
                    link: link_from_entity(edge),
                });
        }
    }

    Ok(level1
        .into_iter()
        .map(|(product, link)| {
            let sub_components = subs_by_parent.remove(&product.id).unwrap_or_default();
            ComponentNode {
                component: product,
                link,
                sub_components,
            }
        })
        .collect())
}

async fn fetch_level<C: ConnectionTrait>(
    conn: &C,
    product_id: &str,
) -> AppResult<Vec<(crate::models::Product, ComponentLink)>> {
    let edges = ProductComponents::find()
        .filter(LinkCol::ParentProductId.eq(product_id))
        .order_by_asc(LinkCol::SortOrder)
        .all(conn)
        .await?;

    let component_ids: Vec<String> = edges
        .iter()
        .map(|e| e.component_product_id.clone())
        .collect();
    let products = load_products(conn, component_ids).await?;

    Ok(edges
        .into_iter()
        .filter_map(|edge| {
            products
                .get(&edge.component_product_id)
                .map(|product| (product.clone(), link_from_entity(edge)))
        })
        .collect())
}

async fn load_products<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<String>,
) -> AppResult<HashMap<String, crate::models::Product>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let products = Products::find()
        .filter(crate::entity::products::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(products
        .into_iter()
        .map(|model| (model.id.clone(), product_from_entity(model)))
        .collect())
}

pub(crate) fn link_from_entity(model: LinkModel) -> ComponentLink {
    ComponentLink {
        id: model.id,
        parent_product_id: model.parent_product_id,
        component_product_id: model.component_product_id,
        quantity: model.quantity,
        is_required: model.is_required,
        is_included: model.is_included,
        price_override: model.price_override,
        display_name: model.display_name,
        sort_order: model.sort_order,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
