use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IsolationLevel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::{
    audit::log_audit,
    dto::versions::{CreateVersionRequest, DiscontinueRequest, SunsetRequest, VersionList},
    entity::products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    models::{Product, ProductStatus},
    response::{ApiResponse, Meta},
    services::product_service::product_from_entity,
    sku::Sku,
    state::AppState,
};

/// True when the product id appears anywhere in order history: as a direct
/// order line, or nested at depth 1 or depth 2 of a `component_tree`
/// snapshot. A product never sold standalone is still locked if it was
/// bundled inside something that was sold.
pub async fn is_product_in_orders(state: &AppState, product_id: &str) -> AppResult<bool> {
    let direct: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM order_items WHERE product_id = $1)",
    )
    .bind(product_id)
    .fetch_one(&state.pool)
    .await?;
    if direct {
        return Ok(true);
    }

    let depth_one: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM (
                SELECT component_tree FROM order_items
                WHERE jsonb_typeof(component_tree->'items') = 'array'
            ) oi
            CROSS JOIN LATERAL jsonb_array_elements(oi.component_tree->'items') AS node(value)
            WHERE node.value->>'product_id' = $1
        )
        "#,
    )
    .bind(product_id)
    .fetch_one(&state.pool)
    .await?;
    if depth_one {
        return Ok(true);
    }

    let depth_two: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM (
                SELECT component_tree FROM order_items
                WHERE jsonb_typeof(component_tree->'items') = 'array'
            ) oi
            CROSS JOIN LATERAL jsonb_array_elements(oi.component_tree->'items') AS node(value)
            CROSS JOIN LATERAL jsonb_array_elements(
                CASE WHEN jsonb_typeof(node.value->'components') = 'array'
                     THEN node.value->'components'
                     ELSE '[]'::jsonb
                END
            ) AS sub(value)
            WHERE sub.value->>'product_id' = $1
        )
        "#,
    )
    .bind(product_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(depth_two)
}

/// Fork a new editable version of a product, leaving the old row intact and
/// forwarding. Returns the new product.
pub async fn fork_version(
    state: &AppState,
    product_id: &str,
    payload: CreateVersionRequest,
) -> AppResult<Product> {
    // Read-modify-write over two rows; serializable so concurrent forks of
    // the same row cannot both derive the same successor.
    let txn = state
        .orm
        .begin_with_config(Some(IsolationLevel::Serializable), None)
        .await?;

    let current = Products::find_by_id(product_id).one(&txn).await?;
    let current = match current {
        Some(p) => p,
        None => {
            return Err(AppError::NotFound(format!(
                "product {product_id} does not exist"
            )));
        }
    };

    // A replaced row already has a successor; forking it again would derive
    // the same id and SKU. The chain grows from its latest version only.
    if let Some(replaced_by) = &current.replaced_by {
        return Err(AppError::BadRequest(format!(
            "product {product_id} was already replaced by {replaced_by}; fork the latest version instead"
        )));
    }

    let sku = Sku::parse(&current.sku).ok_or_else(|| {
        AppError::BadRequest(format!(
            "product {product_id} has a malformed SKU '{}'",
            current.sku
        ))
    })?;

    let new_version = current.version + 1;
    // The first fork establishes the lineage: a product with no base id is
    // its own lineage root.
    let base_id = current
        .base_product_id
        .clone()
        .unwrap_or_else(|| current.id.clone());
    let new_id = format!("{base_id}-v{new_version}");
    let new_slug = payload
        .slug
        .unwrap_or_else(|| format!("{}-v{new_version}", current.slug));

    let new_product = ProductActive {
        id: Set(new_id.clone()),
        sku: Set(sku.increment_version().to_string()),
        name: Set(payload.name.unwrap_or_else(|| current.name.clone())),
        slug: Set(new_slug),
        description: Set(payload.description.or_else(|| current.description.clone())),
        price: Set(payload.price.unwrap_or(current.price)),
        component_price: Set(payload.component_price.or(current.component_price)),
        currency: Set(current.currency.clone()),
        status: Set(ProductStatus::Active.as_str().to_string()),
        is_available: Set(true),
        stock: Set(payload.stock.unwrap_or(current.stock)),
        version: Set(new_version),
        base_product_id: Set(Some(base_id)),
        previous_version_id: Set(Some(current.id.clone())),
        replaced_by: Set(None),
        product_type: Set(current.product_type.clone()),
        sunset_at: Set(None),
        sunset_reason: Set(None),
        replacement_id: Set(None),
        discontinued_at: Set(None),
        discontinued_reason: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut old: ProductActive = current.into();
    old.replaced_by = Set(Some(new_id.clone()));
    old.updated_at = Set(Utc::now().into());
    old.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_versioned",
        Some("products"),
        Some(serde_json::json!({ "product_id": product_id, "new_id": new_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(product_from_entity(new_product))
}

pub async fn create_product_version(
    state: &AppState,
    product_id: &str,
    payload: CreateVersionRequest,
) -> AppResult<ApiResponse<Product>> {
    let product = fork_version(state, product_id, payload).await?;
    Ok(ApiResponse::success(
        "Product version created",
        product,
        Some(Meta::empty()),
    ))
}

/// Mark a product unavailable for new purchases without discontinuing it.
/// Allowed regardless of order history; this is the safe alternative to
/// editing or deleting a product that orders reference.
pub async fn sunset_product(
    state: &AppState,
    product_id: &str,
    payload: SunsetRequest,
) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => {
            return Err(AppError::NotFound(format!(
                "product {product_id} does not exist"
            )));
        }
    };

    // Sunset and discontinued are terminal; re-stamping would overwrite the
    // original timestamp and reason.
    if product.status != ProductStatus::Active.as_str() {
        return Err(AppError::BadRequest(format!(
            "product {product_id} is already {}; only active products can be sunset",
            product.status
        )));
    }

    let mut active: ProductActive = product.into();
    active.status = Set(ProductStatus::Sunset.as_str().to_string());
    active.is_available = Set(false);
    active.sunset_at = Set(Some(Utc::now().into()));
    active.sunset_reason = Set(Some(payload.reason));
    active.replacement_id = Set(payload.replacement_id);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_sunset",
        Some("products"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product sunset",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn discontinue_product(
    state: &AppState,
    product_id: &str,
    payload: DiscontinueRequest,
) -> AppResult<ApiResponse<Product>> {
    if is_product_in_orders(state, product_id).await? {
        return Err(AppError::ReferencedInOrders(format!(
            "cannot discontinue product {product_id}: it exists in orders; use sunset instead"
        )));
    }

    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => {
            return Err(AppError::NotFound(format!(
                "product {product_id} does not exist"
            )));
        }
    };

    if product.status != ProductStatus::Active.as_str() {
        return Err(AppError::BadRequest(format!(
            "product {product_id} is already {}; only active products can be discontinued",
            product.status
        )));
    }

    let mut active: ProductActive = product.into();
    active.status = Set(ProductStatus::Discontinued.as_str().to_string());
    active.is_available = Set(false);
    active.discontinued_at = Set(Some(Utc::now().into()));
    active.discontinued_reason = Set(Some(payload.reason));
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_discontinued",
        Some("products"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product discontinued",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Full version chain for a lineage, oldest first. `base_id` may be the
/// lineage root's own id (products forked before ever being versioned have
/// no `base_product_id`).
pub async fn get_product_versions(
    state: &AppState,
    base_id: &str,
) -> AppResult<ApiResponse<VersionList>> {
    let items = version_chain(state, base_id).await?;
    Ok(ApiResponse::success(
        "Product versions",
        VersionList { items },
        None,
    ))
}

pub async fn get_latest_version(
    state: &AppState,
    base_id: &str,
) -> AppResult<ApiResponse<Product>> {
    let mut items = version_chain(state, base_id).await?;
    match items.pop() {
        Some(latest) => Ok(ApiResponse::success("Latest version", latest, None)),
        None => Err(AppError::NotFound(format!(
            "no versions found for {base_id}"
        ))),
    }
}

async fn version_chain(state: &AppState, base_id: &str) -> AppResult<Vec<Product>> {
    let products = Products::find()
        .filter(
            Condition::any()
                .add(ProdCol::BaseProductId.eq(base_id))
                .add(ProdCol::Id.eq(base_id)),
        )
        .order_by_asc(ProdCol::Version)
        .all(&state.orm)
        .await?;

    Ok(products.into_iter().map(product_from_entity).collect())
}
