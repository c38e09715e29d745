use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest, VersionedProduct},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::{Product, ProductKind, ProductStatus},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::version_service,
    sku::Sku,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    if let Some(status) = query.status {
        condition = condition.add(Column::Status.eq(status.as_str()));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound(format!("product {id} does not exist"))),
    };
    Ok(ApiResponse::success("Product", result, None))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let sku = Sku::parse(&payload.sku)
        .ok_or_else(|| AppError::BadRequest(format!("malformed SKU '{}'", payload.sku)))?;

    let id = payload.id.unwrap_or_else(|| payload.slug.clone());
    if Products::find_by_id(&id).one(&state.orm).await?.is_some() {
        return Err(AppError::BadRequest(format!("product {id} already exists")));
    }

    let active = ActiveModel {
        id: Set(id),
        sku: Set(sku.to_string()),
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description),
        price: Set(payload.price),
        component_price: Set(payload.component_price),
        currency: Set(payload.currency.unwrap_or_else(|| "USD".to_string())),
        status: Set(ProductStatus::Active.as_str().to_string()),
        is_available: Set(true),
        stock: Set(payload.stock.unwrap_or(0)),
        version: Set(sku.version as i32),
        base_product_id: Set(None),
        previous_version_id: Set(None),
        replaced_by: Set(None),
        product_type: Set(payload
            .product_type
            .unwrap_or(ProductKind::Standalone)
            .as_str()
            .to_string()),
        sunset_at: Set(None),
        sunset_reason: Set(None),
        replacement_id: Set(None),
        discontinued_at: Set(None),
        discontinued_reason: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Admin edit entry point. A product referenced by order history is never
/// mutated in place: the edit is rerouted through a version fork and the
/// response says which path was taken.
pub async fn update_product(
    state: &AppState,
    id: &str,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<VersionedProduct>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound(format!("product {id} does not exist"))),
    };

    if version_service::is_product_in_orders(state, id).await? {
        let forked = version_service::fork_version(
            state,
            id,
            crate::dto::versions::CreateVersionRequest {
                name: payload.name,
                slug: payload.slug,
                description: payload.description,
                price: payload.price,
                component_price: payload.component_price,
                stock: payload.stock,
            },
        )
        .await?;

        return Ok(ApiResponse::success(
            "Product has order history; edit applied as a new version",
            VersionedProduct {
                product: forked,
                versioned: true,
            },
            Some(Meta::empty()),
        ));
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(slug) = payload.slug {
        active.slug = Set(slug);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(component_price) = payload.component_price {
        active.component_price = Set(Some(component_price));
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        VersionedProduct {
            product: product_from_entity(product),
            versioned: false,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if version_service::is_product_in_orders(state, id).await? {
        return Err(AppError::ReferencedInOrders(format!(
            "cannot delete product {id}: it exists in orders; use sunset or versioning instead"
        )));
    }

    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("product {id} does not exist")));
    }

    if let Err(err) = log_audit(
        &state.pool,
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        status: ProductStatus::parse(&model.status).unwrap_or(ProductStatus::Active),
        product_type: ProductKind::parse(&model.product_type).unwrap_or(ProductKind::Standalone),
        id: model.id,
        sku: model.sku,
        name: model.name,
        slug: model.slug,
        description: model.description,
        price: model.price,
        component_price: model.component_price,
        currency: model.currency,
        is_available: model.is_available,
        stock: model.stock,
        version: model.version,
        base_product_id: model.base_product_id,
        previous_version_id: model.previous_version_id,
        replaced_by: model.replaced_by,
        sunset_at: model.sunset_at.map(|dt| dt.with_timezone(&Utc)),
        sunset_reason: model.sunset_reason,
        replacement_id: model.replacement_id,
        discontinued_at: model.discontinued_at.map(|dt| dt.with_timezone(&Utc)),
        discontinued_reason: model.discontinued_reason,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
