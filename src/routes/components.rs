use axum::{
    Json, Router,
    extract::{Path, State},
};

use crate::{
    dto::components::{AddComponentRequest, ParentProduct, UpdateComponentRequest},
    error::AppResult,
    models::{ComponentLink, ComponentNode, ComponentsPrice},
    response::ApiResponse,
    services::{component_service, pricing_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/components", axum::routing::get(get_component_tree))
        .route("/{id}/components", axum::routing::post(add_component))
        .route(
            "/{id}/components/direct",
            axum::routing::get(get_direct_components),
        )
        .route(
            "/{id}/components/{component_id}",
            axum::routing::patch(update_component),
        )
        .route(
            "/{id}/components/{component_id}",
            axum::routing::delete(remove_component),
        )
        .route("/{id}/parents", axum::routing::get(get_parent_products))
        .route("/{id}/price", axum::routing::get(components_price))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/components",
    params(
        ("id" = String, Path, description = "Parent product ID")
    ),
    responses(
        (status = 200, description = "Two-level component tree", body = ApiResponse<Vec<ComponentNode>>)
    ),
    tag = "Components"
)]
pub async fn get_component_tree(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ComponentNode>>>> {
    Ok(Json(
        component_service::get_component_tree(&state, &id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/components/direct",
    params(
        ("id" = String, Path, description = "Parent product ID")
    ),
    responses(
        (status = 200, description = "Direct components only", body = ApiResponse<Vec<ComponentNode>>)
    ),
    tag = "Components"
)]
pub async fn get_direct_components(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ComponentNode>>>> {
    Ok(Json(
        component_service::get_direct_components(&state, &id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/components",
    params(
        ("id" = String, Path, description = "Parent product ID")
    ),
    request_body = AddComponentRequest,
    responses(
        (status = 200, description = "Component linked", body = ApiResponse<ComponentLink>),
        (status = 404, description = "Parent or component product not found"),
        (status = 409, description = "Cycle or depth violation"),
    ),
    tag = "Components"
)]
pub async fn add_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AddComponentRequest>,
) -> AppResult<Json<ApiResponse<ComponentLink>>> {
    Ok(Json(
        component_service::add_component(&state, &id, payload).await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/components/{component_id}",
    params(
        ("id" = String, Path, description = "Parent product ID"),
        ("component_id" = String, Path, description = "Component product ID"),
    ),
    request_body = UpdateComponentRequest,
    responses(
        (status = 200, description = "Component relationship updated", body = ApiResponse<ComponentLink>),
        (status = 404, description = "Relationship not found"),
    ),
    tag = "Components"
)]
pub async fn update_component(
    State(state): State<AppState>,
    Path((id, component_id)): Path<(String, String)>,
    Json(payload): Json<UpdateComponentRequest>,
) -> AppResult<Json<ApiResponse<ComponentLink>>> {
    Ok(Json(
        component_service::update_component(&state, &id, &component_id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/components/{component_id}",
    params(
        ("id" = String, Path, description = "Parent product ID"),
        ("component_id" = String, Path, description = "Component product ID"),
    ),
    responses(
        (status = 200, description = "Component unlinked"),
        (status = 404, description = "Relationship not found"),
    ),
    tag = "Components"
)]
pub async fn remove_component(
    State(state): State<AppState>,
    Path((id, component_id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    Ok(Json(
        component_service::remove_component(&state, &id, &component_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/parents",
    params(
        ("id" = String, Path, description = "Component product ID")
    ),
    responses(
        (status = 200, description = "Products that use this one as a component", body = ApiResponse<Vec<ParentProduct>>)
    ),
    tag = "Components"
)]
pub async fn get_parent_products(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ParentProduct>>>> {
    Ok(Json(
        component_service::get_parent_products(&state, &id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/price",
    params(
        ("id" = String, Path, description = "Parent product ID")
    ),
    responses(
        (status = 200, description = "Included / optional / total component pricing", body = ApiResponse<ComponentsPrice>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Components"
)]
pub async fn components_price(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ComponentsPrice>>> {
    Ok(Json(
        pricing_service::calculate_components_price(&state, &id).await?,
    ))
}
