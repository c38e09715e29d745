use axum::{
    Json, Router,
    extract::{Path, State},
};

use crate::{
    dto::versions::{CreateVersionRequest, DiscontinueRequest, SunsetRequest, VersionList},
    error::AppResult,
    models::Product,
    response::ApiResponse,
    services::version_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/versions", axum::routing::get(get_product_versions))
        .route("/{id}/versions", axum::routing::post(create_product_version))
        .route(
            "/{id}/versions/latest",
            axum::routing::get(get_latest_version),
        )
        .route("/{id}/sunset", axum::routing::post(sunset_product))
        .route("/{id}/discontinue", axum::routing::post(discontinue_product))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/versions",
    params(
        ("id" = String, Path, description = "Lineage root (base product) ID")
    ),
    responses(
        (status = 200, description = "Version chain, oldest first", body = ApiResponse<VersionList>)
    ),
    tag = "Versions"
)]
pub async fn get_product_versions(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<VersionList>>> {
    Ok(Json(
        version_service::get_product_versions(&state, &id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/versions/latest",
    params(
        ("id" = String, Path, description = "Lineage root (base product) ID")
    ),
    responses(
        (status = 200, description = "Latest version in the chain", body = ApiResponse<Product>),
        (status = 404, description = "No versions found"),
    ),
    tag = "Versions"
)]
pub async fn get_latest_version(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(
        version_service::get_latest_version(&state, &id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/versions",
    params(
        ("id" = String, Path, description = "Product ID to fork")
    ),
    request_body = CreateVersionRequest,
    responses(
        (status = 200, description = "New version created; old row forwards to it", body = ApiResponse<Product>),
        (status = 400, description = "Product was already replaced by a newer version"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Versions"
)]
pub async fn create_product_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CreateVersionRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(
        version_service::create_product_version(&state, &id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/sunset",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = SunsetRequest,
    responses(
        (status = 200, description = "Product sunset", body = ApiResponse<Product>),
        (status = 400, description = "Product is not active"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Versions"
)]
pub async fn sunset_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SunsetRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(
        version_service::sunset_product(&state, &id, payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/discontinue",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = DiscontinueRequest,
    responses(
        (status = 200, description = "Product discontinued", body = ApiResponse<Product>),
        (status = 400, description = "Product is not active"),
        (status = 409, description = "Product is referenced by orders"),
    ),
    tag = "Versions"
)]
pub async fn discontinue_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<DiscontinueRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(
        version_service::discontinue_product(&state, &id, payload).await?,
    ))
}
