use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        components::{AddComponentRequest, ParentProduct, UpdateComponentRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest, VersionedProduct},
        versions::{CreateVersionRequest, DiscontinueRequest, SunsetRequest, VersionList},
    },
    models::{
        ComponentLink, ComponentNode, ComponentsPrice, Product, ProductKind, ProductStatus,
        SubComponentNode,
    },
    response::{ApiResponse, Meta},
    routes::{components, health, params, products as product_routes, versions},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        product_routes::list_products,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        components::get_component_tree,
        components::get_direct_components,
        components::add_component,
        components::update_component,
        components::remove_component,
        components::get_parent_products,
        components::components_price,
        versions::get_product_versions,
        versions::get_latest_version,
        versions::create_product_version,
        versions::sunset_product,
        versions::discontinue_product
    ),
    components(
        schemas(
            Product,
            ProductStatus,
            ProductKind,
            ComponentLink,
            ComponentNode,
            SubComponentNode,
            ComponentsPrice,
            CreateProductRequest,
            UpdateProductRequest,
            VersionedProduct,
            ProductList,
            AddComponentRequest,
            UpdateComponentRequest,
            ParentProduct,
            CreateVersionRequest,
            SunsetRequest,
            DiscontinueRequest,
            VersionList,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<VersionedProduct>,
            ApiResponse<ComponentsPrice>,
            ApiResponse<VersionList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Components", description = "Product composition endpoints"),
        (name = "Versions", description = "Product versioning and lifecycle endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
