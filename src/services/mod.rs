pub mod component_service;
pub mod pricing_service;
pub mod product_service;
pub mod version_service;
