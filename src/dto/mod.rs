pub mod components;
pub mod products;
pub mod versions;
