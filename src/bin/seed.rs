use axum_catalog_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    services::component_service::fetch_tree,
    snapshot,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    seed_products(&pool).await?;
    seed_components(&pool).await?;
    seed_order(&pool, &config.database_url).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (id, sku, name, price, component_price, product_type)
    let products: Vec<(&str, &str, &str, i64, Option<i64>, &str)> = vec![
        (
            "arctis-workstation",
            "NORD-PC-ARCTIS-V1",
            "Arctis Workstation",
            250_000,
            None,
            "standalone",
        ),
        (
            "ryzen9",
            "NORD-CPU-RYZEN9-V1",
            "Ryzen 9 CPU",
            45_000,
            Some(42_000),
            "component",
        ),
        (
            "rx9070",
            "NORD-GPU-RX9070-V1",
            "RX 9070 GPU",
            80_000,
            None,
            "component",
        ),
        (
            "axial120",
            "NORD-FAN-AXIAL120-V1",
            "Axial 120mm Fan",
            2_500,
            None,
            "component",
        ),
        (
            "nv2tb",
            "NORD-SSD-NV2TB-V1",
            "NV 2TB SSD",
            12_000,
            None,
            "component",
        ),
    ];

    for (id, sku, name, price, component_price, product_type) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, slug, price, component_price, product_type, stock)
            VALUES ($1, $2, $3, $1, $4, $5, $6, 25)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(sku)
        .bind(name)
        .bind(price)
        .bind(component_price)
        .bind(product_type)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_components(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (parent, component, quantity, is_included, price_override, sort_order)
    let edges: Vec<(&str, &str, i32, bool, Option<i64>, i32)> = vec![
        ("arctis-workstation", "ryzen9", 1, true, None, 0),
        ("arctis-workstation", "rx9070", 1, true, None, 1),
        ("arctis-workstation", "nv2tb", 1, false, Some(9_900), 2),
        ("rx9070", "axial120", 3, true, None, 0),
    ];

    for (parent, component, quantity, is_included, price_override, sort_order) in edges {
        sqlx::query(
            r#"
            INSERT INTO product_components
                (id, parent_product_id, component_product_id, quantity, is_required, is_included, price_override, sort_order)
            VALUES ($1, $2, $3, $4, TRUE, $5, $6, $7)
            ON CONFLICT (parent_product_id, component_product_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(parent)
        .bind(component)
        .bind(quantity)
        .bind(is_included)
        .bind(price_override)
        .bind(sort_order)
        .execute(pool)
        .await?;
    }

    println!("Seeded component graph");
    Ok(())
}

/// One historical order for the workstation, with its composition frozen
/// into the order item. This is what locks the seeded products against
/// in-place edits.
async fn seed_order(pool: &sqlx::PgPool, database_url: &str) -> anyhow::Result<()> {
    let invoice_number = "INV-SEED-0001";

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE invoice_number = $1)")
            .bind(invoice_number)
            .fetch_one(pool)
            .await?;
    if exists {
        println!("Seed order already present");
        return Ok(());
    }

    let orm = create_orm_conn(database_url).await?;
    let tree = fetch_tree(&orm, "arctis-workstation").await?;
    let component_tree = serde_json::to_value(snapshot::capture(&tree))?;

    let order_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO orders (id, total_amount, status, invoice_number) VALUES ($1, $2, 'paid', $3)",
    )
    .bind(order_id)
    .bind(250_000_i64)
    .bind(invoice_number)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO order_items (id, order_id, product_id, quantity, price, component_tree)
        VALUES ($1, $2, $3, 1, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind("arctis-workstation")
    .bind(250_000_i64)
    .bind(component_tree)
    .execute(pool)
    .await?;

    println!("Seeded order {invoice_number}");
    Ok(())
}
