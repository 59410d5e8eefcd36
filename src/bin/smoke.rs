//! End-to-end smoke check against a running storefront backend: browse the
//! catalog, optionally log in (SMOKE_EMAIL / SMOKE_PASSWORD) and exercise the
//! cart round trip.

use storefront_client::config::StorefrontConfig;
use storefront_client::dto::products::ProductQuery;
use storefront_client::stores::Storefront;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StorefrontConfig::from_env()?;
    tracing::info!(api = %config.api_base_url, "connecting");

    let storefront = Storefront::from_config(&config)?;
    storefront.hydrate().await;

    let products = storefront
        .products
        .list_products(&ProductQuery::default())
        .await?;
    println!("{} products in catalog", products.len());
    for product in products.iter().take(5) {
        println!(
            "  {}: {} ({} in stock)",
            product.name,
            product.price,
            product.stock.total()
        );
    }

    let (email, password) = match (
        std::env::var("SMOKE_EMAIL"),
        std::env::var("SMOKE_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) => (email, password),
        _ => {
            println!("SMOKE_EMAIL / SMOKE_PASSWORD not set; skipping authenticated flow");
            return Ok(());
        }
    };

    let user = storefront.login(&email, &password).await?;
    println!("logged in as {} ({})", user.name, user.email);

    if let Some(product) = products.first() {
        let size = product.sizes.first().cloned().unwrap_or_default();
        let added = storefront
            .cart
            .add_to_cart(product, 1, &size, product.colors.first().cloned())
            .await;
        println!("add to cart: {added}, cart count {}", storefront.cart.cart_count());
    }

    let orders = storefront.orders.my_orders().await?;
    println!("{} past orders", orders.len());

    Ok(())
}
