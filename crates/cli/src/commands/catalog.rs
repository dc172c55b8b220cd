//! Catalog browsing commands.

#![allow(clippy::print_stdout)]

use verdant_client::Storefront;
use verdant_client::api::ProductQuery;
use verdant_client::error::ApiError;

use verdant_core::{CurrencyCode, Money};

fn inr(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, CurrencyCode::INR)
}

/// List products matching the given filters.
pub async fn list_products(
    store: &Storefront,
    category: Option<String>,
    search: Option<String>,
    page: Option<u32>,
) -> Result<(), ApiError> {
    let query = ProductQuery {
        category,
        search,
        page,
        ..ProductQuery::default()
    };

    let listing = store.products().list(&query).await?;

    println!("{} products", listing.count);
    for product in &listing.results {
        let price = product
            .listing_price()
            .map_or_else(|| "-".to_string(), |p| inr(p).to_string());
        let stock = product.variants.first().map_or(0, |v| v.stock);
        println!("  {:<32} {:>10}  {} in stock", product.slug, price, stock);
    }
    if listing.next.is_some() {
        println!("  ... more on the next page");
    }

    Ok(())
}

/// Show one product in detail.
pub async fn show_product(store: &Storefront, slug: &str) -> Result<(), ApiError> {
    let product = store.products().get(slug).await?;

    println!("{}", product.title);
    if let Some(category) = &product.category {
        println!("category: {}", category.name);
    }
    if let Some(description) = &product.description {
        println!("\n{description}\n");
    }

    println!("variants:");
    for variant in &product.variants {
        let options = variant.option_text.as_deref().unwrap_or("default");
        println!(
            "  [{}] {:<24} {}  {} in stock",
            variant.id,
            options,
            inr(variant.price),
            variant.stock
        );
    }

    Ok(())
}

/// List all categories.
pub async fn list_categories(store: &Storefront) -> Result<(), ApiError> {
    let categories = store.products().categories().await?;

    for category in categories.iter() {
        println!("  {:<24} {}", category.slug, category.name);
    }

    Ok(())
}
