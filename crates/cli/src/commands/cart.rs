//! Cart commands.
//!
//! All of these go through the synchronizer, which decides whether the live
//! cart is the server's or the local guest snapshot.

#![allow(clippy::print_stdout)]

use verdant_client::Storefront;
use verdant_client::cart::CartState;
use verdant_client::error::CartError;

use verdant_core::{CartItemId, CurrencyCode, Money, VariantId};

fn print_state(state: &CartState) {
    if state.items.is_empty() {
        println!("cart is empty");
        return;
    }

    for item in &state.items {
        let title = item
            .variant
            .product
            .as_ref()
            .map_or_else(|| format!("variant {}", item.variant.id), |p| p.title.clone());
        let line_total = item.line_total().map_or_else(
            || "-".to_string(),
            |t| Money::new(t, CurrencyCode::INR).to_string(),
        );
        println!(
            "  [{}] {:<32} x{:<3} {:>10}",
            item.id, title, item.quantity, line_total
        );
    }
    println!(
        "{} items, subtotal {}",
        state.count(),
        Money::new(state.total(), CurrencyCode::INR)
    );
}

/// Show the current cart.
pub async fn show(store: &Storefront) {
    store.cart().load().await;
    print_state(&store.cart().state());
}

/// Add a variant to the cart.
pub async fn add(store: &Storefront, variant_id: i64, quantity: u32) -> Result<(), CartError> {
    store
        .cart()
        .add_item(VariantId::new(variant_id), quantity)
        .await?;
    print_state(&store.cart().state());
    Ok(())
}

/// Change a line's quantity.
pub async fn update(store: &Storefront, item_id: i64, quantity: i64) -> Result<(), CartError> {
    store
        .cart()
        .update_quantity(CartItemId::new(item_id), quantity)
        .await?;
    print_state(&store.cart().state());
    Ok(())
}

/// Remove a line.
pub async fn remove(store: &Storefront, item_id: i64) -> Result<(), CartError> {
    store.cart().remove_item(CartItemId::new(item_id)).await?;
    print_state(&store.cart().state());
    Ok(())
}

/// Apply a coupon code.
pub async fn coupon(store: &Storefront, code: &str) -> Result<(), CartError> {
    store.cart().apply_coupon(code).await?;
    println!("coupon applied");
    print_state(&store.cart().state());
    Ok(())
}

/// Empty the cart.
pub fn clear(store: &Storefront) {
    store.cart().clear();
    println!("cart cleared");
}
