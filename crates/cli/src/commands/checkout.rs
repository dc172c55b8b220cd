//! Checkout review command.

#![allow(clippy::print_stdout)]

use verdant_client::Storefront;
use verdant_client::checkout::OrderSummary;
use verdant_client::error::ApiError;

use verdant_core::{CurrencyCode, Money};

fn inr(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, CurrencyCode::INR)
}

/// Show the order summary for the current cart.
///
/// Checkout requires a signed-in session; order placement itself happens
/// against the backend, which empties the server cart as a side effect.
pub async fn review(store: &Storefront) -> Result<(), ApiError> {
    if !store.session().is_authenticated() {
        return Err(ApiError::Unauthorized(
            "sign in to check out".to_string(),
        ));
    }

    store.cart().load().await;
    let state = store.cart().state();
    if state.items.is_empty() {
        println!("cart is empty; nothing to check out");
        return Ok(());
    }

    let summary = OrderSummary::for_cart(&state);
    println!("subtotal  {}", inr(summary.subtotal));
    println!("shipping  {}", inr(summary.shipping));
    println!("tax       {}", inr(summary.tax));
    println!("total     {}", inr(summary.total));

    Ok(())
}
