//! Verdant client - typed SDK for the storefront REST API.
//!
//! # Architecture
//!
//! - `reqwest`-based REST clients, one per backend resource group
//! - The backend is the source of truth for authenticated carts; guest carts
//!   live in durable local storage and are merged server-side at login
//! - Catalog reads cached in-memory via `moka` (5 minute TTL); cart and
//!   account reads are never cached
//! - Session and cart state are observable containers (`tokio::sync::watch`)
//!   injected into their consumers
//!
//! # Example
//!
//! ```rust,ignore
//! use verdant_client::{Storefront, config::ClientConfig};
//!
//! let store = Storefront::new(ClientConfig::from_env()?)?;
//! store.restore_session().await;
//!
//! // Browse the catalog
//! let product = store.products().get("block-print-kurta").await?;
//!
//! // Works signed in or out; the synchronizer hides which cart is live
//! let variant = product.variants.first().expect("no variants");
//! store.cart().add_item(variant.id, 1).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
mod storefront;
pub mod types;

pub use storefront::Storefront;
