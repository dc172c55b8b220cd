//! REST clients for the storefront backend.
//!
//! One client struct per backend resource group, all sharing the [`Http`]
//! plumbing: a single `reqwest::Client`, base-URL joining, bearer-token
//! injection from the session holder, and status-to-error mapping.
//!
//! Requests carry the bearer credential whenever the session holds one;
//! its absence means guest mode is active.

mod auth;
mod cart;
mod http;
mod products;

pub use auth::AuthApi;
pub use cart::CartApi;
pub(crate) use http::Http;
pub use products::{ProductQuery, ProductsApi};
