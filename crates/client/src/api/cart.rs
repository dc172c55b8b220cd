//! Server-side cart endpoints.
//!
//! All operations act on the cart belonging to the bearer credential. The
//! synchronizer treats every mutation as fire-and-resync: it issues the call,
//! then re-fetches the cart so the visible snapshot always reflects
//! backend-computed pricing, stock clamps, and line merging rather than a
//! client-side guess. Mutation responses are therefore discarded here.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use verdant_core::{CartItemId, VariantId};

use crate::error::ApiError;
use crate::types::{Cart, MergeItem};

use super::Http;

#[derive(Serialize)]
struct AddItemRequest {
    variant_id: VariantId,
    quantity: u32,
}

#[derive(Serialize)]
struct UpdateItemRequest {
    quantity: u32,
}

#[derive(Serialize)]
struct CouponRequest<'a> {
    code: &'a str,
}

#[derive(Serialize)]
struct MergeRequest<'a> {
    items: &'a [MergeItem],
}

/// Client for the server-side cart resource.
#[derive(Clone)]
pub struct CartApi {
    http: Http,
}

impl CartApi {
    pub(crate) const fn new(http: Http) -> Self {
        Self { http }
    }

    /// Fetch the full cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is not
    /// authenticated.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<Cart, ApiError> {
        self.http
            .send(self.http.request(Method::GET, "cart/"))
            .await
    }

    /// Add `quantity` units of a variant to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the addition (e.g. stock
    /// exceeded) or the request fails.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn add_item(&self, variant_id: VariantId, quantity: u32) -> Result<(), ApiError> {
        let body = AddItemRequest {
            variant_id,
            quantity,
        };
        self.http
            .send_ack(self.http.request(Method::POST, "cart/").json(&body))
            .await
    }

    /// Set the quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_item(&self, item_id: CartItemId, quantity: u32) -> Result<(), ApiError> {
        let path = format!("cart/{item_id}/");
        let body = UpdateItemRequest { quantity };
        self.http
            .send_ack(self.http.request(Method::PATCH, &path).json(&body))
            .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line does not exist or the request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        let path = format!("cart/{item_id}/");
        self.http
            .send_ack(self.http.request(Method::DELETE, &path))
            .await
    }

    /// Apply a coupon code to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is rejected or the request fails.
    #[instrument(skip(self, code))]
    pub async fn apply_coupon(&self, code: &str) -> Result<Cart, ApiError> {
        let body = CouponRequest { code };
        self.http
            .send(
                self.http
                    .request(Method::POST, "cart/apply-coupon/")
                    .json(&body),
            )
            .await
    }

    /// Merge guest-accumulated lines into the credential's cart.
    ///
    /// The backend owns reconciliation: duplicate variants are combined and
    /// quantities clamped to stock server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn merge(&self, items: &[MergeItem]) -> Result<Cart, ApiError> {
        let body = MergeRequest { items };
        self.http
            .send(self.http.request(Method::POST, "cart/merge/").json(&body))
            .await
    }
}
