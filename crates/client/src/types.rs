//! Domain types for the Verdant storefront REST API.
//!
//! These mirror the backend's JSON shapes. Catalog payloads are fully
//! populated by the backend; cart lines carry a [`VariantSnapshot`] whose
//! pricing fields are optional because a guest-added line has never been
//! through a fetch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use verdant_core::{AddressId, CartItemId, CategoryId, Email, ProductId, UserId, VariantId};

// =============================================================================
// Catalog Types
// =============================================================================

/// Product or category image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image URL.
    pub image: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt_text: Option<String>,
    /// Whether this is the primary listing image.
    #[serde(default)]
    pub is_primary: bool,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID (pass to cart operations).
    pub id: VariantId,
    /// Current selling price.
    pub price: Decimal,
    /// Maximum retail price (strike-through price if discounted).
    #[serde(default)]
    pub mrp: Option<Decimal>,
    /// Units in stock.
    pub stock: u32,
    /// Human-readable option summary (e.g., "Blue / L").
    #[serde(default)]
    pub option_text: Option<String>,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Plain text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Fallback price when a product has no variants yet.
    #[serde(default)]
    pub base_price: Option<Decimal>,
    /// Owning category.
    #[serde(default)]
    pub category: Option<Category>,
    /// Product images.
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Purchasable variants.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The primary listing image, falling back to the first one.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|img| img.is_primary)
            .or_else(|| self.images.first())
    }

    /// Listing price: first variant's price, else the base price.
    #[must_use]
    pub fn listing_price(&self) -> Option<Decimal> {
        self.variants
            .first()
            .map(|v| v.price)
            .or(self.base_price)
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Total number of results across all pages.
    pub count: i64,
    /// URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page, if any.
    #[serde(default)]
    pub previous: Option<String>,
    /// Results on this page.
    pub results: Vec<T>,
}

// =============================================================================
// Cart Types
// =============================================================================

/// Trimmed product data embedded in a cart line's variant snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Product ID.
    #[serde(default)]
    pub id: Option<ProductId>,
    /// Display title.
    pub title: String,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Product images.
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

/// Denormalized variant data attached to a cart line at fetch time.
///
/// Only the variant ID is guaranteed. A line added while signed out has not
/// been through a fetch, so its pricing and display fields are absent until
/// the first authoritative read repopulates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSnapshot {
    /// Variant ID.
    pub id: VariantId,
    /// Selling price, when known.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Maximum retail price, when known.
    #[serde(default)]
    pub mrp: Option<Decimal>,
    /// Units in stock, when known.
    #[serde(default)]
    pub stock: Option<u32>,
    /// Human-readable option summary.
    #[serde(default)]
    pub option_text: Option<String>,
    /// Owning product, when known.
    #[serde(default)]
    pub product: Option<ProductSummary>,
}

impl VariantSnapshot {
    /// A snapshot holding nothing but the variant reference.
    #[must_use]
    pub const fn bare(id: VariantId) -> Self {
        Self {
            id,
            price: None,
            mrp: None,
            stock: None,
            option_text: None,
            product: None,
        }
    }
}

/// A line in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Line ID. Backend-assigned for server carts; provisional (locally
    /// allocated, never sent to the backend) for guest carts.
    pub id: CartItemId,
    /// Variant reference plus denormalized display data.
    pub variant: VariantSnapshot,
    /// Units of the variant. Always at least 1 while the line exists.
    pub quantity: u32,
}

impl CartItem {
    /// Line total, when the price is known.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.variant
            .price
            .map(|price| price * Decimal::from(self.quantity))
    }
}

/// A cart as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Cart {
    /// Cart lines, in backend order.
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// One guest line submitted to the merge endpoint.
///
/// Provisional line IDs stay on the client; the backend reconciles purely on
/// (variant, quantity) pairs.
#[derive(Debug, Clone, Serialize)]
pub struct MergeItem {
    /// Variant to merge in.
    pub variant_id: VariantId,
    /// Units accumulated while signed out.
    pub quantity: u32,
}

// =============================================================================
// Account Types
// =============================================================================

/// An authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID.
    pub id: UserId,
    /// Account email.
    pub email: Email,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Account creation timestamp.
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

/// Response to a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// The authenticated profile.
    pub user: UserProfile,
    /// Bearer access token for subsequent requests.
    pub access: String,
}

/// New-account registration payload.
///
/// `Debug` is implemented manually to redact the password.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    /// Account email.
    pub email: Email,
    /// Account password.
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Partial profile update payload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    /// New given name, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New family name, if changing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// A saved shipping address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    /// Address ID.
    pub id: AddressId,
    /// Recipient name.
    pub full_name: String,
    /// Street address, line 1.
    pub line1: String,
    /// Street address, line 2.
    #[serde(default)]
    pub line2: Option<String>,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
    /// Contact phone number.
    pub phone: String,
    /// Whether this is the default shipping address.
    #[serde(default)]
    pub is_default: bool,
}

/// New or replacement address payload.
#[derive(Debug, Clone, Serialize)]
pub struct AddressInput {
    /// Recipient name.
    pub full_name: String,
    /// Street address, line 1.
    pub line1: String,
    /// Street address, line 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
    /// Contact phone number.
    pub phone: String,
    /// Whether to make this the default shipping address.
    pub is_default: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_snapshot_tolerates_partial_payload() {
        // A guest-added line persisted before any fetch has only the id.
        let snapshot: VariantSnapshot = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert_eq!(snapshot.id, VariantId::new(9));
        assert!(snapshot.price.is_none());
        assert!(snapshot.stock.is_none());
        assert!(snapshot.product.is_none());
    }

    #[test]
    fn test_cart_item_line_total() {
        let mut item = CartItem {
            id: CartItemId::new(1),
            variant: VariantSnapshot::bare(VariantId::new(3)),
            quantity: 4,
        };
        assert_eq!(item.line_total(), None);

        item.variant.price = Some(Decimal::new(2550, 2));
        assert_eq!(item.line_total(), Some(Decimal::new(10200, 2)));
    }

    #[test]
    fn test_cart_deserializes_server_shape() {
        let json = r#"{
            "items": [{
                "id": 17,
                "quantity": 2,
                "variant": {
                    "id": 5,
                    "price": "499.00",
                    "stock": 12,
                    "option_text": "Indigo / M",
                    "product": {"id": 3, "title": "Block-print Kurta", "slug": "block-print-kurta", "images": []}
                }
            }]
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.items.len(), 1);
        let item = cart.items.first().unwrap();
        assert_eq!(item.variant.price, Some(Decimal::new(49900, 2)));
        assert_eq!(
            item.variant.product.as_ref().unwrap().title,
            "Block-print Kurta"
        );
    }

    #[test]
    fn test_product_listing_price_falls_back_to_base() {
        let product: Product = serde_json::from_str(
            r#"{"id": 1, "title": "Throw", "slug": "throw", "base_price": "1200"}"#,
        )
        .unwrap();
        assert_eq!(product.listing_price(), Some(Decimal::new(1200, 0)));
    }

    #[test]
    fn test_register_request_debug_redacts_password() {
        let req = RegisterRequest {
            email: Email::parse("shopper@example.com").unwrap(),
            password: "hunter2-but-long".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
        };
        let debug = format!("{req:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
