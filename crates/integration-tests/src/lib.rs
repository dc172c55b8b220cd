//! Shared fixtures for the integration tests.
//!
//! Tests run a `Storefront` against a `wiremock` mock backend rooted at
//! `<mock>/api`, with durable client state in a per-test temp dir.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use verdant_client::Storefront;
use verdant_client::config::ClientConfig;

/// Bearer token issued by the mocked login endpoint.
pub const TEST_TOKEN: &str = "tok-verdant-test";

/// Build a storefront client pointed at the mock backend.
///
/// # Panics
///
/// Panics on invalid configuration; fine in tests.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn storefront(server: &MockServer, data_dir: &Path) -> Storefront {
    let config = ClientConfig::new(&format!("{}/api", server.uri()), data_dir).unwrap();
    Storefront::new(config).unwrap()
}

/// Profile payload served by the mocked auth endpoints.
#[must_use]
pub fn profile_json() -> Value {
    json!({
        "id": 1,
        "email": "shopper@example.com",
        "first_name": "Asha",
        "last_name": "Rao"
    })
}

/// A server cart holding one line: item 5, variant 42, quantity 2 at 499.00.
#[must_use]
pub fn server_cart_json() -> Value {
    json!({
        "items": [{
            "id": 5,
            "quantity": 2,
            "variant": {
                "id": 42,
                "price": "499.00",
                "stock": 10,
                "option_text": "Indigo / M",
                "product": {
                    "id": 3,
                    "title": "Block-print Kurta",
                    "slug": "block-print-kurta",
                    "images": []
                }
            }
        }]
    })
}

/// Mount a successful login responding with [`TEST_TOKEN`].
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "user": profile_json(), "access": TEST_TOKEN })),
        )
        .mount(server)
        .await;
}

/// Mount `GET /api/cart/` returning the given cart body.
pub async fn mount_get_cart(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
