//! End-to-end cart synchronization behavior against a mock backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use tempfile::tempdir;
use tokio::sync::watch;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use verdant_client::cart::CartState;
use verdant_client::error::{ApiError, CartError};
use verdant_client::types::UserProfile;
use verdant_core::{CartItemId, Email, VariantId};

use verdant_integration_tests::{
    TEST_TOKEN, mount_get_cart, mount_login, profile_json, server_cart_json, storefront,
};

fn shopper_email() -> Email {
    Email::parse("shopper@example.com").unwrap()
}

/// Wait until the cart snapshot satisfies `pred`, or fail after 5 seconds.
async fn wait_until(rx: &mut watch::Receiver<CartState>, pred: impl Fn(&CartState) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&rx.borrow_and_update()) {
                return;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("cart never reached the expected state");
}

#[tokio::test]
async fn merge_on_login_submits_guest_lines_once_then_loads() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let store = storefront(&server, dir.path());

    // Guest accumulates lines before signing in; same variant twice merges
    store.cart().add_item(VariantId::new(42), 1).await.unwrap();
    store.cart().add_item(VariantId::new(42), 2).await.unwrap();
    store.cart().add_item(VariantId::new(7), 1).await.unwrap();
    assert_eq!(store.cart().state().count(), 4);

    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/cart/merge/"))
        .and(body_json(json!({
            "items": [
                { "variant_id": 42, "quantity": 3 },
                { "variant_id": 7, "quantity": 1 }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_cart_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_cart_json()))
        .expect(1)
        .mount(&server)
        .await;

    store.login(&shopper_email(), "correct-horse").await.unwrap();

    // Snapshot now reflects the server's merged cart, not the guest lines
    let state = store.cart().state();
    assert_eq!(state.count(), 2);
    assert!(!state.loading);

    // The guest document is gone
    assert!(!dir.path().join("guest_cart.json").exists());
}

#[tokio::test]
async fn merge_failure_still_clears_guest_cart_and_loads() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let store = storefront(&server, dir.path());

    store.cart().add_item(VariantId::new(42), 1).await.unwrap();

    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/cart/merge/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    mount_get_cart(&server, json!({ "items": [] })).await;

    // Login succeeds even though the merge did not land
    store.login(&shopper_email(), "correct-horse").await.unwrap();

    // At-most-once: the guest lines are dropped, not queued for retry
    assert!(!dir.path().join("guest_cart.json").exists());
    assert_eq!(store.cart().state().count(), 0);
}

#[tokio::test]
async fn authenticated_zero_quantity_issues_remote_removal_then_resync() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let store = storefront(&server, dir.path());

    mount_login(&server).await;
    // First fetch (at login) sees one line; the post-removal resync sees none
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_cart_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_get_cart(&server, json!({ "items": [] })).await;
    Mock::given(method("DELETE"))
        .and(path("/api/cart/5/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store.login(&shopper_email(), "correct-horse").await.unwrap();
    assert_eq!(store.cart().state().count(), 2);

    // Quantity 0 becomes a removal, followed by a resync fetch
    store
        .cart()
        .update_quantity(CartItemId::new(5), 0)
        .await
        .unwrap();

    assert!(store.cart().state().items.is_empty());
}

#[tokio::test]
async fn remote_update_error_propagates_and_preserves_snapshot() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let store = storefront(&server, dir.path());

    mount_login(&server).await;
    mount_get_cart(&server, server_cart_json()).await;
    Mock::given(method("PATCH"))
        .and(path("/api/cart/5/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Insufficient stock" })),
        )
        .mount(&server)
        .await;

    store.login(&shopper_email(), "correct-horse").await.unwrap();

    let err = store
        .cart()
        .update_quantity(CartItemId::new(5), 99)
        .await
        .unwrap_err();
    match err {
        CartError::Api(ApiError::Rejected(message)) => {
            assert_eq!(message, "Insufficient stock");
        }
        other => panic!("expected Rejected, got {other}"),
    }

    // The snapshot is untouched by the failed mutation
    assert_eq!(store.cart().state().count(), 2);
}

#[tokio::test]
async fn failed_reload_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let store = storefront(&server, dir.path());

    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_cart_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    store.login(&shopper_email(), "correct-horse").await.unwrap();
    assert_eq!(store.cart().state().count(), 2);

    // The failed reload is logged and swallowed; no partial overwrite
    store.cart().load().await;
    let state = store.cart().state();
    assert_eq!(state.count(), 2);
    assert!(!state.loading);
}

#[tokio::test]
async fn logout_resets_snapshot_and_returns_to_guest_cart() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let store = storefront(&server, dir.path());

    mount_login(&server).await;
    mount_get_cart(&server, server_cart_json()).await;

    store.login(&shopper_email(), "correct-horse").await.unwrap();
    assert_eq!(store.cart().state().count(), 2);

    store.logout();

    // The remote-backed snapshot is discarded, not copied into guest storage
    assert!(!store.session().is_authenticated());
    assert!(store.cart().state().items.is_empty());

    // The next read is a freshly-initialized guest cart, and guest mutations
    // work again
    store.cart().load().await;
    assert!(store.cart().state().items.is_empty());
    store.cart().add_item(VariantId::new(9), 1).await.unwrap();
    assert_eq!(store.cart().state().count(), 1);
}

#[tokio::test]
async fn session_watcher_drives_merge_and_reset() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let store = storefront(&server, dir.path());

    let _watcher = store.cart().spawn_session_watcher();
    let mut rx = store.cart().subscribe();

    store.cart().add_item(VariantId::new(42), 3).await.unwrap();

    Mock::given(method("POST"))
        .and(path("/api/cart/merge/"))
        .and(body_json(json!({
            "items": [{ "variant_id": 42, "quantity": 3 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_cart_json()))
        .expect(1)
        .mount(&server)
        .await;
    mount_get_cart(&server, server_cart_json()).await;

    // Flip the session directly, as an external auth layer would
    let profile: UserProfile = serde_json::from_value(profile_json()).unwrap();
    store
        .session()
        .set_session(secrecy::SecretString::from(TEST_TOKEN), profile);

    wait_until(&mut rx, |state| state.count() == 2).await;
    assert!(!dir.path().join("guest_cart.json").exists());

    store.session().clear();
    wait_until(&mut rx, |state| state.items.is_empty()).await;
}
