//! Cart synchronization.
//!
//! The synchronizer is the single point of mutation for the cart and hides
//! where the cart actually lives. While the session is authenticated the
//! backend's cart is authoritative and every mutation is fire-and-resync:
//! issue the call, then re-fetch, so the visible snapshot always reflects
//! server-computed pricing, stock clamps, and line merging. While signed out
//! the cart is a local snapshot, mutated in place and persisted to the guest
//! store on every operation.
//!
//! Exactly one of the two backings is authoritative at any time, decided
//! solely by the session holder's authenticated flag. On a guest-to-
//! authenticated transition the accumulated guest lines are submitted to the
//! backend's merge endpoint once, then the first authenticated load replaces
//! the snapshot. On logout the remote-backed snapshot is dropped; the
//! abandoned server cart is never copied into guest storage.
//!
//! Overlapping operations are not serialized: the `loading` flag is advisory
//! for the UI, and when two mutations race, each triggers its own resync and
//! the last fetch to complete determines the visible snapshot.

mod store;

pub use store::{CartStore, GuestCart};

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::watch;

use verdant_core::{CartItemId, VariantId};

use crate::api::CartApi;
use crate::error::{ApiError, CartError, StoreError};
use crate::session::SessionHolder;
use crate::types::{CartItem, MergeItem};

/// Cart snapshot plus fetch status, as consumed by the UI layer.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    /// Cart lines: backend order when remote-backed, insertion order when
    /// guest-backed.
    pub items: Vec<CartItem>,
    /// True only while a remote fetch is outstanding.
    pub loading: bool,
}

impl CartState {
    /// Total units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals over lines with a known price.
    ///
    /// Lines whose price has not been fetched yet (guest-added) are excluded
    /// from the sum rather than counted as zero-priced: an undercount that
    /// corrects itself on the next authoritative fetch is preferable to
    /// presenting a fabricated price.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().filter_map(CartItem::line_total).sum()
    }
}

/// Single point of mutation for the cart.
///
/// Cheap to clone; all clones share one snapshot.
#[derive(Clone)]
pub struct CartSynchronizer {
    inner: Arc<CartSyncInner>,
}

struct CartSyncInner {
    api: CartApi,
    store: CartStore,
    session: SessionHolder,
    state: watch::Sender<CartState>,
}

impl CartSynchronizer {
    /// Build a synchronizer over the given remote client, guest store, and
    /// session holder.
    ///
    /// If the session starts out as a guest, any persisted guest snapshot is
    /// read immediately so callers see it without an explicit `load`.
    #[must_use]
    pub fn new(api: CartApi, store: CartStore, session: SessionHolder) -> Self {
        let items = if session.is_authenticated() {
            Vec::new()
        } else {
            store.load().items
        };

        let (state, _) = watch::channel(CartState {
            items,
            loading: false,
        });

        Self {
            inner: Arc::new(CartSyncInner {
                api,
                store,
                session,
                state,
            }),
        }
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// The current snapshot.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Refresh the snapshot from the authoritative backing.
    ///
    /// Authenticated: fetches the cart, holding `loading` true for the
    /// duration. A failed fetch is logged and leaves the previous snapshot in
    /// place - no partial overwrite - with `loading` back at false. Guest:
    /// reads the persisted snapshot synchronously; no `loading` transition.
    pub async fn load(&self) {
        if self.inner.session.is_authenticated() {
            self.inner.state.send_modify(|s| s.loading = true);
            match self.inner.api.get().await {
                Ok(cart) => self.inner.state.send_modify(|s| {
                    s.items = cart.items;
                    s.loading = false;
                }),
                Err(e) => {
                    tracing::warn!("failed to load cart: {e}");
                    self.inner.state.send_modify(|s| s.loading = false);
                }
            }
        } else {
            let items = self.inner.store.load().items;
            self.inner.state.send_modify(|s| {
                s.items = items;
                s.loading = false;
            });
        }
    }

    /// Add `quantity` units of a variant.
    ///
    /// Callers wanting the conventional single-unit add pass 1. Guest lines
    /// for an already-present variant absorb the quantity instead of
    /// duplicating the line.
    ///
    /// # Errors
    ///
    /// Authenticated: the remote error, with the snapshot untouched. Guest:
    /// a persistence failure.
    pub async fn add_item(&self, variant_id: VariantId, quantity: u32) -> Result<(), CartError> {
        if self.inner.session.is_authenticated() {
            self.inner.api.add_item(variant_id, quantity).await?;
            self.load().await;
            Ok(())
        } else {
            self.mutate_guest(|cart| cart.add(variant_id, quantity))?;
            Ok(())
        }
    }

    /// Set a line's quantity. A quantity at or below zero removes the line,
    /// so a persisted quantity is always at least 1.
    ///
    /// # Errors
    ///
    /// Authenticated: the remote error, with the snapshot untouched. Guest:
    /// a persistence failure.
    pub async fn update_quantity(
        &self,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<(), CartError> {
        if self.inner.session.is_authenticated() {
            if quantity <= 0 {
                self.inner.api.remove_item(item_id).await?;
            } else {
                let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                self.inner.api.update_item(item_id, quantity).await?;
            }
            self.load().await;
            Ok(())
        } else {
            self.mutate_guest(|cart| cart.set_quantity(item_id, quantity))?;
            Ok(())
        }
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Authenticated: the remote error, with the snapshot untouched. Guest:
    /// a persistence failure.
    pub async fn remove_item(&self, item_id: CartItemId) -> Result<(), CartError> {
        if self.inner.session.is_authenticated() {
            self.inner.api.remove_item(item_id).await?;
            self.load().await;
            Ok(())
        } else {
            self.mutate_guest(|cart| cart.remove(item_id))?;
            Ok(())
        }
    }

    /// Empty the snapshot immediately, and erase the guest store when signed
    /// out.
    ///
    /// No remote deletion is issued: the backend empties its own cart as a
    /// side effect of order placement.
    pub fn clear(&self) {
        self.inner.state.send_modify(|s| {
            s.items.clear();
            s.loading = false;
        });
        if !self.inner.session.is_authenticated()
            && let Err(e) = self.inner.store.clear()
        {
            tracing::warn!("failed to erase guest cart: {e}");
        }
    }

    /// Apply a coupon code, then resync.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when signed out (coupons attach to
    /// the server cart), or the remote error.
    pub async fn apply_coupon(&self, code: &str) -> Result<(), CartError> {
        if !self.inner.session.is_authenticated() {
            return Err(CartError::Api(ApiError::Unauthorized(
                "coupons require a signed-in session".to_string(),
            )));
        }
        self.inner.api.apply_coupon(code).await?;
        self.load().await;
        Ok(())
    }

    /// Submit the accumulated guest lines to the backend's merge endpoint.
    ///
    /// Invoked once per guest-to-authenticated transition, before the first
    /// authenticated `load`. The guest snapshot and its persisted copy are
    /// cleared whether or not the merge landed: re-submitting stale lines on
    /// a later login would double-apply the merge, so delivery is at most
    /// once and a failure drops the guest lines (logged with the count).
    pub async fn merge_on_login(&self) {
        let guest = self.inner.store.load();
        if !guest.items.is_empty() {
            let items: Vec<MergeItem> = guest
                .items
                .iter()
                .map(|i| MergeItem {
                    variant_id: i.variant.id,
                    quantity: i.quantity,
                })
                .collect();

            if let Err(e) = self.inner.api.merge(&items).await {
                tracing::warn!(
                    dropped = items.len(),
                    "cart merge failed; guest lines discarded: {e}"
                );
            }
        }

        if let Err(e) = self.inner.store.clear() {
            tracing::warn!("failed to erase merged guest cart: {e}");
        }
        self.inner.state.send_modify(|s| s.items.clear());
    }

    /// Drop the snapshot after logout.
    ///
    /// The abandoned server cart is not copied into guest storage; the next
    /// guest `load` surfaces whatever guest snapshot already existed, or an
    /// empty one.
    pub fn reset(&self) {
        self.inner.state.send_modify(|s| {
            s.items.clear();
            s.loading = false;
        });
    }

    /// React to session transitions for embedders driving the session holder
    /// directly: guest-to-authenticated merges then loads, authenticated-to-
    /// guest resets.
    ///
    /// Do not combine with `Storefront::login`/`logout`, which perform the
    /// same transitions inline; running both would merge twice.
    pub fn spawn_session_watcher(&self) -> tokio::task::JoinHandle<()> {
        let sync = self.clone();
        let mut rx = self.inner.session.subscribe();

        tokio::spawn(async move {
            let mut was_authenticated = rx.borrow().is_authenticated();
            while rx.changed().await.is_ok() {
                let authenticated = rx.borrow_and_update().is_authenticated();
                if authenticated == was_authenticated {
                    continue;
                }
                was_authenticated = authenticated;

                if authenticated {
                    sync.merge_on_login().await;
                    sync.load().await;
                } else {
                    sync.reset();
                }
            }
        })
    }

    /// Run a guest mutation against the in-memory snapshot and persist the
    /// result in one synchronous write.
    fn mutate_guest(&self, mutate: impl FnOnce(&mut GuestCart)) -> Result<(), StoreError> {
        // The persisted document carries the id counter; the in-memory
        // snapshot is the authoritative line list.
        let mut guest = self.inner.store.load();
        guest.items = self.inner.state.borrow().items.clone();

        mutate(&mut guest);

        self.inner.store.save(&guest)?;
        self.inner.state.send_modify(|s| s.items = guest.items);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::Path;

    use rust_decimal::Decimal;

    use crate::api::Http;
    use crate::config::ClientConfig;
    use crate::types::VariantSnapshot;

    /// A synchronizer wired to an unreachable backend; only guest paths (and
    /// failing remote paths) are exercised.
    fn guest_sync(dir: &Path) -> CartSynchronizer {
        let config = ClientConfig::new("http://127.0.0.1:9/api", dir).unwrap();
        let session = SessionHolder::new(dir);
        let http = Http::new(&config, session.clone()).unwrap();
        CartSynchronizer::new(CartApi::new(http), CartStore::new(dir), session)
    }

    fn priced_item(id: i64, variant: i64, price: Option<Decimal>, quantity: u32) -> CartItem {
        let mut snapshot = VariantSnapshot::bare(VariantId::new(variant));
        snapshot.price = price;
        CartItem {
            id: CartItemId::new(id),
            variant: snapshot,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_guest_add_merges_same_variant() {
        let dir = tempfile::tempdir().unwrap();
        let sync = guest_sync(dir.path());

        sync.add_item(VariantId::new(7), 1).await.unwrap();
        sync.add_item(VariantId::new(7), 2).await.unwrap();

        let state = sync.state();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items.first().unwrap().quantity, 3);
        assert_eq!(state.count(), 3);
    }

    #[tokio::test]
    async fn test_guest_mutations_keep_store_in_step() {
        let dir = tempfile::tempdir().unwrap();
        let sync = guest_sync(dir.path());
        let store = CartStore::new(dir.path());

        let assert_in_step = |sync: &CartSynchronizer| {
            let in_memory = sync.state().items;
            let persisted = store.load().items;
            assert_eq!(persisted.len(), in_memory.len());
            for (a, b) in persisted.iter().zip(&in_memory) {
                assert_eq!(a.id, b.id);
                assert_eq!(a.variant.id, b.variant.id);
                assert_eq!(a.quantity, b.quantity);
            }
        };

        sync.add_item(VariantId::new(1), 2).await.unwrap();
        assert_in_step(&sync);

        sync.add_item(VariantId::new(2), 1).await.unwrap();
        assert_in_step(&sync);

        let first = sync.state().items.first().unwrap().id;
        sync.update_quantity(first, 5).await.unwrap();
        assert_in_step(&sync);

        sync.remove_item(first).await.unwrap();
        assert_in_step(&sync);
    }

    #[tokio::test]
    async fn test_guest_update_to_zero_or_below_removes() {
        let dir = tempfile::tempdir().unwrap();
        let sync = guest_sync(dir.path());

        sync.add_item(VariantId::new(7), 3).await.unwrap();
        let id = sync.state().items.first().unwrap().id;
        sync.update_quantity(id, 0).await.unwrap();
        assert!(sync.state().items.is_empty());

        sync.add_item(VariantId::new(7), 3).await.unwrap();
        let id = sync.state().items.first().unwrap().id;
        sync.update_quantity(id, -1).await.unwrap();
        assert!(sync.state().items.is_empty());
    }

    #[tokio::test]
    async fn test_guest_load_reads_persisted_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        {
            let sync = guest_sync(dir.path());
            sync.add_item(VariantId::new(7), 2).await.unwrap();
        }

        // A fresh synchronizer over the same data dir sees the guest cart
        // immediately, and load() re-reads it.
        let sync = guest_sync(dir.path());
        assert_eq!(sync.state().count(), 2);

        sync.load().await;
        let state = sync.state();
        assert_eq!(state.count(), 2);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_guest_clear_erases_store() {
        let dir = tempfile::tempdir().unwrap();
        let sync = guest_sync(dir.path());

        sync.add_item(VariantId::new(7), 2).await.unwrap();
        sync.clear();

        assert!(sync.state().items.is_empty());
        assert!(CartStore::new(dir.path()).load().items.is_empty());
    }

    #[tokio::test]
    async fn test_guest_coupon_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sync = guest_sync(dir.path());

        let err = sync.apply_coupon("WELCOME10").await.unwrap_err();
        assert!(matches!(err, CartError::Api(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_merge_on_login_clears_store_even_when_merge_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sync = guest_sync(dir.path());

        sync.add_item(VariantId::new(7), 2).await.unwrap();

        // The backend is unreachable, so the merge call fails; the guest
        // snapshot must still be gone afterwards.
        sync.merge_on_login().await;

        assert!(sync.state().items.is_empty());
        assert!(CartStore::new(dir.path()).load().items.is_empty());
    }

    #[test]
    fn test_count_and_total_derivations() {
        let state = CartState {
            items: vec![
                priced_item(1, 10, Some(Decimal::new(49900, 2)), 2),
                priced_item(2, 11, None, 3),
                priced_item(3, 12, Some(Decimal::new(10000, 2)), 1),
            ],
            loading: false,
        };

        assert_eq!(state.count(), 6);
        // Unknown-price line is excluded, not zeroed
        assert_eq!(state.total(), Decimal::new(109800, 2));
    }

    #[test]
    fn test_empty_state_totals() {
        let state = CartState::default();
        assert_eq!(state.count(), 0);
        assert_eq!(state.total(), Decimal::ZERO);
    }
}
