//! Durable guest-cart persistence.
//!
//! While signed out, the whole cart lives in one JSON document under the
//! client data dir. Every guest mutation rewrites the document in a single
//! synchronous call, so the persisted snapshot never trails the in-memory
//! one. The provisional-line-id counter is persisted in the same document:
//! a strictly monotonic counter cannot collide under rapid additions the way
//! clock-derived ids can, and it survives restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use verdant_core::{CartItemId, VariantId};

use crate::error::StoreError;
use crate::types::{CartItem, VariantSnapshot};

/// File under the data dir holding the guest cart document.
const GUEST_CART_FILE: &str = "guest_cart.json";

const fn first_provisional_id() -> i64 {
    1
}

/// The persisted guest cart: lines plus the provisional-id counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestCart {
    /// Next provisional line id to hand out. Monotonic, never reused within
    /// the life of the document.
    #[serde(default = "first_provisional_id")]
    pub next_item_id: i64,
    /// Guest cart lines, in insertion order.
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Default for GuestCart {
    fn default() -> Self {
        Self {
            next_item_id: first_provisional_id(),
            items: Vec::new(),
        }
    }
}

impl GuestCart {
    /// Add `quantity` units of a variant.
    ///
    /// An existing line for the same variant absorbs the quantity; otherwise
    /// a new line is appended with a freshly allocated provisional id and a
    /// bare variant snapshot (no pricing data exists until the next fetch).
    pub fn add(&mut self, variant_id: VariantId, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.variant.id == variant_id) {
            item.quantity += quantity;
            return;
        }

        let id = self.allocate_id();
        self.items.push(CartItem {
            id,
            variant: VariantSnapshot::bare(variant_id),
            quantity,
        });
    }

    /// Set a line's quantity; anything at or below zero removes the line.
    pub fn set_quantity(&mut self, item_id: CartItemId, quantity: i64) {
        match u32::try_from(quantity) {
            Ok(quantity) if quantity > 0 => {
                if let Some(item) = self.items.iter_mut().find(|i| i.id == item_id) {
                    item.quantity = quantity;
                }
            }
            _ => self.remove(item_id),
        }
    }

    /// Remove a line by id.
    pub fn remove(&mut self, item_id: CartItemId) {
        self.items.retain(|i| i.id != item_id);
    }

    fn allocate_id(&mut self) -> CartItemId {
        let id = CartItemId::new(self.next_item_id);
        self.next_item_id += 1;
        id
    }
}

/// Durable key-value slot for the guest cart document.
#[derive(Debug, Clone)]
pub struct CartStore {
    path: PathBuf,
}

impl CartStore {
    /// Store rooted at the client data dir.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(GUEST_CART_FILE),
        }
    }

    /// Read the persisted document.
    ///
    /// A missing file is a fresh empty cart; a malformed one is treated the
    /// same (logged, never fatal).
    #[must_use]
    pub fn load(&self) -> GuestCart {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("failed to read guest cart: {e}");
                }
                return GuestCart::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!("discarding malformed guest cart: {e}");
                GuestCart::default()
            }
        }
    }

    /// Persist the document, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub fn save(&self, cart: &GuestCart) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(cart)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Erase the persisted document. Erasing a missing document is fine.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_same_variant() {
        let mut cart = GuestCart::default();
        cart.add(VariantId::new(7), 1);
        cart.add(VariantId::new(7), 2);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().quantity, 3);
    }

    #[test]
    fn test_add_zero_units_is_a_no_op() {
        let mut cart = GuestCart::default();
        cart.add(VariantId::new(7), 0);
        assert!(cart.items.is_empty());
        assert_eq!(cart.next_item_id, 1);
    }

    #[test]
    fn test_add_appends_distinct_variants_with_monotonic_ids() {
        let mut cart = GuestCart::default();
        cart.add(VariantId::new(1), 1);
        cart.add(VariantId::new(2), 1);
        cart.add(VariantId::new(3), 1);

        let ids: Vec<i64> = cart.items.iter().map(|i| i.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(cart.next_item_id, 4);
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut cart = GuestCart::default();
        cart.add(VariantId::new(1), 1);
        let first_id = cart.items.first().unwrap().id;
        cart.remove(first_id);
        cart.add(VariantId::new(2), 1);

        assert_ne!(cart.items.first().unwrap().id, first_id);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let mut cart = GuestCart::default();
        cart.add(VariantId::new(7), 5);
        let id = cart.items.first().unwrap().id;

        cart.set_quantity(id, 0);
        assert!(cart.items.is_empty());

        cart.add(VariantId::new(7), 5);
        let id = cart.items.first().unwrap().id;
        cart.set_quantity(id, -1);
        assert!(cart.items.is_empty());
    }

    #[test]
    fn test_set_quantity_updates_existing_line() {
        let mut cart = GuestCart::default();
        cart.add(VariantId::new(7), 5);
        let id = cart.items.first().unwrap().id;

        cart.set_quantity(id, 2);
        assert_eq!(cart.items.first().unwrap().quantity, 2);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CartStore::new(dir.path());

        let mut cart = GuestCart::default();
        cart.add(VariantId::new(7), 2);
        store.save(&cart).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items.first().unwrap().variant.id, VariantId::new(7));
        assert_eq!(loaded.next_item_id, cart.next_item_id);
    }

    #[test]
    fn test_missing_file_is_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let store = CartStore::new(dir.path());

        let cart = store.load();
        assert!(cart.items.is_empty());
        assert_eq!(cart.next_item_id, 1);
    }

    #[test]
    fn test_malformed_file_is_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(GUEST_CART_FILE), "{not json").unwrap();

        let store = CartStore::new(dir.path());
        assert!(store.load().items.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CartStore::new(dir.path());

        store.save(&GuestCart::default()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().items.is_empty());
    }
}
