use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    inventory::InventoryClient,
    models::{Product, ProductId, UpdateProductAmount},
    notify::{Notification, Notifier},
    storage::{KeyValueStore, StorageError},
};

use super::{CartError, CartOperation};

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Owns the cart and keeps it in step with persistent storage.
///
/// Every mutation validates against live stock, writes the new cart to
/// storage and only then swaps it into memory, so the snapshot returned by
/// [`CartStore::cart`] is always the last persisted state. Operations are
/// meant to be driven one at a time by a single UI loop; two overlapping
/// calls resolve last-writer-wins.
///
/// Failed operations emit one notification through the injected
/// [`Notifier`] and return the typed error; the cart is left untouched.
pub struct CartStore<I, S, N> {
    inventory: I,
    storage: S,
    notifier: N,
    cart: RwLock<Vec<Product>>,
}

impl<I, S, N> CartStore<I, S, N>
where
    I: InventoryClient,
    S: KeyValueStore,
    N: Notifier,
{
    /// Create a store, hydrating the cart from `storage`.
    pub fn new(inventory: I, storage: S, notifier: N) -> Result<Self, StorageError> {
        let cart = load_cart(&storage)?;
        info!(entries = cart.len(), "cart hydrated");
        Ok(Self {
            inventory,
            storage,
            notifier,
            cart: RwLock::new(cart),
        })
    }

    /// Snapshot of the current cart.
    pub fn cart(&self) -> Vec<Product> {
        self.cart.read().clone()
    }

    /// Cart entry for `product_id`, if present.
    pub fn item(&self, product_id: ProductId) -> Option<Product> {
        self.cart
            .read()
            .iter()
            .find(|product| product.id == product_id)
            .cloned()
    }

    /// Number of distinct products in the cart.
    pub fn len(&self) -> usize {
        self.cart.read().len()
    }

    /// Whether the cart holds no products.
    pub fn is_empty(&self) -> bool {
        self.cart.read().is_empty()
    }

    /// Total units across all entries.
    pub fn total_items(&self) -> u64 {
        self.cart
            .read()
            .iter()
            .map(|product| u64::from(product.amount))
            .sum()
    }

    /// Inventory client the store validates against.
    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    /// Add one unit of `product_id`, fetching its catalog record on first add.
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let result = self.try_add_product(product_id).await;
        self.report(CartOperation::Add, product_id, result)
    }

    /// Drop `product_id` from the cart.
    pub fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let result = self.try_remove_product(product_id);
        self.report(CartOperation::Remove, product_id, result)
    }

    /// Set the quantity of an existing entry.
    ///
    /// Amounts of zero or below are ignored without notifying; this never
    /// removes or creates an entry.
    pub async fn update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        if update.amount <= 0 {
            debug!(
                product_id = update.product_id,
                amount = update.amount,
                "ignoring non-positive amount"
            );
            return Ok(());
        }
        let result = self.try_update_product_amount(update).await;
        self.report(CartOperation::Update, update.product_id, result)
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let snapshot = self.cart();
        let current = snapshot
            .iter()
            .find(|product| product.id == product_id)
            .map(|product| product.amount);

        let stock = self.inventory.get_stock(product_id).await?;
        let current_amount = current.unwrap_or(0);
        let desired = current_amount
            .checked_add(1)
            .filter(|amount| i64::from(*amount) <= stock.amount)
            .ok_or(CartError::OutOfStock {
                product_id,
                requested: u64::from(current_amount) + 1,
                available: stock.amount,
            })?;

        let updated = match current {
            Some(_) => with_amount(&snapshot, product_id, desired),
            None => {
                let product = self.inventory.get_product(product_id).await?;
                let mut updated = snapshot;
                updated.push(Product::from_catalog(product, 1));
                updated
            }
        };

        self.commit(updated)?;
        info!(product_id, amount = desired, "product added to cart");
        Ok(())
    }

    fn try_remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let snapshot = self.cart();
        if !snapshot.iter().any(|product| product.id == product_id) {
            return Err(CartError::NotInCart(product_id));
        }

        let updated = snapshot
            .into_iter()
            .filter(|product| product.id != product_id)
            .collect();
        self.commit(updated)?;
        info!(product_id, "product removed from cart");
        Ok(())
    }

    async fn try_update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let UpdateProductAmount { product_id, amount } = update;
        let requested = amount.unsigned_abs();

        let stock = self.inventory.get_stock(product_id).await?;
        let amount = u32::try_from(requested)
            .ok()
            .filter(|amount| i64::from(*amount) <= stock.amount)
            .ok_or(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            })?;

        let snapshot = self.cart();
        if !snapshot.iter().any(|product| product.id == product_id) {
            return Err(CartError::NotInCart(product_id));
        }

        self.commit(with_amount(&snapshot, product_id, amount))?;
        info!(product_id, amount, "product amount updated");
        Ok(())
    }

    fn commit(&self, cart: Vec<Product>) -> Result<(), CartError> {
        let serialized = serde_json::to_string(&cart).map_err(|source| StorageError::Serde {
            key: CART_STORAGE_KEY.to_string(),
            source,
        })?;
        self.storage.set_item(CART_STORAGE_KEY, &serialized)?;
        *self.cart.write() = cart;
        Ok(())
    }

    fn report(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        result: Result<(), CartError>,
    ) -> Result<(), CartError> {
        if let Err(err) = &result {
            warn!(?operation, product_id, error = %err, "cart operation failed");
            self.notifier
                .notify(Notification::error(err.user_message(operation)));
        }
        result
    }
}

fn load_cart(storage: &impl KeyValueStore) -> Result<Vec<Product>, StorageError> {
    match storage.get_item(CART_STORAGE_KEY)? {
        Some(serialized) => {
            serde_json::from_str(&serialized).map_err(|source| StorageError::Serde {
                key: CART_STORAGE_KEY.to_string(),
                source,
            })
        }
        None => Ok(Vec::new()),
    }
}

/// Copy of `cart` with the entry for `product_id` holding `amount`.
fn with_amount(cart: &[Product], product_id: ProductId, amount: u32) -> Vec<Product> {
    cart.iter()
        .map(|product| {
            if product.id == product_id {
                product.with_amount(amount)
            } else {
                product.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashMap, sync::Arc};

    use anyhow::Result;
    use parking_lot::Mutex;
    use serde_json::{json, Map};
    use tokio::sync::mpsc;

    use crate::{
        cart::OUT_OF_STOCK_MESSAGE,
        inventory::InventoryError,
        models::{CatalogProduct, Stock},
        notify::NotificationLevel,
        storage::MemoryStore,
    };

    #[derive(Default)]
    struct FakeInventory {
        stock: Mutex<HashMap<ProductId, i64>>,
        unreachable: Mutex<bool>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeInventory {
        fn with_stock(levels: &[(ProductId, i64)]) -> Arc<Self> {
            let inventory = Self::default();
            inventory.stock.lock().extend(levels.iter().copied());
            Arc::new(inventory)
        }

        fn set_stock(&self, id: ProductId, amount: i64) {
            self.stock.lock().insert(id, amount);
        }

        fn set_unreachable(&self, unreachable: bool) {
            *self.unreachable.lock() = unreachable;
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }

        fn record(&self, path: String) -> Result<(), InventoryError> {
            let url = format!("http://inventory.test/{path}");
            self.requests.lock().push(path);
            if *self.unreachable.lock() {
                return Err(InventoryError::Status { url, status: 503 });
            }
            Ok(())
        }
    }

    fn catalog_product(id: ProductId) -> CatalogProduct {
        let mut extra = Map::new();
        extra.insert("brand".to_string(), json!("rocket"));
        CatalogProduct {
            id,
            title: format!("Sneaker {id}"),
            price: 100.0 + id as f64,
            image: format!("https://example.com/{id}.jpg"),
            extra,
        }
    }

    impl InventoryClient for FakeInventory {
        async fn get_stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
            self.record(format!("stock/{id}"))?;
            self.stock
                .lock()
                .get(&id)
                .map(|amount| Stock {
                    id,
                    amount: *amount,
                })
                .ok_or_else(|| InventoryError::NotFound {
                    url: format!("http://inventory.test/stock/{id}"),
                })
        }

        async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, InventoryError> {
            self.record(format!("products/{id}"))?;
            Ok(catalog_product(id))
        }

        async fn list_products(&self) -> Result<Vec<CatalogProduct>, InventoryError> {
            self.record("products".to_string())?;
            let mut ids: Vec<_> = self.stock.lock().keys().copied().collect();
            ids.sort_unstable();
            Ok(ids.into_iter().map(catalog_product).collect())
        }
    }

    /// Serves a fixed cart and refuses every write.
    #[derive(Default)]
    struct ReadOnlyStore {
        contents: Option<String>,
    }

    impl ReadOnlyStore {
        fn holding(cart: &[Product]) -> Result<Self> {
            Ok(Self {
                contents: Some(serde_json::to_string(cart)?),
            })
        }
    }

    impl KeyValueStore for ReadOnlyStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.contents.clone())
        }

        fn set_item(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                path: "/read-only".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    type TestStore = CartStore<
        Arc<FakeInventory>,
        Arc<MemoryStore>,
        mpsc::UnboundedSender<Notification>,
    >;

    struct Harness {
        inventory: Arc<FakeInventory>,
        storage: Arc<MemoryStore>,
        notifications: mpsc::UnboundedReceiver<Notification>,
        store: TestStore,
    }

    impl Harness {
        fn new(levels: &[(ProductId, i64)]) -> Result<Self> {
            Self::with_storage(levels, Arc::new(MemoryStore::new()))
        }

        fn with_storage(levels: &[(ProductId, i64)], storage: Arc<MemoryStore>) -> Result<Self> {
            let inventory = FakeInventory::with_stock(levels);
            let (tx, notifications) = mpsc::unbounded_channel();
            let store = CartStore::new(inventory.clone(), storage.clone(), tx)?;
            Ok(Self {
                inventory,
                storage,
                notifications,
                store,
            })
        }

        fn messages(&mut self) -> Vec<String> {
            let mut messages = Vec::new();
            while let Ok(notification) = self.notifications.try_recv() {
                assert_eq!(notification.level, NotificationLevel::Error);
                messages.push(notification.message);
            }
            messages
        }

        fn persisted(&self) -> Result<Vec<Product>> {
            let raw = self
                .storage
                .get_item(CART_STORAGE_KEY)?
                .unwrap_or_else(|| "[]".to_string());
            Ok(serde_json::from_str(&raw)?)
        }

        fn amounts(&self) -> Vec<(ProductId, u32)> {
            self.store
                .cart()
                .iter()
                .map(|product| (product.id, product.amount))
                .collect()
        }
    }

    #[tokio::test]
    async fn first_add_creates_entry_from_catalog() -> Result<()> {
        let mut harness = Harness::new(&[(1, 3)])?;

        harness.store.add_product(1).await?;

        let cart = harness.store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0], Product::from_catalog(catalog_product(1), 1));
        assert_eq!(harness.persisted()?, cart);
        assert_eq!(harness.inventory.requests(), vec!["stock/1", "products/1"]);
        assert!(harness.messages().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn repeated_add_increments_only_that_entry() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5), (2, 5)])?;
        harness.store.add_product(1).await?;
        harness.store.add_product(2).await?;
        harness.store.add_product(2).await?;

        assert_eq!(harness.amounts(), vec![(1, 1), (2, 2)]);
        assert_eq!(harness.store.total_items(), 3);
        // Catalog data is only fetched for the first unit.
        let product_fetches = harness
            .inventory
            .requests()
            .iter()
            .filter(|path| path.starts_with("products/"))
            .count();
        assert_eq!(product_fetches, 2);
        assert!(harness.messages().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn add_beyond_stock_is_rejected() -> Result<()> {
        let mut harness = Harness::new(&[(1, 2)])?;
        harness.store.add_product(1).await?;
        harness.store.add_product(1).await?;
        let before = harness.store.cart();

        let err = harness.store.add_product(1).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::OutOfStock {
                product_id: 1,
                requested: 3,
                available: 2
            }
        ));
        assert_eq!(harness.store.cart(), before);
        assert_eq!(harness.persisted()?, before);
        assert_eq!(harness.messages(), vec![OUT_OF_STOCK_MESSAGE]);
        Ok(())
    }

    #[tokio::test]
    async fn add_with_no_stock_never_fetches_catalog() -> Result<()> {
        let mut harness = Harness::new(&[(7, 0)])?;

        assert!(harness.store.add_product(7).await.is_err());
        assert!(harness.store.is_empty());
        assert_eq!(harness.inventory.requests(), vec!["stock/7"]);
        assert_eq!(harness.messages(), vec![OUT_OF_STOCK_MESSAGE]);
        Ok(())
    }

    #[tokio::test]
    async fn inventory_failure_reports_generic_add_error() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5)])?;
        harness.inventory.set_unreachable(true);

        let err = harness.store.add_product(1).await.unwrap_err();
        assert!(matches!(err, CartError::Inventory(_)));

        let err = harness.store.add_product(42).await.unwrap_err();
        assert!(matches!(err, CartError::Inventory(_)));

        assert!(harness.store.is_empty());
        assert_eq!(
            harness.messages(),
            vec!["Error adding product", "Error adding product"]
        );

        // Retrying once the service is back re-validates from scratch.
        harness.inventory.set_unreachable(false);
        harness.store.add_product(1).await?;
        assert_eq!(harness.amounts(), vec![(1, 1)]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_an_inventory_error() -> Result<()> {
        let mut harness = Harness::new(&[])?;

        let err = harness.store.add_product(99).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Inventory(InventoryError::NotFound { .. })
        ));
        assert_eq!(harness.messages(), vec!["Error adding product"]);
        Ok(())
    }

    #[tokio::test]
    async fn remove_drops_exactly_one_entry() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5), (2, 5), (3, 5)])?;
        for id in [1, 2, 3] {
            harness.store.add_product(id).await?;
        }
        let requests = harness.inventory.requests().len();

        harness.store.remove_product(2)?;

        assert_eq!(harness.amounts(), vec![(1, 1), (3, 1)]);
        assert_eq!(harness.persisted()?, harness.store.cart());
        assert_eq!(harness.inventory.requests().len(), requests);
        assert!(harness.messages().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn remove_missing_entry_reports_failure() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5)])?;
        harness.store.add_product(1).await?;

        let err = harness.store.remove_product(2).unwrap_err();
        assert!(matches!(err, CartError::NotInCart(2)));
        assert_eq!(harness.amounts(), vec![(1, 1)]);
        assert_eq!(harness.messages(), vec!["Error removing product"]);
        Ok(())
    }

    #[tokio::test]
    async fn non_positive_update_is_silently_ignored() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5)])?;
        harness.store.add_product(1).await?;
        let requests = harness.inventory.requests().len();

        for amount in [0, -1, i64::MIN] {
            harness
                .store
                .update_product_amount(UpdateProductAmount {
                    product_id: 1,
                    amount,
                })
                .await?;
        }
        // Also ignored for products that are not in the cart.
        harness
            .store
            .update_product_amount(UpdateProductAmount {
                product_id: 9,
                amount: 0,
            })
            .await?;

        assert_eq!(harness.amounts(), vec![(1, 1)]);
        assert_eq!(harness.inventory.requests().len(), requests);
        assert!(harness.messages().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_beyond_stock_is_rejected() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5)])?;
        harness.store.add_product(1).await?;

        let err = harness
            .store
            .update_product_amount(UpdateProductAmount {
                product_id: 1,
                amount: 6,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::OutOfStock {
                requested: 6,
                available: 5,
                ..
            }
        ));
        assert_eq!(harness.amounts(), vec![(1, 1)]);
        assert_eq!(harness.messages(), vec![OUT_OF_STOCK_MESSAGE]);
        Ok(())
    }

    #[tokio::test]
    async fn update_sets_exact_amount_and_persists() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5), (2, 5)])?;
        harness.store.add_product(1).await?;
        harness.store.add_product(2).await?;

        harness
            .store
            .update_product_amount(UpdateProductAmount {
                product_id: 2,
                amount: 5,
            })
            .await?;

        assert_eq!(harness.amounts(), vec![(1, 1), (2, 5)]);
        assert_eq!(harness.persisted()?, harness.store.cart());
        assert_eq!(harness.store.item(2).map(|p| p.amount), Some(5));
        assert!(harness.messages().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_never_creates_entries() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5)])?;

        let err = harness
            .store
            .update_product_amount(UpdateProductAmount {
                product_id: 1,
                amount: 2,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::NotInCart(1)));
        assert!(harness.store.is_empty());
        assert_eq!(harness.messages(), vec!["Error updating product amount"]);

        harness.inventory.set_unreachable(true);
        harness.store.add_product(1).await.unwrap_err();
        harness
            .store
            .update_product_amount(UpdateProductAmount {
                product_id: 1,
                amount: 2,
            })
            .await
            .unwrap_err();
        assert_eq!(
            harness.messages(),
            vec!["Error adding product", "Error updating product amount"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn stock_is_checked_at_mutation_time() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5)])?;
        harness.store.add_product(1).await?;
        harness.store.add_product(1).await?;

        harness.inventory.set_stock(1, 2);
        assert!(harness.store.add_product(1).await.is_err());
        assert_eq!(harness.amounts(), vec![(1, 2)]);
        assert_eq!(harness.messages(), vec![OUT_OF_STOCK_MESSAGE]);
        Ok(())
    }

    #[tokio::test]
    async fn shopping_session_end_to_end() -> Result<()> {
        let mut harness = Harness::new(&[(1, 5)])?;
        assert!(harness.store.is_empty());

        harness.store.add_product(1).await?;
        assert_eq!(harness.amounts(), vec![(1, 1)]);

        harness.store.add_product(1).await?;
        assert_eq!(harness.amounts(), vec![(1, 2)]);

        let result = harness
            .store
            .update_product_amount(UpdateProductAmount {
                product_id: 1,
                amount: 10,
            })
            .await;
        assert!(result.is_err());
        assert_eq!(harness.amounts(), vec![(1, 2)]);
        assert_eq!(harness.messages(), vec![OUT_OF_STOCK_MESSAGE]);

        harness.store.remove_product(1)?;
        assert!(harness.store.cart().is_empty());
        assert!(harness.persisted()?.is_empty());
        assert!(harness.messages().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn rehydrated_cart_matches_persisted_cart() -> Result<()> {
        let harness = Harness::new(&[(1, 5), (4, 5)])?;
        harness.store.add_product(4).await?;
        harness.store.add_product(1).await?;
        harness.store.add_product(4).await?;
        let before = harness.store.cart();

        let reloaded = Harness::with_storage(&[], harness.storage.clone())?;
        assert_eq!(reloaded.store.cart(), before);
        assert_eq!(
            reloaded.store.item(4).and_then(|p| p.extra.get("brand").cloned()),
            Some(json!("rocket"))
        );
        Ok(())
    }

    #[test]
    fn malformed_storage_fails_hydration() -> Result<()> {
        let storage = Arc::new(MemoryStore::new());
        storage.set_item(CART_STORAGE_KEY, "{not json")?;

        let result = CartStore::new(
            FakeInventory::with_stock(&[]),
            storage,
            crate::notify::NullNotifier,
        );
        assert!(matches!(result, Err(StorageError::Serde { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_leaves_cart_untouched() -> Result<()> {
        let inventory = FakeInventory::with_stock(&[(1, 5)]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let store = CartStore::new(inventory, ReadOnlyStore::default(), tx)?;

        let err = store.add_product(1).await.unwrap_err();
        assert!(matches!(err, CartError::Storage(_)));
        assert!(store.is_empty());
        assert_eq!(
            rx.try_recv().map(|n| n.message).ok().as_deref(),
            Some("Error adding product")
        );
        Ok(())
    }

    fn read_only_cart_of_one() -> Result<(
        CartStore<Arc<FakeInventory>, ReadOnlyStore, mpsc::UnboundedSender<Notification>>,
        mpsc::UnboundedReceiver<Notification>,
    )> {
        let storage = ReadOnlyStore::holding(&[Product::from_catalog(catalog_product(1), 1)])?;
        let (tx, rx) = mpsc::unbounded_channel();
        let store = CartStore::new(FakeInventory::with_stock(&[(1, 5)]), storage, tx)?;
        assert_eq!(store.item(1).map(|product| product.amount), Some(1));
        Ok((store, rx))
    }

    #[test]
    fn failed_write_keeps_removed_entry() -> Result<()> {
        let (store, mut rx) = read_only_cart_of_one()?;

        let err = store.remove_product(1).unwrap_err();
        assert!(matches!(err, CartError::Storage(_)));
        assert_eq!(store.item(1).map(|product| product.amount), Some(1));
        assert_eq!(
            rx.try_recv().map(|n| n.message).ok().as_deref(),
            Some("Error removing product")
        );
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_amount() -> Result<()> {
        let (store, mut rx) = read_only_cart_of_one()?;

        let err = store
            .update_product_amount(UpdateProductAmount {
                product_id: 1,
                amount: 3,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Storage(_)));
        assert_eq!(store.item(1).map(|product| product.amount), Some(1));
        assert_eq!(
            rx.try_recv().map(|n| n.message).ok().as_deref(),
            Some("Error updating product amount")
        );
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn negative_stock_is_out_of_stock() -> Result<()> {
        let mut harness = Harness::new(&[(1, -1)])?;

        let err = harness.store.add_product(1).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::OutOfStock {
                product_id: 1,
                requested: 1,
                available: -1
            }
        ));
        assert!(harness.store.is_empty());
        assert_eq!(harness.messages(), vec![OUT_OF_STOCK_MESSAGE]);
        assert_eq!(harness.inventory.requests(), vec!["stock/1"]);
        Ok(())
    }
}
