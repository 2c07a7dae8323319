use indexmap::IndexMap;
use parking_lot::Mutex;

/// Keyed collection that creates its entries on first access.
///
/// # Purpose
/// Backs `Database::table(name)` and `ExistingTable::column(name)`. Looking up
/// a key either returns the entry created earlier for it or calls the factory,
/// stores the result and returns it. The factory is where the owner gets
/// notified (for tables: an alter-table command is appended to the root list).
///
/// # Characteristics
/// - **Idempotent**: repeated lookups of a key return clones of one entry
/// - **Ordered**: keys iterate in creation order
/// - **Atomic creation**: the factory runs under the collection lock, so two
///   concurrent lookups of a new key never construct two entries
///
/// # Usage
/// ```rust
/// use tidemark::schema::AdHocCollection;
/// use std::sync::Arc;
///
/// let collection = AdHocCollection::new(|name: &str| Arc::new(name.to_uppercase()));
/// let first = collection.get("orders");
/// let second = collection.get("orders");
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(collection.len(), 1);
/// ```
pub struct AdHocCollection<T: Clone> {
    items: Mutex<IndexMap<String, T>>,
    factory: Box<dyn Fn(&str) -> T + Send + Sync>,
}

impl<T: Clone> AdHocCollection<T> {
    pub fn new(factory: impl Fn(&str) -> T + Send + Sync + 'static) -> Self {
        AdHocCollection {
            items: Mutex::new(IndexMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Returns the entry for `key`, creating and registering it on first access.
    pub fn get(&self, key: &str) -> T {
        let mut items = self.items.lock();
        if let Some(item) = items.get(key) {
            return item.clone();
        }

        let item = (self.factory)(key);
        items.insert(key.to_string(), item.clone());
        item
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Keys in creation order.
    pub fn keys(&self) -> Vec<String> {
        self.items.lock().keys().cloned().collect()
    }
}
