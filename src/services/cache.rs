use std::sync::{Arc, RwLock};

use anyhow::Result;
use tracing::info;

use crate::database::connection::DatabaseManager;
use crate::database::models::{Category, Product, Subcategory};

#[derive(Default)]
struct CacheInner {
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    products: Vec<Product>,
}

/// In-memory catalog snapshot used to resolve emoji-labelled buttons.
///
/// The web admin owns the catalog tables; this cache is refreshed by the
/// reload-signal poller, so a stale entry lives for at most one poll
/// interval after an admin edit.
#[derive(Clone, Default)]
pub struct CatalogCache {
    inner: Arc<RwLock<CacheInner>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-reads the catalog tables. Returns `(categories, products)` counts
    /// for the reload summary.
    pub async fn reload(&self, db: &DatabaseManager) -> Result<(usize, usize)> {
        let categories = Category::all_active(&db.pool).await?;
        let subcategories = Subcategory::all_active(&db.pool).await?;
        let products = Product::all_active(&db.pool).await?;

        let counts = (categories.len(), products.len());
        {
            let mut inner = self.write();
            inner.categories = categories;
            inner.subcategories = subcategories;
            inner.products = products;
        }
        info!(
            "Catalog cache reloaded: {} categories, {} products",
            counts.0, counts.1
        );
        Ok(counts)
    }

    pub fn categories(&self) -> Vec<Category> {
        self.read().categories.clone()
    }

    pub fn subcategories_of(&self, category_id: i64) -> Vec<Subcategory> {
        self.read()
            .subcategories
            .iter()
            .filter(|s| s.category_id == category_id)
            .cloned()
            .collect()
    }

    /// Resolves a reply-keyboard label back to the category it names.
    pub fn category_by_label(&self, label: &str) -> Option<Category> {
        self.read()
            .categories
            .iter()
            .find(|c| c.label() == label)
            .cloned()
    }

    pub fn subcategory_by_label(&self, label: &str) -> Option<Subcategory> {
        self.read()
            .subcategories
            .iter()
            .find(|s| s.label() == label)
            .cloned()
    }

    pub fn product_by_label(&self, label: &str) -> Option<Product> {
        self.read()
            .products
            .iter()
            .find(|p| p.label() == label)
            .cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CacheInner> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CacheInner> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
