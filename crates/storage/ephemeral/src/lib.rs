use std::collections::HashSet;

use datacleaner_core::{
    category::default_categories, errors::CoreError, traits::CategoryStore,
    validate::normalize_category,
};
use parking_lot::RwLock;
use tracing::debug;

/// Process-lifetime category set. Never persisted.
pub struct EphemeralCategories {
    set: RwLock<HashSet<String>>,
}

impl EphemeralCategories {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories<I, T>(categories: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            set: RwLock::new(categories.into_iter().map(Into::into).collect()),
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.set.read().contains(category)
    }

    pub fn len(&self) -> usize {
        self.set.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.read().is_empty()
    }
}

impl Default for EphemeralCategories {
    fn default() -> Self {
        Self {
            set: RwLock::new(default_categories()),
        }
    }
}

impl CategoryStore for EphemeralCategories {
    fn categories(&self) -> Result<HashSet<String>, CoreError> {
        Ok(self.set.read().clone())
    }

    fn add(&self, category: &str) -> Result<(), CoreError> {
        let category = normalize_category(Some(category))?;
        let inserted = self.set.write().insert(category.clone());
        debug!(%category, inserted, "add category");
        Ok(())
    }

    fn delete(&self, category: &str) -> Result<(), CoreError> {
        let category = normalize_category(Some(category))?;
        let removed = self.set.write().remove(&category);
        debug!(%category, removed, "delete category");
        Ok(())
    }
}
