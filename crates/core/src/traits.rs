use crate::errors::CoreError;
use std::collections::HashSet;

/// The mutable set of valid category names.
///
/// Implementations must allow concurrent readers and give mutations exclusive
/// access for the duration of the single call. `categories` returns an owned
/// snapshot so no lock outlives the operation.
pub trait CategoryStore {
    fn categories(&self) -> Result<HashSet<String>, CoreError>;

    /// Inserts the category; a no-op when it is already present.
    fn add(&self, category: &str) -> Result<(), CoreError>;

    /// Removes the category; a no-op when it is absent.
    fn delete(&self, category: &str) -> Result<(), CoreError>;
}
