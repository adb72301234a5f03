//! Deduplication, filtering and counting of category/subcategory pairs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::errors::CoreError;
use crate::model::{CategoryAndSubcat, CategoryCleanResponse, CategoryCount};
use crate::traits::CategoryStore;
use crate::validate::require_input;

/// Drops repeated pairs (first occurrence wins), then pairs whose category is
/// not in `valid`. Input order is preserved.
pub fn clean(input: &[CategoryAndSubcat], valid: &HashSet<String>) -> Vec<CategoryAndSubcat> {
    let mut seen = HashSet::with_capacity(input.len());
    input
        .iter()
        .filter(|pair| seen.insert(*pair))
        .filter(|pair| valid.contains(&pair.category))
        .cloned()
        .collect()
}

/// Counts occurrences per category seen in `input`, whether valid or not.
///
/// Counts are ordered most frequent first; equal counts keep the order in
/// which their category first appeared. Every category in `valid` that does
/// not appear in the input is appended with a count of zero, sorted by name.
pub fn count(input: &[CategoryAndSubcat], valid: &HashSet<String>) -> Vec<CategoryCount> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();
    for pair in input {
        match slots.get(pair.category.as_str()) {
            Some(&slot) => counts[slot].num_occurrences += 1,
            None => {
                slots.insert(pair.category.as_str(), counts.len());
                counts.push(CategoryCount::new(&pair.category, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.num_occurrences.cmp(&a.num_occurrences));

    let mut absent: Vec<&String> = valid
        .iter()
        .filter(|c| !slots.contains_key(c.as_str()))
        .collect();
    absent.sort();
    counts.extend(absent.into_iter().map(|c| CategoryCount::new(c, 0)));
    counts
}

/// Runs the pipeline against the current contents of a shared store.
pub struct DataCleaner<S> {
    store: Arc<S>,
}

impl<S> Clone for DataCleaner<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> DataCleaner<S>
where
    S: CategoryStore,
{
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn clean_data(
        &self,
        input: Option<&[CategoryAndSubcat]>,
    ) -> Result<Vec<CategoryAndSubcat>, CoreError> {
        let input = require_input(input, "input")?;
        let valid = self.store.categories()?;
        let cleaned = clean(input, &valid);
        debug!(
            received = input.len(),
            kept = cleaned.len(),
            "cleaned category data"
        );
        Ok(cleaned)
    }

    pub fn category_counts(
        &self,
        input: Option<&[CategoryAndSubcat]>,
    ) -> Result<Vec<CategoryCount>, CoreError> {
        let input = require_input(input, "input")?;
        let valid = self.store.categories()?;
        let counts = count(input, &valid);
        debug!(
            received = input.len(),
            categories = counts.len(),
            "counted categories"
        );
        Ok(counts)
    }

    /// Cleans the input and counts the cleaned pairs against a single
    /// snapshot of the store.
    pub fn process(
        &self,
        input: Option<&[CategoryAndSubcat]>,
    ) -> Result<CategoryCleanResponse, CoreError> {
        let input = require_input(input, "input")?;
        let valid = self.store.categories()?;
        let categories = clean(input, &valid);
        let counts = count(&categories, &valid);
        debug!(
            received = input.len(),
            kept = categories.len(),
            "processed data set"
        );
        Ok(CategoryCleanResponse { categories, counts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::default_categories;
    use crate::errors::ValidationError;
    use std::sync::Mutex;

    struct FixedStore(Mutex<HashSet<String>>);

    impl CategoryStore for FixedStore {
        fn categories(&self) -> Result<HashSet<String>, CoreError> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn add(&self, category: &str) -> Result<(), CoreError> {
            self.0.lock().unwrap().insert(category.to_owned());
            Ok(())
        }

        fn delete(&self, category: &str) -> Result<(), CoreError> {
            self.0.lock().unwrap().remove(category);
            Ok(())
        }
    }

    fn cleaner() -> DataCleaner<FixedStore> {
        DataCleaner::new(Arc::new(FixedStore(Mutex::new(default_categories()))))
    }

    fn bob() -> CategoryAndSubcat {
        CategoryAndSubcat::new("PERSON", "Bob Jones")
    }

    fn fairfax() -> CategoryAndSubcat {
        CategoryAndSubcat::new("PLACE", "Fairfax, VA")
    }

    fn don() -> CategoryAndSubcat {
        CategoryAndSubcat::new("PERSON", "Don Brinker")
    }

    fn muppet() -> CategoryAndSubcat {
        CategoryAndSubcat::new("MUPPET", "Animal")
    }

    fn assert_zero_tail(counts: &[CategoryCount], names: &[&str]) {
        for name in names {
            assert!(
                counts.contains(&CategoryCount::new(name, 0)),
                "missing zero count for {name}"
            );
        }
    }

    #[test]
    fn clean_keeps_valid_data_in_order() {
        let input = vec![bob(), fairfax(), don()];
        let out = cleaner().clean_data(Some(input.as_slice())).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn clean_drops_later_duplicates() {
        let input = vec![bob(), fairfax(), don(), fairfax(), bob()];
        let out = cleaner().clean_data(Some(input.as_slice())).unwrap();
        assert_eq!(out, vec![bob(), fairfax(), don()]);
    }

    #[test]
    fn clean_drops_invalid_categories() {
        let input = vec![bob(), muppet(), fairfax(), muppet(), don()];
        let out = cleaner().clean_data(Some(input.as_slice())).unwrap();
        assert_eq!(out, vec![bob(), fairfax(), don()]);
    }

    #[test]
    fn same_subcategory_under_different_categories_is_kept() {
        let input = vec![
            CategoryAndSubcat::new("ANIMAL", "Python"),
            CategoryAndSubcat::new("COMPUTER", "Python"),
        ];
        let out = cleaner().clean_data(Some(input.as_slice())).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn count_orders_by_frequency_then_appends_zeroes() {
        let input = vec![bob(), fairfax(), don()];
        let counts = cleaner().category_counts(Some(input.as_slice())).unwrap();
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[0], CategoryCount::new("PERSON", 2));
        assert_eq!(counts[1], CategoryCount::new("PLACE", 1));
        assert_zero_tail(&counts, &["ANIMAL", "COMPUTER", "OTHER"]);
    }

    #[test]
    fn count_includes_categories_outside_the_valid_set() {
        let input = vec![muppet(), bob(), muppet()];
        let counts = cleaner().category_counts(Some(input.as_slice())).unwrap();
        assert_eq!(counts[0], CategoryCount::new("MUPPET", 2));
        assert_eq!(counts[1], CategoryCount::new("PERSON", 1));
        assert_eq!(counts.len(), 6);
        assert_zero_tail(&counts, &["PLACE", "ANIMAL", "COMPUTER", "OTHER"]);
    }

    #[test]
    fn count_nonzero_entries_sum_to_input_length() {
        let input = vec![bob(), fairfax(), don(), bob(), muppet()];
        let counts = cleaner().category_counts(Some(input.as_slice())).unwrap();
        let total: u64 = counts.iter().map(|c| c.num_occurrences).sum();
        assert_eq!(total, input.len() as u64);
        let first_zero = counts
            .iter()
            .position(|c| c.num_occurrences == 0)
            .unwrap();
        assert!(counts[first_zero..].iter().all(|c| c.num_occurrences == 0));
    }

    #[test]
    fn empty_input() {
        let c = cleaner();
        assert!(c.clean_data(Some(&[][..])).unwrap().is_empty());
        let counts = c.category_counts(Some(&[][..])).unwrap();
        assert_eq!(counts.len(), 5);
        assert_zero_tail(&counts, &["PERSON", "PLACE", "ANIMAL", "COMPUTER", "OTHER"]);
    }

    #[test]
    fn missing_input_is_invalid_argument() {
        let c = cleaner();
        for err in [
            c.clean_data(None).unwrap_err(),
            c.category_counts(None).unwrap_err(),
            c.process(None).unwrap_err(),
        ] {
            assert!(matches!(
                err,
                CoreError::InvalidArgument(ValidationError::MissingInput(_))
            ));
        }
    }

    #[test]
    fn pipeline_sees_store_mutations() {
        let c = cleaner();
        let input = vec![muppet(), fairfax()];
        c.store().add("MUPPET").unwrap();
        c.store().delete("PLACE").unwrap();
        let out = c.process(Some(input.as_slice())).unwrap();
        assert_eq!(out.categories, vec![muppet()]);
        assert_eq!(out.counts[0], CategoryCount::new("MUPPET", 1));
        assert!(!out.counts.iter().any(|c| c.category == "PLACE"));
    }

    #[test]
    fn process_counts_cleaned_pairs() {
        let input = vec![bob(), fairfax(), don(), muppet(), bob()];
        let out = cleaner().process(Some(input.as_slice())).unwrap();
        assert_eq!(out.categories, vec![bob(), fairfax(), don()]);
        assert_eq!(out.counts.len(), 5);
        assert_eq!(out.counts[0], CategoryCount::new("PERSON", 2));
        assert_eq!(out.counts[1], CategoryCount::new("PLACE", 1));
        assert!(!out.counts.iter().any(|c| c.category == "MUPPET"));
    }

    #[test]
    /// Equal counts are stably ordered by first appearance; this pins that
    /// chosen ordering, which callers may rely on for reproducible output.
    fn count_equal_counts_use_stable_first_appearance_order() {
        let valid: HashSet<String> = HashSet::new();
        let input = vec![fairfax(), bob()];
        let counts = count(&input, &valid);
        assert_eq!(
            counts,
            vec![CategoryCount::new("PLACE", 1), CategoryCount::new("PERSON", 1)]
        );
    }
}
