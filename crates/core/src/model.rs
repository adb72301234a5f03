use serde::{Deserialize, Serialize};

/// A category/subcategory pair.
///
/// Subcategories are only meaningful within their category: two pairs sharing
/// a subcategory name under different categories are distinct entities.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CategoryAndSubcat {
    pub category: String,
    pub subcategory: String,
}

impl CategoryAndSubcat {
    pub fn new(category: &str, subcategory: &str) -> Self {
        Self {
            category: category.to_owned(),
            subcategory: subcategory.to_owned(),
        }
    }
}

/// Number of occurrences of a single category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub num_occurrences: u64,
}

impl CategoryCount {
    pub fn new(category: &str, num_occurrences: u64) -> Self {
        Self {
            category: category.to_owned(),
            num_occurrences,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CategoryCleanResponse {
    /// Cleaned pairs, in input order.
    pub categories: Vec<CategoryAndSubcat>,
    /// Counts, most frequent first, followed by zero-count known categories.
    pub counts: Vec<CategoryCount>,
}
