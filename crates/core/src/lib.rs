//! Core domain model, validation, the category store contract and the
//! cleaning pipeline.
//! No async and no IO within this crate.

pub mod category;
pub mod clean;
pub mod errors;
pub mod model;
pub mod traits;
pub mod validate;

pub use crate::category::{default_categories, DEFAULT_CATEGORIES};
pub use crate::clean::{clean, count, DataCleaner};
pub use crate::errors::{CoreError, ValidationError};
pub use crate::model::{CategoryAndSubcat, CategoryCleanResponse, CategoryCount};
pub use crate::traits::CategoryStore;
pub use crate::validate::{normalize_category, require_input};
