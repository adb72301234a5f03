use crate::errors::ValidationError;

/// Trims a category name and rejects missing or blank names.
pub fn normalize_category(raw: Option<&str>) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(ValidationError::EmptyCategory),
    }
}

pub fn require_input<T>(input: Option<T>, what: &'static str) -> Result<T, ValidationError> {
    input.ok_or(ValidationError::MissingInput(what))
}
