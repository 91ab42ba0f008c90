//! Field-level checks shared by the input types.

use crate::{Error, Result};

/// Reject values longer than `max` characters.
pub(crate) fn max_chars(field: &str, value: &str, max: usize) -> Result<()> {
  if value.chars().count() > max {
    return Err(Error::Validation(format!(
      "{field} must be at most {max} characters"
    )));
  }
  Ok(())
}

/// Reject blank values and values longer than `max` characters.
pub(crate) fn required(field: &str, value: &str, max: usize) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} must not be empty")));
  }
  max_chars(field, value, max)
}

pub(crate) fn optional(
  field: &str,
  value: Option<&str>,
  max: usize,
) -> Result<()> {
  value.map_or(Ok(()), |v| max_chars(field, v, max))
}

/// Turn an empty or whitespace-only optional string into `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}
