/// Input validation
///
/// Field rules are declared with `validator` derives. Failures are collected
/// as [`FieldError`]s in a fixed field order so the page can show them as one
/// sentence-per-problem message.

pub mod image_url;
pub mod listing;

use serde::Serialize;
use validator::ValidationErrors;

pub use image_url::{validate_image_url, HttpImageProbe, ImageProbe, ImageUrlError, ProbeError};
pub use listing::ListingDraft;

/// One failed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` errors, ordered by `order`
///
/// Fields missing from `order` come last, sorted by name so the output is
/// stable.
pub fn field_errors_in_order(errors: &ValidationErrors, order: &[&str]) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    let lookup = &by_field;

    let mut fields: Vec<&str> = order
        .iter()
        .copied()
        .filter(|field| lookup.contains_key(*field))
        .collect();

    let mut rest: Vec<&str> = lookup
        .keys()
        .map(|key| &**key)
        .filter(|key| !order.contains(key))
        .collect();
    rest.sort_unstable();
    fields.extend(rest);

    fields
        .into_iter()
        .flat_map(move |field| {
            lookup.get(field).into_iter().flat_map(move |list| {
                list.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {field}."));
                    FieldError::new(field, message)
                })
            })
        })
        .collect()
}

/// Joins messages with single spaces
pub fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
