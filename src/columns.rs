//! Field name ↔ column name conversion.
//!
//! Fields are camelCase on the caller side and underscored_names in the
//! database.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PRE_HUMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z0-9])").expect("valid column regex"));

static UNDERSCORED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_([a-z\d])").expect("valid field regex"));

/// Convert a field identifier to its column name.
///
/// ```
/// use sqlhelper::transform_to_column;
///
/// assert_eq!(transform_to_column("fooBarBaz"), "foo_bar_baz");
/// ```
pub fn transform_to_column(field: &str) -> String {
    PRE_HUMP.replace_all(field, "${1}_${2}").to_lowercase()
}

/// Convert a column name back to its field identifier.
///
/// ```
/// use sqlhelper::transform_to_field;
///
/// assert_eq!(transform_to_field("foo_bar_baz"), "fooBarBaz");
/// ```
pub fn transform_to_field(column: &str) -> String {
    UNDERSCORED
        .replace_all(column, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_to_column() {
        assert_eq!(transform_to_column("fooBarBaz"), "foo_bar_baz");
        assert_eq!(transform_to_column("createdAt"), "created_at");
        assert_eq!(transform_to_column("userID"), "user_id");
        assert_eq!(transform_to_column("address2"), "address_2");
        assert_eq!(transform_to_column("foo"), "foo");
    }

    #[test]
    fn test_snake_case_is_unchanged() {
        for column in ["foo_bar_baz", "id", "created_at", "a_b_c"] {
            assert_eq!(transform_to_column(column), column);
        }
    }

    #[test]
    fn test_column_transform_is_idempotent() {
        for field in ["fooBarBaz", "address2", "userID", "createdAt"] {
            let once = transform_to_column(field);
            assert_eq!(transform_to_column(&once), once);
        }
    }

    #[test]
    fn test_column_to_field() {
        assert_eq!(transform_to_field("foo_bar_baz"), "fooBarBaz");
        assert_eq!(transform_to_field("created_at"), "createdAt");
        assert_eq!(transform_to_field("foo"), "foo");
        assert_eq!(transform_to_field("address_2"), "address2");
    }

    #[test]
    fn test_field_column_round_trip() {
        for column in ["foo_bar_baz", "created_at", "id"] {
            assert_eq!(transform_to_column(&transform_to_field(column)), column);
        }
    }
}
