//! Column-list and SET-clause fragments.
//!
//! Both formatters sort the provided fields by name before numbering the
//! placeholders, so values must be supplied in that same sorted order.
//! [`prepare_record_for_insert`] and [`prepare_record_for_set`] do that
//! pairing for you.

use crate::columns::transform_to_column;
use crate::error::{HelperResult, QueryError};
use crate::statement::{Record, SqlValue};

/// Build `(<columns>) VALUES ($1, ..., $n)` for an INSERT.
///
/// ```
/// use sqlhelper::prepare_fields_for_insert;
///
/// let sql = prepare_fields_for_insert(&["foo", "baa", "bar"]).unwrap();
/// assert_eq!(sql, "(baa, bar, foo) VALUES ($1, $2, $3)");
/// ```
pub fn prepare_fields_for_insert<S: AsRef<str>>(fields: &[S]) -> HelperResult<String> {
    let sorted = sorted_fields(fields)?;

    let columns: Vec<String> = sorted.iter().map(|f| transform_to_column(f)).collect();
    let placeholders: Vec<String> = (1..=sorted.len()).map(|i| format!("${}", i)).collect();

    Ok(format!(
        "({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    ))
}

/// Build `<column> = $1, <column> = $2, ...` for an UPDATE.
///
/// ```
/// use sqlhelper::prepare_fields_for_set;
///
/// assert_eq!(prepare_fields_for_set(&["foo", "bar"]).unwrap(), "bar = $1, foo = $2");
/// ```
pub fn prepare_fields_for_set<S: AsRef<str>>(fields: &[S]) -> HelperResult<String> {
    let sorted = sorted_fields(fields)?;

    let assignments: Vec<String> = sorted
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{} = ${}", transform_to_column(f), i + 1))
        .collect();

    Ok(assignments.join(", "))
}

/// INSERT fragment for a record, plus its values in placeholder order.
pub fn prepare_record_for_insert(record: &Record) -> HelperResult<(String, Vec<SqlValue>)> {
    let fields: Vec<&str> = record.keys().map(String::as_str).collect();
    let sql = prepare_fields_for_insert(&fields)?;
    Ok((sql, values_in_field_order(record)))
}

/// SET fragment for a record, plus its values in placeholder order.
pub fn prepare_record_for_set(record: &Record) -> HelperResult<(String, Vec<SqlValue>)> {
    let fields: Vec<&str> = record.keys().map(String::as_str).collect();
    let sql = prepare_fields_for_set(&fields)?;
    Ok((sql, values_in_field_order(record)))
}

fn values_in_field_order(record: &Record) -> Vec<SqlValue> {
    let mut entries: Vec<(&String, &serde_json::Value)> = record.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries.into_iter().map(|(_, v)| SqlValue::from(v)).collect()
}

fn sorted_fields<S: AsRef<str>>(fields: &[S]) -> HelperResult<Vec<&str>> {
    if fields.is_empty() {
        return Err(QueryError::invalid_argument("field list is empty"));
    }

    let mut sorted: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();

    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(QueryError::invalid_argument(format!(
            "field '{}' listed more than once",
            pair[0]
        )));
    }

    Ok(sorted)
}
