//! Timestamp helper for created/updated columns.

use chrono::{SecondsFormat, Utc};

/// Current UTC time, e.g. `2017-08-24T20:06:25.446Z`.
pub fn create_now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
