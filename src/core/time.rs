//! Shared timestamp helpers.

use chrono::{SecondsFormat, Utc};

/// Returns the current UTC time as an RFC 3339 / ISO-8601 string
/// (e.g. `2026-08-23T14:07:31Z`).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
