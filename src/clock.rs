//! Timestamp formatting for producer payloads.

use chrono::{Local, NaiveDateTime};

/// ISO-8601 local date-time layout without an offset, e.g.
/// `2024-03-01T14:05:09.123456789`.
pub const ISO_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Returns the current local time formatted with [`ISO_DATE_TIME`].
#[must_use]
pub fn iso_now() -> String {
    format_iso(Local::now().naive_local())
}

/// Formats a naive date-time with [`ISO_DATE_TIME`].
#[must_use]
pub fn format_iso(at: NaiveDateTime) -> String {
    at.format(ISO_DATE_TIME).to_string()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn formats_without_offset() {
        let Some(at) = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_milli_opt(14, 5, 9, 120))
        else {
            panic!("valid date");
        };
        assert_eq!(format_iso(at), "2024-03-01T14:05:09.120");
    }

    #[test]
    fn now_parses_back() {
        let now = iso_now();
        assert!(NaiveDateTime::parse_from_str(&now, ISO_DATE_TIME).is_ok());
    }
}
