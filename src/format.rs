/// Display formatting for upstream timestamps.
///
/// The USGS API returns ISO 8601 datetimes with a numeric offset, e.g.
/// "2024-05-01T12:45:00.000-05:00". Consumers embed these in rendered
/// content, so they get a human-readable form in the reading's local time.

use chrono::DateTime;

/// Formats an upstream ISO 8601 datetime as e.g. "May 1, 2024 12:45 pm",
/// keeping the offset the reading was reported in.
///
/// Empty input yields an empty string. Input that does not parse is
/// returned unchanged — a best-effort display concern, not an error path.
pub fn format_datetime(iso: &str) -> String {
    if iso.is_empty() {
        return String::new();
    }
    match DateTime::parse_from_rfc3339(iso) {
        Ok(datetime) => datetime.format("%B %-d, %Y %-I:%M %P").to_string(),
        Err(_) => iso.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_usgs_style_timestamp() {
        assert_eq!(
            format_datetime("2024-05-01T12:45:00.000-05:00"),
            "May 1, 2024 12:45 pm"
        );
    }

    #[test]
    fn test_formats_morning_hour_without_padding() {
        assert_eq!(
            format_datetime("2024-11-09T08:05:00.000-06:00"),
            "November 9, 2024 8:05 am"
        );
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(format_datetime(""), "");
    }

    #[test]
    fn test_unparseable_input_passed_through() {
        assert_eq!(format_datetime("not-a-datetime"), "not-a-datetime");
    }
}
