/// Core data types for the USGS stream gage data service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic, no I/O, and no external dependencies beyond
/// serde/chrono derives — only types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// USGS parameter code for gage height (stage), in feet.
pub const PARAM_GAGE_HEIGHT: &str = "00065";

// ---------------------------------------------------------------------------
// Lookback periods
// ---------------------------------------------------------------------------

/// Lookback window for a historical extrema query.
///
/// The cache lifetime scales with the window length: a 24-hour window's
/// extrema can change with every new reading, while a one-year window's
/// extrema almost never move within a few hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Last 24 hours ("24h").
    Day,
    /// Last 7 days ("7d").
    Week,
    /// Last 30 days ("30d").
    Month,
    /// Last 365 days ("1y").
    Year,
}

impl Period {
    /// All periods accepted by the historical data operation.
    pub const ALL: [Period; 4] = [Period::Day, Period::Week, Period::Month, Period::Year];

    /// Parses the period token used by callers ("24h", "7d", "30d", "1y").
    /// Any other token is a caller contract violation and yields `None`.
    pub fn parse(token: &str) -> Option<Period> {
        match token {
            "24h" => Some(Period::Day),
            "7d" => Some(Period::Week),
            "30d" => Some(Period::Month),
            "1y" => Some(Period::Year),
            _ => None,
        }
    }

    /// The caller-facing token for this period.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "24h",
            Period::Week => "7d",
            Period::Month => "30d",
            Period::Year => "1y",
        }
    }

    /// Window length. The "1y" window is a fixed 365 days.
    pub fn duration(&self) -> Duration {
        match self {
            Period::Day => Duration::hours(24),
            Period::Week => Duration::days(7),
            Period::Month => Duration::days(30),
            Period::Year => Duration::days(365),
        }
    }

    /// Cache lifetime for a historical result over this window, in seconds.
    pub fn cache_ttl_secs(&self) -> i64 {
        match self {
            Period::Day => 1_800,   // 30 minutes
            Period::Week => 3_600,  // 1 hour
            Period::Month => 7_200, // 2 hours
            Period::Year => 14_400, // 4 hours
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Site types
// ---------------------------------------------------------------------------

/// A validated USGS monitoring site.
///
/// Produced by `client::UsgsClient::validate_site` from the first
/// `timeSeries` entry's source metadata. The `id` is assigned by the
/// configured-site store (`sites::SiteList::ensure_ids`), not by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Opaque identifier used by the configured-site store. Empty until
    /// assigned; regenerated if missing.
    #[serde(default)]
    pub id: String,
    /// USGS site number (8-15 digit numeric string, upstream key).
    pub site_number: String,
    /// Official USGS site name.
    pub site_name: String,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Whether the upstream service has confirmed this site.
    #[serde(default)]
    pub is_validated: bool,
}

/// A site-search match from the USGS Site service.
///
/// Search results are advisory, so geographic coordinates may be missing
/// per record; a record is kept with `None` coordinates rather than
/// discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSummary {
    pub site_number: String,
    pub site_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Three-way outcome of validating a site number against the USGS API.
///
/// `Invalid` means the upstream service definitively reports no matching
/// active site. `Error` means the request itself failed (network error,
/// non-2xx status, malformed body). Callers must never conflate the two:
/// only `Valid` and `Invalid` results are cached.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid(Site),
    Invalid,
    Error(String),
}

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// Latest instantaneous discharge and gage height for a site.
///
/// Either measurement may be `None` when the site does not report that
/// parameter — partial data is valid data, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentReading {
    pub site_number: String,
    pub retrieved_at: DateTime<Utc>,
    pub discharge: Option<f64>,
    pub discharge_unit: Option<String>,
    pub gage_height: Option<f64>,
    pub gage_height_unit: Option<String>,
    pub error: bool,
    pub error_message: Option<String>,
}

impl CurrentReading {
    /// A reading with no measurements yet, ready to be filled in.
    pub fn empty(site_number: &str, retrieved_at: DateTime<Utc>) -> CurrentReading {
        CurrentReading {
            site_number: site_number.to_string(),
            retrieved_at,
            discharge: None,
            discharge_unit: None,
            gage_height: None,
            gage_height_unit: None,
            error: false,
            error_message: None,
        }
    }

    /// A failed fetch, carrying the failure message. Never cached.
    pub fn failed(site_number: &str, retrieved_at: DateTime<Utc>, message: String) -> CurrentReading {
        CurrentReading {
            error: true,
            error_message: Some(message),
            ..CurrentReading::empty(site_number, retrieved_at)
        }
    }
}

/// High/low extrema for a single physical parameter over a lookback window.
///
/// All four extrema fields are `None` when the series contained no numeric
/// samples — absence, not an error. `high_at`/`low_at` carry the upstream
/// ISO 8601 timestamp of the first sample matching the extreme value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterExtrema {
    pub high: Option<f64>,
    pub high_at: Option<String>,
    pub low: Option<f64>,
    pub low_at: Option<String>,
    pub unit: Option<String>,
}

/// Historical high/low extrema for discharge and gage height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalExtrema {
    pub site_number: String,
    /// `None` when the caller supplied an unknown period token.
    pub period: Option<Period>,
    pub retrieved_at: DateTime<Utc>,
    pub discharge: ParameterExtrema,
    pub gage_height: ParameterExtrema,
    pub error: bool,
    pub error_message: Option<String>,
}

impl HistoricalExtrema {
    /// A result with no extrema yet, ready to be filled in.
    pub fn empty(site_number: &str, period: Period, retrieved_at: DateTime<Utc>) -> HistoricalExtrema {
        HistoricalExtrema {
            site_number: site_number.to_string(),
            period: Some(period),
            retrieved_at,
            discharge: ParameterExtrema::default(),
            gage_height: ParameterExtrema::default(),
            error: false,
            error_message: None,
        }
    }

    /// A failed fetch or rejected request, carrying the failure message.
    pub fn failed(
        site_number: &str,
        period: Option<Period>,
        retrieved_at: DateTime<Utc>,
        message: String,
    ) -> HistoricalExtrema {
        HistoricalExtrema {
            site_number: site_number.to_string(),
            period,
            retrieved_at,
            discharge: ParameterExtrema::default(),
            gage_height: ParameterExtrema::default(),
            error: true,
            error_message: Some(message),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when talking to the USGS water services API.
///
/// All three variants are transport-class failures from the caller's point
/// of view: the exchange did not produce a usable answer, so the result is
/// surfaced as an error value and never cached.
#[derive(Debug, Clone, PartialEq)]
pub enum UsgsError {
    /// The network exchange itself failed (unreachable, timeout, body read).
    Transport(String),
    /// Non-2xx HTTP response from the USGS API.
    HttpStatus(u16),
    /// A 2xx response whose body was missing expected fields or was not
    /// valid JSON.
    Malformed(String),
}

impl std::fmt::Display for UsgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsgsError::Transport(msg) => write!(f, "Transport error: {}", msg),
            UsgsError::HttpStatus(code) => write!(f, "HTTP error: {}", code),
            UsgsError::Malformed(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for UsgsError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_tokens_round_trip() {
        for period in Period::ALL {
            assert_eq!(
                Period::parse(period.as_str()),
                Some(period),
                "token '{}' should parse back to {:?}",
                period.as_str(),
                period
            );
        }
    }

    #[test]
    fn test_unknown_period_token_rejected() {
        assert_eq!(Period::parse("48h"), None);
        assert_eq!(Period::parse(""), None);
        assert_eq!(Period::parse("1Y"), None, "tokens are case-sensitive");
    }

    #[test]
    fn test_period_ttl_grows_with_window_length() {
        assert_eq!(Period::Day.cache_ttl_secs(), 1_800);
        assert_eq!(Period::Week.cache_ttl_secs(), 3_600);
        assert_eq!(Period::Month.cache_ttl_secs(), 7_200);
        assert_eq!(Period::Year.cache_ttl_secs(), 14_400);
    }

    #[test]
    fn test_period_durations() {
        assert_eq!(Period::Day.duration(), Duration::hours(24));
        assert_eq!(Period::Week.duration(), Duration::days(7));
        assert_eq!(Period::Month.duration(), Duration::days(30));
        assert_eq!(Period::Year.duration(), Duration::days(365));
    }

    #[test]
    fn test_parameter_codes_are_valid_and_distinct() {
        assert_eq!(PARAM_DISCHARGE.len(), 5);
        assert_eq!(PARAM_GAGE_HEIGHT.len(), 5);
        assert!(PARAM_DISCHARGE.chars().all(|c| c.is_ascii_digit()));
        assert!(PARAM_GAGE_HEIGHT.chars().all(|c| c.is_ascii_digit()));
        assert_ne!(PARAM_DISCHARGE, PARAM_GAGE_HEIGHT);
    }

    #[test]
    fn test_usgs_error_display() {
        assert_eq!(UsgsError::HttpStatus(503).to_string(), "HTTP error: 503");
        assert_eq!(
            UsgsError::Transport("connection refused".to_string()).to_string(),
            "Transport error: connection refused"
        );
    }

    #[test]
    fn test_failed_reading_carries_message_and_flag() {
        let now = Utc::now();
        let reading = CurrentReading::failed("05568500", now, "timed out".to_string());
        assert!(reading.error);
        assert_eq!(reading.error_message.as_deref(), Some("timed out"));
        assert_eq!(reading.discharge, None);
        assert_eq!(reading.gage_height, None);
    }
}
