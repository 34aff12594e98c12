/// USGS API client with caching and outcome classification.
///
/// `UsgsClient` mediates all communication with the USGS water services
/// API. Every distinct query is cached for an interval matched to its
/// volatility: site validation for 24 hours (including negative results, so
/// repeated bad site numbers never hammer the API), current readings for
/// 15 minutes, and historical extrema from 30 minutes up to 4 hours
/// depending on the window length.
///
/// Transport failures are surfaced immediately as error results and are
/// never cached — a transient outage must not poison the cache. Malformed
/// 2xx bodies are treated the same way for callers, but additionally force
/// deletion of the cache key so the next attempt retries fresh.
///
/// The cache and diagnostic log are injected at construction rather than
/// held as process globals, so tests can run isolated clients side by side.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::analysis::extrema::series_extrema;
use crate::cache::CacheStore;
use crate::ingest::usgs::{
    build_current_url, build_historical_url, build_search_url, build_validation_url,
    extract_current, extract_search_sites, extract_site, historical_window, parse_iv_response,
    parse_site_search_response,
};
use crate::ingest::{HttpTransport, Transport};
use crate::logging::{DiagnosticLog, LogLevel};
use crate::model::{
    CurrentReading, HistoricalExtrema, Period, SiteSummary, UsgsError, ValidationOutcome,
    PARAM_DISCHARGE, PARAM_GAGE_HEIGHT,
};

/// Cache lifetime for validation results, positive and negative: 24 hours.
pub const VALIDATION_TTL_SECS: i64 = 86_400;

/// Cache lifetime for current readings: 15 minutes.
pub const CURRENT_TTL_SECS: i64 = 900;

// ---------------------------------------------------------------------------
// Cache keys
// ---------------------------------------------------------------------------

pub fn validation_key(site_number: &str) -> String {
    format!("validation:{}", site_number)
}

pub fn current_key(site_number: &str) -> String {
    format!("current:{}", site_number)
}

pub fn historical_key(site_number: &str, period: Period) -> String {
    format!("historical:{}:{}", period.as_str(), site_number)
}

/// Validation results as stored in the cache. Error outcomes are never
/// cached, so only the two definitive shapes appear here.
#[derive(Debug, Serialize, Deserialize)]
enum CachedValidation {
    Valid(crate::model::Site),
    Invalid,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct UsgsClient<T: Transport> {
    transport: T,
    cache: CacheStore<Value>,
    log: DiagnosticLog,
}

impl UsgsClient<HttpTransport> {
    /// A client over real HTTP with a fresh cache and log.
    pub fn new() -> Result<UsgsClient<HttpTransport>, UsgsError> {
        Ok(UsgsClient::with_parts(
            HttpTransport::new()?,
            CacheStore::new(),
            DiagnosticLog::new(),
        ))
    }
}

impl<T: Transport> UsgsClient<T> {
    /// Assembles a client from explicitly constructed parts.
    pub fn with_parts(transport: T, cache: CacheStore<Value>, log: DiagnosticLog) -> UsgsClient<T> {
        UsgsClient {
            transport,
            cache,
            log,
        }
    }

    /// The diagnostic log, for the admin collaborator.
    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.log
    }

    pub fn cache(&self) -> &CacheStore<Value> {
        &self.cache
    }

    /// Mutable cache access, for forced invalidation by the admin
    /// collaborator.
    pub fn cache_mut(&mut self) -> &mut CacheStore<Value> {
        &mut self.cache
    }

    // -- validate ------------------------------------------------------------

    /// Resolves a raw site number to confirmed metadata, a definitive
    /// "no such active site", or an error.
    ///
    /// Both valid and invalid outcomes are cached for 24 hours; a cached
    /// invalid result is returned without a network call. Error outcomes
    /// are never cached.
    pub fn validate_site(&mut self, site_number: &str) -> ValidationOutcome {
        if site_number.trim().is_empty() {
            self.log.append(
                LogLevel::Warning,
                "Rejected empty site number",
                json!({ "method": "validate_site" }),
            );
            return ValidationOutcome::Error("site number must not be empty".to_string());
        }

        self.log.append(
            LogLevel::Info,
            "Validating USGS site",
            json!({ "site_number": site_number, "method": "validate_site" }),
        );

        let key = validation_key(site_number);
        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value::<CachedValidation>(cached) {
                Ok(CachedValidation::Valid(site)) => {
                    self.log.append(
                        LogLevel::Debug,
                        "Using cached validation data",
                        json!({ "site_number": site_number, "cache_key": key, "valid": true }),
                    );
                    return ValidationOutcome::Valid(site);
                }
                Ok(CachedValidation::Invalid) => {
                    self.log.append(
                        LogLevel::Debug,
                        "Using cached validation data",
                        json!({ "site_number": site_number, "cache_key": key, "valid": false }),
                    );
                    return ValidationOutcome::Invalid;
                }
                Err(e) => {
                    // Poisoned entry. Drop it and refetch.
                    self.cache.delete(&key);
                    self.log.append(
                        LogLevel::Error,
                        "Discarded undecodable cache entry",
                        json!({ "cache_key": key, "error": e.to_string() }),
                    );
                }
            }
        }

        let url = build_validation_url(site_number);
        let body = match self.fetch(&url) {
            Ok(body) => body,
            Err(e) => {
                self.log.append(
                    LogLevel::Error,
                    "API error validating site",
                    json!({ "site_number": site_number, "error": e.to_string() }),
                );
                return ValidationOutcome::Error(e.to_string());
            }
        };

        let response = match parse_iv_response(&body) {
            Ok(response) => response,
            Err(e) => {
                self.cache.delete(&key);
                self.log.append(
                    LogLevel::Error,
                    "Malformed validation response",
                    json!({
                        "site_number": site_number,
                        "error": e.to_string(),
                        "body_preview": body_preview(&body),
                    }),
                );
                return ValidationOutcome::Error(e.to_string());
            }
        };

        match extract_site(site_number, &response) {
            Some(site) => {
                self.log.append(
                    LogLevel::Info,
                    "USGS site validated successfully",
                    json!({ "site_number": site_number, "site_name": site.site_name }),
                );
                if let Ok(value) = serde_json::to_value(CachedValidation::Valid(site.clone())) {
                    self.cache.set(&key, value, VALIDATION_TTL_SECS);
                }
                ValidationOutcome::Valid(site)
            }
            None => {
                self.log.append(
                    LogLevel::Warning,
                    "Invalid USGS site",
                    json!({ "site_number": site_number, "response": "No time series data found" }),
                );
                if let Ok(value) = serde_json::to_value(CachedValidation::Invalid) {
                    self.cache.set(&key, value, VALIDATION_TTL_SECS);
                }
                ValidationOutcome::Invalid
            }
        }
    }

    // -- search --------------------------------------------------------------

    /// Searches active stream sites by name fragment.
    ///
    /// This endpoint is advisory (search-assist), so zero matches,
    /// transport failures, and malformed bodies all yield an empty list;
    /// the distinction is recorded in the log, not surfaced to the caller.
    /// Results are not cached.
    pub fn search_sites_by_name(&mut self, name_fragment: &str) -> Vec<SiteSummary> {
        self.log.append(
            LogLevel::Info,
            "Searching for USGS sites",
            json!({ "search_term": name_fragment, "method": "search_sites_by_name" }),
        );

        let url = build_search_url(name_fragment);
        let body = match self.fetch(&url) {
            Ok(body) => body,
            Err(e) => {
                self.log.append(
                    LogLevel::Error,
                    "API error searching sites",
                    json!({ "search_term": name_fragment, "error": e.to_string() }),
                );
                return Vec::new();
            }
        };

        let response = match parse_site_search_response(&body) {
            Ok(response) => response,
            Err(e) => {
                self.log.append(
                    LogLevel::Warning,
                    "Malformed site search response",
                    json!({
                        "search_term": name_fragment,
                        "error": e.to_string(),
                        "body_preview": body_preview(&body),
                    }),
                );
                return Vec::new();
            }
        };

        let sites = extract_search_sites(&response);
        if sites.is_empty() {
            self.log.append(
                LogLevel::Warning,
                "No USGS sites found",
                json!({
                    "search_term": name_fragment,
                    "sites_count": response.value.sites.len(),
                }),
            );
        } else {
            self.log.append(
                LogLevel::Info,
                "USGS sites found",
                json!({ "search_term": name_fragment, "sites_found": sites.len() }),
            );
        }
        sites
    }

    // -- current data --------------------------------------------------------

    /// Latest discharge and gage height for a site, both parameters in one
    /// request, cached for 15 minutes. A missing series leaves its field
    /// null; only a failed exchange sets the error flag.
    pub fn get_current_data(&mut self, site_number: &str) -> CurrentReading {
        let now = Utc::now();
        if site_number.trim().is_empty() {
            self.log.append(
                LogLevel::Warning,
                "Rejected empty site number",
                json!({ "method": "get_current_data" }),
            );
            return CurrentReading::failed(site_number, now, "site number must not be empty".to_string());
        }

        let key = current_key(site_number);
        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value::<CurrentReading>(cached) {
                Ok(reading) => {
                    self.log.append(
                        LogLevel::Debug,
                        "Using cached current data",
                        json!({ "site_number": site_number, "cache_key": key }),
                    );
                    return reading;
                }
                Err(e) => {
                    self.cache.delete(&key);
                    self.log.append(
                        LogLevel::Error,
                        "Discarded undecodable cache entry",
                        json!({ "cache_key": key, "error": e.to_string() }),
                    );
                }
            }
        }

        let url = build_current_url(site_number);
        let body = match self.fetch(&url) {
            Ok(body) => body,
            Err(e) => {
                self.log.append(
                    LogLevel::Error,
                    "API error getting current data",
                    json!({ "site_number": site_number, "error": e.to_string() }),
                );
                return CurrentReading::failed(site_number, now, e.to_string());
            }
        };

        let response = match parse_iv_response(&body) {
            Ok(response) => response,
            Err(e) => {
                self.cache.delete(&key);
                self.log.append(
                    LogLevel::Error,
                    "Malformed current data response",
                    json!({
                        "site_number": site_number,
                        "error": e.to_string(),
                        "body_preview": body_preview(&body),
                    }),
                );
                return CurrentReading::failed(site_number, now, e.to_string());
            }
        };

        self.log.append(
            LogLevel::Debug,
            "API response",
            json!({
                "site_number": site_number,
                "time_series_count": response.value.time_series.len(),
            }),
        );

        let reading = extract_current(site_number, &response, now);
        if let Ok(value) = serde_json::to_value(&reading) {
            self.cache.set(&key, value, CURRENT_TTL_SECS);
        }
        reading
    }

    // -- historical data -----------------------------------------------------

    /// High/low extrema over a lookback window ending now.
    ///
    /// `period` is the caller token ("24h", "7d", "30d", "1y"); any other
    /// token is rejected synchronously with no network call and no cache
    /// mutation. The cache TTL scales with the window length.
    pub fn get_historical_data(&mut self, site_number: &str, period: &str) -> HistoricalExtrema {
        let now = Utc::now();

        let Some(parsed_period) = Period::parse(period) else {
            self.log.append(
                LogLevel::Warning,
                "Rejected invalid time period",
                json!({ "site_number": site_number, "period": period }),
            );
            return HistoricalExtrema::failed(
                site_number,
                None,
                now,
                "Invalid time period specified.".to_string(),
            );
        };

        if site_number.trim().is_empty() {
            self.log.append(
                LogLevel::Warning,
                "Rejected empty site number",
                json!({ "method": "get_historical_data" }),
            );
            return HistoricalExtrema::failed(
                site_number,
                Some(parsed_period),
                now,
                "site number must not be empty".to_string(),
            );
        }

        let key = historical_key(site_number, parsed_period);
        if let Some(cached) = self.cache.get(&key) {
            match serde_json::from_value::<HistoricalExtrema>(cached) {
                Ok(result) => {
                    self.log.append(
                        LogLevel::Debug,
                        "Using cached historical data",
                        json!({ "site_number": site_number, "cache_key": key }),
                    );
                    return result;
                }
                Err(e) => {
                    self.cache.delete(&key);
                    self.log.append(
                        LogLevel::Error,
                        "Discarded undecodable cache entry",
                        json!({ "cache_key": key, "error": e.to_string() }),
                    );
                }
            }
        }

        let (start_date, end_date) = historical_window(parsed_period, now);
        let url = build_historical_url(site_number, &start_date, &end_date);
        let body = match self.fetch(&url) {
            Ok(body) => body,
            Err(e) => {
                self.log.append(
                    LogLevel::Error,
                    "API error getting historical data",
                    json!({
                        "site_number": site_number,
                        "period": parsed_period.as_str(),
                        "error": e.to_string(),
                    }),
                );
                return HistoricalExtrema::failed(site_number, Some(parsed_period), now, e.to_string());
            }
        };

        let response = match parse_iv_response(&body) {
            Ok(response) => response,
            Err(e) => {
                self.cache.delete(&key);
                self.log.append(
                    LogLevel::Error,
                    "Malformed historical data response",
                    json!({
                        "site_number": site_number,
                        "period": parsed_period.as_str(),
                        "error": e.to_string(),
                        "body_preview": body_preview(&body),
                    }),
                );
                return HistoricalExtrema::failed(site_number, Some(parsed_period), now, e.to_string());
            }
        };

        self.log.append(
            LogLevel::Debug,
            "API response",
            json!({
                "site_number": site_number,
                "period": parsed_period.as_str(),
                "time_series_count": response.value.time_series.len(),
            }),
        );

        let mut result = HistoricalExtrema::empty(site_number, parsed_period, now);
        for series in &response.value.time_series {
            let extrema = series_extrema(series.samples(), &series.variable.unit.unit_code);
            match series.parameter_code() {
                Some(PARAM_DISCHARGE) => result.discharge = extrema,
                Some(PARAM_GAGE_HEIGHT) => result.gage_height = extrema,
                _ => {}
            }
        }

        if let Ok(value) = serde_json::to_value(&result) {
            self.cache.set(&key, value, parsed_period.cache_ttl_secs());
        }
        result
    }

    // -- plumbing ------------------------------------------------------------

    fn fetch(&mut self, url: &str) -> Result<String, UsgsError> {
        self.log
            .append(LogLevel::Debug, "API request", json!({ "url": url }));
        self.transport.get(url)
    }
}

/// First 500 characters of a response body, for diagnostic log payloads.
fn body_preview(body: &str) -> String {
    body.chars().take(500).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
