/// USGS Water Services API client plumbing.
///
/// Builds query URLs and parses JSON responses for the two endpoints this
/// service consumes:
/// - Instantaneous Values service (site validation, current readings,
///   historical series): https://waterservices.usgs.gov/nwis/iv/
/// - Site service (name search): https://waterservices.usgs.gov/nwis/site/
///
/// Response structures are typed and fail closed: a 2xx body missing a
/// required field deserializes to an error rather than silently
/// null-propagating. Fields the API genuinely omits per record (search
/// geolocation) are `Option`al.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::{
    CurrentReading, Period, Site, SiteSummary, UsgsError, PARAM_DISCHARGE, PARAM_GAGE_HEIGHT,
};

/// Base URL for the USGS Instantaneous Values service.
pub const IV_SERVICE_URL: &str = "https://waterservices.usgs.gov/nwis/iv/";

/// Base URL for the USGS Site service.
pub const SITE_SERVICE_URL: &str = "https://waterservices.usgs.gov/nwis/site/";

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Percent-encodes a query value. Unreserved characters (RFC 3986) pass
/// through; everything else, including spaces, is %XX-escaped.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// URL for validating a site: a metadata query against the IV service
/// restricted to active sites. A valid site answers with at least one
/// `timeSeries` entry.
pub fn build_validation_url(site_number: &str) -> String {
    format!(
        "{}?format=json&sites={}&siteStatus=active",
        IV_SERVICE_URL,
        urlencode(site_number)
    )
}

/// URL for the latest discharge and gage height readings, fetched in one
/// request.
pub fn build_current_url(site_number: &str) -> String {
    format!(
        "{}?format=json&sites={}&parameterCd={},{}&siteStatus=active",
        IV_SERVICE_URL,
        urlencode(site_number),
        PARAM_DISCHARGE,
        PARAM_GAGE_HEIGHT
    )
}

/// URL for a historical series between two dates (inclusive, day
/// granularity).
pub fn build_historical_url(site_number: &str, start_date: &str, end_date: &str) -> String {
    format!(
        "{}?format=json&sites={}&startDT={}&endDT={}&parameterCd={},{}&siteStatus=active",
        IV_SERVICE_URL,
        urlencode(site_number),
        start_date,
        end_date,
        PARAM_DISCHARGE,
        PARAM_GAGE_HEIGHT
    )
}

/// URL for a site-name search against the Site service, filtered to active
/// stream sites exposing daily values.
pub fn build_search_url(name_fragment: &str) -> String {
    format!(
        "{}?format=json&siteNameLike={}&siteStatus=active&siteType=ST&hasDataTypeCd=dv",
        SITE_SERVICE_URL,
        urlencode(name_fragment)
    )
}

/// Computes the historical query window for a period ending at `now`:
/// start = now minus the period length, both truncated to `YYYY-MM-DD`
/// day granularity for the API.
pub fn historical_window(period: Period, now: DateTime<Utc>) -> (String, String) {
    let start = now - period.duration();
    (
        start.format("%Y-%m-%d").to_string(),
        now.format("%Y-%m-%d").to_string(),
    )
}

// ---------------------------------------------------------------------------
// IV service response structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct IvResponse {
    pub value: IvValue,
}

#[derive(Debug, Deserialize)]
pub struct IvValue {
    /// Empty (or absent) when the requested site is unknown or inactive.
    #[serde(rename = "timeSeries", default)]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Debug, Deserialize)]
pub struct TimeSeries {
    #[serde(rename = "sourceInfo")]
    pub source_info: SourceInfo,
    pub variable: Variable,
    #[serde(default)]
    pub values: Vec<ValueBlock>,
}

#[derive(Debug, Deserialize)]
pub struct SourceInfo {
    #[serde(rename = "siteName")]
    pub site_name: String,
    #[serde(rename = "geoLocation")]
    pub geo_location: GeoLocation,
}

#[derive(Debug, Deserialize)]
pub struct GeoLocation {
    #[serde(rename = "geogLocation")]
    pub geog_location: GeogLocation,
}

#[derive(Debug, Deserialize)]
pub struct GeogLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct Variable {
    #[serde(rename = "variableCode")]
    pub variable_code: Vec<VariableCode>,
    pub unit: Unit,
}

#[derive(Debug, Deserialize)]
pub struct VariableCode {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct Unit {
    #[serde(rename = "unitCode")]
    pub unit_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ValueBlock {
    #[serde(default)]
    pub value: Vec<Sample>,
}

/// One `(value, dateTime)` sample. Values arrive as strings; empty strings
/// are sensor gaps and must not be coerced to zero.
#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    pub value: String,
    #[serde(rename = "dateTime")]
    pub date_time: String,
}

impl TimeSeries {
    /// The parameter code of this series ("00060", "00065", ...), if the
    /// response carried one.
    pub fn parameter_code(&self) -> Option<&str> {
        self.variable.variable_code.first().map(|c| c.value.as_str())
    }

    /// Samples of the first value block. The IV service returns one block
    /// per series for these queries.
    pub fn samples(&self) -> &[Sample] {
        self.values.first().map(|block| block.value.as_slice()).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Site service response structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SiteSearchResponse {
    pub value: SiteSearchValue,
}

#[derive(Debug, Deserialize)]
pub struct SiteSearchValue {
    #[serde(default)]
    pub sites: Vec<SiteRecord>,
}

/// One search match. Site code and name are required for a record to be
/// usable; geolocation is optional per record.
#[derive(Debug, Deserialize)]
pub struct SiteRecord {
    #[serde(rename = "siteCode", default)]
    pub site_code: Vec<SiteCode>,
    #[serde(rename = "siteName", default)]
    pub site_name: Option<String>,
    #[serde(rename = "geoLocation", default)]
    pub geo_location: Option<SearchGeoLocation>,
}

#[derive(Debug, Deserialize)]
pub struct SiteCode {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchGeoLocation {
    #[serde(rename = "geogLocation", default)]
    pub geog_location: Option<SearchGeogLocation>,
}

#[derive(Debug, Deserialize)]
pub struct SearchGeogLocation {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

// ---------------------------------------------------------------------------
// Parsing and extraction
// ---------------------------------------------------------------------------

/// Deserializes an IV service body, failing closed on missing required
/// fields.
pub fn parse_iv_response(body: &str) -> Result<IvResponse, UsgsError> {
    serde_json::from_str(body).map_err(|e| UsgsError::Malformed(e.to_string()))
}

/// Deserializes a Site service search body.
pub fn parse_site_search_response(body: &str) -> Result<SiteSearchResponse, UsgsError> {
    serde_json::from_str(body).map_err(|e| UsgsError::Malformed(e.to_string()))
}

/// Extracts confirmed site metadata from the first `timeSeries` entry.
/// Returns `None` when the response carries no series — the upstream
/// definition of "no such active site".
pub fn extract_site(site_number: &str, response: &IvResponse) -> Option<Site> {
    response.value.time_series.first().map(|series| Site {
        id: String::new(),
        site_number: site_number.to_string(),
        site_name: series.source_info.site_name.clone(),
        latitude: series.source_info.geo_location.geog_location.latitude,
        longitude: series.source_info.geo_location.geog_location.longitude,
        is_validated: true,
    })
}

/// Builds a current reading from an IV response. A series missing for a
/// parameter, or carrying an empty/non-numeric latest value, leaves that
/// field `None`.
pub fn extract_current(
    site_number: &str,
    response: &IvResponse,
    retrieved_at: DateTime<Utc>,
) -> CurrentReading {
    let mut reading = CurrentReading::empty(site_number, retrieved_at);

    for series in &response.value.time_series {
        let latest = series.samples().first().and_then(|s| parse_sample_value(&s.value));
        match series.parameter_code() {
            Some(PARAM_DISCHARGE) => {
                reading.discharge = latest;
                reading.discharge_unit = Some(series.variable.unit.unit_code.clone());
            }
            Some(PARAM_GAGE_HEIGHT) => {
                reading.gage_height = latest;
                reading.gage_height_unit = Some(series.variable.unit.unit_code.clone());
            }
            _ => {}
        }
    }

    reading
}

/// Flattens search records into summaries. Records missing a site code or
/// name are skipped; missing coordinates become `None` rather than
/// discarding the record.
pub fn extract_search_sites(response: &SiteSearchResponse) -> Vec<SiteSummary> {
    response
        .value
        .sites
        .iter()
        .filter_map(|record| {
            let site_number = record.site_code.first()?.value.clone();
            let site_name = record.site_name.clone()?;
            let geog = record
                .geo_location
                .as_ref()
                .and_then(|g| g.geog_location.as_ref());
            Some(SiteSummary {
                site_number,
                site_name,
                latitude: geog.and_then(|g| g.latitude),
                longitude: geog.and_then(|g| g.longitude),
            })
        })
        .collect()
}

/// Parses a sample value string to a float. Empty strings are sensor gaps
/// and yield `None`, never zero.
pub fn parse_sample_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
