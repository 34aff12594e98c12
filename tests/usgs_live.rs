//! Live USGS API verification tests
//!
//! These tests hit the real waterservices.usgs.gov endpoints with well-known
//! Illinois River sites to confirm the URL shapes and parsers still match
//! what the API serves. They document upstream behavior rather than ours.
//!
//! Run with: cargo test --test usgs_live -- --ignored --test-threads=1
//!
//! Note: These tests make real API calls and may be slow or fail if:
//! - The USGS API is down or rate-limiting
//! - Network connectivity issues
//! - The reference sites are decommissioned

use gagedata_service::client::UsgsClient;
use gagedata_service::model::ValidationOutcome;

// Illinois River at Kingston Mines, IL. Long-running gage with both
// discharge and gage height.
const KINGSTON_MINES: &str = "05568500";

#[test]
#[ignore] // Only run manually - makes real API calls
fn test_validate_known_site_against_live_api() {
    let mut client = UsgsClient::new().expect("Failed to build HTTP client");

    match client.validate_site(KINGSTON_MINES) {
        ValidationOutcome::Valid(site) => {
            println!(
                "✓ {} validated: {} ({}, {})",
                site.site_number, site.site_name, site.latitude, site.longitude
            );
            assert_eq!(site.site_number, KINGSTON_MINES);
            assert!(!site.site_name.is_empty(), "live site carries a name");
            assert!(site.is_validated);
        }
        ValidationOutcome::Invalid => {
            panic!("Kingston Mines reported invalid - has the gage been decommissioned?")
        }
        ValidationOutcome::Error(e) => panic!("API error: {}", e),
    }
}

#[test]
#[ignore] // Only run manually - makes real API calls
fn test_validate_nonexistent_site_against_live_api() {
    let mut client = UsgsClient::new().expect("Failed to build HTTP client");

    match client.validate_site("99999999") {
        ValidationOutcome::Invalid => println!("✓ Nonexistent site correctly reported invalid"),
        ValidationOutcome::Valid(site) => {
            panic!("99999999 unexpectedly resolved to {}", site.site_name)
        }
        // The API returns 400 for some unknown site numbers rather than an
        // empty series. Either way the caller never sees Valid.
        ValidationOutcome::Error(e) => println!("✓ API rejected unknown site: {}", e),
    }
}

#[test]
#[ignore] // Only run manually - makes real API calls
fn test_current_data_from_live_api() {
    let mut client = UsgsClient::new().expect("Failed to build HTTP client");

    let reading = client.get_current_data(KINGSTON_MINES);
    assert!(
        !reading.error,
        "current data fetch failed: {:?}",
        reading.error_message
    );

    println!(
        "✓ Current conditions at {}: discharge {:?} {:?}, gage height {:?} {:?}",
        KINGSTON_MINES,
        reading.discharge,
        reading.discharge_unit,
        reading.gage_height,
        reading.gage_height_unit
    );

    // Kingston Mines reports both parameters; if one goes dark this still
    // documents it without failing.
    assert!(
        reading.discharge.is_some() || reading.gage_height.is_some(),
        "live gage should report at least one parameter"
    );
}

#[test]
#[ignore] // Only run manually - makes real API calls
fn test_current_data_second_fetch_is_cached() {
    let mut client = UsgsClient::new().expect("Failed to build HTTP client");

    let first = client.get_current_data(KINGSTON_MINES);
    let second = client.get_current_data(KINGSTON_MINES);
    assert_eq!(first, second, "back-to-back fetches must hit the cache");

    let cache_hits: Vec<_> = client
        .log()
        .query_all(None, None)
        .into_iter()
        .filter(|e| e.message == "Using cached current data")
        .collect();
    assert_eq!(cache_hits.len(), 1, "second fetch should be a cache hit");
    println!("✓ Second fetch served from cache");
}

#[test]
#[ignore] // Only run manually - makes real API calls
fn test_historical_extrema_from_live_api() {
    let mut client = UsgsClient::new().expect("Failed to build HTTP client");

    let result = client.get_historical_data(KINGSTON_MINES, "24h");
    assert!(
        !result.error,
        "historical fetch failed: {:?}",
        result.error_message
    );

    println!(
        "✓ 24h extrema at {}: discharge {:?}..{:?}, gage height {:?}..{:?}",
        KINGSTON_MINES,
        result.discharge.low,
        result.discharge.high,
        result.gage_height.low,
        result.gage_height.high
    );

    if let (Some(low), Some(high)) = (result.discharge.low, result.discharge.high) {
        assert!(low <= high, "low must not exceed high");
        assert!(
            result.discharge.high_at.is_some() && result.discharge.low_at.is_some(),
            "extrema carry their timestamps"
        );
    }
}

#[test]
#[ignore] // Only run manually - makes real API calls
fn test_site_search_against_live_api() {
    let mut client = UsgsClient::new().expect("Failed to build HTTP client");

    let sites = client.search_sites_by_name("Illinois River");
    println!("✓ Search for 'Illinois River' returned {} sites", sites.len());
    for site in sites.iter().take(5) {
        println!("  - {} {}", site.site_number, site.site_name);
    }

    assert!(
        !sites.is_empty(),
        "searching a major river name should match active stream gages"
    );
    assert!(
        sites.iter().all(|s| !s.site_number.is_empty()),
        "every match carries a site number"
    );
}
