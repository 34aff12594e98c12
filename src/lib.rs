/// USGS stream gage data service.
///
/// Retrieves, caches, and classifies time-series measurements (discharge,
/// gage height) from the USGS water services API for a small set of
/// user-configured monitoring sites.
///
/// Module map:
/// - `model` — shared domain types; no logic, no I/O.
/// - `ingest` — transport seam and USGS wire format (URLs, parsing).
/// - `analysis` — time-series reduction (historical extrema).
/// - `cache` — TTL key-value store used by the client.
/// - `logging` — diagnostic ring buffer of recent upstream interactions.
/// - `client` — the caching USGS client tying the above together.
/// - `sites` — user-configured site list, persisted as TOML.
/// - `format` — timestamp display helpers for consumers.

pub mod analysis;
pub mod cache;
pub mod client;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod sites;
