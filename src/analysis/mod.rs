/// Time-series reduction for the stream gage service.
///
/// Submodules:
/// - `extrema` — reduces an ordered sample series to high/low extrema with
///   their timestamps.

pub mod extrema;
