/// Historical extrema computation.
///
/// Reduces a raw ordered series of `(value-as-string, dateTime)` samples to
/// the maximum and minimum numeric values with the timestamps at which they
/// occurred. Empty-string samples are sensor gaps and are excluded from the
/// computation, not coerced to zero.
///
/// Tie-break: when multiple samples share an extreme value, the timestamp
/// of the first matching sample in series order is reported. Downstream
/// display assumes a single deterministic timestamp per extremum, so the
/// strict comparisons below must not become `>=`/`<=`.

use crate::ingest::usgs::{parse_sample_value, Sample};
use crate::model::ParameterExtrema;

/// Computes high/low extrema over an ordered sample series.
///
/// Returns an all-`None` result (including the unit) when no numeric
/// samples remain after filtering — absence of data, not an error.
pub fn series_extrema(samples: &[Sample], unit: &str) -> ParameterExtrema {
    let mut high: Option<(f64, &str)> = None;
    let mut low: Option<(f64, &str)> = None;

    for sample in samples {
        let Some(value) = parse_sample_value(&sample.value) else {
            continue;
        };
        match high {
            Some((current, _)) if value <= current => {}
            _ => high = Some((value, sample.date_time.as_str())),
        }
        match low {
            Some((current, _)) if value >= current => {}
            _ => low = Some((value, sample.date_time.as_str())),
        }
    }

    match (high, low) {
        (Some((high_value, high_at)), Some((low_value, low_at))) => ParameterExtrema {
            high: Some(high_value),
            high_at: Some(high_at.to_string()),
            low: Some(low_value),
            low_at: Some(low_at.to_string()),
            unit: Some(unit.to_string()),
        },
        _ => ParameterExtrema::default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
