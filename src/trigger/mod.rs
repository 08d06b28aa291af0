//! Trigger detection: stateless scans over a window of samples.
//!
//! Each detector reports the timestamp of the most recent qualifying event in
//! the window, or `None`. Crossing-based detectors interpolate the crossing
//! instant between the two straddling samples, which is what gives trigger
//! lock its sub-sample precision. Malformed configuration (zero baud rate,
//! empty pattern, inverted low/high bands) degrades to "no detection" rather
//! than erroring.

mod edge;
mod pattern;
mod pulse;

use crate::data::samples::{Sample, SeriesCollection};
use crate::data::trigger_config::{TriggerConfig, TriggerPolarity, TriggerType};

/// Scan `points` for the most recent event matching the armed trigger.
///
/// `all_series` is only consulted by the logic trigger's cross-channel
/// conditions. Returns the event timestamp in seconds.
pub fn detect(
    points: &[Sample],
    config: &TriggerConfig,
    all_series: &SeriesCollection,
) -> Option<f64> {
    let usable: Vec<Sample> = points.iter().filter(|s| s.is_usable()).cloned().collect();
    if usable.len() < 2 {
        return None;
    }
    match config.trigger_type {
        TriggerType::Edge => edge::detect_edge(&usable, config),
        TriggerType::Window => edge::detect_window(&usable, config),
        TriggerType::Video => edge::detect_video(&usable, config),
        TriggerType::Pulse => pulse::detect_pulse(&usable, config),
        TriggerType::Runt => pulse::detect_runt(&usable, config),
        TriggerType::Serial => pulse::detect_serial(&usable, config),
        TriggerType::Pattern => pattern::detect_pattern(&usable, config),
        TriggerType::Logic => pattern::detect_logic(&usable, config, all_series),
        TriggerType::Visual => pattern::detect_visual(&usable, config),
    }
}

/// The effective trigger level for this window: the min/max midpoint when
/// auto-level is on, else the configured level. A flat window falls back to
/// the configured level so auto-level never produces a degenerate threshold.
pub(crate) fn resolve_level(points: &[Sample], config: &TriggerConfig) -> f64 {
    if !config.auto_level {
        return config.level;
    }
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for s in points {
        if s.value < min {
            min = s.value;
        }
        if s.value > max {
            max = s.value;
        }
    }
    if max > min {
        (min + max) / 2.0
    } else {
        config.level
    }
}

/// Linear interpolation of the instant where the segment `a -> b` crosses
/// `level`. Equal values mean zero slope; return `b.timestamp` instead of
/// dividing by zero. The fraction is clamped to [0,1] so the result always
/// lies between the two samples.
pub(crate) fn interpolate_crossing(a: &Sample, b: &Sample, level: f64) -> f64 {
    let dv = b.value - a.value;
    if dv == 0.0 {
        return b.timestamp;
    }
    let frac = ((level - a.value) / dv).clamp(0.0, 1.0);
    a.timestamp + (b.timestamp - a.timestamp) * frac
}

/// Polarity gate on the post-crossing value, widened by the hysteresis band.
pub(crate) fn polarity_ok(current: f64, level: f64, config: &TriggerConfig) -> bool {
    let h = config.hysteresis.max(0.0);
    match config.polarity {
        TriggerPolarity::Positive => current - level >= -h,
        TriggerPolarity::Negative => current - level <= h,
        TriggerPolarity::Either => true,
    }
}

/// Split a literal-value list on commas, spaces or semicolons.
/// Any unparsable token invalidates the whole sequence.
pub(crate) fn parse_value_sequence(text: &str) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for token in text.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => values.push(v),
            _ => return None,
        }
    }
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
