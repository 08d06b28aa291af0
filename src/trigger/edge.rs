//! Crossing-based detectors: edge, window (band entry/exit) and video line sync.

use crate::data::samples::Sample;
use crate::data::trigger_config::{TriggerConfig, TriggerSlope};

use super::{interpolate_crossing, polarity_ok, resolve_level};

/// True when the pair `prev -> cur` crosses `level` upward.
fn rising_crossing(prev: f64, cur: f64, level: f64) -> bool {
    prev < level && cur >= level
}

/// True when the pair `prev -> cur` crosses `level` downward.
fn falling_crossing(prev: f64, cur: f64, level: f64) -> bool {
    prev > level && cur <= level
}

fn slope_matches(slope: TriggerSlope, rising: bool) -> bool {
    match slope {
        TriggerSlope::Rising => rising,
        TriggerSlope::Falling => !rising,
        TriggerSlope::Either => true,
    }
}

/// Most recent level crossing matching the configured slope and polarity.
pub(super) fn detect_edge(points: &[Sample], config: &TriggerConfig) -> Option<f64> {
    let level = resolve_level(points, config);
    for i in (1..points.len()).rev() {
        let prev = &points[i - 1];
        let cur = &points[i];
        let rising = rising_crossing(prev.value, cur.value, level);
        let falling = falling_crossing(prev.value, cur.value, level);
        if !rising && !falling {
            continue;
        }
        if !slope_matches(config.slope, rising) {
            continue;
        }
        if !polarity_ok(cur.value, level, config) {
            continue;
        }
        return Some(interpolate_crossing(prev, cur, level));
    }
    None
}

/// Every qualifying edge crossing in the window, oldest first. Shared with the
/// video detector, which looks at crossing spacing rather than single events.
pub(super) fn collect_edge_crossings(points: &[Sample], config: &TriggerConfig) -> Vec<f64> {
    let level = resolve_level(points, config);
    let mut crossings = Vec::new();
    for i in 1..points.len() {
        let prev = &points[i - 1];
        let cur = &points[i];
        let rising = rising_crossing(prev.value, cur.value, level);
        let falling = falling_crossing(prev.value, cur.value, level);
        if !rising && !falling {
            continue;
        }
        if !slope_matches(config.slope, rising) {
            continue;
        }
        if !polarity_ok(cur.value, level, config) {
            continue;
        }
        crossings.push(interpolate_crossing(prev, cur, level));
    }
    crossings
}

/// Most recent entry into (or exit out of) the `[low, high]` band.
///
/// The slope setting is repurposed as a direction filter: Rising restricts to
/// entries, Falling to exits, Either accepts both. The returned instant is
/// interpolated at whichever band boundary the pair crossed.
pub(super) fn detect_window(points: &[Sample], config: &TriggerConfig) -> Option<f64> {
    let low = config.window_low.min(config.window_high);
    let high = config.window_low.max(config.window_high);
    let inside = |v: f64| v >= low && v <= high;
    for i in (1..points.len()).rev() {
        let prev = &points[i - 1];
        let cur = &points[i];
        let was_inside = inside(prev.value);
        let is_inside = inside(cur.value);
        if was_inside == is_inside {
            continue;
        }
        let entering = is_inside;
        match config.slope {
            TriggerSlope::Rising if !entering => continue,
            TriggerSlope::Falling if entering => continue,
            _ => {}
        }
        // The boundary between the two values is the one that was crossed.
        let boundary = if prev.value < low || cur.value < low {
            low
        } else {
            high
        };
        return Some(interpolate_crossing(prev, cur, boundary));
    }
    None
}

/// Most recent pair of edge crossings spaced one video line apart.
///
/// Reuses the edge crossing logic to collect candidates, then looks for a
/// spacing of `1/line_frequency` within the configured tolerance (5% floor).
pub(super) fn detect_video(points: &[Sample], config: &TriggerConfig) -> Option<f64> {
    if config.line_frequency_hz <= 0.0 {
        return None;
    }
    let expected = 1.0 / config.line_frequency_hz;
    let tolerance = expected * config.video_tolerance_pct.max(5.0) / 100.0;
    let crossings = collect_edge_crossings(points, config);
    for i in (1..crossings.len()).rev() {
        let spacing = crossings[i] - crossings[i - 1];
        if (spacing - expected).abs() <= tolerance {
            return Some(crossings[i]);
        }
    }
    None
}
