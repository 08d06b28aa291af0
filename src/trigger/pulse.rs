//! Width- and timing-based detectors: pulse width, runt pulses and serial frames.

use crate::data::samples::Sample;
use crate::data::trigger_config::TriggerConfig;

use super::{interpolate_crossing, resolve_level};

/// Last pulse whose width falls inside the configured bounds.
///
/// A pulse opens on a rising crossing of the level and closes on the matching
/// falling crossing; both instants are interpolated so the width is measured
/// sub-sample. `max_pulse_width_s <= 0` means unbounded above. Returns the
/// accepted pulse's end time.
pub(super) fn detect_pulse(points: &[Sample], config: &TriggerConfig) -> Option<f64> {
    let level = resolve_level(points, config);
    let min_w = config.min_pulse_width_s.max(0.0);
    let max_w = config.max_pulse_width_s;
    let mut pulse_start: Option<f64> = None;
    let mut accepted: Option<f64> = None;
    for i in 1..points.len() {
        let prev = &points[i - 1];
        let cur = &points[i];
        if prev.value < level && cur.value >= level {
            pulse_start = Some(interpolate_crossing(prev, cur, level));
        } else if prev.value > level && cur.value <= level {
            if let Some(start) = pulse_start.take() {
                let end = interpolate_crossing(prev, cur, level);
                let width = end - start;
                if width >= min_w && (max_w <= 0.0 || width <= max_w) {
                    accepted = Some(end);
                }
            }
        }
    }
    accepted
}

/// Last runt pulse: a rise above `low` that falls back below `low` without
/// ever reaching `high`. Anchored at the interpolated fall-below-`low` instant.
pub(super) fn detect_runt(points: &[Sample], config: &TriggerConfig) -> Option<f64> {
    let low = config.runt_low.min(config.runt_high);
    let high = config.runt_low.max(config.runt_high);
    if high <= low {
        return None;
    }
    let mut rose_above_low = false;
    let mut crossed_high = false;
    let mut found: Option<f64> = None;
    for i in 1..points.len() {
        let prev = &points[i - 1];
        let cur = &points[i];
        if prev.value < low && cur.value >= low {
            rose_above_low = true;
            crossed_high = false;
        }
        if rose_above_low && cur.value >= high {
            crossed_high = true;
        }
        if rose_above_low && prev.value >= low && cur.value < low {
            if !crossed_high {
                found = Some(interpolate_crossing(prev, cur, low));
            }
            rose_above_low = false;
            crossed_high = false;
        }
    }
    found
}

/// Serial frame detector: a start bit (high-to-low crossing of the serial
/// threshold) followed by at least one full frame time of line activity.
///
/// Frame time is `(bit_count + 1) / baud_rate` (start bit plus data bits).
/// A start bit closed by a later start bit at least a frame apart fires at the
/// closing crossing; a start bit still open at the end of the window fires at
/// `start + frame` once the window tail has elapsed that far. The most recent
/// firing wins. Degenerate baud rate or bit count yields no detection.
pub(super) fn detect_serial(points: &[Sample], config: &TriggerConfig) -> Option<f64> {
    if config.baud_rate <= 0.0 || config.bit_count == 0 {
        return None;
    }
    let frame_s = (config.bit_count as f64 + 1.0) / config.baud_rate;
    let threshold = config.serial_threshold;
    let mut start_bit: Option<f64> = None;
    let mut found: Option<f64> = None;
    for i in 1..points.len() {
        let prev = &points[i - 1];
        let cur = &points[i];
        if prev.value > threshold && cur.value <= threshold {
            let t = interpolate_crossing(prev, cur, threshold);
            if let Some(start) = start_bit {
                if t - start >= frame_s {
                    found = Some(t);
                }
            }
            start_bit = Some(t);
        }
    }
    // Frame still in progress at the window tail.
    if let (Some(start), Some(last)) = (start_bit, points.last()) {
        if last.timestamp - start >= frame_s {
            found = Some(start + frame_s);
        }
    }
    found
}
