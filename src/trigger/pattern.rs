//! Shape-matching detectors: literal value patterns, logic state patterns and
//! normalized visual templates.

use crate::data::samples::{Sample, SeriesCollection, SeriesRef};
use crate::data::trigger_config::TriggerConfig;

use super::{parse_value_sequence, resolve_level};

/// Most recent occurrence of the literal value sequence, within tolerance.
///
/// Per-element tolerance is `max(|expected| * tol, tol)`, i.e. relative or
/// absolute, whichever is larger. Anchored at the last sample of the match.
pub(super) fn detect_pattern(points: &[Sample], config: &TriggerConfig) -> Option<f64> {
    let sequence = parse_value_sequence(&config.pattern_sequence)?;
    if sequence.len() > points.len() {
        return None;
    }
    let tol = config.pattern_tolerance.max(0.0);
    for end in (sequence.len() - 1..points.len()).rev() {
        let start = end + 1 - sequence.len();
        let matches = sequence.iter().enumerate().all(|(k, expected)| {
            let allowed = (expected.abs() * tol).max(tol);
            (points[start + k].value - expected).abs() <= allowed
        });
        if matches {
            return Some(points[end].timestamp);
        }
    }
    None
}

/// One parsed cross-channel condition: the named series must read high or low
/// at the candidate instant.
struct ChannelCondition {
    series: SeriesRef,
    want_high: bool,
}

struct LogicPattern {
    /// `H`/`L`/`X` per state slot.
    states: Vec<char>,
    conditions: Vec<ChannelCondition>,
}

/// Parse the logic pattern language: an `H`/`L`/`X` state string, optionally
/// followed by `;name=H` / `;name=L` cross-channel conditions.
fn parse_logic_pattern(text: &str) -> Option<LogicPattern> {
    let mut parts = text.split(';');
    let state_part = parts.next()?.trim();
    if state_part.is_empty() {
        return None;
    }
    let mut states = Vec::with_capacity(state_part.len());
    for c in state_part.chars() {
        if c.is_whitespace() {
            continue;
        }
        match c.to_ascii_uppercase() {
            s @ ('H' | 'L' | 'X') => states.push(s),
            _ => return None,
        }
    }
    if states.is_empty() {
        return None;
    }
    let mut conditions = Vec::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (name, state) = part.split_once('=')?;
        let name = name.trim();
        let want_high = match state.trim().to_ascii_uppercase().as_str() {
            "H" => true,
            "L" => false,
            _ => return None,
        };
        if name.is_empty() {
            return None;
        }
        conditions.push(ChannelCondition {
            series: SeriesRef::new(name),
            want_high,
        });
    }
    Some(LogicPattern { states, conditions })
}

/// Check one cross-channel condition against the named series' most recent
/// sample at or before the candidate instant, classified against that series'
/// own level (min/max midpoint under auto-level, else the configured level).
fn condition_holds(
    cond: &ChannelCondition,
    at: f64,
    config: &TriggerConfig,
    all_series: &SeriesCollection,
) -> bool {
    let buffer = match all_series.get(&cond.series) {
        Some(b) => b,
        None => return false,
    };
    let sample = buffer
        .snapshot()
        .iter()
        .rev()
        .find(|s| s.is_usable() && s.timestamp <= at)
        .or_else(|| buffer.snapshot().iter().find(|s| s.is_usable()));
    let sample = match sample {
        Some(s) => s,
        None => return false,
    };
    let stats = buffer.stats();
    let level = if config.auto_level && stats.max > stats.min {
        (stats.min + stats.max) / 2.0
    } else {
        config.level
    };
    (sample.value >= level) == cond.want_high
}

/// Most recent run of H/L states matching the logic pattern, with any
/// cross-channel conditions validated at the candidate instant.
///
/// The search is bounded to the last `logic_sample_length` samples (0 means
/// the whole window). Anchored at the final sample of the matched run.
pub(super) fn detect_logic(
    points: &[Sample],
    config: &TriggerConfig,
    all_series: &SeriesCollection,
) -> Option<f64> {
    let pattern = parse_logic_pattern(&config.logic_pattern)?;
    let level = resolve_level(points, config);
    let lookback_start = if config.logic_sample_length == 0 {
        0
    } else {
        points.len().saturating_sub(config.logic_sample_length)
    };
    let window = &points[lookback_start..];
    if pattern.states.len() > window.len() {
        return None;
    }
    let states: Vec<char> = window
        .iter()
        .map(|s| if s.value >= level { 'H' } else { 'L' })
        .collect();
    for end in (pattern.states.len() - 1..states.len()).rev() {
        let start = end + 1 - pattern.states.len();
        let matches = pattern
            .states
            .iter()
            .enumerate()
            .all(|(k, want)| *want == 'X' || states[start + k] == *want);
        if !matches {
            continue;
        }
        let candidate = window[end].timestamp;
        if pattern
            .conditions
            .iter()
            .all(|c| condition_holds(c, candidate, config, all_series))
        {
            return Some(candidate);
        }
    }
    None
}

/// Most recent window whose normalized shape matches the visual template.
///
/// Each candidate window of template length is normalized to [0,1] by its own
/// min/max (a flat window normalizes to all 0.5); the template itself is
/// clamped to [0,1] at parse time. Fires when the mean absolute error does
/// not exceed the tolerance. Anchored at the window's last sample.
pub(super) fn detect_visual(points: &[Sample], config: &TriggerConfig) -> Option<f64> {
    let template: Vec<f64> = parse_value_sequence(&config.visual_template)?
        .into_iter()
        .map(|v| v.clamp(0.0, 1.0))
        .collect();
    if template.len() < 2 || template.len() > points.len() {
        return None;
    }
    let tolerance = config.visual_tolerance.max(0.0);
    for end in (template.len() - 1..points.len()).rev() {
        let start = end + 1 - template.len();
        let window = &points[start..=end];
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for s in window {
            if s.value < min {
                min = s.value;
            }
            if s.value > max {
                max = s.value;
            }
        }
        let span = max - min;
        let mut error_sum = 0.0;
        for (k, s) in window.iter().enumerate() {
            let normalized = if span > 0.0 {
                (s.value - min) / span
            } else {
                0.5
            };
            error_sum += (normalized - template[k]).abs();
        }
        if error_sum / template.len() as f64 <= tolerance {
            return Some(window[template.len() - 1].timestamp);
        }
    }
    None
}
