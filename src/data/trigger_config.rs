//! Trigger configuration: one flat, mutable record read by the resolver each tick.
//!
//! Fields specific to a trigger type are inert while another type is armed.
//! There is no observer wiring; callers mutate fields directly and call
//! [`TriggerConfig::touch`], and the resolver compares [`TriggerConfig::version`]
//! against the version it last evaluated to decide whether to rearm.

use serde::{Deserialize, Serialize};

use crate::data::samples::SeriesRef;

/// Acquisition mode: Auto free-runs when no trigger is found, Normal keeps the
/// last triggered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerMode {
    Auto,
    Normal,
}

/// Which detection algorithm is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerType {
    Edge,
    Pulse,
    Video,
    Logic,
    Runt,
    Window,
    Pattern,
    Serial,
    Visual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerSlope {
    Rising,
    Falling,
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerPolarity {
    Positive,
    Negative,
    Either,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub enabled: bool,
    pub mode: TriggerMode,
    pub trigger_type: TriggerType,
    pub slope: TriggerSlope,
    pub polarity: TriggerPolarity,
    /// Fixed trigger level, ignored when `auto_level` is set.
    pub level: f64,
    /// Derive the level from the window's min/max midpoint.
    pub auto_level: bool,
    pub hysteresis: f64,
    /// Where the anchor sits in the visible window, 0 = left edge, 1 = right.
    pub horizontal_position: f64,
    /// Minimum spacing between accepted triggers (debounce). 0 disables.
    pub holdoff_s: f64,
    /// Keep showing the triggered frame instead of re-acquiring.
    pub freeze_on_trigger: bool,
    pub target: Option<SeriesRef>,

    // Pulse
    pub min_pulse_width_s: f64,
    /// Unbounded when <= 0.
    pub max_pulse_width_s: f64,

    // Runt
    pub runt_low: f64,
    pub runt_high: f64,

    // Window
    pub window_low: f64,
    pub window_high: f64,

    // Logic: `H`/`L`/`X` state pattern, optionally followed by
    // `;name=H` cross-channel conditions.
    pub logic_pattern: String,
    /// Lookback bound in samples for the logic state search. 0 = whole window.
    pub logic_sample_length: usize,

    // Pattern: literal values separated by commas, spaces or semicolons.
    pub pattern_sequence: String,
    /// Per-element tolerance, relative or absolute, whichever is larger.
    pub pattern_tolerance: f64,

    // Serial
    pub baud_rate: f64,
    pub bit_count: u32,
    pub serial_threshold: f64,

    // Video
    pub line_frequency_hz: f64,
    /// Spacing tolerance in percent; a 5% floor is applied.
    pub video_tolerance_pct: f64,

    // Visual: template values separated like a pattern sequence, clamped to [0,1].
    pub visual_template: String,
    pub visual_tolerance: f64,

    #[serde(skip)]
    version: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: TriggerMode::Auto,
            trigger_type: TriggerType::Edge,
            slope: TriggerSlope::Rising,
            polarity: TriggerPolarity::Either,
            level: 0.0,
            auto_level: true,
            hysteresis: 0.0,
            horizontal_position: 0.5,
            holdoff_s: 0.0,
            freeze_on_trigger: false,
            target: None,
            min_pulse_width_s: 0.0,
            max_pulse_width_s: 0.0,
            runt_low: 0.0,
            runt_high: 1.0,
            window_low: 0.0,
            window_high: 1.0,
            logic_pattern: String::new(),
            logic_sample_length: 64,
            pattern_sequence: String::new(),
            pattern_tolerance: 0.05,
            baud_rate: 9600.0,
            bit_count: 8,
            serial_threshold: 0.5,
            line_frequency_hz: 15_625.0,
            video_tolerance_pct: 5.0,
            visual_template: String::new(),
            visual_tolerance: 0.1,
            version: 0,
        }
    }
}

impl TriggerConfig {
    /// Mark the configuration as edited so the resolver rearms on its next tick.
    pub fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Short, user-facing description of the armed trigger.
    /// Example: "cpu.load: edge rising @ 1.2300, pos 0.50, freeze"
    pub fn describe(&self) -> String {
        let target = self
            .target
            .as_ref()
            .map(|t| t.0.as_str())
            .unwrap_or("<no target>");
        let kind = match self.trigger_type {
            TriggerType::Edge => "edge",
            TriggerType::Pulse => "pulse",
            TriggerType::Video => "video",
            TriggerType::Logic => "logic",
            TriggerType::Runt => "runt",
            TriggerType::Window => "window",
            TriggerType::Pattern => "pattern",
            TriggerType::Serial => "serial",
            TriggerType::Visual => "visual",
        };
        let slope = match self.slope {
            TriggerSlope::Rising => "rising",
            TriggerSlope::Falling => "falling",
            TriggerSlope::Either => "either",
        };
        let mut s = format!("{}: {} {}", target, kind, slope);
        if self.auto_level {
            s.push_str(" @ auto");
        } else {
            s.push_str(&format!(" @ {:.4}", self.level));
        }
        s.push_str(&format!(", pos {:.2}", self.horizontal_position));
        if self.holdoff_s > 0.0 {
            s.push_str(&format!(", holdoff {:.3}s", self.holdoff_s));
        }
        if self.freeze_on_trigger {
            s.push_str(", freeze");
        }
        s
    }
}
