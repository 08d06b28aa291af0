//! livescope crate root: re-exports and module wiring.
//!
//! This crate implements the trigger and viewport engine of a live-data
//! oscilloscope view: it decides which time window to display and where, if
//! anywhere, a significant event occurred. It consumes already-decoded
//! timestamped samples and produces a resolved `[start, end)` window plus an
//! optional trigger anchor for an external renderer to draw from.
//!
//! Modules:
//! - `data::samples`: per-series retention-bounded buffers with running stats
//! - `data::trigger_config`: the flat, mutable trigger parameter record
//! - `trigger`: the nine stateless trigger-detection algorithms
//! - `viewport`: the follow-live / trigger-anchored / manual window resolver
//! - `persistence`: JSON/YAML save and load of configuration state

pub mod data;
pub mod persistence;
pub mod trigger;
pub mod viewport;

// Public re-exports for a compact external API
pub use data::samples::{BufferStats, Sample, SampleBuffer, SeriesCollection, SeriesRef};
pub use data::trigger_config::{
    TriggerConfig, TriggerMode, TriggerPolarity, TriggerSlope, TriggerType,
};
pub use persistence::{load_state_from_path, save_state_to_path, ScopeStateSerde};
pub use viewport::{ManualViewport, ResolvedWindow, ViewportResolver};
