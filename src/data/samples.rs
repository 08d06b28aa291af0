//! Per-series sample storage: retention-bounded buffers with running statistics.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Number of recent values retained for percentile extraction.
const PERCENTILE_HISTORY_CAP: usize = 2048;

/// Name-based reference to a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesRef(pub String);

impl SeriesRef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for SeriesRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single timestamped scalar sample. Timestamps are seconds; tags are
/// immutable and shared, usually empty.
#[derive(Debug, Clone, Default)]
pub struct Sample {
    pub timestamp: f64,
    pub value: f64,
    pub tags: Arc<HashMap<String, String>>,
}

impl Sample {
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self {
            timestamp,
            value,
            tags: Arc::new(HashMap::new()),
        }
    }

    pub fn with_tags(timestamp: f64, value: f64, tags: HashMap<String, String>) -> Self {
        Self {
            timestamp,
            value,
            tags: Arc::new(tags),
        }
    }

    /// Finite value and timestamp; detectors skip anything else.
    pub fn is_usable(&self) -> bool {
        self.value.is_finite() && self.timestamp.is_finite()
    }
}

/// Running aggregates over the retained samples of one buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferStats {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: usize,
}

impl BufferStats {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    fn accumulate(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            if value < self.min {
                self.min = value;
            }
            if value > self.max {
                self.max = value;
            }
        }
        self.sum += value;
        self.count += 1;
    }
}

/// Ordered, retention-bounded store for one series.
///
/// Samples are appended at the tail only and trimmed from the head only, so
/// the deque stays in append order. Aggregates are updated incrementally on
/// append and rebuilt by rescan after a trim.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    stats: BufferStats,
    recent_values: VecDeque<f64>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample at the tail. Non-finite values are dropped silently.
    pub fn append(&mut self, sample: Sample) {
        if !sample.value.is_finite() {
            return;
        }
        self.stats.accumulate(sample.value);
        self.recent_values.push_back(sample.value);
        while self.recent_values.len() > PERCENTILE_HISTORY_CAP {
            self.recent_values.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Remove all leading samples older than `cutoff`. Aggregates are
    /// recomputed only when something was actually removed.
    pub fn trim_before(&mut self, cutoff: f64) {
        let mut removed = 0usize;
        while let Some(front) = self.samples.front() {
            if front.timestamp >= cutoff {
                break;
            }
            self.samples.pop_front();
            removed += 1;
        }
        if removed > 0 {
            log::trace!(
                "trimmed {} samples before t={:.3}, {} retained",
                removed,
                cutoff,
                self.samples.len()
            );
            self.rebuild_aggregates();
        }
    }

    fn rebuild_aggregates(&mut self) {
        let mut stats = BufferStats::default();
        for s in self.samples.iter() {
            stats.accumulate(s.value);
        }
        self.stats = stats;
        self.recent_values.clear();
        let skip = self.samples.len().saturating_sub(PERCENTILE_HISTORY_CAP);
        for s in self.samples.iter().skip(skip) {
            self.recent_values.push_back(s.value);
        }
    }

    /// The retained samples, oldest first. No copy; read-only between renders.
    pub fn snapshot(&self) -> &VecDeque<Sample> {
        &self.samples
    }

    pub fn stats(&self) -> &BufferStats {
        &self.stats
    }

    /// Percentile over the capped recent-value history, `p` in [0,100].
    /// Sorts a scratch copy on demand.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        if self.recent_values.is_empty() {
            return None;
        }
        let mut scratch: Vec<f64> = self.recent_values.iter().copied().collect();
        scratch.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let frac = (p / 100.0).clamp(0.0, 1.0);
        let idx = ((scratch.len() - 1) as f64 * frac).round() as usize;
        Some(scratch[idx])
    }

    pub fn percentile_95(&self) -> Option<f64> {
        self.percentile(95.0)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest_timestamp(&self) -> Option<f64> {
        self.samples.back().map(|s| s.timestamp)
    }

    pub fn oldest_timestamp(&self) -> Option<f64> {
        self.samples.front().map(|s| s.timestamp)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.stats = BufferStats::default();
        self.recent_values.clear();
    }
}

/// All series known to the engine, keyed by name, with stable insertion order.
#[derive(Debug, Default)]
pub struct SeriesCollection {
    series: HashMap<SeriesRef, SampleBuffer>,
    series_order: Vec<SeriesRef>,
}

impl SeriesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the buffer for `name`, creating it when the series is first observed.
    pub fn buffer_or_new(&mut self, name: &SeriesRef) -> &mut SampleBuffer {
        if !self.series.contains_key(name) {
            self.series_order.push(name.clone());
        }
        self.series.entry(name.clone()).or_default()
    }

    pub fn get(&self, name: &SeriesRef) -> Option<&SampleBuffer> {
        self.series.get(name)
    }

    /// Append one sample to the named series.
    pub fn append(&mut self, name: &SeriesRef, sample: Sample) {
        self.buffer_or_new(name).append(sample);
    }

    /// Trim every buffer to the retention cutoff.
    pub fn trim_all(&mut self, cutoff: f64) {
        for buffer in self.series.values_mut() {
            buffer.trim_before(cutoff);
        }
    }

    /// Oldest and newest retained timestamp across all series, if any series
    /// holds data. Used to clamp manual panning.
    pub fn extents(&self) -> Option<(f64, f64)> {
        let mut oldest = f64::MAX;
        let mut newest = f64::MIN;
        for buffer in self.series.values() {
            if let Some(t) = buffer.oldest_timestamp() {
                if t < oldest {
                    oldest = t;
                }
            }
            if let Some(t) = buffer.latest_timestamp() {
                if t > newest {
                    newest = t;
                }
            }
        }
        if oldest <= newest {
            Some((oldest, newest))
        } else {
            None
        }
    }

    /// Newest timestamp across all series.
    pub fn latest_timestamp(&self) -> Option<f64> {
        self.extents().map(|(_, newest)| newest)
    }

    pub fn series_order(&self) -> &[SeriesRef] {
        &self.series_order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesRef, &SampleBuffer)> {
        self.series.iter()
    }

    pub fn clear_all(&mut self) {
        for buffer in self.series.values_mut() {
            buffer.clear();
        }
    }
}
