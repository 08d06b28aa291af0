//! Viewport resolution: reconciles follow-live framing, trigger-anchored
//! framing and user pan/zoom into the authoritative display window.

use crate::data::samples::{Sample, SeriesCollection};
use crate::data::trigger_config::{TriggerConfig, TriggerMode};
use crate::trigger;

/// Hard bounds on the manual zoom duration, seconds.
const MIN_MANUAL_DURATION_S: f64 = 0.25;
const MAX_MANUAL_DURATION_S: f64 = 600.0;

/// The window the display should draw, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWindow {
    /// Inclusive window start, seconds.
    pub start: f64,
    /// Exclusive window end, seconds.
    pub end: f64,
    /// Trigger marker instant, when one is placed.
    pub anchor: Option<f64>,
    pub triggered: bool,
}

impl ResolvedWindow {
    fn follow_live(latest: f64, visible_s: f64) -> Self {
        Self {
            start: latest - visible_s,
            end: latest,
            anchor: None,
            triggered: false,
        }
    }

    /// Place `anchor` at the `position` fraction of the visible duration.
    fn anchored(anchor: f64, visible_s: f64, position: f64) -> Self {
        let start = anchor - visible_s * position.clamp(0.0, 1.0);
        Self {
            start,
            end: start + visible_s,
            anchor: Some(anchor),
            triggered: true,
        }
    }
}

/// User pan/zoom override. While active, auto-follow and trigger framing are
/// suspended until the user resets it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualViewport {
    pub active: bool,
    pub start: f64,
    pub end: f64,
}

/// Trigger hold state, consolidated in one place.
#[derive(Debug, Clone, Copy, Default)]
struct ResolverState {
    last_anchor: Option<f64>,
    /// Freeze-on-trigger latched a frame; keep showing it.
    held: bool,
    last_config_version: u64,
}

/// Turns the latest samples, the trigger configuration and the manual
/// viewport into the `[start, end)` window the renderer draws.
#[derive(Debug, Default)]
pub struct ViewportResolver {
    manual: ManualViewport,
    state: ResolverState,
}

impl ViewportResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the display window for this tick.
    ///
    /// Pure over the retained samples plus the resolver's own hold and manual
    /// state; never blocks, never fails. With no data at all the window ends
    /// at t=0 so the display always has something well-defined to draw.
    pub fn resolve_window(
        &mut self,
        series: &SeriesCollection,
        config: &TriggerConfig,
        visible_s: f64,
    ) -> ResolvedWindow {
        if self.manual.active {
            return ResolvedWindow {
                start: self.manual.start,
                end: self.manual.end,
                anchor: None,
                triggered: false,
            };
        }

        if config.version() != self.state.last_config_version {
            if self.state.held || self.state.last_anchor.is_some() {
                log::debug!("trigger config changed, rearming");
            }
            self.state = ResolverState {
                last_config_version: config.version(),
                ..ResolverState::default()
            };
        }

        let latest = series.latest_timestamp().unwrap_or(0.0);

        if !config.enabled {
            self.state.last_anchor = None;
            self.state.held = false;
            return ResolvedWindow::follow_live(latest, visible_s);
        }

        // Freeze still requested and a frame is latched: keep showing it.
        if self.state.held && config.freeze_on_trigger {
            if let Some(anchor) = self.state.last_anchor {
                return ResolvedWindow::anchored(anchor, visible_s, config.horizontal_position);
            }
        }
        self.state.held = false;

        let target_latest = config
            .target
            .as_ref()
            .and_then(|t| series.get(t))
            .and_then(|b| b.latest_timestamp());

        let detected = self.run_detection(series, config, visible_s);
        match detected {
            Some(candidate) => {
                let anchor = self.apply_holdoff(candidate, config);
                self.state.last_anchor = Some(anchor);
                self.state.held = config.freeze_on_trigger;
                ResolvedWindow::anchored(anchor, visible_s, config.horizontal_position)
            }
            None => match config.mode {
                TriggerMode::Auto => {
                    // Free-run framing: anchor at the newest target sample even
                    // though nothing qualified. Not recorded for hold-off.
                    match target_latest {
                        Some(anchor) => {
                            ResolvedWindow::anchored(anchor, visible_s, config.horizontal_position)
                        }
                        None => ResolvedWindow::follow_live(latest, visible_s),
                    }
                }
                TriggerMode::Normal => match self.state.last_anchor {
                    // No new trigger: keep the last frame.
                    Some(anchor) => {
                        ResolvedWindow::anchored(anchor, visible_s, config.horizontal_position)
                    }
                    None => ResolvedWindow::follow_live(latest, visible_s),
                },
            },
        }
    }

    /// Scan the target series' recent window for a trigger event.
    ///
    /// The lookback is `max(2 * visible, visible + 5s)` ending at the target's
    /// newest sample, widened to the whole buffer when fewer than two points
    /// fall inside it.
    fn run_detection(
        &self,
        series: &SeriesCollection,
        config: &TriggerConfig,
        visible_s: f64,
    ) -> Option<f64> {
        let target = config.target.as_ref()?;
        let buffer = series.get(target)?;
        let latest = buffer.latest_timestamp()?;
        let lookback = (2.0 * visible_s).max(visible_s + 5.0);
        let from = latest - lookback;
        let mut points: Vec<Sample> = buffer
            .snapshot()
            .iter()
            .filter(|s| s.timestamp >= from)
            .cloned()
            .collect();
        if points.len() < 2 {
            points = buffer.snapshot().iter().cloned().collect();
        }
        trigger::detect(&points, config, series)
    }

    /// Hold-off debounce: a candidate within `holdoff_s` of the previous
    /// anchor re-uses that anchor instead of re-triggering.
    fn apply_holdoff(&self, candidate: f64, config: &TriggerConfig) -> f64 {
        if let Some(prev) = self.state.last_anchor {
            if config.holdoff_s > 0.0 && (candidate - prev).abs() < config.holdoff_s {
                log::debug!(
                    "holdoff: candidate t={:.4} within {:.4}s of anchor t={:.4}, keeping anchor",
                    candidate,
                    config.holdoff_s,
                    prev
                );
                return prev;
            }
        }
        if Some(candidate) != self.state.last_anchor {
            log::debug!("trigger anchor t={:.4}", candidate);
        }
        candidate
    }

    // ---------- trigger hold introspection ----------

    pub fn last_anchor(&self) -> Option<f64> {
        self.state.last_anchor
    }

    pub fn is_held(&self) -> bool {
        self.state.held
    }

    /// Drop the freeze hold and resume acquisition on the next tick.
    pub fn release(&mut self) {
        self.state.held = false;
    }

    // ---------- manual viewport ----------

    pub fn manual_viewport(&self) -> &ManualViewport {
        &self.manual
    }

    /// Guard margin samples may be panned beyond the retained extents:
    /// 10% of the window duration, at least 0.25s.
    fn guard_margin(duration: f64) -> f64 {
        (duration * 0.1).max(0.25)
    }

    /// Clamp a requested window so it never sits more than the guard margin
    /// beyond the oldest/newest retained sample. The duration is preserved.
    fn clamp_window(start: f64, end: f64, extents: Option<(f64, f64)>) -> (f64, f64) {
        let (oldest, newest) = match extents {
            Some(e) => e,
            None => return (start, end),
        };
        let duration = end - start;
        let guard = Self::guard_margin(duration);
        let mut start = start;
        let mut end = end;
        if end > newest + guard {
            end = newest + guard;
            start = end - duration;
        }
        if start < oldest - guard {
            start = oldest - guard;
            end = start + duration;
        }
        (start, end)
    }

    /// Enter manual mode with an explicit window (e.g. a drag-select).
    pub fn set_manual_window(&mut self, start: f64, end: f64, extents: Option<(f64, f64)>) {
        if !(end > start) {
            return;
        }
        let (start, end) = Self::clamp_window(start, end, extents);
        self.manual = ManualViewport {
            active: true,
            start,
            end,
        };
    }

    /// Pan the current window by `delta_s`, entering manual mode. While still
    /// following live, the pan starts from the given current window.
    pub fn pan(&mut self, delta_s: f64, current: &ResolvedWindow, extents: Option<(f64, f64)>) {
        let (start, end) = if self.manual.active {
            (self.manual.start + delta_s, self.manual.end + delta_s)
        } else {
            (current.start + delta_s, current.end + delta_s)
        };
        let (start, end) = Self::clamp_window(start, end, extents);
        self.manual = ManualViewport {
            active: true,
            start,
            end,
        };
    }

    /// Zoom about `center_t` by `factor` (>1 zooms out), entering manual mode.
    /// The resulting duration is clamped to [0.25s, 600s].
    pub fn zoom(
        &mut self,
        factor: f64,
        center_t: f64,
        current: &ResolvedWindow,
        extents: Option<(f64, f64)>,
    ) {
        if !(factor > 0.0) {
            return;
        }
        let (start, end) = if self.manual.active {
            (self.manual.start, self.manual.end)
        } else {
            (current.start, current.end)
        };
        let duration =
            ((end - start) * factor).clamp(MIN_MANUAL_DURATION_S, MAX_MANUAL_DURATION_S);
        let span = end - start;
        let frac = if span > 0.0 {
            ((center_t - start) / span).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let new_start = center_t - duration * frac;
        let (start, end) = Self::clamp_window(new_start, new_start + duration, extents);
        self.manual = ManualViewport {
            active: true,
            start,
            end,
        };
    }

    /// Leave manual mode and resume auto-follow (Home/double-click).
    pub fn reset_manual(&mut self) {
        self.manual = ManualViewport::default();
    }
}
