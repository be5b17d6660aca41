//! CPU timing of render passes.
//!
//! Timings are kept per label as a running average over the last
//! [`WINDOW`] samples. A disabled profiler records nothing.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

/// Samples kept per label.
pub const WINDOW: usize = 60;

#[derive(Debug, Default)]
struct Timing {
    started: Option<Instant>,
    samples: VecDeque<f64>,
}

impl Timing {
    fn push(&mut self, ms: f64) {
        if self.samples.len() == WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(ms);
    }

    fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }
}

/// Wall-clock profiler keyed by pass label.
#[derive(Debug, Default)]
pub struct CpuProfiler {
    enabled: bool,
    timings: HashMap<&'static str, Timing>,
}

impl CpuProfiler {
    /// Create a profiler; a disabled one is a no-op.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: HashMap::new(),
        }
    }

    /// Whether samples are recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start timing `label`.
    pub fn begin(&mut self, label: &'static str) {
        if !self.enabled {
            return;
        }
        self.timings.entry(label).or_default().started = Some(Instant::now());
    }

    /// Stop timing `label`. Unmatched calls are ignored.
    pub fn end(&mut self, label: &'static str) {
        if !self.enabled {
            return;
        }
        let Some(timing) = self.timings.get_mut(label) else {
            return;
        };
        if let Some(started) = timing.started.take() {
            let ms = started.elapsed().as_secs_f64() * 1000.0;
            tracing::trace!("{} took {:.3} ms", label, ms);
            timing.push(ms);
        }
    }

    /// Time `f` under `label`.
    pub fn scope<R>(&mut self, label: &'static str, f: impl FnOnce() -> R) -> R {
        self.begin(label);
        let result = f();
        self.end(label);
        result
    }

    /// Average duration of `label` in milliseconds, if sampled.
    pub fn average_ms(&self, label: &str) -> Option<f64> {
        self.timings.get(label).and_then(Timing::average)
    }

    /// Labels with at least one sample, sorted.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<_> = self
            .timings
            .iter()
            .filter(|(_, t)| !t.samples.is_empty())
            .map(|(label, _)| *label)
            .collect();
        labels.sort_unstable();
        labels
    }

    /// Drop every sample.
    pub fn reset(&mut self) {
        self.timings.clear();
    }
}
