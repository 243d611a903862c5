#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

use rustc_hash::FxHashMap;

/// Rolling window of one pass's GPU times.
#[derive(Debug, Clone, Default)]
struct TimingWindow {
    samples: Vec<Duration>,
    /// Next slot to overwrite once the window is full.
    cursor: usize,
    total: Duration,
    frames: u64,
}

impl TimingWindow {
    fn push(&mut self, sample: Duration, capacity: usize) {
        if self.samples.len() < capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.cursor] = sample;
        }
        self.cursor = (self.cursor + 1) % capacity;
        self.total += sample;
        self.frames += 1;
    }

    fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }
}

/// Per-pass timing, averaged over the last `window` frames.
#[derive(Debug, Clone)]
pub struct PassTimings {
    window: usize,
    passes: FxHashMap<String, TimingWindow>,
}

impl Default for PassTimings {
    fn default() -> Self {
        Self::new(60)
    }
}

impl PassTimings {
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            passes: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Changes the window size, discarding collected samples.
    pub fn set_window(&mut self, window: usize) {
        self.window = window.max(1);
        self.passes.clear();
    }

    /// Records the time `item` took this frame.
    pub fn record(&mut self, item: &str, sample: Duration) {
        let window = self.window;
        self.passes
            .entry(item.to_owned())
            .or_default()
            .push(sample, window);
    }

    /// Runs `f`, recording its wall-clock duration under `item`.
    pub fn measure<R>(&mut self, item: &str, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        self.record(item, start.elapsed());
        result
    }

    /// Average over the current window.
    #[must_use]
    pub fn average(&self, item: &str) -> Option<Duration> {
        self.passes.get(item).map(TimingWindow::average)
    }

    /// Sum of every recorded sample.
    #[must_use]
    pub fn total(&self, item: &str) -> Option<Duration> {
        self.passes.get(item).map(|w| w.total)
    }

    /// Number of recorded frames.
    #[must_use]
    pub fn frames(&self, item: &str) -> u64 {
        self.passes.get(item).map_or(0, |w| w.frames)
    }

    /// Sum of every pass's average, i.e. the expected frame cost.
    #[must_use]
    pub fn frame_average(&self) -> Duration {
        self.passes.values().map(TimingWindow::average).sum()
    }

    pub fn remove(&mut self, item: &str) {
        self.passes.remove(item);
    }

    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(window) = self.passes.remove(from) {
            self.passes.insert(to.to_owned(), window);
        }
    }

    pub fn reset(&mut self) {
        self.passes.clear();
    }
}
