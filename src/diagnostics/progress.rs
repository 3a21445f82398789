//! Run log
//!
//! Lines are emitted through `tracing` and kept in order so the caller gets
//! the whole log back with the result.

use std::time::{Duration, Instant};

use tracing::info;

use crate::genome::candidate::Candidate;

/// One progress line: generation, fittest fitness, elite average, then the
/// fittest candidate's series and progression
pub fn format_snapshot(
    generation: usize,
    best_fitness: f64,
    elite_mean: f64,
    series: &str,
    progression: &str,
) -> String {
    format!(
        "{:6}:{:6.3} /{:6.3} {} P{}",
        generation, best_fitness, elite_mean, series, progression
    )
}

/// Ordered, time- and generation-gated run log
#[derive(Clone, Debug)]
pub struct ProgressLog {
    interval: Duration,
    every: usize,
    last: Instant,
    lines: Vec<String>,
}

impl ProgressLog {
    /// Snapshots are taken at most once per `interval`, and only on
    /// generations divisible by `every`
    pub fn new(interval: Duration, every: usize) -> Self {
        assert!(every >= 1, "Snapshot period must be at least 1 generation");
        Self {
            interval,
            every,
            last: Instant::now(),
            lines: Vec::new(),
        }
    }

    /// Emit and keep a line
    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!("{}", line);
        self.lines.push(line);
    }

    /// Whether a snapshot is due for `generation` at `now`
    pub fn is_due(&self, generation: usize, now: Instant) -> bool {
        generation % self.every == 0 && now.saturating_duration_since(self.last) >= self.interval
    }

    /// Record a snapshot of the fittest candidate if one is due
    ///
    /// Returns true if a line was written.
    pub fn snapshot(
        &mut self,
        generation: usize,
        best: &Candidate,
        best_fitness: f64,
        elite_mean: f64,
    ) -> bool {
        self.snapshot_at(generation, best, best_fitness, elite_mean, Instant::now())
    }

    /// Like [`snapshot`](Self::snapshot) with an explicit clock reading
    pub fn snapshot_at(
        &mut self,
        generation: usize,
        best: &Candidate,
        best_fitness: f64,
        elite_mean: f64,
        now: Instant,
    ) -> bool {
        if !self.is_due(generation, now) {
            return false;
        }
        self.last = now;
        self.log(format_snapshot(
            generation,
            best_fitness,
            elite_mean,
            best.series(),
            best.progression(),
        ));
        true
    }

    /// Lines written so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Take the lines out of the log
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Default for ProgressLog {
    fn default() -> Self {
        Self::new(Duration::from_secs(3), 10)
    }
}
