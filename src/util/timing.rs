use std::fmt;

use serde::Serialize;
use web_time::{Duration, Instant};

/// Wall-clock durations of the stages of one structure load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageTimings {
    stages: Vec<(&'static str, Duration)>,
}

impl StageTimings {
    /// Run `f`, recording its duration under `stage`.
    pub fn time<T>(&mut self, stage: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(stage, start.elapsed());
        out
    }

    /// Record an externally measured stage.
    pub fn record(&mut self, stage: &'static str, elapsed: Duration) {
        self.stages.push((stage, elapsed));
    }

    /// Duration of `stage`, if recorded.
    #[must_use]
    pub fn get(&self, stage: &str) -> Option<Duration> {
        self.stages
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, d)| *d)
    }

    /// Sum of all recorded stages.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|(_, d)| *d).sum()
    }
}

impl fmt::Display for StageTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, d)) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} {:.1}ms", d.as_secs_f64() * 1000.0)?;
        }
        Ok(())
    }
}
