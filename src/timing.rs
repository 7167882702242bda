//! Scoped wall-clock timers for pipeline phases.
//!
//! Purely observational: a [`PhaseTimer`] logs its elapsed time at `debug`
//! level when dropped and has no other effect.

use std::time::{Duration, Instant};

/// Times one phase from construction until drop.
#[derive(Debug)]
pub struct PhaseTimer {
    phase: &'static str,
    start: Instant,
}

impl PhaseTimer {
    pub fn start(phase: &'static str) -> Self {
        Self {
            phase,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        log::debug!("{}: {:.3?}", self.phase, self.elapsed());
    }
}
