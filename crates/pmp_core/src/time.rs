//! Deterministic level timer.
//!
//! The run clock counts fixed simulation steps rather than reading wall time,
//! so a replayed input sequence always produces the same elapsed time and the
//! same personal-best comparison.

pub const DEFAULT_FIXED_DT: f64 = 1.0 / 60.0;

#[derive(Debug, Clone)]
pub struct LevelTimer {
    pub fixed_dt: f64,
    pub fixed_step_count: u64,
    pub total_steps: u64,
    pub restarts: u32,
}

impl LevelTimer {
    pub fn new() -> Self {
        Self::with_fixed_dt(DEFAULT_FIXED_DT)
    }

    pub fn with_fixed_dt(fixed_dt: f64) -> Self {
        let fixed_dt = if fixed_dt > 0.0 {
            fixed_dt
        } else {
            log::warn!("Rejected non-positive timer step {fixed_dt}, using 1/60s");
            DEFAULT_FIXED_DT
        };
        Self {
            fixed_dt,
            fixed_step_count: 0,
            total_steps: 0,
            restarts: 0,
        }
    }

    /// Advance the run clock by one simulation step.
    pub fn tick(&mut self) {
        self.fixed_step_count += 1;
        self.total_steps += 1;
    }

    /// Restart the run clock (player respawn). Lifetime step count is kept.
    pub fn restart(&mut self) {
        self.fixed_step_count = 0;
        self.restarts += 1;
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.fixed_step_count as f64 * self.fixed_dt
    }

    /// Elapsed time rounded to hundredths, the precision personal bests are kept at.
    pub fn elapsed_centiseconds_rounded(&self) -> f64 {
        (self.elapsed_seconds() * 100.0).round() / 100.0
    }
}

impl Default for LevelTimer {
    fn default() -> Self {
        Self::new()
    }
}
