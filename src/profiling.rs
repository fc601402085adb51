//! Step Profiler
//!
//! Wall-clock timings of each pipeline stage of the last `step` call, in
//! seconds. Under `no_std` the timers are inert and every field stays
//! zero; the struct shape is identical so callers need no feature gates.

/// Per-stage timings of the most recent step, in seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Profiler {
    /// Whole step, including every substep.
    pub step: f64,
    /// Force and gravity integration.
    pub integrate_accelerations: f64,
    /// Broad-phase pair generation.
    pub broadphase: f64,
    /// Narrow-phase manifold computation and persistence matching.
    pub narrowphase: f64,
    /// Constraint and contact presolve plus warm-starting.
    pub presolve: f64,
    /// Velocity iteration loop.
    pub solve_velocities: f64,
    /// Velocity integration and kill-bounds checks.
    pub integrate_velocities: f64,
    /// NGS position correction, when enabled.
    pub solve_positions: f64,
}

impl Profiler {
    /// Zero all timings.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stage stopwatch. Wraps `std::time::Instant` under `std`; a no-op
/// otherwise.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Stopwatch {
    #[cfg(feature = "std")]
    start: std::time::Instant,
}

impl Stopwatch {
    #[inline]
    pub(crate) fn start() -> Self {
        Self {
            #[cfg(feature = "std")]
            start: std::time::Instant::now(),
        }
    }

    /// Seconds since `start`. Always zero without `std`.
    #[inline]
    pub(crate) fn elapsed(&self) -> f64 {
        #[cfg(feature = "std")]
        {
            self.start.elapsed().as_secs_f64()
        }
        #[cfg(not(feature = "std"))]
        {
            0.0
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
