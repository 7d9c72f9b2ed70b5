use log::{log_enabled, Level};
use std::time::{Duration, Instant};

/// Timing and counters gathered during the most recent `World::step`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepProfile {
    pub broad_phase_time: Duration,
    pub narrow_phase_time: Duration,
    pub solver_time: Duration,
    pub integrator_time: Duration,
    pub total_frame_time: Duration,

    pub body_count: usize,
    pub contact_count: usize,
    pub manifold_point_count: usize,
    pub active_island_count: usize,
    pub solver_row_count: usize,
    /// Rows dropped this step because their effective mass was singular.
    pub skipped_row_count: usize,
}

impl StepProfile {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn report(&self) {
        let total_us = self.total_frame_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        let share = |d: Duration| (d.as_micros() as f32 / total_us) * 100.0;
        log::info!(
            "step: {:.2} ms | bodies {} contacts {} points {} islands {} rows {} skipped {}",
            self.total_frame_time.as_secs_f32() * 1000.0,
            self.body_count,
            self.contact_count,
            self.manifold_point_count,
            self.active_island_count,
            self.solver_row_count,
            self.skipped_row_count
        );
        log::info!(
            "  broad {:.1}% narrow {:.1}% solver {:.1}% integrate {:.1}%",
            share(self.broad_phase_time),
            share(self.narrow_phase_time),
            share(self.solver_time),
            share(self.integrator_time)
        );
    }
}

/// Adds the elapsed time of a scope into a profile field and traces its boundaries.
pub struct ScopedTimer<'a> {
    label: &'static str,
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'static str, output: &'a mut Duration) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        *self.output += elapsed;
        if log_enabled!(Level::Trace) {
            log::trace!("end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_timer_accumulates_into_its_field() {
        let mut profile = StepProfile::default();
        for _ in 0..2 {
            let _timer = ScopedTimer::new("solver", &mut profile.solver_time);
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(profile.solver_time >= Duration::from_millis(2));
        assert_eq!(profile.broad_phase_time, Duration::ZERO);
    }

    #[test]
    fn reset_clears_timings_and_counters() {
        let mut profile = StepProfile {
            total_frame_time: Duration::from_millis(3),
            solver_time: Duration::from_millis(2),
            body_count: 12,
            skipped_row_count: 1,
            ..StepProfile::default()
        };
        profile.report();
        profile.reset();
        assert_eq!(profile.total_frame_time, Duration::ZERO);
        assert_eq!(profile.body_count, 0);
        assert_eq!(profile.skipped_row_count, 0);
        // An empty profile has nothing to report.
        profile.report();
    }
}
