//! Counters for one playback run.

/// Counters collected while replaying a session.
///
/// Reset by [`PlaybackController::start`](crate::PlaybackController::start).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackMetrics {
    /// User actions replayed and verified.
    pub actions_executed: u64,
    /// `process_intervals` pseudo-actions replayed.
    pub intervals_replayed: u64,
    /// Background ticks applied across all intervals.
    pub ticks_replayed: u64,
    /// Await polls made.
    pub polls: u64,
    /// Await steps that gave up after their timeout or poll budget.
    pub wait_timeouts: u64,
    /// Successful verifier checks, intervals and final state included.
    pub verifications_passed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = PlaybackMetrics::default();
        assert_eq!(m.actions_executed, 0);
        assert_eq!(m.intervals_replayed, 0);
        assert_eq!(m.ticks_replayed, 0);
        assert_eq!(m.polls, 0);
        assert_eq!(m.wait_timeouts, 0);
        assert_eq!(m.verifications_passed, 0);
    }
}
