//! Playback configuration, validation, and error types.

use reprise_replay::VerifyConfig;

// ── PlaybackConfig ─────────────────────────────────────────────────

/// Configuration for a [`PlaybackController`](crate::PlaybackController).
///
/// All durations are in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackConfig {
    /// Pause between user actions. Default: 0.5.
    pub action_delay: f64,
    /// Pause after a replayed background interval. Default: 0.0.
    pub interval_delay: f64,
    /// Pause after opening a menu before choosing from it. Default: 0.2.
    pub menu_settle_delay: f64,
    /// Longest a single await step may wait before giving up. Default: 10.0.
    pub wait_timeout: f64,
    /// Most polls a single await step may make. Default: 600.
    pub max_polls: u32,
    /// Restore the recorded orchestrator state before replaying an
    /// interval. Default: true.
    pub restore_orchestrator_before_intervals: bool,
    /// Compare the live state with the session's final state once every
    /// action has replayed. Default: true.
    pub verify_final_state: bool,
    /// Verifier tolerances.
    pub verify: VerifyConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            action_delay: 0.5,
            interval_delay: 0.0,
            menu_settle_delay: 0.2,
            wait_timeout: 10.0,
            max_polls: 600,
            restore_orchestrator_before_intervals: true,
            verify_final_state: true,
            verify: VerifyConfig::default(),
        }
    }
}

impl PlaybackConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Delays are finite and non-negative.
        for (name, value) in [
            ("action_delay", self.action_delay),
            ("interval_delay", self.interval_delay),
            ("menu_settle_delay", self.menu_settle_delay),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDelay { name, value });
            }
        }
        // 2. Waits are bounded in both time and polls.
        if !self.wait_timeout.is_finite() || self.wait_timeout <= 0.0 {
            return Err(ConfigError::InvalidWaitTimeout {
                value: self.wait_timeout,
            });
        }
        if self.max_polls == 0 {
            return Err(ConfigError::ZeroPolls);
        }
        // 3. Tolerances are finite and non-negative.
        for (name, value) in [
            ("score_tolerance", self.verify.score_tolerance),
            ("timer_tolerance", self.verify.timer_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`PlaybackConfig::validate()`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A delay is NaN, infinite, or negative.
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidDelay {
        /// Which delay.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// `wait_timeout` is NaN, infinite, zero, or negative.
    #[error("wait_timeout must be finite and positive, got {value}")]
    InvalidWaitTimeout {
        /// The invalid value.
        value: f64,
    },
    /// `max_polls` is zero.
    #[error("max_polls must be at least 1")]
    ZeroPolls,
    /// A verifier tolerance is NaN, infinite, or negative.
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidTolerance {
        /// Which tolerance.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
}
