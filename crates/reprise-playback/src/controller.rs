//! The playback state machine.
//!
//! [`PlaybackController`] replays a borrowed [`RecordedSession`] against a
//! host, one [`update`](PlaybackController::update) per frame. It never
//! blocks: every wait is a countdown or a poll that resumes on the next
//! frame, and every poll loop is bounded.
//!
//! # States
//!
//! ```text
//! Idle ──start──▶ Waiting ◀──────────────┐
//!                  │  ▲                   │
//!      countdown 0 │  │ action verified   │ resume
//!                  ▼  │                   │
//!               Executing ──pause──▶ Paused
//!                  │
//!                  ├── last action ──▶ Complete (Finished)
//!                  └── desync ───────▶ Error    (Failed)
//! ```
//!
//! `cancel` from any active state ends in `Complete (Cancelled)`.

use std::collections::VecDeque;
use std::fmt;

use reprise_core::{
    HostBackground, HostInput, HostModel, InputError, OperatorSurface, OrchestratorSnapshot,
    RunEnd, RunSummary,
};
use reprise_replay::{
    ActionKind, LiveState, Mismatch, RecordedAction, RecordedSession, SyncFailure, SyncVerifier,
};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, PlaybackConfig};
use crate::metrics::PlaybackMetrics;
use crate::plan::{build_plan, Step};

/// Everything a host must provide to be replayed against.
///
/// Blanket-implemented for every type implementing the four host traits.
pub trait PlaybackHost: HostInput + HostBackground + HostModel + OperatorSurface {}

impl<T> PlaybackHost for T where T: HostInput + HostBackground + HostModel + OperatorSurface + ?Sized
{}

// ── State & outcome ─────────────────────────────────────────────

/// Lifecycle state of a [`PlaybackController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not started.
    Idle,
    /// Counting down before the next step.
    Waiting,
    /// Running an action's execution plan.
    Executing,
    /// Halted by the operator; countdown and in-flight plan are kept.
    Paused,
    /// Finished or cancelled.
    Complete,
    /// Halted on a desynchronization or input failure.
    Error,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Executing => "executing",
            Self::Paused => "paused",
            Self::Complete => "complete",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Why a run was cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelReason {
    /// The operator dismissed playback.
    Operator,
    /// The host reported an out-of-band state change.
    ExternalModification,
}

/// Where and how a run diverged.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("action #{action_index} ({action}): {description}")]
pub struct PlaybackFailure {
    /// Index of the failing action; `actions.len()` for the final-state check.
    pub action_index: usize,
    /// Identifier of the failing action.
    pub action: String,
    /// Human-readable diagnosis.
    pub description: String,
    /// Field-level mismatches, empty for input failures.
    pub mismatches: Vec<Mismatch>,
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackOutcome {
    /// Every action replayed and verified.
    Finished,
    /// The run was cancelled.
    Cancelled {
        /// Who or what cancelled it.
        reason: CancelReason,
    },
    /// The run halted on the first divergence.
    Failed(PlaybackFailure),
}

/// Errors from controller calls made in the wrong state.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    /// The operation is not valid in the current state.
    #[error("cannot {operation} while {from}")]
    InvalidTransition {
        /// State the controller was in.
        from: PlaybackState,
        /// The rejected operation.
        operation: &'static str,
    },
    /// The host RNG is not seeded with the session's seed.
    #[error("session seed {session} does not match host seed {host:?}")]
    SeedMismatch {
        /// Seed recorded in the session.
        session: u32,
        /// Seed of the host RNG, `None` if it is not seeded.
        host: Option<u32>,
    },
    /// The configuration is invalid.
    #[error("invalid playback config: {0}")]
    Config(#[from] ConfigError),
}

// ── In-flight action ────────────────────────────────────────────

#[derive(Clone, Debug)]
struct InFlight {
    plan: VecDeque<Step>,
    /// Seconds spent on the current front step.
    elapsed: f64,
    /// Polls made by the current front step.
    polls: u32,
    /// Orchestrator state captured before the first step.
    orch_before: OrchestratorSnapshot,
}

// ── PlaybackController ──────────────────────────────────────────

/// Frame-driven replay of one recorded session.
///
/// The session is borrowed for `'s` and never mutated. One controller
/// runs at most one session: [`start`](Self::start) requires `Idle`.
#[derive(Debug)]
pub struct PlaybackController<'s> {
    config: PlaybackConfig,
    verifier: SyncVerifier,
    state: PlaybackState,
    session: Option<&'s RecordedSession>,
    next_index: usize,
    countdown: f64,
    in_flight: Option<InFlight>,
    /// Host RNG count at the end of the previous action.
    rng_mark: u64,
    outcome: Option<PlaybackOutcome>,
    metrics: PlaybackMetrics,
}

impl<'s> PlaybackController<'s> {
    /// Create an idle controller.
    pub fn new(config: PlaybackConfig) -> Result<Self, PlaybackError> {
        config.validate()?;
        Ok(Self {
            verifier: SyncVerifier::new(config.verify.clone()),
            config,
            state: PlaybackState::Idle,
            session: None,
            next_index: 0,
            countdown: 0.0,
            in_flight: None,
            rng_mark: 0,
            outcome: None,
            metrics: PlaybackMetrics::default(),
        })
    }

    /// Begin replaying `session` against `host`.
    ///
    /// Suspends the host's passive background advancement until the run
    /// ends and shows the operator controls.
    pub fn start<H: PlaybackHost + ?Sized>(
        &mut self,
        session: &'s RecordedSession,
        host: &mut H,
    ) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Idle {
            return Err(self.invalid("start"));
        }
        let host_seed = host.rng_seed();
        if host_seed != Some(session.seed) {
            return Err(PlaybackError::SeedMismatch {
                session: session.seed,
                host: host_seed,
            });
        }

        self.session = Some(session);
        self.next_index = 0;
        self.in_flight = None;
        self.outcome = None;
        self.metrics = PlaybackMetrics::default();
        self.rng_mark = host.rng_call_count();

        host.set_background_suspended(true);
        host.show_playback_controls();
        self.countdown = self.config.action_delay;
        self.state = PlaybackState::Waiting;
        info!(
            seed = session.seed,
            actions = session.actions.len(),
            "playback started"
        );
        Ok(())
    }

    /// Advance by one frame of `dt` seconds.
    pub fn update<H: PlaybackHost + ?Sized>(&mut self, dt: f64, host: &mut H) -> PlaybackState {
        match self.state {
            PlaybackState::Waiting => {
                self.countdown = (self.countdown - dt.max(0.0)).max(0.0);
                if self.countdown <= 0.0 {
                    if self.in_flight.is_some() {
                        self.state = PlaybackState::Executing;
                        self.run_plan(0.0, host);
                    } else {
                        self.begin_next(host);
                    }
                }
            }
            PlaybackState::Executing => self.run_plan(dt.max(0.0), host),
            PlaybackState::Idle
            | PlaybackState::Paused
            | PlaybackState::Complete
            | PlaybackState::Error => {}
        }
        self.state
    }

    /// Halt between frames, keeping the countdown and any in-flight plan.
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            PlaybackState::Waiting | PlaybackState::Executing => {
                debug!(next = self.next_index, "playback paused");
                self.state = PlaybackState::Paused;
                Ok(())
            }
            _ => Err(self.invalid("pause")),
        }
    }

    /// Continue a paused run. The next frame resumes the countdown, or
    /// the in-flight plan once the countdown is zero.
    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            PlaybackState::Paused => {
                debug!(next = self.next_index, "playback resumed");
                self.state = PlaybackState::Waiting;
                Ok(())
            }
            _ => Err(self.invalid("resume")),
        }
    }

    /// Skip the rest of the current countdown.
    pub fn advance(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            PlaybackState::Waiting => {
                self.countdown = 0.0;
                Ok(())
            }
            _ => Err(self.invalid("advance")),
        }
    }

    /// Cancel an active run. Returns whether anything was cancelled;
    /// calling it again, or before a run, is a no-op.
    pub fn cancel<H: PlaybackHost + ?Sized>(&mut self, host: &mut H) -> bool {
        self.cancel_with(CancelReason::Operator, host)
    }

    /// Report an out-of-band mutation of host state. Cancels an active run.
    ///
    /// Hosts learn when the controller's own input is being delivered
    /// through [`OperatorSurface::synthetic_input`] and should not report
    /// mutations made inside that window.
    pub fn notify_external_modification<H: PlaybackHost + ?Sized>(&mut self, host: &mut H) {
        if self.is_active() {
            warn!(
                next = self.next_index,
                "host state modified during playback, cancelling"
            );
            self.cancel_with(CancelReason::ExternalModification, host);
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// How the run ended, once it has.
    pub fn outcome(&self) -> Option<&PlaybackOutcome> {
        self.outcome.as_ref()
    }

    /// Counters for the current run.
    pub fn metrics(&self) -> &PlaybackMetrics {
        &self.metrics
    }

    /// Index of the next action to replay (or of the in-flight one).
    pub fn next_action_index(&self) -> usize {
        self.next_index
    }

    /// Seconds left before the next step.
    pub fn countdown(&self) -> f64 {
        self.countdown
    }

    /// Whether a run is in progress (waiting, executing, or paused).
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            PlaybackState::Waiting | PlaybackState::Executing | PlaybackState::Paused
        )
    }

    /// The configuration in use.
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ── Internals ───────────────────────────────────────────────

    fn invalid(&self, operation: &'static str) -> PlaybackError {
        PlaybackError::InvalidTransition {
            from: self.state,
            operation,
        }
    }

    fn cancel_with<H: PlaybackHost + ?Sized>(&mut self, reason: CancelReason, host: &mut H) -> bool {
        if !self.is_active() {
            return false;
        }
        info!(?reason, next = self.next_index, "playback cancelled");
        self.end_run(PlaybackOutcome::Cancelled { reason }, host);
        true
    }

    /// Start the action at `next_index`, or finish the run.
    fn begin_next<H: PlaybackHost + ?Sized>(&mut self, host: &mut H) {
        let Some(session) = self.session else {
            return;
        };
        let Some(action) = session.actions.get(self.next_index) else {
            self.finish_run(session, host);
            return;
        };

        if action.is_interval() {
            self.replay_interval(action, host);
            return;
        }

        match build_plan(action, self.config.menu_settle_delay) {
            Ok(plan) => {
                debug!(
                    index = self.next_index,
                    action = %action.action,
                    steps = plan.len(),
                    "replaying action"
                );
                self.in_flight = Some(InFlight {
                    plan,
                    elapsed: 0.0,
                    polls: 0,
                    orch_before: host.orchestrator_snapshot(),
                });
                self.state = PlaybackState::Executing;
                self.run_plan(0.0, host);
            }
            Err(e) => self.fail_with(action, e.to_string(), Vec::new(), host),
        }
    }

    fn replay_interval<H: PlaybackHost + ?Sized>(&mut self, action: &RecordedAction, host: &mut H) {
        let Some(count) = action.count else {
            self.fail_with(
                action,
                "process_intervals without count".to_string(),
                Vec::new(),
                host,
            );
            return;
        };
        if self.config.restore_orchestrator_before_intervals {
            if let Some(orch) = &action.orch_state {
                host.restore_orchestrator_snapshot(orch);
            }
        }
        host.advance_background_ticks(count);
        self.metrics.intervals_replayed += 1;
        self.metrics.ticks_replayed += u64::from(count);
        debug!(index = self.next_index, ticks = count, "replayed interval");

        let rng_count = host.rng_call_count();
        if action.rng_counts.is_some() {
            let notifications = host.pending_notifications();
            let log = host.rng_call_log();
            let draws = log.get(mark_index(self.rng_mark)..).unwrap_or(&[]);
            let result = self
                .verifier
                .verify_interval(action, rng_count, draws, &notifications);
            if let Err(failure) = result {
                self.desync(action, failure, host);
                return;
            }
            self.metrics.verifications_passed += 1;
        }
        self.rng_mark = rng_count;
        self.step_done(self.config.interval_delay, host);
    }

    /// Run plan steps until one has to wait for a later frame.
    ///
    /// `budget` is the frame time the current front step may consume;
    /// a step that becomes current during this call starts at zero.
    fn run_plan<H: PlaybackHost + ?Sized>(&mut self, mut budget: f64, host: &mut H) {
        loop {
            let Some(flight) = self.in_flight.as_mut() else {
                return;
            };
            let Some(step) = flight.plan.front().cloned() else {
                self.complete_action(host);
                return;
            };

            match step {
                Step::Settle(secs) => {
                    flight.elapsed += budget;
                    if flight.elapsed < secs {
                        return;
                    }
                }
                Step::Await(condition) => {
                    flight.polls += 1;
                    self.metrics.polls += 1;
                    if condition.is_pending(&*host) {
                        flight.elapsed += budget;
                        if flight.elapsed < self.config.wait_timeout
                            && flight.polls < self.config.max_polls
                        {
                            return;
                        }
                        warn!(
                            index = self.next_index,
                            condition = condition.as_str(),
                            elapsed = flight.elapsed,
                            polls = flight.polls,
                            "wait timed out, proceeding"
                        );
                        self.metrics.wait_timeouts += 1;
                    }
                }
                Step::ClickSubject(_) | Step::ChooseMenuItem(_) | Step::ClickViewToggle => {
                    host.synthetic_input(true);
                    let result = perform_input(&step, host);
                    host.synthetic_input(false);
                    if let Err(e) = result {
                        self.fail_input(e, host);
                        return;
                    }
                }
            }

            if let Some(flight) = self.in_flight.as_mut() {
                flight.plan.pop_front();
                flight.elapsed = 0.0;
                flight.polls = 0;
            }
            budget = 0.0;
        }
    }

    /// Verify the action whose plan just drained.
    fn complete_action<H: PlaybackHost + ?Sized>(&mut self, host: &mut H) {
        let (Some(session), Some(flight)) = (self.session, self.in_flight.take()) else {
            return;
        };
        let Some(action) = session.actions.get(self.next_index) else {
            return;
        };

        let model = host.model_snapshot();
        let notifications = host.pending_notifications();
        let rng_count = host.rng_call_count();
        let result = {
            let log = host.rng_call_log();
            let live = LiveState {
                model: &model,
                orchestrator: Some(&flight.orch_before),
                rng_count,
                rng_draws: log.get(mark_index(self.rng_mark)..).unwrap_or(&[]),
                notifications: &notifications,
            };
            self.verifier.verify_action(action, &live)
        };

        match result {
            Ok(()) => {
                self.metrics.actions_executed += 1;
                self.metrics.verifications_passed += 1;
                self.rng_mark = rng_count;
                self.step_done(self.config.action_delay, host);
            }
            Err(failure) => self.desync(action, failure, host),
        }
    }

    /// Move past the current entry and count down `delay`.
    fn step_done<H: PlaybackHost + ?Sized>(&mut self, delay: f64, host: &mut H) {
        self.next_index += 1;
        if let Some(session) = self.session {
            host.playback_progress(self.next_index, session.actions.len());
        }
        self.countdown = delay;
        self.state = PlaybackState::Waiting;
    }

    fn finish_run<H: PlaybackHost + ?Sized>(&mut self, session: &RecordedSession, host: &mut H) {
        if self.config.verify_final_state {
            if let Some(expected) = &session.final_state {
                let live = host.model_snapshot();
                let notifications = host.pending_notifications();
                match self.verifier.verify_final(expected, &live, &notifications) {
                    Ok(()) => self.metrics.verifications_passed += 1,
                    Err(failure) => {
                        error!(%failure, "final state diverged");
                        let failure = PlaybackFailure {
                            action_index: session.actions.len(),
                            action: "final_state".to_string(),
                            description: failure.description,
                            mismatches: failure.mismatches,
                        };
                        self.end_run(PlaybackOutcome::Failed(failure), host);
                        return;
                    }
                }
            }
        }
        info!(
            actions = self.metrics.actions_executed,
            intervals = self.metrics.intervals_replayed,
            wait_timeouts = self.metrics.wait_timeouts,
            "playback finished"
        );
        self.end_run(PlaybackOutcome::Finished, host);
    }

    fn desync<H: PlaybackHost + ?Sized>(
        &mut self,
        action: &RecordedAction,
        failure: SyncFailure,
        host: &mut H,
    ) {
        error!(
            index = self.next_index,
            action = %action.action,
            %failure,
            "desynchronized"
        );
        self.fail_with(action, failure.description, failure.mismatches, host);
    }

    fn fail_input<H: PlaybackHost + ?Sized>(&mut self, e: InputError, host: &mut H) {
        let Some(action) = self.session.and_then(|s| s.actions.get(self.next_index)) else {
            return;
        };
        let diagnostics = host.background_diagnostics();
        error!(
            index = self.next_index,
            action = %action.action,
            error = %e,
            background = %diagnostics.detail,
            "input failed"
        );
        self.fail_with(action, format!("input failed: {e}"), Vec::new(), host);
    }

    fn fail_with<H: PlaybackHost + ?Sized>(
        &mut self,
        action: &RecordedAction,
        description: String,
        mismatches: Vec<Mismatch>,
        host: &mut H,
    ) {
        let failure = PlaybackFailure {
            action_index: self.next_index,
            action: action_name(&action.action),
            description,
            mismatches,
        };
        self.end_run(PlaybackOutcome::Failed(failure), host);
    }

    /// Tear down and enter the terminal state for `outcome`.
    fn end_run<H: PlaybackHost + ?Sized>(&mut self, outcome: PlaybackOutcome, host: &mut H) {
        self.in_flight = None;
        self.countdown = 0.0;
        host.set_background_suspended(false);
        host.hide_playback_controls();

        let (end, state, detail) = match &outcome {
            PlaybackOutcome::Finished => (RunEnd::Finished, PlaybackState::Complete, None),
            PlaybackOutcome::Cancelled { reason } => (
                RunEnd::Cancelled,
                PlaybackState::Complete,
                Some(format!("{reason:?}")),
            ),
            PlaybackOutcome::Failed(failure) => (
                RunEnd::Failed,
                PlaybackState::Error,
                Some(failure.to_string()),
            ),
        };
        let summary = RunSummary {
            end,
            actions_completed: self.next_index,
            total_actions: self.session.map_or(0, |s| s.actions.len()),
            detail,
        };
        host.playback_finished(&summary);
        self.state = state;
        self.outcome = Some(outcome);
    }
}

fn action_name(kind: &ActionKind) -> String {
    kind.as_str().to_string()
}

fn mark_index(mark: u64) -> usize {
    usize::try_from(mark).unwrap_or(usize::MAX)
}

fn perform_input<H: PlaybackHost + ?Sized>(step: &Step, host: &mut H) -> Result<(), InputError> {
    match step {
        Step::ClickSubject(id) => {
            let at = host
                .subject_screen_position(id)
                .ok_or_else(|| InputError::SubjectNotVisible(id.clone()))?;
            host.simulate_hover(at);
            host.simulate_click_on_subject(id).into_result()
        }
        Step::ChooseMenuItem(item) => {
            let slot = host
                .find_action_in_open_menu(item)
                .ok_or_else(|| InputError::MenuItemMissing(item.clone()))?;
            let center = host.menu_center().ok_or(InputError::MenuNotOpen)?;
            let at = host.menu_slice_position(slot.slice_index, center, slot.item_count);
            host.simulate_hover(at);
            host.simulate_click_at_position(at).into_result()
        }
        Step::ClickViewToggle => {
            let at = host.view_toggle_position().ok_or(InputError::NoViewToggle)?;
            host.simulate_hover(at);
            host.simulate_click_at_position(at).into_result()
        }
        Step::Settle(_) | Step::Await(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reprise_core::SubjectId;
    use reprise_replay::{Platform, RngCounts};
    use reprise_test_utils::{MockSimulation, UiEvent};

    fn session(seed: u32, actions: Vec<RecordedAction>) -> RecordedSession {
        RecordedSession {
            initial_state: Default::default(),
            final_state: None,
            seed,
            code_version: String::new(),
            platform: Platform::Desktop,
            actions,
        }
    }

    fn select(id: &str) -> RecordedAction {
        let mut a = RecordedAction::new(ActionKind::SelectTarget);
        a.cloud_id = Some(SubjectId::from(id));
        a
    }

    fn controller<'s>() -> PlaybackController<'s> {
        PlaybackController::new(PlaybackConfig::default()).unwrap()
    }

    fn drive(ctrl: &mut PlaybackController<'_>, sim: &mut MockSimulation, frames: usize) {
        for _ in 0..frames {
            if !ctrl.is_active() {
                return;
            }
            ctrl.update(0.1, sim);
            sim.frame(0.1);
        }
    }

    #[test]
    fn invalid_config_rejected() {
        let config = PlaybackConfig {
            max_polls: 0,
            ..Default::default()
        };
        assert!(matches!(
            PlaybackController::new(config),
            Err(PlaybackError::Config(ConfigError::ZeroPolls))
        ));
    }

    #[test]
    fn start_requires_matching_seed() {
        let s = session(7, Vec::new());
        let mut sim = MockSimulation::new(8);
        let mut ctrl = controller();
        assert_eq!(
            ctrl.start(&s, &mut sim),
            Err(PlaybackError::SeedMismatch {
                session: 7,
                host: Some(8)
            })
        );
        assert_eq!(ctrl.state(), PlaybackState::Idle);
        assert!(sim.ui_events().is_empty());
    }

    #[test]
    fn start_suspends_background_and_shows_controls() {
        let s = session(1, vec![select("p1")]);
        let mut sim = MockSimulation::new(1);
        let mut ctrl = controller();
        ctrl.start(&s, &mut sim).unwrap();
        assert_eq!(ctrl.state(), PlaybackState::Waiting);
        assert_eq!(ctrl.countdown(), 0.5);
        assert!(sim.is_background_suspended());
        assert_eq!(sim.ui_events(), &[UiEvent::ControlsShown]);

        let err = ctrl.start(&s, &mut sim).unwrap_err();
        assert_eq!(
            err,
            PlaybackError::InvalidTransition {
                from: PlaybackState::Waiting,
                operation: "start"
            }
        );
        assert_eq!(err.to_string(), "cannot start while waiting");
    }

    #[test]
    fn empty_session_finishes_after_first_countdown() {
        let s = session(3, Vec::new());
        let mut sim = MockSimulation::new(3);
        let mut ctrl = controller();
        ctrl.start(&s, &mut sim).unwrap();
        ctrl.update(0.25, &mut sim);
        assert_eq!(ctrl.state(), PlaybackState::Waiting);
        ctrl.update(0.25, &mut sim);
        assert_eq!(ctrl.state(), PlaybackState::Complete);
        assert_eq!(ctrl.outcome(), Some(&PlaybackOutcome::Finished));
        assert!(!sim.is_background_suspended());
        assert_eq!(sim.finished_calls(), 1);
    }

    #[test]
    fn advance_skips_the_countdown() {
        let s = session(3, Vec::new());
        let mut sim = MockSimulation::new(3);
        let mut ctrl = controller();
        ctrl.start(&s, &mut sim).unwrap();
        ctrl.advance().unwrap();
        assert_eq!(ctrl.countdown(), 0.0);
        ctrl.update(0.0, &mut sim);
        assert_eq!(ctrl.state(), PlaybackState::Complete);
    }

    #[test]
    fn pause_and_resume_guard_their_states() {
        let s = session(1, vec![select("p1")]);
        let mut sim = MockSimulation::new(1);
        let mut ctrl = controller();
        assert!(matches!(
            ctrl.pause(),
            Err(PlaybackError::InvalidTransition {
                from: PlaybackState::Idle,
                ..
            })
        ));

        ctrl.start(&s, &mut sim).unwrap();
        assert!(ctrl.resume().is_err());
        ctrl.pause().unwrap();
        assert!(ctrl.advance().is_err());
        assert!(ctrl.pause().is_err());

        // Paused frames change nothing.
        for _ in 0..20 {
            ctrl.update(0.1, &mut sim);
        }
        assert_eq!(ctrl.countdown(), 0.5);
        assert_eq!(sim.click_count(), 0);

        ctrl.resume().unwrap();
        assert_eq!(ctrl.state(), PlaybackState::Waiting);
    }

    #[test]
    fn resume_continues_the_interrupted_countdown() {
        let s = session(1, vec![select("p1")]);
        let mut sim = MockSimulation::new(1);
        let mut ctrl = controller();
        ctrl.start(&s, &mut sim).unwrap();
        ctrl.update(0.25, &mut sim);
        assert_eq!(ctrl.countdown(), 0.25);

        ctrl.pause().unwrap();
        for _ in 0..10 {
            ctrl.update(0.1, &mut sim);
            sim.frame(0.1);
        }
        assert_eq!(ctrl.countdown(), 0.25);
        ctrl.resume().unwrap();

        ctrl.update(0.125, &mut sim);
        assert_eq!(ctrl.state(), PlaybackState::Waiting);
        assert_eq!(ctrl.countdown(), 0.125);
        assert_eq!(sim.click_count(), 0);

        ctrl.update(0.125, &mut sim);
        assert_eq!(sim.click_count(), 1);
    }

    #[test]
    fn cancel_is_idempotent() {
        let s = session(1, vec![select("p1"), select("p2")]);
        let mut sim = MockSimulation::new(1);
        let mut ctrl = controller();
        assert!(!ctrl.cancel(&mut sim));

        ctrl.start(&s, &mut sim).unwrap();
        assert!(ctrl.cancel(&mut sim));
        assert!(!ctrl.cancel(&mut sim));
        assert_eq!(ctrl.state(), PlaybackState::Complete);
        assert_eq!(
            ctrl.outcome(),
            Some(&PlaybackOutcome::Cancelled {
                reason: CancelReason::Operator
            })
        );
        assert_eq!(sim.finished_calls(), 1);
        assert!(!sim.is_background_suspended());
        assert!(ctrl.pause().is_err());
    }

    #[test]
    fn unverified_select_replays_through_input() {
        let s = session(1, vec![select("p1")]);
        let mut sim = MockSimulation::new(1);
        let mut ctrl = controller();
        ctrl.start(&s, &mut sim).unwrap();
        drive(&mut ctrl, &mut sim, 200);
        assert_eq!(ctrl.outcome(), Some(&PlaybackOutcome::Finished));
        assert_eq!(ctrl.metrics().actions_executed, 1);
        assert_eq!(ctrl.next_action_index(), 1);
        assert_eq!(sim.click_count(), 1);
        let progress = UiEvent::Progress {
            completed: 1,
            total: 1,
        };
        assert!(sim.ui_events().contains(&progress));
    }

    #[test]
    fn interval_without_count_fails() {
        let mut interval = RecordedAction::intervals(2);
        interval.count = None;
        let s = session(1, vec![interval]);
        let mut sim = MockSimulation::new(1);
        let mut ctrl = controller();
        ctrl.start(&s, &mut sim).unwrap();
        drive(&mut ctrl, &mut sim, 20);

        let Some(PlaybackOutcome::Failed(failure)) = ctrl.outcome() else {
            panic!("expected failure, got {:?}", ctrl.outcome());
        };
        assert_eq!(failure.action_index, 0);
        assert_eq!(failure.action, "process_intervals");
        assert_eq!(ctrl.state(), PlaybackState::Error);
    }

    #[test]
    fn interval_rng_divergence_is_reported() {
        let mut interval = RecordedAction::intervals(3);
        interval.rng_counts = Some(RngCounts { model: 5 });
        let s = session(1, vec![interval]);
        let mut sim = MockSimulation::new(1);
        let mut ctrl = controller();
        ctrl.start(&s, &mut sim).unwrap();
        drive(&mut ctrl, &mut sim, 20);

        let Some(PlaybackOutcome::Failed(failure)) = ctrl.outcome() else {
            panic!("expected failure, got {:?}", ctrl.outcome());
        };
        assert!(failure.description.contains("expected 5, actual"));
        assert_eq!(sim.ticks_applied(), 3);
        assert_eq!(ctrl.metrics().intervals_replayed, 1);
        assert_eq!(ctrl.metrics().ticks_replayed, 3);
    }

    #[test]
    fn external_modification_cancels_only_active_runs() {
        let s = session(1, vec![select("p1")]);
        let mut sim = MockSimulation::new(1);
        let mut ctrl = controller();
        ctrl.notify_external_modification(&mut sim);
        assert_eq!(ctrl.state(), PlaybackState::Idle);

        ctrl.start(&s, &mut sim).unwrap();
        ctrl.notify_external_modification(&mut sim);
        assert_eq!(
            ctrl.outcome(),
            Some(&PlaybackOutcome::Cancelled {
                reason: CancelReason::ExternalModification
            })
        );
        assert!(!sim.is_receiving_synthetic_input());
    }

    #[test]
    fn every_click_is_bracketed_as_synthetic_input() {
        let s = session(1, vec![select("p1")]);
        let mut sim = MockSimulation::new(1);
        let mut ctrl = controller();
        ctrl.start(&s, &mut sim).unwrap();
        drive(&mut ctrl, &mut sim, 200);

        assert_eq!(ctrl.outcome(), Some(&PlaybackOutcome::Finished));
        assert_eq!(sim.click_count(), 1);
        assert_eq!(sim.synthetic_click_count(), 1);
        assert!(!sim.is_receiving_synthetic_input());

        sim.simulate_click_on_subject(&SubjectId::from("p2"));
        assert_eq!(sim.click_count(), 2);
        assert_eq!(sim.synthetic_click_count(), 1);
    }
}
