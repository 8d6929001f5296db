//! Action recording.
//!
//! [`ActionRecorder`] turns a live interaction into a [`RecordedSession`].
//! The host reports each completed user action via
//! [`record`](ActionRecorder::record) and each batch of background ticks
//! via [`note_background_ticks`](ActionRecorder::note_background_ticks).
//! Ticks accumulate into a single `process_intervals` pseudo-action that
//! is flushed before the next user action, at stop, and optionally every
//! [`RecorderConfig::max_ticks_per_interval`] ticks.

use reprise_core::{ModelSnapshot, OrchestratorSnapshot, SubjectId};
use reprise_rng::SimRng;

use crate::error::RecorderError;
use crate::types::{
    ActionKind, LoggedDraw, Platform, RecordedAction, RecordedSession, RngCounts,
};

/// Recorder configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Flush pending ticks as soon as this many have accumulated.
    /// `None` flushes only before actions and at stop. A threshold of
    /// zero behaves like one.
    pub max_ticks_per_interval: Option<u32>,
}

/// A user action as reported by the host when it completes.
///
/// # Examples
///
/// ```
/// use reprise_replay::{ActionInput, ActionKind};
///
/// let input = ActionInput::new(ActionKind::Menu("ask_about".into()))
///     .subject("p1")
///     .field("age");
/// assert_eq!(input.cloud_id.as_ref().map(|id| id.as_str()), Some("p1"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ActionInput {
    /// What was done.
    pub kind: ActionKind,
    /// Subject acted on.
    pub cloud_id: Option<SubjectId>,
    /// Second subject, for targeted actions.
    pub target_cloud_id: Option<SubjectId>,
    /// Sub-item chosen after the action.
    pub field: Option<String>,
}

impl ActionInput {
    /// An input with no subject, target, or field.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            cloud_id: None,
            target_cloud_id: None,
            field: None,
        }
    }

    /// Set the subject acted on.
    pub fn subject(mut self, id: impl Into<SubjectId>) -> Self {
        self.cloud_id = Some(id.into());
        self
    }

    /// Set the target subject.
    pub fn target(mut self, id: impl Into<SubjectId>) -> Self {
        self.target_cloud_id = Some(id.into());
        self
    }

    /// Set the sub-item.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Background ticks noted but not yet written out.
#[derive(Clone, Debug)]
struct PendingInterval {
    ticks: u32,
    orch_before: OrchestratorSnapshot,
    rng_count: u64,
    draws: Vec<LoggedDraw>,
}

/// State of an active recording.
#[derive(Clone, Debug)]
struct Recording {
    session: RecordedSession,
    /// RNG call count at the last recorded entry (or at start).
    rng_mark: u64,
    pending: Option<PendingInterval>,
}

impl Recording {
    fn flush(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        tracing::debug!(
            ticks = pending.ticks,
            draws = pending.draws.len(),
            "recorded background interval"
        );
        self.rng_mark = pending.rng_count;
        self.session.actions.push(RecordedAction {
            count: Some(pending.ticks),
            rng_counts: Some(RngCounts {
                model: pending.rng_count,
            }),
            rng_log: pending.draws,
            orch_state: Some(pending.orch_before),
            ..RecordedAction::new(ActionKind::ProcessIntervals)
        });
    }
}

/// Records a session as a sequence of actions and interval pseudo-actions.
///
/// State machine: idle → recording → idle. Invalid-state calls return a
/// [`RecorderError`] and leave the recorder untouched.
///
/// # Examples
///
/// ```
/// use reprise_core::{ModelSnapshot, OrchestratorSnapshot};
/// use reprise_replay::{ActionInput, ActionKind, ActionRecorder, Platform};
/// use reprise_rng::SimRng;
///
/// let rng = SimRng::seeded(42);
/// let mut recorder = ActionRecorder::new();
/// recorder
///     .start(ModelSnapshot::default(), "dev", Platform::Desktop, &rng)
///     .unwrap();
///
/// let input = ActionInput::new(ActionKind::SelectTarget).subject("p1");
/// recorder
///     .record(input, OrchestratorSnapshot::new(), ModelSnapshot::default(), &rng)
///     .unwrap();
///
/// let session = recorder.stop(ModelSnapshot::default()).unwrap();
/// assert_eq!(session.seed, 42);
/// assert_eq!(session.actions.len(), 1);
/// assert!(!recorder.is_recording());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ActionRecorder {
    config: RecorderConfig,
    active: Option<Recording>,
}

impl ActionRecorder {
    /// Create an idle recorder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle recorder with `config`.
    pub fn with_config(config: RecorderConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    /// Begin recording from `initial`.
    ///
    /// Captures the RNG seed and its current call count as the baseline.
    pub fn start(
        &mut self,
        initial: ModelSnapshot,
        code_version: impl Into<String>,
        platform: Platform,
        rng: &SimRng,
    ) -> Result<(), RecorderError> {
        if self.active.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }
        let seed = rng.seed().ok_or(RecorderError::UnseededRng)?;
        let code_version = code_version.into();
        tracing::debug!(seed, %code_version, "recording started");
        self.active = Some(Recording {
            session: RecordedSession {
                initial_state: initial,
                final_state: None,
                seed,
                code_version,
                platform,
                actions: Vec::new(),
            },
            rng_mark: rng.call_count(),
            pending: None,
        });
        Ok(())
    }

    /// Like [`start`](Self::start), upgrading a live RNG to a seeded one
    /// first.
    ///
    /// The state check happens before the upgrade, so a rejected call
    /// leaves `rng` untouched.
    pub fn start_upgrading(
        &mut self,
        initial: ModelSnapshot,
        code_version: impl Into<String>,
        platform: Platform,
        rng: &mut SimRng,
    ) -> Result<(), RecorderError> {
        if self.active.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }
        rng.ensure_seeded();
        self.start(initial, code_version, platform, rng)
    }

    /// Note that the host applied `count` background ticks.
    ///
    /// `orch_before` is the orchestrator state before these ticks; only
    /// the one preceding the first pending tick is kept. `rng` is read
    /// after the ticks ran.
    pub fn note_background_ticks(
        &mut self,
        count: u32,
        orch_before: OrchestratorSnapshot,
        rng: &SimRng,
    ) -> Result<(), RecorderError> {
        let recording = self.active.as_mut().ok_or(RecorderError::NotRecording)?;
        if count == 0 {
            return Ok(());
        }
        let since = recording
            .pending
            .as_ref()
            .map_or(recording.rng_mark, |p| p.rng_count);
        let new_draws = rng.draws_since(since).iter().map(LoggedDraw::from);
        match recording.pending.as_mut() {
            Some(pending) => {
                pending.ticks = pending.ticks.saturating_add(count);
                pending.rng_count = rng.call_count();
                pending.draws.extend(new_draws);
            }
            None => {
                recording.pending = Some(PendingInterval {
                    ticks: count,
                    orch_before,
                    rng_count: rng.call_count(),
                    draws: new_draws.collect(),
                });
            }
        }

        if let (Some(limit), Some(pending)) =
            (self.config.max_ticks_per_interval, recording.pending.as_ref())
        {
            if pending.ticks >= limit.max(1) {
                recording.flush();
            }
        }
        Ok(())
    }

    /// Write pending ticks out as a `process_intervals` pseudo-action.
    ///
    /// Does nothing when idle or when no ticks are pending.
    pub fn flush_intervals(&mut self) {
        if let Some(recording) = self.active.as_mut() {
            recording.flush();
        }
    }

    /// Append a completed user action.
    ///
    /// Pending ticks are flushed first so the interval precedes the
    /// action in the log. `orch` is the orchestrator state before the
    /// action; `model` is the model state after it. `process_intervals`
    /// is rejected with [`RecorderError::IntervalAsAction`].
    pub fn record(
        &mut self,
        input: ActionInput,
        orch: OrchestratorSnapshot,
        model: ModelSnapshot,
        rng: &SimRng,
    ) -> Result<(), RecorderError> {
        if input.kind.is_interval() {
            return Err(RecorderError::IntervalAsAction);
        }
        let recording = self.active.as_mut().ok_or(RecorderError::NotRecording)?;
        recording.flush();

        let rng_log: Vec<LoggedDraw> = rng
            .draws_since(recording.rng_mark)
            .iter()
            .map(LoggedDraw::from)
            .collect();
        let count = rng.call_count();
        tracing::debug!(
            action = %input.kind,
            rng_count = count,
            draws = rng_log.len(),
            "recorded action"
        );
        recording.rng_mark = count;
        recording.session.actions.push(RecordedAction {
            action: input.kind,
            cloud_id: input.cloud_id,
            target_cloud_id: input.target_cloud_id,
            field: input.field,
            count: None,
            rng_counts: Some(RngCounts { model: count }),
            rng_log,
            model_state: Some(model),
            orch_state: Some(orch),
        });
        Ok(())
    }

    /// Seal the session with `final_state` and return to idle.
    pub fn stop(&mut self, final_state: ModelSnapshot) -> Result<RecordedSession, RecorderError> {
        let mut recording = self.active.take().ok_or(RecorderError::NotRecording)?;
        recording.flush();
        recording.session.final_state = Some(final_state);
        tracing::debug!(
            actions = recording.session.actions.len(),
            "recording stopped"
        );
        Ok(recording.session)
    }

    /// Copy of the session so far, unsealed. `None` when idle.
    ///
    /// Pending ticks that have not been flushed are not included.
    pub fn session(&self) -> Option<RecordedSession> {
        self.active.as_ref().map(|r| r.session.clone())
    }

    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Ticks noted but not yet flushed.
    pub fn pending_ticks(&self) -> u32 {
        self.active
            .as_ref()
            .and_then(|r| r.pending.as_ref())
            .map_or(0, |p| p.ticks)
    }

    /// Entries recorded so far, intervals included.
    pub fn action_count(&self) -> usize {
        self.active.as_ref().map_or(0, |r| r.session.actions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orch(score: f64) -> OrchestratorSnapshot {
        let mut o = OrchestratorSnapshot::new();
        o.insert("regulationScore", score);
        o
    }

    fn started(rng: &SimRng) -> ActionRecorder {
        let mut r = ActionRecorder::new();
        r.start(ModelSnapshot::default(), "test", Platform::Desktop, rng)
            .unwrap();
        r
    }

    #[test]
    fn zero_action_session_round_trips_state() {
        let rng = SimRng::seeded(7);
        let mut initial = ModelSnapshot::default();
        initial.targets.insert(SubjectId::from("p1"));
        let mut r = ActionRecorder::new();
        r.start(initial.clone(), "v1", Platform::Mobile, &rng).unwrap();
        let session = r.stop(initial.clone()).unwrap();
        assert!(session.actions.is_empty());
        assert_eq!(session.final_state.as_ref(), Some(&session.initial_state));
        assert_eq!(session.platform, Platform::Mobile);
        assert_eq!(session.code_version, "v1");
    }

    #[test]
    fn start_rejects_live_rng_without_side_effects() {
        let rng = SimRng::live();
        let mut r = ActionRecorder::new();
        let err = r
            .start(ModelSnapshot::default(), "v", Platform::Desktop, &rng)
            .unwrap_err();
        assert_eq!(err, RecorderError::UnseededRng);
        assert!(err.is_invalid_state());
        assert!(!r.is_recording());
    }

    #[test]
    fn double_start_is_rejected() {
        let rng = SimRng::seeded(1);
        let mut r = started(&rng);
        let err = r
            .start(ModelSnapshot::default(), "v", Platform::Desktop, &rng)
            .unwrap_err();
        assert_eq!(err, RecorderError::AlreadyRecording);
        assert!(r.is_recording());
    }

    #[test]
    fn start_upgrading_seeds_live_rng() {
        let mut rng = SimRng::live();
        let mut r = ActionRecorder::new();
        r.start_upgrading(ModelSnapshot::default(), "v", Platform::Desktop, &mut rng)
            .unwrap();
        let session = r.session().unwrap();
        assert_eq!(Some(session.seed), rng.seed());
    }

    #[test]
    fn stop_and_record_need_an_active_recording() {
        let rng = SimRng::seeded(1);
        let mut r = ActionRecorder::new();
        assert_eq!(
            r.stop(ModelSnapshot::default()).unwrap_err(),
            RecorderError::NotRecording
        );
        let input = ActionInput::new(ActionKind::ToggleView);
        assert_eq!(
            r.record(input, orch(0.0), ModelSnapshot::default(), &rng)
                .unwrap_err(),
            RecorderError::NotRecording
        );
        assert!(r.session().is_none());
    }

    #[test]
    fn record_rejects_interval_pseudo_action() {
        let mut rng = SimRng::seeded(4);
        let mut r = started(&rng);
        rng.random("orchestrator.demand");
        r.note_background_ticks(2, orch(1.0), &rng).unwrap();

        let err = r
            .record(
                ActionInput::new(ActionKind::ProcessIntervals),
                orch(1.0),
                ModelSnapshot::default(),
                &rng,
            )
            .unwrap_err();
        assert_eq!(err, RecorderError::IntervalAsAction);
        assert!(!err.is_invalid_state());

        // Nothing flushed, nothing appended.
        assert_eq!(r.pending_ticks(), 2);
        assert!(r.session().unwrap().actions.is_empty());
        let session = r.stop(ModelSnapshot::default()).unwrap();
        assert_eq!(session.actions.len(), 1);
        assert!(session.actions[0].is_interval());
        assert_eq!(session.actions[0].count, Some(2));
    }

    #[test]
    fn action_captures_count_and_draw_delta() {
        let mut rng = SimRng::seeded(3);
        let mut r = started(&rng);

        rng.random("job.response");
        r.record(
            ActionInput::new(ActionKind::Menu("job".into())).subject("p1"),
            orch(0.0),
            ModelSnapshot::default(),
            &rng,
        )
        .unwrap();

        rng.random("blend.intensity");
        rng.random("blend.extra");
        r.record(
            ActionInput::new(ActionKind::Menu("blend".into())).subject("p2"),
            orch(0.0),
            ModelSnapshot::default(),
            &rng,
        )
        .unwrap();

        let session = r.stop(ModelSnapshot::default()).unwrap();
        let first = &session.actions[0];
        assert_eq!(first.rng_counts.map(|c| c.model), Some(1));
        assert_eq!(first.rng_log.len(), 1);
        assert_eq!(first.rng_log[0].label, "job.response");

        let second = &session.actions[1];
        assert_eq!(second.rng_counts.map(|c| c.model), Some(3));
        let labels: Vec<&str> = second.rng_log.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["blend.intensity", "blend.extra"]);
    }

    #[test]
    fn ticks_accumulate_and_flush_before_next_action() {
        let mut rng = SimRng::seeded(5);
        let mut r = started(&rng);

        r.note_background_ticks(2, orch(1.0), &rng).unwrap();
        rng.random("orchestrator.demand");
        r.note_background_ticks(1, orch(2.0), &rng).unwrap();
        assert_eq!(r.pending_ticks(), 3);
        assert_eq!(r.action_count(), 0);

        r.record(
            ActionInput::new(ActionKind::ToggleView),
            orch(3.0),
            ModelSnapshot::default(),
            &rng,
        )
        .unwrap();
        assert_eq!(r.pending_ticks(), 0);

        let session = r.stop(ModelSnapshot::default()).unwrap();
        assert_eq!(session.actions.len(), 2);
        let interval = &session.actions[0];
        assert!(interval.is_interval());
        assert_eq!(interval.count, Some(3));
        assert_eq!(interval.orch_state, Some(orch(1.0)));
        assert_eq!(interval.rng_counts.map(|c| c.model), Some(1));
        assert_eq!(interval.rng_log.len(), 1);

        let toggle = &session.actions[1];
        assert_eq!(toggle.action, ActionKind::ToggleView);
        assert!(toggle.rng_log.is_empty(), "demand draw belongs to the interval");
    }

    #[test]
    fn stop_flushes_trailing_ticks() {
        let rng = SimRng::seeded(5);
        let mut r = started(&rng);
        r.note_background_ticks(4, orch(0.5), &rng).unwrap();
        let session = r.stop(ModelSnapshot::default()).unwrap();
        assert_eq!(session.actions.len(), 1);
        assert_eq!(session.actions[0].count, Some(4));
    }

    #[test]
    fn cadence_flushes_at_threshold() {
        let rng = SimRng::seeded(5);
        let mut r = ActionRecorder::with_config(RecorderConfig {
            max_ticks_per_interval: Some(2),
        });
        r.start(ModelSnapshot::default(), "v", Platform::Desktop, &rng)
            .unwrap();
        r.note_background_ticks(1, orch(0.0), &rng).unwrap();
        assert_eq!(r.action_count(), 0);
        r.note_background_ticks(1, orch(0.0), &rng).unwrap();
        assert_eq!(r.action_count(), 1);
        assert_eq!(r.pending_ticks(), 0);
    }

    #[test]
    fn zero_ticks_are_ignored() {
        let rng = SimRng::seeded(5);
        let mut r = started(&rng);
        r.note_background_ticks(0, orch(0.0), &rng).unwrap();
        r.flush_intervals();
        assert_eq!(r.action_count(), 0);
    }

    #[test]
    fn session_copy_is_unsealed_and_non_destructive() {
        let rng = SimRng::seeded(5);
        let mut r = started(&rng);
        r.record(
            ActionInput::new(ActionKind::SelectTarget).subject("p1"),
            orch(0.0),
            ModelSnapshot::default(),
            &rng,
        )
        .unwrap();
        let copy = r.session().unwrap();
        assert!(copy.final_state.is_none());
        assert_eq!(copy.actions.len(), 1);
        assert!(r.is_recording());
    }
}
