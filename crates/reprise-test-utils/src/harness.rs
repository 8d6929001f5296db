//! [`RecordingHarness`]: scripted recording against a [`MockSimulation`].
//!
//! Each helper performs one user action the way an operator would
//! (clicks through the host input surface), lets animations settle, and
//! reports the action to an [`ActionRecorder`]. Idle time runs the
//! simulation's passive background and reports the ticks it applied.

use reprise_core::{HostInput, HostModel, InputError, SubjectId};
use reprise_replay::{
    ActionInput, ActionKind, ActionRecorder, Platform, RecordedSession, RecorderError,
};

use crate::mock::MockSimulation;

/// Frame length used while recording.
pub const FRAME_SECS: f64 = 0.25;
const SETTLE_FRAME_LIMIT: usize = 1_000;

/// Errors from a scripted recording step.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Recorder(#[from] RecorderError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("simulation did not settle within {0} frames")]
    NeverSettled(usize),
}

/// Drives a [`MockSimulation`] while recording it.
pub struct RecordingHarness {
    sim: MockSimulation,
    recorder: ActionRecorder,
}

impl RecordingHarness {
    /// Start recording a fresh simulation seeded with `seed`.
    pub fn new(seed: u32) -> Result<Self, HarnessError> {
        Self::with_recorder(MockSimulation::new(seed), ActionRecorder::new())
    }

    /// Start recording `sim` with `recorder`.
    pub fn with_recorder(
        sim: MockSimulation,
        mut recorder: ActionRecorder,
    ) -> Result<Self, HarnessError> {
        recorder.start(
            sim.model_snapshot(),
            env!("CARGO_PKG_VERSION"),
            Platform::Desktop,
            sim.rng(),
        )?;
        Ok(Self { sim, recorder })
    }

    /// The simulation being recorded.
    pub fn sim(&self) -> &MockSimulation {
        &self.sim
    }

    /// The recorder.
    pub fn recorder(&self) -> &ActionRecorder {
        &self.recorder
    }

    /// Let `secs` of idle time pass, reporting background ticks.
    pub fn idle(&mut self, secs: f64) -> Result<&mut Self, HarnessError> {
        let frames = (secs / FRAME_SECS).round() as usize;
        for _ in 0..frames {
            self.frame()?;
        }
        Ok(self)
    }

    /// Click `id` to target it.
    pub fn select(&mut self, id: &str) -> Result<&mut Self, HarnessError> {
        let subject = SubjectId::from(id);
        let orch = self.sim.orchestrator_snapshot();
        self.sim.simulate_click_on_subject(&subject).into_result()?;
        self.settle()?;
        self.record(ActionInput::new(ActionKind::SelectTarget).subject(subject), orch)
    }

    /// Toggle the view mode.
    pub fn toggle_view(&mut self) -> Result<&mut Self, HarnessError> {
        let orch = self.sim.orchestrator_snapshot();
        let at = self
            .sim
            .view_toggle_position()
            .ok_or(InputError::NoViewToggle)?;
        self.sim.simulate_click_at_position(at).into_result()?;
        self.settle()?;
        self.record(ActionInput::new(ActionKind::ToggleView), orch)
    }

    /// Choose `action` from the menu of `id`, then the optional `field`
    /// item and the optional `target` subject.
    pub fn menu(
        &mut self,
        id: &str,
        action: &str,
        field: Option<&str>,
        target: Option<&str>,
    ) -> Result<&mut Self, HarnessError> {
        let subject = SubjectId::from(id);
        let orch = self.sim.orchestrator_snapshot();

        self.sim.simulate_click_on_subject(&subject).into_result()?;
        self.choose(action)?;
        let mut input = ActionInput::new(ActionKind::from(action)).subject(subject);
        if let Some(field) = field {
            self.choose(field)?;
            input = input.field(field);
        }
        if let Some(target) = target {
            let target = SubjectId::from(target);
            self.sim.simulate_click_on_subject(&target).into_result()?;
            input = input.target(target);
        }
        self.settle()?;
        self.record(input, orch)
    }

    /// Stop recording and return the sealed session.
    pub fn finish(mut self) -> Result<(RecordedSession, MockSimulation), HarnessError> {
        self.settle()?;
        let session = self.recorder.stop(self.sim.model_snapshot())?;
        Ok((session, self.sim))
    }

    fn choose(&mut self, item: &str) -> Result<(), HarnessError> {
        let slot = self
            .sim
            .find_action_in_open_menu(item)
            .ok_or_else(|| InputError::MenuItemMissing(item.to_string()))?;
        let center = self.sim.menu_center().ok_or(InputError::MenuNotOpen)?;
        let at = self
            .sim
            .menu_slice_position(slot.slice_index, center, slot.item_count);
        self.sim.simulate_click_at_position(at).into_result()?;
        Ok(())
    }

    fn frame(&mut self) -> Result<(), HarnessError> {
        let orch_before = self.sim.orchestrator_snapshot();
        let before = self.sim.ticks_applied();
        self.sim.frame(FRAME_SECS);
        let ticks = self.sim.ticks_applied() - before;
        if ticks > 0 {
            self.recorder
                .note_background_ticks(ticks as u32, orch_before, self.sim.rng())?;
        }
        Ok(())
    }

    fn settle(&mut self) -> Result<(), HarnessError> {
        for _ in 0..SETTLE_FRAME_LIMIT {
            if !self.sim.is_busy() {
                return Ok(());
            }
            self.frame()?;
        }
        Err(HarnessError::NeverSettled(SETTLE_FRAME_LIMIT))
    }

    fn record(
        &mut self,
        input: ActionInput,
        orch: reprise_core::OrchestratorSnapshot,
    ) -> Result<&mut Self, HarnessError> {
        self.recorder
            .record(input, orch, self.sim.model_snapshot(), self.sim.rng())?;
        Ok(self)
    }
}
