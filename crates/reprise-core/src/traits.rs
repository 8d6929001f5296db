//! Host-facing traits.
//!
//! These are the only points where the engine touches the simulation it
//! records and replays. A GUI host implements them with real input
//! synthesis against its rendering layer; a headless host can satisfy
//! them with plain function calls against an in-memory model.

use crate::draw::DrawRecord;
use crate::error::InputError;
use crate::id::SubjectId;
use crate::snapshot::{ModelSnapshot, OrchestratorSnapshot};

/// A point in host screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl ScreenPoint {
    /// Construct a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Result of a synthesized click.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClickResult {
    /// Whether the click landed on something actionable.
    pub success: bool,
    /// Short machine-oriented error, when `success` is false.
    pub error: Option<String>,
    /// Longer human-readable explanation.
    pub message: Option<String>,
}

impl ClickResult {
    /// A click that landed.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            message: None,
        }
    }

    /// A click that did not land.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            message: None,
        }
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Convert into a `Result`, folding `error` and `message` together.
    pub fn into_result(self) -> Result<(), InputError> {
        if self.success {
            return Ok(());
        }
        let reason = match (self.error, self.message) {
            (Some(e), Some(m)) => format!("{e} ({m})"),
            (Some(e), None) => e,
            (None, Some(m)) => m,
            (None, None) => "host rejected click".to_string(),
        };
        Err(InputError::ClickFailed { reason })
    }
}

/// Location of an action inside the currently open menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuSlot {
    /// Zero-based slice index of the action.
    pub slice_index: usize,
    /// Total number of slices in the menu.
    pub item_count: usize,
}

/// Input surface of the host: positions, synthetic input, and the
/// asynchronous presentation effects playback has to wait out.
pub trait HostInput {
    /// Screen position of a subject, or `None` if it is not on screen.
    fn subject_screen_position(&self, id: &SubjectId) -> Option<ScreenPoint>;

    /// Center of the open menu, or `None` if no menu is open.
    fn menu_center(&self) -> Option<ScreenPoint>;

    /// Screen position of slice `index` in a menu of `item_count` slices.
    fn menu_slice_position(&self, index: usize, center: ScreenPoint, item_count: usize)
        -> ScreenPoint;

    /// Screen position of the view toggle control, if the host has one.
    fn view_toggle_position(&self) -> Option<ScreenPoint>;

    /// Move the (virtual) pointer to `at`.
    fn simulate_hover(&mut self, at: ScreenPoint);

    /// Click at a screen position.
    fn simulate_click_at_position(&mut self, at: ScreenPoint) -> ClickResult;

    /// Click directly on a subject.
    fn simulate_click_on_subject(&mut self, id: &SubjectId) -> ClickResult;

    /// Whether a view transition is still running.
    fn is_view_transitioning(&self) -> bool;

    /// Whether queued operations (e.g. blends) are still pending.
    fn has_pending_queued_operations(&self) -> bool;

    /// Whether exit animations are still running.
    fn has_active_exit_animations(&self) -> bool;

    /// Locate an action in the open menu.
    fn find_action_in_open_menu(&self, action_id: &str) -> Option<MenuSlot>;
}

/// Snapshot of the host background engine's bookkeeping, for diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackgroundDiagnostics {
    /// Total ticks applied since the host was created.
    pub ticks_applied: u64,
    /// Whether passive advancement is currently suspended.
    pub suspended: bool,
    /// Free-form host detail.
    pub detail: String,
}

/// Background time surface of the host.
pub trait HostBackground {
    /// Apply exactly `count` background ticks, instantaneously.
    fn advance_background_ticks(&mut self, count: u32);

    /// Diagnostics for logging and failure reports.
    fn background_diagnostics(&self) -> BackgroundDiagnostics;

    /// Suspend or resume passive, wall-clock-driven advancement.
    fn set_background_suspended(&mut self, suspended: bool);
}

/// Model access surface of the host.
pub trait HostModel {
    /// Current model snapshot.
    fn model_snapshot(&self) -> ModelSnapshot;

    /// Current orchestrator snapshot.
    fn orchestrator_snapshot(&self) -> OrchestratorSnapshot;

    /// Overwrite the orchestrator state with `snapshot`.
    fn restore_orchestrator_snapshot(&mut self, snapshot: &OrchestratorSnapshot);

    /// Seed of the host RNG, or `None` for a live (non-seeded) RNG.
    fn rng_seed(&self) -> Option<u32>;

    /// Number of draws the host RNG has produced.
    fn rng_call_count(&self) -> u64;

    /// Every draw the host RNG has produced, in order.
    fn rng_call_log(&self) -> &[DrawRecord];

    /// Outstanding transient messages (e.g. unread notifications).
    fn pending_notifications(&self) -> Vec<String>;
}

/// How a playback run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunEnd {
    /// Every action replayed and verified.
    Finished,
    /// The run was cancelled before finishing.
    Cancelled,
    /// The run halted on a desynchronization or input failure.
    Failed,
}

/// Summary handed to the operator surface when a run ends.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// How the run ended.
    pub end: RunEnd,
    /// Actions replayed successfully.
    pub actions_completed: usize,
    /// Actions in the session.
    pub total_actions: usize,
    /// Human-readable diagnosis, when there is one.
    pub detail: Option<String>,
}

/// Operator controls and cosmetic feedback. Every method defaults to a
/// no-op so headless hosts only implement what they display.
pub trait OperatorSurface {
    /// Show pause/resume/dismiss/skip controls.
    fn show_playback_controls(&mut self) {}

    /// Remove the playback controls.
    fn hide_playback_controls(&mut self) {}

    /// Progress feedback after each completed action.
    fn playback_progress(&mut self, _completed: usize, _total: usize) {}

    /// Called exactly once when a run ends.
    fn playback_finished(&mut self, _summary: &RunSummary) {}

    /// Called with `true` before each synthetic input the controller
    /// delivers and with `false` after it. State changes made between the
    /// two calls are the controller's own and are not out-of-band.
    fn synthetic_input(&mut self, _active: bool) {}
}

/// Maps subject ids to human-readable names for diagnostics.
pub trait NameResolver {
    /// Display name for `id`.
    fn display_name(&self, id: &SubjectId) -> String;
}

impl NameResolver for ModelSnapshot {
    fn display_name(&self, id: &SubjectId) -> String {
        match self.subjects.get(id) {
            Some(subject) if !subject.name.is_empty() => subject.name.clone(),
            _ => id.to_string(),
        }
    }
}
