//! Data types of a recorded session.
//!
//! The JSON form uses camelCase keys. Optional fields are omitted when
//! absent and default when missing, so hand-written sessions only need
//! the keys they care about.

use std::fmt;

use reprise_core::{ModelSnapshot, OrchestratorSnapshot, SubjectId};
use serde::{Deserialize, Serialize};

/// Identifier of a recorded action.
///
/// Serialized as a bare string. Anything other than the three built-in
/// identifiers names an action chosen from a subject's open menu.
///
/// # Examples
///
/// ```
/// use reprise_replay::ActionKind;
///
/// assert_eq!(ActionKind::from("select_a_target"), ActionKind::SelectTarget);
/// assert_eq!(ActionKind::from("blend"), ActionKind::Menu("blend".into()));
/// assert_eq!(ActionKind::ProcessIntervals.as_str(), "process_intervals");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    /// Click a subject to make it a target.
    SelectTarget,
    /// Toggle between panorama and foreground view.
    ToggleView,
    /// Pseudo-action covering background ticks between user actions.
    ProcessIntervals,
    /// An action picked from the open menu of a subject.
    Menu(String),
}

impl ActionKind {
    /// Wire identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SelectTarget => "select_a_target",
            Self::ToggleView => "toggle_view",
            Self::ProcessIntervals => "process_intervals",
            Self::Menu(id) => id,
        }
    }

    /// Whether this is the background-interval pseudo-action.
    pub fn is_interval(&self) -> bool {
        matches!(self, Self::ProcessIntervals)
    }
}

impl From<&str> for ActionKind {
    fn from(s: &str) -> Self {
        match s {
            "select_a_target" => Self::SelectTarget,
            "toggle_view" => Self::ToggleView,
            "process_intervals" => Self::ProcessIntervals,
            other => Self::Menu(other.to_string()),
        }
    }
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "select_a_target" | "toggle_view" | "process_intervals" => Self::from(s.as_str()),
            _ => Self::Menu(s),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Menu(id) => id,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RNG call counts captured after an action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngCounts {
    /// Draws made by the model RNG since it was seeded.
    pub model: u64,
}

/// A draw as stored in a session: label and value, no index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedDraw {
    /// Diagnostic label.
    pub label: String,
    /// Drawn value.
    pub value: f64,
}

impl From<&reprise_core::DrawRecord> for LoggedDraw {
    fn from(record: &reprise_core::DrawRecord) -> Self {
        Self {
            label: record.label.clone(),
            value: record.value,
        }
    }
}

/// One completed action of a recorded session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAction {
    /// What was done.
    pub action: ActionKind,
    /// Subject the action was applied to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<SubjectId>,
    /// Second subject, for actions that take a target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cloud_id: Option<SubjectId>,
    /// Sub-item chosen after the action (e.g. which field to ask about).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Tick count of a `process_intervals` pseudo-action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// RNG call counts right after the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_counts: Option<RngCounts>,
    /// Draws made since the previous recorded entry.
    #[serde(default)]
    pub rng_log: Vec<LoggedDraw>,
    /// Model state right after the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_state: Option<ModelSnapshot>,
    /// Orchestrator state. For user actions this is captured before the
    /// action; for intervals, before the first tick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orch_state: Option<OrchestratorSnapshot>,
}

impl RecordedAction {
    /// An action with every optional field absent.
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            cloud_id: None,
            target_cloud_id: None,
            field: None,
            count: None,
            rng_counts: None,
            rng_log: Vec::new(),
            model_state: None,
            orch_state: None,
        }
    }

    /// A `process_intervals` pseudo-action covering `count` ticks.
    pub fn intervals(count: u32) -> Self {
        Self {
            count: Some(count),
            ..Self::new(ActionKind::ProcessIntervals)
        }
    }

    /// Whether this is a background-interval pseudo-action.
    pub fn is_interval(&self) -> bool {
        self.action.is_interval()
    }
}

/// Platform the session was recorded on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Touch device.
    Mobile,
    /// Pointer device.
    #[default]
    Desktop,
}

/// A complete recording.
///
/// # Examples
///
/// ```
/// use reprise_replay::{from_json_str, ActionKind};
///
/// let session = from_json_str(r#"{
///     "seed": 42,
///     "actions": [
///         { "action": "select_a_target", "cloudId": "p1",
///           "rngCounts": { "model": 0 },
///           "modelState": { "targets": ["p1"], "blended": [] } }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(session.seed, 42);
/// assert_eq!(session.actions[0].action, ActionKind::SelectTarget);
/// assert!(session.final_state.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedSession {
    /// Model state when recording started.
    #[serde(default)]
    pub initial_state: ModelSnapshot,
    /// Model state when recording stopped; absent for unsealed sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_state: Option<ModelSnapshot>,
    /// Seed of the model RNG.
    pub seed: u32,
    /// Build identifier of the recording program.
    #[serde(default)]
    pub code_version: String,
    /// Platform the session was recorded on.
    #[serde(default)]
    pub platform: Platform,
    /// Recorded actions, in order.
    #[serde(default)]
    pub actions: Vec<RecordedAction>,
}

impl RecordedSession {
    /// Number of user actions (interval pseudo-actions excluded).
    pub fn user_action_count(&self) -> usize {
        self.actions.iter().filter(|a| !a.is_interval()).count()
    }

    /// Total background ticks across all interval pseudo-actions.
    pub fn interval_ticks(&self) -> u64 {
        self.actions
            .iter()
            .filter(|a| a.is_interval())
            .filter_map(|a| a.count)
            .map(u64::from)
            .sum()
    }

    /// Whether the session was sealed with a final snapshot.
    pub fn is_sealed(&self) -> bool {
        self.final_state.is_some()
    }
}
