//! Value-only snapshots of simulation state.
//!
//! [`ModelSnapshot`] is the verifiable part of the host's state: every
//! quantity the synchronization verifier may compare after an action.
//! [`OrchestratorSnapshot`] is the timer-valued state of the host's
//! background engine, kept as an opaque JSON object so that it can be
//! restored verbatim before replaying elapsed background time.
//!
//! Snapshots are never partial in memory. When a hand-written session
//! file omits a field, deserialization fills in its default value.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::SubjectId;

/// Deep copy of the host model at one instant.
///
/// # Examples
///
/// ```
/// use reprise_core::{ModelSnapshot, SubjectId};
///
/// let snap: ModelSnapshot =
///     serde_json::from_str(r#"{"targets":["p1"],"blended":[]}"#).unwrap();
/// assert!(snap.targets.contains("p1"));
/// assert!(snap.blended.is_empty());
/// assert_eq!(snap.self_ray, None::<SubjectId>);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSnapshot {
    /// Subjects currently targeted by the operator.
    pub targets: BTreeSet<SubjectId>,
    /// Subjects currently blended.
    pub blended: BTreeSet<SubjectId>,
    /// Subjects with a blend queued but not yet applied.
    pub pending_blends: BTreeSet<SubjectId>,
    /// Current self-focus target, if any.
    pub self_ray: Option<SubjectId>,
    /// Action awaiting a second selection (e.g. a target subject).
    pub pending_action: Option<String>,
    /// Derived per-subject properties.
    pub subjects: BTreeMap<SubjectId, SubjectSnapshot>,
    /// Pairwise relation summaries.
    pub relations: Vec<RelationSnapshot>,
    /// Conversation state.
    pub conversation: ConversationSnapshot,
    /// View (camera) state.
    pub view: ViewSnapshot,
}

impl ModelSnapshot {
    /// Look up a relation summary by ordered pair.
    pub fn relation(&self, from: &SubjectId, to: &SubjectId) -> Option<&RelationSnapshot> {
        self.relations
            .iter()
            .find(|r| &r.from == from && &r.to == to)
    }
}

/// Derived properties of one subject.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectSnapshot {
    /// Display name used in diagnostics.
    pub name: String,
    /// Trust-like score.
    pub trust: f64,
    /// Attention-like score.
    pub needs_attention: f64,
    /// Whether the subject's identity has been revealed.
    pub identity_revealed: bool,
    /// Whether the subject's job has been revealed.
    pub job_revealed: bool,
    /// Whether the subject's age has been revealed.
    pub age_revealed: bool,
}

/// Summary of the directed relation `from → to`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationSnapshot {
    /// Source subject.
    pub from: SubjectId,
    /// Destination subject.
    pub to: SubjectId,
    /// Trust-like score of the relation.
    pub trust: f64,
}

/// Phase of the current conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// No conversation in progress.
    #[default]
    Idle,
    /// The operator is listening to a participant.
    Listening,
    /// A participant is speaking.
    Speaking,
    /// The conversation reached a resolution.
    Resolved,
}

/// Conversation state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationSnapshot {
    /// Current phase.
    pub phase: ConversationPhase,
    /// Subjects taking part.
    pub participants: BTreeSet<SubjectId>,
}

/// Camera mode of the host view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Wide view of every subject.
    #[default]
    Panorama,
    /// Close-up of the targeted subjects.
    Foreground,
}

/// View state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewSnapshot {
    /// Current camera mode.
    pub mode: ViewMode,
}

/// Opaque timer and cooldown state of the host's background engine.
///
/// Stored as a JSON object. The engine never interprets it beyond its
/// numeric leaves, which the verifier compares with a tolerance.
///
/// # Examples
///
/// ```
/// use reprise_core::OrchestratorSnapshot;
/// use serde_json::json;
///
/// let mut orch = OrchestratorSnapshot::new();
/// orch.insert("regulationScore", 0.5);
/// orch.insert("blendTimers", json!({ "p1": 3.0 }));
///
/// let leaves = orch.numeric_leaves();
/// assert_eq!(leaves["regulationScore"], 0.5);
/// assert_eq!(leaves["blendTimers.p1"], 3.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrchestratorSnapshot(Map<String, Value>);

impl OrchestratorSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap an existing JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the snapshot, returning the JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Insert or replace a top-level entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Read a top-level entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every numeric leaf, keyed by its dotted path.
    ///
    /// Nested objects contribute `parent.child` paths; arrays contribute
    /// `parent.0`, `parent.1`, ... Non-numeric leaves are skipped.
    pub fn numeric_leaves(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for (key, value) in &self.0 {
            collect_numeric(key.clone(), value, &mut out);
        }
        out
    }
}

fn collect_numeric(path: String, value: &Value, out: &mut BTreeMap<String, f64>) {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_f64() {
                out.insert(path, v);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                collect_numeric(format!("{path}.{key}"), child, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_numeric(format!("{path}.{i}"), child, out);
            }
        }
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}
