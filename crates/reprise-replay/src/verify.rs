//! Synchronization verification.
//!
//! After each replayed action the live state is compared with what was
//! recorded. Every check runs, so a single failure lists every diverged
//! field rather than the first one found.
//!
//! Model fields go through a small rule-per-field visitor:
//! sets compare unordered and report missing and extra members, scores
//! compare within a tolerance, everything else compares exactly. When
//! the recorded and live model hashes agree the model rules are skipped.
//!
//! The view mode is recorded but never compared: it tracks presentation
//! timing, not simulation state.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use reprise_core::{
    ConversationPhase, DrawRecord, ModelSnapshot, NameResolver, OrchestratorSnapshot, SubjectId,
};

use crate::hash::snapshot_hash;
use crate::types::{LoggedDraw, RecordedAction};

/// Comparison tolerances.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifyConfig {
    /// Absolute tolerance for trust-like and attention-like scores.
    pub score_tolerance: f64,
    /// Absolute tolerance for orchestrator timers.
    pub timer_tolerance: f64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            score_tolerance: 0.001,
            timer_tolerance: 0.01,
        }
    }
}

/// Live host state to compare against a recorded action.
#[derive(Clone, Copy, Debug)]
pub struct LiveState<'a> {
    /// Model state after the action.
    pub model: &'a ModelSnapshot,
    /// Orchestrator state captured at the same point the recording did
    /// (before the action). `None` skips the orchestrator check.
    pub orchestrator: Option<&'a OrchestratorSnapshot>,
    /// Host RNG call count after the action.
    pub rng_count: u64,
    /// Host RNG draws since the previous action.
    pub rng_draws: &'a [DrawRecord],
    /// Outstanding host notifications, appended to failure text.
    pub notifications: &'a [String],
}

/// One diverged field.
#[derive(Clone, Debug, PartialEq)]
pub struct Mismatch {
    /// Which field, e.g. `targets` or `Critic.trust`.
    pub field: String,
    /// Expected versus actual, human-readable.
    pub detail: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.detail)
    }
}

/// Live state diverged from the recording.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{description}")]
pub struct SyncFailure {
    /// Every diverged field, in check order.
    pub mismatches: Vec<Mismatch>,
    /// Mismatches joined by `"; "`, plus outstanding notifications.
    pub description: String,
}

impl SyncFailure {
    fn new(mismatches: Vec<Mismatch>, notifications: &[String]) -> Self {
        let mut description = mismatches
            .iter()
            .map(Mismatch::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        if !notifications.is_empty() {
            description.push_str(&format!(
                "; notifications: [{}]",
                notifications.join(", ")
            ));
        }
        Self {
            mismatches,
            description,
        }
    }

    /// Whether any mismatch concerns `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.mismatches.iter().any(|m| m.field == field)
    }
}

/// Compares live state with recorded actions.
#[derive(Clone, Debug, Default)]
pub struct SyncVerifier {
    config: VerifyConfig,
}

impl SyncVerifier {
    /// Create a verifier with the given tolerances.
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    /// The tolerances in use.
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Verify a user action. Checks that have no recorded counterpart
    /// (no `rng_counts`, no `model_state`, no `orch_state`) are skipped.
    pub fn verify_action(
        &self,
        recorded: &RecordedAction,
        live: &LiveState<'_>,
    ) -> Result<(), SyncFailure> {
        let mut mismatches = Vec::new();

        if let Some(counts) = recorded.rng_counts {
            check_rng(
                counts.model,
                &recorded.rng_log,
                live.rng_count,
                live.rng_draws,
                &mut mismatches,
            );
        }

        if let Some(expected) = &recorded.model_state {
            self.diff_models(expected, live.model, &mut mismatches);
        }

        if let (Some(expected), Some(actual)) = (&recorded.orch_state, live.orchestrator) {
            self.diff_orchestrator(expected, actual, &mut mismatches);
        }

        finish(mismatches, live.notifications)
    }

    /// Verify a `process_intervals` pseudo-action: RNG count only.
    /// Outstanding `notifications` are appended to a failure description.
    pub fn verify_interval(
        &self,
        recorded: &RecordedAction,
        rng_count: u64,
        rng_draws: &[DrawRecord],
        notifications: &[String],
    ) -> Result<(), SyncFailure> {
        let mut mismatches = Vec::new();
        if let Some(counts) = recorded.rng_counts {
            check_rng(
                counts.model,
                &recorded.rng_log,
                rng_count,
                rng_draws,
                &mut mismatches,
            );
        }
        finish(mismatches, notifications)
    }

    /// Compare two model snapshots, e.g. a session's final state with
    /// the live state after the last action.
    pub fn verify_final(
        &self,
        expected: &ModelSnapshot,
        live: &ModelSnapshot,
        notifications: &[String],
    ) -> Result<(), SyncFailure> {
        let mut mismatches = Vec::new();
        self.diff_models(expected, live, &mut mismatches);
        finish(mismatches, notifications)
    }

    fn diff_models(&self, expected: &ModelSnapshot, live: &ModelSnapshot, out: &mut Vec<Mismatch>) {
        if snapshot_hash(expected) == snapshot_hash(live) {
            return;
        }
        let mut d = Differ {
            names: Names { expected, live },
            out,
        };
        let tol = self.config.score_tolerance;

        // Sets.
        d.set("targets", &expected.targets, &live.targets);
        d.set("blended", &expected.blended, &live.blended);
        d.set("pendingBlends", &expected.pending_blends, &live.pending_blends);
        d.set(
            "conversation.participants",
            &expected.conversation.participants,
            &live.conversation.participants,
        );

        // Per-subject, over recorded subjects only.
        for (id, want) in &expected.subjects {
            let name = d.names.name(id);
            let Some(got) = live.subjects.get(id) else {
                d.push(name, "missing from live state".to_string());
                continue;
            };
            d.exact(
                format!("{name}.identityRevealed"),
                &want.identity_revealed,
                &got.identity_revealed,
            );
            d.exact(format!("{name}.jobRevealed"), &want.job_revealed, &got.job_revealed);
            d.exact(format!("{name}.ageRevealed"), &want.age_revealed, &got.age_revealed);
            d.within(format!("{name}.trust"), want.trust, got.trust, tol);
            d.within(
                format!("{name}.needsAttention"),
                want.needs_attention,
                got.needs_attention,
                tol,
            );
        }

        for want in &expected.relations {
            let field = format!(
                "relation {}->{}",
                d.names.name(&want.from),
                d.names.name(&want.to)
            );
            match live.relation(&want.from, &want.to) {
                Some(got) => d.within(format!("{field}.trust"), want.trust, got.trust, tol),
                None => d.push(field, "missing from live state".to_string()),
            }
        }

        // Singletons.
        let self_ray = |s: &ModelSnapshot| d.names.optional(s.self_ray.as_ref());
        let (want_ray, got_ray) = (self_ray(expected), self_ray(live));
        d.exact("selfRay".to_string(), &want_ray, &got_ray);
        d.exact(
            "pendingAction".to_string(),
            &display_opt(expected.pending_action.as_deref()),
            &display_opt(live.pending_action.as_deref()),
        );
        d.exact(
            "conversation.phase".to_string(),
            &phase_name(expected.conversation.phase).to_string(),
            &phase_name(live.conversation.phase).to_string(),
        );
    }

    fn diff_orchestrator(
        &self,
        expected: &OrchestratorSnapshot,
        actual: &OrchestratorSnapshot,
        out: &mut Vec<Mismatch>,
    ) {
        let actual = actual.numeric_leaves();
        for (path, want) in expected.numeric_leaves() {
            if let Some(&got) = actual.get(&path) {
                if !within(want, got, self.config.timer_tolerance) {
                    out.push(Mismatch {
                        field: format!("orch.{path}"),
                        detail: format!("expected {want}, actual {got}"),
                    });
                }
            }
        }
    }
}

fn finish(mismatches: Vec<Mismatch>, notifications: &[String]) -> Result<(), SyncFailure> {
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(SyncFailure::new(mismatches, notifications))
    }
}

fn within(expected: f64, actual: f64, tolerance: f64) -> bool {
    // NaN on either side never matches.
    (expected - actual).abs() <= tolerance
}

fn display_opt(v: Option<&str>) -> String {
    v.map_or_else(|| "none".to_string(), str::to_string)
}

fn phase_name(phase: ConversationPhase) -> &'static str {
    match phase {
        ConversationPhase::Idle => "idle",
        ConversationPhase::Listening => "listening",
        ConversationPhase::Speaking => "speaking",
        ConversationPhase::Resolved => "resolved",
    }
}

// ── RNG ─────────────────────────────────────────────────────────

fn check_rng(
    expected: u64,
    recorded: &[LoggedDraw],
    actual: u64,
    live: &[DrawRecord],
    out: &mut Vec<Mismatch>,
) {
    if expected == actual {
        return;
    }
    let mut detail = format!("expected {expected}, actual {actual}");
    if !recorded.is_empty() || !live.is_empty() {
        detail.push_str(&format!(" ({})", label_delta(recorded, live)));
    }
    out.push(Mismatch {
        field: "rngCounts.model".to_string(),
        detail,
    });
}

/// Describe how the live draw labels differ from the recorded ones:
/// the first position where they disagree, then the labels missing from
/// and extra in the live draws, as multisets in first-seen order.
fn label_delta(recorded: &[LoggedDraw], live: &[DrawRecord]) -> String {
    let rec: Vec<&str> = recorded.iter().map(|d| d.label.as_str()).collect();
    let got: Vec<&str> = live.iter().map(|d| d.label.as_str()).collect();

    let first = (0..rec.len().max(got.len())).find(|&i| rec.get(i) != got.get(i));

    let mut balance: IndexMap<&str, i64> = IndexMap::new();
    for &label in &rec {
        *balance.entry(label).or_insert(0) += 1;
    }
    for &label in &got {
        *balance.entry(label).or_insert(0) -= 1;
    }
    let render = |sign: i64| {
        let items: Vec<String> = balance
            .iter()
            .filter(|(_, &n)| n * sign > 0)
            .map(|(label, &n)| match n.abs() {
                1 => (*label).to_string(),
                k => format!("{label} x{k}"),
            })
            .collect();
        format!("[{}]", items.join(", "))
    };

    let mut text = match first {
        Some(i) => format!(
            "first divergent draw #{i}: recorded {}, live {}",
            rec.get(i).copied().unwrap_or("<none>"),
            got.get(i).copied().unwrap_or("<none>"),
        ),
        None => "draw labels agree".to_string(),
    };
    text.push_str(&format!(" / missing {} / extra {}", render(1), render(-1)));
    text
}

// ── Model diffing ───────────────────────────────────────────────

/// Resolves ids to names, preferring the live snapshot.
struct Names<'a> {
    expected: &'a ModelSnapshot,
    live: &'a ModelSnapshot,
}

impl Names<'_> {
    fn name(&self, id: &SubjectId) -> String {
        if self.live.subjects.contains_key(id) {
            self.live.display_name(id)
        } else {
            self.expected.display_name(id)
        }
    }

    fn optional(&self, id: Option<&SubjectId>) -> String {
        id.map_or_else(|| "none".to_string(), |id| self.name(id))
    }
}

/// Rule-per-field visitor collecting mismatches.
struct Differ<'a, 'o> {
    names: Names<'a>,
    out: &'o mut Vec<Mismatch>,
}

impl Differ<'_, '_> {
    fn push(&mut self, field: String, detail: String) {
        self.out.push(Mismatch { field, detail });
    }

    /// Unordered membership.
    fn set(&mut self, field: &str, expected: &BTreeSet<SubjectId>, actual: &BTreeSet<SubjectId>) {
        if expected == actual {
            return;
        }
        let missing: Vec<String> = expected
            .difference(actual)
            .map(|id| self.names.name(id))
            .collect();
        let extra: Vec<String> = actual
            .difference(expected)
            .map(|id| self.names.name(id))
            .collect();
        let mut parts = Vec::with_capacity(2);
        if !missing.is_empty() {
            parts.push(format!("missing [{}]", missing.join(", ")));
        }
        if !extra.is_empty() {
            parts.push(format!("extra [{}]", extra.join(", ")));
        }
        self.push(field.to_string(), parts.join(", "));
    }

    fn exact<T: PartialEq + fmt::Display>(&mut self, field: String, expected: &T, actual: &T) {
        if expected != actual {
            self.push(field, format!("expected {expected}, actual {actual}"));
        }
    }

    fn within(&mut self, field: String, expected: f64, actual: f64, tolerance: f64) {
        if !within(expected, actual, tolerance) {
            self.push(field, format!("expected {expected}, actual {actual}"));
        }
    }
}
