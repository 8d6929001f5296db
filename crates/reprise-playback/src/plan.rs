//! Execution plans.
//!
//! A recorded user action replays as an ordered list of [`Step`]s:
//! synthetic inputs, fixed settle delays, and bounded awaits on the
//! host's asynchronous presentation effects.

use std::collections::VecDeque;

use reprise_core::{HostInput, SubjectId};
use reprise_replay::{ActionKind, RecordedAction};

/// A host effect an await step waits out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitCondition {
    /// A view transition is running.
    ViewTransition,
    /// Queued operations (e.g. blends) are pending.
    QueuedOperations,
    /// Exit animations are running.
    ExitAnimations,
}

impl WaitCondition {
    /// Whether the host is still busy with this effect.
    pub fn is_pending<H: HostInput + ?Sized>(self, host: &H) -> bool {
        match self {
            Self::ViewTransition => host.is_view_transitioning(),
            Self::QueuedOperations => host.has_pending_queued_operations(),
            Self::ExitAnimations => host.has_active_exit_animations(),
        }
    }

    /// Short name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViewTransition => "view transition",
            Self::QueuedOperations => "queued operations",
            Self::ExitAnimations => "exit animations",
        }
    }
}

/// One step of an execution plan.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Hover over a subject and click it.
    ClickSubject(SubjectId),
    /// Hover over an item of the open menu and click it.
    ChooseMenuItem(String),
    /// Hover over the view toggle and click it.
    ClickViewToggle,
    /// Wait a fixed number of seconds.
    Settle(f64),
    /// Poll until the condition clears or the wait budget runs out.
    Await(WaitCondition),
}

/// An action that cannot be turned into a plan.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The action needs a subject but none was recorded.
    #[error("'{0}' has no cloudId")]
    MissingSubject(String),
    /// Interval pseudo-actions replay without input synthesis.
    #[error("process_intervals is not an input action")]
    NotAnInputAction,
}

/// Build the plan replaying `action`.
///
/// `menu_settle` is the delay between opening a menu and choosing from it.
pub fn build_plan(action: &RecordedAction, menu_settle: f64) -> Result<VecDeque<Step>, PlanError> {
    let subject = || {
        action
            .cloud_id
            .clone()
            .ok_or_else(|| PlanError::MissingSubject(action.action.to_string()))
    };

    let mut plan = VecDeque::new();
    match &action.action {
        ActionKind::ProcessIntervals => return Err(PlanError::NotAnInputAction),
        ActionKind::SelectTarget => {
            plan.push_back(Step::ClickSubject(subject()?));
            push_awaits(&mut plan, &ALL_EFFECTS);
        }
        ActionKind::ToggleView => {
            plan.push_back(Step::ClickViewToggle);
            push_awaits(
                &mut plan,
                &[WaitCondition::ViewTransition, WaitCondition::ExitAnimations],
            );
        }
        ActionKind::Menu(item) => {
            plan.push_back(Step::ClickSubject(subject()?));
            plan.push_back(Step::Settle(menu_settle));
            plan.push_back(Step::ChooseMenuItem(item.clone()));
            if let Some(field) = &action.field {
                plan.push_back(Step::Settle(menu_settle));
                plan.push_back(Step::ChooseMenuItem(field.clone()));
            }
            if let Some(target) = &action.target_cloud_id {
                plan.push_back(Step::ClickSubject(target.clone()));
            }
            push_awaits(&mut plan, &ALL_EFFECTS);
        }
    }
    Ok(plan)
}

const ALL_EFFECTS: [WaitCondition; 3] = [
    WaitCondition::ViewTransition,
    WaitCondition::QueuedOperations,
    WaitCondition::ExitAnimations,
];

fn push_awaits(plan: &mut VecDeque<Step>, conditions: &[WaitCondition]) {
    plan.extend(conditions.iter().copied().map(Step::Await));
}
