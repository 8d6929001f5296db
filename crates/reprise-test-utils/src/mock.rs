//! [`MockSimulation`]: a small, fully deterministic host.
//!
//! Three subjects sit on a fixed grid. Clicking one targets it and, from
//! the panorama, starts a timed transition to the foreground view.
//! Clicking a targeted subject in the foreground opens its radial menu.
//! Menu actions mutate scores and flags, some after a timed delay, and a
//! background orchestrator ticks once per second of idle time.
//!
//! All durations are in seconds and advance only through
//! [`MockSimulation::frame`].

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::TAU;

use reprise_core::{
    BackgroundDiagnostics, ClickResult, ConversationPhase, ConversationSnapshot, DrawRecord,
    HostBackground, HostInput, HostModel, MenuSlot, ModelSnapshot, OperatorSurface,
    OrchestratorSnapshot, RelationSnapshot, RunSummary, ScreenPoint, SubjectId, SubjectSnapshot,
    ViewMode, ViewSnapshot,
};
use reprise_rng::SimRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Duration of a panorama/foreground transition.
pub const VIEW_TRANSITION_SECS: f64 = 0.5;
/// Delay between choosing `blend` and the blend applying.
pub const BLEND_QUEUE_SECS: f64 = 0.6;
/// Duration of an exit animation (`separate`, `step_back`).
pub const EXIT_ANIMATION_SECS: f64 = 0.4;
/// Idle time per background tick.
pub const TICK_SECS: f64 = 1.0;
/// Radius of the radial menu.
pub const MENU_RADIUS: f64 = 80.0;

/// Root menu of a targeted subject, in slice order.
pub const ROOT_MENU: [&str; 7] = [
    "job",
    "feel_toward",
    "blend",
    "separate",
    "ask_about",
    "self_ray",
    "step_back",
];
/// Fields offered after `ask_about`.
pub const ASK_ABOUT_MENU: [&str; 2] = ["identity", "age"];

const SUBJECTS: [(&str, &str, f64, f64, f64); 3] = [
    ("p1", "Critic", 200.0, 300.0, 0.5),
    ("p2", "Fan", 400.0, 300.0, 0.4),
    ("p3", "Skeptic", 600.0, 300.0, 0.3),
];
const VIEW_TOGGLE: ScreenPoint = ScreenPoint { x: 10.0, y: 10.0 };
const TOGGLE_HIT_RADIUS: f64 = 15.0;
const SUBJECT_HIT_RADIUS: f64 = 30.0;
const SLICE_HIT_RADIUS: f64 = 20.0;

/// Operator-surface calls observed by the mock.
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    ControlsShown,
    ControlsHidden,
    Progress { completed: usize, total: usize },
    Finished(RunSummary),
}

#[derive(Clone, Debug)]
struct Subject {
    name: String,
    position: ScreenPoint,
    trust: f64,
    needs_attention: f64,
    identity_revealed: bool,
    job_revealed: bool,
    age_revealed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuStage {
    Root,
    AskAbout,
}

#[derive(Clone, Debug)]
struct OpenMenu {
    subject: SubjectId,
    center: ScreenPoint,
    stage: MenuStage,
}

impl OpenMenu {
    fn items(&self) -> &'static [&'static str] {
        match self.stage {
            MenuStage::Root => &ROOT_MENU,
            MenuStage::AskAbout => &ASK_ABOUT_MENU,
        }
    }
}

/// Timer and cooldown state of the background engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Orchestrator {
    tick: u64,
    regulation_score: f64,
    phase_timer: f64,
    blend_timers: BTreeMap<SubjectId, f64>,
    cooldowns: BTreeMap<SubjectId, f64>,
}

/// Deterministic in-memory host.
#[derive(Clone, Debug)]
pub struct MockSimulation {
    rng: SimRng,
    subjects: BTreeMap<SubjectId, Subject>,
    targets: BTreeSet<SubjectId>,
    blended: BTreeSet<SubjectId>,
    pending_blends: BTreeMap<SubjectId, f64>,
    self_ray: Option<SubjectId>,
    pending_action: Option<(String, SubjectId)>,
    relations: BTreeMap<(SubjectId, SubjectId), f64>,
    conversation: ConversationSnapshot,
    view: ViewMode,
    transition: Option<(f64, ViewMode)>,
    exit_remaining: f64,
    menu: Option<OpenMenu>,
    orch: Orchestrator,
    passive_clock: f64,
    background_suspended: bool,
    ticks_applied: u64,
    notifications: Vec<String>,
    pointer: Option<ScreenPoint>,
    clicks: u64,
    synthetic_input: bool,
    synthetic_clicks: u64,
    stuck_transition: bool,
    reject_clicks: bool,
    ui_events: Vec<UiEvent>,
}

impl MockSimulation {
    /// A fresh simulation with a seeded RNG. Construction draws nothing.
    pub fn new(seed: u32) -> Self {
        Self::with_rng(SimRng::seeded(seed))
    }

    /// A fresh simulation using `rng`.
    pub fn with_rng(rng: SimRng) -> Self {
        let subjects = SUBJECTS
            .iter()
            .map(|&(id, name, x, y, trust)| {
                (
                    SubjectId::from(id),
                    Subject {
                        name: name.to_string(),
                        position: ScreenPoint::new(x, y),
                        trust,
                        needs_attention: 0.0,
                        identity_revealed: false,
                        job_revealed: false,
                        age_revealed: false,
                    },
                )
            })
            .collect();
        Self {
            rng,
            subjects,
            targets: BTreeSet::new(),
            blended: BTreeSet::new(),
            pending_blends: BTreeMap::new(),
            self_ray: None,
            pending_action: None,
            relations: BTreeMap::new(),
            conversation: ConversationSnapshot::default(),
            view: ViewMode::Panorama,
            transition: None,
            exit_remaining: 0.0,
            menu: None,
            orch: Orchestrator {
                regulation_score: 1.0,
                ..Default::default()
            },
            passive_clock: 0.0,
            background_suspended: false,
            ticks_applied: 0,
            notifications: Vec::new(),
            pointer: None,
            clicks: 0,
            synthetic_input: false,
            synthetic_clicks: 0,
            stuck_transition: false,
            reject_clicks: false,
            ui_events: Vec::new(),
        }
    }

    // ── Test controls ───────────────────────────────────────────

    /// The simulation RNG.
    pub fn rng(&self) -> &SimRng {
        &self.rng
    }

    /// Mutable access to the simulation RNG.
    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    /// Advance animations and, when idle and not suspended, background time.
    ///
    /// A frame in which an animation was running never accrues background
    /// time, even if the animation finished during it.
    pub fn frame(&mut self, dt: f64) {
        let was_busy = self.is_busy();
        if let Some((remaining, mode)) = self.transition {
            let left = remaining - dt;
            if left <= 0.0 && !self.stuck_transition {
                self.view = mode;
                self.transition = None;
            } else {
                self.transition = Some((left.max(0.0), mode));
            }
        }

        if self.exit_remaining > 0.0 {
            self.exit_remaining = (self.exit_remaining - dt).max(0.0);
        }

        let mut landed = Vec::new();
        for (id, remaining) in self.pending_blends.iter_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                landed.push(id.clone());
            }
        }
        for id in landed {
            self.pending_blends.remove(&id);
            self.orch.blend_timers.insert(id.clone(), 0.0);
            self.blended.insert(id);
        }

        if !self.background_suspended && !was_busy && !self.is_busy() {
            self.passive_clock += dt;
            while self.passive_clock >= TICK_SECS {
                self.passive_clock -= TICK_SECS;
                self.apply_tick();
            }
        }
    }

    /// Whether any animation or queued operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.transition.is_some() || self.exit_remaining > 0.0 || !self.pending_blends.is_empty()
    }

    /// Total background ticks applied, passive and explicit.
    pub fn ticks_applied(&self) -> u64 {
        self.ticks_applied
    }

    /// Whether passive advancement is suspended.
    pub fn is_background_suspended(&self) -> bool {
        self.background_suspended
    }

    /// Keep any started view transition running forever.
    pub fn set_transition_stuck(&mut self, stuck: bool) {
        self.stuck_transition = stuck;
    }

    /// Make every synthetic click fail.
    pub fn set_reject_clicks(&mut self, reject: bool) {
        self.reject_clicks = reject;
    }

    /// Mutate a subject out of band, as a user editing state would.
    pub fn external_edit(&mut self, id: &str, trust: f64) {
        if let Some(subject) = self.subjects.get_mut(id) {
            subject.trust = trust;
        }
    }

    /// Shift the orchestrator's regulation score out of band, leaving the
    /// model and the RNG untouched.
    pub fn drift_regulation(&mut self, delta: f64) {
        self.orch.regulation_score += delta;
    }

    /// Operator-surface calls seen so far.
    pub fn ui_events(&self) -> &[UiEvent] {
        &self.ui_events
    }

    /// Number of `playback_finished` calls seen so far.
    pub fn finished_calls(&self) -> usize {
        self.ui_events
            .iter()
            .filter(|e| matches!(e, UiEvent::Finished(_)))
            .count()
    }

    /// Synthetic clicks delivered so far, landed or not.
    pub fn click_count(&self) -> u64 {
        self.clicks
    }

    /// Clicks delivered while the controller had flagged synthetic input.
    pub fn synthetic_click_count(&self) -> u64 {
        self.synthetic_clicks
    }

    /// Whether the controller is currently delivering synthetic input.
    pub fn is_receiving_synthetic_input(&self) -> bool {
        self.synthetic_input
    }

    /// Last hover position.
    pub fn pointer(&self) -> Option<ScreenPoint> {
        self.pointer
    }

    /// Subject whose menu is open, if any.
    pub fn open_menu_subject(&self) -> Option<&SubjectId> {
        self.menu.as_ref().map(|m| &m.subject)
    }

    // ── Behavior ────────────────────────────────────────────────

    fn apply_tick(&mut self) {
        self.ticks_applied += 1;
        let orch = &mut self.orch;
        orch.tick += 1;
        orch.regulation_score *= 0.95;
        orch.phase_timer += 1.0;
        for (id, timer) in orch.blend_timers.iter_mut() {
            if self.blended.contains(id) {
                *timer += 1.0;
            }
        }
        orch.cooldowns.retain(|_, c| {
            *c -= 1.0;
            *c > 0.0
        });

        if orch.tick % 3 != 0 {
            return;
        }
        let roll = self.rng.random("orchestrator.demand");
        if roll >= 0.7 {
            return;
        }
        let candidates: Vec<SubjectId> = self
            .subjects
            .keys()
            .filter(|id| !self.targets.contains(*id) && !self.orch.cooldowns.contains_key(*id))
            .cloned()
            .collect();
        let Some(picked) = self
            .rng
            .pick_random(&candidates, "orchestrator.demand_target")
            .cloned()
        else {
            return;
        };
        if let Some(subject) = self.subjects.get_mut(&picked) {
            subject.needs_attention += 0.25 * roll;
            self.notifications
                .push(format!("{} needs attention", subject.name));
        }
        self.orch.cooldowns.insert(picked, 2.0);
    }

    fn start_transition(&mut self, mode: ViewMode) {
        self.transition = Some((VIEW_TRANSITION_SECS, mode));
    }

    fn toggle_view(&mut self) -> ClickResult {
        if self.transition.is_some() {
            return ClickResult::failed("view transition in progress");
        }
        self.menu = None;
        let next = match self.view {
            ViewMode::Panorama => ViewMode::Foreground,
            ViewMode::Foreground => ViewMode::Panorama,
        };
        self.start_transition(next);
        ClickResult::ok()
    }

    fn click_subject(&mut self, id: &SubjectId) -> ClickResult {
        if !self.subjects.contains_key(id) {
            return ClickResult::failed("no such subject").with_message(id.to_string());
        }
        self.menu = None;

        if let Some((action, source)) = self.pending_action.take() {
            if action == "feel_toward" && &source != id {
                self.feel_toward(source, id.clone());
                return ClickResult::ok();
            }
            self.pending_action = Some((action, source));
        }

        if self.targets.contains(id) && self.view == ViewMode::Foreground {
            let center = self.subjects[id].position;
            self.menu = Some(OpenMenu {
                subject: id.clone(),
                center,
                stage: MenuStage::Root,
            });
            return ClickResult::ok();
        }

        self.targets.insert(id.clone());
        if self.view == ViewMode::Panorama && self.transition.is_none() {
            self.start_transition(ViewMode::Foreground);
        }
        ClickResult::ok()
    }

    fn choose(&mut self, item: &str) -> ClickResult {
        let Some(menu) = self.menu.take() else {
            return ClickResult::failed("no menu open");
        };
        let s = menu.subject.clone();
        match (menu.stage, item) {
            (MenuStage::Root, "job") => {
                let v = self.rng.random("job.response");
                let name = self.subject_mut(&s, |subj| {
                    subj.trust += 0.05 * v;
                    subj.job_revealed = true;
                });
                self.notifications
                    .push(format!("{name} talked about their job"));
            }
            (MenuStage::Root, "feel_toward") => {
                self.pending_action = Some(("feel_toward".to_string(), s));
            }
            (MenuStage::Root, "blend") => {
                let v = self.rng.random("blend.intensity");
                self.subject_mut(&s, |subj| subj.trust -= 0.1 * v);
                self.pending_blends.insert(s, BLEND_QUEUE_SECS);
            }
            (MenuStage::Root, "separate") => {
                if self.blended.remove(&s) {
                    self.orch.blend_timers.remove(&s);
                }
                self.subject_mut(&s, |subj| subj.trust += 0.05);
                self.orch.regulation_score += 0.1;
                self.exit_remaining = EXIT_ANIMATION_SECS;
            }
            (MenuStage::Root, "ask_about") => {
                self.menu = Some(OpenMenu {
                    stage: MenuStage::AskAbout,
                    ..menu
                });
            }
            (MenuStage::Root, "self_ray") => {
                self.self_ray = match self.self_ray.take() {
                    Some(current) if current == s => None,
                    _ => Some(s),
                };
            }
            (MenuStage::Root, "step_back") => {
                self.targets.remove(&s);
                self.exit_remaining = EXIT_ANIMATION_SECS;
                if self.targets.is_empty() && self.view == ViewMode::Foreground {
                    self.start_transition(ViewMode::Panorama);
                }
            }
            (MenuStage::AskAbout, field) => {
                self.subject_mut(&s, |subj| match field {
                    "identity" => subj.identity_revealed = true,
                    _ => subj.age_revealed = true,
                });
                self.conversation.phase = ConversationPhase::Speaking;
                self.conversation.participants.insert(s);
            }
            (MenuStage::Root, other) => {
                return ClickResult::failed("unknown menu item").with_message(other.to_string());
            }
        }
        ClickResult::ok()
    }

    fn feel_toward(&mut self, source: SubjectId, target: SubjectId) {
        let v = self.rng.random("feel_toward.warmth");
        self.relations
            .insert((source.clone(), target.clone()), 0.3 + 0.4 * v);
        self.conversation.phase = ConversationPhase::Listening;
        self.conversation.participants.insert(source);
        self.conversation.participants.insert(target);
    }

    fn subject_mut(&mut self, id: &SubjectId, f: impl FnOnce(&mut Subject)) -> String {
        match self.subjects.get_mut(id) {
            Some(subject) => {
                f(subject);
                subject.name.clone()
            }
            None => id.to_string(),
        }
    }

    fn menu_hit(&self, at: ScreenPoint) -> Option<&'static str> {
        let menu = self.menu.as_ref()?;
        let items = menu.items();
        (0..items.len())
            .find(|&i| {
                self.menu_slice_position(i, menu.center, items.len())
                    .distance(&at)
                    <= SLICE_HIT_RADIUS
            })
            .map(|i| items[i])
    }
}

impl HostInput for MockSimulation {
    fn subject_screen_position(&self, id: &SubjectId) -> Option<ScreenPoint> {
        self.subjects.get(id).map(|s| s.position)
    }

    fn menu_center(&self) -> Option<ScreenPoint> {
        self.menu.as_ref().map(|m| m.center)
    }

    fn menu_slice_position(
        &self,
        index: usize,
        center: ScreenPoint,
        item_count: usize,
    ) -> ScreenPoint {
        let angle = TAU * index as f64 / item_count.max(1) as f64;
        ScreenPoint::new(
            center.x + MENU_RADIUS * angle.cos(),
            center.y + MENU_RADIUS * angle.sin(),
        )
    }

    fn view_toggle_position(&self) -> Option<ScreenPoint> {
        Some(VIEW_TOGGLE)
    }

    fn simulate_hover(&mut self, at: ScreenPoint) {
        self.pointer = Some(at);
    }

    fn simulate_click_at_position(&mut self, at: ScreenPoint) -> ClickResult {
        self.clicks += 1;
        if self.synthetic_input {
            self.synthetic_clicks += 1;
        }
        if self.reject_clicks {
            return ClickResult::failed("input blocked");
        }
        if at.distance(&VIEW_TOGGLE) <= TOGGLE_HIT_RADIUS {
            return self.toggle_view();
        }
        if self.menu.is_some() {
            return match self.menu_hit(at) {
                Some(item) => self.choose(item),
                None => ClickResult::failed("no menu item at point")
                    .with_message(format!("({:.1}, {:.1})", at.x, at.y)),
            };
        }
        let hit = self
            .subjects
            .iter()
            .find(|(_, s)| s.position.distance(&at) <= SUBJECT_HIT_RADIUS)
            .map(|(id, _)| id.clone());
        match hit {
            Some(id) => self.click_subject(&id),
            None => ClickResult::failed("nothing at point"),
        }
    }

    fn simulate_click_on_subject(&mut self, id: &SubjectId) -> ClickResult {
        self.clicks += 1;
        if self.synthetic_input {
            self.synthetic_clicks += 1;
        }
        if self.reject_clicks {
            return ClickResult::failed("input blocked");
        }
        self.click_subject(id)
    }

    fn is_view_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    fn has_pending_queued_operations(&self) -> bool {
        !self.pending_blends.is_empty()
    }

    fn has_active_exit_animations(&self) -> bool {
        self.exit_remaining > 0.0
    }

    fn find_action_in_open_menu(&self, action_id: &str) -> Option<MenuSlot> {
        let menu = self.menu.as_ref()?;
        let items = menu.items();
        items.iter().position(|&i| i == action_id).map(|slice_index| MenuSlot {
            slice_index,
            item_count: items.len(),
        })
    }
}

impl HostBackground for MockSimulation {
    fn advance_background_ticks(&mut self, count: u32) {
        for _ in 0..count {
            self.apply_tick();
        }
    }

    fn background_diagnostics(&self) -> BackgroundDiagnostics {
        BackgroundDiagnostics {
            ticks_applied: self.ticks_applied,
            suspended: self.background_suspended,
            detail: format!(
                "orchestrator tick {}, regulation {:.3}",
                self.orch.tick, self.orch.regulation_score
            ),
        }
    }

    fn set_background_suspended(&mut self, suspended: bool) {
        self.background_suspended = suspended;
        self.passive_clock = 0.0;
    }
}

impl HostModel for MockSimulation {
    fn model_snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            targets: self.targets.clone(),
            blended: self.blended.clone(),
            pending_blends: self.pending_blends.keys().cloned().collect(),
            self_ray: self.self_ray.clone(),
            pending_action: self.pending_action.as_ref().map(|(a, _)| a.clone()),
            subjects: self
                .subjects
                .iter()
                .map(|(id, s)| {
                    (
                        id.clone(),
                        SubjectSnapshot {
                            name: s.name.clone(),
                            trust: s.trust,
                            needs_attention: s.needs_attention,
                            identity_revealed: s.identity_revealed,
                            job_revealed: s.job_revealed,
                            age_revealed: s.age_revealed,
                        },
                    )
                })
                .collect(),
            relations: self
                .relations
                .iter()
                .map(|((from, to), &trust)| RelationSnapshot {
                    from: from.clone(),
                    to: to.clone(),
                    trust,
                })
                .collect(),
            conversation: self.conversation.clone(),
            view: ViewSnapshot { mode: self.view },
        }
    }

    fn orchestrator_snapshot(&self) -> OrchestratorSnapshot {
        match serde_json::to_value(&self.orch) {
            Ok(Value::Object(map)) => OrchestratorSnapshot::from_map(map),
            _ => OrchestratorSnapshot::new(),
        }
    }

    fn restore_orchestrator_snapshot(&mut self, snapshot: &OrchestratorSnapshot) {
        if let Ok(orch) = serde_json::from_value(Value::Object(snapshot.as_map().clone())) {
            self.orch = orch;
        }
    }

    fn rng_seed(&self) -> Option<u32> {
        self.rng.seed()
    }

    fn rng_call_count(&self) -> u64 {
        self.rng.call_count()
    }

    fn rng_call_log(&self) -> &[DrawRecord] {
        self.rng.call_log()
    }

    fn pending_notifications(&self) -> Vec<String> {
        self.notifications.clone()
    }
}

impl OperatorSurface for MockSimulation {
    fn show_playback_controls(&mut self) {
        self.ui_events.push(UiEvent::ControlsShown);
    }

    fn hide_playback_controls(&mut self) {
        self.ui_events.push(UiEvent::ControlsHidden);
    }

    fn playback_progress(&mut self, completed: usize, total: usize) {
        self.ui_events.push(UiEvent::Progress { completed, total });
    }

    fn playback_finished(&mut self, summary: &RunSummary) {
        self.ui_events.push(UiEvent::Finished(summary.clone()));
    }

    fn synthetic_input(&mut self, active: bool) {
        self.synthetic_input = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SubjectId {
        SubjectId::from(s)
    }

    fn settle(sim: &mut MockSimulation) {
        for _ in 0..100 {
            if !sim.is_busy() {
                return;
            }
            sim.frame(0.05);
        }
        panic!("simulation never settled");
    }

    #[test]
    fn construction_and_selection_draw_nothing() {
        let mut sim = MockSimulation::new(42);
        assert!(sim.simulate_click_on_subject(&id("p1")).success);
        settle(&mut sim);
        assert_eq!(sim.rng_call_count(), 0);
        let snap = sim.model_snapshot();
        assert!(snap.targets.contains("p1"));
        assert_eq!(snap.view.mode, ViewMode::Foreground);
    }

    #[test]
    fn targeted_subject_opens_menu_in_foreground() {
        let mut sim = MockSimulation::new(1);
        sim.simulate_click_on_subject(&id("p1"));
        settle(&mut sim);
        sim.simulate_click_on_subject(&id("p1"));
        assert_eq!(sim.open_menu_subject(), Some(&id("p1")));
        let slot = sim.find_action_in_open_menu("blend").unwrap();
        assert_eq!(slot, MenuSlot { slice_index: 2, item_count: 7 });
    }

    #[test]
    fn menu_slice_click_applies_action() {
        let mut sim = MockSimulation::new(1);
        sim.simulate_click_on_subject(&id("p1"));
        settle(&mut sim);
        sim.simulate_click_on_subject(&id("p1"));
        let slot = sim.find_action_in_open_menu("job").unwrap();
        let center = sim.menu_center().unwrap();
        let at = sim.menu_slice_position(slot.slice_index, center, slot.item_count);
        assert!(sim.simulate_click_at_position(at).success);
        assert_eq!(sim.rng_call_count(), 1);
        assert_eq!(sim.rng_call_log()[0].label, "job.response");
        assert!(sim.model_snapshot().subjects["p1"].job_revealed);
    }

    #[test]
    fn blend_lands_after_queue_delay() {
        let mut sim = MockSimulation::new(1);
        sim.simulate_click_on_subject(&id("p2"));
        settle(&mut sim);
        sim.simulate_click_on_subject(&id("p2"));
        let slot = sim.find_action_in_open_menu("blend").unwrap();
        let center = sim.menu_center().unwrap();
        let at = sim.menu_slice_position(slot.slice_index, center, slot.item_count);
        sim.simulate_click_at_position(at);
        assert!(sim.has_pending_queued_operations());
        assert!(sim.model_snapshot().pending_blends.contains("p2"));
        settle(&mut sim);
        let snap = sim.model_snapshot();
        assert!(snap.blended.contains("p2"));
        assert!(snap.pending_blends.is_empty());
    }

    #[test]
    fn explicit_ticks_match_passive_ticks() {
        let mut passive = MockSimulation::new(9);
        for _ in 0..24 {
            passive.frame(0.25);
        }
        let mut explicit = MockSimulation::new(9);
        explicit.advance_background_ticks(passive.ticks_applied() as u32);

        assert_eq!(passive.ticks_applied(), 6);
        assert_eq!(passive.rng_call_count(), explicit.rng_call_count());
        assert_eq!(passive.model_snapshot(), explicit.model_snapshot());
        assert_eq!(
            passive.orchestrator_snapshot(),
            explicit.orchestrator_snapshot()
        );
    }

    #[test]
    fn suspended_background_does_not_tick() {
        let mut sim = MockSimulation::new(9);
        sim.set_background_suspended(true);
        for _ in 0..20 {
            sim.frame(0.25);
        }
        assert_eq!(sim.ticks_applied(), 0);
    }

    #[test]
    fn orchestrator_snapshot_restores() {
        let mut sim = MockSimulation::new(3);
        let before = sim.orchestrator_snapshot();
        sim.advance_background_ticks(5);
        assert_ne!(sim.orchestrator_snapshot(), before);
        sim.restore_orchestrator_snapshot(&before);
        assert_eq!(sim.orchestrator_snapshot(), before);
    }

    #[test]
    fn regulation_drift_touches_only_the_orchestrator() {
        let mut sim = MockSimulation::new(3);
        let model = sim.model_snapshot();
        let orch = sim.orchestrator_snapshot();
        sim.drift_regulation(0.5);
        assert_eq!(sim.model_snapshot(), model);
        assert_eq!(sim.rng_call_count(), 0);
        assert_ne!(sim.orchestrator_snapshot(), orch);
    }

    #[test]
    fn rejected_clicks_fail() {
        let mut sim = MockSimulation::new(3);
        sim.set_reject_clicks(true);
        let result = sim.simulate_click_on_subject(&id("p1"));
        assert!(!result.success);
        assert!(sim.model_snapshot().targets.is_empty());
    }

    #[test]
    fn view_toggle_hit_test() {
        let mut sim = MockSimulation::new(3);
        let at = sim.view_toggle_position().unwrap();
        assert!(sim.simulate_click_at_position(at).success);
        assert!(sim.is_view_transitioning());
        settle(&mut sim);
        assert_eq!(sim.model_snapshot().view.mode, ViewMode::Foreground);
    }
}
