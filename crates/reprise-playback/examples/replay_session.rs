//! Record a scripted session, save it, load it back, and replay it
//! against a fresh simulation.
//!
//! Run with: `cargo run -p reprise-playback --example replay_session [seed]`

use reprise_core::HostModel;
use reprise_playback::{PlaybackConfig, PlaybackController, PlaybackOutcome};
use reprise_replay::{load_session, save_session};
use reprise_test_utils::{record_scripted_session, MockSimulation};

const DT: f64 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reprise_playback=info".into()),
        )
        .init();

    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u32>())
        .transpose()?
        .unwrap_or(42);

    let recorded = record_scripted_session(seed)?;
    let path = std::env::temp_dir().join(format!("reprise-demo-{seed}.json"));
    save_session(&path, &recorded)?;
    let session = load_session(&path)?;
    println!(
        "recorded {} actions ({} ticks) to {}",
        session.user_action_count(),
        session.interval_ticks(),
        path.display()
    );

    let mut sim = MockSimulation::new(session.seed);
    let mut ctrl = PlaybackController::new(PlaybackConfig {
        action_delay: 0.25,
        ..Default::default()
    })?;
    ctrl.start(&session, &mut sim)?;

    let mut frames = 0u64;
    while ctrl.is_active() {
        ctrl.update(DT, &mut sim);
        sim.frame(DT);
        frames += 1;
    }

    let m = ctrl.metrics();
    println!(
        "{frames} frames: {} actions, {} intervals, {} polls, {} wait timeouts",
        m.actions_executed, m.intervals_replayed, m.polls, m.wait_timeouts
    );
    match ctrl.outcome() {
        Some(PlaybackOutcome::Finished) => {
            let targets: Vec<String> = sim
                .model_snapshot()
                .targets
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("replay matched; targets {targets:?}");
        }
        Some(PlaybackOutcome::Failed(failure)) => {
            println!("replay diverged: {failure}");
            for m in &failure.mismatches {
                println!("  {m}");
            }
        }
        other => println!("replay ended: {other:?}"),
    }
    Ok(())
}
