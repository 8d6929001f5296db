//! Reprise: deterministic action recording, replay, and sync verification.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Reprise sub-crates. For most users, adding `reprise` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use reprise::prelude::*;
//! use reprise_test_utils::{record_scripted_session, MockSimulation};
//!
//! // Record a session against one simulation...
//! let session = record_scripted_session(42).unwrap();
//! let text = reprise::replay::to_json_string(&session).unwrap();
//! let session = reprise::replay::from_json_str(&text).unwrap();
//!
//! // ...and replay it against a fresh one seeded the same way.
//! let mut sim = MockSimulation::new(session.seed);
//! let mut ctrl = PlaybackController::new(PlaybackConfig::default()).unwrap();
//! ctrl.start(&session, &mut sim).unwrap();
//! while ctrl.is_active() {
//!     ctrl.update(1.0 / 60.0, &mut sim);
//!     sim.frame(1.0 / 60.0);
//! }
//! assert_eq!(ctrl.outcome(), Some(&PlaybackOutcome::Finished));
//! assert_eq!(Some(sim.model_snapshot()), session.final_state);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `reprise-core` | IDs, snapshots, draw records, host traits |
//! | [`rng`] | `reprise-rng` | Seedable, draw-logging RNG |
//! | [`replay`] | `reprise-replay` | Session types, recorder, codec, verifier |
//! | [`playback`] | `reprise-playback` | Frame-driven playback controller |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`reprise-core`).
///
/// Contains model and orchestrator snapshots and the host traits
/// ([`types::HostInput`], [`types::HostBackground`], [`types::HostModel`],
/// [`types::OperatorSurface`]) a simulation implements to be recorded
/// and replayed.
pub use reprise_core as types;

/// Seedable, draw-logging RNG (`reprise-rng`).
///
/// [`rng::SimRng`] is the single random source a recorded simulation
/// may draw from.
pub use reprise_rng as rng;

/// Session recording, storage, and verification (`reprise-replay`).
///
/// Record with [`replay::ActionRecorder`], persist with
/// [`replay::save_session`], and compare live state with
/// [`replay::SyncVerifier`].
pub use reprise_replay as replay;

/// Frame-driven playback (`reprise-playback`).
///
/// [`playback::PlaybackController`] replays a session against a host and
/// halts on the first divergence.
pub use reprise_playback as playback;

/// Common imports for typical Reprise usage.
///
/// ```rust
/// use reprise::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use reprise_core::{
        HostBackground, HostInput, HostModel, ModelSnapshot, OperatorSurface,
        OrchestratorSnapshot, SubjectId,
    };

    // RNG
    pub use reprise_rng::SimRng;

    // Recording and verification
    pub use reprise_replay::{
        ActionInput, ActionKind, ActionRecorder, RecordedAction, RecordedSession, SyncFailure,
        SyncVerifier,
    };

    // Errors
    pub use reprise_replay::{RecorderError, SessionError};
    pub use reprise_playback::{ConfigError, PlaybackError};

    // Playback
    pub use reprise_playback::{
        PlaybackConfig, PlaybackController, PlaybackHost, PlaybackOutcome, PlaybackState,
    };
}
