//! Frame-driven playback of recorded Reprise sessions.
//!
//! [`PlaybackController`] replays a [`RecordedSession`](reprise_replay::RecordedSession)
//! against any host implementing the four host traits (see
//! [`PlaybackHost`]). Each user action becomes an execution plan of
//! synthetic inputs and bounded waits; each `process_intervals` entry
//! re-applies its background ticks directly. After every entry the live
//! state is compared with the recorded one and the run halts on the
//! first divergence.
//!
//! Passive background advancement is suspended for the whole run, so
//! the only ticks the host sees are the recorded ones.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod controller;
pub mod metrics;
pub mod plan;

pub use config::{ConfigError, PlaybackConfig};
pub use controller::{
    CancelReason, PlaybackController, PlaybackError, PlaybackFailure, PlaybackHost,
    PlaybackOutcome, PlaybackState,
};
pub use metrics::PlaybackMetrics;
pub use plan::{build_plan, PlanError, Step, WaitCondition};
