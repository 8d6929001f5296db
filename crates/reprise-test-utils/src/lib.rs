//! Test utilities and mock types for Reprise development.
//!
//! Provides [`MockSimulation`], an in-memory host implementing every
//! host trait, and [`RecordingHarness`] for scripting recorded sessions
//! against it.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod harness;
pub mod mock;

pub use harness::{HarnessError, RecordingHarness, FRAME_SECS};
pub use mock::{MockSimulation, UiEvent};

/// Record a short session touching every kind of action.
///
/// Targets `p1`, asks about its job, idles, blends `p2`, feels `p1`
/// toward `p3`, asks `p1` about its identity, then toggles the view.
pub fn record_scripted_session(seed: u32) -> Result<reprise_replay::RecordedSession, HarnessError> {
    let mut h = RecordingHarness::new(seed)?;
    h.select("p1")?
        .menu("p1", "job", None, None)?
        .idle(4.0)?
        .select("p2")?
        .menu("p2", "blend", None, None)?
        .idle(2.0)?
        .menu("p1", "feel_toward", None, Some("p3"))?
        .menu("p1", "ask_about", Some("identity"), None)?
        .idle(3.0)?
        .toggle_view()?;
    let (session, _) = h.finish()?;
    Ok(session)
}
