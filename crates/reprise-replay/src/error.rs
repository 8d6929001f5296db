//! Error types for recording and session I/O.

use std::io;

/// Errors from the [`ActionRecorder`](crate::ActionRecorder) state machine.
///
/// The call is rejected before anything is mutated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecorderError {
    /// `start` was called while a recording is in progress.
    #[error("a recording is already in progress")]
    AlreadyRecording,
    /// `start` was given a live (non-seeded) RNG.
    #[error("cannot record with a non-seeded RNG")]
    UnseededRng,
    /// `stop` or `record` was called with no recording in progress.
    #[error("no recording in progress")]
    NotRecording,
    /// `record` was handed a `process_intervals` action. Intervals are
    /// written only from ticks reported through `note_background_ticks`.
    #[error("process_intervals cannot be recorded as a user action")]
    IntervalAsAction,
}

impl RecorderError {
    /// Whether the error reports a call made in the wrong recorder state.
    pub fn is_invalid_state(&self) -> bool {
        match self {
            Self::AlreadyRecording | Self::UnseededRng | Self::NotRecording => true,
            Self::IntervalAsAction => false,
        }
    }
}

/// Errors reading or writing a session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The JSON text was not a valid session.
    #[error("invalid session JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// An action decoded but violates the session invariants.
    #[error("malformed action #{index}: {detail}")]
    MalformedAction {
        /// Position of the action in the session.
        index: usize,
        /// What is wrong with it.
        detail: String,
    },
}
