//! Session recording, storage, and synchronization verification.
//!
//! # Architecture
//!
//! - [`ActionRecorder`] turns live interaction into a [`RecordedSession`]
//! - [`codec`] reads and writes sessions as JSON
//! - [`snapshot_hash`] fingerprints model state for the fast path
//! - [`SyncVerifier`] compares live state with a recorded action and
//!   reports every diverged field
//!
//! # Format
//!
//! ```text
//! { "seed", "codeVersion", "platform", "initialState", "finalState",
//!   "actions": [ { "action", "cloudId", "targetCloudId", "field", "count",
//!                  "rngCounts": { "model" }, "rngLog": [ { "label", "value" } ],
//!                  "modelState", "orchState" } ] }
//! ```
//!
//! Background time between user actions is recorded as
//! `process_intervals` pseudo-actions carrying a tick count.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod hash;
pub mod recorder;
pub mod types;
pub mod verify;

pub use codec::{
    code_version_matches, decode_session, encode_session, from_json_str, load_session,
    save_session, to_json_string,
};
pub use error::{RecorderError, SessionError};
pub use hash::snapshot_hash;
pub use recorder::{ActionInput, ActionRecorder, RecorderConfig};
pub use types::{ActionKind, LoggedDraw, Platform, RecordedAction, RecordedSession, RngCounts};
pub use verify::{LiveState, Mismatch, SyncFailure, SyncVerifier, VerifyConfig};
