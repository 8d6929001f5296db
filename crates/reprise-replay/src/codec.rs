//! JSON encoding and decoding of recorded sessions.
//!
//! Decoding is lenient about missing optional keys but strict about the
//! invariants replay depends on: every `process_intervals` action must
//! carry a positive `count`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::SessionError;
use crate::types::RecordedSession;

/// Write `session` as JSON to `writer`.
pub fn encode_session<W: Write>(
    mut writer: W,
    session: &RecordedSession,
    pretty: bool,
) -> Result<(), SessionError> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, session)?;
    } else {
        serde_json::to_writer(&mut writer, session)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read and validate a session from `reader`.
pub fn decode_session<R: Read>(reader: R) -> Result<RecordedSession, SessionError> {
    let session: RecordedSession = serde_json::from_reader(reader)?;
    validate_session(&session)?;
    Ok(session)
}

/// Encode `session` as a compact JSON string.
pub fn to_json_string(session: &RecordedSession) -> Result<String, SessionError> {
    Ok(serde_json::to_string(session)?)
}

/// Decode and validate a session from JSON text.
pub fn from_json_str(text: &str) -> Result<RecordedSession, SessionError> {
    let session: RecordedSession = serde_json::from_str(text)?;
    validate_session(&session)?;
    Ok(session)
}

/// Write `session` to a file, pretty-printed.
pub fn save_session(path: impl AsRef<Path>, session: &RecordedSession) -> Result<(), SessionError> {
    let file = File::create(path)?;
    encode_session(BufWriter::new(file), session, true)
}

/// Read and validate a session file.
pub fn load_session(path: impl AsRef<Path>) -> Result<RecordedSession, SessionError> {
    let file = File::open(path)?;
    decode_session(BufReader::new(file))
}

/// Check the invariants a decoded session must satisfy.
pub fn validate_session(session: &RecordedSession) -> Result<(), SessionError> {
    for (index, action) in session.actions.iter().enumerate() {
        if !action.is_interval() {
            continue;
        }
        match action.count {
            None => {
                return Err(SessionError::MalformedAction {
                    index,
                    detail: "process_intervals without count".to_string(),
                })
            }
            Some(0) => {
                return Err(SessionError::MalformedAction {
                    index,
                    detail: "process_intervals with count 0".to_string(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Whether `session` was recorded by the build identified by `current`.
///
/// A mismatch is not an error: replay may still succeed. It is logged
/// as a warning so a later desynchronization can be traced back to it.
/// Sessions without a recorded version always match.
pub fn code_version_matches(session: &RecordedSession, current: &str) -> bool {
    if session.code_version.is_empty() || session.code_version == current {
        return true;
    }
    tracing::warn!(
        recorded = %session.code_version,
        current,
        "session was recorded by a different build"
    );
    false
}
