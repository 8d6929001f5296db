//! Error types shared across the workspace.

use crate::id::SubjectId;

/// A synthetic input could not be delivered to the host.
///
/// Produced by the playback controller when the host input surface
/// rejects a click or cannot locate the thing to click.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The host reported that a click did not land.
    #[error("click failed: {reason}")]
    ClickFailed {
        /// Host-supplied reason, or a generic message if none was given.
        reason: String,
    },
    /// The subject has no on-screen position.
    #[error("subject '{0}' is not on screen")]
    SubjectNotVisible(SubjectId),
    /// No menu is open, so its center cannot be resolved.
    #[error("no menu is open")]
    MenuNotOpen,
    /// The requested action is not present in the open menu.
    #[error("action '{0}' not found in open menu")]
    MenuItemMissing(String),
    /// The host exposes no view toggle control.
    #[error("host has no view toggle")]
    NoViewToggle,
}
