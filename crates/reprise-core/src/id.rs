//! Strongly-typed identifiers.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one subject (an on-screen entity) in the host simulation.
///
/// Subject ids are opaque strings assigned by the host. They are stable
/// across runs of the same scenario, which is what lets a recording made
/// against one simulation instance be replayed against another.
///
/// # Examples
///
/// ```
/// use reprise_core::SubjectId;
///
/// let id = SubjectId::from("p1");
/// assert_eq!(id.as_str(), "p1");
/// assert_eq!(id.to_string(), "p1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl Borrow<str> for SubjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
