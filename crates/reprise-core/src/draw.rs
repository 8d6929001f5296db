//! RNG draw records.

use serde::{Deserialize, Serialize};

/// One call to the deterministic RNG.
///
/// The label is purely diagnostic: it never influences the drawn value.
/// `index` is the zero-based position of the draw in the RNG's call log,
/// so `log[i].index == i` always holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    /// Human-readable tag naming the subsystem that drew.
    pub label: String,
    /// The drawn value, in `[0, 1)`.
    pub value: f64,
    /// Position of this draw in the call log.
    pub index: u64,
}
