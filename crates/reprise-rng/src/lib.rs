//! Deterministic random number generation for Reprise simulations.
//!
//! Every randomized decision in a recorded simulation must route through
//! one [`SimRng`], injected into the subsystems that need it. A seeded
//! instance yields a value sequence that depends only on its seed and on
//! the number of draws made so far; the label attached to each draw is
//! kept in the call log for diagnostics and never changes a value.
//!
//! A live instance (OS-entropy seed) exists for unrecorded use. Recording
//! refuses it; [`SimRng::ensure_seeded`] upgrades it in place.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod rng;

pub use rng::SimRng;
