//! Core types and traits for the Reprise record/replay engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the value types every other crate exchanges: subject identifiers,
//! RNG draw records, model and orchestrator snapshots, and the traits
//! through which the engine touches its host simulation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod draw;
pub mod error;
pub mod id;
pub mod snapshot;
pub mod traits;

pub use draw::DrawRecord;
pub use error::InputError;
pub use id::SubjectId;
pub use snapshot::{
    ConversationPhase, ConversationSnapshot, ModelSnapshot, OrchestratorSnapshot,
    RelationSnapshot, SubjectSnapshot, ViewMode, ViewSnapshot,
};
pub use traits::{
    BackgroundDiagnostics, ClickResult, HostBackground, HostInput, HostModel, MenuSlot,
    NameResolver, OperatorSurface, RunEnd, RunSummary, ScreenPoint,
};
