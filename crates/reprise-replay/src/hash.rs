//! Hashing utilities for snapshot comparison.
//!
//! Uses FNV-1a for fast, deterministic hashing of model state. These
//! hashes are not cryptographically secure; they gate the verifier's
//! fast path, where equal hashes mean no field-level diff is needed.

use reprise_core::{ConversationPhase, ModelSnapshot, SubjectId, ViewMode};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Feed a single byte into an FNV-1a hash state.
#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Feed a u64 (as 8 LE bytes) into an FNV-1a hash state.
#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed a length-prefixed string.
#[inline]
fn fnv1a_str(mut hash: u64, s: &str) -> u64 {
    hash = fnv1a_u64(hash, s.len() as u64);
    for &b in s.as_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

/// Feed an f64 by bit pattern.
#[inline]
fn fnv1a_f64(hash: u64, v: f64) -> u64 {
    fnv1a_u64(hash, v.to_bits())
}

fn fnv1a_opt_str(hash: u64, v: Option<&str>) -> u64 {
    match v {
        Some(s) => fnv1a_str(fnv1a_byte(hash, 1), s),
        None => fnv1a_byte(hash, 0),
    }
}

fn fnv1a_ids<'a>(mut hash: u64, ids: impl ExactSizeIterator<Item = &'a SubjectId>) -> u64 {
    hash = fnv1a_u64(hash, ids.len() as u64);
    for id in ids {
        hash = fnv1a_str(hash, id.as_str());
    }
    hash
}

/// Compute a hash over every field of a model snapshot.
///
/// Fields are folded in declaration order. Sets and maps iterate in
/// sorted order, so two snapshots that compare equal hash equally.
/// Relations are hashed in list order.
pub fn snapshot_hash(snapshot: &ModelSnapshot) -> u64 {
    let mut hash = FNV_OFFSET;

    hash = fnv1a_ids(hash, snapshot.targets.iter());
    hash = fnv1a_ids(hash, snapshot.blended.iter());
    hash = fnv1a_ids(hash, snapshot.pending_blends.iter());
    hash = fnv1a_opt_str(hash, snapshot.self_ray.as_ref().map(SubjectId::as_str));
    hash = fnv1a_opt_str(hash, snapshot.pending_action.as_deref());

    hash = fnv1a_u64(hash, snapshot.subjects.len() as u64);
    for (id, subject) in &snapshot.subjects {
        hash = fnv1a_str(hash, id.as_str());
        hash = fnv1a_str(hash, &subject.name);
        hash = fnv1a_f64(hash, subject.trust);
        hash = fnv1a_f64(hash, subject.needs_attention);
        hash = fnv1a_byte(hash, subject.identity_revealed as u8);
        hash = fnv1a_byte(hash, subject.job_revealed as u8);
        hash = fnv1a_byte(hash, subject.age_revealed as u8);
    }

    hash = fnv1a_u64(hash, snapshot.relations.len() as u64);
    for relation in &snapshot.relations {
        hash = fnv1a_str(hash, relation.from.as_str());
        hash = fnv1a_str(hash, relation.to.as_str());
        hash = fnv1a_f64(hash, relation.trust);
    }

    hash = fnv1a_byte(hash, phase_tag(snapshot.conversation.phase));
    hash = fnv1a_ids(hash, snapshot.conversation.participants.iter());

    hash = fnv1a_byte(
        hash,
        match snapshot.view.mode {
            ViewMode::Panorama => 0,
            ViewMode::Foreground => 1,
        },
    );

    hash
}

fn phase_tag(phase: ConversationPhase) -> u8 {
    match phase {
        ConversationPhase::Idle => 0,
        ConversationPhase::Listening => 1,
        ConversationPhase::Speaking => 2,
        ConversationPhase::Resolved => 3,
    }
}
