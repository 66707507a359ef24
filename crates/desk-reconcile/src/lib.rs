//! Batch reconciliation of add/remove commands against a live group
//! membership or ownership snapshot.
//!
//! Each batch re-reads the current set from the directory, applies the
//! lines in order against an in-memory working copy (so later lines see
//! earlier changes), writes every accepted mutation back immediately,
//! and produces a human-readable transcript plus a changed flag. When
//! anything changed, the downstream sync is triggered exactly once.

pub mod outcome;
pub mod reconciler;
pub mod sync;
mod transcript;

pub use outcome::{ChangeResult, TargetSet};
pub use reconciler::{reconcile_batch, BatchReport, ReconcileOptions, UnrecognizedActionPolicy};
pub use sync::{NoopSync, SyncError, SyncTrigger};
