//! Directory-side types and the adapter trait the reconciler mutates
//! group membership through.
//!
//! The directory (an LDAP-style service) is the only durable store this
//! core touches; every batch re-reads the live snapshot and writes each
//! accepted mutation back immediately.

pub mod adapter;
pub mod memory;
pub mod record;

pub use adapter::{DirectoryAdapter, DirectoryError};
pub use memory::InMemoryDirectory;
pub use record::{DirectoryRef, GroupAttr, GroupLookup, GroupRecord, PersonRecord};
