use thiserror::Error;

use crate::record::{DirectoryRef, GroupAttr, GroupLookup, PersonRecord};

#[derive(Debug, Error)]
/// Failure talking to the directory service.
pub enum DirectoryError {
    #[error("directory lookup failed: {0}")]
    Lookup(String),
    #[error("directory update refused for '{target}': {message}")]
    Mutation { target: String, message: String },
}

/// Group and member primitives consumed by the reconciler and the
/// dispatchers.
///
/// Identity lookup is case-insensitive on email and whitespace-trimmed.
/// Mutations return `Err` when the directory refuses the update; a
/// refused mutation is a per-line failure, never fatal for the batch.
pub trait DirectoryAdapter {
    /// Resolves a group key to its canonical form plus all matching
    /// entries carrying the requested attributes.
    fn find_group(&self, key: &str, attrs: &[GroupAttr]) -> Result<GroupLookup, DirectoryError>;

    /// Resolves an email address or short identifier to a directory
    /// reference; `None` when no entry exists.
    fn find_identity(&self, email_or_uid: &str) -> Result<Option<DirectoryRef>, DirectoryError>;

    fn add_member(&self, group_key: &str, identity: &DirectoryRef) -> Result<(), DirectoryError>;
    fn remove_member(&self, group_key: &str, identity: &DirectoryRef)
        -> Result<(), DirectoryError>;
    fn add_owner(&self, group_key: &str, identity: &DirectoryRef) -> Result<(), DirectoryError>;
    fn remove_owner(&self, group_key: &str, identity: &DirectoryRef)
        -> Result<(), DirectoryError>;

    /// Full member list of a group, used when routing approvals to a
    /// fallback group.
    fn group_membership(&self, group_key: &str) -> Result<Vec<DirectoryRef>, DirectoryError>;

    /// Whether the person behind `email` belongs to the named
    /// administrative group.
    fn is_member_of_admin_group(
        &self,
        group_name: &str,
        email: &str,
    ) -> Result<bool, DirectoryError>;

    /// Fetches the person entry behind a reference, for display-name
    /// rendering; `None` when the entry has gone away.
    fn find_person(&self, entry: &DirectoryRef) -> Result<Option<PersonRecord>, DirectoryError>;
}
