use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Canonical reference to one directory entry (person, contact or group).
///
/// Comparison is exact: resolution already happened by the time a value
/// of this type exists, so two refs to the same entry are byte-equal.
pub struct DirectoryRef(String);

impl DirectoryRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DirectoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Group attributes a lookup can request.
pub enum GroupAttr {
    Members,
    Owners,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One group entry as returned by a directory lookup.
///
/// `members`/`owners` are `None` when the attribute is absent on the
/// entry and `Some(vec![])` when it is present but empty; the two read
/// the same for iteration but stay distinguishable.
pub struct GroupRecord {
    /// Canonical key (email address or directory name) of the group.
    pub key: String,
    /// The group's own entry reference, used for self-reference checks.
    pub entry_ref: DirectoryRef,
    pub members: Option<Vec<DirectoryRef>>,
    pub owners: Option<Vec<DirectoryRef>>,
}

impl GroupRecord {
    pub fn member_refs(&self) -> &[DirectoryRef] {
        self.members.as_deref().unwrap_or(&[])
    }

    pub fn owner_refs(&self) -> &[DirectoryRef] {
        self.owners.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Person attributes needed to render a human-facing owner listing.
pub struct PersonRecord {
    pub entry_ref: DirectoryRef,
    pub mail: Option<String>,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
}

impl PersonRecord {
    /// Best human-readable name: displayName, then "given surname",
    /// then surname alone, then the mail address.
    pub fn best_display_name(&self) -> Option<String> {
        if let Some(name) = &self.display_name {
            return Some(name.clone());
        }
        match (&self.given_name, &self.surname) {
            (Some(given), Some(surname)) => Some(format!("{given} {surname}")),
            (None, Some(surname)) => Some(surname.clone()),
            _ => self.mail.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of resolving a group key: the canonical key plus zero, one or
/// many matching entries. Anything other than exactly one match is a
/// caller-level sanity failure.
pub struct GroupLookup {
    pub resolved_key: String,
    pub matches: Vec<GroupRecord>,
}

impl GroupLookup {
    pub fn single(&self) -> Option<&GroupRecord> {
        if self.matches.len() == 1 {
            self.matches.first()
        } else {
            None
        }
    }
}
