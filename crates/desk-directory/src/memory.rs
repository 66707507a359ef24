use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::adapter::{DirectoryAdapter, DirectoryError};
use crate::record::{DirectoryRef, GroupAttr, GroupLookup, GroupRecord, PersonRecord};

#[derive(Debug, Clone)]
struct StoredGroup {
    key: String,
    entry_ref: DirectoryRef,
    members: Option<Vec<DirectoryRef>>,
    owners: Option<Vec<DirectoryRef>>,
}

#[derive(Debug, Default)]
struct State {
    groups: Vec<StoredGroup>,
    people: BTreeMap<String, PersonRecord>,
    emails: BTreeMap<String, DirectoryRef>,
    uids: BTreeMap<String, DirectoryRef>,
    refuse_targets: Vec<String>,
    mutation_log: Vec<String>,
}

#[derive(Debug, Default)]
/// Deterministic in-process directory.
///
/// Backs the test suites and doubles as the reference semantics for
/// adapter implementations: case-insensitive email resolution, attribute
/// selection on group lookups, and per-target mutation refusal.
///
/// Single-threaded by design, matching the synchronous request model.
pub struct InMemoryDirectory {
    state: RefCell<State>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a group entry. Registering the same key twice produces
    /// duplicate matches, which callers must treat as a sanity failure.
    pub fn insert_group(
        &self,
        key: impl Into<String>,
        entry_ref: impl Into<String>,
        members: Option<Vec<DirectoryRef>>,
        owners: Option<Vec<DirectoryRef>>,
    ) {
        self.state.borrow_mut().groups.push(StoredGroup {
            key: key.into(),
            entry_ref: DirectoryRef::new(entry_ref),
            members,
            owners,
        });
    }

    /// Registers a person entry, indexed by mail (case-insensitive) and
    /// optionally by a short uid.
    pub fn insert_person(&self, record: PersonRecord, uid: Option<&str>) {
        let mut state = self.state.borrow_mut();
        if let Some(mail) = &record.mail {
            state
                .emails
                .insert(mail.trim().to_lowercase(), record.entry_ref.clone());
        }
        if let Some(uid) = uid {
            state
                .uids
                .insert(uid.trim().to_lowercase(), record.entry_ref.clone());
        }
        state
            .people
            .insert(record.entry_ref.as_str().to_string(), record);
    }

    /// Makes every future mutation touching `entry_ref` fail.
    pub fn refuse_mutations_for(&self, entry_ref: &str) {
        self.state
            .borrow_mut()
            .refuse_targets
            .push(entry_ref.to_string());
    }

    /// Ordered record of accepted mutations, for assertions.
    pub fn mutation_log(&self) -> Vec<String> {
        self.state.borrow().mutation_log.clone()
    }

    /// Current stored state of a group, for assertions.
    pub fn group_snapshot(&self, key: &str) -> Option<GroupRecord> {
        let needle = key.trim().to_lowercase();
        let state = self.state.borrow();
        state
            .groups
            .iter()
            .find(|group| group.key.to_lowercase() == needle)
            .map(|group| GroupRecord {
                key: group.key.clone(),
                entry_ref: group.entry_ref.clone(),
                members: group.members.clone(),
                owners: group.owners.clone(),
            })
    }

    fn mutate_group<F>(
        &self,
        group_key: &str,
        identity: &DirectoryRef,
        log_op: &str,
        apply: F,
    ) -> Result<(), DirectoryError>
    where
        F: FnOnce(&mut StoredGroup, &DirectoryRef),
    {
        let needle = group_key.trim().to_lowercase();
        let mut state = self.state.borrow_mut();
        if state
            .refuse_targets
            .iter()
            .any(|target| target == identity.as_str())
        {
            return Err(DirectoryError::Mutation {
                target: identity.as_str().to_string(),
                message: "update refused by directory".to_string(),
            });
        }
        let entry = format!("{log_op} {group_key} {identity}");
        let group = state
            .groups
            .iter_mut()
            .find(|group| group.key.to_lowercase() == needle)
            .ok_or_else(|| DirectoryError::Lookup(format!("no such group '{group_key}'")))?;
        apply(group, identity);
        state.mutation_log.push(entry);
        Ok(())
    }
}

fn push_unique(set: &mut Option<Vec<DirectoryRef>>, identity: &DirectoryRef) {
    let values = set.get_or_insert_with(Vec::new);
    if !values.contains(identity) {
        values.push(identity.clone());
    }
}

fn drop_entry(set: &mut Option<Vec<DirectoryRef>>, identity: &DirectoryRef) {
    if let Some(values) = set {
        values.retain(|value| value != identity);
    }
}

impl DirectoryAdapter for InMemoryDirectory {
    fn find_group(&self, key: &str, attrs: &[GroupAttr]) -> Result<GroupLookup, DirectoryError> {
        let needle = key.trim().to_lowercase();
        let state = self.state.borrow();
        let matches: Vec<GroupRecord> = state
            .groups
            .iter()
            .filter(|group| group.key.to_lowercase() == needle)
            .map(|group| GroupRecord {
                key: group.key.clone(),
                entry_ref: group.entry_ref.clone(),
                members: attrs
                    .contains(&GroupAttr::Members)
                    .then(|| group.members.clone())
                    .flatten(),
                owners: attrs
                    .contains(&GroupAttr::Owners)
                    .then(|| group.owners.clone())
                    .flatten(),
            })
            .collect();
        let resolved_key = matches
            .first()
            .map(|group| group.key.clone())
            .unwrap_or(needle);
        Ok(GroupLookup {
            resolved_key,
            matches,
        })
    }

    fn find_identity(&self, email_or_uid: &str) -> Result<Option<DirectoryRef>, DirectoryError> {
        let needle = email_or_uid.trim().to_lowercase();
        let state = self.state.borrow();
        let resolved = if needle.contains('@') {
            state.emails.get(&needle)
        } else {
            state.uids.get(&needle)
        };
        Ok(resolved.cloned())
    }

    fn add_member(&self, group_key: &str, identity: &DirectoryRef) -> Result<(), DirectoryError> {
        self.mutate_group(group_key, identity, "add_member", |group, identity| {
            push_unique(&mut group.members, identity);
        })
    }

    fn remove_member(
        &self,
        group_key: &str,
        identity: &DirectoryRef,
    ) -> Result<(), DirectoryError> {
        self.mutate_group(group_key, identity, "remove_member", |group, identity| {
            drop_entry(&mut group.members, identity);
        })
    }

    fn add_owner(&self, group_key: &str, identity: &DirectoryRef) -> Result<(), DirectoryError> {
        self.mutate_group(group_key, identity, "add_owner", |group, identity| {
            push_unique(&mut group.owners, identity);
        })
    }

    fn remove_owner(&self, group_key: &str, identity: &DirectoryRef) -> Result<(), DirectoryError> {
        self.mutate_group(group_key, identity, "remove_owner", |group, identity| {
            drop_entry(&mut group.owners, identity);
        })
    }

    fn group_membership(&self, group_key: &str) -> Result<Vec<DirectoryRef>, DirectoryError> {
        let needle = group_key.trim().to_lowercase();
        let state = self.state.borrow();
        let group = state
            .groups
            .iter()
            .find(|group| group.key.to_lowercase() == needle)
            .ok_or_else(|| DirectoryError::Lookup(format!("no such group '{group_key}'")))?;
        Ok(group.members.clone().unwrap_or_default())
    }

    fn is_member_of_admin_group(
        &self,
        group_name: &str,
        email: &str,
    ) -> Result<bool, DirectoryError> {
        let Some(identity) = self.find_identity(email)? else {
            return Ok(false);
        };
        let needle = group_name.trim().to_lowercase();
        let state = self.state.borrow();
        let member = state
            .groups
            .iter()
            .filter(|group| group.key.to_lowercase() == needle)
            .any(|group| {
                group
                    .members
                    .as_deref()
                    .unwrap_or(&[])
                    .contains(&identity)
            });
        Ok(member)
    }

    fn find_person(&self, entry: &DirectoryRef) -> Result<Option<PersonRecord>, DirectoryError> {
        Ok(self.state.borrow().people.get(entry.as_str()).cloned())
    }
}
