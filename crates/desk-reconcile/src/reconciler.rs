use desk_commands::{parse_line, ActionToken, BatchMode, ChangeAction, ParseError};
use desk_directory::{DirectoryAdapter, DirectoryError, DirectoryRef};

use crate::outcome::{ChangeResult, TargetSet};
use crate::sync::SyncTrigger;
use crate::transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What to do with a line whose keyword is neither `add` nor `remove`.
/// The two request types that share this reconciler historically
/// disagreed, so the policy is chosen per call site.
pub enum UnrecognizedActionPolicy {
    StopBatch,
    ContinueBatch,
}

#[derive(Debug, Clone)]
/// Per-call-site reconciliation settings.
pub struct ReconcileOptions {
    pub target_set: TargetSet,
    pub unrecognized_action: UnrecognizedActionPolicy,
    /// Minutes quoted in the trailing propagation note.
    pub sync_delay_minutes: u32,
    /// Portal to point at when an add target cannot be resolved.
    pub creation_portal_url: Option<String>,
}

impl ReconcileOptions {
    pub fn for_target(target_set: TargetSet) -> Self {
        Self {
            target_set,
            unrecognized_action: UnrecognizedActionPolicy::ContinueBatch,
            sync_delay_minutes: 15,
            creation_portal_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a batch run produced. The transcript is posted by the caller as
/// one public comment when non-empty.
pub struct BatchReport {
    pub transcript: String,
    pub changed: bool,
    pub sync_triggered: bool,
    pub results: Vec<ChangeResult>,
}

impl BatchReport {
    pub fn has_transcript(&self) -> bool {
        !self.transcript.is_empty()
    }
}

/// Applies a batch of raw lines against the group's current
/// member/owner set.
///
/// The set is re-read at batch start; the in-memory working copy is
/// updated alongside each accepted mutation so later lines in the same
/// batch see earlier changes. Iteration stops at the first blank line
/// (signature-block guard) and on a structural parse failure. The sync
/// trigger fires once, and only when at least one mutation succeeded.
pub fn reconcile_batch(
    directory: &dyn DirectoryAdapter,
    sync: &dyn SyncTrigger,
    group_key: &str,
    lines: &[String],
    mode: BatchMode,
    options: &ReconcileOptions,
) -> Result<BatchReport, DirectoryError> {
    let lookup = directory.find_group(group_key, &[options.target_set.attr()])?;
    let Some(group) = lookup.single() else {
        // Callers sanity-check group resolution before reconciling.
        return Err(DirectoryError::Lookup(format!(
            "group '{group_key}' resolved to {} entries",
            lookup.matches.len()
        )));
    };
    let group_ref = group.entry_ref.clone();
    let mut working: Vec<DirectoryRef> = match options.target_set {
        TargetSet::Members => group.member_refs().to_vec(),
        TargetSet::Owners => group.owner_refs().to_vec(),
    };

    let mut transcript_lines: Vec<String> = Vec::new();
    let mut results: Vec<ChangeResult> = Vec::new();
    let mut changed = false;

    for raw in lines {
        if raw.trim().is_empty() {
            // Intentional batch terminator; guards against email
            // signature blocks below a reply.
            break;
        }
        let parsed = match parse_line(raw, mode) {
            Ok(parsed) => parsed,
            Err(ParseError::MissingCommand { line }) => {
                transcript_lines.push(transcript::structural_stop_line(&line));
                results.push(ChangeResult::StructuralFailure { line });
                break;
            }
        };
        let action = match parsed.action {
            ActionToken::Recognized(action) => action,
            ActionToken::Unrecognized(keyword) => {
                transcript_lines.push(transcript::unrecognized_action_line(&keyword));
                results.push(ChangeResult::UnrecognizedAction { keyword });
                match options.unrecognized_action {
                    UnrecognizedActionPolicy::StopBatch => break,
                    UnrecognizedActionPolicy::ContinueBatch => continue,
                }
            }
        };
        let target = parsed.target;
        let Some(identity) = directory.find_identity(&target)? else {
            transcript_lines.push(transcript::unresolved_line(
                action,
                &target,
                options.creation_portal_url.as_deref(),
            ));
            results.push(ChangeResult::UnresolvedIdentity { action, target });
            continue;
        };
        // Rejected before the already-present check so it fires even if
        // the group is incorrectly listed inside itself.
        if action == ChangeAction::Add && identity == group_ref {
            transcript_lines.push(transcript::self_reference_line(options.target_set));
            results.push(ChangeResult::SelfReferenceRejected { target });
            continue;
        }
        let present = working.contains(&identity);
        match (action, present) {
            (ChangeAction::Add, true) => {
                transcript_lines.push(transcript::already_present_line(
                    &target,
                    options.target_set,
                ));
                results.push(ChangeResult::AlreadyPresent { target });
            }
            (ChangeAction::Remove, false) => {
                transcript_lines.push(transcript::already_absent_line(
                    &target,
                    options.target_set,
                ));
                results.push(ChangeResult::AlreadyAbsent { target });
            }
            (action, _) => {
                let mutation = match (action, options.target_set) {
                    (ChangeAction::Add, TargetSet::Members) => {
                        directory.add_member(group_key, &identity)
                    }
                    (ChangeAction::Remove, TargetSet::Members) => {
                        directory.remove_member(group_key, &identity)
                    }
                    (ChangeAction::Add, TargetSet::Owners) => {
                        directory.add_owner(group_key, &identity)
                    }
                    (ChangeAction::Remove, TargetSet::Owners) => {
                        directory.remove_owner(group_key, &identity)
                    }
                };
                match mutation {
                    Ok(()) => {
                        transcript_lines.push(transcript::applying_line(action, &target));
                        match action {
                            ChangeAction::Add => working.push(identity),
                            ChangeAction::Remove => working.retain(|entry| *entry != identity),
                        }
                        changed = true;
                        tracing::debug!(
                            group = group_key,
                            target = target.as_str(),
                            action = action.as_str(),
                            "applied directory change"
                        );
                        results.push(ChangeResult::Applied { action, target });
                    }
                    Err(err) => {
                        tracing::warn!(
                            group = group_key,
                            target = target.as_str(),
                            error = %err,
                            "directory refused mutation"
                        );
                        transcript_lines.push(transcript::mutation_failed_line(action, &target));
                        results.push(ChangeResult::MutationFailed { action, target });
                    }
                }
            }
        }
    }

    let mut sync_triggered = false;
    if changed {
        match sync.trigger_sync() {
            Ok(()) => sync_triggered = true,
            Err(err) => {
                // Fire-and-forget: report, never roll back.
                tracing::warn!(group = group_key, error = %err, "sync trigger failed");
            }
        }
        transcript_lines.push(transcript::propagation_note(options.sync_delay_minutes));
    }

    Ok(BatchReport {
        transcript: transcript_lines.join("\n"),
        changed,
        sync_triggered,
        results,
    })
}
