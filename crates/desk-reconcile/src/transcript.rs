//! Fixed transcript line templates. Each `ChangeResult` maps to exactly
//! one template; the wording tracks what users already see in replies.

use desk_commands::ChangeAction;

use crate::outcome::TargetSet;

pub(crate) fn unresolved_line(
    action: ChangeAction,
    target: &str,
    creation_portal_url: Option<&str>,
) -> String {
    match action {
        ChangeAction::Add => match creation_portal_url {
            Some(url) => format!(
                "Couldn't find an entry '{target}' in the directory. Please use {url} to \
                 create a contact (email only) or external account (if login required) and \
                 then submit a new ticket to add them."
            ),
            None => format!("Couldn't find an entry '{target}' in the directory."),
        },
        ChangeAction::Remove => {
            format!("Couldn't find an entry '{target}' in the directory. Did you mistype?")
        }
    }
}

pub(crate) fn self_reference_line(target_set: TargetSet) -> String {
    format!(
        "You cannot add the group as {} to itself.",
        target_set.noun_with_article()
    )
}

pub(crate) fn already_present_line(target: &str, target_set: TargetSet) -> String {
    format!(
        "{target} is already {} of the group.",
        target_set.noun_with_article()
    )
}

pub(crate) fn applying_line(action: ChangeAction, target: &str) -> String {
    match action {
        ChangeAction::Add => format!("Adding {target}"),
        ChangeAction::Remove => format!("Removing {target}"),
    }
}

pub(crate) fn already_absent_line(target: &str, target_set: TargetSet) -> String {
    format!(
        "{target} is not {} of the group so it cannot be removed as one.",
        target_set.noun_with_article()
    )
}

pub(crate) fn unrecognized_action_line(keyword: &str) -> String {
    format!("{keyword} is not recognised as 'add' or 'remove'.")
}

pub(crate) fn mutation_failed_line(action: ChangeAction, target: &str) -> String {
    format!(
        "Failed to {} {target}: the directory did not accept the change.",
        action.as_str()
    )
}

pub(crate) fn structural_stop_line(line: &str) -> String {
    format!(
        "Couldn't find a command at the start of '{line}'. \
         *Processing of this request will now stop.*"
    )
}

pub(crate) fn propagation_note(sync_delay_minutes: u32) -> String {
    format!(
        "Please note it can take up to {sync_delay_minutes} minutes for these changes to \
         reach downstream systems."
    )
}
