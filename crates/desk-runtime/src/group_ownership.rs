//! Handler for the group-ownership request type.
//!
//! Same lifecycle shape as the members handler, but batches target the
//! owner attribute, unrecognized keywords stop the batch, and every
//! successful change is followed by a fresh owner-list comment.

use anyhow::Result;
use desk_commands::{split_comment_lines, split_field_lines, BatchMode, ChangeAction};
use desk_directory::{DirectoryAdapter, DirectoryRef, GroupAttr, GroupRecord};
use desk_reconcile::{
    reconcile_batch, ReconcileOptions, SyncTrigger, TargetSet, UnrecognizedActionPolicy,
};
use desk_ticket::{resolution, status, RequestContext, TicketChannel, TicketComment};

use crate::config::BotConfig;
use crate::dispatch::{
    eligible_public_comment, hand_back_to_support, refs_to_names, reporter_is_owner,
    require_single_group, triage_last_comment, RequestHandler, HELP_TEXT,
};

pub const FIELD_GROUP_EMAIL: &str = "group_email_address";
pub const FIELD_OWNER_ADDRESSES: &str = "group_owners";
pub const FIELD_ADDED_REMOVED: &str = "added_removed";

const AUTOMATION_MAINTAINED: &str = "Sorry but the ownership of this group is maintained by \
automation, so owners cannot be added or removed through this request.";

const FOLLOW_UP_INVITE: &str = "As you are an owner of this group, you can make further \
changes to the ownership by posting new comments to this ticket with the following format:\n\
*add* <email address>\n\
*remove* <email address>\n\
One command per line but you can have multiple changes in a single comment. If you do not \
get the syntax right, the automation will not be able to understand your request and \
processing will stop.";

pub struct GroupOwnershipHandler<'a> {
    directory: &'a dyn DirectoryAdapter,
    channel: &'a dyn TicketChannel,
    sync: &'a dyn SyncTrigger,
    config: &'a BotConfig,
}

impl<'a> GroupOwnershipHandler<'a> {
    pub fn new(
        directory: &'a dyn DirectoryAdapter,
        channel: &'a dyn TicketChannel,
        sync: &'a dyn SyncTrigger,
        config: &'a BotConfig,
    ) -> Self {
        Self {
            directory,
            channel,
            sync,
            config,
        }
    }

    fn group_key(&self, ctx: &RequestContext) -> String {
        ctx.field(FIELD_GROUP_EMAIL)
            .as_text()
            .unwrap_or("")
            .trim()
            .to_lowercase()
    }

    fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            target_set: TargetSet::Owners,
            unrecognized_action: UnrecognizedActionPolicy::StopBatch,
            sync_delay_minutes: self.config.sync_delay_minutes,
            creation_portal_url: None,
        }
    }

    /// Posts the group's current owner list as a public comment,
    /// re-fetched so it reflects any batch that just ran.
    fn post_owners_comment(&self, group_key: &str) -> Result<()> {
        let lookup = self.directory.find_group(group_key, &[GroupAttr::Owners])?;
        let owners = lookup
            .single()
            .map(GroupRecord::owner_refs)
            .unwrap_or_default();
        if owners.is_empty() {
            self.channel
                .post_comment("There are no owners for the group.", true)?;
            return Ok(());
        }
        let mut body = String::from("Here are the owners for the group:\n");
        for owner in owners {
            body.push_str(&self.owner_list_line(owner)?);
        }
        self.channel.post_comment(&body, true)?;
        Ok(())
    }

    fn owner_list_line(&self, owner: &DirectoryRef) -> Result<String> {
        let Some(person) = self.directory.find_person(owner)? else {
            return Ok(format!("* {owner}\n"));
        };
        let name = person
            .best_display_name()
            .unwrap_or_else(|| owner.as_str().to_string());
        match &person.mail {
            Some(mail) => Ok(format!("* [{name}|mailto:{mail}]\n")),
            None => Ok(format!("* {name}\n")),
        }
    }

    /// Approval routing for a freshly created ticket. Owner sets that
    /// contain only the bot are automation-maintained and refused.
    fn route_for_approval(&self, ctx: &RequestContext, group: &GroupRecord) -> Result<()> {
        let owners = group.owner_refs();
        if owners.len() == 1 && owners[0].as_str() == self.config.bot_directory_ref {
            self.channel.post_comment(AUTOMATION_MAINTAINED, true)?;
            self.channel.resolve(resolution::DONE)?;
            return Ok(());
        }

        if ctx.field(FIELD_OWNER_ADDRESSES).as_text().unwrap_or("").trim().is_empty() {
            // Nothing to change; treat the ticket as an ownership query.
            self.post_owners_comment(&group.key)?;
            if !owners.is_empty()
                && reporter_is_owner(self.directory, &ctx.reporter_email, owners)?
            {
                self.channel.post_comment(FOLLOW_UP_INVITE, true)?;
                self.channel.transition_to(status::WAITING_FOR_CUSTOMER)?;
            } else {
                if let Some(portal) = &self.config.ownership_portal_url {
                    self.channel.post_comment(
                        &format!(
                            "If you want to change the owners of this group, please raise a \
                             request via {portal}."
                        ),
                        true,
                    )?;
                }
                self.channel.resolve(resolution::DONE)?;
            }
            return Ok(());
        }

        if owners.is_empty() {
            if self
                .directory
                .is_member_of_admin_group(&self.config.support_group, &ctx.reporter_email)?
            {
                self.channel.transition_to(status::IN_PROGRESS)?;
                return Ok(());
            }
            self.channel.post_comment(
                "This group has no owners. Asking the support team to review your request.",
                true,
            )?;
            let fallback = self
                .directory
                .group_membership(&self.config.fallback_approver_group)?;
            self.channel.assign_approvers(&refs_to_names(&fallback))?;
            self.channel.transition_to(status::NEEDS_APPROVAL)?;
            return Ok(());
        }

        if reporter_is_owner(self.directory, &ctx.reporter_email, owners)? {
            self.channel.transition_to(status::IN_PROGRESS)?;
        } else {
            self.channel.post_comment(
                "As you are not an owner of this group, the owners will be asked to approve \
                 or decline your request.",
                true,
            )?;
            self.channel.assign_approvers(&refs_to_names(owners))?;
            self.channel.transition_to(status::NEEDS_APPROVAL)?;
        }
        Ok(())
    }

    /// Applies the structured field batch once the ticket reaches
    /// "In Progress".
    fn apply_field_batch(&self, ctx: &RequestContext, group: &GroupRecord) -> Result<()> {
        let changes = ctx.field(FIELD_OWNER_ADDRESSES).as_text().unwrap_or("");
        let batch = split_field_lines(changes);
        let action = match ctx.field(FIELD_ADDED_REMOVED).as_select() {
            Some("Removed") => ChangeAction::Remove,
            _ => ChangeAction::Add,
        };
        let report = reconcile_batch(
            self.directory,
            self.sync,
            &group.key,
            &batch,
            BatchMode::Implicit(action),
            &self.reconcile_options(),
        )?;
        if report.has_transcript() {
            self.channel.post_comment(&report.transcript, true)?;
        }
        self.post_owners_comment(&group.key)?;

        // Follow-up eligibility is judged against the pre-change owner
        // set, matching the approval the ticket went through.
        if !group.owner_refs().is_empty()
            && reporter_is_owner(self.directory, &ctx.reporter_email, group.owner_refs())?
        {
            self.channel.post_comment(FOLLOW_UP_INVITE, true)?;
            self.channel.transition_to(status::WAITING_FOR_CUSTOMER)?;
        } else {
            self.channel.resolve(resolution::DONE)?;
        }
        Ok(())
    }

    /// Follow-up change batch driven by a public comment. Returns false
    /// when the comment could not be handled and the ticket should go
    /// back to human support.
    fn process_public_command(&self, ctx: &RequestContext, comment: &TicketComment) -> Result<bool> {
        self.channel.assign_to(Some(&self.config.bot_name))?;
        let lookup = self
            .directory
            .find_group(&self.group_key(ctx), &[GroupAttr::Owners])?;
        let Some(group) = require_single_group(self.channel, &lookup)? else {
            return Ok(true);
        };
        if group.owner_refs().is_empty()
            || !reporter_is_owner(self.directory, &ctx.reporter_email, group.owner_refs())?
        {
            return Ok(false);
        }
        let batch = split_comment_lines(&comment.body);
        let report = reconcile_batch(
            self.directory,
            self.sync,
            &group.key,
            &batch,
            BatchMode::Explicit,
            &self.reconcile_options(),
        )?;
        if report.has_transcript() {
            self.channel.post_comment(&report.transcript, true)?;
        }
        if report.changed {
            self.post_owners_comment(&group.key)?;
        }
        Ok(true)
    }
}

impl RequestHandler for GroupOwnershipHandler<'_> {
    fn create(&self, ctx: &RequestContext) -> Result<()> {
        let lookup = self
            .directory
            .find_group(&self.group_key(ctx), &[GroupAttr::Owners])?;
        self.channel.set_summary(&format!(
            "Change group ownership for {}",
            lookup.resolved_key
        ))?;
        self.channel.assign_to(Some(&self.config.bot_name))?;
        let Some(group) = require_single_group(self.channel, &lookup)? else {
            return Ok(());
        };
        self.route_for_approval(ctx, group)
    }

    fn comment(&self, ctx: &RequestContext) -> Result<()> {
        let Some(triage) =
            triage_last_comment(self.channel, &["add", "remove"], &["help", "retry"])?
        else {
            return Ok(());
        };

        if !triage.comment.public {
            match triage.keyword.as_deref() {
                Some("help") => {
                    self.channel.post_comment(HELP_TEXT, false)?;
                }
                Some("retry") => {
                    self.channel.transition_to(status::OPEN)?;
                    self.create(ctx)?;
                }
                _ => {}
            }
            return Ok(());
        }

        if !eligible_public_comment(self.config, self.channel, self.directory, &triage.comment)? {
            return Ok(());
        }
        let handled =
            triage.keyword.is_some() && self.process_public_command(ctx, &triage.comment)?;
        if !handled {
            hand_back_to_support(self.channel)?;
        }
        Ok(())
    }

    fn transition(&self, status_to: &str, ctx: &RequestContext) -> Result<()> {
        if status_to != status::IN_PROGRESS {
            return Ok(());
        }
        let lookup = self
            .directory
            .find_group(&self.group_key(ctx), &[GroupAttr::Owners])?;
        let Some(group) = require_single_group(self.channel, &lookup)? else {
            return Ok(());
        };
        self.apply_field_batch(ctx, group)
    }
}
