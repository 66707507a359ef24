//! Handler for the add/remove-group-members request type.
//!
//! Create routes the request for approval, the transition into
//! "In Progress" applies the structured field batch, and follow-up
//! public comments from a group owner drive further explicit-mode
//! batches.

use anyhow::Result;
use desk_commands::{split_comment_lines, split_field_lines, BatchMode, ChangeAction};
use desk_directory::{DirectoryAdapter, GroupAttr, GroupRecord};
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
pub const FIELD_MEMBER_ADDRESSES: &str = "group_member_email_addresses";
pub const FIELD_ADDED_REMOVED: &str = "added_removed";

const FOLLOW_UP_INVITE: &str = "As you are an owner of this group, you can make further \
changes to the membership by posting new comments to this ticket with the following format:\n\
*add* <email address>\n\
*remove* <email address>\n\
One command per line but you can have multiple changes in a single comment. If you do not \
get the syntax right, the automation will not be able to understand your request and \
processing will stop.";

pub struct GroupMembersHandler<'a> {
    directory: &'a dyn DirectoryAdapter,
    channel: &'a dyn TicketChannel,
    sync: &'a dyn SyncTrigger,
    config: &'a BotConfig,
}

impl<'a> GroupMembersHandler<'a> {
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
            target_set: TargetSet::Members,
            unrecognized_action: UnrecognizedActionPolicy::ContinueBatch,
            sync_delay_minutes: self.config.sync_delay_minutes,
            creation_portal_url: self.config.contact_portal_url.clone(),
        }
    }

    /// Approval routing for a freshly created ticket.
    fn route_for_approval(&self, ctx: &RequestContext, group: &GroupRecord) -> Result<()> {
        let owners = group.owner_refs();
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

        if owners
            .iter()
            .any(|owner| owner.as_str() == self.config.bot_directory_ref)
        {
            self.channel.post_comment(
                "Sorry but the membership of this group is maintained automatically.",
                true,
            )?;
            self.channel.resolve(resolution::WONT_DO)?;
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
        let changes = ctx.field(FIELD_MEMBER_ADDRESSES).as_text().unwrap_or("");
        let batch = split_field_lines(changes);
        let action = match ctx.field(FIELD_ADDED_REMOVED).as_select() {
            Some("Added") => ChangeAction::Add,
            _ => ChangeAction::Remove,
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
        // The group may have changed or vanished since the ticket was
        // raised, so resolve it again.
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
        Ok(true)
    }
}

impl RequestHandler for GroupMembersHandler<'_> {
    fn create(&self, ctx: &RequestContext) -> Result<()> {
        let lookup = self
            .directory
            .find_group(&self.group_key(ctx), &[GroupAttr::Owners])?;
        self.channel.set_summary(&format!(
            "Add/Remove group members for {}",
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
