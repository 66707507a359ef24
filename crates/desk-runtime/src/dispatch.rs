//! Comment dispatcher and state gate shared by the request handlers.
//!
//! Decides, from ticket status and comment metadata, whether an inbound
//! comment drives a reconciliation batch, a bot keyword, or gets handed
//! back to human support. Every failure path ends in a posted comment,
//! a state transition, or both.

use anyhow::Result;
use desk_commands::action_keyword;
use desk_directory::{DirectoryAdapter, DirectoryError, DirectoryRef, GroupLookup, GroupRecord};
use desk_ticket::{resolution, status, ChannelError, RequestContext, TicketChannel, TicketComment};

use crate::config::BotConfig;

pub const HELP_TEXT: &str = "All bot commands must be internal comments and the first \
word/phrase in the comment.\n\n\
Valid commands are:\n\
* retry to ask the bot to process the request again after issues have been resolved.";

const UNRECOGNISED_COMMENT: &str = "Your comment has not been recognised as an instruction to \
the bot so the ticket will be left for the support team to review.";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `HandlerEvent` values.
pub enum HandlerEvent {
    Created,
    Commented,
    Transitioned { to: String },
}

/// Lifecycle capabilities of one request-type handler.
pub trait RequestHandler {
    fn create(&self, ctx: &RequestContext) -> Result<()>;
    fn comment(&self, ctx: &RequestContext) -> Result<()>;
    fn transition(&self, status_to: &str, ctx: &RequestContext) -> Result<()>;
}

/// Runs one webhook event end-to-end. Handler errors never escape:
/// they are logged and reported as a private comment so the ticket is
/// never left silently stuck.
pub fn run_event(
    handler: &dyn RequestHandler,
    channel: &dyn TicketChannel,
    event: &HandlerEvent,
    ctx: &RequestContext,
) {
    let outcome = match event {
        HandlerEvent::Created => handler.create(ctx),
        HandlerEvent::Commented => handler.comment(ctx),
        HandlerEvent::Transitioned { to } => handler.transition(to, ctx),
    };
    if let Err(err) = outcome {
        tracing::error!(
            ticket = ctx.ticket_key.as_str(),
            error = %err,
            "request handler failed"
        );
        if let Err(post_err) = channel.post_comment(
            &format!("The automation hit an internal error and has stopped: {err}"),
            false,
        ) {
            tracing::error!(
                ticket = ctx.ticket_key.as_str(),
                error = %post_err,
                "failed to report handler error"
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The last comment on the ticket plus the bot keyword it starts with,
/// if the keyword is valid for the comment's visibility.
pub struct CommentTriage {
    pub comment: TicketComment,
    pub keyword: Option<String>,
}

/// Central comment triage: fetches the last comment and matches its
/// leading word against the keyword list for its visibility class.
pub fn triage_last_comment(
    channel: &dyn TicketChannel,
    public_keywords: &[&str],
    private_keywords: &[&str],
) -> Result<Option<CommentTriage>, ChannelError> {
    let Some(comment) = channel.last_comment()? else {
        return Ok(None);
    };
    let accepted = if comment.public {
        public_keywords
    } else {
        private_keywords
    };
    let keyword = action_keyword(&comment.body)
        .filter(|keyword| accepted.contains(&keyword.as_str()));
    Ok(Some(CommentTriage { comment, keyword }))
}

/// Whether a public comment should be interpreted by the bot at all:
/// the ticket is still open, the author is not the bot itself, and the
/// author is not a support-team member replying on behalf of the user.
pub fn eligible_public_comment(
    config: &BotConfig,
    channel: &dyn TicketChannel,
    directory: &dyn DirectoryAdapter,
    comment: &TicketComment,
) -> Result<bool> {
    if !comment.public
        || comment.author_name == config.bot_name
        || channel.current_status()? == status::RESOLVED
    {
        return Ok(false);
    }
    let from_support =
        directory.is_member_of_admin_group(&config.support_group, &comment.author_email)?;
    Ok(!from_support)
}

/// Hands the ticket back to human support after an unrecognized public
/// comment: status note for the agent, explanation for the customer,
/// then deassign.
pub fn hand_back_to_support(channel: &dyn TicketChannel) -> Result<()> {
    let current = channel.current_status()?;
    channel.post_comment(&format!("Current status is {current}"), false)?;
    channel.post_comment(UNRECOGNISED_COMMENT, true)?;
    channel.assign_to(None)?;
    Ok(())
}

/// Sanity-checks a group lookup: anything other than exactly one match
/// posts an explanation and resolves the ticket as "Won't Do". Returns
/// the single group when the lookup is usable.
pub fn require_single_group<'a>(
    channel: &dyn TicketChannel,
    lookup: &'a GroupLookup,
) -> Result<Option<&'a GroupRecord>> {
    match lookup.matches.len() {
        1 => Ok(lookup.matches.first()),
        0 => {
            channel.post_comment(
                "Sorry but the group's email address can't be found in the directory.",
                true,
            )?;
            channel.resolve(resolution::WONT_DO)?;
            Ok(None)
        }
        _ => {
            channel.post_comment(
                "Sorry but, somehow, the group's email address appears more than once in \
                 the directory.",
                true,
            )?;
            channel.resolve(resolution::WONT_DO)?;
            Ok(None)
        }
    }
}

/// Whether the reporter resolves to one of the given owner references.
pub fn reporter_is_owner(
    directory: &dyn DirectoryAdapter,
    reporter_email: &str,
    owners: &[DirectoryRef],
) -> Result<bool, DirectoryError> {
    let Some(identity) = directory.find_identity(reporter_email)? else {
        return Ok(false);
    };
    Ok(owners.contains(&identity))
}

pub(crate) fn refs_to_names(refs: &[DirectoryRef]) -> Vec<String> {
    refs.iter().map(|entry| entry.as_str().to_string()).collect()
}
