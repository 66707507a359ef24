//! End-to-end lifecycle runs for both request types, driven through the
//! public `run_event` entry point the webhook layer calls.

use std::cell::{Cell, RefCell};

use desk_directory::{DirectoryRef, InMemoryDirectory, PersonRecord};
use desk_reconcile::{SyncError, SyncTrigger};
use desk_runtime::{
    group_members, group_ownership, run_event, BotConfig, GroupMembersHandler,
    GroupOwnershipHandler, HandlerEvent,
};
use desk_ticket::{
    resolution, status, ChannelError, FieldValue, RequestContext, TicketChannel, TicketComment,
    TicketFields,
};

const GROUP: &str = "team@example.org";
const GROUP_REF: &str = "ref=team";

#[derive(Default)]
struct FakeChannel {
    status: RefCell<String>,
    comments: RefCell<Vec<(String, bool)>>,
    transitions: RefCell<Vec<String>>,
    assignees: RefCell<Vec<Option<String>>>,
    resolutions: RefCell<Vec<String>>,
    last_comment: RefCell<Option<TicketComment>>,
}

impl FakeChannel {
    fn new() -> Self {
        let channel = Self::default();
        *channel.status.borrow_mut() = status::OPEN.to_string();
        channel
    }

    fn say(&self, body: &str, public: bool, author_name: &str, author_email: &str) {
        *self.last_comment.borrow_mut() = Some(TicketComment {
            body: body.to_string(),
            public,
            author_name: author_name.to_string(),
            author_email: author_email.to_string(),
        });
    }

    fn public_comments(&self) -> Vec<String> {
        self.comments
            .borrow()
            .iter()
            .filter(|(_, public)| *public)
            .map(|(text, _)| text.clone())
            .collect()
    }

    fn private_comments(&self) -> Vec<String> {
        self.comments
            .borrow()
            .iter()
            .filter(|(_, public)| !public)
            .map(|(text, _)| text.clone())
            .collect()
    }
}

impl TicketChannel for FakeChannel {
    fn post_comment(&self, text: &str, public: bool) -> Result<(), ChannelError> {
        self.comments.borrow_mut().push((text.to_string(), public));
        Ok(())
    }

    fn current_status(&self) -> Result<String, ChannelError> {
        Ok(self.status.borrow().clone())
    }

    fn transition_to(&self, status: &str) -> Result<(), ChannelError> {
        *self.status.borrow_mut() = status.to_string();
        self.transitions.borrow_mut().push(status.to_string());
        Ok(())
    }

    fn last_comment(&self) -> Result<Option<TicketComment>, ChannelError> {
        Ok(self.last_comment.borrow().clone())
    }

    fn assign_to(&self, assignee: Option<&str>) -> Result<(), ChannelError> {
        self.assignees
            .borrow_mut()
            .push(assignee.map(str::to_string));
        Ok(())
    }

    fn set_summary(&self, _summary: &str) -> Result<(), ChannelError> {
        Ok(())
    }

    fn assign_approvers(&self, _approvers: &[String]) -> Result<(), ChannelError> {
        Ok(())
    }

    fn resolve(&self, resolution: &str) -> Result<(), ChannelError> {
        *self.status.borrow_mut() = status::RESOLVED.to_string();
        self.resolutions.borrow_mut().push(resolution.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct CountingSync {
    calls: Cell<usize>,
}

impl SyncTrigger for CountingSync {
    fn trigger_sync(&self) -> Result<(), SyncError> {
        self.calls.set(self.calls.get() + 1);
        Ok(())
    }
}

fn person(email: &str, display_name: Option<&str>) -> PersonRecord {
    PersonRecord {
        entry_ref: DirectoryRef::new(format!("ref={email}")),
        mail: Some(email.to_string()),
        display_name: display_name.map(str::to_string),
        given_name: None,
        surname: None,
    }
}

fn directory() -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();
    directory.insert_person(person("owner@x.com", Some("Olive Owner")), None);
    directory.insert_person(person("member@x.com", None), None);
    directory.insert_person(person("new@x.com", Some("Nina New")), None);
    directory
}

fn members_ctx(reporter: &str, added_removed: &str, addresses: &str) -> RequestContext {
    RequestContext::new(
        "ITS-42",
        reporter,
        TicketFields::new()
            .with(
                group_members::FIELD_GROUP_EMAIL,
                FieldValue::text(GROUP),
            )
            .with(
                group_members::FIELD_ADDED_REMOVED,
                FieldValue::single_select(added_removed),
            )
            .with(
                group_members::FIELD_MEMBER_ADDRESSES,
                FieldValue::text(addresses),
            ),
    )
}

fn ownership_ctx(reporter: &str, added_removed: &str, addresses: &str) -> RequestContext {
    RequestContext::new(
        "ITS-43",
        reporter,
        TicketFields::new()
            .with(
                group_ownership::FIELD_GROUP_EMAIL,
                FieldValue::text(GROUP),
            )
            .with(
                group_ownership::FIELD_ADDED_REMOVED,
                FieldValue::single_select(added_removed),
            )
            .with(
                group_ownership::FIELD_OWNER_ADDRESSES,
                FieldValue::text(addresses),
            ),
    )
}

#[test]
fn integration_member_request_from_owner_runs_to_waiting_then_follow_up() {
    let directory = directory();
    directory.insert_group(
        GROUP,
        GROUP_REF,
        Some(vec![DirectoryRef::new("ref=member@x.com")]),
        Some(vec![DirectoryRef::new("ref=owner@x.com")]),
    );
    let channel = FakeChannel::new();
    let sync = CountingSync::default();
    let config = BotConfig::default();
    let handler = GroupMembersHandler::new(&directory, &channel, &sync, &config);
    let ctx = members_ctx("owner@x.com", "Added", "new@x.com");

    // Owner-raised ticket skips approval.
    run_event(&handler, &channel, &HandlerEvent::Created, &ctx);
    assert_eq!(
        channel.transitions.borrow().as_slice(),
        [status::IN_PROGRESS]
    );

    // The status webhook fires and the field batch applies.
    run_event(
        &handler,
        &channel,
        &HandlerEvent::Transitioned {
            to: status::IN_PROGRESS.to_string(),
        },
        &ctx,
    );
    let snapshot = directory.group_snapshot(GROUP).expect("group");
    assert!(snapshot
        .member_refs()
        .contains(&DirectoryRef::new("ref=new@x.com")));
    assert_eq!(sync.calls.get(), 1);
    assert_eq!(
        channel.status.borrow().as_str(),
        status::WAITING_FOR_CUSTOMER
    );

    // The owner follows up with an explicit command comment.
    channel.say("remove member@x.com", true, "Olive Owner", "owner@x.com");
    run_event(&handler, &channel, &HandlerEvent::Commented, &ctx);
    let snapshot = directory.group_snapshot(GROUP).expect("group");
    assert!(!snapshot
        .member_refs()
        .contains(&DirectoryRef::new("ref=member@x.com")));
    assert_eq!(sync.calls.get(), 2);
    assert!(channel
        .public_comments()
        .iter()
        .any(|text| text.contains("Removing member@x.com")));
}

#[test]
fn integration_member_request_from_non_owner_resolves_after_approval_batch() {
    let directory = directory();
    directory.insert_group(
        GROUP,
        GROUP_REF,
        Some(Vec::new()),
        Some(vec![DirectoryRef::new("ref=owner@x.com")]),
    );
    let channel = FakeChannel::new();
    let sync = CountingSync::default();
    let config = BotConfig::default();
    let handler = GroupMembersHandler::new(&directory, &channel, &sync, &config);
    let ctx = members_ctx("member@x.com", "Added", "new@x.com");

    run_event(&handler, &channel, &HandlerEvent::Created, &ctx);
    assert_eq!(
        channel.transitions.borrow().as_slice(),
        [status::NEEDS_APPROVAL]
    );

    // An owner approved the ticket in the ticketing system, which moves
    // it to In Progress and fires the transition webhook.
    run_event(
        &handler,
        &channel,
        &HandlerEvent::Transitioned {
            to: status::IN_PROGRESS.to_string(),
        },
        &ctx,
    );
    assert_eq!(channel.resolutions.borrow().as_slice(), [resolution::DONE]);
    let snapshot = directory.group_snapshot(GROUP).expect("group");
    assert_eq!(snapshot.member_refs(), &[DirectoryRef::new("ref=new@x.com")]);

    // Comments after resolution are ignored.
    channel.say("add member@x.com", true, "Olive Owner", "owner@x.com");
    run_event(&handler, &channel, &HandlerEvent::Commented, &ctx);
    assert_eq!(sync.calls.get(), 1);
}

#[test]
fn integration_ownership_request_updates_owner_list_comment() {
    let directory = directory();
    directory.insert_group(
        GROUP,
        GROUP_REF,
        None,
        Some(vec![DirectoryRef::new("ref=owner@x.com")]),
    );
    let channel = FakeChannel::new();
    let sync = CountingSync::default();
    let config = BotConfig::default();
    let handler = GroupOwnershipHandler::new(&directory, &channel, &sync, &config);
    let ctx = ownership_ctx("owner@x.com", "Added", "new@x.com");

    run_event(&handler, &channel, &HandlerEvent::Created, &ctx);
    run_event(
        &handler,
        &channel,
        &HandlerEvent::Transitioned {
            to: status::IN_PROGRESS.to_string(),
        },
        &ctx,
    );

    let snapshot = directory.group_snapshot(GROUP).expect("group");
    assert_eq!(snapshot.owner_refs().len(), 2);
    let listing = channel
        .public_comments()
        .into_iter()
        .find(|text| text.contains("Here are the owners for the group:"))
        .expect("owner listing");
    assert!(listing.contains("[Olive Owner|mailto:owner@x.com]"));
    assert!(listing.contains("[Nina New|mailto:new@x.com]"));
    assert_eq!(sync.calls.get(), 1);
}

#[test]
fn integration_unrecognized_comment_hands_ticket_back_to_support() {
    let directory = directory();
    directory.insert_group(
        GROUP,
        GROUP_REF,
        None,
        Some(vec![DirectoryRef::new("ref=owner@x.com")]),
    );
    let channel = FakeChannel::new();
    let sync = CountingSync::default();
    let config = BotConfig::default();
    let handler = GroupMembersHandler::new(&directory, &channel, &sync, &config);
    let ctx = members_ctx("owner@x.com", "Added", "");

    channel.say("any update on this?", true, "Olive Owner", "owner@x.com");
    run_event(&handler, &channel, &HandlerEvent::Commented, &ctx);

    assert!(channel
        .public_comments()
        .iter()
        .any(|text| text.contains("has not been recognised")));
    assert_eq!(channel.assignees.borrow().as_slice(), [None]);
    assert_eq!(sync.calls.get(), 0);
}

#[test]
fn integration_handler_failure_surfaces_as_private_comment() {
    // No group registered and mutations never run, but the directory
    // errors on membership lookups for the fallback approver group.
    let directory = directory();
    directory.insert_group(GROUP, GROUP_REF, None, None);
    let channel = FakeChannel::new();
    let sync = CountingSync::default();
    let config = BotConfig::default();
    let handler = GroupMembersHandler::new(&directory, &channel, &sync, &config);
    let ctx = members_ctx("member@x.com", "Added", "new@x.com");

    // The fallback approver group does not exist, so create fails and
    // the dispatcher reports it instead of dropping the ticket.
    run_event(&handler, &channel, &HandlerEvent::Created, &ctx);
    assert!(channel
        .private_comments()
        .iter()
        .any(|text| text.contains("internal error")));
}
