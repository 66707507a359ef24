//! Recording fakes shared by the handler tests.

use std::cell::RefCell;

use desk_ticket::{status, ChannelError, TicketChannel, TicketComment};

#[derive(Debug, Default)]
struct ChannelState {
    status: String,
    comments: Vec<(String, bool)>,
    transitions: Vec<String>,
    assignees: Vec<Option<String>>,
    summaries: Vec<String>,
    approver_sets: Vec<Vec<String>>,
    resolutions: Vec<String>,
    last_comment: Option<TicketComment>,
}

#[derive(Debug)]
/// Ticket channel that records every call for assertions.
pub struct RecordingChannel {
    state: RefCell<ChannelState>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        let channel = Self {
            state: RefCell::new(ChannelState::default()),
        };
        channel.state.borrow_mut().status = status::OPEN.to_string();
        channel
    }

    pub fn set_last_comment(&self, comment: TicketComment) {
        self.state.borrow_mut().last_comment = Some(comment);
    }

    pub fn force_status(&self, status: &str) {
        self.state.borrow_mut().status = status.to_string();
    }

    pub fn public_comments(&self) -> Vec<String> {
        self.comments_with_visibility(true)
    }

    pub fn private_comments(&self) -> Vec<String> {
        self.comments_with_visibility(false)
    }

    fn comments_with_visibility(&self, public: bool) -> Vec<String> {
        self.state
            .borrow()
            .comments
            .iter()
            .filter(|(_, visibility)| *visibility == public)
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub fn transitions(&self) -> Vec<String> {
        self.state.borrow().transitions.clone()
    }

    pub fn assignees(&self) -> Vec<Option<String>> {
        self.state.borrow().assignees.clone()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.state.borrow().summaries.clone()
    }

    pub fn approver_sets(&self) -> Vec<Vec<String>> {
        self.state.borrow().approver_sets.clone()
    }

    pub fn resolutions(&self) -> Vec<String> {
        self.state.borrow().resolutions.clone()
    }
}

impl TicketChannel for RecordingChannel {
    fn post_comment(&self, text: &str, public: bool) -> Result<(), ChannelError> {
        self.state
            .borrow_mut()
            .comments
            .push((text.to_string(), public));
        Ok(())
    }

    fn current_status(&self) -> Result<String, ChannelError> {
        Ok(self.state.borrow().status.clone())
    }

    fn transition_to(&self, status: &str) -> Result<(), ChannelError> {
        let mut state = self.state.borrow_mut();
        state.status = status.to_string();
        state.transitions.push(status.to_string());
        Ok(())
    }

    fn last_comment(&self) -> Result<Option<TicketComment>, ChannelError> {
        Ok(self.state.borrow().last_comment.clone())
    }

    fn assign_to(&self, assignee: Option<&str>) -> Result<(), ChannelError> {
        self.state
            .borrow_mut()
            .assignees
            .push(assignee.map(str::to_string));
        Ok(())
    }

    fn set_summary(&self, summary: &str) -> Result<(), ChannelError> {
        self.state.borrow_mut().summaries.push(summary.to_string());
        Ok(())
    }

    fn assign_approvers(&self, approvers: &[String]) -> Result<(), ChannelError> {
        self.state
            .borrow_mut()
            .approver_sets
            .push(approvers.to_vec());
        Ok(())
    }

    fn resolve(&self, resolution: &str) -> Result<(), ChannelError> {
        let mut state = self.state.borrow_mut();
        state.status = status::RESOLVED.to_string();
        state.resolutions.push(resolution.to_string());
        Ok(())
    }
}
