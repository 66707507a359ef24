use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workflow status names used by the request types this core serves.
pub mod status {
    pub const OPEN: &str = "Open";
    pub const IN_PROGRESS: &str = "In Progress";
    pub const NEEDS_APPROVAL: &str = "Needs approval";
    pub const WAITING_FOR_CUSTOMER: &str = "Waiting for customer";
    pub const RESOLVED: &str = "Resolved";
}

/// Resolution names accepted when closing a ticket.
pub mod resolution {
    pub const DONE: &str = "Done";
    pub const WONT_DO: &str = "Won't Do";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One comment as reported by the ticketing webhook.
pub struct TicketComment {
    pub body: String,
    pub public: bool,
    pub author_name: String,
    pub author_email: String,
}

#[derive(Debug, Error)]
/// Failure talking to the ticketing system.
pub enum ChannelError {
    #[error("ticketing API call failed: {0}")]
    Api(String),
}

/// Operations the dispatchers need from the ticketing system.
///
/// Implementations wrap the service-desk REST API; tests use recording
/// fakes. All calls are synchronous and fail fast.
pub trait TicketChannel {
    fn post_comment(&self, text: &str, public: bool) -> Result<(), ChannelError>;
    fn current_status(&self) -> Result<String, ChannelError>;
    fn transition_to(&self, status: &str) -> Result<(), ChannelError>;
    fn last_comment(&self) -> Result<Option<TicketComment>, ChannelError>;
    /// Assigns the ticket, or hands it back to the support queue with `None`.
    fn assign_to(&self, assignee: Option<&str>) -> Result<(), ChannelError>;
    fn set_summary(&self, summary: &str) -> Result<(), ChannelError>;
    fn assign_approvers(&self, approvers: &[String]) -> Result<(), ChannelError>;
    fn resolve(&self, resolution: &str) -> Result<(), ChannelError>;
}
