//! Ticket-side types shared across the Desk handlers.
//!
//! Provides typed custom-field access, the per-request context that
//! replaces ambient reporter/ticket globals, and the `TicketChannel`
//! trait the dispatchers drive the ticketing system through.

pub mod channel;
pub mod context;
pub mod fields;

pub use channel::{resolution, status, ChannelError, TicketChannel, TicketComment};
pub use context::RequestContext;
pub use fields::{FieldValue, TicketFields};
