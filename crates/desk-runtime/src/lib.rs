//! Request-type handlers and the comment dispatcher that drives them.
//!
//! Each handler reacts to ticket lifecycle events (create, comment,
//! transition) for one service-request type and turns field values and
//! free-text replies into directory mutations, approval routing and
//! comment responses.

pub mod config;
pub mod dispatch;
pub mod group_members;
pub mod group_ownership;
pub mod telemetry;

#[cfg(test)]
mod testkit;

pub use config::BotConfig;
pub use dispatch::{run_event, HandlerEvent, RequestHandler};
pub use group_members::GroupMembersHandler;
pub use group_ownership::GroupOwnershipHandler;
pub use telemetry::init_tracing;
