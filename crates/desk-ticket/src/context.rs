use serde::{Deserialize, Serialize};

use crate::fields::{FieldValue, TicketFields};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Per-request snapshot threaded explicitly through every handler call.
///
/// Carries who raised the ticket and the field values captured at event
/// time, so no handler reads ambient process-wide state.
pub struct RequestContext {
    pub ticket_key: String,
    pub reporter_email: String,
    pub fields: TicketFields,
}

impl RequestContext {
    pub fn new(
        ticket_key: impl Into<String>,
        reporter_email: impl Into<String>,
        fields: TicketFields,
    ) -> Self {
        Self {
            ticket_key: ticket_key.into(),
            reporter_email: reporter_email.into(),
            fields,
        }
    }

    pub fn field(&self, field_id: &str) -> &FieldValue {
        self.fields.field(field_id)
    }
}
