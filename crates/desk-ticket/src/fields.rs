use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const EMPTY: FieldValue = FieldValue::Empty;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Tagged custom-field value as delivered by the ticketing webhook.
///
/// An absent field and a field explicitly set to nothing both surface as
/// `Empty`; handlers never see raw JSON dictionaries.
pub enum FieldValue {
    Text { value: String },
    SingleSelect { value: String },
    MultiUser { account_ids: Vec<String> },
    Empty,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn single_select(value: impl Into<String>) -> Self {
        Self::SingleSelect {
            value: value.into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_select(&self) -> Option<&str> {
        match self {
            Self::SingleSelect { value } => Some(value),
            _ => None,
        }
    }

    pub fn account_ids(&self) -> &[String] {
        match self {
            Self::MultiUser { account_ids } => account_ids,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Custom-field map for one ticket, keyed by stable field id.
pub struct TicketFields(BTreeMap<String, FieldValue>);

impl TicketFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field_id: impl Into<String>, value: FieldValue) {
        self.0.insert(field_id.into(), value);
    }

    pub fn with(mut self, field_id: impl Into<String>, value: FieldValue) -> Self {
        self.insert(field_id, value);
        self
    }

    /// Looks up a field; a missing field reads as `Empty`.
    pub fn field(&self, field_id: &str) -> &FieldValue {
        self.0.get(field_id).unwrap_or(&EMPTY)
    }
}
