use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// One element of the backend's action-item array, kept exactly as the
/// backend returned it. Extra keys and non-string deadlines survive a
/// save/load cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionItem(Value);

impl ActionItem {
    pub fn new(task: impl Into<String>, deadline: Option<&str>) -> Self {
        let mut fields = Map::new();
        fields.insert("task".to_string(), Value::String(task.into()));
        fields.insert(
            "deadline".to_string(),
            deadline.map_or(Value::Null, |d| Value::String(d.to_string())),
        );
        Self(Value::Object(fields))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn task(&self) -> Option<&str> {
        self.0.get("task").and_then(Value::as_str)
    }

    /// Deadline as display text; `null` and a missing key both read as none.
    pub fn deadline(&self) -> Option<String> {
        match self.0.get("deadline")? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedEmail {
    pub email_id: String,
    pub category: String,
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReply {
    pub subject: String,
    pub body: String,
    pub suggested_followups: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("failed to parse draft reply JSON; raw output:\n{raw}")]
    Malformed { raw: String },
}

#[derive(Deserialize)]
struct RawDraft {
    subject: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    suggested_followups: Option<Vec<String>>,
}

impl DraftReply {
    /// Parses backend output of the shape `{subject, body, suggested_followups}`.
    /// Missing fields take defaults; anything that is not such an object is
    /// handed back untouched inside the error.
    pub fn from_raw(raw: &str, original_subject: &str) -> Result<Self, DraftError> {
        let malformed = || DraftError::Malformed {
            raw: raw.to_string(),
        };
        let text = crate::ai::decode::strip_code_fence(raw);
        let value: Value = serde_json::from_str(text).map_err(|_| malformed())?;
        if !value.is_object() {
            return Err(malformed());
        }
        let parsed: RawDraft = serde_json::from_value(value).map_err(|_| malformed())?;
        Ok(Self {
            subject: parsed
                .subject
                .unwrap_or_else(|| format!("Re: {original_subject}")),
            body: parsed.body.unwrap_or_default(),
            suggested_followups: parsed.suggested_followups.unwrap_or_default(),
        })
    }
}

/// A saved reply draft. Drafts are stored, never sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: String,
    pub related_email_id: Option<String>,
    pub subject: String,
    pub body: String,
    pub metadata: Map<String, Value>,
    pub created_at: String,
}
