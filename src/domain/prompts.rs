use serde::{Deserialize, Serialize};

const CATEGORIZATION_TYPES: &[&str] = &["categorization"];
const ACTION_ITEM_TYPES: &[&str] = &["action_item", "action_item_extraction"];
const REPLY_TYPES: &[&str] = &["reply", "auto_reply", "auto_reply_draft"];

// Mentions no offline category signal; demo-mode labels follow the email text alone.
const DEFAULT_CATEGORIZATION: &str = "Categorize the email with exactly one label. \
Use Spam for unsolicited or suspicious mail, To-Do for mail that asks the user to do something, \
a bulk label for digests and mailing lists, and Important otherwise. \
Respond only with JSON: {\"category\": \"<label>\"}.";
const DEFAULT_ACTION_ITEM: &str = "Extract tasks from the email. \
Respond only with a JSON array: [{\"task\": \"...\", \"deadline\": \"YYYY-MM-DD or null\"}].";
const DEFAULT_AUTO_REPLY: &str = "If an email is a meeting request, \
draft a polite reply asking for an agenda. Keep replies short and professional.";

/// The three editable instruction strings. Edits produce a new value; the
/// holder of the current instance decides when to persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplates {
    pub categorization_prompt: String,
    pub action_item_prompt: String,
    pub auto_reply_prompt: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            categorization_prompt: DEFAULT_CATEGORIZATION.to_string(),
            action_item_prompt: DEFAULT_ACTION_ITEM.to_string(),
            auto_reply_prompt: DEFAULT_AUTO_REPLY.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Returns a copy with each provided field replaced.
    pub fn with_edits(
        &self,
        categorization: Option<String>,
        action_item: Option<String>,
        auto_reply: Option<String>,
    ) -> Self {
        Self {
            categorization_prompt: categorization
                .unwrap_or_else(|| self.categorization_prompt.clone()),
            action_item_prompt: action_item.unwrap_or_else(|| self.action_item_prompt.clone()),
            auto_reply_prompt: auto_reply.unwrap_or_else(|| self.auto_reply_prompt.clone()),
        }
    }
}

/// On-disk representation of `prompts.json`. Either shape is accepted on read;
/// writes always use the flat shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PromptsDocument {
    Structured { templates: Vec<TemplateEntry> },
    Flat(PromptTemplates),
}

#[derive(Debug, Deserialize)]
pub struct TemplateEntry {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
}

impl From<PromptsDocument> for PromptTemplates {
    fn from(document: PromptsDocument) -> Self {
        match document {
            PromptsDocument::Flat(templates) => templates,
            PromptsDocument::Structured { templates } => normalize_entries(templates),
        }
    }
}

fn normalize_entries(entries: Vec<TemplateEntry>) -> PromptTemplates {
    let mut categorization = None;
    let mut action_item = None;
    let mut reply = None;

    for entry in entries {
        let Some(kind) = entry.kind.as_deref() else {
            continue;
        };
        let slot = if CATEGORIZATION_TYPES.contains(&kind) {
            &mut categorization
        } else if ACTION_ITEM_TYPES.contains(&kind) {
            &mut action_item
        } else if REPLY_TYPES.contains(&kind) {
            &mut reply
        } else {
            tracing::debug!(
                target: "store",
                template_type = kind,
                "ignoring unknown template type"
            );
            continue;
        };
        *slot = entry.template;
    }

    PromptTemplates {
        categorization_prompt: categorization.unwrap_or_default(),
        action_item_prompt: action_item.unwrap_or_default(),
        auto_reply_prompt: reply.unwrap_or_default(),
    }
}
