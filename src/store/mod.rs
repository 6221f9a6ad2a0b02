//! Flat JSON documents under the data directory.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::{
    domain::{Draft, Email, PromptTemplates, PromptsDocument},
    tasks::ProcessedMap,
};

const INBOX_FILE: &str = "mock_inbox.json";
const PROMPTS_FILE: &str = "prompts.json";
const PROCESSED_FILE: &str = "processed_emails.json";
const DRAFTS_FILE: &str = "drafts.json";

#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn load_emails(&self) -> Result<Vec<Email>> {
        read_json(&self.path(INBOX_FILE))?
            .with_context(|| format!("inbox file {} not found", self.path(INBOX_FILE).display()))
    }

    /// Reads either the flat or the structured template-list shape. A missing
    /// file yields the built-in templates.
    pub fn load_prompts(&self) -> Result<PromptTemplates> {
        match read_json::<PromptsDocument>(&self.path(PROMPTS_FILE))? {
            Some(document) => Ok(document.into()),
            None => {
                tracing::info!(target: "store", "no prompts file; using built-in templates");
                Ok(PromptTemplates::default())
            }
        }
    }

    pub fn save_prompts(&self, templates: &PromptTemplates) -> Result<()> {
        write_json(&self.path(PROMPTS_FILE), templates)
    }

    pub fn load_processed(&self) -> Result<ProcessedMap> {
        Ok(read_json(&self.path(PROCESSED_FILE))?.unwrap_or_default())
    }

    pub fn save_processed(&self, processed: &ProcessedMap) -> Result<()> {
        write_json(&self.path(PROCESSED_FILE), processed)
    }

    pub fn load_drafts(&self) -> Result<Vec<Draft>> {
        Ok(read_json(&self.path(DRAFTS_FILE))?.unwrap_or_default())
    }

    pub fn save_drafts(&self, drafts: &[Draft]) -> Result<()> {
        write_json(&self.path(DRAFTS_FILE), drafts)
    }

    pub fn add_draft(
        &self,
        related_email_id: Option<String>,
        subject: String,
        body: String,
        metadata: Map<String, Value>,
    ) -> Result<Draft> {
        let mut drafts = self.load_drafts()?;
        let draft = Draft {
            id: Uuid::new_v4().to_string(),
            related_email_id,
            subject,
            body,
            metadata,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };
        drafts.push(draft.clone());
        self.save_drafts(&drafts)?;
        tracing::info!(target: "store", draft_id = %draft.id, total = drafts.len(), "draft saved");
        Ok(draft)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    let value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(value))
}

/// Writes through a sibling temp file so readers never see a partial document.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(target: "store", path = %path.display(), "document saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{ActionItem, ProcessedEmail};

    fn store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn prompts_round_trip_through_flat_shape() {
        let (_dir, store) = store();
        let templates = PromptTemplates {
            categorization_prompt: "Categorize: \"quoted\"\nmultiline".into(),
            action_item_prompt: "Extract tasks ✅".into(),
            auto_reply_prompt: String::new(),
        };
        store.save_prompts(&templates).unwrap();
        assert_eq!(store.load_prompts().unwrap(), templates);

        let written: Value =
            serde_json::from_str(&fs::read_to_string(store.path(PROMPTS_FILE)).unwrap()).unwrap();
        assert!(written.get("templates").is_none());
        assert_eq!(written["action_item_prompt"], "Extract tasks ✅");
    }

    #[test]
    fn structured_prompts_file_is_normalized_and_rewritten_flat() {
        let (_dir, store) = store();
        fs::write(
            store.path(PROMPTS_FILE),
            r#"{"templates": [{"id": "c", "type": "categorization", "template": "X"}]}"#,
        )
        .unwrap();
        let templates = store.load_prompts().unwrap();
        assert_eq!(templates.categorization_prompt, "X");
        assert_eq!(templates.action_item_prompt, "");
        assert_eq!(templates.auto_reply_prompt, "");

        store.save_prompts(&templates).unwrap();
        let written: Value =
            serde_json::from_str(&fs::read_to_string(store.path(PROMPTS_FILE)).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({"categorization_prompt": "X", "action_item_prompt": "", "auto_reply_prompt": ""})
        );
    }

    #[test]
    fn missing_prompts_file_uses_defaults() {
        let (_dir, store) = store();
        assert_eq!(store.load_prompts().unwrap(), PromptTemplates::default());
    }

    #[test]
    fn corrupt_prompts_file_is_an_error() {
        let (_dir, store) = store();
        fs::write(store.path(PROMPTS_FILE), "{not json").unwrap();
        assert!(store.load_prompts().is_err());
    }

    #[test]
    fn missing_inbox_is_an_error() {
        let (_dir, store) = store();
        assert!(store.load_emails().is_err());
    }

    #[test]
    fn inbox_preserves_order() {
        let (_dir, store) = store();
        fs::write(
            store.path(INBOX_FILE),
            r#"[
                {"id": "2", "sender": "b@x.com", "subject": "B", "body": "b", "timestamp": "2025-11-19T10:00:00"},
                {"id": "1", "sender": "a@x.com", "subject": "A", "body": "a", "timestamp": "2025-11-18T10:00:00"}
            ]"#,
        )
        .unwrap();
        let ids: Vec<_> = store.load_emails().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn processed_round_trip_and_missing_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.load_processed().unwrap().is_empty());

        let mut processed = ProcessedMap::new();
        processed.insert(
            "e-1".into(),
            ProcessedEmail {
                email_id: "e-1".into(),
                category: "Spam".into(),
                action_items: vec![ActionItem::new("Check spam link", None)],
                summary: None,
            },
        );
        store.save_processed(&processed).unwrap();
        assert_eq!(store.load_processed().unwrap(), processed);
    }

    #[test]
    fn add_draft_appends_with_fresh_id() {
        let (_dir, store) = store();
        let mut metadata = Map::new();
        metadata.insert("suggested_followups".into(), json!(["Confirm meeting agenda"]));

        let first = store
            .add_draft(Some("e-1".into()), "Re: A".into(), "Body".into(), metadata.clone())
            .unwrap();
        let second = store
            .add_draft(None, "Re: B".into(), String::new(), Map::new())
            .unwrap();

        assert_ne!(first.id, second.id);
        let drafts = store.load_drafts().unwrap();
        assert_eq!(drafts, vec![first.clone(), second]);
        assert_eq!(drafts[0].metadata, metadata);
        assert!(chrono::DateTime::parse_from_rfc3339(&first.created_at).is_ok());
    }
}
