use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};

use crate::{
    ai::GenerationClient,
    config::AppConfig,
    domain::{email, Draft, DraftError, DraftReply, Email, PromptTemplates},
    infrastructure::directories::ResolvedPaths,
    store::JsonStore,
    tasks::{agent, InboxProcessor, ProcessedMap},
};

/// Owns the backend and the document store, and re-reads the current prompts
/// from the store for every operation.
pub struct MailAgentApp {
    store: JsonStore,
    generator: GenerationClient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxStats {
    pub total: usize,
    pub processed: usize,
    pub drafts: usize,
}

impl MailAgentApp {
    pub fn initialize(config: &AppConfig, paths: ResolvedPaths, force_offline: bool) -> Self {
        let generator = GenerationClient::from_config(&config.generation, force_offline);
        if !generator.is_live() {
            tracing::info!(target: "app", "running in offline mode (mock responses)");
        }
        Self::with_parts(JsonStore::new(paths.data_dir), generator)
    }

    pub fn with_parts(store: JsonStore, generator: GenerationClient) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    pub fn is_live(&self) -> bool {
        self.generator.is_live()
    }

    pub async fn process_selected(&self, ids: &[String]) -> Result<ProcessedMap> {
        if ids.is_empty() {
            bail!("select at least one email to process");
        }
        let emails = self.store.load_emails()?;
        let selected = ids
            .iter()
            .map(|id| lookup(&emails, id))
            .collect::<Result<Vec<_>>>()?;
        self.process(selected).await
    }

    pub async fn ingest(&self) -> Result<ProcessedMap> {
        let emails = self.store.load_emails()?;
        self.process(emails.iter().collect()).await
    }

    async fn process(&self, emails: Vec<&Email>) -> Result<ProcessedMap> {
        let templates = self.store.load_prompts()?;
        let existing = self.store.load_processed()?;
        let processor = InboxProcessor::new(&self.generator, &templates);
        let processed = processor.process_batch(emails, &existing).await;
        self.store.save_processed(&processed)?;
        Ok(processed)
    }

    pub async fn ask(&self, email_id: &str, question: &str) -> Result<String> {
        let emails = self.store.load_emails()?;
        let email = lookup(&emails, email_id)?;
        let templates = self.store.load_prompts()?;
        Ok(agent::answer_question(&self.generator, email, &templates, question).await)
    }

    /// Drafts and saves a reply. When the backend text does not parse, the
    /// returned error carries that raw text.
    pub async fn draft(&self, email_id: &str, tone_hint: &str) -> Result<Draft> {
        let emails = self.store.load_emails()?;
        let email = lookup(&emails, email_id)?;
        let templates = self.store.load_prompts()?;

        let raw = agent::draft_reply(&self.generator, email, &templates, tone_hint).await;
        let reply = DraftReply::from_raw(&raw, &email.subject).map_err(|err: DraftError| {
            tracing::warn!(target: "agent", email_id = %email.id, "draft reply was not valid JSON");
            err
        })?;

        let processed = self.store.load_processed()?;
        let previous = processed.get(&email.id);
        let mut metadata = Map::new();
        metadata.insert(
            "suggested_followups".into(),
            json!(reply.suggested_followups),
        );
        metadata.insert(
            "category".into(),
            previous.map_or(Value::Null, |p| json!(p.category)),
        );
        metadata.insert(
            "action_items".into(),
            previous.map_or_else(|| json!([]), |p| json!(p.action_items)),
        );

        self.store
            .add_draft(Some(email.id.clone()), reply.subject, reply.body, metadata)
    }

    pub fn prompts(&self) -> Result<PromptTemplates> {
        self.store.load_prompts()
    }

    /// Saves a new template set built from the current one and returns what
    /// the store now holds.
    pub fn edit_prompts(
        &self,
        categorization: Option<String>,
        action_item: Option<String>,
        auto_reply: Option<String>,
    ) -> Result<PromptTemplates> {
        let current = self.store.load_prompts()?;
        let edited = current.with_edits(categorization, action_item, auto_reply);
        self.store.save_prompts(&edited)?;
        tracing::info!(target: "app", "prompts saved");
        self.store.load_prompts()
    }

    pub fn inbox(&self, query: &str) -> Result<(Vec<Email>, ProcessedMap)> {
        let emails = self.store.load_emails()?;
        let processed = self.store.load_processed()?;
        let hits = email::search(&emails, query).into_iter().cloned().collect();
        Ok((hits, processed))
    }

    pub fn thread(&self, email_id: &str) -> Result<(Email, Vec<Email>)> {
        let emails = self.store.load_emails()?;
        let selected = lookup(&emails, email_id)?.clone();
        let thread = email::thread_for(&emails, &selected)
            .into_iter()
            .cloned()
            .collect();
        Ok((selected, thread))
    }

    pub fn stats(&self) -> Result<InboxStats> {
        Ok(InboxStats {
            total: self.store.load_emails()?.len(),
            processed: self.store.load_processed()?.len(),
            drafts: self.store.load_drafts()?.len(),
        })
    }
}

fn lookup<'a>(emails: &'a [Email], id: &str) -> Result<&'a Email> {
    email::find(emails, id).with_context(|| format!("no email with id {id:?} in the inbox"))
}
