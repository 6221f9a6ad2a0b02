use std::collections::BTreeMap;

use crate::{
    ai::TextGenerator,
    domain::{Email, ProcessedEmail, PromptTemplates},
};

use super::agent;

pub type ProcessedMap = BTreeMap<String, ProcessedEmail>;

/// Applies the current templates to emails, one round-trip at a time.
pub struct InboxProcessor<'a, G> {
    generator: &'a G,
    templates: &'a PromptTemplates,
}

impl<'a, G: TextGenerator> InboxProcessor<'a, G> {
    pub fn new(generator: &'a G, templates: &'a PromptTemplates) -> Self {
        Self {
            generator,
            templates,
        }
    }

    pub async fn process_email(&self, email: &Email) -> ProcessedEmail {
        let category = agent::categorize(self.generator, email, self.templates).await;
        let action_items = agent::extract_action_items(self.generator, email, self.templates).await;
        tracing::debug!(
            target: "processor",
            email_id = %email.id,
            category = %category,
            action_items = action_items.len(),
            "email processed"
        );
        ProcessedEmail {
            email_id: email.id.clone(),
            category,
            action_items,
            summary: None,
        }
    }

    /// Starts from `existing` and inserts or overwrites one entry per email.
    pub async fn process_batch<'e, I>(&self, emails: I, existing: &ProcessedMap) -> ProcessedMap
    where
        I: IntoIterator<Item = &'e Email>,
        I::IntoIter: ExactSizeIterator,
    {
        let emails = emails.into_iter();
        let total = emails.len();
        tracing::info!(target: "processor", total, "processing batch");

        let mut processed = existing.clone();
        for (index, email) in emails.enumerate() {
            let result = self.process_email(email).await;
            processed.insert(email.id.clone(), result);
            tracing::info!(
                target: "processor",
                progress = index + 1,
                total,
                email_id = %email.id,
                "batch progress"
            );
        }
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ai::client::OfflineBackend,
        domain::{ActionItem, UNCATEGORIZED},
        tasks::agent::tests::{email, Canned},
    };

    fn inbox() -> Vec<Email> {
        let mut emails = vec![
            email("You won a prize!!!", "Click here to claim your reward."),
            email("Weekly newsletter", "Top stories of the week"),
            email("Deadline", "Please send the final report."),
            email("Hello", "Just checking in."),
        ];
        for (i, mail) in emails.iter_mut().enumerate() {
            mail.id = format!("e-{i}");
        }
        emails
    }

    #[tokio::test]
    async fn offline_spam_email_is_flagged_with_spam_link_task() {
        let templates = PromptTemplates::default();
        let processor = InboxProcessor::new(&OfflineBackend, &templates);
        let spam = &inbox()[0];
        let result = processor.process_email(spam).await;
        assert_eq!(result.email_id, "e-0");
        assert_eq!(result.category, "Spam");
        assert!(result
            .action_items
            .contains(&ActionItem::new("Check spam link", None)));
        assert!(result.summary.is_none());
    }

    #[tokio::test]
    async fn offline_batch_has_one_entry_per_email() {
        let templates = PromptTemplates::default();
        let processor = InboxProcessor::new(&OfflineBackend, &templates);
        let emails = inbox();
        let processed = processor.process_batch(&emails, &ProcessedMap::new()).await;
        assert_eq!(processed.len(), emails.len());
        for mail in &emails {
            assert!(processed.contains_key(&mail.id));
        }
    }

    #[tokio::test]
    async fn garbage_backend_still_fills_every_entry() {
        let templates = PromptTemplates::default();
        let garbage = Canned("<html>502 Bad Gateway</html>");
        let processor = InboxProcessor::new(&garbage, &templates);
        let emails = inbox();
        let processed = processor.process_batch(&emails, &ProcessedMap::new()).await;
        assert_eq!(processed.len(), emails.len());
        assert!(processed
            .values()
            .all(|p| p.category == UNCATEGORIZED && p.action_items.is_empty()));
    }

    #[tokio::test]
    async fn action_items_reach_the_result_verbatim() {
        const ITEMS: &str = r#"[
            {"task": "Call Bob", "deadline": "2025-11-21", "priority": "high"},
            {"task": "Pay invoice", "deadline": 20251130},
            {"description": "Book room"}
        ]"#;
        let templates = PromptTemplates::default();
        let backend = Canned(ITEMS);
        let processor = InboxProcessor::new(&backend, &templates);
        let result = processor.process_email(&inbox()[3]).await;
        assert_eq!(result.action_items.len(), 3);
        assert_eq!(
            serde_json::to_value(&result.action_items).unwrap(),
            serde_json::from_str::<serde_json::Value>(ITEMS).unwrap()
        );
    }

    #[tokio::test]
    async fn batch_keeps_unrelated_entries_and_overwrites_reprocessed_ones() {
        let templates = PromptTemplates::default();
        let processor = InboxProcessor::new(&OfflineBackend, &templates);
        let emails = inbox();

        let mut existing = ProcessedMap::new();
        existing.insert(
            "older".into(),
            ProcessedEmail {
                email_id: "older".into(),
                category: "Important".into(),
                action_items: vec![],
                summary: None,
            },
        );
        existing.insert(
            "e-0".into(),
            ProcessedEmail {
                email_id: "e-0".into(),
                category: "Stale".into(),
                action_items: vec![],
                summary: None,
            },
        );

        let processed = processor.process_batch(&emails[..1], &existing).await;
        assert_eq!(processed.len(), 2);
        assert_eq!(processed["e-0"].category, "Spam");
        assert_eq!(processed["older"].category, "Important");
    }
}
