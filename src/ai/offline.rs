//! Deterministic stand-in for the generation backend.
//!
//! The keyword tables below define demo-mode behavior. They are matched against
//! the lower-cased instruction and the lower-cased `instruction + "\n" + message`,
//! first matching task kind wins, and the output keeps the JSON shape the live
//! backend is asked to produce for that task.

use serde::Serialize;

use crate::domain::{ActionItem, DraftReply};

pub const OFFLINE_NOTICE: &str =
    "I'm an offline assistant (mock mode) — no LLM API key configured.";
pub const DRAFT_BODY: &str = "Thanks for reaching out. I can help with this — \
could you share a bit more detail or an agenda?";
pub const DRAFT_FOLLOWUPS: [&str; 2] = [
    "Follow up in 3 days if no response",
    "Confirm meeting agenda",
];
const SUBJECT_LABEL: &str = "Original email subject:";

const SPAM_SIGNALS: &[&str] = &["prize", "click here", "reward"];
const NEWSLETTER_SIGNALS: &[&str] = &["newsletter", "top stories"];
const TODO_SIGNALS: &[&str] = &["final report", "prepare slides", "meeting"];

#[derive(Serialize)]
struct CategoryPayload<'a> {
    category: &'a str,
}

/// Synthesizes a response from the inputs alone. Same inputs, same output.
pub fn respond(system_instruction: &str, user_message: &str) -> String {
    let instruction = system_instruction.to_lowercase();
    let combined = format!("{system_instruction}\n{user_message}").to_lowercase();

    if instruction.contains("categorize") || combined.contains("category") {
        return to_json(&CategoryPayload {
            category: offline_category(&combined),
        });
    }

    if instruction.contains("extract") || combined.contains("action") {
        return to_json(&offline_action_items(&combined));
    }

    if instruction.contains("draft") || combined.contains("draft") || combined.contains("reply") {
        return to_json(&offline_draft(user_message));
    }

    OFFLINE_NOTICE.to_string()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn offline_category(combined: &str) -> &'static str {
    if contains_any(combined, SPAM_SIGNALS) {
        "Spam"
    } else if contains_any(combined, NEWSLETTER_SIGNALS) {
        "Newsletter"
    } else if contains_any(combined, TODO_SIGNALS) {
        "To-Do"
    } else {
        "Important"
    }
}

fn offline_action_items(combined: &str) -> Vec<ActionItem> {
    let mut items = Vec::new();
    if combined.contains("final report") {
        items.push(ActionItem::new("Write final report", Some("2025-11-21")));
    }
    if combined.contains("slides") {
        items.push(ActionItem::new(
            "Prepare slides for review meeting",
            Some("2025-11-24"),
        ));
    }
    if combined.contains("claim your reward") || combined.contains("you won") {
        items.push(ActionItem::new("Check spam link", None));
    }
    items
}

fn offline_draft(user_message: &str) -> DraftReply {
    let first_line = user_message.lines().next().unwrap_or_default();
    let original_subject = first_line.replace(SUBJECT_LABEL, "");
    DraftReply {
        subject: format!("Re: {}", original_subject.trim()),
        body: DRAFT_BODY.to_string(),
        suggested_followups: DRAFT_FOLLOWUPS.iter().map(|s| s.to_string()).collect(),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    // Serializing these plain structs cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| OFFLINE_NOTICE.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::PromptTemplates;

    const CATEGORIZE: &str = "Categorize the email and return JSON with a single label field.";
    const EXTRACT: &str = "Extract tasks as a JSON list.";

    fn category_of(system: &str, user: &str) -> String {
        let value: Value = serde_json::from_str(&respond(system, user)).unwrap();
        value["category"].as_str().unwrap().to_string()
    }

    fn json_of(system: &str, user: &str) -> Value {
        serde_json::from_str(&respond(system, user)).unwrap()
    }

    #[test]
    fn categorization_table() {
        let cases = [
            (
                "Email subject: You won a prize!!!\nEmail body: Click here to claim your reward.",
                "Spam",
            ),
            ("Email subject: Hello\nEmail body: click HERE now", "Spam"),
            ("Email subject: Weekly newsletter\nEmail body: hi", "Newsletter"),
            ("Email subject: Digest\nEmail body: Top stories today", "Newsletter"),
            ("Email subject: Deadline\nEmail body: Please send the final report.", "To-Do"),
            ("Email subject: Review\nEmail body: Prepare slides by Monday.", "To-Do"),
            ("Email subject: Meeting request\nEmail body: Can you meet Monday?", "To-Do"),
            ("Email subject: Contract\nEmail body: Signed copy attached.", "Important"),
        ];
        for (user, expected) in cases {
            assert_eq!(category_of(CATEGORIZE, user), expected, "input: {user}");
        }
    }

    #[test]
    fn spam_outranks_newsletter_and_todo_signals() {
        let user = "Email subject: Newsletter meeting\nEmail body: win a prize";
        assert_eq!(category_of(CATEGORIZE, user), "Spam");
    }

    #[test]
    fn category_keyword_in_message_selects_categorization() {
        assert_eq!(
            category_of("Label this.", "Which category is this newsletter?"),
            "Newsletter"
        );
    }

    #[test]
    fn categorization_is_deterministic() {
        let user = "Email subject: Quarterly numbers\nEmail body: see attached";
        let first = respond(CATEGORIZE, user);
        for _ in 0..5 {
            assert_eq!(respond(CATEGORIZE, user), first);
        }
    }

    #[test]
    fn action_item_table_in_order() {
        let user = "Email body: Write the final report and prepare slides. You won nothing.";
        assert_eq!(
            json_of(EXTRACT, user),
            json!([
                {"task": "Write final report", "deadline": "2025-11-21"},
                {"task": "Prepare slides for review meeting", "deadline": "2025-11-24"},
                {"task": "Check spam link", "deadline": null}
            ])
        );
    }

    #[test]
    fn action_keyword_in_message_selects_extraction() {
        assert_eq!(
            json_of("List what I must do.", "Action needed: claim your reward"),
            json!([{"task": "Check spam link", "deadline": null}])
        );
    }

    #[test]
    fn extraction_without_signals_is_empty_list() {
        assert_eq!(json_of(EXTRACT, "Email body: lunch?"), json!([]));
    }

    #[test]
    fn extraction_is_independent_of_spam_classification() {
        let spam =
            "Email subject: You won a prize!!!\nEmail body: Click here to claim your reward.";
        assert_eq!(category_of(CATEGORIZE, spam), "Spam");
        assert_eq!(
            json_of(EXTRACT, spam),
            json!([{"task": "Check spam link", "deadline": null}])
        );
    }

    #[test]
    fn draft_subject_strips_label_and_prefixes_re() {
        let system = "Draft a reply in JSON with subject/body/suggested_followups";
        let user = "Original email subject: Meeting request\n\
                    Original email body: Can you meet Monday?\n\
                    User preferences: friendly and concise";
        let draft: DraftReply = serde_json::from_str(&respond(system, user)).unwrap();
        assert_eq!(draft.subject, "Re: Meeting request");
        assert_eq!(draft.body, DRAFT_BODY);
        assert_eq!(
            draft.suggested_followups,
            vec!["Follow up in 3 days if no response", "Confirm meeting agenda"]
        );
    }

    #[test]
    fn reply_keyword_in_message_selects_drafting() {
        let raw = respond("Be polite.", "Subject line\nplease reply soon");
        let draft: DraftReply = serde_json::from_str(&raw).unwrap();
        assert_eq!(draft.subject, "Re: Subject line");
    }

    #[test]
    fn draft_with_empty_message_yields_bare_prefix() {
        let draft: DraftReply = serde_json::from_str(&respond("Draft something", "")).unwrap();
        assert_eq!(draft.subject, "Re: ");
    }

    #[test]
    fn unmatched_input_yields_offline_notice() {
        assert_eq!(respond("Summarize.", "Hello there"), OFFLINE_NOTICE);
    }

    #[test]
    fn default_categorization_prompt_leaves_labels_to_the_email() {
        let prompt = PromptTemplates::default().categorization_prompt;
        let plain = "Email subject: Contract\nEmail body: Signed copy attached.";
        let digest = "Email subject: Digest\nEmail body: Top stories today";
        assert_eq!(category_of(&prompt, plain), "Important");
        assert_eq!(category_of(&prompt, digest), "Newsletter");
    }
}
