//! Task functions: build the task-specific prompt for an email, ask the
//! generator, and turn its text into a typed result. None of them fail.

use crate::{
    ai::{decode, TextGenerator},
    domain::{ActionItem, Email, PromptTemplates},
};

const ASSISTANT_FRAMING: &str = "You are an email productivity assistant. \
Use the user's prompt brain instructions when relevant.";
const DRAFT_SHAPE_INSTRUCTION: &str = "Draft a reply email with a subject and body. \
Respond in JSON: {\"subject\": \"...\", \"body\": \"...\", \"suggested_followups\": [\"...\"]}.";

fn email_message(email: &Email) -> String {
    format!(
        "Email subject: {}\nEmail body:\n{}\n",
        email.subject, email.body
    )
}

pub async fn categorize<G: TextGenerator>(
    generator: &G,
    email: &Email,
    templates: &PromptTemplates,
) -> String {
    let raw = generator
        .generate(&templates.categorization_prompt, &email_message(email))
        .await;
    let decoded = decode::decode_category(&raw);
    if decoded.is_fallback() {
        tracing::debug!(
            target: "agent",
            email_id = %email.id,
            "category output unusable; using fallback"
        );
    }
    decoded.into_inner()
}

pub async fn extract_action_items<G: TextGenerator>(
    generator: &G,
    email: &Email,
    templates: &PromptTemplates,
) -> Vec<ActionItem> {
    let raw = generator
        .generate(&templates.action_item_prompt, &email_message(email))
        .await;
    let decoded = decode::decode_action_items(&raw);
    if decoded.is_fallback() {
        tracing::debug!(
            target: "agent",
            email_id = %email.id,
            "action item output unusable; using empty list"
        );
    }
    decoded.into_inner()
}

/// Free-form question about an email. The answer is returned unparsed.
pub async fn answer_question<G: TextGenerator>(
    generator: &G,
    email: &Email,
    templates: &PromptTemplates,
    question: &str,
) -> String {
    let system = format!(
        "{ASSISTANT_FRAMING}\n\n\
         Categorization instructions:\n{}\n\n\
         Action item instructions:\n{}\n\n\
         Auto-reply instructions:\n{}\n",
        templates.categorization_prompt, templates.action_item_prompt, templates.auto_reply_prompt
    );
    let user = format!(
        "EMAIL CONTENT:\nSubject: {}\nBody:\n{}\n\nUSER QUESTION:\n{}",
        email.subject, email.body, question
    );
    generator.generate(&system, &user).await
}

/// Returns the backend text untouched. Parsing it into a reply (and showing
/// the raw text when that fails) is left to the caller.
pub async fn draft_reply<G: TextGenerator>(
    generator: &G,
    email: &Email,
    templates: &PromptTemplates,
    tone_hint: &str,
) -> String {
    let user = format!(
        "Original email subject: {}\nOriginal email body:\n{}\n\n\
         User preferences: {}\n\n{DRAFT_SHAPE_INSTRUCTION}",
        email.subject, email.body, tone_hint
    );
    generator.generate(&templates.auto_reply_prompt, &user).await
}
