use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{
    app::MailAgentApp,
    domain::{ActionItem, Email},
};

#[derive(Debug, Parser)]
#[command(name = "mail-prompt-agent", version, about = "Apply editable prompts to a static inbox")]
pub struct Cli {
    /// Ignore any API key and answer with the offline responder.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Directory holding mock_inbox.json, prompts.json and the generated documents.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List inbox emails with their category, optionally filtered.
    Inbox {
        #[arg(long, short, default_value = "")]
        query: String,
    },
    /// Show one email, its thread and its processing result.
    Show { id: String },
    /// Categorize and extract action items for the given emails.
    Process {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Re-process the whole inbox with the current prompts.
    Ingest,
    /// Ask a free-form question about an email.
    Ask { id: String, question: String },
    /// Draft a reply and save it (drafts are never sent).
    Draft {
        id: String,
        #[arg(long, default_value = "")]
        tone: String,
    },
    /// List saved drafts.
    Drafts,
    /// Inspect or edit the prompt templates.
    Prompts {
        #[command(subcommand)]
        action: PromptsCommand,
    },
    /// Inbox, processed and draft counts.
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum PromptsCommand {
    Show,
    Set {
        #[arg(long)]
        categorization: Option<String>,
        #[arg(long)]
        action_item: Option<String>,
        #[arg(long)]
        auto_reply: Option<String>,
    },
}

pub async fn run(command: Command, app: &MailAgentApp) -> Result<()> {
    match command {
        Command::Inbox { query } => {
            let (emails, processed) = app.inbox(&query)?;
            for email in &emails {
                let category = processed
                    .get(&email.id)
                    .map_or("Not processed", |p| p.category.as_str());
                println!("[{category}] {} | {}", email.id, email.subject);
                println!("    {} • {}", email.sender, email.timestamp);
            }
            if emails.is_empty() {
                println!("No emails match {query:?}.");
            }
        }
        Command::Show { id } => {
            let (email, thread) = app.thread(&id)?;
            print_email(&email);
            println!("\n--- Thread / related messages ---");
            for message in &thread {
                println!("{} - {}\n{}\n", message.sender, message.timestamp, message.body);
            }
            match app.store().load_processed()?.get(&email.id) {
                Some(result) => {
                    println!("Category: {}", result.category);
                    print_action_items(&result.action_items);
                }
                None => println!("Not processed yet."),
            }
        }
        Command::Process { ids } => {
            let processed = app.process_selected(&ids).await?;
            for id in &ids {
                if let Some(result) = processed.get(id) {
                    println!("[{}] {}", result.category, id);
                    print_action_items(&result.action_items);
                }
            }
            println!("Processed {} email(s).", ids.len());
        }
        Command::Ingest => {
            let processed = app.ingest().await?;
            println!(
                "Inbox processed using current prompts ({} results stored).",
                processed.len()
            );
        }
        Command::Ask { id, question } => {
            let answer = app.ask(&id, &question).await?;
            println!("{answer}");
        }
        Command::Draft { id, tone } => {
            let draft = app.draft(&id, &tone).await?;
            println!("Draft saved (not sent): {}", draft.id);
            println!("Subject: {}\n\n{}", draft.subject, draft.body);
            if let Some(followups) = draft.metadata.get("suggested_followups") {
                println!("\nSuggested follow-ups: {followups}");
            }
        }
        Command::Drafts => {
            for draft in app.store().load_drafts()? {
                let related = draft.related_email_id.as_deref().unwrap_or("-");
                println!("{} [{}] {} (re {related})", draft.created_at, draft.id, draft.subject);
            }
        }
        Command::Prompts { action } => {
            let templates = match action {
                PromptsCommand::Show => app.prompts()?,
                PromptsCommand::Set {
                    categorization,
                    action_item,
                    auto_reply,
                } => {
                    let saved = app.edit_prompts(categorization, action_item, auto_reply)?;
                    println!("Prompts saved.\n");
                    saved
                }
            };
            println!("Categorization prompt:\n{}\n", templates.categorization_prompt);
            println!("Action item prompt:\n{}\n", templates.action_item_prompt);
            println!("Auto-reply draft prompt:\n{}", templates.auto_reply_prompt);
        }
        Command::Stats => {
            let stats = app.stats()?;
            let mode = if app.is_live() { "live" } else { "offline (mock)" };
            println!("Inbox total: {}", stats.total);
            println!("Processed:   {}", stats.processed);
            println!("Drafts:      {}", stats.drafts);
            println!("Backend:     {mode}");
        }
    }
    Ok(())
}

fn print_email(email: &Email) {
    println!("From:    {}", email.sender);
    println!("Subject: {}", email.subject);
    println!("Time:    {}", email.timestamp);
    println!("\n{}", email.body);
}

fn print_action_items(items: &[ActionItem]) {
    if items.is_empty() {
        println!("    (no action items)");
    }
    for item in items {
        let task = match item.task() {
            Some(task) => task.to_string(),
            None => item.as_value().to_string(),
        };
        match item.deadline() {
            Some(deadline) => println!("    - {task} (due {deadline})"),
            None => println!("    - {task}"),
        }
    }
}
