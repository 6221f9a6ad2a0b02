pub mod email;
pub mod prompts;
pub mod types;

pub use email::Email;
pub use prompts::{PromptTemplates, PromptsDocument};
pub use types::{ActionItem, Draft, DraftError, DraftReply, ProcessedEmail, UNCATEGORIZED};
