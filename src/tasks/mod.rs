pub mod agent;
pub mod processor;

pub use processor::{InboxProcessor, ProcessedMap};
