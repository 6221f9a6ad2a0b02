pub mod client;
pub mod decode;
pub mod inference;
pub mod offline;

pub use client::{GenerationClient, TextGenerator};
