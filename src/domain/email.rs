use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub sender: String,
    pub subject: String,
    pub body: String,
    /// ISO-8601 string; ordering is lexicographic.
    pub timestamp: String,
}

impl Email {
    /// Case-insensitive substring match on subject or sender. An empty query
    /// matches every email.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.subject.to_lowercase().contains(&needle)
            || self.sender.to_lowercase().contains(&needle)
    }

    pub fn is_related_to(&self, other: &Email) -> bool {
        self.subject == other.subject || self.sender == other.sender
    }
}

pub fn search<'a>(emails: &'a [Email], query: &str) -> Vec<&'a Email> {
    emails.iter().filter(|e| e.matches_query(query)).collect()
}

pub fn find<'a>(emails: &'a [Email], id: &str) -> Option<&'a Email> {
    emails.iter().find(|e| e.id == id)
}

/// Emails sharing the selected email's subject or sender, oldest first.
pub fn thread_for<'a>(emails: &'a [Email], selected: &Email) -> Vec<&'a Email> {
    let mut thread: Vec<&Email> = emails.iter().filter(|e| e.is_related_to(selected)).collect();
    thread.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    thread
}
