use chrono::{DateTime, Utc};

/// Backend chat records carry no last-message preview yet.
pub const LAST_MESSAGE_PLACEHOLDER: &str = "No messages yet";

/// A conversation as shown in the inbox, mapped from a backend chat record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    /// WhatsApp JID, e.g. `6289685028129@s.whatsapp.net`.
    pub jid: String,
    pub name: String,
    /// Phone part extracted from the JID.
    pub phone: String,
    pub last_message: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// Backend does not provide this yet.
    pub unread_count: u32,
    /// Backend does not provide this yet.
    pub is_online: bool,
}
