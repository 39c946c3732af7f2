//! Backend record shapes and their mapping to domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{
    chat::{Chat, LAST_MESSAGE_PLACEHOLDER},
    jid,
    message::{DeliveryStatus, Message, Sender},
    status::ConnectionStatus,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRecord {
    pub jid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_message_time: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub is_from_me: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChatPage {
    pub data: Vec<ChatRecord>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct MessagePage {
    pub data: Vec<MessageRecord>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Raw `/app/status` payload; `connected` is the OR of the two flags the
/// backend may report.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusReply {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub is_logged_in: bool,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub pair_code: Option<String>,
}

impl StatusReply {
    pub fn into_status(self) -> ConnectionStatus {
        ConnectionStatus {
            connected: self.is_connected || self.is_logged_in,
            qr_code: self.qr_code,
            pair_code: self.pair_code,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrIssued {
    pub qr_link: String,
    #[serde(default)]
    pub qr_duration: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairIssued {
    pub pair_code: String,
}

/// Drops broadcast/newsletter records and anything that is not an individual
/// or group chat, then maps the survivors to the inbox shape.
pub fn map_chats(records: Vec<ChatRecord>) -> Vec<Chat> {
    records
        .into_iter()
        .filter(|record| jid::is_chat(&record.jid))
        .map(map_chat)
        .collect()
}

fn map_chat(record: ChatRecord) -> Chat {
    let phone = jid::phone_part(&record.jid).to_owned();
    let name = if record.name.is_empty() {
        phone.clone()
    } else {
        record.name
    };
    let timestamp = record
        .last_message_time
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| record.updated_at.as_deref().and_then(parse_timestamp));

    Chat {
        jid: record.jid,
        name,
        phone,
        last_message: LAST_MESSAGE_PLACEHOLDER.to_owned(),
        timestamp,
        unread_count: 0,
        is_online: false,
    }
}

pub fn map_messages(records: Vec<MessageRecord>) -> Vec<Message> {
    records
        .into_iter()
        .map(|record| Message {
            id: record.id,
            text: record.content,
            timestamp: record.timestamp.as_deref().and_then(parse_timestamp),
            sender: if record.is_from_me {
                Sender::User
            } else {
                Sender::Contact
            },
            status: DeliveryStatus::default(),
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
}
