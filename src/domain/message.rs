use chrono::{DateTime, Utc};

/// Who authored a message, from the perspective of the linked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// Sent from the linked account (`is_from_me`).
    User,
    /// Sent by the chat partner.
    Contact,
}

/// Delivery status of a message.
///
/// The backend does not report per-message receipts yet, so mapped messages
/// default to `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryStatus {
    Sent,
    #[default]
    Delivered,
    Read,
}

impl DeliveryStatus {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub sender: Sender,
    pub status: DeliveryStatus,
}
