//! Domain layer: core entities and business rules.

pub mod chat;
pub mod jid;
pub mod message;
pub mod session;
pub mod status;
pub mod wizard;
