//! Application flows, each built against a narrow trait seam so the backend
//! can be stubbed in tests.

pub mod bootstrap;
pub mod connect_wizard;
pub mod context;
pub mod list_chats;
pub mod load_messages;
pub mod send_message;
pub mod session;
