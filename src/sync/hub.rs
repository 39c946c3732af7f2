//! Declarative data bindings over the backend: each binding is a (key, fetch,
//! refresh-policy) triple backed by a [`QueryCache`], and each mutation marks
//! its dependents stale on success.
//!
//! | binding       | key         | staleness | invalidated by                     |
//! |---------------|-------------|-----------|------------------------------------|
//! | app-status    | none        | poll TTL  | login, login-with-code, logout, reconnect |
//! | chats         | search term | manual    | send-message, logout               |
//! | chat-messages | chat JID    | manual    | send-message (that JID)            |

use std::time::Duration;

use crate::{
    domain::{chat::Chat, message::Message, status::ConnectionStatus},
    gowa::{
        envelope::describe_for_log,
        wire::{PairIssued, QrIssued},
        GowaError,
    },
    infra::config::SyncConfig,
    sync::cache::QueryCache,
    usecases::{
        list_chats::{self, ListChatsError, ListChatsQuery, ListChatsSource},
        load_messages::{self, LoadMessagesError, LoadMessagesQuery, MessagesSource},
        send_message::{self, MessageSender, SendMessageCommand, SendMessageError},
    },
};

/// Fixed read retries, mirroring the original bindings (status: 3, lists: 2).
const STATUS_RETRIES: u32 = 3;
const READ_RETRIES: u32 = 2;

/// Everything the sync layer needs from the backend.
pub trait GowaBackend: ListChatsSource + MessagesSource + MessageSender {
    fn app_status(&self) -> Result<ConnectionStatus, GowaError>;
    fn request_qr_login(&self) -> Result<QrIssued, GowaError>;
    fn request_pair_code(&self, phone: &str) -> Result<PairIssued, GowaError>;
    fn logout_device(&self) -> Result<(), GowaError>;
    fn reconnect_device(&self) -> Result<(), GowaError>;
}

pub struct SyncHub<B> {
    backend: B,
    status: QueryCache<(), ConnectionStatus>,
    chats: QueryCache<String, Vec<Chat>>,
    messages: QueryCache<String, Vec<Message>>,
}

impl<B: GowaBackend> SyncHub<B> {
    pub fn new(backend: B, config: &SyncConfig) -> Self {
        Self {
            backend,
            status: QueryCache::new(Some(Duration::from_secs(config.status_poll_secs))),
            chats: QueryCache::new(None),
            messages: QueryCache::new(None),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current connection status; a failed probe degrades to a disconnected
    /// snapshot instead of surfacing an error.
    pub fn app_status(&self) -> ConnectionStatus {
        let fetched = self
            .status
            .read_through((), || with_retry(STATUS_RETRIES, || self.backend.app_status()));

        match fetched {
            Ok(status) => status,
            Err(error) => {
                tracing::warn!(
                    error = %describe_for_log(&error),
                    "app status probe failed, reporting disconnected"
                );
                ConnectionStatus::disconnected()
            }
        }
    }

    /// Forces a re-poll regardless of entry age.
    pub fn refresh_status(&self) -> ConnectionStatus {
        self.status.invalidate(&());
        self.app_status()
    }

    pub fn chats(&self, search: Option<&str>) -> Result<Vec<Chat>, ListChatsError> {
        let key = search.unwrap_or_default().to_owned();
        self.chats.read_through(key, || {
            with_retry(READ_RETRIES, || {
                list_chats::list_chats(
                    &self.backend,
                    ListChatsQuery::with_search(search.map(ToOwned::to_owned)),
                )
                .map(|output| output.chats)
            })
        })
    }

    pub fn chat_messages(&self, jid: &str) -> Result<Vec<Message>, LoadMessagesError> {
        self.messages.read_through(jid.to_owned(), || {
            with_retry(READ_RETRIES, || {
                load_messages::load_messages(&self.backend, LoadMessagesQuery::new(jid))
                    .map(|output| output.messages)
            })
        })
    }

    pub fn connect_qr(&self) -> Result<QrIssued, GowaError> {
        self.login_mutation(self.backend.request_qr_login())
    }

    pub fn connect_with_code(&self, phone: &str) -> Result<PairIssued, GowaError> {
        self.login_mutation(self.backend.request_pair_code(phone))
    }

    pub fn logout_device(&self) -> Result<(), GowaError> {
        self.backend.logout_device()?;
        self.status.invalidate(&());
        self.chats.invalidate_all();
        Ok(())
    }

    pub fn reconnect(&self) -> Result<(), GowaError> {
        self.backend.reconnect_device()?;
        self.status.invalidate(&());
        Ok(())
    }

    pub fn send(&self, jid: &str, text: &str) -> Result<(), SendMessageError> {
        send_message::send_message(
            &self.backend,
            SendMessageCommand {
                jid: jid.to_owned(),
                text: text.to_owned(),
            },
        )?;

        // The sent message becomes visible on the next re-fetch, never via
        // optimistic insertion.
        self.messages.invalidate(&jid.to_owned());
        self.chats.invalidate_all();
        Ok(())
    }

    /// Drops every cached binding; used when the operator session ends.
    pub fn clear(&self) {
        self.status.invalidate(&());
        self.chats.invalidate_all();
        self.messages.invalidate_all();
    }

    /// Login mutations invalidate app-status on success. The backend's
    /// "already logged in" refusal also forces a status refresh, so the caller
    /// can treat it as success-like; the error itself is still returned
    /// unconsumed.
    fn login_mutation<T>(&self, result: Result<T, GowaError>) -> Result<T, GowaError> {
        match &result {
            Ok(_) => self.status.invalidate(&()),
            Err(error) if error.is_already_logged_in() => self.status.invalidate(&()),
            Err(_) => {}
        }

        result
    }
}

fn with_retry<T, E>(retries: u32, mut op: impl FnMut() -> Result<T, E>) -> Result<T, E> {
    let mut outcome = op();
    for _ in 0..retries {
        if outcome.is_ok() {
            break;
        }
        outcome = op();
    }

    outcome
}
