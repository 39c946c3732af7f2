use crate::domain::{jid, message::Message};

const DEFAULT_MESSAGES_PAGE_SIZE: usize = 50;
const MAX_MESSAGES_PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMessagesQuery {
    pub jid: String,
    pub limit: usize,
    pub offset: usize,
}

impl LoadMessagesQuery {
    pub fn new(jid: impl Into<String>) -> Self {
        Self {
            jid: jid.into(),
            limit: DEFAULT_MESSAGES_PAGE_SIZE,
            offset: 0,
        }
    }

    fn normalized_limit(&self) -> usize {
        match self.limit {
            0 => DEFAULT_MESSAGES_PAGE_SIZE,
            value if value > MAX_MESSAGES_PAGE_SIZE => MAX_MESSAGES_PAGE_SIZE,
            value => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMessagesOutput {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagesSourceError {
    Unauthorized,
    Unavailable,
    InvalidData,
    ChatNotFound,
}

pub trait MessagesSource {
    fn list_messages(
        &self,
        jid: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>, MessagesSourceError>;
}

impl<T: MessagesSource + ?Sized> MessagesSource for &T {
    fn list_messages(
        &self,
        jid: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>, MessagesSourceError> {
        (*self).list_messages(jid, limit, offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMessagesError {
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
    ChatNotFound,
}

/// Loads a page of messages for a chat.
///
/// Broadcast and newsletter JIDs are answered with an empty page before the
/// source is consulted: the backend does not serve messages for those chat
/// types and would fail the request.
pub fn load_messages(
    source: &dyn MessagesSource,
    query: LoadMessagesQuery,
) -> Result<LoadMessagesOutput, LoadMessagesError> {
    if jid::is_message_blocked(&query.jid) {
        tracing::warn!(jid = %query.jid, "refusing message fetch for non-chat JID");
        return Ok(LoadMessagesOutput { messages: vec![] });
    }

    let limit = query.normalized_limit();
    let messages = source
        .list_messages(&query.jid, limit, query.offset)
        .map_err(map_source_error)?;

    Ok(LoadMessagesOutput { messages })
}

fn map_source_error(error: MessagesSourceError) -> LoadMessagesError {
    match error {
        MessagesSourceError::Unauthorized => LoadMessagesError::Unauthorized,
        MessagesSourceError::Unavailable => LoadMessagesError::TemporarilyUnavailable,
        MessagesSourceError::InvalidData => LoadMessagesError::DataContractViolation,
        MessagesSourceError::ChatNotFound => LoadMessagesError::ChatNotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::{DeliveryStatus, Sender};

    struct StubSource {
        result: Result<Vec<Message>, MessagesSourceError>,
        captured: std::sync::Mutex<Option<(String, usize, usize)>>,
    }

    impl StubSource {
        fn with_result(result: Result<Vec<Message>, MessagesSourceError>) -> Self {
            Self {
                result,
                captured: std::sync::Mutex::new(None),
            }
        }

        fn was_called(&self) -> bool {
            self.captured.lock().expect("capture lock").is_some()
        }
    }

    impl MessagesSource for StubSource {
        fn list_messages(
            &self,
            jid: &str,
            limit: usize,
            offset: usize,
        ) -> Result<Vec<Message>, MessagesSourceError> {
            *self.captured.lock().expect("capture lock") = Some((jid.to_owned(), limit, offset));
            self.result.clone()
        }
    }

    fn sample_message() -> Message {
        Message {
            id: "m1".to_owned(),
            text: "Hello".to_owned(),
            timestamp: None,
            sender: Sender::Contact,
            status: DeliveryStatus::Delivered,
        }
    }

    #[test]
    fn broadcast_jid_returns_empty_without_touching_the_source() {
        let source = StubSource::with_result(Ok(vec![sample_message()]));

        let output = load_messages(&source, LoadMessagesQuery::new("status@broadcast"))
            .expect("load should succeed");

        assert!(output.messages.is_empty());
        assert!(!source.was_called());
    }

    #[test]
    fn newsletter_jid_returns_empty_without_touching_the_source() {
        let source = StubSource::with_result(Ok(vec![sample_message()]));

        let output = load_messages(&source, LoadMessagesQuery::new("120363167@newsletter"))
            .expect("load should succeed");

        assert!(output.messages.is_empty());
        assert!(!source.was_called());
    }

    #[test]
    fn uses_default_limit_when_query_limit_is_zero() {
        let source = StubSource::with_result(Ok(vec![]));
        let mut query = LoadMessagesQuery::new("6289685028129@s.whatsapp.net");
        query.limit = 0;

        let _ = load_messages(&source, query).expect("load should succeed");

        let captured = source.captured.lock().expect("capture lock").clone();
        assert_eq!(captured.map(|(_, limit, _)| limit), Some(50));
    }

    #[test]
    fn caps_limit_to_maximum_boundary() {
        let source = StubSource::with_result(Ok(vec![]));
        let mut query = LoadMessagesQuery::new("6289685028129@s.whatsapp.net");
        query.limit = 999;

        let _ = load_messages(&source, query).expect("load should succeed");

        let captured = source.captured.lock().expect("capture lock").clone();
        assert_eq!(captured.map(|(_, limit, _)| limit), Some(200));
    }

    #[test]
    fn passes_jid_and_offset_to_source() {
        let source = StubSource::with_result(Ok(vec![]));
        let mut query = LoadMessagesQuery::new("1203630249817@g.us");
        query.offset = 50;

        let _ = load_messages(&source, query).expect("load should succeed");

        let captured = source
            .captured
            .lock()
            .expect("capture lock")
            .clone()
            .expect("source should have been called");
        assert_eq!(captured.0, "1203630249817@g.us");
        assert_eq!(captured.2, 50);
    }

    #[test]
    fn keeps_source_payload_without_mutation() {
        let messages = vec![sample_message()];
        let source = StubSource::with_result(Ok(messages.clone()));

        let output = load_messages(
            &source,
            LoadMessagesQuery::new("6289685028129@s.whatsapp.net"),
        )
        .expect("load should succeed");

        assert_eq!(output.messages, messages);
    }

    #[test]
    fn maps_source_errors_to_domain_errors() {
        let cases = [
            (MessagesSourceError::Unauthorized, LoadMessagesError::Unauthorized),
            (
                MessagesSourceError::Unavailable,
                LoadMessagesError::TemporarilyUnavailable,
            ),
            (
                MessagesSourceError::InvalidData,
                LoadMessagesError::DataContractViolation,
            ),
            (
                MessagesSourceError::ChatNotFound,
                LoadMessagesError::ChatNotFound,
            ),
        ];

        for (source_error, expected) in cases {
            let source = StubSource::with_result(Err(source_error));

            let err = load_messages(
                &source,
                LoadMessagesQuery::new("6289685028129@s.whatsapp.net"),
            )
            .expect_err("must fail");

            assert_eq!(err, expected);
        }
    }
}
