//! Sending a text message to a chat. Fire-and-forget: a 2xx from the backend
//! is success, no delivery receipt is tracked client-side.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub jid: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageSourceError {
    Unauthorized,
    ChatNotFound,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// Message text is empty after trimming whitespace.
    EmptyMessage,
    Unauthorized,
    ChatNotFound,
    TemporarilyUnavailable,
}

pub trait MessageSender {
    fn send_message(&self, jid: &str, text: &str) -> Result<(), SendMessageSourceError>;
}

impl<T: MessageSender + ?Sized> MessageSender for &T {
    fn send_message(&self, jid: &str, text: &str) -> Result<(), SendMessageSourceError> {
        (*self).send_message(jid, text)
    }
}

pub fn send_message(
    sender: &dyn MessageSender,
    command: SendMessageCommand,
) -> Result<(), SendMessageError> {
    let text = command.text.trim();
    if text.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }

    sender
        .send_message(&command.jid, text)
        .map_err(map_source_error)
}

fn map_source_error(error: SendMessageSourceError) -> SendMessageError {
    match error {
        SendMessageSourceError::Unauthorized => SendMessageError::Unauthorized,
        SendMessageSourceError::ChatNotFound => SendMessageError::ChatNotFound,
        SendMessageSourceError::Unavailable => SendMessageError::TemporarilyUnavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct StubSender {
        result: Result<(), SendMessageSourceError>,
        captured_jid: RefCell<Option<String>>,
        captured_text: RefCell<Option<String>>,
    }

    impl StubSender {
        fn with_result(result: Result<(), SendMessageSourceError>) -> Self {
            Self {
                result,
                captured_jid: RefCell::new(None),
                captured_text: RefCell::new(None),
            }
        }
    }

    impl MessageSender for StubSender {
        fn send_message(&self, jid: &str, text: &str) -> Result<(), SendMessageSourceError> {
            *self.captured_jid.borrow_mut() = Some(jid.to_owned());
            *self.captured_text.borrow_mut() = Some(text.to_owned());
            self.result.clone()
        }
    }

    fn command(text: &str) -> SendMessageCommand {
        SendMessageCommand {
            jid: "6289685028129@s.whatsapp.net".to_owned(),
            text: text.to_owned(),
        }
    }

    #[test]
    fn rejects_empty_message_text() {
        let sender = StubSender::with_result(Ok(()));

        let result = send_message(&sender, command(""));

        assert_eq!(result, Err(SendMessageError::EmptyMessage));
        assert!(sender.captured_jid.borrow().is_none());
    }

    #[test]
    fn rejects_whitespace_only_message() {
        let sender = StubSender::with_result(Ok(()));

        let result = send_message(&sender, command("   \n\t  "));

        assert_eq!(result, Err(SendMessageError::EmptyMessage));
    }

    #[test]
    fn trims_whitespace_before_sending() {
        let sender = StubSender::with_result(Ok(()));

        let _ = send_message(&sender, command("  hello world  "));

        assert_eq!(
            *sender.captured_text.borrow(),
            Some("hello world".to_owned())
        );
    }

    #[test]
    fn passes_jid_to_sender_and_returns_ok() {
        let sender = StubSender::with_result(Ok(()));

        let result = send_message(&sender, command("hello"));

        assert_eq!(result, Ok(()));
        assert_eq!(
            *sender.captured_jid.borrow(),
            Some("6289685028129@s.whatsapp.net".to_owned())
        );
    }

    #[test]
    fn maps_source_errors_to_domain_errors() {
        let cases = [
            (SendMessageSourceError::Unauthorized, SendMessageError::Unauthorized),
            (SendMessageSourceError::ChatNotFound, SendMessageError::ChatNotFound),
            (
                SendMessageSourceError::Unavailable,
                SendMessageError::TemporarilyUnavailable,
            ),
        ];

        for (source_error, expected) in cases {
            let sender = StubSender::with_result(Err(source_error));

            let result = send_message(&sender, command("hello"));

            assert_eq!(result, Err(expected));
        }
    }
}
