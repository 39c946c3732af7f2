//! Blocking HTTP client for the GOWA backend: one method per endpoint, every
//! request signed with the shared Basic-Auth handle and the optional API key.

use std::sync::Arc;

use reqwest::{
    blocking::{Client, RequestBuilder},
    header::{AUTHORIZATION, CONTENT_TYPE},
};

use crate::{
    domain::{chat::Chat, message::Message, session::Credentials, status::ConnectionStatus},
    gowa::{
        credentials::{basic_auth_value, SharedCredentials},
        envelope::{decode_results, error_from_response, GowaError},
        wire::{map_chats, map_messages, ChatPage, MessagePage, PairIssued, QrIssued, StatusReply},
    },
    infra::config::BackendConfig,
    usecases::{
        list_chats::{ListChatsSource, ListChatsSourceError},
        load_messages::{MessagesSource, MessagesSourceError},
        send_message::{MessageSender, SendMessageSourceError},
        session::{ProbeError, SessionProbe},
    },
};

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Clone)]
pub struct GowaClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    credentials: Arc<SharedCredentials>,
}

impl GowaClient {
    pub fn new(config: &BackendConfig, credentials: Arc<SharedCredentials>) -> Self {
        Self {
            http: Client::new(),
            base_url: normalize_base_url(&config.base_url),
            api_key: config.api_key.clone(),
            credentials,
        }
    }

    pub fn app_status(&self) -> Result<ConnectionStatus, GowaError> {
        let body = self.get("/app/status", &[])?;
        decode_results::<StatusReply>("app-status", &body).map(StatusReply::into_status)
    }

    pub fn request_qr_login(&self) -> Result<QrIssued, GowaError> {
        let body = self.get("/app/login", &[])?;
        decode_results("login", &body)
    }

    pub fn request_pair_code(&self, phone: &str) -> Result<PairIssued, GowaError> {
        let body = self.get("/app/login-with-code", &[("phone", phone.to_owned())])?;
        decode_results("login-with-code", &body)
    }

    pub fn logout_device(&self) -> Result<(), GowaError> {
        self.post("/app/logout", None).map(|_| ())
    }

    pub fn reconnect_device(&self) -> Result<(), GowaError> {
        self.post("/app/reconnect", None).map(|_| ())
    }

    pub fn list_chats_page(
        &self,
        limit: usize,
        offset: usize,
        search: Option<&str>,
    ) -> Result<Vec<Chat>, GowaError> {
        let mut query = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        if let Some(term) = search {
            query.push(("search", term.to_owned()));
        }

        let body = self.get("/chats", &query)?;
        let page: ChatPage = decode_results("chats", &body)?;
        Ok(map_chats(page.data))
    }

    pub fn chat_messages_page(
        &self,
        jid: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>, GowaError> {
        let path = format!("/chat/{jid}/messages");
        let body = self.get(
            &path,
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )?;
        let page: MessagePage = decode_results("chat-messages", &body)?;
        Ok(map_messages(page.data))
    }

    /// Fire-and-forget: HTTP 2xx is the only success signal.
    pub fn send_text(&self, jid: &str, text: &str) -> Result<(), GowaError> {
        let payload = serde_json::json!({ "phone": jid, "message": text });
        self.post("/send/message", Some(&payload)).map(|_| ())
    }

    /// Authenticated status call with an explicit credential pair, used to
    /// validate a login or a restored session without touching the shared
    /// handle.
    pub fn probe_credentials(&self, credentials: &Credentials) -> Result<(), GowaError> {
        let builder = self
            .http
            .get(self.url("/app/status"))
            .header(AUTHORIZATION, basic_auth_value(credentials))
            .header(CONTENT_TYPE, "application/json");
        self.execute(self.with_api_key(builder)).map(|_| ())
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, GowaError> {
        let builder = self.http.get(self.url(path)).query(query);
        self.execute(self.signed(builder))
    }

    fn post(
        &self,
        path: &str,
        payload: Option<&serde_json::Value>,
    ) -> Result<String, GowaError> {
        let mut builder = self.http.post(self.url(path));
        if let Some(payload) = payload {
            builder = builder.json(payload);
        }
        self.execute(self.signed(builder))
    }

    fn signed(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(AUTHORIZATION, self.credentials.basic_auth_value())
            .header(CONTENT_TYPE, "application/json");
        self.with_api_key(builder)
    }

    fn with_api_key(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    fn execute(&self, builder: RequestBuilder) -> Result<String, GowaError> {
        let response = builder.send()?;
        let http_status = response.status().as_u16();
        let body = response.text()?;

        if !(200..300).contains(&http_status) {
            return Err(error_from_response(http_status, &body));
        }

        Ok(body)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim_end_matches('/').to_owned()
}

impl ListChatsSource for GowaClient {
    fn list_chats(
        &self,
        limit: usize,
        offset: usize,
        search: Option<&str>,
    ) -> Result<Vec<Chat>, ListChatsSourceError> {
        self.list_chats_page(limit, offset, search)
            .map_err(list_chats_source_error)
    }
}

impl MessagesSource for GowaClient {
    fn list_messages(
        &self,
        jid: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>, MessagesSourceError> {
        self.chat_messages_page(jid, limit, offset)
            .map_err(messages_source_error)
    }
}

impl MessageSender for GowaClient {
    fn send_message(&self, jid: &str, text: &str) -> Result<(), SendMessageSourceError> {
        self.send_text(jid, text).map_err(send_source_error)
    }
}

impl crate::sync::GowaBackend for GowaClient {
    fn app_status(&self) -> Result<ConnectionStatus, GowaError> {
        GowaClient::app_status(self)
    }

    fn request_qr_login(&self) -> Result<QrIssued, GowaError> {
        GowaClient::request_qr_login(self)
    }

    fn request_pair_code(&self, phone: &str) -> Result<PairIssued, GowaError> {
        GowaClient::request_pair_code(self, phone)
    }

    fn logout_device(&self) -> Result<(), GowaError> {
        GowaClient::logout_device(self)
    }

    fn reconnect_device(&self) -> Result<(), GowaError> {
        GowaClient::reconnect_device(self)
    }
}

impl SessionProbe for GowaClient {
    fn probe(&self, credentials: &Credentials) -> Result<(), ProbeError> {
        self.probe_credentials(credentials).map_err(|error| {
            if error.is_unauthorized() {
                ProbeError::Unauthorized
            } else {
                ProbeError::Unavailable
            }
        })
    }
}

fn list_chats_source_error(error: GowaError) -> ListChatsSourceError {
    if error.is_unauthorized() {
        return ListChatsSourceError::Unauthorized;
    }

    match error {
        GowaError::Decode { .. } | GowaError::MissingResults { .. } => {
            ListChatsSourceError::InvalidData
        }
        GowaError::Transport(_) | GowaError::Backend { .. } => ListChatsSourceError::Unavailable,
    }
}

fn messages_source_error(error: GowaError) -> MessagesSourceError {
    if error.is_unauthorized() {
        return MessagesSourceError::Unauthorized;
    }

    if error.http_status() == Some(404) {
        return MessagesSourceError::ChatNotFound;
    }

    match error {
        GowaError::Decode { .. } | GowaError::MissingResults { .. } => {
            MessagesSourceError::InvalidData
        }
        GowaError::Transport(_) | GowaError::Backend { .. } => MessagesSourceError::Unavailable,
    }
}

fn send_source_error(error: GowaError) -> SendMessageSourceError {
    if error.is_unauthorized() {
        return SendMessageSourceError::Unauthorized;
    }

    if error.http_status() == Some(404) {
        return SendMessageSourceError::ChatNotFound;
    }

    SendMessageSourceError::Unavailable
}
