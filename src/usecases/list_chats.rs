use crate::domain::chat::Chat;

const DEFAULT_CHAT_PAGE_SIZE: usize = 25;
const MAX_CHAT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListChatsQuery {
    /// 0 means "use the default page size".
    pub limit: usize,
    pub offset: usize,
    /// Server-side substring match on the chat name.
    pub search: Option<String>,
}

impl ListChatsQuery {
    pub fn with_search(search: Option<String>) -> Self {
        Self {
            search,
            ..Self::default()
        }
    }

    fn normalized_limit(&self) -> usize {
        match self.limit {
            0 => DEFAULT_CHAT_PAGE_SIZE,
            value if value > MAX_CHAT_PAGE_SIZE => MAX_CHAT_PAGE_SIZE,
            value => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListChatsOutput {
    pub chats: Vec<Chat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChatsSourceError {
    Unauthorized,
    Unavailable,
    InvalidData,
    Unknown,
}

pub trait ListChatsSource {
    fn list_chats(
        &self,
        limit: usize,
        offset: usize,
        search: Option<&str>,
    ) -> Result<Vec<Chat>, ListChatsSourceError>;
}

impl<T: ListChatsSource + ?Sized> ListChatsSource for &T {
    fn list_chats(
        &self,
        limit: usize,
        offset: usize,
        search: Option<&str>,
    ) -> Result<Vec<Chat>, ListChatsSourceError> {
        (*self).list_chats(limit, offset, search)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChatsError {
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
}

pub fn list_chats(
    source: &dyn ListChatsSource,
    query: ListChatsQuery,
) -> Result<ListChatsOutput, ListChatsError> {
    let limit = query.normalized_limit();
    let search = query.search.as_deref().filter(|term| !term.is_empty());
    let chats = source
        .list_chats(limit, query.offset, search)
        .map_err(map_source_error)?;

    Ok(ListChatsOutput { chats })
}

fn map_source_error(error: ListChatsSourceError) -> ListChatsError {
    match error {
        ListChatsSourceError::Unauthorized => ListChatsError::Unauthorized,
        ListChatsSourceError::Unavailable | ListChatsSourceError::Unknown => {
            ListChatsError::TemporarilyUnavailable
        }
        ListChatsSourceError::InvalidData => ListChatsError::DataContractViolation,
    }
}
