//! Gmail API client limited to the calls the mark-as-read run needs

use async_trait::async_trait;
use google_gmail1::api::{Message, ModifyMessageRequest};
use tracing::debug;

use crate::auth::{GmailHub, GMAIL_MODIFY_SCOPE};
use crate::error::Result;
use crate::models::{MessageHeader, MessagePage};

/// Default mailbox owner; "me" is the authenticated user
pub const DEFAULT_USER_ID: &str = "me";

/// Trait defining Gmail client operations for easier testing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GmailClient: Send + Sync {
    /// Fetch one page of message IDs matching `query`
    async fn list_messages_page(
        &self,
        query: &str,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<MessagePage>;

    /// Fetch a message's headers using the metadata projection
    async fn get_message_headers(&self, message_id: &str) -> Result<Vec<MessageHeader>>;

    /// Remove a label from a message
    async fn remove_label(&self, message_id: &str, label_id: &str) -> Result<()>;
}

/// Gmail client backed by the google-gmail1 hub
///
/// Calls are issued one at a time and are never retried.
pub struct ProductionGmailClient {
    hub: GmailHub,
    user_id: String,
}

impl ProductionGmailClient {
    pub fn new(hub: GmailHub, user_id: impl Into<String>) -> Self {
        Self {
            hub,
            user_id: user_id.into(),
        }
    }
}

/// Collect name/value pairs from a fetched message, dropping incomplete ones
fn headers_from_message(msg: Message) -> Vec<MessageHeader> {
    msg.payload
        .and_then(|p| p.headers)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|header| match (header.name, header.value) {
            (Some(name), Some(value)) => Some(MessageHeader { name, value }),
            _ => None,
        })
        .collect()
}

/// IDs in the order the API returned them
fn ids_from_messages(messages: Option<Vec<Message>>) -> Vec<String> {
    messages
        .unwrap_or_default()
        .into_iter()
        .filter_map(|msg| msg.id)
        .collect()
}

#[async_trait]
impl GmailClient for ProductionGmailClient {
    async fn list_messages_page(
        &self,
        query: &str,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<MessagePage> {
        let mut call = self
            .hub
            .users()
            .messages_list(&self.user_id)
            .q(query)
            .max_results(max_results);

        if let Some(token) = page_token.as_deref() {
            call = call.page_token(token);
        }

        let (_, response) = call.add_scope(GMAIL_MODIFY_SCOPE).doit().await?;

        let page = MessagePage::new(
            ids_from_messages(response.messages),
            response.next_page_token,
        );
        debug!(
            "Listed {} messages (more pages: {})",
            page.message_ids.len(),
            !page.is_last()
        );
        Ok(page)
    }

    async fn get_message_headers(&self, message_id: &str) -> Result<Vec<MessageHeader>> {
        let (_, msg) = self
            .hub
            .users()
            .messages_get(&self.user_id, message_id)
            .format("metadata")
            .add_metadata_headers("Subject")
            .add_metadata_headers("Date")
            .add_scope(GMAIL_MODIFY_SCOPE)
            .doit()
            .await?;

        Ok(headers_from_message(msg))
    }

    async fn remove_label(&self, message_id: &str, label_id: &str) -> Result<()> {
        let modify_request = ModifyMessageRequest {
            add_label_ids: None,
            remove_label_ids: Some(vec![label_id.to_string()]),
        };

        self.hub
            .users()
            .messages_modify(modify_request, &self.user_id, message_id)
            .add_scope(GMAIL_MODIFY_SCOPE)
            .doit()
            .await?;

        Ok(())
    }
}
