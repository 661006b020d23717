//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use gmail_mark_read::client::GmailClient;
use gmail_mark_read::error::{GmailError, Result};
use gmail_mark_read::models::{MessageHeader, MessagePage};
use mockall::mock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Convert string slices to owned message IDs
pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Headers as returned by a metadata fetch
pub fn create_test_headers(subject: &str, date: &str) -> Vec<MessageHeader> {
    vec![
        MessageHeader::new("From", "Sender <sender@example.com>"),
        MessageHeader::new("Subject", subject),
        MessageHeader::new("Date", date),
    ]
}

// Mock implementation of GmailClient for testing
mock! {
    pub GmailClient {}

    #[async_trait::async_trait]
    impl GmailClient for GmailClient {
        async fn list_messages_page(
            &self,
            query: &str,
            page_token: Option<String>,
            max_results: u32,
        ) -> Result<MessagePage>;
        async fn get_message_headers(&self, message_id: &str) -> Result<Vec<MessageHeader>>;
        async fn remove_label(&self, message_id: &str, label_id: &str) -> Result<()>;
    }
}

/// In-memory mailbox serving fixed pages and recording label removals
///
/// Page tokens are `page-<n>`. Messages without headers fail to fetch;
/// messages listed in `failing_marks` fail to have their label removed.
#[derive(Default)]
pub struct FakeMailbox {
    pages: Vec<Vec<String>>,
    headers: HashMap<String, Vec<MessageHeader>>,
    failing_marks: Vec<String>,
    list_calls: AtomicUsize,
    removed: Mutex<Vec<(String, String)>>,
}

impl FakeMailbox {
    pub fn with_pages(pages: Vec<Vec<String>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn add_message(mut self, id: &str, headers: Vec<MessageHeader>) -> Self {
        self.headers.insert(id.to_string(), headers);
        self
    }

    pub fn fail_mark(mut self, id: &str) -> Self {
        self.failing_marks.push(id.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn removed(&self) -> Vec<(String, String)> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl GmailClient for FakeMailbox {
    async fn list_messages_page(
        &self,
        _query: &str,
        page_token: Option<String>,
        _max_results: u32,
    ) -> Result<MessagePage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let index = match page_token {
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| GmailError::BadRequest(format!("bad page token {}", token)))?,
            None => 0,
        };

        let Some(page) = self.pages.get(index) else {
            return Ok(MessagePage::default());
        };

        let next = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(MessagePage::new(page.clone(), next))
    }

    async fn get_message_headers(&self, message_id: &str) -> Result<Vec<MessageHeader>> {
        self.headers
            .get(message_id)
            .cloned()
            .ok_or_else(|| GmailError::MessageNotFound(message_id.to_string()))
    }

    async fn remove_label(&self, message_id: &str, label_id: &str) -> Result<()> {
        if self.failing_marks.iter().any(|id| id == message_id) {
            return Err(GmailError::ServerError {
                status: 500,
                message: "HTTP 500: Internal Server Error".to_string(),
            });
        }
        self.removed
            .lock()
            .unwrap()
            .push((message_id.to_string(), label_id.to_string()));
        Ok(())
    }
}
