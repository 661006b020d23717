use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Query selecting messages that still carry the UNREAD label
pub const UNREAD_QUERY: &str = "is:unread";

/// System label removed to mark a message as read
pub const UNREAD_LABEL: &str = "UNREAD";

/// One page of a `messages.list` response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    pub message_ids: Vec<String>,
    /// Continuation token, `None` on the last page
    pub next_page_token: Option<String>,
}

impl MessagePage {
    pub fn new(message_ids: Vec<String>, next_page_token: Option<String>) -> Self {
        Self {
            message_ids,
            // An empty token also means "no more pages"
            next_page_token: next_page_token.filter(|token| !token.is_empty()),
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}

/// A single header from a metadata-projection fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

impl MessageHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Subject and received date of one message, derived from its headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMetadata {
    pub id: String,
    pub subject: String,
    /// Parsed `Date` header, or [`zero_date`] when missing or malformed
    pub date_received: DateTime<FixedOffset>,
}

impl MessageMetadata {
    /// Date formatted the way the report prints it
    pub fn received_display(&self) -> String {
        self.date_received.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Timestamp used when a message has no parseable `Date` header
///
/// Midnight UTC on January 1 of year 1, printed as `0001-01-01 00:00:00`.
pub fn zero_date() -> DateTime<FixedOffset> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
        .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC.fixed_offset())
}
