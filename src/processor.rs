//! Per-message fetch, report and mark-as-read
//!
//! Each message goes through fetch, extract, report and mark exactly once.
//! A failure on one message is logged and never stops the others.

use chrono::{DateTime, FixedOffset};
use std::io::Write;
use tracing::{debug, warn};

use crate::client::GmailClient;
use crate::error::Result;
use crate::models::{zero_date, MessageHeader, MessageMetadata};

/// RFC 1123 with a numeric zone after the `Mon, ` prefix, e.g. `02 Jan 2006 15:04:05 -0700`
pub const DATE_HEADER_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Terminal state of one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Fetch failed, no mark attempted
    Skipped,
    /// Label removed
    Marked,
    /// Fetched and reported, but the label could not be removed
    MarkFailed,
}

/// Counters for a processing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub processed: usize,
    pub marked_read: usize,
    pub skipped: usize,
    pub mark_failed: usize,
}

impl ProcessingStats {
    pub fn record(&mut self, outcome: MessageOutcome) {
        self.processed += 1;
        match outcome {
            MessageOutcome::Skipped => self.skipped += 1,
            MessageOutcome::Marked => self.marked_read += 1,
            MessageOutcome::MarkFailed => self.mark_failed += 1,
        }
    }
}

/// Parse a `Date` header value such as `Mon, 02 Jan 2006 15:04:05 -0700`
///
/// The weekday must be a three-letter day name but is not checked against the
/// date. The day of month must have two digits. Surrounding whitespace and any
/// trailing text are rejected.
pub fn parse_date_header(value: &str) -> Option<DateTime<FixedOffset>> {
    if value.ends_with(char::is_whitespace) {
        return None;
    }

    let (weekday, rest) = value.split_once(", ")?;
    if !WEEKDAY_NAMES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(weekday))
    {
        return None;
    }

    let (day, _) = rest.split_once(' ')?;
    if day.len() != 2 || !day.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    DateTime::parse_from_str(rest, DATE_HEADER_FORMAT).ok()
}

/// Pull subject and received date out of a header list
///
/// Header names match exactly (`Subject`, `Date`). A missing subject is empty;
/// a missing or unparseable date is [`zero_date`]. When a header repeats, the
/// last one wins.
pub fn extract_metadata(id: &str, headers: &[MessageHeader]) -> MessageMetadata {
    let mut subject = String::new();
    let mut date_received = zero_date();

    for header in headers {
        match header.name.as_str() {
            "Subject" => subject = header.value.clone(),
            "Date" => date_received = parse_date_header(&header.value).unwrap_or_else(zero_date),
            _ => {}
        }
    }

    MessageMetadata {
        id: id.to_string(),
        subject,
        date_received,
    }
}

/// Runs the per-message steps against a [`GmailClient`]
pub struct MessageProcessor<'a, C: ?Sized> {
    client: &'a C,
    label_id: String,
}

impl<'a, C> MessageProcessor<'a, C>
where
    C: GmailClient + ?Sized,
{
    /// `label_id` is the label removed from every message (normally `UNREAD`)
    pub fn new(client: &'a C, label_id: impl Into<String>) -> Self {
        Self {
            client,
            label_id: label_id.into(),
        }
    }

    /// Process one message, writing its report lines to `out`
    ///
    /// Remote failures become outcomes; only a failed write to `out` is an error.
    pub async fn process_message<W: Write>(
        &self,
        message_id: &str,
        out: &mut W,
    ) -> Result<MessageOutcome> {
        let headers = match self.client.get_message_headers(message_id).await {
            Ok(headers) => headers,
            Err(e) => {
                warn!("Could not retrieve message {}: {}", message_id, e);
                return Ok(MessageOutcome::Skipped);
            }
        };

        let metadata = extract_metadata(message_id, &headers);
        writeln!(
            out,
            "📧 {} - Received: {}",
            metadata.subject,
            metadata.received_display()
        )?;

        match self.client.remove_label(message_id, &self.label_id).await {
            Ok(()) => {
                debug!("Removed {} from {}", self.label_id, message_id);
                writeln!(out, "✅ Marked as read!")?;
                Ok(MessageOutcome::Marked)
            }
            Err(e) => {
                warn!("Failed to mark message {} as read: {}", message_id, e);
                writeln!(out, "❌ Failed to mark as read")?;
                Ok(MessageOutcome::MarkFailed)
            }
        }
    }

    /// Process messages one after another in listing order
    pub async fn process_all<W: Write>(
        &self,
        message_ids: &[String],
        out: &mut W,
    ) -> Result<ProcessingStats> {
        let mut stats = ProcessingStats::default();
        for id in message_ids {
            let outcome = self.process_message(id, out).await?;
            stats.record(outcome);
        }
        Ok(stats)
    }
}
