//! End-of-run summary
//!
//! The remaining count comes from a fresh listing, not from arithmetic on the
//! first one: mail can arrive or change state while the run is in progress.

use std::io::Write;

use crate::client::GmailClient;
use crate::error::Result;
use crate::scanner::list_all_matching;

/// Counts printed at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub marked_read: usize,
    pub remaining_unread: usize,
}

impl RunSummary {
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "\n📊 Summary:")?;
        writeln!(out, "🔹 Emails marked as read: {}", self.marked_read)?;
        writeln!(out, "📩 Remaining unread emails: {}", self.remaining_unread)?;
        Ok(())
    }
}

/// Re-list matching messages and build the summary
///
/// A failed listing is returned as an error.
pub async fn summarize<C>(
    client: &C,
    query: &str,
    page_size: u32,
    marked_read: usize,
) -> Result<RunSummary>
where
    C: GmailClient + ?Sized,
{
    let remaining = list_all_matching(client, query, page_size).await?;
    Ok(RunSummary {
        marked_read,
        remaining_unread: remaining.len(),
    })
}
