//! Paginated listing of messages matching a query

use tracing::{debug, info};

use crate::client::GmailClient;
use crate::error::Result;
use crate::models::UNREAD_QUERY;

/// Largest page size the Gmail list endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 500;

/// List every message ID matching `query`, following continuation tokens
///
/// IDs are returned in the order the API produced them. Any failed page
/// aborts the whole listing and discards the pages already fetched.
pub async fn list_all_matching<C>(client: &C, query: &str, page_size: u32) -> Result<Vec<String>>
where
    C: GmailClient + ?Sized,
{
    let mut all_ids = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = client
            .list_messages_page(query, page_token.take(), page_size)
            .await?;
        pages += 1;

        debug!("Page {}: {} message IDs", pages, page.message_ids.len());
        all_ids.extend(page.message_ids);

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    info!(
        "Query '{}' matched {} messages across {} page(s)",
        query,
        all_ids.len(),
        pages
    );
    Ok(all_ids)
}

/// List every unread message ID
pub async fn list_all_unread<C>(client: &C, page_size: u32) -> Result<Vec<String>>
where
    C: GmailClient + ?Sized,
{
    list_all_matching(client, UNREAD_QUERY, page_size).await
}
