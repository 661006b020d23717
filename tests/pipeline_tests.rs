//! End-to-end tests of the list / process / summarize pipeline
//!
//! These drive `mark_all_read` against mocked and in-memory Gmail clients and
//! check both the returned report and the printed output.

mod common;

use common::{create_test_headers, ids, FakeMailbox, MockGmailClient};
use gmail_mark_read::cli::mark_all_read;
use gmail_mark_read::config::MailboxConfig;
use gmail_mark_read::error::GmailError;
use gmail_mark_read::models::MessagePage;
use mockall::predicate::*;
use mockall::Sequence;

const DATE: &str = "Wed, 15 Jan 2025 09:30:00 +0000";

#[tokio::test]
async fn test_three_messages_one_fetch_failure() {
    let mut client = MockGmailClient::new();
    let mut seq = Sequence::new();

    // Initial listing: three unread
    client
        .expect_list_messages_page()
        .with(eq("is:unread"), eq(None::<String>), eq(500u32))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(MessagePage::new(ids(&["m1", "m2", "m3"]), None)));

    // Follow-up listing: one still unread
    client
        .expect_list_messages_page()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(MessagePage::new(ids(&["m9"]), None)));

    client.expect_get_message_headers().returning(|id| match id {
        "m1" => Ok(create_test_headers("First", DATE)),
        "m2" => Err(GmailError::NetworkError("connection reset".to_string())),
        "m3" => Ok(create_test_headers("Third", DATE)),
        other => panic!("unexpected fetch of {}", other),
    });

    client
        .expect_remove_label()
        .with(eq("m1"), eq("UNREAD"))
        .times(1)
        .returning(|_, _| Ok(()));
    client
        .expect_remove_label()
        .with(eq("m3"), eq("UNREAD"))
        .times(1)
        .returning(|_, _| Ok(()));

    let mut out = Vec::new();
    let report = mark_all_read(&client, &MailboxConfig::default(), &mut out)
        .await
        .unwrap();

    assert_eq!(report.initial_unread, 3);
    assert_eq!(report.marked_read(), 2);
    assert_eq!(report.stats.skipped, 1);
    let summary = report.summary.unwrap();
    assert_eq!(summary.marked_read, 2);
    assert_eq!(summary.remaining_unread, 1);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("📩 Total unread emails: 3\n"));
    assert!(printed.contains("📧 First - Received: 2025-01-15 09:30:00"));
    assert!(printed.contains("📧 Third - Received: 2025-01-15 09:30:00"));
    assert_eq!(printed.matches("✅ Marked as read!").count(), 2);
    assert!(printed.ends_with("🔹 Emails marked as read: 2\n📩 Remaining unread emails: 1\n"));
}

#[tokio::test]
async fn test_mark_failure_is_reported_but_not_counted() {
    let mailbox = FakeMailbox::with_pages(vec![ids(&["a", "b"])])
        .add_message("a", create_test_headers("Alpha", DATE))
        .add_message("b", create_test_headers("Beta", DATE))
        .fail_mark("b");

    let mut out = Vec::new();
    let report = mark_all_read(&mailbox, &MailboxConfig::default(), &mut out)
        .await
        .unwrap();

    assert_eq!(report.marked_read(), 1);
    assert_eq!(report.stats.mark_failed, 1);
    assert_eq!(mailbox.removed(), vec![("a".to_string(), "UNREAD".to_string())]);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("📧 Beta - Received: 2025-01-15 09:30:00\n❌ Failed to mark as read"));
}

#[tokio::test]
async fn test_empty_mailbox_lists_once_and_stops() {
    let mailbox = FakeMailbox::with_pages(vec![]);

    let mut out = Vec::new();
    let report = mark_all_read(&mailbox, &MailboxConfig::default(), &mut out)
        .await
        .unwrap();

    assert_eq!(report.initial_unread, 0);
    assert!(report.summary.is_none());
    assert_eq!(mailbox.list_calls(), 1);
    assert!(mailbox.removed().is_empty());

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("📩 Total unread emails: 0"));
    assert!(!printed.contains("Summary"));
}

#[tokio::test]
async fn test_initial_listing_failure_aborts_before_processing() {
    let mut client = MockGmailClient::new();
    client
        .expect_list_messages_page()
        .times(1)
        .returning(|_, _, _| Err(GmailError::AuthError("invalid_grant".to_string())));
    client.expect_get_message_headers().never();
    client.expect_remove_label().never();

    let mut out = Vec::new();
    let err = mark_all_read(&client, &MailboxConfig::default(), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, GmailError::AuthError(_)));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_final_listing_failure_is_an_error() {
    let mut client = MockGmailClient::new();
    let mut seq = Sequence::new();

    client
        .expect_list_messages_page()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(MessagePage::new(ids(&["m1"]), None)));
    client
        .expect_list_messages_page()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| {
            Err(GmailError::ServerError {
                status: 502,
                message: "HTTP 502: Bad Gateway".to_string(),
            })
        });
    client
        .expect_get_message_headers()
        .returning(|_| Ok(create_test_headers("Only", DATE)));
    client.expect_remove_label().times(1).returning(|_, _| Ok(()));

    let mut out = Vec::new();
    let result = mark_all_read(&client, &MailboxConfig::default(), &mut out).await;

    assert!(matches!(result, Err(GmailError::ServerError { status: 502, .. })));
    // The message was still processed before the summary failed
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("✅ Marked as read!"));
}

#[tokio::test]
async fn test_custom_mailbox_settings_are_used() {
    let mut client = MockGmailClient::new();
    client
        .expect_list_messages_page()
        .with(eq("is:unread in:inbox"), eq(None::<String>), eq(100u32))
        .times(2)
        .returning(|_, _, _| Ok(MessagePage::new(ids(&["m1"]), None)));
    client
        .expect_get_message_headers()
        .returning(|_| Ok(create_test_headers("Hi", DATE)));
    client
        .expect_remove_label()
        .with(eq("m1"), eq("Label_42"))
        .times(1)
        .returning(|_, _| Ok(()));

    let mailbox = MailboxConfig {
        user_id: "me".to_string(),
        query: "is:unread in:inbox".to_string(),
        page_size: 100,
        remove_label: "Label_42".to_string(),
    };

    let report = mark_all_read(&client, &mailbox, &mut std::io::sink())
        .await
        .unwrap();
    assert_eq!(report.marked_read(), 1);
    assert_eq!(report.summary.unwrap().remaining_unread, 1);
}
