//! Ticket list synchronization against a live in-memory store.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use helpdesk::list::{TicketListEnvironment, TicketListScreen};
use helpdesk_core::document_store::{DocumentStore, TicketPatch};
use helpdesk_core::environment::Clock;
use helpdesk_core::error::StoreError;
use helpdesk_core::format::TimestampFormat;
use helpdesk_core::ticket::{NewTicket, Resolution, Ticket, TicketId, TicketStatus};
use helpdesk_runtime::StoreConfig;
use helpdesk_testing::{test_clock, InMemoryDocumentStore};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

fn seeded_store() -> InMemoryDocumentStore {
    let store = InMemoryDocumentStore::new(Arc::new(test_clock()));
    let now = test_clock().now();
    store.insert(&Ticket::open(TicketId::new("a"), "100", "no power", now));
    store.insert(&Ticket::open(TicketId::new("c"), "300", "noisy fan", now));
    store.insert(
        &Ticket::open(TicketId::new("b"), "200", "dead disk", now)
            .closed(Resolution::new("replaced disk", now).unwrap()),
    );
    store
}

fn screen(store: &InMemoryDocumentStore) -> TicketListScreen {
    TicketListScreen::new(
        TicketListEnvironment {
            store: Arc::new(store.clone()),
            format: TimestampFormat::default(),
        },
        StoreConfig::default(),
    )
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn list_keeps_store_order() {
    let store = seeded_store();
    let screen = screen(&store);

    let _guard = screen.activate(TicketStatus::Open).await.unwrap();
    screen.wait_for(|s| !s.loading, WAIT).await.unwrap();

    let ids: Vec<String> = screen
        .items()
        .await
        .into_iter()
        .map(|item| item.id.into_inner())
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[tokio::test]
async fn rapid_filter_switching_shows_only_last_filter() {
    let store = seeded_store();
    let screen = screen(&store);

    let _guard = screen.activate(TicketStatus::Open).await.unwrap();
    screen.select_filter(TicketStatus::Closed).await.unwrap();
    screen.select_filter(TicketStatus::Open).await.unwrap();
    screen.wait_for(|s| !s.loading, WAIT).await.unwrap();
    settle().await;

    let state = screen.snapshot().await;
    assert_eq!(state.filter, TicketStatus::Open);
    assert_eq!(state.items.len(), 2);
    assert!(state.items.iter().all(|item| item.status == TicketStatus::Open));
    assert_eq!(store.live_queries(), 1);
}

#[tokio::test]
async fn every_commit_is_delivered() {
    let store = seeded_store();
    let screen = screen(&store);
    let _guard = screen.activate(TicketStatus::Closed).await.unwrap();
    screen.wait_for(|s| s.items.len() == 1, WAIT).await.unwrap();

    store
        .update(TicketId::new("a"), TicketPatch::close("new PSU"))
        .await
        .unwrap();
    screen.wait_for(|s| s.items.len() == 2, WAIT).await.unwrap();

    store.delete(&TicketId::new("b"));
    screen
        .wait_for(|s| s.items.len() == 1 && s.items[0].id.as_str() == "a", WAIT)
        .await
        .unwrap();
}

#[tokio::test]
async fn dropping_the_guard_releases_the_live_query() {
    let store = seeded_store();
    let screen = screen(&store);

    let guard = screen.activate(TicketStatus::Open).await.unwrap();
    screen.wait_for(|s| s.items.len() == 2, WAIT).await.unwrap();
    assert!(screen.is_subscribed());

    drop(guard);
    assert!(!screen.is_subscribed());

    for _ in 0..100 {
        if store.live_queries() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(store.live_queries(), 0);

    store.create(NewTicket::new("400", "no signal").unwrap()).await.unwrap();
    settle().await;
    assert_eq!(screen.items().await.len(), 2);
    screen.wait_for(|s| !s.active, WAIT).await.unwrap();
}

#[tokio::test]
async fn release_deactivates_the_screen() {
    let store = seeded_store();
    let screen = screen(&store);

    let guard = screen.activate(TicketStatus::Open).await.unwrap();
    guard.release().await.unwrap();

    let state = screen.snapshot().await;
    assert!(!state.active);
    assert!(!screen.is_subscribed());
}

#[tokio::test]
async fn superseded_guard_does_not_release_the_new_activation() {
    let store = seeded_store();
    let screen = screen(&store);

    let first = screen.activate(TicketStatus::Open).await.unwrap();
    let _second = screen.activate(TicketStatus::Closed).await.unwrap();
    drop(first);

    assert!(screen.is_subscribed());
    screen.wait_for(|s| s.items.len() == 1, WAIT).await.unwrap();
}

#[tokio::test]
async fn reactivating_right_after_drop_keeps_the_new_query() {
    let store = seeded_store();
    let screen = screen(&store);

    let first = screen.activate(TicketStatus::Open).await.unwrap();
    drop(first);
    let _second = screen.activate(TicketStatus::Open).await.unwrap();
    settle().await;

    let state = screen.snapshot().await;
    assert!(state.active);
    assert!(screen.is_subscribed());
    assert_eq!(store.live_queries(), 1);
    assert_eq!(state.items.len(), 2);

    store.create(NewTicket::new("400", "no signal").unwrap()).await.unwrap();
    screen.wait_for(|s| s.items.len() == 3, WAIT).await.unwrap();
}

#[tokio::test]
async fn reactivating_after_release_starts_a_fresh_query() {
    let store = seeded_store();
    let screen = screen(&store);

    let first = screen.activate(TicketStatus::Open).await.unwrap();
    screen.wait_for(|s| s.items.len() == 2, WAIT).await.unwrap();
    first.release().await.unwrap();
    assert!(!screen.is_subscribed());

    let _second = screen.activate(TicketStatus::Closed).await.unwrap();
    screen.wait_for(|s| s.items.len() == 1, WAIT).await.unwrap();
    settle().await;

    let state = screen.snapshot().await;
    assert!(state.active);
    assert!(screen.is_subscribed());
    assert_eq!(state.filter, TicketStatus::Closed);

    store
        .update(TicketId::new("c"), TicketPatch::close("cleaned fan"))
        .await
        .unwrap();
    screen.wait_for(|s| s.items.len() == 2, WAIT).await.unwrap();
}

#[tokio::test]
async fn revoked_subscription_is_reported_and_not_fatal() {
    let store = seeded_store();
    let screen = screen(&store);
    let _guard = screen.activate(TicketStatus::Open).await.unwrap();
    screen.wait_for(|s| s.items.len() == 2, WAIT).await.unwrap();

    store.revoke_subscriptions();
    screen.wait_for(|s| s.error.is_some(), WAIT).await.unwrap();

    let state = screen.snapshot().await;
    assert!(matches!(state.error, Some(StoreError::SubscriptionFailed(_))));
    assert_eq!(state.items.len(), 2);
    assert!(state.notification().is_some());

    // The screen keeps working: switching filters starts a fresh query.
    screen.select_filter(TicketStatus::Closed).await.unwrap();
    screen
        .wait_for(|s| s.error.is_none() && s.items.len() == 1, WAIT)
        .await
        .unwrap();
}

#[tokio::test]
async fn failed_query_is_reported() {
    let store = seeded_store();
    store.fail_next_query(StoreError::SubscriptionFailed("no permission".to_string()));
    let screen = screen(&store);

    let _guard = screen.activate(TicketStatus::Open).await.unwrap();
    screen.wait_for(|s| s.error.is_some(), WAIT).await.unwrap();

    let state = screen.snapshot().await;
    assert!(!state.loading);
    assert!(state.items.is_empty());
}
