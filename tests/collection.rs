// tests/collection.rs
//! Paginated collection against fixture pages.

mod common;

use common::*;
use osf2graph::{PageCollector, ResourceKind};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_full_listing_in_page_order() {
    // page 2 finishes last; the result must still be in page order
    let api = Arc::new(user_nodes_listing(FixtureApi::new()).with_page_delay(2, Duration::from_millis(40)));
    let collector = PageCollector::with_workers(api.clone(), 2);

    let collected = collector.collect(ResourceKind::Nodes, &guid("u1")).await.unwrap();

    assert!(collected.is_complete());
    assert_eq!(collected.reported_total, Some(25));
    assert_eq!(collected.records.len(), 25);
    let ids: Vec<String> = collected.records.iter().map(|r| r.id.to_string()).collect();
    let expected: Vec<String> = (1..=25).map(|n| format!("n{:02}", n)).collect();
    assert_eq!(ids, expected);
    assert_eq!(collected.records[0].title, "Project n01");
    assert_eq!(
        collected.records[0].date.as_deref(),
        Some("2019-02-01T12:00:00.000000")
    );
    assert_eq!(api.requests().len(), 3);
}

#[tokio::test]
async fn test_failed_page_keeps_earlier_pages() {
    let api = Arc::new(
        FixtureApi::new()
            .with_page(ResourceKind::Nodes, "u1", 1, USER_NODES_PAGE_1)
            .with_page(ResourceKind::Nodes, "u1", 2, USER_NODES_PAGE_2),
    );
    let collector = PageCollector::with_workers(api, 2);

    let collected = collector.collect(ResourceKind::Nodes, &guid("u1")).await.unwrap();

    assert_eq!(collected.records.len(), 20);
    assert_eq!(collected.failures.len(), 1);
    assert_eq!(collected.failures[0].status, Some(404));
    assert!(collected.failures[0].url.ends_with("/users/u1/nodes/?page=3"));
    assert!(!collected.is_complete());
}

#[tokio::test]
async fn test_chunk_stops_at_first_failure() {
    // one worker walks pages 2 and 3 in order; page 2 failing means page 3
    // is never requested
    let api = Arc::new(
        FixtureApi::new()
            .with_page(ResourceKind::Nodes, "u1", 1, USER_NODES_PAGE_1)
            .with_page(ResourceKind::Nodes, "u1", 3, USER_NODES_PAGE_3),
    );
    let collector = PageCollector::with_workers(api.clone(), 1);

    let collected = collector.collect(ResourceKind::Nodes, &guid("u1")).await.unwrap();

    assert_eq!(collected.records.len(), 10);
    assert_eq!(collected.failures.len(), 1);
    assert!(!api.requests().iter().any(|url| url.ends_with("page=3")));
}

#[tokio::test]
async fn test_first_page_failure_yields_nothing() {
    let api = Arc::new(FixtureApi::new());
    let collector = PageCollector::new(api.clone());

    let collected = collector.collect(ResourceKind::Preprints, &guid("u1")).await.unwrap();

    assert!(collected.records.is_empty());
    assert_eq!(collected.reported_total, None);
    assert_eq!(collected.failures.len(), 1);
    assert_eq!(api.requests().len(), 1);
}

#[tokio::test]
async fn test_last_link_stands_in_for_missing_total() {
    let api = Arc::new(
        FixtureApi::new()
            .with_page(ResourceKind::Registrations, "u1", 1, USER_REGISTRATIONS_NO_TOTAL)
            .with_page(
                ResourceKind::Registrations,
                "u1",
                2,
                r#"{"data": [{"id": "r0002", "attributes": {"title": "Replication", "date_registered": "2021-01-01"}}],
                    "links": {"next": null}}"#,
            ),
    );
    let collector = PageCollector::new(api);

    let collected = collector
        .collect(ResourceKind::Registrations, &guid("u1"))
        .await
        .unwrap();

    assert_eq!(collected.reported_total, None);
    let ids: Vec<&str> = collected.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r0001", "r0002"]);
    assert_eq!(collected.records[1].date.as_deref(), Some("2021-01-01"));
}

#[tokio::test]
async fn test_contributor_listing_reads_embedded_users() {
    let api = Arc::new(FixtureApi::new().with_page(
        ResourceKind::Contributors,
        "api6f",
        1,
        PROJECT_CONTRIBUTORS,
    ));
    let collector = PageCollector::new(api);

    let collected = collector
        .collect(ResourceKind::Contributors, &guid("api6f"))
        .await
        .unwrap();

    // the deactivated contributor has no embedded user and yields no record
    assert_eq!(collected.records.len(), 1);
    assert_eq!(collected.records[0].id.as_str(), "u1");
    assert_eq!(collected.records[0].title, "Ada Lovelace");
    assert!(collected.is_complete());
}
