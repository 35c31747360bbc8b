//! Cursor pagination across successive pages.

mod common;

use ci_build_query::{BuildQuery, MemoryStore, QueryConfig, QuerySources, Viewer};
use pretty_assertions::assert_eq;

use common::*;

async fn fifty_builds() -> MemoryStore {
    let store = store();
    store.insert_buildable(buildable(1, "public", "public")).await;
    store.insert_buildable(buildable(2, "secret", ALICE)).await;
    for id in 1..=50 {
        store.insert_build(build(id, "public", None, 1)).await;
    }
    store
}

#[tokio::test]
async fn pages_are_contiguous_and_non_overlapping() {
    let store = fifty_builds().await;
    let sources = QuerySources::from_store(&store);

    let first = BuildQuery::new(Viewer::public(), sources)
        .with_limit(20)
        .execute()
        .await
        .unwrap();
    assert_eq!(first.ids(), (1..=20).collect::<Vec<_>>());
    let cursor = first.next_cursor.clone().expect("more pages");

    let second = BuildQuery::new(Viewer::public(), sources)
        .with_limit(20)
        .after(cursor)
        .execute()
        .await
        .unwrap();
    assert_eq!(second.ids(), (21..=40).collect::<Vec<_>>());
    let cursor = second.next_cursor.clone().expect("more pages");

    let third = BuildQuery::new(Viewer::public(), sources)
        .with_limit(20)
        .after(cursor)
        .execute()
        .await
        .unwrap();
    assert_eq!(third.ids(), (41..=50).collect::<Vec<_>>());
    assert!(third.is_last());
}

#[tokio::test]
async fn exact_fit_has_no_continuation() {
    let store = fifty_builds().await;

    let page = BuildQuery::new(Viewer::public(), QuerySources::from_store(&store))
        .with_limit(50)
        .execute()
        .await
        .unwrap();

    assert_eq!(page.builds.len(), 50);
    assert!(page.is_last());
}

#[tokio::test]
async fn same_cursor_returns_same_page() {
    let store = fifty_builds().await;
    let sources = QuerySources::from_store(&store);

    let first = BuildQuery::new(Viewer::public(), sources)
        .with_limit(10)
        .execute()
        .await
        .unwrap();
    let cursor = first.next_cursor.expect("more pages");

    let query = BuildQuery::new(Viewer::public(), sources)
        .with_limit(10)
        .after(cursor);
    let a = query.execute().await.unwrap();
    let b = query.execute().await.unwrap();
    assert_eq!(a, b);
    assert_eq!(a.ids(), (11..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn hidden_builds_do_not_stall_the_cursor() {
    let store = store();
    store.insert_buildable(buildable(1, "public", "public")).await;
    store.insert_buildable(buildable(2, "secret", ALICE)).await;
    for id in 1..=6 {
        let name = if id % 2 == 0 { "secret" } else { "public" };
        store.insert_build(build(id, name, None, 1)).await;
    }
    let sources = QuerySources::from_store(&store);

    let first = BuildQuery::new(Viewer::public(), sources)
        .with_limit(3)
        .execute()
        .await
        .unwrap();
    assert_eq!(first.ids(), vec![1, 3]);

    let second = BuildQuery::new(Viewer::public(), sources)
        .with_limit(3)
        .after(first.next_cursor.expect("more pages"))
        .execute()
        .await
        .unwrap();
    assert_eq!(second.ids(), vec![5]);
    assert!(second.is_last());
}

#[tokio::test]
async fn page_size_is_clamped_to_configured_maximum() {
    let store = fifty_builds().await;
    let config = QueryConfig {
        max_page_size: 15,
        ..Default::default()
    };

    let query = BuildQuery::with_config(Viewer::public(), QuerySources::from_store(&store), &config)
        .with_limit(1000);
    assert_eq!(query.page_size(), 15);

    let page = query.execute().await.unwrap();
    assert_eq!(page.builds.len(), 15);
    assert!(!page.is_last());
}
