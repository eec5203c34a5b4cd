mod common;

use common::{snippet_json, Harness};
use snippetvault::domain::{SnippetDraft, SnippetQuery, TagSet};
use snippetvault::storage::MemoryStorage;
use std::sync::Arc;
use std::time::Duration;

async fn harness_with(ids: &[&str]) -> Harness {
    let h = Harness::start(Arc::new(MemoryStorage::new()), "/dashboard").await;
    h.seed(ids.iter().map(|id| snippet_json(id, &format!("title {id}"))).collect());
    h
}

fn ids(h: &Harness) -> Vec<String> {
    h.ctx
        .snippets
        .snapshot()
        .snippets
        .into_iter()
        .map(|s| s.id)
        .collect()
}

#[tokio::test]
async fn fetch_replaces_list_and_mirrors_pagination() {
    let h = harness_with(&["a", "b", "c"]).await;

    let query = SnippetQuery {
        search: "  ".to_string(),
        tags: vec!["rust".to_string(), "async".to_string()],
        language: "rust".to_string(),
        ..SnippetQuery::default()
    };
    assert!(h.ctx.snippets.get_snippets(&query).await);

    let state = h.ctx.snippets.snapshot();
    assert_eq!(ids(&h), vec!["a", "b", "c"]);
    assert_eq!(state.pagination.total, 3);
    assert_eq!(state.pagination.limit, 6);
    assert!(!state.is_loading);

    let sent = h.api.lock().unwrap().last_query.clone().unwrap();
    assert_eq!(sent.get("tags").map(String::as_str), Some("rust,async"));
    assert_eq!(sent.get("language").map(String::as_str), Some("rust"));
    assert!(!sent.contains_key("search"));

    h.seed(vec![snippet_json("z", "only")]);
    h.ctx.snippets.get_snippets(&SnippetQuery::default()).await;
    assert_eq!(ids(&h), vec!["z"]);
}

#[tokio::test]
async fn stale_search_response_is_discarded() {
    let h = harness_with(&[]).await;
    let slow = SnippetQuery {
        search: "slow".to_string(),
        ..SnippetQuery::default()
    };
    let fast = SnippetQuery {
        search: "fast".to_string(),
        ..SnippetQuery::default()
    };

    let (slow_applied, fast_applied) = tokio::join!(h.ctx.snippets.get_snippets(&slow), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.ctx.snippets.get_snippets(&fast).await
    });

    assert!(!slow_applied);
    assert!(fast_applied);
    assert_eq!(ids(&h), vec!["fast-1"]);
    assert!(!h.ctx.snippets.snapshot().is_loading);
}

#[tokio::test]
async fn page_without_snippets_keeps_list_and_reports_error() {
    let h = harness_with(&["a", "b"]).await;
    assert!(h.ctx.snippets.get_snippets(&SnippetQuery::default()).await);
    let pagination = h.ctx.snippets.snapshot().pagination;

    h.api.lock().unwrap().malformed_list = true;
    assert!(!h.ctx.snippets.get_snippets(&SnippetQuery::default()).await);

    let state = h.ctx.snippets.snapshot();
    assert_eq!(ids(&h), vec!["a", "b"]);
    assert_eq!(state.pagination, pagination);
    assert_eq!(state.error.as_deref(), Some("Snippet fetching failed!"));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn loading_is_visible_to_subscribers_mid_flight() {
    let h = harness_with(&[]).await;
    let slow = SnippetQuery {
        search: "slow".to_string(),
        ..SnippetQuery::default()
    };
    let mut rx = h.ctx.snippets.subscribe();

    let (applied, mid_flight) = tokio::join!(h.ctx.snippets.get_snippets(&slow), async {
        rx.wait_for(|s| s.is_loading).await.unwrap();
        h.ctx.snippets.snapshot()
    });

    assert!(applied);
    assert!(mid_flight.is_loading);
    assert!(mid_flight.snippets.is_empty());

    let done = h.ctx.snippets.snapshot();
    assert!(!done.is_loading);
    assert_eq!(ids(&h), vec!["slow-1"]);
}

#[tokio::test]
async fn loading_stays_set_until_last_overlapping_operation_ends() {
    let h = harness_with(&["a"]).await;
    let slow = SnippetQuery {
        search: "slow".to_string(),
        ..SnippetQuery::default()
    };

    let (applied, after_mutation) = tokio::join!(h.ctx.snippets.get_snippets(&slow), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let status = h.ctx.snippets.toggle_favorite("a").await;
        assert!(status.is_some());
        h.ctx.snippets.snapshot().is_loading
    });

    assert!(applied);
    assert!(after_mutation);
    assert!(!h.ctx.snippets.snapshot().is_loading);
}

#[tokio::test]
async fn toggle_favorite_touches_only_the_target() {
    let h = harness_with(&["a", "b", "c"]).await;
    h.ctx.snippets.get_snippets(&SnippetQuery::default()).await;
    let before = h.ctx.snippets.snapshot().snippets;

    let status = h.ctx.snippets.toggle_favorite("b").await.unwrap();
    assert!(status.is_favorited);
    assert_eq!(status.favorite_count, 1);

    let after = h.ctx.snippets.snapshot().snippets;
    assert_eq!(after.len(), 3);
    for (old, new) in before.iter().zip(&after) {
        if old.id == "b" {
            assert!(new.is_favorited);
            assert_eq!(new.favorite_count, 1);
            assert_eq!((&new.title, &new.code, &new.tags), (&old.title, &old.code, &old.tags));
        } else {
            assert_eq!(
                serde_json::to_string(old).unwrap(),
                serde_json::to_string(new).unwrap()
            );
        }
    }
}

#[tokio::test]
async fn delete_removes_exactly_one_on_confirmation() {
    let h = harness_with(&["a", "b", "c"]).await;
    h.ctx.snippets.get_snippets(&SnippetQuery::default()).await;

    assert!(h.ctx.snippets.delete_snippet("b").await);
    assert_eq!(ids(&h), vec!["a", "c"]);

    assert!(!h.ctx.snippets.delete_snippet("missing").await);
    assert_eq!(ids(&h), vec!["a", "c"]);
    assert_eq!(
        h.ctx.snippets.snapshot().error.as_deref(),
        Some("Snippet not found")
    );
}

#[tokio::test]
async fn unconfirmed_delete_keeps_list() {
    let h = harness_with(&["a", "locked"]).await;
    h.ctx.snippets.get_snippets(&SnippetQuery::default()).await;

    assert!(!h.ctx.snippets.delete_snippet("locked").await);
    assert_eq!(ids(&h), vec!["a", "locked"]);
    assert_eq!(
        h.ctx.snippets.snapshot().error.as_deref(),
        Some("Snippet is locked")
    );
}

#[tokio::test]
async fn create_prepends_and_update_replaces_in_place() {
    let h = harness_with(&["a", "b"]).await;
    h.ctx.snippets.get_snippets(&SnippetQuery::default()).await;

    let draft = SnippetDraft {
        title: "debounce".to_string(),
        code: "fn debounce() {}".to_string(),
        code_language: "rust".to_string(),
        tags: TagSet::try_from_raw(["Rust", " ASYNC "]).unwrap(),
        ..SnippetDraft::default()
    };
    let created = h.ctx.snippets.create_snippet(&draft).await.unwrap();
    assert_eq!(created.tags, vec!["rust", "async"]);
    assert_eq!(ids(&h), vec!["new-1", "a", "b"]);

    let mut edit = SnippetDraft::from(&h.ctx.snippets.snapshot().snippets[1]);
    edit.title = "renamed".to_string();
    let updated = h.ctx.snippets.update_snippet("a", &edit).await.unwrap();
    assert_eq!(updated.title, "renamed");

    let state = h.ctx.snippets.snapshot();
    assert_eq!(ids(&h), vec!["new-1", "a", "b"]);
    assert_eq!(state.snippets[1].title, "renamed");
}

#[tokio::test]
async fn nested_envelope_is_unwrapped_without_touching_list() {
    let h = harness_with(&["a"]).await;

    let snippet = h.ctx.snippets.get_snippet_by_id("a").await.unwrap();
    assert_eq!(snippet.title, "title a");
    assert!(h.ctx.snippets.snapshot().snippets.is_empty());

    assert!(h.ctx.snippets.get_snippet_by_id("nope").await.is_none());
    assert_eq!(
        h.ctx.snippets.snapshot().error.as_deref(),
        Some("Snippet not found")
    );
}

#[tokio::test]
async fn favorites_replace_the_list() {
    let h = harness_with(&["a", "b"]).await;
    h.ctx.snippets.get_snippets(&SnippetQuery::default()).await;
    h.ctx.snippets.toggle_favorite("b").await.unwrap();

    assert!(h.ctx.snippets.get_favorite_snippets(1, None).await);
    assert_eq!(ids(&h), vec!["b"]);
    assert_eq!(h.ctx.snippets.snapshot().pagination.limit, 10);
}

#[tokio::test]
async fn tags_degrade_to_empty_on_failure() {
    let h = harness_with(&[]).await;
    assert_eq!(h.ctx.snippets.get_all_tags().await, vec!["rust", "async"]);

    h.api.lock().unwrap().fail_tags = true;
    assert!(h.ctx.snippets.get_all_tags().await.is_empty());
    assert_eq!(h.ctx.snippets.snapshot().error, None);
}

#[tokio::test]
async fn public_browse_fork_and_stats_leave_list_alone() {
    let h = harness_with(&["a"]).await;
    h.ctx.snippets.get_snippets(&SnippetQuery::default()).await;

    let page = h
        .ctx
        .snippets
        .get_public_snippets(&SnippetQuery::public())
        .await
        .unwrap();
    assert_eq!(page.snippets.len(), 1);
    assert_eq!(page.snippets[0].owner.as_ref().map(|o| o.id()), Some("u2"));

    let fork = h.ctx.snippets.fork_public_snippet("pub-1").await.unwrap();
    assert_eq!(fork.id, "fork-1");
    assert!(h.ctx.snippets.fork_public_snippet("nope").await.is_err());

    let stats = h.ctx.snippets.get_snippet_stats().await.unwrap();
    assert_eq!(stats.total_snippets, 3);
    assert_eq!(stats.most_used_languages[0].language, "rust");

    assert_eq!(ids(&h), vec!["a"]);
}
