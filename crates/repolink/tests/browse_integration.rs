//! Integration tests for the browse listing.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use repolink::browse::{ACCOUNT_NOT_FOUND, BrowseError, browse};
use repolink::connect_and_migrate;
use repolink::github::{RemoteListing, RemoteRepo};
use repolink::repository::{self, AccountLink};
use repolink::sync::reconcile;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

fn repo(github_id: i64, full_name: &str, stars: i32) -> RemoteRepo {
    RemoteRepo {
        github_id,
        name: full_name.rsplit('/').next().unwrap_or_default().to_string(),
        full_name: full_name.to_string(),
        html_url: format!("https://github.com/{full_name}"),
        description: None,
        stargazers_count: stars,
        forks_count: 0,
        language: None,
        private: false,
    }
}

async fn linked_user(db: &DatabaseConnection) -> Uuid {
    let user = repository::create_user(db, "alice")
        .await
        .expect("create user");
    repository::link_account(
        db,
        user.id,
        AccountLink {
            provider_login: "alice".to_string(),
            access_token: Some("t".to_string()),
            avatar_url: Some("https://avatars.example/alice".to_string()),
        },
    )
    .await
    .expect("link account");
    user.id
}

async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

#[tokio::test]
async fn account_then_reconcile_scenario() {
    let db = setup_test_db().await;
    let user = repository::create_user(&db, "alice")
        .await
        .expect("create user");

    let page = browse(&db, user.id, None, None).await.expect("browse");
    assert_eq!(page.error.as_deref(), Some(ACCOUNT_NOT_FOUND));
    assert!(page.items.is_empty());

    repository::link_account(
        &db,
        user.id,
        AccountLink {
            provider_login: "alice".to_string(),
            access_token: Some("t".to_string()),
            avatar_url: None,
        },
    )
    .await
    .expect("link account");
    reconcile(
        &db,
        user.id,
        RemoteListing::complete(vec![repo(1, "alice/A", 5), repo(2, "alice/B", 10)]),
    )
    .await
    .expect("reconcile");

    let page = browse(&db, user.id, None, None).await.expect("browse");
    assert_eq!(page.error, None);
    let names: Vec<&str> = page.items.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["alice/B", "alice/A"]);
}

#[tokio::test]
async fn first_page_of_fifteen_holds_ten_most_starred() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db).await;
    let repos = (1..=15)
        .map(|i| repo(i, &format!("alice/repo-{i:02}"), i as i32))
        .collect();
    reconcile(&db, user_id, RemoteListing::complete(repos))
        .await
        .expect("reconcile");

    let page = browse(&db, user_id, Some("1"), Some("10"))
        .await
        .expect("page 1");
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total, 15);
    assert_eq!(page.total_pages, 2);
    let stars: Vec<i32> = page.items.iter().map(|r| r.stargazers_count).collect();
    assert_eq!(stars, (6..=15).rev().collect::<Vec<_>>());
    assert_eq!(page.avatar_url.as_deref(), Some("https://avatars.example/alice"));

    let page = browse(&db, user_id, Some("2"), Some("10"))
        .await
        .expect("page 2");
    assert_eq!(page.items.len(), 5);

    let err = browse(&db, user_id, Some("3"), Some("10"))
        .await
        .expect_err("past the end");
    assert!(matches!(err, BrowseError::PageOutOfRange { .. }));
}

#[tokio::test]
async fn invalid_parameters_are_rejected() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db).await;

    for (num, size) in [(Some("0"), None), (None, Some("0")), (Some("notint"), None)] {
        let err = browse(&db, user_id, num, size)
            .await
            .expect_err("invalid pagination");
        assert_eq!(err.reason(), "invalid_pagination_params");
    }
}

#[tokio::test]
async fn empty_listing_first_page_is_valid() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db).await;

    let page = browse(&db, user_id, Some("1"), None)
        .await
        .expect("page 1 of nothing");
    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);

    assert!(browse(&db, user_id, Some("2"), None).await.is_err());
}

#[tokio::test]
async fn star_ties_are_ordered_by_full_name_and_carry_disabled_flag() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db).await;
    reconcile(
        &db,
        user_id,
        RemoteListing::complete(vec![
            repo(1, "alice/zeta", 3),
            repo(2, "alice/alpha", 3),
            repo(3, "alice/mid", 9),
        ]),
    )
    .await
    .expect("first pass");
    reconcile(
        &db,
        user_id,
        RemoteListing::complete(vec![repo(1, "alice/zeta", 3), repo(3, "alice/mid", 9)]),
    )
    .await
    .expect("alpha dropped");

    let page = browse(&db, user_id, None, None).await.expect("browse");
    let rows: Vec<(&str, bool)> = page
        .items
        .iter()
        .map(|r| (r.full_name.as_str(), r.disabled))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("alice/mid", false),
            ("alice/alpha", true),
            ("alice/zeta", false)
        ]
    );
}

#[tokio::test]
async fn extreme_page_values_are_out_of_range_not_a_crash() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db).await;
    reconcile(
        &db,
        user_id,
        RemoteListing::complete(vec![repo(1, "alice/a", 1), repo(2, "alice/b", 2)]),
    )
    .await
    .expect("reconcile");

    let max = i64::MAX.to_string();
    for (num, size) in [
        (Some("4000000000"), Some("9000000000")),
        (Some(max.as_str()), None),
        (Some(max.as_str()), Some(max.as_str())),
        (Some("2"), Some("9000000000")),
    ] {
        let err = browse(&db, user_id, num, size)
            .await
            .expect_err("page past the end");
        assert!(
            matches!(err, BrowseError::PageOutOfRange { total_pages: 1, .. }),
            "{num:?}/{size:?}: {err}"
        );
        assert_eq!(err.reason(), "invalid_pagination_params");
    }

    let page = browse(&db, user_id, Some("1"), Some(max.as_str()))
        .await
        .expect("one huge page");
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn first_page_past_the_end_is_rejected() {
    let db = setup_test_db().await;
    let user_id = linked_user(&db).await;
    let repos = (1..=10)
        .map(|i| repo(i, &format!("alice/repo-{i:02}"), i as i32))
        .collect();
    reconcile(&db, user_id, RemoteListing::complete(repos))
        .await
        .expect("reconcile");

    let last = browse(&db, user_id, Some("2"), Some("5"))
        .await
        .expect("last full page");
    assert_eq!(last.items.len(), 5);

    let err = browse(&db, user_id, Some("3"), Some("5"))
        .await
        .expect_err("one past the last page");
    assert!(matches!(
        err,
        BrowseError::PageOutOfRange {
            page_num: 3,
            total_pages: 2
        }
    ));
}
