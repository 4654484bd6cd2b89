//! Requires `DATABASE_URL` pointing at a PostgreSQL server.
//!
//! Run with `cargo test --test repository_pg -- --ignored`.

use sqlx::PgPool;
use std::sync::Arc;
use url_shortener::AppError;
use url_shortener::domain::entities::NewUrlRecord;
use url_shortener::domain::repositories::{SaveOutcome, UrlRepository};
use url_shortener::infrastructure::persistence::PgUrlRepository;

fn new_record(id: &str, short: &str, original: &str, owner: &str) -> NewUrlRecord {
    NewUrlRecord {
        id: id.to_string(),
        original: original.to_string(),
        short: short.to_string(),
        owner_id: owner.to_string(),
    }
}

#[sqlx::test]
#[ignore]
async fn test_save_and_find(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    let outcome = repo
        .save(new_record("1", "abcdef", "https://example.com", "u1"))
        .await
        .unwrap();
    assert!(matches!(outcome, SaveOutcome::Created(_)));

    let found = repo.find_by_code("abcdef").await.unwrap().unwrap();
    assert_eq!(found.original, "https://example.com");
    assert_eq!(found.owner_id, "u1");
    assert!(!found.deleted);

    assert!(repo.find_by_code("nothere").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore]
async fn test_save_existing_original(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    repo.save(new_record("1", "abcdef", "https://example.com", "u1"))
        .await
        .unwrap();
    let outcome = repo
        .save(new_record("2", "zzzzzz", "https://example.com", "u2"))
        .await
        .unwrap();

    assert!(outcome.is_existing());
    assert_eq!(outcome.record().short, "abcdef");
    assert_eq!(outcome.record().owner_id, "u1");
}

#[sqlx::test]
#[ignore]
async fn test_save_taken_short_code(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    repo.save(new_record("1", "abcdef", "https://one.com", "u1"))
        .await
        .unwrap();
    let result = repo
        .save(new_record("2", "abcdef", "https://two.com", "u1"))
        .await;

    assert!(matches!(result, Err(AppError::ShortCodeTaken { .. })));
}

#[sqlx::test]
#[ignore]
async fn test_batch_delete_owner_scoped(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    repo.save(new_record("1", "aaaaaa", "https://a.com", "u1"))
        .await
        .unwrap();
    repo.save(new_record("2", "bbbbbb", "https://b.com", "u1"))
        .await
        .unwrap();
    repo.save(new_record("3", "cccccc", "https://c.com", "u2"))
        .await
        .unwrap();

    let codes = vec!["aaaaaa".to_string(), "cccccc".to_string()];

    assert_eq!(repo.batch_delete(&codes, "u1").await.unwrap(), 1);
    assert_eq!(repo.batch_delete(&codes, "u1").await.unwrap(), 0);

    assert!(repo.find_by_code("aaaaaa").await.unwrap().unwrap().deleted);
    assert!(!repo.find_by_code("cccccc").await.unwrap().unwrap().deleted);

    let urls = repo.find_by_owner("u1").await.unwrap();
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0].short, "bbbbbb");
}

#[sqlx::test]
#[ignore]
async fn test_ping(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    assert!(repo.ping().await.is_ok());
}
