#![allow(dead_code)]

use grocery_db::models::request::{CreateRequest, Request};
use grocery_db::repositories::RequestRepo;
use grocery_db::DbPool;
use tempfile::TempDir;

/// A migrated database in a throwaway directory. The directory lives as
/// long as this value.
pub struct TestDb {
    pub pool: DbPool,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = grocery_db::create_pool(&url).await.unwrap();
    grocery_db::run_migrations(&pool).await.unwrap();
    TestDb { pool, _dir: dir }
}

pub fn new_request(text: &str) -> CreateRequest {
    CreateRequest {
        original_text: text.to_string(),
        ..Default::default()
    }
}

/// Create a request and move it straight to `posted`.
pub async fn posted_request(pool: &DbPool, text: &str) -> Request {
    let created = RequestRepo::create(pool, &new_request(text)).await.unwrap();
    RequestRepo::update_translation(pool, created.id, &format!("• {text}"))
        .await
        .unwrap()
}
