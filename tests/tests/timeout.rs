#![cfg(feature = "sqlite")]

use std::time::Duration;
use tempest::Db;
use tests::{assert_err, db::sqlite::setup, petclinic::*};

/// Counts to fifty million; takes far longer than the timeouts below.
const SLOW_COUNT: &str = concat!(
    "WITH RECURSIVE c(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM c WHERE n < 50000000) ",
    "SELECT COUNT(*) FROM c",
);

#[tokio::test]
async fn slow_query_times_out() {
    let db = setup().await;

    let query = db
        .query(SLOW_COUNT)
        .unwrap()
        .timeout(Duration::from_millis(50));
    let err = assert_err!(query.single_result::<i64>().await);

    assert!(err.is_query_timeout(), "{err}");
    assert!(!err.is_concurrent_use());

    // The interrupted statement releases the connection
    db.entities::<Specialty>()
        .insert(&Specialty::new(1, "radiology"))
        .await
        .unwrap();
    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 1);
}

#[tokio::test]
async fn default_timeout_applies_to_every_query() {
    let db = Db::builder()
        .query_timeout(Duration::from_millis(50))
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let query = db.query(SLOW_COUNT).unwrap();
    let err = assert_err!(query.single_result::<i64>().await);
    assert!(err.is_query_timeout(), "{err}");

    let n: i64 = db
        .query("SELECT 40 + 2")
        .unwrap()
        .single_result()
        .await
        .unwrap();
    assert_eq!(n, 42);
}

#[tokio::test]
async fn fast_queries_finish_within_the_timeout() {
    let db = setup().await;

    let n: i64 = db
        .query("SELECT COUNT(*) FROM specialty")
        .unwrap()
        .timeout(Duration::from_secs(30))
        .single_result()
        .await
        .unwrap();
    assert_eq!(n, 0);
}
