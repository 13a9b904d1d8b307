use tempest::Db;

/// Tests share one database; run them with `--test-threads=1`.
pub async fn setup() -> Db {
    let url = super::url(
        "TEMPEST_TEST_POSTGRESQL_URL",
        "postgresql://postgres@localhost:5432/tempest_test",
    );
    super::connect(&url).await
}
