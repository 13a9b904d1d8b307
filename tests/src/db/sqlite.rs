use tempest::Db;

pub async fn setup() -> Db {
    super::connect("sqlite::memory:").await
}
