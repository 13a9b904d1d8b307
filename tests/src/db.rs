use tempest::Db;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "postgresql")]
pub mod postgresql;

/// Connects and creates the petclinic tables, dropping leftovers first.
pub async fn connect(url: &str) -> Db {
    let db = Db::builder()
        .connect(url)
        .await
        .unwrap_or_else(|err| panic!("failed to connect to {url}: {err}"));

    crate::schema::reset(&db).await.unwrap();
    db
}

/// The connection URL from `var`, or `default` when unset.
#[allow(dead_code)]
fn url(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}
