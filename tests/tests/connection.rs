use tempest::Db;
use tests::{assert_err, petclinic::*, tests};

async fn seed(db: &Db) {
    for (id, name) in [(1, "radiology"), (2, "surgery"), (3, "dentistry")] {
        db.entities::<Specialty>()
            .insert(&Specialty::new(id, name))
            .await
            .unwrap();
    }
}

async fn open_stream_holds_connection(db: Db) {
    seed(&db).await;

    let mut stream = db.select::<Specialty>().result_stream().await.unwrap();
    let first = stream.next().await.unwrap().unwrap();
    assert!(first.id > 0);

    let err = assert_err!(db.entities::<Specialty>().count().await);
    assert!(err.is_concurrent_use(), "{err}");

    let err = assert_err!(db.select::<Specialty>().result_stream().await);
    assert!(err.is_concurrent_use(), "{err}");

    stream.close();
    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 3);
}

async fn exhausted_stream_releases_connection(db: Db) {
    seed(&db).await;

    let mut stream = db.select::<Specialty>().result_stream().await.unwrap();
    let mut n = 0;
    while let Some(specialty) = stream.next().await {
        specialty.unwrap();
        n += 1;
    }
    assert_eq!(n, 3);

    // The stream is still alive but has let go of the connection
    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 3);
    drop(stream);
}

async fn prepared_query_holds_connection(db: Db) {
    let query = db.query("SELECT 1").unwrap();
    let prepared = query.prepare().unwrap();

    let err = assert_err!(db.query("SELECT 2").unwrap().execute_update().await);
    assert!(err.is_concurrent_use(), "{err}");

    prepared.close();
    db.query("SELECT 2").unwrap().result_list::<i64>().await.unwrap();
}

async fn commit(db: Db) {
    let tx = db.transaction().await.unwrap();
    seed(&db).await;
    tx.commit().await.unwrap();

    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 3);
}

async fn rollback(db: Db) {
    db.entities::<Specialty>()
        .insert(&Specialty::new(9, "anesthesia"))
        .await
        .unwrap();

    let tx = db.transaction().await.unwrap();
    seed(&db).await;
    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 4);
    tx.rollback().await.unwrap();

    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 1);
}

async fn dropped_transaction_rolls_back(db: Db) {
    {
        let _tx = db.transaction().await.unwrap();
        seed(&db).await;
    }

    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 0);

    // The next transaction starts cleanly
    let tx = db.transaction().await.unwrap();
    seed(&db).await;
    tx.commit().await.unwrap();
    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 3);
}

async fn failed_statement_frees_connection(db: Db) {
    let query = db.query("SELECT * FROM no_such_table").unwrap();
    let err = assert_err!(query.result_list::<i64>().await);
    assert!(err.is_driver_operation_failed(), "{err}");

    seed(&db).await;
    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 3);
}

tests!(
    open_stream_holds_connection,
    exhausted_stream_releases_connection,
    prepared_query_holds_connection,
    commit,
    rollback,
    dropped_transaction_rolls_back,
    failed_statement_frees_connection,
);
