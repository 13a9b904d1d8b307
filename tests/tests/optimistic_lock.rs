use tempest::Db;
use tests::{assert_err, petclinic::*, tests};

async fn insert_vet(db: &Db, name: &str) -> VersionedVet {
    let mut vet = VersionedVet::new(name);
    vet.id = db
        .entities::<VersionedVet>()
        .insert_and_fetch_id(&vet)
        .await
        .unwrap();
    vet
}

async fn update_increments_version(db: Db) {
    let vets = db.entities::<VersionedVet>();
    let mut vet = insert_vet(&db, "Helen Leary").await;

    vet.name = "Helen Leary-Smith".to_string();
    vets.update(&vet).await.unwrap();

    let stored = vets.find_by_id(vet.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Helen Leary-Smith");
    assert_eq!(stored.version, 1);

    let mut stored = stored;
    stored.name = "Helen".to_string();
    vets.update(&stored).await.unwrap();
    assert_eq!(vets.find_by_id(vet.id).await.unwrap().unwrap().version, 2);
}

async fn stale_update_fails(db: Db) {
    let vets = db.entities::<VersionedVet>();
    let vet = insert_vet(&db, "Linda Douglas").await;

    let mut first = vet.clone();
    first.name = "Linda".to_string();
    vets.update(&first).await.unwrap();

    // Still holds version 0
    let mut second = vet.clone();
    second.name = "Lin".to_string();
    let err = assert_err!(vets.update(&second).await);
    assert!(err.is_optimistic_lock(), "{err}");

    let stored = vets.find_by_id(vet.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Linda");
}

async fn stale_delete_fails(db: Db) {
    let vets = db.entities::<VersionedVet>();
    let vet = insert_vet(&db, "Rafael Ortega").await;

    let mut renamed = vet.clone();
    renamed.name = "Rafa Ortega".to_string();
    vets.update(&renamed).await.unwrap();

    let err = assert_err!(vets.delete(&vet).await);
    assert!(err.is_optimistic_lock(), "{err}");

    let current = vets.find_by_id(vet.id).await.unwrap().unwrap();
    vets.delete(&current).await.unwrap();
    assert_eq!(vets.count().await.unwrap(), 0);
}

async fn stale_upsert_fails(db: Db) {
    let vets = db.entities::<VersionedVet>();
    let vet = insert_vet(&db, "Henry Stevens").await;

    let mut renamed = vet.clone();
    renamed.name = "Hank Stevens".to_string();
    vets.upsert(&renamed).await.unwrap();

    let err = assert_err!(vets.upsert(&vet).await);
    assert!(err.is_optimistic_lock(), "{err}");
}

async fn stale_batch_entry_fails(db: Db) {
    let vets = db.entities::<VersionedVet>();
    let sharon = insert_vet(&db, "Sharon Jenkins").await;
    let mut carter = insert_vet(&db, "James Carter").await;

    let mut moved_on = carter.clone();
    moved_on.name = "Jim Carter".to_string();
    vets.update(&moved_on).await.unwrap();

    carter.name = "J. Carter".to_string();
    let err = assert_err!(vets.upsert_batch(&[sharon, carter]).await);
    assert!(err.is_optimistic_lock(), "{err}");
}

tests!(
    update_increments_version,
    stale_update_fails,
    stale_delete_fails,
    stale_upsert_fails,
    stale_batch_entry_fails,
);
