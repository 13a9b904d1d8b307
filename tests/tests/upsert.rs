use pretty_assertions::assert_eq;
use tempest::Db;
use tests::{petclinic::*, tests};

async fn upsert_with_assigned_key(db: Db) {
    let specialties = db.entities::<Specialty>();

    specialties.upsert(&Specialty::new(1, "radiology")).await.unwrap();
    specialties.upsert(&Specialty::new(1, "radiation")).await.unwrap();
    specialties.upsert(&Specialty::new(2, "surgery")).await.unwrap();

    assert_eq!(specialties.count().await.unwrap(), 2);
    assert_eq!(
        specialties.find_by_id(1).await.unwrap(),
        Some(Specialty::new(1, "radiation"))
    );
}

async fn upsert_with_generated_key(db: Db) {
    let types = db.entities::<PetType>();

    // No key yet: inserted
    let mut hamster = PetType::new("hamster");
    hamster.id = types.upsert_and_fetch_id(&hamster).await.unwrap();
    assert_ne!(hamster.id, 0);

    // Key set: updated in place
    hamster.name = "guinea pig".to_string();
    assert_eq!(types.upsert_and_fetch_id(&hamster).await.unwrap(), hamster.id);

    assert_eq!(types.count().await.unwrap(), 1);
    assert_eq!(types.find_by_id(hamster.id).await.unwrap(), Some(hamster));
}

async fn upsert_and_fetch(db: Db) {
    let vets = db.entities::<VersionedVet>();

    let stored = vets.upsert_and_fetch(&VersionedVet::new("James Carter")).await.unwrap();
    assert_ne!(stored.id, 0);
    assert_eq!(stored.name, "James Carter");
    assert_eq!(stored.version, 0);

    let mut renamed = stored.clone();
    renamed.name = "Jim Carter".to_string();
    let stored = vets.upsert_and_fetch(&renamed).await.unwrap();
    assert_eq!(stored.name, "Jim Carter");
    assert_eq!(stored.version, 1);
}

async fn upsert_of_missing_generated_key_fails(db: Db) {
    let mut snake = PetType::new("snake");
    snake.id = 500;

    let err = db.entities::<PetType>().upsert(&snake).await.unwrap_err();
    assert!(err.is_no_result(), "{err}");
}

async fn batch_upsert_keeps_input_order(db: Db) {
    let types = db.entities::<PetType>();

    let mut cat = PetType::new("cat");
    cat.id = types.insert_and_fetch_id(&cat).await.unwrap();
    let mut dog = PetType::new("dog");
    dog.id = types.insert_and_fetch_id(&dog).await.unwrap();

    cat.name = "kitten".to_string();
    let batch = vec![
        PetType::new("lizard"),
        cat.clone(),
        PetType::new("snake"),
        dog.clone(),
        PetType::new("bird"),
    ];

    let ids = types.upsert_batch_and_fetch_ids(&batch).await.unwrap();
    assert_eq!(ids.len(), 5);
    assert_eq!(ids[1], cat.id);
    assert_eq!(ids[3], dog.id);

    for (id, expected) in ids.iter().zip(&batch) {
        let found = types.find_by_id(*id).await.unwrap().unwrap();
        assert_eq!(found.name, expected.name);
    }

    assert_eq!(types.count().await.unwrap(), 5);
}

async fn batch_upsert_with_assigned_keys(db: Db) {
    let specialties = db.entities::<Specialty>();
    specialties.insert(&Specialty::new(2, "surgery")).await.unwrap();

    let batch = [
        Specialty::new(1, "radiology"),
        Specialty::new(2, "general surgery"),
        Specialty::new(3, "dentistry"),
    ];
    let ids = specialties.upsert_batch_and_fetch_ids(&batch).await.unwrap();
    assert_eq!(ids, [1, 2, 3]);

    let mut all = specialties.find_by_ids([1, 2, 3]).await.unwrap();
    all.sort_by_key(|specialty| specialty.id);
    assert_eq!(all, batch);
}

async fn empty_batch_upsert(db: Db) {
    let ids = db
        .entities::<Specialty>()
        .upsert_batch_and_fetch_ids(&[])
        .await
        .unwrap();
    assert!(ids.is_empty());
}

tests!(
    upsert_with_assigned_key,
    upsert_with_generated_key,
    upsert_and_fetch,
    upsert_of_missing_generated_key_fails,
    batch_upsert_keeps_input_order,
    batch_upsert_with_assigned_keys,
    empty_batch_upsert,
);
