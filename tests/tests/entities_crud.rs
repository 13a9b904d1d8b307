use tempest::Db;
use tests::{assert_err, assert_ok, petclinic::*, tests};

async fn insert_generates_keys(db: Db) {
    let owners = db.entities::<Owner>();

    let george = Owner::new("George", "Franklin", "Madison");
    let george = assert_ok!(owners.insert_and_fetch_id(&george).await);

    let betty = Owner::new("Betty", "Davis", "Sun Prairie");
    let betty = assert_ok!(owners.insert_and_fetch_id(&betty).await);
    assert_ne!(george, betty);

    let found = owners.find_by_id(george).await.unwrap().unwrap();
    assert_eq!(found.id, george);
    assert_eq!(found.first_name, "George");
    assert_eq!(found.address.city, "Madison");
    assert_eq!(found.telephone, None);

    assert_eq!(owners.count().await.unwrap(), 2);
}

async fn insert_rejects_assigned_generated_key(db: Db) {
    let mut owner = Owner::new("Eduardo", "Rodriquez", "McFarland");
    owner.id = 42;

    let err = assert_err!(db.entities::<Owner>().insert(&owner).await);
    assert!(err.is_sql_template(), "{err}");
    assert_eq!(db.entities::<Owner>().count().await.unwrap(), 0);
}

async fn insert_with_assigned_key(db: Db) {
    let specialties = db.entities::<Specialty>();

    let id = specialties
        .insert_and_fetch_id(&Specialty::new(7, "radiology"))
        .await
        .unwrap();
    assert_eq!(id, 7);

    let err = assert_err!(specialties.insert(&Specialty::new(7, "surgery")).await);
    assert!(err.is_driver_operation_failed(), "{err}");
}

async fn update_changes_the_row(db: Db) {
    let owners = db.entities::<Owner>();

    let mut owner = Owner::new("Jean", "Coleman", "Monona");
    owner.id = owners.insert_and_fetch_id(&owner).await.unwrap();

    owner.telephone = Some("6085552654".to_string());
    owner.address.street = "105 N. Lake St.".to_string();
    owners.update(&owner).await.unwrap();

    let found = owners.find_by_id(owner.id).await.unwrap().unwrap();
    assert_eq!(found, owner);
}

async fn update_of_missing_row_fails(db: Db) {
    let mut owner = Owner::new("Harold", "Davis", "Windsor");
    owner.id = 1000;

    let err = assert_err!(db.entities::<Owner>().update(&owner).await);
    assert!(err.is_no_result(), "{err}");
}

async fn delete_rows(db: Db) {
    let owners = db.entities::<Owner>();

    let mut peter = Owner::new("Peter", "McTavish", "Madison");
    peter.id = owners.insert_and_fetch_id(&peter).await.unwrap();
    let carlos = owners
        .insert_and_fetch_id(&Owner::new("Carlos", "Estaban", "Waunakee"))
        .await
        .unwrap();

    owners.delete(&peter).await.unwrap();
    assert!(owners.find_by_id(peter.id).await.unwrap().is_none());

    let err = assert_err!(owners.delete(&peter).await);
    assert!(err.is_no_result(), "{err}");

    assert!(owners.delete_by_id(carlos).await.unwrap());
    assert!(!owners.delete_by_id(carlos).await.unwrap());
    assert_eq!(owners.count().await.unwrap(), 0);
}

async fn find_by_ids(db: Db) {
    let specialties = db.entities::<Specialty>();

    for (id, name) in [(1, "radiology"), (2, "surgery"), (3, "dentistry")] {
        specialties.insert(&Specialty::new(id, name)).await.unwrap();
    }

    let mut found = specialties.find_by_ids([3, 1, 99]).await.unwrap();
    found.sort_by_key(|specialty| specialty.id);
    assert_eq!(
        found,
        [Specialty::new(1, "radiology"), Specialty::new(3, "dentistry")]
    );

    assert!(specialties.find_by_ids([]).await.unwrap().is_empty());
}

tests!(
    insert_generates_keys,
    insert_rejects_assigned_generated_key,
    insert_with_assigned_key,
    update_changes_the_row,
    update_of_missing_row_fails,
    delete_rows,
    find_by_ids,
);
