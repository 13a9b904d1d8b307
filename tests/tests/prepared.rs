use pretty_assertions::assert_eq;
use tempest::{el, template, Bindings, Db, Record};
use tests::{assert_err, petclinic::*, tests};

async fn batch_with_bind_vars(db: Db) {
    let specialty = Specialty::model();
    let query = db
        .query(template!(
            "INSERT INTO " {el::table(&specialty)} " (id, name) VALUES ("
            {el::bind_var("id")} ", " {el::bind_var("name")} ")"
        ))
        .unwrap();
    assert!(query.statement().has_bind_vars());

    let mut prepared = query.prepare().unwrap();
    prepared
        .add_batch_bindings(Bindings::default().set("id", 1).set("name", "radiology"))
        .unwrap();
    prepared
        .add_batch_bindings(Bindings::default().set("id", 2).set("name", "surgery"))
        .unwrap();

    // An incomplete entry is rejected and leaves the batch as it was
    let err = assert_err!(prepared.add_batch_bindings(Bindings::default().set("id", 3)));
    assert!(err.is_sql_template(), "{err}");
    assert_eq!(prepared.batch_len(), 2);

    assert_eq!(prepared.execute_batch().await.unwrap(), [1, 1]);
    assert_eq!(prepared.batch_len(), 0);
    assert!(prepared.execute_batch().await.unwrap().is_empty());
    prepared.close();

    assert_eq!(db.entities::<Specialty>().count().await.unwrap(), 2);
}

async fn batch_reports_generated_keys(db: Db) {
    let pet_type = PetType::model();
    let query = db
        .query(template!(
            "INSERT INTO " {el::insert(&pet_type)} " VALUES " {el::values_deferred(&pet_type)}
        ))
        .unwrap();

    let mut prepared = query.prepare().unwrap();
    for name in ["cat", "dog", "lizard"] {
        prepared.add_batch(&PetType::new(name)).unwrap();
    }

    assert_eq!(prepared.execute_batch().await.unwrap(), [1, 1, 1]);

    let keys = prepared.generated_keys::<i32>().unwrap();
    assert_eq!(keys.len(), 3);
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    prepared.close();

    let mut types = db.entities::<PetType>().find_by_ids(keys.clone()).await.unwrap();
    types.sort_by_key(|t| t.id);
    let names: Vec<_> = types.iter().map(|t| &t.name[..]).collect();
    assert_eq!(names, ["cat", "dog", "lizard"]);
}

async fn failed_batch_reports_completed_entries(db: Db) {
    let specialty = Specialty::model();
    let query = db
        .query(template!(
            "INSERT INTO " {el::insert(&specialty)} " VALUES " {el::values_deferred(&specialty)}
        ))
        .unwrap();

    let mut prepared = query.prepare().unwrap();
    for (id, name) in [(1, "radiology"), (2, "surgery"), (1, "dentistry"), (4, "anesthesia")] {
        prepared.add_batch(&Specialty::new(id, name)).unwrap();
    }

    let err = assert_err!(prepared.execute_batch().await);
    assert!(err.is_batch_failed(), "{err}");
    assert_eq!(err.batch_completed(), Some(&[1, 1][..]));
    assert_eq!(prepared.batch_len(), 0);
}

async fn single_execution(db: Db) {
    let query = db
        .query(template!(
            "DELETE FROM " {el::table(&Specialty::model())} " WHERE id > " {1_i32}
        ))
        .unwrap();

    for (id, name) in [(1, "radiology"), (2, "surgery"), (3, "dentistry")] {
        db.entities::<Specialty>()
            .insert(&Specialty::new(id, name))
            .await
            .unwrap();
    }

    let mut prepared = query.prepare().unwrap();
    assert_eq!(prepared.execute_update().await.unwrap(), 2);
    assert_eq!(prepared.execute_update().await.unwrap(), 0);
}

tests!(
    batch_with_bind_vars,
    batch_reports_generated_keys,
    failed_batch_reports_completed_entries,
    single_execution,
);
