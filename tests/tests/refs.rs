use pretty_assertions::assert_eq;
use serde_json::json;
use tempest::{json::ref_from_str, Db, Ref};
use tests::{assert_err, petclinic::*, tests};

struct Clinic {
    owner: Owner,
    cat: PetType,
    leo: Pet,
}

async fn clinic(db: &Db) -> Clinic {
    let mut owner = Owner::new("George", "Franklin", "Madison");
    owner.id = db.entities::<Owner>().insert_and_fetch_id(&owner).await.unwrap();

    let mut cat = PetType::new("cat");
    cat.id = db.entities::<PetType>().insert_and_fetch_id(&cat).await.unwrap();

    let mut leo = Pet::new("Leo", date(2010, 9, 7), &cat, &owner);
    leo.id = db.entities::<Pet>().insert_and_fetch_id(&leo).await.unwrap();

    Clinic { owner, cat, leo }
}

async fn refs_fetch_through_the_db(db: Db) {
    let Clinic { owner, leo, .. } = clinic(&db).await;

    let visits = db.entities::<Visit>();
    let visit = Visit {
        id: 0,
        pet: Ref::new(leo.id),
        visit_date: date(2013, 1, 1),
        description: "rabies shot".to_string(),
    };
    let id = visits.insert_and_fetch_id(&visit).await.unwrap();

    let visit = visits.find_by_id(id).await.unwrap().unwrap();
    let pet = visit.pet.fetch().await.unwrap();
    assert_eq!(pet.name, "Leo");

    let pet_owner = pet.owner.as_ref().unwrap().fetch().await.unwrap();
    assert_eq!(pet_owner, &owner);
}

async fn missing_targets(db: Db) {
    let refs = db.refs();

    let owner = refs.create::<Owner>(404).unwrap();
    assert!(owner.fetch_or_none().await.unwrap().is_none());
    assert!(owner.is_loaded());

    let err = assert_err!(owner.fetch().await);
    assert!(err.is_no_result(), "{err}");

    assert!(refs.create::<Owner>(tempest::Value::Null).is_none());
}

async fn unload_reads_again(db: Db) {
    let Clinic { owner, .. } = clinic(&db).await;

    let mut r = db.refs().create::<Owner>(owner.id).unwrap();
    assert_eq!(r.fetch().await.unwrap().first_name, "George");

    let mut renamed = owner.clone();
    renamed.first_name = "Georgie".to_string();
    db.entities::<Owner>().update(&renamed).await.unwrap();

    // Cached until unloaded
    assert_eq!(r.fetch().await.unwrap().first_name, "George");
    r.unload();
    assert_eq!(r.fetch().await.unwrap().first_name, "Georgie");
}

async fn json_forms(db: Db) {
    let Clinic { owner, cat, leo } = clinic(&db).await;

    let pet = db.entities::<Pet>().find_by_id(leo.id).await.unwrap().unwrap();
    assert_eq!(
        serde_json::to_value(&pet).unwrap(),
        json!({
            "id": leo.id,
            "name": "Leo",
            "birth_date": "2010-09-07",
            "pet_type": {"id": cat.id, "name": "cat"},
            "owner": owner.id,
        })
    );

    pet.owner.as_ref().unwrap().fetch().await.unwrap();
    assert_eq!(
        serde_json::to_value(&pet.owner).unwrap(),
        json!({
            "@entity": {
                "id": owner.id,
                "first_name": "George",
                "last_name": "Franklin",
                "address": {"street": "110 W. Liberty St.", "city": "Madison"},
                "telephone": null,
            }
        })
    );

    let name = db.refs().create::<OwnerName>(owner.id).unwrap();
    name.fetch().await.unwrap();
    assert_eq!(
        serde_json::to_value(&name).unwrap(),
        json!({"@id": owner.id, "@projection": {"last_name": "Franklin"}})
    );
}

async fn json_refs_attach_to_the_db(db: Db) {
    let Clinic { owner, .. } = clinic(&db).await;

    // Plain serde yields detached refs
    let pet: Pet = serde_json::from_value(json!({
        "id": 0,
        "name": "Basil",
        "birth_date": "2012-08-06",
        "pet_type": {"id": 1, "name": "cat"},
        "owner": owner.id,
    }))
    .unwrap();

    let mut r = pet.owner.unwrap();
    let err = assert_err!(r.fetch().await);
    assert!(err.is_unsupported_feature(), "{err}");

    r.attach(&db.refs());
    assert_eq!(r.fetch().await.unwrap(), &owner);

    let r: Ref<Owner> = ref_from_str(&owner.id.to_string(), &db.refs())
        .unwrap()
        .unwrap();
    assert_eq!(r.fetch().await.unwrap().last_name, "Franklin");

    // A loaded entity needs no query
    let capture = db.capture();
    let json = serde_json::to_string(&Ref::of(owner.clone()).unwrap()).unwrap();
    let r: Ref<Owner> = ref_from_str(&json, &db.refs()).unwrap().unwrap();
    assert_eq!(r.get(), Some(&owner));
    assert_eq!(r.fetch().await.unwrap(), &owner);
    assert!(capture.is_empty());
}

tests!(
    refs_fetch_through_the_db,
    missing_targets,
    unload_reads_again,
    json_forms,
    json_refs_attach_to_the_db,
);
