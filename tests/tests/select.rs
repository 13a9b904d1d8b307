use pretty_assertions::assert_eq;
use tempest::{el, template, Db, Record};
use tests::{assert_err, petclinic::*, tests};

/// Owners with their ids, in insertion order.
async fn owners(db: &Db) -> Vec<Owner> {
    let mut owners = vec![
        Owner::new("George", "Franklin", "Madison"),
        Owner::new("Betty", "Davis", "Sun Prairie"),
        Owner::new("Eduardo", "Rodriquez", "McFarland"),
        Owner::new("Harold", "Davis", "Windsor"),
        Owner::new("Peter", "McTavish", "Madison"),
    ];

    for owner in &mut owners {
        owner.id = db.entities::<Owner>().insert_and_fetch_id(owner).await.unwrap();
    }

    owners
}

async fn filter_and_order(db: Db) {
    owners(&db).await;
    let owner = Owner::model();

    let davises = db
        .select::<Owner>()
        .filter(template!({el::column(&owner, "last_name")} " = " {"Davis"}))
        .order_by(template!({el::column(&owner, "first_name")} " DESC"))
        .result_list()
        .await
        .unwrap();

    let names: Vec<_> = davises.iter().map(|o| &o.first_name[..]).collect();
    assert_eq!(names, ["Harold", "Betty"]);

    let in_madison = db
        .select::<Owner>()
        .filter(template!({el::column(&owner, "city")} " = " {"Madison"}))
        .filter(template!({el::column(&owner, "first_name")} " LIKE " {"P%"}))
        .result_list()
        .await
        .unwrap();

    assert_eq!(in_madison.len(), 1);
    assert_eq!(in_madison[0].last_name, "McTavish");
}

async fn paging(db: Db) {
    let owners = owners(&db).await;
    let owner = Owner::model();

    let page = |offset| {
        db.select::<Owner>()
            .order_by(template!({el::column(&owner, "id")}))
            .limit(2)
            .offset(offset)
    };

    let first: Vec<_> = page(0).result_list().await.unwrap();
    let last: Vec<_> = page(4).result_list().await.unwrap();

    assert_eq!(first, owners[..2]);
    assert_eq!(last, owners[4..]);
    assert!(page(10).result_list().await.unwrap().is_empty());
}

async fn foreign_keys(db: Db) {
    let owners = owners(&db).await;

    let types = db.entities::<PetType>();
    let mut cat = PetType::new("cat");
    cat.id = types.insert_and_fetch_id(&cat).await.unwrap();
    let mut dog = PetType::new("dog");
    dog.id = types.insert_and_fetch_id(&dog).await.unwrap();

    let pets = db.entities::<Pet>();
    let leo = pets
        .insert_and_fetch_id(&Pet::new("Leo", date(2010, 9, 7), &cat, &owners[0]))
        .await
        .unwrap();
    let rosy = pets
        .insert_and_fetch_id(&Pet::new("Rosy", date(2011, 4, 17), &dog, &owners[0]))
        .await
        .unwrap();

    // The pet type comes back with the pet
    let pet = pets.find_by_id(leo).await.unwrap().unwrap();
    assert_eq!(pet.name, "Leo");
    assert_eq!(pet.birth_date, date(2010, 9, 7));
    assert_eq!(pet.pet_type, cat);

    // The owner is fetched on demand
    let owner = pet.owner.as_ref().unwrap();
    assert!(!owner.is_loaded());
    assert_eq!(owner.fetch().await.unwrap(), &owners[0]);
    assert!(owner.is_loaded());

    let other = pets.find_by_id(rosy).await.unwrap().unwrap();
    assert_eq!(other.pet_type, dog);
    assert_eq!(other.owner.as_ref(), Some(owner));
}

async fn projections(db: Db) {
    owners(&db).await;
    let name = OwnerName::model();

    let names = db
        .select::<OwnerName>()
        .order_by(template!({el::column(&name, "last_name")} ", " {el::column(&name, "id")}))
        .limit(3)
        .result_list()
        .await
        .unwrap();

    let names: Vec<_> = names.into_iter().map(|n| n.last_name).collect();
    assert_eq!(names, ["Davis", "Davis", "Franklin"]);
}

async fn single_results(db: Db) {
    let specialties = db.entities::<Specialty>();
    let specialty = Specialty::model();

    let err = assert_err!(db.select::<Specialty>().single_result().await);
    assert!(err.is_no_result(), "{err}");
    assert!(db.select::<Specialty>().optional_result().await.unwrap().is_none());

    specialties.insert(&Specialty::new(1, "radiology")).await.unwrap();
    specialties.insert(&Specialty::new(2, "surgery")).await.unwrap();

    let err = assert_err!(db.select::<Specialty>().single_result().await);
    assert!(err.is_non_unique_result(), "{err}");
    let err = assert_err!(db.select::<Specialty>().optional_result().await);
    assert!(err.is_non_unique_result(), "{err}");

    let surgery = db
        .select::<Specialty>()
        .filter(template!({el::column(&specialty, "name")} " = " {"surgery"}))
        .single_result()
        .await
        .unwrap();
    assert_eq!(surgery, Specialty::new(2, "surgery"));

    // The connection is free again after a failed single result
    assert_eq!(specialties.count().await.unwrap(), 2);
}

async fn scalar_queries(db: Db) {
    let specialty = Specialty::model();
    for (id, name) in [(1, "radiology"), (2, "surgery"), (3, "dentistry")] {
        db.entities::<Specialty>()
            .insert(&Specialty::new(id, name))
            .await
            .unwrap();
    }

    let query = db
        .query(template!(
            "SELECT " {el::column(&specialty, "name")} " FROM " {el::table(&specialty)}
            " WHERE " {el::column(&specialty, "id")} " = " {2_i32}
        ))
        .unwrap();
    assert_eq!(query.single_result::<String>().await.unwrap(), "surgery");

    let ids = db
        .query(template!(
            "SELECT " {el::column(&specialty, "id")} " FROM " {el::table(&specialty)}
            " ORDER BY " {el::column(&specialty, "id")} " DESC"
        ))
        .unwrap()
        .result_list::<i32>()
        .await
        .unwrap();
    assert_eq!(ids, [3, 2, 1]);

    let missing = db
        .query(template!(
            "SELECT " {el::column(&specialty, "name")} " FROM " {el::table(&specialty)}
            " WHERE " {el::column(&specialty, "id")} " = " {99_i32}
        ))
        .unwrap()
        .optional_result::<Option<String>>()
        .await
        .unwrap();
    assert_eq!(missing, None);
}

async fn where_ids(db: Db) {
    let owners = owners(&db).await;

    let mut found = db
        .select::<Owner>()
        .where_ids([owners[1].id, owners[3].id])
        .result_list()
        .await
        .unwrap();
    found.sort_by_key(|owner| owner.id);
    assert_eq!(found, [owners[1].clone(), owners[3].clone()]);

    let none = db
        .select::<Owner>()
        .where_ids(Vec::<i32>::new())
        .result_list()
        .await
        .unwrap();
    assert!(none.is_empty());
}

tests!(
    filter_and_order,
    paging,
    foreign_keys,
    projections,
    single_results,
    scalar_queries,
    where_ids,
);
