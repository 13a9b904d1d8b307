#![cfg(feature = "sqlite")]

use pretty_assertions::assert_eq;
use tempest::{CapturedSql, Value};
use tests::{db::sqlite::setup, petclinic::*};

#[tokio::test]
async fn captures_statements_in_order() {
    let db = setup().await;
    let capture = db.capture();

    let specialties = db.entities::<Specialty>();
    specialties.upsert(&Specialty::new(3, "dentistry")).await.unwrap();
    specialties.find_by_id(3).await.unwrap();

    assert_eq!(capture.len(), 2);
    assert_eq!(
        capture.pop().unwrap(),
        CapturedSql {
            sql: "INSERT INTO specialty (id, name) VALUES (?, ?)\n\
                  ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name"
                .to_string(),
            parameters: vec![vec![Value::I32(3), Value::from("dentistry")]],
            batch: false,
        }
    );
    assert_eq!(
        capture.pop().unwrap(),
        CapturedSql {
            sql: "SELECT s.id, s.name FROM specialty s\nWHERE s.id = ?".to_string(),
            parameters: vec![vec![Value::I32(3)]],
            batch: false,
        }
    );
    assert!(capture.pop().is_none());
}

#[tokio::test]
async fn captures_batches() {
    let db = setup().await;
    let capture = db.capture();

    db.entities::<Specialty>()
        .upsert_batch(&[Specialty::new(1, "radiology"), Specialty::new(2, "surgery")])
        .await
        .unwrap();

    let statements = capture.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].batch);
    assert_eq!(
        statements[0].parameters,
        [
            vec![Value::I32(1), Value::from("radiology")],
            vec![Value::I32(2), Value::from("surgery")],
        ]
    );
}

#[tokio::test]
async fn versioned_update_sql() {
    let db = setup().await;
    let capture = db.capture();

    let vet = VersionedVet {
        id: 4,
        name: "Rafael Ortega".to_string(),
        version: 2,
    };
    let err = db.entities::<VersionedVet>().update(&vet).await.unwrap_err();
    assert!(err.is_optimistic_lock(), "{err}");

    let update = capture.pop().unwrap();
    assert_eq!(
        update.sql,
        "UPDATE versioned_vet SET name = ?, version = versioned_vet.version + 1 \
         WHERE id = ? AND version = ?"
    );
    assert_eq!(
        update.parameters,
        [vec![Value::from("Rafael Ortega"), Value::I32(4), Value::I32(2)]]
    );
}

#[tokio::test]
async fn capture_ends_when_dropped() {
    let db = setup().await;

    let outer = db.capture();
    {
        let inner = db.capture();
        db.entities::<Specialty>().count().await.unwrap();
        assert_eq!(inner.len(), 1);
    }

    let tx = db.transaction().await.unwrap();
    db.entities::<Specialty>().count().await.unwrap();
    tx.commit().await.unwrap();

    // Transaction control is not captured
    assert_eq!(outer.len(), 2);

    outer.clear();
    assert!(outer.is_empty());
}
