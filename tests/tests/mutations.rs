use tests::*;

use tessera::{Condition, Db, Patch};

use pretty_assertions::assert_eq;
use serde_json::json;

fn seeded() -> Db {
    let mut db = fixtures::blog();
    db.insert(
        "users",
        &json!([
            { "id": 1, "name": "John", "age": 30 },
            { "id": 2, "name": "Jane", "age": 24 },
        ]),
    )
    .unwrap();
    db
}

#[test]
fn create_replaces_every_table_in_the_payload() {
    let mut db = seeded();

    let created = db
        .create(
            "users",
            &json!({ "id": 3, "name": "Ruth", "posts": [{ "id": 1 }] }),
        )
        .unwrap();
    assert_eq!(created.keys().collect::<Vec<_>>(), ["users", "posts"]);

    assert_eq!(ids(&db.all("users").unwrap()), [json!(3)]);
    assert_eq!(ids(&db.all("posts").unwrap()), [json!(1)]);
}

#[test]
fn create_with_empty_payload_clears_the_entity() {
    let mut db = seeded();
    let created = db.create("users", &json!([])).unwrap();
    assert!(created.is_empty());
    assert_empty!(db.all("users").unwrap());
}

#[test]
fn insert_adds_and_replaces() {
    let mut db = seeded();
    db.insert("users", &json!({ "id": 1, "name": "Johnny" }))
        .unwrap();
    db.insert("users", &json!({ "id": 3, "name": "Ruth" })).unwrap();

    let users = db.all("users").unwrap();
    assert_eq!(ids(&users), [json!(1), json!(2), json!(3)]);
    assert_eq!(users[0].get("name"), Some(&json!("Johnny")));
    // Replaced, not merged
    assert_eq!(users[0].get("age"), Some(&json!(0)));
}

#[test]
fn update_merges_into_existing_records_only() {
    let mut db = seeded();

    let updated = db
        .update(
            "users",
            &json!([{ "id": 1, "name": "Johnny" }, { "id": 9, "name": "Ghost" }]),
        )
        .unwrap();
    assert_eq!(ids(&updated["users"]), [json!(1)]);

    let john = db.find("users", 1).unwrap().unwrap();
    assert_eq!(john.get("name"), Some(&json!("Johnny")));
    assert_eq!(john.get("age"), Some(&json!(30)));
    assert_none!(db.find("users", 9).unwrap());
}

#[test]
fn insert_or_update_merges_and_inserts() {
    let mut db = seeded();

    db.insert_or_update(
        "users",
        &json!([{ "id": 2, "age": 25 }, { "id": 3, "name": "Ruth" }]),
    )
    .unwrap();

    let users = db.all("users").unwrap();
    assert_eq!(ids(&users), [json!(1), json!(2), json!(3)]);
    assert_eq!(users[1].get("name"), Some(&json!("Jane")));
    assert_eq!(users[1].get("age"), Some(&json!(25)));
    assert_eq!(users[2].get("name"), Some(&json!("Ruth")));
}

#[test]
fn update_by_condition() {
    let mut db = seeded();

    db.update_by(
        "users",
        json!({ "age": 40 }),
        Some(Condition::when(|user| user.get("name") == Some(&json!("Jane")))),
    )
    .unwrap();
    assert_eq!(db.find("users", 2).unwrap().unwrap().get("age"), Some(&json!(40)));

    db.update_by(
        "users",
        Patch::apply(|record| {
            record.insert("name".into(), json!("J."));
        }),
        Some(Condition::key(1)),
    )
    .unwrap();
    assert_eq!(db.find("users", 1).unwrap().unwrap().get("name"), Some(&json!("J.")));
}

#[test]
fn update_by_rejects_non_object_data() {
    let mut db = seeded();
    let err = db
        .update_by("users", json!([1]), Some(Condition::key(1)))
        .unwrap_err();
    assert!(err.is_invalid_payload());
}

#[test]
fn changing_the_primary_key_moves_the_record() {
    let mut db = seeded();

    db.update_by("users", json!({ "id": 7 }), Some(Condition::key(1)))
        .unwrap();

    assert_none!(db.find("users", 1).unwrap());
    let user = assert_some!(db.find("users", 7).unwrap());
    assert_eq!(user.id(), Some("7"));
    assert_eq!(user.get("name"), Some(&json!("John")));
}

#[test]
fn shifting_keys_within_one_batch_keeps_every_record() {
    let mut db = seeded();

    db.update_by(
        "users",
        Patch::apply(|record| {
            let id = record["id"].as_i64().unwrap_or(0);
            record.insert("id".into(), json!(id + 1));
        }),
        Some(Condition::when(|_| true)),
    )
    .unwrap();

    let table = db.store().state(db.namespace(), "users").unwrap();
    assert_eq!(table.keys().collect::<Vec<_>>(), ["2", "3"]);

    let users = db.all("users").unwrap();
    assert_eq!(ids(&users), [json!(2), json!(3)]);
    assert_eq!(users[0].get("name"), Some(&json!("John")));
    assert_eq!(users[1].get("name"), Some(&json!("Jane")));
}

#[test]
fn delete_by_key_and_predicate() {
    let mut db = seeded();
    db.insert("users", &json!({ "id": 3, "name": "Ruth", "age": 55 }))
        .unwrap();

    let deleted = db.delete("users", 1).unwrap();
    assert_eq!(ids(&deleted["users"]), [json!(1)]);

    let deleted = db
        .delete("users", Condition::when(|user| user.get("age") == Some(&json!(55))))
        .unwrap();
    assert_eq!(ids(&deleted["users"]), [json!(3)]);

    assert_eq!(ids(&db.all("users").unwrap()), [json!(2)]);

    let deleted = db.delete("users", 42).unwrap();
    assert_empty!(deleted["users"]);
}

#[test]
fn delete_all_clears_one_or_every_entity() {
    let mut db = seeded();
    db.insert("posts", &json!([{ "id": 1 }, { "id": 2 }])).unwrap();

    let deleted = db.delete_all(Some("posts")).unwrap();
    assert_eq!(deleted["posts"].len(), 2);
    assert_empty!(db.all("posts").unwrap());
    assert_eq!(db.all("users").unwrap().len(), 2);

    db.delete_all(None).unwrap();
    assert_empty!(db.all("users").unwrap());
}

#[test]
fn each_entity_batch_is_one_commit() {
    let mut db = fixtures::blog_recorded();

    db.insert(
        "users",
        &json!([
            { "id": 1, "posts": [{ "id": 1 }, { "id": 2 }] },
            { "id": 2, "posts": [{ "id": 3 }] },
        ]),
    )
    .unwrap();

    let commits: Vec<_> = db
        .store()
        .commits()
        .iter()
        .map(|c| (c.name, c.entity.as_deref(), c.records))
        .collect();
    assert_eq!(
        commits,
        [("insert", Some("users"), 2), ("insert", Some("posts"), 3)]
    );

    db.delete_all(None).unwrap();
    assert_eq!(db.store().names().last(), Some(&"delete_all"));
}

#[test]
fn namespaces_isolate_stores() {
    let mut builder = models!(tessera::Model::new("users").field("id", tessera::Attr::number(0)));
    builder.namespace("other");
    let mut db = builder.build().unwrap();

    assert_eq!(db.namespace(), "other");
    db.insert("users", &json!({ "id": 1 })).unwrap();
    assert!(db.store().state("other", "users").is_some());
    assert!(db.store().state("entities", "users").is_none());
}
