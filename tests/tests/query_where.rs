use tests::*;

use tessera::Db;

use pretty_assertions::assert_eq;
use serde_json::json;

fn seeded() -> Db {
    let mut db = fixtures::blog();
    db.insert(
        "users",
        &json!([
            { "id": 1, "name": "John", "age": 30 },
            { "id": 2, "name": "Jane", "age": 24 },
            { "id": 3, "name": "Johnny", "age": 30 },
            { "id": 4, "name": "Ruth", "age": 55 },
        ]),
    )
    .unwrap();
    db
}

#[test]
fn where_eq_uses_strict_equality() {
    let db = seeded();

    let users = db.query("users").unwrap().where_eq("age", 30).get().unwrap();
    assert_eq!(ids(&users), [json!(1), json!(3)]);

    let users = db.query("users").unwrap().where_eq("age", "30").get().unwrap();
    assert_empty!(users);
}

#[test]
fn where_in_matches_any_value() {
    let db = seeded();

    let users = db
        .query("users")
        .unwrap()
        .where_in("name", ["Jane", "Ruth", "Nobody"])
        .get()
        .unwrap();
    assert_eq!(ids(&users), [json!(2), json!(4)]);
}

#[test]
fn where_fn_and_where_record() {
    let db = seeded();

    let users = db
        .query("users")
        .unwrap()
        .where_fn("name", |name| name.as_str().is_some_and(|n| n.starts_with("Jo")))
        .where_record(|user| user.get("age") == Some(&json!(30)))
        .get()
        .unwrap();
    assert_eq!(ids(&users), [json!(1), json!(3)]);
}

#[test]
fn or_clauses_form_their_own_group() {
    let db = seeded();

    // (age == 30 AND name == "John") OR name == "Ruth"
    let users = db
        .query("users")
        .unwrap()
        .where_eq("age", 30)
        .where_eq("name", "John")
        .or_where_eq("name", "Ruth")
        .get()
        .unwrap();
    assert_eq!(ids(&users), [json!(1), json!(4)]);

    let users = db
        .query("users")
        .unwrap()
        .or_where_eq("id", 2)
        .or_where_in("id", [3, 4])
        .get()
        .unwrap();
    assert_eq!(ids(&users), [json!(2), json!(3), json!(4)]);
}

#[test]
fn primary_key_lookups_match_full_scans() {
    let db = seeded();

    let fast = db.query("users").unwrap().where_eq("id", 3).get().unwrap();
    let scan = db
        .query("users")
        .unwrap()
        .where_record(|user| user.get("id") == Some(&json!(3)))
        .get()
        .unwrap();
    assert_eq!(fast, scan);

    let fast = db
        .query("users")
        .unwrap()
        .where_in("id", [4, 1])
        .where_eq("age", 30)
        .get()
        .unwrap();
    assert_eq!(ids(&fast), [json!(1)]);

    let fast = db.query("users").unwrap().where_id_in([4, 2]).get().unwrap();
    assert_eq!(ids(&fast), [json!(2), json!(4)]);
}

#[test]
fn find_and_find_in() {
    let db = seeded();

    let user = assert_some!(db.find("users", 2).unwrap());
    assert_eq!(user.get("name"), Some(&json!("Jane")));
    assert_eq!(user.id(), Some("2"));

    // Numeric and string keys share an index id
    assert_some!(db.find("users", "2").unwrap());
    assert_none!(db.find("users", 99).unwrap());

    let users = db.query("users").unwrap().find_in([3, 1, 42]).unwrap();
    assert_eq!(ids(&users), [json!(1), json!(3)]);
}

#[test]
fn first_last_count_and_exists() {
    let db = seeded();
    let query = db.query("users").unwrap().where_eq("age", 30);

    assert_eq!(query.first().unwrap().unwrap().id(), Some("1"));
    assert_eq!(query.last().unwrap().unwrap().id(), Some("3"));
    assert_eq!(query.count().unwrap(), 2);
    assert!(query.exists().unwrap());

    let none = db.query("users").unwrap().where_eq("age", 99);
    assert_none!(none.first().unwrap());
    assert!(!none.exists().unwrap());
}

#[test]
fn aggregates() {
    let db = seeded();
    let query = db.query("users").unwrap();

    assert_eq!(query.max("age").unwrap(), 55.0);
    assert_eq!(query.min("age").unwrap(), 24.0);
    assert_eq!(query.sum("age").unwrap(), 139.0);

    let empty = db.query("posts").unwrap();
    assert_eq!(empty.max("votes").unwrap(), 0.0);
    assert_eq!(empty.sum("votes").unwrap(), 0.0);
}

#[test]
fn all_is_get() {
    let db = seeded();
    let query = db.query("users").unwrap();
    assert_eq!(query.all().unwrap(), query.get().unwrap());
    assert_eq!(db.all("users").unwrap().len(), 4);
}

#[test]
fn unknown_entity_is_an_error() {
    let db = seeded();
    assert!(db.query("nope").is_err());
    assert!(db.all("nope").unwrap_err().is_unknown_entity());
}
