use tests::*;

use pretty_assertions::assert_eq;
use serde_json::json;

fn john() -> serde_json::Value {
    json!({
        "id": 1,
        "name": "John",
        "posts": [
            { "id": 1, "title": "first", "comments": [{ "id": 1, "body": "nice" }] },
            { "id": 2, "title": "second" },
        ],
        "profile": { "id": 1, "bio": "hello" },
    })
}

#[test]
fn nested_payload_round_trips() {
    let mut db = fixtures::blog();
    db.insert("users", &john()).unwrap();

    let user = db
        .query("users")
        .unwrap()
        .with("posts.comments")
        .with("profile")
        .find(1)
        .unwrap()
        .unwrap();

    assert_eq!(user.get("name"), Some(&json!("John")));

    let posts = user.many("posts");
    assert_eq!(ids(posts), [json!(1), json!(2)]);
    assert_eq!(posts[0].get("user_id"), Some(&json!(1)));
    assert_eq!(posts[1].get("user_id"), Some(&json!(1)));

    let comments = posts[0].many("comments");
    assert_eq!(ids(comments), [json!(1)]);
    assert_eq!(comments[0].get("post_id"), Some(&json!(1)));
    assert!(posts[1].many("comments").is_empty());

    let profile = assert_some!(user.one("profile"));
    assert_eq!(profile.get("user_id"), Some(&json!(1)));
}

#[test]
fn stored_records_hold_references_not_nested_values() {
    let mut db = fixtures::blog();
    db.insert("users", &john()).unwrap();

    let users = db.store().state(db.namespace(), "users").unwrap();
    assert_eq!(
        serde_json::Value::Object(users["1"].clone()),
        json!({ "$id": "1", "id": 1, "name": "John", "age": 0 })
    );

    let posts = db.store().state(db.namespace(), "posts").unwrap();
    assert_eq!(posts.keys().collect::<Vec<_>>(), ["1", "2"]);
    assert!(posts["1"].get("comments").is_none());
}

#[test]
fn inserting_twice_leaves_the_same_state() {
    let mut db = fixtures::blog();
    db.insert("users", &john()).unwrap();

    let snapshot = |db: &tessera::Db| {
        ["users", "posts", "comments", "profiles"]
            .map(|entity| db.store().state(db.namespace(), entity).cloned())
    };

    let before = snapshot(&db);
    db.insert("users", &john()).unwrap();
    assert_eq!(snapshot(&db), before);
}

#[test]
fn belongs_to_takes_key_from_nested_parent() {
    let db = fixtures::blog();
    let data = db
        .normalize(
            "posts",
            &json!({ "id": 3, "title": "t", "author": { "id": 5, "name": "Jane" } }),
        )
        .unwrap();

    assert_eq!(data["posts"]["3"]["user_id"], json!(5));
    assert_eq!(data["posts"]["3"]["author"], json!("5"));
    assert_eq!(data["users"]["5"]["name"], json!("Jane"));
}

#[test]
fn explicit_foreign_keys_survive_nesting() {
    let db = fixtures::blog();
    let data = db
        .normalize(
            "users",
            &json!({
                "id": 1,
                "posts": [{ "id": 1, "user_id": 99 }, { "id": 2 }],
                "profile": { "id": 1, "user_id": 42 },
            }),
        )
        .unwrap();

    assert_eq!(data["posts"]["1"]["user_id"], json!(99));
    assert_eq!(data["posts"]["2"]["user_id"], json!(1));
    assert_eq!(data["profiles"]["1"]["user_id"], json!(42));

    let db = fixtures::media();
    let data = db
        .normalize(
            "posts",
            &json!({
                "id": 1,
                "comments": [
                    { "id": 1, "commentable_id": 8, "commentable_type": "videos" },
                    { "id": 2 },
                ],
            }),
        )
        .unwrap();

    assert_eq!(data["comments"]["1"]["commentable_id"], json!(8));
    assert_eq!(data["comments"]["1"]["commentable_type"], json!("videos"));
    assert_eq!(data["comments"]["2"]["commentable_id"], json!(1));
    assert_eq!(data["comments"]["2"]["commentable_type"], json!("posts"));
}

#[test]
fn arrays_of_roots_normalize_in_order() {
    let db = fixtures::blog();
    let data = db
        .normalize(
            "users",
            &json!([{ "id": 2, "name": "B" }, { "id": 1, "name": "A" }]),
        )
        .unwrap();

    assert_eq!(data["users"].keys().collect::<Vec<_>>(), ["2", "1"]);
}

#[test]
fn generated_keys_become_index_ids() {
    let mut db = fixtures::notes();
    let created = db
        .insert("notes", &json!([{ "text": "a" }, { "text": "b" }]))
        .unwrap();

    let notes = &created["notes"];
    assert_eq!(notes.len(), 2);

    let generated: Vec<_> = notes.iter().map(|note| note.id().unwrap()).collect();
    assert_unique!(generated);

    for note in notes {
        assert_eq!(note.get("id"), Some(&json!(note.id().unwrap())));
    }
}

#[test]
fn records_without_keys_get_placeholder_ids() {
    let mut db = fixtures::blog();
    db.insert("users", &json!([{ "name": "A" }, { "name": "B" }]))
        .unwrap();

    let users = db.store().state(db.namespace(), "users").unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.keys().all(|id| id.starts_with("_no_key_")));
}

#[test]
fn make_builds_instances_without_touching_the_store() {
    let db = fixtures::blog();
    let user = db.make("users", &john()).unwrap();

    assert_eq!(user.many("posts").len(), 2);
    assert_eq!(user.many("posts")[0].many("comments").len(), 1);
    assert!(db.store().state(db.namespace(), "users").is_none());

    let standalone = tessera::make(db.schema(), "users", &json!({ "id": 9 })).unwrap();
    assert_eq!(standalone.get("name"), Some(&json!("")));
    assert!(standalone.many("posts").is_empty());
}
