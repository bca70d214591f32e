use tests::*;

use tessera::{Db, Direction};

use pretty_assertions::assert_eq;
use serde_json::json;

fn seeded() -> Db {
    let mut db = fixtures::blog();
    db.insert(
        "posts",
        &json!([
            { "id": 1, "title": "b", "votes": 3 },
            { "id": 2, "title": "a", "votes": 1 },
            { "id": 3, "title": "c", "votes": 3 },
            { "id": 4, "title": "a", "votes": 2 },
            { "id": 5, "title": "b", "votes": 1 },
        ]),
    )
    .unwrap();
    db
}

#[test]
fn sorts_by_several_keys() {
    let db = seeded();

    let posts = db
        .query("posts")
        .unwrap()
        .order_by("title", Direction::Asc)
        .order_by("votes", Direction::Desc)
        .get()
        .unwrap();
    assert_eq!(ids(&posts), [json!(4), json!(2), json!(1), json!(5), json!(3)]);
}

#[test]
fn sort_is_stable() {
    let db = seeded();

    let posts = db
        .query("posts")
        .unwrap()
        .order_by("votes", Direction::Asc)
        .get()
        .unwrap();
    assert_eq!(ids(&posts), [json!(2), json!(5), json!(4), json!(1), json!(3)]);

    let votes: Vec<i64> = posts
        .iter()
        .map(|post| post.get("votes").and_then(|v| v.as_i64()).unwrap())
        .collect();
    assert_sorted!(votes);
}

#[test]
fn sorts_by_computed_key() {
    let db = seeded();

    let posts = db
        .query("posts")
        .unwrap()
        .order_by_fn(
            |post| json!(-post.get("votes").and_then(|v| v.as_i64()).unwrap_or(0)),
            Direction::Asc,
        )
        .get()
        .unwrap();
    assert_eq!(ids(&posts), [json!(1), json!(3), json!(4), json!(2), json!(5)]);
}

#[test]
fn directions_parse() {
    assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Desc);
    assert_eq!("ASC".parse::<Direction>().unwrap(), Direction::Asc);
}

#[test]
fn offset_and_limit_page_through_results() {
    let db = seeded();
    let page = |offset, limit| {
        let posts = db
            .query("posts")
            .unwrap()
            .order_by("id", Direction::Desc)
            .offset(offset)
            .limit(limit)
            .get()
            .unwrap();
        ids(&posts)
    };

    assert_eq!(page(0, 2), [json!(5), json!(4)]);
    assert_eq!(page(2, 2), [json!(3), json!(2)]);
    assert_eq!(page(4, 2), [json!(1)]);
    assert_empty!(page(6, 2));
}

#[test]
fn limit_zero_returns_nothing() {
    let db = seeded();
    let posts = db.query("posts").unwrap().limit(0).get().unwrap();
    assert_empty!(posts);
}

#[test]
fn order_does_not_depend_on_insertion_order() {
    let mut rows: Vec<_> = (1..=20)
        .map(|id| json!({ "id": id, "votes": id % 4 }))
        .collect();
    rows.shuffle();

    let mut db = fixtures::blog();
    db.insert("posts", &serde_json::Value::Array(rows)).unwrap();

    let posts = db
        .query("posts")
        .unwrap()
        .order_by("votes", Direction::Desc)
        .order_by("id", Direction::Asc)
        .get()
        .unwrap();
    assert_eq!(posts.len(), 20);

    let keys: Vec<(i64, i64)> = posts
        .iter()
        .map(|post| {
            let votes = post.get("votes").and_then(|v| v.as_i64()).unwrap();
            let id = post.get("id").and_then(|v| v.as_i64()).unwrap();
            (-votes, id)
        })
        .collect();
    assert_sorted!(keys);
}
