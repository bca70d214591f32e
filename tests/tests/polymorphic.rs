use tests::*;

use tessera::Db;

use pretty_assertions::assert_eq;
use serde_json::json;

fn people() -> Db {
    let mut db = fixtures::people();
    db.insert(
        "persons",
        &json!([
            { "id": 1, "type": "PERSON", "name": "John" },
            { "id": 2, "type": "ADULT", "name": "Jane" },
        ]),
    )
    .unwrap();
    db.insert("jobs", &json!({ "id": 1, "title": "Software Engineer", "adult_id": 2 }))
        .unwrap();
    db
}

#[test]
fn subtypes_share_the_base_table() {
    let db = people();

    let persons = db.all("persons").unwrap();
    assert_eq!(ids(&persons), [json!(1), json!(2)]);
    assert_eq!(persons[0].entity(), "persons");
    assert_eq!(persons[1].entity(), "adults");

    assert!(db.store().state(db.namespace(), "adults").is_none());
}

#[test]
fn subtype_queries_only_see_their_records() {
    let db = people();

    let adults = db.query("adults").unwrap().with("jobs").get().unwrap();
    assert_eq!(adults.len(), 1);
    assert_eq!(adults[0].id(), Some("2"));
    assert_eq!(adults[0].many("jobs").len(), 1);

    assert_none!(db.find("adults", 1).unwrap());
}

#[test]
fn belongs_to_a_subtype() {
    let db = people();

    let job = db
        .query("jobs")
        .unwrap()
        .with("adult")
        .first()
        .unwrap()
        .unwrap();
    let adult = assert_some!(job.one("adult"));
    assert_eq!(adult.id(), Some("2"));
    assert_eq!(adult.entity(), "adults");
}

#[test]
fn inserting_through_a_subtype_stamps_its_discriminator() {
    let mut db = people();
    db.insert("adults", &json!({ "id": 3, "name": "Ruth" })).unwrap();

    let table = db.store().state(db.namespace(), "persons").unwrap();
    assert_eq!(table["3"]["type"], json!("ADULT"));
    assert_eq!(db.query("adults").unwrap().count().unwrap(), 2);
}

#[test]
fn deleting_a_subtype_keeps_the_rest_of_the_table() {
    let mut db = people();
    db.delete_all(Some("adults")).unwrap();

    let persons = db.all("persons").unwrap();
    assert_eq!(ids(&persons), [json!(1)]);
}

fn media() -> Db {
    let mut db = fixtures::media();
    db.insert(
        "posts",
        &json!({
            "id": 1,
            "title": "hello",
            "tags": [{ "id": 1, "name": "news" }, { "id": 2, "name": "tech" }],
            "comments": [{ "id": 1, "body": "first" }],
        }),
    )
    .unwrap();
    db.insert(
        "videos",
        &json!({
            "id": 1,
            "title": "clip",
            "tags": [{ "id": 2 }],
            "comments": [{ "id": 2, "body": "cool" }, { "id": 3, "body": "meh" }],
            "cover": { "id": 1, "url": "cover.png" },
        }),
    )
    .unwrap();
    db
}

#[test]
fn morph_many_stamps_owner_id_and_type() {
    let db = media();

    let comments = db.all("comments").unwrap();
    let owners: Vec<_> = comments
        .iter()
        .map(|c| (c.get("commentable_id").cloned(), c.get("commentable_type").cloned()))
        .collect();
    assert_eq!(
        owners,
        [
            (Some(json!(1)), Some(json!("posts"))),
            (Some(json!(1)), Some(json!("videos"))),
            (Some(json!(1)), Some(json!("videos"))),
        ]
    );

    let video = db.query("videos").unwrap().with("comments|cover").first().unwrap().unwrap();
    assert_eq!(ids(video.many("comments")), [json!(2), json!(3)]);
    assert_eq!(video.one("cover").unwrap().get("url"), Some(&json!("cover.png")));

    let post = db.query("posts").unwrap().with("comments").first().unwrap().unwrap();
    assert_eq!(ids(post.many("comments")), [json!(1)]);
}

#[test]
fn morph_to_resolves_each_type() {
    let mut db = media();
    db.insert(
        "comments",
        &json!({ "id": 4, "commentable_id": 9, "commentable_type": "podcasts" }),
    )
    .unwrap();

    let comments = db.query("comments").unwrap().with("commentable").get().unwrap();
    let owners: Vec<_> = comments
        .iter()
        .map(|c| c.one("commentable").map(|o| (o.entity().to_string(), o.id().map(str::to_string))))
        .collect();
    assert_eq!(
        owners,
        [
            Some(("posts".to_string(), Some("1".to_string()))),
            Some(("videos".to_string(), Some("1".to_string()))),
            Some(("videos".to_string(), Some("1".to_string()))),
            None,
        ]
    );
}

#[test]
fn morph_to_normalizes_nested_owner() {
    let mut db = fixtures::media();
    db.insert(
        "comments",
        &json!({
            "id": 1,
            "commentable_id": 7,
            "commentable_type": "videos",
            "commentable": { "id": 7, "title": "nested" },
        }),
    )
    .unwrap();

    let video = assert_some!(db.find("videos", 7).unwrap());
    assert_eq!(video.get("title"), Some(&json!("nested")));
}

#[test]
fn morph_to_many_shares_one_pivot_table() {
    let db = media();

    let pivots: Vec<String> = db
        .store()
        .state(db.namespace(), "taggables")
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(
        pivots,
        [r#"[1,1,"posts"]"#, r#"[1,2,"posts"]"#, r#"[1,2,"videos"]"#]
    );

    let post = db.query("posts").unwrap().with("tags").first().unwrap().unwrap();
    assert_eq!(ids(post.many("tags")), [json!(1), json!(2)]);
    let pivot = assert_some!(post.many("tags")[0].pivot());
    assert_eq!(pivot.get("taggable_type"), Some(&json!("posts")));

    let video = db.query("videos").unwrap().with("tags").first().unwrap().unwrap();
    assert_eq!(ids(video.many("tags")), [json!(2)]);
}

#[test]
fn polymorphic_pivots_keep_nested_pivot_data() {
    let mut db = fixtures::media();

    let data = db
        .normalize(
            "posts",
            &json!({ "id": 1, "tags": [{ "id": 5, "pivot": { "weight": 3 } }] }),
        )
        .unwrap();
    let pivot = &data["taggables"][r#"[1,5,"posts"]"#];
    assert_eq!(pivot.get("weight"), Some(&json!(3)));
    assert_eq!(pivot.get("taggable_type"), Some(&json!("posts")));

    db.insert(
        "tags",
        &json!({ "id": 6, "videos": [{ "id": 2, "pivot": { "weight": 8 } }] }),
    )
    .unwrap();

    let video = db.query("videos").unwrap().with("tags").find(2).unwrap().unwrap();
    let pivot = assert_some!(video.many("tags")[0].pivot());
    assert_eq!(pivot.get("weight"), Some(&json!(8)));
    assert_eq!(pivot.get("taggable_type"), Some(&json!("videos")));
}

#[test]
fn morphed_by_many_loads_each_owner_kind() {
    let mut db = media();

    let tag = db
        .query("tags")
        .unwrap()
        .with("posts|videos")
        .find(2)
        .unwrap()
        .unwrap();
    assert_eq!(ids(tag.many("posts")), [json!(1)]);
    assert_eq!(ids(tag.many("videos")), [json!(1)]);

    // Attaching from the tag side reuses the existing edge
    db.insert("tags", &json!({ "id": 2, "videos": [{ "id": 1 }] }))
        .unwrap();
    assert_eq!(
        db.store().state(db.namespace(), "taggables").unwrap().len(),
        3
    );
}
