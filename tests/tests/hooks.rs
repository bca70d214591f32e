use tests::*;

use tessera::{hooks::Event, Flow};

use pretty_assertions::assert_eq;
use serde_json::json;
use std::{cell::RefCell, rc::Rc};

#[test]
fn before_create_can_rewrite_and_reject() {
    let mut db = fixtures::blog();

    db.hooks().before_create(|entity, record| {
        if entity != "users" {
            return Flow::Continue;
        }
        if record.get("name") == Some(&json!("Mallory")) {
            return Flow::Reject;
        }
        record.insert("age".into(), json!(18));
        Flow::Continue
    });

    let created = db
        .insert(
            "users",
            &json!([
                { "id": 1, "name": "John" },
                { "id": 2, "name": "Mallory" },
                { "id": 3, "name": "Jane" },
            ]),
        )
        .unwrap();

    assert_eq!(ids(&created["users"]), [json!(1), json!(3)]);

    let users = db.all("users").unwrap();
    assert_eq!(ids(&users), [json!(1), json!(3)]);
    assert!(users.iter().all(|user| user.get("age") == Some(&json!(18))));
}

#[test]
fn after_hooks_see_committed_records() {
    let mut db = fixtures::blog();
    let seen = Rc::new(RefCell::new(vec![]));

    let log = seen.clone();
    db.hooks().after_create(move |entity, record| {
        log.borrow_mut().push(format!("create {entity} {}", record["id"]));
    });
    let log = seen.clone();
    db.hooks().after_update(move |entity, record| {
        log.borrow_mut().push(format!("update {entity} {}", record["name"]));
    });
    let log = seen.clone();
    db.hooks().after_delete(move |entity, record| {
        log.borrow_mut().push(format!("delete {entity} {}", record["id"]));
    });

    db.insert("users", &json!({ "id": 1, "posts": [{ "id": 5 }] }))
        .unwrap();
    db.update("users", &json!({ "id": 1, "name": "John" })).unwrap();
    db.delete("users", 1).unwrap();

    assert_eq!(
        *seen.borrow(),
        [
            "create users 1",
            "create posts 5",
            "update users \"John\"",
            "delete users 1",
        ]
    );
}

#[test]
fn vetoed_updates_and_deletes_leave_records_alone() {
    let mut db = fixtures::blog();
    db.insert("users", &json!([{ "id": 1, "name": "John" }, { "id": 2, "name": "Jane" }]))
        .unwrap();

    db.hooks().before_update(|_, record| {
        if record["id"] == json!(1) {
            Flow::Reject
        } else {
            Flow::Continue
        }
    });
    db.hooks().before_delete(|_, record| {
        if record["id"] == json!(2) {
            Flow::Reject
        } else {
            Flow::Continue
        }
    });

    db.update("users", &json!([{ "id": 1, "age": 9 }, { "id": 2, "age": 9 }]))
        .unwrap();
    assert_eq!(db.find("users", 1).unwrap().unwrap().get("age"), Some(&json!(0)));
    assert_eq!(db.find("users", 2).unwrap().unwrap().get("age"), Some(&json!(9)));

    // With delete hooks registered, delete_all goes record by record
    let deleted = db.delete_all(Some("users")).unwrap();
    assert_eq!(ids(&deleted["users"]), [json!(1)]);
    assert_eq!(ids(&db.all("users").unwrap()), [json!(2)]);
}

#[test]
fn select_hooks_run_between_stages() {
    let mut db = fixtures::blog();
    db.insert(
        "users",
        &json!([{ "id": 1, "age": 3 }, { "id": 2, "age": 1 }, { "id": 3, "age": 2 }]),
    )
    .unwrap();

    let stages = Rc::new(RefCell::new(vec![]));

    let log = stages.clone();
    db.hooks().before_select(move |_, items| {
        log.borrow_mut().push(("before_select", items.len()));
        items
    });
    let log = stages.clone();
    db.hooks().after_where(move |_, items| {
        log.borrow_mut().push(("after_where", items.len()));
        items
    });
    let log = stages.clone();
    db.hooks().after_order_by(move |_, items| {
        log.borrow_mut().push(("after_order_by", items.len()));
        items
    });
    db.hooks().after_limit(|_, mut items| {
        items.reverse();
        items
    });

    let users = db
        .query("users")
        .unwrap()
        .where_record(|user| user.get("age") != Some(&json!(3)))
        .order_by("age", tessera::Direction::Asc)
        .get()
        .unwrap();

    assert_eq!(ids(&users), [json!(3), json!(2)]);
    assert_eq!(
        *stages.borrow(),
        [("before_select", 3), ("after_where", 2), ("after_order_by", 2)]
    );
}

#[test]
fn removed_hooks_no_longer_fire() {
    let mut db = fixtures::blog();

    let id = db.hooks().before_create(|_, _| Flow::Reject);
    assert!(db.hooks().is_registered(Event::BeforeCreate));

    db.insert("users", &json!({ "id": 1 })).unwrap();
    assert_empty!(db.all("users").unwrap());

    assert!(db.hooks().remove(id));
    assert!(!db.hooks().remove(id));
    assert!(!db.hooks().is_registered(Event::BeforeCreate));

    db.insert("users", &json!({ "id": 1 })).unwrap();
    assert_eq!(db.all("users").unwrap().len(), 1);
}
