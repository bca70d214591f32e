use tests::*;

use tessera::{Attr, Db, Model, Relation};

use serde_json::json;

#[test]
fn unknown_entities() {
    let mut db = fixtures::blog();

    let err = db.insert("accounts", &json!({ "id": 1 })).unwrap_err();
    assert!(err.is_unknown_entity());
    assert!(err.to_string().contains("accounts"));

    assert!(db.find("accounts", 1).unwrap_err().is_unknown_entity());
    assert!(db.delete_all(Some("accounts")).unwrap_err().is_unknown_entity());
}

#[test]
fn scalar_payloads_are_invalid() {
    let mut db = fixtures::blog();

    for payload in [json!(1), json!("users"), json!(true), json!([1, 2])] {
        let err = db.insert("users", &payload).unwrap_err();
        assert!(err.is_invalid_payload(), "payload={payload}; err={err}");
    }

    assert!(db.make("users", &json!([])).unwrap_err().is_invalid_payload());
}

#[test]
fn empty_payloads_are_a_no_op() {
    let mut db = fixtures::blog();
    for payload in [json!(null), json!({}), json!([])] {
        let inserted = db.insert("users", &payload).unwrap();
        assert!(inserted.is_empty());
    }
}

#[test]
fn malformed_keys() {
    let db = fixtures::roles();

    assert!(db.find("role_user", 1).unwrap_err().is_malformed_key());
    assert!(db.find("role_user", json!([1])).unwrap_err().is_malformed_key());
    assert!(db.find("users", json!([1, 2])).unwrap_err().is_malformed_key());
    assert!(db.find("users", json!(null)).unwrap_err().is_malformed_key());
}

#[test]
fn invalid_schemas_fail_to_build() {
    let build = |models: Vec<Model>| {
        let mut builder = Db::builder();
        for model in models {
            builder.register(model);
        }
        builder.build()
    };

    // Primary key names an undeclared field
    let err = build(vec![Model::new("users").field("name", Attr::string(""))]).unwrap_err();
    assert!(err.is_invalid_schema(), "{err}");

    let err = build(vec![
        Model::new("users").field("id", Attr::number(0)),
        Model::new("users").field("id", Attr::number(0)),
    ])
    .unwrap_err();
    assert!(err.is_invalid_schema(), "{err}");

    let err = build(vec![
        Model::new("a").extends("b").field("id", Attr::number(0)),
        Model::new("b").extends("a").field("id", Attr::number(0)),
    ])
    .unwrap_err();
    assert!(err.is_invalid_schema(), "{err}");
}

#[test]
fn schemas_must_reference_registered_entities() {
    let build = |model: Model| {
        let mut builder = Db::builder();
        builder.register(model);
        builder.build()
    };

    let err = build(
        Model::new("users")
            .field("id", Attr::number(0))
            .field("posts", Relation::has_many("posts", "user_id")),
    )
    .unwrap_err();
    assert!(err.is_unknown_entity());
    assert!(err.to_string().contains("users.posts"), "{err}");

    let err = build(Model::new("admins").extends("users")).unwrap_err();
    assert!(err.is_unknown_entity());
}
