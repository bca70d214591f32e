//! Model sets shared by the scenarios.

use crate::store::RecordingStore;

use tessera::{Attr, Db, Model, Relation};

use serde_json::{json, Value};

fn key() -> Attr {
    Attr::value(Value::Null)
}

/// Users with posts, comments and a profile.
pub fn blog() -> Db {
    blog_builder().build().unwrap()
}

/// [`blog`] over a store that logs its commits.
pub fn blog_recorded() -> Db<RecordingStore> {
    blog_builder()
        .build_with_store(RecordingStore::default())
        .unwrap()
}

fn blog_builder() -> tessera::Builder {
    models!(
        Model::new("users")
            .field("id", Attr::number(0))
            .field("name", Attr::string(""))
            .field("age", Attr::number(0))
            .field("posts", Relation::has_many("posts", "user_id"))
            .field("profile", Relation::has_one("profiles", "user_id")),
        Model::new("posts")
            .field("id", Attr::number(0))
            .field("user_id", key())
            .field("title", Attr::string(""))
            .field("votes", Attr::number(0))
            .field("author", Relation::belongs_to("users", "user_id"))
            .field("comments", Relation::has_many("comments", "post_id")),
        Model::new("comments")
            .field("id", Attr::number(0))
            .field("post_id", key())
            .field("body", Attr::string("")),
        Model::new("profiles")
            .field("id", Attr::number(0))
            .field("user_id", key())
            .field("bio", Attr::string("")),
    )
}

/// Users and roles joined through a `role_user` pivot with a composite key.
pub fn roles() -> Db {
    models!(
        Model::new("users")
            .field("id", Attr::number(0))
            .field("name", Attr::string(""))
            .field(
                "roles",
                Relation::belongs_to_many("roles", "role_user", "user_id", "role_id"),
            ),
        Model::new("roles")
            .field("id", Attr::number(0))
            .field("name", Attr::string(""))
            .field(
                "users",
                Relation::belongs_to_many("users", "role_user", "role_id", "user_id"),
            ),
        Model::new("role_user")
            .key(["user_id", "role_id"])
            .field("user_id", key())
            .field("role_id", key())
            .field("level", Attr::string("member")),
    )
    .build()
    .unwrap()
}

/// People stored in one table; adults are a subtype with jobs.
pub fn people() -> Db {
    models!(
        Model::new("persons")
            .subtype("PERSON", "persons")
            .subtype("ADULT", "adults")
            .field("id", Attr::number(0))
            .field("type", Attr::string("PERSON"))
            .field("name", Attr::string("")),
        Model::new("adults")
            .extends("persons")
            .field("jobs", Relation::has_many("jobs", "adult_id")),
        Model::new("jobs")
            .field("id", Attr::number(0))
            .field("title", Attr::string(""))
            .field("adult_id", key())
            .field("adult", Relation::belongs_to("adults", "adult_id")),
    )
    .build()
    .unwrap()
}

/// Posts and videos sharing tags, comments and cover images polymorphically.
pub fn media() -> Db {
    let tags = || {
        Relation::morph_to_many("tags", "taggables", "tag_id", "taggable_id", "taggable_type")
    };

    models!(
        Model::new("posts")
            .field("id", Attr::number(0))
            .field("title", Attr::string(""))
            .field("tags", tags())
            .field(
                "comments",
                Relation::morph_many("comments", "commentable_id", "commentable_type"),
            ),
        Model::new("videos")
            .field("id", Attr::number(0))
            .field("title", Attr::string(""))
            .field("tags", tags())
            .field(
                "comments",
                Relation::morph_many("comments", "commentable_id", "commentable_type"),
            )
            .field(
                "cover",
                Relation::morph_one("images", "imageable_id", "imageable_type"),
            ),
        Model::new("tags")
            .field("id", Attr::number(0))
            .field("name", Attr::string(""))
            .field(
                "posts",
                Relation::morphed_by_many(
                    "posts",
                    "taggables",
                    "tag_id",
                    "taggable_id",
                    "taggable_type",
                ),
            )
            .field(
                "videos",
                Relation::morphed_by_many(
                    "videos",
                    "taggables",
                    "tag_id",
                    "taggable_id",
                    "taggable_type",
                ),
            ),
        Model::new("taggables")
            .key(["taggable_id", "tag_id", "taggable_type"])
            .field("taggable_id", key())
            .field("tag_id", key())
            .field("taggable_type", key())
            .field("weight", Attr::number(0)),
        Model::new("comments")
            .field("id", Attr::number(0))
            .field("body", Attr::string(""))
            .field("commentable_id", key())
            .field("commentable_type", key())
            .field(
                "commentable",
                Relation::morph_to("commentable_id", "commentable_type"),
            ),
        Model::new("images")
            .field("id", Attr::number(0))
            .field("url", Attr::string(""))
            .field("imageable_id", key())
            .field("imageable_type", key()),
    )
    .build()
    .unwrap()
}

/// Countries reaching posts through their users, and clusters listing node
/// ids in an array field.
pub fn geography() -> Db {
    models!(
        Model::new("countries")
            .field("id", Attr::number(0))
            .field("name", Attr::string(""))
            .field("users", Relation::has_many("users", "country_id"))
            .field(
                "posts",
                Relation::has_many_through("posts", "users", "country_id", "user_id"),
            ),
        Model::new("users")
            .field("id", Attr::number(0))
            .field("country_id", key())
            .field("posts", Relation::has_many("posts", "user_id")),
        Model::new("posts")
            .field("id", Attr::number(0))
            .field("user_id", key())
            .field("title", Attr::string("")),
        Model::new("clusters")
            .field("id", Attr::number(0))
            .field("node_ids", Attr::value(json!([])))
            .field("nodes", Relation::has_many_by("nodes", "node_ids")),
        Model::new("nodes")
            .field("id", Attr::number(0))
            .field("name", Attr::string("")),
    )
    .build()
    .unwrap()
}

/// Records keyed by a generated uid.
pub fn notes() -> Db {
    models!(Model::new("notes")
        .field("id", Attr::uid())
        .field("text", Attr::string(""))
        .field("done", Attr::boolean(false)))
    .build()
    .unwrap()
}
