// End-to-end tests through command documents

mod common;

use common::{asc, Fixture};
use indexward_commands::{CommandDispatcher, IndexLifecycleCoordinator};
use indexward_core::Config;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn dispatcher(fx: &Fixture) -> CommandDispatcher {
    let coordinator =
        IndexLifecycleCoordinator::new(fx.db.clone(), fx.builds.clone(), &Config::default());
    CommandDispatcher::new(Arc::new(coordinator))
}

#[tokio::test]
async fn test_drop_reply_shapes() {
    let fx = Fixture::new();
    fx.collection("users", vec![asc("name"), asc("age")]).await;
    let dispatcher = dispatcher(&fx);

    let reply = dispatcher
        .run("test", &json!({"deleteIndexes": "users", "index": {"age": 1}}))
        .await;
    assert_eq!(reply, json!({"nIndexesWas": 3, "ok": 1}));

    let reply = dispatcher
        .run("test", &json!({"dropIndexes": "users", "index": "*"}))
        .await;
    assert_eq!(
        reply,
        json!({
            "nIndexesWas": 2,
            "msg": "non-_id indexes dropped for collection",
            "ok": 1
        })
    );
    assert_eq!(fx.index_names("users").await, vec!["_id_"]);
}

#[tokio::test]
async fn test_reindex_reply_lists_indexes() {
    let fx = Fixture::new();
    fx.collection("users", vec![asc("name")]).await;
    let dispatcher = dispatcher(&fx);

    let reply = dispatcher.run("test", &json!({"reIndex": "users"})).await;
    assert_eq!(
        reply,
        json!({
            "nIndexesWas": 2,
            "nIndexes": 2,
            "indexes": [
                {"name": "_id_", "key": {"_id": 1}},
                {"name": "name_1", "key": {"name": 1}}
            ],
            "ok": 1
        })
    );
}

#[tokio::test]
async fn test_failure_replies() {
    let fx = Fixture::new();
    fx.collection("users", vec![asc("name")]).await;
    let dispatcher = dispatcher(&fx);

    let reply = dispatcher
        .run("test", &json!({"dropIndexes": "users", "index": "_id_"}))
        .await;
    assert_eq!(reply["ok"], json!(0));
    assert_eq!(reply["errmsg"], json!("cannot drop _id index"));

    let reply = dispatcher
        .run("test", &json!({"dropIndexes": "missing", "index": "*"}))
        .await;
    assert_eq!(reply["ok"], json!(0));
    assert_eq!(reply["errmsg"], json!("ns not found: test.missing"));

    let reply = dispatcher
        .run("test", &json!({"dropIndexes": "users", "index": false}))
        .await;
    assert_eq!(reply["ok"], json!(0));
    assert_eq!(reply["codeName"], json!("FailedToParse"));
}
