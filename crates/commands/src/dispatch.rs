//! Command documents in, reply documents out
//!
//! Requests are JSON objects whose first key names the command:
//!
//! - `{"dropIndexes": "<collection>", "index": "*" | "<name>" | {<key pattern>}}`
//!   (`deleteIndexes` is accepted as a legacy alias)
//! - `{"reIndex": "<collection>"}`

use crate::coordinator::IndexLifecycleCoordinator;
use indexward_core::{DropSelector, Error, Namespace, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::warn;

/// A parsed index lifecycle request
#[derive(Debug, Clone, PartialEq)]
pub enum IndexCommand {
    DropIndexes {
        namespace: Namespace,
        selector: DropSelector,
    },
    ReIndex {
        namespace: Namespace,
    },
}

impl IndexCommand {
    /// Parse a command document addressed to database `db`
    pub fn parse(db: &str, document: &Value) -> Result<Self> {
        let fields = document
            .as_object()
            .ok_or_else(|| Error::UnknownCommand(document.to_string()))?;
        let (name, target) = fields
            .iter()
            .next()
            .ok_or_else(|| Error::UnknownCommand("{}".to_string()))?;

        match name.as_str() {
            "dropIndexes" | "deleteIndexes" => {
                let namespace = namespace_for(db, target)?;
                let index = fields
                    .get("index")
                    .ok_or_else(|| Error::invalid_index_spec("missing index field"))?;
                Ok(Self::DropIndexes {
                    namespace,
                    selector: DropSelector::from_value(index)?,
                })
            }
            "reIndex" => Ok(Self::ReIndex {
                namespace: namespace_for(db, target)?,
            }),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

fn namespace_for(db: &str, target: &Value) -> Result<Namespace> {
    match target.as_str() {
        Some(collection) => Namespace::new(db, collection),
        None => Err(Error::InvalidNamespace(format!(
            "collection name must be a string, got {target}"
        ))),
    }
}

#[derive(Serialize)]
struct Success<T: Serialize> {
    #[serde(flatten)]
    body: T,
    ok: i32,
}

/// Render a successful outcome as a reply document
pub fn success_reply<T: Serialize>(body: T) -> Value {
    serde_json::to_value(Success { body, ok: 1 })
        .unwrap_or_else(|e| failure_reply(&Error::Other(e.into())))
}

/// Render an error as a reply document
pub fn failure_reply(error: &Error) -> Value {
    let mut reply = Map::new();
    reply.insert("ok".to_string(), json!(0));
    reply.insert("errmsg".to_string(), json!(error.to_string()));
    reply.insert("code".to_string(), json!(error.code()));
    reply.insert("codeName".to_string(), json!(error.code_name()));
    if let Error::RebuildIncomplete {
        recreated, total, ..
    } = error
    {
        reply.insert("nIndexesRecreated".to_string(), json!(recreated));
        reply.insert("nIndexesExpected".to_string(), json!(total));
    }
    Value::Object(reply)
}

/// Routes command documents to the coordinator
pub struct CommandDispatcher {
    coordinator: Arc<IndexLifecycleCoordinator>,
}

impl CommandDispatcher {
    pub fn new(coordinator: Arc<IndexLifecycleCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Run a command and return its reply document; failures become `ok: 0` replies
    pub async fn run(&self, db: &str, document: &Value) -> Value {
        match self.execute(db, document).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(db, "Command failed: {e}");
                failure_reply(&e)
            }
        }
    }

    pub async fn execute(&self, db: &str, document: &Value) -> Result<Value> {
        match IndexCommand::parse(db, document)? {
            IndexCommand::DropIndexes {
                namespace,
                selector,
            } => {
                let outcome = self.coordinator.drop_indexes(&namespace, &selector).await?;
                Ok(success_reply(outcome))
            }
            IndexCommand::ReIndex { namespace } => {
                let outcome = self.coordinator.reindex(&namespace).await?;
                Ok(success_reply(outcome))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexward_core::KeyPattern;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_drop_forms() {
        let cmd = IndexCommand::parse("app", &json!({"dropIndexes": "users", "index": "*"}))
            .unwrap();
        assert_eq!(
            cmd,
            IndexCommand::DropIndexes {
                namespace: "app.users".parse().unwrap(),
                selector: DropSelector::All,
            }
        );

        let cmd =
            IndexCommand::parse("app", &json!({"deleteIndexes": "users", "index": {"age": 1}}))
                .unwrap();
        assert_eq!(
            cmd,
            IndexCommand::DropIndexes {
                namespace: "app.users".parse().unwrap(),
                selector: DropSelector::KeyPattern(KeyPattern::new().ascending("age")),
            }
        );
    }

    #[test]
    fn test_parse_reindex() {
        let cmd = IndexCommand::parse("app", &json!({"reIndex": "users"})).unwrap();
        assert_eq!(
            cmd,
            IndexCommand::ReIndex {
                namespace: "app.users".parse().unwrap()
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        let err = IndexCommand::parse("app", &json!({"dropIndexes": "users"})).unwrap_err();
        assert!(matches!(err, Error::InvalidIndexSpec(_)));

        let err =
            IndexCommand::parse("app", &json!({"dropIndexes": "users", "index": 3})).unwrap_err();
        assert!(matches!(err, Error::InvalidIndexSpec(_)));

        let err = IndexCommand::parse("app", &json!({"reIndex": 5})).unwrap_err();
        assert!(matches!(err, Error::InvalidNamespace(_)));

        let err = IndexCommand::parse("app", &json!({"compact": "users"})).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand(ref c) if c == "compact"));

        assert!(IndexCommand::parse("app", &json!([])).is_err());
        assert!(IndexCommand::parse("app", &json!({})).is_err());
    }

    #[test]
    fn test_failure_reply_for_incomplete_rebuild() {
        let reply = failure_reply(&Error::RebuildIncomplete {
            recreated: 2,
            total: 5,
            source: Box::new(Error::catalog_mutation("boom")),
        });
        assert_eq!(reply["ok"], json!(0));
        assert_eq!(reply["nIndexesRecreated"], json!(2));
        assert_eq!(reply["nIndexesExpected"], json!(5));
        assert_eq!(reply["codeName"], json!("CannotCreateIndex"));
    }
}
