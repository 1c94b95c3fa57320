//! Fully qualified collection names (`<db>.<collection>`)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `<db>.<collection>` pair identifying one collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace {
    db: String,
    collection: String,
}

impl Namespace {
    /// Build a namespace from its two parts
    pub fn new(db: impl Into<String>, collection: impl Into<String>) -> Result<Self> {
        let db = db.into();
        let collection = collection.into();
        if db.is_empty() || db.contains('.') {
            return Err(Error::InvalidNamespace(format!(
                "invalid database name '{db}'"
            )));
        }
        if collection.is_empty() {
            return Err(Error::InvalidNamespace(format!(
                "{db}.: collection name cannot be empty"
            )));
        }
        Ok(Self { db, collection })
    }

    pub fn db(&self) -> &str {
        &self.db
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((db, collection)) => Self::new(db, collection),
            None => Err(Error::InvalidNamespace(format!(
                "'{s}' is missing a '.' between database and collection"
            ))),
        }
    }
}

impl TryFrom<String> for Namespace {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.to_string()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.collection)
    }
}
