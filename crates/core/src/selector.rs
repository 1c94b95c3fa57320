//! Drop targets supplied by callers of `dropIndexes`

use crate::descriptor::KeyPattern;
use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

/// Wildcard spelling that selects every non-identity index
pub const DROP_ALL: &str = "*";

/// Which index or indexes a drop request targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropSelector {
    /// Every index except the identity index
    All,
    Name(String),
    KeyPattern(KeyPattern),
}

impl DropSelector {
    /// Parse the `index` field of a drop request
    ///
    /// Strings select by name (`"*"` selects all); objects select by key pattern.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) if s == DROP_ALL => Ok(Self::All),
            Value::String(s) => Ok(Self::Name(s.clone())),
            Value::Object(_) => KeyPattern::from_json(value)
                .map(Self::KeyPattern)
                .ok_or_else(|| Error::invalid_index_spec(value.to_string())),
            other => Err(Error::invalid_index_spec(other.to_string())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::All => Value::from(DROP_ALL),
            Self::Name(name) => Value::from(name.as_str()),
            Self::KeyPattern(pattern) => pattern.to_json(),
        }
    }
}

impl fmt::Display for DropSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{DROP_ALL}"),
            Self::Name(name) => write!(f, "{name}"),
            Self::KeyPattern(pattern) => write!(f, "{pattern}"),
        }
    }
}
