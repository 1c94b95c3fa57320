//! Index descriptors: the metadata record for one index
//!
//! A descriptor carries the index name, its ordered key pattern and an opaque set of
//! build options. The physical structure of the index lives in the storage engine and
//! is never described here.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Reserved name of the identity index
pub const IDENTITY_INDEX_NAME: &str = "_id_";

/// Field covered by the identity index
pub const IDENTITY_FIELD: &str = "_id";

/// Option key holding the on-disk index format version
pub const INDEX_VERSION_OPTION: &str = "v";

/// Sort direction (or special index kind) of one key field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
    /// Non-ordered index kinds such as `"hashed"` or `"text"`
    Special(String),
}

impl Direction {
    fn to_value(&self) -> Value {
        match self {
            Self::Ascending => Value::from(1),
            Self::Descending => Value::from(-1),
            Self::Special(kind) => Value::from(kind.as_str()),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            // Only unit magnitudes are ordered directions
            Value::Number(n) => match n.as_f64()? {
                d if d == 1.0 => Some(Self::Ascending),
                d if d == -1.0 => Some(Self::Descending),
                _ => None,
            },
            Value::String(kind) => Some(Self::Special(kind.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "1"),
            Self::Descending => write!(f, "-1"),
            Self::Special(kind) => write!(f, "{kind}"),
        }
    }
}

/// Ordered mapping of field name to direction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPattern(Vec<(String, Direction)>);

impl KeyPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, builder style
    pub fn field(mut self, name: impl Into<String>, direction: Direction) -> Self {
        self.0.push((name.into(), direction));
        self
    }

    pub fn ascending(self, name: impl Into<String>) -> Self {
        self.field(name, Direction::Ascending)
    }

    pub fn descending(self, name: impl Into<String>) -> Self {
        self.field(name, Direction::Descending)
    }

    pub fn fields(&self) -> &[(String, Direction)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key pattern of the identity index, `{ _id: 1 }`
    pub fn identity() -> Self {
        Self::new().ascending(IDENTITY_FIELD)
    }

    /// Name an index gets when none is supplied: `field_dir` pairs joined by `_`
    pub fn default_index_name(&self) -> String {
        self.0
            .iter()
            .map(|(field, dir)| format!("{field}_{dir}"))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Parse from a JSON object, preserving field order
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut fields = Vec::with_capacity(object.len());
        for (name, dir) in object {
            fields.push((name.clone(), Direction::from_value(dir)?));
        }
        Some(Self(fields))
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(field, dir)| (field.clone(), dir.to_value()))
            .collect();
        Value::Object(map)
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "{{}}");
        }
        let body = self
            .0
            .iter()
            .map(|(field, dir)| match dir {
                Direction::Special(kind) => format!("{field}: \"{kind}\""),
                _ => format!("{field}: {dir}"),
            })
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{ {body} }}")
    }
}

impl Serialize for KeyPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, dir) in &self.0 {
            map.serialize_entry(field, &dir.to_value())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for KeyPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyPatternVisitor;

        impl<'de> Visitor<'de> for KeyPatternVisitor {
            type Value = KeyPattern;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping field names to 1, -1 or an index kind")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<KeyPattern, A::Error> {
                let mut fields = Vec::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    let dir = Direction::from_value(&value).ok_or_else(|| {
                        serde::de::Error::custom(format!(
                            "invalid direction for key field '{name}': {value}"
                        ))
                    })?;
                    fields.push((name, dir));
                }
                Ok(KeyPattern(fields))
            }
        }

        deserializer.deserialize_map(KeyPatternVisitor)
    }
}

/// Metadata record describing one index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub name: String,
    #[serde(rename = "key")]
    pub key_pattern: KeyPattern,
    /// Opaque build-time flags (`unique`, `sparse`, `background`, `v`, ...)
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl IndexDescriptor {
    /// Descriptor named after its key pattern
    pub fn new(key_pattern: KeyPattern) -> Self {
        Self {
            name: key_pattern.default_index_name(),
            key_pattern,
            options: Map::new(),
        }
    }

    pub fn named(name: impl Into<String>, key_pattern: KeyPattern) -> Self {
        Self {
            name: name.into(),
            key_pattern,
            options: Map::new(),
        }
    }

    /// The identity index every catalog starts with
    pub fn identity() -> Self {
        Self::named(IDENTITY_INDEX_NAME, KeyPattern::identity())
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn is_identity(&self) -> bool {
        self.name == IDENTITY_INDEX_NAME
    }

    /// Copy without the format version option, so a rebuild writes the current version
    pub fn without_version(&self) -> Self {
        let mut copy = self.clone();
        copy.options.remove(INDEX_VERSION_OPTION);
        copy
    }
}
