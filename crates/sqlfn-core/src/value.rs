//! Foreign runtime values.
//!
//! [`Value`] is the dynamically-typed value model of the query engine: what a
//! scalar function receives per row and what it hands back. STRUCT values keep
//! their fields in declaration order ([`StructValue`]) and MAP values are an
//! ordered list of key/value pairs ([`MapValue`]), the engine-native map form.

use std::fmt;

use chrono::{DateTime, Utc};

/// A value in the query engine's runtime representation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    UTinyInt(u8),
    USmallInt(u16),
    UInteger(u32),
    UBigInt(u64),
    Float(f32),
    Double(f64),
    Varchar(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Struct(StructValue),
    Map(MapValue),
}

impl Value {
    /// Name of the foreign type of this value, as the engine spells it.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::TinyInt(_) => "TINYINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Integer(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::UTinyInt(_) => "UTINYINT",
            Value::USmallInt(_) => "USMALLINT",
            Value::UInteger(_) => "UINTEGER",
            Value::UBigInt(_) => "UBIGINT",
            Value::Float(_) => "FLOAT",
            Value::Double(_) => "DOUBLE",
            Value::Varchar(_) => "VARCHAR",
            Value::Blob(_) => "BLOB",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::Struct(_) => "STRUCT",
            Value::Map(_) => "MAP",
        }
    }

    /// Check if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is an integer or floating point number.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::TinyInt(_)
                | Value::SmallInt(_)
                | Value::Integer(_)
                | Value::BigInt(_)
                | Value::UTinyInt(_)
                | Value::USmallInt(_)
                | Value::UInteger(_)
                | Value::UBigInt(_)
                | Value::Float(_)
                | Value::Double(_)
        )
    }

    /// Render this value for diagnostics as `<value> (<TYPE>)`, or `NULL`.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            other => format!("{} ({})", other, other.type_name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::TinyInt(v) => write!(f, "{v}"),
            Value::SmallInt(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::UTinyInt(v) => write!(f, "{v}"),
            Value::USmallInt(v) => write!(f, "{v}"),
            Value::UInteger(v) => write!(f, "{v}"),
            Value::UBigInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Varchar(v) => write!(f, "{v}"),
            Value::Blob(bytes) => {
                for byte in bytes {
                    write!(f, "\\x{byte:02X}")?;
                }
                Ok(())
            }
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Struct(fields) => write!(f, "{fields}"),
            Value::Map(map) => write!(f, "{map}"),
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_value_from!(
    bool => Boolean,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Integer,
    i64 => BigInt,
    u8 => UTinyInt,
    u16 => USmallInt,
    u32 => UInteger,
    u64 => UBigInt,
    f32 => Float,
    f64 => Double,
    String => Varchar,
    Vec<u8> => Blob,
    DateTime<Utc> => Timestamp,
    StructValue => Struct,
    MapValue => Map,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Varchar(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ============================================================================
// STRUCT values
// ============================================================================

/// Named fields of a STRUCT value, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an existing field of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StructValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut value = StructValue::new();
        for (name, field) in iter {
            value.insert(name, field);
        }
        value
    }
}

impl IntoIterator for StructValue {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl fmt::Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{name}': {value}")?;
        }
        write!(f, "}}")
    }
}

// ============================================================================
// MAP values
// ============================================================================

/// Engine-native MAP value: an ordered list of key/value pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append an entry. Keys are not deduplicated.
    pub fn push(&mut self, key: impl Into<Value>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    /// Value of the first entry whose key equals `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for MapValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for MapValue {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        write!(f, "}}")
    }
}
