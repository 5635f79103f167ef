//! Foreign type descriptors.
//!
//! A [`LogicalType`] is the engine-side type of a scalar function parameter or
//! result. Composite descriptors are only obtainable through the validating
//! constructors [`StructEntry::new`], [`LogicalType::structure`] and
//! [`LogicalType::map`], so every STRUCT has at least one field and unique
//! field names.

use std::fmt;

use crate::error::BuildError;

/// A foreign (engine-side) type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Integer,
    UInteger,
    BigInt,
    UBigInt,
    Float,
    Double,
    Varchar,
    Boolean,
    Blob,
    Timestamp,
    Struct(StructType),
    Map(MapType),
}

impl LogicalType {
    /// Build a STRUCT descriptor from ordered entries.
    ///
    /// Fails when `entries` is empty or two entries share a name.
    pub fn structure(entries: Vec<StructEntry>) -> Result<Self, BuildError> {
        if entries.is_empty() {
            return Err(BuildError::InvalidStructEntry {
                reason: "a STRUCT requires at least one field".to_string(),
            });
        }

        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|prev| prev.name == entry.name) {
                return Err(BuildError::DuplicateStructField {
                    name: entry.name.clone(),
                });
            }
        }

        Ok(LogicalType::Struct(StructType { entries }))
    }

    /// Build a MAP descriptor.
    pub fn map(key: LogicalType, value: LogicalType) -> Self {
        LogicalType::Map(MapType {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    /// The type name without parameters (`STRUCT`, `MAP`, `INTEGER`, ...).
    pub fn id(&self) -> &'static str {
        match self {
            LogicalType::Integer => "INTEGER",
            LogicalType::UInteger => "UINTEGER",
            LogicalType::BigInt => "BIGINT",
            LogicalType::UBigInt => "UBIGINT",
            LogicalType::Float => "FLOAT",
            LogicalType::Double => "DOUBLE",
            LogicalType::Varchar => "VARCHAR",
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Blob => "BLOB",
            LogicalType::Timestamp => "TIMESTAMP",
            LogicalType::Struct(_) => "STRUCT",
            LogicalType::Map(_) => "MAP",
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            LogicalType::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapType> {
        match self {
            LogicalType::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Struct(s) => {
                write!(f, "STRUCT(")?;
                for (i, entry) in s.entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", entry.name, entry.ty)?;
                }
                write!(f, ")")
            }
            LogicalType::Map(m) => write!(f, "MAP({}, {})", m.key, m.value),
            other => f.write_str(other.id()),
        }
    }
}

/// A named field of a STRUCT descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructEntry {
    name: String,
    ty: LogicalType,
}

impl StructEntry {
    /// Create an entry. The name must be non-empty.
    pub fn new(name: impl Into<String>, ty: LogicalType) -> Result<Self, BuildError> {
        let name = name.into();
        if name.is_empty() {
            return Err(BuildError::InvalidStructEntry {
                reason: format!("empty field name for {ty}"),
            });
        }
        Ok(Self { name, ty })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logical_type(&self) -> &LogicalType {
        &self.ty
    }
}

/// Ordered fields of a STRUCT descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructType {
    entries: Vec<StructEntry>,
}

impl StructType {
    pub fn entries(&self) -> &[StructEntry] {
        &self.entries
    }

    pub fn field(&self, name: &str) -> Option<&LogicalType> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.ty)
    }
}

/// Key and value descriptors of a MAP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapType {
    key: Box<LogicalType>,
    value: Box<LogicalType>,
}

impl MapType {
    pub fn key(&self) -> &LogicalType {
        &self.key
    }

    pub fn value(&self) -> &LogicalType {
        &self.value
    }
}
