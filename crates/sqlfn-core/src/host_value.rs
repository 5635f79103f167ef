//! Host-side tagged values.
//!
//! [`HostValue`] is the uniform currency between the conversion layer and the
//! host function adapters. Its tags mirror [`HostType`](crate::HostType); `Nil`
//! stands for an absent pointer, slice, map, channel or function.

use chrono::{DateTime, Utc};

use crate::function::HostFunction;
use crate::value::Value;

/// A host value tagged by its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Nil,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    /// Compact form of a `u8` slice
    Bytes(Vec<u8>),
    Slice(Vec<HostValue>),
    Map(Vec<(HostValue, HostValue)>),
    Pointer(Box<HostValue>),
    Record(RecordValue),
    Timestamp(DateTime<Utc>),
    Any(Value),
    Function(HostFunction),
}

impl HostValue {
    /// Short name of this value's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            HostValue::Nil => "nil",
            HostValue::Bool(_) => "bool",
            HostValue::Int8(_) => "i8",
            HostValue::Int16(_) => "i16",
            HostValue::Int32(_) => "i32",
            HostValue::Int64(_) => "i64",
            HostValue::Uint8(_) => "u8",
            HostValue::Uint16(_) => "u16",
            HostValue::Uint32(_) => "u32",
            HostValue::Uint64(_) => "u64",
            HostValue::Float32(_) => "f32",
            HostValue::Float64(_) => "f64",
            HostValue::String(_) => "String",
            HostValue::Bytes(_) => "bytes",
            HostValue::Slice(_) => "slice",
            HostValue::Map(_) => "map",
            HostValue::Pointer(_) => "pointer",
            HostValue::Record(_) => "record",
            HostValue::Timestamp(_) => "timestamp",
            HostValue::Any(_) => "any",
            HostValue::Function(_) => "function",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, HostValue::Nil)
    }
}

/// Field values of a record, keyed by field name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordValue {
    name: String,
    fields: Vec<(String, HostValue)>,
}

impl RecordValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Name of the record type this value belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a field, replacing an existing field of the same name.
    pub fn insert(&mut self, field: impl Into<String>, value: HostValue) {
        let field = field.into();
        match self.fields.iter_mut().find(|(n, _)| *n == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, field: impl Into<String>, value: HostValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&HostValue> {
        self.fields.iter().find(|(n, _)| n == field).map(|(_, v)| v)
    }

    /// Remove a field and return its value.
    pub fn take(&mut self, field: &str) -> Option<HostValue> {
        let index = self.fields.iter().position(|(n, _)| n == field)?;
        Some(self.fields.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HostValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl IntoIterator for RecordValue {
    type Item = (String, HostValue);
    type IntoIter = std::vec::IntoIter<(String, HostValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
