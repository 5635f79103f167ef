//! Value conversion between the foreign and host models.
//!
//! - [`convert_value`]: foreign [`Value`] into a [`HostValue`] of an exact host type
//! - [`host_to_value`]: host result back into a foreign [`Value`]
//! - [`zero_value`]: the zero value of a host type
//!
//! ## Conversion Rules
//!
//! - NULL becomes `Nil` for pointer, slice, map, function and channel targets,
//!   `Any(Null)` for the open kind, and the zero record for record targets.
//!   Scalar and timestamp targets reject NULL.
//! - Timestamps accept micro-epoch `BIGINT`, `TIMESTAMP`, or a `VARCHAR` in one
//!   of the layouts listed in [`TIMESTAMP_FORMATS`].
//! - Any numeric value converts to any numeric host type with `as` semantics.
//! - `VARCHAR` converts to a byte slice.
//! - Non-string values never convert to `String`; numbers never convert to `bool`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ConversionError;
use crate::host_type::{HostType, RecordType};
use crate::host_value::{HostValue, RecordValue};
use crate::value::{MapValue, StructValue, Value};

/// Naive layouts tried after RFC 3339, in order. Naive values are taken as UTC.
/// The fractional seconds are optional.
pub const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Convert a foreign value into a host value of type `target`.
pub fn convert_value(value: &Value, target: &HostType) -> Result<HostValue, ConversionError> {
    if value.is_null() {
        return convert_null(target);
    }

    match target {
        HostType::Timestamp => convert_timestamp(value),
        HostType::Any => Ok(HostValue::Any(value.clone())),
        HostType::Record(record) => convert_record(value, record),
        HostType::Map(key, elem) => convert_map(value, target, key, elem),
        HostType::Pointer(elem) => {
            let inner = convert_value(value, elem).map_err(|e| ConversionError::Pointee {
                elem: elem.to_string(),
                target: target.to_string(),
                source: Box::new(e),
            })?;
            Ok(HostValue::Pointer(Box::new(inner)))
        }
        _ => convert_scalar(value, target),
    }
}

fn convert_null(target: &HostType) -> Result<HostValue, ConversionError> {
    match target {
        HostType::Pointer(_)
        | HostType::Slice(_)
        | HostType::Map(..)
        | HostType::Channel(_)
        | HostType::Function(_) => Ok(HostValue::Nil),
        HostType::Any => Ok(HostValue::Any(Value::Null)),
        HostType::Record(_) => Ok(zero_value(target)),
        _ => Err(ConversionError::NullToScalar {
            target: target.to_string(),
        }),
    }
}

/// The zero value of a host type.
///
/// Records get every exported field at its own zero value; timestamps get the
/// Unix epoch; pointers, slices, maps, channels and functions are `Nil`.
pub fn zero_value(ty: &HostType) -> HostValue {
    match ty {
        HostType::Bool => HostValue::Bool(false),
        HostType::Int8 => HostValue::Int8(0),
        HostType::Int16 => HostValue::Int16(0),
        HostType::Int32 => HostValue::Int32(0),
        HostType::Int64 => HostValue::Int64(0),
        HostType::Uint8 => HostValue::Uint8(0),
        HostType::Uint16 => HostValue::Uint16(0),
        HostType::Uint32 => HostValue::Uint32(0),
        HostType::Uint64 => HostValue::Uint64(0),
        HostType::Float32 => HostValue::Float32(0.0),
        HostType::Float64 => HostValue::Float64(0.0),
        HostType::String => HostValue::String(String::new()),
        HostType::Timestamp => HostValue::Timestamp(DateTime::<Utc>::default()),
        HostType::Any => HostValue::Any(Value::Null),
        HostType::Record(record) => {
            let mut value = RecordValue::new(record.name());
            for field in record.fields() {
                value.insert(field.name(), zero_value(field.host_type()));
            }
            HostValue::Record(value)
        }
        HostType::Slice(_)
        | HostType::Map(..)
        | HostType::Pointer(_)
        | HostType::Channel(_)
        | HostType::Function(_) => HostValue::Nil,
    }
}

// ============================================================================
// Timestamps
// ============================================================================

fn convert_timestamp(value: &Value) -> Result<HostValue, ConversionError> {
    match value {
        Value::BigInt(micros) => DateTime::from_timestamp_micros(*micros)
            .map(HostValue::Timestamp)
            .ok_or(ConversionError::TimestampRange { micros: *micros }),
        Value::Timestamp(ts) => Ok(HostValue::Timestamp(*ts)),
        Value::Varchar(text) => parse_timestamp(text)
            .map(HostValue::Timestamp)
            .ok_or_else(|| ConversionError::TimestampParse { text: text.clone() }),
        other => Err(unexpected(other, &HostType::Timestamp)),
    }
}

/// Parse a timestamp from text.
///
/// Tries RFC 3339 (with or without fractional seconds), then
/// `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD`.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Records and maps
// ============================================================================

fn convert_record(value: &Value, record: &RecordType) -> Result<HostValue, ConversionError> {
    let Value::Struct(fields) = value else {
        return Err(unexpected(value, &HostType::Record(record.clone())));
    };

    let mut out = RecordValue::new(record.name());
    for field in record.fields() {
        let source = fields
            .get(field.name())
            .ok_or_else(|| ConversionError::MissingField {
                field: field.name().to_string(),
                record: record.name().to_string(),
            })?;
        let converted = convert_value(source, field.host_type()).map_err(|e| ConversionError::Field {
            field: field.name().to_string(),
            record: record.name().to_string(),
            source: Box::new(e),
        })?;
        out.insert(field.name(), converted);
    }
    Ok(HostValue::Record(out))
}

fn convert_map(
    value: &Value,
    target: &HostType,
    key_type: &HostType,
    elem_type: &HostType,
) -> Result<HostValue, ConversionError> {
    let Value::Map(entries) = value else {
        return Err(unexpected(value, target));
    };

    // Keys first, so a bad key is reported even when an earlier value is also bad.
    let mut keys = Vec::with_capacity(entries.len());
    for key in entries.keys() {
        let converted = convert_value(key, key_type).map_err(|e| ConversionError::MapKey {
            map: target.to_string(),
            source: Box::new(e),
        })?;
        if !conforms_to(&converted, key_type) {
            return Err(ConversionError::KeyNotAssignable {
                key: key.to_string(),
                foreign: key.type_name(),
                target: key_type.to_string(),
            });
        }
        keys.push(converted);
    }

    let mut out = Vec::with_capacity(entries.len());
    for (key, (source_key, elem)) in keys.into_iter().zip(entries.iter()) {
        let converted = convert_value(elem, elem_type).map_err(|e| ConversionError::MapValue {
            key: source_key.to_string(),
            map: target.to_string(),
            source: Box::new(e),
        })?;
        out.push((key, converted));
    }
    Ok(HostValue::Map(out))
}

/// Check whether a host value may be stored in a slot of type `ty`.
pub fn conforms_to(value: &HostValue, ty: &HostType) -> bool {
    match (value, ty) {
        (HostValue::Nil, HostType::Pointer(_))
        | (HostValue::Nil, HostType::Slice(_))
        | (HostValue::Nil, HostType::Map(..))
        | (HostValue::Nil, HostType::Channel(_))
        | (HostValue::Nil, HostType::Function(_)) => true,
        (HostValue::Bool(_), HostType::Bool)
        | (HostValue::Int8(_), HostType::Int8)
        | (HostValue::Int16(_), HostType::Int16)
        | (HostValue::Int32(_), HostType::Int32)
        | (HostValue::Int64(_), HostType::Int64)
        | (HostValue::Uint8(_), HostType::Uint8)
        | (HostValue::Uint16(_), HostType::Uint16)
        | (HostValue::Uint32(_), HostType::Uint32)
        | (HostValue::Uint64(_), HostType::Uint64)
        | (HostValue::Float32(_), HostType::Float32)
        | (HostValue::Float64(_), HostType::Float64)
        | (HostValue::String(_), HostType::String)
        | (HostValue::Timestamp(_), HostType::Timestamp)
        | (HostValue::Any(_), HostType::Any) => true,
        (HostValue::Bytes(_), HostType::Slice(elem)) => **elem == HostType::Uint8,
        (HostValue::Slice(items), HostType::Slice(elem)) => items.iter().all(|i| conforms_to(i, elem)),
        (HostValue::Map(entries), HostType::Map(k, v)) => entries
            .iter()
            .all(|(key, val)| conforms_to(key, k) && conforms_to(val, v)),
        (HostValue::Pointer(inner), HostType::Pointer(elem)) => conforms_to(inner, elem),
        (HostValue::Record(r), HostType::Record(t)) => {
            r.name() == t.name()
                && t.fields()
                    .iter()
                    .all(|f| r.get(f.name()).is_some_and(|v| conforms_to(v, f.host_type())))
        }
        (HostValue::Function(f), HostType::Function(t)) => f.function_type() == t,
        _ => false,
    }
}

// ============================================================================
// Scalars
// ============================================================================

macro_rules! cast_numeric {
    ($value:expr, $ty:ty) => {
        match $value {
            Value::TinyInt(v) => Some(*v as $ty),
            Value::SmallInt(v) => Some(*v as $ty),
            Value::Integer(v) => Some(*v as $ty),
            Value::BigInt(v) => Some(*v as $ty),
            Value::UTinyInt(v) => Some(*v as $ty),
            Value::USmallInt(v) => Some(*v as $ty),
            Value::UInteger(v) => Some(*v as $ty),
            Value::UBigInt(v) => Some(*v as $ty),
            Value::Float(v) => Some(*v as $ty),
            Value::Double(v) => Some(*v as $ty),
            _ => None,
        }
    };
}

fn convert_scalar(value: &Value, target: &HostType) -> Result<HostValue, ConversionError> {
    let converted = match target {
        HostType::Int8 => cast_numeric!(value, i8).map(HostValue::Int8),
        HostType::Int16 => cast_numeric!(value, i16).map(HostValue::Int16),
        HostType::Int32 => cast_numeric!(value, i32).map(HostValue::Int32),
        HostType::Int64 => cast_numeric!(value, i64).map(HostValue::Int64),
        HostType::Uint8 => cast_numeric!(value, u8).map(HostValue::Uint8),
        HostType::Uint16 => cast_numeric!(value, u16).map(HostValue::Uint16),
        HostType::Uint32 => cast_numeric!(value, u32).map(HostValue::Uint32),
        HostType::Uint64 => cast_numeric!(value, u64).map(HostValue::Uint64),
        HostType::Float32 => cast_numeric!(value, f32).map(HostValue::Float32),
        HostType::Float64 => cast_numeric!(value, f64).map(HostValue::Float64),

        HostType::String => match value {
            Value::Varchar(s) => Some(HostValue::String(s.clone())),
            other if other.is_numeric() => {
                return Err(ConversionError::NumericToString {
                    foreign: other.type_name(),
                    value: other.to_string(),
                });
            }
            _ => None,
        },

        HostType::Bool => match value {
            Value::Boolean(b) => Some(HostValue::Bool(*b)),
            other if other.is_numeric() => {
                return Err(ConversionError::NumericToBool {
                    foreign: other.type_name(),
                    value: other.to_string(),
                });
            }
            _ => None,
        },

        HostType::Slice(elem) if **elem == HostType::Uint8 => match value {
            Value::Blob(bytes) => Some(HostValue::Bytes(bytes.clone())),
            Value::Varchar(s) => Some(HostValue::Bytes(s.as_bytes().to_vec())),
            _ => None,
        },

        _ => None,
    };

    converted.ok_or_else(|| unexpected(value, target))
}

fn unexpected(value: &Value, target: &HostType) -> ConversionError {
    ConversionError::UnexpectedSource {
        foreign: value.type_name(),
        value: value.to_string(),
        target: target.to_string(),
    }
}

// ============================================================================
// Results
// ============================================================================

/// Convert a host value into its foreign representation.
///
/// Signed 8/16/32-bit integers widen to `INTEGER`, unsigned ones to
/// `UINTEGER`; a byte slice becomes a `BLOB`; a record becomes a `STRUCT`
/// of its fields; a map is copied entry by entry into a [`MapValue`].
pub fn host_to_value(value: HostValue) -> Result<Value, ConversionError> {
    Ok(match value {
        HostValue::Nil => Value::Null,
        HostValue::Bool(v) => Value::Boolean(v),
        HostValue::Int8(v) => Value::Integer(v as i32),
        HostValue::Int16(v) => Value::Integer(v as i32),
        HostValue::Int32(v) => Value::Integer(v),
        HostValue::Int64(v) => Value::BigInt(v),
        HostValue::Uint8(v) => Value::UInteger(v as u32),
        HostValue::Uint16(v) => Value::UInteger(v as u32),
        HostValue::Uint32(v) => Value::UInteger(v),
        HostValue::Uint64(v) => Value::UBigInt(v),
        HostValue::Float32(v) => Value::Float(v),
        HostValue::Float64(v) => Value::Double(v),
        HostValue::String(v) => Value::Varchar(v),
        HostValue::Bytes(v) => Value::Blob(v),
        HostValue::Slice(items) => Value::Blob(
            items
                .into_iter()
                .map(|item| match item {
                    HostValue::Uint8(b) => Ok(b),
                    other => Err(ConversionError::UnsupportedResult {
                        kind: other.kind_name(),
                    }),
                })
                .collect::<Result<Vec<u8>, _>>()?,
        ),
        HostValue::Map(entries) => {
            let mut map = MapValue::with_capacity(entries.len());
            for (k, v) in entries {
                map.push(host_to_value(k)?, host_to_value(v)?);
            }
            Value::Map(map)
        }
        HostValue::Pointer(inner) => host_to_value(*inner)?,
        HostValue::Record(record) => {
            let mut fields = StructValue::new();
            for (name, field) in record {
                fields.insert(name, host_to_value(field)?);
            }
            Value::Struct(fields)
        }
        HostValue::Timestamp(ts) => Value::Timestamp(ts),
        HostValue::Any(v) => v,
        HostValue::Function(_) => {
            return Err(ConversionError::UnsupportedResult { kind: "function" });
        }
    })
}

/// Render call arguments for diagnostics: `5 (INTEGER), NULL, ...`.
pub fn describe_arguments(args: &[Value]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&arg.describe());
    }
    out
}
