//! Signature derivation.
//!
//! Walks a function's [`HostType`] and produces the foreign type descriptors the
//! engine needs to register it: one [`LogicalType`] per fixed parameter, an
//! optional descriptor for the variadic element type, and the result type.
//!
//! ## Mapping
//!
//! | Host type                    | Foreign type      |
//! |------------------------------|-------------------|
//! | `i8`, `i16`, `i32`           | `INTEGER`         |
//! | `i64`                        | `BIGINT`          |
//! | `u8`, `u16`, `u32`           | `UINTEGER`        |
//! | `u64`                        | `UBIGINT`         |
//! | `f32` / `f64`                | `FLOAT` / `DOUBLE`|
//! | `String`                     | `VARCHAR`         |
//! | `bool`                       | `BOOLEAN`         |
//! | `Vec<u8>`                    | `BLOB`            |
//! | `DateTime<Utc>`              | `TIMESTAMP`       |
//! | record                       | `STRUCT(...)`     |
//! | `HashMap<K, V>`              | `MAP(K, V)`       |
//! | `Option<T>`                  | mapping of `T`    |

use tracing::debug;

use crate::error::BuildError;
use crate::host_type::{HostType, RecordType};
use crate::logical_type::{LogicalType, StructEntry};

/// The derived foreign signature of a host function.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Host types of all formal parameters; the last is a `Slice` when variadic.
    pub param_types: Vec<HostType>,
    /// Host type of the single result.
    pub return_type: HostType,
    pub variadic: bool,
    /// One descriptor per fixed (non-variadic) parameter.
    pub input_types: Vec<LogicalType>,
    /// Descriptor of the variadic element type, if variadic.
    pub variadic_type: Option<LogicalType>,
    pub result_type: LogicalType,
}

impl Signature {
    /// Number of fixed parameters.
    pub fn fixed_count(&self) -> usize {
        self.input_types.len()
    }

    /// Host types of the fixed parameters.
    pub fn fixed_param_types(&self) -> &[HostType] {
        &self.param_types[..self.fixed_count()]
    }

    /// Host element type of the variadic tail.
    pub fn variadic_element(&self) -> Option<&HostType> {
        if !self.variadic {
            return None;
        }
        match self.param_types.last() {
            Some(HostType::Slice(elem)) => Some(elem.as_ref()),
            _ => None,
        }
    }
}

/// Derive the foreign signature of a function type.
///
/// Fails if `ty` is not a function, does not return exactly one value, is
/// variadic without a trailing slice parameter, or uses a type with no
/// foreign counterpart.
pub fn derive_signature(ty: &HostType) -> Result<Signature, BuildError> {
    let HostType::Function(func) = ty else {
        return Err(BuildError::NotAFunction {
            ty: ty.to_string(),
            kind: ty.kind_name(),
        });
    };
    let function = func.to_string();

    let [return_type] = func.results() else {
        return Err(BuildError::ResultCount {
            function,
            count: func.results().len(),
        });
    };

    let params = func.params();
    let (fixed, variadic_type) = if func.is_variadic() {
        let Some((last, fixed)) = params.split_last() else {
            return Err(BuildError::InvalidVariadic {
                function,
                reason: "has no arguments".to_string(),
            });
        };
        let HostType::Slice(elem) = last else {
            return Err(BuildError::InvalidVariadic {
                function,
                reason: format!("must end in a slice parameter, found {last}"),
            });
        };
        let elem_type = host_to_logical(elem).map_err(|e| BuildError::VariadicElement {
            elem: elem.to_string(),
            function: function.clone(),
            source: Box::new(e),
        })?;
        (fixed, Some(elem_type))
    } else {
        (params, None)
    };

    let input_types = fixed
        .iter()
        .enumerate()
        .map(|(index, param)| {
            host_to_logical(param).map_err(|e| BuildError::Parameter {
                index,
                ty: param.to_string(),
                function: function.clone(),
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let result_type = host_to_logical(return_type).map_err(|e| BuildError::ReturnType {
        ty: return_type.to_string(),
        function: function.clone(),
        source: Box::new(e),
    })?;

    debug!(
        function = %function,
        inputs = input_types.len(),
        variadic = variadic_type.is_some(),
        result = %result_type,
        "derived scalar function signature"
    );

    Ok(Signature {
        param_types: params.to_vec(),
        return_type: return_type.clone(),
        variadic: func.is_variadic(),
        input_types,
        variadic_type,
        result_type,
    })
}

/// Map a host type onto its foreign type descriptor.
pub fn host_to_logical(ty: &HostType) -> Result<LogicalType, BuildError> {
    match ty {
        HostType::Pointer(pointee) => match pointee.as_ref() {
            HostType::Record(_) | HostType::Map(..) | HostType::Timestamp => host_to_logical(pointee),
            scalar if scalar.is_basic_scalar() => host_to_logical(scalar),
            other => Err(BuildError::UnsupportedPointer {
                pointee: other.to_string(),
            }),
        },

        HostType::Int8 | HostType::Int16 | HostType::Int32 => Ok(LogicalType::Integer),
        HostType::Int64 => Ok(LogicalType::BigInt),
        HostType::Uint8 | HostType::Uint16 | HostType::Uint32 => Ok(LogicalType::UInteger),
        HostType::Uint64 => Ok(LogicalType::UBigInt),
        HostType::Float32 => Ok(LogicalType::Float),
        HostType::Float64 => Ok(LogicalType::Double),
        HostType::String => Ok(LogicalType::Varchar),
        HostType::Bool => Ok(LogicalType::Boolean),

        HostType::Slice(elem) => match elem.as_ref() {
            HostType::Uint8 => Ok(LogicalType::Blob),
            other => Err(BuildError::UnsupportedSliceElement {
                elem: other.to_string(),
            }),
        },

        HostType::Timestamp => Ok(LogicalType::Timestamp),
        HostType::Record(record) => record_to_logical(record),

        HostType::Map(key, value) => {
            let key_type = host_to_logical(key).map_err(|e| BuildError::MapKey {
                key: key.to_string(),
                source: Box::new(e),
            })?;
            let value_type = host_to_logical(value).map_err(|e| BuildError::MapValue {
                value: value.to_string(),
                source: Box::new(e),
            })?;
            Ok(LogicalType::map(key_type, value_type))
        }

        HostType::Any | HostType::Channel(_) | HostType::Function(_) => {
            Err(BuildError::UnsupportedType {
                ty: ty.to_string(),
                kind: ty.kind_name(),
            })
        }
    }
}

fn record_to_logical(record: &RecordType) -> Result<LogicalType, BuildError> {
    if record.fields().is_empty() {
        return Err(BuildError::NoExportedFields {
            record: record.name().to_string(),
            path: record.path().to_string(),
        });
    }

    let field_error = |field: &str, e: BuildError| BuildError::Field {
        field: field.to_string(),
        record: record.name().to_string(),
        path: record.path().to_string(),
        source: Box::new(e),
    };

    let mut entries = Vec::with_capacity(record.fields().len());
    for field in record.fields() {
        let ty = host_to_logical(field.host_type()).map_err(|e| field_error(field.name(), e))?;
        let entry = StructEntry::new(field.name(), ty).map_err(|e| field_error(field.name(), e))?;
        entries.push(entry);
    }

    LogicalType::structure(entries)
}
