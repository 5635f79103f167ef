//! Host-side type descriptors.
//!
//! [`HostType`] describes the shape of a Rust value as it crosses into or out of
//! a scalar function. It is a closed set of kinds: every conversion and every
//! signature mapping dispatches on the tag rather than on the concrete Rust type.

use std::fmt;

/// The host-side type of a parameter, result, field, key or element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    /// Growable sequence (`Vec<T>`, `Variadic<T>`)
    Slice(Box<HostType>),
    /// Key/value map (`HashMap<K, V>`)
    Map(Box<HostType>, Box<HostType>),
    /// Single-level nullable indirection (`Option<T>`)
    Pointer(Box<HostType>),
    /// Named struct with exported fields
    Record(RecordType),
    /// UTC instant (`DateTime<Utc>`)
    Timestamp,
    /// Open/dynamic kind holding any foreign value
    Any,
    /// Channel of values; never mappable, only nullable
    Channel(Box<HostType>),
    /// A function value
    Function(FunctionType),
}

impl HostType {
    pub fn slice(elem: HostType) -> Self {
        HostType::Slice(Box::new(elem))
    }

    pub fn map(key: HostType, value: HostType) -> Self {
        HostType::Map(Box::new(key), Box::new(value))
    }

    pub fn pointer(elem: HostType) -> Self {
        HostType::Pointer(Box::new(elem))
    }

    /// Short name of this type's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            HostType::Bool => "bool",
            HostType::Int8
            | HostType::Int16
            | HostType::Int32
            | HostType::Int64
            | HostType::Uint8
            | HostType::Uint16
            | HostType::Uint32
            | HostType::Uint64 => "integer",
            HostType::Float32 | HostType::Float64 => "float",
            HostType::String => "string",
            HostType::Slice(_) => "slice",
            HostType::Map(..) => "map",
            HostType::Pointer(_) => "pointer",
            HostType::Record(_) => "record",
            HostType::Timestamp => "timestamp",
            HostType::Any => "any",
            HostType::Channel(_) => "channel",
            HostType::Function(_) => "function",
        }
    }

    /// Check if this is an integer or floating point type.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            HostType::Int8
                | HostType::Int16
                | HostType::Int32
                | HostType::Int64
                | HostType::Uint8
                | HostType::Uint16
                | HostType::Uint32
                | HostType::Uint64
                | HostType::Float32
                | HostType::Float64
        )
    }

    /// Check if this is a numeric, string or bool type.
    pub fn is_basic_scalar(&self) -> bool {
        self.is_numeric() || matches!(self, HostType::String | HostType::Bool)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Bool => f.write_str("bool"),
            HostType::Int8 => f.write_str("i8"),
            HostType::Int16 => f.write_str("i16"),
            HostType::Int32 => f.write_str("i32"),
            HostType::Int64 => f.write_str("i64"),
            HostType::Uint8 => f.write_str("u8"),
            HostType::Uint16 => f.write_str("u16"),
            HostType::Uint32 => f.write_str("u32"),
            HostType::Uint64 => f.write_str("u64"),
            HostType::Float32 => f.write_str("f32"),
            HostType::Float64 => f.write_str("f64"),
            HostType::String => f.write_str("String"),
            HostType::Slice(elem) => write!(f, "Vec<{elem}>"),
            HostType::Map(k, v) => write!(f, "HashMap<{k}, {v}>"),
            HostType::Pointer(elem) => write!(f, "Option<{elem}>"),
            HostType::Record(r) => f.write_str(&r.name),
            HostType::Timestamp => f.write_str("DateTime<Utc>"),
            HostType::Any => f.write_str("Value"),
            HostType::Channel(elem) => write!(f, "Channel<{elem}>"),
            HostType::Function(func) => write!(f, "{func}"),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Descriptor of a record (a named struct).
///
/// Only exported fields are listed; they are the fields that become STRUCT
/// entries and that are filled from a STRUCT value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordType {
    name: String,
    path: String,
    fields: Vec<RecordField>,
}

impl RecordType {
    /// Create a record descriptor.
    ///
    /// `path` is the fully qualified identity of the type and distinguishes
    /// records that share a short name.
    pub fn new(name: impl Into<String>, path: impl Into<String>, fields: Vec<RecordField>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Exported fields in declaration order.
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An exported record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordField {
    name: String,
    ty: HostType,
}

impl RecordField {
    pub fn new(name: impl Into<String>, ty: HostType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host_type(&self) -> &HostType {
        &self.ty
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Descriptor of a function: ordered parameter types, result types, and
/// whether the trailing parameter collects variadic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    params: Vec<HostType>,
    results: Vec<HostType>,
    variadic: bool,
}

impl FunctionType {
    /// Create a function descriptor.
    ///
    /// When `variadic` is set the last parameter is expected to be a
    /// `Slice`; that is checked when a signature is derived, not here.
    pub fn new(params: Vec<HostType>, results: Vec<HostType>, variadic: bool) -> Self {
        Self {
            params,
            results,
            variadic,
        }
    }

    /// All formal parameters, including the trailing variadic slice.
    pub fn params(&self) -> &[HostType] {
        &self.params
    }

    pub fn results(&self) -> &[HostType] {
        &self.results
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match param {
                HostType::Slice(elem) if self.variadic && i == last => write!(f, "...{elem}")?,
                other => write!(f, "{other}")?,
            }
        }
        write!(f, ")")?;

        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {single}"),
            many => {
                write!(f, " -> (")?;
                for (i, result) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{result}")?;
                }
                write!(f, ")")
            }
        }
    }
}
