//! Error types for building and invoking scalar functions.
//!
//! ## Error Hierarchy
//!
//! ```text
//! BuildError       - signature derivation and descriptor construction
//! ConversionError  - a single value crossing the host/foreign boundary
//! InvokeError      - one call of a built scalar function
//! ```
//!
//! Nested errors keep their cause as a boxed `#[source]`, and every variant that
//! wraps another includes the cause in its message, so the `Display` output of
//! the outermost error reads as the full path to the failure.

use thiserror::Error;

// ============================================================================
// Build Errors
// ============================================================================

/// Errors raised while deriving a signature or constructing a foreign type descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// The value handed to the builder is not a function.
    #[error("host type {ty} is not a function, but {kind}")]
    NotAFunction { ty: String, kind: &'static str },

    /// Scalar functions produce exactly one value.
    #[error("function ({function}) must return exactly one value, but returns {count}")]
    ResultCount { function: String, count: usize },

    /// The host type has no foreign counterpart.
    #[error("unsupported host type {ty} ({kind}) for a scalar function signature")]
    UnsupportedType { ty: String, kind: &'static str },

    /// Only byte slices map to a foreign type (BLOB).
    #[error("unsupported slice element type {elem} (only Vec<u8> maps to BLOB)")]
    UnsupportedSliceElement { elem: String },

    /// Pointers are only unwrapped when they point at a record, map, timestamp or scalar.
    #[error("unsupported pointer target type {pointee}")]
    UnsupportedPointer { pointee: String },

    /// A record needs at least one exported field to become a STRUCT.
    #[error("cannot create STRUCT from record {record} ({path}) with no exported fields")]
    NoExportedFields { record: String, path: String },

    /// A STRUCT entry or STRUCT descriptor was rejected.
    #[error("invalid struct entry: {reason}")]
    InvalidStructEntry { reason: String },

    /// Two STRUCT entries share a name.
    #[error("duplicate struct field '{name}'")]
    DuplicateStructField { name: String },

    /// A record field could not be mapped.
    #[error("error converting field '{field}' of record {record} ({path}): {source}")]
    Field {
        field: String,
        record: String,
        path: String,
        #[source]
        source: Box<BuildError>,
    },

    /// The key type of a map could not be mapped.
    #[error("error converting map key type {key}: {source}")]
    MapKey {
        key: String,
        #[source]
        source: Box<BuildError>,
    },

    /// The value type of a map could not be mapped.
    #[error("error converting map value type {value}: {source}")]
    MapValue {
        value: String,
        #[source]
        source: Box<BuildError>,
    },

    /// A fixed parameter could not be mapped.
    #[error("error converting host type for fixed argument {index} (host type {ty}, function {function}): {source}")]
    Parameter {
        index: usize,
        ty: String,
        function: String,
        #[source]
        source: Box<BuildError>,
    },

    /// The element type of the trailing variadic parameter could not be mapped.
    #[error("error converting variadic element type (host type {elem}, function {function}): {source}")]
    VariadicElement {
        elem: String,
        function: String,
        #[source]
        source: Box<BuildError>,
    },

    /// The return type could not be mapped.
    #[error("error converting return type (host type {ty}, function {function}): {source}")]
    ReturnType {
        ty: String,
        function: String,
        #[source]
        source: Box<BuildError>,
    },

    /// A function flagged variadic without a trailing slice parameter.
    #[error("variadic function ({function}) {reason}")]
    InvalidVariadic { function: String, reason: String },
}

// ============================================================================
// Conversion Errors
// ============================================================================

/// Errors raised while converting a single value between the foreign and host models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// NULL has no representation in a scalar or timestamp host type.
    #[error("cannot convert NULL to host type {target}")]
    NullToScalar { target: String },

    /// No conversion rule covers the pair of foreign and host types.
    #[error("cannot convert foreign value of type {foreign} (value: {value}) to host type {target}")]
    UnexpectedSource {
        foreign: &'static str,
        value: String,
        target: String,
    },

    /// Non-string foreign values are never formatted into strings implicitly.
    #[error("cannot convert foreign value of type {foreign} (value: {value}) to host type String")]
    NumericToString { foreign: &'static str, value: String },

    /// Numbers are never reinterpreted as booleans.
    #[error("cannot convert foreign value of type {foreign} (value: {value}) to host type bool")]
    NumericToBool { foreign: &'static str, value: String },

    /// An exported record field has no entry in the source STRUCT.
    #[error("field '{field}' missing in source STRUCT for record {record}")]
    MissingField { field: String, record: String },

    /// A VARCHAR did not match any accepted timestamp layout.
    #[error("unable to parse string '{text}' as a timestamp, tried multiple common formats")]
    TimestampParse { text: String },

    /// A micro-epoch value outside the representable timestamp range.
    #[error("timestamp of {micros} microseconds since the epoch is out of range")]
    TimestampRange { micros: i64 },

    /// A converted map key does not fit the declared key type.
    #[error("map key {key} (type {foreign}) is not assignable to map key type {target}")]
    KeyNotAssignable {
        key: String,
        foreign: &'static str,
        target: String,
    },

    /// A record field failed to convert.
    #[error("error converting field '{field}' for record {record}: {source}")]
    Field {
        field: String,
        record: String,
        #[source]
        source: Box<ConversionError>,
    },

    /// A map key failed to convert.
    #[error("error converting map key for host map {map}: {source}")]
    MapKey {
        map: String,
        #[source]
        source: Box<ConversionError>,
    },

    /// A map value failed to convert.
    #[error("error converting map value for key '{key}' for host map {map}: {source}")]
    MapValue {
        key: String,
        map: String,
        #[source]
        source: Box<ConversionError>,
    },

    /// The value behind a pointer failed to convert.
    #[error("error converting to element type {elem} for pointer target {target}: {source}")]
    Pointee {
        elem: String,
        target: String,
        #[source]
        source: Box<ConversionError>,
    },

    /// A host value of the wrong kind was handed to a typed parameter.
    #[error("expected host value of type {expected}, found {found}")]
    Extract {
        expected: String,
        found: &'static str,
    },

    /// A host function adapter received the wrong number of arguments.
    #[error("host function expects {expected} arguments, received {actual}")]
    Arity { expected: usize, actual: usize },

    /// A host value kind with no foreign representation was returned.
    #[error("host value of kind {kind} has no foreign representation")]
    UnsupportedResult { kind: &'static str },
}

impl ConversionError {
    /// Build an [`Extract`](ConversionError::Extract) error.
    pub fn extract(expected: impl ToString, found: &'static str) -> Self {
        ConversionError::Extract {
            expected: expected.to_string(),
            found,
        }
    }
}

// ============================================================================
// Invocation Errors
// ============================================================================

/// Errors produced by a single invocation of a built scalar function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    /// A non-variadic function received the wrong number of arguments.
    #[error("scalar function (non-variadic, {function}) requires {expected} parameters, but {actual} were provided")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// A variadic function received fewer arguments than it has fixed parameters.
    #[error("scalar function (variadic, {function}) requires at least {fixed} fixed parameters, but only {actual} were provided")]
    VariadicArgumentCount {
        function: String,
        fixed: usize,
        actual: usize,
    },

    /// A fixed argument failed to convert.
    #[error("error converting parameter {index} (host type {ty}, function {function}): {source}")]
    Argument {
        index: usize,
        ty: String,
        function: String,
        #[source]
        source: ConversionError,
    },

    /// A trailing variadic argument failed to convert.
    #[error("error converting variadic parameter {index} (overall argument {position}, host element type {ty}, function {function}): {source}")]
    VariadicArgument {
        index: usize,
        position: usize,
        ty: String,
        function: String,
        #[source]
        source: ConversionError,
    },

    /// The host function adapter rejected its arguments.
    #[error("error calling scalar function ({function}): {source}")]
    Call {
        function: String,
        #[source]
        source: ConversionError,
    },

    /// The returned host value could not be converted to a foreign value.
    #[error("error converting result of scalar function ({function}): {source}")]
    Return {
        function: String,
        #[source]
        source: ConversionError,
    },

    /// The host function (or a conversion step) panicked.
    #[error("panic in scalar function ({function}): {message}\nparameters: [{arguments}]\nstack trace:\n{backtrace}")]
    Panic {
        function: String,
        message: String,
        arguments: String,
        backtrace: String,
    },
}
