//! sqlfn - expose host functions as SQL scalar functions.
//!
//! Build a [`ScalarUdf`] from any Rust closure or function whose parameter and
//! return types implement [`Reflect`]. The signature deriver maps those types
//! onto SQL logical types, and the call marshaler converts each row of SQL
//! values into host values, calls the function, and converts the result back.
//!
//! ```
//! use sqlfn::prelude::*;
//!
//! let mut registry = FunctionRegistry::new();
//! registry
//!     .register("add_ints", ScalarUdf::build(|a: i32, b: i32| a + b).unwrap())
//!     .unwrap();
//! assert_eq!(
//!     registry.call("add_ints", &[Value::Integer(5), Value::Integer(10)]),
//!     Ok(Value::Integer(15))
//! );
//! ```
//!
//! Records become STRUCTs through `#[derive(Record)]` (feature `macros`):
//! public fields are exported, everything else is left at its default.

pub use sqlfn_core::{convert, error, function, host_type, host_value, logical_type, options, reflect, signature, udf, value};

pub use sqlfn_core::{
    BuildError, ConversionError, FnResult, FromHost, FunctionType, HostFunction, HostType, HostValue, IntoHost,
    IntoHostFunction, InvokeError, LogicalType, MapType, MapValue, Options, RecordField, RecordType, RecordValue,
    Reflect, ScalarFuncConfig, ScalarUdf, Signature, StructEntry, StructType, StructValue, UdfOption, Value, Variadic,
    conforms_to, convert_value, derive_signature, host_to_logical, host_to_value, parse_timestamp, with_special_null_handling,
    with_volatile, zero_value,
};

pub use sqlfn_registry::{FunctionRegistry, FunctionSource, RegistryError, SourceError, StaticSource, register_from_source};

#[cfg(feature = "macros")]
pub use sqlfn_macros::Record;

pub mod prelude {
    pub use sqlfn_core::{
        FromHost, HostFunction, IntoHost, LogicalType, MapValue, Options, Reflect, ScalarUdf, StructValue, Value,
        Variadic, with_special_null_handling, with_volatile,
    };
    pub use sqlfn_registry::{FunctionRegistry, FunctionSource, StaticSource, register_from_source};

    #[cfg(feature = "macros")]
    pub use sqlfn_macros::Record;
}
