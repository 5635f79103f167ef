//! Core of sqlfn: exposing host functions as SQL scalar functions.
//!
//! This crate holds the type-mapping and value-marshaling engine:
//!
//! - [`signature`]: derive the foreign signature of a host function
//! - [`convert`]: convert foreign values into host values and back
//! - [`udf`]: the [`ScalarUdf`] descriptor and its call marshaler
//! - [`options`]: build-time [`Options`]
//!
//! Rust has no runtime reflection, so host types are described explicitly by
//! [`HostType`] through the [`Reflect`] trait, and values travel as tagged
//! [`HostValue`]s between the converters and the [`HostFunction`] adapters.
//!
//! # Example
//!
//! ```
//! use sqlfn_core::{LogicalType, ScalarUdf, Value};
//!
//! let udf = ScalarUdf::build(|a: i32, b: i32| a + b).unwrap();
//! assert_eq!(udf.config().input_types, vec![LogicalType::Integer, LogicalType::Integer]);
//! assert_eq!(udf.invoke(&[Value::Integer(5), Value::Integer(10)]), Ok(Value::Integer(15)));
//! ```

pub mod convert;
pub mod error;
pub mod function;
pub mod host_type;
pub mod host_value;
pub mod logical_type;
pub mod options;
pub mod panic;
pub mod reflect;
pub mod signature;
pub mod udf;
pub mod value;

pub use convert::{conforms_to, convert_value, host_to_value, parse_timestamp, zero_value};
pub use error::{BuildError, ConversionError, InvokeError};
pub use function::{FnResult, HostFunction, IntoHostFunction};
pub use host_type::{FunctionType, HostType, RecordField, RecordType};
pub use host_value::{HostValue, RecordValue};
pub use logical_type::{LogicalType, MapType, StructEntry, StructType};
pub use options::{Options, UdfOption, with_special_null_handling, with_volatile};
pub use reflect::{FromHost, IntoHost, Reflect, Variadic};
pub use signature::{Signature, derive_signature, host_to_logical};
pub use udf::{ScalarFuncConfig, ScalarUdf};
pub use value::{MapValue, StructValue, Value};
