//! Scalar function descriptors and the call marshaler.
//!
//! A [`ScalarUdf`] is built once per registration from a host function. Building
//! derives the foreign signature; invoking converts a row of foreign values into
//! host arguments, calls the function, and converts the result back. Failures at
//! any step, panics included, come back as an [`InvokeError`].
//!
//! ## Example
//!
//! ```
//! use sqlfn_core::{ScalarUdf, Value, Variadic};
//!
//! let add = ScalarUdf::build(|a: i32, b: i32| a + b).unwrap();
//! assert_eq!(add.invoke(&[Value::Integer(5), Value::Integer(10)]), Ok(Value::Integer(15)));
//!
//! let sum = ScalarUdf::build(|prefix: String, rest: Variadic<i32>| {
//!     format!("{prefix}: {}", rest.iter().sum::<i32>())
//! })
//! .unwrap();
//! assert_eq!(sum.invoke(&[Value::from("X")]), Ok(Value::from("X: 0")));
//! ```

use tracing::{error, trace};

use crate::convert::{convert_value, describe_arguments, host_to_value};
use crate::error::{BuildError, InvokeError};
use crate::function::{HostFunction, IntoHostFunction};
use crate::host_type::FunctionType;
use crate::host_value::HostValue;
use crate::logical_type::LogicalType;
use crate::options::Options;
use crate::panic;
use crate::signature::{Signature, derive_signature};
use crate::value::Value;

/// What the engine needs to register a scalar function.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarFuncConfig {
    pub input_types: Vec<LogicalType>,
    pub result_type: LogicalType,
    pub variadic_type: Option<LogicalType>,
    pub special_null_handling: bool,
    pub volatile: bool,
}

/// A host function ready to be called by the engine.
///
/// Immutable after creation. Clones share the underlying callable.
#[derive(Debug, Clone)]
pub struct ScalarUdf {
    function: HostFunction,
    signature: Signature,
    options: Options,
}

impl ScalarUdf {
    /// Build from a typed closure, `fn` item or [`HostFunction`] with default options.
    pub fn build<F, Args>(f: F) -> Result<Self, BuildError>
    where
        F: IntoHostFunction<Args>,
    {
        Self::build_with(f, Options::default())
    }

    /// Build with an explicit options snapshot.
    pub fn build_with<F, Args>(f: F, options: Options) -> Result<Self, BuildError>
    where
        F: IntoHostFunction<Args>,
    {
        Self::from_host_function(f.into_host_function(), options)
    }

    /// Build from a type-erased host function.
    pub fn from_host_function(function: HostFunction, options: Options) -> Result<Self, BuildError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("ScalarUdf::build");

        let signature = derive_signature(&function.host_type())?;
        Ok(Self {
            function,
            signature,
            options,
        })
    }

    /// Registration parameters for the engine.
    pub fn config(&self) -> ScalarFuncConfig {
        ScalarFuncConfig {
            input_types: self.signature.input_types.clone(),
            result_type: self.signature.result_type.clone(),
            variadic_type: self.signature.variadic_type.clone(),
            special_null_handling: self.options.special_null_handling,
            volatile: self.options.volatile,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn function(&self) -> &HostFunction {
        &self.function
    }

    pub fn function_type(&self) -> &FunctionType {
        self.function.function_type()
    }

    pub fn is_variadic(&self) -> bool {
        self.signature.variadic
    }

    /// Call the function with one row of foreign arguments.
    ///
    /// Never panics: a panic in the host function or in a conversion step is
    /// returned as [`InvokeError::Panic`].
    pub fn invoke(&self, args: &[Value]) -> Result<Value, InvokeError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("ScalarUdf::invoke");

        trace!(function = %self.function_type(), arguments = args.len(), "invoking scalar function");

        match panic::contain(|| self.invoke_inner(args)) {
            Ok(result) => result,
            Err(caught) => {
                let function = self.function_type().to_string();
                error!(function = %function, message = %caught.message, "scalar function panicked");
                Err(InvokeError::Panic {
                    function,
                    message: caught.message,
                    arguments: describe_arguments(args),
                    backtrace: caught.backtrace,
                })
            }
        }
    }

    fn invoke_inner(&self, args: &[Value]) -> Result<Value, InvokeError> {
        let host_args = self.marshal_arguments(args)?;
        let result = self.function.call(host_args).map_err(|source| InvokeError::Call {
            function: self.function_type().to_string(),
            source,
        })?;
        host_to_value(result).map_err(|source| InvokeError::Return {
            function: self.function_type().to_string(),
            source,
        })
    }

    fn marshal_arguments(&self, args: &[Value]) -> Result<Vec<HostValue>, InvokeError> {
        let fixed_types = self.signature.fixed_param_types();
        let fixed = fixed_types.len();

        if self.signature.variadic {
            if args.len() < fixed {
                return Err(InvokeError::VariadicArgumentCount {
                    function: self.function_type().to_string(),
                    fixed,
                    actual: args.len(),
                });
            }
        } else if args.len() != fixed {
            return Err(InvokeError::ArgumentCount {
                function: self.function_type().to_string(),
                expected: fixed,
                actual: args.len(),
            });
        }

        let mut host_args = Vec::with_capacity(self.signature.param_types.len());
        for (index, (arg, ty)) in args.iter().zip(fixed_types).enumerate() {
            let converted = convert_value(arg, ty).map_err(|source| InvokeError::Argument {
                index,
                ty: ty.to_string(),
                function: self.function_type().to_string(),
                source,
            })?;
            host_args.push(converted);
        }

        if let Some(elem) = self.signature.variadic_element() {
            let mut rest = Vec::with_capacity(args.len() - fixed);
            for (index, arg) in args[fixed..].iter().enumerate() {
                let converted = convert_value(arg, elem).map_err(|source| InvokeError::VariadicArgument {
                    index,
                    position: fixed + index,
                    ty: elem.to_string(),
                    function: self.function_type().to_string(),
                    source,
                })?;
                rest.push(converted);
            }
            host_args.push(HostValue::Slice(rest));
        }

        Ok(host_args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::host_type::HostType;
    use crate::options::UdfOption;
    use crate::reflect::Variadic;
    use crate::value::StructValue;
    use std::collections::HashMap;

    #[test]
    fn add_ints() {
        let udf = ScalarUdf::build(|a: i32, b: i32| a + b).unwrap();
        let config = udf.config();
        assert_eq!(config.input_types, vec![LogicalType::Integer, LogicalType::Integer]);
        assert_eq!(config.result_type, LogicalType::Integer);
        assert_eq!(config.variadic_type, None);
        assert_eq!(
            udf.invoke(&[Value::Integer(5), Value::Integer(10)]),
            Ok(Value::Integer(15))
        );
    }

    #[test]
    fn variadic_with_and_without_tail() {
        let udf = ScalarUdf::build(|prefix: String, rest: Variadic<i32>| {
            format!("{prefix}: {}", rest.iter().sum::<i32>())
        })
        .unwrap();
        assert!(udf.is_variadic());
        assert_eq!(udf.config().variadic_type, Some(LogicalType::Integer));
        assert_eq!(udf.invoke(&[Value::from("X")]), Ok(Value::from("X: 0")));
        assert_eq!(
            udf.invoke(&[Value::from("S"), Value::Integer(1), Value::Integer(2), Value::BigInt(3)]),
            Ok(Value::from("S: 6"))
        );
    }

    #[test]
    fn variadic_too_few_fixed() {
        let udf = ScalarUdf::build(|_a: String, _b: i64, rest: Variadic<i32>| rest.len() as i64).unwrap();
        let err = udf.invoke(&[Value::from("a")]).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::VariadicArgumentCount { fixed: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn variadic_element_error_names_position() {
        let udf = ScalarUdf::build(|rest: Variadic<i32>| rest.len() as i64).unwrap();
        let err = udf.invoke(&[Value::Integer(1), Value::from("x")]).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::VariadicArgument { index: 1, position: 1, .. }
        ));
    }

    #[test]
    fn argument_count_checked() {
        let udf = ScalarUdf::build(|a: i32| a).unwrap();
        let err = udf.invoke(&[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "scalar function (non-variadic, fn(i32) -> i32) requires 1 parameters, but 0 were provided"
        );
    }

    #[test]
    fn argument_conversion_error() {
        let udf = ScalarUdf::build(|s: String| s.len() as i64).unwrap();
        let err = udf.invoke(&[Value::Integer(5)]).unwrap_err();
        let InvokeError::Argument { index, source, .. } = err else {
            panic!("expected argument error, got {err:?}");
        };
        assert_eq!(index, 0);
        assert!(matches!(source, ConversionError::NumericToString { .. }));
    }

    #[test]
    fn panic_is_contained() {
        let udf = ScalarUdf::build(|| -> i32 { panic!("custom panic from scalar function") }).unwrap();
        let err = udf.invoke(&[]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("fn() -> i32"), "{msg}");
        assert!(msg.contains("custom panic from scalar function"), "{msg}");
        assert!(msg.contains("stack trace:"), "{msg}");
    }

    #[test]
    fn panic_renders_arguments() {
        let udf = ScalarUdf::build_with(
            |a: i32, _b: Option<String>| -> i32 { panic!("bad {a}") },
            Options::new().special_null_handling(true),
        )
        .unwrap();
        let InvokeError::Panic { arguments, message, .. } =
            udf.invoke(&[Value::Integer(5), Value::Null]).unwrap_err()
        else {
            panic!("expected panic error");
        };
        assert_eq!(message, "bad 5");
        assert_eq!(arguments, "5 (INTEGER), NULL");
    }

    #[test]
    fn options_surface_in_config() {
        let udf = ScalarUdf::build_with(
            |a: i64| a,
            Options::from_options([UdfOption::Volatile(true)]),
        )
        .unwrap();
        let config = udf.config();
        assert!(config.volatile);
        assert!(!config.special_null_handling);
        assert_eq!(udf.invoke(&[Value::BigInt(2)]), Ok(Value::BigInt(2)));
    }

    #[test]
    fn map_result_and_argument() {
        let udf = ScalarUdf::build(|m: HashMap<String, i32>| {
            m.into_iter().map(|(k, v)| (k, v * 2)).collect::<HashMap<_, _>>()
        })
        .unwrap();
        assert_eq!(
            udf.config().result_type,
            LogicalType::map(LogicalType::Varchar, LogicalType::Integer)
        );
        let arg = Value::Map(crate::value::MapValue::new().with("a", 1));
        let Value::Map(out) = udf.invoke(&[arg]).unwrap() else {
            panic!("expected MAP result");
        };
        assert_eq!(out.get(&Value::from("a")), Some(&Value::Integer(2)));
    }

    #[test]
    fn pointer_argument_receives_nil() {
        let udf = ScalarUdf::build(|v: Option<i32>| v.map_or(-1, |v| v * 10)).unwrap();
        assert_eq!(udf.config().input_types, vec![LogicalType::Integer]);
        assert_eq!(udf.invoke(&[Value::Null]), Ok(Value::Integer(-1)));
        assert_eq!(udf.invoke(&[Value::Integer(4)]), Ok(Value::Integer(40)));
    }

    #[test]
    fn dynamic_function() {
        let ty = FunctionType::new(vec![HostType::Int64], vec![HostType::Int64], false);
        let f = HostFunction::dynamic(ty, |args| match args.as_slice() {
            [HostValue::Int64(v)] => Ok(HostValue::Int64(v + 1)),
            _ => Err(ConversionError::Arity { expected: 1, actual: args.len() }),
        });
        let udf = ScalarUdf::build(f).unwrap();
        assert_eq!(udf.invoke(&[Value::Integer(1)]), Ok(Value::BigInt(2)));
    }

    #[test]
    fn build_rejects_unsupported() {
        assert!(matches!(
            ScalarUdf::build(|_a: i32| {}),
            Err(BuildError::ResultCount { count: 0, .. })
        ));
        assert!(matches!(
            ScalarUdf::build(|v: Value| v),
            Err(BuildError::Parameter { .. })
        ));
        assert!(matches!(
            ScalarUdf::build(|v: Vec<i32>| v.len() as i64),
            Err(BuildError::Parameter { .. })
        ));
    }

    #[test]
    fn struct_missing_field_fails_at_invoke() {
        use crate::host_type::{RecordField, RecordType};

        let record = HostType::Record(RecordType::new(
            "Wrapper",
            "tests::Wrapper",
            vec![RecordField::new("Val", HostType::Int32)],
        ));
        let ty = FunctionType::new(vec![record], vec![HostType::Int32], false);
        let f = HostFunction::dynamic(ty, |mut args| match args.pop() {
            Some(HostValue::Record(mut r)) => Ok(r.take("Val").unwrap_or(HostValue::Int32(0))),
            _ => Ok(HostValue::Int32(0)),
        });
        let udf = ScalarUdf::build(f).unwrap();
        let err = udf
            .invoke(&[Value::Struct(StructValue::new().with("Other", 1))])
            .unwrap_err();
        assert!(err.to_string().contains("field 'Val' missing"));
    }

    #[test]
    fn clones_share_callable() {
        let udf = ScalarUdf::build(|a: u8| a).unwrap();
        let copy = udf.clone();
        assert_eq!(copy.function(), udf.function());
        assert_eq!(copy.invoke(&[Value::UTinyInt(3)]), Ok(Value::UInteger(3)));
    }

    #[test]
    fn descriptor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScalarUdf>();
        assert_send_sync::<HostFunction>();
        assert_send_sync::<Options>();
    }

    #[test]
    fn concurrent_invoke_isolates_panics() {
        let udf = ScalarUdf::build(|v: i64| -> i64 {
            if v % 3 == 0 {
                panic!("multiple of three: {v}");
            }
            v * 2
        })
        .unwrap();

        std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8_i64)
                .map(|worker| {
                    let udf = &udf;
                    scope.spawn(move || {
                        let mut wrong = 0;
                        for i in 0..200_i64 {
                            let v = worker * 1_000 + i;
                            let result = udf.invoke(&[Value::BigInt(v)]);
                            let ok = if v % 3 == 0 {
                                matches!(
                                    &result,
                                    Err(InvokeError::Panic { message, backtrace, .. })
                                        if *message == format!("multiple of three: {v}") && !backtrace.is_empty()
                                )
                            } else {
                                result == Ok(Value::BigInt(v * 2))
                            };
                            if !ok {
                                wrong += 1;
                            }
                        }
                        wrong
                    })
                })
                .collect();

            for worker in workers {
                assert_eq!(worker.join().unwrap(), 0);
            }
        });
    }
}
