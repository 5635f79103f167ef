//! FunctionRegistry - named scalar functions callable per row.
//!
//! This module provides [`FunctionRegistry`], the in-process stand-in for an
//! engine connection's function catalog. It stores built [`ScalarUdf`]s by
//! name and applies the engine-side call rules before delegating to the call
//! marshaler:
//!
//! - unknown names and wrong argument counts are rejected,
//! - unless a function opted into special NULL handling, a row containing a
//!   NULL argument yields NULL without calling the function.
//!
//! # Example
//!
//! ```
//! use sqlfn_core::{ScalarUdf, Value};
//! use sqlfn_registry::FunctionRegistry;
//!
//! let mut registry = FunctionRegistry::new();
//! registry.register("add_ints", ScalarUdf::build(|a: i32, b: i32| a + b).unwrap()).unwrap();
//!
//! let sum = registry.call("add_ints", &[Value::Integer(5), Value::Integer(10)]).unwrap();
//! assert_eq!(sum, Value::Integer(15));
//!
//! let null = registry.call("add_ints", &[Value::Integer(5), Value::Null]).unwrap();
//! assert_eq!(null, Value::Null);
//! ```

use rustc_hash::FxHashMap;
use tracing::debug;

use sqlfn_core::{ScalarFuncConfig, ScalarUdf, Value};

use crate::error::RegistryError;

/// Registry of scalar functions by name.
#[derive(Debug, Default, Clone)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, ScalarUdf>,
}

impl FunctionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a function under `name`.
    pub fn register(&mut self, name: impl Into<String>, udf: ScalarUdf) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.functions.contains_key(&name) {
            return Err(RegistryError::DuplicateFunction { name });
        }

        let config = udf.config();
        debug!(
            name = %name,
            function = %udf.function_type(),
            inputs = config.input_types.len(),
            variadic = config.variadic_type.is_some(),
            volatile = config.volatile,
            special_null_handling = config.special_null_handling,
            "registered scalar function"
        );
        self.functions.insert(name, udf);
        Ok(())
    }

    /// Remove a function, returning it if it was registered.
    pub fn unregister(&mut self, name: &str) -> Option<ScalarUdf> {
        self.functions.remove(name)
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    pub fn get(&self, name: &str) -> Option<&ScalarUdf> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registration parameters of a function.
    pub fn config(&self, name: &str) -> Option<ScalarFuncConfig> {
        self.functions.get(name).map(ScalarUdf::config)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    /// Call a function with one row of arguments.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, RegistryError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("FunctionRegistry::call");

        let udf = self
            .functions
            .get(name)
            .ok_or_else(|| RegistryError::UnknownFunction {
                name: name.to_string(),
            })?;

        let signature = udf.signature();
        let fixed = signature.fixed_count();
        if signature.variadic {
            if args.len() < fixed {
                return Err(RegistryError::VariadicArgumentCount {
                    name: name.to_string(),
                    minimum: fixed,
                    actual: args.len(),
                });
            }
        } else if args.len() != fixed {
            return Err(RegistryError::ArgumentCount {
                name: name.to_string(),
                expected: fixed,
                actual: args.len(),
            });
        }

        if !udf.options().special_null_handling && args.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }

        udf.invoke(args).map_err(|source| RegistryError::Invoke {
            name: name.to_string(),
            source,
        })
    }

    /// Call a function once per row. A failing row does not affect the others.
    pub fn call_rows<R>(&self, name: &str, rows: &[R]) -> Vec<Result<Value, RegistryError>>
    where
        R: AsRef<[Value]>,
    {
        rows.iter().map(|row| self.call(name, row.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlfn_core::{Options, Variadic};

    fn registry() -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        registry
            .register("add_ints", ScalarUdf::build(|a: i32, b: i32| a + b).unwrap())
            .unwrap();
        registry
            .register(
                "sum_variadic",
                ScalarUdf::build(|prefix: String, rest: Variadic<i32>| {
                    format!("{prefix}: {}", rest.iter().sum::<i32>())
                })
                .unwrap(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn register_and_call() {
        let registry = registry();
        assert_eq!(
            registry.call("add_ints", &[Value::Integer(5), Value::Integer(10)]),
            Ok(Value::Integer(15))
        );
        assert_eq!(
            registry.call("sum_variadic", &[Value::from("X")]),
            Ok(Value::from("X: 0"))
        );
    }

    #[test]
    fn names_are_sorted() {
        assert_eq!(registry().names(), vec!["add_ints", "sum_variadic"]);
    }

    #[test]
    fn duplicate_and_empty_names_rejected() {
        let mut registry = registry();
        let udf = ScalarUdf::build(|a: i32| a).unwrap();
        assert_eq!(
            registry.register("add_ints", udf.clone()),
            Err(RegistryError::DuplicateFunction {
                name: "add_ints".to_string()
            })
        );
        assert_eq!(registry.register("", udf), Err(RegistryError::EmptyName));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_function() {
        assert!(matches!(
            registry().call("missing", &[]),
            Err(RegistryError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn arity_checked_before_null_propagation() {
        let registry = registry();
        assert!(matches!(
            registry.call("add_ints", &[Value::Null]),
            Err(RegistryError::ArgumentCount { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            registry.call("sum_variadic", &[]),
            Err(RegistryError::VariadicArgumentCount { minimum: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn null_propagates_without_special_handling() {
        let registry = registry();
        assert_eq!(
            registry.call("add_ints", &[Value::Null, Value::Integer(1)]),
            Ok(Value::Null)
        );
    }

    #[test]
    fn special_null_handling_sees_nulls() {
        let mut registry = FunctionRegistry::new();
        registry
            .register(
                "coalesce_zero",
                ScalarUdf::build_with(
                    |v: Option<i64>| v.unwrap_or(0),
                    Options::new().special_null_handling(true),
                )
                .unwrap(),
            )
            .unwrap();
        assert_eq!(registry.call("coalesce_zero", &[Value::Null]), Ok(Value::BigInt(0)));
        assert!(registry.config("coalesce_zero").unwrap().special_null_handling);
    }

    #[test]
    fn call_rows_isolates_failures() {
        let registry = registry();
        let rows = vec![
            vec![Value::Integer(1), Value::Integer(2)],
            vec![Value::from("x"), Value::Integer(2)],
            vec![Value::Integer(3), Value::Integer(4)],
        ];
        let results = registry.call_rows("add_ints", &rows);
        assert_eq!(results[0], Ok(Value::Integer(3)));
        assert!(matches!(results[1], Err(RegistryError::Invoke { .. })));
        assert_eq!(results[2], Ok(Value::Integer(7)));
    }

    #[test]
    fn unregister_removes() {
        let mut registry = registry();
        assert!(registry.unregister("add_ints").is_some());
        assert!(!registry.contains("add_ints"));
        assert!(registry.unregister("add_ints").is_none());
    }
}
