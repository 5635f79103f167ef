//! Function sources.
//!
//! A [`FunctionSource`] resolves host functions by name: the seam where a
//! script loader or plugin host hands functions to the registry.
//! [`register_from_source`] resolves, builds and registers a list of names.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use sqlfn_core::{HostFunction, IntoHostFunction, Options, ScalarUdf};

use crate::error::SourceError;
use crate::registry::FunctionRegistry;

/// Resolves host functions by name.
pub trait FunctionSource {
    /// Look up a function. `None` when the source has no such function.
    fn resolve_function(&self, name: &str) -> Option<HostFunction>;
}

/// A source backed by an in-memory map filled by the embedder.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    functions: FxHashMap<String, HostFunction>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function, replacing any previous one with the same name.
    pub fn insert<F, Args>(&mut self, name: impl Into<String>, f: F)
    where
        F: IntoHostFunction<Args>,
    {
        self.functions.insert(name.into(), f.into_host_function());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<F, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: IntoHostFunction<Args>,
    {
        self.insert(name, f);
        self
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FunctionSource for StaticSource {
    fn resolve_function(&self, name: &str) -> Option<HostFunction> {
        self.functions.get(name).cloned()
    }
}

/// Resolve, build and register each named function in order.
///
/// Stops at the first failure; functions registered before it stay registered.
pub fn register_from_source<S, I, N>(
    registry: &mut FunctionRegistry,
    source: &S,
    names: I,
    options: Options,
) -> Result<(), SourceError>
where
    S: FunctionSource + ?Sized,
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    for name in names {
        let name = name.as_ref();
        let Some(function) = source.resolve_function(name) else {
            warn!(name = %name, "function not found in source");
            return Err(SourceError::NotFound {
                name: name.to_string(),
            });
        };

        let udf = ScalarUdf::from_host_function(function, options).map_err(|err| SourceError::Build {
            name: name.to_string(),
            source: err,
        })?;
        registry.register(name, udf)?;
        debug!(name = %name, "registered scalar function from source");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use sqlfn_core::{BuildError, Value};

    fn source() -> StaticSource {
        StaticSource::new()
            .with("double", |v: i64| v * 2)
            .with("shout", |s: String| s.to_uppercase())
            .with("broken", |_v: i32| {})
    }

    #[test]
    fn registers_in_order() {
        let mut registry = FunctionRegistry::new();
        register_from_source(&mut registry, &source(), ["double", "shout"], Options::default()).unwrap();
        assert_eq!(registry.names(), vec!["double", "shout"]);
        assert_eq!(registry.call("double", &[Value::BigInt(4)]), Ok(Value::BigInt(8)));
        assert_eq!(registry.call("shout", &[Value::from("hi")]), Ok(Value::from("HI")));
    }

    #[test]
    fn missing_function() {
        let mut registry = FunctionRegistry::new();
        let err = register_from_source(&mut registry, &source(), ["double", "nope"], Options::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "func not found: nope");
        assert!(registry.contains("double"));
    }

    #[test]
    fn build_failure_propagates() {
        let mut registry = FunctionRegistry::new();
        let err = register_from_source(&mut registry, &source(), ["broken"], Options::default()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Build {
                source: BuildError::ResultCount { .. },
                ..
            }
        ));
    }

    #[test]
    fn duplicate_registration_propagates() {
        let mut registry = FunctionRegistry::new();
        let err = register_from_source(&mut registry, &source(), ["double", "double"], Options::default())
            .unwrap_err();
        assert!(matches!(
            err,
            SourceError::Registry(RegistryError::DuplicateFunction { .. })
        ));
    }

    #[test]
    fn options_applied_to_every_function() {
        let mut registry = FunctionRegistry::new();
        register_from_source(
            &mut registry,
            &source(),
            vec!["double".to_string()],
            Options::new().volatile(true),
        )
        .unwrap();
        assert!(registry.config("double").unwrap().volatile);
    }
}
