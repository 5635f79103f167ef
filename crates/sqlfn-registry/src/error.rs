//! Registry and source errors.

use thiserror::Error;

use sqlfn_core::{BuildError, InvokeError};

/// Errors raised by [`FunctionRegistry`](crate::FunctionRegistry).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// Functions must have a name.
    #[error("scalar function name must not be empty")]
    EmptyName,

    /// A function with this name is already registered.
    #[error("scalar function '{name}' is already registered")]
    DuplicateFunction { name: String },

    /// No function with this name is registered.
    #[error("scalar function '{name}' is not registered")]
    UnknownFunction { name: String },

    /// A non-variadic function was called with the wrong number of arguments.
    #[error("scalar function '{name}' takes {expected} arguments, but {actual} were given")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A variadic function was called with fewer than its fixed arguments.
    #[error("scalar function '{name}' takes at least {minimum} arguments, but {actual} were given")]
    VariadicArgumentCount {
        name: String,
        minimum: usize,
        actual: usize,
    },

    /// The call itself failed.
    #[error("error in scalar function '{name}': {source}")]
    Invoke {
        name: String,
        #[source]
        source: InvokeError,
    },
}

/// Errors raised while registering functions from a [`FunctionSource`](crate::FunctionSource).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The source has no function with this name.
    #[error("func not found: {name}")]
    NotFound { name: String },

    /// The resolved function could not be built.
    #[error("failed to build scalar function '{name}': {source}")]
    Build {
        name: String,
        #[source]
        source: BuildError,
    },

    /// The built function could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
