//! Function registry and sources for sqlfn.
//!
//! - [`FunctionRegistry`]: named scalar functions with engine-side call rules
//! - [`FunctionSource`]: resolve host functions by name
//! - [`register_from_source`]: resolve, build and register in one pass

mod error;
mod registry;
mod source;

pub use error::{RegistryError, SourceError};
pub use registry::FunctionRegistry;
pub use source::{FunctionSource, StaticSource, register_from_source};
