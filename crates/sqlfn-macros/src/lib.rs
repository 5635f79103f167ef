//! sqlfn Proc Macros
//!
//! This crate provides `#[derive(Record)]`, which lets a named struct travel
//! through scalar functions as a foreign STRUCT.
//!
//! # Example
//!
//! ```ignore
//! use sqlfn::Record;
//!
//! #[derive(Record, Default)]
//! #[sqlfn(name = "Person")]
//! pub struct Person {
//!     #[sqlfn(rename = "ID")]
//!     pub id: i32,
//!     pub name: String,
//!     cache: Vec<u8>,
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_record;

/// Derive the `Reflect`, `FromHost` and `IntoHost` traits for a named struct.
///
/// Only `pub` fields are exported: they become the entries of the foreign
/// STRUCT, in declaration order, and are filled from STRUCT values. Every other
/// field is set to `Default::default()` when a value is built from the engine.
///
/// # Attributes
///
/// - `#[sqlfn(name = "...")]` - Override the record name used in diagnostics
///
/// # Field Attributes
///
/// - `#[sqlfn(rename = "...")]` - Override the STRUCT field name
/// - `#[sqlfn(skip)]` - Do not export a `pub` field
#[proc_macro_derive(Record, attributes(sqlfn))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    derive_record::derive_record_impl(input)
}
