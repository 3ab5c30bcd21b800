//! Derive macros for sqlbond
//!
//! Provides `#[derive(Model)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod model;

/// Derive the `Model` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use sqlbond::Model;
///
/// #[derive(Model)]
/// #[bond(store = "accounts")]
/// struct Account {
///     #[bond(id)]
///     id: i64,
///     #[bond(column = "owner_name")]
///     owner: String,
///     #[bond(skip)]
///     cached_total: Vec<u8>,
/// }
/// ```
///
/// # Generated
///
/// - `impl Model`: `store` resolves the store by name on the session;
///   `primary_key` and `fields` list the `#[bond(id)]` fields and the rest
/// - `impl From<&T> for Item`, so `session.store(&value)` works
///
/// # Attributes
///
/// - `#[bond(store = "name")]` - Store name (defaults to the snake_case type name)
/// - `#[bond(id)]` - Mark field as (part of) the primary key
/// - `#[bond(column = "name")]` - Map field to a different column name
/// - `#[bond(skip)]` - Leave the field out of `primary_key` and `fields`
///
/// Mapped fields must be `Clone` and convert into `sqlbond::Param`.
#[proc_macro_derive(Model, attributes(bond))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
