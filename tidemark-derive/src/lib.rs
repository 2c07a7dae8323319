#![recursion_limit = "128"]
//! # Tidemark Derive Macros
//!
//! This crate provides procedural macros for deriving tidemark traits automatically.
//!
//! ## Macros
//!
//! ### `MigrationExport`
//!
//! Derives the `MigrationExport` trait, attaching migration metadata to a type
//! so it can be handed to a `MigrationRegistry` without spelling out its
//! timestamp and name at the registration site.
//!
//! - **Supported for**: structs
//! - **Type attribute**: `#[migration(timestamp = ..., name = "...", tag = "...")]`
//!
//! # Examples
//!
//! ```rust,ignore
//! use tidemark_derive::MigrationExport;
//!
//! #[derive(MigrationExport)]
//! #[migration(timestamp = 20240115103000, tag = "JIRA-12")]
//! pub struct CreateCustomers;
//! ```
//!
//! ## Error Messages
//!
//! The timestamp is checked while compiling: it must be positive, must not be
//! the reserved maximum and, when written as 14 digits, must be a valid
//! `yyyyMMddHHmmss` instant.

extern crate proc_macro;
mod migration_export;

use crate::migration_export::generate_export_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives the `MigrationExport` trait.
///
/// # Attributes
///
/// - `timestamp = <integer>` - Version marker of the migration (required)
/// - `name = "..."` - Migration name, defaults to the type name
/// - `tag = "..."` - Free-text tag (optional)
///
/// # Errors
///
/// Returns a compile error if:
/// - The timestamp is missing or invalid
/// - An unknown attribute key is used
/// - The type is an enum or a union
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(MigrationExport)]
/// #[migration(timestamp = 20240115103000, name = "CreateCustomers")]
/// pub struct CreateCustomersMigration;
/// ```
#[proc_macro_derive(MigrationExport, attributes(migration))]
pub fn derive_migration_export(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(_) => match generate_export_for_struct(&ast) {
            Ok(token_stream) => token_stream,
            Err(e) => e.to_compile_error().into(),
        },
        Data::Enum(_) | Data::Union(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive MigrationExport for enums or unions. Use a struct, for example: \
                 #[derive(MigrationExport)] pub struct CreateCustomers;",
            );
            error.to_compile_error().into()
        }
    }
}
