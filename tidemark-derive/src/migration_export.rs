use chrono::NaiveDate;
use proc_macro::TokenStream;
use proc_macro2::Literal;
use quote::quote;
use syn::{DeriveInput, LitInt, LitStr, Result};

pub(crate) fn generate_export_for_struct(ast: &DeriveInput) -> Result<TokenStream> {
    let ident = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut timestamp: Option<i64> = None;
    let mut name = ident.to_string();
    let mut tag: Option<String> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("migration") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("timestamp") {
                    if timestamp.is_some() {
                        return Err(meta.error("Multiple timestamp attributes are not allowed"));
                    }
                    let value = meta.value()?;
                    let literal: LitInt = value.parse()?;
                    let parsed: i64 = literal.base10_parse()?;
                    validate_timestamp(parsed).map_err(|message| syn::Error::new(literal.span(), message))?;
                    timestamp = Some(parsed);
                    Ok(())
                } else if meta.path.is_ident("name") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    if s.value().trim().is_empty() {
                        return Err(syn::Error::new(s.span(), "Migration name cannot be empty"));
                    }
                    name = s.value();
                    Ok(())
                } else if meta.path.is_ident("tag") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    tag = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("Unknown migration attribute"))
                }
            })?
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        syn::Error::new_spanned(
            ast,
            format!(
                "Missing #[migration(timestamp = ...)] on '{}'",
                ident
            ),
        )
    })?;
    let timestamp = Literal::i64_suffixed(timestamp);

    let tag_code = match tag {
        Some(tag) => quote! { .with_tag(#tag) },
        None => quote! {},
    };

    let expanded = quote! {
        impl #impl_generics ::tidemark::migration::MigrationExport for #ident #ty_generics #where_clause {
            fn metadata() -> ::tidemark::migration::MigrationMetadata {
                ::tidemark::migration::MigrationMetadata::new(#timestamp, #name) #tag_code
            }
        }
    };

    Ok(TokenStream::from(expanded))
}

/// Checks a timestamp literal. Values with 14 digits are read as
/// `yyyyMMddHHmmss` and must denote a real instant.
fn validate_timestamp(value: i64) -> std::result::Result<(), String> {
    if value <= 0 {
        return Err(format!("Migration timestamp must be positive, got {}", value));
    }
    if value == i64::MAX {
        return Err("Migration timestamp i64::MAX is reserved".to_string());
    }
    if value.to_string().len() != 14 {
        return Ok(());
    }

    let year = (value / 10_000_000_000) as i32;
    let month = (value / 100_000_000 % 100) as u32;
    let day = (value / 1_000_000 % 100) as u32;
    let hour = (value / 10_000 % 100) as u32;
    let minute = (value / 100 % 100) as u32;
    let second = (value % 100) as u32;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("Migration timestamp {} has invalid date", value))?
        .and_hms_opt(hour, minute, second)
        .ok_or_else(|| {
            format!(
                "Migration timestamp {} has invalid time {:02}:{:02}:{:02}",
                value, hour, minute, second
            )
        })?;
    Ok(())
}
