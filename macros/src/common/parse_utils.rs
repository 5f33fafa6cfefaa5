//! Common parsing utilities
//!
//! Shared parsing helpers for consistent syntax across macros.

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Ident, Path, PathArguments, PathSegment, Token, Visibility,
};

// =============================================================================
// Comma-separated List Parsing
// =============================================================================

/// Parse a comma-separated list of items
pub fn parse_comma_separated<T: Parse>(input: ParseStream) -> syn::Result<Vec<T>> {
    let items = Punctuated::<T, Token![,]>::parse_terminated(input)?;
    Ok(items.into_iter().collect())
}

/// Parse `a + b + path::c` (archetype module paths joined by `+`)
pub fn parse_plus_separated_paths(input: ParseStream) -> syn::Result<Vec<Path>> {
    let mut paths = vec![Path::parse_mod_style(input)?];
    while input.peek(Token![+]) {
        input.parse::<Token![+]>()?;
        paths.push(Path::parse_mod_style(input)?);
    }
    Ok(paths)
}

// =============================================================================
// Duplicate Detection
// =============================================================================

/// Check for duplicate archetype paths in a list
pub fn check_duplicates(paths: &[Path]) -> syn::Result<()> {
    use std::collections::HashSet;

    let mut seen = HashSet::new();
    for path in paths {
        let path_str = path_to_string(path);
        if !seen.insert(path_str.clone()) {
            return Err(syn::Error::new_spanned(
                path,
                format!(
                    "duplicate archetype `{}`\n\
                     \n\
                     Each archetype should appear only once in a list.",
                    path_str
                ),
            ));
        }
    }
    Ok(())
}

/// `a::b::c` without the spaces `to_string` inserts
pub fn path_to_string(path: &Path) -> String {
    path.to_token_stream().to_string().replace(' ', "")
}

// =============================================================================
// Paths and Visibility Seen From a Generated Child Module
// =============================================================================

/// Rewrite a path written at some module so it resolves from a module
/// generated directly inside it.
///
/// `a::b` -> `super::a::b`, `self::a` -> `super::a`, `super::a` -> `super::super::a`,
/// `crate::a` and `::a` are kept.
pub fn path_from_child(path: &Path) -> Path {
    if path.leading_colon.is_some() {
        return path.clone();
    }
    let mut out = path.clone();
    let first = match path.segments.first() {
        Some(segment) => segment.ident.to_string(),
        None => return out,
    };
    match first.as_str() {
        "crate" => {}
        "self" => {
            if let Some(segment) = out.segments.first_mut() {
                segment.ident = Ident::new("super", segment.ident.span());
            }
        }
        _ => {
            let span = path.segments.first().map(|s| s.ident.span()).unwrap_or_else(proc_macro2::Span::call_site);
            let mut segments = Punctuated::<PathSegment, Token![::]>::new();
            segments.push(PathSegment { ident: Ident::new("super", span), arguments: PathArguments::None });
            for segment in path.segments.iter() {
                segments.push(segment.clone());
            }
            out.segments = segments;
        }
    }
    out
}

/// Visibility for items re-exported from a generated module so that they are
/// visible wherever the module itself is.
pub fn visibility_from_child(vis: &Visibility) -> syn::Result<TokenStream> {
    match vis {
        Visibility::Public(_) => Ok(quote! { pub }),
        Visibility::Inherited => Ok(quote! { pub(super) }),
        Visibility::Restricted(restricted) => {
            let path = &restricted.path;
            let first = path.segments.first().map(|s| s.ident.to_string()).unwrap_or_default();
            match first.as_str() {
                "crate" => Ok(quote! { pub(in #path) }),
                "self" if path.segments.len() == 1 => Ok(quote! { pub(super) }),
                "super" => {
                    let adjusted = path_from_child(path);
                    Ok(quote! { pub(in #adjusted) })
                }
                _ => Err(syn::Error::new_spanned(
                    vis,
                    "restricted visibility must start with `crate`, `self` or `super`",
                )),
            }
        }
    }
}
