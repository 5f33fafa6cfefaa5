//! `compose!` - union of previously declared archetypes
//!
//! ```ignore
//! compose! {
//!     /// Both ends of a pipe.
//!     pub read_write = readable + writable;
//! }
//! ```
//!
//! The composed table embeds every distinct leaf table once, so a diamond
//! (`abc = ab + ac`) carries `a` a single time, and the composed view keeps a
//! single object pointer.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    Attribute, Ident, Path, Token, Visibility,
};

use super::chain::{self, Found, Mode};
use crate::common::{
    check_duplicates, leaf_ident, parse_plus_separated_paths, path_from_child, path_to_string,
    visibility_from_child,
};
use crate::inner::{
    callback::expand_composed_callback,
    dedupe_leaves,
    table::expand_composed_table,
    view::{expand_marker, expand_view, ViewMethod},
    Leaf,
};

/// `#[attrs] vis name = a + b + path::c;`
struct ComposeInput {
    attrs: Vec<Attribute>,
    vis: Visibility,
    name: Ident,
    parts: Vec<Path>,
}

impl Parse for ComposeInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        let name: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let parts = parse_plus_separated_paths(input)?;
        if input.peek(Token![;]) {
            input.parse::<Token![;]>()?;
        }
        if !input.is_empty() {
            return Err(input.error("expected one composition per `compose!`"));
        }
        if parts.len() < 2 {
            return Err(syn::Error::new_spanned(
                &name,
                "`compose!` needs at least two archetypes\n\
                 \n\
                 A single archetype can be used directly.",
            ));
        }
        check_duplicates(&parts)?;
        visibility_from_child(&vis)?;
        Ok(ComposeInput { attrs, vis, name, parts })
    }
}

pub fn expand_compose(input: TokenStream) -> syn::Result<TokenStream> {
    let parsed: ComposeInput = syn::parse2(input.clone())?;
    chain::start(Mode::Compose, input, parsed.parts)
}

pub fn finish_compose(payload: TokenStream, found: Vec<Found>) -> syn::Result<TokenStream> {
    let ComposeInput { attrs, vis, name, parts } = syn::parse2(payload)?;
    let leaves: Vec<Leaf> = dedupe_leaves(found.into_iter().map(|f| f.leaf).collect());

    let reexport_vis = visibility_from_child(&vis)?;
    let reexports = leaves.iter().map(|leaf| {
        let path = path_from_child(&leaf.path);
        let alias = leaf_ident(&leaf.salt);
        quote! {
            #[doc(hidden)]
            #reexport_vis use #path as #alias;
        }
    });

    let mut view_methods = Vec::new();
    let mut all_methods = Vec::new();
    for leaf in &leaves {
        let alias = leaf_ident(&leaf.salt);
        for (i, model) in leaf.methods.iter().enumerate() {
            let slot = leaf.slot(i);
            view_methods.push(ViewMethod { model: model.clone(), slot: quote! { .#alias.#slot } });
            all_methods.push(model.clone());
        }
    }

    let view = expand_view(view_methods).map_err(|mut err| {
        err.combine(syn::Error::new_spanned(
            &name,
            format!("conflicting requirements among the constituents of `{}`", name),
        ));
        err
    })?;
    let marker = expand_marker(&name, &all_methods);
    let table = expand_composed_table(&leaves);
    let callback = expand_composed_callback(&leaves);

    let narrowing = leaves.iter().map(|leaf| {
        let alias = leaf_ident(&leaf.salt);
        quote! {
            impl<'a> ::core::convert::From<View<'a>> for #alias::View<'a> {
                #[inline]
                fn from(view: View<'a>) -> Self {
                    let raw = view.raw.project(|table| &table.#alias);
                    // Same object and the leaf table embedded in its composed table
                    unsafe { #alias::View::from_raw(raw) }
                }
            }
        }
    });

    let default_doc = if attrs.iter().any(|a| a.path().is_ident("doc")) {
        quote! {}
    } else {
        let parts: Vec<String> = parts.iter().map(path_to_string).collect();
        let doc = format!("Composition of `{}`.", parts.join(" + "));
        quote! { #[doc = #doc] }
    };

    Ok(quote! {
        #(#attrs)*
        #default_doc
        #vis mod #name {
            #![allow(dead_code, unused_imports, non_camel_case_types, clippy::all)]

            use super::*;

            #(#reexports)*

            #marker
            #table
            #view
            #(#narrowing)*
            #callback
        }
    })
}
