//! `define!` - declare leaf archetypes
//!
//! ```ignore
//! define! {
//!     /// Sink for bytes.
//!     pub writable {
//!         fn write(&mut self, buf: &[u8]) -> usize;
//!     }
//!
//!     basic_overload {
//!         fn func0(&self, a: i32) -> i32;
//!         #[via(func0_f64)]
//!         fn func0(&self, a: f64) -> f64;
//!     }
//! }
//! ```
//!
//! Each archetype becomes a module holding `Marker`, `VTable`, `View`, `Ptr`
//! and the callback later macros use to read the requirement list.

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    Attribute, Ident, Visibility,
};

use crate::common::{archetype_salt, slot_ident, MethodList};
use crate::inner::{
    callback::expand_leaf_callback,
    table::expand_leaf_table,
    view::{expand_marker, expand_view, ViewMethod},
};

/// `#[attrs] vis name { requirements }`
pub struct ArchetypeDecl {
    pub attrs: Vec<Attribute>,
    pub vis: Visibility,
    pub name: Ident,
    pub body: TokenStream,
}

impl Parse for ArchetypeDecl {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        let name: Ident = input.parse()?;
        let content;
        syn::braced!(content in input);
        let body: TokenStream = content.parse()?;
        Ok(ArchetypeDecl { attrs, vis, name, body })
    }
}

pub struct DefineInput {
    pub decls: Vec<ArchetypeDecl>,
}

impl Parse for DefineInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut decls = Vec::new();
        while !input.is_empty() {
            decls.push(input.parse()?);
        }
        Ok(DefineInput { decls })
    }
}

pub fn expand_define(input: DefineInput) -> syn::Result<TokenStream> {
    let mut out = TokenStream::new();
    for decl in input.decls {
        expand_archetype(decl)?.to_tokens(&mut out);
    }
    Ok(out)
}

fn expand_archetype(decl: ArchetypeDecl) -> syn::Result<TokenStream> {
    let ArchetypeDecl { attrs, vis, name, body } = decl;
    let list: MethodList = syn::parse2(body.clone())?;
    let methods = list.methods;
    let salt = archetype_salt(&name, &body);

    let view_methods = methods
        .iter()
        .enumerate()
        .map(|(i, model)| {
            let slot = slot_ident(&salt, i, &model.name);
            ViewMethod { model: model.clone(), slot: quote! { .#slot } }
        })
        .collect();

    let marker = expand_marker(&name, &methods);
    let table = expand_leaf_table(&salt, &methods);
    let view = expand_view(view_methods)?;
    let callback = expand_leaf_callback(&salt, &name, &methods);

    let default_doc = if attrs.iter().any(|a| a.path().is_ident("doc")) {
        quote! {}
    } else {
        let doc = format!("Archetype `{}` ({} requirement(s)).", name, methods.len());
        quote! { #[doc = #doc] }
    };

    Ok(quote! {
        #(#attrs)*
        #default_doc
        #vis mod #name {
            #![allow(dead_code, unused_imports, non_camel_case_types, clippy::all)]

            use super::*;

            #marker
            #table
            #view
            #callback
        }
    })
}
