//! `conform!(Type: a, b)` and `assert_conforms!(Type: a, b)`

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Path, Token, Type,
};

use super::chain::{self, Found, Mode};
use crate::common::check_duplicates;
use crate::inner::{dedupe_leaves, probe::expand_assertion, table::expand_leaf_bind, Leaf};

/// `Type: archetype, path::to::archetype`
struct ConformInput {
    ty: Type,
    archetypes: Vec<Path>,
}

impl Parse for ConformInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ty: Type = input.parse()?;
        input.parse::<Token![:]>()?;
        let archetypes: Vec<Path> = Punctuated::<Path, Token![,]>::parse_terminated_with(input, Path::parse_mod_style)?
            .into_iter()
            .collect();
        if archetypes.is_empty() {
            return Err(input.error("expected at least one archetype after `:`"));
        }
        check_duplicates(&archetypes)?;
        Ok(ConformInput { ty, archetypes })
    }
}

pub fn expand_conform(input: TokenStream) -> syn::Result<TokenStream> {
    let parsed: ConformInput = syn::parse2(input)?;
    let ty = &parsed.ty;
    chain::start(Mode::Conform, quote! { #ty }, parsed.archetypes)
}

pub fn expand_assert(input: TokenStream) -> syn::Result<TokenStream> {
    let parsed: ConformInput = syn::parse2(input)?;
    let ty = &parsed.ty;
    chain::start(Mode::Assert, quote! { #ty }, parsed.archetypes)
}

fn leaves_of(found: Vec<Found>) -> Vec<Leaf> {
    dedupe_leaves(found.into_iter().map(|f| f.leaf).collect())
}

/// One `Bind` impl per distinct leaf.
pub fn finish_conform(payload: TokenStream, found: Vec<Found>) -> syn::Result<TokenStream> {
    let ty: Type = syn::parse2(payload)?;
    let binds = leaves_of(found).into_iter().map(|leaf| expand_leaf_bind(&leaf, &ty));
    Ok(quote! { #(#binds)* })
}

/// Gates only: the static-assertion form.
pub fn finish_assert(payload: TokenStream, found: Vec<Found>) -> syn::Result<TokenStream> {
    let ty: Type = syn::parse2(payload)?;
    let leaves = leaves_of(found);
    let assertions = leaves
        .iter()
        .flat_map(|leaf| leaf.methods.iter())
        .map(|method| expand_assertion(method, &ty));
    Ok(quote! {
        const _: () = {
            #[allow(dead_code)]
            fn __assert_conforms() {
                #(#assertions)*
            }
        };
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_rejects_duplicates() {
        assert!(syn::parse_str::<ConformInput>("Writer: writable, writable").is_err());
        assert!(syn::parse_str::<ConformInput>("Writer:").is_err());
        let ok = syn::parse_str::<ConformInput>("Vec<u8>: writable, io::readable,").unwrap();
        assert_eq!(ok.archetypes.len(), 2);
    }

    #[test]
    fn test_diamond_leaves_bound_once() {
        let found: Vec<Found> = ["0", "1"]
            .iter()
            .map(|tag| {
                syn::parse_str::<Found>(&format!(
                    "{} \"00ff\" satisfies_a [satisfies_a ::] {{ fn do_a(&self); }}",
                    tag
                ))
                .unwrap()
            })
            .collect();
        let out = finish_conform(quote! { AB }, found).unwrap().to_string().replace(' ', "");
        assert_eq!(out.matches("Bind<AB>").count(), 1);
    }
}
