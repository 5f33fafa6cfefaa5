//! `check!(Type: expr, ...)` - structural conformance as a `bool`

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    Path, Token, Type,
};

use super::chain::{self, Found, Mode};
use crate::common::{parse_comma_separated, BoolExpr};
use crate::inner::{dedupe_leaves, probe::expand_probe, Leaf};

/// A single check: `Type: BoolExpr`
struct CheckClause {
    ty: Type,
    expr: BoolExpr,
}

impl Parse for CheckClause {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ty: Type = input.parse()?;
        input.parse::<Token![:]>()?;
        let expr: BoolExpr = input.parse()?;
        Ok(CheckClause { ty, expr })
    }
}

/// Multiple checks separated by commas
struct CheckInput {
    clauses: Vec<CheckClause>,
}

impl Parse for CheckInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let clauses = parse_comma_separated(input)?;
        if clauses.is_empty() {
            return Err(input.error("expected `Type: archetype`"));
        }
        Ok(CheckInput { clauses })
    }
}

pub fn expand_check(input: TokenStream) -> syn::Result<TokenStream> {
    let parsed: CheckInput = syn::parse2(input.clone())?;
    let atoms: Vec<Path> = parsed
        .clauses
        .iter()
        .flat_map(|clause| clause.expr.atoms().into_iter().cloned())
        .collect();
    chain::start(Mode::Check, input, atoms)
}

pub fn finish_check(payload: TokenStream, found: Vec<Found>) -> syn::Result<TokenStream> {
    let parsed: CheckInput = syn::parse2(payload)?;

    let atom_count: usize = parsed.clauses.iter().map(|c| c.expr.atoms().len()).sum();
    let mut per_atom: Vec<Vec<Leaf>> = (0..atom_count).map(|_| Vec::new()).collect();
    for Found { tag, leaf } in found {
        if let Some(slot) = per_atom.get_mut(tag) {
            slot.push(leaf);
        }
    }

    let mut per_atom = per_atom.into_iter();
    let mut clauses = Vec::new();
    for clause in &parsed.clauses {
        let ty = &clause.ty;
        let values: Vec<TokenStream> = (0..clause.expr.atoms().len())
            .map(|_| {
                let leaves = dedupe_leaves(per_atom.next().unwrap_or_default());
                let probes: Vec<TokenStream> = leaves
                    .iter()
                    .flat_map(|leaf| leaf.methods.iter())
                    .map(|method| expand_probe(method, ty))
                    .collect();
                if probes.is_empty() {
                    quote! { true }
                } else {
                    quote! { (#(#probes)&&*) }
                }
            })
            .collect();
        let expr = clause.expr.to_expr(&mut values.into_iter());
        clauses.push(quote! {
            {
                // Reference user's type to prevent "unused import" warnings
                let _ = ::core::marker::PhantomData::<#ty>;
                #expr
            }
        });
    }

    Ok(quote! {
        ( #(#clauses)&&* )
    })
}
