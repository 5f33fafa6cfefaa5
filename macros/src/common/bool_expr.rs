// Boolean expression parsing and evaluation for archetype checks

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    Path, Token,
};

// =============================================================================
// Boolean Expression AST
// =============================================================================

#[derive(Clone, Debug)]
pub enum BoolExpr {
    Archetype(Path),
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
    Not(Box<BoolExpr>),
}

impl Parse for BoolExpr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        parse_or(input)
    }
}

// Recursive descent parser: Or -> And -> Unary -> Primary

fn parse_or(input: ParseStream) -> syn::Result<BoolExpr> {
    let mut lhs = parse_and(input)?;

    while input.peek(Token![|]) {
        input.parse::<Token![|]>()?;
        let rhs = parse_and(input)?;
        lhs = BoolExpr::Or(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

fn parse_and(input: ParseStream) -> syn::Result<BoolExpr> {
    let mut lhs = parse_unary(input)?;

    while input.peek(Token![&]) {
        input.parse::<Token![&]>()?;
        let rhs = parse_unary(input)?;
        lhs = BoolExpr::And(Box::new(lhs), Box::new(rhs));
    }
    Ok(lhs)
}

fn parse_unary(input: ParseStream) -> syn::Result<BoolExpr> {
    if input.peek(Token![!]) {
        input.parse::<Token![!]>()?;
        let operand = parse_unary(input)?;
        Ok(BoolExpr::Not(Box::new(operand)))
    } else {
        parse_primary(input)
    }
}

fn parse_primary(input: ParseStream) -> syn::Result<BoolExpr> {
    if input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in input);
        content.parse()
    } else {
        // Archetypes are modules: no generic arguments
        let path = Path::parse_mod_style(input)?;
        Ok(BoolExpr::Archetype(path))
    }
}

// =============================================================================
// BoolExpr Utilities
// =============================================================================

impl BoolExpr {
    /// Archetype paths in left-to-right order (repeats included).
    pub fn atoms(&self) -> Vec<&Path> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a Path>) {
        match self {
            BoolExpr::Archetype(path) => out.push(path),
            BoolExpr::And(lhs, rhs) | BoolExpr::Or(lhs, rhs) => {
                lhs.collect_atoms(out);
                rhs.collect_atoms(out);
            }
            BoolExpr::Not(operand) => operand.collect_atoms(out),
        }
    }

    /// Build the runtime expression, consuming one atom value per archetype
    /// in the same order as [`BoolExpr::atoms`].
    pub fn to_expr(&self, values: &mut impl Iterator<Item = TokenStream>) -> TokenStream {
        match self {
            BoolExpr::Archetype(_) => values.next().unwrap_or_else(|| quote! { false }),
            BoolExpr::And(lhs, rhs) => {
                let l = lhs.to_expr(values);
                let r = rhs.to_expr(values);
                quote! { (#l && #r) }
            }
            BoolExpr::Or(lhs, rhs) => {
                let l = lhs.to_expr(values);
                let r = rhs.to_expr(values);
                quote! { (#l || #r) }
            }
            BoolExpr::Not(operand) => {
                let o = operand.to_expr(values);
                quote! { (!#o) }
            }
        }
    }
}
