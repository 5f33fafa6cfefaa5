//! Continuation passing through archetype callbacks.
//!
//! `check!`, `conform!`, `assert_conforms!` and `compose!` all need the
//! requirement lists of archetypes declared elsewhere. They start a chain:
//! each pending archetype path is asked for its leaves through its
//! `__archetype_callback!`, which appends them and re-enters `__continue!`
//! with the remaining work. When nothing is pending, the mode's finisher
//! generates the final code.
//!
//! ```text
//! __continue! {
//!     { <mode> ( <payload> ) [ (1 readable) (2 io::seekable) ] }
//!     [ (0 "3fa9c21b5e0d7a44" writable [writable ::] { fn write(&mut self, buf: &[u8]) -> usize; }) ]
//! }
//! ```
//!
//! Tags number the archetype paths of the original invocation, so a finisher
//! knows which leaves came from which path.

use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{
    ext::IdentExt,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Ident, LitInt, LitStr, Path, PathSegment, Token,
};

use super::{check, compose, conform};
use crate::common::MethodList;
use crate::inner::Leaf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Check,
    Conform,
    Assert,
    Compose,
}

impl Mode {
    fn keyword(self) -> &'static str {
        match self {
            Mode::Check => "check",
            Mode::Conform => "conform",
            Mode::Assert => "assert",
            Mode::Compose => "compose",
        }
    }

    fn from_ident(ident: &Ident) -> syn::Result<Self> {
        match ident.to_string().as_str() {
            "check" => Ok(Mode::Check),
            "conform" => Ok(Mode::Conform),
            "assert" => Ok(Mode::Assert),
            "compose" => Ok(Mode::Compose),
            other => Err(syn::Error::new_spanned(ident, format!("unknown continuation `{}`", other))),
        }
    }
}

/// An archetype path still to be asked for its leaves.
pub struct Pending {
    pub tag: usize,
    pub path: Path,
}

/// A leaf reported by a callback, with the tag of the path that reached it.
pub struct Found {
    pub tag: usize,
    pub leaf: Leaf,
}

/// Begin a chain over `paths`, tagged by position.
pub fn start(mode: Mode, payload: TokenStream, paths: Vec<Path>) -> syn::Result<TokenStream> {
    let todo = paths
        .into_iter()
        .enumerate()
        .map(|(tag, path)| Pending { tag, path })
        .collect();
    advance(mode, payload, todo, TokenStream::new())
}

fn advance(mode: Mode, payload: TokenStream, todo: Vec<Pending>, found: TokenStream) -> syn::Result<TokenStream> {
    let mut todo = todo.into_iter();
    let next = match todo.next() {
        Some(next) => next,
        None => return finish(mode, payload, found),
    };

    let keyword = Ident::new(mode.keyword(), proc_macro2::Span::call_site());
    let path = &next.path;
    let tag = Literal::usize_unsuffixed(next.tag);
    let rest = todo.map(|pending| {
        let tag = Literal::usize_unsuffixed(pending.tag);
        let path = &pending.path;
        quote! { (#tag #path) }
    });

    Ok(quote! {
        #path::__archetype_callback! {
            @leaves [#path ::] #tag { #keyword ( #payload ) [ #(#rest)* ] } [ #found ]
        }
    })
}

fn finish(mode: Mode, payload: TokenStream, found: TokenStream) -> syn::Result<TokenStream> {
    let found = syn::parse2::<FoundList>(found)?.0;
    match mode {
        Mode::Check => check::finish_check(payload, found),
        Mode::Conform => conform::finish_conform(payload, found),
        Mode::Assert => conform::finish_assert(payload, found),
        Mode::Compose => compose::finish_compose(payload, found),
    }
}

// =============================================================================
// __continue! Input
// =============================================================================

pub struct ChainInput {
    mode: Mode,
    payload: TokenStream,
    todo: Vec<Pending>,
    found: TokenStream,
}

impl Parse for ChainInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let state;
        syn::braced!(state in input);
        let mode = Mode::from_ident(&state.parse()?)?;

        let payload;
        syn::parenthesized!(payload in state);
        let payload: TokenStream = payload.parse()?;

        let pending;
        syn::bracketed!(pending in state);
        let mut todo = Vec::new();
        while !pending.is_empty() {
            let entry;
            syn::parenthesized!(entry in pending);
            let tag: LitInt = entry.parse()?;
            let path = Path::parse_mod_style(&entry)?;
            todo.push(Pending { tag: tag.base10_parse()?, path });
        }

        let found;
        syn::bracketed!(found in input);
        let found: TokenStream = found.parse()?;

        Ok(ChainInput { mode, payload, todo, found })
    }
}

impl ChainInput {
    /// Ask the next callback, or finish.
    pub fn resume(self) -> syn::Result<TokenStream> {
        advance(self.mode, self.payload, self.todo, self.found)
    }
}

struct FoundList(Vec<Found>);

impl Parse for FoundList {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut found = Vec::new();
        while !input.is_empty() {
            let entry;
            syn::parenthesized!(entry in input);
            found.push(entry.parse()?);
        }
        Ok(FoundList(found))
    }
}

impl Parse for Found {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let tag: LitInt = input.parse()?;
        let salt: LitStr = input.parse()?;
        let name: Ident = input.call(Ident::parse_any)?;

        let prefix;
        syn::bracketed!(prefix in input);
        let path = parse_prefix(&prefix)?;

        let entries;
        syn::braced!(entries in input);
        let list: MethodList = entries.parse()?;

        Ok(Found {
            tag: tag.base10_parse()?,
            leaf: Leaf { salt: salt.value(), name, path, methods: list.methods },
        })
    }
}

/// Parse `a :: b :: c ::` (module path with a trailing `::`).
fn parse_prefix(input: ParseStream) -> syn::Result<Path> {
    let leading_colon: Option<Token![::]> = input.parse()?;
    let mut segments = Punctuated::<PathSegment, Token![::]>::new();
    while !input.is_empty() {
        let ident = input.call(Ident::parse_any)?;
        let colons: Token![::] = input.parse()?;
        segments.push_value(PathSegment::from(ident));
        if !input.is_empty() {
            segments.push_punct(colons);
        }
    }
    if segments.is_empty() {
        return Err(input.error("expected an archetype module path"));
    }
    Ok(Path { leading_colon, segments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::path_to_string;

    #[test]
    fn test_first_step_calls_first_callback() {
        let paths = vec![syn::parse_str("io::readable").unwrap(), syn::parse_str("writable").unwrap()];
        let out = start(Mode::Conform, quote! { File }, paths).unwrap().to_string().replace(' ', "");
        assert!(out.starts_with("io::readable::__archetype_callback!"));
        assert!(out.contains("@leaves[io::readable::]0{conform(File)[(1writable)]}[]"));
    }

    #[test]
    fn test_resume_parses_state() {
        let input: ChainInput = syn::parse_str(
            "{ check (X: a & b) [ (1 b) ] } [ (0 \"00ff\" a [a ::] { fn f(&self); }) ]",
        )
        .unwrap();
        assert_eq!(input.mode, Mode::Check);
        assert_eq!(input.todo.len(), 1);
        let out = input.resume().unwrap().to_string().replace(' ', "");
        assert!(out.starts_with("b::__archetype_callback!"));
        assert!(out.contains("\"00ff\"a[a::]"));
    }

    #[test]
    fn test_found_prefix_through_composition() {
        let found: Found = syn::parse_str("(3 \"00ff\" writable [crate::rw::__leaf_00ff ::] { fn write(&mut self, buf: &[u8]) -> usize; })")
            .map(|FoundList(mut list)| list.remove(0))
            .unwrap();
        assert_eq!(found.tag, 3);
        assert_eq!(path_to_string(&found.leaf.path), "crate::rw::__leaf_00ff");
        assert_eq!(found.leaf.methods.len(), 1);
    }
}
