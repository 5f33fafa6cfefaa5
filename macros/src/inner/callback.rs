//! The per-archetype callback macro.
//!
//! Procedural macros cannot look up what another macro invocation declared,
//! so every archetype module carries a crate-local `macro_rules!` that hands
//! its leaves (salt, name, module path, requirements) to `__continue!`:
//!
//! ```text
//! writable::__archetype_callback! {
//!     @leaves [writable ::] 0 { <state> } [ <found so far> ]
//! }
//! => ::archetype::__continue! {
//!     { <state> } [ <found so far> (0 "3fa9.." writable [writable ::] { fn write(..) -> usize; }) ]
//! }
//! ```
//!
//! A composed archetype reports each of its leaves, reachable through its
//! `__leaf_<salt>` re-exports.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;

use super::Leaf;
use crate::common::{leaf_ident, methods_to_tokens, MethodModel};

/// Callback of a leaf archetype.
pub fn expand_leaf_callback(salt: &str, name: &Ident, methods: &[MethodModel]) -> TokenStream {
    let entries = methods_to_tokens(methods);
    let found = quote! {
        ( $tag #salt #name [ $($prefix)* ] { #entries } )
    };
    expand_callback(found)
}

/// Callback of a composed archetype: one found entry per leaf.
pub fn expand_composed_callback(leaves: &[Leaf]) -> TokenStream {
    let found = leaves.iter().map(|leaf| {
        let salt = &leaf.salt;
        let name = &leaf.name;
        let alias = leaf_ident(salt);
        let entries = methods_to_tokens(&leaf.methods);
        quote! {
            ( $tag #salt #name [ $($prefix)* #alias :: ] { #entries } )
        }
    });
    expand_callback(quote! { #(#found)* })
}

fn expand_callback(found: TokenStream) -> TokenStream {
    quote! {
        #[doc(hidden)]
        #[allow(unused_macros)]
        macro_rules! __archetype_callback {
            (@leaves [ $($prefix:tt)* ] $tag:tt { $($state:tt)* } [ $($found:tt)* ]) => {
                ::archetype::__continue! {
                    { $($state)* } [ $($found)* #found ]
                }
            };
        }

        #[doc(hidden)]
        #[allow(unused_imports)]
        pub(crate) use __archetype_callback;
    }
}
