//! Conformance probes and gates for one requirement.
//!
//! - probe: `bool` via autoref fallback, for `check!`
//! - gate: hard error on mismatch, for `conform!` and `assert_conforms!`

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ext::IdentExt, Type};

use crate::common::MethodModel;

/// Expression evaluating to whether `ty` satisfies one requirement.
pub fn expand_probe(method: &MethodModel, ty: &Type) -> TokenStream {
    let target = &method.target;
    let missing = format_ident!("__Absent_{}", target.unraw());
    let bound = method.fn_bound(&quote! { X });

    quote! {
        {
            #[allow(non_camel_case_types, dead_code)]
            trait #missing {
                fn #target(_: ::archetype::probe::Missing) {}
            }
            impl<X: ?Sized> #missing for X {}

            struct __Probe<X: ?Sized, F>(
                ::core::marker::PhantomData<fn(&X)>,
                ::core::marker::PhantomData<F>,
            );
            impl<X: ?Sized, F> __Probe<X, F>
            where
                F: #bound,
            {
                #[inline]
                fn hit(&self) -> bool {
                    true
                }
            }
            fn __probe<X: ?Sized, F>(_: &F) -> __Probe<X, F> {
                __Probe(::core::marker::PhantomData, ::core::marker::PhantomData)
            }

            #[allow(unused_imports)]
            use ::archetype::probe::Unmatched as _;
            __probe::<#ty, _>(&<#ty>::#target).hit()
        }
    }
}

/// Local gate function accepting only methods with the exact signature.
///
/// Expands to items; call it as `__gate::<Ty, _>(<Ty>::method)`.
pub fn expand_gate(method: &MethodModel) -> TokenStream {
    let bound = method.fn_bound(&quote! { X });
    quote! {
        #[inline(always)]
        fn __gate<X: ?Sized, F>(method: F) -> F
        where
            F: #bound,
        {
            method
        }
    }
}

/// Statement asserting that `ty` satisfies one requirement.
pub fn expand_assertion(method: &MethodModel, ty: &Type) -> TokenStream {
    let gate = expand_gate(method);
    let target = &method.target;
    quote! {
        {
            #gate
            let _ = __gate::<#ty, _>(<#ty>::#target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_mentions_exact_bound() {
        let method = MethodModel::from_item(syn::parse_str("fn write(&mut self, buf: &[u8]) -> usize;").unwrap()).unwrap();
        let ty: Type = syn::parse_str("Writer").unwrap();
        let out = expand_probe(&method, &ty).to_string().replace(' ', "");
        assert!(out.contains("Fn(&'__archetypemutX,&[u8])->usize"));
        assert!(out.contains("<Writer>::write"));
        assert!(out.contains("__Absent_write"));
    }

    #[test]
    fn test_gate_uses_target_name() {
        let method = MethodModel::from_item(syn::parse_str("#[via(func0_f64)] fn func0(&self, a: f64) -> f64;").unwrap()).unwrap();
        let ty: Type = syn::parse_str("Overloaded").unwrap();
        let out = expand_assertion(&method, &ty).to_string().replace(' ', "");
        assert!(out.contains("<Overloaded>::func0_f64"));
    }
}
