//! Dispatch table structs and their `Bind` impls.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

use super::{probe::expand_gate, Leaf};
use crate::common::{leaf_ident, slot_ident, MethodModel, Receiver};

/// `VTable` of a leaf archetype: one slot per requirement.
pub fn expand_leaf_table(salt: &str, methods: &[MethodModel]) -> TokenStream {
    let slots = methods.iter().enumerate().map(|(i, m)| slot_ident(salt, i, &m.name));
    let types = methods.iter().map(|m| m.slot_type());
    let count = methods.len();
    let doc = format!("Dispatch table with {} trampoline slot(s).", count);

    quote! {
        #[doc = #doc]
        #[derive(Clone, Copy)]
        pub struct VTable {
            #(
                #[doc(hidden)]
                pub #slots: #types,
            )*
        }

        impl ::archetype::VTable for VTable {}
    }
}

/// `VTable` of a composition: one embedded table per distinct leaf.
pub fn expand_composed_table(leaves: &[Leaf]) -> TokenStream {
    let aliases: Vec<_> = leaves.iter().map(|leaf| leaf_ident(&leaf.salt)).collect();
    let names = leaves.iter().map(|leaf| leaf.name.to_string());
    let doc = format!("Dispatch table embedding {} constituent table(s).", leaves.len());

    quote! {
        #[doc = #doc]
        #[derive(Clone, Copy)]
        pub struct VTable {
            #(
                #[doc = #names]
                pub #aliases: #aliases::VTable,
            )*
        }

        impl ::archetype::VTable for VTable {}

        unsafe impl<T> ::archetype::Bind<T> for VTable
        where
            #( #aliases::VTable: ::archetype::Bind<T>, )*
        {
            const TABLE: Self = Self {
                #( #aliases: <#aliases::VTable as ::archetype::Bind<T>>::TABLE, )*
            };
        }
    }
}

/// `unsafe impl Bind<ty>` for a leaf table, with one trampoline per slot.
pub fn expand_leaf_bind(leaf: &Leaf, ty: &Type) -> TokenStream {
    let path = &leaf.path;
    let slots = leaf.methods.iter().enumerate().map(|(i, m)| slot_ident(&leaf.salt, i, &m.name));
    let trampolines = leaf.methods.iter().map(|m| expand_trampoline(m, ty));

    quote! {
        unsafe impl ::archetype::Bind<#ty> for #path::VTable {
            const TABLE: Self = Self {
                #( #slots: #trampolines, )*
            };
        }
    }
}

/// Block evaluating to the trampoline of `method` for `ty`.
///
/// The erased pointer is only ever cast back to `ty`, which is the invariant
/// `Bind` promises.
fn expand_trampoline(method: &MethodModel, ty: &Type) -> TokenStream {
    let lt = MethodModel::lifetime();
    let gate = expand_gate(method);
    let target = &method.target;
    let args = method.arg_names();
    let inputs = &method.inputs;
    let output = method.bound_output();
    let object = match method.receiver {
        Receiver::Shared => quote! { this.as_ref::<#ty>() },
        Receiver::Exclusive => quote! { this.as_mut::<#ty>() },
    };

    quote! {
        {
            #gate

            unsafe fn __trampoline<#lt>(
                this: ::archetype::Erased<#lt>
                #(, #args: #inputs)*
            ) -> #output {
                let method = __gate::<#ty, _>(<#ty>::#target);
                method(unsafe { #object } #(, #args)*)
            }

            __trampoline
        }
    }
}
