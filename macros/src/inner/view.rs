//! `Marker`, `View<'a>` and `Ptr<'a>` of an archetype module.
//!
//! Leaf and composed archetypes share this generator; they only differ in
//! where each slot lives inside the table (`.slot` vs `.__leaf_x.slot`).

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};
use syn::{ext::IdentExt, parse_quote, Ident, Type};

use crate::common::{MethodModel, Receiver};

/// One requirement as exposed by a view.
pub struct ViewMethod {
    pub model: MethodModel,
    /// Field access into the table, e.g. `.write_3fa9c21b`.
    pub slot: TokenStream,
}

/// What the view surface ends up exposing.
enum Surface {
    Plain(ViewMethod),
    Overloaded(Vec<ViewMethod>),
}

/// Deduplicate identical requirements and group overloads by name.
fn plan(methods: Vec<ViewMethod>) -> syn::Result<Vec<Surface>> {
    let mut seen = HashSet::new();
    let mut groups: Vec<Vec<ViewMethod>> = Vec::new();

    for method in methods {
        if !seen.insert(method.model.identity()) {
            continue;
        }
        match groups.iter_mut().find(|g| g[0].model.name == method.model.name) {
            Some(group) => group.push(method),
            None => groups.push(vec![method]),
        }
    }

    groups
        .into_iter()
        .map(|mut group| {
            if group.len() == 1 {
                return Ok(Surface::Plain(group.remove(0)));
            }
            validate_overloads(&group)?;
            Ok(Surface::Overloaded(group))
        })
        .collect()
}

fn validate_overloads(group: &[ViewMethod]) -> syn::Result<()> {
    let first = &group[0].model;
    let mut params = HashSet::new();
    for method in group.iter().map(|m| &m.model) {
        let span_at = &method.item.sig.ident;
        if method.receiver != first.receiver {
            return Err(syn::Error::new_spanned(
                span_at,
                format!("overloads of `{}` must all take `&self` or all take `&mut self`", method.name),
            ));
        }
        if method.inputs.len() != first.inputs.len() {
            return Err(syn::Error::new_spanned(
                span_at,
                format!(
                    "overloads of `{}` must take the same number of arguments\n\
                     \n\
                     The view dispatches overloads on the argument tuple.",
                    method.name
                ),
            ));
        }
        if method.borrows {
            return Err(syn::Error::new_spanned(
                &method.item.sig.output,
                format!("overloads of `{}` cannot return data borrowed from the receiver", method.name),
            ));
        }
        if !params.insert(method.params_key()) {
            return Err(syn::Error::new_spanned(
                span_at,
                format!(
                    "overloads of `{}` must differ in parameter types\n\
                     \n\
                     Two requirements with the same name and the same parameters\n\
                     cannot be told apart at the call site.",
                    method.name
                ),
            ));
        }
    }
    Ok(())
}

/// `Marker` implementing `Archetype`.
pub fn expand_marker(name: &Ident, methods: &[MethodModel]) -> TokenStream {
    let name_str = name.unraw().to_string();
    let mut seen = HashSet::new();
    let descriptors = methods
        .iter()
        .filter(|m| seen.insert(m.identity()))
        .map(|m| m.descriptor());
    let doc = format!("Marker of the `{}` archetype.", name_str);

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct Marker;

        impl ::archetype::Archetype for Marker {
            const NAME: &'static str = #name_str;
            const METHODS: &'static [::archetype::Method] = &[ #(#descriptors),* ];
            type VTable = VTable;
            type View<'a> = View<'a>;
        }
    }
}

/// `View<'a>`, its overload traits, and `Ptr<'a>`.
pub fn expand_view(methods: Vec<ViewMethod>) -> syn::Result<TokenStream> {
    let shared = methods.iter().all(|m| m.model.receiver == Receiver::Shared);
    let surfaces = plan(methods)?;

    let mut forwarders = Vec::new();
    let mut overloads = Vec::new();
    for surface in &surfaces {
        match surface {
            Surface::Plain(method) => forwarders.push(expand_forwarder(method)),
            Surface::Overloaded(group) => {
                let (method, support) = expand_overloaded(group);
                forwarders.push(method);
                overloads.push(support);
            }
        }
    }

    let (target_ref, bind_raw, copy_derive, reborrow) = if shared {
        (
            quote! { &'a T },
            quote! { ::archetype::RawView::bind(target) },
            quote! { #[derive(Clone, Copy)] },
            quote! {},
        )
    } else {
        (
            quote! { &'a mut T },
            quote! { ::archetype::RawView::bind_mut(target) },
            quote! {},
            quote! {
                /// Shorter-lived view of the same object, leaving `self` usable afterwards.
                #[inline]
                pub fn reborrow(&mut self) -> View<'_> {
                    View { raw: self.raw.reborrow() }
                }
            },
        )
    };

    Ok(quote! {
        /// Non-owning view of any conforming instance.
        ///
        /// Holds one erased object pointer and the table bound for its type.
        #copy_derive
        pub struct View<'a> {
            raw: ::archetype::RawView<'a, VTable>,
        }

        impl<'a> View<'a> {
            /// Bind a view to `target`. The table for `T` is built on first use.
            #[inline]
            pub fn bind<T>(target: #target_ref) -> Self
            where
                VTable: ::archetype::Bind<T>,
            {
                Self { raw: #bind_raw }
            }

            /// Wrap a raw view.
            ///
            /// # Safety
            ///
            /// If the archetype has `&mut self` requirements, `raw` must have
            /// been bound from an exclusive borrow.
            #[doc(hidden)]
            #[inline]
            pub unsafe fn from_raw(raw: ::archetype::RawView<'a, VTable>) -> Self {
                Self { raw }
            }

            /// The underlying object pointer and table.
            #[inline]
            pub fn into_raw(self) -> ::archetype::RawView<'a, VTable> {
                self.raw
            }

            /// The bound table; pointer-equal for views of the same concrete type.
            #[inline]
            pub fn vtable(&self) -> &'static VTable {
                self.raw.vtable()
            }

            #reborrow

            #(#forwarders)*
        }

        #(#overloads)*

        impl<'a, T> ::core::convert::From<#target_ref> for View<'a>
        where
            VTable: ::archetype::Bind<T>,
        {
            #[inline]
            fn from(target: #target_ref) -> Self {
                Self::bind(target)
            }
        }

        impl ::core::fmt::Debug for View<'_> {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct("View")
                    .field("archetype", &<Marker as ::archetype::Archetype>::NAME)
                    .field("object", &self.raw.object().addr())
                    .finish()
            }
        }

        /// Pointer-like wrapper owning one [`View`].
        ///
        /// Dereferences to the view, so requirements are callable directly on
        /// the wrapper. The bound instance itself is never owned.
        #copy_derive
        pub struct Ptr<'a>(View<'a>);

        impl<'a> Ptr<'a> {
            /// Bind a wrapper to `target`.
            #[inline]
            pub fn bind<T>(target: #target_ref) -> Self
            where
                VTable: ::archetype::Bind<T>,
            {
                Ptr(View::bind(target))
            }

            /// Unwrap the view.
            #[inline]
            pub fn into_view(self) -> View<'a> {
                self.0
            }
        }

        impl<'a> ::core::ops::Deref for Ptr<'a> {
            type Target = View<'a>;

            #[inline]
            fn deref(&self) -> &View<'a> {
                &self.0
            }
        }

        impl<'a> ::core::ops::DerefMut for Ptr<'a> {
            #[inline]
            fn deref_mut(&mut self) -> &mut View<'a> {
                &mut self.0
            }
        }

        impl<'a, T> ::core::convert::From<#target_ref> for Ptr<'a>
        where
            VTable: ::archetype::Bind<T>,
        {
            #[inline]
            fn from(target: #target_ref) -> Self {
                Ptr::bind(target)
            }
        }

        impl ::core::fmt::Debug for Ptr<'_> {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_tuple("Ptr").field(&self.0).finish()
            }
        }
    })
}

fn receiver_tokens(receiver: Receiver) -> (TokenStream, TokenStream) {
    match receiver {
        Receiver::Shared => (quote! { &self }, quote! { object }),
        Receiver::Exclusive => (quote! { &mut self }, quote! { object_mut }),
    }
}

fn expand_forwarder(method: &ViewMethod) -> TokenStream {
    let model = &method.model;
    let docs = &model.docs;
    let name = &model.name;
    let args = model.arg_names();
    let inputs = &model.inputs;
    let output = &model.output;
    let slot = &method.slot;
    let (receiver, object) = receiver_tokens(model.receiver);

    quote! {
        #(#docs)*
        #[inline]
        pub fn #name(#receiver #(, #args: #inputs)*) -> #output {
            let slot = self.raw.vtable() #slot;
            unsafe { slot(self.raw.#object() #(, #args)*) }
        }
    }
}

/// One argument tuple the overload trait is implemented for.
struct Shape {
    params: Vec<Type>,
    /// Array lengths left generic, one per array parameter.
    consts: Vec<Ident>,
}

/// Argument types that coerce to `ty` at a call site of the concrete method:
/// arrays and vectors for slices, `String` for `str`.
fn coercion_sources(ty: &Type, len: &Ident) -> Vec<(Type, bool)> {
    let Type::Reference(reference) = ty else {
        return Vec::new();
    };
    let lifetime = &reference.lifetime;
    let mutability = &reference.mutability;
    match &*reference.elem {
        Type::Slice(slice) => {
            let elem = &slice.elem;
            vec![
                (parse_quote! { & #lifetime #mutability [#elem; #len] }, true),
                (parse_quote! { & #lifetime #mutability ::std::vec::Vec<#elem> }, false),
            ]
        }
        Type::Path(path) if path.qself.is_none() && path.path.is_ident("str") => {
            vec![(parse_quote! { & #lifetime #mutability ::std::string::String }, false)]
        }
        _ => Vec::new(),
    }
}

/// Whether `ty` is itself one of the types produced by `coercion_sources`.
fn is_coercion_source(ty: &Type) -> bool {
    let Type::Reference(reference) = ty else {
        return false;
    };
    match &*reference.elem {
        Type::Array(_) => true,
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Vec" || segment.ident == "String"),
        _ => false,
    }
}

/// Exact parameter tuples of every overload, plus the tuples reachable by
/// coercing slice and `str` parameters.
///
/// A position where some overload already names an array, `Vec` or `String`
/// is left exact, so the generated impls never overlap.
fn dispatch_shapes(group: &[ViewMethod]) -> Vec<(&ViewMethod, Shape)> {
    let arity = group[0].model.inputs.len();
    let fixed: Vec<bool> = (0..arity)
        .map(|i| group.iter().any(|m| is_coercion_source(&m.model.inputs[i])))
        .collect();

    let mut seen: HashSet<String> = group.iter().map(|m| m.model.params_key()).collect();
    let mut out = Vec::new();
    for method in group {
        let mut shapes = vec![Shape { params: Vec::new(), consts: Vec::new() }];
        for (i, ty) in method.model.inputs.iter().enumerate() {
            let len = format_ident!("__N{}", i);
            let mut options = vec![(ty.clone(), false)];
            if !fixed[i] {
                options.extend(coercion_sources(ty, &len));
            }

            let mut next = Vec::with_capacity(shapes.len() * options.len());
            for shape in &shapes {
                for (option, sized) in &options {
                    let mut params = shape.params.clone();
                    params.push(option.clone());
                    let mut consts = shape.consts.clone();
                    if *sized {
                        consts.push(len.clone());
                    }
                    next.push(Shape { params, consts });
                }
            }
            shapes = next;
        }

        // The first shape is the exact signature; the rest are coercions.
        let mut shapes = shapes.into_iter();
        if let Some(exact) = shapes.next() {
            out.push((method, exact));
        }
        for shape in shapes {
            let key = shape
                .params
                .iter()
                .map(|ty| crate::common::render_tokens(ty.to_token_stream()))
                .collect::<Vec<_>>()
                .join(", ");
            if seen.insert(key) {
                out.push((method, shape));
            }
        }
    }
    out
}

/// Generic view method plus the argument-tuple trait it dispatches through.
fn expand_overloaded(group: &[ViewMethod]) -> (TokenStream, TokenStream) {
    let first = &group[0].model;
    let name = &first.name;
    let docs = &first.docs;
    let dispatch = format_ident!("__Overload_{}", name.unraw());
    let args = first.arg_names();
    let generics: Vec<Ident> = (0..args.len()).map(|i| format_ident!("__A{}", i)).collect();
    let (receiver, object) = receiver_tokens(first.receiver);
    let view_ref = match first.receiver {
        Receiver::Shared => quote! { &View<'_> },
        Receiver::Exclusive => quote! { &mut View<'_> },
    };

    let impls = dispatch_shapes(group).into_iter().map(|(method, shape)| {
        let Shape { params, consts } = shape;
        let output = &method.model.output;
        let slot = &method.slot;
        quote! {
            impl<#(const #consts: usize),*> #dispatch for ( #(#params,)* ) {
                type Output = #output;

                #[inline]
                fn __call(view: #view_ref, ( #(#args,)* ): Self) -> #output {
                    let slot = view.raw.vtable() #slot;
                    unsafe { slot(view.raw.#object() #(, #args)*) }
                }
            }
        }
    });

    let method = quote! {
        #(#docs)*
        #[inline]
        pub fn #name<#(#generics),*>(#receiver #(, #args: #generics)*)
            -> <( #(#generics,)* ) as #dispatch>::Output
        where
            ( #(#generics,)* ): #dispatch,
        {
            <( #(#generics,)* ) as #dispatch>::__call(self, ( #(#args,)* ))
        }
    };

    let support = quote! {
        #[doc(hidden)]
        pub trait #dispatch {
            type Output;
            fn __call(view: #view_ref, args: Self) -> Self::Output;
        }

        #(#impls)*
    };

    (method, support)
}
