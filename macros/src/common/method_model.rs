//! Model of one archetype requirement.
//!
//! Requirements are written as trait-style method declarations:
//!
//! ```ignore
//! /// Docs are forwarded to the view method.
//! fn write(&mut self, buf: &[u8]) -> usize;
//!
//! #[via(write_all)]          // overload bound to a differently named method
//! fn write(&mut self, buf: &[u8], flush: bool) -> usize;
//! ```
//!
//! Everything that generated code needs (probe bounds, slot types, view
//! signatures, rendered descriptors) is derived from a [`MethodModel`].

use proc_macro2::{Span, TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};
use syn::{
    ext::IdentExt,
    parse::{Parse, ParseStream},
    visit::{self, Visit},
    visit_mut::{self, VisitMut},
    Attribute, FnArg, Ident, Lifetime, ReturnType, TraitItemFn, Type,
};

/// Lifetime tying borrowed outputs to the view receiver.
pub const RECEIVER_LIFETIME: &str = "'__archetype";

/// Names taken by the generated `View` / `Ptr` API.
const RESERVED: &[&str] = &["bind", "vtable", "from_raw", "into_raw", "reborrow", "into_view"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// `&self`
    Shared,
    /// `&mut self`
    Exclusive,
}

#[derive(Clone)]
pub struct MethodModel {
    /// The declaration as written, re-emitted in callbacks.
    pub item: TraitItemFn,
    /// `doc` attributes, forwarded to view methods.
    pub docs: Vec<Attribute>,
    /// Name the view exposes.
    pub name: Ident,
    /// Name looked up on the concrete type.
    pub target: Ident,
    pub receiver: Receiver,
    pub inputs: Vec<Type>,
    /// Declared output, `()` when omitted.
    pub output: Type,
    /// Whether the output borrows from the receiver through elided lifetimes.
    pub borrows: bool,
}

// =============================================================================
// Parsing and Validation
// =============================================================================

impl MethodModel {
    pub fn from_item(item: TraitItemFn) -> syn::Result<Self> {
        if let Some(body) = &item.default {
            return Err(syn::Error::new_spanned(body, "archetype requirements cannot have a body"));
        }

        let sig = &item.sig;
        if let Some(token) = &sig.constness {
            return Err(syn::Error::new_spanned(token, "`const` requirements are not supported"));
        }
        if let Some(token) = &sig.asyncness {
            return Err(syn::Error::new_spanned(token, "`async` requirements are not supported"));
        }
        if let Some(token) = &sig.unsafety {
            return Err(syn::Error::new_spanned(token, "`unsafe` requirements are not supported"));
        }
        if let Some(abi) = &sig.abi {
            return Err(syn::Error::new_spanned(abi, "`extern` requirements are not supported"));
        }
        if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "generic requirements are not supported\n\
                 \n\
                 Every requirement becomes one slot of a dispatch table, so its\n\
                 signature must be fully concrete.",
            ));
        }
        if let Some(variadic) = &sig.variadic {
            return Err(syn::Error::new_spanned(variadic, "variadic requirements are not supported"));
        }
        if RESERVED.contains(&sig.ident.unraw().to_string().as_str()) {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                format!("`{}` is reserved by the generated view", sig.ident),
            ));
        }

        let mut args = sig.inputs.iter();
        let receiver = match args.next() {
            Some(FnArg::Receiver(recv)) if recv.colon_token.is_none() && recv.reference.is_some() => {
                if let Some((_, Some(lifetime))) = &recv.reference {
                    return Err(syn::Error::new_spanned(
                        lifetime,
                        "receiver lifetimes are implied; write `&self` or `&mut self`",
                    ));
                }
                if recv.mutability.is_some() { Receiver::Exclusive } else { Receiver::Shared }
            }
            Some(other) => {
                return Err(syn::Error::new_spanned(
                    other,
                    "requirements take `&self` or `&mut self` as their first parameter",
                ));
            }
            None => {
                return Err(syn::Error::new_spanned(
                    &sig.ident,
                    "requirements take `&self` or `&mut self` as their first parameter",
                ));
            }
        };

        let mut inputs = Vec::new();
        for arg in args {
            match arg {
                FnArg::Typed(pat_type) => {
                    scan_type(&pat_type.ty)?;
                    inputs.push((*pat_type.ty).clone());
                }
                FnArg::Receiver(recv) => {
                    return Err(syn::Error::new_spanned(recv, "unexpected receiver"));
                }
            }
        }

        let (output, borrows) = match &sig.output {
            ReturnType::Default => (syn::parse_quote!(()), false),
            ReturnType::Type(_, ty) => (*ty.clone(), scan_type(ty)?),
        };

        let (docs, via) = split_attrs(&item.attrs)?;

        Ok(MethodModel {
            name: sig.ident.clone(),
            target: via.unwrap_or_else(|| sig.ident.clone()),
            docs,
            receiver,
            inputs,
            output,
            borrows,
            item,
        })
    }
}

/// Separate `doc` attributes from `#[via(name)]`; reject anything else.
fn split_attrs(attrs: &[Attribute]) -> syn::Result<(Vec<Attribute>, Option<Ident>)> {
    let mut docs = Vec::new();
    let mut via = None;
    for attr in attrs {
        if attr.path().is_ident("doc") {
            docs.push(attr.clone());
        } else if attr.path().is_ident("via") {
            if via.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate `#[via]`"));
            }
            via = Some(attr.parse_args::<Ident>()?);
        } else {
            return Err(syn::Error::new_spanned(
                attr,
                "only doc comments and `#[via(method)]` are allowed on requirements",
            ));
        }
    }
    Ok((docs, via))
}

/// Reject `Self`, `impl Trait` and named lifetimes; report whether the type
/// borrows through an elided lifetime.
fn scan_type(ty: &Type) -> syn::Result<bool> {
    let mut scan = SignatureScan { error: None, borrows: false };
    scan.visit_type(ty);
    match scan.error {
        Some(error) => Err(error),
        None => Ok(scan.borrows),
    }
}

struct SignatureScan {
    error: Option<syn::Error>,
    borrows: bool,
}

impl SignatureScan {
    fn fail(&mut self, tokens: impl ToTokens, message: &str) {
        if self.error.is_none() {
            self.error = Some(syn::Error::new_spanned(tokens, message));
        }
    }
}

impl<'ast> Visit<'ast> for SignatureScan {
    fn visit_lifetime(&mut self, lifetime: &'ast Lifetime) {
        match lifetime.ident.to_string().as_str() {
            "static" => {}
            "_" => self.borrows = true,
            _ => self.fail(lifetime, "named lifetimes are not supported; use elided lifetimes or `'static`"),
        }
    }

    fn visit_type_reference(&mut self, reference: &'ast syn::TypeReference) {
        if reference.lifetime.is_none() {
            self.borrows = true;
        }
        visit::visit_type_reference(self, reference);
    }

    fn visit_type_impl_trait(&mut self, ty: &'ast syn::TypeImplTrait) {
        self.fail(ty, "`impl Trait` is not supported in requirements");
    }

    fn visit_path(&mut self, path: &'ast syn::Path) {
        if path.segments.first().is_some_and(|s| s.ident == "Self") {
            self.fail(path, "`Self` cannot appear in requirements; it differs per conforming type");
        }
        visit::visit_path(self, path);
    }

    fn visit_type_macro(&mut self, mac: &'ast syn::TypeMacro) {
        self.fail(mac, "macros are not supported in requirement types");
    }

    // Function pointers and `Fn(..)` sugar have their own elision scope
    fn visit_type_bare_fn(&mut self, _: &'ast syn::TypeBareFn) {}
    fn visit_parenthesized_generic_arguments(&mut self, _: &'ast syn::ParenthesizedGenericArguments) {}
}

/// Replace elided output lifetimes with [`RECEIVER_LIFETIME`].
struct NameElided;

impl VisitMut for NameElided {
    fn visit_type_reference_mut(&mut self, reference: &mut syn::TypeReference) {
        if reference.lifetime.is_none() {
            reference.lifetime = Some(Lifetime::new(RECEIVER_LIFETIME, Span::call_site()));
        }
        visit_mut::visit_type_reference_mut(self, reference);
    }

    fn visit_lifetime_mut(&mut self, lifetime: &mut Lifetime) {
        if lifetime.ident == "_" {
            *lifetime = Lifetime::new(RECEIVER_LIFETIME, lifetime.span());
        }
    }

    fn visit_type_bare_fn_mut(&mut self, _: &mut syn::TypeBareFn) {}
    fn visit_parenthesized_generic_arguments_mut(&mut self, _: &mut syn::ParenthesizedGenericArguments) {}
}

// =============================================================================
// Derived Signatures
// =============================================================================

impl MethodModel {
    pub fn lifetime() -> Lifetime {
        Lifetime::new(RECEIVER_LIFETIME, Span::call_site())
    }

    /// Output with elided lifetimes named after the receiver.
    pub fn bound_output(&self) -> Type {
        let mut output = self.output.clone();
        if self.borrows {
            NameElided.visit_type_mut(&mut output);
        }
        output
    }

    /// `arg0, arg1, ...`
    pub fn arg_names(&self) -> Vec<Ident> {
        (0..self.inputs.len()).map(|i| format_ident!("arg{}", i)).collect()
    }

    /// `for<'__archetype> Fn(&'__archetype [mut] X, A0, ..) -> R`
    pub fn fn_bound(&self, object: &TokenStream) -> TokenStream {
        let lt = Self::lifetime();
        let inputs = &self.inputs;
        let output = self.bound_output();
        let reference = match self.receiver {
            Receiver::Shared => quote! { &#lt #object },
            Receiver::Exclusive => quote! { &#lt mut #object },
        };
        quote! { for<#lt> ::core::ops::Fn(#reference #(, #inputs)*) -> #output }
    }

    /// Type of the dispatch table slot.
    pub fn slot_type(&self) -> TokenStream {
        let lt = Self::lifetime();
        let inputs = &self.inputs;
        let output = self.bound_output();
        quote! { for<#lt> unsafe fn(::archetype::Erased<#lt> #(, #inputs)*) -> #output }
    }

    /// `fn write(&mut self, &[u8]) -> usize`
    pub fn signature(&self) -> String {
        let receiver = match self.receiver {
            Receiver::Shared => "&self",
            Receiver::Exclusive => "&mut self",
        };
        let mut params = vec![receiver.to_string()];
        params.extend(self.inputs.iter().map(|ty| render_tokens(ty.to_token_stream())));
        let mut out = format!("fn {}({})", self.name.unraw(), params.join(", "));
        if !is_unit(&self.output) {
            out.push_str(" -> ");
            out.push_str(&render_tokens(self.output.to_token_stream()));
        }
        out
    }

    /// Identity used to merge requirements reached twice through a composition.
    pub fn identity(&self) -> String {
        format!("{}|{}", self.signature(), self.target.unraw())
    }

    /// Parameter list identity, used to reject indistinguishable overloads.
    pub fn params_key(&self) -> String {
        self.inputs
            .iter()
            .map(|ty| render_tokens(ty.to_token_stream()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `Method { .. }` descriptor
    pub fn descriptor(&self) -> TokenStream {
        let name = self.name.unraw().to_string();
        let target = self.target.unraw().to_string();
        let signature = self.signature();
        quote! {
            ::archetype::Method { name: #name, target: #target, signature: #signature }
        }
    }
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

/// Render tokens compactly: `&mut [u8]`, `Vec<String>`, `&'static str`.
pub fn render_tokens(tokens: TokenStream) -> String {
    let mut out = String::new();
    render_into(tokens, &mut out);
    out
}

fn render_into(tokens: TokenStream, out: &mut String) {
    for tt in tokens {
        match tt {
            TokenTree::Group(group) => {
                let (open, close) = match group.delimiter() {
                    proc_macro2::Delimiter::Parenthesis => ("(", ")"),
                    proc_macro2::Delimiter::Bracket => ("[", "]"),
                    proc_macro2::Delimiter::Brace => ("{", "}"),
                    proc_macro2::Delimiter::None => ("", ""),
                };
                out.push_str(open);
                render_into(group.stream(), out);
                out.push_str(close);
            }
            TokenTree::Punct(punct) => {
                let ch = punct.as_char();
                if ch == ',' {
                    out.push_str(", ");
                } else if ch == '=' && out.ends_with('-') {
                    out.push('=');
                } else {
                    out.push(ch);
                }
            }
            TokenTree::Ident(ident) => {
                if out.ends_with(|c: char| c.is_alphanumeric() || c == '_') {
                    out.push(' ');
                }
                out.push_str(&ident.to_string());
                if matches!(ident.to_string().as_str(), "mut" | "dyn" | "const") {
                    out.push(' ');
                }
            }
            TokenTree::Literal(lit) => out.push_str(&lit.to_string()),
        }
    }
}

// =============================================================================
// Requirement Lists
// =============================================================================

/// The braced body of `define!`: zero or more requirements.
pub struct MethodList {
    pub methods: Vec<MethodModel>,
}

impl Parse for MethodList {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut methods = Vec::new();
        while !input.is_empty() {
            let item: TraitItemFn = input.parse()?;
            methods.push(MethodModel::from_item(item)?);
        }
        validate_requirements(&methods)?;
        Ok(MethodList { methods })
    }
}

/// Duplicates and `#[via]` rules within one archetype.
pub fn validate_requirements(methods: &[MethodModel]) -> syn::Result<()> {
    for (i, method) in methods.iter().enumerate() {
        for earlier in &methods[..i] {
            if earlier.target == method.target {
                let message = if earlier.name == method.name {
                    format!(
                        "`{}` is required twice\n\
                         \n\
                         Overloads must bind to distinct methods of the conforming type:\n\
                         add `#[via(other_method)]` to one of them.",
                        method.name
                    )
                } else {
                    format!("two requirements bind to the same method `{}`", method.target)
                };
                return Err(syn::Error::new_spanned(&method.item.sig.ident, message));
            }
        }
    }
    Ok(())
}

/// Emit the requirements back as declarations (callback payload).
pub fn methods_to_tokens(methods: &[MethodModel]) -> TokenStream {
    let items = methods.iter().map(|m| &m.item);
    quote! { #(#items)* }
}
