//! Procedural macros for the archetype library
//!
//! # Macro API
//!
//! | Macro | Target | Purpose |
//! |-------|--------|---------|
//! | `define!{}` | items | Declare archetypes (requirement lists) |
//! | `compose!{}` | item | Union of archetypes, shared constituents once |
//! | `check!()` | expression | Does a type satisfy an archetype expression? |
//! | `conform!()` | item | Build the dispatch tables of a type |
//! | `assert_conforms!()` | item | Fail compilation unless a type conforms |
//!
//! ## Example
//!
//! ```ignore
//! define! {
//!     pub writable {
//!         fn write(&mut self, buf: &[u8]) -> usize;
//!     }
//! }
//!
//! struct Sink(Vec<u8>);
//! impl Sink {
//!     fn write(&mut self, buf: &[u8]) -> usize { self.0.extend_from_slice(buf); buf.len() }
//! }
//!
//! assert!(check!(Sink: writable));
//! conform!(Sink: writable);
//!
//! let mut sink = Sink(Vec::new());
//! let mut view = writable::View::bind(&mut sink);
//! view.write(b"hello");
//! ```

use proc_macro::TokenStream;
use syn::parse_macro_input;

// =============================================================================
// Module Declarations (Three-tier: inner / common / user)
// =============================================================================

mod inner;
mod common;
mod user;

// =============================================================================
// Declarations
// =============================================================================

/// Declare one or more archetypes.
///
/// Each archetype becomes a module containing `Marker`, `VTable`, `View<'a>`
/// and `Ptr<'a>`. Requirements are method signatures without bodies taking
/// `&self` or `&mut self`. `#[via(name)]` resolves a requirement against a
/// differently named method, which is how overloads are spelled.
///
/// # Usage
/// ```ignore
/// define! {
///     /// Byte sink.
///     pub writable {
///         fn write(&mut self, buf: &[u8]) -> usize;
///     }
///
///     basic_overload {
///         fn func0(&self, a: i32) -> i32;
///         #[via(func0_f64)]
///         fn func0(&self, a: f64) -> f64;
///     }
/// }
/// ```
#[proc_macro]
pub fn define(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as user::DefineInput);
    user::expand_define(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Compose archetypes into a new one.
///
/// The composed view exposes every requirement of every constituent and
/// converts into each constituent leaf view with `From`.
///
/// # Usage
/// ```ignore
/// compose! {
///     pub read_write = readable + writable;
/// }
///
/// // Compositions compose too; `readable` is embedded once.
/// compose! {
///     pub full = read_write + readable + seekable;
/// }
/// ```
#[proc_macro]
pub fn compose(input: TokenStream) -> TokenStream {
    user::expand_compose(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

// =============================================================================
// Conformance
// =============================================================================

/// Structural conformance check evaluating to `bool`.
///
/// Archetypes combine with `&`, `|`, `!` and parentheses. Several clauses
/// separated by commas must all hold.
///
/// # Usage
/// ```ignore
/// assert!(check!(Sink: writable));
/// assert!(check!(Sink: writable & !readable));
/// assert!(check!(File: read_write, Sink: writable | readable));
/// ```
#[proc_macro]
pub fn check(input: TokenStream) -> TokenStream {
    user::expand_check(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Bind the dispatch tables of a type, enabling views of it.
///
/// Fails to compile, naming the offending requirement, when the type does
/// not conform.
///
/// # Usage
/// ```ignore
/// conform!(Sink: writable);
/// conform!(File: read_write, seekable);
/// ```
#[proc_macro]
pub fn conform(input: TokenStream) -> TokenStream {
    user::expand_conform(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Static assertion that a type conforms, without binding anything.
///
/// # Usage
/// ```ignore
/// assert_conforms!(Sink: writable);
/// ```
#[proc_macro]
pub fn assert_conforms(input: TokenStream) -> TokenStream {
    user::expand_assert(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Continuation step invoked by archetype callbacks. Not public API.
#[doc(hidden)]
#[proc_macro]
pub fn __continue(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as user::ChainInput);
    input
        .resume()
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
