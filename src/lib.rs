//! # archetype
//!
//! Structural interfaces and non-owning type erasure for unrelated types.
//!
//! An **archetype** is a named set of method signatures. Concrete types never
//! mention it: a type conforms when it has methods with exactly those
//! signatures. For every archetype the crate generates a conformance check,
//! a dispatch table, a view and a pointer wrapper.
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------------+
//! |  Layer 4: Declarations                                            |
//! |  - define!, compose!            (one module per archetype)        |
//! |  - check!, conform!, assert_conforms!                             |
//! +-------------------------------------------------------------------+
//!                                |
//!                                v
//! +-------------------------------------------------------------------+
//! |  Layer 3: Views                                                   |
//! |  - RawView { Erased<'a>, &'static VTable }, generated View / Ptr  |
//! +-------------------------------------------------------------------+
//!                                |
//!                                v
//! +-------------------------------------------------------------------+
//! |  Layer 2: Dispatch tables                                         |
//! |  - VTable, Bind<T>, memoized registry                             |
//! +-------------------------------------------------------------------+
//!                                |
//!                                v
//! +-------------------------------------------------------------------+
//! |  Layer 1: Conformance                                             |
//! |  - autoref probes (check!), exact Fn gates (conform!)             |
//! +-------------------------------------------------------------------+
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! archetype::define! {
//!     /// Something bytes can be written to.
//!     pub writable {
//!         fn write(&mut self, buf: &[u8]) -> usize;
//!     }
//! }
//!
//! archetype::define! {
//!     pub readable {
//!         fn read(&mut self, buf: &mut [u8]) -> usize;
//!     }
//! }
//!
//! archetype::compose! {
//!     pub read_write = readable + writable;
//! }
//!
//! struct Pipe { data: Vec<u8> }
//!
//! impl Pipe {
//!     fn write(&mut self, buf: &[u8]) -> usize { self.data.extend_from_slice(buf); buf.len() }
//!     fn read(&mut self, buf: &mut [u8]) -> usize { /* ... */ 0 }
//! }
//!
//! // Compile-time boolean, no relationship declared on `Pipe`.
//! assert!(archetype::check!(Pipe: readable & writable));
//!
//! // Generate trampolines for `Pipe` (fails to compile on any mismatch).
//! archetype::conform!(Pipe: read_write);
//!
//! let mut pipe = Pipe { data: Vec::new() };
//! let mut view = read_write::View::bind(&mut pipe);
//! view.write(b"hello");
//! ```
//!
//! ## Conformance is exact
//!
//! Parameter types, return type and receiver must match exactly, lifetimes
//! included.
//!
//! ```compile_fail
//! archetype::define! {
//!     counter { fn count(&self) -> u64; }
//! }
//!
//! struct Items(Vec<u8>);
//! impl Items {
//!     fn count(&self) -> usize { self.0.len() }
//! }
//!
//! archetype::conform!(Items: counter);
//! # fn main() {}
//! ```
//!
//! Views can only be bound to conformed types:
//!
//! ```compile_fail
//! archetype::define! {
//!     named { fn name(&self) -> String; }
//! }
//!
//! struct Anonymous;
//!
//! fn main() {
//!     let anonymous = Anonymous;
//!     let _view = named::View::bind(&anonymous);
//! }
//! ```

//! ## Archetypes are crate-local
//!
//! `check!`, `conform!` and `compose!` reach an archetype through a helper
//! macro generated next to it, and that helper is only visible inside the
//! defining crate. A `pub` archetype's `View`, `Ptr` and `Marker` can be used
//! by other crates, but types from other crates cannot be conformed to it,
//! checked against it or composed with it. Library authors exporting an
//! archetype also conform the types it is meant for.
//!
//! ## Overloads
//!
//! A view method standing for several `#[via]` overloads is generic over its
//! argument tuple. Arrays, `Vec`s and `String`s coerce to slice and `str`
//! parameters as they do for the concrete methods; other coercions need the
//! exact argument type.

// Allow `::archetype` to work inside the crate itself
extern crate self as archetype;

pub mod descriptor;
pub mod erased;
pub mod probe;
pub mod registry;
pub mod view;
pub mod vtable;

pub use descriptor::{Archetype, Method};
pub use erased::Erased;
pub use view::RawView;
pub use vtable::{Bind, VTable};

// Re-export proc-macros
pub use macros::{assert_conforms, check, compose, conform, define};

#[doc(hidden)]
pub use macros::__continue;

/// Everything needed to declare, check and bind archetypes.
pub mod prelude {
    pub use crate::{Archetype, Bind, Erased, Method, RawView, VTable};
    pub use macros::{assert_conforms, check, compose, conform, define};
}
