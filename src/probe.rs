//! Support items for the structural conformance probes.
//!
//! `check!` expands, for every requirement, to a block of local items using
//! the autoref / inherent-method priority trick:
//!
//! ```ignore
//! {
//!     // A missing `write` still resolves, to a function that never matches.
//!     trait __Absent { fn write(_: ::archetype::probe::Missing) {} }
//!     impl<X: ?Sized> __Absent for X {}
//!
//!     struct __Probe<X: ?Sized, F>(PhantomData<fn(&X)>, PhantomData<F>);
//!     impl<X: ?Sized, F> __Probe<X, F>
//!     where
//!         F: for<'s> Fn(&'s mut X, &[u8]) -> usize,
//!     {
//!         fn hit(&self) -> bool { true }   // inherent: wins when the bound holds
//!     }
//!
//!     use ::archetype::probe::Unmatched as _;   // fallback: `false`
//!     __probe::<Writer, _>(&<Writer>::write).hit()
//! }
//! ```
//!
//! When the concrete type has a `write` with exactly that signature, the
//! inherent `hit` applies. Any other signature, or no method
//! at all (the `__Absent` function takes `Missing`), leaves only the
//! fallback trait method.
//!
//! ## Limitation
//!
//! This only works for **concrete types** known at the call site, and a trait
//! method with the same name that is in scope at the call site makes the path
//! ambiguous. Signatures differing only in lifetimes are not told apart by
//! the probe; they fail later with a lifetime error instead of `false`.

/// Parameter type of the stand-in functions used for missing methods.
///
/// No requirement can name it, so a stand-in never satisfies a probe.
#[doc(hidden)]
pub enum Missing {}

/// Fallback for probes whose signature bound does not hold.
#[doc(hidden)]
pub trait Unmatched {
    #[inline]
    fn hit(&self) -> bool {
        false
    }
}

impl<T: ?Sized> Unmatched for T {}
