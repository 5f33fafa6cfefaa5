//! Dispatch tables and the binding protocol.
//!
//! Every archetype module generated by `define!` or `compose!` contains a
//! `VTable` struct: one trampoline slot per requirement for a leaf archetype,
//! one embedded leaf table per constituent for a composition.
//!
//! ```text
//! conform!(Writer: writable)
//!     -> unsafe impl Bind<Writer> for writable::VTable { const TABLE = {...} }
//!
//! writable::View::bind(&mut w)
//!     -> <writable::VTable as VTable>::of::<Writer>()   (memoized, &'static)
//! ```

use crate::registry;

/// A generated dispatch table.
///
/// Implementors are plain records of function pointers (or of other tables),
/// hence `Copy + Send + Sync + 'static`.
pub trait VTable: Copy + Send + Sync + 'static {
    /// The process-lifetime table for `T`.
    ///
    /// Built from [`Bind::TABLE`] on first use and memoized, so every call
    /// with the same `T` returns the same reference.
    #[inline]
    fn of<T>() -> &'static Self
    where
        Self: Bind<T>,
    {
        registry::resolve::<Self, T>()
    }
}

/// A dispatch table filled with trampolines for the concrete type `T`.
///
/// Generated by `conform!` for leaf archetypes and by `compose!` (as a
/// blanket impl over the leaves) for compositions.
///
/// # Safety
///
/// Every slot of `TABLE` must only reinterpret its erased object pointer as
/// `T`, and `&mut self` slots must only be reachable through views created
/// from an exclusive borrow.
#[diagnostic::on_unimplemented(
    message = "`{T}` has not been conformed to `{Self}`",
    label = "no trampolines were generated for `{T}`",
    note = "declare the type first: `archetype::conform!({T}: <archetype path>);`"
)]
pub unsafe trait Bind<T>: VTable {
    /// The table for `T`. Use [`VTable::of`] to get the memoized instance.
    const TABLE: Self;
}
