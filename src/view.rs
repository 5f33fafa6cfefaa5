//! The layer every generated view is built on.
//!
//! A [`RawView`] pairs one [`Erased`] object pointer with one `&'static`
//! dispatch table. Generated `View<'a>` types wrap exactly one `RawView`, so a
//! composed view stores the object pointer once no matter how many
//! archetypes it combines:
//!
//! ```text
//! rw::View<'a>
//!   └── RawView<'a, rw::VTable>
//!         ├── object: Erased<'a>          (one pointer)
//!         └── vtable: &'static rw::VTable
//!               ├── readable::VTable      (embedded once)
//!               └── writable::VTable      (embedded once)
//! ```

use core::fmt;

use crate::erased::Erased;
use crate::vtable::{Bind, VTable};

/// Object pointer plus bound dispatch table.
///
/// Constructing one is safe: the table is always the one bound for the type
/// the pointer was erased from. Calling a slot of the table is what needs
/// `unsafe`, and generated views only do so through `&self` or `&mut self`
/// matching the slot's receiver.
pub struct RawView<'a, V: 'static> {
    object: Erased<'a>,
    vtable: &'static V,
}

impl<V: 'static> Clone for RawView<'_, V> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: 'static> Copy for RawView<'_, V> {}

impl<'a, V: VTable> RawView<'a, V> {
    /// Bind a shared borrow.
    #[inline]
    pub fn bind<T>(target: &'a T) -> Self
    where
        V: Bind<T>,
    {
        Self { object: Erased::from_ref(target), vtable: V::of::<T>() }
    }

    /// Bind an exclusive borrow.
    #[inline]
    pub fn bind_mut<T>(target: &'a mut T) -> Self
    where
        V: Bind<T>,
    {
        Self { object: Erased::from_mut(target), vtable: V::of::<T>() }
    }

    /// Reassemble a view from its parts.
    ///
    /// # Safety
    ///
    /// `vtable` must be bound for the type `object` was erased from.
    #[inline]
    pub unsafe fn from_parts(object: Erased<'a>, vtable: &'static V) -> Self {
        Self { object, vtable }
    }

    /// The bound table. Pointer-equal for all views of the same type.
    #[inline]
    pub fn vtable(&self) -> &'static V {
        self.vtable
    }

    /// Object pointer reborrowed for the duration of `&self`.
    #[inline]
    pub fn object(&self) -> Erased<'_> {
        self.object
    }

    /// Object pointer reborrowed for the duration of `&mut self`.
    #[inline]
    pub fn object_mut(&mut self) -> Erased<'_> {
        self.object
    }

    /// Shorter-lived copy of this view.
    #[inline]
    pub fn reborrow(&mut self) -> RawView<'_, V> {
        RawView { object: self.object, vtable: self.vtable }
    }

    /// Same object, viewed through a table embedded in this one.
    ///
    /// Used to narrow a composed view to one of its constituents.
    #[inline]
    pub fn project<U: VTable>(self, select: impl FnOnce(&'static V) -> &'static U) -> RawView<'a, U> {
        RawView { object: self.object, vtable: select(self.vtable) }
    }
}

impl<V: 'static> fmt::Debug for RawView<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawView")
            .field("object", &self.object)
            .field("vtable", &(self.vtable as *const V))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Slot = for<'a> unsafe fn(Erased<'a>, u32) -> u32;

    #[derive(Clone, Copy)]
    struct AddTable {
        add: Slot,
    }

    #[derive(Clone, Copy)]
    struct Outer {
        inner: AddTable,
    }

    impl VTable for AddTable {}
    impl VTable for Outer {}

    struct Counter(u32);

    unsafe fn counter_add<'a>(this: Erased<'a>, by: u32) -> u32 {
        let counter = unsafe { this.as_mut::<Counter>() };
        counter.0 += by;
        counter.0
    }

    unsafe impl Bind<Counter> for AddTable {
        const TABLE: Self = Self { add: counter_add };
    }

    unsafe impl Bind<Counter> for Outer {
        const TABLE: Self = Self { inner: <AddTable as Bind<Counter>>::TABLE };
    }

    #[test]
    fn test_bind_mut_dispatch() {
        let mut counter = Counter(1);
        let mut raw = RawView::<AddTable>::bind_mut(&mut counter);
        let add = raw.vtable().add;
        assert_eq!(unsafe { add(raw.object_mut(), 4) }, 5);
        assert_eq!(unsafe { add(raw.object_mut(), 5) }, 10);
        assert_eq!(counter.0, 10);
    }

    #[test]
    fn test_project_keeps_object() {
        let mut counter = Counter(0);
        let outer = RawView::<Outer>::bind_mut(&mut counter);
        let addr = outer.object().addr();
        let mut inner = outer.project(|table| &table.inner);
        assert_eq!(inner.object().addr(), addr);
        let add = inner.vtable().add;
        assert_eq!(unsafe { add(inner.object_mut(), 7) }, 7);
    }

    #[test]
    fn test_views_share_table() {
        let mut first = Counter(0);
        let mut second = Counter(0);
        let a = RawView::<AddTable>::bind_mut(&mut first);
        let b = RawView::<AddTable>::bind_mut(&mut second);
        assert!(core::ptr::eq(a.vtable(), b.vtable()));
        assert_ne!(a.object().addr(), b.object().addr());
    }
}
