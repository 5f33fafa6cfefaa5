//! Opaque object pointer shared by every view.
//!
//! An [`Erased`] is the "bound object pointer" of a view: the address of one
//! concrete instance with its type forgotten. The lifetime `'a` is the borrow
//! the view was created from, so the borrow checker still guarantees that the
//! instance outlives every view bound to it.
//!
//! Recovering the typed reference is `unsafe` and happens only inside
//! trampolines generated by `conform!`, which are only ever reachable through
//! a table bound for the same concrete type.

use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

/// Type-erased, non-owning pointer to an instance borrowed for `'a`.
#[derive(Clone, Copy)]
pub struct Erased<'a> {
    ptr: NonNull<()>,
    _borrow: PhantomData<&'a ()>,
}

impl<'a> Erased<'a> {
    /// Erase a shared borrow.
    ///
    /// Only `&self` trampolines may be called on the result.
    #[inline]
    pub fn from_ref<T>(target: &'a T) -> Self {
        Self { ptr: NonNull::from(target).cast(), _borrow: PhantomData }
    }

    /// Erase an exclusive borrow.
    #[inline]
    pub fn from_mut<T>(target: &'a mut T) -> Self {
        Self { ptr: NonNull::from(target).cast(), _borrow: PhantomData }
    }

    /// Recover a shared reference.
    ///
    /// # Safety
    ///
    /// The pointer must have been erased from a `T`, and no exclusive
    /// reference to that instance may be live for `'a`.
    #[inline]
    pub unsafe fn as_ref<T>(self) -> &'a T {
        unsafe { self.ptr.cast::<T>().as_ref() }
    }

    /// Recover an exclusive reference.
    ///
    /// # Safety
    ///
    /// The pointer must have been erased from a `&mut T` with [`from_mut`],
    /// and the caller must hold the only live access path for `'a`.
    ///
    /// [`from_mut`]: Erased::from_mut
    #[inline]
    pub unsafe fn as_mut<T>(self) -> &'a mut T {
        unsafe { self.ptr.cast::<T>().as_mut() }
    }

    /// Address of the instance, for identity comparisons and `Debug`.
    #[inline]
    pub fn addr(self) -> *const () {
        self.ptr.as_ptr().cast_const()
    }
}

impl fmt::Debug for Erased<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Erased({:p})", self.ptr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_shared() {
        let value = 42_u64;
        let erased = Erased::from_ref(&value);
        assert_eq!(unsafe { *erased.as_ref::<u64>() }, 42);
        assert_eq!(erased.addr(), (&value as *const u64).cast());
    }

    #[test]
    fn test_round_trip_exclusive() {
        let mut text = String::from("arch");
        let erased = Erased::from_mut(&mut text);
        unsafe { erased.as_mut::<String>() }.push_str("etype");
        assert_eq!(text, "archetype");
    }

    #[test]
    fn test_distinct_instances_have_distinct_addresses() {
        let pair = [1_u8, 2_u8];
        let first = Erased::from_ref(&pair[0]);
        let second = Erased::from_ref(&pair[1]);
        assert_ne!(first.addr(), second.addr());
    }
}
