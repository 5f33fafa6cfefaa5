//! Process-wide cache of bound dispatch tables.
//!
//! One entry per `(table type, concrete type)` pair. Entries are leaked
//! boxes, so the returned references are `'static` and never move.
//!
//! Concrete types are identified with [`typeid::of`], which also covers
//! types that are not `'static` (a `Parser<'src>` can be bound to a view).
//! Lifetimes are erased from the key, which is sound because a table's
//! contents never depend on them.
//!
//! Initialization is guarded by the write lock with an insert-if-absent:
//! concurrent first binds agree on one table and no reader ever sees a
//! partially built entry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::vtable::Bind;

type Key = (TypeId, TypeId);
type Entry = &'static (dyn Any + Send + Sync);

static TABLES: OnceLock<RwLock<HashMap<Key, Entry>>> = OnceLock::new();

fn tables() -> &'static RwLock<HashMap<Key, Entry>> {
    TABLES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Memoized table of `V` bound for `T`.
pub(crate) fn resolve<V, T>() -> &'static V
where
    V: Bind<T>,
{
    let key = (TypeId::of::<V>(), typeid::of::<T>());

    let cached = tables()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .copied();
    let entry = match cached {
        Some(entry) => entry,
        None => {
            let mut guard = tables().write().unwrap_or_else(PoisonError::into_inner);
            *guard
                .entry(key)
                .or_insert_with(|| Box::leak(Box::new(<V as Bind<T>>::TABLE)) as Entry)
        }
    };

    match entry.downcast_ref::<V>() {
        Some(table) => table,
        None => unreachable!("dispatch table registry keyed by the wrong table type"),
    }
}

/// Number of tables built so far.
pub fn len() -> usize {
    tables().read().unwrap_or_else(PoisonError::into_inner).len()
}

/// Whether the table of `V` for `T` has been built already.
pub fn is_bound<V, T>() -> bool
where
    V: Bind<T>,
{
    let key = (TypeId::of::<V>(), typeid::of::<T>());
    tables()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&key)
}
