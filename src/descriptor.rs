//! Static description of a declared archetype.

use crate::vtable::VTable;

/// Implemented by the `Marker` type of every generated archetype module.
///
/// ```ignore
/// archetype::define! {
///     pub writable {
///         fn write(&mut self, buf: &[u8]) -> usize;
///     }
/// }
///
/// assert_eq!(<writable::Marker as Archetype>::NAME, "writable");
/// assert_eq!(writable::Marker::METHODS[0].signature, "fn write(&mut self, &[u8]) -> usize");
/// ```
pub trait Archetype: 'static {
    /// Declared name of the archetype.
    const NAME: &'static str;

    /// Every requirement, flattened and deduplicated for compositions.
    const METHODS: &'static [Method];

    /// Dispatch table of the archetype.
    type VTable: VTable;

    /// Non-owning view of the archetype.
    type View<'a>;

    /// Find a requirement by its view-facing name.
    ///
    /// Returns the first overload when the name is overloaded.
    fn method(name: &str) -> Option<&'static Method> {
        Self::METHODS.iter().find(|method| method.name == name)
    }
}

/// One method requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Method {
    /// Name the view exposes.
    pub name: &'static str,
    /// Name looked up on the concrete type (differs for `#[via]` overloads).
    pub target: &'static str,
    /// Rendered signature, e.g. `fn write(&mut self, &[u8]) -> usize`.
    pub signature: &'static str,
}
