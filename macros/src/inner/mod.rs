// Code generation shared by the user-facing macros
//
// - callback: per-archetype `macro_rules!` handing the requirement list on
// - probe: conformance probes (bool) and gates (hard error)
// - table: `VTable` structs and `Bind` impls with trampolines
// - view: `Marker`, `View<'a>`, `Ptr<'a>`

pub mod callback;
pub mod probe;
pub mod table;
pub mod view;

use std::collections::HashSet;

use syn::{Ident, Path};

use crate::common::{slot_ident, MethodModel};

/// A leaf archetype as reported by its callback.
pub struct Leaf {
    pub salt: String,
    pub name: Ident,
    /// Path of the leaf module as seen from the expansion site.
    pub path: Path,
    pub methods: Vec<MethodModel>,
}

impl Leaf {
    /// Table slot of the `index`-th requirement.
    pub fn slot(&self, index: usize) -> Ident {
        slot_ident(&self.salt, index, &self.methods[index].name)
    }
}

/// Keep the first occurrence of every leaf (diamonds reach a leaf twice).
pub fn dedupe_leaves(leaves: Vec<Leaf>) -> Vec<Leaf> {
    let mut seen = HashSet::new();
    leaves
        .into_iter()
        .filter(|leaf| seen.insert(leaf.salt.clone()))
        .collect()
}
