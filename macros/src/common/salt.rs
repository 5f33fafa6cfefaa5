//! Collision-free identifiers for generated items.
//!
//! Each `define!` gets a salt: a blake3 hash of the archetype name, its
//! requirement list and the source location of the name. The salt travels
//! with the requirement list through callbacks, so every macro that later
//! touches the archetype derives the same slot names, and two leaves with
//! identical contents declared in different places stay distinct.

use blake3::Hasher;
use proc_macro2::TokenStream;
use quote::format_ident;
use syn::{ext::IdentExt, Ident};

/// Salt of one archetype declaration (16 hex digits).
pub fn archetype_salt(name: &Ident, requirements: &TokenStream) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.unraw().to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(requirements.to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(format!("{:?}", name.span()).as_bytes());
    short_hex(&hasher, 16)
}

/// Table slot of the `index`-th requirement: `write_3fa9c21b`.
pub fn slot_ident(salt: &str, index: usize, name: &Ident) -> Ident {
    let mut hasher = Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(&(index as u64).to_le_bytes());
    format_ident!("{}_{}", name.unraw(), short_hex(&hasher, 8))
}

/// Field and re-export name of a leaf inside a composition: `__leaf_3fa9c21b5e0d7a44`.
pub fn leaf_ident(salt: &str) -> Ident {
    format_ident!("__leaf_{}", salt)
}

fn short_hex(hasher: &Hasher, len: usize) -> String {
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..len].to_string()
}
