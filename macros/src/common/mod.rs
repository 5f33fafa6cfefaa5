// Common utilities shared between code generation and user-facing macros
//
// This module contains:
// - bool_expr: Boolean expression parsing over archetype paths
// - method_model: Requirement parsing, validation and derived signatures
// - parse_utils: Common parsing helpers
// - salt: Collision-free generated identifiers

mod bool_expr;
pub mod method_model;
mod parse_utils;
pub mod salt;

pub use bool_expr::*;
pub use method_model::*;
pub use parse_utils::*;
pub use salt::*;
