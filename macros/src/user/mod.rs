//! User-facing macro implementations
//!
//! | Macro | Usage | Purpose |
//! |-------|-------|---------|
//! | `define!` | items | Declare leaf archetypes |
//! | `compose!` | item | Union of archetypes |
//! | `check!` | expression | Structural conformance as `bool` |
//! | `conform!` | item | Bind dispatch tables for a type |
//! | `assert_conforms!` | item | Static conformance assertion |
//!
//! Everything except `define!` needs the requirement lists of archetypes
//! declared elsewhere and goes through [`chain`].

mod chain;
mod check;
mod compose;
mod conform;
mod define;

pub use chain::ChainInput;
pub use check::expand_check;
pub use compose::expand_compose;
pub use conform::{expand_assert, expand_conform};
pub use define::{expand_define, DefineInput};
