//! Composition tests - diamond shapes and nested compositions
//!
//! Four base capabilities `a`..`d` are mixed into fourteen types. A
//! composition is conjunctive: `check!(T: ab) == check!(T: a & b)`.

use std::cell::Cell;
use std::mem::size_of;

use archetype::{check, compose, conform, define, Archetype, VTable};

define! {
    satisfies_a {
        fn do_a(&self);
    }

    satisfies_b {
        fn do_b(&self, x: i32) -> i32;
    }

    satisfies_c {
        fn do_c(&self, c: char) -> char;
    }

    satisfies_d {
        fn do_d(&self, x: f64) -> f64;
    }
}

compose! {
    ab = satisfies_a + satisfies_b;
}

compose! {
    ac = satisfies_a + satisfies_c;
}

compose! {
    /// `satisfies_a` reached through both sides.
    abc = ab + ac;
}

compose! {
    abcd = abc + satisfies_d;
}

// =============================================================================
// Candidate Types
// =============================================================================

/// Types carrying the methods of the listed bases.
macro_rules! mixin_types {
    ($($ty:ident: [$($base:ident),*];)*) => {
        $(
            #[derive(Default)]
            struct $ty {
                hits: Cell<u32>,
            }

            impl $ty {
                $( mixin_types!(@base $base); )*
            }
        )*
    };
    (@base a) => {
        fn do_a(&self) {
            self.hits.set(self.hits.get() + 1);
        }
    };
    (@base b) => {
        fn do_b(&self, x: i32) -> i32 {
            x * 2
        }
    };
    (@base c) => {
        fn do_c(&self, c: char) -> char {
            c.to_ascii_uppercase()
        }
    };
    (@base d) => {
        fn do_d(&self, x: f64) -> f64 {
            x + 0.5
        }
    };
}

mixin_types! {
    A: [a];
    B: [b];
    C: [c];
    D: [d];
    AB: [a, b];
    AC: [a, c];
    AD: [a, d];
    BC: [b, c];
    BD: [b, d];
    CD: [c, d];
    ABC: [a, b, c];
    ABD: [a, b, d];
    ACD: [a, c, d];
    BCD: [b, c, d];
    ABCD: [a, b, c, d];
}

conform!(AB: ab);
conform!(ABC: abc);
conform!(ABCD: abcd);

// =============================================================================
// Conformance Through Compositions
// =============================================================================

#[test]
fn test_ab_accepts_exactly_ab_abc_abd() {
    assert!(check!(AB: ab));
    assert!(check!(ABC: ab));
    assert!(check!(ABD: ab));

    assert!(!check!(A: ab));
    assert!(!check!(B: ab));
    assert!(!check!(C: ab));
    assert!(!check!(D: ab));
    assert!(!check!(AC: ab));
    assert!(!check!(AD: ab));
    assert!(!check!(BC: ab));
    assert!(!check!(BD: ab));
    assert!(!check!(CD: ab));
    assert!(!check!(ACD: ab));
    assert!(!check!(BCD: ab));
}

#[test]
fn test_composition_is_conjunctive() {
    macro_rules! same {
        ($($ty:ident),*) => {
            $(
                assert_eq!(check!($ty: ab), check!($ty: satisfies_a & satisfies_b));
                assert_eq!(check!($ty: abc), check!($ty: ab & ac));
                assert_eq!(check!($ty: abcd), check!($ty: abc & satisfies_d));
            )*
        };
    }
    same!(A, B, C, D, AB, AC, AD, BC, BD, CD, ABC, ABD, ACD, BCD, ABCD);
}

#[test]
fn test_nested_compositions() {
    assert!(check!(ABC: abc));
    assert!(check!(ABCD: abc & abcd));
    assert!(!check!(ABD: abc));
    assert!(!check!(ABC: abcd));
}

// =============================================================================
// Layout: Shared Constituents Once
// =============================================================================

#[test]
fn test_diamond_embeds_shared_leaf_once() {
    let slot = size_of::<fn()>();
    assert_eq!(size_of::<satisfies_a::VTable>(), slot);
    assert_eq!(size_of::<ab::VTable>(), 2 * slot);
    // a, b, c - not a, b, a, c
    assert_eq!(size_of::<abc::VTable>(), 3 * slot);
    assert_eq!(size_of::<abcd::VTable>(), 4 * slot);
}

#[test]
fn test_view_stores_one_object_pointer() {
    let two_pointers = 2 * size_of::<usize>();
    assert_eq!(size_of::<satisfies_a::View<'static>>(), two_pointers);
    assert_eq!(size_of::<abc::View<'static>>(), two_pointers);
    assert_eq!(size_of::<abcd::View<'static>>(), two_pointers);
}

#[test]
fn test_methods_flattened_once() {
    let names: Vec<&str> = abc::Marker::METHODS.iter().map(|m| m.name).collect();
    assert_eq!(names, ["do_a", "do_b", "do_c"]);
    assert_eq!(abcd::Marker::METHODS.len(), 4);
    assert_eq!(<abc::Marker as Archetype>::NAME, "abc");
}

// =============================================================================
// Dispatch Through Compositions
// =============================================================================

#[test]
fn test_composed_view_dispatches_every_constituent() {
    let target = ABC::default();
    let view = abc::View::bind(&target);

    view.do_a();
    view.do_a();
    assert_eq!(target.hits.get(), 2);
    assert_eq!(view.do_b(21), 42);
    assert_eq!(view.do_c('q'), 'Q');
}

#[test]
fn test_narrowing_keeps_the_instance() {
    let target = ABCD::default();
    let view = abcd::View::bind(&target);

    let only_a: satisfies_a::View<'_> = view.into();
    only_a.do_a();
    let only_d: satisfies_d::View<'_> = view.into();
    assert_eq!(only_d.do_d(1.0), 1.5);

    assert_eq!(target.hits.get(), 1);
    assert_eq!(only_a.into_raw().object().addr(), view.into_raw().object().addr());
}

#[test]
fn test_narrowed_table_lives_inside_composed_table() {
    let target = AB::default();
    let view = ab::View::bind(&target);
    assert!(std::ptr::eq(view.vtable(), ab::VTable::of::<AB>()));

    let only_b: satisfies_b::View<'_> = view.into();
    let composed = view.vtable() as *const ab::VTable as usize;
    let leaf = only_b.vtable() as *const satisfies_b::VTable as usize;
    assert!(leaf >= composed && leaf < composed + size_of::<ab::VTable>());
}
