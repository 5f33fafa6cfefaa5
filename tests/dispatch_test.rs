//! Dispatch tests - views forward to the bound instance
//!
//! Unrelated types bound to the same archetype are driven through one view
//! type; every call reaches the method of the concrete type with the
//! arguments unchanged.

use archetype::{check, compose, conform, define, Archetype};
use proptest::prelude::*;

define! {
    /// Sink for bytes.
    writable {
        fn write(&mut self, buf: &[u8]) -> usize;
    }

    readable {
        fn read(&mut self, buf: &mut [u8]) -> usize;
    }

    overloaded_func {
        fn func0(&self, a: i32) -> i32;
        #[via(func0_f64)]
        fn func0(&self, a: f64) -> f64;
    }

    lookup {
        fn get(&self, key: &str) -> Option<&str>;
        fn first(&self) -> &str;
    }

    tagged_sink {
        fn put(&mut self, buf: &[u8]) -> usize;
        #[via(put_str)]
        fn put(&mut self, s: &str) -> usize;
    }

    wide {
        fn sum(
            &self,
            a: i8,
            b: i16,
            c: i32,
            d: i64,
            e: u8,
            f: u16,
            g: u32,
            h: u64,
            i: f32,
            j: f64,
            k: &str,
        ) -> f64;
    }
}

compose! {
    read_write = readable + writable;
}

// =============================================================================
// Conforming Types
// =============================================================================

/// Appends everything.
#[derive(Default)]
struct Buffer {
    data: Vec<u8>,
    cursor: usize,
}

impl Buffer {
    fn write(&mut self, buf: &[u8]) -> usize {
        self.data.extend_from_slice(buf);
        buf.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let rest = &self.data[self.cursor..];
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.cursor += n;
        n
    }
}

/// Counts bytes, stores nothing.
#[derive(Default)]
struct Counter {
    total: usize,
    calls: usize,
}

impl Counter {
    fn write(&mut self, buf: &[u8]) -> usize {
        self.total += buf.len();
        self.calls += 1;
        buf.len()
    }
}

/// Yields a repeated byte.
struct Repeat(u8);

impl Repeat {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        buf.fill(self.0);
        buf.len()
    }
}

struct Overloaded;

impl Overloaded {
    fn func0(&self, a: i32) -> i32 {
        a.wrapping_add(1)
    }

    fn func0_f64(&self, a: f64) -> f64 {
        a * 2.0
    }
}

struct Table(Vec<(String, String)>);

impl Table {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn first(&self) -> &str {
        self.0.first().map(|(k, _)| k.as_str()).unwrap_or("")
    }
}

/// Records what each overload received.
#[derive(Default)]
struct Tagged {
    log: Vec<String>,
}

impl Tagged {
    fn put(&mut self, buf: &[u8]) -> usize {
        self.log.push(format!("bytes:{}", buf.len()));
        buf.len()
    }

    fn put_str(&mut self, s: &str) -> usize {
        self.log.push(format!("str:{}", s));
        s.len()
    }
}

struct Wide {
    scale: f64,
}

impl Wide {
    #[allow(clippy::too_many_arguments)]
    fn sum(
        &self,
        a: i8,
        b: i16,
        c: i32,
        d: i64,
        e: u8,
        f: u16,
        g: u32,
        h: u64,
        i: f32,
        j: f64,
        k: &str,
    ) -> f64 {
        let ints = a as f64 + b as f64 + c as f64 + d as f64;
        let unsigned = e as f64 + f as f64 + g as f64 + h as f64;
        (ints + unsigned + i as f64 + j + k.len() as f64) * self.scale
    }
}

conform!(Buffer: read_write);
conform!(Counter: writable);
conform!(Repeat: readable);
conform!(Overloaded: overloaded_func);
conform!(Table: lookup);
conform!(Tagged: tagged_sink);
conform!(Wide: wide);

fn write_all(mut sink: writable::View<'_>, chunks: &[&[u8]]) -> usize {
    chunks.iter().map(|chunk| sink.write(chunk)).sum()
}

// =============================================================================
// Basic Dispatch
// =============================================================================

#[test]
fn test_unrelated_types_share_one_view_type() {
    let mut buffer = Buffer::default();
    let mut counter = Counter::default();

    assert_eq!(write_all(writable::View::bind(&mut buffer), &[b"ab", b"cde"]), 5);
    assert_eq!(write_all(writable::View::bind(&mut counter), &[b"ab", b"cde"]), 5);

    assert_eq!(buffer.data, b"abcde");
    assert_eq!(counter.total, 5);
    assert_eq!(counter.calls, 2);
}

#[test]
fn test_views_in_a_collection() {
    let mut buffer = Buffer::default();
    let mut counter = Counter::default();

    {
        let mut sinks: Vec<writable::View<'_>> = vec![(&mut buffer).into(), (&mut counter).into()];
        for sink in &mut sinks {
            sink.write(b"xyz");
        }
    }

    assert_eq!(buffer.data, b"xyz");
    assert_eq!(counter.total, 3);
}

#[test]
fn test_reborrow_keeps_view_usable() {
    let mut counter = Counter::default();
    let mut view = writable::View::bind(&mut counter);

    write_all(view.reborrow(), &[b"one"]);
    write_all(view.reborrow(), &[b"two"]);
    view.write(b"three");

    assert_eq!(counter.calls, 3);
    assert_eq!(counter.total, 11);
}

#[test]
fn test_read_write_round_trip() {
    let mut buffer = Buffer::default();
    let mut view = read_write::View::bind(&mut buffer);

    assert_eq!(view.write(b"hello"), 5);
    let mut out = [0u8; 8];
    assert_eq!(view.read(&mut out), 5);
    assert_eq!(&out[..5], b"hello");
    assert_eq!(view.read(&mut out), 0);
}

#[test]
fn test_narrowed_view_hits_same_instance() {
    let mut buffer = Buffer::default();
    {
        let mut view = read_write::View::bind(&mut buffer);
        view.write(b"abc");
        let mut reader: readable::View<'_> = view.into();
        let mut out = [0u8; 2];
        assert_eq!(reader.read(&mut out), 2);
        assert_eq!(&out, b"ab");
    }
    assert_eq!(buffer.cursor, 2);
}

#[test]
fn test_read_only_type() {
    let mut repeat = Repeat(7);
    let mut view = readable::View::bind(&mut repeat);
    let mut out = [0u8; 4];
    assert_eq!(view.read(&mut out), 4);
    assert_eq!(out, [7; 4]);
}

// =============================================================================
// Overloads and Borrowed Returns
// =============================================================================

#[test]
fn test_overloads_select_by_argument_type() {
    let target = Overloaded;
    let view = overloaded_func::View::bind(&target);
    assert_eq!(view.func0(41), 42);
    assert_eq!(view.func0(1.25), 2.5);
}

#[test]
fn test_overloads_accept_coerced_arguments() {
    let mut direct = Tagged::default();
    let mut through_view = Tagged::default();
    let bytes = vec![1u8, 2, 3, 4];
    let owned = String::from("owned");

    assert_eq!(direct.put(b"abc"), 3);
    assert_eq!(direct.put(&b"abc"[..]), 3);
    assert_eq!(direct.put(&bytes), 4);
    assert_eq!(direct.put_str("text"), 4);
    assert_eq!(direct.put_str(&owned), 5);

    let mut view = tagged_sink::View::bind(&mut through_view);
    assert_eq!(view.put(b"abc"), 3);
    assert_eq!(view.put(&b"abc"[..]), 3);
    assert_eq!(view.put(&bytes), 4);
    assert_eq!(view.put("text"), 4);
    assert_eq!(view.put(&owned), 5);

    assert_eq!(through_view.log, direct.log);
    assert_eq!(through_view.log, ["bytes:3", "bytes:3", "bytes:4", "str:text", "str:owned"]);
}

// =============================================================================
// Arity
// =============================================================================

#[test]
fn test_eleven_parameters() {
    assert!(check!(Wide: wide));
    assert!(!check!(Tagged: wide));

    let target = Wide { scale: 0.5 };
    let label = String::from("label");
    let direct = target.sum(-1, 2, -3, 4, 5, 6, 7, 8, 0.5, 1.5, &label);
    let view = wide::View::bind(&target);
    assert_eq!(view.sum(-1, 2, -3, 4, 5, 6, 7, 8, 0.5, 1.5, &label), direct);
    assert_eq!(direct, 17.5);
    assert_eq!(wide::Marker::METHODS[0].signature.matches(", ").count(), 11);
}

#[test]
fn test_borrowed_returns_tie_to_the_view() {
    let table = Table(vec![("k".into(), "v".into()), ("x".into(), "y".into())]);
    let view = lookup::View::bind(&table);
    assert_eq!(view.get("x"), Some("y"));
    assert_eq!(view.get("missing"), None);
    assert_eq!(view.first(), "k");
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn test_view_writes_match_direct_writes(chunks: Vec<Vec<u8>>) {
        let mut direct = Buffer::default();
        let mut through_view = Buffer::default();

        let mut view = writable::View::bind(&mut through_view);
        for chunk in &chunks {
            prop_assert_eq!(view.write(chunk), direct.write(chunk));
        }

        prop_assert_eq!(through_view.data, direct.data);
    }

    #[test]
    fn test_overload_results_match(a: i32, b in -1.0e6f64..1.0e6) {
        let target = Overloaded;
        let view = overloaded_func::View::bind(&target);
        prop_assert_eq!(view.func0(a), target.func0(a));
        prop_assert_eq!(view.func0(b), target.func0_f64(b));
    }
}
