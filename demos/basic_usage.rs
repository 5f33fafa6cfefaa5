//! Basic Usage
//!
//! Two unrelated types, neither of which knows about any archetype, are
//! checked, conformed and driven through the same views.

use archetype::{check, compose, conform, define, Archetype};

define! {
    /// Something bytes can be written to.
    writable {
        fn write(&mut self, buf: &[u8]) -> usize;
    }

    /// Something bytes can be read from.
    readable {
        fn read(&mut self, buf: &mut [u8]) -> usize;
    }
}

compose! {
    read_write = readable + writable;
}

// =============================================================================
// Concrete Types
// =============================================================================

/// In-memory pipe.
#[derive(Default)]
struct Pipe {
    data: Vec<u8>,
    cursor: usize,
}

impl Pipe {
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

/// Writes to stdout.
struct Stdout {
    written: usize,
}

impl Stdout {
    fn write(&mut self, buf: &[u8]) -> usize {
        print!("{}", String::from_utf8_lossy(buf));
        self.written += buf.len();
        buf.len()
    }
}

conform!(Pipe: read_write);
conform!(Stdout: writable);

fn greet(mut out: writable::View<'_>, who: &str) -> usize {
    out.write(b"hello, ") + out.write(who.as_bytes()) + out.write(b"\n")
}

// =============================================================================
// Main
// =============================================================================

fn main() {
    println!("=== Archetype Basics ===\n");

    println!("Conformance:");
    println!("  Pipe:   readable & writable = {}", check!(Pipe: readable & writable));
    println!("  Stdout: readable & writable = {}", check!(Stdout: readable & writable));
    println!("  Stdout: writable & !readable = {}", check!(Stdout: writable & !readable));
    assert!(check!(Pipe: read_write));
    assert!(!check!(Stdout: read_write));

    println!("\nOne view type, two concrete types:");
    let mut pipe = Pipe::default();
    let mut stdout = Stdout { written: 0 };
    print!("  ");
    greet(writable::View::bind(&mut stdout), "stdout");
    greet(writable::View::bind(&mut pipe), "pipe");
    println!("  pipe holds {} bytes, stdout wrote {}", pipe.data.len(), stdout.written);

    println!("\nComposed view:");
    let mut view = read_write::View::bind(&mut pipe);
    let mut buf = [0u8; 5];
    let n = view.read(&mut buf);
    println!("  read {} bytes: {:?}", n, String::from_utf8_lossy(&buf[..n]));

    println!("\nRequirements of `{}`:", read_write::Marker::NAME);
    for method in read_write::Marker::METHODS {
        println!("  {}", method.signature);
    }

    println!("\n=== SUCCESS ===");
}
