//! Mixin Patterns
//!
//! Behavior is layered on views with extension traits: written once against
//! an archetype, available for every conforming type.

use archetype::{compose, conform, define};

define! {
    shape {
        fn area(&self) -> f64;
        fn name(&self) -> String;
    }

    movable {
        fn translate(&mut self, dx: f64, dy: f64);
        fn position(&self) -> (f64, f64);
    }
}

compose! {
    sprite = shape + movable;
}

// =============================================================================
// Mixins
// =============================================================================

trait Describe {
    fn describe(&self) -> String;
}

impl Describe for shape::View<'_> {
    fn describe(&self) -> String {
        format!("{} with area {:.2}", self.name(), self.area())
    }
}

trait Animate {
    /// Move in `steps` equal increments, returning the path taken.
    fn glide(&mut self, dx: f64, dy: f64, steps: u32) -> Vec<(f64, f64)>;
}

impl Animate for sprite::View<'_> {
    fn glide(&mut self, dx: f64, dy: f64, steps: u32) -> Vec<(f64, f64)> {
        let n = f64::from(steps.max(1));
        (0..steps.max(1))
            .map(|_| {
                self.translate(dx / n, dy / n);
                self.position()
            })
            .collect()
    }
}

// =============================================================================
// Concrete Types
// =============================================================================

struct Circle {
    center: (f64, f64),
    radius: f64,
}

impl Circle {
    fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    fn name(&self) -> String {
        "circle".to_string()
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.center.0 += dx;
        self.center.1 += dy;
    }

    fn position(&self) -> (f64, f64) {
        self.center
    }
}

struct Rect {
    origin: (f64, f64),
    size: (f64, f64),
}

impl Rect {
    fn area(&self) -> f64 {
        self.size.0 * self.size.1
    }

    fn name(&self) -> String {
        format!("{}x{} rect", self.size.0, self.size.1)
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.origin.0 += dx;
        self.origin.1 += dy;
    }

    fn position(&self) -> (f64, f64) {
        self.origin
    }
}

conform!(Circle: sprite);
conform!(Rect: sprite);

// =============================================================================
// Main
// =============================================================================

fn main() {
    println!("=== Mixins over Views ===\n");

    let mut circle = Circle { center: (0.0, 0.0), radius: 1.0 };
    let mut rect = Rect { origin: (1.0, 1.0), size: (2.0, 3.0) };

    println!("Describe (shape mixin):");
    for item in [shape::Ptr::bind(&circle), shape::Ptr::bind(&rect)] {
        println!("  {}", item.describe());
    }

    println!("\nAnimate (sprite mixin):");
    let mut sprites: Vec<sprite::Ptr<'_>> = vec![(&mut circle).into(), (&mut rect).into()];
    for sprite in &mut sprites {
        let path = sprite.glide(3.0, -3.0, 3);
        println!("  {:<12} {:?}", sprite.name(), path);
    }
    drop(sprites);

    assert_eq!(circle.center, (3.0, -3.0));
    assert_eq!(rect.origin, (4.0, -2.0));

    println!("\n=== SUCCESS ===");
}
