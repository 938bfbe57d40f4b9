//! Drawing capability used by indicators.
//!
//! Coordinates are pixels with the origin at the top-left corner of the
//! indicator. Angles are degrees, counter-clockwise from three o'clock;
//! a negative extent sweeps clockwise.

use crate::data::Rgb;

/// An axis-aligned box given by two corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bounds {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// The box `(0, 0)` to `(width, height)`.
    pub fn of_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, f64::from(width), f64::from(height))
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }
}

/// A canvas-like surface.
pub trait Surface {
    /// Remove everything drawn so far.
    fn clear(&mut self);

    fn fill_rect(&mut self, bounds: Bounds, fill: Rgb);

    /// Fill the ellipse inscribed in `bounds`.
    fn fill_oval(&mut self, bounds: Bounds, fill: Rgb);

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgb);

    /// Stroke part of the ellipse inscribed in `bounds`.
    fn draw_arc(&mut self, bounds: Bounds, start: f64, extent: f64, width: f64, color: Rgb);
}

/// One recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        bounds: Bounds,
        fill: Rgb,
    },
    Oval {
        bounds: Bounds,
        fill: Rgb,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        color: Rgb,
    },
    Arc {
        bounds: Bounds,
        start: f64,
        extent: f64,
        width: f64,
        color: Rgb,
    },
}

/// A retained display list: what an indicator currently shows.
///
/// The terminal painter replays it every frame; tests inspect it directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sketch {
    shapes: Vec<Shape>,
}

impl Sketch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// The fill or stroke colour of the most recent shape.
    pub fn last_color(&self) -> Option<Rgb> {
        self.shapes.last().map(|shape| match shape {
            Shape::Rect { fill, .. } | Shape::Oval { fill, .. } => *fill,
            Shape::Line { color, .. } | Shape::Arc { color, .. } => *color,
        })
    }
}

impl Surface for Sketch {
    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn fill_rect(&mut self, bounds: Bounds, fill: Rgb) {
        self.shapes.push(Shape::Rect { bounds, fill });
    }

    fn fill_oval(&mut self, bounds: Bounds, fill: Rgb) {
        self.shapes.push(Shape::Oval { bounds, fill });
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgb) {
        self.shapes.push(Shape::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn draw_arc(&mut self, bounds: Bounds, start: f64, extent: f64, width: f64, color: Rgb) {
        self.shapes.push(Shape::Arc {
            bounds,
            start,
            extent,
            width,
            color,
        });
    }
}
