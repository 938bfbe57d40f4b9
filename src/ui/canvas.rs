//! Indicator grid: paints each slot's sketch on a braille canvas.
//!
//! Indicators draw in window pixels; the terminal shows cells. A
//! [`Viewport`] maps between the two, and each shape is rasterised by
//! sampling one point per braille dot inside the slot.

use ratatui::{
    layout::Rect,
    widgets::canvas::{Canvas, Painter, Shape as CanvasShape},
    Frame,
};

use crate::app::App;
use crate::config::Geometry;
use crate::indicator::{Bounds, Shape, Sketch};

/// Braille dots per cell, horizontally and vertically.
const DOTS_X: f64 = 2.0;
const DOTS_Y: f64 = 4.0;

/// Cell to pixel mapping for the dashboard area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Terminal cells the dashboard occupies.
    pub area: Rect,
    pub px_per_col: f64,
    pub px_per_row: f64,
}

impl Viewport {
    /// `window` pixels are spread over the `screen` cells; the dashboard
    /// itself is drawn in `area`.
    pub fn new(area: Rect, screen: Rect, window: Geometry) -> Self {
        let per = |px: u32, cells: u16| {
            if cells == 0 {
                1.0
            } else {
                (f64::from(px) / f64::from(cells)).max(1.0)
            }
        };
        Self {
            area,
            px_per_col: per(window.width, screen.width),
            px_per_row: per(window.height, screen.height),
        }
    }

    /// The window pixel at the centre of a terminal cell, if the cell is
    /// inside the dashboard area.
    pub fn cell_to_pixel(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let a = self.area;
        if column < a.x || row < a.y || column >= a.x + a.width || row >= a.y + a.height {
            return None;
        }
        Some((
            (f64::from(column - a.x) + 0.5) * self.px_per_col,
            (f64::from(row - a.y) + 0.5) * self.px_per_row,
        ))
    }

    /// Cells covering a pixel rectangle, clipped to the dashboard area.
    /// `None` when nothing of it is visible.
    pub fn pixels_to_cells(&self, origin: (u32, u32), size: (u32, u32)) -> Option<Rect> {
        let col0 = (f64::from(origin.0) / self.px_per_col).floor();
        let row0 = (f64::from(origin.1) / self.px_per_row).floor();
        let col1 = (f64::from(origin.0.saturating_add(size.0)) / self.px_per_col).ceil();
        let row1 = (f64::from(origin.1.saturating_add(size.1)) / self.px_per_row).ceil();

        let a = self.area;
        let x0 = (f64::from(a.x) + col0).min(f64::from(a.right()));
        let y0 = (f64::from(a.y) + row0).min(f64::from(a.bottom()));
        let x1 = (f64::from(a.x) + col1).min(f64::from(a.right()));
        let y1 = (f64::from(a.y) + row1).min(f64::from(a.bottom()));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
    }
}

/// Whether pixel `(x, y)` is inked by `shape`. `slack` widens hairlines so
/// they survive sampling.
pub fn covers(shape: &Shape, x: f64, y: f64, slack: f64) -> bool {
    match shape {
        Shape::Rect { bounds, .. } => {
            x >= bounds.x0 && x <= bounds.x1 && y >= bounds.y0 && y <= bounds.y1
        }
        Shape::Oval { bounds, .. } => ellipse_radius(bounds, x, y).is_some_and(|r| r <= 1.0),
        Shape::Line {
            from, to, width, ..
        } => segment_distance(*from, *to, (x, y)) <= (width / 2.0).max(slack),
        Shape::Arc {
            bounds,
            start,
            extent,
            width,
            ..
        } => {
            let Some(r) = ellipse_radius(bounds, x, y) else {
                return false;
            };
            let scale = (bounds.width().min(bounds.height()) / 2.0).max(f64::EPSILON);
            let off_curve = (r - 1.0).abs() * scale;
            off_curve <= (width / 2.0).max(slack) && in_sweep(bounds, x, y, *start, *extent)
        }
    }
}

/// Normalised distance from the ellipse centre: 1.0 on the outline.
fn ellipse_radius(bounds: &Bounds, x: f64, y: f64) -> Option<f64> {
    let (cx, cy) = bounds.center();
    let rx = bounds.width() / 2.0;
    let ry = bounds.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return None;
    }
    let dx = (x - cx) / rx;
    let dy = (y - cy) / ry;
    Some((dx * dx + dy * dy).sqrt())
}

fn segment_distance(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - qx).powi(2) + (p.1 - qy).powi(2)).sqrt()
}

/// Angles are counter-clockwise from three o'clock with y pointing down.
fn in_sweep(bounds: &Bounds, x: f64, y: f64, start: f64, extent: f64) -> bool {
    if extent.abs() >= 360.0 {
        return true;
    }
    let (cx, cy) = bounds.center();
    let dx = (x - cx) / (bounds.width() / 2.0);
    let dy = (cy - y) / (bounds.height() / 2.0);
    let angle = dy.atan2(dx).to_degrees();
    let offset = if extent >= 0.0 {
        (angle - start).rem_euclid(360.0)
    } else {
        (start - angle).rem_euclid(360.0)
    };
    offset <= extent.abs()
}

/// A sketch replayed through ratatui's painter.
struct SketchPainting<'a> {
    sketch: &'a Sketch,
    size: (f64, f64),
    step: (f64, f64),
}

impl CanvasShape for SketchPainting<'_> {
    fn draw(&self, painter: &mut Painter) {
        let (width, height) = self.size;
        let (step_x, step_y) = self.step;
        let slack = step_x.max(step_y) / 2.0;

        let mut y = step_y / 2.0;
        while y < height {
            let mut x = step_x / 2.0;
            while x < width {
                // Later shapes paint over earlier ones
                let ink = self
                    .sketch
                    .shapes()
                    .iter()
                    .rev()
                    .find(|shape| covers(shape, x, y, slack));
                if let Some(shape) = ink {
                    // Canvas y grows upwards
                    if let Some((px, py)) = painter.get_point(x, height - y) {
                        painter.paint(px, py, color_of(shape).into());
                    }
                }
                x += step_x;
            }
            y += step_y;
        }
    }
}

fn color_of(shape: &Shape) -> crate::data::Rgb {
    match shape {
        Shape::Rect { fill, .. } | Shape::Oval { fill, .. } => *fill,
        Shape::Line { color, .. } | Shape::Arc { color, .. } => *color,
    }
}

/// Paint every slot that is at least partly visible.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let viewport = Viewport::new(area, frame.area(), app.window);
    app.viewport = Some(viewport);

    for slot in app.slots() {
        let size = slot.indicator.size();
        let Some(cells) = viewport.pixels_to_cells(slot.origin, size) else {
            continue;
        };
        let (w, h) = (f64::from(size.0), f64::from(size.1));
        // The visible part of the slot, in its own pixels
        let visible_w = (f64::from(cells.width) * viewport.px_per_col).min(w);
        let visible_h = (f64::from(cells.height) * viewport.px_per_row).min(h);

        let painting = SketchPainting {
            sketch: slot.indicator.sketch(),
            size: (visible_w, visible_h),
            step: (
                viewport.px_per_col / DOTS_X,
                viewport.px_per_row / DOTS_Y,
            ),
        };
        let canvas = Canvas::default()
            .x_bounds([0.0, visible_w])
            .y_bounds([0.0, visible_h])
            .paint(move |ctx| ctx.draw(&painting));
        frame.render_widget(canvas, cells);
    }
}
