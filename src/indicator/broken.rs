//! Fallback indicator for items that could not be wired up.

use tracing::debug;

use super::{Indicator, Sketch, Surface};
use crate::data::Rgb;
use crate::sensor::ResultReceiver;

const STROKE: f64 = 4.0;

/// A red cross, drawn once. Readings are drained and dropped.
#[derive(Debug)]
pub struct Broken {
    width: u32,
    height: u32,
    receiver: ResultReceiver,
    sketch: Sketch,
}

impl Broken {
    pub fn new(width: u32, height: u32, receiver: ResultReceiver) -> Self {
        let mut broken = Self {
            width,
            height,
            receiver,
            sketch: Sketch::new(),
        };
        broken.draw();
        broken
    }

    fn draw(&mut self) {
        let inset_x = (0.1 * f64::from(self.width)).trunc();
        let inset_y = (0.1 * f64::from(self.height)).trunc();
        let (x0, y0) = (inset_x, inset_y);
        let (x1, y1) = (f64::from(self.width) - inset_x, f64::from(self.height) - inset_y);

        self.sketch.clear();
        self.sketch.draw_line((x0, y0), (x1, y1), STROKE, Rgb::RED);
        self.sketch.draw_line((x1, y0), (x0, y1), STROKE, Rgb::RED);
    }
}

impl Indicator for Broken {
    fn kind(&self) -> &'static str {
        "Broken"
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn refresh(&mut self) {
        if let Some(reading) = self.receiver.try_take() {
            debug!("Got sensor data {}", reading.value);
        }
    }

    fn sketch(&self) -> &Sketch {
        &self.sketch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Reading, ValueType};
    use crate::indicator::Shape;
    use crate::sensor::result_channel;

    #[test]
    fn test_draws_inset_cross() {
        let (_tx, rx) = result_channel();
        let broken = Broken::new(45, 30, rx);

        // int(0.1 * 45) = 4, int(0.1 * 30) = 3
        assert_eq!(
            broken.sketch().shapes(),
            &[
                Shape::Line {
                    from: (4.0, 3.0),
                    to: (41.0, 27.0),
                    width: 4.0,
                    color: Rgb::RED,
                },
                Shape::Line {
                    from: (41.0, 3.0),
                    to: (4.0, 27.0),
                    width: 4.0,
                    color: Rgb::RED,
                },
            ]
        );
    }

    #[test]
    fn test_refresh_drains_without_repainting() {
        let (tx, rx) = result_channel();
        let mut broken = Broken::new(40, 40, rx);
        let before = broken.sketch().clone();

        tx.publish(Reading::new(ValueType::Status, 0));
        broken.refresh();
        assert_eq!(broken.sketch(), &before);

        // The pending reading was consumed
        tx.publish(Reading::new(ValueType::Status, 1));
        broken.refresh();
        broken.refresh();
        assert_eq!(broken.sketch(), &before);
    }
}
