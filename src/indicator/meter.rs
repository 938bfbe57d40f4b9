//! Meter indicator: a stroked arc whose sweep and colour follow a fraction.

use tracing::debug;

use super::{Bounds, Indicator, IndicatorConfig, IndicatorError, Sketch, Surface};
use crate::data::{ColorShader, Rgb, Value};
use crate::sensor::ResultReceiver;

/// Sweep drawn for a broken reading, whatever the real value was.
const BROKEN_FRACTION: f64 = 0.5;

/// Resolved meter configuration.
#[derive(Debug, Clone)]
pub struct MeterStyle {
    pub width: u32,
    pub height: u32,
    pub broken: Rgb,
    pub start_angle: f64,
    pub max_angle: f64,
    /// Stroke width as a fraction of the widget width.
    pub thickness: f64,
    pub shader: ColorShader,
}

/// One frame of a meter, before it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpec {
    pub bounds: Bounds,
    pub start: f64,
    pub extent: f64,
    pub stroke: f64,
    pub color: Rgb,
}

impl MeterStyle {
    pub fn from_config(config: &IndicatorConfig) -> Result<Self, IndicatorError> {
        let (width, height) = config.size();
        let thickness = config.thickness.unwrap_or(0.5);
        if !thickness.is_finite() || thickness < 0.0 {
            return Err(IndicatorError::InvalidField {
                field: "thickness",
                reason: format!("{} is not a non-negative number", thickness),
            });
        }
        if config.end_angle.is_some() {
            debug!("end-angle is ignored, the sweep follows max-angle");
        }

        Ok(Self {
            width,
            height,
            broken: IndicatorConfig::color("broken-color", config.broken_color.as_ref(), "#000000")?,
            start_angle: config.start_angle.unwrap_or(270.0),
            max_angle: config.max_angle.unwrap_or(360.0),
            thickness,
            shader: ColorShader::new(
                IndicatorConfig::color("min-color", config.min_color.as_ref(), "#00ff00")?,
                IndicatorConfig::color("max-color", config.max_color.as_ref(), "#ff0000")?,
            ),
        })
    }

    /// Compute the arc for a value. Anything not readable as a number is broken.
    pub fn arc_for(&self, value: &Value) -> ArcSpec {
        let (fraction, color) = match value.as_f64() {
            Some(fraction) if fraction >= 0.0 => {
                let fraction = fraction.min(1.0);
                (fraction, self.shader.shade(fraction))
            }
            _ => {
                debug!("Sensor is broken: {} => {}", value, self.broken);
                (BROKEN_FRACTION, self.broken)
            }
        };

        let width = f64::from(self.width);
        let height = f64::from(self.height);
        let stroke = width * self.thickness * 0.5;
        let margin = 1.0 + stroke / 2.0;
        let arc = ArcSpec {
            bounds: Bounds::new(margin, margin, width - margin, height - margin),
            start: self.start_angle,
            extent: -self.max_angle * fraction,
            stroke,
            color,
        };
        debug!("Meter settings: {}, {}, {}", arc.color, arc.start, arc.extent);
        arc
    }
}

#[derive(Debug)]
pub struct Meter {
    style: MeterStyle,
    receiver: ResultReceiver,
    sketch: Sketch,
}

impl Meter {
    pub fn new(style: MeterStyle, receiver: ResultReceiver) -> Self {
        Self {
            style,
            receiver,
            sketch: Sketch::new(),
        }
    }
}

impl Indicator for Meter {
    fn kind(&self) -> &'static str {
        "Meter"
    }

    fn size(&self) -> (u32, u32) {
        (self.style.width, self.style.height)
    }

    fn refresh(&mut self) {
        let Some(reading) = self.receiver.try_take() else {
            return;
        };
        debug!("Got sensor data {}", reading.value);
        let arc = self.style.arc_for(&reading.value);
        self.sketch.clear();
        self.sketch
            .draw_arc(arc.bounds, arc.start, arc.extent, arc.stroke, arc.color);
    }

    fn sketch(&self) -> &Sketch {
        &self.sketch
    }
}
