//! Lamp indicator: a filled circle or square.

use std::collections::BTreeMap;

use tracing::debug;

use super::{Bounds, Indicator, IndicatorConfig, IndicatorError, Sketch, Surface};
use crate::data::{ColorShader, Reading, Rgb, Value, ValueType};
use crate::sensor::ResultReceiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LampShape {
    #[default]
    Round,
    Square,
}

impl LampShape {
    /// Anything but `square` draws round.
    pub fn from_name(name: &str) -> Self {
        match name {
            "square" => LampShape::Square,
            "round" => LampShape::Round,
            other => {
                debug!("Unknown lamp shape {:?}, drawing round", other);
                LampShape::Round
            }
        }
    }
}

/// Resolved lamp configuration.
#[derive(Debug, Clone)]
pub struct LampStyle {
    pub width: u32,
    pub height: u32,
    pub on: Rgb,
    pub off: Rgb,
    pub broken: Rgb,
    /// Configurable, but unknown states are painted `broken`, not this.
    pub default: Rgb,
    pub state_colors: BTreeMap<String, Rgb>,
    pub shape: LampShape,
    pub shader: ColorShader,
}

impl LampStyle {
    pub fn from_config(config: &IndicatorConfig) -> Result<Self, IndicatorError> {
        let (width, height) = config.size();
        let broken = IndicatorConfig::color("broken-color", config.broken_color.as_ref(), "#000000")?;
        let default = match config.default_color {
            Some(ref c) => IndicatorConfig::color("default-color", Some(c), "")?,
            None => broken,
        };
        let shape = match config.shape {
            Some(ref s) => LampShape::from_name(s),
            None => LampShape::default(),
        };

        Ok(Self {
            width,
            height,
            on: IndicatorConfig::color("on-color", config.on_color.as_ref(), "#80ff80")?,
            off: IndicatorConfig::color("off-color", config.off_color.as_ref(), "#ff0000")?,
            broken,
            default,
            state_colors: config.state_color_map()?,
            shape,
            shader: ColorShader::new(
                IndicatorConfig::color("min-color", config.min_color.as_ref(), "green")?,
                IndicatorConfig::color("max-color", config.max_color.as_ref(), "red")?,
            ),
        })
    }

    /// The colour a reading should be painted in.
    pub fn color_for(&self, reading: &Reading) -> Rgb {
        match reading.value_type {
            ValueType::Fraction => self.fraction_color(&reading.value),
            ValueType::State => self.state_color(&reading.value),
            ValueType::Status => self.status_color(&reading.value),
        }
    }

    fn fraction_color(&self, value: &Value) -> Rgb {
        match value.as_f64() {
            Some(fraction) if fraction >= 0.0 => {
                let fraction = fraction.min(1.0);
                debug!("Light is on by: {}", fraction);
                self.shader.shade(fraction)
            }
            _ => {
                debug!("Light is broken: {} => {}", value, self.broken);
                self.broken
            }
        }
    }

    fn state_color(&self, value: &Value) -> Rgb {
        let state = value.to_string();
        match self.state_colors.get(&state) {
            Some(color) => {
                debug!("Light is on: {} => {}", state, color);
                *color
            }
            None => {
                // default-color is deliberately not consulted here
                debug!("Unknown light state: {} => {}", state, self.broken);
                self.broken
            }
        }
    }

    fn status_color(&self, value: &Value) -> Rgb {
        match value.as_i64() {
            Some(status) if status < 0 => {
                debug!("Light is broken: {} => {}", status, self.broken);
                self.broken
            }
            Some(status) if status > 0 => {
                debug!("Light is off: {}", status);
                self.off
            }
            Some(_) => {
                debug!("Light is on: 0");
                self.on
            }
            None => {
                debug!("Light is broken: {} is not a status", value);
                self.broken
            }
        }
    }
}

/// A lamp wired to its sensor.
#[derive(Debug)]
pub struct Lamp {
    style: LampStyle,
    receiver: ResultReceiver,
    sketch: Sketch,
}

impl Lamp {
    pub fn new(style: LampStyle, receiver: ResultReceiver) -> Self {
        Self {
            style,
            receiver,
            sketch: Sketch::new(),
        }
    }

    pub fn style(&self) -> &LampStyle {
        &self.style
    }

    fn draw(&mut self, color: Rgb) {
        let bounds = Bounds::of_size(self.style.width, self.style.height);
        self.sketch.clear();
        match self.style.shape {
            LampShape::Square => self.sketch.fill_rect(bounds, color),
            LampShape::Round => self.sketch.fill_oval(bounds, color),
        }
    }
}

impl Indicator for Lamp {
    fn kind(&self) -> &'static str {
        "Lamp"
    }

    fn size(&self) -> (u32, u32) {
        (self.style.width, self.style.height)
    }

    fn refresh(&mut self) {
        let Some(reading) = self.receiver.try_take() else {
            return;
        };
        debug!("Got sensor data {}", reading.value);
        let color = self.style.color_for(&reading);
        self.draw(color);
    }

    fn sketch(&self) -> &Sketch {
        &self.sketch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::Shape;
    use crate::sensor::{result_channel, ResultSender};

    fn lamp(config: IndicatorConfig) -> (ResultSender, Lamp) {
        let (tx, rx) = result_channel();
        (tx, Lamp::new(LampStyle::from_config(&config).unwrap(), rx))
    }

    fn rgb(token: &str) -> Rgb {
        Rgb::parse(token).unwrap()
    }

    #[test]
    fn test_status_colors() {
        let (tx, mut lamp) = lamp(IndicatorConfig::new("Lamp"));

        tx.publish(Reading::new(ValueType::Status, 0));
        lamp.refresh();
        assert_eq!(lamp.sketch().last_color(), Some(rgb("#80ff80")));

        tx.publish(Reading::new(ValueType::Status, 2));
        lamp.refresh();
        assert_eq!(lamp.sketch().last_color(), Some(rgb("#ff0000")));

        tx.publish(Reading::new(ValueType::Status, -1));
        lamp.refresh();
        assert_eq!(lamp.sketch().last_color(), Some(rgb("#000000")));
    }

    #[test]
    fn test_state_colors_and_unknown_state() {
        let mut config = IndicatorConfig::new("Lamp")
            .with_state_color("OK", "green")
            .with_state_color("FAIL", "red");
        config.broken_color = Some("gray".to_string());
        config.default_color = Some("yellow".to_string());
        let (tx, mut lamp) = lamp(config);

        tx.publish(Reading::new(ValueType::State, "OK"));
        lamp.refresh();
        assert_eq!(lamp.sketch().last_color(), Some(rgb("green")));

        // Unknown states use broken-color, not the configured default-color
        tx.publish(Reading::new(ValueType::State, "WEIRD"));
        lamp.refresh();
        assert_eq!(lamp.sketch().last_color(), Some(rgb("gray")));
        assert_ne!(lamp.sketch().last_color(), Some(lamp.style().default));
    }

    #[test]
    fn test_state_sentinel_can_be_mapped() {
        let config = IndicatorConfig::new("Lamp").with_state_color("-1", "orange");
        let (tx, mut lamp) = lamp(config);

        tx.publish(Reading::new(ValueType::State, -1));
        lamp.refresh();
        assert_eq!(lamp.sketch().last_color(), Some(rgb("orange")));
    }

    #[test]
    fn test_fraction_shading_and_clamp() {
        let mut config = IndicatorConfig::new("Lamp");
        config.min_color = Some("#000000".to_string());
        config.max_color = Some("#ffffff".to_string());
        let (tx, mut lamp) = lamp(config);

        tx.publish(Reading::new(ValueType::Fraction, 1.7));
        lamp.refresh();
        assert_eq!(lamp.sketch().last_color(), Some(rgb("#ffffff")));

        tx.publish(Reading::new(ValueType::Fraction, 0.0));
        lamp.refresh();
        assert_eq!(lamp.sketch().last_color(), Some(rgb("#000000")));

        tx.publish(Reading::new(ValueType::Fraction, -1.0));
        lamp.refresh();
        assert_eq!(lamp.sketch().last_color(), Some(lamp.style().broken));
    }

    #[test]
    fn test_no_reading_keeps_previous_picture() {
        let (tx, mut lamp) = lamp(IndicatorConfig::new("Lamp"));
        lamp.refresh();
        assert!(lamp.sketch().is_empty());

        tx.publish(Reading::new(ValueType::Status, 0));
        lamp.refresh();
        let before = lamp.sketch().clone();
        lamp.refresh();
        assert_eq!(lamp.sketch(), &before);
    }

    #[test]
    fn test_shapes() {
        let mut config = IndicatorConfig::new("Lamp").with_size(40, 30);
        config.shape = Some("square".to_string());
        let (tx, mut square) = lamp(config);
        tx.publish(Reading::new(ValueType::Status, 0));
        square.refresh();
        assert!(matches!(
            square.sketch().shapes(),
            [Shape::Rect { bounds, .. }] if *bounds == Bounds::of_size(40, 30)
        ));

        let (tx, mut round) = lamp(IndicatorConfig::new("Lamp"));
        tx.publish(Reading::new(ValueType::Status, 0));
        round.refresh();
        assert!(matches!(round.sketch().shapes(), [Shape::Oval { .. }]));
    }

    #[test]
    fn test_unknown_shape_draws_round() {
        let mut config = IndicatorConfig::new("Lamp");
        config.shape = Some("hexagon".to_string());
        let style = LampStyle::from_config(&config).unwrap();
        assert_eq!(style.shape, LampShape::Round);
    }

    #[test]
    fn test_default_color_falls_back_to_broken() {
        let mut config = IndicatorConfig::new("Lamp");
        config.broken_color = Some("purple".to_string());
        let style = LampStyle::from_config(&config).unwrap();
        assert_eq!(style.default, style.broken);
    }
}
