//! Indicators: visual emitters of sensor readings.
//!
//! Each indicator owns the receiving half of a result channel and a
//! [`Sketch`] it paints into. On every redraw tick the controller calls
//! [`Indicator::refresh`], which takes at most one pending reading and
//! repaints; with nothing pending the previous picture stays.
//!
//! Construction is two-phase. [`IndicatorDesign::from_config`] validates a
//! configuration and resolves its colours, failing with an
//! [`IndicatorError`] the controller turns into a [`Broken`] indicator.
//! Only a valid design is attached to a channel.

mod broken;
mod lamp;
mod meter;
mod surface;

pub use broken::Broken;
pub use lamp::{Lamp, LampShape, LampStyle};
pub use meter::{ArcSpec, Meter, MeterStyle};
pub use surface::{Bounds, Shape, Sketch, Surface};

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::Deserialize;
use thiserror::Error;

use crate::data::{ColorError, Rgb};
use crate::sensor::ResultReceiver;

/// Width and height used when an indicator's configuration has none.
pub const FALLBACK_SIZE: u32 = 100;

/// Why an indicator could not be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// The item has no `type`.
    #[error("not connected to an indicator")]
    Missing,

    /// The `type` names no known indicator.
    #[error("{0} is an unknown indicator type")]
    UnknownKind(String),

    /// A field has the wrong shape or an unusable value.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The indicator fields did not deserialize.
    #[error("invalid indicator configuration: {0}")]
    Config(String),
}

impl IndicatorError {
    fn color(field: &'static str, err: ColorError) -> Self {
        IndicatorError::InvalidField {
            field,
            reason: err.to_string(),
        }
    }
}

/// A painted view of one sensor.
pub trait Indicator: Send + Debug {
    /// Kind name for logs and the status bar.
    fn kind(&self) -> &'static str;

    /// `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Redraw tick: take at most one pending reading and repaint.
    fn refresh(&mut self);

    /// The current picture.
    fn sketch(&self) -> &Sketch;
}

/// The indicator half of a dashboard item, after defaults are merged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndicatorConfig {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub on_color: Option<String>,
    pub off_color: Option<String>,
    pub min_color: Option<String>,
    pub max_color: Option<String>,
    pub broken_color: Option<String>,
    pub default_color: Option<String>,
    #[serde(default)]
    pub state_colors: BTreeMap<String, String>,
    pub shape: Option<String>,
    pub start_angle: Option<f64>,
    /// Accepted for compatibility; `max-angle` decides the sweep.
    pub end_angle: Option<f64>,
    pub max_angle: Option<f64>,
    pub thickness: Option<f64>,
}

impl IndicatorConfig {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_state_color(mut self, state: &str, color: &str) -> Self {
        self.state_colors.insert(state.to_string(), color.to_string());
        self
    }

    /// Configured size with the indicator-level fallback.
    pub fn size(&self) -> (u32, u32) {
        (
            self.width.unwrap_or(FALLBACK_SIZE),
            self.height.unwrap_or(FALLBACK_SIZE),
        )
    }

    /// Resolve an optional colour field, using `default` when absent.
    pub(crate) fn color(
        field: &'static str,
        value: Option<&String>,
        default: &str,
    ) -> Result<Rgb, IndicatorError> {
        Rgb::parse(value.map_or(default, String::as_str))
            .map_err(|e| IndicatorError::color(field, e))
    }

    pub(crate) fn state_color_map(&self) -> Result<BTreeMap<String, Rgb>, IndicatorError> {
        self.state_colors
            .iter()
            .map(|(state, color)| {
                Rgb::parse(color)
                    .map(|rgb| (state.clone(), rgb))
                    .map_err(|e| IndicatorError::color("state-colors", e))
            })
            .collect()
    }
}

/// The closed set of configurable indicators, selected by `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Lamp,
    Meter,
}

impl IndicatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::Lamp => "Lamp",
            IndicatorKind::Meter => "Meter",
        }
    }

    /// Look up a `type` value. Absent and unknown kinds are errors.
    pub fn lookup(kind: Option<&str>) -> Result<Self, IndicatorError> {
        match kind {
            None => Err(IndicatorError::Missing),
            Some("Lamp") => Ok(IndicatorKind::Lamp),
            Some("Meter") => Ok(IndicatorKind::Meter),
            Some(other) => Err(IndicatorError::UnknownKind(other.to_string())),
        }
    }
}

/// A validated indicator waiting for its result channel.
#[derive(Debug, Clone)]
pub enum IndicatorDesign {
    Lamp(LampStyle),
    Meter(MeterStyle),
}

impl IndicatorDesign {
    /// Validate `config` and resolve every colour it names.
    pub fn from_config(config: &IndicatorConfig) -> Result<Self, IndicatorError> {
        match IndicatorKind::lookup(config.kind.as_deref())? {
            IndicatorKind::Lamp => LampStyle::from_config(config).map(IndicatorDesign::Lamp),
            IndicatorKind::Meter => MeterStyle::from_config(config).map(IndicatorDesign::Meter),
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            IndicatorDesign::Lamp(_) => IndicatorKind::Lamp,
            IndicatorDesign::Meter(_) => IndicatorKind::Meter,
        }
    }

    /// Wire the design to its channel.
    pub fn attach(self, receiver: ResultReceiver) -> Box<dyn Indicator> {
        match self {
            IndicatorDesign::Lamp(style) => Box::new(Lamp::new(style, receiver)),
            IndicatorDesign::Meter(style) => Box::new(Meter::new(style, receiver)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_kinds() {
        assert_eq!(IndicatorKind::lookup(Some("Lamp")), Ok(IndicatorKind::Lamp));
        assert_eq!(IndicatorKind::lookup(Some("Meter")), Ok(IndicatorKind::Meter));
        assert_eq!(IndicatorKind::lookup(None), Err(IndicatorError::Missing));
        assert_eq!(
            IndicatorKind::lookup(Some("Gauge")),
            Err(IndicatorError::UnknownKind("Gauge".to_string()))
        );
    }

    #[test]
    fn test_design_from_config() {
        let lamp = IndicatorDesign::from_config(&IndicatorConfig::new("Lamp")).unwrap();
        assert_eq!(lamp.kind(), IndicatorKind::Lamp);

        let meter = IndicatorDesign::from_config(&IndicatorConfig::new("Meter")).unwrap();
        assert_eq!(meter.kind(), IndicatorKind::Meter);
    }

    #[test]
    fn test_design_rejects_bad_colors() {
        let mut config = IndicatorConfig::new("Lamp");
        config.on_color = Some("blurple".to_string());
        let err = IndicatorDesign::from_config(&config).unwrap_err();
        assert_eq!(err.to_string(), "invalid on-color: unknown color name \"blurple\"");

        let config = IndicatorConfig::new("Lamp").with_state_color("OK", "#12");
        assert!(matches!(
            IndicatorDesign::from_config(&config),
            Err(IndicatorError::InvalidField {
                field: "state-colors",
                ..
            })
        ));
    }

    #[test]
    fn test_config_from_toml() {
        let config: IndicatorConfig = toml::from_str(
            r#"
            type = "Lamp"
            sensor = "State"
            width = 40
            height = 20
            state-colors = { OK = "green", FAIL = "red" }
            "#,
        )
        .unwrap();
        assert_eq!(config.kind.as_deref(), Some("Lamp"));
        assert_eq!(config.size(), (40, 20));
        assert_eq!(config.state_colors.get("OK").map(String::as_str), Some("green"));
    }

    #[test]
    fn test_size_fallback() {
        assert_eq!(IndicatorConfig::default().size(), (FALLBACK_SIZE, FALLBACK_SIZE));
    }
}
