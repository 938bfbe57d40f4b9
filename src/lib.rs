//! # tinydash
//!
//! A small status dashboard for the terminal. Sensors run probe programs or
//! poll Jenkins on their own intervals; indicators turn the latest reading
//! into a lamp, a meter, or a red cross when something is misconfigured.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                           App (controller)                     │
//! │                                                                │
//! │  TimerQueue ──fire──▶ Sensor ──Probe──▶ Prober (tokio task)    │
//! │       ▲                 │  ◀──ProbeOutcome──┘                  │
//! │       └──── re-arm ─────┤                                      │
//! │                         ▼ publish                              │
//! │                   ResultChannel (latest wins)                  │
//! │                         │ try_take on the redraw tick          │
//! │                         ▼                                      │
//! │                     Indicator ──Sketch──▶ ui ──▶ Terminal      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`sensor`]**: the four sensor kinds, their timers, probes and the
//!   result channel
//! - **[`indicator`]**: lamps, meters and the broken marker, drawing into
//!   [`Sketch`] display lists
//! - **[`data`]**: readings and colours
//! - **[`config`]**: item files with layered defaults, settings, geometry
//! - **[`app`]**: the controller owning every slot
//! - **[`ui`]** and **[`events`]**: ratatui rendering and terminal input
//!
//! ## Usage
//!
//! ```bash
//! # Read ~/.tiny-dash/config.toml
//! tinydash
//!
//! # Layer two files, fix the window size, log debug output
//! tinydash base.toml servers.toml --geometry 640x200 --debug
//! ```
//!
//! ### As a library
//!
//! ```
//! use tinydash::{IndicatorConfig, IndicatorDesign, Reading, ValueType};
//! use tinydash::sensor::result_channel;
//!
//! let (tx, rx) = result_channel();
//! let config = IndicatorConfig::new("Lamp").with_state_color("SUCCESS", "green");
//! let mut lamp = IndicatorDesign::from_config(&config).unwrap().attach(rx);
//!
//! tx.publish(Reading::new(ValueType::State, "SUCCESS"));
//! lamp.refresh();
//! assert!(!lamp.sketch().is_empty());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod indicator;
pub mod sensor;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{DashboardItem, Geometry, ItemLoader, Settings};
pub use data::{ColorShader, Reading, Rgb, Value, ValueType};
pub use indicator::{Indicator, IndicatorConfig, IndicatorDesign, IndicatorKind, Sketch};
pub use sensor::{Prober, Sensor, SensorConfig, SensorKind, SystemProber};
