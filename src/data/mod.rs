//! Data carried between sensors and indicators.
//!
//! ## Submodules
//!
//! - [`reading`]: the typed result a sensor publishes ([`Reading`], [`Value`], [`ValueType`])
//! - [`color`]: colour tokens ([`Rgb`]) and linear interpolation ([`ColorShader`])
//!
//! ## Data Flow
//!
//! ```text
//! probe output (exit code / stdout / JSON)
//!        │
//!        ▼
//! Sensor::on_probe_complete()
//!        │
//!        ▼
//! Reading { value_type, value } ──▶ ResultChannel ──▶ Indicator::refresh()
//!                                                           │
//!                                                           ▼
//!                                               Rgb via ColorShader / palette
//! ```

pub mod color;
pub mod reading;

pub use color::{ColorError, ColorShader, Rgb};
pub use reading::{Reading, Value, ValueType};
