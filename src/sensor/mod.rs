//! Sensors: periodic probes that publish typed readings.
//!
//! A sensor owns an update interval and the sending half of a result
//! channel. Its life is a loop driven by the controller's event loop:
//!
//! ```text
//! start() ──▶ call_later(0) ──▶ on_timer_fired() ──▶ Probe ──▶ Prober (async)
//!                  ▲                    │                          │
//!                  │            (no command: publish               ▼
//!                  │             sentinel directly)        on_probe_complete()
//!                  │                    │                          │
//!                  └── call_later(interval) ◀── SensorCore::publish() ◀┘
//! ```
//!
//! [`SensorCore::publish`] is the only place a timer is re-armed, so probes
//! of one sensor never overlap. A sensor that fails to publish after a
//! probe stops polling for good; every variant here publishes on every path.

mod channel;
mod fraction;
mod jenkins;
mod probe;
mod scheduler;
mod state;
mod status;

pub use channel::{result_channel, ResultReceiver, ResultSender};
pub use fraction::FractionSensor;
pub use jenkins::JenkinsJobStateSensor;
pub use probe::{
    Captured, Probe, ProbeCommand, ProbeError, ProbeOutcome, Program, Prober, SystemProber,
};
pub use scheduler::{Scheduler, TimerQueue};
pub use state::StateSensor;
pub use status::StatusSensor;

#[cfg(test)]
pub(crate) use scheduler::RecordingScheduler;

use std::fmt::{self, Debug};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::data::{Reading, Value, ValueType};

/// Index of a sensor within its dashboard.
pub type SensorId = usize;

/// Interval used when none, or a non-positive one, is configured.
pub const DEFAULT_UPDATE_INTERVAL: f64 = 5.0;

/// Longest interval honoured; longer ones are capped to it.
pub const MAX_UPDATE_INTERVAL: f64 = 7.0 * 24.0 * 3600.0;

/// A periodic probe publishing into a result channel.
pub trait Sensor: Send + Debug {
    /// Which variant this is.
    fn kind(&self) -> SensorKind;

    /// Shared state: id, value type, interval and channel.
    fn core(&self) -> &SensorCore;

    /// Arm the first probe with zero delay.
    fn start(&mut self, scheduler: &mut dyn Scheduler) {
        let core = self.core();
        debug!(
            "Starting sensor {} ({}), interval {:?}",
            core.id(),
            self.kind(),
            core.update_interval()
        );
        scheduler.call_later(Duration::ZERO, core.id());
    }

    /// The timer elapsed: perform exactly one probe.
    ///
    /// Returns the probe to run asynchronously, or `None` if the sensor
    /// already published (for instance when no probe is configured).
    fn on_timer_fired(&mut self, scheduler: &mut dyn Scheduler) -> Option<Probe>;

    /// The probe returned by [`Sensor::on_timer_fired`] finished.
    fn on_probe_complete(&mut self, outcome: ProbeOutcome, scheduler: &mut dyn Scheduler);
}

/// State and behaviour every sensor variant shares.
#[derive(Debug)]
pub struct SensorCore {
    id: SensorId,
    value_type: ValueType,
    update_interval: Duration,
    sender: ResultSender,
}

impl SensorCore {
    pub fn new(
        id: SensorId,
        value_type: ValueType,
        update_interval: Option<f64>,
        sender: ResultSender,
    ) -> Self {
        let mut secs = update_interval
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_UPDATE_INTERVAL);
        if secs > MAX_UPDATE_INTERVAL {
            warn!(
                "Sensor {}: update interval {}s capped to {}s",
                id, secs, MAX_UPDATE_INTERVAL
            );
            secs = MAX_UPDATE_INTERVAL;
        }
        Self {
            id,
            value_type,
            update_interval: Duration::from_secs_f64(secs),
            sender,
        }
    }

    pub fn id(&self) -> SensorId {
        self.id
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Publish a reading tagged with this sensor's value type and re-arm the timer.
    pub fn publish(&self, value: impl Into<Value>, scheduler: &mut dyn Scheduler) {
        self.publish_as(value, None, scheduler);
    }

    /// Publish with an explicit value type, falling back to the sensor's own.
    pub fn publish_as(
        &self,
        value: impl Into<Value>,
        value_type: Option<ValueType>,
        scheduler: &mut dyn Scheduler,
    ) {
        let reading = Reading::new(value_type.unwrap_or(self.value_type), value);
        debug!("Sensor {} result: {}", self.id, reading.value);
        self.sender.publish(reading);
        scheduler.call_later(self.update_interval, self.id);
    }

    /// Publish the sentinel for an outcome that does not match the probe sent.
    pub(crate) fn publish_mismatch(&self, outcome: &ProbeOutcome, scheduler: &mut dyn Scheduler) {
        warn!(
            "Sensor {} got an outcome it did not ask for: {:?}",
            self.id, outcome
        );
        let sentinel = match self.value_type {
            ValueType::Fraction => Value::BROKEN_FRACTION,
            _ => Value::BROKEN,
        };
        self.publish(sentinel, scheduler);
    }
}

/// The closed set of sensor variants, selected by the `sensor` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Status,
    State,
    Fraction,
    JenkinsJobState,
}

impl SensorKind {
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Status,
        SensorKind::State,
        SensorKind::Fraction,
        SensorKind::JenkinsJobState,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Status => "Status",
            SensorKind::State => "State",
            SensorKind::Fraction => "Fraction",
            SensorKind::JenkinsJobState => "JenkinsJobState",
        }
    }

    /// The value type every reading of this kind carries.
    pub fn value_type(&self) -> ValueType {
        match self {
            SensorKind::Status => ValueType::Status,
            SensorKind::State | SensorKind::JenkinsJobState => ValueType::State,
            SensorKind::Fraction => ValueType::Fraction,
        }
    }

    /// Instantiate the variant wired to `sender`.
    pub fn build(
        self,
        id: SensorId,
        config: &SensorConfig,
        sender: ResultSender,
    ) -> Box<dyn Sensor> {
        match self {
            SensorKind::Status => Box::new(StatusSensor::new(id, config, sender)),
            SensorKind::State => Box::new(StateSensor::new(id, config, sender)),
            SensorKind::Fraction => Box::new(FractionSensor::new(id, config, sender)),
            SensorKind::JenkinsJobState => {
                Box::new(JenkinsJobStateSensor::new(id, config, sender))
            }
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("{} is an unknown sensor type", s))
    }
}

impl<'de> Deserialize<'de> for SensorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// The sensor half of a dashboard item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SensorConfig {
    pub sensor: SensorKind,
    /// Probe command; `false` or absent means "always broken".
    #[serde(default, deserialize_with = "program_or_false")]
    pub program: Option<Program>,
    /// Jenkins job URL, for [`SensorKind::JenkinsJobState`].
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub update_interval: Option<f64>,
}

impl SensorConfig {
    pub fn new(sensor: SensorKind) -> Self {
        Self {
            sensor,
            program: None,
            url: None,
            update_interval: None,
        }
    }

    pub fn with_program(mut self, program: Program) -> Self {
        self.program = Some(program);
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_update_interval(mut self, secs: f64) -> Self {
        self.update_interval = Some(secs);
        self
    }

    /// The resolved command, if a usable program is configured.
    pub fn command(&self) -> Option<ProbeCommand> {
        self.program.as_ref().and_then(Program::to_command)
    }
}

fn program_or_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Program>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Program(Program),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Flag(false) => Ok(None),
        Raw::Flag(true) => Err(serde::de::Error::custom(
            "program = true is not a command; use a string or an argument list",
        )),
        Raw::Program(p) => Ok(Some(p)),
    }
}
