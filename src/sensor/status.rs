//! Exit-status sensor.

use tracing::debug;

use super::{
    Probe, ProbeCommand, ProbeOutcome, ResultSender, Scheduler, Sensor, SensorConfig, SensorCore,
    SensorId, SensorKind,
};
use crate::data::{Value, ValueType};

/// Runs a program and publishes its exit status.
#[derive(Debug)]
pub struct StatusSensor {
    core: SensorCore,
    command: Option<ProbeCommand>,
}

impl StatusSensor {
    pub fn new(id: SensorId, config: &SensorConfig, sender: ResultSender) -> Self {
        Self {
            core: SensorCore::new(id, ValueType::Status, config.update_interval, sender),
            command: config.command(),
        }
    }
}

impl Sensor for StatusSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Status
    }

    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn on_timer_fired(&mut self, scheduler: &mut dyn Scheduler) -> Option<Probe> {
        debug!("Sensor {} awoke", self.core.id());
        let Some(ref command) = self.command else {
            self.core.publish(Value::BROKEN, scheduler);
            return None;
        };
        debug!("Calling {}", command);
        Some(Probe::ExitCode(command.clone()))
    }

    fn on_probe_complete(&mut self, outcome: ProbeOutcome, scheduler: &mut dyn Scheduler) {
        match outcome {
            ProbeOutcome::ExitCode(code) => self.core.publish(code, scheduler),
            other => self.core.publish_mismatch(&other, scheduler),
        }
    }
}
