//! First-line-of-output sensor.

use tracing::debug;

use super::{
    Probe, ProbeCommand, ProbeOutcome, ResultSender, Scheduler, Sensor, SensorConfig, SensorCore,
    SensorId, SensorKind,
};
use crate::data::{Value, ValueType};

/// Runs a program and publishes the first line it prints as a state.
#[derive(Debug)]
pub struct StateSensor {
    core: SensorCore,
    command: Option<ProbeCommand>,
}

impl StateSensor {
    pub fn new(id: SensorId, config: &SensorConfig, sender: ResultSender) -> Self {
        Self {
            core: SensorCore::new(id, ValueType::State, config.update_interval, sender),
            command: config.command(),
        }
    }
}

/// The first line of `output`, or the empty string if there was none.
fn first_line(output: &str) -> &str {
    output.split('\n').next().unwrap_or("").trim_end_matches('\r')
}

impl Sensor for StateSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::State
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
        Some(Probe::Output(command.clone()))
    }

    fn on_probe_complete(&mut self, outcome: ProbeOutcome, scheduler: &mut dyn Scheduler) {
        match outcome {
            ProbeOutcome::Output(Ok(captured)) => {
                // A non-zero exit still reports a state, e.g. `systemctl is-active`
                let state = first_line(&captured.stdout);
                debug!(
                    "Got {:?} (status {}) --> {}",
                    captured.stdout, captured.code, state
                );
                self.core.publish(state, scheduler);
            }
            ProbeOutcome::Output(Err(e)) => {
                debug!("Got {}", e);
                self.core.publish(Value::BROKEN, scheduler);
            }
            other => self.core.publish_mismatch(&other, scheduler),
        }
    }
}
