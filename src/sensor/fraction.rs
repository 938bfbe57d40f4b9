//! Fractional-value sensor.

use tracing::{debug, error};

use super::{
    Probe, ProbeCommand, ProbeOutcome, ResultSender, Scheduler, Sensor, SensorConfig, SensorCore,
    SensorId, SensorKind,
};
use crate::data::{Value, ValueType};

/// Runs a program expected to print a number in `0.0..=1.0`.
///
/// A negative value, a failed run or empty output all mean "broken".
/// Output that is not a number at all is logged as an error and also
/// published as broken, so the sensor keeps polling.
#[derive(Debug)]
pub struct FractionSensor {
    core: SensorCore,
    command: Option<ProbeCommand>,
}

impl FractionSensor {
    pub fn new(id: SensorId, config: &SensorConfig, sender: ResultSender) -> Self {
        Self {
            core: SensorCore::new(id, ValueType::Fraction, config.update_interval, sender),
            command: config.command(),
        }
    }

    fn parse(&self, output: &str) -> Value {
        let text = output.trim();
        if text.is_empty() {
            debug!("Sensor {} printed nothing", self.core.id());
            return Value::BROKEN_FRACTION;
        }
        match text.parse::<f64>() {
            Ok(fraction) if !fraction.is_nan() => {
                debug!("Got {:?} --> {}", output, fraction);
                Value::Float(fraction)
            }
            _ => {
                error!(
                    "Sensor {} printed {:?}, which is not a number",
                    self.core.id(),
                    text
                );
                Value::BROKEN_FRACTION
            }
        }
    }
}

impl Sensor for FractionSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::Fraction
    }

    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn on_timer_fired(&mut self, scheduler: &mut dyn Scheduler) -> Option<Probe> {
        debug!("Sensor {} awoke", self.core.id());
        let Some(ref command) = self.command else {
            debug!("No program configured");
            self.core.publish(Value::BROKEN_FRACTION, scheduler);
            return None;
        };
        debug!("Calling {}", command);
        Some(Probe::Output(command.clone()))
    }

    fn on_probe_complete(&mut self, outcome: ProbeOutcome, scheduler: &mut dyn Scheduler) {
        match outcome {
            ProbeOutcome::Output(Ok(captured)) if captured.success() => {
                let value = self.parse(&captured.stdout);
                self.core.publish(value, scheduler);
            }
            ProbeOutcome::Output(Ok(captured)) => {
                debug!("Program exited with status {}", captured.code);
                self.core.publish(Value::BROKEN_FRACTION, scheduler);
            }
            ProbeOutcome::Output(Err(e)) => {
                debug!("Got {}", e);
                self.core.publish(Value::BROKEN_FRACTION, scheduler);
            }
            other => self.core.publish_mismatch(&other, scheduler),
        }
    }
}
