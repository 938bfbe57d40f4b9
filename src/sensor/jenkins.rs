//! Jenkins job state sensor.
//!
//! Polls `{url}/lastBuild/api/json` and publishes `BUILDING` while a build
//! runs, otherwise the last build's `result` (`SUCCESS`, `FAILURE`, ...).

use serde::Deserialize;
use tracing::debug;

use super::{
    Probe, ProbeError, ProbeOutcome, ResultSender, Scheduler, Sensor, SensorConfig, SensorCore,
    SensorId, SensorKind,
};
use crate::data::{Value, ValueType};

/// State text published while a build is running.
pub const BUILDING: &str = "BUILDING";

/// The fields of Jenkins' build JSON this sensor reads.
#[derive(Debug, Deserialize)]
struct LastBuild {
    building: bool,
    #[serde(default)]
    result: Option<String>,
}

#[derive(Debug)]
pub struct JenkinsJobStateSensor {
    core: SensorCore,
    url: Option<String>,
}

impl JenkinsJobStateSensor {
    pub fn new(id: SensorId, config: &SensorConfig, sender: ResultSender) -> Self {
        let url = config
            .url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .map(|u| format!("{}/lastBuild/api/json", u));
        Self {
            core: SensorCore::new(id, ValueType::State, config.update_interval, sender),
            url,
        }
    }

    /// The API endpoint polled, if a job URL is configured.
    pub fn api_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn interpret(body: &[u8]) -> Result<Value, ProbeError> {
        let build: LastBuild =
            serde_json::from_slice(body).map_err(|e| ProbeError::Parse(e.to_string()))?;
        if build.building {
            return Ok(Value::from(BUILDING));
        }
        build
            .result
            .map(Value::Text)
            .ok_or_else(|| ProbeError::Parse("last build has no result".to_string()))
    }
}

impl Sensor for JenkinsJobStateSensor {
    fn kind(&self) -> SensorKind {
        SensorKind::JenkinsJobState
    }

    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn on_timer_fired(&mut self, scheduler: &mut dyn Scheduler) -> Option<Probe> {
        debug!("Sensor {} awoke", self.core.id());
        let Some(ref url) = self.url else {
            self.core.publish(Value::BROKEN, scheduler);
            return None;
        };
        debug!("Fetching Jenkins data from URL: {}", url);
        Some(Probe::Fetch(url.clone()))
    }

    fn on_probe_complete(&mut self, outcome: ProbeOutcome, scheduler: &mut dyn Scheduler) {
        let state = match outcome {
            ProbeOutcome::Fetched(fetched) => fetched.and_then(|body| Self::interpret(&body)),
            other => return self.core.publish_mismatch(&other, scheduler),
        };
        match state {
            Ok(value) => self.core.publish(value, scheduler),
            Err(e) => {
                debug!("Jenkins probe failed: {}", e);
                self.core.publish(Value::BROKEN, scheduler);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Reading;
    use crate::sensor::{result_channel, RecordingScheduler, ResultReceiver};

    fn sensor(url: Option<&str>) -> (JenkinsJobStateSensor, ResultReceiver) {
        let mut config = SensorConfig::new(SensorKind::JenkinsJobState);
        if let Some(url) = url {
            config = config.with_url(url);
        }
        let (tx, rx) = result_channel();
        (JenkinsJobStateSensor::new(0, &config, tx), rx)
    }

    fn complete(body: &str) -> Reading {
        let (mut s, mut rx) = sensor(Some("http://ci/job/app"));
        let mut scheduler = RecordingScheduler::default();
        s.on_probe_complete(
            ProbeOutcome::Fetched(Ok(body.as_bytes().to_vec())),
            &mut scheduler,
        );
        assert_eq!(scheduler.calls.len(), 1);
        rx.try_take().unwrap()
    }

    #[test]
    fn test_api_url() {
        let (s, _rx) = sensor(Some("http://ci/job/app/"));
        assert_eq!(s.api_url(), Some("http://ci/job/app/lastBuild/api/json"));
    }

    #[test]
    fn test_fires_fetch_probe() {
        let (mut s, _rx) = sensor(Some("http://ci/job/app"));
        let mut scheduler = RecordingScheduler::default();
        assert_eq!(
            s.on_timer_fired(&mut scheduler),
            Some(Probe::Fetch("http://ci/job/app/lastBuild/api/json".to_string()))
        );
    }

    #[test]
    fn test_building_wins_over_result() {
        let reading = complete(r#"{"building": true, "result": null, "number": 42}"#);
        assert_eq!(reading, Reading::new(ValueType::State, "BUILDING"));
    }

    #[test]
    fn test_publishes_result() {
        let reading = complete(r#"{"building": false, "result": "SUCCESS"}"#);
        assert_eq!(reading, Reading::new(ValueType::State, "SUCCESS"));
    }

    #[test]
    fn test_bad_json_is_broken() {
        assert_eq!(complete("<html>"), Reading::new(ValueType::State, -1));
        assert_eq!(complete(r#"{"result": "SUCCESS"}"#), Reading::new(ValueType::State, -1));
        assert_eq!(
            complete(r#"{"building": false, "result": null}"#),
            Reading::new(ValueType::State, -1)
        );
    }

    #[test]
    fn test_fetch_failure_is_broken() {
        let (mut s, mut rx) = sensor(Some("http://ci/job/app"));
        let mut scheduler = RecordingScheduler::default();
        s.on_probe_complete(ProbeOutcome::Fetched(Err(ProbeError::Timeout)), &mut scheduler);
        assert_eq!(rx.try_take(), Some(Reading::new(ValueType::State, -1)));
    }

    #[test]
    fn test_missing_url_is_broken() {
        let (mut s, mut rx) = sensor(None);
        let mut scheduler = RecordingScheduler::default();
        assert!(s.on_timer_fired(&mut scheduler).is_none());
        assert_eq!(rx.try_take(), Some(Reading::new(ValueType::State, -1)));
    }
}
