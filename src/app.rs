//! Application state: the dashboard controller.
//!
//! [`App`] owns one [`Slot`] per configured item. A slot pairs a sensor with
//! the indicator reading from its result channel, plus the hover text shown
//! when the pointer is over it. The event loop in `main` drives the app
//! through four entry points:
//!
//! - [`App::fire_due`] when the earliest sensor timer expires
//! - [`App::complete_probe`] when a dispatched probe finishes
//! - [`App::refresh`] on every redraw tick
//! - [`App::hover_at`] and the key handlers for terminal input

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::config::{DashboardItem, Geometry};
use crate::indicator::{Broken, Indicator, IndicatorDesign, IndicatorError};
use crate::sensor::{
    result_channel, Probe, ProbeOutcome, Prober, Sensor, SensorId, TimerQueue,
};
use crate::ui::{Theme, Viewport};

/// Where finished probes are reported back to the event loop.
pub type Completions = mpsc::UnboundedSender<(SensorId, ProbeOutcome)>;

/// One dashboard entry: a sensor, its indicator, and their placement.
#[derive(Debug)]
pub struct Slot {
    pub sensor: Box<dyn Sensor>,
    pub indicator: Box<dyn Indicator>,
    /// Status bar text while the pointer is over this slot.
    pub hover: Option<String>,
    /// Why the configured indicator was replaced by a broken one.
    pub fault: Option<String>,
    /// Top-left corner in window pixels, set by [`App::layout`].
    pub origin: (u32, u32),
}

impl Slot {
    pub fn is_broken(&self) -> bool {
        self.fault.is_some()
    }

    /// Whether the window pixel `(x, y)` falls inside this slot.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (w, h) = self.indicator.size();
        let (x0, y0) = (f64::from(self.origin.0), f64::from(self.origin.1));
        x >= x0 && y >= y0 && x < x0 + f64::from(w) && y < y0 + f64::from(h)
    }
}

/// Hover text for an item whose indicator could not be built.
pub fn error_hover(name: Option<&str>, reason: &str) -> String {
    match name {
        Some(name) => format!("{}: Error: {}", name, reason),
        None => format!("Error: {}", reason),
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub theme: Theme,

    /// Hover text currently shown in the status bar.
    pub status_text: Option<String>,

    /// Virtual window size in pixels.
    pub window: Geometry,
    /// Layout width used while the window width is unknown.
    pub fallback_width: u32,
    /// Cell to pixel mapping of the last frame drawn.
    pub viewport: Option<Viewport>,

    slots: Vec<Slot>,
    timers: TimerQueue,
    prober: Arc<dyn Prober>,
    completions: Completions,
}

impl App {
    /// Build every item into a slot.
    ///
    /// An item whose indicator is missing or fails to build still gets a
    /// slot, drawn by [`Broken`], so the slot count always equals the item
    /// count.
    pub fn new(
        items: Vec<DashboardItem>,
        prober: Arc<dyn Prober>,
        completions: Completions,
        window: Geometry,
        fallback_width: u32,
    ) -> Self {
        let slots = items
            .into_iter()
            .enumerate()
            .map(|(id, item)| Self::build_slot(id, item))
            .collect();

        let mut app = Self {
            running: true,
            show_help: false,
            theme: Theme::dark(),
            status_text: None,
            window,
            fallback_width,
            viewport: None,
            slots,
            timers: TimerQueue::new(),
            prober,
            completions,
        };
        app.layout();
        app
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    fn build_slot(id: SensorId, item: DashboardItem) -> Slot {
        let (sender, receiver) = result_channel();
        let sensor = item.sensor.sensor.build(id, &item.sensor, sender);

        let design = item
            .indicator
            .and_then(|config| IndicatorDesign::from_config(&config));
        match design {
            Ok(design) => {
                debug!("Sensor {} shown by {}", id, design.kind().name());
                Slot {
                    sensor,
                    indicator: design.attach(receiver),
                    hover: item.name,
                    fault: None,
                    origin: (0, 0),
                }
            }
            Err(e) => {
                match e {
                    IndicatorError::Missing => {
                        warn!("Sensor {} not connected to an indicator", id)
                    }
                    ref other => error!("Sensor {}: {}", id, other),
                }
                let reason = e.to_string();
                let (width, height) = item.footprint;
                Slot {
                    sensor,
                    indicator: Box::new(Broken::new(width, height, receiver)),
                    hover: Some(error_hover(item.name.as_deref(), &reason)),
                    fault: Some(reason),
                    origin: (0, 0),
                }
            }
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn broken_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_broken()).count()
    }

    /// Change the window size and lay the slots out again.
    pub fn set_window(&mut self, window: Geometry) {
        if window != self.window {
            self.window = window;
            self.layout();
        }
    }

    /// Left to right, top to bottom, wrapping at the window width.
    ///
    /// A slot that would cross the right edge starts a new row below the
    /// tallest slot of the current one. A slot wider than the window still
    /// gets a row of its own.
    pub fn layout(&mut self) {
        let max_x = if self.window.width > 1 {
            self.window.width
        } else {
            self.fallback_width
        };
        debug!("Laying out dashboard, width {}", max_x);

        let (mut x, mut y, mut row_height) = (0u32, 0u32, 0u32);
        for slot in &mut self.slots {
            let (width, height) = slot.indicator.size();
            if x.saturating_add(width) > max_x {
                y = y.saturating_add(row_height);
                x = 0;
                row_height = 0;
            }
            slot.origin = (x, y);
            x = x.saturating_add(width);
            row_height = row_height.max(height);
        }
    }

    /// Arm every sensor's first timer.
    pub fn start_sensors(&mut self) {
        debug!("Starting sensors");
        for slot in &mut self.slots {
            slot.sensor.start(&mut self.timers);
        }
    }

    /// The earliest armed sensor timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Wake every sensor whose timer is due and collect the probes they ask
    /// for. Sensors without a usable probe publish immediately instead.
    pub fn fire_due(&mut self, now: Instant) -> Vec<(SensorId, Probe)> {
        let mut probes = Vec::new();
        for id in self.timers.pop_due(now) {
            let Some(slot) = self.slots.get_mut(id) else {
                warn!("Timer for unknown sensor {}", id);
                continue;
            };
            if let Some(probe) = slot.sensor.on_timer_fired(&mut self.timers) {
                probes.push((id, probe));
            }
        }
        probes
    }

    /// Run `probe` on the runtime and report back through the completions
    /// channel.
    pub fn dispatch(&self, id: SensorId, probe: Probe) {
        let prober = Arc::clone(&self.prober);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let outcome = prober.run(probe).await;
            // The receiver only goes away on shutdown
            let _ = completions.send((id, outcome));
        });
    }

    /// Hand a finished probe back to its sensor, which publishes and re-arms.
    pub fn complete_probe(&mut self, id: SensorId, outcome: ProbeOutcome) {
        match self.slots.get_mut(id) {
            Some(slot) => slot.sensor.on_probe_complete(outcome, &mut self.timers),
            None => warn!("Probe result for unknown sensor {}", id),
        }
    }

    /// Redraw tick: every indicator takes its pending reading, if any.
    pub fn refresh(&mut self) {
        for slot in &mut self.slots {
            slot.indicator.refresh();
        }
    }

    /// Index of the slot under window pixel `(x, y)`.
    pub fn slot_at(&self, x: f64, y: f64) -> Option<usize> {
        self.slots.iter().position(|s| s.contains(x, y))
    }

    /// Pointer moved to window pixel `(x, y)`; `None` means it left the
    /// dashboard.
    pub fn hover_at(&mut self, point: Option<(f64, f64)>) {
        self.status_text = point
            .and_then(|(x, y)| self.slot_at(x, y))
            .and_then(|i| self.slots[i].hover.clone());
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}
