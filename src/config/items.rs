//! Dashboard item files and defaults layering.
//!
//! A file is a TOML array of `[[item]]` tables. Three kinds of table are
//! recognised:
//!
//! ```toml
//! [[item]]
//! defaults = { width = 60 }        # built-in defaults + this table
//!
//! [[item]]
//! "defaults+" = { height = 20 }    # overlay onto the current defaults
//!
//! [[item]]                         # an item: current defaults + these keys
//! sensor = "Status"
//! program = "ping -c1 -W1 gateway"
//! type = "Lamp"
//! ```
//!
//! An empty `defaults+` table resets to the built-in defaults.

use std::path::Path;

use serde::Deserialize;
use toml::{Table, Value};
use tracing::{debug, error, warn};

use super::ConfigError;
use crate::indicator::{IndicatorConfig, IndicatorError, FALLBACK_SIZE};
use crate::sensor::{SensorConfig, SensorKind};

const DEFAULTS: &str = "defaults";
const DEFAULTS_PLUS: &str = "defaults+";

/// `width = 40`, `height = 40`, `update-interval = 5.0`.
pub fn builtin_defaults() -> Table {
    let mut table = Table::new();
    table.insert("width".into(), Value::Integer(40));
    table.insert("height".into(), Value::Integer(40));
    table.insert("update-interval".into(), Value::Float(5.0));
    table
}

#[derive(Debug, Deserialize)]
struct ItemFile {
    #[serde(default)]
    item: Vec<Table>,
}

/// One configured dashboard entry after defaults have been merged.
#[derive(Debug, Clone)]
pub struct DashboardItem {
    /// Hover label.
    pub name: Option<String>,
    pub sensor: SensorConfig,
    /// The indicator fields, or why they could not be read.
    pub indicator: Result<IndicatorConfig, IndicatorError>,
    /// Size to reserve if the indicator turns out broken.
    pub footprint: (u32, u32),
}

impl DashboardItem {
    /// Interpret a merged table.
    ///
    /// Only sensor problems are errors here; indicator problems are kept in
    /// [`DashboardItem::indicator`] so the item still gets a slot.
    pub fn from_table(table: Table) -> Result<Self, ConfigError> {
        match table.get("sensor") {
            None => return Err(ConfigError::MissingSensor),
            Some(Value::String(kind)) => {
                kind.parse::<SensorKind>()
                    .map_err(|_| ConfigError::UnknownSensor(kind.clone()))?;
            }
            Some(other) => return Err(ConfigError::UnknownSensor(other.to_string())),
        }

        let name = table.get("name").map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        let footprint = (dimension(&table, "width"), dimension(&table, "height"));

        let value = Value::Table(table);
        let sensor: SensorConfig = value
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::InvalidSensor(e.message().to_string()))?;
        let indicator = value
            .try_into::<IndicatorConfig>()
            .map_err(|e| IndicatorError::Config(e.message().to_string()));

        Ok(Self {
            name,
            sensor,
            indicator,
            footprint,
        })
    }
}

fn dimension(table: &Table, key: &str) -> u32 {
    table
        .get(key)
        .and_then(Value::as_integer)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(FALLBACK_SIZE)
}

/// Reads item files in order, carrying the defaults layer across files.
#[derive(Debug, Clone)]
pub struct ItemLoader {
    defaults: Table,
}

impl Default for ItemLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemLoader {
    pub fn new() -> Self {
        Self {
            defaults: builtin_defaults(),
        }
    }

    /// The defaults the next item will be merged onto.
    pub fn defaults(&self) -> &Table {
        &self.defaults
    }

    pub fn load_file(&mut self, path: &Path) -> Result<Vec<DashboardItem>, ConfigError> {
        debug!("Reading configuration from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&text, &path.display().to_string())
    }

    /// Parse one file's contents. `origin` names it in errors.
    ///
    /// Items with a bad sensor are logged and skipped; a file that is not
    /// valid TOML is an error.
    pub fn load_str(&mut self, text: &str, origin: &str) -> Result<Vec<DashboardItem>, ConfigError> {
        let file: ItemFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;

        let mut items = Vec::with_capacity(file.item.len());
        for raw in file.item {
            if let Some(item) = self.apply(raw) {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Apply one raw table: update the defaults, or produce an item.
    pub fn apply(&mut self, mut raw: Table) -> Option<DashboardItem> {
        if let Some(overlay) = raw.remove(DEFAULTS_PLUS) {
            match overlay {
                Value::Table(t) if !t.is_empty() => {
                    self.defaults.extend(t);
                    debug!("Defaults updated: {}", self.defaults);
                }
                _ => {
                    self.defaults = builtin_defaults();
                    debug!("Defaults reset: {}", self.defaults);
                }
            }
            return None;
        }

        if let Some(base) = raw.remove(DEFAULTS) {
            self.defaults = builtin_defaults();
            match base {
                Value::Table(t) => self.defaults.extend(t),
                other => warn!("Ignoring defaults that are not a table: {}", other),
            }
            debug!("Defaults set: {}", self.defaults);
            return None;
        }

        let mut merged = self.defaults.clone();
        merged.extend(raw);
        match DashboardItem::from_table(merged) {
            Ok(item) => {
                debug!("Found {}", item.sensor.sensor);
                Some(item)
            }
            Err(e) => {
                error!("Error: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::Program;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(text: &str) -> Vec<DashboardItem> {
        ItemLoader::new().load_str(text, "test.toml").unwrap()
    }

    #[test]
    fn test_item_gets_builtin_defaults() {
        let items = load(
            r#"
            [[item]]
            sensor = "Status"
            program = "true"
            type = "Lamp"
            name = "always on"
            "#,
        );
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.name.as_deref(), Some("always on"));
        assert_eq!(item.sensor.sensor, SensorKind::Status);
        assert_eq!(item.sensor.update_interval, Some(5.0));
        assert_eq!(item.sensor.program, Some(Program::Shell("true".into())));
        assert_eq!(item.footprint, (40, 40));

        let indicator = item.indicator.as_ref().unwrap();
        assert_eq!(indicator.kind.as_deref(), Some("Lamp"));
        assert_eq!(indicator.size(), (40, 40));
    }

    #[test]
    fn test_defaults_layering() {
        let items = load(
            r#"
            [[item]]
            defaults = { width = 60 }

            [[item]]
            sensor = "Status"

            [[item]]
            "defaults+" = { height = 20, type = "Meter" }

            [[item]]
            sensor = "Fraction"
            width = 10

            [[item]]
            defaults = { update-interval = 1.5 }

            [[item]]
            sensor = "State"
            "#,
        );
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].footprint, (60, 40));
        assert!(matches!(items[0].indicator, Ok(ref c) if c.kind.is_none()));

        assert_eq!(items[1].footprint, (10, 20));
        assert_eq!(items[1].indicator.as_ref().unwrap().kind.as_deref(), Some("Meter"));

        // `defaults` starts again from the built-in layer
        assert_eq!(items[2].footprint, (40, 40));
        assert_eq!(items[2].sensor.update_interval, Some(1.5));
        assert!(items[2].indicator.as_ref().unwrap().kind.is_none());
    }

    #[test]
    fn test_empty_defaults_plus_resets() {
        let mut loader = ItemLoader::new();
        loader
            .load_str(
                r#"
                [[item]]
                "defaults+" = { width = 99 }

                [[item]]
                "defaults+" = {}
                "#,
                "test.toml",
            )
            .unwrap();
        assert_eq!(loader.defaults(), &builtin_defaults());
    }

    #[test]
    fn test_defaults_carry_across_files() {
        let mut first = NamedTempFile::new().unwrap();
        writeln!(first, "[[item]]\n\"defaults+\" = {{ width = 12 }}").unwrap();
        let mut second = NamedTempFile::new().unwrap();
        writeln!(second, "[[item]]\nsensor = \"Status\"").unwrap();

        let mut loader = ItemLoader::new();
        assert!(loader.load_file(first.path()).unwrap().is_empty());
        let items = loader.load_file(second.path()).unwrap();
        assert_eq!(items[0].footprint, (12, 40));
    }

    #[test]
    fn test_bad_sensor_is_skipped() {
        let items = load(
            r#"
            [[item]]
            sensor = "Thermometer"
            type = "Lamp"

            [[item]]
            type = "Lamp"

            [[item]]
            sensor = "Status"
            program = true

            [[item]]
            sensor = "State"
            type = "Lamp"
            "#,
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sensor.sensor, SensorKind::State);
    }

    #[test]
    fn test_bad_indicator_fields_keep_the_item() {
        let items = load(
            r#"
            [[item]]
            sensor = "Status"
            type = "Lamp"
            state-colors = "green"
            "#,
        );
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0].indicator, Err(IndicatorError::Config(_))));
        assert_eq!(items[0].footprint, (40, 40));
    }

    #[test]
    fn test_state_color_keys_keep_case() {
        let items = load(
            r#"
            [[item]]
            sensor = "JenkinsJobState"
            url = "http://ci/job/app"
            type = "Lamp"
            state-colors = { SUCCESS = "green", FAILURE = "red" }
            "#,
        );
        let colors = &items[0].indicator.as_ref().unwrap().state_colors;
        assert!(colors.contains_key("SUCCESS"));
        assert!(colors.contains_key("FAILURE"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = ItemLoader::new().load_str("[[item]\n", "broken.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == "broken.toml"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ItemLoader::new()
            .load_file(Path::new("/nonexistent/tinydash.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
