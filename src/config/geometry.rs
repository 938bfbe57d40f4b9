//! Persisted window geometry.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use super::ConfigError;

const GEOMETRY_FILE: &str = "geometry";

/// Window size in pixels, written as `WxH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(GEOMETRY_FILE)
    }

    /// Read the saved geometry, if there is one.
    pub fn load(config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = Self::path(config_dir);
        if !path.exists() {
            return Ok(None);
        }
        debug!("Loading geometry from {}", path.display());
        let text = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Io { path, source })?;
        text.parse().map(Some)
    }

    /// Write the geometry, creating `config_dir` if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ConfigError::Io { path, source }
        };
        std::fs::create_dir_all(config_dir).map_err(io_err(config_dir))?;

        let path = Self::path(config_dir);
        debug!("Saving geometry {} in {}", self, path.display());
        std::fs::write(&path, self.to_string()).map_err(io_err(&path))
    }
}

impl FromStr for Geometry {
    type Err = ConfigError;

    /// Accepts `WxH`, ignoring any `+X+Y` position suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::Geometry(s.trim().to_string());
        let size = s.trim().split(['+', '-']).next().ok_or_else(bad)?;
        let (w, h) = size.split_once(['x', 'X']).ok_or_else(bad)?;
        let width: u32 = w.trim().parse().map_err(|_| bad())?;
        let height: u32 = h.trim().parse().map_err(|_| bad())?;
        if width == 0 || height == 0 {
            return Err(bad());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse() {
        assert_eq!("640x480".parse::<Geometry>().unwrap(), Geometry::new(640, 480));
        assert_eq!(" 300X200\n".parse::<Geometry>().unwrap(), Geometry::new(300, 200));
        assert_eq!("300x200+10+20".parse::<Geometry>().unwrap(), Geometry::new(300, 200));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Geometry>().is_err());
        assert!("640".parse::<Geometry>().is_err());
        assert!("ax480".parse::<Geometry>().is_err());
        assert!("0x480".parse::<Geometry>().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        assert_eq!(Geometry::load(&nested).unwrap(), None);

        Geometry::new(800, 240).save(&nested).unwrap();
        assert_eq!(
            std::fs::read_to_string(nested.join("geometry")).unwrap(),
            "800x240"
        );
        assert_eq!(Geometry::load(&nested).unwrap(), Some(Geometry::new(800, 240)));
    }
}
