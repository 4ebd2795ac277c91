//! # Config - immutable build configuration
//!
//! Everything the generator needs to know that is not in the features
//! themselves: the [`Classificator`] type table, scale presets per
//! [`MapType`], the coordinate bit depth, region metadata and an optional
//! border rectangle.
//!
//! Configuration is loaded from TOML once and passed by reference into the
//! stages that need it. Nothing here is global.
//!
//! ```toml
//! coord_bits = 27
//!
//! [[classificator.types]]
//! code = 1
//! name = "highway-primary"
//! min_scale = 6
//! road = true
//! ```

mod classificator;
pub mod scales;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use coding::write_varuint;
use geometry::RectD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use classificator::{Classificator, TypeInfo};
pub use scales::{scale_window, MapType, COUNTRY_SCALES, DEFAULT_COORD_BITS, WORLD_SCALES};

/// Errors raised while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Top-level build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    /// Bit depth per axis for country files. World files derive theirs.
    #[serde(default = "default_coord_bits")]
    pub coord_bits: u8,
    #[serde(default)]
    pub classificator: Classificator,
}

fn default_coord_bits() -> u8 {
    DEFAULT_COORD_BITS
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            coord_bits: DEFAULT_COORD_BITS,
            classificator: Classificator::default(),
        }
    }
}

impl BuildConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid
    /// TOML, or carries out-of-range values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let cfg: BuildConfig = read_toml(path.as_ref())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on parse or range errors.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: BuildConfig =
            toml::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.coord_bits == 0 || self.coord_bits > coding::MAX_COORD_BITS {
            return Err(ConfigError::Invalid(format!(
                "coord_bits must be in 1..={}, got {}",
                coding::MAX_COORD_BITS,
                self.coord_bits
            )));
        }
        Ok(())
    }
}

/// Free-form key/value metadata about the region a file covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionData {
    entries: BTreeMap<String, String>,
}

impl RegionData {
    /// Loads region data from a flat TOML table of strings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        read_toml(path.as_ref())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wire format: `count(varuint)` then `len bytes` key and value per entry.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_varuint(w, self.entries.len() as u64)?;
        for (k, v) in &self.entries {
            for s in [k, v] {
                write_varuint(w, s.len() as u64)?;
                w.write_all(s.as_bytes())?;
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct BordersFile {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

/// Loads a border rectangle from a TOML file with `min_x`, `min_y`,
/// `max_x` and `max_y` keys.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is unreadable or the rectangle is
/// inverted or not finite.
pub fn load_borders<P: AsRef<Path>>(path: P) -> Result<RectD, ConfigError> {
    let b: BordersFile = read_toml(path.as_ref())?;
    let rect = RectD::new(b.min_x, b.min_y, b.max_x, b.max_y);
    let finite = [b.min_x, b.min_y, b.max_x, b.max_y].iter().all(|v| v.is_finite());
    if !finite || rect.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "borders in {} are not a valid rectangle",
            path.as_ref().display()
        )));
    }
    Ok(rect)
}

#[cfg(test)]
mod tests;
