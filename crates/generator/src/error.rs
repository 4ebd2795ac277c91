use std::io;
use std::path::{Path, PathBuf};

use coding::CodingError;
use config::ConfigError;
use container::ContainerError;
use feature::RawFeatureError;
use thiserror::Error;

/// Whole-build failure returned by [`generate_final_features`](crate::generate_final_features).
///
/// Per-feature problems (degenerate rings, features without geometry) are
/// not errors; they are logged and the feature or ring is dropped.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An I/O failure, with the operation and the file it hit.
    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    RawFeature(#[from] RawFeatureError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A value outgrew the width it is encoded with.
    #[error("{what} is {value}, above the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        value: u64,
        limit: u64,
    },

    /// The raw file holds no feature that can be placed on the map.
    #[error("no features with a usable location in the input")]
    NoFeatures,
}

impl BuildError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        BuildError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Attaches path context to reader errors that wrap an I/O failure.
    pub(crate) fn coding(op: &'static str, path: &Path, err: CodingError) -> Self {
        match err {
            CodingError::Io(source) => BuildError::io(op, path, source),
            other => BuildError::RawFeature(RawFeatureError::Coding(other)),
        }
    }
}

/// Checks that `value` fits the `u32` it is about to be encoded as.
pub(crate) fn check_u32(what: &'static str, value: u64) -> Result<u32, BuildError> {
    u32::try_from(value).map_err(|_| BuildError::LimitExceeded {
        what,
        value,
        limit: u64::from(u32::MAX),
    })
}
