//! Session configuration.
//!
//! `SessionOptions` carries the knobs forwarded to the agent command line
//! plus client-side timeouts.  Options can be built in code or loaded from
//! a TOML file; absent fields fall back to their defaults so a minimal
//! file (or none at all) works on first run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading options off disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing options at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse options TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for a streaming session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionOptions {
    /// Longest side of the streamed video in pixels; `0` streams at the
    /// device's native resolution.
    pub max_size: u16,
    /// Target video bit rate in bits per second; `0` uses the agent default.
    pub bit_rate: u32,
    /// Frame rate cap; `0` leaves the rate uncapped.
    pub max_fps: u16,
    /// Suppress empty heartbeat frame events while no video data arrives.
    pub block_frame: bool,
    /// Keep the device screen awake while the session runs.
    pub stay_awake: bool,
    /// Deadline for reaching the agent, in milliseconds.  Also bounds the
    /// handshake read and the wait for the agent's startup banner.
    pub connection_timeout_ms: u64,
    /// Local path of the agent package to push and launch.  When unset the
    /// agent is assumed to be already running on the device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_package: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_size: 0,
            bit_rate: 8_000_000,
            max_fps: 0,
            block_frame: false,
            stay_awake: true,
            connection_timeout_ms: 3_000,
            agent_package: None,
        }
    }
}

impl SessionOptions {
    /// The connection deadline as a [`Duration`].
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    /// Loads options from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than
    /// "not found" (an absent file yields the defaults), and
    /// [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_have_expected_values() {
        // Arrange / Act
        let options = SessionOptions::default();

        // Assert
        assert_eq!(options.max_size, 0);
        assert_eq!(options.bit_rate, 8_000_000);
        assert_eq!(options.max_fps, 0);
        assert!(!options.block_frame);
        assert!(options.stay_awake);
        assert_eq!(options.connection_timeout(), Duration::from_millis(3_000));
        assert_eq!(options.agent_package, None);
    }

    #[test]
    fn test_deserialize_partial_toml_keeps_defaults() {
        // Arrange
        let toml_str = r#"
max_size = 1280
bit_rate = 2000000
"#;

        // Act
        let options: SessionOptions = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(options.max_size, 1280);
        assert_eq!(options.bit_rate, 2_000_000);
        // Unspecified fields keep their defaults
        assert!(options.stay_awake);
        assert_eq!(options.connection_timeout_ms, 3_000);
    }

    #[test]
    fn test_options_round_trip_through_toml() {
        // Arrange
        let mut options = SessionOptions::default();
        options.max_fps = 60;
        options.agent_package = Some(PathBuf::from("/opt/tapcast/tapcast-agent.jar"));

        // Act
        let toml_str = toml::to_string_pretty(&options).expect("serialize");
        let restored: SessionOptions = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(options, restored);
    }

    #[test]
    fn test_unset_agent_package_is_omitted_from_toml() {
        let options = SessionOptions::default();
        let toml_str = toml::to_string_pretty(&options).expect("serialize");
        assert!(!toml_str.contains("agent_package"));
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        // Arrange
        let path = Path::new("/nonexistent/path/that/cannot/exist/tapcast.toml");

        // Act
        let options = SessionOptions::load(path).expect("missing file falls back to defaults");

        // Assert
        assert_eq!(options, SessionOptions::default());
    }

    #[test]
    fn test_load_round_trip_via_temp_dir() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("tapcast_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tapcast.toml");
        std::fs::write(&path, "max_size = 1920\nstay_awake = false\n").unwrap();

        // Act
        let options = SessionOptions::load(&path).expect("load");

        // Assert
        assert_eq!(options.max_size, 1920);
        assert!(!options.stay_awake);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_invalid_toml_returns_parse_error() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("tapcast_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tapcast.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = SessionOptions::load(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
