//! # Configuration
//!
//! [`ProtocolConfig`] holds everything about a run that is not a connection
//! flag: where recordings go, which sound file is the cue, marker codes per
//! phase, and phase durations.
//!
//! ## Loading Priority
//!
//! Configuration is loaded from the first source that provides it:
//!
//! 1. TOML config file at an explicit path
//! 2. `EEG_PROTOCOLS_CONFIG` environment variable
//! 3. `./eeg-protocols.toml` in the current directory
//! 4. `~/.config/eeg-protocols/eeg-protocols.toml`
//! 5. Built-in defaults
//!
//! `EEG_PROTOCOLS_OUTPUT_DIR` and `EEG_PROTOCOLS_CUE_FILE` override the
//! corresponding fields whichever source was used.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ProtocolError, ProtocolResult};

/// Config file name searched for in the working and user config directories.
pub const CONFIG_FILE_NAME: &str = "eeg-protocols.toml";

/// Sound file played at phase transitions when none is configured.
pub const DEFAULT_CUE_FILE: &str = "CYCdh_K1close_Snr-05.wav";

/// Default ring buffer size handed to `start_stream` (BrainFlow's default).
const DEFAULT_RING_BUFFER_SIZE: usize = 450_000;

const DEFAULT_BASELINE_SECS: u64 = 5 * 60;
const DEFAULT_POST_MINUTES: u32 = 5;
const DEFAULT_TICK_SECS: u64 = 60;
const DEFAULT_RESTING_DURATION_MINUTES: u64 = 5;

/// Run configuration shared by both protocols.
///
/// ```
/// use eeg_protocols::config::ProtocolConfig;
///
/// let config = ProtocolConfig::default();
/// assert_eq!(config.drug_exposure.baseline_secs, 300);
/// assert_eq!(config.resting_state.duration_minutes, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Directory recordings are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Sound file played as the phase-transition cue.
    #[serde(default = "default_cue_file")]
    pub cue_file: PathBuf,

    /// Board streaming settings.
    #[serde(default)]
    pub board: BoardConfig,

    /// Marker codes written at each phase boundary.
    #[serde(default)]
    pub markers: MarkerCodes,

    /// Phase timing of the drug-exposure protocol.
    #[serde(default)]
    pub drug_exposure: DrugExposureTiming,

    /// Resting-state protocol settings.
    #[serde(default)]
    pub resting_state: RestingStateConfig,
}

/// Board streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of samples the SDK ring buffer holds before dropping the oldest.
    pub ring_buffer_size: usize,
}

/// Marker code per phase boundary.
///
/// Defaults are distinct per boundary. Identical codes are allowed; with
/// all three set to `1.0` the phases can only be told apart by order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerCodes {
    /// End of the baseline rest.
    pub rest_end: f64,
    /// Operator signalled the start of smoking.
    pub smoking_start: f64,
    /// Operator signalled the end of smoking.
    pub smoking_end: f64,
}

/// Phase durations of the drug-exposure protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrugExposureTiming {
    /// Baseline rest before the first marker, in seconds.
    pub baseline_secs: u64,
    /// Number of progress ticks recorded after the exposure.
    pub post_minutes: u32,
    /// Length of one post-period tick, in seconds.
    pub tick_secs: u64,
}

/// Resting-state protocol settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestingStateConfig {
    /// Recording length per session when `--duration` is not given.
    pub duration_minutes: u64,
}

// ─── Defaults ───────────────────────────────────────────────────────────

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_cue_file() -> PathBuf {
    PathBuf::from(DEFAULT_CUE_FILE)
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            cue_file: default_cue_file(),
            board: BoardConfig::default(),
            markers: MarkerCodes::default(),
            drug_exposure: DrugExposureTiming::default(),
            resting_state: RestingStateConfig::default(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            ring_buffer_size: DEFAULT_RING_BUFFER_SIZE,
        }
    }
}

impl Default for MarkerCodes {
    fn default() -> Self {
        Self {
            rest_end: 1.0,
            smoking_start: 2.0,
            smoking_end: 3.0,
        }
    }
}

impl Default for DrugExposureTiming {
    fn default() -> Self {
        Self {
            baseline_secs: DEFAULT_BASELINE_SECS,
            post_minutes: DEFAULT_POST_MINUTES,
            tick_secs: DEFAULT_TICK_SECS,
        }
    }
}

impl Default for RestingStateConfig {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_RESTING_DURATION_MINUTES,
        }
    }
}

impl DrugExposureTiming {
    #[must_use]
    pub fn baseline(&self) -> Duration {
        Duration::from_secs(self.baseline_secs)
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }
}

// ─── ProtocolConfig impl ────────────────────────────────────────────────

impl ProtocolConfig {
    /// Load config from a TOML file, with environment variable overrides.
    pub fn from_file(path: impl AsRef<Path>) -> ProtocolResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ProtocolError::ConfigError {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "config-toml")]
    fn parse(contents: &str) -> ProtocolResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    #[cfg(not(feature = "config-toml"))]
    fn parse(_contents: &str) -> ProtocolResult<Self> {
        Err(ProtocolError::ConfigError {
            reason: "built without the `config-toml` feature".into(),
        })
    }

    /// Discover and load config from the standard search path:
    ///
    /// 1. Explicit path (if `Some`)
    /// 2. `EEG_PROTOCOLS_CONFIG` environment variable
    /// 3. `./eeg-protocols.toml`
    /// 4. `~/.config/eeg-protocols/eeg-protocols.toml`
    ///
    /// Falls back to defaults (plus env overrides) if no file is found.
    pub fn discover(explicit_path: Option<&Path>) -> ProtocolResult<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var("EEG_PROTOCOLS_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Self::from_file(&path);
            }
            tracing::warn!(path = %path.display(), "EEG_PROTOCOLS_CONFIG points to a missing file");
        }

        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Self::from_file(&local_path);
        }

        if let Some(user_path) = dirs_config_path() {
            if user_path.exists() {
                return Self::from_file(&user_path);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `EEG_PROTOCOLS_OUTPUT_DIR` and `EEG_PROTOCOLS_CUE_FILE`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("EEG_PROTOCOLS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(cue) = std::env::var("EEG_PROTOCOLS_CUE_FILE") {
            self.cue_file = PathBuf::from(cue);
        }
    }

    /// Reject values the board or the protocols cannot work with.
    pub fn validate(&self) -> ProtocolResult<()> {
        let markers = [
            ("markers.rest_end", self.markers.rest_end),
            ("markers.smoking_start", self.markers.smoking_start),
            ("markers.smoking_end", self.markers.smoking_end),
        ];
        // Zero is the "no marker" value of the marker row.
        for (name, value) in markers {
            if value == 0.0 || !value.is_finite() {
                return Err(ProtocolError::ConfigError {
                    reason: format!("{name} must be a finite non-zero number, got {value}"),
                });
            }
        }
        if self.board.ring_buffer_size == 0 {
            return Err(ProtocolError::ConfigError {
                reason: "board.ring_buffer_size must be greater than 0".into(),
            });
        }
        if self.drug_exposure.post_minutes > 0 && self.drug_exposure.tick_secs == 0 {
            return Err(ProtocolError::ConfigError {
                reason: "drug_exposure.tick_secs must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

/// Platform-appropriate config file path.
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|dir| PathBuf::from(dir).join("eeg-protocols").join(CONFIG_FILE_NAME))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").ok().map(|dir| {
            PathBuf::from(dir)
                .join(".config")
                .join("eeg-protocols")
                .join(CONFIG_FILE_NAME)
        })
    }
}
