//! Application configuration.
//!
//! All values are fixed when the process starts; nothing here is reloaded
//! while a session is running.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EyestreamError, EyestreamResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Event classification parameters.
    pub detection: DetectionConfig,

    /// Expected camera frame geometry.
    pub image: ImageConfig,

    /// Upstream frame transport.
    pub transport: TransportConfig,

    /// Output channel settings.
    pub outlets: OutletConfig,

    /// Diagnostic overlay settings.
    pub overlay: OverlayConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Classifier thresholds and window sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Displacement threshold (pixels) for fixation/saccade and the
    /// intensity stddev threshold for blinks.
    pub threshold: f64,

    /// Capacity of both sliding windows.
    pub history_size: usize,

    /// Eye-region patch used for the blink intensity statistic.
    pub patch: PatchDimensions,

    /// Name of the scene object mirroring the gaze position.
    pub marker_name: String,
}

/// Width x height of the blink patch, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchDimensions {
    pub width: u32,
    pub height: u32,
}

/// Camera frame geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    /// Colour channels the decoded buffer must carry (1, 3 or 4).
    pub channels: u8,
    /// Angular extent covered by the frame.
    pub field_of_view: FieldOfView,
}

/// Horizontal x vertical field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub horizontal_deg: f64,
    pub vertical_deg: f64,
}

/// Binary layout of the gaze part of an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GazePayloadLayout {
    /// 8 bytes: two native-endian `i32`, each required to fit in `i16`.
    #[default]
    Wide,
    /// 4 bytes: two native-endian `i16`.
    Packed,
}

/// Upstream subscription settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Endpoint the SUB socket connects to.
    pub address: String,
    /// Topic prefix to subscribe to.
    pub topic: String,
    /// How long one receive waits before yielding back to the loop.
    pub poll_timeout_ms: u64,
    /// Receive high-water mark.
    pub recv_hwm: u32,
    pub gaze_layout: GazePayloadLayout,
}

/// Where published samples go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutletSink {
    /// One JSONL file per stream under `output_dir`.
    #[default]
    Jsonl,
    /// A ZMQ PUB socket, one topic per stream.
    Zmq,
    /// Samples are counted and dropped.
    None,
}

/// Output channel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutletConfig {
    /// Nominal rate declared on every stream.
    pub nominal_rate_hz: f64,
    pub sink: OutletSink,
    pub output_dir: PathBuf,
    /// Bind address for the PUB sink.
    pub pub_address: String,
}

/// Which surface renders the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    #[default]
    None,
    /// Overwrite a single PNG every frame.
    Snapshot,
    /// Native window (requires the `window` feature).
    Window,
}

impl std::str::FromStr for DisplayKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "snapshot" => Ok(Self::Snapshot),
            "window" => Ok(Self::Window),
            other => Err(format!("unknown display {other:?}, expected none|snapshot|window")),
        }
    }
}

/// Diagnostic overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    /// Half the side length of the gaze box.
    pub box_half_size: u32,
    /// Line thickness of the gaze box.
    pub thickness: u32,
    pub display: DisplayKind,
    pub snapshot_path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "eyestream_runtime=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            history_size: 10,
            patch: PatchDimensions {
                width: 63,
                height: 111,
            },
            marker_name: "Gaze".to_string(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            channels: 3,
            field_of_view: FieldOfView {
                horizontal_deg: 115.0,
                vertical_deg: 90.0,
            },
        }
    }
}

impl ImageConfig {
    /// Pixels per degree along each axis.
    pub fn pixels_per_degree(&self) -> (f64, f64) {
        (
            self.width as f64 / self.field_of_view.horizontal_deg,
            self.height as f64 / self.field_of_view.vertical_deg,
        )
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: "tcp://localhost:5556".to_string(),
            topic: "CamCapture".to_string(),
            poll_timeout_ms: 100,
            recv_hwm: 1000,
            gaze_layout: GazePayloadLayout::default(),
        }
    }
}

impl Default for OutletConfig {
    fn default() -> Self {
        Self {
            nominal_rate_hz: 30.0,
            sink: OutletSink::default(),
            output_dir: PathBuf::from("eyestream-out"),
            pub_address: "tcp://*:5557".to_string(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            box_half_size: 10,
            thickness: 2,
            display: DisplayKind::default(),
            snapshot_path: PathBuf::from("eyestream-overlay.png"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`] this
    /// never falls back to defaults.
    pub fn load_from(path: &Path) -> EyestreamResult<Self> {
        if !path.exists() {
            return Err(EyestreamError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> EyestreamResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> EyestreamResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> EyestreamResult<()> {
        let detection = &self.detection;
        if detection.history_size == 0 {
            return Err(EyestreamError::config("detection.history_size must be at least 1"));
        }
        if !detection.threshold.is_finite() || detection.threshold < 0.0 {
            return Err(EyestreamError::config(format!(
                "detection.threshold must be finite and non-negative, got {}",
                detection.threshold
            )));
        }
        if detection.patch.width == 0 || detection.patch.height == 0 {
            return Err(EyestreamError::config("detection.patch dimensions must be non-zero"));
        }
        if detection.marker_name.trim().is_empty() {
            return Err(EyestreamError::config("detection.marker_name must not be empty"));
        }

        let image = &self.image;
        if image.width == 0 || image.height == 0 {
            return Err(EyestreamError::config("image dimensions must be non-zero"));
        }
        if !matches!(image.channels, 1 | 3 | 4) {
            return Err(EyestreamError::config(format!(
                "image.channels must be 1, 3 or 4, got {}",
                image.channels
            )));
        }
        if image.height > i16::MAX as u32 + 1 {
            return Err(EyestreamError::config("image.height exceeds the gaze coordinate range"));
        }
        let fov = image.field_of_view;
        if fov.horizontal_deg <= 0.0 || fov.vertical_deg <= 0.0 {
            return Err(EyestreamError::config("image.field_of_view must be positive"));
        }

        let rate = self.outlets.nominal_rate_hz;
        if rate.is_nan() || rate <= 0.0 {
            return Err(EyestreamError::config("outlets.nominal_rate_hz must be positive"));
        }

        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("eyestream").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_setup() {
        let config = AppConfig::default();
        assert_eq!(config.detection.threshold, 0.7);
        assert_eq!(config.detection.history_size, 10);
        assert_eq!(config.detection.patch.width, 63);
        assert_eq!(config.detection.patch.height, 111);
        assert_eq!(config.image.width, 400);
        assert_eq!(config.image.height, 400);
        assert_eq!(config.outlets.nominal_rate_hz, 30.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn pixels_per_degree_uses_field_of_view() {
        let image = ImageConfig::default();
        let (px, py) = image.pixels_per_degree();
        assert!((px - 400.0 / 115.0).abs() < 1e-12);
        assert!((py - 400.0 / 90.0).abs() < 1e-12);
    }

    #[test]
    fn partial_json_fills_missing_sections() {
        let config: AppConfig =
            serde_json::from_str(r#"{"detection": {"threshold": 1.5}}"#).unwrap();
        assert_eq!(config.detection.threshold, 1.5);
        assert_eq!(config.detection.history_size, 10);
        assert_eq!(config.transport.topic, "CamCapture");
    }

    #[test]
    fn validate_rejects_empty_window() {
        let mut config = AppConfig::default();
        config.detection.history_size = 0;
        assert!(matches!(
            config.validate(),
            Err(EyestreamError::Config { .. })
        ));
    }

    #[test]
    fn validate_rejects_nan_threshold() {
        let mut config = AppConfig::default();
        config.detection.threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_and_load_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.transport.gaze_layout = GazePayloadLayout::Packed;
        config.overlay.display = DisplayKind::Snapshot;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_missing_path_is_not_found() {
        let err = AppConfig::load_from(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, EyestreamError::FileNotFound { .. }));
    }

    #[test]
    fn display_kind_parses_cli_spelling() {
        assert_eq!("Snapshot".parse::<DisplayKind>(), Ok(DisplayKind::Snapshot));
        assert_eq!("none".parse::<DisplayKind>(), Ok(DisplayKind::None));
        assert!("hologram".parse::<DisplayKind>().is_err());
    }

    #[test]
    fn overlay_section_serializes_with_app_config() {
        let mut config = AppConfig::default();
        config.overlay.display = DisplayKind::Window;
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["overlay"]["display"], "window");
        assert_eq!(json["overlay"]["box_half_size"], 10);
    }
}
