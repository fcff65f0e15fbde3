use {
    crate::*,
    capture::RecordingConfig,
    motion::{PresenceConfig, RetryPolicy},
    serde::Deserialize,
    std::{
        path::{Path, PathBuf},
        time::Duration,
    },
    video::VideoInConfig,
};

const SERVICE_URL_ENV: &str = "SHOULDER_SERVICE_URL";
const MODEL_PATH_ENV: &str = "SHOULDER_MODEL_PATH";
const CAMERA_ENV: &str = "SHOULDER_CAMERA";
const LOG_DIR_ENV: &str = "SHOULDER_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device node; `None` picks the first camera.
    pub device: Option<PathBuf>,
    pub width: usize,
    pub height: usize,
    pub frame_rate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: None,
            width: 640,
            height: 480,
            frame_rate: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PresenceSection {
    pub confidence: f32,
    pub inset: f32,
    pub reminder_secs: u64,
}

impl Default for PresenceSection {
    fn default() -> Self {
        Self {
            confidence: 0.5,
            inset: 0.05,
            reminder_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecordingSection {
    pub jpeg_quality: u8,
}

impl Default for RecordingSection {
    fn default() -> Self {
        Self { jpeg_quality: 80 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrimSection {
    pub timeout_ms: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for TrimSection {
    fn default() -> Self {
        Self {
            timeout_ms: 10000,
            initial_backoff_ms: 100,
            max_backoff_ms: 1000,
        }
    }
}

/// Everything the assessment binary can be told from outside. Missing keys
/// and sections keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    /// Base URL of the generation, diagnosis and text-to-audio services.
    pub service_url: String,
    pub model_path: PathBuf,
    /// Nominal recording frame rate.
    pub frame_rate: f64,
    pub camera: CameraConfig,
    pub presence: PresenceSection,
    pub recording: RecordingSection,
    pub trim: TrimSection,
    /// Write logs here instead of stdout.
    pub log_dir: Option<PathBuf>,
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:3000".to_string(),
            model_path: PathBuf::from("models/movenet-lightning.onnx"),
            frame_rate: motion::NOMINAL_FRAME_RATE,
            camera: CameraConfig::default(),
            presence: PresenceSection::default(),
            recording: RecordingSection::default(),
            trim: TrimSection::default(),
            log_dir: None,
        }
    }
}

impl AssessConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` (when given), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.with_env(|var| std::env::var(var).ok())
    }

    /// Apply overrides looked up through `lookup` (normally the process environment).
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(SERVICE_URL_ENV) {
            self.service_url = url;
        }
        if let Some(path) = lookup(MODEL_PATH_ENV) {
            self.model_path = path.into();
        }
        if let Some(camera) = lookup(CAMERA_ENV) {
            if camera.trim().is_empty() {
                return Err(ConfigError::Env {
                    var: CAMERA_ENV,
                    value: camera,
                });
            }
            self.camera.device = Some(camera.into());
        }
        if let Some(dir) = lookup(LOG_DIR_ENV) {
            self.log_dir = Some(dir.into());
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject rates, sizes and intervals the capture and trim loops cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(key: &'static str, ok: bool, value: impl ToString) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    key,
                    value: value.to_string(),
                })
            }
        }

        check("frame_rate", self.frame_rate.is_finite() && self.frame_rate > 0.0, self.frame_rate)?;
        let camera = &self.camera;
        check(
            "camera.frame_rate",
            camera.frame_rate.is_finite() && camera.frame_rate > 0.0,
            camera.frame_rate,
        )?;
        check("camera.width", camera.width > 0, camera.width)?;
        check("camera.height", camera.height > 0, camera.height)?;
        let presence = &self.presence;
        check(
            "presence.confidence",
            (0.0..=1.0).contains(&presence.confidence),
            presence.confidence,
        )?;
        check("presence.inset", (0.0..0.5).contains(&presence.inset), presence.inset)?;
        let quality = self.recording.jpeg_quality;
        check("recording.jpeg_quality", (1..=100).contains(&quality), quality)?;
        let trim = &self.trim;
        check("trim.timeout_ms", trim.timeout_ms > 0, trim.timeout_ms)?;
        check(
            "trim.initial_backoff_ms",
            trim.initial_backoff_ms > 0,
            trim.initial_backoff_ms,
        )?;
        check(
            "trim.max_backoff_ms",
            trim.max_backoff_ms >= trim.initial_backoff_ms,
            trim.max_backoff_ms,
        )?;
        Ok(())
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_camera(mut self, device: impl Into<PathBuf>) -> Self {
        self.camera.device = Some(device.into());
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn video_config(&self) -> VideoInConfig {
        let mut config = VideoInConfig::default()
            .with_size(self.camera.width, self.camera.height)
            .with_frame_rate(self.camera.frame_rate);
        if let Some(device) = &self.camera.device {
            config = config.with_path(device);
        }
        config
    }

    pub fn presence_config(&self) -> PresenceConfig {
        PresenceConfig {
            confidence: self.presence.confidence,
            inset: self.presence.inset,
            reminder_interval: Duration::from_secs(self.presence.reminder_secs),
        }
    }

    pub fn recording_config(&self) -> RecordingConfig {
        RecordingConfig::default()
            .with_frame_rate(self.frame_rate)
            .with_jpeg_quality(self.recording.jpeg_quality)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_backoff: Duration::from_millis(self.trim.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.trim.max_backoff_ms),
            timeout: Duration::from_millis(self.trim.timeout_ms),
        }
    }
}
