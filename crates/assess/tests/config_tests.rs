use {
    assess::{AssessConfig, ConfigError},
    base::Vec2,
    std::{collections::HashMap, path::PathBuf, time::Duration},
};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |var| vars.get(var).cloned()
}

#[test]
fn test_defaults() {
    let config = AssessConfig::default();
    assert_eq!(config.service_url, "http://localhost:3000");
    assert_eq!(config.frame_rate, 30.0);
    assert_eq!(config.camera.device, None);
    assert!(config.log_dir.is_none());

    let presence = config.presence_config();
    assert_eq!(presence.confidence, 0.5);
    assert_eq!(presence.reminder_interval, Duration::from_secs(15));

    let policy = config.retry_policy();
    assert_eq!(policy.initial_backoff, Duration::from_millis(100));
    assert_eq!(policy.max_backoff, Duration::from_secs(1));
    assert_eq!(policy.timeout, Duration::from_secs(10));

    let video = config.video_config();
    assert_eq!(video.size, Some(Vec2::new(640, 480)));
    assert_eq!(video.path, None);
}

#[test]
fn test_partial_toml() {
    let config = AssessConfig::from_toml_str(
        r#"
service_url = "https://clinic.example.org"

[camera]
device = "/dev/video2"
frame_rate = 15.0

[trim]
timeout_ms = 4000
"#,
    )
    .unwrap();
    assert_eq!(config.service_url, "https://clinic.example.org");
    assert_eq!(config.camera.device, Some(PathBuf::from("/dev/video2")));
    assert_eq!(config.camera.width, 640);
    assert_eq!(config.video_config().frame_rate, Some(15.0));
    assert_eq!(config.video_config().path, Some(PathBuf::from("/dev/video2")));
    assert_eq!(config.retry_policy().timeout, Duration::from_secs(4));
    assert_eq!(config.retry_policy().initial_backoff, Duration::from_millis(100));
    assert_eq!(config.recording_config().jpeg_quality, 80);
}

#[test]
fn test_bad_toml() {
    assert!(matches!(
        AssessConfig::from_toml_str("frame_rate = \"fast\""),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_file() {
    let path = std::env::temp_dir().join("shoulder-assess-no-such-config.toml");
    assert!(matches!(
        AssessConfig::load(Some(&path)),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_env_overrides() {
    let config = AssessConfig::default()
        .with_env(env(&[
            ("SHOULDER_SERVICE_URL", "http://10.0.0.5:3000"),
            ("SHOULDER_CAMERA", "/dev/video1"),
            ("SHOULDER_LOG_DIR", "/var/log/shoulder"),
        ]))
        .unwrap();
    assert_eq!(config.service_url, "http://10.0.0.5:3000");
    assert_eq!(config.camera.device, Some(PathBuf::from("/dev/video1")));
    assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/shoulder")));
    assert_eq!(config.model_path, AssessConfig::default().model_path);
}

#[test]
fn test_empty_camera_override() {
    assert!(matches!(
        AssessConfig::default().with_env(env(&[("SHOULDER_CAMERA", " ")])),
        Err(ConfigError::Env { var: "SHOULDER_CAMERA", .. })
    ));
}

#[test]
fn test_builders() {
    let config = AssessConfig::default()
        .with_service_url("http://127.0.0.1:8080")
        .with_model_path("/opt/models/pose.onnx")
        .with_camera("/dev/video3");
    assert_eq!(config.service_url, "http://127.0.0.1:8080");
    assert_eq!(config.model_path, PathBuf::from("/opt/models/pose.onnx"));
    assert_eq!(config.video_config().path, Some(PathBuf::from("/dev/video3")));
}

#[test]
fn test_zero_frame_rate_rejected() {
    assert!(matches!(
        AssessConfig::from_toml_str("frame_rate = 0.0"),
        Err(ConfigError::Invalid { key: "frame_rate", .. })
    ));
    assert!(matches!(
        AssessConfig::from_toml_str("frame_rate = nan"),
        Err(ConfigError::Invalid { key: "frame_rate", .. })
    ));
    assert!(matches!(
        AssessConfig::from_toml_str("[camera]\nframe_rate = -15.0"),
        Err(ConfigError::Invalid { key: "camera.frame_rate", .. })
    ));
}

#[test]
fn test_trim_backoff_rejected() {
    assert!(matches!(
        AssessConfig::from_toml_str("[trim]\ninitial_backoff_ms = 0"),
        Err(ConfigError::Invalid { key: "trim.initial_backoff_ms", .. })
    ));
    assert!(matches!(
        AssessConfig::from_toml_str("[trim]\ninitial_backoff_ms = 500\nmax_backoff_ms = 200"),
        Err(ConfigError::Invalid { key: "trim.max_backoff_ms", .. })
    ));
    assert!(matches!(
        AssessConfig::from_toml_str("[trim]\ntimeout_ms = 0"),
        Err(ConfigError::Invalid { key: "trim.timeout_ms", .. })
    ));
}

#[test]
fn test_load_validates() {
    let path = std::env::temp_dir().join("shoulder-assess-bad-rate.toml");
    std::fs::write(&path, "frame_rate = 0.0\n").unwrap();
    let result = AssessConfig::load(Some(&path));
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(
        result,
        Err(ConfigError::Invalid { key: "frame_rate", .. })
    ));

    let mut config = AssessConfig::default();
    config.trim.initial_backoff_ms = 0;
    assert!(matches!(
        config.with_env(env(&[])),
        Err(ConfigError::Invalid { key: "trim.initial_backoff_ms", .. })
    ));
}
