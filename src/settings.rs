use crate::api::DEFAULT_SERVER_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const APP_FOLDER_NAME: &str = "CrimeDesk";

/// Severity bands for the safety predictor. Operator-tunable display
/// thresholds, not structural to the scoring (which the backend owns).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SafetyThresholds {
    pub high_alert_below: f64,
    pub moderate_below: f64,
}

impl Default for SafetyThresholds {
    fn default() -> Self {
        Self {
            high_alert_below: 4.5,
            moderate_below: 7.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeedConfig {
    pub interval_secs: u64,
    pub fade_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval_secs: 4,
            fade_ms: 600,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UiSettings {
    #[serde(default)]
    pub last_theme: Option<String>,
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
    pub version: String,
    pub base_path: String,
    pub server_url: String,
    // Mocked dashboard counters carried over from the original deployment;
    // there is no endpoint behind them yet.
    pub officers_on_duty: u32,
    pub active_hotspots: u32,
    #[serde(default)]
    pub safety: SafetyThresholds,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ui: UiSettings,
}

pub fn default_base_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()));

    if let Some(dir) = exe_dir {
        return dir.join("data");
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_FOLDER_NAME)
}

pub fn ensure_base_folders(base: &Path) -> io::Result<()> {
    let dirs = [
        base.to_path_buf(),
        base.join("config"),
        base.join("reports"),
        base.join("exports"),
        base.join("themes"),
    ];

    for d in dirs {
        if !d.exists() {
            fs::create_dir_all(&d)?;
        }
    }

    Ok(())
}

pub fn settings_path(base: &Path) -> PathBuf {
    base.join("config").join("settings.json")
}

pub fn load_or_init_settings(base: &Path) -> io::Result<Settings> {
    let config_path = settings_path(base);

    if config_path.exists() {
        let contents = fs::read_to_string(&config_path)?;
        let mut settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("JSON parse error: {e}")))?;

        // Ensure base_path stays in sync with the current base
        if settings.base_path != base.to_string_lossy() {
            settings.base_path = base.to_string_lossy().to_string();
        }
        return Ok(settings);
    }

    let settings = Settings {
        version: "0.1.0".to_string(),
        base_path: base.to_string_lossy().to_string(),
        server_url: DEFAULT_SERVER_URL.to_string(),
        officers_on_duty: 42,
        active_hotspots: 14,
        safety: SafetyThresholds::default(),
        feed: FeedConfig::default(),
        ui: UiSettings::default(),
    };

    let json = serde_json::to_string_pretty(&settings)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("JSON encode error: {e}")))?;
    fs::write(&config_path, json)?;

    Ok(settings)
}

pub fn save_settings(settings: &Settings, base: &Path) -> io::Result<()> {
    let config_path = settings_path(base);
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("JSON encode error: {e}")))?;
    fs::write(&config_path, json)?;
    Ok(())
}
