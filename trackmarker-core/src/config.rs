use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    runtime: RuntimeConfig,
    #[serde(default)]
    defaults: DefaultsConfig,
}

#[derive(Deserialize, Default)]
struct RuntimeConfig {
    tick_interval_ms: Option<u64>,
    announce_markers: Option<bool>,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    markers_file: Option<PathBuf>,
}

/// Runtime configuration: embedded defaults, optionally overridden by a
/// user file at `<config_dir>/trackmarker/config.toml`.
pub struct Config {
    runtime: RuntimeConfig,
    defaults: DefaultsConfig,
}

impl Config {
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_runtime(&mut base.runtime, user.runtime);
                            merge_defaults(&mut base.defaults, user.defaults);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            runtime: base.runtime,
            defaults: base.defaults,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.runtime.tick_interval_ms.unwrap_or(10).max(1))
    }

    pub fn announce_markers(&self) -> bool {
        self.runtime.announce_markers.unwrap_or(true)
    }

    /// Marker file used by `save` before any path has been given.
    pub fn markers_file(&self) -> PathBuf {
        self.defaults
            .markers_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("markers.json"))
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("trackmarker").join("config.toml"))
}

fn merge_runtime(base: &mut RuntimeConfig, user: RuntimeConfig) {
    if user.tick_interval_ms.is_some() {
        base.tick_interval_ms = user.tick_interval_ms;
    }
    if user.announce_markers.is_some() {
        base.announce_markers = user.announce_markers;
    }
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.markers_file.is_some() {
        base.markers_file = user.markers_file;
    }
}
