use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use anyhow::{Result, anyhow};

/// The single persisted settings record. Field names on disk follow the
/// settings blob contract: `{backgroundUri, backgroundName, autoExpand}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub background_uri: Option<String>,
    pub background_name: String,
    pub auto_expand: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            background_uri: BACKGROUND_PRESETS[0].uri.map(|u| u.to_string()),
            background_name: BACKGROUND_PRESETS[0].name.to_string(),
            auto_expand: false,
        }
    }
}

/// Partial update applied to the current record; `None` fields keep their
/// previous value.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub background_uri: Option<Option<String>>,
    pub background_name: Option<String>,
    pub auto_expand: Option<bool>,
}

/// A selectable wallpaper. The URI is opaque to the core; the view layer
/// decides how to render it.
pub struct BackgroundPreset {
    pub name: &'static str,
    pub uri: Option<&'static str>,
}

pub const BACKGROUND_PRESETS: &[BackgroundPreset] = &[
    BackgroundPreset {
        name: "Portal",
        uri: Some("https://images.unsplash.com/photo-1534796636912-3b95b3ab5986?w=800"),
    },
    BackgroundPreset {
        name: "Matrix Code",
        uri: Some("https://images.unsplash.com/photo-1526374965328-7f61d4dc18c5?w=800"),
    },
    BackgroundPreset {
        name: "Cyberpunk City",
        uri: Some("https://images.unsplash.com/photo-1550745165-9bc0b252726f?w=800"),
    },
    BackgroundPreset {
        name: "Deep Space",
        uri: Some("https://images.unsplash.com/photo-1462331940025-496dfbfc7564?w=800"),
    },
    BackgroundPreset {
        name: "Circuit Board",
        uri: Some("https://images.unsplash.com/photo-1518770660439-4636190af475?w=800"),
    },
    BackgroundPreset { name: "Terminal Black", uri: None },
];

/// Durable owner of the settings record. Exactly one store exists per
/// process; the in-memory copy is authoritative and every mutation is
/// followed by a full persist of the merged record.
pub struct SettingsStore {
    path: PathBuf,
    settings: AppSettings,
}

impl SettingsStore {
    /// Load from the default location under the user config dir.
    pub fn load() -> Result<Self> {
        Ok(Self::load_from(Self::default_path()?))
    }

    /// Load from an explicit path. Absent or unparseable data falls back to
    /// the defaults; it never propagates as an error to the caller.
    pub fn load_from(path: PathBuf) -> Self {
        let settings = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("settings file at {:?} is corrupt ({}), using defaults", path, e);
                    AppSettings::default()
                }
            },
            Err(_) => AppSettings::default(),
        };
        Self { path, settings }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Merge the patch into the current record, then persist the merged
    /// record. A persistence failure is logged and the in-memory update
    /// stands.
    pub fn update(&mut self, patch: SettingsPatch) {
        if let Some(uri) = patch.background_uri {
            self.settings.background_uri = uri;
        }
        if let Some(name) = patch.background_name {
            self.settings.background_name = name;
        }
        if let Some(auto_expand) = patch.auto_expand {
            self.settings.auto_expand = auto_expand;
        }
        self.persist();
    }

    /// Overwrite both copies with the defaults.
    pub fn reset(&mut self) {
        self.settings = AppSettings::default();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            log::warn!("failed to persist settings to {:?}: {}", self.path, e);
        }
    }

    fn try_persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("floatchat").join("settings.json"))
    }
}
