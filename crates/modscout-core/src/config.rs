use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::{default_categories, CategoryRule, KeywordTable};

/// Main configuration structure
///
/// Loaded from a TOML file, then CLI flags and env vars get the last word.
/// Priority: CLI > Env > File > Defaults. Every section has defaults, so a
/// config file only needs the bits you actually want to change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub assets: AssetRules,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub source: SourceConfig,
    /// Keyword table, evaluated in declared order
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            assets: AssetRules::default(),
            report: ReportConfig::default(),
            source: SourceConfig::default(),
            categories: default_categories(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    ///
    /// A missing file is fine (defaults), a broken one is not.
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to disk, creating the parent directory if needed
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default config file path
    /// Uses XDG on Linux/macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("modscout");

        Ok(config_dir.join("config.toml"))
    }

    /// The category table as the classifier wants it
    pub fn keyword_table(&self) -> KeywordTable {
        KeywordTable::new(self.categories.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetConfig {
    /// Version substring an entry must declare to count as compatible
    #[serde(default = "default_game_version")]
    pub game_version: String,

    #[serde(default = "default_loader")]
    pub loader: String,

    #[serde(default = "default_loader_version")]
    pub loader_version: String,
}

fn default_game_version() -> String {
    "1.20.1".to_string()
}

fn default_loader() -> String {
    "Forge".to_string()
}

fn default_loader_version() -> String {
    "47.4.5".to_string()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            game_version: default_game_version(),
            loader: default_loader(),
            loader_version: default_loader_version(),
        }
    }
}

/// What makes an entry asset-only (resource packs and the like)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetRules {
    /// Type tags, compared case-insensitively
    #[serde(default = "default_asset_content_types")]
    pub content_types: Vec<String>,

    /// Phrases that mark an entry as asset-only when found in its name
    #[serde(default = "default_asset_name_phrases")]
    pub name_phrases: Vec<String>,
}

fn default_asset_content_types() -> Vec<String> {
    ["resourcepack", "resource-pack", "texturepack", "texture-pack"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_asset_name_phrases() -> Vec<String> {
    vec!["resource pack".to_string()]
}

impl Default for AssetRules {
    fn default() -> Self {
        Self {
            content_types: default_asset_content_types(),
            name_phrases: default_asset_name_phrases(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,

    /// Descriptions longer than this (in characters) get cut and get "..."
    #[serde(default = "default_description_max_len")]
    pub description_max_len: usize,

    /// Modpack name for the header, left out when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modpack: Option<String>,

    /// One-line italic note under the header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
}

fn default_title() -> String {
    "CurseForge Favorites - Categorized".to_string()
}

fn default_description_max_len() -> usize {
    150
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description_max_len: default_description_max_len(),
            modpack: None,
            tagline: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Site root used to resolve relative links and build the favorites URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://www.curseforge.com".to_string()
}

fn default_user_agent() -> String {
    // The site is picky about bare clients
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
