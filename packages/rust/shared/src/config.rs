//! Application configuration for copymark.
//!
//! User config lives at `~/.copymark/copymark.toml`.
//! The CLI can point at another file with `--config`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CopymarkError, Result};
use crate::types::CopyTargetType;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "copymark.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".copymark";

// ---------------------------------------------------------------------------
// Config structs (matching copymark.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Markdown rendering switches.
    #[serde(default)]
    pub render: RenderConfig,

    /// Per-category copy target settings.
    #[serde(default)]
    pub targets: TargetsConfig,
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Parse `$…$` / `$$…$$` math.
    #[serde(default = "default_true")]
    pub math: bool,

    /// Parse GFM tables.
    #[serde(default = "default_true")]
    pub tables: bool,

    /// Pass raw HTML in the markdown through to the output.
    #[serde(default)]
    pub unsafe_html: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            math: true,
            tables: true,
            unsafe_html: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[targets]` section, one sub-table per copy target type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetsConfig {
    #[serde(default)]
    pub code: TargetConfig,
    #[serde(default)]
    pub table: TargetConfig,
    #[serde(default)]
    pub math_block: TargetConfig,
    #[serde(default)]
    pub math_inline: TargetConfig,
    #[serde(default)]
    pub code_inline: TargetConfig,
}

impl TargetsConfig {
    /// Settings for one target type.
    pub fn get(&self, target_type: CopyTargetType) -> &TargetConfig {
        match target_type {
            CopyTargetType::Code => &self.code,
            CopyTargetType::Table => &self.table,
            CopyTargetType::MathBlock => &self.math_block,
            CopyTargetType::MathInline => &self.math_inline,
            CopyTargetType::CodeInline => &self.code_inline,
        }
    }

    /// Mutable settings for one target type.
    pub fn get_mut(&mut self, target_type: CopyTargetType) -> &mut TargetConfig {
        match target_type {
            CopyTargetType::Code => &mut self.code,
            CopyTargetType::Table => &mut self.table,
            CopyTargetType::MathBlock => &mut self.math_block,
            CopyTargetType::MathInline => &mut self.math_inline,
            CopyTargetType::CodeInline => &mut self.code_inline,
        }
    }
}

/// `[targets.<type>]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Whether this category is collected and decorated at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Override for the accessible label of the copy control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,

    /// Override for the hint text shown on inline targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            aria_label: None,
            hint: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.copymark/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CopymarkError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.copymark/copymark.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CopymarkError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        CopymarkError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| CopymarkError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CopymarkError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CopymarkError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[render]"));
        assert!(toml_str.contains("math-block"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert!(parsed.render.math);
        assert!(parsed.targets.code_inline.enabled);
    }

    #[test]
    fn config_with_target_overrides() {
        let toml_str = r#"
[render]
unsafe_html = true

[targets.code-inline]
enabled = false

[targets.table]
aria_label = "Copy this table"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(config.render.unsafe_html);
        assert!(config.render.tables);
        assert!(!config.targets.get(CopyTargetType::CodeInline).enabled);
        assert_eq!(
            config.targets.get(CopyTargetType::Table).aria_label.as_deref(),
            Some("Copy this table")
        );
        assert!(config.targets.get(CopyTargetType::Code).enabled);
    }

    #[test]
    fn init_and_load_from_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = init_config_in(dir.path()).expect("init");
        assert!(path.ends_with(CONFIG_FILE_NAME));

        let loaded = load_config_from(&path).expect("load");
        assert!(loaded.targets.math_inline.enabled);
    }

    #[test]
    fn malformed_config_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[render\nmath = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, CopymarkError::Config { .. }));
    }
}
