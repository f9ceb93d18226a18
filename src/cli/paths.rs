//! Default paths and configuration file management

use crate::elag::CompilerConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Get the configuration directory for elag
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir().context("Could not determine local data directory")?;
    Ok(base.join("elag"))
}

/// Get the default config path
fn default_config_path() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir.join("config.json"))
}

/// Get the config file path with optional override
pub fn config_file_path_with_override(custom_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = custom_path {
        validate_config_path(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(path.to_path_buf())
    } else {
        default_config_path()
    }
}

/// Validate that a config file path has .json extension
pub fn validate_config_path(path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => Ok(()),
        Some(ext) => Err(anyhow::anyhow!(
            "Config file must have .json extension, got .{}. Please use a .json file.",
            ext
        )),
        None => Err(anyhow::anyhow!(
            "Config file must have .json extension. Please add .json to the filename."
        )),
    }
}

/// User configuration stored in config file
///
/// Unset fields fall back to the compiler defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PersistentConfig {
    /// Split grammars above this many states
    pub max_grammar_states: Option<usize>,
    /// Write `<rule>-conc.fst2` next to each rule
    pub write_locate_automata: Option<bool>,
    /// Load an existing `.elg` instead of recompiling
    pub reuse_compiled_rules: Option<bool>,
    /// Minimize grammars before saving
    pub minimize_output: Option<bool>,
}

impl PersistentConfig {
    /// Load configuration from the default or a custom path
    pub fn load_from(custom_path: Option<&Path>) -> Result<Self> {
        let path = config_file_path_with_override(custom_path)?;
        Self::read(&path)
    }

    /// Read a configuration file; a missing file is an empty configuration
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to the default or a custom path
    pub fn save_to(&self, custom_path: Option<&Path>) -> Result<()> {
        let path = config_file_path_with_override(custom_path)?;
        self.write(&path)
    }

    /// Write the configuration file
    pub fn write(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Merge with command-line options (CLI options take precedence)
    pub fn merge_with_cli(
        &self,
        max_grammar_states: Option<usize>,
        write_locate_automata: Option<bool>,
        reuse_compiled_rules: Option<bool>,
        minimize_output: Option<bool>,
    ) -> Self {
        Self {
            max_grammar_states: max_grammar_states.or(self.max_grammar_states),
            write_locate_automata: write_locate_automata.or(self.write_locate_automata),
            reuse_compiled_rules: reuse_compiled_rules.or(self.reuse_compiled_rules),
            minimize_output: minimize_output.or(self.minimize_output),
        }
    }

    /// Compiler settings, defaults filled in
    pub fn compiler_config(&self) -> CompilerConfig {
        let defaults = CompilerConfig::default();
        CompilerConfig {
            max_grammar_states: self.max_grammar_states.unwrap_or(defaults.max_grammar_states),
            write_locate_automata: self
                .write_locate_automata
                .unwrap_or(defaults.write_locate_automata),
            reuse_compiled_rules: self
                .reuse_compiled_rules
                .unwrap_or(defaults.reuse_compiled_rules),
            minimize_output: self.minimize_output.unwrap_or(defaults.minimize_output),
        }
    }
}
