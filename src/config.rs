// Build Configuration
//
// Optional TOML file read by the translator binary. Every key has a default,
// so an empty file (or no file) yields the standard runtime layout.

use crate::error::ToolchainError;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub translator: TranslatorConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    /// Function the bootstrap preamble calls
    pub entry_function: String,
    /// First free stack address; the bootstrap loads it into SP
    pub stack_base: u16,
    /// Emit the bootstrap preamble before the first unit
    pub bootstrap: bool,
    /// Echo each VM instruction as a comment ahead of its expansion
    pub emit_comments: bool,
    /// Extension of source files picked up from a directory
    pub source_extension: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            entry_function: "Sys.init".to_string(),
            stack_base: 256,
            bootstrap: true,
            emit_comments: true,
            source_extension: "vm".to_string(),
        }
    }
}

impl BuildConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ToolchainError> {
        let config: BuildConfig =
            toml::from_str(text).map_err(|e| ToolchainError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ToolchainError> {
        debug!("Loading build configuration from {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| {
            ToolchainError::IOError(format!("cannot read '{}': {}", path.display(), e))
        })?;
        BuildConfig::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ToolchainError> {
        let t = &self.translator;
        if t.entry_function.trim().is_empty() {
            return Err(ToolchainError::ConfigError(
                "translator.entry_function must not be empty".to_string(),
            ));
        }
        if t.stack_base > crate::isa::MAX_ADDRESS {
            return Err(ToolchainError::ConfigError(format!(
                "translator.stack_base {} exceeds {}",
                t.stack_base,
                crate::isa::MAX_ADDRESS
            )));
        }
        if t.source_extension.is_empty() || t.source_extension.starts_with('.') {
            return Err(ToolchainError::ConfigError(
                "translator.source_extension must be a bare extension such as \"vm\"".to_string(),
            ));
        }
        Ok(())
    }
}
