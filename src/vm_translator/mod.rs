// VM Translator Module
// Lowers stack-machine VM programs to target assembly text

pub mod codegen;
pub mod codegen_calls;
pub mod codegen_emit;
pub mod command;
pub mod context;
pub mod parser;

#[cfg(test)]
mod calls_tests;
#[cfg(test)]
mod codegen_tests;

use crate::asm::{render_program, AsmLine};
use crate::config::TranslatorConfig;
use crate::error::ToolchainError;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

pub use codegen::VmCodeGen;
pub use command::{Category, VmInstruction};
pub use context::TranslationContext;

/// One translation unit: a source file's classified instructions
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub name: String,
    pub instructions: Vec<VmInstruction>,
}

impl SourceUnit {
    pub fn new(name: &str, instructions: Vec<VmInstruction>) -> Self {
        SourceUnit {
            name: name.to_string(),
            instructions,
        }
    }

    /// Classify VM source text into a unit
    pub fn parse(name: &str, source: &str) -> Result<Self, ToolchainError> {
        Ok(SourceUnit::new(name, parser::parse_source(source)?))
    }
}

/// Main translator structure
pub struct VmTranslator {
    config: TranslatorConfig,
}

impl Default for VmTranslator {
    fn default() -> Self {
        Self::new(TranslatorConfig::default())
    }
}

impl VmTranslator {
    pub fn new(config: TranslatorConfig) -> Self {
        VmTranslator { config }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate a whole program. A fresh context is built for every call,
    /// so independent builds share nothing; units within one call share one
    /// context and are emitted in the order given.
    pub fn translate_program(&self, units: &[SourceUnit]) -> Result<Vec<AsmLine>, ToolchainError> {
        let mut ctx = TranslationContext::new();
        let mut codegen = VmCodeGen::new(&mut ctx, &self.config);

        if self.config.bootstrap {
            codegen.write_bootstrap()?;
        }

        for unit in units {
            codegen.translate_unit(&unit.name, &unit.instructions)?;
        }

        let lines = codegen.finish();
        info!(
            "Translated {} unit(s) into {} assembly lines",
            units.len(),
            lines.len()
        );
        Ok(lines)
    }

    /// Translate a program and render it as assembly text
    pub fn translate_to_text(&self, units: &[SourceUnit]) -> Result<String, ToolchainError> {
        Ok(render_program(&self.translate_program(units)?))
    }

    /// Load a single source file, or every source file in a directory in
    /// lexicographic file-name order.
    pub fn load_units(&self, input: &Path) -> Result<Vec<SourceUnit>, ToolchainError> {
        let files = if input.is_dir() {
            self.source_files_in(input)?
        } else if input.is_file() {
            vec![input.to_path_buf()]
        } else {
            return Err(ToolchainError::IOError(format!(
                "'{}' is not a file or directory",
                input.display()
            )));
        };

        let mut units = Vec::with_capacity(files.len());
        for file in files {
            let name = unit_name(&file)?;
            debug!("Reading unit '{}' from {}", name, file.display());
            let source = fs::read_to_string(&file).map_err(|e| {
                ToolchainError::IOError(format!("cannot read '{}': {}", file.display(), e))
            })?;
            units.push(SourceUnit::parse(&name, &source)?);
        }
        Ok(units)
    }

    /// Build contract: translate a file or directory and write one assembly
    /// file. Nothing is written if translation fails.
    pub fn translate_path(&self, input: &Path, output: &Path) -> Result<usize, ToolchainError> {
        let units = self.load_units(input)?;
        let text = self.translate_to_text(&units)?;
        fs::write(output, &text).map_err(|e| {
            ToolchainError::IOError(format!("cannot write '{}': {}", output.display(), e))
        })?;
        Ok(units.len())
    }

    fn source_files_in(&self, dir: &Path) -> Result<Vec<PathBuf>, ToolchainError> {
        let entries = fs::read_dir(dir).map_err(|e| {
            ToolchainError::IOError(format!("cannot read directory '{}': {}", dir.display(), e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| ToolchainError::IOError(e.to_string()))?
                .path();
            let matches = path
                .extension()
                .map_or(false, |ext| ext == self.config.source_extension.as_str());
            if path.is_file() && matches {
                files.push(path);
            }
        }
        // read_dir order is platform-dependent; emission order fixes addresses
        files.sort();
        debug!("Found {} source file(s) in {}", files.len(), dir.display());
        Ok(files)
    }
}

/// Unit name is the file name without its extension
fn unit_name(path: &Path) -> Result<String, ToolchainError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ToolchainError::IOError(format!("cannot derive a unit name from '{}'", path.display()))
        })
}
