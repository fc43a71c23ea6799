// Assembler Module
// Resolves symbolic assembly in two passes and encodes it to 16-bit words

pub mod encoder;
pub mod parser;
pub mod resolver;
pub mod symbol_table;


use crate::asm::{number_lines, AsmLine, AsmStatement};
use crate::error::ToolchainError;
use log::info;
use std::fs;
use std::path::Path;

pub use resolver::ResolvedInstruction;
pub use symbol_table::{SymbolKind, SymbolTable};

/// Encoded program plus the table it was resolved against
#[derive(Debug, Clone)]
pub struct AssembledProgram {
    pub words: Vec<u16>,
    pub symbols: SymbolTable,
}

impl AssembledProgram {
    pub fn symbol_address(&self, name: &str) -> Option<u16> {
        self.symbols.get(name)
    }

    /// Output format B: one 16-digit binary line per word
    pub fn to_binary_text(&self) -> String {
        encoder::render_binary(&self.words)
    }
}

/// Main assembler structure
#[derive(Debug, Default)]
pub struct Assembler;

impl Assembler {
    pub fn new() -> Self {
        Assembler
    }

    /// Assemble already-parsed statements. Each call builds its own symbol
    /// table, so nothing carries over between programs.
    pub fn assemble(&self, statements: &[AsmStatement]) -> Result<AssembledProgram, ToolchainError> {
        let (resolved, symbols) = resolver::resolve(statements)?;
        let words = encoder::encode_program(&resolved)?;
        info!(
            "Assembled {} words, {} user symbols",
            words.len(),
            symbols.user_symbol_count()
        );
        Ok(AssembledProgram { words, symbols })
    }

    pub fn assemble_source(&self, source: &str) -> Result<AssembledProgram, ToolchainError> {
        self.assemble(&parser::parse_source(source)?)
    }

    /// Assemble translator output directly, skipping the text round trip
    pub fn assemble_lines(&self, lines: &[AsmLine]) -> Result<AssembledProgram, ToolchainError> {
        self.assemble(&number_lines(lines))
    }

    /// Build contract: read assembly text, write binary text. Nothing is
    /// written if assembly fails.
    pub fn assemble_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<AssembledProgram, ToolchainError> {
        let source = fs::read_to_string(input).map_err(|e| {
            ToolchainError::IOError(format!("cannot read '{}': {}", input.display(), e))
        })?;
        let program = self.assemble_source(&source)?;
        fs::write(output, program.to_binary_text()).map_err(|e| {
            ToolchainError::IOError(format!("cannot write '{}': {}", output.display(), e))
        })?;
        Ok(program)
    }
}
