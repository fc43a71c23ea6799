// Symbol Table
//
// Names bound to addresses for one assembly. Predefined names are seeded on
// construction and can never be rebound; labels bind to ROM positions in
// pass 1; variables bind to successive RAM words from 16 in pass 2.

use crate::error::ToolchainError;
use crate::isa::MAX_ADDRESS;
use indexmap::IndexMap;
use log::{debug, warn};

/// First RAM word handed out to variables
pub const VARIABLE_BASE: u16 = 16;

pub const SCREEN: u16 = 16384;
pub const KBD: u16 = 24576;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Predefined,
    Label,
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub address: u16,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// Insertion order is kept so dumps list symbols as they were bound
    entries: IndexMap<String, SymbolEntry>,
    next_variable: u16,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut entries = IndexMap::new();
        let mut seed = |name: String, address: u16| {
            entries.insert(
                name,
                SymbolEntry {
                    address,
                    kind: SymbolKind::Predefined,
                },
            );
        };

        for register in 0..16u16 {
            seed(format!("R{}", register), register);
        }
        for (name, address) in [("SP", 0), ("LCL", 1), ("ARG", 2), ("THIS", 3), ("THAT", 4)] {
            seed(name.to_string(), address);
        }
        seed("SCREEN".to_string(), SCREEN);
        seed("KBD".to_string(), KBD);

        SymbolTable {
            entries,
            next_variable: VARIABLE_BASE,
        }
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.entries.get(name).map(|entry| entry.address)
    }

    pub fn entry(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Symbols in binding order, predefined names first
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of symbols bound by the program itself
    pub fn user_symbol_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.kind != SymbolKind::Predefined)
            .count()
    }

    /// Bind a label to a ROM position. Rebinding to the same position is a
    /// no-op; anything else, including shadowing a predefined name, fails.
    pub fn define_label(
        &mut self,
        name: &str,
        address: u16,
        line: usize,
    ) -> Result<(), ToolchainError> {
        if let Some(existing) = self.entries.get(name) {
            if existing.address == address && existing.kind == SymbolKind::Label {
                return Ok(());
            }
            return Err(ToolchainError::DuplicateLabel(
                name.to_string(),
                existing.address,
                address,
                line,
            ));
        }
        debug!("label {} = {}", name, address);
        self.entries.insert(
            name.to_string(),
            SymbolEntry {
                address,
                kind: SymbolKind::Label,
            },
        );
        Ok(())
    }

    /// Look a symbol up, binding it as the next variable if unseen
    pub fn resolve_or_allocate(&mut self, name: &str) -> Result<u16, ToolchainError> {
        if let Some(address) = self.get(name) {
            return Ok(address);
        }

        let address = self.next_variable;
        if address > MAX_ADDRESS {
            return Err(ToolchainError::ResourceExhaustion(format!(
                "no RAM left for variable '{}'",
                name
            )));
        }

        debug!("variable {} = {}", name, address);
        if name.contains('$') {
            // Synthesized branch targets carry '$'; this is likely a label
            // that was never defined
            warn!(
                "'{}' is not a defined label; allocated as variable at {}",
                name, address
            );
        }

        self.entries.insert(
            name.to_string(),
            SymbolEntry {
                address,
                kind: SymbolKind::Variable,
            },
        );
        self.next_variable += 1;
        Ok(address)
    }
}
