// Translation Context
//
// Whole-build state for the VM translator. One value is created per build by
// the driver and lent to the code generator; nothing here is global, so two
// builds in the same process never see each other's counters or units.

use crate::error::ToolchainError;
use crate::vm_translator::command::ArithmeticOp;
use indexmap::IndexSet;
use log::debug;

/// Function scope used outside any function body
pub const TOPLEVEL_SCOPE: &str = "__toplevel";

#[derive(Debug, Clone)]
pub struct TranslationContext {
    current_function: String,
    current_unit: Option<String>,
    /// Units seen so far, in translation order
    units: IndexSet<String>,
    eq_counter: u32,
    gt_counter: u32,
    lt_counter: u32,
    return_counter: u32,
}

impl Default for TranslationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationContext {
    pub fn new() -> Self {
        TranslationContext {
            current_function: TOPLEVEL_SCOPE.to_string(),
            current_unit: None,
            units: IndexSet::new(),
            eq_counter: 0,
            gt_counter: 0,
            lt_counter: 0,
            return_counter: 0,
        }
    }

    /// Start translating a new source unit. A unit name may appear only once
    /// per build: statics are namespaced by it, so a repeat would silently
    /// alias two files' statics.
    pub fn begin_unit(&mut self, name: &str) -> Result<(), ToolchainError> {
        if !self.units.insert(name.to_string()) {
            return Err(ToolchainError::UnitNameCollision(name.to_string()));
        }
        debug!("Begin unit '{}' (#{} in build)", name, self.units.len());
        self.current_unit = Some(name.to_string());
        self.current_function = self.default_scope();
        Ok(())
    }

    pub fn current_unit(&self) -> Option<&str> {
        self.current_unit.as_deref()
    }

    pub fn current_function(&self) -> &str {
        &self.current_function
    }

    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(String::as_str)
    }

    /// Scope that applies outside functions in the current unit
    pub fn default_scope(&self) -> String {
        match &self.current_unit {
            Some(unit) => format!("{}.{}", unit, TOPLEVEL_SCOPE),
            None => TOPLEVEL_SCOPE.to_string(),
        }
    }

    pub fn enter_function(&mut self, name: &str) {
        self.current_function = name.to_string();
    }

    pub fn leave_function(&mut self) {
        self.current_function = self.default_scope();
    }

    /// VM labels are visible only inside the function that declares them.
    /// The name itself may not contain `$`: a single `$` separates scope and
    /// label, and `$$` is kept for return addresses.
    pub fn scoped_label(&self, label: &str, line: usize) -> Result<String, ToolchainError> {
        let valid = !label.is_empty()
            && !label.starts_with(|ch: char| ch.is_ascii_digit())
            && label
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | ':'));
        if !valid {
            return Err(ToolchainError::unknown("label name", label, Some(line)));
        }
        Ok(format!("{}${}", self.current_function, label))
    }

    /// Assembly symbol backing `static <index>` in the current unit
    pub fn static_symbol(&self, index: u16) -> Result<String, ToolchainError> {
        let unit = self
            .current_unit
            .as_deref()
            .ok_or_else(|| ToolchainError::missing("source unit for static segment", None))?;
        Ok(format!("{}.{}", unit, index))
    }

    /// Fresh label stem for one comparison site, e.g. `CMP_GT.3`
    pub fn next_comparison_stem(&mut self, op: ArithmeticOp) -> String {
        let counter = match op {
            ArithmeticOp::Eq => &mut self.eq_counter,
            ArithmeticOp::Gt => &mut self.gt_counter,
            _ => &mut self.lt_counter,
        };
        *counter += 1;
        format!("CMP_{}.{}", op.mnemonic().to_uppercase(), counter)
    }

    /// Fresh return-address label for one call site. `$$` cannot come out of
    /// `scoped_label`, so these never meet a VM label.
    pub fn next_return_label(&mut self) -> String {
        self.return_counter += 1;
        format!("{}$$ret.{}", self.current_function, self.return_counter)
    }
}
