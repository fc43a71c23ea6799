// Two-Pass Symbol Resolver
//
// Pass 1 binds every label to the ROM index of the next real instruction.
// Pass 2 rewrites symbolic address operands to numbers, allocating variables
// for names pass 1 never bound. An operand naming a label that is never
// defined is therefore allocated as a variable, not rejected.

use crate::asm::{Address, AsmInstruction, AsmLine, AsmStatement, ComputeInstruction};
use crate::assembler::symbol_table::SymbolTable;
use crate::error::ToolchainError;
use log::debug;
use std::fmt;

/// ROM holds 32K words
pub const ROM_SIZE: usize = 32768;

/// An instruction with every symbol replaced by its address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedInstruction {
    Address(u16),
    Compute(ComputeInstruction),
}

impl fmt::Display for ResolvedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolvedInstruction::Address(value) => write!(f, "@{}", value),
            ResolvedInstruction::Compute(compute) => write!(f, "{}", compute),
        }
    }
}

/// Pass 1: bind labels, returning the real-instruction count
pub fn discover_labels(
    statements: &[AsmStatement],
    table: &mut SymbolTable,
) -> Result<usize, ToolchainError> {
    let mut counter = 0usize;
    for statement in statements {
        match &statement.item {
            AsmLine::Label(name) => {
                if counter >= ROM_SIZE {
                    return Err(too_large(counter + 1));
                }
                table.define_label(name, counter as u16, statement.line)?;
            }
            AsmLine::Instruction(_) => counter += 1,
            AsmLine::Comment(_) => {}
        }
    }
    if counter > ROM_SIZE {
        return Err(too_large(counter));
    }
    debug!("pass 1: {} instructions", counter);
    Ok(counter)
}

fn too_large(count: usize) -> ToolchainError {
    ToolchainError::ResourceExhaustion(format!(
        "program needs at least {} instruction words, ROM holds {}",
        count, ROM_SIZE
    ))
}

/// Pass 2: resolve operands in program order
pub fn resolve_operands(
    statements: &[AsmStatement],
    table: &mut SymbolTable,
) -> Result<Vec<ResolvedInstruction>, ToolchainError> {
    let mut resolved = Vec::with_capacity(statements.len());
    for statement in statements {
        let instruction = match &statement.item {
            AsmLine::Instruction(instruction) => instruction,
            _ => continue,
        };
        resolved.push(match instruction {
            AsmInstruction::Address(Address::Numeral(value)) => {
                ResolvedInstruction::Address(*value)
            }
            AsmInstruction::Address(Address::Symbol(name)) => {
                ResolvedInstruction::Address(table.resolve_or_allocate(name)?)
            }
            AsmInstruction::Compute(compute) => ResolvedInstruction::Compute(*compute),
        });
    }
    debug!("pass 2: {} symbols bound", table.user_symbol_count());
    Ok(resolved)
}

/// Run both passes over a fresh table
pub fn resolve(
    statements: &[AsmStatement],
) -> Result<(Vec<ResolvedInstruction>, SymbolTable), ToolchainError> {
    let mut table = SymbolTable::new();
    let count = discover_labels(statements, &mut table)?;
    let resolved = resolve_operands(statements, &mut table)?;
    debug_assert_eq!(count, resolved.len());
    Ok((resolved, table))
}
