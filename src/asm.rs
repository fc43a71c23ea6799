// Typed Assembly Stream
//
// Shared by both stages: the translator appends `AsmLine`s and renders them to
// text, the assembler parses text back into `AsmStatement`s.

use crate::isa::{Comp, Dest, Jump};
use std::fmt;

/// Operand of an address instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Numeral(u16),
    Symbol(String),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Address::Numeral(value) => write!(f, "{}", value),
            Address::Symbol(name) => write!(f, "{}", name),
        }
    }
}

/// `dest=comp;jump` with dest and jump both optional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComputeInstruction {
    pub dest: Dest,
    pub comp: Comp,
    pub jump: Jump,
}

impl ComputeInstruction {
    pub fn assign(dest: Dest, comp: Comp) -> Self {
        ComputeInstruction {
            dest,
            comp,
            jump: Jump::Never,
        }
    }

    pub fn branch(comp: Comp, jump: Jump) -> Self {
        ComputeInstruction {
            dest: Dest::NONE,
            comp,
            jump,
        }
    }
}

impl fmt::Display for ComputeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.dest.is_empty() {
            write!(f, "{}=", self.dest)?;
        }
        write!(f, "{}", self.comp)?;
        if let Some(jump) = self.jump.mnemonic() {
            write!(f, ";{}", jump)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmInstruction {
    Address(Address),
    Compute(ComputeInstruction),
}

impl fmt::Display for AsmInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AsmInstruction::Address(address) => write!(f, "@{}", address),
            AsmInstruction::Compute(compute) => write!(f, "{}", compute),
        }
    }
}

/// One line of assembly output. Only `Instruction` occupies a ROM slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    Instruction(AsmInstruction),
    Label(String),
    Comment(String),
}

impl AsmLine {
    pub fn is_instruction(&self) -> bool {
        matches!(self, AsmLine::Instruction(_))
    }
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AsmLine::Instruction(instruction) => write!(f, "{}", instruction),
            AsmLine::Label(name) => write!(f, "({})", name),
            AsmLine::Comment(text) => write!(f, "// {}", text),
        }
    }
}

/// A parsed line tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmStatement {
    pub line: usize,
    pub item: AsmLine,
}

/// Number statements in emission order, for assembling generator output
/// without a round trip through text.
pub fn number_lines(lines: &[AsmLine]) -> Vec<AsmStatement> {
    lines
        .iter()
        .enumerate()
        .map(|(index, item)| AsmStatement {
            line: index + 1,
            item: item.clone(),
        })
        .collect()
}

/// Render one line per entry, each newline-terminated
pub fn render_program(lines: &[AsmLine]) -> String {
    let mut out = String::with_capacity(lines.len() * 8);
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}
