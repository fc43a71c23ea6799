// Toolchain Error Handling
//
// Every fatal condition in the translator and the assembler is one of these.
// Errors abort the whole build; nothing is recovered locally.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ToolchainError {
    // Malformed source
    SyntaxError(String, usize),                // message, line
    DuplicateLabel(String, u16, u16, usize),   // name, previous address, new address, line

    // Vocabulary errors
    UnknownOperand(String, String, Option<usize>), // field, token, line
    MissingOperand(String, Option<usize>),         // what was expected, line

    // Capacity
    ResourceExhaustion(String),

    // Build-level errors
    UnitNameCollision(String),
    IOError(String),
    ConfigError(String),
}

impl ToolchainError {
    /// Process exit status for this error class. Distinct per class so that
    /// scripts driving a build can tell failures apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolchainError::SyntaxError(..) | ToolchainError::DuplicateLabel(..) => 2,
            ToolchainError::UnknownOperand(..) => 3,
            ToolchainError::MissingOperand(..) => 4,
            ToolchainError::ResourceExhaustion(_) => 5,
            ToolchainError::UnitNameCollision(_) => 6,
            ToolchainError::IOError(_) => 7,
            ToolchainError::ConfigError(_) => 8,
        }
    }

    /// Source line the error originated from, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            ToolchainError::SyntaxError(_, line) => Some(*line),
            ToolchainError::DuplicateLabel(_, _, _, line) => Some(*line),
            ToolchainError::UnknownOperand(_, _, line) => *line,
            ToolchainError::MissingOperand(_, line) => *line,
            _ => None,
        }
    }

    pub(crate) fn unknown(field: &str, token: &str, line: Option<usize>) -> Self {
        ToolchainError::UnknownOperand(field.to_string(), token.to_string(), line)
    }

    pub(crate) fn missing(what: &str, line: Option<usize>) -> Self {
        ToolchainError::MissingOperand(what.to_string(), line)
    }
}

fn write_line(f: &mut fmt::Formatter, line: &Option<usize>) -> fmt::Result {
    match line {
        Some(line) => write!(f, " at line {}", line),
        None => Ok(()),
    }
}

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ToolchainError::SyntaxError(msg, line) => {
                write!(f, "Syntax error at line {}: {}", line, msg)
            }
            ToolchainError::DuplicateLabel(name, previous, address, line) => {
                write!(
                    f,
                    "Duplicate label '{}' at line {}: already bound to {}, redefined at {}",
                    name, line, previous, address
                )
            }
            ToolchainError::UnknownOperand(field, token, line) => {
                write!(f, "Unknown {} '{}'", field, token)?;
                write_line(f, line)
            }
            ToolchainError::MissingOperand(what, line) => {
                write!(f, "Missing {}", what)?;
                write_line(f, line)
            }
            ToolchainError::ResourceExhaustion(msg) => {
                write!(f, "Resource exhausted: {}", msg)
            }
            ToolchainError::UnitNameCollision(unit) => {
                write!(
                    f,
                    "Source unit '{}' appears more than once in this build; its statics would collide",
                    unit
                )
            }
            ToolchainError::IOError(msg) => {
                write!(f, "IO error: {}", msg)
            }
            ToolchainError::ConfigError(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ToolchainError {}
