// Assembly Line Classifier
//
// Turns assembly text into typed statements. Whitespace is insignificant
// anywhere on a line, so `D = D + A ; JGT` and `D=D+A;JGT` parse the same.

use crate::asm::{Address, AsmInstruction, AsmLine, AsmStatement, ComputeInstruction};
use crate::error::ToolchainError;
use crate::isa::{Comp, Dest, Jump, MAX_ADDRESS};
use log::trace;

fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '$' | ':')
}

/// Symbols may not start with a digit, so `@12` is always a numeral
pub fn is_valid_symbol(name: &str) -> bool {
    match name.chars().next() {
        Some(first) if !first.is_ascii_digit() => name.chars().all(is_symbol_char),
        _ => false,
    }
}

fn parse_address(operand: &str, line: usize) -> Result<Address, ToolchainError> {
    if operand.is_empty() {
        return Err(ToolchainError::missing("address after '@'", Some(line)));
    }
    if operand.chars().all(|ch| ch.is_ascii_digit()) {
        return match operand.parse::<u32>() {
            Ok(value) if value <= MAX_ADDRESS as u32 => Ok(Address::Numeral(value as u16)),
            _ => Err(ToolchainError::unknown("address", operand, Some(line))),
        };
    }
    if is_valid_symbol(operand) {
        Ok(Address::Symbol(operand.to_string()))
    } else {
        Err(ToolchainError::SyntaxError(
            format!("invalid symbol '{}'", operand),
            line,
        ))
    }
}

fn parse_label(body: &str, line: usize) -> Result<String, ToolchainError> {
    let inner = body
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| {
            ToolchainError::SyntaxError(format!("unterminated label '{}'", body), line)
        })?;
    if !is_valid_symbol(inner) {
        return Err(ToolchainError::SyntaxError(
            format!("invalid label name '{}'", inner),
            line,
        ));
    }
    Ok(inner.to_string())
}

fn parse_compute(body: &str, line: usize) -> Result<ComputeInstruction, ToolchainError> {
    let (dest, rest) = match body.split_once('=') {
        Some((dest, rest)) => (Dest::parse(dest, Some(line))?, rest),
        None => (Dest::NONE, body),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, Jump::parse(jump, Some(line))?),
        None => (rest, Jump::Never),
    };
    if comp.is_empty() {
        return Err(ToolchainError::missing("computation", Some(line)));
    }
    Ok(ComputeInstruction {
        dest,
        comp: Comp::parse(comp, Some(line))?,
        jump,
    })
}

/// Parse one line. Blank and comment-only lines yield `None`; comments are
/// not carried into the statement stream.
pub fn parse_line(text: &str, line: usize) -> Result<Option<AsmLine>, ToolchainError> {
    let code = match text.find("//") {
        Some(index) => &text[..index],
        None => text,
    };
    let body: String = code.chars().filter(|ch| !ch.is_whitespace()).collect();
    if body.is_empty() {
        return Ok(None);
    }

    let item = if let Some(operand) = body.strip_prefix('@') {
        AsmLine::Instruction(AsmInstruction::Address(parse_address(operand, line)?))
    } else if body.starts_with('(') {
        AsmLine::Label(parse_label(&body, line)?)
    } else {
        AsmLine::Instruction(AsmInstruction::Compute(parse_compute(&body, line)?))
    };
    trace!("line {}: {}", line, item);
    Ok(Some(item))
}

pub fn parse_source(source: &str) -> Result<Vec<AsmStatement>, ToolchainError> {
    let mut statements = Vec::new();
    for (index, text) in source.lines().enumerate() {
        if let Some(item) = parse_line(text, index + 1)? {
            statements.push(AsmStatement {
                line: index + 1,
                item,
            });
        }
    }
    Ok(statements)
}
