// VM Line Classifier
// Turns VM source text into classified instruction records, one per line.

use crate::error::ToolchainError;
use crate::vm_translator::command::{ArithmeticOp, Category, VmInstruction};
use log::trace;

/// Strip a trailing `//` comment and surrounding whitespace
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(index) => line[..index].trim(),
        None => line.trim(),
    }
}

fn classify(word: &str) -> Option<Category> {
    match word {
        "push" => Some(Category::Push),
        "pop" => Some(Category::Pop),
        "label" => Some(Category::Label),
        "goto" => Some(Category::Goto),
        "if-goto" => Some(Category::IfGoto),
        "function" => Some(Category::FunctionDef),
        "call" => Some(Category::Call),
        "return" => Some(Category::Return),
        _ if ArithmeticOp::from_mnemonic(word).is_some() => Some(Category::Arithmetic),
        _ => None,
    }
}

/// Parse one line. Blank and comment-only lines yield `None`.
pub fn parse_line(text: &str, line: usize) -> Result<Option<VmInstruction>, ToolchainError> {
    let body = strip_comment(text);
    if body.is_empty() {
        return Ok(None);
    }

    let words: Vec<&str> = body.split_whitespace().collect();
    if words.len() > 3 {
        return Err(ToolchainError::SyntaxError(
            format!("too many words in '{}'", body),
            line,
        ));
    }

    let category = classify(words[0]).ok_or_else(|| {
        ToolchainError::SyntaxError(format!("unknown command '{}'", words[0]), line)
    })?;

    let instruction = match category {
        // The mnemonic itself is the operand for arithmetic
        Category::Arithmetic => {
            if words.len() > 1 {
                return Err(ToolchainError::SyntaxError(
                    format!("'{}' takes no operands", words[0]),
                    line,
                ));
            }
            VmInstruction::new(category, Some(words[0]), None, line)
        }
        _ => VmInstruction::new(category, words.get(1).copied(), words.get(2).copied(), line),
    };

    trace!("line {}: {:?}", line, instruction);
    Ok(Some(instruction))
}

/// Parse a whole source unit
pub fn parse_source(source: &str) -> Result<Vec<VmInstruction>, ToolchainError> {
    let mut instructions = Vec::new();
    for (index, text) in source.lines().enumerate() {
        if let Some(instruction) = parse_line(text, index + 1)? {
            instructions.push(instruction);
        }
    }
    Ok(instructions)
}
