/// encoder.rs - 16-bit instruction words
///
/// ```text
///   address:  0vvv vvvv vvvv vvvv
///   compute:  111a cccc ccdd djjj
/// ```
///
/// `a` selects M over A as the ALU's second input and travels with the
/// comp code, `ddd` is the A/D/M destination mask and `jjj` the jump
/// condition. Output text is one 16-digit binary string per word.
///
use crate::asm::ComputeInstruction;
use crate::assembler::resolver::ResolvedInstruction;
use crate::error::ToolchainError;
use crate::isa::{Comp, Dest, Jump, MAX_ADDRESS};

const COMPUTE_HEADER: u16 = 0b111 << 13;
const COMP_SHIFT: u16 = 6;
const DEST_SHIFT: u16 = 3;

pub fn encode(instruction: &ResolvedInstruction) -> Result<u16, ToolchainError> {
    match instruction {
        ResolvedInstruction::Address(value) => {
            if *value > MAX_ADDRESS {
                return Err(ToolchainError::unknown(
                    "address",
                    &value.to_string(),
                    None,
                ));
            }
            Ok(*value)
        }
        ResolvedInstruction::Compute(compute) => Ok(COMPUTE_HEADER
            | compute.comp.code() << COMP_SHIFT
            | compute.dest.bits() << DEST_SHIFT
            | compute.jump.bits()),
    }
}

pub fn encode_program(program: &[ResolvedInstruction]) -> Result<Vec<u16>, ToolchainError> {
    program.iter().map(encode).collect()
}

/// Inverse of `encode`. Compute words whose header bits are not all set, or
/// whose comp field is outside the table, are rejected.
pub fn decode(word: u16) -> Result<ResolvedInstruction, ToolchainError> {
    if word & 0x8000 == 0 {
        return Ok(ResolvedInstruction::Address(word));
    }
    if word & COMPUTE_HEADER != COMPUTE_HEADER {
        return Err(ToolchainError::unknown(
            "instruction word",
            &format!("{:016b}", word),
            None,
        ));
    }
    let code = (word >> COMP_SHIFT) & 0b111_1111;
    let comp = Comp::from_code(code)
        .ok_or_else(|| ToolchainError::unknown("comp", &format!("{:07b}", code), None))?;
    Ok(ResolvedInstruction::Compute(ComputeInstruction {
        dest: Dest::from_bits(word >> DEST_SHIFT),
        comp,
        jump: Jump::from_bits(word),
    }))
}

/// One `{:016b}` line per word, each newline-terminated
pub fn render_binary(words: &[u16]) -> String {
    let mut out = String::with_capacity(words.len() * 17);
    for word in words {
        out.push_str(&format!("{:016b}\n", word));
    }
    out
}

/// Read binary text back into words; blank lines are skipped
pub fn parse_words(text: &str) -> Result<Vec<u16>, ToolchainError> {
    let mut words = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let digits = raw.trim();
        if digits.is_empty() {
            continue;
        }
        if digits.len() != 16 || !digits.chars().all(|ch| ch == '0' || ch == '1') {
            return Err(ToolchainError::SyntaxError(
                format!("'{}' is not a 16-digit binary word", digits),
                index + 1,
            ));
        }
        let word = u16::from_str_radix(digits, 2).map_err(|e| {
            ToolchainError::SyntaxError(format!("'{}': {}", digits, e), index + 1)
        })?;
        words.push(word);
    }
    Ok(words)
}
