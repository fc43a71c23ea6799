// Target Instruction Set Vocabulary
//
// The closed tables for the three fields of a compute instruction. Mnemonics
// are looked up once at the boundary; past this module everything is typed.

use crate::error::ToolchainError;
use std::collections::HashMap;
use std::fmt;

/// Largest value an address instruction can carry (15 bits)
pub const MAX_ADDRESS: u16 = 0x7FFF;

/// The 28 computation forms the ALU understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comp {
    Zero,
    One,
    NegOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

/// (form, mnemonic, 7-bit code: memory-select bit followed by c1..c6)
static COMP_TABLE: [(Comp, &str, u16); 28] = [
    (Comp::Zero, "0", 0b0101010),
    (Comp::One, "1", 0b0111111),
    (Comp::NegOne, "-1", 0b0111010),
    (Comp::D, "D", 0b0001100),
    (Comp::A, "A", 0b0110000),
    (Comp::M, "M", 0b1110000),
    (Comp::NotD, "!D", 0b0001101),
    (Comp::NotA, "!A", 0b0110001),
    (Comp::NotM, "!M", 0b1110001),
    (Comp::NegD, "-D", 0b0001111),
    (Comp::NegA, "-A", 0b0110011),
    (Comp::NegM, "-M", 0b1110011),
    (Comp::DPlusOne, "D+1", 0b0011111),
    (Comp::APlusOne, "A+1", 0b0110111),
    (Comp::MPlusOne, "M+1", 0b1110111),
    (Comp::DMinusOne, "D-1", 0b0001110),
    (Comp::AMinusOne, "A-1", 0b0110010),
    (Comp::MMinusOne, "M-1", 0b1110010),
    (Comp::DPlusA, "D+A", 0b0000010),
    (Comp::DPlusM, "D+M", 0b1000010),
    (Comp::DMinusA, "D-A", 0b0010011),
    (Comp::DMinusM, "D-M", 0b1010011),
    (Comp::AMinusD, "A-D", 0b0000111),
    (Comp::MMinusD, "M-D", 0b1000111),
    (Comp::DAndA, "D&A", 0b0000000),
    (Comp::DAndM, "D&M", 0b1000000),
    (Comp::DOrA, "D|A", 0b0010101),
    (Comp::DOrM, "D|M", 0b1010101),
];

lazy_static! {
    static ref COMP_BY_MNEMONIC: HashMap<&'static str, Comp> =
        COMP_TABLE.iter().map(|&(comp, name, _)| (name, comp)).collect();
    static ref COMP_BY_CODE: HashMap<u16, Comp> =
        COMP_TABLE.iter().map(|&(comp, _, code)| (code, comp)).collect();
}

impl Comp {
    pub fn from_mnemonic(token: &str) -> Option<Comp> {
        COMP_BY_MNEMONIC.get(token).copied()
    }

    /// Inverse of `code()`; `None` for bit patterns outside the table
    pub fn from_code(code: u16) -> Option<Comp> {
        COMP_BY_CODE.get(&code).copied()
    }

    pub fn parse(token: &str, line: Option<usize>) -> Result<Comp, ToolchainError> {
        Comp::from_mnemonic(token).ok_or_else(|| ToolchainError::unknown("comp", token, line))
    }

    fn entry(self) -> &'static (Comp, &'static str, u16) {
        // Table order matches declaration order
        &COMP_TABLE[self as usize]
    }

    pub fn mnemonic(self) -> &'static str {
        self.entry().1
    }

    /// 7-bit field: bit 6 selects M instead of A as the ALU's second input
    pub fn code(self) -> u16 {
        self.entry().2
    }

    pub fn reads_memory(self) -> bool {
        self.code() & 0b1000000 != 0
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Destination set: an independent bitmask over A, D and M
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dest(u8);

impl Dest {
    pub const NONE: Dest = Dest(0b000);
    pub const M: Dest = Dest(0b001);
    pub const D: Dest = Dest(0b010);
    pub const MD: Dest = Dest(0b011);
    pub const A: Dest = Dest(0b100);
    pub const AM: Dest = Dest(0b101);
    pub const AD: Dest = Dest(0b110);
    pub const AMD: Dest = Dest(0b111);

    pub fn from_bits(bits: u16) -> Dest {
        Dest((bits & 0b111) as u8)
    }

    pub fn bits(self) -> u16 {
        self.0 as u16
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn writes_a(self) -> bool {
        self.0 & Dest::A.0 != 0
    }

    pub fn writes_d(self) -> bool {
        self.0 & Dest::D.0 != 0
    }

    pub fn writes_m(self) -> bool {
        self.0 & Dest::M.0 != 0
    }

    /// Accepts any ordering of A, D and M, each at most once
    pub fn parse(token: &str, line: Option<usize>) -> Result<Dest, ToolchainError> {
        if token.is_empty() {
            return Err(ToolchainError::missing("destination before '='", line));
        }
        let mut mask = 0u8;
        for ch in token.chars() {
            let bit = match ch {
                'A' => Dest::A.0,
                'D' => Dest::D.0,
                'M' => Dest::M.0,
                _ => return Err(ToolchainError::unknown("dest", token, line)),
            };
            if mask & bit != 0 {
                return Err(ToolchainError::unknown("dest", token, line));
            }
            mask |= bit;
        }
        Ok(Dest(mask))
    }
}

impl std::ops::BitOr for Dest {
    type Output = Dest;

    fn bitor(self, rhs: Dest) -> Dest {
        Dest(self.0 | rhs.0)
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.writes_a() {
            write!(f, "A")?;
        }
        if self.writes_m() {
            write!(f, "M")?;
        }
        if self.writes_d() {
            write!(f, "D")?;
        }
        Ok(())
    }
}

/// Branch condition, tested against the computed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Jump {
    #[default]
    Never,
    Jgt,
    Jeq,
    Jge,
    Jlt,
    Jne,
    Jle,
    Jmp,
}

impl Jump {
    const ALL: [Jump; 8] = [
        Jump::Never,
        Jump::Jgt,
        Jump::Jeq,
        Jump::Jge,
        Jump::Jlt,
        Jump::Jne,
        Jump::Jle,
        Jump::Jmp,
    ];

    pub fn parse(token: &str, line: Option<usize>) -> Result<Jump, ToolchainError> {
        match token {
            "JGT" => Ok(Jump::Jgt),
            "JEQ" => Ok(Jump::Jeq),
            "JGE" => Ok(Jump::Jge),
            "JLT" => Ok(Jump::Jlt),
            "JNE" => Ok(Jump::Jne),
            "JLE" => Ok(Jump::Jle),
            "JMP" => Ok(Jump::Jmp),
            "" => Err(ToolchainError::missing("jump after ';'", line)),
            _ => Err(ToolchainError::unknown("jump", token, line)),
        }
    }

    pub fn from_bits(bits: u16) -> Jump {
        Jump::ALL[(bits & 0b111) as usize]
    }

    pub fn bits(self) -> u16 {
        self as u16
    }

    pub fn mnemonic(self) -> Option<&'static str> {
        match self {
            Jump::Never => None,
            Jump::Jgt => Some("JGT"),
            Jump::Jeq => Some("JEQ"),
            Jump::Jge => Some("JGE"),
            Jump::Jlt => Some("JLT"),
            Jump::Jne => Some("JNE"),
            Jump::Jle => Some("JLE"),
            Jump::Jmp => Some("JMP"),
        }
    }

    /// Whether the branch is taken for a given ALU output
    pub fn taken(self, value: i16) -> bool {
        match self {
            Jump::Never => false,
            Jump::Jgt => value > 0,
            Jump::Jeq => value == 0,
            Jump::Jge => value >= 0,
            Jump::Jlt => value < 0,
            Jump::Jne => value != 0,
            Jump::Jle => value <= 0,
            Jump::Jmp => true,
        }
    }
}
