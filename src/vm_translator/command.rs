// VM Instruction Vocabulary
//
// `VmInstruction` is the classified record the line parser hands to the code
// generator. Operands stay as text until the generator validates them, so
// that a missing or malformed operand is reported where it is consumed.

use crate::error::ToolchainError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    IfGoto,
    FunctionDef,
    Call,
    Return,
}

impl Category {
    pub fn keyword(self) -> &'static str {
        match self {
            Category::Arithmetic => "arithmetic",
            Category::Push => "push",
            Category::Pop => "pop",
            Category::Label => "label",
            Category::Goto => "goto",
            Category::IfGoto => "if-goto",
            Category::FunctionDef => "function",
            Category::Call => "call",
            Category::Return => "return",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmInstruction {
    pub category: Category,
    pub arg1: Option<String>,
    pub arg2: Option<String>,
    pub line: usize,
}

impl VmInstruction {
    pub fn new(category: Category, arg1: Option<&str>, arg2: Option<&str>, line: usize) -> Self {
        VmInstruction {
            category,
            arg1: arg1.map(str::to_string),
            arg2: arg2.map(str::to_string),
            line,
        }
    }

    pub fn arg1(&self, what: &str) -> Result<&str, ToolchainError> {
        self.arg1
            .as_deref()
            .ok_or_else(|| ToolchainError::missing(what, Some(self.line)))
    }

    pub fn arg2(&self, what: &str) -> Result<&str, ToolchainError> {
        self.arg2
            .as_deref()
            .ok_or_else(|| ToolchainError::missing(what, Some(self.line)))
    }

    /// Second operand as a non-negative count or index
    pub fn numeric_arg2(&self, what: &str) -> Result<u16, ToolchainError> {
        let text = self.arg2(what)?;
        text.parse::<u16>()
            .map_err(|_| ToolchainError::unknown(what, text, Some(self.line)))
    }
}

impl fmt::Display for VmInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.category {
            Category::Arithmetic => write!(f, "{}", self.arg1.as_deref().unwrap_or("?"))?,
            other => write!(f, "{}", other.keyword())?,
        }
        if self.category != Category::Arithmetic {
            if let Some(arg) = &self.arg1 {
                write!(f, " {}", arg)?;
            }
        }
        if let Some(arg) = &self.arg2 {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub fn from_mnemonic(word: &str) -> Option<ArithmeticOp> {
        match word {
            "add" => Some(ArithmeticOp::Add),
            "sub" => Some(ArithmeticOp::Sub),
            "neg" => Some(ArithmeticOp::Neg),
            "eq" => Some(ArithmeticOp::Eq),
            "gt" => Some(ArithmeticOp::Gt),
            "lt" => Some(ArithmeticOp::Lt),
            "and" => Some(ArithmeticOp::And),
            "or" => Some(ArithmeticOp::Or),
            "not" => Some(ArithmeticOp::Not),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }
}

/// Memory segments addressable by push/pop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl Segment {
    pub fn parse(name: &str, line: usize) -> Result<Segment, ToolchainError> {
        match name {
            "local" => Ok(Segment::Local),
            "argument" => Ok(Segment::Argument),
            "this" => Ok(Segment::This),
            "that" => Ok(Segment::That),
            "temp" => Ok(Segment::Temp),
            "pointer" => Ok(Segment::Pointer),
            "static" => Ok(Segment::Static),
            "constant" => Ok(Segment::Constant),
            _ => Err(ToolchainError::unknown("segment", name, Some(line))),
        }
    }
}
