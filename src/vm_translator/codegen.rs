// VM Code Generator
//
// Lowers VM instructions to target assembly under a fixed runtime layout:
// SP holds the next free stack slot, LCL/ARG/THIS/THAT are segment bases,
// temp lives at RAM[5..=12], statics are per-unit assembler variables.

use crate::asm::AsmLine;
use crate::config::TranslatorConfig;
use crate::error::ToolchainError;
use crate::isa::{Comp, Dest, Jump, MAX_ADDRESS};
use crate::vm_translator::command::{ArithmeticOp, Category, Segment, VmInstruction};
use crate::vm_translator::context::TranslationContext;
use log::{debug, trace};

/// First RAM word of the temp segment
pub const TEMP_BASE: u16 = 5;
/// Number of temp slots
pub const TEMP_SIZE: u16 = 8;
/// Scratch register holding a computed pop destination
pub(crate) const SCRATCH_REGISTER: &str = "R13";

/// Code generation state for one whole-program build
pub struct VmCodeGen<'a> {
    pub(crate) ctx: &'a mut TranslationContext,
    pub(crate) config: &'a TranslatorConfig,
    pub(crate) lines: Vec<AsmLine>,
}

impl<'a> VmCodeGen<'a> {
    pub fn new(ctx: &'a mut TranslationContext, config: &'a TranslatorConfig) -> Self {
        VmCodeGen {
            ctx,
            config,
            lines: Vec::new(),
        }
    }

    /// Output emitted so far
    pub fn lines(&self) -> &[AsmLine] {
        &self.lines
    }

    /// Hand the finished stream to the caller
    pub fn finish(self) -> Vec<AsmLine> {
        self.lines
    }

    /// Translate one source unit, appending to the shared output stream
    pub fn translate_unit(
        &mut self,
        unit_name: &str,
        instructions: &[VmInstruction],
    ) -> Result<(), ToolchainError> {
        self.ctx.begin_unit(unit_name)?;
        let start = self.lines.len();

        for instruction in instructions {
            self.translate_instruction(instruction)?;
        }

        debug!(
            "Unit '{}': {} VM instructions -> {} assembly lines",
            unit_name,
            instructions.len(),
            self.lines.len() - start
        );
        Ok(())
    }

    pub fn translate_instruction(
        &mut self,
        instruction: &VmInstruction,
    ) -> Result<(), ToolchainError> {
        trace!("translate line {}: {}", instruction.line, instruction);
        self.emit_comment(&instruction.to_string());

        match instruction.category {
            Category::Arithmetic => {
                let word = instruction.arg1("arithmetic operation")?;
                let op = ArithmeticOp::from_mnemonic(word).ok_or_else(|| {
                    ToolchainError::unknown("arithmetic operation", word, Some(instruction.line))
                })?;
                self.write_arithmetic(op);
                Ok(())
            }
            Category::Push => {
                let segment = Segment::parse(instruction.arg1("segment")?, instruction.line)?;
                let index = instruction.numeric_arg2("index")?;
                self.write_push(segment, index, instruction.line)
            }
            Category::Pop => {
                let segment = Segment::parse(instruction.arg1("segment")?, instruction.line)?;
                let index = instruction.numeric_arg2("index")?;
                self.write_pop(segment, index, instruction.line)
            }
            Category::Label => {
                let label = self
                    .ctx
                    .scoped_label(instruction.arg1("label name")?, instruction.line)?;
                self.emit_label(&label);
                Ok(())
            }
            Category::Goto => {
                let label = self
                    .ctx
                    .scoped_label(instruction.arg1("label name")?, instruction.line)?;
                self.jump_to(&label);
                Ok(())
            }
            Category::IfGoto => {
                let label = self
                    .ctx
                    .scoped_label(instruction.arg1("label name")?, instruction.line)?;
                self.pop_d();
                self.emit_symbol(&label);
                self.emit_branch(Comp::D, Jump::Jne);
                Ok(())
            }
            Category::FunctionDef => {
                let name = instruction.arg1("function name")?;
                let locals = instruction.numeric_arg2("local count")?;
                self.write_function(name, locals);
                Ok(())
            }
            Category::Call => {
                let name = instruction.arg1("function name")?;
                let args = instruction.numeric_arg2("argument count")?;
                self.write_call(name, args)
            }
            Category::Return => {
                self.write_return();
                Ok(())
            }
        }
    }

    fn write_arithmetic(&mut self, op: ArithmeticOp) {
        match op {
            ArithmeticOp::Add => self.binary(Comp::DPlusM),
            ArithmeticOp::Sub => self.binary(Comp::MMinusD),
            ArithmeticOp::And => self.binary(Comp::DAndM),
            ArithmeticOp::Or => self.binary(Comp::DOrM),
            ArithmeticOp::Neg => self.unary(Comp::NegM),
            ArithmeticOp::Not => self.unary(Comp::NotM),
            ArithmeticOp::Eq => self.comparison(op, Jump::Jeq),
            ArithmeticOp::Gt => self.comparison(op, Jump::Jgt),
            ArithmeticOp::Lt => self.comparison(op, Jump::Jlt),
        }
    }

    /// Pop y into D, then combine into x in place: x = x op y
    fn binary(&mut self, comp: Comp) {
        self.pop_d();
        self.address_top();
        self.emit_assign(Dest::M, comp);
    }

    fn unary(&mut self, comp: Comp) {
        self.address_top();
        self.emit_assign(Dest::M, comp);
    }

    /// x = (x <op> y) ? -1 : 0
    fn comparison(&mut self, op: ArithmeticOp, jump: Jump) {
        let stem = self.ctx.next_comparison_stem(op);
        let if_true = format!("{}.TRUE", stem);
        let end = format!("{}.END", stem);

        if op == ArithmeticOp::Eq {
            // x - y wraps to zero only when x == y
            self.pop_d();
            self.address_top();
            self.emit_assign(Dest::D, Comp::MMinusD);
        } else {
            self.ordered_difference(&stem);
        }

        self.emit_symbol(&if_true);
        self.emit_branch(Comp::D, jump);
        self.address_top();
        self.emit_assign(Dest::M, Comp::Zero);
        self.jump_to(&end);
        self.emit_label(&if_true);
        self.address_top();
        self.emit_assign(Dest::M, Comp::NegOne);
        self.emit_label(&end);
    }

    /// Pop y and leave in D a value with the sign of x - y. When x and y
    /// differ in sign the subtraction can overflow, so D is set to 1 or -1
    /// from the signs alone.
    fn ordered_difference(&mut self, stem: &str) {
        let x_negative = format!("{}.XNEG", stem);
        let same_sign = format!("{}.SAME", stem);
        let greater = format!("{}.GREATER", stem);
        let less = format!("{}.LESS", stem);
        let test = format!("{}.TEST", stem);

        self.pop_d();
        self.emit_symbol(SCRATCH_REGISTER);
        self.emit_assign(Dest::M, Comp::D);
        self.address_top();
        self.emit_assign(Dest::D, Comp::M);
        self.emit_symbol(&x_negative);
        self.emit_branch(Comp::D, Jump::Jlt);

        // x >= 0
        self.emit_symbol(SCRATCH_REGISTER);
        self.emit_assign(Dest::D, Comp::M);
        self.emit_symbol(&greater);
        self.emit_branch(Comp::D, Jump::Jlt);
        self.jump_to(&same_sign);

        // x < 0
        self.emit_label(&x_negative);
        self.emit_symbol(SCRATCH_REGISTER);
        self.emit_assign(Dest::D, Comp::M);
        self.emit_symbol(&less);
        self.emit_branch(Comp::D, Jump::Jge);

        self.emit_label(&same_sign);
        self.emit_symbol(SCRATCH_REGISTER);
        self.emit_assign(Dest::D, Comp::M);
        self.address_top();
        self.emit_assign(Dest::D, Comp::MMinusD);
        self.jump_to(&test);

        self.emit_label(&greater);
        self.emit_assign(Dest::D, Comp::One);
        self.jump_to(&test);

        self.emit_label(&less);
        self.emit_assign(Dest::D, Comp::NegOne);
        self.emit_label(&test);
    }

    fn pointer_register(index: u16, line: usize) -> Result<&'static str, ToolchainError> {
        match index {
            0 => Ok("THIS"),
            1 => Ok("THAT"),
            _ => Err(ToolchainError::unknown(
                "pointer index",
                &index.to_string(),
                Some(line),
            )),
        }
    }

    fn temp_address(index: u16, line: usize) -> Result<u16, ToolchainError> {
        if index >= TEMP_SIZE {
            return Err(ToolchainError::unknown(
                "temp index",
                &index.to_string(),
                Some(line),
            ));
        }
        Ok(TEMP_BASE + index)
    }

    fn check_offset(index: u16, line: usize) -> Result<(), ToolchainError> {
        if index > MAX_ADDRESS {
            return Err(ToolchainError::unknown(
                "segment index",
                &index.to_string(),
                Some(line),
            ));
        }
        Ok(())
    }

    /// D = *(base + index)
    fn load_from_base(&mut self, base: &str, index: u16, line: usize) -> Result<(), ToolchainError> {
        Self::check_offset(index, line)?;
        self.emit_numeral(index);
        self.emit_assign(Dest::D, Comp::A);
        self.emit_symbol(base);
        self.emit_assign(Dest::A, Comp::DPlusM);
        self.emit_assign(Dest::D, Comp::M);
        Ok(())
    }

    /// *(base + index) = pop(), staging the address in R13
    fn store_to_base(&mut self, base: &str, index: u16, line: usize) -> Result<(), ToolchainError> {
        Self::check_offset(index, line)?;
        self.emit_numeral(index);
        self.emit_assign(Dest::D, Comp::A);
        self.emit_symbol(base);
        self.emit_assign(Dest::D, Comp::DPlusM);
        self.emit_symbol(SCRATCH_REGISTER);
        self.emit_assign(Dest::M, Comp::D);
        self.pop_d();
        self.emit_symbol(SCRATCH_REGISTER);
        self.emit_assign(Dest::A, Comp::M);
        self.emit_assign(Dest::M, Comp::D);
        Ok(())
    }

    fn write_push(
        &mut self,
        segment: Segment,
        index: u16,
        line: usize,
    ) -> Result<(), ToolchainError> {
        match segment {
            Segment::Constant => {
                if index > MAX_ADDRESS {
                    return Err(ToolchainError::unknown(
                        "constant",
                        &index.to_string(),
                        Some(line),
                    ));
                }
                self.emit_numeral(index);
                self.emit_assign(Dest::D, Comp::A);
            }
            Segment::Local => self.load_from_base("LCL", index, line)?,
            Segment::Argument => self.load_from_base("ARG", index, line)?,
            Segment::This => self.load_from_base("THIS", index, line)?,
            Segment::That => self.load_from_base("THAT", index, line)?,
            Segment::Temp => {
                let address = Self::temp_address(index, line)?;
                self.emit_numeral(address);
                self.emit_assign(Dest::D, Comp::M);
            }
            Segment::Pointer => {
                let register = Self::pointer_register(index, line)?;
                self.emit_symbol(register);
                self.emit_assign(Dest::D, Comp::M);
            }
            Segment::Static => {
                let symbol = self.ctx.static_symbol(index)?;
                self.emit_symbol(&symbol);
                self.emit_assign(Dest::D, Comp::M);
            }
        }
        self.push_d();
        Ok(())
    }

    fn write_pop(
        &mut self,
        segment: Segment,
        index: u16,
        line: usize,
    ) -> Result<(), ToolchainError> {
        match segment {
            Segment::Constant => Err(ToolchainError::unknown(
                "pop segment",
                "constant",
                Some(line),
            )),
            Segment::Local => self.store_to_base("LCL", index, line),
            Segment::Argument => self.store_to_base("ARG", index, line),
            Segment::This => self.store_to_base("THIS", index, line),
            Segment::That => self.store_to_base("THAT", index, line),
            Segment::Temp => {
                let address = Self::temp_address(index, line)?;
                self.pop_d();
                self.emit_numeral(address);
                self.emit_assign(Dest::M, Comp::D);
                Ok(())
            }
            Segment::Pointer => {
                let register = Self::pointer_register(index, line)?;
                self.pop_d();
                self.emit_symbol(register);
                self.emit_assign(Dest::M, Comp::D);
                Ok(())
            }
            Segment::Static => {
                let symbol = self.ctx.static_symbol(index)?;
                self.pop_d();
                self.emit_symbol(&symbol);
                self.emit_assign(Dest::M, Comp::D);
                Ok(())
            }
        }
    }
}
