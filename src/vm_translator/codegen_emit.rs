/// codegen_emit.rs
/// Emission primitives for VmCodeGen
///
use crate::asm::{Address, AsmInstruction, AsmLine, ComputeInstruction};
use crate::isa::{Comp, Dest, Jump};
use crate::vm_translator::codegen::VmCodeGen;

impl<'a> VmCodeGen<'a> {
    // Utility methods for code emission

    /// `@symbol`
    pub(crate) fn emit_symbol(&mut self, name: &str) {
        self.lines
            .push(AsmLine::Instruction(AsmInstruction::Address(Address::Symbol(
                name.to_string(),
            ))));
    }

    /// `@value`
    pub(crate) fn emit_numeral(&mut self, value: u16) {
        self.lines
            .push(AsmLine::Instruction(AsmInstruction::Address(Address::Numeral(
                value,
            ))));
    }

    /// `dest=comp`
    pub(crate) fn emit_assign(&mut self, dest: Dest, comp: Comp) {
        self.lines.push(AsmLine::Instruction(AsmInstruction::Compute(
            ComputeInstruction::assign(dest, comp),
        )));
    }

    /// `comp;jump`
    pub(crate) fn emit_branch(&mut self, comp: Comp, jump: Jump) {
        self.lines.push(AsmLine::Instruction(AsmInstruction::Compute(
            ComputeInstruction::branch(comp, jump),
        )));
    }

    pub(crate) fn emit_label(&mut self, name: &str) {
        self.lines.push(AsmLine::Label(name.to_string()));
    }

    pub(crate) fn emit_comment(&mut self, text: &str) {
        if self.config.emit_comments {
            self.lines.push(AsmLine::Comment(text.to_string()));
        }
    }

    /// *SP = D; SP++
    pub(crate) fn push_d(&mut self) {
        self.emit_symbol("SP");
        self.emit_assign(Dest::A, Comp::M);
        self.emit_assign(Dest::M, Comp::D);
        self.emit_symbol("SP");
        self.emit_assign(Dest::M, Comp::MPlusOne);
    }

    /// SP--; D = *SP
    pub(crate) fn pop_d(&mut self) {
        self.emit_symbol("SP");
        self.emit_assign(Dest::AM, Comp::MMinusOne);
        self.emit_assign(Dest::D, Comp::M);
    }

    /// Point A at the topmost stack slot without moving SP
    pub(crate) fn address_top(&mut self) {
        self.emit_symbol("SP");
        self.emit_assign(Dest::A, Comp::MMinusOne);
    }

    /// Push the value held in a named register
    pub(crate) fn push_register(&mut self, register: &str) {
        self.emit_symbol(register);
        self.emit_assign(Dest::D, Comp::M);
        self.push_d();
    }

    /// Unconditional jump to a symbol
    pub(crate) fn jump_to(&mut self, target: &str) {
        self.emit_symbol(target);
        self.emit_branch(Comp::Zero, Jump::Jmp);
    }
}
