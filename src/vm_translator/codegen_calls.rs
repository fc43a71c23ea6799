/// codegen_calls.rs - Calling convention for VmCodeGen
///
/// The target has no call instruction, so every call site builds a frame on
/// the data stack by hand:
///
/// ```text
///   argument 0 .. n-1     <- ARG (callee)
///   return address
///   saved LCL
///   saved ARG
///   saved THIS
///   saved THAT
///   local 0 .. k-1        <- LCL (callee)
///   working stack         <- SP
/// ```
///
/// `return` unwinds it from the callee's LCL, leaving the return value where
/// argument 0 was and SP just above it.
///
use crate::error::ToolchainError;
use crate::isa::{Comp, Dest, Jump, MAX_ADDRESS};
use crate::vm_translator::codegen::VmCodeGen;
use log::{debug, info};

/// Words pushed by a call site ahead of the callee's locals
pub const FRAME_SIZE: u16 = 5;
/// Holds the callee's LCL while a return unwinds its frame
pub(crate) const FRAME_REGISTER: &str = "R14";
/// Holds the return address while a return unwinds its frame
pub(crate) const RETURN_ADDRESS_REGISTER: &str = "R15";

/// Saved bases in push order; `return` restores them in reverse
const SAVED_BASES: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

impl<'a> VmCodeGen<'a> {
    /// Emitted once per build, ahead of every unit: set SP and call the
    /// entry function with no arguments.
    pub fn write_bootstrap(&mut self) -> Result<(), ToolchainError> {
        let stack_base = self.config.stack_base;
        let entry = self.config.entry_function.clone();
        info!("Bootstrap: SP={} then call {}", stack_base, entry);

        self.emit_comment("bootstrap");
        self.emit_numeral(stack_base);
        self.emit_assign(Dest::D, Comp::A);
        self.emit_symbol("SP");
        self.emit_assign(Dest::M, Comp::D);
        self.write_call(&entry, 0)
    }

    pub(crate) fn write_function(&mut self, name: &str, locals: u16) {
        debug!("function {} with {} locals", name, locals);
        self.ctx.enter_function(name);
        self.emit_label(name);
        for _ in 0..locals {
            self.emit_numeral(0);
            self.emit_assign(Dest::D, Comp::A);
            self.push_d();
        }
    }

    pub(crate) fn write_call(&mut self, function: &str, args: u16) -> Result<(), ToolchainError> {
        let offset = FRAME_SIZE
            .checked_add(args)
            .filter(|&offset| offset <= MAX_ADDRESS)
            .ok_or_else(|| {
                ToolchainError::ResourceExhaustion(format!(
                    "call to {} passes {} arguments",
                    function, args
                ))
            })?;
        let return_label = self.ctx.next_return_label();

        // push return address
        self.emit_symbol(&return_label);
        self.emit_assign(Dest::D, Comp::A);
        self.push_d();

        for base in SAVED_BASES {
            self.push_register(base);
        }

        // LCL = SP
        self.emit_symbol("SP");
        self.emit_assign(Dest::D, Comp::M);
        self.emit_symbol("LCL");
        self.emit_assign(Dest::M, Comp::D);

        // ARG = SP - 5 - args (D still holds SP)
        self.emit_numeral(offset);
        self.emit_assign(Dest::D, Comp::DMinusA);
        self.emit_symbol("ARG");
        self.emit_assign(Dest::M, Comp::D);

        self.jump_to(function);
        self.emit_label(&return_label);
        Ok(())
    }

    pub(crate) fn write_return(&mut self) {
        // FRAME = LCL
        self.emit_symbol("LCL");
        self.emit_assign(Dest::D, Comp::M);
        self.emit_symbol(FRAME_REGISTER);
        self.emit_assign(Dest::M, Comp::D);

        // RET = *(FRAME - 5), read before argument 0 is overwritten
        self.emit_numeral(FRAME_SIZE);
        self.emit_assign(Dest::A, Comp::DMinusA);
        self.emit_assign(Dest::D, Comp::M);
        self.emit_symbol(RETURN_ADDRESS_REGISTER);
        self.emit_assign(Dest::M, Comp::D);

        // *ARG = pop()
        self.pop_d();
        self.emit_symbol("ARG");
        self.emit_assign(Dest::A, Comp::M);
        self.emit_assign(Dest::M, Comp::D);

        // SP = ARG + 1
        self.emit_symbol("ARG");
        self.emit_assign(Dest::D, Comp::MPlusOne);
        self.emit_symbol("SP");
        self.emit_assign(Dest::M, Comp::D);

        // THAT, THIS, ARG, LCL = *(FRAME - 1) .. *(FRAME - 4)
        for (depth, base) in SAVED_BASES.iter().rev().enumerate() {
            self.emit_symbol(FRAME_REGISTER);
            self.emit_assign(Dest::D, Comp::M);
            self.emit_numeral(depth as u16 + 1);
            self.emit_assign(Dest::A, Comp::DMinusA);
            self.emit_assign(Dest::D, Comp::M);
            self.emit_symbol(base);
            self.emit_assign(Dest::M, Comp::D);
        }

        // goto RET
        self.emit_symbol(RETURN_ADDRESS_REGISTER);
        self.emit_assign(Dest::A, Comp::M);
        self.emit_branch(Comp::Zero, Jump::Jmp);

        self.ctx.leave_function();
    }
}
