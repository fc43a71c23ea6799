// Reference Simulator
// Executes encoded instruction words against 32K words of RAM

use crate::assembler::encoder::decode;
use crate::assembler::resolver::ResolvedInstruction;
use log::{debug, trace};

/// Words of data memory
pub const RAM_SIZE: usize = 32768;

/// Reference CPU for the 16-bit target: two registers, a program counter,
/// read-only program memory and 32K words of RAM.
pub struct Cpu {
    /// Program memory
    pub rom: Vec<u16>,
    /// Data memory
    pub ram: Vec<i16>,
    /// Address register
    pub a: i16,
    /// Data register
    pub d: i16,
    /// Program counter
    pub pc: u16,
    /// Instructions executed since the last reset
    pub cycles: u64,
}

impl Cpu {
    pub fn new(rom: Vec<u16>) -> Self {
        Cpu {
            rom,
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
            cycles: 0,
        }
    }

    /// Clear registers and RAM; the program stays loaded
    pub fn reset(&mut self) {
        self.ram.iter_mut().for_each(|word| *word = 0);
        self.a = 0;
        self.d = 0;
        self.pc = 0;
        self.cycles = 0;
    }

    pub fn read_ram(&self, address: u16) -> Result<i16, String> {
        self.ram
            .get(address as usize)
            .copied()
            .ok_or_else(|| format!("RAM read out of range: {}", address))
    }

    pub fn write_ram(&mut self, address: u16, value: i16) -> Result<(), String> {
        match self.ram.get_mut(address as usize) {
            Some(word) => {
                *word = value;
                Ok(())
            }
            None => Err(format!("RAM write out of range: {}", address)),
        }
    }

    /// True once the program counter has run past the last instruction
    pub fn finished(&self) -> bool {
        self.pc as usize >= self.rom.len()
    }

    /// Execute the instruction at `pc`
    pub fn step(&mut self) -> Result<(), String> {
        let word = *self
            .rom
            .get(self.pc as usize)
            .ok_or_else(|| format!("PC {} is outside program memory", self.pc))?;
        let instruction = decode(word).map_err(|e| format!("at PC {}: {}", self.pc, e))?;
        trace!("{:5}: {}", self.pc, instruction);
        self.cycles += 1;

        match instruction {
            ResolvedInstruction::Address(value) => {
                self.a = value as i16;
                self.pc += 1;
            }
            ResolvedInstruction::Compute(compute) => {
                let address = self.a as u16;
                let y = if compute.comp.reads_memory() {
                    self.read_ram(address)?
                } else {
                    self.a
                };
                let out = alu(compute.comp.code(), self.d, y);

                if compute.dest.writes_m() {
                    self.write_ram(address, out)?;
                }
                if compute.dest.writes_a() {
                    self.a = out;
                }
                if compute.dest.writes_d() {
                    self.d = out;
                }

                // The jump target is A as it was before this instruction
                self.pc = if compute.jump.taken(out) {
                    address
                } else {
                    self.pc + 1
                };
            }
        }
        Ok(())
    }

    /// Run until execution falls off the end of the program
    pub fn run_to_end(&mut self, max_steps: u64) -> Result<u64, String> {
        let start = self.cycles;
        while !self.finished() {
            if self.cycles - start >= max_steps {
                return Err(format!("no exit after {} steps", max_steps));
            }
            self.step()?;
        }
        debug!("Program ended after {} steps", self.cycles - start);
        Ok(self.cycles - start)
    }

    /// Run until the program counter reaches `target`, typically a halt loop
    pub fn run_until_pc(&mut self, target: u16, max_steps: u64) -> Result<u64, String> {
        let start = self.cycles;
        while self.pc != target {
            if self.cycles - start >= max_steps {
                return Err(format!("PC {} not reached after {} steps", target, max_steps));
            }
            self.step()?;
        }
        debug!("Reached PC {} after {} steps", target, self.cycles - start);
        Ok(self.cycles - start)
    }
}

/// ALU driven by the six control bits of a comp code: zx nx zy ny f no
fn alu(code: u16, x: i16, y: i16) -> i16 {
    let bit = |n: u16| code & (1 << n) != 0;
    let (zx, nx, zy, ny, f, no) = (bit(5), bit(4), bit(3), bit(2), bit(1), bit(0));

    let mut x = if zx { 0 } else { x };
    if nx {
        x = !x;
    }
    let mut y = if zy { 0 } else { y };
    if ny {
        y = !y;
    }
    let out = if f { x.wrapping_add(y) } else { x & y };
    if no {
        !out
    } else {
        out
    }
}
