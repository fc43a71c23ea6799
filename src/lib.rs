#![crate_name = "hackforge"]

#[macro_use]
extern crate lazy_static;

pub mod asm;
pub mod assembler;
pub mod config;
pub mod error;
pub mod isa;
pub mod simulator;
pub mod vm_translator;

pub use assembler::{AssembledProgram, Assembler};
pub use config::{BuildConfig, TranslatorConfig};
pub use error::ToolchainError;
pub use vm_translator::{SourceUnit, VmTranslator};
