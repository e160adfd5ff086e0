//! Bytecode layer: the instruction set, the tree-walking compiler that emits
//! it, the serializable program image, and a disassembler for inspection.

pub mod compile;
pub mod disasm;
pub mod image;
pub mod op;

pub use compile::{Compiler, SymbolTable};
pub use disasm::disassemble;
pub use image::{CompiledProgram, IncludeRef};
pub use op::OpCode;
