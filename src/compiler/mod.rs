//! Bytecode compiler: lowers a parsed [`crate::parser::ast::Program`] into a
//! [`chunk::CompiledProgram`] an interpreter's dispatch loop can run. The
//! dispatch loop itself is not part of this crate — only the instruction
//! format (`opcode`), the per-callable compiled unit (`chunk`), the
//! scope-aware name resolver (`symbol_table`), and the tree-walking emitter
//! that produces them (`emitter`).

pub mod chunk;
pub mod emitter;
pub mod opcode;
pub mod symbol_table;

pub use chunk::{ClassEntry, CompiledProgram, FunctionEntry};
pub use emitter::Emitter;
pub use opcode::{Instruction, Opcode, Operand, OperandKind};
