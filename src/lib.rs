//! Single-pass runtime assembler for RISC-V.
//!
//! Emits RV32/RV64 IMAFDQC + Zicsr machine code into an in-memory
//! buffer, one mnemonic method per instruction. Forward branches
//! reference labels; binding a label patches every site that referenced
//! it, so emission stays single-pass. The produced byte stream is the
//! output: little-endian, 2-byte aligned, no headers and no relocations.
//!
//! ```
//! use brisk::{Assembler, Reg::*};
//!
//! let mut asm = Assembler::new();
//!
//! // a0 = a0 * a0, looping until a1 is zero
//! let done = asm.declare_label();
//! let head = asm.declare_label();
//! asm.bind_label(head)?;
//! asm.emit_beqz(A1, done)?;
//! asm.emit_mul(A0, A0, A0)?;
//! asm.emit_addi(A1, A1, -1)?;
//! asm.emit_j(head)?;
//! asm.bind_label(done)?;
//! asm.emit_ret()?;
//!
//! let buf = asm.finish().unwrap();
//! assert_eq!(buf.code().len(), 20);
//! # Ok::<(), brisk::EmitError>(())
//! ```
//!
//! Executing the produced bytes (mmap, cache maintenance, calling
//! conventions) is the embedder's business; the assembler only builds
//! them.

#[macro_use]
pub mod util;

pub mod asm;
pub mod buffer;
pub mod enc;
pub mod reg;

mod rv32i;
mod rv64i;
mod zicsr;
mod rvm;
mod rva;
mod rvf;
mod rvc;

pub use asm::Assembler;
pub use asm::errors::{EmitError, FinishError, Result};
pub use asm::label::{Label, LabelId};
pub use buffer::CodeBuffer;
pub use reg::{AqRl, Csr, FReg, FenceOrder, Reg, RMode};
