//! M extension: integer multiply and divide.

use crate::enc;
use crate::asm::Assembler;
use crate::asm::errors::Result;
use crate::reg::Reg;

const FUNCT7_MULDIV: u32 = 0b0000001;

impl Assembler<'_> {
    // ----- RV32M -----

    /// Emit MUL: low half of `rs1 * rs2`.
    #[inline(always)]
    pub fn emit_mul(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit MULH: high half of signed x signed multiplication.
    #[inline(always)]
    pub fn emit_mulh(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit MULHSU: high half of signed x unsigned multiplication.
    #[inline(always)]
    pub fn emit_mulhsu(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b010, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit MULHU: high half of unsigned x unsigned multiplication.
    #[inline(always)]
    pub fn emit_mulhu(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b011, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit DIV: signed division.
    #[inline(always)]
    pub fn emit_div(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b100, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit DIVU: unsigned division.
    #[inline(always)]
    pub fn emit_divu(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b101, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit REM: signed remainder.
    #[inline(always)]
    pub fn emit_rem(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b110, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit REMU: unsigned remainder.
    #[inline(always)]
    pub fn emit_remu(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b111, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    // ----- RV64M (32-bit operands, sign-extended results) -----

    /// Emit MULW.
    #[inline(always)]
    pub fn emit_mulw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit DIVW.
    #[inline(always)]
    pub fn emit_divw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b100, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit DIVUW.
    #[inline(always)]
    pub fn emit_divuw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b101, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit REMW.
    #[inline(always)]
    pub fn emit_remw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b110, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }

    /// Emit REMUW.
    #[inline(always)]
    pub fn emit_remuw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b111, rs1.as_u32(), rs2.as_u32(), FUNCT7_MULDIV)
    }
}
