//! A extension: load-reserved/store-conditional and atomic memory
//! operations, with acquire/release ordering packed into funct7.

use crate::enc;
use crate::asm::Assembler;
use crate::asm::errors::Result;
use crate::reg::{AqRl, Reg};

const FUNCT3_W: u32 = 0b010;
const FUNCT3_D: u32 = 0b011;

const LR: u32      = 0b00010;
const SC: u32      = 0b00011;
const AMOSWAP: u32 = 0b00001;
const AMOADD: u32  = 0b00000;
const AMOXOR: u32  = 0b00100;
const AMOAND: u32  = 0b01100;
const AMOOR: u32   = 0b01000;
const AMOMIN: u32  = 0b10000;
const AMOMAX: u32  = 0b10100;
const AMOMINU: u32 = 0b11000;
const AMOMAXU: u32 = 0b11100;

impl Assembler<'_> {
    #[inline(always)]
    fn emit_amo(
        &mut self,
        funct5: u32,
        ordering: AqRl,
        rd: Reg,
        rs2: Reg,
        rs1: Reg,
        funct3: u32
    ) -> Result<usize> {
        self.emit_raw32(enc::atomic(
            funct5,
            ordering.as_u32(),
            rs2.as_u32(),
            rs1.as_u32(),
            funct3,
            rd.as_u32()
        ))
    }

    // ----- RV32A -----

    /// Emit LR.W: load-reserve a word from `(rs1)`. The rs2 field is
    /// hardwired to x0 in this encoding.
    #[inline(always)]
    pub fn emit_lr_w(&mut self, ordering: AqRl, rd: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(LR, ordering, rd, Reg::ZERO, rs1, FUNCT3_W)
    }

    /// Emit SC.W: store-conditional the word in `rs2` to `(rs1)`;
    /// `rd` receives 0 on success.
    #[inline(always)]
    pub fn emit_sc_w(&mut self, ordering: AqRl, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_amo(SC, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    /// Emit AMOSWAP.W.
    #[inline(always)]
    pub fn emit_amoswap_w(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOSWAP, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    /// Emit AMOADD.W.
    #[inline(always)]
    pub fn emit_amoadd_w(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOADD, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    /// Emit AMOXOR.W.
    #[inline(always)]
    pub fn emit_amoxor_w(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOXOR, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    /// Emit AMOAND.W.
    #[inline(always)]
    pub fn emit_amoand_w(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOAND, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    /// Emit AMOOR.W.
    #[inline(always)]
    pub fn emit_amoor_w(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOOR, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    /// Emit AMOMIN.W (signed minimum).
    #[inline(always)]
    pub fn emit_amomin_w(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOMIN, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    /// Emit AMOMAX.W (signed maximum).
    #[inline(always)]
    pub fn emit_amomax_w(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOMAX, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    /// Emit AMOMINU.W (unsigned minimum).
    #[inline(always)]
    pub fn emit_amominu_w(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOMINU, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    /// Emit AMOMAXU.W (unsigned maximum).
    #[inline(always)]
    pub fn emit_amomaxu_w(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOMAXU, ordering, rd, rs2, rs1, FUNCT3_W)
    }

    // ----- RV64A -----

    /// Emit LR.D.
    #[inline(always)]
    pub fn emit_lr_d(&mut self, ordering: AqRl, rd: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(LR, ordering, rd, Reg::ZERO, rs1, FUNCT3_D)
    }

    /// Emit SC.D.
    #[inline(always)]
    pub fn emit_sc_d(&mut self, ordering: AqRl, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_amo(SC, ordering, rd, rs2, rs1, FUNCT3_D)
    }

    /// Emit AMOSWAP.D.
    #[inline(always)]
    pub fn emit_amoswap_d(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOSWAP, ordering, rd, rs2, rs1, FUNCT3_D)
    }

    /// Emit AMOADD.D.
    #[inline(always)]
    pub fn emit_amoadd_d(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOADD, ordering, rd, rs2, rs1, FUNCT3_D)
    }

    /// Emit AMOXOR.D.
    #[inline(always)]
    pub fn emit_amoxor_d(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOXOR, ordering, rd, rs2, rs1, FUNCT3_D)
    }

    /// Emit AMOAND.D.
    #[inline(always)]
    pub fn emit_amoand_d(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOAND, ordering, rd, rs2, rs1, FUNCT3_D)
    }

    /// Emit AMOOR.D.
    #[inline(always)]
    pub fn emit_amoor_d(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOOR, ordering, rd, rs2, rs1, FUNCT3_D)
    }

    /// Emit AMOMIN.D.
    #[inline(always)]
    pub fn emit_amomin_d(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOMIN, ordering, rd, rs2, rs1, FUNCT3_D)
    }

    /// Emit AMOMAX.D.
    #[inline(always)]
    pub fn emit_amomax_d(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOMAX, ordering, rd, rs2, rs1, FUNCT3_D)
    }

    /// Emit AMOMINU.D.
    #[inline(always)]
    pub fn emit_amominu_d(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOMINU, ordering, rd, rs2, rs1, FUNCT3_D)
    }

    /// Emit AMOMAXU.D.
    #[inline(always)]
    pub fn emit_amomaxu_d(&mut self, ordering: AqRl, rd: Reg, rs2: Reg, rs1: Reg) -> Result<usize> {
        self.emit_amo(AMOMAXU, ordering, rd, rs2, rs1, FUNCT3_D)
    }
}
