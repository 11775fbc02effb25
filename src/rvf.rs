//! F, D and Q extensions: single, double and quad precision floating
//! point.
//!
//! Arithmetic instructions carry a rounding mode in funct3; pass
//! [`RMode::Dynamic`] to defer to the `frm` CSR. The precision is the
//! low funct7 bits (fmt: S=00, D=01, Q=11), and FMA instructions carry
//! it in the R4 funct2 field instead.

use crate::enc;
use crate::asm::Assembler;
use crate::asm::asm::check_simm;
use crate::asm::errors::Result;
use crate::reg::{FReg, Reg, RMode};

/// fmt field values appended to the funct7/funct2 bases.
const FMT_S: u32 = 0b00;
const FMT_D: u32 = 0b01;
const FMT_Q: u32 = 0b11;

#[allow(clippy::identity_op)]
impl Assembler<'_> {
    #[inline(always)]
    fn emit_fp_arith(
        &mut self,
        funct7: u32,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_r(
            enc::OPC_OP_FP,
            rd.as_u32(),
            rm.as_u32(),
            rs1.as_u32(),
            rs2.as_u32(),
            funct7
        )
    }

    #[inline(always)]
    fn emit_fp_fma(
        &mut self,
        opcode: u32,
        fmt: u32,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_raw32(enc::r4_type(
            opcode,
            rd.as_u32(),
            rm.as_u32(),
            rs1.as_u32(),
            rs2.as_u32(),
            fmt,
            rs3.as_u32()
        ))
    }

    // ----- RV32F / RV64F -----

    /// Emit FADD.S.
    #[inline(always)]
    pub fn emit_fadd_s(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x00 | FMT_S, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fsub_s(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x04 | FMT_S, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fmul_s(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x08 | FMT_S, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fdiv_s(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x0C | FMT_S, rd, rs1, rs2, rm)
    }

    /// Emit FSQRT.S (the rs2 field selects the operation and is zero).
    #[inline(always)]
    pub fn emit_fsqrt_s(&mut self, rd: FReg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0, 0x2C | FMT_S)
    }

    /// Emit FSGNJ.S: `rd` takes the magnitude of `rs1`, sign of `rs2`.
    #[inline(always)]
    pub fn emit_fsgnj_s(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0x10 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fsgnjn_s(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0x10 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fsgnjx_s(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b010, rs1.as_u32(), rs2.as_u32(), 0x10 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fmin_s(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0x14 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fmax_s(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0x14 | FMT_S)
    }

    /// Emit FEQ.S into an integer register.
    #[inline(always)]
    pub fn emit_feq_s(&mut self, rd: Reg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b010, rs1.as_u32(), rs2.as_u32(), 0x50 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_flt_s(&mut self, rd: Reg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0x50 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fle_s(&mut self, rd: Reg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0x50 | FMT_S)
    }

    /// Emit FCLASS.S: classify `rs1` into a ten-bit mask in `rd`.
    #[inline(always)]
    pub fn emit_fclass_s(&mut self, rd: Reg, rs1: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), 0, 0x70 | FMT_S)
    }

    /// Emit FCVT.W.S: float to signed 32-bit integer (rs2 field selects
    /// the integer type).
    #[inline(always)]
    pub fn emit_fcvt_w_s(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00000, 0x60 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fcvt_wu_s(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00001, 0x60 | FMT_S)
    }

    /// Emit FCVT.L.S (RV64): float to signed 64-bit integer.
    #[inline(always)]
    pub fn emit_fcvt_l_s(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00010, 0x60 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fcvt_lu_s(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00011, 0x60 | FMT_S)
    }

    /// Emit FCVT.S.W: signed 32-bit integer to float.
    #[inline(always)]
    pub fn emit_fcvt_s_w(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00000, 0x68 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fcvt_s_wu(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00001, 0x68 | FMT_S)
    }

    /// Emit FCVT.S.L (RV64): signed 64-bit integer to float.
    #[inline(always)]
    pub fn emit_fcvt_s_l(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00010, 0x68 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fcvt_s_lu(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00011, 0x68 | FMT_S)
    }

    /// Emit FMV.X.W: raw bit move, FP to integer register.
    #[inline(always)]
    pub fn emit_fmv_x_w(&mut self, rd: Reg, rs1: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), 0, 0x70 | FMT_S)
    }

    /// Emit FMV.W.X: raw bit move, integer to FP register.
    #[inline(always)]
    pub fn emit_fmv_w_x(&mut self, rd: FReg, rs1: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), 0, 0x78 | FMT_S)
    }

    /// Emit FLW.
    #[inline(always)]
    pub fn emit_flw(&mut self, rd: FReg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD_FP, rd.as_u32(), 0b010, rs.as_u32(), imm)
    }

    /// Emit FSW.
    #[inline(always)]
    pub fn emit_fsw(&mut self, rs2: FReg, imm: i32, rs1: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_s(enc::OPC_STORE_FP, 0b010, rs1.as_u32(), rs2.as_u32(), imm)
    }

    /// Emit FMADD.S: `rd = rs1 * rs2 + rs3`.
    #[inline(always)]
    pub fn emit_fmadd_s(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_MADD, FMT_S, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fmsub_s(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_MSUB, FMT_S, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fnmsub_s(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_NMSUB, FMT_S, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fnmadd_s(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_NMADD, FMT_S, rd, rs1, rs2, rs3, rm)
    }

    /// Absolute value (pseudo-instruction: FSGNJX rd, rs, rs).
    #[inline(always)]
    pub fn emit_fabs_s(&mut self, rd: FReg, rs: FReg) -> Result<usize> {
        self.emit_fsgnjx_s(rd, rs, rs)
    }

    /// Register move (pseudo-instruction: FSGNJ rd, rs, rs).
    #[inline(always)]
    pub fn emit_fmv_s(&mut self, rd: FReg, rs: FReg) -> Result<usize> {
        self.emit_fsgnj_s(rd, rs, rs)
    }

    /// Negation (pseudo-instruction: FSGNJN rd, rs, rs).
    #[inline(always)]
    pub fn emit_fneg_s(&mut self, rd: FReg, rs: FReg) -> Result<usize> {
        self.emit_fsgnjn_s(rd, rs, rs)
    }

    // ----- RV32D / RV64D -----

    #[inline(always)]
    pub fn emit_fadd_d(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x00 | FMT_D, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fsub_d(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x04 | FMT_D, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fmul_d(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x08 | FMT_D, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fdiv_d(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x0C | FMT_D, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fsqrt_d(&mut self, rd: FReg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0, 0x2C | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fsgnj_d(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0x10 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fsgnjn_d(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0x10 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fsgnjx_d(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b010, rs1.as_u32(), rs2.as_u32(), 0x10 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fmin_d(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0x14 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fmax_d(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0x14 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_feq_d(&mut self, rd: Reg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b010, rs1.as_u32(), rs2.as_u32(), 0x50 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_flt_d(&mut self, rd: Reg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0x50 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fle_d(&mut self, rd: Reg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0x50 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fclass_d(&mut self, rd: Reg, rs1: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), 0, 0x70 | FMT_D)
    }

    /// Emit FCVT.D.S: widen single to double (exact, but rm is encoded).
    #[inline(always)]
    pub fn emit_fcvt_d_s(&mut self, rd: FReg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), FMT_S, 0x20 | FMT_D)
    }

    /// Emit FCVT.S.D: narrow double to single.
    #[inline(always)]
    pub fn emit_fcvt_s_d(&mut self, rd: FReg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), FMT_D, 0x20 | FMT_S)
    }

    #[inline(always)]
    pub fn emit_fcvt_w_d(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00000, 0x60 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fcvt_wu_d(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00001, 0x60 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fcvt_l_d(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00010, 0x60 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fcvt_lu_d(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00011, 0x60 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fcvt_d_w(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00000, 0x68 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fcvt_d_wu(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00001, 0x68 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fcvt_d_l(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00010, 0x68 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fcvt_d_lu(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00011, 0x68 | FMT_D)
    }

    /// Emit FMV.X.D (RV64): raw bit move, FP to integer register.
    #[inline(always)]
    pub fn emit_fmv_x_d(&mut self, rd: Reg, rs1: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), 0, 0x70 | FMT_D)
    }

    /// Emit FMV.D.X (RV64): raw bit move, integer to FP register.
    #[inline(always)]
    pub fn emit_fmv_d_x(&mut self, rd: FReg, rs1: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), 0, 0x78 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fld(&mut self, rd: FReg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD_FP, rd.as_u32(), 0b011, rs.as_u32(), imm)
    }

    #[inline(always)]
    pub fn emit_fsd(&mut self, rs2: FReg, imm: i32, rs1: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_s(enc::OPC_STORE_FP, 0b011, rs1.as_u32(), rs2.as_u32(), imm)
    }

    #[inline(always)]
    pub fn emit_fmadd_d(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_MADD, FMT_D, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fmsub_d(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_MSUB, FMT_D, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fnmsub_d(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_NMSUB, FMT_D, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fnmadd_d(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_NMADD, FMT_D, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fabs_d(&mut self, rd: FReg, rs: FReg) -> Result<usize> {
        self.emit_fsgnjx_d(rd, rs, rs)
    }

    #[inline(always)]
    pub fn emit_fmv_d(&mut self, rd: FReg, rs: FReg) -> Result<usize> {
        self.emit_fsgnj_d(rd, rs, rs)
    }

    #[inline(always)]
    pub fn emit_fneg_d(&mut self, rd: FReg, rs: FReg) -> Result<usize> {
        self.emit_fsgnjn_d(rd, rs, rs)
    }

    // ----- RV32Q / RV64Q -----

    #[inline(always)]
    pub fn emit_fadd_q(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x00 | FMT_Q, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fsub_q(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x04 | FMT_Q, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fmul_q(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x08 | FMT_Q, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fdiv_q(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RMode) -> Result<usize> {
        self.emit_fp_arith(0x0C | FMT_Q, rd, rs1, rs2, rm)
    }

    #[inline(always)]
    pub fn emit_fsqrt_q(&mut self, rd: FReg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0, 0x2C | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fsgnj_q(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0x10 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fsgnjn_q(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0x10 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fsgnjx_q(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b010, rs1.as_u32(), rs2.as_u32(), 0x10 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fmin_q(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0x14 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fmax_q(&mut self, rd: FReg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0x14 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_feq_q(&mut self, rd: Reg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b010, rs1.as_u32(), rs2.as_u32(), 0x50 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_flt_q(&mut self, rd: Reg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0x50 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fle_q(&mut self, rd: Reg, rs1: FReg, rs2: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0x50 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fclass_q(&mut self, rd: Reg, rs1: FReg) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), 0b001, rs1.as_u32(), 0, 0x70 | FMT_Q)
    }

    /// Emit FCVT.Q.S: widen single to quad.
    #[inline(always)]
    pub fn emit_fcvt_q_s(&mut self, rd: FReg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), FMT_S, 0x20 | FMT_Q)
    }

    /// Emit FCVT.S.Q: narrow quad to single.
    #[inline(always)]
    pub fn emit_fcvt_s_q(&mut self, rd: FReg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), FMT_Q, 0x20 | FMT_S)
    }

    /// Emit FCVT.Q.D: widen double to quad.
    #[inline(always)]
    pub fn emit_fcvt_q_d(&mut self, rd: FReg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), FMT_D, 0x20 | FMT_Q)
    }

    /// Emit FCVT.D.Q: narrow quad to double.
    #[inline(always)]
    pub fn emit_fcvt_d_q(&mut self, rd: FReg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), FMT_Q, 0x20 | FMT_D)
    }

    #[inline(always)]
    pub fn emit_fcvt_w_q(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00000, 0x60 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fcvt_wu_q(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00001, 0x60 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fcvt_l_q(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00010, 0x60 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fcvt_lu_q(&mut self, rd: Reg, rs1: FReg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00011, 0x60 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fcvt_q_w(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00000, 0x68 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fcvt_q_wu(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00001, 0x68 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fcvt_q_l(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00010, 0x68 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_fcvt_q_lu(&mut self, rd: FReg, rs1: Reg, rm: RMode) -> Result<usize> {
        self.emit_r(enc::OPC_OP_FP, rd.as_u32(), rm.as_u32(), rs1.as_u32(), 0b00011, 0x68 | FMT_Q)
    }

    #[inline(always)]
    pub fn emit_flq(&mut self, rd: FReg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD_FP, rd.as_u32(), 0b100, rs.as_u32(), imm)
    }

    #[inline(always)]
    pub fn emit_fsq(&mut self, rs2: FReg, imm: i32, rs1: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_s(enc::OPC_STORE_FP, 0b100, rs1.as_u32(), rs2.as_u32(), imm)
    }

    #[inline(always)]
    pub fn emit_fmadd_q(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_MADD, FMT_Q, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fmsub_q(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_MSUB, FMT_Q, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fnmsub_q(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_NMSUB, FMT_Q, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fnmadd_q(
        &mut self,
        rd: FReg,
        rs1: FReg,
        rs2: FReg,
        rs3: FReg,
        rm: RMode
    ) -> Result<usize> {
        self.emit_fp_fma(enc::OPC_NMADD, FMT_Q, rd, rs1, rs2, rs3, rm)
    }

    #[inline(always)]
    pub fn emit_fabs_q(&mut self, rd: FReg, rs: FReg) -> Result<usize> {
        self.emit_fsgnjx_q(rd, rs, rs)
    }

    #[inline(always)]
    pub fn emit_fmv_q(&mut self, rd: FReg, rs: FReg) -> Result<usize> {
        self.emit_fsgnj_q(rd, rs, rs)
    }

    #[inline(always)]
    pub fn emit_fneg_q(&mut self, rd: FReg, rs: FReg) -> Result<usize> {
        self.emit_fsgnjn_q(rd, rs, rs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg::FReg::*;
    use crate::reg::Reg::{A0, SP};

    fn word(f: impl FnOnce(&mut Assembler<'static>)) -> u32 {
        let mut asm = Assembler::new();
        f(&mut asm);
        let b = asm.code();
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    #[test]
    fn arithmetic_encodings() {
        assert_eq!(
            word(|a| { a.emit_fadd_s(FA0, FA1, FA2, RMode::Dynamic).unwrap(); }),
            0x00C5F553
        );
        assert_eq!(
            word(|a| { a.emit_fadd_d(FA0, FA1, FA2, RMode::Dynamic).unwrap(); }),
            0x02C5F553
        );
        assert_eq!(
            word(|a| { a.emit_fsub_s(FA0, FA1, FA2, RMode::Dynamic).unwrap(); }),
            0x08C5F553
        );
        assert_eq!(
            word(|a| { a.emit_fsqrt_s(FA0, FA1, RMode::Dynamic).unwrap(); }),
            0x5805F553
        );
        // precision bits select Q
        assert_eq!(
            word(|a| { a.emit_fadd_q(FA0, FA1, FA2, RMode::Dynamic).unwrap(); }),
            0x06C5F553
        );
    }

    #[test]
    fn rounding_mode_is_funct3() {
        let dynamic = word(|a| { a.emit_fadd_s(FA0, FA1, FA2, RMode::Dynamic).unwrap(); });
        let rne = word(|a| { a.emit_fadd_s(FA0, FA1, FA2, RMode::NearestEven).unwrap(); });
        let rtz = word(|a| { a.emit_fadd_s(FA0, FA1, FA2, RMode::TowardZero).unwrap(); });

        assert_eq!(dynamic & !(0b111 << 12), rne);
        assert_eq!(rtz, rne | (0b001 << 12));
    }

    #[test]
    fn compares_and_classify() {
        assert_eq!(word(|a| { a.emit_feq_s(A0, FA1, FA2).unwrap(); }), 0xA0C5A553);
        assert_eq!(word(|a| { a.emit_flt_s(A0, FA1, FA2).unwrap(); }), 0xA0C59553);
        assert_eq!(word(|a| { a.emit_fle_s(A0, FA1, FA2).unwrap(); }), 0xA0C58553);
        assert_eq!(word(|a| { a.emit_fclass_s(A0, FA0).unwrap(); }), 0xE0051553);
        assert_eq!(word(|a| { a.emit_fclass_d(A0, FA0).unwrap(); }), 0xE2051553);
    }

    #[test]
    fn conversions() {
        assert_eq!(
            word(|a| { a.emit_fcvt_w_s(A0, FA0, RMode::TowardZero).unwrap(); }),
            0xC0051553
        );
        assert_eq!(
            word(|a| { a.emit_fcvt_s_w(FA0, A0, RMode::Dynamic).unwrap(); }),
            0xD0057553
        );
        assert_eq!(
            word(|a| { a.emit_fcvt_d_s(FA0, FA1, RMode::NearestEven).unwrap(); }),
            0x42058553
        );
        assert_eq!(
            word(|a| { a.emit_fcvt_s_d(FA0, FA1, RMode::Dynamic).unwrap(); }),
            0x4015F553
        );
        // the rs2 field selects the integer width
        let w = word(|a| { a.emit_fcvt_w_s(A0, FA0, RMode::Dynamic).unwrap(); });
        let l = word(|a| { a.emit_fcvt_l_s(A0, FA0, RMode::Dynamic).unwrap(); });
        assert_eq!(l, w | (0b00010 << 20));
    }

    #[test]
    fn bit_moves() {
        assert_eq!(word(|a| { a.emit_fmv_x_w(A0, FA0).unwrap(); }), 0xE0050553);
        assert_eq!(word(|a| { a.emit_fmv_w_x(FA0, A0).unwrap(); }), 0xF0050553);
        assert_eq!(word(|a| { a.emit_fmv_x_d(A0, FA0).unwrap(); }), 0xE2050553);
        assert_eq!(word(|a| { a.emit_fmv_d_x(FA0, A0).unwrap(); }), 0xF2050553);
    }

    #[test]
    fn loads_and_stores() {
        assert_eq!(word(|a| { a.emit_flw(FA0, 0, SP).unwrap(); }), 0x00012507);
        assert_eq!(word(|a| { a.emit_fld(FA0, 0, SP).unwrap(); }), 0x00013507);
        assert_eq!(word(|a| { a.emit_flq(FA0, 0, SP).unwrap(); }), 0x00014507);
        assert_eq!(word(|a| { a.emit_fsw(FA0, 0, SP).unwrap(); }), 0x00A12027);
        assert_eq!(word(|a| { a.emit_fsd(FA0, 0, SP).unwrap(); }), 0x00A13027);
        assert_eq!(word(|a| { a.emit_fsq(FA0, 0, SP).unwrap(); }), 0x00A14027);
    }

    #[test]
    fn fused_multiply_add() {
        assert_eq!(
            word(|a| { a.emit_fmadd_s(FA0, FA1, FA2, FA3, RMode::Dynamic).unwrap(); }),
            0x68C5F543
        );
        assert_eq!(
            word(|a| { a.emit_fmsub_s(FA0, FA1, FA2, FA3, RMode::Dynamic).unwrap(); }),
            0x68C5F547
        );
        assert_eq!(
            word(|a| { a.emit_fnmsub_s(FA0, FA1, FA2, FA3, RMode::Dynamic).unwrap(); }),
            0x68C5F54B
        );
        assert_eq!(
            word(|a| { a.emit_fnmadd_s(FA0, FA1, FA2, FA3, RMode::Dynamic).unwrap(); }),
            0x68C5F54F
        );
        // funct2 selects the precision
        assert_eq!(
            word(|a| { a.emit_fmadd_d(FA0, FA1, FA2, FA3, RMode::Dynamic).unwrap(); }),
            0x6AC5F543
        );
        assert_eq!(
            word(|a| { a.emit_fmadd_q(FA0, FA1, FA2, FA3, RMode::Dynamic).unwrap(); }),
            0x6EC5F543
        );
    }

    #[test]
    fn sign_injection_pseudos() {
        assert_eq!(
            word(|a| { a.emit_fabs_s(FA0, FA1).unwrap(); }),
            word(|a| { a.emit_fsgnjx_s(FA0, FA1, FA1).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_fmv_d(FA0, FA1).unwrap(); }),
            word(|a| { a.emit_fsgnj_d(FA0, FA1, FA1).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_fneg_q(FA0, FA1).unwrap(); }),
            word(|a| { a.emit_fsgnjn_q(FA0, FA1, FA1).unwrap(); })
        );
    }
}
