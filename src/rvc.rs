//! C extension: 16-bit compressed instructions.
//!
//! Three-bit register fields only reach `x8..x15` / `f8..f15`; every
//! mnemonic has its own immediate scramble, computed here and placed by
//! the CI/CL/CS/CIW/CJ encoders. ISA-reserved encodings (zero
//! immediates where the ISA reserves them, `C.LUI` into x0/x2) are
//! rejected.

use crate::enc;
use crate::asm::Assembler;
use crate::asm::asm::{check_creg, check_cfreg, check_scaled_uimm, check_simm};
use crate::asm::errors::{EmitError, Result};
use crate::asm::label::LabelId;
use crate::reg::{FReg, Reg};

/// CI-style placement of a 6-bit immediate: bit 5 at [12], bits 4:0 at
/// [6:2].
#[inline(always)]
const fn imm6_bits(imm: i32) -> u32 {
    let imm = imm as u32;
    (((imm >> 5) & 0x1) << 12) | ((imm & 0x1F) << 2)
}

/// CL/CS placement for word-sized offsets: `imm[5:3]` at [12:10],
/// `imm[2]` at [6], `imm[6]` at [5].
#[inline(always)]
const fn mem_w_bits(imm: u32) -> u32 {
    (((imm >> 3) & 0x7) << 10) | (((imm >> 2) & 0x1) << 6) | (((imm >> 6) & 0x1) << 5)
}

/// CL/CS placement for doubleword offsets: `imm[5:3]` at [12:10],
/// `imm[7:6]` at [6:5].
#[inline(always)]
const fn mem_d_bits(imm: u32) -> u32 {
    (((imm >> 3) & 0x7) << 10) | (((imm >> 6) & 0x3) << 5)
}

/// CL/CS placement for quadword offsets: `imm[5:4]` at [12:11],
/// `imm[8]` at [10], `imm[7:6]` at [6:5].
#[cfg(feature = "rv128")]
#[inline(always)]
const fn mem_q_bits(imm: u32) -> u32 {
    (((imm >> 4) & 0x3) << 11) | (((imm >> 8) & 0x1) << 10) | (((imm >> 6) & 0x3) << 5)
}

impl Assembler<'_> {
    // ----- QUADRANT 0: LOADS AND STORES -----

    /// Emit C.ADDI4SPN: `rd = sp + imm`, imm a nonzero multiple of 4 up
    /// to 1020.
    pub fn emit_c_addi4spn(&mut self, rd: Reg, imm: u32) -> Result<usize> {
        let rdc = check_creg(rd)?;
        if imm == 0 {
            return Err(EmitError::IllegalOperands {
                reason: "C.ADDI4SPN with a zero immediate is reserved",
            })
        }
        let imm = check_scaled_uimm(imm, 1020, 4)?;

        let bits = (((imm >> 4) & 0x3) << 11)
            | (((imm >> 6) & 0xF) << 7)
            | (((imm >> 2) & 0x1) << 6)
            | (((imm >> 3) & 0x1) << 5);

        self.emit_raw16(enc::ciw(0b000, bits, rdc, enc::C_Q0))
    }

    /// Emit C.FLD: load a double into `f8..f15`, offset a multiple of 8
    /// up to 248.
    pub fn emit_c_fld(&mut self, rd: FReg, imm: u32, rs: Reg) -> Result<usize> {
        let rdc = check_cfreg(rd)?;
        let rsc = check_creg(rs)?;
        let imm = check_scaled_uimm(imm, 248, 8)?;
        self.emit_raw16(enc::cl(0b001, mem_d_bits(imm), rsc, rdc, enc::C_Q0))
    }

    /// Emit C.LW: offset a multiple of 4 up to 124.
    pub fn emit_c_lw(&mut self, rd: Reg, imm: u32, rs: Reg) -> Result<usize> {
        let rdc = check_creg(rd)?;
        let rsc = check_creg(rs)?;
        let imm = check_scaled_uimm(imm, 124, 4)?;
        self.emit_raw16(enc::cl(0b010, mem_w_bits(imm), rsc, rdc, enc::C_Q0))
    }

    /// Emit C.FLW (RV32 only; this encoding is C.LD on RV64).
    pub fn emit_c_flw(&mut self, rd: FReg, imm: u32, rs: Reg) -> Result<usize> {
        let rdc = check_cfreg(rd)?;
        let rsc = check_creg(rs)?;
        let imm = check_scaled_uimm(imm, 124, 4)?;
        self.emit_raw16(enc::cl(0b011, mem_w_bits(imm), rsc, rdc, enc::C_Q0))
    }

    /// Emit C.LD (RV64; this encoding is C.FLW on RV32).
    pub fn emit_c_ld(&mut self, rd: Reg, imm: u32, rs: Reg) -> Result<usize> {
        let rdc = check_creg(rd)?;
        let rsc = check_creg(rs)?;
        let imm = check_scaled_uimm(imm, 248, 8)?;
        self.emit_raw16(enc::cl(0b011, mem_d_bits(imm), rsc, rdc, enc::C_Q0))
    }

    /// Emit C.LQ (RV128): offset a multiple of 16 up to 496.
    #[cfg(feature = "rv128")]
    pub fn emit_c_lq(&mut self, rd: Reg, imm: u32, rs: Reg) -> Result<usize> {
        let rdc = check_creg(rd)?;
        let rsc = check_creg(rs)?;
        let imm = check_scaled_uimm(imm, 496, 16)?;
        self.emit_raw16(enc::cl(0b001, mem_q_bits(imm), rsc, rdc, enc::C_Q0))
    }

    /// Emit C.FSD.
    pub fn emit_c_fsd(&mut self, rs2: FReg, imm: u32, rs1: Reg) -> Result<usize> {
        let rs2c = check_cfreg(rs2)?;
        let rs1c = check_creg(rs1)?;
        let imm = check_scaled_uimm(imm, 248, 8)?;
        self.emit_raw16(enc::cs(0b101, mem_d_bits(imm), rs1c, rs2c, enc::C_Q0))
    }

    /// Emit C.SQ (RV128).
    #[cfg(feature = "rv128")]
    pub fn emit_c_sq(&mut self, rs2: Reg, imm: u32, rs1: Reg) -> Result<usize> {
        let rs2c = check_creg(rs2)?;
        let rs1c = check_creg(rs1)?;
        let imm = check_scaled_uimm(imm, 496, 16)?;
        self.emit_raw16(enc::cs(0b101, mem_q_bits(imm), rs1c, rs2c, enc::C_Q0))
    }

    /// Emit C.SW.
    pub fn emit_c_sw(&mut self, rs2: Reg, imm: u32, rs1: Reg) -> Result<usize> {
        let rs2c = check_creg(rs2)?;
        let rs1c = check_creg(rs1)?;
        let imm = check_scaled_uimm(imm, 124, 4)?;
        self.emit_raw16(enc::cs(0b110, mem_w_bits(imm), rs1c, rs2c, enc::C_Q0))
    }

    /// Emit C.FSW (RV32 only; this encoding is C.SD on RV64).
    pub fn emit_c_fsw(&mut self, rs2: FReg, imm: u32, rs1: Reg) -> Result<usize> {
        let rs2c = check_cfreg(rs2)?;
        let rs1c = check_creg(rs1)?;
        let imm = check_scaled_uimm(imm, 124, 4)?;
        self.emit_raw16(enc::cs(0b111, mem_w_bits(imm), rs1c, rs2c, enc::C_Q0))
    }

    /// Emit C.SD (RV64; this encoding is C.FSW on RV32).
    pub fn emit_c_sd(&mut self, rs2: Reg, imm: u32, rs1: Reg) -> Result<usize> {
        let rs2c = check_creg(rs2)?;
        let rs1c = check_creg(rs1)?;
        let imm = check_scaled_uimm(imm, 248, 8)?;
        self.emit_raw16(enc::cs(0b111, mem_d_bits(imm), rs1c, rs2c, enc::C_Q0))
    }

    // ----- QUADRANT 1: IMMEDIATES, JUMPS, SHIFTS -----

    /// Emit C.NOP.
    #[inline(always)]
    pub fn emit_c_nop(&mut self) -> Result<usize> {
        self.emit_raw16(0x0001)
    }

    /// Emit C.ADDI: `rd += imm`, imm a nonzero 6-bit value. A zero
    /// immediate collides with the C.NOP encoding and is rejected.
    pub fn emit_c_addi(&mut self, rd: Reg, imm: i32) -> Result<usize> {
        if rd == Reg::ZERO {
            return Err(EmitError::InvalidRegister { reg: rd.name() })
        }
        if imm == 0 {
            return Err(EmitError::IllegalOperands {
                reason: "C.ADDI with a zero immediate collides with C.NOP",
            })
        }
        let imm = check_simm(imm, 6)?;

        self.emit_raw16(enc::ci(0b000, imm6_bits(imm), rd.as_u32(), enc::C_Q1))
    }

    /// Emit C.ADDIW (RV64): sign-extending 32-bit add immediate.
    pub fn emit_c_addiw(&mut self, rd: Reg, imm: i32) -> Result<usize> {
        if rd == Reg::ZERO {
            return Err(EmitError::InvalidRegister { reg: rd.name() })
        }
        let imm = check_simm(imm, 6)?;

        self.emit_raw16(enc::ci(0b001, imm6_bits(imm), rd.as_u32(), enc::C_Q1))
    }

    /// Emit C.LI: `rd = imm`, a sign-extended 6-bit value (zero is
    /// legal).
    pub fn emit_c_li(&mut self, rd: Reg, imm: i32) -> Result<usize> {
        let imm = check_simm(imm, 6)?;
        self.emit_raw16(enc::ci(0b010, imm6_bits(imm), rd.as_u32(), enc::C_Q1))
    }

    /// Emit C.ADDI16SP: adjust `sp` by a nonzero multiple of 16 in
    /// `[-512, 496]`.
    pub fn emit_c_addi16sp(&mut self, imm: i32) -> Result<usize> {
        if imm == 0 {
            return Err(EmitError::IllegalOperands {
                reason: "C.ADDI16SP with a zero immediate is reserved",
            })
        }
        if imm % 16 != 0 {
            return Err(EmitError::IllegalOperands {
                reason: "C.ADDI16SP adjustment is not a multiple of 16",
            })
        }
        if !(-512..=496).contains(&imm) {
            return Err(EmitError::ImmediateOutOfRange {
                value: imm as i64,
                min: -512,
                max: 496,
            })
        }

        let n = imm as u32;
        let bits = (((n >> 9) & 0x1) << 12)
            | (((n >> 4) & 0x1) << 6)
            | (((n >> 6) & 0x1) << 5)
            | (((n >> 7) & 0x3) << 3)
            | (((n >> 5) & 0x1) << 2);

        self.emit_raw16(enc::ci(0b011, bits, Reg::SP.as_u32(), enc::C_Q1))
    }

    /// Emit C.LUI: load a nonzero sign-extended 6-bit value into
    /// `rd[17:12]`. Reserved for `rd` in `{x0, x2}` and for a zero
    /// immediate.
    pub fn emit_c_lui(&mut self, rd: Reg, imm: i32) -> Result<usize> {
        if rd == Reg::ZERO || rd == Reg::SP {
            return Err(EmitError::InvalidRegister { reg: rd.name() })
        }
        if imm == 0 {
            return Err(EmitError::IllegalOperands {
                reason: "C.LUI with a zero immediate is reserved",
            })
        }
        let imm = check_simm(imm, 6)?;

        self.emit_raw16(enc::ci(0b011, imm6_bits(imm), rd.as_u32(), enc::C_Q1))
    }

    #[inline]
    fn emit_c_shift(&mut self, funct2: u32, rd: Reg, shift: u32) -> Result<usize> {
        let rdc = check_creg(rd)?;
        if shift == 0 {
            return Err(EmitError::IllegalOperands {
                reason: "compressed shift by zero is a reserved encoding",
            })
        }
        if shift > 63 {
            return Err(EmitError::InvalidShiftAmount { shamt: shift, max: 63 })
        }

        let word = (0b100 << 13)
            | (((shift >> 5) & 0x1) << 12)
            | (funct2 << 10)
            | (rdc << 7)
            | ((shift & 0x1F) << 2)
            | enc::C_Q1;

        self.emit_raw16(word as u16)
    }

    /// Emit C.SRLI (`0 < shift < 64`).
    #[inline(always)]
    pub fn emit_c_srli(&mut self, rd: Reg, shift: u32) -> Result<usize> {
        self.emit_c_shift(0b00, rd, shift)
    }

    /// Emit C.SRAI (`0 < shift < 64`).
    #[inline(always)]
    pub fn emit_c_srai(&mut self, rd: Reg, shift: u32) -> Result<usize> {
        self.emit_c_shift(0b01, rd, shift)
    }

    /// Emit C.J referencing a label.
    #[inline(always)]
    pub fn emit_c_j(&mut self, label: LabelId) -> Result<usize> {
        self.emit_with_label(label, |asm, delta| asm.emit_cj_delta(0b101, delta))
    }

    /// Emit C.J with an explicit byte delta in `[-2048, 2046]`.
    #[inline(always)]
    pub fn emit_c_j_offset(&mut self, offset: i32) -> Result<usize> {
        self.emit_cj_delta(0b101, offset as i64)
    }

    /// Emit C.JAL (RV32), linking `ra`.
    #[inline(always)]
    pub fn emit_c_jal(&mut self, label: LabelId) -> Result<usize> {
        self.emit_with_label(label, |asm, delta| asm.emit_cj_delta(0b001, delta))
    }

    /// Emit C.JAL (RV32) with an explicit byte delta.
    #[inline(always)]
    pub fn emit_c_jal_offset(&mut self, offset: i32) -> Result<usize> {
        self.emit_cj_delta(0b001, offset as i64)
    }

    /// Emit the canonical illegal compressed instruction (all zeros).
    #[inline(always)]
    pub fn emit_c_undef(&mut self) -> Result<usize> {
        self.emit_raw16(0x0000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg::FReg::*;
    use crate::reg::Reg::*;

    fn half(f: impl FnOnce(&mut Assembler<'static>)) -> u16 {
        let mut asm = Assembler::new();
        f(&mut asm);
        let b = asm.code();
        u16::from_le_bytes([b[0], b[1]])
    }

    #[test]
    fn quadrant0_encodings() {
        assert_eq!(half(|a| { a.emit_c_addi4spn(A0, 4).unwrap(); }), 0x0048);
        assert_eq!(half(|a| { a.emit_c_lw(A0, 0, A1).unwrap(); }), 0x4188);
        assert_eq!(half(|a| { a.emit_c_sw(A0, 0, A1).unwrap(); }), 0xC188);
        assert_eq!(half(|a| { a.emit_c_ld(A0, 0, A1).unwrap(); }), 0x6188);
        assert_eq!(half(|a| { a.emit_c_sd(A0, 0, A1).unwrap(); }), 0xE188);
        assert_eq!(half(|a| { a.emit_c_fld(FA0, 0, A1).unwrap(); }), 0x2188);
        assert_eq!(half(|a| { a.emit_c_fsd(FA0, 0, A1).unwrap(); }), 0xA188);
        // scrambled offset bits: c.lw with offset 64 lands in bit 5
        assert_eq!(half(|a| { a.emit_c_lw(A0, 64, A1).unwrap(); }), 0x4188 | (1 << 5));
        assert_eq!(half(|a| { a.emit_c_lw(A0, 4, A1).unwrap(); }), 0x4188 | (1 << 6));
    }

    #[test]
    fn quadrant1_encodings() {
        assert_eq!(half(|a| { a.emit_c_nop().unwrap(); }), 0x0001);
        assert_eq!(half(|a| { a.emit_c_addi(A0, 1).unwrap(); }), 0x0505);
        assert_eq!(half(|a| { a.emit_c_addiw(A0, 1).unwrap(); }), 0x2505);
        assert_eq!(half(|a| { a.emit_c_li(A0, 0).unwrap(); }), 0x4501);
        assert_eq!(half(|a| { a.emit_c_li(A0, -1).unwrap(); }), 0x557D);
        assert_eq!(half(|a| { a.emit_c_lui(A0, 1).unwrap(); }), 0x6505);
        assert_eq!(half(|a| { a.emit_c_addi16sp(16).unwrap(); }), 0x6141);
        assert_eq!(half(|a| { a.emit_c_srli(A0, 1).unwrap(); }), 0x8105);
        assert_eq!(half(|a| { a.emit_c_srai(A0, 1).unwrap(); }), 0x8505);
        assert_eq!(half(|a| { a.emit_c_j_offset(0).unwrap(); }), 0xA001);
        assert_eq!(half(|a| { a.emit_c_jal_offset(0).unwrap(); }), 0x2001);
        assert_eq!(half(|a| { a.emit_c_undef().unwrap(); }), 0x0000);
    }

    #[test]
    fn compressed_register_subset_is_enforced() {
        let mut asm = Assembler::new();
        assert!(matches!(
            asm.emit_c_lw(A6, 0, A1),
            Err(EmitError::InvalidRegister { reg: "x16" })
        ));
        assert!(matches!(
            asm.emit_c_lw(A0, 0, T6),
            Err(EmitError::InvalidRegister { reg: "x31" })
        ));
        assert!(asm.emit_c_fld(FT0, 0, A1).is_err());
        assert_eq!(asm.cursor(), 0);
    }

    #[test]
    fn reserved_encodings_are_rejected() {
        let mut asm = Assembler::new();

        // zero immediates reserved by the ISA
        assert!(asm.emit_c_addi4spn(A0, 0).is_err());
        assert!(asm.emit_c_addi16sp(0).is_err());
        assert!(asm.emit_c_lui(A0, 0).is_err());

        // C.ADDI with imm 0 would alias C.NOP
        assert!(matches!(
            asm.emit_c_addi(A0, 0),
            Err(EmitError::IllegalOperands { .. })
        ));
        assert!(asm.emit_c_addi(ZERO, 1).is_err());

        // C.LUI cannot target x0 or x2
        assert!(asm.emit_c_lui(SP, 1).is_err());

        // but C.LI of zero is legal
        asm.emit_c_li(A0, 0).unwrap();
    }

    #[test]
    fn offset_alignment_and_range() {
        let mut asm = Assembler::new();
        assert!(asm.emit_c_lw(A0, 2, A1).is_err());
        assert!(asm.emit_c_lw(A0, 128, A1).is_err());
        assert!(asm.emit_c_ld(A0, 4, A1).is_err());
        assert!(asm.emit_c_addi16sp(8).is_err());
        assert!(asm.emit_c_addi16sp(512).is_err());
        asm.emit_c_addi16sp(-512).unwrap();
        asm.emit_c_addi16sp(496).unwrap();
    }

    #[test]
    fn compressed_shift_bounds() {
        let mut asm = Assembler::new();
        asm.emit_c_srli(A0, 63).unwrap();
        assert!(asm.emit_c_srli(A0, 64).is_err());
        assert!(asm.emit_c_srli(A0, 0).is_err());
        assert!(asm.emit_c_srai(T6, 1).is_err()); // not a compressed register
    }

    #[test]
    fn cj_offset_bounds() {
        let mut asm = Assembler::with_capacity(16);
        asm.emit_c_j_offset(2046).unwrap();
        asm.emit_c_j_offset(-2048).unwrap();
        assert!(asm.emit_c_j_offset(2048).is_err());
        assert!(asm.emit_c_j_offset(-2050).is_err());
        assert!(asm.emit_c_j_offset(3).is_err());
    }

    #[cfg(feature = "rv128")]
    #[test]
    fn quadword_forms() {
        assert_eq!(half(|a| { a.emit_c_lq(A0, 0, A1).unwrap(); }), 0x2188);
        assert_eq!(half(|a| { a.emit_c_sq(A0, 0, A1).unwrap(); }), 0xA188);
        let mut asm = Assembler::new();
        assert!(asm.emit_c_lq(A0, 8, A1).is_err());
        asm.emit_c_lq(A0, 496, A1).unwrap();
    }
}
