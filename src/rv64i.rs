//! RV64I base instruction set additions.

use crate::enc;
use crate::asm::Assembler;
use crate::asm::asm::{check_simm, check_shamt};
use crate::asm::errors::Result;
use crate::reg::Reg;
use crate::util::misc;

impl Assembler<'_> {
    // ----- 64-BIT LOAD/STORE -----

    /// Emit load doubleword (LD).
    #[inline(always)]
    pub fn emit_ld(&mut self, rd: Reg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD, rd.as_u32(), 0b011, rs.as_u32(), imm)
    }

    /// Emit load word unsigned (LWU).
    #[inline(always)]
    pub fn emit_lwu(&mut self, rd: Reg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD, rd.as_u32(), 0b110, rs.as_u32(), imm)
    }

    /// Emit store doubleword (SD).
    #[inline(always)]
    pub fn emit_sd(&mut self, rs2: Reg, imm: i32, rs1: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_s(enc::OPC_STORE, 0b011, rs1.as_u32(), rs2.as_u32(), imm)
    }

    // ----- WORD-WIDTH ARITHMETIC -----

    /// Emit ADDIW: 32-bit add immediate, sign-extended to 64 bits.
    #[inline(always)]
    pub fn emit_addiw(&mut self, rd: Reg, rs: Reg, imm: i32) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_OP_IMM32, rd.as_u32(), 0b000, rs.as_u32(), imm)
    }

    /// Emit ADDW: 32-bit add, sign-extended to 64 bits.
    #[inline(always)]
    pub fn emit_addw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    /// Emit SUBW: 32-bit subtract, sign-extended to 64 bits.
    #[inline(always)]
    pub fn emit_subw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0b0100000)
    }

    // ----- SHIFTS -----

    #[inline(always)]
    pub fn emit_sllw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    #[inline(always)]
    pub fn emit_srlw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b101, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    #[inline(always)]
    pub fn emit_sraw(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP32, rd.as_u32(), 0b101, rs1.as_u32(), rs2.as_u32(), 0b0100000)
    }

    /// Emit SLLI with a 64-bit operand width (`shift < 64`); the sixth
    /// shift bit overlays the low funct7 bit.
    #[inline(always)]
    pub fn emit_slli64(&mut self, rd: Reg, rs: Reg, shift: u32) -> Result<usize> {
        let shift = check_shamt(shift, 64)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b001, rs.as_u32(), shift as i32)
    }

    /// Emit SRLI with a 64-bit operand width (`shift < 64`).
    #[inline(always)]
    pub fn emit_srli64(&mut self, rd: Reg, rs: Reg, shift: u32) -> Result<usize> {
        let shift = check_shamt(shift, 64)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b101, rs.as_u32(), shift as i32)
    }

    /// Emit SRAI with a 64-bit operand width (`shift < 64`).
    #[inline(always)]
    pub fn emit_srai64(&mut self, rd: Reg, rs: Reg, shift: u32) -> Result<usize> {
        let shift = check_shamt(shift, 64)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b101, rs.as_u32(), (0x400 | shift) as i32)
    }

    /// Emit SLLIW (`shift < 32`), sign-extending the 32-bit result.
    #[inline(always)]
    pub fn emit_slliw(&mut self, rd: Reg, rs: Reg, shift: u32) -> Result<usize> {
        let shift = check_shamt(shift, 32)?;
        self.emit_i(enc::OPC_OP_IMM32, rd.as_u32(), 0b001, rs.as_u32(), shift as i32)
    }

    /// Emit SRLIW (`shift < 32`).
    #[inline(always)]
    pub fn emit_srliw(&mut self, rd: Reg, rs: Reg, shift: u32) -> Result<usize> {
        let shift = check_shamt(shift, 32)?;
        self.emit_i(enc::OPC_OP_IMM32, rd.as_u32(), 0b101, rs.as_u32(), shift as i32)
    }

    /// Emit SRAIW (`shift < 32`).
    #[inline(always)]
    pub fn emit_sraiw(&mut self, rd: Reg, rs: Reg, shift: u32) -> Result<usize> {
        let shift = check_shamt(shift, 32)?;
        self.emit_i(enc::OPC_OP_IMM32, rd.as_u32(), 0b101, rs.as_u32(), (0x400 | shift) as i32)
    }

    // ----- PSEUDO OPS -----

    /// Load a 64-bit immediate (pseudo-instruction). Constants that fit
    /// 32 bits expand to ADDI or LUI+ADDI; wider ones peel twelve bits
    /// at a time: materialize the upper part, SLLI by 12, ADDI the next
    /// chunk. Returns the offset of the first emitted instruction.
    pub fn emit_li64(&mut self, rd: Reg, imm: i64) -> Result<usize> {
        if misc::fits_signed(imm, 32) {
            return self.emit_li32(rd, imm as i32)
        }

        // remainder after rounding lands in [-2048, 2047]
        let hi52 = imm.wrapping_add(0x800) >> 12;
        let lo12 = imm.wrapping_sub(hi52 << 12);

        let site = self.emit_li64(rd, hi52)?;
        self.emit_slli64(rd, rd, 12)?;
        if lo12 != 0 {
            self.emit_addi(rd, rd, lo12 as i32)?;
        }

        Ok(site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg::Reg::*;

    fn word(f: impl FnOnce(&mut Assembler<'static>)) -> u32 {
        let mut asm = Assembler::new();
        f(&mut asm);
        let b = asm.code();
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    #[test]
    fn word_width_encodings() {
        assert_eq!(word(|a| { a.emit_addw(A0, A1, A2).unwrap(); }), 0x00C5853B);
        assert_eq!(word(|a| { a.emit_subw(A0, A1, A2).unwrap(); }), 0x40C5853B);
        assert_eq!(word(|a| { a.emit_sllw(A0, A1, A2).unwrap(); }), 0x00C5953B);
        assert_eq!(word(|a| { a.emit_srlw(A0, A1, A2).unwrap(); }), 0x00C5D53B);
        assert_eq!(word(|a| { a.emit_sraw(A0, A1, A2).unwrap(); }), 0x40C5D53B);
        assert_eq!(word(|a| { a.emit_addiw(A0, A1, 42).unwrap(); }), 0x02A5851B);
    }

    #[test]
    fn loads_and_stores() {
        assert_eq!(word(|a| { a.emit_ld(A0, 0, SP).unwrap(); }), 0x00013503);
        assert_eq!(word(|a| { a.emit_sd(A0, 0, SP).unwrap(); }), 0x00A13023);
        assert_eq!(word(|a| { a.emit_lwu(A0, 0, SP).unwrap(); }), 0x00016503);
    }

    #[test]
    fn immediate_shifts() {
        assert_eq!(word(|a| { a.emit_slliw(A0, A1, 4).unwrap(); }), 0x0045951B);
        assert_eq!(word(|a| { a.emit_srliw(A0, A1, 4).unwrap(); }), 0x0045D51B);
        assert_eq!(word(|a| { a.emit_sraiw(A0, A1, 4).unwrap(); }), 0x4045D51B);
        // the sixth shamt bit lands in imm[25]
        assert_eq!(word(|a| { a.emit_slli64(A0, A1, 63).unwrap(); }), 0x03F59513);
    }

    #[test]
    fn shift_boundaries() {
        let mut asm = Assembler::new();
        asm.emit_slli64(A0, A1, 63).unwrap();
        assert!(asm.emit_slli64(A0, A1, 64).is_err());
        asm.emit_sraiw(A0, A1, 31).unwrap();
        assert!(asm.emit_sraiw(A0, A1, 32).is_err());
    }

    #[test]
    fn li64_small_and_medium() {
        let mut asm = Assembler::new();
        asm.emit_li64(A0, 42).unwrap();
        assert_eq!(asm.cursor(), 4);

        let mut asm = Assembler::new();
        asm.emit_li64(A1, 0x12345).unwrap();
        let b = asm.code();
        assert_eq!(&b[..4], &0x000125B7u32.to_le_bytes()); // lui a1, 0x12
        assert_eq!(&b[4..8], &0x34558593u32.to_le_bytes()); // addi a1, a1, 0x345
    }

    #[test]
    fn li64_negative_small() {
        let mut asm = Assembler::new();
        asm.emit_li64(A0, -1).unwrap();
        assert_eq!(asm.cursor(), 4);
        let b = asm.code();
        assert_eq!(&b[..4], &0xFFF00513u32.to_le_bytes()); // addi a0, zero, -1
    }

    #[test]
    fn li64_wide() {
        // 1 << 34: lui a0, 0x400 then slli a0, a0, 12
        let mut asm = Assembler::new();
        asm.emit_li64(A0, 1 << 34).unwrap();
        let b = asm.code();
        assert_eq!(asm.cursor(), 8);
        assert_eq!(&b[..4], &0x00400537u32.to_le_bytes());
        assert_eq!(&b[4..8], &0x00C51513u32.to_le_bytes());
    }
}
