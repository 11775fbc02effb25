//! Zicsr extension: CSR access instructions and their read/write
//! shorthands.

use crate::enc;
use crate::asm::Assembler;
use crate::asm::asm::check_uimm;
use crate::asm::errors::Result;
use crate::reg::{Csr, Reg};

impl Assembler<'_> {
    /// All CSR instructions are I-type SYSTEM words with the CSR address
    /// in `imm[31:20]` and either a register or a 5-bit immediate in the
    /// rs1 field.
    #[inline(always)]
    fn emit_csr_op(&mut self, rd: Reg, csr: Csr, rs1_field: u32, funct3: u32) -> Result<usize> {
        self.emit_i(
            enc::OPC_SYSTEM,
            rd.as_u32(),
            funct3,
            rs1_field,
            csr.as_u32() as i32
        )
    }

    /// Emit CSRRW: atomically swap `csr` with `rs`.
    #[inline(always)]
    pub fn emit_csrrw(&mut self, rd: Reg, csr: Csr, rs: Reg) -> Result<usize> {
        self.emit_csr_op(rd, csr, rs.as_u32(), 0b001)
    }

    /// Emit CSRRS: read `csr`, set the bits of `rs`.
    #[inline(always)]
    pub fn emit_csrrs(&mut self, rd: Reg, csr: Csr, rs: Reg) -> Result<usize> {
        self.emit_csr_op(rd, csr, rs.as_u32(), 0b010)
    }

    /// Emit CSRRC: read `csr`, clear the bits of `rs`.
    #[inline(always)]
    pub fn emit_csrrc(&mut self, rd: Reg, csr: Csr, rs: Reg) -> Result<usize> {
        self.emit_csr_op(rd, csr, rs.as_u32(), 0b011)
    }

    /// Emit CSRRWI with a 5-bit immediate.
    #[inline(always)]
    pub fn emit_csrrwi(&mut self, rd: Reg, csr: Csr, imm: u32) -> Result<usize> {
        let imm = check_uimm(imm, 5)?;
        self.emit_csr_op(rd, csr, imm, 0b101)
    }

    /// Emit CSRRSI with a 5-bit immediate.
    #[inline(always)]
    pub fn emit_csrrsi(&mut self, rd: Reg, csr: Csr, imm: u32) -> Result<usize> {
        let imm = check_uimm(imm, 5)?;
        self.emit_csr_op(rd, csr, imm, 0b110)
    }

    /// Emit CSRRCI with a 5-bit immediate.
    #[inline(always)]
    pub fn emit_csrrci(&mut self, rd: Reg, csr: Csr, imm: u32) -> Result<usize> {
        let imm = check_uimm(imm, 5)?;
        self.emit_csr_op(rd, csr, imm, 0b111)
    }

    // ----- READ/WRITE SHORTHANDS (x0 on the unused side) -----

    /// Read `csr` (CSRRS rd, csr, x0).
    #[inline(always)]
    pub fn emit_csrr(&mut self, rd: Reg, csr: Csr) -> Result<usize> {
        self.emit_csrrs(rd, csr, Reg::ZERO)
    }

    /// Write `csr` discarding the old value (CSRRW x0, csr, rs).
    #[inline(always)]
    pub fn emit_cswr(&mut self, csr: Csr, rs: Reg) -> Result<usize> {
        self.emit_csrrw(Reg::ZERO, csr, rs)
    }

    /// Set bits in `csr` (CSRRS x0, csr, rs).
    #[inline(always)]
    pub fn emit_csrs(&mut self, csr: Csr, rs: Reg) -> Result<usize> {
        self.emit_csrrs(Reg::ZERO, csr, rs)
    }

    /// Clear bits in `csr` (CSRRC x0, csr, rs).
    #[inline(always)]
    pub fn emit_csrc(&mut self, csr: Csr, rs: Reg) -> Result<usize> {
        self.emit_csrrc(Reg::ZERO, csr, rs)
    }

    /// Write an immediate into `csr` (CSRRWI x0, csr, imm).
    #[inline(always)]
    pub fn emit_csrwi(&mut self, csr: Csr, imm: u32) -> Result<usize> {
        self.emit_csrrwi(Reg::ZERO, csr, imm)
    }

    /// Set immediate bits in `csr` (CSRRSI x0, csr, imm).
    #[inline(always)]
    pub fn emit_csrsi(&mut self, csr: Csr, imm: u32) -> Result<usize> {
        self.emit_csrrsi(Reg::ZERO, csr, imm)
    }

    /// Clear immediate bits in `csr` (CSRRCI x0, csr, imm).
    #[inline(always)]
    pub fn emit_csrci(&mut self, csr: Csr, imm: u32) -> Result<usize> {
        self.emit_csrrci(Reg::ZERO, csr, imm)
    }

    // ----- FP CSR HELPERS -----

    /// Read `fcsr`.
    #[inline(always)]
    pub fn emit_frcsr(&mut self, rd: Reg) -> Result<usize> {
        self.emit_csrrs(rd, Csr::FCSR, Reg::ZERO)
    }

    /// Swap `fcsr` with `rs`, old value into `rd`.
    #[inline(always)]
    pub fn emit_fscsr(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_csrrw(rd, Csr::FCSR, rs)
    }

    /// Read the dynamic rounding mode.
    #[inline(always)]
    pub fn emit_frrm(&mut self, rd: Reg) -> Result<usize> {
        self.emit_csrrs(rd, Csr::FRM, Reg::ZERO)
    }

    /// Swap the dynamic rounding mode with `rs`, old value into `rd`.
    #[inline(always)]
    pub fn emit_fsrm(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_csrrw(rd, Csr::FRM, rs)
    }

    /// Write an immediate rounding mode, old value into `rd`.
    #[inline(always)]
    pub fn emit_fsrmi(&mut self, rd: Reg, imm: u32) -> Result<usize> {
        self.emit_csrrwi(rd, Csr::FRM, imm)
    }

    /// Read the accrued exception flags.
    #[inline(always)]
    pub fn emit_frflags(&mut self, rd: Reg) -> Result<usize> {
        self.emit_csrrs(rd, Csr::FFLAGS, Reg::ZERO)
    }

    /// Swap the accrued exception flags with `rs`, old value into `rd`.
    #[inline(always)]
    pub fn emit_fsflags(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_csrrw(rd, Csr::FFLAGS, rs)
    }

    /// Write immediate exception flags, old value into `rd`.
    #[inline(always)]
    pub fn emit_fsflagsi(&mut self, rd: Reg, imm: u32) -> Result<usize> {
        self.emit_csrrwi(rd, Csr::FFLAGS, imm)
    }

    // ----- COUNTER READS -----

    /// Read the cycle counter.
    #[inline(always)]
    pub fn emit_rdcycle(&mut self, rd: Reg) -> Result<usize> {
        self.emit_csrrs(rd, Csr::CYCLE, Reg::ZERO)
    }

    /// Read the upper half of the cycle counter (RV32).
    #[inline(always)]
    pub fn emit_rdcycleh(&mut self, rd: Reg) -> Result<usize> {
        self.emit_csrrs(rd, Csr::CYCLEH, Reg::ZERO)
    }

    /// Read the timer.
    #[inline(always)]
    pub fn emit_rdtime(&mut self, rd: Reg) -> Result<usize> {
        self.emit_csrrs(rd, Csr::TIME, Reg::ZERO)
    }

    /// Read the upper half of the timer (RV32).
    #[inline(always)]
    pub fn emit_rdtimeh(&mut self, rd: Reg) -> Result<usize> {
        self.emit_csrrs(rd, Csr::TIMEH, Reg::ZERO)
    }

    /// Read the instructions-retired counter.
    #[inline(always)]
    pub fn emit_rdinstret(&mut self, rd: Reg) -> Result<usize> {
        self.emit_csrrs(rd, Csr::INSTRET, Reg::ZERO)
    }

    /// Read the upper half of the instructions-retired counter (RV32).
    #[inline(always)]
    pub fn emit_rdinstreth(&mut self, rd: Reg) -> Result<usize> {
        self.emit_csrrs(rd, Csr::INSTRETH, Reg::ZERO)
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

    // T6 is x31, A5 is x15 throughout.

    #[test]
    fn csrrc_grid() {
        assert_eq!(word(|a| { a.emit_csrrc(T6, Csr::CYCLE, A5).unwrap(); }), 0xC007BFF3);
        assert_eq!(word(|a| { a.emit_csrrc(T6, Csr::FFLAGS, A5).unwrap(); }), 0x0017BFF3);
        assert_eq!(word(|a| { a.emit_csrrc(T6, Csr::FRM, A5).unwrap(); }), 0x0027BFF3);
        assert_eq!(word(|a| { a.emit_csrrc(T6, Csr::FCSR, A5).unwrap(); }), 0x0037BFF3);
    }

    #[test]
    fn csrrci_grid() {
        assert_eq!(word(|a| { a.emit_csrrci(T6, Csr::CYCLE, 0).unwrap(); }), 0xC0007FF3);
        assert_eq!(word(|a| { a.emit_csrrci(T6, Csr::FFLAGS, 0x1F).unwrap(); }), 0x001FFFF3);
        assert_eq!(word(|a| { a.emit_csrrci(T6, Csr::FRM, 0x7).unwrap(); }), 0x0023FFF3);
    }

    #[test]
    fn csrrs_grid() {
        assert_eq!(word(|a| { a.emit_csrrs(T6, Csr::CYCLE, A5).unwrap(); }), 0xC007AFF3);
        assert_eq!(word(|a| { a.emit_csrrs(T6, Csr::FFLAGS, A5).unwrap(); }), 0x0017AFF3);
        assert_eq!(word(|a| { a.emit_csrrs(T6, Csr::FRM, A5).unwrap(); }), 0x0027AFF3);
        assert_eq!(word(|a| { a.emit_csrrs(T6, Csr::FCSR, A5).unwrap(); }), 0x0037AFF3);
    }

    #[test]
    fn csrrsi_grid() {
        assert_eq!(word(|a| { a.emit_csrrsi(T6, Csr::CYCLE, 0).unwrap(); }), 0xC0006FF3);
        assert_eq!(word(|a| { a.emit_csrrsi(T6, Csr::FFLAGS, 0x1F).unwrap(); }), 0x001FEFF3);
        assert_eq!(word(|a| { a.emit_csrrsi(T6, Csr::FRM, 0x7).unwrap(); }), 0x0023EFF3);
    }

    #[test]
    fn csrrw_grid() {
        assert_eq!(word(|a| { a.emit_csrrw(T6, Csr::CYCLE, A5).unwrap(); }), 0xC0079FF3);
        assert_eq!(word(|a| { a.emit_csrrw(T6, Csr::FFLAGS, A5).unwrap(); }), 0x00179FF3);
        assert_eq!(word(|a| { a.emit_csrrw(T6, Csr::FRM, A5).unwrap(); }), 0x00279FF3);
        assert_eq!(word(|a| { a.emit_csrrw(T6, Csr::FCSR, A5).unwrap(); }), 0x00379FF3);
    }

    #[test]
    fn csrrwi_grid() {
        assert_eq!(word(|a| { a.emit_csrrwi(T6, Csr::CYCLE, 0).unwrap(); }), 0xC0005FF3);
        assert_eq!(word(|a| { a.emit_csrrwi(T6, Csr::FFLAGS, 0x1F).unwrap(); }), 0x001FDFF3);
        assert_eq!(word(|a| { a.emit_csrrwi(T6, Csr::FRM, 0x7).unwrap(); }), 0x0023DFF3);
    }

    #[test]
    fn uimm5_range() {
        let mut asm = Assembler::new();
        asm.emit_csrrwi(T6, Csr::FRM, 31).unwrap();
        assert!(asm.emit_csrrwi(T6, Csr::FRM, 32).is_err());
    }

    #[test]
    fn shorthands_match_canonical() {
        assert_eq!(
            word(|a| { a.emit_csrr(A0, Csr::FCSR).unwrap(); }),
            word(|a| { a.emit_csrrs(A0, Csr::FCSR, ZERO).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_cswr(Csr::FCSR, A0).unwrap(); }),
            word(|a| { a.emit_csrrw(ZERO, Csr::FCSR, A0).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_csrs(Csr::FFLAGS, A0).unwrap(); }),
            word(|a| { a.emit_csrrs(ZERO, Csr::FFLAGS, A0).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_csrc(Csr::FFLAGS, A0).unwrap(); }),
            word(|a| { a.emit_csrrc(ZERO, Csr::FFLAGS, A0).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_csrwi(Csr::FRM, 3).unwrap(); }),
            word(|a| { a.emit_csrrwi(ZERO, Csr::FRM, 3).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_frcsr(A0).unwrap(); }),
            word(|a| { a.emit_csrr(A0, Csr::FCSR).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_rdcycle(A0).unwrap(); }),
            word(|a| { a.emit_csrrs(A0, Csr::CYCLE, ZERO).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_rdtimeh(A0).unwrap(); }),
            word(|a| { a.emit_csrrs(A0, Csr::TIMEH, ZERO).unwrap(); })
        );
    }
}
