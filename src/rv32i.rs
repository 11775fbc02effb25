//! RV32I base instruction set, Zifencei, and the integer pseudo-instructions.

use crate::enc;
use crate::asm::Assembler;
use crate::asm::asm::{check_simm, check_uimm, check_shamt};
use crate::asm::errors::Result;
use crate::asm::label::LabelId;
use crate::reg::{FenceOrder, Reg};
use crate::util::misc;

impl Assembler<'_> {
    // ----- ARITHMETIC OPERATIONS -----

    /// Emit ADD.
    #[inline(always)]
    pub fn emit_add(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    /// Emit SUB.
    #[inline(always)]
    pub fn emit_sub(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b000, rs1.as_u32(), rs2.as_u32(), 0b0100000)
    }

    /// Emit ADDI. `imm` is a signed 12-bit value.
    #[inline(always)]
    pub fn emit_addi(&mut self, rd: Reg, rs: Reg, imm: i32) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b000, rs.as_u32(), imm)
    }

    /// Emit LUI with the raw 20-bit value for `imm[31:12]`.
    #[inline(always)]
    pub fn emit_lui(&mut self, rd: Reg, imm: u32) -> Result<usize> {
        let imm = check_uimm(imm, 20)?;
        self.emit_u(enc::OPC_LUI, rd.as_u32(), imm)
    }

    /// Emit AUIPC with the raw 20-bit value for `imm[31:12]`.
    #[inline(always)]
    pub fn emit_auipc(&mut self, rd: Reg, imm: u32) -> Result<usize> {
        let imm = check_uimm(imm, 20)?;
        self.emit_u(enc::OPC_AUIPC, rd.as_u32(), imm)
    }

    // ----- LOGICAL OPERATIONS -----

    #[inline(always)]
    pub fn emit_and(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b111, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    #[inline(always)]
    pub fn emit_or(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b110, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    #[inline(always)]
    pub fn emit_xor(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b100, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    #[inline(always)]
    pub fn emit_andi(&mut self, rd: Reg, rs: Reg, imm: i32) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b111, rs.as_u32(), imm)
    }

    #[inline(always)]
    pub fn emit_ori(&mut self, rd: Reg, rs: Reg, imm: i32) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b110, rs.as_u32(), imm)
    }

    #[inline(always)]
    pub fn emit_xori(&mut self, rd: Reg, rs: Reg, imm: i32) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b100, rs.as_u32(), imm)
    }

    // ----- SHIFT OPERATIONS -----

    #[inline(always)]
    pub fn emit_sll(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b001, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    #[inline(always)]
    pub fn emit_srl(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b101, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    #[inline(always)]
    pub fn emit_sra(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b101, rs1.as_u32(), rs2.as_u32(), 0b0100000)
    }

    /// Emit SLLI with a 32-bit operand width (`shift < 32`).
    #[inline(always)]
    pub fn emit_slli(&mut self, rd: Reg, rs: Reg, shift: u32) -> Result<usize> {
        let shift = check_shamt(shift, 32)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b001, rs.as_u32(), shift as i32)
    }

    /// Emit SRLI with a 32-bit operand width (`shift < 32`).
    #[inline(always)]
    pub fn emit_srli(&mut self, rd: Reg, rs: Reg, shift: u32) -> Result<usize> {
        let shift = check_shamt(shift, 32)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b101, rs.as_u32(), shift as i32)
    }

    /// Emit SRAI with a 32-bit operand width (`shift < 32`).
    #[inline(always)]
    pub fn emit_srai(&mut self, rd: Reg, rs: Reg, shift: u32) -> Result<usize> {
        let shift = check_shamt(shift, 32)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b101, rs.as_u32(), (0x400 | shift) as i32)
    }

    // ----- COMPARISON OPERATIONS -----

    #[inline(always)]
    pub fn emit_slt(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b010, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    #[inline(always)]
    pub fn emit_sltu(&mut self, rd: Reg, rs1: Reg, rs2: Reg) -> Result<usize> {
        self.emit_r(enc::OPC_OP, rd.as_u32(), 0b011, rs1.as_u32(), rs2.as_u32(), 0b0000000)
    }

    #[inline(always)]
    pub fn emit_slti(&mut self, rd: Reg, rs: Reg, imm: i32) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b010, rs.as_u32(), imm)
    }

    /// Emit SLTIU. The immediate is sign-extended to the operand width
    /// first, then compared unsigned.
    #[inline(always)]
    pub fn emit_sltiu(&mut self, rd: Reg, rs: Reg, imm: i32) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_OP_IMM, rd.as_u32(), 0b011, rs.as_u32(), imm)
    }

    // ----- LOAD/STORE OPERATIONS -----

    /// Emit load byte (LB).
    #[inline(always)]
    pub fn emit_lb(&mut self, rd: Reg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD, rd.as_u32(), 0b000, rs.as_u32(), imm)
    }

    /// Emit load byte unsigned (LBU).
    #[inline(always)]
    pub fn emit_lbu(&mut self, rd: Reg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD, rd.as_u32(), 0b100, rs.as_u32(), imm)
    }

    /// Emit load halfword (LH).
    #[inline(always)]
    pub fn emit_lh(&mut self, rd: Reg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD, rd.as_u32(), 0b001, rs.as_u32(), imm)
    }

    /// Emit load halfword unsigned (LHU).
    #[inline(always)]
    pub fn emit_lhu(&mut self, rd: Reg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD, rd.as_u32(), 0b101, rs.as_u32(), imm)
    }

    /// Emit load word (LW).
    #[inline(always)]
    pub fn emit_lw(&mut self, rd: Reg, imm: i32, rs: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_LOAD, rd.as_u32(), 0b010, rs.as_u32(), imm)
    }

    /// Emit store byte (SB).
    #[inline(always)]
    pub fn emit_sb(&mut self, rs2: Reg, imm: i32, rs1: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_s(enc::OPC_STORE, 0b000, rs1.as_u32(), rs2.as_u32(), imm)
    }

    /// Emit store halfword (SH).
    #[inline(always)]
    pub fn emit_sh(&mut self, rs2: Reg, imm: i32, rs1: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_s(enc::OPC_STORE, 0b001, rs1.as_u32(), rs2.as_u32(), imm)
    }

    /// Emit store word (SW).
    #[inline(always)]
    pub fn emit_sw(&mut self, rs2: Reg, imm: i32, rs1: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_s(enc::OPC_STORE, 0b010, rs1.as_u32(), rs2.as_u32(), imm)
    }

    // ----- BRANCHING OPERATIONS -----

    #[inline(always)]
    pub fn emit_beq(&mut self, rs1: Reg, rs2: Reg, label: LabelId) -> Result<usize> {
        self.emit_with_label(label, |asm, delta| asm.emit_b_delta(0b000, rs1, rs2, delta))
    }

    #[inline(always)]
    pub fn emit_bne(&mut self, rs1: Reg, rs2: Reg, label: LabelId) -> Result<usize> {
        self.emit_with_label(label, |asm, delta| asm.emit_b_delta(0b001, rs1, rs2, delta))
    }

    #[inline(always)]
    pub fn emit_blt(&mut self, rs1: Reg, rs2: Reg, label: LabelId) -> Result<usize> {
        self.emit_with_label(label, |asm, delta| asm.emit_b_delta(0b100, rs1, rs2, delta))
    }

    #[inline(always)]
    pub fn emit_bge(&mut self, rs1: Reg, rs2: Reg, label: LabelId) -> Result<usize> {
        self.emit_with_label(label, |asm, delta| asm.emit_b_delta(0b101, rs1, rs2, delta))
    }

    #[inline(always)]
    pub fn emit_bltu(&mut self, rs1: Reg, rs2: Reg, label: LabelId) -> Result<usize> {
        self.emit_with_label(label, |asm, delta| asm.emit_b_delta(0b110, rs1, rs2, delta))
    }

    #[inline(always)]
    pub fn emit_bgeu(&mut self, rs1: Reg, rs2: Reg, label: LabelId) -> Result<usize> {
        self.emit_with_label(label, |asm, delta| asm.emit_b_delta(0b111, rs1, rs2, delta))
    }

    /// Emit BEQ with an explicit byte delta from this instruction.
    #[inline(always)]
    pub fn emit_beq_offset(&mut self, rs1: Reg, rs2: Reg, imm: i32) -> Result<usize> {
        self.emit_b_delta(0b000, rs1, rs2, imm as i64)
    }

    #[inline(always)]
    pub fn emit_bne_offset(&mut self, rs1: Reg, rs2: Reg, imm: i32) -> Result<usize> {
        self.emit_b_delta(0b001, rs1, rs2, imm as i64)
    }

    #[inline(always)]
    pub fn emit_blt_offset(&mut self, rs1: Reg, rs2: Reg, imm: i32) -> Result<usize> {
        self.emit_b_delta(0b100, rs1, rs2, imm as i64)
    }

    #[inline(always)]
    pub fn emit_bge_offset(&mut self, rs1: Reg, rs2: Reg, imm: i32) -> Result<usize> {
        self.emit_b_delta(0b101, rs1, rs2, imm as i64)
    }

    #[inline(always)]
    pub fn emit_bltu_offset(&mut self, rs1: Reg, rs2: Reg, imm: i32) -> Result<usize> {
        self.emit_b_delta(0b110, rs1, rs2, imm as i64)
    }

    #[inline(always)]
    pub fn emit_bgeu_offset(&mut self, rs1: Reg, rs2: Reg, imm: i32) -> Result<usize> {
        self.emit_b_delta(0b111, rs1, rs2, imm as i64)
    }

    // --- PSEUDO BRANCHES (x0 operand or swapped operands) ---

    /// Branch if `rs == 0` (BEQ rs, x0).
    #[inline(always)]
    pub fn emit_beqz(&mut self, rs: Reg, label: LabelId) -> Result<usize> {
        self.emit_beq(rs, Reg::ZERO, label)
    }

    /// Branch if `rs != 0` (BNE rs, x0).
    #[inline(always)]
    pub fn emit_bnez(&mut self, rs: Reg, label: LabelId) -> Result<usize> {
        self.emit_bne(rs, Reg::ZERO, label)
    }

    /// Branch if `rs <= 0` (BGE x0, rs).
    #[inline(always)]
    pub fn emit_blez(&mut self, rs: Reg, label: LabelId) -> Result<usize> {
        self.emit_bge(Reg::ZERO, rs, label)
    }

    /// Branch if `rs >= 0` (BGE rs, x0).
    #[inline(always)]
    pub fn emit_bgez(&mut self, rs: Reg, label: LabelId) -> Result<usize> {
        self.emit_bge(rs, Reg::ZERO, label)
    }

    /// Branch if `rs < 0` (BLT rs, x0).
    #[inline(always)]
    pub fn emit_bltz(&mut self, rs: Reg, label: LabelId) -> Result<usize> {
        self.emit_blt(rs, Reg::ZERO, label)
    }

    /// Branch if `rs > 0` (BLT x0, rs).
    #[inline(always)]
    pub fn emit_bgtz(&mut self, rs: Reg, label: LabelId) -> Result<usize> {
        self.emit_blt(Reg::ZERO, rs, label)
    }

    /// Branch if `rs > rt`, via BLT with swapped operands.
    #[inline(always)]
    pub fn emit_bgt(&mut self, rs: Reg, rt: Reg, label: LabelId) -> Result<usize> {
        self.emit_blt(rt, rs, label)
    }

    /// Branch if `rs <= rt`, via BGE with swapped operands.
    #[inline(always)]
    pub fn emit_ble(&mut self, rs: Reg, rt: Reg, label: LabelId) -> Result<usize> {
        self.emit_bge(rt, rs, label)
    }

    /// Branch if `rs > rt` unsigned, via BLTU with swapped operands.
    #[inline(always)]
    pub fn emit_bgtu(&mut self, rs: Reg, rt: Reg, label: LabelId) -> Result<usize> {
        self.emit_bltu(rt, rs, label)
    }

    /// Branch if `rs <= rt` unsigned, via BGEU with swapped operands.
    #[inline(always)]
    pub fn emit_bleu(&mut self, rs: Reg, rt: Reg, label: LabelId) -> Result<usize> {
        self.emit_bgeu(rt, rs, label)
    }

    #[inline(always)]
    pub fn emit_beqz_offset(&mut self, rs: Reg, imm: i32) -> Result<usize> {
        self.emit_beq_offset(rs, Reg::ZERO, imm)
    }

    #[inline(always)]
    pub fn emit_bnez_offset(&mut self, rs: Reg, imm: i32) -> Result<usize> {
        self.emit_bne_offset(rs, Reg::ZERO, imm)
    }

    #[inline(always)]
    pub fn emit_blez_offset(&mut self, rs: Reg, imm: i32) -> Result<usize> {
        self.emit_bge_offset(Reg::ZERO, rs, imm)
    }

    #[inline(always)]
    pub fn emit_bgez_offset(&mut self, rs: Reg, imm: i32) -> Result<usize> {
        self.emit_bge_offset(rs, Reg::ZERO, imm)
    }

    #[inline(always)]
    pub fn emit_bltz_offset(&mut self, rs: Reg, imm: i32) -> Result<usize> {
        self.emit_blt_offset(rs, Reg::ZERO, imm)
    }

    #[inline(always)]
    pub fn emit_bgtz_offset(&mut self, rs: Reg, imm: i32) -> Result<usize> {
        self.emit_blt_offset(Reg::ZERO, rs, imm)
    }

    #[inline(always)]
    pub fn emit_bgt_offset(&mut self, rs: Reg, rt: Reg, imm: i32) -> Result<usize> {
        self.emit_blt_offset(rt, rs, imm)
    }

    #[inline(always)]
    pub fn emit_ble_offset(&mut self, rs: Reg, rt: Reg, imm: i32) -> Result<usize> {
        self.emit_bge_offset(rt, rs, imm)
    }

    #[inline(always)]
    pub fn emit_bgtu_offset(&mut self, rs: Reg, rt: Reg, imm: i32) -> Result<usize> {
        self.emit_bltu_offset(rt, rs, imm)
    }

    #[inline(always)]
    pub fn emit_bleu_offset(&mut self, rs: Reg, rt: Reg, imm: i32) -> Result<usize> {
        self.emit_bgeu_offset(rt, rs, imm)
    }

    // ----- JUMP OPERATIONS -----

    /// Emit JAL.
    #[inline(always)]
    pub fn emit_jal(&mut self, rd: Reg, label: LabelId) -> Result<usize> {
        self.emit_with_label(label, |asm, delta| asm.emit_j_delta(rd, delta))
    }

    /// Emit JAL with an explicit byte delta.
    #[inline(always)]
    pub fn emit_jal_offset(&mut self, rd: Reg, imm: i32) -> Result<usize> {
        self.emit_j_delta(rd, imm as i64)
    }

    /// Jump and link through `ra` (JAL x1).
    #[inline(always)]
    pub fn emit_jal_ra(&mut self, label: LabelId) -> Result<usize> {
        self.emit_jal(Reg::RA, label)
    }

    /// Jump without linking (pseudo-instruction: JAL x0).
    #[inline(always)]
    pub fn emit_j(&mut self, label: LabelId) -> Result<usize> {
        self.emit_jal(Reg::ZERO, label)
    }

    /// Jump without linking, explicit byte delta.
    #[inline(always)]
    pub fn emit_j_offset(&mut self, imm: i32) -> Result<usize> {
        self.emit_jal_offset(Reg::ZERO, imm)
    }

    /// Emit JALR.
    #[inline(always)]
    pub fn emit_jalr(&mut self, rd: Reg, imm: i32, rs1: Reg) -> Result<usize> {
        let imm = check_simm(imm, 12)?;
        self.emit_i(enc::OPC_JALR, rd.as_u32(), 0b000, rs1.as_u32(), imm)
    }

    /// Indirect call through `rs` linking `ra` (JALR x1, 0, rs).
    #[inline(always)]
    pub fn emit_jalr_ra(&mut self, rs: Reg) -> Result<usize> {
        self.emit_jalr(Reg::RA, 0, rs)
    }

    /// Indirect jump (pseudo-instruction: JALR x0, 0, rs).
    #[inline(always)]
    pub fn emit_jr(&mut self, rs: Reg) -> Result<usize> {
        self.emit_jalr(Reg::ZERO, 0, rs)
    }

    /// Return from function (pseudo-instruction: JALR x0, 0, ra).
    #[inline(always)]
    pub fn emit_ret(&mut self) -> Result<usize> {
        self.emit_jalr(Reg::ZERO, 0, Reg::RA)
    }

    // ----- SYSTEM AND FENCES -----

    #[inline(always)]
    pub fn emit_ecall(&mut self) -> Result<usize> {
        self.emit_raw32(0x0000_0073)
    }

    #[inline(always)]
    pub fn emit_ebreak(&mut self) -> Result<usize> {
        self.emit_raw32(0x0010_0073)
    }

    /// Emit FENCE with explicit predecessor and successor sets.
    #[inline(always)]
    pub fn emit_fence(&mut self, pred: FenceOrder, succ: FenceOrder) -> Result<usize> {
        self.emit_raw32(enc::fence(0b0000, pred.as_u32(), succ.as_u32(), 0, 0b000, 0))
    }

    /// Emit FENCE.TSO (`fm = 1000`, pred = succ = RW).
    #[inline(always)]
    pub fn emit_fence_tso(&mut self) -> Result<usize> {
        self.emit_raw32(enc::fence(
            0b1000,
            FenceOrder::RW.as_u32(),
            FenceOrder::RW.as_u32(),
            0,
            0b000,
            0
        ))
    }

    /// Emit FENCE.I, the instruction-stream fence.
    #[inline(always)]
    pub fn emit_fencei(&mut self) -> Result<usize> {
        self.emit_i(enc::OPC_MISC_MEM, 0, 0b001, 0, 0)
    }

    /// Emit PAUSE, the encoding-reserved spin-loop hint
    /// (FENCE pred=W, succ=none).
    #[inline(always)]
    pub fn emit_pause(&mut self) -> Result<usize> {
        self.emit_raw32(0x0100_000F)
    }

    // ----- PSEUDO OPS -----

    /// No operation (ADDI x0, x0, 0).
    #[inline(always)]
    pub fn emit_nop(&mut self) -> Result<usize> {
        self.emit_addi(Reg::ZERO, Reg::ZERO, 0)
    }

    /// Register move (pseudo-instruction: ADDI rd, rs, 0).
    #[inline(always)]
    pub fn emit_mv(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_addi(rd, rs, 0)
    }

    /// Two's complement negation (pseudo-instruction: SUB rd, x0, rs).
    #[inline(always)]
    pub fn emit_neg(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_sub(rd, Reg::ZERO, rs)
    }

    /// Bitwise inversion (pseudo-instruction: XORI rd, rs, -1).
    #[inline(always)]
    pub fn emit_not(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_xori(rd, rs, -1)
    }

    /// Set if zero (pseudo-instruction: SLTIU rd, rs, 1).
    #[inline(always)]
    pub fn emit_seqz(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_sltiu(rd, rs, 1)
    }

    /// Set if nonzero (pseudo-instruction: SLTU rd, x0, rs).
    #[inline(always)]
    pub fn emit_snez(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_sltu(rd, Reg::ZERO, rs)
    }

    /// Set if negative (pseudo-instruction: SLT rd, rs, x0).
    #[inline(always)]
    pub fn emit_sltz(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_slt(rd, rs, Reg::ZERO)
    }

    /// Set if positive (pseudo-instruction: SLT rd, x0, rs).
    #[inline(always)]
    pub fn emit_sgtz(&mut self, rd: Reg, rs: Reg) -> Result<usize> {
        self.emit_slt(rd, Reg::ZERO, rs)
    }

    /// Load a 32-bit immediate (pseudo-instruction: ADDI, or LUI+ADDI).
    /// Returns the offset of the first emitted instruction.
    pub fn emit_li32(&mut self, rd: Reg, imm: i32) -> Result<usize> {
        if misc::fits_signed(imm, 12) {
            return self.emit_addi(rd, Reg::ZERO, imm)
        }

        let upper20 = imm.wrapping_add(0x800) >> 12;
        let site = self.emit_lui(rd, (upper20 as u32) & 0xF_FFFF)?;

        let lower12 = imm.wrapping_sub(upper20 << 12);
        if lower12 != 0 {
            self.emit_addi(rd, rd, lower12)?;
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
    fn base_encodings() {
        assert_eq!(word(|a| { a.emit_add(A0, A1, A2).unwrap(); }), 0x00C58533);
        assert_eq!(word(|a| { a.emit_sub(A0, A1, A2).unwrap(); }), 0x40C58533);
        assert_eq!(word(|a| { a.emit_addi(A0, ZERO, 42).unwrap(); }), 0x02A00513);
        assert_eq!(word(|a| { a.emit_lui(A0, 0x12345).unwrap(); }), 0x12345537);
        assert_eq!(word(|a| { a.emit_lw(A0, 0, SP).unwrap(); }), 0x00012503);
        assert_eq!(word(|a| { a.emit_sw(A0, 0, SP).unwrap(); }), 0x00A12023);
        assert_eq!(word(|a| { a.emit_jalr(ZERO, 0, RA).unwrap(); }), 0x00008067);
        assert_eq!(word(|a| { a.emit_ecall().unwrap(); }), 0x00000073);
        assert_eq!(word(|a| { a.emit_ebreak().unwrap(); }), 0x00100073);
    }

    #[test]
    fn negative_load_store_offsets() {
        // -8 sign-extends through imm[11:0]
        assert_eq!(word(|a| { a.emit_lw(A0, -8, SP).unwrap(); }) >> 20, 0xFF8);
        let sw = word(|a| { a.emit_sw(A0, -8, SP).unwrap(); });
        let hi = (sw >> 25) & 0x7F;
        let lo = (sw >> 7) & 0x1F;
        assert_eq!((hi << 5) | lo, 0xFF8);
    }

    #[test]
    fn fence_family() {
        assert_eq!(
            word(|a| { a.emit_fence(FenceOrder::IORW, FenceOrder::IORW).unwrap(); }),
            0x0FF0000F
        );
        assert_eq!(word(|a| { a.emit_fence_tso().unwrap(); }), 0x8330000F);
        assert_eq!(word(|a| { a.emit_fencei().unwrap(); }), 0x0000100F);
        assert_eq!(word(|a| { a.emit_pause().unwrap(); }), 0x0100000F);
    }

    #[test]
    fn pseudo_expansions_match_canonical() {
        assert_eq!(
            word(|a| { a.emit_nop().unwrap(); }),
            word(|a| { a.emit_addi(ZERO, ZERO, 0).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_mv(A0, A1).unwrap(); }),
            word(|a| { a.emit_addi(A0, A1, 0).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_neg(A0, A1).unwrap(); }),
            word(|a| { a.emit_sub(A0, ZERO, A1).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_not(A0, A1).unwrap(); }),
            word(|a| { a.emit_xori(A0, A1, -1).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_seqz(A0, A1).unwrap(); }),
            word(|a| { a.emit_sltiu(A0, A1, 1).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_snez(A0, A1).unwrap(); }),
            word(|a| { a.emit_sltu(A0, ZERO, A1).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_sltz(A0, A1).unwrap(); }),
            word(|a| { a.emit_slt(A0, A1, ZERO).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_sgtz(A0, A1).unwrap(); }),
            word(|a| { a.emit_slt(A0, ZERO, A1).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_ret().unwrap(); }),
            word(|a| { a.emit_jalr(ZERO, 0, RA).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_jr(T0).unwrap(); }),
            word(|a| { a.emit_jalr(ZERO, 0, T0).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_j_offset(0).unwrap(); }),
            word(|a| { a.emit_jal_offset(ZERO, 0).unwrap(); })
        );
    }

    #[test]
    fn swapped_branch_pseudos() {
        assert_eq!(
            word(|a| { a.emit_bgt_offset(A0, A1, 8).unwrap(); }),
            word(|a| { a.emit_blt_offset(A1, A0, 8).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_bleu_offset(A0, A1, 8).unwrap(); }),
            word(|a| { a.emit_bgeu_offset(A1, A0, 8).unwrap(); })
        );
        assert_eq!(
            word(|a| { a.emit_beqz_offset(A0, -16).unwrap(); }),
            word(|a| { a.emit_beq_offset(A0, ZERO, -16).unwrap(); })
        );
    }

    #[test]
    fn branch_delta_boundaries() {
        let mut asm = Assembler::new();
        asm.emit_beq_offset(A0, A1, 4094).unwrap();
        asm.emit_beq_offset(A0, A1, -4096).unwrap();

        assert!(asm.emit_beq_offset(A0, A1, 4096).is_err());
        assert!(asm.emit_beq_offset(A0, A1, -4098).is_err());
        assert!(asm.emit_beq_offset(A0, A1, 7).is_err());

        // failures never move the cursor
        assert_eq!(asm.cursor(), 8);
    }

    #[test]
    fn jump_delta_boundaries() {
        let mut asm = Assembler::new();
        asm.emit_jal_offset(RA, (1 << 20) - 2).unwrap();
        asm.emit_jal_offset(RA, -(1 << 20)).unwrap();

        assert!(asm.emit_jal_offset(RA, 1 << 20).is_err());
        assert!(asm.emit_jal_offset(RA, -(1 << 20) - 2).is_err());
        assert!(asm.emit_jal_offset(RA, 3).is_err());
    }

    #[test]
    fn shift_amount_boundaries() {
        let mut asm = Assembler::new();
        asm.emit_slli(A0, A1, 31).unwrap();
        assert!(asm.emit_slli(A0, A1, 32).is_err());
        assert!(asm.emit_srai(A0, A1, 32).is_err());
    }

    #[test]
    fn srai_sets_the_arithmetic_bit() {
        assert_eq!(word(|a| { a.emit_srai(A0, A1, 4).unwrap(); }), 0x4045D513);
        assert_eq!(word(|a| { a.emit_srli(A0, A1, 4).unwrap(); }), 0x0045D513);
    }

    #[test]
    fn li32_expansions() {
        // small immediate: one ADDI
        let mut asm = Assembler::new();
        asm.emit_li32(A0, 42).unwrap();
        assert_eq!(asm.cursor(), 4);

        // wide immediate: LUI + ADDI
        let mut asm = Assembler::new();
        asm.emit_li32(A1, 0x12345).unwrap();
        assert_eq!(asm.cursor(), 8);
        let b = asm.code();
        assert_eq!(&b[..4], &0x000125B7u32.to_le_bytes()); // lui a1, 0x12
        assert_eq!(&b[4..8], &0x34558593u32.to_le_bytes()); // addi a1, a1, 0x345
    }
}
