//! Runtime assembler core: buffer ownership, labels, fixup patching.

use crate::buffer::CodeBuffer;
use crate::enc;
use crate::asm::errors::{EmitError, FinishError, Result, UnboundLabelInfo};
use crate::asm::label::{Label, LabelId};
use crate::reg::{FReg, Reg};
use crate::util::misc;

use core::ops::Deref;
use core::panic;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Byte-delta range of a B-type branch.
pub(crate) const B_RANGE: (i64, i64) = (-4096, 4094);
/// Byte-delta range of a J-type jump.
pub(crate) const J_RANGE: (i64, i64) = (-1_048_576, 1_048_574);
/// Byte-delta range of a compressed CJ jump.
pub(crate) const CJ_RANGE: (i64, i64) = (-2048, 2046);

enum PatchWord {
    W16(u16),
    W32(u32),
}

/// Single-pass RISC-V code emitter.
///
/// One `emit_*` method per mnemonic; each validates its operands, packs
/// the 16- or 32-bit word and appends it to the underlying
/// [`CodeBuffer`]. Branches and jumps may target a [`LabelId`]: bound
/// labels are encoded inline, unbound ones get a zero-immediate
/// placeholder that [`bind_label`](Assembler::bind_label) patches later.
///
/// Emission methods return the buffer offset of the instruction they
/// wrote. On error nothing is written and the cursor is unchanged.
///
/// # Examples
///
/// ```
/// use brisk::{Assembler, Reg::*};
///
/// let mut asm = Assembler::new();
///
/// let done = asm.declare_label();
/// asm.emit_beq(A0, ZERO, done)?;
/// asm.emit_addi(A0, A0, -1)?;
/// asm.bind_label(done)?;
///
/// assert_eq!(asm.code().len(), 8);
/// # Ok::<(), brisk::EmitError>(())
/// ```
#[derive(Debug)]
pub struct Assembler<'a> {
    buf: CodeBuffer<'a>,

    lbl_id_counter: u32,

    labels: FxHashMap<LabelId, Label>,
    pub(crate) unbound_labels: FxHashMap<LabelId, UnboundLabelInfo>,
}

impl<'a> Deref for Assembler<'a> {
    type Target = CodeBuffer<'a>;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl Assembler<'static> {
    /// An assembler over an owned buffer of
    /// [`CodeBuffer::DEFAULT_CAPACITY`] bytes.
    #[inline(always)]
    pub fn new() -> Self {
        Self::from_code_buffer(CodeBuffer::new())
    }

    /// An assembler over an owned buffer of `capacity` bytes.
    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_code_buffer(CodeBuffer::with_capacity(capacity))
    }
}

impl Default for Assembler<'static> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Assembler<'a> {
    /// An assembler emitting into caller-owned memory. The region is
    /// never freed here and must not be mutated elsewhere while the
    /// assembler lives.
    #[inline(always)]
    pub fn with_buffer(buf: &'a mut [u8]) -> Self {
        Self::from_code_buffer(CodeBuffer::over(buf))
    }

    #[inline]
    fn from_code_buffer(buf: CodeBuffer<'a>) -> Self {
        Self {
            buf,
            lbl_id_counter: 0,
            labels: FxHashMap::default(),
            unbound_labels: FxHashMap::default(),
        }
    }

    /// Move the buffer cursor back to `offset` (0 rewinds everything).
    /// Pending fixup sites past the new cursor become stale; binding
    /// their label afterwards reports [`EmitError::StaleFixup`].
    #[inline(always)]
    pub fn rewind_buffer(&mut self, offset: usize) -> Result<()> {
        self.buf.rewind_cursor(offset)
    }

    /// Hand the finished code buffer over, or fail with a rendered
    /// diagnostic per label that still has branches waiting on it.
    pub fn finish(mut self) -> Result<CodeBuffer<'a>, FinishError> {
        let broken = self
            .unbound_labels
            .keys()
            .any(|id| !self.labels[id].pending_sites().is_empty());

        if broken {
            return Err(FinishError::from_asm(&mut self))
        }

        Ok(self.buf)
    }

    // ----- LABELS -----

    /// Create a fresh unbound label. The call site is recorded so that a
    /// label left unbound with pending branches can be diagnosed by
    /// [`finish`](Self::finish).
    #[must_use]
    #[track_caller]
    pub fn declare_label(&mut self) -> LabelId {
        let id = LabelId(self.lbl_id_counter);
        self.lbl_id_counter += 1;

        self.labels.insert(id, Label::new());
        self.unbound_labels.insert(id, UnboundLabelInfo {
            caller_loc: panic::Location::caller(),
        });

        id
    }

    #[must_use]
    #[inline(always)]
    pub fn label(&self, id: LabelId) -> &Label {
        &self.labels[&id]
    }

    #[must_use]
    #[inline(always)]
    pub(crate) fn label_mut(&mut self, id: LabelId) -> &mut Label {
        self.labels.get_mut(&id).unwrap()
    }

    /// Total number of emitted sites still waiting for a label to bind.
    #[must_use]
    pub fn pending_fixups(&self) -> usize {
        self.labels.values().map(|l| l.pending_sites().len()).sum()
    }

    /// Bind `label` to the current cursor and patch every branch that
    /// referenced it while unbound.
    #[inline(always)]
    pub fn bind_label(&mut self, label: LabelId) -> Result<()> {
        self.bind_label_at(label, self.buf.cursor())
    }

    /// Bind `label` to `target`. All pending sites are re-validated
    /// against the final delta before any byte is touched; on error the
    /// label stays unbound and the buffer is unchanged.
    pub fn bind_label_at(&mut self, label: LabelId, target: usize) -> Result<()> {
        if self.labels[&label].is_bound() {
            return Err(EmitError::LabelRebound { label })
        }

        let cursor = self.buf.cursor();
        let mut patches = SmallVec::<[(usize, PatchWord); 4]>::new();

        for &site in self.labels[&label].pending_sites() {
            let delta = target as i64 - site as i64;

            if site + 2 > cursor {
                return Err(EmitError::StaleFixup { site, cursor })
            }

            let half = self.buf.read16_at(site);
            let patch = if half & 0b11 == 0b11 {
                // 32-bit site: classify by major opcode
                if site + 4 > cursor {
                    return Err(EmitError::StaleFixup { site, cursor })
                }

                let word = self.buf.read32_at(site);
                match word & 0x7F {
                    enc::OPC_BRANCH => {
                        let delta = check_delta(delta, B_RANGE)?;
                        PatchWord::W32((word & !enc::B_IMM_MASK) | enc::b_imm(delta))
                    }
                    enc::OPC_JAL => {
                        let delta = check_delta(delta, J_RANGE)?;
                        PatchWord::W32((word & !enc::J_IMM_MASK) | enc::j_imm(delta))
                    }
                    // the site no longer holds the branch emitted there
                    _ => return Err(EmitError::StaleFixup { site, cursor }),
                }
            } else {
                // 16-bit site: only CJ-format jumps carry fixups
                let funct3 = (half >> 13) & 0b111;
                if half & 0b11 != enc::C_Q1 as u16 || (funct3 != 0b101 && funct3 != 0b001) {
                    return Err(EmitError::StaleFixup { site, cursor })
                }

                let delta = check_delta(delta, CJ_RANGE)?;
                PatchWord::W16((half & !enc::CJ_IMM_MASK) | enc::cj_imm(delta))
            };

            patches.push((site, patch));
        }

        for (site, patch) in patches {
            match patch {
                PatchWord::W16(w) => self.buf.patch16_at(site, w),
                PatchWord::W32(w) => self.buf.patch32_at(site, w),
            }
        }

        self.label_mut(label).bind(target);
        self.unbound_labels.remove(&label);

        Ok(())
    }

    /// Emit a branch or jump that references `label`. When the label is
    /// bound the closure receives the final delta; otherwise it encodes a
    /// zero-delta placeholder and the emitted site is attached to the
    /// label for patching.
    pub(crate) fn emit_with_label<F>(&mut self, label: LabelId, f: F) -> Result<usize>
    where
        F: FnOnce(&mut Self, i64) -> Result<usize>,
    {
        match self.labels[&label].target_offset() {
            Some(target) => {
                let delta = target as i64 - self.buf.cursor() as i64;
                f(self, delta)
            }
            None => {
                let site = f(self, 0)?;
                self.label_mut(label).attach_fixup(site);
                Ok(site)
            }
        }
    }

    // ----- RAW INSTRUCTION EMISSION HELPERS -----

    /// Append a raw 16-bit instruction word, returning its offset.
    #[inline]
    pub fn emit_raw16(&mut self, word: u16) -> Result<usize> {
        let site = self.buf.cursor();
        self.buf.emit16(word)?;
        Ok(site)
    }

    /// Append a raw 32-bit instruction word, returning its offset.
    #[inline]
    pub fn emit_raw32(&mut self, word: u32) -> Result<usize> {
        let site = self.buf.cursor();
        self.buf.emit32(word)?;
        Ok(site)
    }

    /// Emit an R-type word from raw field values. No operand validation.
    #[inline(always)]
    #[allow(clippy::too_many_arguments)]
    pub fn emit_r(
        &mut self,
        opcode: u32,
        rd: u32,
        funct3: u32,
        rs1: u32,
        rs2: u32,
        funct7: u32
    ) -> Result<usize> {
        self.emit_raw32(enc::r_type(opcode, rd, funct3, rs1, rs2, funct7))
    }

    /// Emit an I-type word from raw field values. No operand validation.
    #[inline(always)]
    pub fn emit_i(
        &mut self,
        opcode: u32,
        rd: u32,
        funct3: u32,
        rs1: u32,
        imm: i32
    ) -> Result<usize> {
        self.emit_raw32(enc::i_type(opcode, rd, funct3, rs1, imm))
    }

    /// Emit an S-type word from raw field values. No operand validation.
    #[inline(always)]
    pub fn emit_s(
        &mut self,
        opcode: u32,
        funct3: u32,
        rs1: u32,
        rs2: u32,
        imm: i32
    ) -> Result<usize> {
        self.emit_raw32(enc::s_type(opcode, funct3, rs1, rs2, imm))
    }

    /// Emit a U-type word from raw field values. No operand validation.
    #[inline(always)]
    pub fn emit_u(&mut self, opcode: u32, rd: u32, imm20: u32) -> Result<usize> {
        self.emit_raw32(enc::u_type(opcode, rd, imm20))
    }

    /// Emit a B-type branch with a validated byte delta.
    #[inline]
    pub(crate) fn emit_b_delta(
        &mut self,
        funct3: u32,
        rs1: Reg,
        rs2: Reg,
        delta: i64
    ) -> Result<usize> {
        let delta = check_delta(delta, B_RANGE)?;
        self.emit_raw32(enc::b_type(
            enc::OPC_BRANCH,
            funct3,
            rs1.as_u32(),
            rs2.as_u32(),
            delta
        ))
    }

    /// Emit a J-type jump with a validated byte delta.
    #[inline]
    pub(crate) fn emit_j_delta(&mut self, rd: Reg, delta: i64) -> Result<usize> {
        let delta = check_delta(delta, J_RANGE)?;
        self.emit_raw32(enc::j_type(enc::OPC_JAL, rd.as_u32(), delta))
    }

    /// Emit a CJ-format jump with a validated byte delta.
    #[inline]
    pub(crate) fn emit_cj_delta(&mut self, funct3: u32, delta: i64) -> Result<usize> {
        let delta = check_delta(delta, CJ_RANGE)?;
        self.emit_raw16(enc::cj(funct3, delta, enc::C_Q1))
    }
}

// ----- OPERAND CHECKS -----

/// Validate a branch/jump byte delta: 2-byte aligned and within `range`.
#[inline]
pub(crate) fn check_delta(delta: i64, range: (i64, i64)) -> Result<i32> {
    if delta % 2 != 0 {
        return Err(EmitError::MisalignedTarget { delta })
    }

    let (min, max) = range;
    if delta < min || delta > max {
        return Err(EmitError::ImmediateOutOfRange { value: delta, min, max })
    }

    Ok(delta as i32)
}

/// Validate a signed immediate of `bits` bits.
#[inline]
pub(crate) fn check_simm(imm: i32, bits: u32) -> Result<i32> {
    if !misc::fits_signed(imm, bits) {
        return Err(EmitError::ImmediateOutOfRange {
            value: imm as i64,
            min: -(1i64 << (bits - 1)),
            max: (1i64 << (bits - 1)) - 1,
        })
    }

    Ok(imm)
}

/// Validate an unsigned immediate of `bits` bits.
#[inline]
pub(crate) fn check_uimm(imm: u32, bits: u32) -> Result<u32> {
    if !misc::fits_unsigned(imm, bits) {
        return Err(EmitError::ImmediateOutOfRange {
            value: imm as i64,
            min: 0,
            max: (1i64 << bits) - 1,
        })
    }

    Ok(imm)
}

/// Validate a shift amount against the operand width.
#[inline]
pub(crate) fn check_shamt(shamt: u32, xlen: u32) -> Result<u32> {
    if shamt >= xlen {
        return Err(EmitError::InvalidShiftAmount { shamt, max: xlen - 1 })
    }

    Ok(shamt)
}

/// Validate that `reg` lies in the compressed subset `x8..x15`, yielding
/// its 3-bit encoding.
#[inline]
pub(crate) fn check_creg(reg: Reg) -> Result<u32> {
    if !reg.is_compressible() {
        return Err(EmitError::InvalidRegister { reg: reg.name() })
    }

    Ok(reg.compressed())
}

/// Compressed-subset check for FP registers.
#[inline]
pub(crate) fn check_cfreg(reg: FReg) -> Result<u32> {
    if !reg.is_compressible() {
        return Err(EmitError::InvalidRegister { reg: reg.name() })
    }

    Ok(reg.compressed())
}

/// Validate a scaled unsigned memory offset for compressed loads/stores:
/// a multiple of `scale` no larger than `max`.
#[inline]
pub(crate) fn check_scaled_uimm(imm: u32, max: u32, scale: u32) -> Result<u32> {
    if imm % scale != 0 {
        return Err(EmitError::IllegalOperands {
            reason: "offset is not a multiple of the access size",
        })
    }

    if imm > max {
        return Err(EmitError::ImmediateOutOfRange {
            value: imm as i64,
            min: 0,
            max: max as i64,
        })
    }

    Ok(imm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg::Reg::*;

    fn word_at(asm: &Assembler<'_>, offset: usize) -> u32 {
        let b = &asm.code()[offset..offset + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    #[test]
    fn forward_branch_patches_to_plus_12() {
        let mut asm = Assembler::new();

        let l = asm.declare_label();
        asm.emit_beq(RA, SP, l).unwrap();
        asm.emit_nop().unwrap();
        asm.emit_nop().unwrap();
        asm.bind_label(l).unwrap();

        // delta +12: imm[3:2] in the B-type [11:8] field
        let expected = enc::b_type(enc::OPC_BRANCH, 0, 1, 2, 12);
        assert_eq!(word_at(&asm, 0), expected);

        // NOPs are untouched by patching
        assert_eq!(word_at(&asm, 4), 0x0000_0013);
        assert_eq!(word_at(&asm, 8), 0x0000_0013);
    }

    #[test]
    fn bound_before_equals_bound_after() {
        // backward reference: label bound first
        let mut early = Assembler::new();
        let l = early.declare_label();
        early.bind_label(l).unwrap();
        early.emit_nop().unwrap();
        early.emit_bne(A0, A1, l).unwrap();

        // forward-declared label patched to the same target
        let mut late = Assembler::new();
        late.emit_nop().unwrap();
        let m = late.declare_label();
        late.emit_bne(A0, A1, m).unwrap();
        late.bind_label_at(m, 0).unwrap();

        // both branches sit at offset 4 targeting 0 (delta -4)
        assert_eq!(word_at(&early, 4), word_at(&late, 4));
    }

    #[test]
    fn rebind_fails_without_mutation() {
        let mut asm = Assembler::new();
        let l = asm.declare_label();
        asm.bind_label(l).unwrap();
        asm.emit_nop().unwrap();

        let before = asm.code().to_vec();
        let err = asm.bind_label(l).unwrap_err();
        assert_eq!(err, EmitError::LabelRebound { label: l });
        assert_eq!(asm.code(), &before[..]);
    }

    #[test]
    fn rewind_and_reemit_is_byte_identical() {
        let mut asm = Assembler::new();

        let emit_all = |asm: &mut Assembler<'_>| {
            asm.emit_addi(A0, ZERO, 42).unwrap();
            asm.emit_c_nop().unwrap();
            asm.emit_sub(A1, A0, A0).unwrap();
        };

        emit_all(&mut asm);
        let first = asm.code().to_vec();

        asm.rewind_buffer(0).unwrap();
        emit_all(&mut asm);
        assert_eq!(asm.code(), &first[..]);
    }

    #[test]
    fn rewound_fixup_site_is_stale() {
        let mut asm = Assembler::new();
        let l = asm.declare_label();
        asm.emit_beq(A0, A1, l).unwrap();
        asm.rewind_buffer(0).unwrap();

        let err = asm.bind_label(l).unwrap_err();
        assert!(matches!(err, EmitError::StaleFixup { site: 0, .. }));
    }

    #[test]
    fn compressed_jump_fixup_patches() {
        let mut asm = Assembler::new();
        let l = asm.declare_label();
        asm.emit_c_j(l).unwrap();
        asm.emit_c_nop().unwrap();
        asm.emit_c_nop().unwrap();
        asm.bind_label(l).unwrap();

        let b = asm.code();
        let half = u16::from_le_bytes([b[0], b[1]]);
        assert_eq!(half, enc::cj(0b101, 6, enc::C_Q1));
    }

    #[test]
    fn out_of_range_patch_reports_from_bind() {
        let mut asm = Assembler::with_capacity(8192);
        let l = asm.declare_label();
        asm.emit_c_j(l).unwrap();
        for _ in 0..2048 {
            asm.emit_c_nop().unwrap();
        }
        // delta 4098 exceeds the CJ range
        let err = asm.bind_label(l).unwrap_err();
        assert!(matches!(err, EmitError::ImmediateOutOfRange { .. }));
        assert!(!asm.label(l).is_bound());
    }

    #[test]
    fn finish_reports_unbound_labels_with_fixups() {
        let mut asm = Assembler::new();
        let l = asm.declare_label();
        asm.emit_beq(A0, A1, l).unwrap();
        assert_eq!(asm.pending_fixups(), 1);

        let err = asm.finish().unwrap_err();
        assert!(err.rendered.contains("never bound"));
    }

    #[test]
    fn finish_ignores_unreferenced_labels() {
        let mut asm = Assembler::new();
        let _unused = asm.declare_label();
        asm.emit_nop().unwrap();

        let buf = asm.finish().unwrap();
        assert_eq!(buf.cursor(), 4);
    }

    #[test]
    fn borrowed_buffer_emission() {
        let mut backing = [0u8; 4];
        {
            let mut asm = Assembler::with_buffer(&mut backing);
            asm.emit_lr_w(crate::reg::AqRl::Acquire, T6, A5).unwrap();
            // full: the next word must not fit
            assert!(matches!(
                asm.emit_nop(),
                Err(EmitError::CapacityExceeded { .. })
            ));
        }
        assert_eq!(backing, 0x1407AFAFu32.to_le_bytes());
    }

    #[test]
    fn emission_against_bound_label_is_inline() {
        let mut asm = Assembler::new();
        let l = asm.declare_label();
        asm.bind_label(l).unwrap();
        asm.emit_nop().unwrap();
        asm.emit_j(l).unwrap();

        assert!(asm.label(l).pending_sites().is_empty());
        let expected = enc::j_type(enc::OPC_JAL, 0, -4);
        assert_eq!(word_at(&asm, 4), expected);
    }
}
