//! Error types for emission, binding and finishing.

use crate::asm::Assembler;
use crate::asm::label::LabelId;
use crate::util::diag::{self, DiagnosticRenderer, UnboundLabelDiagnostic};

use core::{fmt, mem, panic};

use rustc_hash::FxHashMap;

pub type Result<T, E = EmitError> = core::result::Result<T, E>;

/// A failed emission or binding. The instruction that caused it was not
/// written and the buffer cursor is unchanged.
#[derive(Clone, PartialEq, Eq)]
pub enum EmitError {
    /// The instruction would not fit in the remaining buffer space.
    CapacityExceeded { needed: usize, capacity: usize },
    /// An immediate (or branch/jump delta) does not fit its field.
    ImmediateOutOfRange { value: i64, min: i64, max: i64 },
    /// A branch or jump delta is not 2-byte aligned.
    MisalignedTarget { delta: i64 },
    /// A register outside the subset an encoding can express, or a
    /// reserved register for this encoding.
    InvalidRegister { reg: &'static str },
    /// A shift amount at or past the operand width.
    InvalidShiftAmount { shamt: u32, max: u32 },
    /// `bind_label` called on an already-bound label.
    LabelRebound { label: LabelId },
    /// A pending fixup site is no longer inside the emitted region
    /// (the buffer was rewound past it).
    StaleFixup { site: usize, cursor: usize },
    /// An operand combination that collides with a reserved encoding.
    IllegalOperands { reason: &'static str },
}

debug_from_display!(EmitError);

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { needed, capacity } => {
                write!(f, "code buffer capacity exceeded: need {needed} bytes, have {capacity}")
            }
            Self::ImmediateOutOfRange { value, min, max } => {
                write!(f, "immediate {value} out of range [{min}, {max}]")
            }
            Self::MisalignedTarget { delta } => {
                write!(f, "branch delta {delta} is not 2-byte aligned")
            }
            Self::InvalidRegister { reg } => {
                write!(f, "register {reg} is not encodable here")
            }
            Self::InvalidShiftAmount { shamt, max } => {
                write!(f, "shift amount {shamt} exceeds {max}")
            }
            Self::LabelRebound { label } => {
                write!(f, "label {id} is already bound", id = label.0)
            }
            Self::StaleFixup { site, cursor } => {
                write!(f, "fixup site {site} is past the buffer cursor {cursor} (rewound away?)")
            }
            Self::IllegalOperands { reason } => {
                write!(f, "illegal operand combination: {reason}")
            }
        }
    }
}

impl std::error::Error for EmitError {}

/// Where a still-unbound label was declared, for diagnostics.
#[derive(Debug)]
pub(crate) struct UnboundLabelInfo {
    pub(crate) caller_loc: &'static panic::Location<'static>,
}

/// Labels with pending fixups were never bound when the assembler was
/// finished. Stores the pre-rendered, pretty diagnostic text.
pub struct FinishError {
    /// One rendered diagnostic per offending label.
    pub rendered: String,
}

debug_from_display!(FinishError);

impl fmt::Display for FinishError {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { rendered } = self;
        write!(f, "{rendered}")
    }
}

impl std::error::Error for FinishError {}

impl FinishError {
    pub(crate) fn from_asm(asm: &mut Assembler<'_>) -> FinishError {
        use std::{fs, sync::Arc};

        #[allow(clippy::default_constructed_unit_structs)]
        let renderer = DiagnosticRenderer::default();

        let mut file_cache = FxHashMap::<&str, Arc<str>>::default();

        let unbound = mem::take(&mut asm.unbound_labels);

        let mut reports = unbound
            .into_iter()
            .filter(|(id, _)| !asm.label(*id).pending_sites().is_empty())
            .map(|(id, info)| {
                let pending = asm.label(id).pending_sites().len();
                let file_path = info.caller_loc.file();

                let content = file_cache.entry(file_path).or_insert_with(|| {
                    fs::read_to_string(file_path).unwrap_or_default().into()
                });

                let (src, span) = diag::text_into_named_source_and_span(
                    Arc::clone(content),
                    file_path,
                    info.caller_loc.line() as _,
                    info.caller_loc.column() as _,
                );

                let d = UnboundLabelDiagnostic {
                    span,
                    src,
                    label: id.0,
                    pending,
                };

                renderer.render_to_string(&d)
            })
            .collect::<Vec<_>>();

        reports.sort();

        FinishError {
            // blank line between diagnostics
            rendered: reports.join("\n\n"),
        }
    }
}
