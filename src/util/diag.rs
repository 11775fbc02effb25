//! Rendering for unbound-label diagnostics.

use crate::util::misc;

use std::sync::Arc;

use memchr::Memchr;

#[cfg(feature = "fancy-diagnostics")]
use miette::{
    Diagnostic,
    LabeledSpan,
    MietteError,
    SourceCode,
    SpanContents,
    GraphicalReportHandler,
};

/// A location in embedder source code (byte offset and length).
#[derive(Copy, Debug, Clone)]
pub struct SourceSpan {
    pub offset: usize,
    pub length: usize,
}

impl SourceSpan {
    #[inline(always)]
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }
}

/// A named source file with its content.
#[derive(Debug, Clone)]
pub struct NamedSource {
    pub name: Arc<str>,
    pub source: Arc<str>,
}

impl NamedSource {
    #[inline(always)]
    pub fn new(name: impl Into<Arc<str>>, content: impl Into<Arc<str>>) -> Self {
        Self { name: name.into(), source: content.into() }
    }

    #[inline(always)]
    pub fn file_name(&self) -> &str { &self.name }

    #[inline(always)]
    pub fn inner(&self) -> &str { &self.source }
}

#[cfg(feature = "fancy-diagnostics")]
impl SourceCode for NamedSource {
    #[inline(always)]
    fn read_span<'a>(
        &'a self,
        span: &miette::SourceSpan,
        context_lines_before: usize,
        context_lines_after: usize,
    ) -> Result<Box<dyn SpanContents<'a> + 'a>, MietteError> {
        self.source.read_span(span, context_lines_before, context_lines_after)
    }
}

/// A label that still had pending fixups when the assembler finished,
/// anchored at the `declare_label` call that created it.
pub struct UnboundLabelDiagnostic {
    pub span: SourceSpan,
    pub src: NamedSource,
    pub label: u32,
    pub pending: usize,
}

impl std::fmt::Display for UnboundLabelDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!{
            f,
            "label {id} was never bound ({n} fixup site{s} pending)",
            id = self.label,
            n = self.pending,
            s = if self.pending == 1 { "" } else { "s" }
        }
    }
}

impl std::fmt::Debug for UnboundLabelDiagnostic {
    #[inline(always)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for UnboundLabelDiagnostic {}

#[cfg(feature = "fancy-diagnostics")]
impl Diagnostic for UnboundLabelDiagnostic {
    #[inline]
    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    #[inline]
    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span.offset..self.span.offset + self.span.length;
        Some(Box::new(core::iter::once(
            LabeledSpan::new_with_span(Some("declared here".into()), span),
        )))
    }
}

#[derive(Default)]
#[cfg(not(feature = "fancy-diagnostics"))]
pub struct DiagnosticRenderer {}

#[cfg(feature = "fancy-diagnostics")]
pub struct DiagnosticRenderer {
    handler: GraphicalReportHandler,
}

#[cfg(feature = "fancy-diagnostics")]
impl Default for DiagnosticRenderer {
    #[inline(always)]
    fn default() -> Self {
        Self { handler: GraphicalReportHandler::new() }
    }
}

impl DiagnosticRenderer {
    #[inline]
    #[cfg(feature = "fancy-diagnostics")]
    pub fn render_to_string(&self, diag: &UnboundLabelDiagnostic) -> String {
        const RENDERED_PREALLOCATION_SIZE: usize = 512;

        let mut rendered = String::with_capacity(RENDERED_PREALLOCATION_SIZE);
        self.handler
            .render_report(&mut rendered, diag)
            .expect("render_report should not fail");

        rendered
    }

    #[cfg(not(feature = "fancy-diagnostics"))]
    pub fn render_to_string(&self, diag: &UnboundLabelDiagnostic) -> String {
        let src_name = diag.src.file_name();
        let src_content = diag.src.inner();
        let src_bytes = src_content.as_bytes();
        let span_start = diag.span.offset.min(src_content.len());
        let span_len = diag.span.length.max(1);

        let line_start = memchr::memrchr(b'\n', &src_bytes[..span_start])
            .map(|i| i + 1)
            .unwrap_or(0);

        let line_end = memchr::memchr(b'\n', &src_bytes[span_start..])
            .map(|i| span_start + i)
            .unwrap_or(src_content.len());

        let line = &src_content[line_start..line_end];
        let line_number = bytecount::count(&src_bytes[..line_start], b'\n') + 1;

        let column = span_start - line_start + 1;

        let caret = " ".repeat(column - 1) + &"^".repeat(span_len);

        let line_number_str = line_number.to_string();
        let line_number_pad = " ".repeat(line_number_str.len());

        std::format!{
            "error: {diag}\n  --> {src_name}:{lnum}:{c}\n{lpad} |\n{lstr} | {line}\n{lpad} | {caret}\n",
            lnum = line_number,
            c = column,
            lpad = line_number_pad,
            lstr = line_number_str,
        }
    }
}

/// Turn a source file and a 1-based (line, column) into a named source
/// plus the byte-offset span of that position.
pub fn text_into_named_source_and_span(
    text_: impl AsRef<str> + Into<Arc<str>> + Clone,
    file_path: impl AsRef<str>,
    line: usize,
    column: usize,
) -> (NamedSource, SourceSpan) {
    let text = text_.as_ref();
    let file_path = file_path.as_ref();

    if text.is_empty() {
        return (
            NamedSource::new(file_path, ""),
            SourceSpan::new(0, 0),
        )
    }

    let byte_offset = byte_offset_of(text, misc::b0(line, line), column);

    (
        NamedSource::new(file_path, text_.clone()),
        SourceSpan::new(byte_offset, 1),
    )
}

/// Byte offset of 0-based `target_line` / 1-based `target_col`, clamped
/// into the text.
fn byte_offset_of(text: &str, target_line: usize, target_col: usize) -> usize {
    if target_line == 0 {
        return misc::b0(target_col, text.len())
    }

    let mut curr_line = 0;
    let mut last_newline_pos = 0;

    let mut newline_iter = Memchr::new(b'\n', text.as_bytes());
    while let Some(pos) = newline_iter.next() {
        if curr_line + 1 == target_line {
            let line_start = pos + 1;
            let line_end = newline_iter.next().unwrap_or(text.len());
            let line_len = line_end - line_start;
            return line_start + misc::b0(target_col, line_len)
        }

        curr_line += 1;
        last_newline_pos = pos;
    }

    // target line is beyond the file -> clamp to the last line
    last_newline_pos + misc::b0(target_col, text.len() - last_newline_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_points_at_line_and_column() {
        let text = "first\nsecond line\nthird\n";
        let (src, span) = text_into_named_source_and_span(text, "demo.rs", 2, 3);
        assert_eq!(src.file_name(), "demo.rs");
        // line 2 starts at offset 6; column 3 is offset 8
        assert_eq!(span.offset, 8);
    }

    #[cfg(not(feature = "fancy-diagnostics"))]
    #[test]
    fn plain_rendering_has_caret() {
        let text = "fn main() {\n    let l = declare();\n}\n";
        let (src, span) = text_into_named_source_and_span(text, "demo.rs", 2, 9);
        let d = UnboundLabelDiagnostic { span, src, label: 7, pending: 2 };
        let rendered = DiagnosticRenderer::default().render_to_string(&d);
        assert!(rendered.contains("label 7 was never bound"));
        assert!(rendered.contains("demo.rs:2:9"));
        assert!(rendered.contains('^'));
    }
}
