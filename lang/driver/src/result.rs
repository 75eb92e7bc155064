//! The flattened diagnostic view (§6): every `SyntaxError` and `TypeError`
//! collected across a compilation collapses to one `{ span, message }` value
//! so an embedding caller doesn't need to match on two separate error enums.

use codespan::Span;
use elaborator::TypeError;
use lowering::SyntaxError;
use span_util::ToMiette;

/// One reported problem, independent of which pass raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub span: Option<Span>,
    pub message: String,
}

impl Diagnostic {
    pub fn from_syntax_error(e: &SyntaxError) -> Self {
        Diagnostic { span: e.span(), message: e.to_string() }
    }

    pub fn from_type_error(e: &TypeError) -> Self {
        Diagnostic { span: e.span(), message: e.to_string() }
    }

    /// `in <span>: <message>` (§6's exit-discipline rendering), mirroring
    /// `lowering::SyntaxError::render_line`.
    pub fn render_line(&self) -> String {
        match self.span.map(|s| s.to_miette()) {
            Some(span) => format!("in {}..{}: {}", span.offset(), span.offset() + span.len(), self.message),
            None => format!("in <unknown>: {}", self.message),
        }
    }
}
