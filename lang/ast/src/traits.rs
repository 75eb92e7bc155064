use codespan::Span;

/// Implemented by every AST, IR, and type node that carries source
/// provenance. Spans are diagnostic-only: they are excluded from `Eq`/`Hash`
/// so that two nodes compare equal iff they agree ignoring where they came
/// from.
pub trait HasSpan {
    fn span(&self) -> Option<Span>;
}
