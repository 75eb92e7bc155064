use codespan::Span;
use miette::Diagnostic;
use span_util::ToMiette;
use thiserror::Error;

/// Syntax and type-declaration errors (§ Syntax / TypeDecl in the error
/// taxonomy). These are recovered locally: the parser records one and
/// continues with a best-effort partial IR so later errors still surface.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("malformed form: {message}")]
    #[diagnostic(code("S-001"))]
    MalformedForm { message: String, span: Option<Span> },

    #[error("wrong arity: {message}")]
    #[diagnostic(code("S-002"))]
    WrongArity { message: String, span: Option<Span> },

    #[error("duplicate argument name `{name}`")]
    #[diagnostic(code("S-003"))]
    DuplicateArgument { name: String, span: Option<Span> },

    #[error("expected a symbol, found something else: {message}")]
    #[diagnostic(code("S-004"))]
    NotASymbol { message: String, span: Option<Span> },

    #[error("unbound type variable `{name}`")]
    #[diagnostic(code("S-005"))]
    UnboundTypeVar { name: String, span: Option<Span> },

    #[error("type `{name}` is defined more than once")]
    #[diagnostic(code("D-001"))]
    DuplicateTypeName { name: String, span: Option<Span> },

    #[error("unknown type constructor `{name}`")]
    #[diagnostic(code("D-002"))]
    UnknownTypeConstructor { name: String, span: Option<Span> },

    #[error("wrong arity applying type `{name}`: expected {expected}, found {found}")]
    #[diagnostic(code("D-003"))]
    TypeArityMismatch { name: String, expected: usize, found: usize, span: Option<Span> },

    #[error("duplicate binding `{name}` in pattern")]
    #[diagnostic(code("S-006"))]
    DuplicatePatternBinding { name: String, span: Option<Span> },
}

impl SyntaxError {
    pub fn span(&self) -> Option<Span> {
        match self {
            SyntaxError::MalformedForm { span, .. }
            | SyntaxError::WrongArity { span, .. }
            | SyntaxError::DuplicateArgument { span, .. }
            | SyntaxError::NotASymbol { span, .. }
            | SyntaxError::UnboundTypeVar { span, .. }
            | SyntaxError::DuplicateTypeName { span, .. }
            | SyntaxError::UnknownTypeConstructor { span, .. }
            | SyntaxError::TypeArityMismatch { span, .. }
            | SyntaxError::DuplicatePatternBinding { span, .. } => *span,
        }
    }

    /// `in <span>: <message>` rendering for the flattened diagnostic list.
    pub fn render_line(&self) -> String {
        match self.span().map(|s| s.to_miette()) {
            Some(span) => format!("in {}..{}: {}", span.offset(), span.offset() + span.len(), self),
            None => format!("in <unknown>: {self}"),
        }
    }
}

pub type SynResult<T> = Result<T, SyntaxError>;
