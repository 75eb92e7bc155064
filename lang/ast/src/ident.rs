use std::fmt;

use codespan::Span;
use derivative::Derivative;

use crate::HasSpan;

/// A name occurring anywhere in source: a variable, a type variable, a
/// constructor, a field, or a type constructor name.
///
/// Equality and hashing ignore the span, so two identifiers compare equal
/// iff their names agree, regardless of where in the source they occurred.
/// This matters because identifiers end up as keys in environments and
/// free-variable sets that are built and compared across many call sites.
#[derive(Debug, Clone, Derivative)]
#[derivative(Eq, PartialEq, Hash)]
pub struct Ident {
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub span: Option<Span>,
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Option<Span>) -> Self {
        Ident { span, name: name.into() }
    }

    pub fn from_str(name: &str) -> Self {
        Ident { span: None, name: name.to_owned() }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl HasSpan for Ident {
    fn span(&self) -> Option<Span> {
        self.span
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::from_str(name)
    }
}

impl From<String> for Ident {
    fn from(name: String) -> Self {
        Ident { span: None, name }
    }
}

impl std::borrow::Borrow<str> for Ident {
    fn borrow(&self) -> &str {
        &self.name
    }
}
