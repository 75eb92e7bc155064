//! Typed intermediate representation: expressions, patterns, and top-level
//! definitions. IR nodes are immutable once built; the s-expression surface
//! tree that produced them is consumed and discarded during lowering.

use std::fmt;

use codespan::Span;

use crate::ident::Ident;
use crate::types::{Monotype, Scheme};
use crate::HasSpan;

/// A literal value. `List` holds a quoted list of literals — quotation can
/// only ever nest further literals, never arbitrary expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Symbol(String),
    Str(String),
    Char(char),
    List(Vec<Literal>),
}

/// ~14 variants, one tagged arm per surface form; matched exhaustively by
/// the inference engine and (externally) by the lowering-to-target pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Lit(Option<Span>, Literal),
    Var(Option<Span>, String),
    /// Zero-argument application is allowed; it is typed as `Unit -> r`.
    App(Option<Span>, Box<Expr>, Vec<Expr>),
    /// Zero-arity lambda types as `Unit -> body`.
    Lambda(Option<Span>, Vec<Ident>, Box<Expr>),
    /// Sequential bindings; each is generalized against the environment at
    /// the point it is bound, before the next binding is processed.
    Let(Option<Span>, Vec<(Ident, Expr)>, Box<Expr>),
    If(Option<Span>, Box<Expr>, Box<Expr>, Box<Expr>),
    /// Non-empty list of `(test, arm)` pairs.
    Cond(Option<Span>, Vec<(Expr, Expr)>),
    Match(Option<Span>, Box<Expr>, Vec<(Pattern, Expr)>),
    /// Evaluates every expression in order; the value is that of the last.
    Begin(Option<Span>, Vec<Expr>),
    /// Mutates a binding; always typed `Unit`.
    Set(Option<Span>, String, Box<Expr>),
    ListCtor(Option<Span>, Vec<Expr>),
    /// Zero-arity tuple construction is `Unit`; the one-element case
    /// collapses to its single element (see `Monotype::tuple`).
    TupleCtor(Option<Span>, Vec<Expr>),
}

impl HasSpan for Expr {
    fn span(&self) -> Option<Span> {
        match self {
            Expr::Lit(s, _)
            | Expr::Var(s, _)
            | Expr::App(s, ..)
            | Expr::Lambda(s, ..)
            | Expr::Let(s, ..)
            | Expr::If(s, ..)
            | Expr::Cond(s, ..)
            | Expr::Match(s, ..)
            | Expr::Begin(s, ..)
            | Expr::Set(s, ..)
            | Expr::ListCtor(s, ..)
            | Expr::TupleCtor(s, ..) => *s,
        }
    }
}

/// 5 pattern variants. The wildcard `_` is represented as `Var` whose name
/// is `"_"`; `bindings()` special-cases that name to introduce no binding,
/// so downstream code never has to special-case a separate wildcard arm.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Var(Option<Span>, String),
    Lit(Option<Span>, Literal),
    List(Option<Span>, Vec<Pattern>),
    Tuple(Option<Span>, Vec<Pattern>),
    Ctor(Option<Span>, String, Vec<Pattern>),
}

pub const WILDCARD: &str = "_";

impl Pattern {
    /// The set of names this pattern binds, computed structurally. The
    /// wildcard binds nothing. Order is deterministic (pre-order traversal)
    /// but otherwise unspecified beyond that.
    pub fn bindings(&self) -> Vec<(String, Option<Span>)> {
        let mut out = Vec::new();
        self.collect_bindings(&mut out);
        out
    }

    fn collect_bindings(&self, out: &mut Vec<(String, Option<Span>)>) {
        match self {
            Pattern::Var(span, name) => {
                if name != WILDCARD {
                    out.push((name.clone(), *span));
                }
            }
            Pattern::Lit(..) => {}
            Pattern::List(_, ps) | Pattern::Tuple(_, ps) | Pattern::Ctor(_, _, ps) => {
                for p in ps {
                    p.collect_bindings(out);
                }
            }
        }
    }

    /// The first name bound more than once, if any.
    pub fn duplicate_binding(&self) -> Option<String> {
        let bindings = self.bindings();
        let mut seen = crate::HashSet::default();
        for (name, _) in bindings {
            if !seen.insert(name.clone()) {
                return Some(name);
            }
        }
        None
    }
}

/// A possibly-unspecified slot inside a user-provided annotation. A hole
/// matches any inferred subterm in that position.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotSlot {
    Hole,
    Known(Monotype),
}

impl fmt::Display for AnnotSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotSlot::Hole => write!(f, "_"),
            AnnotSlot::Known(ty) => write!(f, "{ty}"),
        }
    }
}

/// The annotation attached to a function-shape definition: one slot per
/// formal parameter plus a return slot. Bare and annotated parameters may be
/// mixed freely in source.
#[derive(Debug, Clone, PartialEq)]
pub struct FnAnnotation {
    pub args: Vec<AnnotSlot>,
    pub ret: AnnotSlot,
}

impl fmt::Display for FnAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "Unit -> {}", self.ret)
        } else {
            for slot in &self.args {
                write!(f, "{slot} -> ")?;
            }
            write!(f, "{}", self.ret)
        }
    }
}

/// A top-level definition: either function-shape (`define` with a parameter
/// list) or value-shape (`define` without one).
#[derive(Debug, Clone, PartialEq)]
pub enum Def {
    Define {
        name: Ident,
        params: Vec<Ident>,
        body: Expr,
        annotation: Option<FnAnnotation>,
        span: Option<Span>,
    },
    VarDefine {
        name: Ident,
        body: Expr,
        annotation: Option<Monotype>,
        span: Option<Span>,
    },
}

impl Def {
    pub fn name(&self) -> &Ident {
        match self {
            Def::Define { name, .. } => name,
            Def::VarDefine { name, .. } => name,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Def::Define { span, .. } => *span,
            Def::VarDefine { span, .. } => *span,
        }
    }

    pub fn body(&self) -> &Expr {
        match self {
            Def::Define { body, .. } => body,
            Def::VarDefine { body, .. } => body,
        }
    }
}

/// A synthesized constructor definition for a `define-sum` constructor
/// (including the built-in `List`'s `Cons`/`Nil`). Constructors have no
/// body in this front-end: their runtime behavior is the external lowering
/// pass's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct CtorDef {
    pub name: Ident,
    pub type_name: String,
    pub scheme: Scheme,
    pub arity: usize,
}

/// A synthesized extractor definition for a `define-record` field, named
/// `Name.field`. `field_index` records positional order so lowering can
/// compile the extractor without re-parsing the declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorDef {
    pub name: Ident,
    pub record_name: String,
    pub field_index: usize,
    pub scheme: Scheme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_binds_no_name() {
        let p = Pattern::Var(None, WILDCARD.to_owned());
        assert!(p.bindings().is_empty());
    }

    #[test]
    fn duplicate_binding_is_detected() {
        let p = Pattern::Tuple(
            None,
            vec![Pattern::Var(None, "x".to_owned()), Pattern::Var(None, "x".to_owned())],
        );
        assert_eq!(p.duplicate_binding(), Some("x".to_owned()));
    }

    #[test]
    fn distinct_bindings_have_no_duplicate() {
        let p = Pattern::Ctor(
            None,
            "Node".to_owned(),
            vec![
                Pattern::Var(None, "l".to_owned()),
                Pattern::Var(None, WILDCARD.to_owned()),
                Pattern::Var(None, "r".to_owned()),
            ],
        );
        assert_eq!(p.duplicate_binding(), None);
        assert_eq!(p.bindings().len(), 2);
    }
}
