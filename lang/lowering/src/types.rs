//! Parsing of the surface type syntax: `Number|Bool|Symbol|String|Char|Unit`,
//! `(* τ …)` tuples, `(-> τ … τ_r)` functions, applied type constructors, and
//! type variables.

use ast::types::Monotype;
use ast::{HashMap, HashSet, SExpr};

use crate::result::{SynResult, SyntaxError};

/// The scope a type expression is parsed under: which lowercase symbols are
/// valid type variables, and which capitalized names are known type
/// constructors (with what arity). Both may be absent — a top-level
/// annotation accepts any lowercase symbol as a variable and is checked
/// against the full arity table built in Pass 1.
pub struct TypeScope<'a> {
    pub bound_vars: Option<&'a HashSet<String>>,
    pub arity_table: Option<&'a HashMap<String, usize>>,
}

impl<'a> TypeScope<'a> {
    pub fn unrestricted() -> Self {
        TypeScope { bound_vars: None, arity_table: None }
    }

    pub fn for_decl(bound_vars: &'a HashSet<String>, arity_table: &'a HashMap<String, usize>) -> Self {
        TypeScope { bound_vars: Some(bound_vars), arity_table: Some(arity_table) }
    }

    pub fn for_annotation(arity_table: &'a HashMap<String, usize>) -> Self {
        TypeScope { bound_vars: None, arity_table: Some(arity_table) }
    }
}

pub fn parse_type(sexpr: &SExpr, scope: &TypeScope) -> SynResult<Monotype> {
    match sexpr {
        SExpr::Sym(span, name) => parse_type_symbol(name, *span, scope),
        SExpr::List(span, items) => parse_type_list(*span, items, scope),
        _ => Err(SyntaxError::MalformedForm {
            message: "type must be a symbol or a list".to_owned(),
            span: sexpr_span(sexpr),
        }),
    }
}

fn sexpr_span(e: &SExpr) -> Option<codespan::Span> {
    use ast::HasSpan;
    e.span()
}

fn parse_type_symbol(name: &str, span: Option<codespan::Span>, scope: &TypeScope) -> SynResult<Monotype> {
    match name {
        "Number" => Ok(Monotype::Const(span, "Number".to_owned())),
        "Bool" => Ok(Monotype::Const(span, "Bool".to_owned())),
        "Symbol" => Ok(Monotype::Const(span, "Symbol".to_owned())),
        "String" => Ok(Monotype::Const(span, "String".to_owned())),
        "Char" => Ok(Monotype::Const(span, "Char".to_owned())),
        "Unit" => Ok(Monotype::Const(span, "Unit".to_owned())),
        _ if starts_uppercase(name) => {
            check_arity(name, 0, span, scope)?;
            Ok(Monotype::Defined(span, name.to_owned(), Vec::new()))
        }
        _ => {
            if let Some(bound) = scope.bound_vars {
                if !bound.contains(name) {
                    return Err(SyntaxError::UnboundTypeVar { name: name.to_owned(), span });
                }
            }
            Ok(Monotype::Var(span, name.to_owned()))
        }
    }
}

fn parse_type_list(span: Option<codespan::Span>, items: &[SExpr], scope: &TypeScope) -> SynResult<Monotype> {
    let head = items.first().and_then(SExpr::as_sym).ok_or_else(|| SyntaxError::MalformedForm {
        message: "type must have a name".to_owned(),
        span,
    })?;

    let subs: Vec<Monotype> = items[1..].iter().map(|s| parse_type(s, scope)).collect::<SynResult<_>>()?;

    match head {
        "*" => Ok(Monotype::tuple(subs)),
        "->" => {
            if subs.is_empty() {
                return Err(SyntaxError::WrongArity { message: "empty function type".to_owned(), span });
            }
            let mut subs = subs;
            let result = subs.pop().unwrap();
            Ok(Monotype::func(subs, result))
        }
        name if starts_uppercase(name) => {
            check_arity(name, subs.len(), span, scope)?;
            Ok(Monotype::Defined(span, name.to_owned(), subs))
        }
        name => Err(SyntaxError::UnknownTypeConstructor { name: name.to_owned(), span }),
    }
}

fn check_arity(name: &str, found: usize, span: Option<codespan::Span>, scope: &TypeScope) -> SynResult<()> {
    match scope.arity_table {
        None => Ok(()),
        Some(table) => match table.get(name) {
            Some(expected) if *expected == found => Ok(()),
            Some(expected) => {
                Err(SyntaxError::TypeArityMismatch { name: name.to_owned(), expected: *expected, found, span })
            }
            None => Err(SyntaxError::UnknownTypeConstructor { name: name.to_owned(), span }),
        },
    }
}

fn starts_uppercase(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_uppercase())
}
