//! `SExpr` → `Pattern` lowering.

use ast::ir::{Literal, Pattern};
use ast::{HasSpan, SExpr};

use crate::exprs::parse_literal;
use crate::result::{SynResult, SyntaxError};

/// Parses one pattern position. Duplicate bindings are not checked here —
/// that invariant is checked once over the whole pattern by the caller via
/// `Pattern::duplicate_binding`, since a sub-pattern alone can't see
/// siblings' bindings.
pub fn parse_pattern(sexpr: &SExpr) -> SynResult<Pattern> {
    match sexpr {
        SExpr::List(span, items) => parse_list_pattern(*span, items),
        SExpr::Sym(span, name) => Ok(Pattern::Var(*span, name.clone())),
        other => Ok(Pattern::Lit(other.span(), parse_literal(other)?)),
    }
}

fn parse_list_pattern(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Pattern> {
    if items.is_empty() {
        return Err(SyntaxError::MalformedForm { message: "pattern can't be empty".to_owned(), span });
    }
    let head = items[0].as_sym().ok_or_else(|| SyntaxError::NotASymbol {
        message: "pattern head should be a symbol".to_owned(),
        span: items[0].span(),
    })?;

    match head {
        "quote" => {
            if items.len() != 2 {
                return Err(SyntaxError::WrongArity { message: "wrong arity in quote".to_owned(), span });
            }
            Ok(Pattern::Lit(span, parse_literal(&items[1])?))
        }
        "list" => {
            let subs = items[1..].iter().map(parse_pattern).collect::<SynResult<_>>()?;
            Ok(Pattern::List(span, subs))
        }
        "tuple" => {
            let subs = items[1..].iter().map(parse_pattern).collect::<SynResult<_>>()?;
            Ok(Pattern::Tuple(span, subs))
        }
        ctor => {
            let subs = items[1..].iter().map(parse_pattern).collect::<SynResult<_>>()?;
            Ok(Pattern::Ctor(span, ctor.to_owned(), subs))
        }
    }
}

/// Parses a quoted literal that may itself be a nested list of literals.
pub fn parse_quoted_literal(sexpr: &SExpr) -> SynResult<Literal> {
    parse_literal(sexpr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_symbol_is_var_pattern() {
        assert_eq!(parse_pattern(&SExpr::sym("x")).unwrap(), Pattern::Var(None, "x".to_owned()));
    }

    #[test]
    fn underscore_is_var_pattern_named_wildcard() {
        assert_eq!(parse_pattern(&SExpr::sym("_")).unwrap(), Pattern::Var(None, "_".to_owned()));
    }

    #[test]
    fn ctor_pattern_collects_subpatterns() {
        let e = SExpr::list([SExpr::sym("Node"), SExpr::sym("l"), SExpr::sym("_"), SExpr::sym("r")]);
        let p = parse_pattern(&e).unwrap();
        match p {
            Pattern::Ctor(_, name, subs) => {
                assert_eq!(name, "Node");
                assert_eq!(subs.len(), 3);
            }
            _ => panic!("expected ctor pattern"),
        }
    }

    #[test]
    fn int_literal_is_lit_pattern() {
        assert_eq!(parse_pattern(&SExpr::int(0)).unwrap(), Pattern::Lit(None, Literal::Int(0)));
    }
}
