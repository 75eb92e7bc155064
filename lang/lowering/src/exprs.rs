//! `SExpr` → `Expr` lowering.

use ast::ident::Ident;
use ast::ir::{Expr, Literal};
use ast::{HasSpan, SExpr};

use crate::patterns::parse_pattern;
use crate::result::{SynResult, SyntaxError};

pub fn parse_literal(sexpr: &SExpr) -> SynResult<Literal> {
    match sexpr {
        SExpr::Sym(_, s) => Ok(Literal::Symbol(s.clone())),
        SExpr::Int(_, n) => Ok(Literal::Int(*n)),
        SExpr::Float(_, n) => Ok(Literal::Float(*n)),
        SExpr::Bool(_, b) => Ok(Literal::Bool(*b)),
        SExpr::Str(_, s) => Ok(Literal::Str(s.clone())),
        SExpr::Char(_, c) => Ok(Literal::Char(*c)),
        SExpr::List(_, items) => Ok(Literal::List(items.iter().map(parse_literal).collect::<SynResult<_>>()?)),
    }
}

/// Parses a top-level or nested expression form. A bare symbol is always a
/// variable reference; a quoted symbol is the only way to produce a
/// `Literal::Symbol`.
pub fn parse_expr(sexpr: &SExpr) -> SynResult<Expr> {
    match sexpr {
        SExpr::Sym(span, name) => Ok(Expr::Var(*span, name.clone())),
        SExpr::List(span, items) => parse_list_expr(*span, items),
        other => Ok(Expr::Lit(other.span(), parse_literal(other)?)),
    }
}

fn parse_list_expr(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Expr> {
    if items.is_empty() {
        return Err(SyntaxError::MalformedForm { message: "empty application".to_owned(), span });
    }
    if let Some(head) = items[0].as_sym() {
        match head {
            "lambda" => return parse_lambda(span, items),
            "quote" => {
                if items.len() != 2 {
                    return Err(SyntaxError::WrongArity { message: "wrong arity in quote".to_owned(), span });
                }
                return Ok(Expr::Lit(span, parse_literal(&items[1])?));
            }
            "let" => return parse_let(span, items),
            "if" => return parse_if(span, items),
            "cond" => return parse_cond(span, items),
            "match" => return parse_match(span, items),
            "list" => {
                let args = items[1..].iter().map(parse_expr).collect::<SynResult<_>>()?;
                return Ok(Expr::ListCtor(span, args));
            }
            "tuple" => {
                let args = items[1..].iter().map(parse_expr).collect::<SynResult<_>>()?;
                return Ok(Expr::TupleCtor(span, args));
            }
            "set!" => return parse_set(span, items),
            "begin" => return parse_begin(span, items),
            _ => {}
        }
    }
    parse_apply(span, items)
}

fn parse_lambda(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Expr> {
    if items.len() != 3 {
        return Err(SyntaxError::WrongArity { message: "wrong arity of lambda form".to_owned(), span });
    }
    let params = parse_params(&items[1])?;
    let body = parse_expr(&items[2])?;
    Ok(Expr::Lambda(span, params, Box::new(body)))
}

fn parse_params(sexpr: &SExpr) -> SynResult<Vec<Ident>> {
    let items = sexpr
        .as_list()
        .ok_or_else(|| SyntaxError::MalformedForm { message: "parameters must be a list".to_owned(), span: sexpr.span() })?;
    let mut seen = ast::HashSet::default();
    let mut params = Vec::with_capacity(items.len());
    for item in items {
        let name = item
            .as_sym()
            .ok_or_else(|| SyntaxError::NotASymbol { message: "parameter must be a symbol".to_owned(), span: item.span() })?;
        if !seen.insert(name.to_owned()) {
            return Err(SyntaxError::DuplicateArgument { name: name.to_owned(), span: item.span() });
        }
        params.push(Ident::new(name, item.span()));
    }
    Ok(params)
}

fn parse_let(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Expr> {
    if items.len() != 3 {
        return Err(SyntaxError::WrongArity { message: "wrong arity of let form".to_owned(), span });
    }
    let bindings_list = items[1]
        .as_list()
        .ok_or_else(|| SyntaxError::MalformedForm { message: "let bindings must be a list".to_owned(), span: items[1].span() })?;
    let mut bindings = Vec::with_capacity(bindings_list.len());
    for binding in bindings_list {
        let pair = binding.as_list().ok_or_else(|| SyntaxError::MalformedForm {
            message: "let binding must be a pair".to_owned(),
            span: binding.span(),
        })?;
        if pair.len() != 2 {
            return Err(SyntaxError::WrongArity { message: "let binding must be a pair".to_owned(), span: binding.span() });
        }
        let name = pair[0]
            .as_sym()
            .ok_or_else(|| SyntaxError::NotASymbol { message: "let binding must bind a symbol".to_owned(), span: pair[0].span() })?;
        let value = parse_expr(&pair[1])?;
        bindings.push((Ident::new(name, pair[0].span()), value));
    }
    let body = parse_expr(&items[2])?;
    Ok(Expr::Let(span, bindings, Box::new(body)))
}

fn parse_if(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Expr> {
    if items.len() != 4 {
        return Err(SyntaxError::WrongArity { message: "wrong arity in if form".to_owned(), span });
    }
    let cond = parse_expr(&items[1])?;
    let then = parse_expr(&items[2])?;
    let els = parse_expr(&items[3])?;
    Ok(Expr::If(span, Box::new(cond), Box::new(then), Box::new(els)))
}

fn parse_cond(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Expr> {
    if items.len() < 2 {
        return Err(SyntaxError::WrongArity { message: "cond needs at least one arm".to_owned(), span });
    }
    let mut arms = Vec::with_capacity(items.len() - 1);
    for item in &items[1..] {
        let arm = item
            .as_list()
            .ok_or_else(|| SyntaxError::MalformedForm { message: "cond arm must be a list".to_owned(), span: item.span() })?;
        if arm.len() != 2 {
            return Err(SyntaxError::WrongArity { message: "wrong arity in cond arm".to_owned(), span: item.span() });
        }
        arms.push((parse_expr(&arm[0])?, parse_expr(&arm[1])?));
    }
    Ok(Expr::Cond(span, arms))
}

fn parse_match(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Expr> {
    if items.len() < 3 {
        return Err(SyntaxError::WrongArity {
            message: "match needs a scrutinee and at least one arm".to_owned(),
            span,
        });
    }
    let scrutinee = parse_expr(&items[1])?;
    let mut arms = Vec::with_capacity(items.len() - 2);
    for item in &items[2..] {
        let arm = item
            .as_list()
            .ok_or_else(|| SyntaxError::MalformedForm { message: "match arm must be a list".to_owned(), span: item.span() })?;
        if arm.len() != 2 {
            return Err(SyntaxError::WrongArity { message: "wrong arity in match arm".to_owned(), span: item.span() });
        }
        let pat = parse_pattern(&arm[0])?;
        if let Some(name) = pat.duplicate_binding() {
            return Err(SyntaxError::DuplicatePatternBinding { name, span: arm[0].span() });
        }
        let arm_expr = parse_expr(&arm[1])?;
        arms.push((pat, arm_expr));
    }
    Ok(Expr::Match(span, Box::new(scrutinee), arms))
}

fn parse_set(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Expr> {
    if items.len() != 3 {
        return Err(SyntaxError::WrongArity { message: "wrong arity in set! form".to_owned(), span });
    }
    let name = items[1]
        .as_sym()
        .ok_or_else(|| SyntaxError::NotASymbol { message: "set! target must be a symbol".to_owned(), span: items[1].span() })?;
    let value = parse_expr(&items[2])?;
    Ok(Expr::Set(span, name.to_owned(), Box::new(value)))
}

fn parse_begin(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Expr> {
    if items.len() < 2 {
        return Err(SyntaxError::WrongArity { message: "begin needs at least one form".to_owned(), span });
    }
    let body = items[1..].iter().map(parse_expr).collect::<SynResult<_>>()?;
    Ok(Expr::Begin(span, body))
}

fn parse_apply(span: Option<codespan::Span>, items: &[SExpr]) -> SynResult<Expr> {
    let f = parse_expr(&items[0])?;
    let args = items[1..].iter().map(parse_expr).collect::<SynResult<_>>()?;
    Ok(Expr::App(span, Box::new(f), args))
}
