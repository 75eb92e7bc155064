//! `SExpr` → `Def` lowering for top-level `define` forms.

use ast::ident::Ident;
use ast::ir::{AnnotSlot, Def, FnAnnotation};
use ast::{HashMap, HashSet, SExpr};

use crate::exprs::parse_expr;
use crate::result::{SynResult, SyntaxError};
use crate::types::{parse_type, TypeScope};

/// Parses a `(define ...)` form in either its value shape (`(define name
/// body)`, optionally `(define name RetType body)`) or its function shape
/// (`(define (name arg ...) body)`, likewise with an optional return type).
/// Parameters may mix bare symbols and `(name Type)` annotated ones freely;
/// the whole definition's annotation is `None` only when every slot —
/// every argument and the return type — is unannotated.
pub fn parse_define(
    sexpr: &SExpr,
    arity_table: &HashMap<String, usize>,
) -> SynResult<Def> {
    let items = sexpr
        .as_list()
        .ok_or_else(|| SyntaxError::MalformedForm { message: "define must be a list".to_owned(), span: None })?;
    let span = ast::HasSpan::span(sexpr);

    if items.len() < 3 || items.len() > 4 {
        return Err(SyntaxError::WrongArity { message: "wrong arity of define form".to_owned(), span });
    }

    let scope = TypeScope::for_annotation(arity_table);

    let (ret_slot, body_sexpr) = if items.len() == 4 {
        let ret = parse_type(&items[2], &scope)?;
        (AnnotSlot::Known(ret), &items[3])
    } else {
        (AnnotSlot::Hole, &items[2])
    };

    match &items[1] {
        SExpr::Sym(name_span, name) => {
            let body = parse_expr(body_sexpr)?;
            let annotation = match &ret_slot {
                AnnotSlot::Known(ty) => Some(ty.clone()),
                AnnotSlot::Hole => None,
            };
            Ok(Def::VarDefine { name: Ident::new(name, *name_span), body, annotation, span })
        }
        SExpr::List(_, args) => {
            if args.is_empty() {
                return Err(SyntaxError::MalformedForm {
                    message: "function define needs at least a name".to_owned(),
                    span,
                });
            }
            let name_sexpr = &args[0];
            let name = name_sexpr.as_sym().ok_or_else(|| SyntaxError::NotASymbol {
                message: "define name must be a symbol".to_owned(),
                span: ast::HasSpan::span(name_sexpr),
            })?;

            let mut seen: HashSet<String> = HashSet::default();
            let mut params = Vec::with_capacity(args.len() - 1);
            let mut arg_slots = Vec::with_capacity(args.len() - 1);
            for param in &args[1..] {
                let (param_name, param_span, slot) = parse_param(param, &scope)?;
                if !seen.insert(param_name.clone()) {
                    return Err(SyntaxError::DuplicateArgument { name: param_name, span: param_span });
                }
                params.push(Ident::new(param_name, param_span));
                arg_slots.push(slot);
            }

            let all_holes = arg_slots.iter().all(|s| matches!(s, AnnotSlot::Hole)) && matches!(ret_slot, AnnotSlot::Hole);
            let annotation =
                if all_holes { None } else { Some(FnAnnotation { args: arg_slots, ret: ret_slot }) };

            let body = parse_expr(body_sexpr)?;
            Ok(Def::Define { name: Ident::new(name, ast::HasSpan::span(name_sexpr)), params, body, annotation, span })
        }
        other => Err(SyntaxError::MalformedForm {
            message: "define parameters must be a symbol or a list".to_owned(),
            span: ast::HasSpan::span(other),
        }),
    }
}

/// One formal parameter: either a bare symbol (unannotated) or `(name Type)`.
fn parse_param(sexpr: &SExpr, scope: &TypeScope) -> SynResult<(String, Option<codespan::Span>, AnnotSlot)> {
    match sexpr {
        SExpr::Sym(span, name) => Ok((name.clone(), *span, AnnotSlot::Hole)),
        SExpr::List(span, pair) if pair.len() == 2 => {
            let name = pair[0].as_sym().ok_or_else(|| SyntaxError::NotASymbol {
                message: "annotated parameter name must be a symbol".to_owned(),
                span: ast::HasSpan::span(&pair[0]),
            })?;
            let ty = parse_type(&pair[1], scope)?;
            Ok((name.to_owned(), *span, AnnotSlot::Known(ty)))
        }
        other => Err(SyntaxError::MalformedForm {
            message: "parameter must be a symbol or a symbol with one type annotation".to_owned(),
            span: ast::HasSpan::span(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::types::Monotype;

    fn empty_arity() -> HashMap<String, usize> {
        HashMap::default()
    }

    #[test]
    fn bare_value_define_has_no_annotation() {
        let e = SExpr::list([SExpr::sym("define"), SExpr::sym("x"), SExpr::int(1)]);
        match parse_define(&e, &empty_arity()).unwrap() {
            Def::VarDefine { annotation, .. } => assert!(annotation.is_none()),
            _ => panic!("expected VarDefine"),
        }
    }

    #[test]
    fn value_define_with_return_type_is_annotated() {
        let e = SExpr::list([SExpr::sym("define"), SExpr::sym("x"), SExpr::sym("Number"), SExpr::int(1)]);
        match parse_define(&e, &empty_arity()).unwrap() {
            Def::VarDefine { annotation, .. } => assert_eq!(annotation, Some(Monotype::number())),
            _ => panic!("expected VarDefine"),
        }
    }

    #[test]
    fn fully_bare_function_define_has_no_annotation() {
        let e = SExpr::list([
            SExpr::sym("define"),
            SExpr::list([SExpr::sym("f"), SExpr::sym("x")]),
            SExpr::sym("x"),
        ]);
        match parse_define(&e, &empty_arity()).unwrap() {
            Def::Define { annotation, params, .. } => {
                assert!(annotation.is_none());
                assert_eq!(params.len(), 1);
            }
            _ => panic!("expected Define"),
        }
    }

    #[test]
    fn mixed_annotated_and_bare_params_keep_a_holed_annotation() {
        let e = SExpr::list([
            SExpr::sym("define"),
            SExpr::list([
                SExpr::sym("f"),
                SExpr::list([SExpr::sym("x"), SExpr::sym("Number")]),
                SExpr::sym("y"),
            ]),
            SExpr::sym("x"),
        ]);
        match parse_define(&e, &empty_arity()).unwrap() {
            Def::Define { annotation: Some(ann), .. } => {
                assert_eq!(ann.args, vec![AnnotSlot::Known(Monotype::number()), AnnotSlot::Hole]);
                assert_eq!(ann.ret, AnnotSlot::Hole);
            }
            _ => panic!("expected annotated Define"),
        }
    }

    #[test]
    fn duplicate_function_param_is_rejected() {
        let e = SExpr::list([
            SExpr::sym("define"),
            SExpr::list([SExpr::sym("f"), SExpr::sym("x"), SExpr::sym("x")]),
            SExpr::sym("x"),
        ]);
        assert!(matches!(parse_define(&e, &empty_arity()), Err(SyntaxError::DuplicateArgument { .. })));
    }
}
