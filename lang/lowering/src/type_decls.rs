//! Pass 1 of top-level processing: `define-sum` and `define-record` headers
//! are scanned first so the rest of the program can reference any declared
//! type and constructor regardless of declaration order, then constructors
//! and record fields are parsed in a second sweep against the full arity
//! table built in the first.

use ast::ident::Ident;
use ast::ir::{CtorDef, ExtractorDef};
use ast::types::{Monotype, Scheme};
use ast::{HashMap, HashSet, HasSpan, SExpr};

use crate::result::{SynResult, SyntaxError};
use crate::types::{parse_type, TypeScope};

#[derive(Debug, Default)]
pub struct TypeDeclResult {
    pub arity_table: HashMap<String, usize>,
    pub ctors: Vec<CtorDef>,
    pub extractors: Vec<ExtractorDef>,
}

struct Header {
    name: String,
    type_vars: Vec<String>,
    is_record: bool,
    form: SExpr,
}

/// Scans `forms` for `define-sum`/`define-record` top-level declarations and
/// returns the built arity table, constructors, and extractors, alongside
/// any errors encountered. Non-type-decl forms are left for the caller to
/// process as ordinary definitions or expressions.
pub fn extract_type_decls(forms: &[SExpr]) -> (TypeDeclResult, Vec<SyntaxError>) {
    let mut errors = Vec::new();
    let mut headers: Vec<Header> = Vec::new();
    // `List` is the one always-present built-in type constructor (§3); it is
    // seeded here rather than via a `define-sum` form so every later `define`
    // can reference `(List ...)` regardless of whether the program declares
    // any types of its own, and so redeclaring it is caught by the ordinary
    // duplicate-type-name check below.
    let mut arity_table: HashMap<String, usize> = HashMap::default();
    arity_table.insert("List".to_owned(), 1);

    for form in forms {
        if !is_type_def(form) {
            continue;
        }
        match parse_header(form) {
            Ok(header) => {
                if arity_table.contains_key(&header.name) {
                    errors.push(SyntaxError::DuplicateTypeName { name: header.name.clone(), span: form.span() });
                    continue;
                }
                arity_table.insert(header.name.clone(), header.type_vars.len());
                headers.push(header);
            }
            Err(e) => errors.push(e),
        }
    }

    let mut ctors = Vec::new();
    let mut extractors = Vec::new();

    for header in &headers {
        let bound: HashSet<String> = header.type_vars.iter().cloned().collect();
        let defined = Monotype::defined(
            header.name.clone(),
            header.type_vars.iter().map(|v| Monotype::var(v.clone())).collect(),
        );
        let scope = TypeScope::for_decl(&bound, &arity_table);

        if header.is_record {
            match parse_record_body(&header.form, &header.name, header.type_vars.clone(), &defined, &scope) {
                Ok((ctor, mut exts)) => {
                    ctors.push(ctor);
                    extractors.append(&mut exts);
                }
                Err(mut errs) => errors.append(&mut errs),
            }
        } else {
            match parse_sum_body(&header.form, header.type_vars.clone(), &defined, &scope) {
                Ok(mut new_ctors) => ctors.append(&mut new_ctors),
                Err(mut errs) => errors.append(&mut errs),
            }
        }
    }

    (TypeDeclResult { arity_table, ctors, extractors }, errors)
}

fn is_type_def(form: &SExpr) -> bool {
    matches!(form.head_sym(), Some("define-sum") | Some("define-record"))
}

fn parse_header(form: &SExpr) -> SynResult<Header> {
    let items = form.as_list().expect("is_type_def only accepts lists");
    let is_record = items[0].as_sym() == Some("define-record");
    let span = form.span();

    if items.len() < 3 {
        return Err(SyntaxError::WrongArity {
            message: format!("wrong arity in {}", items[0].as_sym().unwrap_or("type declaration")),
            span,
        });
    }

    let head = &items[1];
    let (name, type_vars) = match head {
        SExpr::Sym(_, name) => {
            check_starts_uppercase(name, head.span())?;
            (name.clone(), Vec::new())
        }
        SExpr::List(_, parts) => {
            if parts.is_empty() {
                return Err(SyntaxError::MalformedForm { message: "type can't be an empty list".to_owned(), span });
            }
            let name = parts[0]
                .as_sym()
                .ok_or_else(|| SyntaxError::NotASymbol { message: "type name must be a symbol".to_owned(), span: parts[0].span() })?;
            check_starts_uppercase(name, parts[0].span())?;

            let mut seen = HashSet::default();
            let mut type_vars = Vec::with_capacity(parts.len() - 1);
            for sym in &parts[1..] {
                let v = sym.as_sym().ok_or_else(|| SyntaxError::NotASymbol {
                    message: "type variable must be a symbol".to_owned(),
                    span: sym.span(),
                })?;
                if !v.chars().next().is_some_and(|c| c.is_lowercase()) {
                    return Err(SyntaxError::MalformedForm {
                        message: format!("type variable `{v}` must start with a lowercase letter"),
                        span: sym.span(),
                    });
                }
                if !seen.insert(v.to_owned()) {
                    return Err(SyntaxError::DuplicateArgument { name: v.to_owned(), span: sym.span() });
                }
                type_vars.push(v.to_owned());
            }
            (name.to_owned(), type_vars)
        }
        other => {
            return Err(SyntaxError::MalformedForm {
                message: "type must be a symbol or a list".to_owned(),
                span: other.span(),
            })
        }
    };

    Ok(Header { name, type_vars, is_record, form: form.clone() })
}

fn check_starts_uppercase(name: &str, span: Option<codespan::Span>) -> SynResult<()> {
    if name.chars().next().is_some_and(|c| c.is_uppercase()) {
        Ok(())
    } else {
        Err(SyntaxError::MalformedForm { message: format!("type name `{name}` must start with an uppercase letter"), span })
    }
}

fn parse_sum_body(
    form: &SExpr,
    type_vars: Vec<String>,
    defined: &Monotype,
    scope: &TypeScope,
) -> Result<Vec<CtorDef>, Vec<SyntaxError>> {
    let items = form.as_list().expect("is_type_def only accepts lists");
    let type_name = defined_name(defined);
    let mut errors = Vec::new();
    let mut ctors = Vec::new();

    for r_ctor in &items[2..] {
        let ctor_items = match r_ctor.as_list() {
            Some(items) if !items.is_empty() => items,
            _ => {
                errors.push(SyntaxError::MalformedForm { message: "wrong form of data constructor".to_owned(), span: r_ctor.span() });
                continue;
            }
        };
        let ctor_name = match ctor_items[0].as_sym() {
            Some(name) => name,
            None => {
                errors.push(SyntaxError::NotASymbol {
                    message: "data constructor name must be a symbol".to_owned(),
                    span: ctor_items[0].span(),
                });
                continue;
            }
        };

        let mut arg_types = Vec::with_capacity(ctor_items.len() - 1);
        let mut ok = true;
        for r_arg in &ctor_items[1..] {
            match parse_type(r_arg, scope) {
                Ok(t) => arg_types.push(t),
                Err(e) => {
                    errors.push(e);
                    ok = false;
                }
            }
        }
        if !ok {
            continue;
        }

        let arity = arg_types.len();
        let ty = ctor_arrow(arg_types, defined.clone());
        ctors.push(CtorDef {
            name: Ident::new(ctor_name, ctor_items[0].span()),
            type_name: type_name.clone(),
            scheme: Scheme { vars: type_vars.clone(), ty },
            arity,
        });
    }

    if errors.is_empty() {
        Ok(ctors)
    } else {
        Err(errors)
    }
}

fn parse_record_body(
    form: &SExpr,
    type_name: &str,
    type_vars: Vec<String>,
    defined: &Monotype,
    scope: &TypeScope,
) -> Result<(CtorDef, Vec<ExtractorDef>), Vec<SyntaxError>> {
    let items = form.as_list().expect("is_type_def only accepts lists");
    let span = form.span();
    if items.len() < 3 {
        return Err(vec![SyntaxError::WrongArity { message: "wrong arity in define-record".to_owned(), span }]);
    }

    let mut errors = Vec::new();
    let mut field_types = Vec::new();
    let mut extractors = Vec::new();

    for (i, r_field) in items[2..].iter().enumerate() {
        let pair = match r_field.as_list() {
            Some(pair) if pair.len() == 2 => pair,
            _ => {
                errors.push(SyntaxError::MalformedForm { message: "field in record define must be a pair".to_owned(), span: r_field.span() });
                continue;
            }
        };
        let field_name = match pair[0].as_sym() {
            Some(name) => name,
            None => {
                errors.push(SyntaxError::NotASymbol { message: "field name must be a symbol".to_owned(), span: pair[0].span() });
                continue;
            }
        };
        let field_type = match parse_type(&pair[1], scope) {
            Ok(t) => t,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        let ext_name = format!("{type_name}.{field_name}");
        extractors.push(ExtractorDef {
            name: Ident::new(ext_name, r_field.span()),
            record_name: type_name.to_owned(),
            field_index: i,
            scheme: Scheme { vars: type_vars.clone(), ty: Monotype::arr(defined.clone(), field_type.clone()) },
        });
        field_types.push(field_type);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let arity = field_types.len();
    let ctor_ty = ctor_arrow(field_types, defined.clone());
    let ctor = CtorDef {
        name: Ident::new(type_name, span),
        type_name: type_name.to_owned(),
        scheme: Scheme { vars: type_vars, ty: ctor_ty },
        arity,
    };

    Ok((ctor, extractors))
}

/// A constructor's (or record's) arrow type over its declared fields: right-
/// associated `τ₁ → … → τₙ → D α…`, or the bare `D α…` when `n = 0`. Unlike
/// [`Monotype::func`] (used for ordinary lambda/application arities), a
/// nullary constructor is *not* `Unit -> D α…` — `Leaf` in a sum type is the
/// value `Tree a` itself, not a thunk that produces one.
fn ctor_arrow(arg_types: Vec<Monotype>, defined: Monotype) -> Monotype {
    arg_types.into_iter().rev().fold(defined, |acc, a| Monotype::arr(a, acc))
}

fn defined_name(ty: &Monotype) -> String {
    match ty {
        Monotype::Defined(_, name, _) => name.clone(),
        _ => unreachable!("header always builds a Defined monotype"),
    }
}
