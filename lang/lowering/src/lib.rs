//! Lowers a program's surface forms (`SExpr`) into the typed IR consumed by
//! the inference engine: type declarations are extracted first so every
//! later `define` can see the full constructor/arity table regardless of
//! declaration order, then each remaining top-level form is parsed as
//! either a definition or a bare expression.

pub mod defs;
pub mod exprs;
pub mod patterns;
pub mod result;
pub mod type_decls;
pub mod types;

use ast::ir::{CtorDef, Def, ExtractorDef};
use ast::ir::Expr;
use ast::{HashMap, SExpr};

pub use result::{SynResult, SyntaxError};
pub use type_decls::TypeDeclResult;

/// The lowered form of a whole program: declared constructors/extractors
/// (from `define-sum`/`define-record`), top-level definitions, and any bare
/// top-level expressions.
#[derive(Debug, Default)]
pub struct LoweredProgram {
    pub arity_table: HashMap<String, usize>,
    pub ctors: Vec<CtorDef>,
    pub extractors: Vec<ExtractorDef>,
    pub defs: Vec<Def>,
    pub exprs: Vec<Expr>,
}

/// Lowers a whole program. Errors are accumulated rather than short-circuited
/// so a single malformed form doesn't hide the rest of the program's
/// problems; malformed forms are simply skipped in the returned program.
pub fn lower_program(forms: &[SExpr]) -> (LoweredProgram, Vec<SyntaxError>) {
    let (decl_result, mut errors) = type_decls::extract_type_decls(forms);

    let mut defs = Vec::new();
    let mut exprs = Vec::new();

    for form in forms {
        if is_type_decl(form) {
            continue;
        }
        match form.head_sym() {
            Some("define") => match defs::parse_define(form, &decl_result.arity_table) {
                Ok(def) => defs.push(def),
                Err(e) => errors.push(e),
            },
            _ => match exprs::parse_expr(form) {
                Ok(e) => exprs.push(e),
                Err(e) => errors.push(e),
            },
        }
    }

    let program = LoweredProgram {
        arity_table: decl_result.arity_table,
        ctors: decl_result.ctors,
        extractors: decl_result.extractors,
        defs,
        exprs,
    };

    (program, errors)
}

fn is_type_decl(form: &SExpr) -> bool {
    matches!(form.head_sym(), Some("define-sum") | Some("define-record"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::ir::Literal;

    #[test]
    fn program_with_type_decl_and_define_lowers_both() {
        let forms = vec![
            SExpr::list([
                SExpr::sym("define-sum"),
                SExpr::list([SExpr::sym("Opt"), SExpr::sym("a")]),
                SExpr::list([SExpr::sym("None")]),
                SExpr::list([SExpr::sym("Some"), SExpr::sym("a")]),
            ]),
            SExpr::list([SExpr::sym("define"), SExpr::sym("x"), SExpr::int(1)]),
        ];
        let (program, errors) = lower_program(&forms);
        assert!(errors.is_empty());
        assert_eq!(program.ctors.len(), 2);
        assert_eq!(program.defs.len(), 1);
    }

    #[test]
    fn bare_top_level_expression_is_collected() {
        let forms = vec![SExpr::list([SExpr::sym("+"), SExpr::int(1), SExpr::int(2)])];
        let (program, errors) = lower_program(&forms);
        assert!(errors.is_empty());
        assert_eq!(program.exprs.len(), 1);
    }

    #[test]
    fn malformed_form_is_recorded_but_does_not_stop_the_rest() {
        let forms = vec![
            SExpr::list([SExpr::sym("define")]),
            SExpr::list([SExpr::sym("quote"), SExpr::sym("ok")]),
        ];
        let (program, errors) = lower_program(&forms);
        assert_eq!(errors.len(), 1);
        assert_eq!(program.exprs, vec![Expr::Lit(None, Literal::Symbol("ok".to_owned()))]);
    }
}
