//! Pass 3 and overall orchestration (§4.4): per-SCC inference, annotation
//! confirmation before generalization, and environment extension in
//! topological order.

use ast::ir::{Def, Expr};
use ast::types::{FreshVarGen, Monotype, Scheme, Subst, TypeEnv};
use ast::{HashMap, HashSet, SExpr};
use elaborator::{confirm_define, confirm_value, infer_expr, Engine, EngineConfig, TypeError};

use crate::builtins::builtin_env;
use crate::dependency_graph::scc_groups_in_topological_order;
use crate::result::Diagnostic;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompileConfig {
    pub engine: EngineConfig,
}

/// Everything the driver produces from one program: the final typing
/// environment (builtins, constructors, extractors, and every definition
/// that type-checked), the user-visible renamed scheme per definition name
/// that made it into the environment, and the flattened diagnostic list.
#[derive(Debug, Default)]
pub struct CompileOutput {
    pub env: TypeEnv,
    pub schemes: HashMap<String, Scheme>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn compile(forms: &[SExpr], config: CompileConfig) -> CompileOutput {
    let (program, syntax_errors) = lowering::lower_program(forms);
    let mut diagnostics: Vec<Diagnostic> = syntax_errors.iter().map(Diagnostic::from_syntax_error).collect();

    let mut env = builtin_env();
    for ctor in &program.ctors {
        env = env.add(ctor.name.as_str(), ctor.scheme.clone());
    }
    for ext in &program.extractors {
        env = env.add(ext.name.as_str(), ext.scheme.clone());
    }
    log::debug!(
        "pass 1 done: {} type(s), {} constructor(s), {} extractor(s)",
        program.arity_table.len(),
        program.ctors.len(),
        program.extractors.len()
    );

    let mut engine = Engine::new(config.engine);
    let mut schemes: HashMap<String, Scheme> = HashMap::default();

    let groups = scc_groups_in_topological_order(&program.defs);
    log::debug!("pass 2 done: {} SCC group(s) scheduled", groups.len());

    let defs_by_name: HashMap<String, &Def> =
        program.defs.iter().map(|d| (d.name().as_str().to_owned(), d)).collect();

    for group in &groups {
        log::debug!("entering SCC {:?}", group);
        match infer_group(&mut engine, &env, group, &defs_by_name) {
            Ok(members) => {
                for (name, scheme, member_diagnostics) in members {
                    diagnostics.extend(member_diagnostics);
                    if let Some(scheme) = scheme {
                        env = env.add(&name, scheme.clone());
                        schemes.insert(name, scheme);
                    }
                }
            }
            Err(err) => {
                log::warn!("SCC {:?} skipped: {err}", group);
                diagnostics.push(Diagnostic::from_type_error(&err));
            }
        }
        log::debug!("leaving SCC {:?}", group);
    }

    for expr in &program.exprs {
        if let Err(err) = infer_standalone_expr(&mut engine, &env, expr) {
            diagnostics.push(Diagnostic::from_type_error(&err));
        }
    }

    CompileOutput { env, schemes, diagnostics }
}

fn infer_standalone_expr(engine: &mut Engine, env: &TypeEnv, expr: &Expr) -> elaborator::TypeResult<()> {
    infer_expr(engine, env, expr)?;
    engine.solve()?;
    Ok(())
}

/// The fresh monotype allocated for one SCC member before its body is
/// inferred: function-shape gets one fresh variable per parameter plus a
/// fresh return type, value-shape a single fresh return type (§4.4 step 1).
struct MemberShape<'a> {
    def: &'a Def,
    param_tys: Vec<Monotype>,
    ret_ty: Monotype,
    whole_ty: Monotype,
}

fn allocate_shape<'a>(engine: &mut Engine, def: &'a Def) -> MemberShape<'a> {
    match def {
        Def::Define { params, .. } => {
            let param_tys = engine.fresh_vars(params.len());
            let ret_ty = engine.fresh_var();
            let whole_ty = Monotype::func(param_tys.clone(), ret_ty.clone());
            MemberShape { def, param_tys, ret_ty, whole_ty }
        }
        Def::VarDefine { .. } => {
            let ret_ty = engine.fresh_var();
            MemberShape { def, param_tys: Vec::new(), ret_ty: ret_ty.clone(), whole_ty: ret_ty }
        }
    }
}

type MemberResult = (String, Option<Scheme>, Vec<Diagnostic>);

/// Infers one SCC jointly (a singleton group is simply the n=1 case) and
/// returns, per member, its final renamed scheme (`None` if the member's own
/// annotation was rejected) and any diagnostics raised while confirming it.
/// A unification failure anywhere in the group fails the whole group with a
/// single error carrying its first member's span (§7): the group contributes
/// no bindings at all in that case.
fn infer_group(
    engine: &mut Engine,
    env: &TypeEnv,
    group: &[String],
    defs_by_name: &HashMap<String, &Def>,
) -> elaborator::TypeResult<Vec<MemberResult>> {
    let shapes: Vec<MemberShape> = group.iter().map(|name| allocate_shape(engine, defs_by_name[name])).collect();

    let mut group_env = env.clone();
    for shape in &shapes {
        group_env = group_env.add(shape.def.name().as_str(), Scheme::dummy(shape.whole_ty.clone()));
    }

    for shape in &shapes {
        let span = shape.def.span();
        let body_ty = match shape.def {
            Def::Define { params, body, .. } => {
                let mut body_env = group_env.clone();
                for (param, ty) in params.iter().zip(&shape.param_tys) {
                    body_env = body_env.add(param.as_str(), Scheme::dummy(ty.clone()));
                }
                infer_expr(engine, &body_env, body)?
            }
            Def::VarDefine { body, .. } => infer_expr(engine, &group_env, body)?,
        };
        engine.add_equation(shape.ret_ty.clone(), body_ty, span);
    }

    let first_span = shapes.first().and_then(|s| s.def.span());
    let subst = engine.solve().map_err(|e| retarget_span(e, first_span))?;

    let mut results = Vec::with_capacity(shapes.len());
    for shape in &shapes {
        results.push(finish_member(shape, &subst, env));
    }
    Ok(results)
}

/// A solve failure inside a group is reported at the group's first span
/// rather than wherever inside the group the offending equation happened to
/// be queued, per §7's "single annotated error carrying the SCC's first
/// source span".
fn retarget_span(err: TypeError, span: Option<codespan::Span>) -> TypeError {
    match err {
        TypeError::Mismatch { lhs, rhs, .. } => TypeError::Mismatch { lhs, rhs, span },
        TypeError::OccursCheck { var, ty, .. } => TypeError::OccursCheck { var, ty, span },
        other => other,
    }
}

fn finish_member(shape: &MemberShape, subst: &Subst, env_before_group: &TypeEnv) -> MemberResult {
    let name = shape.def.name().as_str().to_owned();
    let applied = shape.whole_ty.apply(subst);
    let span = shape.def.span();

    let mut diagnostics = Vec::new();

    let confirmed = match shape.def {
        Def::Define { annotation: Some(ann), .. } => match confirm_define(&name, &applied, ann, span) {
            Ok(_) => true,
            Err(e) => {
                diagnostics.push(Diagnostic::from_type_error(&e));
                false
            }
        },
        Def::VarDefine { annotation: Some(ann), .. } => match confirm_value(&name, &applied, ann, span) {
            Ok(_) => true,
            Err(e) => {
                diagnostics.push(Diagnostic::from_type_error(&e));
                false
            }
        },
        _ => true,
    };

    if !confirmed {
        return (name, None, diagnostics);
    }

    let env_applied = env_before_group.apply(subst);
    let scheme = canonicalize(&ast::types::generalize(&env_applied, &applied));
    (name, Some(scheme), diagnostics)
}

/// Renames a generalized scheme's quantified variables to fresh, clean
/// names in first-occurrence order, independent of whatever names the
/// inference engine's single program-wide counter happened to allocate —
/// the engine's counter guarantees uniqueness, not a readable display order.
fn canonicalize(scheme: &Scheme) -> Scheme {
    if scheme.vars.is_empty() {
        return scheme.clone();
    }
    let quantified: HashSet<String> = scheme.vars.iter().cloned().collect();
    let mut order = Vec::new();
    collect_first_occurrence(&scheme.ty, &quantified, &mut order);

    let mut fresh = FreshVarGen::new();
    let subst: Subst = order.iter().map(|v| (v.clone(), Monotype::var(fresh.next()))).collect();
    let vars = order
        .iter()
        .map(|v| match &subst[v] {
            Monotype::Var(_, n) => n.clone(),
            _ => unreachable!("canonicalize only ever maps a var to a var"),
        })
        .collect();
    Scheme { vars, ty: scheme.ty.apply(&subst) }
}

fn collect_first_occurrence(ty: &Monotype, quantified: &HashSet<String>, order: &mut Vec<String>) {
    match ty {
        Monotype::Var(_, v) => {
            if quantified.contains(v) && !order.contains(v) {
                order.push(v.clone());
            }
        }
        Monotype::Const(..) => {}
        Monotype::Arr(a, b) => {
            collect_first_occurrence(a, quantified, order);
            collect_first_occurrence(b, quantified, order);
        }
        Monotype::Tuple(ts) | Monotype::Defined(_, _, ts) => {
            for t in ts {
                collect_first_occurrence(t, quantified, order);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> SExpr {
        SExpr::sym(s)
    }

    #[test]
    fn independent_values_both_type_check() {
        let forms = vec![
            SExpr::list([sym("define"), sym("x"), SExpr::int(1)]),
            SExpr::list([sym("define"), sym("y"), SExpr::bool(true)]),
        ];
        let out = compile(&forms, CompileConfig::default());
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.schemes["x"].ty, Monotype::number());
        assert_eq!(out.schemes["y"].ty, Monotype::bool());
    }

    #[test]
    fn identity_function_is_polymorphic() {
        let forms = vec![SExpr::list([
            sym("define"),
            SExpr::list([sym("id"), sym("x")]),
            sym("x"),
        ])];
        let out = compile(&forms, CompileConfig::default());
        assert!(out.diagnostics.is_empty());
        let scheme = &out.schemes["id"];
        assert_eq!(scheme.vars.len(), 1);
        let expected = Monotype::arr(Monotype::var("a"), Monotype::var("a"));
        assert!(elaborator::confirm_value("id", &scheme.ty, &expected, None).is_ok());
    }

    #[test]
    fn compose_has_three_quantified_vars_in_the_expected_shape() {
        // (define (compose f g) (lambda (x) (f (g x))))
        let body = SExpr::list([
            sym("lambda"),
            SExpr::list([sym("x")]),
            SExpr::list([sym("f"), SExpr::list([sym("g"), sym("x")])]),
        ]);
        let forms = vec![SExpr::list([sym("define"), SExpr::list([sym("compose"), sym("f"), sym("g")]), body])];
        let out = compile(&forms, CompileConfig::default());
        assert!(out.diagnostics.is_empty());
        let scheme = &out.schemes["compose"];
        assert_eq!(scheme.vars.len(), 3);
        let expected = Monotype::func(
            vec![
                Monotype::arr(Monotype::var("b"), Monotype::var("c")),
                Monotype::arr(Monotype::var("a"), Monotype::var("b")),
            ],
            Monotype::arr(Monotype::var("a"), Monotype::var("c")),
        );
        assert!(elaborator::confirm_value("compose", &scheme.ty, &expected, None).is_ok());
    }

    #[test]
    fn mutually_recursive_predicates_are_inferred_as_one_group() {
        // (define (even? n) (if (= n 0) #t (odd? (- n 1))))
        // (define (odd? n) (if (= n 0) #f (even? (- n 1))))
        let even_body = SExpr::list([
            sym("if"),
            SExpr::list([sym("="), sym("n"), SExpr::int(0)]),
            SExpr::bool(true),
            SExpr::list([sym("odd?"), SExpr::list([sym("-"), sym("n"), SExpr::int(1)])]),
        ]);
        let odd_body = SExpr::list([
            sym("if"),
            SExpr::list([sym("="), sym("n"), SExpr::int(0)]),
            SExpr::bool(false),
            SExpr::list([sym("even?"), SExpr::list([sym("-"), sym("n"), SExpr::int(1)])]),
        ]);
        let forms = vec![
            SExpr::list([sym("define"), SExpr::list([sym("even?"), sym("n")]), even_body]),
            SExpr::list([sym("define"), SExpr::list([sym("odd?"), sym("n")]), odd_body]),
        ];
        let out = compile(&forms, CompileConfig::default());
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.schemes["even?"].ty, Monotype::arr(Monotype::number(), Monotype::bool()));
        assert_eq!(out.schemes["odd?"].ty, Monotype::arr(Monotype::number(), Monotype::bool()));
    }

    #[test]
    fn annotation_mismatch_is_reported_and_the_name_is_not_bound() {
        // (define (f (x Number)) Bool x)
        let forms = vec![SExpr::list([
            sym("define"),
            SExpr::list([sym("f"), SExpr::list([sym("x"), sym("Number")])]),
            sym("Bool"),
            sym("x"),
        ])];
        let out = compile(&forms, CompileConfig::default());
        assert_eq!(out.diagnostics.len(), 1);
        assert!(!out.schemes.contains_key("f"));
    }

    #[test]
    fn self_application_fails_the_occurs_check_and_the_name_is_not_bound() {
        // (define (omega x) (x x)) — x would have to unify with x -> r.
        let forms = vec![SExpr::list([
            sym("define"),
            SExpr::list([sym("omega"), sym("x")]),
            SExpr::list([sym("x"), sym("x")]),
        ])];
        let out = compile(&forms, CompileConfig::default());
        assert_eq!(out.diagnostics.len(), 1);
        assert!(!out.schemes.contains_key("omega"));
    }

    #[test]
    fn let_binding_does_not_discard_equations_about_the_enclosing_parameter() {
        // (define (f x) (let ((y (+ x 1))) y)) — `x`'s equation (from the
        // `+` application inside the let) must still reach the definition
        // boundary solve, so `f` is monomorphic `Number -> Number`, not
        // `∀a. a -> Number`.
        let let_body = SExpr::list([
            sym("let"),
            SExpr::list([SExpr::list([sym("y"), SExpr::list([sym("+"), sym("x"), SExpr::int(1)])])]),
            sym("y"),
        ]);
        let forms = vec![SExpr::list([sym("define"), SExpr::list([sym("f"), sym("x")]), let_body])];
        let out = compile(&forms, CompileConfig::default());
        assert!(out.diagnostics.is_empty());
        let scheme = &out.schemes["f"];
        assert!(scheme.vars.is_empty());
        assert_eq!(scheme.ty, Monotype::arr(Monotype::number(), Monotype::number()));
    }

    #[test]
    fn nullary_ctor_unifies_against_its_recursive_type_in_a_match() {
        // (define-sum (Tree a) (Leaf) (Node (Tree a) a (Tree a)))
        // (define (depth t)
        //   (match t
        //     ((Leaf) 0)
        //     ((Node l _ r) (+ 1 (if (> (depth l) (depth r)) (depth l) (depth r))))))
        let tree_decl = SExpr::list([
            sym("define-sum"),
            SExpr::list([sym("Tree"), sym("a")]),
            SExpr::list([sym("Leaf")]),
            SExpr::list([sym("Node"), SExpr::list([sym("Tree"), sym("a")]), sym("a"), SExpr::list([sym("Tree"), sym("a")])]),
        ]);
        let leaf_arm = (SExpr::list([sym("Leaf")]), SExpr::int(0));
        let deeper = SExpr::list([
            sym("if"),
            SExpr::list([sym(">"), SExpr::list([sym("depth"), sym("l")]), SExpr::list([sym("depth"), sym("r")])]),
            SExpr::list([sym("depth"), sym("l")]),
            SExpr::list([sym("depth"), sym("r")]),
        ]);
        let node_arm = (
            SExpr::list([sym("Node"), sym("l"), sym("_"), sym("r")]),
            SExpr::list([sym("+"), SExpr::int(1), deeper]),
        );
        let body = SExpr::list([
            sym("match"),
            sym("t"),
            SExpr::list([leaf_arm.0, leaf_arm.1]),
            SExpr::list([node_arm.0, node_arm.1]),
        ]);
        let depth_def = SExpr::list([sym("define"), SExpr::list([sym("depth"), sym("t")]), body]);

        let out = compile(&[tree_decl, depth_def], CompileConfig::default());
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        let scheme = &out.schemes["depth"];
        assert_eq!(scheme.vars.len(), 1);
        let expected = Monotype::arr(Monotype::defined("Tree", vec![Monotype::var("a")]), Monotype::number());
        assert!(elaborator::confirm_value("depth", &scheme.ty, &expected, None).is_ok());
    }

    #[test]
    fn list_literal_infers_element_type() {
        let forms = vec![SExpr::list([
            sym("define"),
            sym("xs"),
            SExpr::list([sym("quote"), SExpr::list([SExpr::int(1), SExpr::int(2)])]),
        ])];
        let out = compile(&forms, CompileConfig::default());
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.schemes["xs"].ty, Monotype::list_of(Monotype::number()));
    }
}
