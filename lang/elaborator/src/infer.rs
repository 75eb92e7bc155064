//! Constraint-generating inference rules for IR expressions and patterns.
//! Each rule produces a provisional monotype plus equations queued on the
//! engine; callers solve the queue and apply the resulting substitution
//! themselves, at whatever boundary their caller considers a definition.

use ast::ir::{Expr, Literal, Pattern};
use ast::types::{Monotype, TypeEnv};
use ast::HasSpan;

use crate::engine::Engine;
use crate::result::{TypeError, TypeResult};

pub fn infer_literal(engine: &mut Engine, lit: &Literal) -> Monotype {
    match lit {
        Literal::Int(_) => Monotype::number(),
        Literal::Float(_) => Monotype::number(),
        Literal::Bool(_) => Monotype::bool(),
        Literal::Symbol(_) => Monotype::symbol(),
        Literal::Str(_) => Monotype::string(),
        Literal::Char(_) => Monotype::char(),
        Literal::List(elems) => {
            if elems.is_empty() {
                return Monotype::list_of(engine.fresh_var());
            }
            let types: Vec<Monotype> = elems.iter().map(|e| infer_literal(engine, e)).collect();
            engine.add_equations(&types, None);
            Monotype::list_of(types[0].clone())
        }
    }
}

pub fn infer_expr(engine: &mut Engine, env: &TypeEnv, expr: &Expr) -> TypeResult<Monotype> {
    match expr {
        Expr::Lit(_, lit) => Ok(infer_literal(engine, lit)),

        Expr::Var(span, name) => {
            let scheme = env.get(name).ok_or_else(|| TypeError::unbound_name(name, *span))?;
            Ok(scheme.instantiate(engine.fresh_gen()))
        }

        Expr::App(span, f, args) => {
            let result = engine.fresh_var();
            let f_ty = infer_expr(engine, env, f)?;
            let mut out_ty = result.clone();
            for arg in args.iter().rev() {
                let arg_ty = infer_expr(engine, env, arg)?;
                out_ty = Monotype::arr(arg_ty, out_ty);
            }
            if args.is_empty() {
                out_ty = Monotype::arr(Monotype::unit(), out_ty);
            }
            engine.add_equation(out_ty, f_ty, *span);
            Ok(result)
        }

        Expr::Lambda(_, params, body) => {
            let param_tys = engine.fresh_vars(params.len());
            let mut new_env = env.clone();
            for (p, t) in params.iter().zip(&param_tys) {
                new_env = new_env.add(p.as_str(), ast::types::Scheme::dummy(t.clone()));
            }
            let body_ty = infer_expr(engine, &new_env, body)?;
            if param_tys.is_empty() {
                Ok(Monotype::arr(Monotype::unit(), body_ty))
            } else {
                Ok(param_tys.into_iter().rev().fold(body_ty, |acc, t| Monotype::arr(t, acc)))
            }
        }

        Expr::Let(_, bindings, body) => {
            let mut cur_env = env.clone();
            for (name, value) in bindings {
                let value_ty = infer_expr(engine, &cur_env, value)?;
                // A non-clearing peek: equations queued so far (including
                // ones about variables outside this let, e.g. the enclosing
                // definition's parameters) must still reach the definition
                // boundary's solve, so the queue is left intact here.
                let subst = engine.solve_peek()?;
                let value_ty = value_ty.apply(&subst);
                let cur_env_applied = cur_env.apply(&subst);
                let scheme = ast::types::generalize(&cur_env_applied, &value_ty);
                cur_env = cur_env_applied.add(name.as_str(), scheme);
            }
            infer_expr(engine, &cur_env, body)
        }

        Expr::If(span, cond, then, els) => {
            let cond_ty = infer_expr(engine, env, cond)?;
            let then_ty = infer_expr(engine, env, then)?;
            let els_ty = infer_expr(engine, env, els)?;
            engine.add_equation(cond_ty, Monotype::bool(), *span);
            engine.add_equation(then_ty.clone(), els_ty.clone(), *span);
            Ok(els_ty)
        }

        Expr::Cond(span, arms) => {
            let mut arm_types = Vec::with_capacity(arms.len());
            for (test, arm) in arms {
                let test_ty = infer_expr(engine, env, test)?;
                engine.add_equation(test_ty, Monotype::bool(), *span);
                arm_types.push(infer_expr(engine, env, arm)?);
            }
            engine.add_equations(&arm_types, *span);
            Ok(arm_types[0].clone())
        }

        Expr::Begin(_, exprs) => {
            let mut last = None;
            for e in exprs {
                last = Some(infer_expr(engine, env, e)?);
            }
            Ok(last.expect("lowering rejects an empty begin"))
        }

        Expr::Set(span, name, value) => {
            let var_scheme = env.get(name).ok_or_else(|| TypeError::unbound_name(name, *span))?;
            let var_ty = var_scheme.instantiate(engine.fresh_gen());
            let value_ty = infer_expr(engine, env, value)?;
            engine.add_equation(var_ty, value_ty, *span);
            Ok(Monotype::unit())
        }

        Expr::Match(span, scrutinee, arms) => {
            let scrut_ty = infer_expr(engine, env, scrutinee)?;
            let mut arm_types = Vec::with_capacity(arms.len());
            for (pat, arm) in arms {
                let (pat_ty, bindings) = infer_pattern(engine, env, pat)?;
                engine.add_equation(pat_ty, scrut_ty.clone(), *span);
                let mut new_env = env.clone();
                for (name, ty) in bindings {
                    new_env = new_env.add(name, ast::types::Scheme::dummy(ty));
                }
                arm_types.push(infer_expr(engine, &new_env, arm)?);
            }
            engine.add_equations(&arm_types, *span);
            Ok(arm_types[0].clone())
        }

        Expr::ListCtor(_, elems) => {
            if elems.is_empty() {
                return Ok(Monotype::list_of(engine.fresh_var()));
            }
            let types: TypeResult<Vec<Monotype>> = elems.iter().map(|e| infer_expr(engine, env, e)).collect();
            let types = types?;
            engine.add_equations(&types, expr.span());
            Ok(Monotype::list_of(types[0].clone()))
        }

        Expr::TupleCtor(_, elems) => {
            if elems.is_empty() {
                return Ok(Monotype::unit());
            }
            let types: TypeResult<Vec<Monotype>> = elems.iter().map(|e| infer_expr(engine, env, e)).collect();
            Ok(Monotype::tuple(types?))
        }
    }
}

/// `(type, bindings)` for a pattern matched against a scrutinee of the
/// returned type. Bindings are unquantified (dummy schemes): pattern
/// variables are never polymorphic within their own arm.
pub fn infer_pattern(engine: &mut Engine, env: &TypeEnv, pat: &Pattern) -> TypeResult<(Monotype, Vec<(String, Monotype)>)> {
    match pat {
        Pattern::Var(_, name) if name == ast::ir::WILDCARD => Ok((engine.fresh_var(), Vec::new())),
        Pattern::Var(_, name) => {
            let ty = engine.fresh_var();
            Ok((ty.clone(), vec![(name.clone(), ty)]))
        }
        Pattern::Lit(_, lit) => Ok((infer_literal(engine, lit), Vec::new())),
        Pattern::List(span, subs) => {
            let mut bindings = Vec::new();
            let mut types = Vec::with_capacity(subs.len());
            for sub in subs {
                let (t, b) = infer_pattern(engine, env, sub)?;
                types.push(t);
                bindings.extend(b);
            }
            engine.add_equations(&types, *span);
            let elem = types.first().cloned().unwrap_or_else(|| engine.fresh_var());
            Ok((Monotype::list_of(elem), bindings))
        }
        Pattern::Tuple(_, subs) => {
            let mut bindings = Vec::new();
            let mut types = Vec::with_capacity(subs.len());
            for sub in subs {
                let (t, b) = infer_pattern(engine, env, sub)?;
                types.push(t);
                bindings.extend(b);
            }
            Ok((Monotype::tuple(types), bindings))
        }
        Pattern::Ctor(span, name, subs) => {
            let ctor_scheme = env.get(name).ok_or_else(|| TypeError::unbound_name(name, *span))?;
            let ctor_ty = ctor_scheme.instantiate(engine.fresh_gen());
            let result = engine.fresh_var();
            let mut bindings = Vec::new();
            let mut actual = result.clone();
            for sub in subs.iter().rev() {
                let (t, b) = infer_pattern(engine, env, sub)?;
                actual = Monotype::arr(t, actual);
                bindings.extend(b);
            }
            engine.add_equation(actual, ctor_ty, *span);
            Ok((result, bindings))
        }
    }
}
