//! Free-reference collection for Pass 2's dependency graph: which top-level
//! names does a definition's body mention, ignoring names that are locally
//! shadowed by a lambda formal, a `let` binding, or a pattern binding.
//!
//! This is deliberately a separate, small scope-tracking walk rather than a
//! reuse of [`ast::ir::Pattern::bindings`]/inference's environment: the
//! driver only needs *which top-level name is mentioned*, not a type.

use ast::ir::{Def, Expr};
use ast::HashSet;

/// The set of top-level names that `def`'s body references, restricted to
/// `top_level` (so a reference to a built-in or an as-yet-undefined name is
/// simply not an edge — it surfaces as `UnboundName` at inference time
/// instead).
pub fn def_refs(def: &Def, top_level: &HashSet<String>) -> HashSet<String> {
    let mut bound = HashSet::default();
    if let Def::Define { params, .. } = def {
        for p in params {
            bound.insert(p.as_str().to_owned());
        }
    }
    let mut out = HashSet::default();
    expr_refs(def.body(), &bound, top_level, &mut out);
    out
}

fn expr_refs(expr: &Expr, bound: &HashSet<String>, top_level: &HashSet<String>, out: &mut HashSet<String>) {
    match expr {
        Expr::Lit(..) => {}

        Expr::Var(_, name) => record(name, bound, top_level, out),

        Expr::App(_, f, args) => {
            expr_refs(f, bound, top_level, out);
            for a in args {
                expr_refs(a, bound, top_level, out);
            }
        }

        Expr::Lambda(_, params, body) => {
            let mut inner = bound.clone();
            inner.extend(params.iter().map(|p| p.as_str().to_owned()));
            expr_refs(body, &inner, top_level, out);
        }

        Expr::Let(_, bindings, body) => {
            let mut inner = bound.clone();
            for (name, value) in bindings {
                expr_refs(value, &inner, top_level, out);
                inner.insert(name.as_str().to_owned());
            }
            expr_refs(body, &inner, top_level, out);
        }

        Expr::If(_, c, t, e) => {
            expr_refs(c, bound, top_level, out);
            expr_refs(t, bound, top_level, out);
            expr_refs(e, bound, top_level, out);
        }

        Expr::Cond(_, arms) => {
            for (test, arm) in arms {
                expr_refs(test, bound, top_level, out);
                expr_refs(arm, bound, top_level, out);
            }
        }

        Expr::Match(_, scrutinee, arms) => {
            expr_refs(scrutinee, bound, top_level, out);
            for (pat, arm) in arms {
                let mut inner = bound.clone();
                inner.extend(pat.bindings().into_iter().map(|(name, _)| name));
                expr_refs(arm, &inner, top_level, out);
            }
        }

        Expr::Begin(_, exprs) => {
            for e in exprs {
                expr_refs(e, bound, top_level, out);
            }
        }

        Expr::Set(_, name, value) => {
            record(name, bound, top_level, out);
            expr_refs(value, bound, top_level, out);
        }

        Expr::ListCtor(_, elems) | Expr::TupleCtor(_, elems) => {
            for e in elems {
                expr_refs(e, bound, top_level, out);
            }
        }
    }
}

fn record(name: &str, bound: &HashSet<String>, top_level: &HashSet<String>, out: &mut HashSet<String>) {
    if !bound.contains(name) && top_level.contains(name) {
        out.insert(name.to_owned());
    }
}
