//! Annotation confirmation (§4.5): decides whether an inferred type is an
//! instance of a (possibly partial) user-written annotation.
//!
//! Confirmation runs once per top-level definition, after an SCC's equations
//! are solved but *before* generalization, so that the substitution mapping
//! inferred variables onto annotation variables lines up consistently across
//! every member of the group.

use ast::ir::{AnnotSlot, FnAnnotation};
use ast::types::Monotype;
use ast::HashMap;
use codespan::Span;

use crate::result::{TypeError, TypeResult};

/// Structural match of one monotype against another, threading a
/// substitution from inferred variable names to annotation variable names.
/// `inferred` is the left argument throughout, matching §4.5's convention.
fn confirm_monotype(inferred: &Monotype, annotation: &Monotype, subst: &mut HashMap<String, String>) -> bool {
    match (inferred, annotation) {
        (Monotype::Var(_, i), Monotype::Var(_, a)) => match subst.get(i) {
            Some(mapped) => mapped == a,
            None => {
                subst.insert(i.clone(), a.clone());
                true
            }
        },
        (Monotype::Const(_, i), Monotype::Const(_, a)) => i == a,
        (Monotype::Arr(i1, i2), Monotype::Arr(a1, a2)) => {
            confirm_monotype(i1, a1, subst) && confirm_monotype(i2, a2, subst)
        }
        (Monotype::Tuple(xs), Monotype::Tuple(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| confirm_monotype(x, y, subst))
        }
        (Monotype::Defined(_, n1, xs), Monotype::Defined(_, n2, ys)) => {
            n1 == n2 && xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| confirm_monotype(x, y, subst))
        }
        _ => false,
    }
}

/// Confirms a value-shape (`VarDefine`) annotation, which is a plain
/// monotype with no holes. A missing annotation is always accepted and is
/// not represented here — callers skip confirmation entirely in that case.
pub fn confirm_value(name: &str, inferred: &Monotype, annotation: &Monotype, span: Option<Span>) -> TypeResult<HashMap<String, String>> {
    let mut subst = HashMap::default();
    if confirm_monotype(inferred, annotation, &mut subst) {
        Ok(subst)
    } else {
        let _ = name;
        let renamed = inferred.apply_rename(&subst);
        Err(TypeError::annotation_mismatch(&renamed, annotation, span))
    }
}

/// Confirms a function-shape (`Define`) annotation against an inferred
/// arrow type. `inferred` is expected to be the right-associated arrow chain
/// built by [`ast::types::Monotype::func`] over the definition's parameters.
///
/// Zero-parameter definitions are a special case: `Monotype::func` wraps a
/// zero-argument body in a synthetic `Unit -> ...` arrow that has no
/// counterpart in `FnAnnotation::args` (which is empty for a zero-parameter
/// definition), so only the return slot is confirmed in that case.
///
/// `annotation` is guaranteed to carry at least one `Known` slot: lowering
/// only ever constructs a `Some(FnAnnotation { .. })` when not every slot is
/// a hole (`lowering::defs::parse_define` collapses an all-holes annotation
/// to `None` instead, so callers skip confirmation entirely for it), so this
/// never has to handle — or report on — a wholly-unresolved annotation.
pub fn confirm_define(
    name: &str,
    inferred: &Monotype,
    annotation: &FnAnnotation,
    span: Option<Span>,
) -> TypeResult<HashMap<String, String>> {
    let mut subst = HashMap::default();

    let ret_ok = if annotation.args.is_empty() {
        let (_, ret) = inferred.flatten_arrow();
        match &annotation.ret {
            AnnotSlot::Hole => true,
            AnnotSlot::Known(t) => confirm_monotype(ret, t, &mut subst),
        }
    } else {
        let (args, ret) = inferred.flatten_arrow();
        if args.len() != annotation.args.len() {
            return Err(TypeError::annotation_mismatch(inferred, annotation, span));
        }
        let args_ok = args.iter().zip(&annotation.args).all(|(arg_ty, slot)| match slot {
            AnnotSlot::Hole => true,
            AnnotSlot::Known(t) => confirm_monotype(arg_ty, t, &mut subst),
        });
        let ret_ok = match &annotation.ret {
            AnnotSlot::Hole => true,
            AnnotSlot::Known(t) => confirm_monotype(ret, t, &mut subst),
        };
        args_ok && ret_ok
    };

    if !ret_ok {
        let renamed = inferred.apply_rename(&subst);
        return Err(TypeError::annotation_mismatch(&renamed, annotation, span));
    }

    let _ = name;
    Ok(subst)
}

trait ApplyRename {
    fn apply_rename(&self, subst: &HashMap<String, String>) -> Monotype;
}

impl ApplyRename for Monotype {
    /// Renders `self` with every free variable that has an entry in `subst`
    /// replaced by its mapped annotation-side name, purely for a readable
    /// mismatch diagnostic — this is not a real substitution application.
    fn apply_rename(&self, subst: &HashMap<String, String>) -> Monotype {
        match self {
            Monotype::Var(span, v) => match subst.get(v) {
                Some(mapped) => Monotype::Var(*span, mapped.clone()),
                None => Monotype::Var(*span, v.clone()),
            },
            Monotype::Const(span, n) => Monotype::Const(*span, n.clone()),
            Monotype::Arr(a, b) => Monotype::Arr(Box::new(a.apply_rename(subst)), Box::new(b.apply_rename(subst))),
            Monotype::Tuple(ts) => Monotype::Tuple(ts.iter().map(|t| t.apply_rename(subst)).collect()),
            Monotype::Defined(span, n, ts) => {
                Monotype::Defined(*span, n.clone(), ts.iter().map(|t| t.apply_rename(subst)).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_holed_arg_slot_matches_whatever_was_inferred_there() {
        // (define (f x (y Bool)) ... x ...) — `x` is bare, `y` is annotated.
        let ann = FnAnnotation { args: vec![AnnotSlot::Hole, AnnotSlot::Known(Monotype::bool())], ret: AnnotSlot::Hole };
        let inferred = Monotype::func(vec![Monotype::number(), Monotype::bool()], Monotype::number());
        assert!(confirm_define("f", &inferred, &ann, None).is_ok());
    }

    #[test]
    fn known_slots_confirm_structurally() {
        let ann = FnAnnotation { args: vec![AnnotSlot::Known(Monotype::number())], ret: AnnotSlot::Known(Monotype::bool()) };
        let inferred = Monotype::arr(Monotype::number(), Monotype::bool());
        assert!(confirm_define("f", &inferred, &ann, None).is_ok());
    }

    #[test]
    fn mismatched_known_slot_is_rejected() {
        let ann = FnAnnotation { args: vec![AnnotSlot::Known(Monotype::number())], ret: AnnotSlot::Known(Monotype::bool()) };
        let inferred = Monotype::arr(Monotype::number(), Monotype::number());
        assert!(confirm_define("f", &inferred, &ann, None).is_err());
    }

    #[test]
    fn tuple_annotation_confirms_pointwise_and_renames_type_vars() {
        // (define (swap (p (* a b))) (* b a) ...) — inferred `p`'s tuple
        // element variables rename onto the annotation's `a`/`b`.
        let ann_tuple = Monotype::Tuple(vec![Monotype::var("a"), Monotype::var("b")]);
        let ret_tuple = Monotype::Tuple(vec![Monotype::var("b"), Monotype::var("a")]);
        let ann = FnAnnotation {
            args: vec![AnnotSlot::Known(ann_tuple)],
            ret: AnnotSlot::Known(ret_tuple),
        };
        let inferred_p = Monotype::Tuple(vec![Monotype::var("x"), Monotype::var("y")]);
        let inferred_ret = Monotype::Tuple(vec![Monotype::var("y"), Monotype::var("x")]);
        let inferred = Monotype::arr(inferred_p, inferred_ret);
        let subst = confirm_define("swap", &inferred, &ann, None).unwrap();
        assert_eq!(subst.get("x"), Some(&"a".to_owned()));
        assert_eq!(subst.get("y"), Some(&"b".to_owned()));
    }

    #[test]
    fn value_annotation_mismatch_is_rejected() {
        let err = confirm_value("f", &Monotype::number(), &Monotype::bool(), None).unwrap_err();
        assert!(matches!(err, TypeError::AnnotationMismatch { .. }));
    }

    #[test]
    fn zero_param_define_confirms_only_the_return_slot() {
        let ann = FnAnnotation { args: vec![], ret: AnnotSlot::Known(Monotype::number()) };
        let inferred = Monotype::arr(Monotype::unit(), Monotype::number());
        assert!(confirm_define("const", &inferred, &ann, None).is_ok());
    }
}
