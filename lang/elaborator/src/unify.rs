//! Robinson unification with occurs check over `Monotype`.

use ast::types::{compose, Monotype, Subst};

use crate::result::{TypeError, TypeResult};

/// Unifies two monotypes, returning the most general substitution that makes
/// them equal. The span is attributed to whichever call site is reporting
/// the failure (typically an SCC's first source span), not to either type.
pub fn unify(t1: &Monotype, t2: &Monotype, span: Option<codespan::Span>) -> TypeResult<Subst> {
    if t1 == t2 {
        return Ok(Subst::default());
    }

    match (t1, t2) {
        (Monotype::Var(_, v), _) => bind(v, t2, span),
        (_, Monotype::Var(_, v)) => bind(v, t1, span),
        (Monotype::Arr(a1, b1), Monotype::Arr(a2, b2)) => {
            unify_list(&[((**a1).clone(), (**a2).clone()), ((**b1).clone(), (**b2).clone())], span)
        }
        (Monotype::Tuple(xs), Monotype::Tuple(ys)) => {
            if xs.len() != ys.len() {
                return Err(TypeError::mismatch(t1, t2, span));
            }
            let pairs: Vec<_> = xs.iter().cloned().zip(ys.iter().cloned()).collect();
            unify_list(&pairs, span)
        }
        (Monotype::Defined(_, n1, xs), Monotype::Defined(_, n2, ys)) => {
            if n1 != n2 || xs.len() != ys.len() {
                return Err(TypeError::mismatch(t1, t2, span));
            }
            let pairs: Vec<_> = xs.iter().cloned().zip(ys.iter().cloned()).collect();
            unify_list(&pairs, span)
        }
        _ => Err(TypeError::mismatch(t1, t2, span)),
    }
}

fn bind(var: &str, ty: &Monotype, span: Option<codespan::Span>) -> TypeResult<Subst> {
    if let Monotype::Var(_, other) = ty {
        if other == var {
            return Ok(Subst::default());
        }
    }
    if ty.ftv().contains(var) {
        return Err(TypeError::occurs_check_failed(var, ty, span));
    }
    let mut s = Subst::default();
    s.insert(var.to_owned(), ty.clone());
    Ok(s)
}

/// Solves a list of constraints left to right: each produced substitution is
/// applied to the remaining pairs before continuing, then the partial
/// substitutions are composed. The left-to-right order is load-bearing — it
/// determines which variable survives in a cycle like `(a,b),(b,a)`.
pub fn unify_list(pairs: &[(Monotype, Monotype)], span: Option<codespan::Span>) -> TypeResult<Subst> {
    let mut lefts: Vec<Monotype> = pairs.iter().map(|(l, _)| l.clone()).collect();
    let mut rights: Vec<Monotype> = pairs.iter().map(|(_, r)| r.clone()).collect();
    let mut result = Subst::default();

    for i in 0..pairs.len() {
        let su = unify(&lefts[i], &rights[i], span)?;
        for j in i..pairs.len() {
            lefts[j] = lefts[j].apply(&su);
            rights[j] = rights[j].apply(&su);
        }
        result = compose(&su, &result);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_monotypes_unify_to_empty_subst() {
        let s = unify(&Monotype::number(), &Monotype::number(), None).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn var_unifies_to_the_other_side() {
        let s = unify(&Monotype::var("a"), &Monotype::number(), None).unwrap();
        assert_eq!(s.get("a"), Some(&Monotype::number()));
    }

    #[test]
    fn occurs_check_rejects_self_referential_binding() {
        let a = Monotype::var("a");
        let t = Monotype::arr(a.clone(), Monotype::number());
        assert!(matches!(unify(&a, &t, None), Err(TypeError::OccursCheck { .. })));
    }

    #[test]
    fn arrow_unifies_pointwise() {
        let t1 = Monotype::arr(Monotype::var("a"), Monotype::var("b"));
        let t2 = Monotype::arr(Monotype::number(), Monotype::bool());
        let s = unify(&t1, &t2, None).unwrap();
        assert_eq!(s.get("a"), Some(&Monotype::number()));
        assert_eq!(s.get("b"), Some(&Monotype::bool()));
    }

    #[test]
    fn tuple_arity_mismatch_is_a_type_mismatch() {
        let t1 = Monotype::Tuple(vec![Monotype::number(), Monotype::number()]);
        let t2 = Monotype::Tuple(vec![Monotype::number()]);
        assert!(matches!(unify(&t1, &t2, None), Err(TypeError::Mismatch { .. })));
    }

    #[test]
    fn defined_name_mismatch_is_a_type_mismatch() {
        let t1 = Monotype::defined("List", vec![Monotype::number()]);
        let t2 = Monotype::defined("Option", vec![Monotype::number()]);
        assert!(matches!(unify(&t1, &t2, None), Err(TypeError::Mismatch { .. })));
    }

    #[test]
    fn cyclic_equations_resolve_left_to_right() {
        let a = Monotype::var("a");
        let b = Monotype::var("b");
        let pairs = vec![(a.clone(), b.clone()), (b.clone(), a.clone())];
        let s = unify_list(&pairs, None).unwrap();
        // The first pair binds a -> b; the second, after applying that
        // substitution, becomes b = b and contributes nothing further.
        assert_eq!(s.get("a"), Some(&b));
    }

    #[test]
    fn soundness_holds_on_a_successful_unification() {
        let t1 = Monotype::arr(Monotype::var("a"), Monotype::number());
        let t2 = Monotype::arr(Monotype::bool(), Monotype::var("b"));
        let s = unify(&t1, &t2, None).unwrap();
        assert_eq!(t1.apply(&s), t2.apply(&s));
    }
}
