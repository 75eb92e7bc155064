//! The built-in typing environment (§3 "Built-in environment"): the `List`
//! sum type and its constructors, arithmetic/comparison/boolean primitives,
//! `rand`, and the I/O primitives. Seeded once, before any user top-level
//! form is processed, so every definition can reference them unconditionally.
//!
//! Every built-in is its own polymorphic [`Scheme`]; instantiating `cons`
//! twice in the same program allocates two independent fresh type variables
//! the same way any other call to a polymorphic function would, since
//! instantiation always happens at the `Var` lookup site, never here.

use ast::types::{Monotype, Scheme, TypeEnv};

fn scheme(vars: &[&str], ty: Monotype) -> Scheme {
    Scheme { vars: vars.iter().map(|v| v.to_string()).collect(), ty }
}

/// Builds the environment every compilation starts from, before any
/// `define-sum`/`define-record`/`define` form has been processed.
pub fn builtin_env() -> TypeEnv {
    let list_a = Monotype::list_of(Monotype::var("a"));

    TypeEnv::empty()
        // List a, with Cons/Nil and the classic accessor primitives.
        .add("Cons", scheme(&["a"], Monotype::func(vec![Monotype::var("a"), list_a.clone()], list_a.clone())))
        .add("Nil", scheme(&["a"], list_a.clone()))
        .add("cons", scheme(&["a"], Monotype::func(vec![Monotype::var("a"), list_a.clone()], list_a.clone())))
        .add("car", scheme(&["a"], Monotype::arr(list_a.clone(), Monotype::var("a"))))
        .add("cdr", scheme(&["a"], Monotype::arr(list_a.clone(), list_a.clone())))
        .add("null", scheme(&["a"], list_a))
        // Arithmetic over the single numeric type.
        .add("+", scheme(&[], binop(Monotype::number(), Monotype::number())))
        .add("-", scheme(&[], binop(Monotype::number(), Monotype::number())))
        .add("*", scheme(&[], binop(Monotype::number(), Monotype::number())))
        .add("/", scheme(&[], binop(Monotype::number(), Monotype::number())))
        .add("=", scheme(&[], binop(Monotype::number(), Monotype::bool())))
        .add(">", scheme(&[], binop(Monotype::number(), Monotype::bool())))
        .add("<", scheme(&[], binop(Monotype::number(), Monotype::bool())))
        // Booleans.
        .add("and", scheme(&[], binop(Monotype::bool(), Monotype::bool())))
        .add("or", scheme(&[], binop(Monotype::bool(), Monotype::bool())))
        .add("not", scheme(&[], Monotype::arr(Monotype::bool(), Monotype::bool())))
        // Misc / I/O — typed for completeness; execution is the external
        // runtime's concern.
        .add("rand", scheme(&[], Monotype::arr(Monotype::unit(), Monotype::number())))
        .add("print", scheme(&["a"], Monotype::arr(Monotype::var("a"), Monotype::unit())))
        .add("println", scheme(&["a"], Monotype::arr(Monotype::var("a"), Monotype::unit())))
        .add("read-line", scheme(&[], Monotype::arr(Monotype::unit(), Monotype::string())))
}

fn binop(arg: Monotype, result: Monotype) -> Monotype {
    Monotype::func(vec![arg.clone(), arg], result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cons_is_polymorphic_in_the_element_type() {
        let env = builtin_env();
        let scheme = env.get("Cons").unwrap();
        assert_eq!(scheme.vars, vec!["a".to_owned()]);
    }

    #[test]
    fn arithmetic_primitives_are_monomorphic_over_number() {
        let env = builtin_env();
        let scheme = env.get("+").unwrap();
        assert!(scheme.is_dummy());
        assert_eq!(scheme.ty, Monotype::func(vec![Monotype::number(), Monotype::number()], Monotype::number()));
    }

    #[test]
    fn comparison_primitives_return_bool() {
        let env = builtin_env();
        assert_eq!(
            env.get("=").unwrap().ty,
            Monotype::func(vec![Monotype::number(), Monotype::number()], Monotype::bool())
        );
    }
}
