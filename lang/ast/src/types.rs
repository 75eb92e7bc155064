//! Monotypes, type schemes, substitutions, and the persistent typing
//! environment.
//!
//! Structural equality everywhere here ignores source spans: two monotypes
//! are equal iff they agree on shape and names, regardless of where either
//! was written or synthesized.

use std::fmt;
use std::rc::Rc;

use codespan::Span;
use derivative::Derivative;

use crate::{HashMap, HashSet};

/// Names `Number`, `Bool`, `Symbol`, `String`, `Char`, `Unit` are the only
/// nullary primitives; everything else nullary is a zero-argument
/// `TDefined`.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq, Eq, Hash)]
pub enum Monotype {
    Var(#[derivative(PartialEq = "ignore", Hash = "ignore")] Option<Span>, String),
    Const(#[derivative(PartialEq = "ignore", Hash = "ignore")] Option<Span>, String),
    Arr(Box<Monotype>, Box<Monotype>),
    /// Invariant: never fewer than 2 elements. The nullary product collapses
    /// to `Unit` and the unary product collapses to its element; neither
    /// ever reaches this variant.
    Tuple(Vec<Monotype>),
    /// An applied user-declared (or built-in) type constructor.
    Defined(
        #[derivative(PartialEq = "ignore", Hash = "ignore")] Option<Span>,
        String,
        Vec<Monotype>,
    ),
}

impl Monotype {
    pub fn var(name: impl Into<String>) -> Self {
        Monotype::Var(None, name.into())
    }

    pub fn number() -> Self {
        Monotype::Const(None, "Number".to_owned())
    }

    pub fn bool() -> Self {
        Monotype::Const(None, "Bool".to_owned())
    }

    pub fn symbol() -> Self {
        Monotype::Const(None, "Symbol".to_owned())
    }

    pub fn string() -> Self {
        Monotype::Const(None, "String".to_owned())
    }

    pub fn char() -> Self {
        Monotype::Const(None, "Char".to_owned())
    }

    pub fn unit() -> Self {
        Monotype::Const(None, "Unit".to_owned())
    }

    pub fn arr(from: Monotype, to: Monotype) -> Self {
        Monotype::Arr(Box::new(from), Box::new(to))
    }

    /// Right-associated n-ary function type: `func([a, b], r)` is
    /// `a -> b -> r`. Zero arguments is the nullary-application/lambda case
    /// and reads as `Unit -> r`, matching the surface `(-> τ)` annotation
    /// with a single written type.
    pub fn func(args: Vec<Monotype>, result: Monotype) -> Self {
        if args.is_empty() {
            return Monotype::arr(Monotype::unit(), result);
        }
        args.into_iter().rev().fold(result, |acc, a| Monotype::arr(a, acc))
    }

    /// Zero-arity collapses to `Unit`, one element collapses to itself.
    pub fn tuple(mut elems: Vec<Monotype>) -> Self {
        match elems.len() {
            0 => Monotype::unit(),
            1 => elems.pop().unwrap(),
            _ => Monotype::Tuple(elems),
        }
    }

    pub fn list_of(elem: Monotype) -> Self {
        Monotype::Defined(None, "List".to_owned(), vec![elem])
    }

    pub fn defined(name: impl Into<String>, args: Vec<Monotype>) -> Self {
        Monotype::Defined(None, name.into(), args)
    }

    /// Flattens a right-associated arrow chain into its argument sequence
    /// and final result, e.g. `a -> b -> c` becomes `([a, b], c)`.
    pub fn flatten_arrow(&self) -> (Vec<&Monotype>, &Monotype) {
        let mut args = Vec::new();
        let mut cur = self;
        while let Monotype::Arr(a, b) = cur {
            args.push(a.as_ref());
            cur = b.as_ref();
        }
        (args, cur)
    }

    pub fn ftv(&self) -> HashSet<String> {
        match self {
            Monotype::Var(_, v) => {
                let mut s = HashSet::default();
                s.insert(v.clone());
                s
            }
            Monotype::Const(_, _) => HashSet::default(),
            Monotype::Arr(a, b) => {
                let mut s = a.ftv();
                s.extend(b.ftv());
                s
            }
            Monotype::Tuple(ts) => ts.iter().fold(HashSet::default(), |mut acc, t| {
                acc.extend(t.ftv());
                acc
            }),
            Monotype::Defined(_, _, ts) => ts.iter().fold(HashSet::default(), |mut acc, t| {
                acc.extend(t.ftv());
                acc
            }),
        }
    }

    pub fn apply(&self, subst: &Subst) -> Monotype {
        match self {
            Monotype::Var(span, v) => match subst.get(v.as_str()) {
                Some(t) => t.clone(),
                None => Monotype::Var(*span, v.clone()),
            },
            Monotype::Const(span, n) => Monotype::Const(*span, n.clone()),
            Monotype::Arr(a, b) => Monotype::Arr(Box::new(a.apply(subst)), Box::new(b.apply(subst))),
            Monotype::Tuple(ts) => Monotype::Tuple(ts.iter().map(|t| t.apply(subst)).collect()),
            Monotype::Defined(span, n, ts) => {
                Monotype::Defined(*span, n.clone(), ts.iter().map(|t| t.apply(subst)).collect())
            }
        }
    }
}

impl fmt::Display for Monotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Monotype::Var(_, v) => write!(f, "{v}"),
            Monotype::Const(_, n) => write!(f, "{n}"),
            Monotype::Arr(a, b) => write!(f, "{a} -> {b}"),
            Monotype::Tuple(ts) => {
                write!(f, "(*")?;
                for t in ts {
                    write!(f, " {t}")?;
                }
                write!(f, ")")
            }
            Monotype::Defined(_, n, ts) => {
                if ts.is_empty() {
                    write!(f, "{n}")
                } else {
                    write!(f, "({n}")?;
                    for t in ts {
                        write!(f, " {t}")?;
                    }
                    write!(f, ")")
                }
            }
        }
    }
}

/// A finite mapping from type-variable name to monotype.
pub type Subst = HashMap<String, Monotype>;

/// Compose two substitutions as `s2 ∘ s1`: apply `s2` to every binding of
/// `s1`, then union in the entries of `s2` whose key is absent from the
/// result.
pub fn compose(s2: &Subst, s1: &Subst) -> Subst {
    let mut result: Subst = s1.iter().map(|(k, v)| (k.clone(), v.apply(s2))).collect();
    for (k, v) in s2 {
        result.entry(k.clone()).or_insert_with(|| v.clone());
    }
    result
}

/// A (possibly empty) prenex-quantified monotype. A scheme is *dummy* iff
/// `vars` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    pub vars: Vec<String>,
    pub ty: Monotype,
}

impl Scheme {
    /// Wraps a monotype with no quantifiers, used for lambda/let-bound
    /// arguments, pattern bindings, and provisional recursive
    /// self-references.
    pub fn dummy(ty: Monotype) -> Self {
        Scheme { vars: Vec::new(), ty }
    }

    pub fn is_dummy(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn ftv(&self) -> HashSet<String> {
        let mut fv = self.ty.ftv();
        for v in &self.vars {
            fv.remove(v);
        }
        fv
    }

    pub fn apply(&self, subst: &Subst) -> Scheme {
        // Quantified variables are locally bound; substituting for them
        // would be a capture, so they're filtered out of the substitution
        // before applying it to the body.
        let inner: Subst =
            subst.iter().filter(|(k, _)| !self.vars.contains(k)).map(|(k, v)| (k.clone(), v.clone())).collect();
        Scheme { vars: self.vars.clone(), ty: self.ty.apply(&inner) }
    }

    /// Allocates a fresh type variable for each quantified variable and
    /// applies that mapping to the body.
    pub fn instantiate(&self, fresh: &mut FreshVarGen) -> Monotype {
        let subst: Subst = self.vars.iter().map(|v| (v.clone(), Monotype::var(fresh.next()))).collect();
        self.ty.apply(&subst)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vars.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "forall {}. {}", self.vars.join(" "), self.ty)
        }
    }
}

/// `vs = ftv(t) \ ftv(env)`. Variable *naming* (renaming quantified
/// variables to clean, freshly-counted names for user-visible display) is a
/// driver concern performed after generalization, not here.
pub fn generalize(env: &TypeEnv, ty: &Monotype) -> Scheme {
    let env_ftv = env.ftv();
    let mut vars: Vec<String> = ty.ftv().into_iter().filter(|v| !env_ftv.contains(v)).collect();
    vars.sort();
    Scheme { vars, ty: ty.clone() }
}

/// A monotonically increasing counter rendered in base 26 using `a...z`,
/// `aa...az`, `ba...`, and so on. Owned by whichever component needs fresh
/// names (the inference engine during constraint generation, the driver
/// when renaming a generalized scheme for display) — never global state.
#[derive(Debug, Clone, Default)]
pub struct FreshVarGen {
    counter: u64,
}

impl FreshVarGen {
    pub fn new() -> Self {
        FreshVarGen { counter: 0 }
    }

    pub fn next(&mut self) -> String {
        let name = Self::render(self.counter);
        self.counter += 1;
        name
    }

    fn render(mut n: u64) -> String {
        let mut digits = Vec::new();
        loop {
            let d = (n % 26) as u8;
            digits.push((b'a' + d) as char);
            n /= 26;
            if n == 0 {
                break;
            }
            n -= 1;
        }
        digits.iter().rev().collect()
    }
}

/// A persistent mapping from identifier name to scheme. Each extension
/// returns a new value sharing structure with the old: `Rc::make_mut` gives
/// an O(1) clone whenever the old environment has no other live reference,
/// and a full clone otherwise — copy-on-write, as the workload allows.
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    bindings: Rc<HashMap<String, Scheme>>,
}

impl TypeEnv {
    pub fn empty() -> Self {
        TypeEnv { bindings: Rc::new(HashMap::default()) }
    }

    pub fn get(&self, name: &str) -> Option<&Scheme> {
        self.bindings.get(name)
    }

    pub fn add(&self, name: impl Into<String>, scheme: Scheme) -> Self {
        let mut bindings = self.bindings.clone();
        Rc::make_mut(&mut bindings).insert(name.into(), scheme);
        TypeEnv { bindings }
    }

    pub fn extend(&self, pairs: impl IntoIterator<Item = (String, Scheme)>) -> Self {
        let mut bindings = self.bindings.clone();
        let map = Rc::make_mut(&mut bindings);
        for (name, scheme) in pairs {
            map.insert(name, scheme);
        }
        TypeEnv { bindings }
    }

    pub fn apply(&self, subst: &Subst) -> Self {
        let applied: HashMap<String, Scheme> =
            self.bindings.iter().map(|(k, v)| (k.clone(), v.apply(subst))).collect();
        TypeEnv { bindings: Rc::new(applied) }
    }

    pub fn ftv(&self) -> HashSet<String> {
        self.bindings.values().fold(HashSet::default(), |mut acc, s| {
            acc.extend(s.ftv());
            acc
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ftv_of_const_is_empty() {
        assert!(Monotype::number().ftv().is_empty());
    }

    #[test]
    fn ftv_of_compound_is_union_of_children() {
        let t = Monotype::arr(Monotype::var("a"), Monotype::tuple(vec![Monotype::var("b"), Monotype::var("a")]));
        let fv = t.ftv();
        assert_eq!(fv.len(), 2);
        assert!(fv.contains("a") && fv.contains("b"));
    }

    #[test]
    fn compose_applies_outer_to_inner_then_unions() {
        let mut s1 = Subst::default();
        s1.insert("a".to_owned(), Monotype::var("b"));
        let mut s2 = Subst::default();
        s2.insert("b".to_owned(), Monotype::number());
        let composed = compose(&s2, &s1);
        assert_eq!(composed.get("a"), Some(&Monotype::number()));
        assert_eq!(composed.get("b"), Some(&Monotype::number()));
    }

    #[test]
    fn generalize_excludes_vars_free_in_env() {
        let env = TypeEnv::empty().add("x", Scheme::dummy(Monotype::var("a")));
        let t = Monotype::arr(Monotype::var("a"), Monotype::var("b"));
        let scheme = generalize(&env, &t);
        assert_eq!(scheme.vars, vec!["b".to_owned()]);
    }

    #[test]
    fn instantiate_freshens_every_quantified_var() {
        let scheme = Scheme { vars: vec!["a".to_owned()], ty: Monotype::arr(Monotype::var("a"), Monotype::var("a")) };
        let mut fresh = FreshVarGen::new();
        let t1 = scheme.instantiate(&mut fresh);
        let t2 = scheme.instantiate(&mut fresh);
        assert_ne!(t1, t2);
    }

    #[test]
    fn fresh_var_gen_wraps_after_z() {
        let mut fresh = FreshVarGen::new();
        let names: Vec<String> = (0..27).map(|_| fresh.next()).collect();
        assert_eq!(names[25], "z");
        assert_eq!(names[26], "aa");
    }

    #[test]
    fn tuple_of_one_collapses_to_element() {
        assert_eq!(Monotype::tuple(vec![Monotype::number()]), Monotype::number());
    }

    #[test]
    fn tuple_of_zero_collapses_to_unit() {
        assert_eq!(Monotype::tuple(vec![]), Monotype::unit());
    }

    #[test]
    fn func_of_one_arg_is_plain_arrow() {
        let t = Monotype::func(vec![Monotype::number()], Monotype::bool());
        assert_eq!(t, Monotype::arr(Monotype::number(), Monotype::bool()));
    }

    #[test]
    fn func_of_zero_args_is_unit_arrow_result() {
        let t = Monotype::func(vec![], Monotype::number());
        assert_eq!(t, Monotype::arr(Monotype::unit(), Monotype::number()));
    }

    #[test]
    fn env_extend_does_not_mutate_earlier_snapshot() {
        let env0 = TypeEnv::empty();
        let env1 = env0.add("x", Scheme::dummy(Monotype::number()));
        assert!(env0.get("x").is_none());
        assert!(env1.get("x").is_some());
    }
}
