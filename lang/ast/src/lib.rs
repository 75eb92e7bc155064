//! Surface AST, typed intermediate representation, and type system primitives.
//!
//! This crate has no logic beyond representation: construction, structural
//! equality, `ftv`/`apply`/`generalize`/`inst`, and `Display` rendering.
//! Lowering lives in `lowering`, inference in `elaborator`, and orchestration
//! in `driver`.

pub mod ident;
pub mod ir;
pub mod sexpr;
pub mod traits;
pub mod types;

pub use ident::Ident;
pub use sexpr::SExpr;
pub use traits::HasSpan;
pub use types::{FreshVarGen, Monotype, Scheme, Subst, TypeEnv};

/// Fast, non-cryptographic hash map used for environments and free-variable
/// sets; iteration order is not meaningful anywhere it is used.
pub type HashMap<K, V> = std::collections::HashMap<K, V, fxhash::FxBuildHasher>;
pub type HashSet<T> = std::collections::HashSet<T, fxhash::FxBuildHasher>;
