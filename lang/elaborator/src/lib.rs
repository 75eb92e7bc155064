//! Hindley-Milner type inference: unification, constraint-generating
//! inference over the typed IR, and annotation confirmation.
//!
//! This crate owns everything in §4.1-§4.3 and §4.5 of the front-end
//! specification it elaborates: unification is in [`unify`], the
//! constraint-generating walk over IR expressions and patterns is in
//! [`infer`], the engine that threads the fresh-variable counter and the
//! deferred equation queue through both is in [`engine`], and annotation
//! confirmation is in [`confirm`]. SCC scheduling and dependency analysis
//! are the `driver` crate's concern, not this one's.

pub mod confirm;
pub mod engine;
pub mod infer;
pub mod result;
pub mod unify;

pub use confirm::{confirm_define, confirm_value};
pub use engine::{Engine, EngineConfig};
pub use infer::{infer_expr, infer_literal, infer_pattern};
pub use result::{TypeError, TypeResult};
pub use unify::{unify, unify_list};
