//! Top-level driver (§4.4): seeds the built-in environment, extracts type
//! declarations, schedules top-level definitions by strongly connected
//! component in topological order, and runs per-group inference and
//! annotation confirmation. This is the crate an embedding caller reaches
//! for: everything else in the workspace is an internal collaborator.

pub mod builtins;
pub mod compile;
pub mod dependency_graph;
pub mod refs;
pub mod result;

pub use builtins::builtin_env;
pub use compile::{compile, CompileConfig, CompileOutput};
pub use dependency_graph::scc_groups_in_topological_order;
pub use result::Diagnostic;
