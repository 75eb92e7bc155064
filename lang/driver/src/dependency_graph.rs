//! Pass 2's dependency graph: one node per top-level `define`, an edge
//! `u -> v` iff `v`'s body references `u`, condensed into its strongly
//! connected components and scheduled in topological order (§4.4).

use ast::ir::Def;
use ast::HashMap;
use petgraph::algo::{condensation, toposort};
use petgraph::graph::{Graph, NodeIndex};

use crate::refs::def_refs;

/// Builds the raw (pre-condensation) dependency graph, for diagnostics and
/// testing; node weights are definition names.
pub fn build_graph(defs: &[Def]) -> Graph<String, ()> {
    let mut graph = Graph::<String, ()>::new();
    let mut index_of: HashMap<String, NodeIndex> = HashMap::default();

    for def in defs {
        let idx = graph.add_node(def.name().as_str().to_owned());
        index_of.insert(def.name().as_str().to_owned(), idx);
    }

    let top_level: ast::HashSet<String> = index_of.keys().cloned().collect();

    for def in defs {
        let v = index_of[def.name().as_str()];
        for u_name in def_refs(def, &top_level) {
            let u = index_of[&u_name];
            graph.add_edge(u, v, ());
            log::trace!("dependency edge {u_name} -> {}", def.name());
        }
    }

    graph
}

/// The mutually-recursive groups of `defs`, each a set of member names, in
/// topological order: if `v` depends on `u` and they land in different
/// groups, `u`'s group precedes `v`'s. `make_acyclic = true` in the
/// underlying [`condensation`] call strips self-loops (a singleton
/// self-recursive definition) so the condensed graph is a proper DAG that
/// [`toposort`] can always order.
pub fn scc_groups_in_topological_order(defs: &[Def]) -> Vec<Vec<String>> {
    let graph = build_graph(defs);
    let source_order: HashMap<String, usize> =
        defs.iter().enumerate().map(|(i, d)| (d.name().as_str().to_owned(), i)).collect();

    let condensed = condensation(graph, true);
    log::debug!("dependency graph condensed into {} group(s)", condensed.node_count());
    let order = toposort(&condensed, None).expect("condensation always yields an acyclic graph");

    // Within an SCC, names are processed in source order (§5's determinism
    // guarantee); `condensation` itself makes no such promise.
    order
        .into_iter()
        .map(|idx| {
            let mut group = condensed[idx].clone();
            group.sort_by_key(|name| source_order[name]);
            group
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::ir::Expr;
    use ast::Ident;

    fn var_define(name: &str, refs_to: &str) -> Def {
        Def::VarDefine {
            name: Ident::from_str(name),
            body: Expr::Var(None, refs_to.to_owned()),
            annotation: None,
            span: None,
        }
    }

    fn no_ref_define(name: &str) -> Def {
        Def::VarDefine { name: Ident::from_str(name), body: Expr::Lit(None, ast::ir::Literal::Int(0)), annotation: None, span: None }
    }

    #[test]
    fn independent_defs_are_singleton_groups_in_source_order() {
        let defs = vec![no_ref_define("a"), no_ref_define("b")];
        let groups = scc_groups_in_topological_order(&defs);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn a_dependency_precedes_its_dependent() {
        let defs = vec![var_define("uses_b", "b"), no_ref_define("b")];
        let groups = scc_groups_in_topological_order(&defs);
        let pos_b = groups.iter().position(|g| g.contains(&"b".to_owned())).unwrap();
        let pos_uses_b = groups.iter().position(|g| g.contains(&"uses_b".to_owned())).unwrap();
        assert!(pos_b < pos_uses_b);
    }

    #[test]
    fn mutually_recursive_defs_land_in_one_group() {
        let defs = vec![var_define("even?", "odd?"), var_define("odd?", "even?")];
        let groups = scc_groups_in_topological_order(&defs);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn self_recursive_singleton_is_its_own_group() {
        let defs = vec![var_define("loop", "loop")];
        let groups = scc_groups_in_topological_order(&defs);
        assert_eq!(groups, vec![vec!["loop".to_owned()]]);
    }
}
