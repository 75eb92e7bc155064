//! The inference engine: fresh-variable counter, deferred equation queue, and
//! the verbosity flag that gates trace logging. One value is created per
//! compilation and threaded by mutable reference through every pass so that
//! fresh variables stay globally unique across SCCs.

use ast::types::{FreshVarGen, Monotype, Subst};
use codespan::Span;

use crate::result::TypeResult;
use crate::unify::unify_list;

/// Constructor configuration for [`Engine`]; the only tunable today is the
/// trace-logging verbosity flag (§10.3 in the expanded spec this elaborates).
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub verbose: bool,
}

#[derive(Debug, Default)]
pub struct Engine {
    fresh: FreshVarGen,
    equations: Vec<(Monotype, Monotype, Option<Span>)>,
    verbose: bool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine { fresh: FreshVarGen::new(), equations: Vec::new(), verbose: config.verbose }
    }

    pub fn fresh_var(&mut self) -> Monotype {
        Monotype::var(self.fresh.next())
    }

    pub fn fresh_vars(&mut self, n: usize) -> Vec<Monotype> {
        (0..n).map(|_| self.fresh_var()).collect()
    }

    /// Exposes the underlying generator so callers can instantiate a
    /// [`ast::types::Scheme`] (whose `instantiate` takes a `&mut FreshVarGen`
    /// directly) without the engine duplicating that logic.
    pub fn fresh_gen(&mut self) -> &mut FreshVarGen {
        &mut self.fresh
    }

    /// Queues an equation to be solved at the next [`Engine::solve`] call.
    /// Equations are never discarded between sibling nodes; they accumulate
    /// until solved monolithically at a definition boundary.
    pub fn add_equation(&mut self, lhs: Monotype, rhs: Monotype, span: Option<Span>) {
        if self.verbose {
            log::trace!("add equation {lhs} = {rhs}");
        }
        self.equations.push((lhs, rhs, span));
    }

    /// Equates every type in `types` against the first, pairwise against the
    /// first element. A no-op on fewer than two types.
    pub fn add_equations(&mut self, types: &[Monotype], span: Option<Span>) {
        let Some((first, rest)) = types.split_first() else { return };
        for t in rest {
            self.add_equation(first.clone(), t.clone(), span);
        }
    }

    /// Solves every queued equation without clearing it, left-to-right per
    /// [`unify_list`]. Used wherever a caller needs a provisional
    /// substitution mid-definition — the `Let` rule's eager per-binding
    /// generalization (§4.3) — without discarding equations that mention
    /// variables outside the construct being solved (e.g. the enclosing
    /// definition's parameter/return types), which still need to reach the
    /// definition-boundary [`Engine::solve`].
    pub fn solve_peek(&mut self) -> TypeResult<Subst> {
        let pairs: Vec<(Monotype, Monotype)> =
            self.equations.iter().map(|(l, r, _)| (l.clone(), r.clone())).collect();
        let span = self.equations.first().and_then(|(_, _, s)| *s);
        let subst = unify_list(&pairs, span)?;
        if self.verbose {
            log::trace!("peeked substitution with {} entries (queue retained)", subst.len());
        }
        Ok(subst)
    }

    /// Solves every queued equation and clears the queue. This is the
    /// definition-boundary solve (§4.3): equations accumulate across
    /// sibling nodes and are only ever discarded here.
    pub fn solve(&mut self) -> TypeResult<Subst> {
        let subst = self.solve_peek()?;
        self.equations.clear();
        if self.verbose {
            log::trace!("solved to substitution with {} entries", subst.len());
        }
        Ok(subst)
    }
}
