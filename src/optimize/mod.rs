//! Optional tree rewrites run between analysis and lowering
//!
//! Both rewrites only ever swap an expression subtree for a literal node with
//! the same value. They are repeated until a round changes nothing or the
//! configured round limit is reached.

mod const_fold;
mod const_prop;

pub use const_fold::ConstantFolding;
pub use const_prop::ConstantPropagation;

use crate::ast::{Ast, AstError, AstResult, Location, Node, NodeId, NodeKind};
use crate::config::Config;
use crate::symtab::SymbolTable;

/// A best-effort rewrite of the tree
pub trait AstRewrite {
    fn name(&self) -> &'static str;

    /// Rewrite in place and return how many subtrees were replaced
    fn rewrite(&mut self, ast: &mut Ast, table: &SymbolTable) -> AstResult<usize>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizationSummary {
    pub rounds: usize,
    pub replacements: usize,
}

pub struct Optimizer {
    rewrites: Vec<Box<dyn AstRewrite>>,
    max_rounds: usize,
}

impl Optimizer {
    pub fn new(rewrites: Vec<Box<dyn AstRewrite>>, max_rounds: usize) -> Self {
        Self { rewrites, max_rounds }
    }

    /// Folding followed by propagation, with the configured round limit
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            vec![Box::new(ConstantFolding), Box::new(ConstantPropagation)],
            config.max_optimization_rounds,
        )
    }

    pub fn run(&mut self, ast: &mut Ast, table: &SymbolTable) -> AstResult<OptimizationSummary> {
        let mut summary = OptimizationSummary::default();
        while summary.rounds < self.max_rounds {
            summary.rounds += 1;
            let mut changed = 0;
            for rewrite in self.rewrites.iter_mut() {
                let count = rewrite.rewrite(ast, table)?;
                log::debug!("round {}: {} replaced {} subtree(s)", summary.rounds, rewrite.name(), count);
                changed += count;
            }
            summary.replacements += changed;
            if changed == 0 {
                break;
            }
        }
        log::info!(
            "optimization finished after {} round(s), {} replacement(s)",
            summary.rounds,
            summary.replacements
        );
        Ok(summary)
    }
}

/// Run the default rewrites if the configuration asks for them
pub fn optimize(ast: &mut Ast, table: &SymbolTable, config: &Config) -> AstResult<OptimizationSummary> {
    if !config.optimize {
        return Ok(OptimizationSummary::default());
    }
    Optimizer::from_config(config).run(ast, table)
}

/// Integer value of an `IntLiteral` node
pub(crate) fn int_value(ast: &Ast, id: NodeId) -> AstResult<i32> {
    let raw = ast.require_attr(id, "value")?;
    raw.parse().map_err(|_| AstError::InvalidLiteral(raw.to_string()))
}

/// Put a fresh literal node in the place of `old`
pub(crate) fn replace_with_literal(ast: &mut Ast, old: NodeId, kind: NodeKind, value: &str) -> AstResult<NodeId> {
    let location: Location = ast.location(old);
    let literal = ast.add_node(Node::new(kind, location).with_attr("value", value));
    ast.replace(old, literal)?;
    Ok(literal)
}
