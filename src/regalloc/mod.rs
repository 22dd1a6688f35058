//! Register allocation for method-local variables
//!
//! Locals and temporaries are packed into as few registers as possible by
//! coloring an interference graph built from liveness. `this` and the
//! parameters keep the registers they were given during lowering, fields
//! never get one. There is no spilling: when a method needs more registers
//! than the budget allows it is left untouched and an error is reported.

pub mod interference;
pub mod liveness;

pub use interference::InterferenceGraph;
pub use liveness::{Liveness, VarSet};

use crate::consts::THIS_NAME;
use crate::ollir::{ClassUnit, Method, VarScope};
use crate::report::{Report, Stage};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("method '{method}' needs at least {required} registers but only {budget} are available")]
    InsufficientRegisters { method: String, budget: usize, required: usize },
}

/// What a successful allocation assigned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationSummary {
    pub method: String,
    pub assignments: BTreeMap<String, i32>,
    /// Distinct registers handed to allocatable variables
    pub registers_used: usize,
}

/// Graph-coloring allocator with a register budget.
///
/// A negative budget disables allocation, zero means as many registers as
/// the coloring needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterAllocator {
    budget: i32,
}

impl RegisterAllocator {
    pub fn new(budget: i32) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> i32 {
        self.budget
    }

    pub fn is_enabled(&self) -> bool {
        self.budget >= 0
    }

    /// Color the method's locals and write the registers back into its
    /// variable table. On failure the table is not modified.
    pub fn allocate(&self, method: &mut Method) -> Result<AllocationSummary, AllocationError> {
        if !self.is_enabled() {
            return Ok(AllocationSummary { method: method.name.clone(), ..Default::default() });
        }

        let liveness = Liveness::analyze(method);
        let allocatable = allocatable(method);
        let graph = InterferenceGraph::build(allocatable.iter().map(String::as_str), &liveness);
        let limit = self.budget as usize;

        let stack = simplify(&graph, limit).map_err(|required| AllocationError::InsufficientRegisters {
            method: method.name.clone(),
            budget: limit,
            required,
        })?;

        let reserved: BTreeSet<i32> = method
            .var_table
            .iter()
            .filter(|(name, d)| !allocatable.contains(*name) && d.register >= 0)
            .map(|(_, d)| d.register)
            .collect();
        let base = reserved.iter().next_back().map(|r| r + 1).unwrap_or(0);

        let assignments = select(&graph, stack, base, &reserved);
        let registers_used = assignments.values().collect::<BTreeSet<_>>().len();
        if limit > 0 && registers_used > limit {
            // simplify guarantees a k-coloring; this only guards the select order
            return Err(AllocationError::InsufficientRegisters {
                method: method.name.clone(),
                budget: limit,
                required: registers_used,
            });
        }

        for (name, register) in &assignments {
            if let Some(descriptor) = method.var_table.get_mut(name) {
                descriptor.register = *register;
            }
        }
        log::debug!(
            "allocated {} variables of '{}' into {} registers",
            assignments.len(),
            method.name,
            registers_used
        );

        Ok(AllocationSummary { method: method.name.clone(), assignments, registers_used })
    }

    /// Allocate every method of the class; one report per method that does
    /// not fit the budget
    pub fn allocate_class(&self, class: &mut ClassUnit) -> Vec<Report> {
        let mut reports = Vec::new();
        if !self.is_enabled() {
            return reports;
        }
        for method in &mut class.methods {
            if let Err(err) = self.allocate(method) {
                log::warn!("{}", err);
                reports.push(Report::unlocated(Stage::Optimization, err.to_string()));
            }
        }
        reports
    }
}

/// Variables the allocator may move: locals and temporaries except `this`
pub fn allocatable(method: &Method) -> BTreeSet<String> {
    method
        .var_table
        .iter()
        .filter(|(name, d)| d.scope == VarScope::Local && name.as_str() != THIS_NAME)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Repeatedly remove a node of degree below `limit`. Returns the removal
/// order, or the register count the stuck graph would need.
fn simplify(graph: &InterferenceGraph, limit: usize) -> Result<Vec<String>, usize> {
    let mut work = graph.clone();
    let mut stack = Vec::with_capacity(graph.len());

    while !work.is_empty() {
        let candidate = work
            .nodes()
            .find(|name| limit == 0 || work.degree(name) < limit)
            .map(str::to_string);
        match candidate {
            Some(name) => {
                work.remove(&name);
                stack.push(name);
            }
            None => {
                let max_degree = work.nodes().map(|n| work.degree(n)).max().unwrap_or(0);
                return Err(max_degree + 1);
            }
        }
    }
    Ok(stack)
}

/// Pop the stack and give each variable the lowest free register at or above `base`
fn select(graph: &InterferenceGraph, mut stack: Vec<String>, base: i32, reserved: &BTreeSet<i32>) -> BTreeMap<String, i32> {
    let mut colors: BTreeMap<String, i32> = BTreeMap::new();
    while let Some(name) = stack.pop() {
        let taken: BTreeSet<i32> = graph.neighbours(&name).filter_map(|n| colors.get(n).copied()).collect();
        let mut register = base;
        while taken.contains(&register) || reserved.contains(&register) {
            register += 1;
        }
        colors.insert(name, register);
    }
    colors
}
