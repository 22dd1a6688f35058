//! Java-- compiler middle and back end (jmmc)
//!
//! Takes the abstract syntax tree of a single Java-- class, checks it, and
//! lowers it to OLLIR, a typed three-address intermediate representation.
//!
//! ## Architecture
//!
//! - **ast**: arena syntax tree, visitor, JSON hand-off format, printer
//! - **symtab**: symbol table and type model built from the tree
//! - **review**: semantic analyzer (13 ordered passes) and the type evaluator
//! - **optimize**: optional constant folding and constant propagation
//! - **ollir**: lowering from the tree to OLLIR text
//! - **regalloc**: liveness, interference graph and register coloring
//! - **bin**: command-line interface
//!
//! ## Compilation Flow
//!
//! ```text
//! Ast → SymbolTable → Review ──(errors)──→ reports only
//!                        ↓
//!                 [Optimize] → Lower → [Allocate registers] → ClassUnit
//! ```

pub mod ast;
pub mod config;
pub mod consts;
pub mod error;
pub mod ollir;
pub mod optimize;
pub mod regalloc;
pub mod report;
pub mod review;
pub mod symtab;

pub use config::Config;
pub use error::{Error, Result};
pub use report::{has_errors, Report, ReportType, Stage};

use ast::Ast;
use ollir::ClassUnit;
use regalloc::RegisterAllocator;
use symtab::SymbolTable;
use std::path::Path;

/// Everything one run of the pipeline produced
#[derive(Debug)]
pub struct Compilation {
    /// The tree after optional rewrites
    pub ast: Ast,
    pub table: SymbolTable,
    /// Semantic reports followed by allocation reports
    pub reports: Vec<Report>,
    /// Absent when the analyzer reported an error
    pub class_unit: Option<ClassUnit>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        has_errors(&self.reports)
    }

    /// OLLIR text of the lowered class
    pub fn ollir(&self) -> Option<String> {
        self.class_unit.as_ref().map(ToString::to_string)
    }
}

/// Build the symbol table and run the semantic analyzer only
pub fn check(ast: &Ast) -> Result<(SymbolTable, Vec<Report>)> {
    let table = SymbolTable::build(ast)?;
    let reports = review::review(ast, &table);
    Ok((table, reports))
}

/// Run the full pipeline on one class.
///
/// Semantic errors stop the pipeline before lowering and come back as
/// reports. A method that does not fit the register budget keeps its
/// lowered registers and adds an optimization-stage report.
pub fn compile(mut ast: Ast, config: &Config) -> Result<Compilation> {
    log::info!("compile start: optimize={} registers={}", config.optimize, config.register_budget);
    let (table, mut reports) = check(&ast)?;
    if has_errors(&reports) {
        log::info!("compile stopped after semantic analysis with {} report(s)", reports.len());
        return Ok(Compilation { ast, table, reports, class_unit: None });
    }

    let summary = optimize::optimize(&mut ast, &table, config)?;
    if config.optimize {
        log::debug!("optimizer replaced {} node(s)", summary.replacements);
    }

    let mut class_unit = ollir::lower_class(&ast, &table)?;
    let allocator = RegisterAllocator::new(config.register_budget);
    reports.extend(allocator.allocate_class(&mut class_unit));

    if config.debug {
        log::debug!("generated OLLIR:\n{}", class_unit);
    }
    log::info!("compile finished: {} method(s)", class_unit.methods.len());
    Ok(Compilation { ast, table, reports, class_unit: Some(class_unit) })
}

/// Load a JSON tree from disk and compile it
pub fn compile_file(path: impl AsRef<Path>, config: &Config) -> Result<Compilation> {
    let path = path.as_ref();
    log::debug!("reading {}", path.display());
    let text = std::fs::read_to_string(path)?;
    compile(Ast::from_json(&text)?, config)
}
