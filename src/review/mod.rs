//! Semantic review of a parsed compilation unit
//!
//! A fixed list of independent passes runs over the tree, each appending
//! diagnostics to one shared report list. The first pass that adds an
//! error stops the pipeline.

use crate::ast::*;
use crate::report::{Report, Stage};
use crate::symtab::{SymbolTable, Type};

mod array_access;
mod array_init;
mod assignments;
mod binary_ops;
mod compat;
mod conditions;
mod decl_order;
mod duplicates;
mod eval;
mod method_calls;
mod returns;
mod static_context;
mod undeclared;
mod varargs;
mod void_vars;

pub use compat::{assignable, returnable};
pub use eval::{EvalError, EvalResult, TypeEvaluator};

pub type ReviewResult<T> = Result<T, AstError>;

/// Diagnostic messages produced by the passes
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("duplicate import '{0}'")]
    DuplicateImport(String),
    #[error("duplicate field '{0}'")]
    DuplicateField(String),
    #[error("duplicate method '{0}'")]
    DuplicateMethod(String),
    #[error("duplicate parameter '{name}' in method '{method}'")]
    DuplicateParameter { method: String, name: String },
    #[error("duplicate local variable '{name}' in method '{method}'")]
    DuplicateLocal { method: String, name: String },
    #[error("local variable '{name}' collides with a parameter of method '{method}'")]
    LocalShadowsParameter { method: String, name: String },
    #[error("variable '{0}' is not declared")]
    UndeclaredVariable(String),
    #[error("variable '{name}' is used at line {used} before its declaration at line {declared}")]
    UsedBeforeDeclaration { name: String, used: u32, declared: u32 },
    #[error("variable '{0}' cannot be declared with type 'void'")]
    VoidVariable(String),
    #[error("array cannot be used in arithmetic operation '{0}'")]
    ArrayInArithmetic(String),
    #[error("operator '{op}' cannot be applied to '{lhs}' and '{rhs}'")]
    InvalidOperands { op: String, lhs: Type, rhs: Type },
    #[error("operator '{op}' cannot be applied to '{operand}'")]
    InvalidOperand { op: String, operand: Type },
    #[error("cannot index a value of type '{0}'")]
    IndexedNonArray(Type),
    #[error("array index must be of type 'int', found '{0}'")]
    NonIntegerIndex(Type),
    #[error("length is only defined on arrays, found '{0}'")]
    LengthOfNonArray(Type),
    #[error("method '{0}' is not declared and the class has no superclass")]
    UndeclaredMethod(String),
    #[error("method '{method}' expects {expected} argument(s), found {found}")]
    ArgumentCount { method: String, expected: String, found: usize },
    #[error("argument {position} of '{method}' expects '{expected}', found '{found}'")]
    ArgumentType { method: String, position: usize, expected: Type, found: Type },
    #[error("cannot call method '{method}' on primitive type '{receiver}'")]
    CallOnPrimitive { method: String, receiver: Type },
    #[error("cannot assign '{found}' to '{target}' of type '{expected}'")]
    IncompatibleAssignment { target: String, expected: Type, found: Type },
    #[error("'{target}' of type '{found}' is not an array")]
    AssignToNonArray { target: String, found: Type },
    #[error("condition must be of type 'boolean', found '{0}'")]
    NonBooleanCondition(Type),
    #[error("array initializer is only allowed where 'int[]' is expected")]
    MisplacedArrayInitializer,
    #[error("varargs parameter '{name}' must be the last parameter of '{method}'")]
    VarargsNotLast { method: String, name: String },
    #[error("method '{0}' declares more than one varargs parameter")]
    MultipleVarargs(String),
    #[error("varargs type is not allowed on variable '{0}'")]
    VarargsVariable(String),
    #[error("varargs type is not allowed as the return type of '{0}'")]
    VarargsReturnType(String),
    #[error("'this' cannot be used in static method '{0}'")]
    ThisInStaticContext(String),
    #[error("instance field '{field}' cannot be used in static method '{method}'")]
    FieldInStaticContext { method: String, field: String },
    #[error("method '{0}' must return a value")]
    MissingReturn(String),
    #[error("void method '{0}' cannot return a value")]
    VoidReturnWithValue(String),
    #[error("return in method '{0}' needs a value")]
    MissingReturnValue(String),
    #[error("method '{method}' returns '{found}' but declares '{expected}'")]
    IncompatibleReturn { method: String, expected: Type, found: Type },
    #[error("pass '{pass}' failed unexpectedly: {cause}")]
    PassFault { pass: &'static str, cause: AstError },
    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

/// Shared, read-only inputs of every pass
pub struct ReviewContext<'a> {
    pub ast: &'a Ast,
    pub table: &'a SymbolTable,
    pub eval: TypeEvaluator<'a>,
}

impl<'a> ReviewContext<'a> {
    pub fn new(ast: &'a Ast, table: &'a SymbolTable) -> Self {
        Self { ast, table, eval: TypeEvaluator::new(table) }
    }

    pub fn error(&self, node: NodeId, error: impl Into<ReviewError>) -> Report {
        Report::semantic_error(self.ast, node, error.into().to_string())
    }

    /// Type of the expression at `node`, or `None` after recording why it has none.
    ///
    /// A malformed subtree is not a type error; it comes back as the pass's `Err`.
    pub fn type_or_report(
        &self,
        node: NodeId,
        scope: &Scope<'_>,
        reports: &mut Vec<Report>,
    ) -> ReviewResult<Option<Type>> {
        match self.eval.expr_type(self.ast, node, scope.method_name()) {
            Ok(ty) => Ok(Some(ty)),
            Err(EvalError::Ast(fault)) => Err(fault),
            Err(err) => {
                reports.push(self.error(node, err));
                Ok(None)
            }
        }
    }
}

/// One independent check over the whole tree
pub trait SemanticPass {
    fn name(&self) -> &'static str;

    /// Append diagnostics to `reports`. An `Err` means the tree itself was
    /// malformed for this pass.
    fn run(&mut self, cx: &ReviewContext<'_>, reports: &mut Vec<Report>) -> ReviewResult<()>;
}

/// Ordered pass pipeline
pub struct Analyzer {
    passes: Vec<Box<dyn SemanticPass>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(vec![
            Box::new(duplicates::DuplicateDeclarations),
            Box::new(undeclared::UndeclaredVariables),
            Box::new(decl_order::DeclarationOrder),
            Box::new(void_vars::VoidVariables),
            Box::new(binary_ops::OperatorTypes),
            Box::new(array_access::ArrayAccess),
            Box::new(method_calls::MethodCalls),
            Box::new(assignments::Assignments),
            Box::new(conditions::Conditions),
            Box::new(array_init::ArrayInitializers),
            Box::new(varargs::Varargs),
            Box::new(static_context::StaticContext),
            Box::new(returns::Returns),
        ])
    }
}

impl Analyzer {
    pub fn new(passes: Vec<Box<dyn SemanticPass>>) -> Self {
        Self { passes }
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run the passes in order.
    ///
    /// Stops after the first pass that appends an error. A pass that fails on
    /// a malformed tree contributes one unlocated error and the next pass
    /// still runs.
    pub fn analyze(&mut self, ast: &Ast, table: &SymbolTable) -> Vec<Report> {
        log::debug!("review start: class={} passes={}", table.class_name(), self.passes.len());
        let cx = ReviewContext::new(ast, table);
        let mut reports = Vec::new();
        for pass in self.passes.iter_mut() {
            let before = reports.len();
            match pass.run(&cx, &mut reports) {
                Ok(()) => {
                    if reports[before..].iter().any(Report::is_error) {
                        log::debug!("review halted by pass '{}'", pass.name());
                        return reports;
                    }
                }
                Err(cause) => {
                    log::warn!("pass '{}' faulted: {}", pass.name(), cause);
                    let fault = ReviewError::PassFault { pass: pass.name(), cause };
                    reports.push(Report::unlocated(Stage::Semantic, fault.to_string()));
                }
            }
        }
        log::debug!("review end: reports={}", reports.len());
        reports
    }
}

/// Review with the canonical pass list
pub fn review(ast: &Ast, table: &SymbolTable) -> Vec<Report> {
    Analyzer::default().analyze(ast, table)
}

/// Method declarations of the class, in order
pub(crate) fn methods(ast: &Ast) -> ReviewResult<Vec<NodeId>> {
    let class = ast.class_decl()?;
    Ok(ast.children_of_kind(class, NodeKind::MethodDecl).collect())
}
