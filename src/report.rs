//! Diagnostics produced by the analyzer, the optimizer and the allocator

use crate::ast::{Ast, NodeId};
use crate::consts::UNKNOWN_POSITION;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    Error,
    Warning,
    Log,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Semantic,
    Optimization,
    Lowering,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub report_type: ReportType,
    pub stage: Stage,
    pub line: i32,
    pub column: i32,
    pub message: String,
    pub cause: Option<String>,
}

impl Report {
    pub fn new(report_type: ReportType, stage: Stage, line: i32, column: i32, message: impl Into<String>) -> Self {
        Self {
            report_type,
            stage,
            line,
            column,
            message: message.into(),
            cause: None,
        }
    }

    /// Semantic error located at a node
    pub fn semantic_error(ast: &Ast, node: NodeId, message: impl Into<String>) -> Self {
        let location = ast.location(node);
        Self::new(
            ReportType::Error,
            Stage::Semantic,
            location.line as i32,
            location.column as i32,
            message,
        )
    }

    /// Error without a source position
    pub fn unlocated(stage: Stage, message: impl Into<String>) -> Self {
        Self::new(ReportType::Error, stage, UNKNOWN_POSITION, UNKNOWN_POSITION, message)
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.report_type == ReportType::Error
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.report_type {
            ReportType::Error => "error",
            ReportType::Warning => "warning",
            ReportType::Log => "log",
            ReportType::Debug => "debug",
        };
        let stage = match self.stage {
            Stage::Semantic => "semantic",
            Stage::Optimization => "optimization",
            Stage::Lowering => "lowering",
        };
        if self.line == UNKNOWN_POSITION {
            write!(f, "{} [{}]: {}", kind, stage, self.message)?;
        } else {
            write!(f, "{} [{}] {}:{}: {}", kind, stage, self.line, self.column, self.message)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, " (caused by: {})", cause)?;
        }
        Ok(())
    }
}

/// Whether any report in the list is an error
pub fn has_errors(reports: &[Report]) -> bool {
    reports.iter().any(Report::is_error)
}
