//! Symbol table for one compilation unit
//!
//! Built once from the AST ([`SymbolTable::build`]) and read-only afterwards.
//! Duplicates are kept as declared; the analyzer reports them.

mod builder;
mod types;

pub use types::Type;

use std::collections::HashMap;
use std::fmt;

/// Name + type binding: a field, parameter or local variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    /// Only set on a trailing `int...` parameter
    pub varargs: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty, varargs: false }
    }

    pub fn varargs(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty, varargs: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub return_type: Type,
    pub parameters: Vec<Symbol>,
    pub locals: Vec<Symbol>,
    pub is_static: bool,
}

/// Result of looking a variable name up from inside a method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarRef<'a> {
    Local(&'a Symbol),
    /// Zero-based position in the parameter list
    Parameter(usize, &'a Symbol),
    Field(&'a Symbol),
    /// Simple name of an import (the full dotted path is kept in the table)
    Imported(&'a str),
    Unresolved,
}

impl<'a> VarRef<'a> {
    pub fn symbol(&self) -> Option<&'a Symbol> {
        match self {
            VarRef::Local(s) | VarRef::Parameter(_, s) | VarRef::Field(s) => Some(s),
            VarRef::Imported(_) | VarRef::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, VarRef::Unresolved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolTable {
    class_name: String,
    super_name: String,
    imports: Vec<String>,
    fields: Vec<Symbol>,
    methods: Vec<String>,
    signatures: HashMap<String, MethodSignature>,
}

/// Last segment of a dotted import path
pub fn simple_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

impl SymbolTable {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Superclass name, empty if the class extends nothing
    pub fn super_name(&self) -> &str {
        &self.super_name
    }

    pub fn has_super(&self) -> bool {
        !self.super_name.is_empty()
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn import_simple_names(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(|path| simple_name(path))
    }

    pub fn is_imported(&self, simple: &str) -> bool {
        self.import_simple_names().any(|name| name == simple)
    }

    pub fn fields(&self) -> &[Symbol] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Method names in declaration order, duplicates included
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.signatures.contains_key(name)
    }

    pub fn signature(&self, method: &str) -> Option<&MethodSignature> {
        self.signatures.get(method)
    }

    pub fn return_type(&self, method: &str) -> Option<&Type> {
        self.signatures.get(method).map(|s| &s.return_type)
    }

    pub fn parameters(&self, method: &str) -> &[Symbol] {
        self.signatures.get(method).map(|s| s.parameters.as_slice()).unwrap_or(&[])
    }

    pub fn local_variables(&self, method: &str) -> &[Symbol] {
        self.signatures.get(method).map(|s| s.locals.as_slice()).unwrap_or(&[])
    }

    pub fn is_static(&self, method: &str) -> bool {
        self.signatures.get(method).map(|s| s.is_static).unwrap_or(false)
    }

    /// Whether the method's last parameter is variadic
    pub fn is_varargs(&self, method: &str) -> bool {
        self.parameters(method).last().map(|p| p.varargs).unwrap_or(false)
    }

    pub fn local(&self, method: &str, name: &str) -> Option<&Symbol> {
        self.local_variables(method).iter().find(|s| s.name == name)
    }

    pub fn parameter(&self, method: &str, name: &str) -> Option<(usize, &Symbol)> {
        self.parameters(method).iter().enumerate().find(|(_, s)| s.name == name)
    }

    /// Type names that denote the current class
    pub fn is_own_class(&self, ty: &Type) -> bool {
        !ty.is_array && ty.name == self.class_name
    }

    /// Resolve a variable reference: local, parameter, field, imported name
    pub fn resolve(&self, method: Option<&str>, name: &str) -> VarRef<'_> {
        if let Some(method) = method {
            if let Some(local) = self.local(method, name) {
                return VarRef::Local(local);
            }
            if let Some((index, param)) = self.parameter(method, name) {
                return VarRef::Parameter(index, param);
            }
        }
        if let Some(field) = self.field(name) {
            return VarRef::Field(field);
        }
        if let Some(simple) = self.import_simple_names().find(|simple| *simple == name) {
            return VarRef::Imported(simple);
        }
        VarRef::Unresolved
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {}", import)?;
        }
        if self.has_super() {
            writeln!(f, "class {} extends {}", self.class_name, self.super_name)?;
        } else {
            writeln!(f, "class {}", self.class_name)?;
        }
        for field in &self.fields {
            writeln!(f, "  field {} {}", field.ty, field.name)?;
        }
        let mut printed = std::collections::HashSet::new();
        for method in &self.methods {
            if !printed.insert(method.as_str()) {
                continue;
            }
            let Some(sig) = self.signatures.get(method) else { continue };
            let params: Vec<String> = sig
                .parameters
                .iter()
                .map(|p| if p.varargs { format!("{}... {}", p.ty.name, p.name) } else { format!("{} {}", p.ty, p.name) })
                .collect();
            let modifier = if sig.is_static { "static " } else { "" };
            writeln!(f, "  method {}{} {}({})", modifier, sig.return_type, method, params.join(", "))?;
            for local in &sig.locals {
                writeln!(f, "    local {} {}", local.ty, local.name)?;
            }
        }
        Ok(())
    }
}
