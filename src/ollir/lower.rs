//! Statement lowering and per-method bookkeeping

use super::expr::{ExprGenerator, ExprResult, Value};
use super::{ClassUnit, Descriptor, Element, Field, Instruction, Method, OllirType, Param, Rhs, VarScope};
use crate::ast::{dispatch, Ast, AstVisitor, MethodContext, NodeId, NodeKind, Scope, UnaryOperator};
use crate::consts::{TEMP_PREFIX, THIS_NAME};
use crate::error::{Error, Result};
use crate::symtab::{simple_name, SymbolTable, Type, VarRef};
use std::collections::{BTreeMap, HashMap};

/// Per-method lowering state: temporaries, labels and the variable table.
///
/// Created fresh for every method.
#[derive(Debug, Clone)]
pub struct MethodState {
    method: String,
    class_name: String,
    temps: HashMap<String, usize>,
    labels: usize,
    var_table: BTreeMap<String, Descriptor>,
    next_register: i32,
}

impl MethodState {
    pub fn new(method: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            class_name: class_name.into(),
            temps: HashMap::new(),
            labels: 0,
            var_table: BTreeMap::new(),
            next_register: 0,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn this(&self) -> Element {
        Element::This { ty: OllirType::Class(self.class_name.clone()) }
    }

    /// Add a variable to the table; locals and parameters get the next
    /// register, fields get none
    pub fn declare(&mut self, name: &str, scope: VarScope, ty: OllirType) {
        if self.var_table.contains_key(name) {
            return;
        }
        let register = match scope {
            VarScope::Field => -1,
            VarScope::Local | VarScope::Parameter => {
                self.next_register += 1;
                self.next_register - 1
            }
        };
        self.var_table.insert(name.to_string(), Descriptor { scope, register, ty });
    }

    pub fn note_field(&mut self, name: &str, ty: OllirType) {
        self.declare(name, VarScope::Field, ty);
    }

    /// Next unused name for the temporary prefix, registered as a local
    pub fn fresh_temp_name(&mut self, ty: OllirType) -> String {
        let counter = self.temps.entry(TEMP_PREFIX.to_string()).or_insert(0);
        let name = loop {
            let candidate = format!("{}{}", TEMP_PREFIX, counter);
            *counter += 1;
            if !self.var_table.contains_key(&candidate) {
                break candidate;
            }
        };
        self.declare(&name, VarScope::Local, ty);
        name
    }

    pub fn fresh_temp(&mut self, ty: OllirType) -> Element {
        let name = self.fresh_temp_name(ty.clone());
        Element::operand(name, ty)
    }

    pub fn next_label(&mut self) -> usize {
        self.labels += 1;
        self.labels - 1
    }

    /// Right-hand side that computes `value`
    pub fn rhs_of(&self, value: Value) -> Result<Rhs> {
        match value {
            Value::Element(element) => Ok(Rhs::Single(element)),
            Value::GetField { field, ty } => Ok(Rhs::GetField { object: self.this(), field, ty }),
            Value::Call(call) => Ok(Rhs::Call(call)),
            Value::ClassRef(class) => {
                Err(Error::lowering_error(&self.method, format!("class '{}' used as a value", class)))
            }
        }
    }

    /// Instruction writing `value` into the place denoted by `place`
    pub fn store(&self, place: Value, value: Element) -> Result<Instruction> {
        match place {
            Value::Element(dest @ (Element::Operand { .. } | Element::ArrayOperand { .. })) => {
                Ok(Instruction::Assign { dest, rhs: Rhs::Single(value) })
            }
            Value::GetField { field, .. } => Ok(Instruction::PutField { object: self.this(), field, value }),
            other => Err(Error::lowering_error(&self.method, format!("cannot assign to {:?}", other))),
        }
    }
}

/// Lowers the statements of one method
pub struct OllirGenerator<'a> {
    table: &'a SymbolTable,
    state: MethodState,
    code: Vec<Instruction>,
}

impl<'a> OllirGenerator<'a> {
    pub fn new(table: &'a SymbolTable, state: MethodState) -> Self {
        Self { table, state, code: Vec::new() }
    }

    /// Lower a `MethodDecl` into an IR method with its initial variable table
    pub fn lower_method(ast: &Ast, table: &'a SymbolTable, method: NodeId) -> Result<Method> {
        let cx = MethodContext::of(ast, method)?;
        let mut state = MethodState::new(cx.name, table.class_name());
        if !cx.is_static {
            state.declare(THIS_NAME, VarScope::Local, OllirType::Class(table.class_name().to_string()));
        }

        let mut params = Vec::new();
        for param in ast.children_of_kind(method, NodeKind::Param) {
            let name = ast.require_attr(param, "name")?;
            let ty = OllirType::from_type(&Type::of_decl(ast, param)?.0);
            state.declare(name, VarScope::Parameter, ty.clone());
            params.push(Param { name: name.to_string(), ty });
        }
        for decl in ast.descendants(method) {
            if ast.kind(decl) == NodeKind::VarDecl {
                let ty = OllirType::from_type(&Type::of_decl(ast, decl)?.0);
                state.declare(ast.require_attr(decl, "name")?, VarScope::Local, ty);
            }
        }

        let mut generator = OllirGenerator::new(table, state);
        let scope = Scope { method: Some(cx) };
        for stmt in ast.children(method) {
            if matches!(ast.kind(*stmt), NodeKind::Type | NodeKind::Param) {
                continue;
            }
            generator.statement(ast, *stmt, &scope)?;
        }

        let return_type = OllirType::from_type(&Type::of_decl(ast, method)?.0);
        if !generator.code.last().map(Instruction::is_return).unwrap_or(false) {
            generator.code.push(Instruction::Return(return_type.default_value()));
        }

        let is_public = ast.attr(method, "isPublic").map(|v| v == "true").unwrap_or(true);
        log::debug!("lowered method {}: {} instruction(s)", cx.name, generator.code.len());
        Ok(Method {
            name: cx.name.to_string(),
            is_public,
            is_static: cx.is_static,
            params,
            return_type,
            instructions: generator.code,
            var_table: generator.state.var_table,
        })
    }

    fn statement(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<()> {
        // `for` updates may be bare expressions
        if ast.kind(id).is_expression() {
            return self.expression_statement(ast, id);
        }
        dispatch(ast, id, scope, self)
    }

    fn expr<'x>(&'x mut self, ast: &'x Ast) -> ExprGenerator<'x> {
        ExprGenerator::new(ast, self.table, &mut self.state)
    }

    /// Lower to a simple element and emit the computation
    fn simple(&mut self, ast: &Ast, id: NodeId, hint: Option<&OllirType>) -> Result<Element> {
        let (element, code) = self.expr(ast).simple_with_hint(id, hint)?;
        self.code.extend(code);
        Ok(element)
    }

    fn expression_statement(&mut self, ast: &Ast, expr: NodeId) -> Result<()> {
        let hint = OllirType::Void;
        let result = self.expr(ast).visit(expr, Some(&hint))?;
        self.code.extend(result.computation);
        if let Value::Call(call) = result.value {
            self.code.push(Instruction::Call(call));
        }
        Ok(())
    }

    /// `if (!.bool cond) goto target;`
    fn branch_unless(&mut self, cond: Element, target: String) {
        self.code.push(Instruction::Branch {
            cond: Rhs::Unary { op: UnaryOperator::Not, operand: cond, ty: OllirType::Bool },
            target,
        });
    }

    fn target_of(&self, ast: &Ast, id: NodeId, name: &str) -> Result<(VarScope, OllirType)> {
        match self.table.resolve(Some(self.state.method()), name) {
            VarRef::Local(symbol) => Ok((VarScope::Local, OllirType::from_type(&symbol.ty))),
            VarRef::Parameter(_, symbol) => Ok((VarScope::Parameter, OllirType::from_type(&symbol.ty))),
            VarRef::Field(symbol) => Ok((VarScope::Field, OllirType::from_type(&symbol.ty))),
            VarRef::Imported(_) | VarRef::Unresolved => Err(Error::lowering_error(
                self.state.method(),
                format!("cannot assign to '{}' at line {}", name, ast.location(id).line),
            )),
        }
    }
}

impl AstVisitor for OllirGenerator<'_> {
    type Error = Error;

    fn visit_block(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<()> {
        for stmt in ast.children(id) {
            self.statement(ast, *stmt, scope)?;
        }
        Ok(())
    }

    fn visit_expr_stmt(&mut self, ast: &Ast, id: NodeId, _scope: &Scope<'_>) -> Result<()> {
        self.expression_statement(ast, ast.child(id, 0)?)
    }

    fn visit_assign(&mut self, ast: &Ast, id: NodeId, _scope: &Scope<'_>) -> Result<()> {
        let name = ast.require_attr(id, "name")?;
        let value = ast.child(id, 0)?;
        let (scope, ty) = self.target_of(ast, id, name)?;
        match scope {
            VarScope::Field => {
                let element = self.simple(ast, value, Some(&ty))?;
                self.state.note_field(name, ty);
                let object = self.state.this();
                self.code.push(Instruction::PutField { object, field: name.to_string(), value: element });
            }
            VarScope::Local | VarScope::Parameter => {
                let ExprResult { value, computation } = self.expr(ast).visit(value, Some(&ty))?;
                self.code.extend(computation);
                let rhs = self.state.rhs_of(value)?;
                self.code.push(Instruction::Assign { dest: Element::operand(name, ty), rhs });
            }
        }
        Ok(())
    }

    fn visit_array_assign(&mut self, ast: &Ast, id: NodeId, _scope: &Scope<'_>) -> Result<()> {
        let name = ast.require_attr(id, "name")?;
        let (scope, ty) = self.target_of(ast, id, name)?;
        let OllirType::Array(element_type) = ty.clone() else {
            return Err(Error::lowering_error(self.state.method(), format!("'{}' is not an array", name)));
        };
        let array = match scope {
            VarScope::Field => {
                self.state.note_field(name, ty.clone());
                let temp = self.state.fresh_temp(ty.clone());
                let rhs = Rhs::GetField { object: self.state.this(), field: name.to_string(), ty };
                self.code.push(Instruction::Assign { dest: temp.clone(), rhs });
                temp
            }
            VarScope::Local | VarScope::Parameter => Element::operand(name, ty),
        };
        let Element::Operand { name: array_name, .. } = array else {
            return Err(Error::internal_error("array base is not a named operand"));
        };

        let (index, code) = self.expr(ast).index(ast.child(id, 0)?)?;
        self.code.extend(code);
        let value = self.simple(ast, ast.child(id, 1)?, Some(element_type.as_ref()))?;
        self.code.push(Instruction::Assign {
            dest: Element::ArrayOperand { name: array_name, index: Box::new(index), ty: *element_type },
            rhs: Rhs::Single(value),
        });
        Ok(())
    }

    fn visit_return(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<()> {
        let value = match ast.children(id).first() {
            Some(expr) => {
                let hint = scope
                    .method_name()
                    .and_then(|m| self.table.return_type(m))
                    .map(OllirType::from_type);
                Some(self.simple(ast, *expr, hint.as_ref())?)
            }
            None => None,
        };
        self.code.push(Instruction::Return(value));
        Ok(())
    }

    fn visit_if(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<()> {
        let n = self.state.next_label();
        let (else_label, end_label) = (format!("else_{}", n), format!("endif_{}", n));
        let cond = self.simple(ast, ast.child(id, 0)?, Some(&OllirType::Bool))?;
        self.branch_unless(cond, else_label.clone());
        self.statement(ast, ast.child(id, 1)?, scope)?;
        self.code.push(Instruction::Goto(end_label.clone()));
        self.code.push(Instruction::Label(else_label));
        if let Some(otherwise) = ast.children(id).get(2) {
            self.statement(ast, *otherwise, scope)?;
        }
        self.code.push(Instruction::Label(end_label));
        Ok(())
    }

    fn visit_while(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<()> {
        let n = self.state.next_label();
        let (head, end) = (format!("loop_{}", n), format!("endloop_{}", n));
        self.code.push(Instruction::Label(head.clone()));
        let cond = self.simple(ast, ast.child(id, 0)?, Some(&OllirType::Bool))?;
        self.branch_unless(cond, end.clone());
        self.statement(ast, ast.child(id, 1)?, scope)?;
        self.code.push(Instruction::Goto(head));
        self.code.push(Instruction::Label(end));
        Ok(())
    }

    fn visit_for(&mut self, ast: &Ast, id: NodeId, scope: &Scope<'_>) -> Result<()> {
        self.statement(ast, ast.child(id, 0)?, scope)?;
        let n = self.state.next_label();
        let (head, end) = (format!("forloop_{}", n), format!("endforloop_{}", n));
        self.code.push(Instruction::Label(head.clone()));
        let cond = self.simple(ast, ast.child(id, 1)?, Some(&OllirType::Bool))?;
        self.branch_unless(cond, end.clone());
        self.statement(ast, ast.child(id, 3)?, scope)?;
        self.statement(ast, ast.child(id, 2)?, scope)?;
        self.code.push(Instruction::Goto(head));
        self.code.push(Instruction::Label(end));
        Ok(())
    }
}

/// Lower a checked compilation unit
pub fn lower_class(ast: &Ast, table: &SymbolTable) -> Result<ClassUnit> {
    let class = ast.class_decl()?;
    let fields = table
        .fields()
        .iter()
        .map(|f| Field { name: f.name.clone(), ty: OllirType::from_type(&f.ty) })
        .collect();
    let mut methods = Vec::new();
    for method in ast.children_of_kind(class, NodeKind::MethodDecl) {
        methods.push(OllirGenerator::lower_method(ast, table, method)?);
    }
    log::debug!("lowered class {}: {} method(s)", table.class_name(), methods.len());
    Ok(ClassUnit {
        name: table.class_name().to_string(),
        super_class: table.has_super().then(|| table.super_name().to_string()),
        imports: table.imports().iter().map(|i| simple_name(i).to_string()).collect(),
        fields,
        methods,
    })
}
