//! Expression lowering
//!
//! Every expression lowers to an [`ExprResult`]: the instructions that must
//! run first, plus a value usable by the parent. Parents concatenate child
//! computations in evaluation order and then append their own instruction.

use super::lower::MethodState;
use super::{Call, Element, Instruction, Invocation, OllirType, Rhs};
use crate::ast::{Ast, AstError, BinaryOperator, NodeId, NodeKind, OperatorFamily, UnaryOperator};
use crate::consts::CONSTRUCTOR_NAME;
use crate::error::{Error, Result};
use crate::symtab::{SymbolTable, VarRef};

/// What an expression evaluates to, before materialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Element(Element),
    /// Read of a field of `this`
    GetField { field: String, ty: OllirType },
    Call(Call),
    /// Imported class name, only meaningful as a static call receiver
    ClassRef(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprResult {
    pub value: Value,
    pub computation: Vec<Instruction>,
}

impl ExprResult {
    pub fn new(value: Value, computation: Vec<Instruction>) -> Self {
        Self { value, computation }
    }

    fn element(element: Element, computation: Vec<Instruction>) -> Self {
        Self::new(Value::Element(element), computation)
    }

    /// Turn the value into a simple element, storing it in a fresh temporary
    /// when it is a field read, a call or an array element.
    pub fn into_simple(self, state: &mut MethodState) -> Result<(Element, Vec<Instruction>)> {
        let mut code = self.computation;
        let rhs = match self.value {
            Value::Element(element) if element.is_simple() => return Ok((element, code)),
            other => state.rhs_of(other)?,
        };
        let ty = match &rhs {
            Rhs::Single(element) => element.ty().clone(),
            Rhs::GetField { ty, .. } => ty.clone(),
            Rhs::Call(call) => call.return_type.clone(),
            _ => return Err(Error::internal_error("unexpected right-hand side while materializing")),
        };
        if ty.is_void() {
            return Err(Error::lowering_error(state.method(), "void call used as a value"));
        }
        let temp = state.fresh_temp(ty);
        code.push(Instruction::Assign { dest: temp.clone(), rhs });
        Ok((temp, code))
    }
}

/// Lowers one expression tree within a method
pub struct ExprGenerator<'x> {
    ast: &'x Ast,
    table: &'x SymbolTable,
    state: &'x mut MethodState,
}

impl<'x> ExprGenerator<'x> {
    pub fn new(ast: &'x Ast, table: &'x SymbolTable, state: &'x mut MethodState) -> Self {
        Self { ast, table, state }
    }

    /// Lower `id`; `hint` is the type expected by the context, used for
    /// calls whose return type cannot be looked up.
    pub fn visit(&mut self, id: NodeId, hint: Option<&OllirType>) -> Result<ExprResult> {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::IntLiteral => {
                let value = ast.require_attr(id, "value")?;
                Ok(ExprResult::element(Element::literal(value, OllirType::Int), Vec::new()))
            }
            NodeKind::BooleanLiteral => {
                let value = if ast.flag(id, "value") { "1" } else { "0" };
                Ok(ExprResult::element(Element::literal(value, OllirType::Bool), Vec::new()))
            }
            NodeKind::This => Ok(ExprResult::element(self.state.this(), Vec::new())),
            NodeKind::Paren => self.visit(ast.child(id, 0)?, hint),
            NodeKind::Identifier => self.identifier(id),
            NodeKind::BinaryOp => self.binary(id),
            NodeKind::UnaryOp => self.unary(id),
            NodeKind::ArrayAccess => self.array_access(id),
            NodeKind::ArrayLength => {
                let (array, mut code) = self.array_base(ast.child(id, 0)?)?;
                let temp = self.state.fresh_temp(OllirType::Int);
                code.push(Instruction::Assign { dest: temp.clone(), rhs: Rhs::ArrayLength(array) });
                Ok(ExprResult::element(temp, code))
            }
            NodeKind::MethodCall => self.call(id, hint),
            NodeKind::NewObject => {
                let class = ast.require_attr(id, "name")?;
                let temp = self.state.fresh_temp(OllirType::Class(class.to_string()));
                let code = vec![
                    Instruction::Assign { dest: temp.clone(), rhs: Rhs::NewObject(class.to_string()) },
                    Instruction::Call(Call {
                        invocation: Invocation::Special(temp.clone()),
                        method: CONSTRUCTOR_NAME.to_string(),
                        args: Vec::new(),
                        return_type: OllirType::Void,
                    }),
                ];
                Ok(ExprResult::element(temp, code))
            }
            NodeKind::NewIntArray => {
                let (size, mut code) = self.simple(ast.child(id, 0)?)?;
                let temp = self.state.fresh_temp(OllirType::Array(Box::new(OllirType::Int)));
                code.push(Instruction::Assign {
                    dest: temp.clone(),
                    rhs: Rhs::NewArray { size, element: OllirType::Int },
                });
                Ok(ExprResult::element(temp, code))
            }
            NodeKind::ArrayLiteral => {
                let mut code = Vec::new();
                let mut elements = Vec::new();
                for element in ast.children(id) {
                    let (value, computation) = self.simple(*element)?;
                    code.extend(computation);
                    elements.push(value);
                }
                let element_type = elements.first().map(|e| e.ty().clone()).unwrap_or(OllirType::Int);
                let array = self.pack(elements, element_type, &mut code);
                Ok(ExprResult::element(array, code))
            }
            kind => Err(AstError::UnexpectedNode { node: id, kind }.into()),
        }
    }

    /// Lower and materialize into a simple element
    pub fn simple(&mut self, id: NodeId) -> Result<(Element, Vec<Instruction>)> {
        self.simple_with_hint(id, None)
    }

    pub fn simple_with_hint(&mut self, id: NodeId, hint: Option<&OllirType>) -> Result<(Element, Vec<Instruction>)> {
        let result = self.visit(id, hint)?;
        result.into_simple(self.state)
    }

    /// Array index: a named operand, literals are copied into a temporary
    pub fn index(&mut self, id: NodeId) -> Result<(Element, Vec<Instruction>)> {
        let (index, mut code) = self.simple(id)?;
        if !index.is_literal() {
            return Ok((index, code));
        }
        let temp = self.state.fresh_temp(OllirType::Int);
        code.push(Instruction::Assign { dest: temp.clone(), rhs: Rhs::Single(index) });
        Ok((temp, code))
    }

    fn identifier(&mut self, id: NodeId) -> Result<ExprResult> {
        let name = self.ast.require_attr(id, "name")?;
        match self.table.resolve(Some(self.state.method()), name) {
            VarRef::Local(symbol) | VarRef::Parameter(_, symbol) => Ok(ExprResult::element(
                Element::operand(name, OllirType::from_type(&symbol.ty)),
                Vec::new(),
            )),
            VarRef::Field(symbol) => {
                let ty = OllirType::from_type(&symbol.ty);
                self.state.note_field(name, ty.clone());
                Ok(ExprResult::new(Value::GetField { field: name.to_string(), ty }, Vec::new()))
            }
            VarRef::Imported(simple) => Ok(ExprResult::new(Value::ClassRef(simple.to_string()), Vec::new())),
            VarRef::Unresolved => {
                Err(Error::lowering_error(self.state.method(), format!("unresolved identifier '{}'", name)))
            }
        }
    }

    fn binary(&mut self, id: NodeId) -> Result<ExprResult> {
        let raw = self.ast.require_attr(id, "op")?;
        let op = BinaryOperator::parse(raw)
            .ok_or_else(|| Error::lowering_error(self.state.method(), format!("unknown operator '{}'", raw)))?;
        let (lhs_id, rhs_id) = (self.ast.child(id, 0)?, self.ast.child(id, 1)?);
        if let Some(base) = op.compound_base() {
            return self.compound(base, lhs_id, rhs_id);
        }

        let (lhs, mut code) = self.simple(lhs_id)?;
        let (rhs, rhs_code) = self.simple(rhs_id)?;
        code.extend(rhs_code);
        let ty = match op.family() {
            OperatorFamily::Arithmetic => OllirType::Int,
            _ => OllirType::Bool,
        };
        let temp = self.state.fresh_temp(ty.clone());
        code.push(Instruction::Assign { dest: temp.clone(), rhs: Rhs::Binary { op, lhs, rhs, ty } });
        Ok(ExprResult::element(temp, code))
    }

    /// `x op= e` lowers to `t := x op e; x := t`
    fn compound(&mut self, op: BinaryOperator, target: NodeId, value: NodeId) -> Result<ExprResult> {
        let place = self.visit(target, None)?;
        let mut code = place.computation;
        let place = place.value;
        let (current, read) = ExprResult::new(place.clone(), Vec::new()).into_simple(self.state)?;
        code.extend(read);
        let (rhs, rhs_code) = self.simple(value)?;
        code.extend(rhs_code);

        let ty = current.ty().clone();
        let result = self.state.fresh_temp(ty.clone());
        code.push(Instruction::Assign { dest: result.clone(), rhs: Rhs::Binary { op, lhs: current, rhs, ty } });
        code.push(self.state.store(place, result.clone())?);
        Ok(ExprResult::element(result, code))
    }

    fn unary(&mut self, id: NodeId) -> Result<ExprResult> {
        let raw = self.ast.require_attr(id, "op")?;
        let op = UnaryOperator::parse(raw)
            .ok_or_else(|| Error::lowering_error(self.state.method(), format!("unknown operator '{}'", raw)))?;
        let (operand, mut code) = self.simple(self.ast.child(id, 0)?)?;
        let ty = match op {
            UnaryOperator::Not => OllirType::Bool,
            UnaryOperator::Neg => OllirType::Int,
        };
        let temp = self.state.fresh_temp(ty.clone());
        code.push(Instruction::Assign { dest: temp.clone(), rhs: Rhs::Unary { op, operand, ty } });
        Ok(ExprResult::element(temp, code))
    }

    /// Indexed or measured base; a call whose result type is unknown is taken to yield `int[]`
    fn array_base(&mut self, id: NodeId) -> Result<(Element, Vec<Instruction>)> {
        self.simple_with_hint(id, Some(&OllirType::Array(Box::new(OllirType::Int))))
    }

    fn array_access(&mut self, id: NodeId) -> Result<ExprResult> {
        let (base, mut code) = self.array_base(self.ast.child(id, 0)?)?;
        let (index, index_code) = self.index(self.ast.child(id, 1)?)?;
        code.extend(index_code);
        match base {
            Element::Operand { name, ty: OllirType::Array(element) } => Ok(ExprResult::element(
                Element::ArrayOperand { name, index: Box::new(index), ty: *element },
                code,
            )),
            other => Err(Error::lowering_error(
                self.state.method(),
                format!("cannot index '{}'", other),
            )),
        }
    }

    fn call(&mut self, id: NodeId, hint: Option<&OllirType>) -> Result<ExprResult> {
        let ast = self.ast;
        let name = ast.require_attr(id, "name")?;
        let receiver = ast.child(id, 0)?;
        let mut code = Vec::new();

        let receiver = self.visit(receiver, None)?;
        let invocation = match receiver.value {
            Value::ClassRef(class) => {
                code.extend(receiver.computation);
                Invocation::Static(class)
            }
            value => {
                let (target, computation) = ExprResult::new(value, receiver.computation).into_simple(self.state)?;
                code.extend(computation);
                Invocation::Virtual(target)
            }
        };

        let own_class = OllirType::Class(self.table.class_name().to_string());
        let declared = match &invocation {
            Invocation::Virtual(target) if *target.ty() == own_class && self.table.has_method(name) => true,
            _ => false,
        };

        let mut args = Vec::new();
        for arg in &ast.children(id)[1..] {
            let (value, computation) = self.simple(*arg)?;
            code.extend(computation);
            args.push(value);
        }
        if declared && self.table.is_varargs(name) {
            args = self.pack_varargs(name, args, &mut code);
        }

        let return_type = match self.table.return_type(name) {
            Some(ty) if declared => OllirType::from_type(ty),
            _ => hint.cloned().unwrap_or(OllirType::Int),
        };
        Ok(ExprResult::new(
            Value::Call(Call { invocation, method: name.to_string(), args, return_type }),
            code,
        ))
    }

    /// Collect the trailing arguments of a varargs call into one array,
    /// unless the caller already passes the array itself.
    fn pack_varargs(&mut self, method: &str, mut args: Vec<Element>, code: &mut Vec<Instruction>) -> Vec<Element> {
        let fixed = self.table.parameters(method).len().saturating_sub(1);
        let int_array = OllirType::Array(Box::new(OllirType::Int));
        if args.len() == fixed + 1 && *args[fixed].ty() == int_array {
            return args;
        }
        let extra = args.split_off(fixed.min(args.len()));
        let array = self.pack(extra, OllirType::Int, code);
        args.push(array);
        args
    }

    /// `t := new(array, n)` followed by one store per element
    fn pack(&mut self, elements: Vec<Element>, element_type: OllirType, code: &mut Vec<Instruction>) -> Element {
        let array_type = OllirType::Array(Box::new(element_type.clone()));
        let name = self.state.fresh_temp_name(array_type.clone());
        let array = Element::operand(name.clone(), array_type);
        code.push(Instruction::Assign {
            dest: array.clone(),
            rhs: Rhs::NewArray {
                size: Element::literal(elements.len().to_string(), OllirType::Int),
                element: element_type.clone(),
            },
        });
        for (position, element) in elements.into_iter().enumerate() {
            let index = self.state.fresh_temp(OllirType::Int);
            code.push(Instruction::Assign {
                dest: index.clone(),
                rhs: Rhs::Single(Element::literal(position.to_string(), OllirType::Int)),
            });
            code.push(Instruction::Assign {
                dest: Element::ArrayOperand { name: name.clone(), index: Box::new(index), ty: element_type.clone() },
                rhs: Rhs::Single(element),
            });
        }
        array
    }
}
