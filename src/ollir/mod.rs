//! Typed three-address intermediate representation
//!
//! Produced by [`lower_class`], consumed by the register allocator and by an
//! external assembler. `Display` renders the OLLIR text form, e.g.
//! `t0.i32 :=.i32 a.i32 +.i32 1.i32;`.

mod expr;
mod lower;

pub use expr::{ExprGenerator, ExprResult, Value};
pub use lower::{lower_class, MethodState, OllirGenerator};

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::consts::{BOOLEAN_TYPE, INT_TYPE, STRING_TYPE, VOID_TYPE};
use crate::symtab::Type;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OllirType {
    Int,
    Bool,
    Void,
    Str,
    Class(String),
    Array(Box<OllirType>),
}

impl OllirType {
    pub fn from_type(ty: &Type) -> Self {
        let element = match ty.name.as_str() {
            INT_TYPE => OllirType::Int,
            BOOLEAN_TYPE => OllirType::Bool,
            VOID_TYPE => OllirType::Void,
            STRING_TYPE => OllirType::Str,
            // calls into unknown code default to int
            _ if ty.is_unknown() => OllirType::Int,
            name => OllirType::Class(name.to_string()),
        };
        if ty.is_array {
            OllirType::Array(Box::new(element))
        } else {
            element
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, OllirType::Void)
    }

    /// Value a method returns when its body falls off the end
    pub fn default_value(&self) -> Option<Element> {
        match self {
            OllirType::Void => None,
            OllirType::Int | OllirType::Bool => Some(Element::literal("0", self.clone())),
            _ => Some(Element::literal("null", self.clone())),
        }
    }
}

impl fmt::Display for OllirType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OllirType::Int => f.write_str("i32"),
            OllirType::Bool => f.write_str("bool"),
            OllirType::Void => f.write_str("V"),
            OllirType::Str => f.write_str("String"),
            OllirType::Class(name) => f.write_str(name),
            OllirType::Array(element) => write!(f, "array.{}", element),
        }
    }
}

/// Operand of an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Literal { value: String, ty: OllirType },
    Operand { name: String, ty: OllirType },
    /// `a[i.i32].i32`; the index is always a named operand
    ArrayOperand { name: String, index: Box<Element>, ty: OllirType },
    This { ty: OllirType },
}

impl Element {
    pub fn literal(value: impl Into<String>, ty: OllirType) -> Self {
        Element::Literal { value: value.into(), ty }
    }

    pub fn operand(name: impl Into<String>, ty: OllirType) -> Self {
        Element::Operand { name: name.into(), ty }
    }

    pub fn ty(&self) -> &OllirType {
        match self {
            Element::Literal { ty, .. }
            | Element::Operand { ty, .. }
            | Element::ArrayOperand { ty, .. }
            | Element::This { ty } => ty,
        }
    }

    /// Usable directly as an operand of a binary op, call or return
    pub fn is_simple(&self) -> bool {
        !matches!(self, Element::ArrayOperand { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Element::Literal { .. })
    }

    /// Variables read when this element is evaluated
    pub fn names(&self) -> Vec<&str> {
        match self {
            Element::Operand { name, .. } => vec![name.as_str()],
            Element::ArrayOperand { name, index, .. } => {
                let mut names = vec![name.as_str()];
                names.extend(index.names());
                names
            }
            Element::Literal { .. } | Element::This { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Literal { value, ty } => write!(f, "{}.{}", value, ty),
            Element::Operand { name, ty } => write!(f, "{}.{}", name, ty),
            Element::ArrayOperand { name, index, ty } => write!(f, "{}[{}].{}", name, index, ty),
            Element::This { .. } => f.write_str("this"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Call through an imported class name
    Static(String),
    Virtual(Element),
    Special(Element),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub invocation: Invocation,
    pub method: String,
    pub args: Vec<Element>,
    pub return_type: OllirType,
}

impl Call {
    fn names(&self) -> Vec<&str> {
        let mut names = match &self.invocation {
            Invocation::Static(_) => Vec::new(),
            Invocation::Virtual(target) | Invocation::Special(target) => target.names(),
        };
        for arg in &self.args {
            names.extend(arg.names());
        }
        names
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.invocation {
            Invocation::Static(class) => write!(f, "invokestatic({}, \"{}\"", class, self.method)?,
            Invocation::Virtual(target) => write!(f, "invokevirtual({}, \"{}\"", target, self.method)?,
            Invocation::Special(target) => write!(f, "invokespecial({}, \"{}\"", target, self.method)?,
        }
        for arg in &self.args {
            write!(f, ", {}", arg)?;
        }
        write!(f, ").{}", self.return_type)
    }
}

/// Right-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rhs {
    Single(Element),
    Binary { op: BinaryOperator, lhs: Element, rhs: Element, ty: OllirType },
    Unary { op: UnaryOperator, operand: Element, ty: OllirType },
    Call(Call),
    GetField { object: Element, field: String, ty: OllirType },
    ArrayLength(Element),
    NewObject(String),
    NewArray { size: Element, element: OllirType },
}

impl Rhs {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Rhs::Single(e) | Rhs::ArrayLength(e) | Rhs::Unary { operand: e, .. } => e.names(),
            Rhs::Binary { lhs, rhs, .. } => {
                let mut names = lhs.names();
                names.extend(rhs.names());
                names
            }
            Rhs::Call(call) => call.names(),
            Rhs::GetField { object, .. } => object.names(),
            Rhs::NewObject(_) => Vec::new(),
            Rhs::NewArray { size, .. } => size.names(),
        }
    }
}

impl fmt::Display for Rhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rhs::Single(e) => write!(f, "{}", e),
            Rhs::Binary { op, lhs, rhs, ty } => write!(f, "{} {}.{} {}", lhs, op, ty, rhs),
            Rhs::Unary { op, operand, ty } => write!(f, "{}.{} {}", op, ty, operand),
            Rhs::Call(call) => write!(f, "{}", call),
            Rhs::GetField { object, field, ty } => write!(f, "getfield({}, {}.{}).{}", object, field, ty, ty),
            Rhs::ArrayLength(array) => write!(f, "arraylength({}).i32", array),
            Rhs::NewObject(class) => write!(f, "new({}).{}", class, class),
            Rhs::NewArray { size, element } => write!(f, "new(array, {}).array.{}", size, element),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `dest :=.T rhs;` where `dest` is an operand or an array element
    Assign { dest: Element, rhs: Rhs },
    Call(Call),
    PutField { object: Element, field: String, value: Element },
    Goto(String),
    Branch { cond: Rhs, target: String },
    Label(String),
    Return(Option<Element>),
}

impl Instruction {
    /// Variable written by the instruction
    pub fn def(&self) -> Option<&str> {
        match self {
            Instruction::Assign { dest: Element::Operand { name, .. }, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Variables read by the instruction
    pub fn uses(&self) -> Vec<&str> {
        match self {
            Instruction::Assign { dest, rhs } => {
                let mut names = match dest {
                    // writing an element reads the array reference and the index
                    Element::ArrayOperand { .. } => dest.names(),
                    _ => Vec::new(),
                };
                names.extend(rhs.names());
                names
            }
            Instruction::Call(call) => call.names(),
            Instruction::PutField { object, value, .. } => {
                let mut names = object.names();
                names.extend(value.names());
                names
            }
            Instruction::Branch { cond, .. } => cond.names(),
            Instruction::Return(Some(value)) => value.names(),
            Instruction::Return(None) | Instruction::Goto(_) | Instruction::Label(_) => Vec::new(),
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Instruction::Return(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dest, rhs } => write!(f, "{} :=.{} {};", dest, dest.ty(), rhs),
            Instruction::Call(call) => write!(f, "{};", call),
            Instruction::PutField { object, field, value } => {
                write!(f, "putfield({}, {}.{}, {}).V;", object, field, value.ty(), value)
            }
            Instruction::Goto(label) => write!(f, "goto {};", label),
            Instruction::Branch { cond, target } => write!(f, "if ({}) goto {};", cond, target),
            Instruction::Label(label) => write!(f, "{}:", label),
            Instruction::Return(Some(value)) => write!(f, "ret.{} {};", value.ty(), value),
            Instruction::Return(None) => f.write_str("ret.V;"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarScope {
    Local,
    Parameter,
    /// Class field read or written by the method; never holds a register
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub scope: VarScope,
    pub register: i32,
    pub ty: OllirType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: OllirType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub params: Vec<Param>,
    pub return_type: OllirType,
    pub instructions: Vec<Instruction>,
    pub var_table: BTreeMap<String, Descriptor>,
}

impl Method {
    pub fn register_of(&self, name: &str) -> Option<i32> {
        self.var_table.get(name).map(|d| d.register)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = if self.is_public { "public" } else { "private" };
        let modifier = if self.is_static { " static" } else { "" };
        let params: Vec<String> = self.params.iter().map(|p| format!("{}.{}", p.name, p.ty)).collect();
        writeln!(f, ".method {}{} {}({}).{} {{", access, modifier, self.name, params.join(", "), self.return_type)?;
        for instruction in &self.instructions {
            match instruction {
                Instruction::Label(_) => writeln!(f, "{}", instruction)?,
                _ => writeln!(f, "  {}", instruction)?,
            }
        }
        writeln!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: OllirType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassUnit {
    pub name: String,
    pub super_class: Option<String>,
    pub imports: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

impl ClassUnit {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl fmt::Display for ClassUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "import {};", import)?;
        }
        match &self.super_class {
            Some(parent) => writeln!(f, "{} extends {} {{", self.name, parent)?,
            None => writeln!(f, "{} {{", self.name)?,
        }
        for field in &self.fields {
            writeln!(f, ".field private {}.{};", field.name, field.ty)?;
        }
        writeln!(f, ".construct {}().V {{", self.name)?;
        writeln!(f, "  invokespecial(this, \"<init>\").V;")?;
        writeln!(f, "}}")?;
        for method in &self.methods {
            write!(f, "{}", method)?;
        }
        writeln!(f, "}}")
    }
}
