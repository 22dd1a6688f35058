use std::fmt;

/// Operator families; each family has one result-type rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    /// `+ - * /`: int x int -> int
    Arithmetic,
    /// `< > <= >=`: int x int -> boolean
    Relational,
    /// `== !=`: T x T -> boolean
    Equality,
    /// `&& ||`: boolean x boolean -> boolean
    Logical,
    /// `+= -= *= /=`: type of the left operand
    CompoundAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl BinaryOperator {
    pub fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "&&" => Self::And,
            "||" => Self::Or,
            "+=" => Self::AddAssign,
            "-=" => Self::SubAssign,
            "*=" => Self::MulAssign,
            "/=" => Self::DivAssign,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::And => "&&",
            Self::Or => "||",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
        }
    }

    pub fn family(&self) -> OperatorFamily {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div => OperatorFamily::Arithmetic,
            Self::Lt | Self::Gt | Self::Le | Self::Ge => OperatorFamily::Relational,
            Self::Eq | Self::Ne => OperatorFamily::Equality,
            Self::And | Self::Or => OperatorFamily::Logical,
            Self::AddAssign | Self::SubAssign | Self::MulAssign | Self::DivAssign => OperatorFamily::CompoundAssign,
        }
    }

    /// `+=` -> `+`, and so on; `None` for non-compound operators
    pub fn compound_base(&self) -> Option<BinaryOperator> {
        match self {
            Self::AddAssign => Some(Self::Add),
            Self::SubAssign => Some(Self::Sub),
            Self::MulAssign => Some(Self::Mul),
            Self::DivAssign => Some(Self::Div),
            _ => None,
        }
    }

    /// Evaluate an arithmetic operator on two literals with 32-bit wrapping.
    ///
    /// Division by zero and non-arithmetic operators do not fold.
    pub fn fold(&self, lhs: i32, rhs: i32) -> Option<i32> {
        match self {
            Self::Add => Some(lhs.wrapping_add(rhs)),
            Self::Sub => Some(lhs.wrapping_sub(rhs)),
            Self::Mul => Some(lhs.wrapping_mul(rhs)),
            Self::Div if rhs != 0 => Some(lhs.wrapping_div(rhs)),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Neg,
}

impl UnaryOperator {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "!" => Some(Self::Not),
            "-" => Some(Self::Neg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Neg => "-",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
