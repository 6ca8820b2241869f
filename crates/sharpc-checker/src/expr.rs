//! Constant initializer expressions.
//!
//! The semantic layer sees initializers after parsing; only the shapes that
//! can take part in constant evaluation are distinguished; anything else is
//! [`ConstExpr::NonConstant`].

use crate::value::ConstantValue;
use sharpc_binder::PrimitiveType;

#[derive(Clone, Debug, PartialEq)]
pub enum ConstExpr {
    Literal(ConstantValue),
    /// Simple name: a constant of the declaring type, its bases or its
    /// enclosing types.
    Name(String),
    /// `Type.Member`, where `target` is a (possibly dotted) type name.
    MemberAccess { target: String, member: String },
    Unary { op: UnaryOp, operand: Box<ConstExpr> },
    Binary {
        op: BinaryOp,
        left: Box<ConstExpr>,
        right: Box<ConstExpr>,
    },
    Cast { ty: TypeSyntax, operand: Box<ConstExpr> },
    Checked(Box<ConstExpr>),
    Unchecked(Box<ConstExpr>),
    /// `new T[] { ... }`; never constant.
    ArrayCreation,
    /// Any other expression, kept as source text.
    NonConstant(String),
}

impl ConstExpr {
    pub fn int(value: i32) -> Self {
        ConstExpr::Literal(ConstantValue::Int(value))
    }

    pub fn name(name: impl Into<String>) -> Self {
        ConstExpr::Name(name.into())
    }

    pub fn member(target: impl Into<String>, member: impl Into<String>) -> Self {
        ConstExpr::MemberAccess {
            target: target.into(),
            member: member.into(),
        }
    }

    pub fn unary(op: UnaryOp, operand: ConstExpr) -> Self {
        ConstExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: ConstExpr, right: ConstExpr) -> Self {
        ConstExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn cast(ty: TypeSyntax, operand: ConstExpr) -> Self {
        ConstExpr::Cast {
            ty,
            operand: Box::new(operand),
        }
    }
}

/// Target of a cast, before resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSyntax {
    Primitive(PrimitiveType),
    Named(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
}

impl UnaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Minus,
            "~" => UnaryOp::BitNot,
            "!" => UnaryOp::Not,
            _ => return None,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    Or,
    Xor,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "&" => BinaryOp::And,
            "|" => BinaryOp::Or,
            "^" => BinaryOp::Xor,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::LogicalAnd,
            "||" => BinaryOp::LogicalOr,
            _ => return None,
        })
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }
}
