//! Semantic checks for the sharpc C# layer.
//!
//! This crate is organized into several submodules:
//! - `decimal` - 96-bit decimal values used by constant folding
//! - `value` - typed constant values and their emitted form
//! - `expr` - constant initializer expressions
//! - `convert` - implicit and explicit constant conversions
//! - `fold` - unary and binary operator folding
//! - `constant` - declared constants and demand-driven resolution
//! - `pending` - interface and abstract-member obligations
//! - `proxy` - forwarding members synthesized for interface slots
//! - `context` - `Compilation`, the session owning every table

pub mod decimal;
pub use decimal::Decimal;

pub mod value;
pub use value::{ConstantValue, EmittedConstant, Numeric};

pub mod expr;
pub use expr::{BinaryOp, ConstExpr, TypeSyntax, UnaryOp};

pub mod convert;
pub use convert::ConversionError;

pub mod fold;
pub use fold::FoldError;

pub mod constant;
pub use constant::{ConstantDecl, ConstantId, ConstantResolver, ConstantTable};

pub mod pending;
pub use pending::{
    EntryKind, ImplementationReport, MatchMode, PendingEntry, PendingImplementation, Slot,
    SlotFilter, SlotQuery, SlotRef, check_type_implementations,
};

pub mod proxy;
pub use proxy::ProxyMember;

pub mod context;
pub use context::Compilation;
