//! JSON declaration manifest.
//!
//! The manifest stands in for the parser: it lists referenced assemblies,
//! added modules and, per source file, the directives, namespaces and type
//! declarations in source order. Constant initializers use a small
//! expression vocabulary ([`ExprSpec`]).

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use sharpc_binder::{Modifiers, ParameterModifier, PrimitiveType, TypeKind};
use sharpc_checker::{BinaryOp, ConstExpr, ConstantValue, Decimal, TypeSyntax, UnaryOp};
use sharpc_common::CompilerOptions;
use std::path::Path;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manifest {
    pub options: CompilerOptions,
    pub references: Vec<AssemblySpec>,
    pub modules: Vec<ModuleSpec>,
    pub files: Vec<FileSpec>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid manifest {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblySpec {
    pub name: String,
    /// `extern alias` name; absent for assemblies merged into `global`.
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeSpec>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSpec {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeSpec>,
}

/// Directives and declarations of a compilation unit or namespace block.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockSpec {
    pub extern_aliases: Vec<DirectiveSpec>,
    pub usings: Vec<DirectiveSpec>,
    pub aliases: Vec<AliasSpec>,
    pub namespaces: Vec<NamespaceSpec>,
    pub types: Vec<TypeSpec>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSpec {
    pub name: String,
    #[serde(flatten)]
    pub body: BlockSpec,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSpec {
    /// Possibly dotted (`A.B.C`).
    pub name: String,
    #[serde(default)]
    pub line: u32,
    #[serde(flatten)]
    pub body: BlockSpec,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DirectiveSpec {
    pub name: String,
    #[serde(default)]
    pub line: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AliasSpec {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub line: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSpec {
    pub name: String,
    pub kind: TypeKind,
    /// Only for assembly and module types; source types take the namespace
    /// they are declared in.
    #[serde(default)]
    pub namespace: String,
    #[serde(default = "default_type_modifiers")]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub indexer_name: Option<String>,
    /// Underlying type keyword of an enum.
    #[serde(default)]
    pub underlying: Option<PrimitiveType>,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
    #[serde(default)]
    pub constants: Vec<ConstantSpec>,
    #[serde(default)]
    pub enum_members: Vec<EnumMemberSpec>,
    #[serde(default)]
    pub nested: Vec<TypeSpec>,
}

fn default_type_modifiers() -> Vec<String> {
    vec!["public".to_string()]
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum MemberSpec {
    Method {
        name: String,
        #[serde(rename = "returns", default = "void_type")]
        return_type: String,
        #[serde(default)]
        parameters: Vec<ParameterSpec>,
        #[serde(flatten)]
        common: MemberCommon,
    },
    Property {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(default = "yes")]
        get: bool,
        #[serde(default)]
        set: bool,
        #[serde(flatten)]
        common: MemberCommon,
    },
    Indexer {
        #[serde(rename = "type")]
        ty: String,
        parameters: Vec<ParameterSpec>,
        #[serde(default = "yes")]
        get: bool,
        #[serde(default)]
        set: bool,
        #[serde(flatten)]
        common: MemberCommon,
    },
    Event {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(flatten)]
        common: MemberCommon,
    },
    Field {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(flatten)]
        common: MemberCommon,
    },
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberCommon {
    pub modifiers: Vec<String>,
    /// Interface named by an explicit implementation.
    pub explicit_interface: Option<String>,
    pub line: u32,
}

impl MemberSpec {
    pub fn common(&self) -> &MemberCommon {
        match self {
            MemberSpec::Method { common, .. }
            | MemberSpec::Property { common, .. }
            | MemberSpec::Indexer { common, .. }
            | MemberSpec::Event { common, .. }
            | MemberSpec::Field { common, .. } => common,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MemberSpec::Method { name, .. }
            | MemberSpec::Property { name, .. }
            | MemberSpec::Event { name, .. }
            | MemberSpec::Field { name, .. } => name,
            MemberSpec::Indexer { .. } => "this",
        }
    }
}

fn void_type() -> String {
    "void".to_string()
}

const fn yes() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub modifier: ParameterModifier,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConstantSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: ExprSpec,
    #[serde(default)]
    pub line: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EnumMemberSpec {
    pub name: String,
    #[serde(default)]
    pub value: Option<ExprSpec>,
    #[serde(default)]
    pub line: u32,
}

/// Constant initializer as written in the manifest, e.g.
/// `{"binary": {"op": "+", "left": {"name": "A"}, "right": {"int": 1}}}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExprSpec {
    Bool(bool),
    Char(char),
    #[serde(rename = "sbyte")]
    SByte(i8),
    Byte(u8),
    Short(i16),
    #[serde(rename = "ushort")]
    UShort(u16),
    Int(i32),
    #[serde(rename = "uint")]
    UInt(u32),
    Long(i64),
    #[serde(rename = "ulong")]
    ULong(u64),
    Float(f32),
    Double(f64),
    /// Decimal literal text (`"1.50"`).
    Decimal(String),
    String(String),
    Null,
    Name(String),
    Member {
        target: String,
        member: String,
    },
    Unary {
        op: String,
        operand: Box<ExprSpec>,
    },
    Binary {
        op: String,
        left: Box<ExprSpec>,
        right: Box<ExprSpec>,
    },
    Cast {
        #[serde(rename = "type")]
        ty: String,
        operand: Box<ExprSpec>,
    },
    Checked(Box<ExprSpec>),
    Unchecked(Box<ExprSpec>),
    ArrayCreation,
    NonConstant(String),
}

impl ExprSpec {
    pub fn to_const_expr(&self) -> Result<ConstExpr> {
        fn literal(value: ConstantValue) -> Result<ConstExpr> {
            Ok(ConstExpr::Literal(value))
        }
        match self {
            ExprSpec::Bool(v) => literal(ConstantValue::Bool(*v)),
            ExprSpec::Char(c) => {
                let mut units = [0u16; 2];
                match c.encode_utf16(&mut units) {
                    [unit] => literal(ConstantValue::Char(*unit)),
                    _ => bail!("character literal {c:?} is not a single UTF-16 code unit"),
                }
            }
            ExprSpec::SByte(v) => literal(ConstantValue::SByte(*v)),
            ExprSpec::Byte(v) => literal(ConstantValue::Byte(*v)),
            ExprSpec::Short(v) => literal(ConstantValue::Short(*v)),
            ExprSpec::UShort(v) => literal(ConstantValue::UShort(*v)),
            ExprSpec::Int(v) => literal(ConstantValue::Int(*v)),
            ExprSpec::UInt(v) => literal(ConstantValue::UInt(*v)),
            ExprSpec::Long(v) => literal(ConstantValue::Long(*v)),
            ExprSpec::ULong(v) => literal(ConstantValue::ULong(*v)),
            ExprSpec::Float(v) => literal(ConstantValue::Float(*v)),
            ExprSpec::Double(v) => literal(ConstantValue::Double(*v)),
            ExprSpec::Decimal(text) => match Decimal::parse(text) {
                Some(d) => literal(ConstantValue::Decimal(d)),
                None => bail!("invalid decimal literal {text:?}"),
            },
            ExprSpec::String(s) => literal(ConstantValue::String(s.clone())),
            ExprSpec::Null => literal(ConstantValue::Null),
            ExprSpec::Name(name) => Ok(ConstExpr::name(name.as_str())),
            ExprSpec::Member { target, member } => {
                Ok(ConstExpr::member(target.as_str(), member.as_str()))
            }
            ExprSpec::Unary { op, operand } => {
                let Some(op) = UnaryOp::from_symbol(op) else {
                    bail!("unknown unary operator {op:?}");
                };
                Ok(ConstExpr::unary(op, operand.to_const_expr()?))
            }
            ExprSpec::Binary { op, left, right } => {
                let Some(op) = BinaryOp::from_symbol(op) else {
                    bail!("unknown binary operator {op:?}");
                };
                Ok(ConstExpr::binary(op, left.to_const_expr()?, right.to_const_expr()?))
            }
            ExprSpec::Cast { ty, operand } => {
                let syntax = match PrimitiveType::from_keyword(ty) {
                    Some(p) => TypeSyntax::Primitive(p),
                    None => TypeSyntax::Named(ty.clone()),
                };
                Ok(ConstExpr::cast(syntax, operand.to_const_expr()?))
            }
            ExprSpec::Checked(inner) => Ok(ConstExpr::Checked(Box::new(inner.to_const_expr()?))),
            ExprSpec::Unchecked(inner) => {
                Ok(ConstExpr::Unchecked(Box::new(inner.to_const_expr()?)))
            }
            ExprSpec::ArrayCreation => Ok(ConstExpr::ArrayCreation),
            ExprSpec::NonConstant(text) => Ok(ConstExpr::NonConstant(text.clone())),
        }
    }
}

pub fn parse_modifiers(keywords: &[String]) -> Result<Modifiers> {
    keywords.iter().try_fold(Modifiers::empty(), |acc, keyword| {
        match Modifiers::from_keyword(keyword) {
            Some(m) => Ok(acc | m),
            None => bail!("unknown modifier {keyword:?}"),
        }
    })
}
