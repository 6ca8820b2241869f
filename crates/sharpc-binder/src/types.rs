//! Type universe: declarations from source, referenced assemblies and added modules.
//!
//! Types and members are stored in a [`TypeArena`] and addressed by
//! lightweight ids. Members are a tagged variant ([`MemberKind`]) with a shared
//! capability surface: staticness, accessibility, and the accessor method
//! signatures the member contributes to its type.

use bitflags::bitflags;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use sharpc_common::Location;
use smallvec::SmallVec;
use std::fmt;

/// Name of the indexer when no `IndexerName` attribute overrides it.
pub const DEFAULT_INDEXER_NAME: &str = "Item";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AssemblyId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleId(pub u32);

// =============================================================================
// Type references
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Bool,
    Char,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
    String,
    Object,
}

impl PrimitiveType {
    pub const fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::SByte => "sbyte",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::UShort => "ushort",
            PrimitiveType::Int => "int",
            PrimitiveType::UInt => "uint",
            PrimitiveType::Long => "long",
            PrimitiveType::ULong => "ulong",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::String => "string",
            PrimitiveType::Object => "object",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "bool" => PrimitiveType::Bool,
            "char" => PrimitiveType::Char,
            "sbyte" => PrimitiveType::SByte,
            "byte" => PrimitiveType::Byte,
            "short" => PrimitiveType::Short,
            "ushort" => PrimitiveType::UShort,
            "int" => PrimitiveType::Int,
            "uint" => PrimitiveType::UInt,
            "long" => PrimitiveType::Long,
            "ulong" => PrimitiveType::ULong,
            "float" => PrimitiveType::Float,
            "double" => PrimitiveType::Double,
            "decimal" => PrimitiveType::Decimal,
            "string" => PrimitiveType::String,
            "object" => PrimitiveType::Object,
            _ => return None,
        })
    }

    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::SByte
                | PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::UShort
                | PrimitiveType::Int
                | PrimitiveType::UInt
                | PrimitiveType::Long
                | PrimitiveType::ULong
        )
    }

    pub const fn is_numeric(self) -> bool {
        self.is_integral()
            || matches!(
                self,
                PrimitiveType::Char
                    | PrimitiveType::Float
                    | PrimitiveType::Double
                    | PrimitiveType::Decimal
            )
    }

    /// Types an enum may use as its underlying type.
    pub const fn is_enum_underlying(self) -> bool {
        self.is_integral()
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A resolved reference to a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Void,
    /// Type of the `null` literal.
    Null,
    Primitive(PrimitiveType),
    Named(TypeId),
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub const fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            TypeRef::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub const fn as_named(&self) -> Option<TypeId> {
        match self {
            TypeRef::Named(id) => Some(*id),
            _ => None,
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const INTERNAL = 1 << 2;
        const PRIVATE = 1 << 3;
        const STATIC = 1 << 4;
        const ABSTRACT = 1 << 5;
        const VIRTUAL = 1 << 6;
        const OVERRIDE = 1 << 7;
        const SEALED = 1 << 8;
        const NEW = 1 << 9;
        const READONLY = 1 << 10;
        const EXTERN = 1 << 11;
    }
}

impl Modifiers {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "public" => Modifiers::PUBLIC,
            "protected" => Modifiers::PROTECTED,
            "internal" => Modifiers::INTERNAL,
            "private" => Modifiers::PRIVATE,
            "static" => Modifiers::STATIC,
            "abstract" => Modifiers::ABSTRACT,
            "virtual" => Modifiers::VIRTUAL,
            "override" => Modifiers::OVERRIDE,
            "sealed" => Modifiers::SEALED,
            "new" => Modifiers::NEW,
            "readonly" => Modifiers::READONLY,
            "extern" => Modifiers::EXTERN,
            _ => return None,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeOrigin {
    Source,
    Assembly(AssemblyId),
    Module(ModuleId),
}

#[derive(Clone, Debug)]
pub struct TypeDecl {
    /// Simple name.
    pub name: String,
    /// Dotted namespace; empty for the global namespace.
    pub namespace: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub base: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub members: Vec<MemberId>,
    /// Outer type for nested types.
    pub declaring_type: Option<TypeId>,
    pub origin: TypeOrigin,
    pub location: Location,
    /// Conventional name of the indexer (`IndexerName` attribute).
    pub indexer_name: String,
    pub enum_underlying: Option<PrimitiveType>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, kind: TypeKind) -> Self {
        TypeDecl {
            name: name.into(),
            namespace: namespace.into(),
            kind,
            modifiers: Modifiers::PUBLIC,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            declaring_type: None,
            origin: TypeOrigin::Source,
            location: Location::NULL,
            indexer_name: DEFAULT_INDEXER_NAME.to_string(),
            enum_underlying: if kind == TypeKind::Enum {
                Some(PrimitiveType::Int)
            } else {
                None
            },
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub const fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface)
    }

    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum)
    }

    pub const fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT) || self.is_interface()
    }

    /// Whether the type is exported from the assembly that defines it.
    pub const fn is_public(&self) -> bool {
        self.modifiers.contains(Modifiers::PUBLIC)
    }

    pub const fn is_reference_type(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Class | TypeKind::Interface | TypeKind::Delegate
        )
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterModifier {
    #[default]
    None,
    Ref,
    Out,
    Params,
}

impl ParameterModifier {
    /// The part of the modifier that participates in signature identity.
    pub const fn signature_kind(self) -> ParameterModifier {
        match self {
            ParameterModifier::Params => ParameterModifier::None,
            other => other,
        }
    }

    pub const fn is_by_ref(self) -> bool {
        matches!(self, ParameterModifier::Ref | ParameterModifier::Out)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub modifier: ParameterModifier,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Parameter {
            name: name.into(),
            ty,
            modifier: ParameterModifier::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Method {
        return_type: TypeRef,
        parameters: Vec<Parameter>,
    },
    Property {
        ty: TypeRef,
        getter: bool,
        setter: bool,
    },
    Indexer {
        ty: TypeRef,
        parameters: Vec<Parameter>,
        getter: bool,
        setter: bool,
    },
    Event {
        ty: TypeRef,
    },
    Field {
        ty: TypeRef,
    },
}

#[derive(Clone, Debug)]
pub struct MemberDecl {
    pub name: String,
    pub owner: TypeId,
    pub modifiers: Modifiers,
    pub kind: MemberKind,
    pub location: Location,
    /// Interface named by an explicit implementation (`void IFoo.M()`).
    pub explicit_interface: Option<TypeId>,
}

impl MemberDecl {
    pub const fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub const fn is_public(&self) -> bool {
        self.modifiers.contains(Modifiers::PUBLIC)
    }

    pub const fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }

    pub const fn is_override(&self) -> bool {
        self.modifiers.contains(Modifiers::OVERRIDE)
    }

    pub const fn is_indexer(&self) -> bool {
        matches!(self.kind, MemberKind::Indexer { .. })
    }

    /// Method signatures this member contributes to its type.
    ///
    /// Properties, indexers and events expand to their accessors; fields
    /// contribute nothing. `indexer_name` is the owner's conventional indexer
    /// name.
    pub fn accessors(&self, indexer_name: &str) -> SmallVec<[Accessor; 2]> {
        let mut out = SmallVec::new();
        match &self.kind {
            MemberKind::Method {
                return_type,
                parameters,
            } => out.push(Accessor {
                kind: AccessorKind::Method,
                signature: MethodSignature::new(
                    self.name.clone(),
                    return_type.clone(),
                    parameters,
                ),
            }),
            MemberKind::Property { ty, getter, setter } => {
                if *getter {
                    out.push(Accessor::getter(&self.name, ty, &[]));
                }
                if *setter {
                    out.push(Accessor::setter(&self.name, ty, &[]));
                }
            }
            MemberKind::Indexer {
                ty,
                parameters,
                getter,
                setter,
            } => {
                if *getter {
                    out.push(Accessor::getter(indexer_name, ty, parameters));
                }
                if *setter {
                    out.push(Accessor::setter(indexer_name, ty, parameters));
                }
            }
            MemberKind::Event { ty } => {
                let value = [Parameter::new("value", ty.clone())];
                out.push(Accessor {
                    kind: AccessorKind::Adder,
                    signature: MethodSignature::new(
                        format!("add_{}", self.name),
                        TypeRef::Void,
                        &value,
                    ),
                });
                out.push(Accessor {
                    kind: AccessorKind::Remover,
                    signature: MethodSignature::new(
                        format!("remove_{}", self.name),
                        TypeRef::Void,
                        &value,
                    ),
                });
            }
            MemberKind::Field { .. } => {}
        }
        out
    }
}

// =============================================================================
// Signatures
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Method,
    Getter,
    Setter,
    Adder,
    Remover,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamType {
    pub ty: TypeRef,
    pub modifier: ParameterModifier,
}

/// Name, return type and parameter types of a method or accessor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: String,
    pub return_type: TypeRef,
    pub parameters: Vec<ParamType>,
}

impl MethodSignature {
    pub fn new(name: String, return_type: TypeRef, parameters: &[Parameter]) -> Self {
        MethodSignature {
            name,
            return_type,
            parameters: parameters
                .iter()
                .map(|p| ParamType {
                    ty: p.ty.clone(),
                    modifier: p.modifier.signature_kind(),
                })
                .collect(),
        }
    }

    /// Exact nominal parameter equality, including by-ref-ness.
    pub fn same_parameters(&self, other: &[ParamType]) -> bool {
        self.parameters == other
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub signature: MethodSignature,
}

impl Accessor {
    fn getter(name: &str, ty: &TypeRef, index: &[Parameter]) -> Self {
        Accessor {
            kind: AccessorKind::Getter,
            signature: MethodSignature::new(format!("get_{name}"), ty.clone(), index),
        }
    }

    fn setter(name: &str, ty: &TypeRef, index: &[Parameter]) -> Self {
        let mut parameters = index.to_vec();
        parameters.push(Parameter::new("value", ty.clone()));
        Accessor {
            kind: AccessorKind::Setter,
            signature: MethodSignature::new(format!("set_{name}"), TypeRef::Void, &parameters),
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Debug, Default)]
pub struct TypeArena {
    types: Vec<TypeDecl>,
    members: Vec<MemberDecl>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, decl: TypeDecl) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(decl);
        id
    }

    pub fn add_member(&mut self, member: MemberDecl) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        let owner = member.owner;
        self.members.push(member);
        self.types[owner.0 as usize].members.push(id);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeDecl> {
        self.types.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeDecl> {
        self.types.get_mut(id.0 as usize)
    }

    pub fn member(&self, id: MemberId) -> &MemberDecl {
        &self.members[id.0 as usize]
    }

    pub fn members_of(&self, id: TypeId) -> impl Iterator<Item = (MemberId, &MemberDecl)> + '_ {
        self[id]
            .members
            .iter()
            .map(move |&member| (member, self.member(member)))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> {
        (0..self.types.len() as u32).map(TypeId)
    }

    /// Fully qualified name (`N.Outer.Inner`).
    pub fn full_name(&self, id: TypeId) -> String {
        let decl = &self[id];
        if let Some(outer) = decl.declaring_type {
            return format!("{}.{}", self.full_name(outer), decl.name);
        }
        if decl.namespace.is_empty() {
            decl.name.clone()
        } else {
            format!("{}.{}", decl.namespace, decl.name)
        }
    }

    pub fn type_ref_name(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Void => "void".to_string(),
            TypeRef::Null => "null".to_string(),
            TypeRef::Primitive(p) => p.keyword().to_string(),
            TypeRef::Named(id) => self.full_name(*id),
            TypeRef::Array(element) => format!("{}[]", self.type_ref_name(element)),
        }
    }

    /// `Owner.Name(int, ref string)`-style signature for diagnostics.
    pub fn signature_display(&self, owner: TypeId, signature: &MethodSignature) -> String {
        let params: Vec<String> = signature
            .parameters
            .iter()
            .map(|p| {
                let ty = self.type_ref_name(&p.ty);
                match p.modifier {
                    ParameterModifier::Ref => format!("ref {ty}"),
                    ParameterModifier::Out => format!("out {ty}"),
                    _ => ty,
                }
            })
            .collect();
        format!(
            "{}.{}({})",
            self.full_name(owner),
            signature.name,
            params.join(", ")
        )
    }

    pub fn member_display(&self, id: MemberId) -> String {
        let member = self.member(id);
        format!("{}.{}", self.full_name(member.owner), member.name)
    }

    pub fn nested_type(&self, outer: TypeId, name: &str) -> Option<TypeId> {
        self.ids().find(|&id| {
            let decl = &self[id];
            decl.declaring_type == Some(outer) && decl.name == name
        })
    }

    /// Base classes from the nearest upward. Stops on inheritance cycles.
    pub fn base_chain(&self, id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut current = self[id].base;
        while let Some(base) = current {
            if !seen.insert(base) {
                break;
            }
            chain.push(base);
            current = self[base].base;
        }
        chain
    }

    /// Declared interfaces and, transitively, the interfaces they extend.
    pub fn interface_closure(&self, id: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack: Vec<TypeId> = self[id].interfaces.iter().rev().copied().collect();
        while let Some(iface) = stack.pop() {
            if !seen.insert(iface) {
                continue;
            }
            out.push(iface);
            stack.extend(self[iface].interfaces.iter().rev().copied());
        }
        out
    }

    /// Whether `id` or any of its base classes implements `iface`.
    pub fn implements_interface(&self, id: TypeId, iface: TypeId) -> bool {
        std::iter::once(id)
            .chain(self.base_chain(id))
            .any(|ty| self.interface_closure(ty).contains(&iface))
    }

    pub fn clear(&mut self) {
        self.types.clear();
        self.members.clear();
    }
}

impl std::ops::Index<TypeId> for TypeArena {
    type Output = TypeDecl;

    fn index(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.0 as usize]
    }
}
