//! Binder for the sharpc C# semantic layer.
//!
//! Registers source declarations, referenced assemblies and added modules,
//! and resolves type and namespace names through scopes, aliases and using
//! directives.

// Type universe: declarations, members and accessor signatures
pub mod types;
pub use types::{
    Accessor, AccessorKind, AssemblyId, DEFAULT_INDEXER_NAME, MemberDecl, MemberId, MemberKind,
    MethodSignature, Modifiers, ModuleId, ParamType, Parameter, ParameterModifier, PrimitiveType,
    TypeArena, TypeDecl, TypeId, TypeKind, TypeOrigin, TypeRef,
};

// Three-state lazy resolution cell
pub mod lazy;
pub use lazy::{Begin, LazyCell, LazyState};

// Namespace tree with global and extern-alias roots
pub mod namespace;
pub use namespace::{NameTarget, NamespaceId, NamespaceNode, NamespaceTree, RootId, RootKind};

// Scopes and the directives they record
pub mod scope;
pub use scope::{
    AliasDirective, AliasTarget, Scope, ScopeArena, ScopeId, ScopeKind, ScopeState,
    UsingDirective,
};

// Binder state and name resolution
pub mod state;
pub use state::{AddedModule, BinderState, ReferencedAssembly};
mod state_resolution;
pub use state_resolution::Resolution;
