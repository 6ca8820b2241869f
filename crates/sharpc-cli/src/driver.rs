//! Compilation driver: manifest in, rendered diagnostics out.
//!
//! Passes run in the order a compiler front end would feed the semantic
//! layer:
//! 1. register source files and initialize the location table
//! 2. add referenced assemblies and modules
//! 3. declare directives, namespaces and types, file by file
//! 4. resolve base types, interfaces, member signatures and constants'
//!    declared types
//! 5. resolve every constant
//! 6. verify every using and alias directive
//! 7. check interface and abstract-member implementation of each class and
//!    struct
//!
//! Later passes are skipped once the report halts.

use crate::args::CliArgs;
use crate::manifest::{BlockSpec, Manifest, MemberSpec, ParameterSpec, TypeSpec, parse_modifiers};
use anyhow::Result;
use serde::Serialize;
use sharpc_binder::{
    MemberDecl, MemberKind, Modifiers, Parameter, PrimitiveType, ScopeId, TypeDecl, TypeId,
    TypeKind, TypeRef,
};
use sharpc_checker::{Compilation, ConstantValue, EmittedConstant, ImplementationReport};
use sharpc_common::{CompilerOptions, Location};
use tracing::{debug, info_span};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERRORS: i32 = 1;
/// Unreadable manifest or internal compiler error.
pub const EXIT_FAILURE: i32 = 2;

#[derive(Debug)]
pub struct DriverOutcome {
    /// `file(line) error CS0000: message` lines in report order.
    pub diagnostics: Vec<String>,
    pub summary: String,
    pub errors: usize,
    pub warnings: usize,
    pub dump: Dump,
}

impl DriverOutcome {
    pub const fn exit_code(&self) -> i32 {
        if self.errors > 0 { EXIT_ERRORS } else { EXIT_SUCCESS }
    }
}

/// What the emission layer consumes: constant values, per-type
/// implementation outcomes and proxies.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dump {
    pub constants: Vec<ConstantDump>,
    pub implementations: Vec<ImplementationDump>,
    pub proxies: Vec<ProxyDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstantDump {
    pub name: String,
    pub value: Option<ConstantValue>,
    pub emitted: Option<EmittedConstant>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationDump {
    #[serde(rename = "type")]
    pub ty: String,
    pub passed: bool,
    pub errors: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyDump {
    #[serde(rename = "type")]
    pub ty: String,
    pub name: String,
    pub forwards_to: String,
    pub parameters: usize,
}

/// Load the manifest named on the command line and compile it.
pub fn run(args: &CliArgs) -> Result<DriverOutcome> {
    let manifest = Manifest::load(&args.manifest)?;
    let mut options = manifest.options.clone();
    args.apply(&mut options);
    compile(&manifest, options)
}

pub fn compile(manifest: &Manifest, options: CompilerOptions) -> Result<DriverOutcome> {
    let mut driver = Driver {
        c: Compilation::new(options),
        declared: Vec::new(),
        files: Vec::new(),
    };
    driver.register_files(manifest);
    driver.add_imports(manifest)?;
    let files = driver.files.clone();
    for (spec, file) in manifest.files.iter().zip(files) {
        let _span = info_span!("declare", file = %spec.name).entered();
        let scope = driver.c.binder.file_scope(file);
        driver.declare_block(scope, &spec.body, file)?;
    }
    driver.resolve_declarations()?;

    let mut implementations = Vec::new();
    if !driver.c.report.is_halted() {
        driver.c.resolve_all_constants()?;
    }
    if !driver.c.report.is_halted() {
        driver.c.verify_directives()?;
    }
    if !driver.c.report.is_halted() {
        implementations = driver.c.check_all_implementations()?;
    }
    Ok(driver.finish(&implementations))
}

struct DeclaredType<'m> {
    id: TypeId,
    spec: &'m TypeSpec,
    /// Source file index; `None` for assembly and module types.
    file: Option<u32>,
}

struct Driver<'m> {
    c: Compilation,
    declared: Vec<DeclaredType<'m>>,
    /// Location-table index per manifest file.
    files: Vec<u32>,
}

impl<'m> Driver<'m> {
    fn register_files(&mut self, manifest: &Manifest) {
        for file in &manifest.files {
            let index = self.c.locations.add_file(&file.name, &mut self.c.report);
            self.files.push(index);
        }
        self.c.locations.initialize();
    }

    fn location(&self, file: Option<u32>, line: u32) -> Result<Location> {
        match file {
            Some(file) if line > 0 => Ok(self.c.locations.location(file, line)?),
            _ => Ok(Location::NULL),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn add_imports(&mut self, manifest: &'m Manifest) -> Result<()> {
        for assembly in &manifest.references {
            let ids = self.alloc_imported(&assembly.types)?;
            self.c
                .binder
                .add_assembly_reference(&assembly.name, assembly.alias.as_deref(), ids.clone());
            self.alloc_imported_nested(&assembly.types, &ids)?;
        }
        for module in &manifest.modules {
            let ids = self.alloc_imported(&module.types)?;
            self.c.binder.add_module(&module.name, ids.clone());
            self.alloc_imported_nested(&module.types, &ids)?;
        }
        Ok(())
    }

    fn alloc_imported(&mut self, specs: &'m [TypeSpec]) -> Result<Vec<TypeId>> {
        let mut ids = Vec::with_capacity(specs.len());
        for spec in specs {
            let id = self.c.binder.types.alloc(type_decl(spec, &spec.namespace)?);
            self.declared.push(DeclaredType {
                id,
                spec,
                file: None,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    /// Nested imported types take their outer type's origin.
    fn alloc_imported_nested(&mut self, specs: &'m [TypeSpec], outers: &[TypeId]) -> Result<()> {
        for (spec, &outer) in specs.iter().zip(outers) {
            let mut inner_ids = Vec::new();
            for nested in &spec.nested {
                let mut decl = type_decl(nested, &spec.namespace)?;
                decl.declaring_type = Some(outer);
                decl.origin = self.c.binder.types[outer].origin;
                let id = self.c.binder.types.alloc(decl);
                self.declared.push(DeclaredType {
                    id,
                    spec: nested,
                    file: None,
                });
                inner_ids.push(id);
            }
            self.alloc_imported_nested(&spec.nested, &inner_ids)?;
        }
        Ok(())
    }

    fn declare_block(&mut self, scope: ScopeId, block: &'m BlockSpec, file: u32) -> Result<()> {
        for directive in &block.extern_aliases {
            let loc = self.location(Some(file), directive.line)?;
            self.c
                .binder
                .add_extern_alias(scope, &directive.name, loc, &mut self.c.report);
        }
        for directive in &block.usings {
            let loc = self.location(Some(file), directive.line)?;
            self.c
                .binder
                .add_using(scope, &directive.name, loc, &mut self.c.report);
        }
        for alias in &block.aliases {
            let loc = self.location(Some(file), alias.line)?;
            self.c
                .binder
                .add_alias(scope, &alias.name, &alias.target, loc, &mut self.c.report);
        }
        for namespace in &block.namespaces {
            let inner = self.c.binder.open_namespace(scope, &namespace.name);
            self.declare_block(inner, &namespace.body, file)?;
        }
        for spec in &block.types {
            let loc = self.location(Some(file), spec.line)?;
            let decl = type_decl(spec, "")?.with_location(loc);
            let id = self
                .c
                .binder
                .declare_source_type(scope, decl, &mut self.c.report);
            self.declared.push(DeclaredType {
                id,
                spec,
                file: Some(file),
            });
            self.declare_nested(id, spec, file)?;
        }
        Ok(())
    }

    fn declare_nested(&mut self, outer: TypeId, spec: &'m TypeSpec, file: u32) -> Result<()> {
        for nested in &spec.nested {
            let loc = self.location(Some(file), nested.line)?;
            let decl = type_decl(nested, "")?.with_location(loc);
            let id = self.c.binder.declare_nested_type(outer, decl);
            self.declared.push(DeclaredType {
                id,
                spec: nested,
                file: Some(file),
            });
            self.declare_nested(id, nested, file)?;
        }
        Ok(())
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    fn resolve_declarations(&mut self) -> Result<()> {
        let declared: Vec<(TypeId, &'m TypeSpec, Option<u32>)> = self
            .declared
            .iter()
            .map(|d| (d.id, d.spec, d.file))
            .collect();
        for (id, spec, file) in declared {
            let _span = info_span!("signatures", ty = %spec.name).entered();
            let loc = self.location(file, spec.line)?;

            let base = match &spec.base {
                Some(name) => self.resolve_named(id, name, loc)?,
                None => None,
            };
            let mut interfaces = Vec::with_capacity(spec.interfaces.len());
            for name in &spec.interfaces {
                interfaces.extend(self.resolve_named(id, name, loc)?);
            }
            if let Some(decl) = self.c.binder.types.get_mut(id) {
                decl.base = base;
                decl.interfaces = interfaces;
            }

            let in_interface = spec.kind == TypeKind::Interface;
            for member in &spec.members {
                self.declare_member(id, member, in_interface, file)?;
            }
            for constant in &spec.constants {
                let loc = self.location(file, constant.line)?;
                let Some(ty) = self.resolve_type_ref(id, &constant.ty, loc)? else {
                    continue;
                };
                let init = constant.value.to_const_expr()?;
                self.c.constants.declare(id, &constant.name, ty, init, loc);
            }
            for member in &spec.enum_members {
                let loc = self.location(file, member.line)?;
                let init = member.value.as_ref().map(|v| v.to_const_expr()).transpose()?;
                self.c
                    .constants
                    .declare_enum_member(id, &member.name, init, loc);
            }
        }
        Ok(())
    }

    fn declare_member(
        &mut self,
        owner: TypeId,
        spec: &MemberSpec,
        in_interface: bool,
        file: Option<u32>,
    ) -> Result<()> {
        let common = spec.common();
        let loc = self.location(file, common.line)?;
        let mut modifiers = parse_modifiers(&common.modifiers)?;
        if in_interface {
            modifiers |= Modifiers::PUBLIC | Modifiers::ABSTRACT;
        }
        let explicit_interface = match &common.explicit_interface {
            Some(name) => match self.resolve_named(owner, name, loc)? {
                Some(iface) => Some(iface),
                None => return Ok(()),
            },
            None => None,
        };

        let kind = match spec {
            MemberSpec::Method {
                return_type,
                parameters,
                ..
            } => {
                let Some(return_type) = self.resolve_type_ref(owner, return_type, loc)? else {
                    return Ok(());
                };
                let Some(parameters) = self.resolve_parameters(owner, parameters, loc)? else {
                    return Ok(());
                };
                MemberKind::Method {
                    return_type,
                    parameters,
                }
            }
            MemberSpec::Property { ty, get, set, .. } => {
                let Some(ty) = self.resolve_type_ref(owner, ty, loc)? else {
                    return Ok(());
                };
                MemberKind::Property {
                    ty,
                    getter: *get,
                    setter: *set,
                }
            }
            MemberSpec::Indexer {
                ty,
                parameters,
                get,
                set,
                ..
            } => {
                let Some(ty) = self.resolve_type_ref(owner, ty, loc)? else {
                    return Ok(());
                };
                let Some(parameters) = self.resolve_parameters(owner, parameters, loc)? else {
                    return Ok(());
                };
                MemberKind::Indexer {
                    ty,
                    parameters,
                    getter: *get,
                    setter: *set,
                }
            }
            MemberSpec::Event { ty, .. } => {
                let Some(ty) = self.resolve_type_ref(owner, ty, loc)? else {
                    return Ok(());
                };
                MemberKind::Event { ty }
            }
            MemberSpec::Field { ty, .. } => {
                let Some(ty) = self.resolve_type_ref(owner, ty, loc)? else {
                    return Ok(());
                };
                MemberKind::Field { ty }
            }
        };
        self.c.binder.add_member(MemberDecl {
            name: spec.name().to_string(),
            owner,
            modifiers,
            kind,
            location: loc,
            explicit_interface,
        });
        Ok(())
    }

    fn resolve_parameters(
        &mut self,
        owner: TypeId,
        specs: &[ParameterSpec],
        loc: Location,
    ) -> Result<Option<Vec<Parameter>>> {
        let mut parameters = Vec::with_capacity(specs.len());
        for spec in specs {
            let Some(ty) = self.resolve_type_ref(owner, &spec.ty, loc)? else {
                return Ok(None);
            };
            let mut parameter = Parameter::new(spec.name.as_str(), ty);
            parameter.modifier = spec.modifier;
            parameters.push(parameter);
        }
        Ok(Some(parameters))
    }

    /// Resolve a type written in a declaration of `owner`: keywords, arrays,
    /// the owner's enclosing and nested types, then its declaration scope.
    /// Imported types have no scope and are matched by full name.
    fn resolve_type_ref(&mut self, owner: TypeId, name: &str, loc: Location) -> Result<Option<TypeRef>> {
        let name = name.trim();
        if let Some(element) = name.strip_suffix("[]") {
            let element = self.resolve_type_ref(owner, element, loc)?;
            return Ok(element.map(|e| TypeRef::Array(Box::new(e))));
        }
        if name == "void" {
            return Ok(Some(TypeRef::Void));
        }
        if let Some(primitive) = PrimitiveType::from_keyword(name) {
            return Ok(Some(TypeRef::Primitive(primitive)));
        }
        Ok(self.resolve_named(owner, name, loc)?.map(TypeRef::Named))
    }

    fn resolve_named(&mut self, owner: TypeId, name: &str, loc: Location) -> Result<Option<TypeId>> {
        if let Some(found) = self.enclosing_or_nested(owner, name) {
            return Ok(Some(found));
        }

        match self.c.binder.type_scopes.get(&owner).copied() {
            Some(scope) => Ok(self
                .c
                .binder
                .resolve_type_name(scope, name, loc, &mut self.c.report)?),
            None => {
                let types = &self.c.binder.types;
                let found = types.ids().find(|&id| types.full_name(id) == name);
                if found.is_none() {
                    debug!(name, "imported type reference not found");
                }
                Ok(found)
            }
        }
    }

    fn enclosing_or_nested(&self, owner: TypeId, name: &str) -> Option<TypeId> {
        let types = &self.c.binder.types;
        let mut current = Some(owner);
        while let Some(ty) = current {
            if types[ty].name == name {
                return Some(ty);
            }
            if let Some(nested) = types.nested_type(ty, name) {
                return Some(nested);
            }
            current = types[ty].declaring_type;
        }
        None
    }

    // =========================================================================
    // Output
    // =========================================================================

    fn finish(self, implementations: &[ImplementationReport]) -> DriverOutcome {
        let c = &self.c;
        let types = &c.binder.types;
        let constants = c
            .constants
            .ids()
            .map(|id| ConstantDump {
                name: c.constants.display_name(types, id),
                value: c.constants.value(id).cloned(),
                emitted: c.constants.emitted(id),
            })
            .collect();
        let implementations = implementations
            .iter()
            .map(|outcome| ImplementationDump {
                ty: types.full_name(outcome.ty),
                passed: outcome.passed,
                errors: outcome.errors,
            })
            .collect();
        let proxies = c
            .all_proxies()
            .into_iter()
            .map(|proxy| ProxyDump {
                ty: types.full_name(proxy.implementing_type),
                name: proxy.name.clone(),
                forwards_to: proxy.describe(types),
                parameters: proxy.forwarded().len(),
            })
            .collect();

        DriverOutcome {
            diagnostics: c.render_diagnostics(),
            summary: c.summary(),
            errors: c.report.error_count(),
            warnings: c.report.warning_count(),
            dump: Dump {
                constants,
                implementations,
                proxies,
            },
        }
    }
}

fn type_decl(spec: &TypeSpec, namespace: &str) -> Result<TypeDecl> {
    let mut decl = TypeDecl::new(spec.name.as_str(), namespace, spec.kind)
        .with_modifiers(parse_modifiers(&spec.modifiers)?);
    if let Some(name) = &spec.indexer_name {
        decl.indexer_name = name.clone();
    }
    if spec.kind == TypeKind::Enum && spec.underlying.is_some() {
        decl.enum_underlying = spec.underlying;
    }
    Ok(decl)
}
