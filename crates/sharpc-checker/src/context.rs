//! Compilation session.
//!
//! [`Compilation`] owns every table a run touches: options, the diagnostic
//! report, the source location table, the binder (types, namespaces, scopes)
//! and the constant table, plus the proxies synthesized per type. Nothing is
//! process-global; independent runs use independent sessions or call
//! [`Compilation::reset`], which resets all tables together.

use crate::constant::{ConstantId, ConstantResolver, ConstantTable};
use crate::pending::{ImplementationReport, check_type_implementations};
use crate::proxy::ProxyMember;
use crate::value::ConstantValue;
use rustc_hash::FxHashMap;
use sharpc_binder::{BinderState, TypeId, TypeKind, TypeOrigin};
use sharpc_common::{CompilerOptions, InternalError, LocationTable, Report};
use tracing::debug;

pub struct Compilation {
    pub options: CompilerOptions,
    pub report: Report,
    pub locations: LocationTable,
    pub binder: BinderState,
    pub constants: ConstantTable,
    proxies: FxHashMap<TypeId, Vec<ProxyMember>>,
}

impl Compilation {
    pub fn new(options: CompilerOptions) -> Self {
        let report = Report::new(options.report_options());
        Compilation {
            options,
            report,
            locations: LocationTable::new(),
            binder: BinderState::new(),
            constants: ConstantTable::new(),
            proxies: FxHashMap::default(),
        }
    }

    fn resolver(&mut self) -> ConstantResolver<'_> {
        ConstantResolver::new(
            &mut self.binder,
            &mut self.constants,
            &mut self.report,
            self.options.checked,
        )
    }

    pub fn resolve_constant(&mut self, id: ConstantId) -> Result<Option<ConstantValue>, InternalError> {
        self.resolver().resolve(id)
    }

    pub fn resolve_all_constants(&mut self) -> Result<(), InternalError> {
        self.resolver().resolve_all()
    }

    /// Final pass over every recorded using and alias directive.
    pub fn verify_directives(&mut self) -> Result<(), InternalError> {
        self.binder.verify_directives(&mut self.report)
    }

    /// Check one type's interface and abstract obligations, recording any
    /// synthesized proxies for the type.
    pub fn check_implementations(&mut self, ty: TypeId) -> Result<ImplementationReport, InternalError> {
        let outcome = check_type_implementations(&self.binder.types, ty, &mut self.report)?;
        if !outcome.proxies.is_empty() {
            self.proxies
                .entry(ty)
                .or_default()
                .extend(outcome.proxies.iter().cloned());
        }
        Ok(outcome)
    }

    /// Check every source class and struct, stopping once the report halts.
    pub fn check_all_implementations(&mut self) -> Result<Vec<ImplementationReport>, InternalError> {
        let candidates: Vec<TypeId> = self
            .binder
            .types
            .ids()
            .filter(|&id| {
                let decl = &self.binder.types[id];
                matches!(decl.origin, TypeOrigin::Source)
                    && matches!(decl.kind, TypeKind::Class | TypeKind::Struct)
            })
            .collect();
        let mut outcomes = Vec::with_capacity(candidates.len());
        for ty in candidates {
            if self.report.is_halted() {
                debug!("implementation checks halted");
                break;
            }
            outcomes.push(self.check_implementations(ty)?);
        }
        Ok(outcomes)
    }

    pub fn proxies(&self, ty: TypeId) -> &[ProxyMember] {
        self.proxies.get(&ty).map_or(&[], Vec::as_slice)
    }

    /// Every synthesized proxy, ordered by implementing type.
    pub fn all_proxies(&self) -> Vec<&ProxyMember> {
        let mut types: Vec<&TypeId> = self.proxies.keys().collect();
        types.sort();
        types
            .into_iter()
            .flat_map(|ty| self.proxies[ty].iter())
            .collect()
    }

    pub fn render_diagnostics(&self) -> Vec<String> {
        self.report.render_all(&self.locations)
    }

    /// `Compilation failed: 2 error(s), 0 warnings` or
    /// `Compilation succeeded - 1 warning(s)`.
    pub fn summary(&self) -> String {
        let errors = self.report.error_count();
        let warnings = self.report.warning_count();
        if errors > 0 {
            format!("Compilation failed: {errors} error(s), {warnings} warnings")
        } else {
            format!("Compilation succeeded - {warnings} warning(s)")
        }
    }

    pub fn reset(&mut self) {
        self.report.reset();
        self.locations.reset();
        self.binder.reset();
        self.constants.clear();
        self.proxies.clear();
    }
}

#[cfg(test)]
#[path = "../tests/context_tests.rs"]
mod tests;
