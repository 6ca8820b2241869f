//! Declared constants and their demand-driven resolution.
//!
//! Every constant owns a [`LazyCell`]. Resolving a constant evaluates its
//! initializer in the declaring type's context, following references to other
//! constants recursively; a reference back to a constant that is still being
//! evaluated is a circular definition (CS0110), reported once at the point the
//! cycle closes. The folded value is then converted to the declared type with
//! the standard implicit constant conversions.

use crate::convert::{ConversionError, explicit_constant_conversion, implicit_constant_conversion};
use crate::expr::{BinaryOp, ConstExpr, TypeSyntax};
use crate::fold::{self, FoldError};
use crate::value::{ConstantValue, EmittedConstant};
use rustc_hash::FxHashMap;
use sharpc_binder::{Begin, BinderState, LazyCell, PrimitiveType, TypeArena, TypeId, TypeKind, TypeRef};
use sharpc_common::{
    InternalError, Location, Report, diagnostic_codes, diagnostic_messages, format_message,
};
use tracing::{debug, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstantId(pub u32);

#[derive(Clone, Debug)]
pub struct ConstantDecl {
    pub name: String,
    pub owner: TypeId,
    pub ty: TypeRef,
    /// `None` for an enum member without an explicit value.
    pub initializer: Option<ConstExpr>,
    pub location: Location,
    /// Preceding member of the same enum.
    previous: Option<ConstantId>,
    cell: LazyCell<ConstantValue>,
}

impl ConstantDecl {
    pub fn value(&self) -> Option<&ConstantValue> {
        self.cell.get()
    }
}

#[derive(Debug, Default)]
pub struct ConstantTable {
    constants: Vec<ConstantDecl>,
    by_name: FxHashMap<(TypeId, String), ConstantId>,
    last_enum_member: FxHashMap<TypeId, ConstantId>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, decl: ConstantDecl) -> ConstantId {
        let id = ConstantId(self.constants.len() as u32);
        self.by_name
            .entry((decl.owner, decl.name.clone()))
            .or_insert(id);
        self.constants.push(decl);
        id
    }

    /// Declare `const ty name = initializer;` in `owner`.
    pub fn declare(
        &mut self,
        owner: TypeId,
        name: &str,
        ty: TypeRef,
        initializer: ConstExpr,
        location: Location,
    ) -> ConstantId {
        self.push(ConstantDecl {
            name: name.to_string(),
            owner,
            ty,
            initializer: Some(initializer),
            location,
            previous: None,
            cell: LazyCell::new(),
        })
    }

    /// Declare the next member of enum `owner`. Without an initializer the
    /// member takes the previous member's value plus one, or zero.
    pub fn declare_enum_member(
        &mut self,
        owner: TypeId,
        name: &str,
        initializer: Option<ConstExpr>,
        location: Location,
    ) -> ConstantId {
        let previous = self.last_enum_member.get(&owner).copied();
        let id = self.push(ConstantDecl {
            name: name.to_string(),
            owner,
            ty: TypeRef::Named(owner),
            initializer,
            location,
            previous,
            cell: LazyCell::new(),
        });
        self.last_enum_member.insert(owner, id);
        id
    }

    pub fn get(&self, id: ConstantId) -> Option<&ConstantDecl> {
        self.constants.get(id.0 as usize)
    }

    fn decl(&self, id: ConstantId) -> Result<&ConstantDecl, InternalError> {
        self.get(id)
            .ok_or_else(|| InternalError::unknown("constant", id.0))
    }

    fn decl_mut(&mut self, id: ConstantId) -> Result<&mut ConstantDecl, InternalError> {
        self.constants
            .get_mut(id.0 as usize)
            .ok_or_else(|| InternalError::unknown("constant", id.0))
    }

    pub fn find(&self, owner: TypeId, name: &str) -> Option<ConstantId> {
        self.by_name.get(&(owner, name.to_string())).copied()
    }

    /// Find `name` in `ty` or one of its base classes.
    pub fn find_inherited(&self, types: &TypeArena, ty: TypeId, name: &str) -> Option<ConstantId> {
        std::iter::once(ty)
            .chain(types.base_chain(ty))
            .find_map(|t| self.find(t, name))
    }

    pub fn ids(&self) -> impl Iterator<Item = ConstantId> {
        (0..self.constants.len() as u32).map(ConstantId)
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn value(&self, id: ConstantId) -> Option<&ConstantValue> {
        self.get(id).and_then(ConstantDecl::value)
    }

    pub fn emitted(&self, id: ConstantId) -> Option<EmittedConstant> {
        self.value(id).map(ConstantValue::emitted)
    }

    /// `Owner.Name`, as used in diagnostics.
    pub fn display_name(&self, types: &TypeArena, id: ConstantId) -> String {
        match self.get(id) {
            Some(decl) => format!("{}.{}", types.full_name(decl.owner), decl.name),
            None => format!("<constant {}>", id.0),
        }
    }

    /// Forget every resolved value; declarations stay.
    pub fn reset_values(&mut self) {
        for decl in &mut self.constants {
            decl.cell.reset();
        }
    }

    pub fn clear(&mut self) {
        self.constants.clear();
        self.by_name.clear();
        self.last_enum_member.clear();
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Per-initializer evaluation context.
#[derive(Copy, Clone, Debug)]
struct EvalContext {
    constant: ConstantId,
    owner: TypeId,
    location: Location,
    /// The constant is a member of the enum `owner`.
    in_enum: bool,
}

type EvalResult = Result<Option<ConstantValue>, InternalError>;

pub struct ConstantResolver<'a> {
    binder: &'a mut BinderState,
    constants: &'a mut ConstantTable,
    report: &'a mut Report,
    /// Overflow checking outside of `checked`/`unchecked`.
    default_checked: bool,
    checked: bool,
}

impl<'a> ConstantResolver<'a> {
    pub fn new(
        binder: &'a mut BinderState,
        constants: &'a mut ConstantTable,
        report: &'a mut Report,
        checked: bool,
    ) -> Self {
        ConstantResolver {
            binder,
            constants,
            report,
            default_checked: checked,
            checked,
        }
    }

    /// Resolve every declared constant, stopping early once the report halts.
    pub fn resolve_all(&mut self) -> Result<(), InternalError> {
        let ids: Vec<ConstantId> = self.constants.ids().collect();
        for id in ids {
            if self.report.is_halted() {
                debug!("constant resolution halted");
                break;
            }
            self.resolve(id)?;
        }
        Ok(())
    }

    /// Value of a constant, or `None` if it failed. Resolution happens once;
    /// later calls return the cached outcome without reporting again.
    pub fn resolve(&mut self, id: ConstantId) -> EvalResult {
        match self.constants.decl_mut(id)?.cell.begin() {
            Begin::Ready(value) => return Ok(value),
            Begin::Cycle => {
                self.report_circular(id);
                return Ok(None);
            }
            Begin::Started => {}
        }
        trace!(constant = %self.constants.display_name(&self.binder.types, id), "resolving constant");

        let saved = self.checked;
        self.checked = self.default_checked;
        let outcome = self.evaluate_declaration(id);
        self.checked = saved;

        let value = match outcome {
            Ok(value) => value,
            Err(err) => {
                self.constants.decl_mut(id)?.cell.finish(None);
                return Err(err);
            }
        };
        self.constants.decl_mut(id)?.cell.finish(value.clone());
        Ok(value)
    }

    fn evaluate_declaration(&mut self, id: ConstantId) -> EvalResult {
        let decl = self.constants.decl(id)?;
        let (owner, ty, initializer, location, previous) = (
            decl.owner,
            decl.ty.clone(),
            decl.initializer.clone(),
            decl.location,
            decl.previous,
        );
        let owner_decl = self
            .binder
            .types
            .get(owner)
            .ok_or_else(|| InternalError::unknown("type", owner.0))?;
        let in_enum = owner_decl.is_enum() && ty == TypeRef::Named(owner);
        let underlying = owner_decl.enum_underlying.unwrap_or(PrimitiveType::Int);

        if !self.const_type_allowed(&ty) {
            let name = self.binder.types.type_ref_name(&ty);
            self.report.error(
                diagnostic_codes::TYPE_CANNOT_BE_CONST,
                location,
                format_message(diagnostic_messages::TYPE_CANNOT_BE_CONST, &[&name]),
            );
            return Ok(None);
        }

        let ctx = EvalContext {
            constant: id,
            owner,
            location,
            in_enum,
        };
        let value = match &initializer {
            Some(expr) => self.eval(expr, &ctx)?,
            None => self.next_enum_value(previous, &ctx)?,
        };
        let Some(value) = value else {
            return Ok(None);
        };

        if in_enum {
            let converted = self.convert_to_declared(&value, &TypeRef::Primitive(underlying), &ctx)?;
            return Ok(converted.map(|value| ConstantValue::Enum {
                ty: owner,
                value: Box::new(value),
            }));
        }
        self.convert_to_declared(&value, &ty, &ctx)
    }

    /// Structs (other than the built-in primitives) cannot be constants.
    fn const_type_allowed(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Primitive(_) | TypeRef::Array(_) => true,
            TypeRef::Named(id) => self
                .binder
                .types
                .get(*id)
                .is_some_and(|decl| decl.kind != TypeKind::Struct),
            TypeRef::Void | TypeRef::Null => false,
        }
    }

    /// Implicit value of an enum member: previous member plus one, or zero.
    fn next_enum_value(&mut self, previous: Option<ConstantId>, ctx: &EvalContext) -> EvalResult {
        let Some(previous) = previous else {
            return Ok(Some(ConstantValue::Int(0)));
        };
        let Some(prev) = self.resolve(previous)? else {
            return Ok(None);
        };
        let prev = prev.underlying().clone();
        match fold::binary(BinaryOp::Add, &prev, &ConstantValue::Int(1), true) {
            Ok(value) => Ok(Some(value)),
            Err(err) => self.fold_failed(err, ctx, "+", &[&prev, &ConstantValue::Int(1)]),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn eval(&mut self, expr: &ConstExpr, ctx: &EvalContext) -> EvalResult {
        match expr {
            ConstExpr::Literal(value) => Ok(Some(value.clone())),
            ConstExpr::Name(name) => self.eval_name(name, ctx),
            ConstExpr::MemberAccess { target, member } => {
                self.eval_member_access(target, member, ctx)
            }
            ConstExpr::Unary { op, operand } => {
                let Some(value) = self.eval(operand, ctx)? else {
                    return Ok(None);
                };
                match fold::unary(*op, &value, self.checked) {
                    Ok(folded) => Ok(Some(folded)),
                    Err(err) => self.fold_failed(err, ctx, op.symbol(), &[&value]),
                }
            }
            ConstExpr::Binary { op, left, right } => {
                let Some(left) = self.eval(left, ctx)? else {
                    return Ok(None);
                };
                let Some(right) = self.eval(right, ctx)? else {
                    return Ok(None);
                };
                match fold::binary(*op, &left, &right, self.checked) {
                    Ok(folded) => Ok(Some(folded)),
                    Err(err) => self.fold_failed(err, ctx, op.symbol(), &[&left, &right]),
                }
            }
            ConstExpr::Cast { ty, operand } => self.eval_cast(ty, operand, ctx),
            ConstExpr::Checked(inner) => self.eval_in_context(inner, ctx, true),
            ConstExpr::Unchecked(inner) => self.eval_in_context(inner, ctx, false),
            ConstExpr::ArrayCreation | ConstExpr::NonConstant(_) => {
                self.report_not_constant(ctx);
                Ok(None)
            }
        }
    }

    fn eval_in_context(&mut self, expr: &ConstExpr, ctx: &EvalContext, checked: bool) -> EvalResult {
        let saved = self.checked;
        self.checked = checked;
        let result = self.eval(expr, ctx);
        self.checked = saved;
        result
    }

    fn eval_name(&mut self, name: &str, ctx: &EvalContext) -> EvalResult {
        let Some(id) = self.find_visible_constant(ctx.owner, name) else {
            self.report.error(
                diagnostic_codes::NAME_DOES_NOT_EXIST,
                ctx.location,
                format_message(diagnostic_messages::NAME_DOES_NOT_EXIST, &[name]),
            );
            return Ok(None);
        };
        let value = self.resolve(id)?;
        Ok(value.map(|v| unwrap_own_enum(v, ctx)))
    }

    /// Constants visible by simple name: the owner and its bases, then each
    /// enclosing type and its bases.
    fn find_visible_constant(&self, owner: TypeId, name: &str) -> Option<ConstantId> {
        let types = &self.binder.types;
        let mut current = Some(owner);
        while let Some(ty) = current {
            if let Some(id) = self.constants.find_inherited(types, ty, name) {
                return Some(id);
            }
            current = types.get(ty).and_then(|decl| decl.declaring_type);
        }
        None
    }

    fn eval_member_access(&mut self, target: &str, member: &str, ctx: &EvalContext) -> EvalResult {
        let Some(ty) = self.resolve_type(target, ctx)? else {
            return Ok(None);
        };
        let Some(id) = self.constants.find_inherited(&self.binder.types, ty, member) else {
            let type_name = self.binder.types.full_name(ty);
            self.report.error(
                diagnostic_codes::TYPE_DOES_NOT_CONTAIN_DEFINITION,
                ctx.location,
                format_message(
                    diagnostic_messages::TYPE_DOES_NOT_CONTAIN_DEFINITION,
                    &[&type_name, member],
                ),
            );
            return Ok(None);
        };
        let value = self.resolve(id)?;
        Ok(value.map(|v| unwrap_own_enum(v, ctx)))
    }

    fn eval_cast(&mut self, ty: &TypeSyntax, operand: &ConstExpr, ctx: &EvalContext) -> EvalResult {
        let target = match ty {
            TypeSyntax::Primitive(p) => TypeRef::Primitive(*p),
            TypeSyntax::Named(name) => match self.resolve_type(name, ctx)? {
                Some(id) => TypeRef::Named(id),
                None => return Ok(None),
            },
        };
        let Some(value) = self.eval(operand, ctx)? else {
            return Ok(None);
        };
        match explicit_constant_conversion(&value, &target, &self.binder.types, self.checked) {
            Ok(converted) => Ok(Some(unwrap_own_enum(converted, ctx))),
            Err(ConversionError::OutOfRange) => {
                let code = if self.checked {
                    diagnostic_codes::CONSTANT_CANNOT_BE_CONVERTED_CHECKED
                } else {
                    diagnostic_codes::CONSTANT_VALUE_CANNOT_BE_CONVERTED
                };
                self.report_out_of_range(code, &value, &target, ctx);
                Ok(None)
            }
            Err(ConversionError::NotConstant) => {
                self.report_not_constant(ctx);
                Ok(None)
            }
            Err(ConversionError::Internal(err)) => Err(err),
            Err(ConversionError::NotConvertible | ConversionError::NotImplicit { .. }) => {
                self.report_conversion(diagnostic_codes::CANNOT_CONVERT_TYPE, &value, &target, ctx);
                Ok(None)
            }
        }
    }

    /// Resolve a type named in an initializer: enclosing and nested types of
    /// the owner first, then the owner's declaration scope.
    fn resolve_type(&mut self, name: &str, ctx: &EvalContext) -> Result<Option<TypeId>, InternalError> {
        if !name.contains('.') && !name.contains("::") {
            let types = &self.binder.types;
            let mut current = Some(ctx.owner);
            while let Some(ty) = current {
                let decl = types.get(ty).ok_or_else(|| InternalError::unknown("type", ty.0))?;
                if decl.name == name {
                    return Ok(Some(ty));
                }
                if let Some(nested) = types.nested_type(ty, name) {
                    return Ok(Some(nested));
                }
                current = decl.declaring_type;
            }
        }
        let scope = self
            .binder
            .type_scopes
            .get(&ctx.owner)
            .copied()
            .ok_or_else(|| InternalError::unknown("type scope", ctx.owner.0))?;
        self.binder
            .resolve_type_name(scope, name, ctx.location, self.report)
    }

    fn convert_to_declared(
        &mut self,
        value: &ConstantValue,
        target: &TypeRef,
        ctx: &EvalContext,
    ) -> EvalResult {
        match implicit_constant_conversion(value, target, &self.binder.types) {
            Ok(converted) => Ok(Some(converted)),
            Err(ConversionError::NotImplicit { explicit_exists }) => {
                let code = if explicit_exists {
                    diagnostic_codes::EXPLICIT_CONVERSION_EXISTS
                } else {
                    diagnostic_codes::CANNOT_IMPLICITLY_CONVERT
                };
                self.report_conversion(code, value, target, ctx);
                Ok(None)
            }
            Err(ConversionError::OutOfRange) => {
                self.report_out_of_range(
                    diagnostic_codes::CONSTANT_VALUE_CANNOT_BE_CONVERTED,
                    value,
                    target,
                    ctx,
                );
                Ok(None)
            }
            Err(ConversionError::NotConvertible) => {
                self.report_conversion(diagnostic_codes::CANNOT_IMPLICITLY_CONVERT, value, target, ctx);
                Ok(None)
            }
            Err(ConversionError::NotConstant) => {
                self.report_not_constant(ctx);
                Ok(None)
            }
            Err(ConversionError::Internal(err)) => Err(err),
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    fn report_circular(&mut self, id: ConstantId) {
        let name = self.constants.display_name(&self.binder.types, id);
        debug!(constant = %name, "circular constant definition");
        let location = self.constants.get(id).map_or(Location::NULL, |d| d.location);
        self.report.error(
            diagnostic_codes::CIRCULAR_CONSTANT_DEFINITION,
            location,
            format_message(diagnostic_messages::CIRCULAR_CONSTANT_DEFINITION, &[&name]),
        );
    }

    fn report_not_constant(&mut self, ctx: &EvalContext) {
        let name = self.constants.display_name(&self.binder.types, ctx.constant);
        self.report.error(
            diagnostic_codes::EXPRESSION_MUST_BE_CONSTANT,
            ctx.location,
            format_message(diagnostic_messages::EXPRESSION_MUST_BE_CONSTANT, &[&name]),
        );
    }

    fn report_conversion(
        &mut self,
        code: i32,
        value: &ConstantValue,
        target: &TypeRef,
        ctx: &EvalContext,
    ) {
        let from = self.binder.types.type_ref_name(&value.ty());
        let to = self.binder.types.type_ref_name(target);
        let template = match code {
            diagnostic_codes::EXPLICIT_CONVERSION_EXISTS => {
                diagnostic_messages::EXPLICIT_CONVERSION_EXISTS
            }
            diagnostic_codes::CANNOT_CONVERT_TYPE => diagnostic_messages::CANNOT_CONVERT_TYPE,
            _ => diagnostic_messages::CANNOT_IMPLICITLY_CONVERT,
        };
        self.report
            .error(code, ctx.location, format_message(template, &[&from, &to]));
    }

    fn report_out_of_range(
        &mut self,
        code: i32,
        value: &ConstantValue,
        target: &TypeRef,
        ctx: &EvalContext,
    ) {
        let to = self.binder.types.type_ref_name(target);
        let template = if code == diagnostic_codes::CONSTANT_CANNOT_BE_CONVERTED_CHECKED {
            diagnostic_messages::CONSTANT_CANNOT_BE_CONVERTED_CHECKED
        } else {
            diagnostic_messages::CONSTANT_VALUE_CANNOT_BE_CONVERTED
        };
        self.report.error(
            code,
            ctx.location,
            format_message(template, &[&value.to_string(), &to]),
        );
    }

    fn fold_failed(
        &mut self,
        err: FoldError,
        ctx: &EvalContext,
        operator: &str,
        operands: &[&ConstantValue],
    ) -> EvalResult {
        let type_names: Vec<String> = operands
            .iter()
            .map(|v| self.binder.types.type_ref_name(&v.ty()))
            .collect();
        let (code, message) = match err {
            FoldError::Overflow => (
                diagnostic_codes::OPERATION_OVERFLOWS_IN_CHECKED_MODE,
                diagnostic_messages::OPERATION_OVERFLOWS_IN_CHECKED_MODE.to_string(),
            ),
            FoldError::DivideByZero => (
                diagnostic_codes::DIVISION_BY_CONSTANT_ZERO,
                diagnostic_messages::DIVISION_BY_CONSTANT_ZERO.to_string(),
            ),
            FoldError::InvalidOperands if type_names.len() == 2 => (
                diagnostic_codes::OPERATOR_CANNOT_BE_APPLIED,
                format_message(
                    diagnostic_messages::OPERATOR_CANNOT_BE_APPLIED,
                    &[operator, &type_names[0], &type_names[1]],
                ),
            ),
            FoldError::InvalidOperands | FoldError::InvalidOperand => (
                diagnostic_codes::UNARY_OPERATOR_CANNOT_BE_APPLIED,
                format_message(
                    diagnostic_messages::UNARY_OPERATOR_CANNOT_BE_APPLIED,
                    &[operator, type_names.first().map_or("?", String::as_str)],
                ),
            ),
            FoldError::NotConstant => {
                self.report_not_constant(ctx);
                return Ok(None);
            }
            FoldError::Internal(err) => return Err(err),
        };
        self.report.error(code, ctx.location, message);
        Ok(None)
    }
}

/// Inside an enum's own member initializers, sibling members have the
/// underlying type.
fn unwrap_own_enum(value: ConstantValue, ctx: &EvalContext) -> ConstantValue {
    match value {
        ConstantValue::Enum { ty, value } if ctx.in_enum && ty == ctx.owner => *value,
        other => other,
    }
}

#[cfg(test)]
#[path = "../tests/constant_tests.rs"]
mod tests;
