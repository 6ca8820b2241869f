//! Diagnostic codes and message templates.
//!
//! Codes follow the C# compiler numbering; the `CS` prefix and zero padding are
//! added when a diagnostic is rendered.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const OPERATOR_CANNOT_BE_APPLIED: i32 = 19;
    pub const DIVISION_BY_CONSTANT_ZERO: i32 = 20;
    pub const UNARY_OPERATOR_CANNOT_BE_APPLIED: i32 = 23;
    pub const CANNOT_IMPLICITLY_CONVERT: i32 = 29;
    pub const CANNOT_CONVERT_TYPE: i32 = 30;
    pub const CONSTANT_VALUE_CANNOT_BE_CONVERTED: i32 = 31;
    pub const NAMESPACE_ALREADY_CONTAINS_DEFINITION: i32 = 101;
    pub const NAME_DOES_NOT_EXIST: i32 = 103;
    pub const AMBIGUOUS_REFERENCE: i32 = 104;
    pub const DUPLICATE_USING_DIRECTIVE: i32 = 105;
    pub const CIRCULAR_CONSTANT_DEFINITION: i32 = 110;
    pub const TYPE_DOES_NOT_CONTAIN_DEFINITION: i32 = 117;
    pub const EXPRESSION_MUST_BE_CONSTANT: i32 = 133;
    pub const USING_NAMESPACE_APPLIED_TO_TYPE: i32 = 138;
    pub const OPERATION_OVERFLOWS_IN_CHECKED_MODE: i32 = 220;
    pub const CONSTANT_CANNOT_BE_CONVERTED_CHECKED: i32 = 221;
    pub const NAMESPACE_DOES_NOT_CONTAIN: i32 = 234;
    pub const TYPE_OR_NAMESPACE_NOT_FOUND: i32 = 246;
    pub const EXPLICIT_CONVERSION_EXISTS: i32 = 266;
    pub const TYPE_CANNOT_BE_CONST: i32 = 283;
    pub const NESTED_TYPE_NOT_FOUND: i32 = 426;
    pub const EXTERN_ALIAS_NOT_SPECIFIED: i32 = 430;
    pub const ALIAS_NOT_FOUND: i32 = 432;
    pub const IMPORTED_TYPE_DEFINED_MULTIPLE_TIMES: i32 = 433;
    pub const IGNORING_IMPORTED_TYPE: i32 = 436;
    pub const EXTERN_ALIAS_MUST_PRECEDE: i32 = 439;
    pub const INHERITED_ABSTRACT_NOT_IMPLEMENTED: i32 = 534;
    pub const INTERFACE_MEMBER_NOT_IMPLEMENTED: i32 = 535;
    pub const INTERFACE_MEMBER_WRONG_CANDIDATE: i32 = 536;
    pub const EXPLICIT_MEMBER_NOT_IN_INTERFACE: i32 = 539;
    pub const CONTAINING_TYPE_DOES_NOT_IMPLEMENT: i32 = 540;
    pub const NAMESPACE_CONFLICTS_WITH_ALIAS: i32 = 576;
    pub const USING_MUST_PRECEDE: i32 = 1529;
    pub const DUPLICATE_USING_ALIAS: i32 = 1537;
    pub const CANNOT_REDEFINE_GLOBAL_ALIAS: i32 = 1681;
    pub const SOURCE_FILE_SPECIFIED_MULTIPLE_TIMES: i32 = 2002;
}

pub mod diagnostic_messages {
    pub const OPERATOR_CANNOT_BE_APPLIED: &str =
        "Operator '{0}' cannot be applied to operands of type '{1}' and '{2}'";
    pub const DIVISION_BY_CONSTANT_ZERO: &str = "Division by constant zero";
    pub const UNARY_OPERATOR_CANNOT_BE_APPLIED: &str =
        "Operator '{0}' cannot be applied to operand of type '{1}'";
    pub const CANNOT_IMPLICITLY_CONVERT: &str = "Cannot implicitly convert type '{0}' to '{1}'";
    pub const CANNOT_CONVERT_TYPE: &str = "Cannot convert type '{0}' to '{1}'";
    pub const CONSTANT_VALUE_CANNOT_BE_CONVERTED: &str =
        "Constant value '{0}' cannot be converted to a '{1}'";
    pub const NAMESPACE_ALREADY_CONTAINS_DEFINITION: &str =
        "The namespace '{0}' already contains a definition for '{1}'";
    pub const NAME_DOES_NOT_EXIST: &str =
        "The name '{0}' does not exist in the current context";
    pub const AMBIGUOUS_REFERENCE: &str =
        "'{0}' is an ambiguous reference between '{1}' and '{2}'";
    pub const DUPLICATE_USING_DIRECTIVE: &str =
        "The using directive for '{0}' appeared previously in this namespace";
    pub const CIRCULAR_CONSTANT_DEFINITION: &str =
        "The evaluation of the constant value for '{0}' involves a circular definition";
    pub const TYPE_DOES_NOT_CONTAIN_DEFINITION: &str =
        "'{0}' does not contain a definition for '{1}'";
    pub const EXPRESSION_MUST_BE_CONSTANT: &str =
        "The expression being assigned to '{0}' must be constant";
    pub const USING_NAMESPACE_APPLIED_TO_TYPE: &str =
        "A using namespace directive can only be applied to namespaces; '{0}' is a type not a namespace";
    pub const OPERATION_OVERFLOWS_IN_CHECKED_MODE: &str =
        "The operation overflows at compile time in checked mode";
    pub const CONSTANT_CANNOT_BE_CONVERTED_CHECKED: &str =
        "Constant value '{0}' cannot be converted to a '{1}' (use 'unchecked' syntax to override)";
    pub const NAMESPACE_DOES_NOT_CONTAIN: &str =
        "The type or namespace name '{0}' does not exist in the namespace '{1}'. Are you missing an assembly reference?";
    pub const TYPE_OR_NAMESPACE_NOT_FOUND: &str =
        "The type or namespace name '{0}' could not be found. Are you missing a using directive or an assembly reference?";
    pub const EXPLICIT_CONVERSION_EXISTS: &str =
        "Cannot implicitly convert type '{0}' to '{1}'. An explicit conversion exists (are you missing a cast?)";
    pub const TYPE_CANNOT_BE_CONST: &str = "The type '{0}' cannot be declared const";
    pub const NESTED_TYPE_NOT_FOUND: &str =
        "The type name '{0}' does not exist in the type '{1}'";
    pub const EXTERN_ALIAS_NOT_SPECIFIED: &str =
        "The extern alias '{0}' was not specified in a /reference option";
    pub const ALIAS_NOT_FOUND: &str = "Alias '{0}' not found";
    pub const IMPORTED_TYPE_DEFINED_MULTIPLE_TIMES: &str =
        "The imported type '{0}' is defined multiple times";
    pub const IGNORING_IMPORTED_TYPE: &str =
        "Ignoring imported type '{0}' since the current assembly already has a declaration with the same name";
    pub const EXTERN_ALIAS_MUST_PRECEDE: &str =
        "An extern alias declaration must precede all other elements";
    pub const INHERITED_ABSTRACT_NOT_IMPLEMENTED: &str =
        "'{0}' does not implement inherited abstract member '{1}'";
    pub const INTERFACE_MEMBER_NOT_IMPLEMENTED: &str =
        "'{0}' does not implement interface member '{1}'";
    pub const INTERFACE_MEMBER_WRONG_CANDIDATE: &str =
        "'{0}' does not implement interface member '{1}'. '{2}' is either static, not public, or has the wrong return type";
    pub const EXPLICIT_MEMBER_NOT_IN_INTERFACE: &str =
        "'{0}' in explicit interface declaration is not a member of interface";
    pub const CONTAINING_TYPE_DOES_NOT_IMPLEMENT: &str =
        "'{0}': containing type does not implement interface '{1}'";
    pub const NAMESPACE_CONFLICTS_WITH_ALIAS: &str =
        "Namespace '{0}' contains a definition conflicting with alias '{1}'";
    pub const USING_MUST_PRECEDE: &str =
        "A using clause must precede all other namespace elements except extern alias declarations";
    pub const DUPLICATE_USING_ALIAS: &str =
        "The using alias '{0}' appeared previously in this namespace";
    pub const CANNOT_REDEFINE_GLOBAL_ALIAS: &str =
        "You cannot redefine the global extern alias";
    pub const SOURCE_FILE_SPECIFIED_MULTIPLE_TIMES: &str =
        "Source file '{0}' specified multiple times";

    /// Appended to CS0246 when the missing name is a well-known namespace.
    pub const CONSIDER_ADDING_ASSEMBLY_REFERENCE: &str =
        "Consider adding a reference to assembly '{0}'";
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::OPERATOR_CANNOT_BE_APPLIED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::OPERATOR_CANNOT_BE_APPLIED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::DIVISION_BY_CONSTANT_ZERO,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::DIVISION_BY_CONSTANT_ZERO,
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNARY_OPERATOR_CANNOT_BE_APPLIED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::UNARY_OPERATOR_CANNOT_BE_APPLIED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CANNOT_IMPLICITLY_CONVERT,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CANNOT_IMPLICITLY_CONVERT,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CANNOT_CONVERT_TYPE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CANNOT_CONVERT_TYPE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CONSTANT_VALUE_CANNOT_BE_CONVERTED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CONSTANT_VALUE_CANNOT_BE_CONVERTED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NAMESPACE_ALREADY_CONTAINS_DEFINITION,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NAMESPACE_ALREADY_CONTAINS_DEFINITION,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NAME_DOES_NOT_EXIST,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NAME_DOES_NOT_EXIST,
    },
    DiagnosticMessage {
        code: diagnostic_codes::AMBIGUOUS_REFERENCE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::AMBIGUOUS_REFERENCE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::DUPLICATE_USING_DIRECTIVE,
        category: DiagnosticCategory::Warning,
        message: diagnostic_messages::DUPLICATE_USING_DIRECTIVE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CIRCULAR_CONSTANT_DEFINITION,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CIRCULAR_CONSTANT_DEFINITION,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPE_DOES_NOT_CONTAIN_DEFINITION,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TYPE_DOES_NOT_CONTAIN_DEFINITION,
    },
    DiagnosticMessage {
        code: diagnostic_codes::EXPRESSION_MUST_BE_CONSTANT,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::EXPRESSION_MUST_BE_CONSTANT,
    },
    DiagnosticMessage {
        code: diagnostic_codes::USING_NAMESPACE_APPLIED_TO_TYPE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::USING_NAMESPACE_APPLIED_TO_TYPE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::OPERATION_OVERFLOWS_IN_CHECKED_MODE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::OPERATION_OVERFLOWS_IN_CHECKED_MODE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CONSTANT_CANNOT_BE_CONVERTED_CHECKED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CONSTANT_CANNOT_BE_CONVERTED_CHECKED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NAMESPACE_DOES_NOT_CONTAIN,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NAMESPACE_DOES_NOT_CONTAIN,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPE_OR_NAMESPACE_NOT_FOUND,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TYPE_OR_NAMESPACE_NOT_FOUND,
    },
    DiagnosticMessage {
        code: diagnostic_codes::EXPLICIT_CONVERSION_EXISTS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::EXPLICIT_CONVERSION_EXISTS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPE_CANNOT_BE_CONST,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TYPE_CANNOT_BE_CONST,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NESTED_TYPE_NOT_FOUND,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NESTED_TYPE_NOT_FOUND,
    },
    DiagnosticMessage {
        code: diagnostic_codes::EXTERN_ALIAS_NOT_SPECIFIED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::EXTERN_ALIAS_NOT_SPECIFIED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::ALIAS_NOT_FOUND,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::ALIAS_NOT_FOUND,
    },
    DiagnosticMessage {
        code: diagnostic_codes::IMPORTED_TYPE_DEFINED_MULTIPLE_TIMES,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::IMPORTED_TYPE_DEFINED_MULTIPLE_TIMES,
    },
    DiagnosticMessage {
        code: diagnostic_codes::IGNORING_IMPORTED_TYPE,
        category: DiagnosticCategory::Warning,
        message: diagnostic_messages::IGNORING_IMPORTED_TYPE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::EXTERN_ALIAS_MUST_PRECEDE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::EXTERN_ALIAS_MUST_PRECEDE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::INHERITED_ABSTRACT_NOT_IMPLEMENTED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::INHERITED_ABSTRACT_NOT_IMPLEMENTED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::INTERFACE_MEMBER_NOT_IMPLEMENTED,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::INTERFACE_MEMBER_NOT_IMPLEMENTED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::INTERFACE_MEMBER_WRONG_CANDIDATE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::INTERFACE_MEMBER_WRONG_CANDIDATE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::EXPLICIT_MEMBER_NOT_IN_INTERFACE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::EXPLICIT_MEMBER_NOT_IN_INTERFACE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CONTAINING_TYPE_DOES_NOT_IMPLEMENT,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CONTAINING_TYPE_DOES_NOT_IMPLEMENT,
    },
    DiagnosticMessage {
        code: diagnostic_codes::NAMESPACE_CONFLICTS_WITH_ALIAS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::NAMESPACE_CONFLICTS_WITH_ALIAS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::USING_MUST_PRECEDE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::USING_MUST_PRECEDE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::DUPLICATE_USING_ALIAS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::DUPLICATE_USING_ALIAS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::CANNOT_REDEFINE_GLOBAL_ALIAS,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::CANNOT_REDEFINE_GLOBAL_ALIAS,
    },
    DiagnosticMessage {
        code: diagnostic_codes::SOURCE_FILE_SPECIFIED_MULTIPLE_TIMES,
        category: DiagnosticCategory::Warning,
        message: diagnostic_messages::SOURCE_FILE_SPECIFIED_MULTIPLE_TIMES,
    },
];
