//! Semantic-analysis diagnostic codes (§4, §7). These are plain string
//! constants rather than `DiagnosticCode` table entries: the codes named
//! throughout the specification are stable identifiers a caller can match
//! on, and a message built from one doubles as that identifier, so a test
//! asserting "this emits `E_LET_REQUIRES_INITIALIZER`" can just check the
//! message prefix instead of threading a second lookup table through every
//! call site.

pub const E_GENERIC_TYPE_ARGUMENT_REQUIRED: &str = "E_GENERIC_TYPE_ARGUMENT_REQUIRED";
pub const E_CANNOT_SPECIALIZE_NON_GENERIC_TYPE: &str = "E_CANNOT_SPECIALIZE_NON_GENERIC_TYPE";
pub const E_TYPE_WITH_TOO_MANY_ARGUMENTS: &str = "E_TYPE_WITH_TOO_MANY_ARGUMENTS";
pub const E_TYPE_WITH_INSUFFICIENT_ARGUMENTS: &str = "E_TYPE_WITH_INSUFFICIENT_ARGUMENTS";
pub const E_NON_PROTOCOL_TYPE_CANNOT_BE_USED_WITHIN_PROTOCOL_COMPOSITION: &str =
    "E_NON_PROTOCOL_TYPE_CANNOT_BE_USED_WITHIN_PROTOCOL_COMPOSITION";
pub const E_USE_OF_UNDECLARED_TYPE: &str = "E_USE_OF_UNDECLARED_TYPE";

pub const E_DEFINITION_CONFLICT: &str = "E_DEFINITION_CONFLICT";
pub const E_CYCLIC_DECLARATION: &str = "E_CYCLIC_DECLARATION";

pub const E_CLASS_PROPERTIES_MAY_ONLY_BE_DECLARED_ON_A_TYPE: &str =
    "E_CLASS_PROPERTIES_MAY_ONLY_BE_DECLARED_ON_A_TYPE";
pub const E_A_MAY_ONLY_BE_USED_ON_B_DECLARATION_2: &str = "E_A_MAY_ONLY_BE_USED_ON_B_DECLARATION_2";
pub const E_CANNOT_CONVERT_EXPRESSION_TYPE_2: &str = "E_CANNOT_CONVERT_EXPRESSION_TYPE_2";
pub const E_TYPE_ANNOTATION_MISSING_IN_PATTERN: &str = "E_TYPE_ANNOTATION_MISSING_IN_PATTERN";
pub const E_LET_REQUIRES_INITIALIZER: &str = "E_LET_REQUIRES_INITIALIZER";
pub const E_PROTOCOLS_FORBID_STORED_PROPERTIES: &str = "E_PROTOCOLS_FORBID_STORED_PROPERTIES";
pub const E_TUPLE_PATTERN_MUST_MATCH_TUPLE_TYPE_1: &str = "E_TUPLE_PATTERN_MUST_MATCH_TUPLE_TYPE_1";
pub const E_NESTED_BINDING_PATTERN_NOT_ALLOWED: &str = "E_NESTED_BINDING_PATTERN_NOT_ALLOWED";

pub const E_A_ISNT_VALID_ON_METHODS_IN_CLASSES_OR_CLASS_BOUND_PROTOCOLS: &str =
    "E_A_ISNT_VALID_ON_METHODS_IN_CLASSES_OR_CLASS_BOUND_PROTOCOLS";
pub const E_STATIC_METHODS_CANNOT_BE_MUTATING_OR_NONMUTATING: &str =
    "E_STATIC_METHODS_CANNOT_BE_MUTATING_OR_NONMUTATING";
pub const E_CANNOT_ASSIGN_TO_A_IN_B_2: &str = "E_CANNOT_ASSIGN_TO_A_IN_B_2";
pub const E_CANNOT_ASSIGN_TO_A_IN_A_METHOD_1: &str = "E_CANNOT_ASSIGN_TO_A_IN_A_METHOD_1";
pub const E_MISSING_RETURN_IN_A_FUNCTION_EXPECTED_TO_RETURN_A_1: &str =
    "E_MISSING_RETURN_IN_A_FUNCTION_EXPECTED_TO_RETURN_A_1";
pub const W_CODE_AFTER_A_WILL_NEVER_BE_EXECUTED_1: &str = "W_CODE_AFTER_A_WILL_NEVER_BE_EXECUTED_1";

pub const E_USE_OF_UNRESOLVED_IDENTIFIER_1: &str = "E_USE_OF_UNRESOLVED_IDENTIFIER_1";
pub const E_VALUE_OF_OPTIONAL_TYPE_MUST_BE_UNWRAPPED: &str =
    "E_VALUE_OF_OPTIONAL_TYPE_MUST_BE_UNWRAPPED";
pub const E_IF_WHILE_CONDITION_MUST_BE_BOOL: &str = "E_IF_WHILE_CONDITION_MUST_BE_BOOL";
pub const E_SWITCH_MUST_BE_EXHAUSTIVE: &str = "E_SWITCH_MUST_BE_EXHAUSTIVE";
