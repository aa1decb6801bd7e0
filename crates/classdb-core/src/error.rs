//! Error types for the class registry.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ClassDbError (top-level wrapper)
//! ├── RegistrationError - configuration mistakes made while registering classes
//! ├── LookupError       - a queried class or member does not exist
//! └── CallError         - invoking a bound method, factory or accessor failed
//!     └── ConversionError - a Variant could not become the requested Rust type
//! ```
//!
//! Registration errors are returned to startup code, which is expected to
//! abort on them. Lookup and call errors are always recoverable.

use thiserror::Error;

use crate::variant::VariantType;

// ============================================================================
// Conversion Errors
// ============================================================================

/// A [`Variant`](crate::Variant) could not be converted to a Rust value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("integer {value} does not fit in {target_type}")]
    IntegerOverflow {
        value: i64,
        target_type: &'static str,
    },

    #[error("float {value} does not fit in {target_type}")]
    FloatConversion {
        value: f64,
        target_type: &'static str,
    },
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors produced while populating the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("invalid class name '{0}'")]
    InvalidName(String),

    #[error("class '{0}' is already registered")]
    DuplicateClass(String),

    #[error("class '{class}' inherits from unregistered class '{parent}'")]
    UnknownParent { class: String, parent: String },

    #[error("class '{class}' is declared with parent '{declared}' but registered under '{registered}'")]
    ParentMismatch {
        class: String,
        declared: String,
        registered: String,
    },

    #[error("class '{0}' is not registered")]
    ClassNotFound(String),

    #[error("method already bound: {class}::{method}")]
    DuplicateMethod { class: String, method: String },

    #[error("virtual method already declared: {class}::{method}")]
    DuplicateVirtualMethod { class: String, method: String },

    #[error("method '{class}::{method}' is not bound")]
    MethodNotFound { class: String, method: String },

    #[error("property '{class}.{property}' already exists")]
    DuplicateProperty { class: String, property: String },

    #[error("property '{class}.{property}' does not exist")]
    PropertyNotFound { class: String, property: String },

    #[error("signal '{class}.{signal}' already exists")]
    DuplicateSignal { class: String, signal: String },

    #[error("constant '{class}.{constant}' already exists")]
    DuplicateConstant { class: String, constant: String },

    #[error("invalid {kind} '{accessor}' for property '{class}.{property}'")]
    UnknownAccessor {
        class: String,
        property: String,
        kind: &'static str,
        accessor: String,
    },

    #[error("method '{method}' declares {defaults} default argument(s) but takes only {arity}")]
    TooManyDefaults {
        method: String,
        arity: usize,
        defaults: usize,
    },

    #[error("class '{0}' is not an extension class")]
    NotAnExtensionClass(String),

    #[error("native struct '{0}' is already registered")]
    DuplicateNativeStruct(String),
}

// ============================================================================
// Lookup Errors
// ============================================================================

/// A queried class or member does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("unknown method '{class}::{method}'")]
    UnknownMethod { class: String, method: String },

    #[error("unknown property '{class}.{property}'")]
    UnknownProperty { class: String, property: String },

    #[error("unknown signal '{class}.{signal}'")]
    UnknownSignal { class: String, signal: String },

    #[error("unknown constant '{class}.{constant}'")]
    UnknownConstant { class: String, constant: String },

    #[error("unknown enum '{class}.{enum_name}'")]
    UnknownEnum { class: String, enum_name: String },

    #[error("property '{class}.{property}' has no default value")]
    NoDefaultValue { class: String, property: String },

    #[error("unknown native struct '{0}'")]
    UnknownNativeStruct(String),
}

// ============================================================================
// Call Errors
// ============================================================================

/// Errors produced while invoking bound methods, factories or accessors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("too few arguments: expected at least {expected}, got {got}")]
    TooFewArguments { expected: usize, got: usize },

    #[error("too many arguments: expected at most {expected}, got {got}")]
    TooManyArguments { expected: usize, got: usize },

    #[error("invalid argument {index}: expected {expected}, got {got}")]
    InvalidArgument {
        index: usize,
        expected: VariantType,
        got: VariantType,
    },

    #[error("argument {index}: {source}")]
    ArgumentConversion {
        index: usize,
        #[source]
        source: ConversionError,
    },

    #[error("method '{0}' requires an instance")]
    InstanceIsNull(String),

    #[error("instance is not a '{expected}'")]
    InvalidInstance { expected: &'static str },

    #[error("class '{0}' cannot be instantiated")]
    NotInstantiable(String),

    #[error("class '{0}' is disabled")]
    ClassDisabled(String),

    #[error("class '{0}' is editor-only")]
    EditorOnly(String),

    #[error("property '{class}.{property}' is read-only")]
    ReadOnlyProperty { class: String, property: String },

    #[error("property '{class}.{property}' is write-only")]
    WriteOnlyProperty { class: String, property: String },

    #[error("accessor '{accessor}' of property '{class}.{property}' is not bound")]
    UnresolvedAccessor {
        class: String,
        property: String,
        accessor: String,
    },

    #[error("{0}")]
    Failed(String),
}

impl CallError {
    /// Convenience constructor for failures raised inside bound methods.
    pub fn failed(message: impl Into<String>) -> Self {
        CallError::Failed(message.into())
    }
}

// ============================================================================
// Unified Error
// ============================================================================

/// Top-level error wrapping every phase.
///
/// Each variant uses `#[from]` so `?` converts phase errors automatically.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassDbError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Call(#[from] CallError),
}

impl ClassDbError {
    pub fn is_registration(&self) -> bool {
        matches!(self, ClassDbError::Registration(_))
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, ClassDbError::Lookup(_))
    }

    pub fn is_call(&self) -> bool {
        matches!(self, ClassDbError::Call(_))
    }
}
