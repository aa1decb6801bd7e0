//! Core types for the class registry.
//!
//! This crate holds everything the registry stores and hands out, without
//! the registry itself:
//!
//! - [`Variant`] / [`VariantType`] and the [`FromVariant`] / [`ToVariant`]
//!   conversions
//! - the object model: [`Object`], [`StaticClass`], [`BaseObject`]
//! - method bindings: [`MethodBind`], [`IntoMethod`], [`CallContext`]
//! - metadata: [`PropertyInfo`], [`MethodInfo`], flags and API categories
//! - registry entries: [`ClassEntry`], [`PropertySetGet`],
//!   [`ExtensionClassInfo`], [`NativeStruct`]
//! - error types for every phase

pub mod convert;
pub mod entries;
pub mod error;
pub mod flags;
pub mod ids;
pub mod info;
pub mod method_bind;
pub mod object;
pub mod runtime;
pub mod variant;

pub use convert::{FromVariant, ToVariant, VariantTyped};
pub use entries::{
    ClassEntry, ClassFactory, DefaultValueCache, ExtensionClassInfo, ExtensionCreateFn,
    NativeStruct, PropertySetGet,
};
pub use error::{CallError, ClassDbError, ConversionError, LookupError, RegistrationError};
pub use flags::{ApiType, MethodFlags, PropertyHint, PropertyUsage};
pub use ids::ClassId;
pub use info::{MethodInfo, PropertyInfo};
pub use method_bind::{
    IntoMethod, MethodBind, MethodDefinition, MethodKind, MethodSignature, MutReceiver,
    NoReceiver, RefReceiver,
};
pub use object::{BaseObject, ExtensionInstance, Object, ObjectId, StaticClass};
pub use runtime::{CallContext, NativeCallable, NativeFn};
pub use variant::{Variant, VariantType};
