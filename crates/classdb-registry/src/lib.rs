//! The class registry.
//!
//! [`ClassDb`] records every class known to the runtime together with its
//! methods, properties, signals, constants and enums, and answers
//! inheritance-aware queries about them. It also creates instances by class
//! name, hosts classes registered by extension libraries and maps legacy
//! class names and resource file extensions to current classes.
//!
//! # Modules
//!
//! - `registry` - the class table, hierarchy queries, instantiation
//! - `members` - methods, signals, constants, enums
//! - `properties` - properties, accessors, default values
//! - `class_builder` - typed registration through [`RegisterClass`]
//! - `extension` - classes provided by extension libraries
//! - `compat` - resource extensions and compatibility remaps
//! - `api_hash` - stable hash of an API category
//! - `native_struct` - struct layouts shared with extensions
//!
//! All operations take `&self`; share a registry between threads with
//! `Arc<ClassDb>`.

mod api_hash;
mod class_builder;
mod compat;
mod config;
mod extension;
mod members;
mod native_struct;
mod properties;
mod registry;

pub use class_builder::{ClassBuilder, RegisterClass};
pub use config::ClassDbConfig;
pub use registry::{ClassDb, ClassState};

pub use classdb_core::{
    ApiType, BaseObject, CallContext, CallError, ClassDbError, ClassFactory, ClassId,
    ConversionError, ExtensionClassInfo, ExtensionInstance, FromVariant, IntoMethod, LookupError,
    MethodBind, MethodDefinition, MethodFlags, MethodInfo, MethodKind, Object, ObjectId,
    PropertyHint, PropertyInfo, PropertyUsage, RegistrationError, StaticClass, ToVariant, Variant,
    VariantType,
};
