//! Class reflection and registration.
//!
//! `classdb` records native classes, their methods, properties, signals,
//! constants and enums, creates instances by class name and hosts classes
//! registered at runtime by extension libraries.
//!
//! - [`core`] - values, the object model, method bindings and errors
//! - [`registry`] - the [`ClassDb`](registry::ClassDb) registry
//! - `#[derive(Class)]` - implements `StaticClass` and `Object` for a struct
//!   embedding its parent class (feature `macros`, on by default)

pub use classdb_core as core;
pub use classdb_registry as registry;

#[cfg(feature = "macros")]
pub mod macros {
    pub use classdb_macros::*;
}

#[cfg(feature = "macros")]
pub use classdb_macros::Class;

pub mod prelude {
    pub use classdb_core::{
        ApiType, BaseObject, CallContext, CallError, ClassDbError, ExtensionClassInfo,
        FromVariant, LookupError, MethodBind, MethodFlags, MethodInfo, MethodKind, Object,
        PropertyInfo, PropertyUsage, RegistrationError, StaticClass, ToVariant, Variant,
        VariantType,
    };
    pub use classdb_registry::{ClassBuilder, ClassDb, ClassDbConfig, ClassState, RegisterClass};

    #[cfg(feature = "macros")]
    pub use classdb_macros::Class;
}
