//! Registry entry types.
//!
//! - [`ClassEntry`] - one registered class and its members
//! - [`PropertySetGet`] - accessor pair behind a property
//! - [`ExtensionClassInfo`] - descriptor handed over by an extension library
//! - [`NativeStruct`] - plain struct layout exposed to extensions

mod class;
mod extension;
mod property;

pub use class::{ClassEntry, ClassFactory, DefaultValueCache, NativeStruct};
pub use extension::{ExtensionClassInfo, ExtensionCreateFn};
pub use property::PropertySetGet;
