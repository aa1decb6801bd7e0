//! Class registry proc macros
//!
//! # Macros
//!
//! - `#[derive(Class)]` - Implement `StaticClass` and `Object` for a struct
//!   that embeds its parent class
//!
//! # Example
//!
//! ```ignore
//! use classdb_macros::Class;
//!
//! #[derive(Class, Default)]
//! pub struct Node {
//!     base: BaseObject,
//!     name: String,
//! }
//!
//! #[derive(Class, Default)]
//! #[class(name = "Window")]
//! pub struct AppWindow {
//!     #[class(base)]
//!     node: Node,
//!     title: String,
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_class;

/// Derive `StaticClass` and `Object` for a native class.
///
/// The parent class is the type of the field named `base`, or of the field
/// marked `#[class(base)]`. Its registered name becomes
/// `PARENT_CLASS_NAME`, and downcasts and `base_object` walk into it.
///
/// # Attributes
///
/// - `#[class(name = "...")]` - Override the registered class name
/// - `#[class(crate = "...")]` - Path of the core crate. The default,
///   `::classdb::core`, needs the `classdb` facade; crates depending on
///   `classdb-core` directly pass `crate = "::classdb_core"`
///
/// # Field Attributes
///
/// - `#[class(base)]` - This field embeds the parent class
#[proc_macro_derive(Class, attributes(class))]
pub fn derive_class(input: TokenStream) -> TokenStream {
    derive_class::derive_class_impl(input)
}
