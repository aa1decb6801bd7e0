//! Runtime support for invoking bound methods.
//!
//! - [`NativeFn`] - type-erased callable storage
//! - [`CallContext`] - receiver, arguments and return slot of one call

mod call_context;
mod native_fn;

pub use call_context::CallContext;
pub use native_fn::{NativeCallable, NativeFn};
