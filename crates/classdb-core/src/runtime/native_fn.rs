//! Type-erased callable storage.

use std::fmt;
use std::sync::Arc;

use super::CallContext;
use crate::error::CallError;

/// Type-erased native function.
///
/// Wraps any callable implementing [`NativeCallable`] so that functions of
/// different signatures can be stored uniformly. The callable is held in an
/// `Arc`, so cloning a `NativeFn` shares the implementation.
pub struct NativeFn {
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    pub fn new<F>(f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Call this function with the given context.
    pub fn call(&self, ctx: &mut CallContext) -> Result<(), CallError> {
        self.inner.call(ctx)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

impl Clone for NativeFn {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Trait for callable native functions.
///
/// The `call` method receives a [`CallContext`] that gives access to the
/// receiver and arguments and collects the return value.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext) -> Result<(), CallError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext) -> Result<(), CallError>,
{
    fn call(&self, ctx: &mut CallContext) -> Result<(), CallError> {
        (self)(ctx)
    }
}
