//! Argument and receiver access for a single native call.

use crate::convert::{FromVariant, ToVariant, VariantTyped};
use crate::error::CallError;
use crate::object::Object;
use crate::variant::Variant;

/// Everything a bound method sees while it runs.
///
/// Arguments have already been arity-checked, padded with defaults and
/// type-checked by the owning [`MethodBind`](crate::MethodBind) when the call
/// goes through it; the accessors here still convert and report errors so
/// raw callables can be driven directly.
pub struct CallContext<'a> {
    this: Option<&'a mut (dyn Object + 'static)>,
    args: &'a [Variant],
    return_value: Variant,
}

impl<'a> CallContext<'a> {
    pub fn new(this: Option<&'a mut (dyn Object + 'static)>, args: &'a [Variant]) -> Self {
        Self {
            this,
            args,
            return_value: Variant::Nil,
        }
    }

    /// Context for a call without a receiver.
    pub fn detached(args: &'a [Variant]) -> Self {
        Self::new(None, args)
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[Variant] {
        self.args
    }

    /// Arguments from `start` onward; empty when `start` is past the end.
    pub fn varargs(&self, start: usize) -> &[Variant] {
        self.args.get(start..).unwrap_or(&[])
    }

    /// Raw argument at `index`.
    pub fn arg_variant(&self, index: usize) -> Result<&Variant, CallError> {
        self.args.get(index).ok_or(CallError::TooFewArguments {
            expected: index + 1,
            got: self.args.len(),
        })
    }

    /// Argument at `index`, converted to `T`.
    pub fn arg<T: FromVariant>(&self, index: usize) -> Result<T, CallError> {
        let value = self.arg_variant(index)?;
        if !value.get_type().can_convert_to(T::VARIANT_TYPE) {
            return Err(CallError::InvalidArgument {
                index,
                expected: T::VARIANT_TYPE,
                got: value.get_type(),
            });
        }
        T::from_variant(value).map_err(|source| CallError::ArgumentConversion { index, source })
    }

    pub fn has_this(&self) -> bool {
        self.this.is_some()
    }

    /// The receiver as a trait object.
    pub fn object(&self) -> Result<&(dyn Object + 'static), CallError> {
        match self.this.as_deref() {
            Some(obj) => Ok(obj),
            None => Err(CallError::InstanceIsNull(String::new())),
        }
    }

    pub fn object_mut(&mut self) -> Result<&mut (dyn Object + 'static), CallError> {
        match self.this.as_deref_mut() {
            Some(obj) => Ok(obj),
            None => Err(CallError::InstanceIsNull(String::new())),
        }
    }

    /// The receiver, or the embedded base of type `T`.
    pub fn this<T: Object>(&self) -> Result<&T, CallError> {
        self.object()?
            .downcast_ref::<T>()
            .ok_or(CallError::InvalidInstance {
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn this_mut<T: Object>(&mut self) -> Result<&mut T, CallError> {
        self.object_mut()?
            .downcast_mut::<T>()
            .ok_or(CallError::InvalidInstance {
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn set_return<T: ToVariant + VariantTyped>(&mut self, value: T) {
        self.return_value = value.to_variant();
    }

    pub fn set_return_variant(&mut self, value: Variant) {
        self.return_value = value;
    }

    pub fn return_value(&self) -> &Variant {
        &self.return_value
    }

    pub fn into_return(self) -> Variant {
        self.return_value
    }
}
