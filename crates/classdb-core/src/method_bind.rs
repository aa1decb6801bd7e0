//! Method bindings.
//!
//! A [`MethodBind`] pairs a type-erased [`NativeFn`] with the metadata the
//! registry needs to call it safely by name: argument names and types,
//! trailing default arguments, flags and the receiver kind.
//!
//! # Typed bindings
//!
//! Plain Rust functions and closures become bindings through [`IntoMethod`]:
//!
//! ```ignore
//! // &self method: CONST, receiver required
//! MethodBind::from_method::<Window, _, _>(("get_title", []), Window::get_title);
//! // &mut self method with two named arguments
//! MethodBind::from_method::<Window, _, _>(("set_size", ["w", "h"]), Window::set_size);
//! // no receiver
//! MethodBind::from_method::<Window, _, _>(("screen_count", []), || 2i32);
//! ```
//!
//! # Raw bindings
//!
//! Anything `Fn(&mut CallContext) -> Result<(), CallError>` can be bound with
//! [`MethodBind::raw`] or [`MethodBind::vararg`], declaring argument metadata
//! by hand.

use std::borrow::Cow;
use std::marker::PhantomData;

use crate::convert::{FromVariant, ToVariant, VariantTyped};
use crate::error::{CallError, RegistrationError};
use crate::flags::MethodFlags;
use crate::info::{MethodInfo, PropertyInfo};
use crate::object::Object;
use crate::runtime::{CallContext, NativeFn};
use crate::variant::{Variant, VariantType};

/// Receiver kind of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Requires a receiver; fixed arity.
    Instance,
    /// No receiver; fixed arity.
    Static,
    /// Fixed argument prefix followed by any number of extra arguments.
    /// Requires a receiver unless flagged [`MethodFlags::STATIC`].
    Vararg,
}

/// Name and argument names of a method being bound.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodDefinition {
    pub name: String,
    pub args: Vec<String>,
}

impl MethodDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>) -> Self {
        self.args.push(name.into());
        self
    }
}

impl From<&str> for MethodDefinition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MethodDefinition {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl<const N: usize> From<(&str, [&str; N])> for MethodDefinition {
    fn from((name, args): (&str, [&str; N])) -> Self {
        Self {
            name: name.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }
}

/// Static shape of a typed binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub kind: MethodKind,
    pub arguments: Vec<VariantType>,
    pub return_type: VariantType,
    pub is_const: bool,
}

/// A callable bound to a class under a method name.
#[derive(Debug, Clone)]
pub struct MethodBind {
    name: String,
    instance_class: String,
    kind: MethodKind,
    flags: MethodFlags,
    arguments: Vec<PropertyInfo>,
    return_value: PropertyInfo,
    default_arguments: Vec<Variant>,
    func: NativeFn,
}

impl MethodBind {
    /// Binding around a raw callable; declare arguments with
    /// [`with_arguments`](Self::with_arguments).
    pub fn raw<F>(name: impl Into<String>, kind: MethodKind, f: F) -> Self
    where
        F: Fn(&mut CallContext) -> Result<(), CallError> + Send + Sync + 'static,
    {
        let mut flags = MethodFlags::DEFAULT;
        match kind {
            MethodKind::Static => flags |= MethodFlags::STATIC,
            MethodKind::Vararg => flags |= MethodFlags::VARARG,
            MethodKind::Instance => {}
        }
        Self {
            name: name.into(),
            instance_class: String::new(),
            kind,
            flags,
            arguments: Vec::new(),
            return_value: PropertyInfo::returning(VariantType::Nil),
            default_arguments: Vec::new(),
            func: NativeFn::new(f),
        }
    }

    /// Vararg binding; arguments declared with `with_arguments` form the
    /// fixed prefix.
    pub fn vararg<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut CallContext) -> Result<(), CallError> + Send + Sync + 'static,
    {
        Self::raw(name, MethodKind::Vararg, f)
    }

    /// Binding built from a typed function or closure.
    ///
    /// Argument names come from `def`; unnamed arguments are called `arg0`,
    /// `arg1`, ...
    pub fn from_method<T, M, F>(def: impl Into<MethodDefinition>, f: F) -> Self
    where
        F: IntoMethod<T, M>,
    {
        let def = def.into();
        let signature = F::signature();
        let arguments = signature
            .arguments
            .iter()
            .enumerate()
            .map(|(i, ty)| {
                let name = def.args.get(i).cloned().unwrap_or_else(|| format!("arg{}", i));
                PropertyInfo::new(*ty, name)
            })
            .collect();

        let mut flags = MethodFlags::DEFAULT;
        if signature.is_const {
            flags |= MethodFlags::CONST;
        }
        if signature.kind == MethodKind::Static {
            flags |= MethodFlags::STATIC;
        }

        Self {
            name: def.name,
            instance_class: String::new(),
            kind: signature.kind,
            flags,
            arguments,
            return_value: PropertyInfo::returning(signature.return_type),
            default_arguments: Vec::new(),
            func: f.into_native_fn(),
        }
    }

    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = PropertyInfo>) -> Self {
        self.arguments = arguments.into_iter().collect();
        self
    }

    pub fn with_return(mut self, return_value: PropertyInfo) -> Self {
        self.return_value = return_value;
        self
    }

    /// Defaults for the trailing arguments, in declaration order.
    pub fn with_defaults(mut self, defaults: impl IntoIterator<Item = Variant>) -> Self {
        self.default_arguments = defaults.into_iter().collect();
        self
    }

    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class the binding is registered on; empty until registered.
    pub fn instance_class(&self) -> &str {
        &self.instance_class
    }

    pub fn set_instance_class(&mut self, class: impl Into<String>) {
        self.instance_class = class.into();
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn flags(&self) -> MethodFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: MethodFlags) {
        self.flags = flags;
    }

    pub fn arguments(&self) -> &[PropertyInfo] {
        &self.arguments
    }

    /// Declared argument count (the fixed prefix for vararg bindings).
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub fn argument_type(&self, index: usize) -> Option<VariantType> {
        self.arguments.get(index).map(|a| a.variant_type)
    }

    pub fn return_info(&self) -> &PropertyInfo {
        &self.return_value
    }

    pub fn default_arguments(&self) -> &[Variant] {
        &self.default_arguments
    }

    /// Default value for the argument at `index`, if it has one.
    pub fn default_argument(&self, index: usize) -> Option<&Variant> {
        index
            .checked_sub(self.required_argument_count())
            .and_then(|i| self.default_arguments.get(i))
    }

    /// Number of arguments a caller must supply.
    pub fn required_argument_count(&self) -> usize {
        self.arguments.len().saturating_sub(self.default_arguments.len())
    }

    pub fn is_vararg(&self) -> bool {
        self.kind == MethodKind::Vararg
    }

    pub fn is_static(&self) -> bool {
        self.kind == MethodKind::Static || self.flags.contains(MethodFlags::STATIC)
    }

    pub fn is_const(&self) -> bool {
        self.flags.contains(MethodFlags::CONST)
    }

    pub fn requires_instance(&self) -> bool {
        !self.is_static()
    }

    /// Signature metadata of this binding.
    pub fn info(&self) -> MethodInfo {
        MethodInfo {
            name: self.name.clone(),
            flags: self.flags,
            return_value: self.return_value.clone(),
            arguments: self.arguments.clone(),
            default_arguments: self.default_arguments.clone(),
        }
    }

    /// Reject bindings whose default list is longer than their argument list.
    pub fn check(&self) -> Result<(), RegistrationError> {
        if self.default_arguments.len() > self.arguments.len() {
            return Err(RegistrationError::TooManyDefaults {
                method: self.name.clone(),
                arity: self.arguments.len(),
                defaults: self.default_arguments.len(),
            });
        }
        Ok(())
    }

    // ==========================================================================
    // Invocation
    // ==========================================================================

    /// Invoke the binding.
    ///
    /// Missing trailing arguments are filled from the default list, the
    /// argument count is checked against the declared arity and every
    /// declared argument is type-checked before the callable runs.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(
        &self,
        target: Option<&mut (dyn Object + 'static)>,
        args: &[Variant],
    ) -> Result<Variant, CallError> {
        let arity = self.arguments.len();
        let required = self.required_argument_count();

        if args.len() < required {
            return Err(CallError::TooFewArguments {
                expected: required,
                got: args.len(),
            });
        }
        if !self.is_vararg() && args.len() > arity {
            return Err(CallError::TooManyArguments {
                expected: arity,
                got: args.len(),
            });
        }

        let target = if self.requires_instance() {
            Some(target.ok_or_else(|| CallError::InstanceIsNull(self.name.clone()))?)
        } else {
            None
        };

        let args: Cow<'_, [Variant]> = if args.len() < arity {
            let mut filled = args.to_vec();
            filled.extend_from_slice(&self.default_arguments[args.len() - required..]);
            Cow::Owned(filled)
        } else {
            Cow::Borrowed(args)
        };

        for (index, (value, declared)) in args.iter().zip(&self.arguments).enumerate() {
            if !value.get_type().can_convert_to(declared.variant_type) {
                return Err(CallError::InvalidArgument {
                    index,
                    expected: declared.variant_type,
                    got: value.get_type(),
                });
            }
        }

        let mut ctx = CallContext::new(target, &args);
        self.func.call(&mut ctx)?;
        Ok(ctx.into_return())
    }
}

// ============================================================================
// Typed conversion
// ============================================================================

/// Marker for functions taking `&T` as receiver.
pub struct RefReceiver<Args>(PhantomData<fn() -> Args>);

/// Marker for functions taking `&mut T` as receiver.
pub struct MutReceiver<Args>(PhantomData<fn() -> Args>);

/// Marker for functions without a receiver.
pub struct NoReceiver<Args>(PhantomData<fn() -> Args>);

/// Conversion of a typed function into a type-erased binding for class `T`.
///
/// `Marker` only disambiguates the blanket implementations.
pub trait IntoMethod<T, Marker>: Send + Sync + 'static {
    fn signature() -> MethodSignature;

    fn into_native_fn(self) -> NativeFn;
}

macro_rules! impl_into_method {
    ($($arg:ident $val:ident $idx:tt),*) => {
        impl<T, F, R, $($arg,)*> IntoMethod<T, RefReceiver<($($arg,)*)>> for F
        where
            T: Object,
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            R: ToVariant + VariantTyped,
            $($arg: FromVariant,)*
        {
            fn signature() -> MethodSignature {
                MethodSignature {
                    kind: MethodKind::Instance,
                    arguments: vec![$(<$arg as VariantTyped>::VARIANT_TYPE),*],
                    return_type: R::VARIANT_TYPE,
                    is_const: true,
                }
            }

            #[allow(unused_variables)]
            fn into_native_fn(self) -> NativeFn {
                NativeFn::new(move |ctx: &mut CallContext| -> Result<(), CallError> {
                    $(let $val = ctx.arg::<$arg>($idx)?;)*
                    let ret = (self)(ctx.this::<T>()?, $($val),*);
                    ctx.set_return(ret);
                    Ok(())
                })
            }
        }

        impl<T, F, R, $($arg,)*> IntoMethod<T, MutReceiver<($($arg,)*)>> for F
        where
            T: Object,
            F: Fn(&mut T, $($arg),*) -> R + Send + Sync + 'static,
            R: ToVariant + VariantTyped,
            $($arg: FromVariant,)*
        {
            fn signature() -> MethodSignature {
                MethodSignature {
                    kind: MethodKind::Instance,
                    arguments: vec![$(<$arg as VariantTyped>::VARIANT_TYPE),*],
                    return_type: R::VARIANT_TYPE,
                    is_const: false,
                }
            }

            #[allow(unused_variables)]
            fn into_native_fn(self) -> NativeFn {
                NativeFn::new(move |ctx: &mut CallContext| -> Result<(), CallError> {
                    $(let $val = ctx.arg::<$arg>($idx)?;)*
                    let ret = (self)(ctx.this_mut::<T>()?, $($val),*);
                    ctx.set_return(ret);
                    Ok(())
                })
            }
        }

        impl<T, F, R, $($arg,)*> IntoMethod<T, NoReceiver<($($arg,)*)>> for F
        where
            T: 'static,
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: ToVariant + VariantTyped,
            $($arg: FromVariant,)*
        {
            fn signature() -> MethodSignature {
                MethodSignature {
                    kind: MethodKind::Static,
                    arguments: vec![$(<$arg as VariantTyped>::VARIANT_TYPE),*],
                    return_type: R::VARIANT_TYPE,
                    is_const: false,
                }
            }

            #[allow(unused_variables)]
            fn into_native_fn(self) -> NativeFn {
                NativeFn::new(move |ctx: &mut CallContext| -> Result<(), CallError> {
                    $(let $val = ctx.arg::<$arg>($idx)?;)*
                    let ret = (self)($($val),*);
                    ctx.set_return(ret);
                    Ok(())
                })
            }
        }
    };
}

impl_into_method!();
impl_into_method!(A0 a0 0);
impl_into_method!(A0 a0 0, A1 a1 1);
impl_into_method!(A0 a0 0, A1 a1 1, A2 a2 2);
impl_into_method!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3);
impl_into_method!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4);
impl_into_method!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::BaseObject;
    use std::any::{Any, TypeId};

    struct Counter {
        base: BaseObject,
        value: i64,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                base: BaseObject::new(),
                value: 0,
            }
        }

        fn get(&self) -> i64 {
            self.value
        }

        fn add(&mut self, amount: i64, times: i32) {
            self.value += amount * times as i64;
        }
    }

    impl Object for Counter {
        fn class_name(&self) -> &'static str {
            "Counter"
        }

        fn cast_ref(&self, type_id: TypeId) -> Option<&dyn Any> {
            if type_id == TypeId::of::<Self>() {
                Some(self as &dyn Any)
            } else {
                self.base.cast_ref(type_id)
            }
        }

        fn cast_mut(&mut self, type_id: TypeId) -> Option<&mut dyn Any> {
            if type_id == TypeId::of::<Self>() {
                Some(self as &mut dyn Any)
            } else {
                self.base.cast_mut(type_id)
            }
        }

        fn base_object(&self) -> &BaseObject {
            &self.base
        }

        fn base_object_mut(&mut self) -> &mut BaseObject {
            &mut self.base
        }
    }

    fn add_bind() -> MethodBind {
        MethodBind::from_method::<Counter, _, _>(("add", ["amount", "times"]), Counter::add)
            .with_defaults([Variant::Int(1)])
    }

    #[test]
    fn typed_signature() {
        let get = MethodBind::from_method::<Counter, _, _>("get", Counter::get);
        assert_eq!(get.kind(), MethodKind::Instance);
        assert!(get.is_const());
        assert_eq!(get.return_info().variant_type, VariantType::Int);

        let add = add_bind();
        assert!(!add.is_const());
        assert_eq!(add.arguments()[0].name, "amount");
        assert_eq!(add.argument_type(1), Some(VariantType::Int));
        assert_eq!(add.required_argument_count(), 1);
        assert_eq!(add.default_argument(1), Some(&Variant::Int(1)));
        assert_eq!(add.default_argument(0), None);
    }

    #[test]
    fn unnamed_arguments_get_positional_names() {
        let bind = MethodBind::from_method::<Counter, _, _>("add", Counter::add);
        assert_eq!(bind.arguments()[0].name, "arg0");
        assert_eq!(bind.arguments()[1].name, "arg1");
    }

    #[test]
    fn call_fills_defaults() {
        let add = add_bind();
        let get = MethodBind::from_method::<Counter, _, _>("get", Counter::get);
        let mut obj: Box<dyn Object> = Box::new(Counter::new());

        add.call(Some(obj.as_mut()), &[Variant::Int(5)]).unwrap();
        add.call(Some(obj.as_mut()), &[Variant::Int(5), Variant::Int(3)])
            .unwrap();
        assert_eq!(get.call(Some(obj.as_mut()), &[]), Ok(Variant::Int(20)));
    }

    #[test]
    fn argument_count_errors() {
        let add = add_bind();
        let mut obj: Box<dyn Object> = Box::new(Counter::new());

        assert_eq!(
            add.call(Some(obj.as_mut()), &[]),
            Err(CallError::TooFewArguments { expected: 1, got: 0 })
        );
        assert_eq!(
            add.call(
                Some(obj.as_mut()),
                &[Variant::Int(1), Variant::Int(1), Variant::Int(1)]
            ),
            Err(CallError::TooManyArguments { expected: 2, got: 3 })
        );
    }

    #[test]
    fn invalid_argument_reports_index() {
        let add = add_bind();
        let mut obj: Box<dyn Object> = Box::new(Counter::new());

        assert_eq!(
            add.call(
                Some(obj.as_mut()),
                &[Variant::Int(1), Variant::String("x".into())]
            ),
            Err(CallError::InvalidArgument {
                index: 1,
                expected: VariantType::Int,
                got: VariantType::String,
            })
        );
    }

    #[test]
    fn instance_binding_needs_target() {
        let get = MethodBind::from_method::<Counter, _, _>("get", Counter::get);
        assert_eq!(
            get.call(None, &[]),
            Err(CallError::InstanceIsNull("get".into()))
        );

        let mut other: Box<dyn Object> = Box::new(BaseObject::new());
        assert!(matches!(
            get.call(Some(other.as_mut()), &[]),
            Err(CallError::InvalidInstance { .. })
        ));
    }

    #[test]
    fn static_binding_ignores_target() {
        let bind = MethodBind::from_method::<Counter, _, _>(
            ("sum", ["a", "b"]),
            |a: i64, b: f64| a as f64 + b,
        );
        assert!(bind.is_static());
        assert!(bind.flags().contains(MethodFlags::STATIC));
        assert_eq!(
            bind.call(None, &[Variant::Int(1), Variant::Int(2)]),
            Ok(Variant::Float(3.0))
        );
    }

    #[test]
    fn vararg_binding_accepts_extra_arguments() {
        let bind = MethodBind::vararg("join", |ctx: &mut CallContext| {
            let sep: String = ctx.arg(0)?;
            let parts: Vec<String> = ctx.varargs(1).iter().map(|v| v.to_string()).collect();
            ctx.set_return(parts.join(&sep));
            Ok(())
        })
        .with_arguments([PropertyInfo::new(VariantType::String, "separator")])
        .with_flags(MethodFlags::VARARG | MethodFlags::STATIC);

        let args = [
            Variant::String("-".into()),
            Variant::Int(1),
            Variant::Bool(true),
            Variant::Float(0.5),
        ];
        assert_eq!(bind.call(None, &args), Ok(Variant::String("1-true-0.5".into())));
        assert_eq!(
            bind.call(None, &[]),
            Err(CallError::TooFewArguments { expected: 1, got: 0 })
        );
    }

    #[test]
    fn raw_binding_errors_propagate() {
        let bind = MethodBind::raw("fail", MethodKind::Static, |_ctx: &mut CallContext| {
            Err(CallError::failed("boom"))
        });
        assert_eq!(bind.call(None, &[]), Err(CallError::Failed("boom".into())));
    }

    #[test]
    fn too_many_defaults_rejected() {
        let bind = MethodBind::from_method::<Counter, _, _>("get", Counter::get)
            .with_defaults([Variant::Int(0)]);
        assert!(matches!(
            bind.check(),
            Err(RegistrationError::TooManyDefaults { arity: 0, defaults: 1, .. })
        ));
        assert!(add_bind().check().is_ok());
    }
}
