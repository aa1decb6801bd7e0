//! Typed class registration.
//!
//! Native classes implement [`RegisterClass`] and are registered with
//! [`ClassDb::register_class`] and friends. Registration adds the class
//! skeleton, hands a [`ClassBuilder`] to [`RegisterClass::bind_members`] and
//! marks the class initialized once every member is bound. A failure while
//! binding rolls the class back.
//!
//! # Example
//!
//! ```
//! use classdb_registry::{ClassBuilder, ClassDb, RegisterClass, RegistrationError};
//! use classdb_registry::{BaseObject, Object, StaticClass, Variant};
//! use std::any::{Any, TypeId};
//!
//! #[derive(Default)]
//! struct Timer {
//!     base: BaseObject,
//!     wait_time: f64,
//! }
//!
//! impl StaticClass for Timer {
//!     const CLASS_NAME: &'static str = "Timer";
//!     const PARENT_CLASS_NAME: &'static str = "Object";
//! }
//!
//! impl Object for Timer {
//!     fn class_name(&self) -> &'static str { Self::CLASS_NAME }
//!     fn cast_ref(&self, id: TypeId) -> Option<&dyn Any> {
//!         if id == TypeId::of::<Self>() { Some(self as &dyn Any) } else { self.base.cast_ref(id) }
//!     }
//!     fn cast_mut(&mut self, id: TypeId) -> Option<&mut dyn Any> {
//!         if id == TypeId::of::<Self>() { Some(self as &mut dyn Any) } else { self.base.cast_mut(id) }
//!     }
//!     fn base_object(&self) -> &BaseObject { &self.base }
//!     fn base_object_mut(&mut self) -> &mut BaseObject { &mut self.base }
//! }
//!
//! impl RegisterClass for Timer {
//!     fn bind_members(class: ClassBuilder<'_, Self>) -> Result<(), RegistrationError> {
//!         class
//!             .method(("set_wait_time", ["seconds"]), |t: &mut Timer, s: f64| t.wait_time = s)?
//!             .method("get_wait_time", |t: &Timer| t.wait_time)?
//!             .property_float("wait_time", "set_wait_time", "get_wait_time")?;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = ClassDb::with_core_classes()?;
//! db.register_class::<Timer>()?;
//!
//! let mut timer = db.instantiate("Timer")?;
//! db.set_property(timer.as_mut(), "wait_time", Variant::Float(2.5))?;
//! assert_eq!(timer.downcast_ref::<Timer>().map(|t| t.wait_time), Some(2.5));
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use classdb_core::{
    BaseObject, CallContext, CallError, ClassEntry, ClassFactory, ClassId, IntoMethod, MethodBind,
    MethodDefinition, MethodFlags, MethodInfo, MethodKind, NoReceiver, Object, PropertyInfo,
    PropertyUsage, RegistrationError, StaticClass, Variant, VariantType,
};

use crate::config::ClassDbConfig;
use crate::registry::{ClassDb, reject};

/// A native class that knows how to bind its own members.
pub trait RegisterClass: StaticClass + Object + Sized {
    /// Bind methods, properties, signals and constants of this class.
    ///
    /// Members of ancestors are inherited and must not be bound again.
    fn bind_members(_class: ClassBuilder<'_, Self>) -> Result<(), RegistrationError> {
        Ok(())
    }
}

/// Fluent binder for the members of class `T`.
///
/// Every call registers immediately and returns the builder back, so a
/// failing member stops the chain with `?`.
pub struct ClassBuilder<'db, T> {
    db: &'db ClassDb,
    _marker: PhantomData<fn() -> T>,
}

impl<'db, T: StaticClass + Object> ClassBuilder<'db, T> {
    pub(crate) fn new(db: &'db ClassDb) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    pub fn class_name(&self) -> &'static str {
        T::CLASS_NAME
    }

    pub fn db(&self) -> &'db ClassDb {
        self.db
    }

    // ==========================================================================
    // Methods
    // ==========================================================================

    /// Bind a method taking `&T`, `&mut T` or no receiver.
    pub fn method<M, F>(self, def: impl Into<MethodDefinition>, f: F) -> Result<Self, RegistrationError>
    where
        F: IntoMethod<T, M>,
    {
        self.db.bind_method::<T, M, F>(def, f, [])?;
        Ok(self)
    }

    /// Bind a method whose trailing arguments have defaults.
    pub fn method_with_defaults<M, F>(
        self,
        def: impl Into<MethodDefinition>,
        f: F,
        defaults: impl IntoIterator<Item = Variant>,
    ) -> Result<Self, RegistrationError>
    where
        F: IntoMethod<T, M>,
    {
        self.db.bind_method::<T, M, F>(def, f, defaults)?;
        Ok(self)
    }

    pub fn static_method<Args, F>(
        self,
        def: impl Into<MethodDefinition>,
        f: F,
    ) -> Result<Self, RegistrationError>
    where
        F: IntoMethod<T, NoReceiver<Args>>,
    {
        self.db.bind_static_method::<T, Args, F>(def, f, [])?;
        Ok(self)
    }

    pub fn vararg_method<F>(self, info: MethodInfo, f: F) -> Result<Self, RegistrationError>
    where
        F: Fn(&mut CallContext) -> Result<(), CallError> + Send + Sync + 'static,
    {
        self.db.bind_vararg_method(T::CLASS_NAME, info, f)?;
        Ok(self)
    }

    /// Bind a prebuilt method.
    pub fn bind(self, bind: MethodBind) -> Result<Self, RegistrationError> {
        self.db.bind_method_custom(T::CLASS_NAME, bind)?;
        Ok(self)
    }

    pub fn virtual_method(self, info: MethodInfo) -> Result<Self, RegistrationError> {
        self.db.add_virtual_method(T::CLASS_NAME, info)?;
        Ok(self)
    }

    // ==========================================================================
    // Properties
    // ==========================================================================

    pub fn property(
        self,
        info: PropertyInfo,
        setter: &str,
        getter: &str,
    ) -> Result<Self, RegistrationError> {
        self.db.add_property(T::CLASS_NAME, info, setter, getter, -1)?;
        Ok(self)
    }

    /// Property served by an accessor pair shared between several
    /// properties and told apart by `index`.
    pub fn indexed_property(
        self,
        info: PropertyInfo,
        setter: &str,
        getter: &str,
        index: i64,
    ) -> Result<Self, RegistrationError> {
        self.db.add_property(T::CLASS_NAME, info, setter, getter, index)?;
        Ok(self)
    }

    pub fn property_int(self, name: &str, setter: &str, getter: &str) -> Result<Self, RegistrationError> {
        self.property(PropertyInfo::new(VariantType::Int, name), setter, getter)
    }

    pub fn property_float(
        self,
        name: &str,
        setter: &str,
        getter: &str,
    ) -> Result<Self, RegistrationError> {
        self.property(PropertyInfo::new(VariantType::Float, name), setter, getter)
    }

    pub fn group(self, name: &str, prefix: &str) -> Result<Self, RegistrationError> {
        self.db.add_property_group(T::CLASS_NAME, name, prefix)?;
        Ok(self)
    }

    pub fn subgroup(self, name: &str, prefix: &str) -> Result<Self, RegistrationError> {
        self.db.add_property_subgroup(T::CLASS_NAME, name, prefix)?;
        Ok(self)
    }

    /// Count property of a property array, stored and shown in the editor.
    pub fn array_count(
        self,
        label: &str,
        count_property: &str,
        setter: &str,
        getter: &str,
        element_prefix: &str,
    ) -> Result<Self, RegistrationError> {
        self.db.add_property_array_count(
            T::CLASS_NAME,
            label,
            count_property,
            setter,
            getter,
            element_prefix,
            PropertyUsage::DEFAULT,
        )?;
        Ok(self)
    }

    pub fn property_array(self, path: &str, element_prefix: &str) -> Result<Self, RegistrationError> {
        self.db.add_property_array(T::CLASS_NAME, path, element_prefix)?;
        Ok(self)
    }

    pub fn default_value(self, property: &str, value: Variant) -> Result<Self, RegistrationError> {
        self.db.set_property_default_value(T::CLASS_NAME, property, value)?;
        Ok(self)
    }

    // ==========================================================================
    // Signals and constants
    // ==========================================================================

    pub fn signal(self, signal: MethodInfo) -> Result<Self, RegistrationError> {
        self.db.add_signal(T::CLASS_NAME, signal)?;
        Ok(self)
    }

    pub fn constant(self, name: &str, value: i64) -> Result<Self, RegistrationError> {
        self.db.bind_integer_constant(T::CLASS_NAME, "", name, value)?;
        Ok(self)
    }

    pub fn enum_constant(
        self,
        enum_name: &str,
        name: &str,
        value: i64,
    ) -> Result<Self, RegistrationError> {
        self.db.bind_integer_constant(T::CLASS_NAME, enum_name, name, value)?;
        Ok(self)
    }
}

/// How a class finishing registration can be instantiated.
struct Finish {
    factory: Option<ClassFactory>,
    is_virtual: bool,
    exposed: bool,
}

fn default_factory<T: Object + Default>() -> ClassFactory {
    Arc::new(|| Box::new(T::default()) as Box<dyn Object>)
}

impl ClassDb {
    /// Builder binding further members on the already registered class `T`.
    pub fn class<T: StaticClass + Object>(&self) -> ClassBuilder<'_, T> {
        ClassBuilder::new(self)
    }

    // ==========================================================================
    // Typed registration
    // ==========================================================================

    /// Register an instantiable class created with `T::default()`.
    pub fn register_class<T: RegisterClass + Default>(&self) -> Result<ClassId, RegistrationError> {
        self.register_typed::<T>(Finish {
            factory: Some(default_factory::<T>()),
            is_virtual: false,
            exposed: true,
        })
    }

    /// Register a class that is exposed but cannot be instantiated by name;
    /// it exists to be extended.
    pub fn register_virtual_class<T: RegisterClass + Default>(
        &self,
    ) -> Result<ClassId, RegistrationError> {
        self.register_typed::<T>(Finish {
            factory: Some(default_factory::<T>()),
            is_virtual: true,
            exposed: true,
        })
    }

    /// Register a class without a factory.
    pub fn register_abstract_class<T: RegisterClass>(&self) -> Result<ClassId, RegistrationError> {
        self.register_typed::<T>(Finish {
            factory: None,
            is_virtual: false,
            exposed: true,
        })
    }

    /// Register a class instantiated through `factory` instead of `Default`.
    pub fn register_custom_instance_class<T, F>(&self, factory: F) -> Result<ClassId, RegistrationError>
    where
        T: RegisterClass,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_typed::<T>(Finish {
            factory: Some(Arc::new(move || Box::new(factory()) as Box<dyn Object>)),
            is_virtual: false,
            exposed: true,
        })
    }

    /// Register an instantiable class hidden from scripts and the API hash.
    pub fn register_internal_class<T: RegisterClass + Default>(
        &self,
    ) -> Result<ClassId, RegistrationError> {
        self.register_typed::<T>(Finish {
            factory: Some(default_factory::<T>()),
            is_virtual: false,
            exposed: false,
        })
    }

    fn register_typed<T: RegisterClass>(&self, finish: Finish) -> Result<ClassId, RegistrationError> {
        let (id, added) = {
            let mut table = self.write();
            match table.id_of(T::CLASS_NAME) {
                Some(id) => {
                    if let Some(entry) = table.get(id) {
                        if entry.initialized {
                            return reject(RegistrationError::DuplicateClass(T::CLASS_NAME.to_owned()));
                        }
                        if entry.parent_name != T::PARENT_CLASS_NAME {
                            return reject(RegistrationError::ParentMismatch {
                                class: T::CLASS_NAME.to_owned(),
                                declared: T::PARENT_CLASS_NAME.to_owned(),
                                registered: entry.parent_name.clone(),
                            });
                        }
                    }
                    (id, false)
                }
                None => {
                    let api = table.current_api;
                    let entry = ClassEntry::new(T::CLASS_NAME, T::PARENT_CLASS_NAME, None, api);
                    (Self::add_class_locked(&mut table, entry)?, true)
                }
            }
        };

        if let Err(err) = T::bind_members(ClassBuilder::new(self)) {
            if added {
                self.remove_class(T::CLASS_NAME);
            } else if let Some(entry) = self.write().find_mut(T::CLASS_NAME) {
                entry.clear_members();
            }
            log::error!("registration of '{}' rolled back: {}", T::CLASS_NAME, err);
            return Err(err);
        }

        self.finish_registration(T::CLASS_NAME, finish)?;
        Ok(id)
    }

    fn finish_registration(&self, class: &str, finish: Finish) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = match table.expect_mut(class) {
            Ok(entry) => entry,
            Err(err) => return reject(err),
        };
        if entry.initialized {
            return reject(RegistrationError::DuplicateClass(class.to_owned()));
        }
        entry.factory = finish.factory;
        entry.is_virtual = finish.is_virtual;
        entry.exposed = finish.exposed;
        entry.initialized = true;
        log::debug!(
            "initialized class '{}' ({} methods, {} properties)",
            class,
            entry.methods.len(),
            entry.property_map.len()
        );
        Ok(())
    }

    // ==========================================================================
    // Name-based registration
    // ==========================================================================
    //
    // These finish a skeleton created with `add_class` whose members were
    // bound by name.

    pub fn register_concrete<F>(&self, class: &str, factory: F) -> Result<(), RegistrationError>
    where
        F: Fn() -> Box<dyn Object> + Send + Sync + 'static,
    {
        self.finish_registration(
            class,
            Finish {
                factory: Some(Arc::new(factory)),
                is_virtual: false,
                exposed: true,
            },
        )
    }

    pub fn register_abstract(&self, class: &str) -> Result<(), RegistrationError> {
        self.finish_registration(
            class,
            Finish {
                factory: None,
                is_virtual: false,
                exposed: true,
            },
        )
    }

    /// Finish `class` with a factory shared with other registrations.
    pub fn register_with_custom_factory(
        &self,
        class: &str,
        factory: ClassFactory,
    ) -> Result<(), RegistrationError> {
        self.finish_registration(
            class,
            Finish {
                factory: Some(factory),
                is_virtual: false,
                exposed: true,
            },
        )
    }

    // ==========================================================================
    // Core classes
    // ==========================================================================

    /// Registry holding the root `Object` class.
    pub fn with_core_classes() -> Result<Self, RegistrationError> {
        Self::with_core_classes_and_config(ClassDbConfig::new())
    }

    pub fn with_core_classes_and_config(config: ClassDbConfig) -> Result<Self, RegistrationError> {
        let db = Self::with_config(config);
        db.register_core_classes()?;
        Ok(db)
    }

    /// Register the root `Object` class and its methods.
    pub fn register_core_classes(&self) -> Result<(), RegistrationError> {
        self.register_class::<BaseObject>()?;
        Ok(())
    }
}

impl RegisterClass for BaseObject {
    fn bind_members(class: ClassBuilder<'_, Self>) -> Result<(), RegistrationError> {
        let core = MethodFlags::DEFAULT | MethodFlags::CONST | MethodFlags::OBJECT_CORE;

        let get_class = MethodBind::raw("get_class", MethodKind::Instance, |ctx| {
            let class = ctx.object()?.get_class().to_owned();
            ctx.set_return(class);
            Ok(())
        })
        .with_return(PropertyInfo::returning(VariantType::String))
        .with_flags(core);

        let get_instance_id = MethodBind::from_method::<BaseObject, _, _>(
            "get_instance_id",
            |object: &BaseObject| object.id().as_u64() as i64,
        )
        .with_flags(core);

        class.bind(get_class)?.bind(get_instance_id)?;
        Ok(())
    }
}
