//! Methods, signals, constants and enums.
//!
//! Binding takes the write lock once per member. Lookups walk the class
//! chain from the most-derived class upward and stop at the first match, so
//! a subclass member shadows an ancestor member of the same name.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use classdb_core::{
    CallError, ClassDbError, IntoMethod, LookupError, MethodBind, MethodDefinition, MethodFlags,
    MethodInfo, NoReceiver, Object, RegistrationError, StaticClass, Variant,
};

use crate::registry::{ClassDb, reject};

impl ClassDb {
    // ==========================================================================
    // Method binding
    // ==========================================================================

    /// Bind a typed method of `T` with optional trailing defaults.
    pub fn bind_method<T, M, F>(
        &self,
        def: impl Into<MethodDefinition>,
        f: F,
        defaults: impl IntoIterator<Item = Variant>,
    ) -> Result<Arc<MethodBind>, RegistrationError>
    where
        T: StaticClass + Object,
        F: IntoMethod<T, M>,
    {
        let bind = MethodBind::from_method::<T, M, F>(def, f).with_defaults(defaults);
        self.bind_method_custom(T::CLASS_NAME, bind)
    }

    /// Bind a receiver-less function of `T`.
    pub fn bind_static_method<T, Args, F>(
        &self,
        def: impl Into<MethodDefinition>,
        f: F,
        defaults: impl IntoIterator<Item = Variant>,
    ) -> Result<Arc<MethodBind>, RegistrationError>
    where
        T: StaticClass + 'static,
        F: IntoMethod<T, NoReceiver<Args>>,
    {
        let bind = MethodBind::from_method::<T, NoReceiver<Args>, F>(def, f).with_defaults(defaults);
        self.bind_method_custom(T::CLASS_NAME, bind)
    }

    /// Bind a vararg method; `info.arguments` is the fixed prefix.
    pub fn bind_vararg_method<F>(
        &self,
        class: &str,
        info: MethodInfo,
        f: F,
    ) -> Result<Arc<MethodBind>, RegistrationError>
    where
        F: Fn(&mut classdb_core::CallContext) -> Result<(), CallError> + Send + Sync + 'static,
    {
        let bind = MethodBind::vararg(info.name, f)
            .with_arguments(info.arguments)
            .with_return(info.return_value)
            .with_defaults(info.default_arguments)
            .with_flags(info.flags | MethodFlags::VARARG);
        self.bind_method_custom(class, bind)
    }

    /// Register a prebuilt binding on `class`.
    ///
    /// Fails if `class` is unknown, the name is already bound on `class`, or
    /// the binding declares more defaults than arguments. A failed bind
    /// leaves the existing binding untouched.
    pub fn bind_method_custom(
        &self,
        class: &str,
        mut bind: MethodBind,
    ) -> Result<Arc<MethodBind>, RegistrationError> {
        if let Err(err) = bind.check() {
            return reject(err);
        }

        let mut table = self.write();
        let entry = match table.expect_mut(class) {
            Ok(entry) => entry,
            Err(err) => return reject(err),
        };
        if entry.methods.contains_key(bind.name()) {
            return reject(RegistrationError::DuplicateMethod {
                class: class.to_owned(),
                method: bind.name().to_owned(),
            });
        }

        bind.set_instance_class(class);
        let name = bind.name().to_owned();
        let bind = Arc::new(bind);
        entry.methods.insert(name.clone(), Arc::clone(&bind));
        entry.method_order.push(name);
        log::debug!("bound method {}::{}", class, bind.name());
        Ok(bind)
    }

    pub fn set_method_flags(
        &self,
        class: &str,
        method: &str,
        flags: MethodFlags,
    ) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = table.expect_mut(class)?;
        let Some(bind) = entry.methods.get_mut(method) else {
            return reject(RegistrationError::MethodNotFound {
                class: class.to_owned(),
                method: method.to_owned(),
            });
        };
        Arc::make_mut(bind).set_flags(flags);
        table.reset_accessor_resolution();
        Ok(())
    }

    /// Declare a method that scripts or extensions are expected to override.
    pub fn add_virtual_method(&self, class: &str, info: MethodInfo) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = table.expect_mut(class)?;
        if entry.virtual_methods.iter().any(|m| m.name == info.name) {
            return reject(RegistrationError::DuplicateVirtualMethod {
                class: class.to_owned(),
                method: info.name,
            });
        }
        let flags = info.flags | MethodFlags::VIRTUAL;
        entry.virtual_methods.push(info.with_flags(flags));
        Ok(())
    }

    pub fn get_virtual_methods(
        &self,
        class: &str,
        no_inheritance: bool,
    ) -> Result<Vec<MethodInfo>, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        let depth = if no_inheritance { 1 } else { usize::MAX };
        let mut seen = FxHashSet::default();
        Ok(table
            .ancestors(class)
            .take(depth)
            .flat_map(|entry| entry.virtual_methods.iter())
            .filter(|m| seen.insert(m.name.clone()))
            .cloned()
            .collect())
    }

    /// Record the error codes a bound method may return.
    pub fn set_method_error_return_values(
        &self,
        class: &str,
        method: &str,
        values: Vec<i64>,
    ) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = table.expect_mut(class)?;
        if !entry.methods.contains_key(method) {
            return reject(RegistrationError::MethodNotFound {
                class: class.to_owned(),
                method: method.to_owned(),
            });
        }
        entry.method_error_values.insert(method.to_owned(), values);
        Ok(())
    }

    /// Error codes recorded for a method; empty when none were recorded.
    pub fn get_method_error_return_values(&self, class: &str, method: &str) -> Vec<i64> {
        self.read()
            .find(class)
            .and_then(|entry| entry.method_error_values.get(method).cloned())
            .unwrap_or_default()
    }

    // ==========================================================================
    // Method lookup
    // ==========================================================================

    /// Find a binding on `class` or its nearest ancestor that has one.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_method(&self, class: &str, method: &str) -> Result<Arc<MethodBind>, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        table
            .find_in_chain(class, false, |entry| entry.methods.get(method).cloned())
            .ok_or_else(|| LookupError::UnknownMethod {
                class: class.to_owned(),
                method: method.to_owned(),
            })
    }

    pub fn has_method(&self, class: &str, method: &str, no_inheritance: bool) -> bool {
        self.read()
            .find_in_chain(class, no_inheritance, |entry| {
                entry.methods.contains_key(method).then_some(())
            })
            .is_some()
    }

    pub fn get_method_info(
        &self,
        class: &str,
        method: &str,
        no_inheritance: bool,
    ) -> Result<MethodInfo, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        table
            .find_in_chain(class, no_inheritance, |entry| {
                entry.methods.get(method).map(|bind| bind.info())
            })
            .ok_or_else(|| LookupError::UnknownMethod {
                class: class.to_owned(),
                method: method.to_owned(),
            })
    }

    /// Method signatures of `class`, most-derived first, declaration order
    /// within a class. Shadowed ancestor methods are omitted; accessors of
    /// properties are omitted when `exclude_from_properties` is set.
    pub fn get_method_list(
        &self,
        class: &str,
        no_inheritance: bool,
        exclude_from_properties: bool,
    ) -> Result<Vec<MethodInfo>, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        let depth = if no_inheritance { 1 } else { usize::MAX };
        let mut seen = FxHashSet::default();
        let mut list = Vec::new();
        for entry in table.ancestors(class).take(depth) {
            for bind in entry.ordered_methods() {
                if exclude_from_properties && entry.methods_in_properties.contains(bind.name()) {
                    continue;
                }
                if seen.insert(bind.name().to_owned()) {
                    list.push(bind.info());
                }
            }
        }
        Ok(list)
    }

    /// Call `method` on a live object, resolving it from the object's class.
    ///
    /// The binding runs after the registry lock is released.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call_method(
        &self,
        object: &mut (dyn Object + 'static),
        method: &str,
        args: &[Variant],
    ) -> Result<Variant, ClassDbError> {
        let bind = self.get_method(object.get_class(), method)?;
        Ok(bind.call(Some(object), args)?)
    }

    // ==========================================================================
    // Signals
    // ==========================================================================

    pub fn add_signal(&self, class: &str, signal: MethodInfo) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = table.expect_mut(class)?;
        if entry.signals.contains_key(&signal.name) {
            return reject(RegistrationError::DuplicateSignal {
                class: class.to_owned(),
                signal: signal.name,
            });
        }
        entry.signal_order.push(signal.name.clone());
        entry.signals.insert(signal.name.clone(), signal);
        Ok(())
    }

    pub fn has_signal(&self, class: &str, signal: &str, no_inheritance: bool) -> bool {
        self.read()
            .find_in_chain(class, no_inheritance, |entry| {
                entry.signals.contains_key(signal).then_some(())
            })
            .is_some()
    }

    pub fn get_signal(&self, class: &str, signal: &str) -> Result<MethodInfo, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        table
            .find_in_chain(class, false, |entry| entry.signals.get(signal).cloned())
            .ok_or_else(|| LookupError::UnknownSignal {
                class: class.to_owned(),
                signal: signal.to_owned(),
            })
    }

    pub fn get_signal_list(
        &self,
        class: &str,
        no_inheritance: bool,
    ) -> Result<Vec<MethodInfo>, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        let depth = if no_inheritance { 1 } else { usize::MAX };
        let mut seen = FxHashSet::default();
        Ok(table
            .ancestors(class)
            .take(depth)
            .flat_map(|entry| entry.ordered_signals())
            .filter(|s| seen.insert(s.name.clone()))
            .cloned()
            .collect())
    }

    // ==========================================================================
    // Constants and enums
    // ==========================================================================

    /// Bind an integer constant, optionally as a member of `enum_name`.
    pub fn bind_integer_constant(
        &self,
        class: &str,
        enum_name: &str,
        name: &str,
        value: i64,
    ) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = table.expect_mut(class)?;
        if entry.constants.contains_key(name) {
            return reject(RegistrationError::DuplicateConstant {
                class: class.to_owned(),
                constant: name.to_owned(),
            });
        }
        entry.constants.insert(name.to_owned(), value);
        entry.constant_order.push(name.to_owned());

        if !enum_name.is_empty() {
            if !entry.enums.contains_key(enum_name) {
                entry.enum_order.push(enum_name.to_owned());
            }
            entry
                .enums
                .entry(enum_name.to_owned())
                .or_default()
                .push(name.to_owned());
        }
        Ok(())
    }

    pub fn get_integer_constant(&self, class: &str, name: &str) -> Result<i64, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        table
            .find_in_chain(class, false, |entry| entry.constants.get(name).copied())
            .ok_or_else(|| LookupError::UnknownConstant {
                class: class.to_owned(),
                constant: name.to_owned(),
            })
    }

    pub fn has_integer_constant(&self, class: &str, name: &str, no_inheritance: bool) -> bool {
        self.read()
            .find_in_chain(class, no_inheritance, |entry| entry.constants.get(name))
            .is_some()
    }

    /// Constant names, most-derived class first, declaration order within
    /// a class.
    pub fn get_integer_constant_list(
        &self,
        class: &str,
        no_inheritance: bool,
    ) -> Result<Vec<String>, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        let depth = if no_inheritance { 1 } else { usize::MAX };
        Ok(table
            .ancestors(class)
            .take(depth)
            .flat_map(|entry| entry.constant_order.iter().cloned())
            .collect())
    }

    /// Enum that owns constant `name`, if it belongs to one.
    pub fn get_integer_constant_enum(
        &self,
        class: &str,
        name: &str,
        no_inheritance: bool,
    ) -> Option<String> {
        self.read().find_in_chain(class, no_inheritance, |entry| {
            entry.enum_of_constant(name).map(str::to_owned)
        })
    }

    pub fn get_enum_list(&self, class: &str, no_inheritance: bool) -> Result<Vec<String>, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        let depth = if no_inheritance { 1 } else { usize::MAX };
        Ok(table
            .ancestors(class)
            .take(depth)
            .flat_map(|entry| entry.enum_order.iter().cloned())
            .collect())
    }

    pub fn get_enum_constants(
        &self,
        class: &str,
        enum_name: &str,
        no_inheritance: bool,
    ) -> Result<Vec<String>, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        table
            .find_in_chain(class, no_inheritance, |entry| entry.enums.get(enum_name).cloned())
            .ok_or_else(|| LookupError::UnknownEnum {
                class: class.to_owned(),
                enum_name: enum_name.to_owned(),
            })
    }

    pub fn has_enum(&self, class: &str, enum_name: &str, no_inheritance: bool) -> bool {
        self.read()
            .find_in_chain(class, no_inheritance, |entry| entry.enums.get(enum_name))
            .is_some()
    }
}
