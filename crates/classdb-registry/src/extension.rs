//! Classes provided by extension libraries.
//!
//! An extension class is registered in one step from an
//! [`ExtensionClassInfo`]. Its factory creates the nearest native ancestor
//! and lets the extension attach its own instance data, so objects of
//! extension classes are ordinary native objects that report the extension
//! class through [`Object::get_class`].

use std::any::Any;
use std::sync::Arc;

use classdb_core::{
    ApiType, ClassDbError, ClassEntry, ClassFactory, ClassId, ExtensionClassInfo,
    ExtensionInstance, Object, RegistrationError,
};

use crate::registry::{ClassDb, ClassTable, reject};

/// Factory of the nearest non-extension class in the chain starting at
/// `class`.
fn native_factory(table: &ClassTable, class: &str) -> Option<ClassFactory> {
    table
        .ancestors(class)
        .filter(|entry| !entry.is_extension())
        .find_map(|entry| entry.factory.clone())
}

impl ClassDb {
    /// Register a class provided by an extension library.
    ///
    /// The class is added, marked initialized and given a factory in a
    /// single write-locked step. It is recorded under
    /// [`ApiType::EditorExtension`] when `info.editor_only` is set and
    /// [`ApiType::Extension`] otherwise.
    pub fn register_extension_class(
        &self,
        info: ExtensionClassInfo,
    ) -> Result<ClassId, RegistrationError> {
        let api = if info.editor_only {
            ApiType::EditorExtension
        } else {
            ApiType::Extension
        };

        let mut table = self.write();
        let factory = match (&info.create_instance, info.is_instantiable()) {
            (Some(create), true) => native_factory(&table, &info.parent_class_name).map(|base| {
                let create = Arc::clone(create);
                let class_name = info.class_name.clone();
                Arc::new(move || {
                    let mut object = base();
                    let data = create(object.as_mut());
                    object
                        .base_object_mut()
                        .set_extension(ExtensionInstance::new(class_name.clone(), data));
                    object
                }) as ClassFactory
            }),
            _ => None,
        };

        let mut entry = ClassEntry::new(&info.class_name, &info.parent_class_name, None, api);
        entry.initialized = true;
        entry.exposed = info.is_exposed;
        entry.is_virtual = info.is_virtual;
        entry.factory = factory;
        entry.extension = Some(Arc::new(info));

        let id = Self::add_class_locked(&mut table, entry)?;
        if let Some(info) = table.get(id).and_then(|e| e.extension.as_ref()) {
            log::debug!(
                "registered extension class '{}' from '{}'",
                info.class_name,
                info.library
            );
        }
        Ok(id)
    }

    /// Remove an extension class together with its members, cached
    /// defaults and the resource extensions mapped to it.
    ///
    /// Subclasses are not removed; their parent link stops resolving.
    pub fn unregister_extension_class(&self, class: &str) -> Result<(), RegistrationError> {
        let mut table = self.write();
        match table.find(class) {
            None => return reject(RegistrationError::ClassNotFound(class.to_owned())),
            Some(entry) if !entry.is_extension() => {
                return reject(RegistrationError::NotAnExtensionClass(class.to_owned()));
            }
            Some(_) => {}
        }

        let children: Vec<&str> = table
            .entries()
            .filter(|e| e.parent_name == class)
            .map(|e| e.name.as_str())
            .collect();
        if !children.is_empty() {
            log::warn!(
                "unregistering extension class '{}' while subclasses remain: {}",
                class,
                children.join(", ")
            );
        }

        table.resource_base_extensions.retain(|_, target| target != class);
        table.remove(class);
        table.reset_accessor_resolution();
        log::debug!("unregistered extension class '{}'", class);
        Ok(())
    }

    pub fn is_extension_class(&self, class: &str) -> bool {
        self.read().find(class).is_some_and(ClassEntry::is_extension)
    }

    pub fn get_extension_class_info(&self, class: &str) -> Option<Arc<ExtensionClassInfo>> {
        self.read().find(class).and_then(|e| e.extension.clone())
    }

    /// Attach extension instance data for `class` to an existing object,
    /// replacing any previous attachment.
    pub fn set_object_extension_instance(
        &self,
        object: &mut (dyn Object + 'static),
        class: &str,
        instance: Box<dyn Any + Send + Sync>,
    ) -> Result<(), ClassDbError> {
        {
            let table = self.read();
            let entry = table.lookup(class)?;
            if !entry.is_extension() {
                return Err(RegistrationError::NotAnExtensionClass(class.to_owned()).into());
            }
        }
        object
            .base_object_mut()
            .set_extension(ExtensionInstance::new(class, instance));
        Ok(())
    }

    /// Names of every class registered by `library`, sorted.
    pub fn get_extension_class_list(&self, library: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .read()
            .entries()
            .filter(|e| e.extension.as_ref().is_some_and(|info| info.library == library))
            .map(|e| e.name.clone())
            .collect();
        names.sort_unstable();
        names
    }
}
