//! Descriptor for classes provided by an extension library.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::object::Object;

/// Builds the extension-side instance data for a freshly created native
/// object of the extended class.
pub type ExtensionCreateFn =
    Arc<dyn Fn(&mut (dyn Object + 'static)) -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Everything an extension hands over when registering a class.
#[derive(Clone)]
pub struct ExtensionClassInfo {
    pub class_name: String,
    pub parent_class_name: String,
    /// Name of the library that owns the class.
    pub library: String,
    pub is_virtual: bool,
    pub is_abstract: bool,
    pub is_exposed: bool,
    /// Registered under [`ApiType::EditorExtension`](crate::ApiType) instead of
    /// `Extension`.
    pub editor_only: bool,
    /// Absent for abstract classes.
    pub create_instance: Option<ExtensionCreateFn>,
}

impl ExtensionClassInfo {
    pub fn new(
        class_name: impl Into<String>,
        parent_class_name: impl Into<String>,
        library: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            parent_class_name: parent_class_name.into(),
            library: library.into(),
            is_virtual: false,
            is_abstract: false,
            is_exposed: true,
            editor_only: false,
            create_instance: None,
        }
    }

    pub fn with_create_instance<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut (dyn Object + 'static)) -> Box<dyn Any + Send + Sync> + Send + Sync + 'static,
    {
        self.create_instance = Some(Arc::new(f));
        self
    }

    pub fn virtual_class(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_exposed = false;
        self
    }

    pub fn editor_only(mut self) -> Self {
        self.editor_only = true;
        self
    }

    pub fn is_instantiable(&self) -> bool {
        !self.is_virtual && !self.is_abstract && self.create_instance.is_some()
    }
}

impl fmt::Debug for ExtensionClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionClassInfo")
            .field("class_name", &self.class_name)
            .field("parent_class_name", &self.parent_class_name)
            .field("library", &self.library)
            .field("is_virtual", &self.is_virtual)
            .field("is_abstract", &self.is_abstract)
            .field("is_exposed", &self.is_exposed)
            .field("editor_only", &self.editor_only)
            .finish_non_exhaustive()
    }
}
