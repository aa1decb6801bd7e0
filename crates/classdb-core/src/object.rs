//! The object model backing registered classes.
//!
//! Every registered native class is a Rust type implementing [`Object`] and
//! [`StaticClass`]. Inheritance is expressed by embedding the parent type as
//! a field; [`Object::cast_ref`] walks that chain so a bound method declared
//! on a base class can reach its receiver inside a derived instance.
//!
//! [`BaseObject`] is the root class (`"Object"`). It owns the instance id and
//! the optional extension instance attached to an object created for an
//! extension class.
//!
//! Implementations are normally generated with `#[derive(Class)]`.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of a live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Compile-time class identity of a native class.
pub trait StaticClass {
    /// Registered class name.
    const CLASS_NAME: &'static str;
    /// Registered parent class name; empty for the root class.
    const PARENT_CLASS_NAME: &'static str;
}

/// A live instance of a registered class.
pub trait Object: Any + Send + Sync {
    /// Name of the native class this value was built from.
    fn class_name(&self) -> &'static str;

    /// View this object, or the embedded base with the given type id, as `Any`.
    fn cast_ref(&self, type_id: TypeId) -> Option<&dyn Any>;

    /// Mutable counterpart of [`cast_ref`](Object::cast_ref).
    fn cast_mut(&mut self, type_id: TypeId) -> Option<&mut dyn Any>;

    fn base_object(&self) -> &BaseObject;

    fn base_object_mut(&mut self) -> &mut BaseObject;

    /// The most-derived registered class of this object.
    ///
    /// Objects created for an extension class report the extension class.
    fn get_class(&self) -> &str {
        match self.base_object().extension_class() {
            Some(class) => class,
            None => self.class_name(),
        }
    }

    fn instance_id(&self) -> ObjectId {
        self.base_object().id()
    }
}

impl<'a> dyn Object + 'a {
    /// Borrow this object (or an embedded base) as `T`.
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.cast_ref(TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Mutably borrow this object (or an embedded base) as `T`.
    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        self.cast_mut(TypeId::of::<T>())?.downcast_mut::<T>()
    }

    /// Whether this object is, or embeds, a `T`.
    pub fn is<T: Object>(&self) -> bool {
        self.cast_ref(TypeId::of::<T>()).is_some()
    }
}

impl fmt::Debug for dyn Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.get_class())
            .field("id", &self.instance_id())
            .finish_non_exhaustive()
    }
}

/// Instance data attached by an extension to the native object it extends.
pub struct ExtensionInstance {
    class_name: String,
    data: Box<dyn Any + Send + Sync>,
}

impl ExtensionInstance {
    pub fn new(class_name: impl Into<String>, data: Box<dyn Any + Send + Sync>) -> Self {
        Self {
            class_name: class_name.into(),
            data,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref()
    }

    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.downcast_mut()
    }
}

impl fmt::Debug for ExtensionInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionInstance")
            .field("class_name", &self.class_name)
            .finish_non_exhaustive()
    }
}

/// Root of every class hierarchy.
#[derive(Debug)]
pub struct BaseObject {
    id: ObjectId,
    extension: Option<ExtensionInstance>,
}

impl BaseObject {
    pub fn new() -> Self {
        Self {
            id: ObjectId::next(),
            extension: None,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn extension(&self) -> Option<&ExtensionInstance> {
        self.extension.as_ref()
    }

    pub fn extension_mut(&mut self) -> Option<&mut ExtensionInstance> {
        self.extension.as_mut()
    }

    pub fn extension_class(&self) -> Option<&str> {
        self.extension.as_ref().map(ExtensionInstance::class_name)
    }

    /// Attach extension instance data, replacing any previous attachment.
    pub fn set_extension(&mut self, instance: ExtensionInstance) -> Option<ExtensionInstance> {
        self.extension.replace(instance)
    }
}

impl Default for BaseObject {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticClass for BaseObject {
    const CLASS_NAME: &'static str = "Object";
    const PARENT_CLASS_NAME: &'static str = "";
}

impl Object for BaseObject {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn cast_ref(&self, type_id: TypeId) -> Option<&dyn Any> {
        (type_id == TypeId::of::<Self>()).then_some(self as &dyn Any)
    }

    fn cast_mut(&mut self, type_id: TypeId) -> Option<&mut dyn Any> {
        if type_id == TypeId::of::<Self>() {
            Some(self as &mut dyn Any)
        } else {
            None
        }
    }

    fn base_object(&self) -> &BaseObject {
        self
    }

    fn base_object_mut(&mut self) -> &mut BaseObject {
        self
    }
}
