//! Class entry.
//!
//! This module provides `ClassEntry`, the registry descriptor of one class:
//! its place in the hierarchy, its bound members and how to instantiate it.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::flags::ApiType;
use crate::ids::ClassId;
use crate::info::{MethodInfo, PropertyInfo};
use crate::method_bind::MethodBind;
use crate::object::Object;
use crate::variant::Variant;

use super::{ExtensionClassInfo, PropertySetGet};

/// Produces a fresh instance of a class.
pub type ClassFactory = Arc<dyn Fn() -> Box<dyn Object> + Send + Sync>;

/// Lazily computed default property values, shared outside the table lock.
pub type DefaultValueCache = Arc<OnceCell<FxHashMap<String, Variant>>>;

/// Registry entry for a class.
#[derive(Clone)]
pub struct ClassEntry {
    pub name: String,
    /// Empty for root classes.
    pub parent_name: String,
    /// Resolved parent slot, set at registration.
    pub parent: Option<ClassId>,
    pub api: ApiType,

    // === Lifecycle ===
    /// Members have been bound by a `register_*` call.
    pub initialized: bool,
    pub exposed: bool,
    pub is_virtual: bool,
    pub disabled: bool,
    pub factory: Option<ClassFactory>,
    pub extension: Option<Arc<ExtensionClassInfo>>,

    // === Methods ===
    pub methods: FxHashMap<String, Arc<MethodBind>>,
    pub method_order: Vec<String>,
    pub virtual_methods: Vec<MethodInfo>,
    /// Accessors of properties, hidden from method lists on request.
    pub methods_in_properties: FxHashSet<String>,
    pub method_error_values: FxHashMap<String, Vec<i64>>,

    // === Properties ===
    /// Declaration-ordered list, including group and subgroup markers.
    pub property_list: Vec<PropertyInfo>,
    pub property_map: FxHashMap<String, PropertyInfo>,
    pub property_setget: FxHashMap<String, PropertySetGet>,
    pub linked_properties: FxHashMap<String, Vec<String>>,
    pub default_overrides: FxHashMap<String, Variant>,
    pub default_values: DefaultValueCache,

    // === Signals, constants, enums ===
    pub signals: FxHashMap<String, MethodInfo>,
    pub signal_order: Vec<String>,
    pub constants: FxHashMap<String, i64>,
    pub constant_order: Vec<String>,
    /// Enum name -> constant names, in declaration order.
    pub enums: FxHashMap<String, Vec<String>>,
    pub enum_order: Vec<String>,
}

impl ClassEntry {
    pub fn new(
        name: impl Into<String>,
        parent_name: impl Into<String>,
        parent: Option<ClassId>,
        api: ApiType,
    ) -> Self {
        Self {
            name: name.into(),
            parent_name: parent_name.into(),
            parent,
            api,
            initialized: false,
            exposed: false,
            is_virtual: false,
            disabled: false,
            factory: None,
            extension: None,
            methods: FxHashMap::default(),
            method_order: Vec::new(),
            virtual_methods: Vec::new(),
            methods_in_properties: FxHashSet::default(),
            method_error_values: FxHashMap::default(),
            property_list: Vec::new(),
            property_map: FxHashMap::default(),
            property_setget: FxHashMap::default(),
            linked_properties: FxHashMap::default(),
            default_overrides: FxHashMap::default(),
            default_values: Arc::new(OnceCell::new()),
            signals: FxHashMap::default(),
            signal_order: Vec::new(),
            constants: FxHashMap::default(),
            constant_order: Vec::new(),
            enums: FxHashMap::default(),
            enum_order: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_name.is_empty()
    }

    pub fn is_extension(&self) -> bool {
        self.extension.is_some()
    }

    /// Methods in declaration order.
    pub fn ordered_methods(&self) -> impl Iterator<Item = &Arc<MethodBind>> {
        self.method_order.iter().filter_map(|name| self.methods.get(name))
    }

    /// Constants in declaration order.
    pub fn ordered_constants(&self) -> impl Iterator<Item = (&str, i64)> {
        self.constant_order
            .iter()
            .filter_map(|name| self.constants.get(name).map(|v| (name.as_str(), *v)))
    }

    pub fn ordered_signals(&self) -> impl Iterator<Item = &MethodInfo> {
        self.signal_order.iter().filter_map(|name| self.signals.get(name))
    }

    /// Enum owning the constant `name`, if any.
    pub fn enum_of_constant(&self, name: &str) -> Option<&str> {
        self.enum_order.iter().find_map(|enum_name| {
            self.enums
                .get(enum_name)
                .filter(|constants| constants.iter().any(|c| c == name))
                .map(|_| enum_name.as_str())
        })
    }

    /// Discard members and caches, keeping identity and hierarchy.
    pub fn clear_members(&mut self) {
        self.methods.clear();
        self.method_order.clear();
        self.virtual_methods.clear();
        self.methods_in_properties.clear();
        self.method_error_values.clear();
        self.property_list.clear();
        self.property_map.clear();
        self.property_setget.clear();
        self.linked_properties.clear();
        self.default_overrides.clear();
        self.default_values = Arc::new(OnceCell::new());
        self.signals.clear();
        self.signal_order.clear();
        self.constants.clear();
        self.constant_order.clear();
        self.enums.clear();
        self.enum_order.clear();
    }
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassEntry")
            .field("name", &self.name)
            .field("parent_name", &self.parent_name)
            .field("api", &self.api)
            .field("exposed", &self.exposed)
            .field("is_virtual", &self.is_virtual)
            .field("disabled", &self.disabled)
            .field("has_factory", &self.factory.is_some())
            .field("extension", &self.extension.as_ref().map(|e| e.library.as_str()))
            .field("methods", &self.methods.len())
            .field("properties", &self.property_map.len())
            .field("signals", &self.signals.len())
            .field("constants", &self.constants.len())
            .finish()
    }
}

/// Layout description of a plain struct exposed to extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeStruct {
    pub name: String,
    /// Declaration in the extension interface language, e.g. `"int x; int y"`.
    pub code: String,
    pub size: u64,
}

impl NativeStruct {
    pub fn new(name: impl Into<String>, code: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            size,
        }
    }
}
