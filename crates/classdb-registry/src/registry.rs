//! ClassDb - the class registry.
//!
//! This module provides [`ClassDb`], the table of every registered class
//! descriptor, and the class-level operations on it: adding classes,
//! hierarchy queries, enabling/disabling and instantiation. Member binding,
//! properties, extensions and compatibility remaps live in sibling modules
//! as further `impl ClassDb` blocks.
//!
//! # Storage Model
//!
//! - **Classes**: [`ClassEntry`] values in a generational arena addressed by
//!   [`ClassId`]. A child stores its parent's `ClassId`; when a slot is freed
//!   its generation is bumped, so a stale parent link simply stops resolving.
//! - **Names**: `by_name` maps class names to arena slots.
//! - **Compatibility and resources**: flat name maps (see `compat`).
//!
//! # Thread Safety
//!
//! One `parking_lot::RwLock` guards the whole table. Registration takes the
//! write lock, queries take the read lock. Bound methods, factories and
//! extension callbacks never run under the lock: the registry clones the
//! `Arc` it needs, releases the guard and then calls out.
//!
//! # Example
//!
//! ```
//! use classdb_registry::{ClassDb, RegistrationError};
//!
//! # fn main() -> Result<(), RegistrationError> {
//! let db = ClassDb::with_core_classes()?;
//! db.add_class("Node", "Object")?;
//! db.add_class("Window", "Node")?;
//!
//! assert!(db.is_parent_class("Window", "Object"));
//! assert_eq!(db.inheritance_distance("Window", "Object"), Some(2));
//! # Ok(())
//! # }
//! ```

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;

use classdb_core::{
    ApiType, CallError, ClassDbError, ClassEntry, ClassFactory, ClassId, LookupError, NativeStruct,
    Object, RegistrationError,
};

use crate::config::ClassDbConfig;

/// Lifecycle state of a class, as observed through [`ClassDb::class_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassState {
    Unregistered,
    /// Skeleton added, members not bound yet.
    Registered,
    /// Members bound, not exposed to scripts.
    Initialized,
    Exposed,
    Disabled,
}

// ==========================================================================
// Class table
// ==========================================================================

#[derive(Default)]
struct Slot {
    generation: u32,
    entry: Option<ClassEntry>,
}

/// The lock-protected state of a [`ClassDb`].
pub(crate) struct ClassTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_name: FxHashMap<String, ClassId>,
    pub(crate) current_api: ApiType,
    /// Legacy class name -> current class name.
    pub(crate) compat_classes: FxHashMap<String, String>,
    /// Resource file extension -> class name.
    pub(crate) resource_base_extensions: FxHashMap<String, String>,
    pub(crate) native_structs: FxHashMap<String, NativeStruct>,
}

impl ClassTable {
    fn new(api: ApiType) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            by_name: FxHashMap::default(),
            current_api: api,
            compat_classes: FxHashMap::default(),
            resource_base_extensions: FxHashMap::default(),
            native_structs: FxHashMap::default(),
        }
    }

    pub(crate) fn get(&self, id: ClassId) -> Option<&ClassEntry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    pub(crate) fn id_of(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn find(&self, name: &str) -> Option<&ClassEntry> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub(crate) fn find_mut(&mut self, name: &str) -> Option<&mut ClassEntry> {
        let id = self.id_of(name)?;
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    /// Entry for `name`, or the registration error naming it.
    pub(crate) fn expect_mut(&mut self, name: &str) -> Result<&mut ClassEntry, RegistrationError> {
        self.find_mut(name)
            .ok_or_else(|| RegistrationError::ClassNotFound(name.to_owned()))
    }

    /// Entry for `name`, or the lookup error naming it.
    pub(crate) fn lookup(&self, name: &str) -> Result<&ClassEntry, LookupError> {
        self.find(name)
            .ok_or_else(|| LookupError::UnknownClass(name.to_owned()))
    }

    pub(crate) fn insert(&mut self, entry: ClassEntry) -> ClassId {
        let name = entry.name.clone();
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                ClassId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                ClassId::new(index, 0)
            }
        };
        self.by_name.insert(name, id);
        id
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<ClassEntry> {
        let id = self.by_name.remove(name)?;
        let slot = self.slots.get_mut(id.index as usize)?;
        let entry = slot.entry.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        entry
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &ClassEntry> {
        self.slots.iter().filter_map(|slot| slot.entry.as_ref())
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut ClassEntry> {
        self.slots.iter_mut().filter_map(|slot| slot.entry.as_mut())
    }

    /// Forget every cached property accessor so the next access resolves
    /// against the current bindings.
    pub(crate) fn reset_accessor_resolution(&mut self) {
        for entry in self.entries_mut() {
            entry
                .property_setget
                .values_mut()
                .for_each(|setget| setget.reset_resolution());
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.by_name.len()
    }

    /// The class itself followed by its ancestors, nearest first.
    pub(crate) fn ancestors<'a>(&'a self, name: &str) -> Ancestors<'a> {
        Ancestors {
            table: self,
            next: self.find(name),
        }
    }

    /// First match of `f` walking from `class` upward; only `class` itself
    /// when `no_inheritance` is set.
    pub(crate) fn find_in_chain<'a, R>(
        &'a self,
        class: &str,
        no_inheritance: bool,
        f: impl FnMut(&'a ClassEntry) -> Option<R>,
    ) -> Option<R> {
        let depth = if no_inheritance { 1 } else { usize::MAX };
        self.ancestors(class).take(depth).find_map(f)
    }

    pub(crate) fn is_parent_class(&self, class: &str, ancestor: &str) -> bool {
        self.ancestors(class).any(|entry| entry.name == ancestor)
    }

    /// Nearest ancestor (excluding `entry`) with a factory.
    pub(crate) fn inherited_factory(&self, entry: &ClassEntry) -> Option<ClassFactory> {
        let mut current = entry.parent.and_then(|id| self.get(id));
        while let Some(parent) = current {
            if let Some(factory) = &parent.factory {
                return Some(factory.clone());
            }
            current = parent.parent.and_then(|id| self.get(id));
        }
        None
    }

    fn clear(&mut self, api: ApiType) {
        *self = Self::new(api);
    }
}

/// Iterator over a class and its ancestors.
pub(crate) struct Ancestors<'a> {
    table: &'a ClassTable,
    next: Option<&'a ClassEntry>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ClassEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.and_then(|id| self.table.get(id));
        Some(current)
    }
}

/// Log a registration error and return it.
pub(crate) fn reject<T>(err: RegistrationError) -> Result<T, RegistrationError> {
    log::error!("{}", err);
    Err(err)
}

// ==========================================================================
// ClassDb
// ==========================================================================

/// Thread-safe class registry.
///
/// Construct one explicitly and share it by reference or `Arc`; there is no
/// global instance.
pub struct ClassDb {
    table: RwLock<ClassTable>,
    config: ClassDbConfig,
}

impl ClassDb {
    /// Create an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ClassDbConfig::default())
    }

    pub fn with_config(config: ClassDbConfig) -> Self {
        Self {
            table: RwLock::new(ClassTable::new(config.initial_api)),
            config,
        }
    }

    pub fn config(&self) -> &ClassDbConfig {
        &self.config
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ClassTable> {
        self.table.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, ClassTable> {
        self.table.write()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Add a class skeleton under the current API category.
    ///
    /// `parent_name` must already be registered, or be empty for a root
    /// class. Fails without touching the registry if `name` is taken.
    pub fn add_class(&self, name: &str, parent_name: &str) -> Result<ClassId, RegistrationError> {
        let mut table = self.write();
        let api = table.current_api;
        Self::add_class_locked(&mut table, ClassEntry::new(name, parent_name, None, api))
    }

    /// Insert `entry` after validating its name and resolving its parent.
    pub(crate) fn add_class_locked(
        table: &mut ClassTable,
        mut entry: ClassEntry,
    ) -> Result<ClassId, RegistrationError> {
        if entry.name.is_empty() {
            return reject(RegistrationError::InvalidName(entry.name));
        }
        if table.id_of(&entry.name).is_some() {
            return reject(RegistrationError::DuplicateClass(entry.name));
        }
        if !entry.parent_name.is_empty() {
            match table.id_of(&entry.parent_name) {
                Some(parent) => entry.parent = Some(parent),
                None => {
                    return reject(RegistrationError::UnknownParent {
                        class: entry.name,
                        parent: entry.parent_name,
                    });
                }
            }
        }
        log::debug!(
            "registered class '{}' (parent '{}', api {:?})",
            entry.name,
            entry.parent_name,
            entry.api
        );
        Ok(table.insert(entry))
    }

    /// Remove a class and everything bound to it.
    pub(crate) fn remove_class(&self, name: &str) -> Option<ClassEntry> {
        self.write().remove(name)
    }

    pub fn set_current_api(&self, api: ApiType) {
        self.write().current_api = api;
    }

    pub fn get_current_api(&self) -> ApiType {
        self.read().current_api
    }

    pub fn get_api_type(&self, class: &str) -> Result<ApiType, LookupError> {
        self.read().lookup(class).map(|entry| entry.api)
    }

    // ==========================================================================
    // Class tree queries
    // ==========================================================================

    pub fn class_exists(&self, class: &str) -> bool {
        self.read().id_of(class).is_some()
    }

    pub fn class_count(&self) -> usize {
        self.read().len()
    }

    /// All registered class names, sorted.
    pub fn get_class_list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().entries().map(|e| e.name.clone()).collect();
        names.sort_unstable();
        names
    }

    /// Every class deriving (directly or not) from `class`, sorted.
    pub fn get_inheriters_from_class(&self, class: &str) -> Vec<String> {
        let table = self.read();
        let mut names: Vec<String> = table
            .entries()
            .filter(|e| e.name != class && table.is_parent_class(&e.name, class))
            .map(|e| e.name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    /// Classes whose parent is `class`, sorted.
    pub fn get_direct_inheriters_from_class(&self, class: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .read()
            .entries()
            .filter(|e| e.parent_name == class)
            .map(|e| e.name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn get_parent_class(&self, class: &str) -> Result<String, LookupError> {
        self.read().lookup(class).map(|e| e.parent_name.clone())
    }

    /// Parent of `class`, or `None` for unknown and root classes.
    pub fn get_parent_class_nocheck(&self, class: &str) -> Option<String> {
        self.read()
            .find(class)
            .filter(|e| !e.is_root())
            .map(|e| e.parent_name.clone())
    }

    /// Whether `ancestor` is `class` or one of its ancestors.
    ///
    /// False when either class is unknown.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn is_parent_class(&self, class: &str, ancestor: &str) -> bool {
        self.read().is_parent_class(class, ancestor)
    }

    /// Number of inheritance steps from `class` up to `ancestor`.
    pub fn inheritance_distance(&self, class: &str, ancestor: &str) -> Option<usize> {
        self.read()
            .ancestors(class)
            .position(|entry| entry.name == ancestor)
    }

    /// Whether a live object is an instance of `class` or a subclass.
    pub fn object_is_class(&self, object: &dyn Object, class: &str) -> bool {
        self.is_parent_class(object.get_class(), class)
    }

    pub fn class_state(&self, class: &str) -> ClassState {
        match self.read().find(class) {
            None => ClassState::Unregistered,
            Some(e) if e.disabled => ClassState::Disabled,
            Some(e) if e.initialized && e.exposed => ClassState::Exposed,
            Some(e) if e.initialized => ClassState::Initialized,
            Some(_) => ClassState::Registered,
        }
    }

    pub fn is_class_exposed(&self, class: &str) -> bool {
        self.read().find(class).is_some_and(|e| e.exposed)
    }

    pub fn is_virtual(&self, class: &str) -> bool {
        self.read().find(class).is_some_and(|e| e.is_virtual)
    }

    // ==========================================================================
    // Enable / disable
    // ==========================================================================

    pub fn set_class_enabled(&self, class: &str, enabled: bool) -> Result<(), LookupError> {
        let mut table = self.write();
        let entry = table
            .find_mut(class)
            .ok_or_else(|| LookupError::UnknownClass(class.to_owned()))?;
        entry.disabled = !enabled;
        Ok(())
    }

    /// False for disabled and unknown classes.
    pub fn is_class_enabled(&self, class: &str) -> bool {
        self.read().find(class).is_some_and(|e| !e.disabled)
    }

    // ==========================================================================
    // Instantiation
    // ==========================================================================

    fn entry_instantiable(&self, entry: &ClassEntry) -> bool {
        !entry.disabled
            && !entry.is_virtual
            && entry.factory.is_some()
            && (self.config.editor_hint || !entry.api.is_editor())
    }

    /// Factory for `class`, falling back to its compatibility remap when the
    /// class itself cannot be instantiated.
    fn resolve_factory(&self, class: &str) -> Result<ClassFactory, ClassDbError> {
        let table = self.read();
        let mut entry = table.find(class);
        if !entry.is_some_and(|e| self.entry_instantiable(e))
            && let Some(target) = table.compat_classes.get(class)
            && let Some(remapped) = table.find(target)
        {
            entry = Some(remapped);
        }

        let entry = entry.ok_or_else(|| LookupError::UnknownClass(class.to_owned()))?;
        if entry.disabled {
            return Err(CallError::ClassDisabled(entry.name.clone()).into());
        }
        if entry.api.is_editor() && !self.config.editor_hint {
            return Err(CallError::EditorOnly(entry.name.clone()).into());
        }
        match &entry.factory {
            Some(factory) if !entry.is_virtual => Ok(factory.clone()),
            _ => Err(CallError::NotInstantiable(entry.name.clone()).into()),
        }
    }

    /// Create a fresh instance of `class`.
    ///
    /// Virtual and abstract classes fail with [`CallError::NotInstantiable`].
    /// The factory runs after the registry lock is released.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn instantiate(&self, class: &str) -> Result<Box<dyn Object>, ClassDbError> {
        let factory = self.resolve_factory(class)?;
        Ok(factory())
    }

    pub fn can_instantiate(&self, class: &str) -> bool {
        self.resolve_factory(class).is_ok()
    }

    // ==========================================================================
    // Teardown
    // ==========================================================================

    /// Drop every class, remap, resource extension and native struct.
    pub fn cleanup(&self) {
        let mut table = self.write();
        log::debug!("clearing {} classes", table.len());
        table.clear(self.config.initial_api);
    }
}

impl Default for ClassDb {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClassDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.read();
        f.debug_struct("ClassDb")
            .field("classes", &table.len())
            .field("current_api", &table.current_api)
            .field("compat_classes", &table.compat_classes.len())
            .field("native_structs", &table.native_structs.len())
            .field("config", &self.config)
            .finish()
    }
}
