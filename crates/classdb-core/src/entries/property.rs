//! Property accessor entry.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::method_bind::MethodBind;
use crate::variant::VariantType;

/// Setter/getter pair backing a registered property.
///
/// Accessors are stored by method name and resolved against the class chain
/// on first use. A successful resolution is cached; a miss is not, so a
/// method bound after the property still resolves later.
#[derive(Debug, Clone)]
pub struct PropertySetGet {
    /// Fixed leading `Int` argument passed to both accessors, or `-1`.
    pub index: i64,
    pub setter: String,
    pub getter: String,
    pub variant_type: VariantType,
    resolved_setter: OnceCell<Arc<MethodBind>>,
    resolved_getter: OnceCell<Arc<MethodBind>>,
}

impl PropertySetGet {
    pub fn new(
        variant_type: VariantType,
        setter: impl Into<String>,
        getter: impl Into<String>,
        index: i64,
    ) -> Self {
        Self {
            index,
            setter: setter.into(),
            getter: getter.into(),
            variant_type,
            resolved_setter: OnceCell::new(),
            resolved_getter: OnceCell::new(),
        }
    }

    pub fn has_index(&self) -> bool {
        self.index >= 0
    }

    pub fn has_setter(&self) -> bool {
        !self.setter.is_empty()
    }

    pub fn has_getter(&self) -> bool {
        !self.getter.is_empty()
    }

    /// Resolve the setter, caching a hit.
    pub fn resolve_setter(
        &self,
        lookup: impl FnOnce(&str) -> Option<Arc<MethodBind>>,
    ) -> Option<Arc<MethodBind>> {
        resolve(&self.resolved_setter, &self.setter, lookup)
    }

    /// Resolve the getter, caching a hit.
    pub fn resolve_getter(
        &self,
        lookup: impl FnOnce(&str) -> Option<Arc<MethodBind>>,
    ) -> Option<Arc<MethodBind>> {
        resolve(&self.resolved_getter, &self.getter, lookup)
    }

    /// Drop cached resolutions.
    pub fn reset_resolution(&mut self) {
        self.resolved_setter = OnceCell::new();
        self.resolved_getter = OnceCell::new();
    }
}

fn resolve(
    cell: &OnceCell<Arc<MethodBind>>,
    name: &str,
    lookup: impl FnOnce(&str) -> Option<Arc<MethodBind>>,
) -> Option<Arc<MethodBind>> {
    if name.is_empty() {
        return None;
    }
    if let Some(bind) = cell.get() {
        return Some(Arc::clone(bind));
    }
    let bind = lookup(name)?;
    Some(Arc::clone(cell.get_or_init(|| bind)))
}
