//! Resource extension mapping and legacy class name remaps.

use crate::registry::ClassDb;

impl ClassDb {
    // ==========================================================================
    // Resource base extensions
    // ==========================================================================

    /// Map a resource file extension to the class that loads it.
    ///
    /// The first mapping of an extension wins; later ones are ignored and
    /// `false` is returned.
    pub fn add_resource_base_extension(&self, extension: &str, class: &str) -> bool {
        let mut table = self.write();
        if let Some(existing) = table.resource_base_extensions.get(extension) {
            log::warn!(
                "resource extension '{}' already maps to '{}', ignoring '{}'",
                extension,
                existing,
                class
            );
            return false;
        }
        table
            .resource_base_extensions
            .insert(extension.to_owned(), class.to_owned());
        true
    }

    /// Every mapped extension, sorted.
    pub fn get_resource_base_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> =
            self.read().resource_base_extensions.keys().cloned().collect();
        extensions.sort_unstable();
        extensions
    }

    /// Extensions loadable as `class`: those mapped to `class`, to one of its
    /// ancestors or to one of its subclasses. Sorted.
    pub fn get_extensions_for_type(&self, class: &str) -> Vec<String> {
        let table = self.read();
        let mut extensions: Vec<String> = table
            .resource_base_extensions
            .iter()
            .filter(|(_, target)| {
                table.is_parent_class(class, target) || table.is_parent_class(target, class)
            })
            .map(|(extension, _)| extension.clone())
            .collect();
        extensions.sort_unstable();
        extensions
    }

    /// Extensions mapped to exactly `class`, sorted.
    pub fn resource_extensions_by_class(&self, class: &str) -> Vec<String> {
        let mut extensions: Vec<String> = self
            .read()
            .resource_base_extensions
            .iter()
            .filter(|(_, target)| target.as_str() == class)
            .map(|(extension, _)| extension.clone())
            .collect();
        extensions.sort_unstable();
        extensions
    }

    pub fn is_resource_extension(&self, extension: &str) -> bool {
        self.read().resource_base_extensions.contains_key(extension)
    }

    pub fn get_class_for_resource_extension(&self, extension: &str) -> Option<String> {
        self.read().resource_base_extensions.get(extension).cloned()
    }

    // ==========================================================================
    // Compatibility classes
    // ==========================================================================

    /// Remap the legacy class name `old` to `new`, replacing any earlier
    /// remap of `old`.
    pub fn add_compatibility_class(&self, old: &str, new: &str) {
        let mut table = self.write();
        if let Some(previous) = table.compat_classes.insert(old.to_owned(), new.to_owned())
            && previous != new
        {
            log::debug!("compatibility class '{}' remapped from '{}' to '{}'", old, previous, new);
        }
    }

    /// Target of the remap of `old`, or `old` itself when it has none.
    pub fn get_compatibility_remapped_class(&self, old: &str) -> String {
        self.get_compatibility_class(old)
            .unwrap_or_else(|| old.to_owned())
    }

    pub fn get_compatibility_class(&self, old: &str) -> Option<String> {
        self.read().compat_classes.get(old).cloned()
    }

    /// `class` when it is registered, otherwise its remap target. Remaps are
    /// followed one hop only.
    pub fn resolve_class_name(&self, class: &str) -> String {
        let table = self.read();
        if table.id_of(class).is_some() {
            return class.to_owned();
        }
        table
            .compat_classes
            .get(class)
            .cloned()
            .unwrap_or_else(|| class.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use classdb_core::{BaseObject, ClassFactory, Object};

    fn db() -> ClassDb {
        let db = ClassDb::new();
        db.add_class("Object", "").unwrap();
        db.add_class("Resource", "Object").unwrap();
        db.add_class("Texture", "Resource").unwrap();
        db.add_class("Image", "Resource").unwrap();
        db
    }

    #[test]
    fn first_resource_extension_wins() {
        let db = db();
        assert!(db.add_resource_base_extension("tex", "Texture"));
        assert!(!db.add_resource_base_extension("tex", "Image"));
        assert_eq!(db.get_class_for_resource_extension("tex").as_deref(), Some("Texture"));
        assert!(db.is_resource_extension("tex"));
        assert!(!db.is_resource_extension("png"));
        assert_eq!(db.get_class_for_resource_extension("png"), None);
    }

    #[test]
    fn extensions_for_type_follow_hierarchy() {
        let db = db();
        db.add_resource_base_extension("res", "Resource");
        db.add_resource_base_extension("tex", "Texture");
        db.add_resource_base_extension("img", "Image");

        assert_eq!(db.get_resource_base_extensions(), ["img", "res", "tex"]);
        assert_eq!(db.get_extensions_for_type("Texture"), ["res", "tex"]);
        assert_eq!(db.get_extensions_for_type("Resource"), ["img", "res", "tex"]);
        assert_eq!(db.resource_extensions_by_class("Texture"), ["tex"]);
        assert!(db.get_extensions_for_type("Object").len() == 3);
    }

    #[test]
    fn compatibility_remaps_are_single_hop() {
        let db = db();
        db.add_compatibility_class("ImageTexture2", "Texture");
        db.add_compatibility_class("OldTexture", "ImageTexture2");

        assert_eq!(db.get_compatibility_remapped_class("ImageTexture2"), "Texture");
        assert_eq!(db.get_compatibility_remapped_class("Texture"), "Texture");
        assert_eq!(db.resolve_class_name("ImageTexture2"), "Texture");
        assert_eq!(db.resolve_class_name("OldTexture"), "ImageTexture2");
        assert_eq!(db.resolve_class_name("Image"), "Image");

        db.add_compatibility_class("ImageTexture2", "Image");
        assert_eq!(db.get_compatibility_class("ImageTexture2").as_deref(), Some("Image"));
    }

    #[test]
    fn instantiate_falls_back_to_remap() {
        let db = db();
        let factory: ClassFactory = Arc::new(|| Box::new(BaseObject::new()) as Box<dyn Object>);
        db.write().find_mut("Texture").unwrap().factory = Some(factory);
        db.add_compatibility_class("LegacyTexture", "Texture");

        assert!(db.can_instantiate("LegacyTexture"));
        assert!(db.instantiate("LegacyTexture").is_ok());
        assert!(!db.can_instantiate("Image"));
    }
}
