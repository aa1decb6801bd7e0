//! Properties and default values.
//!
//! A property is a `PropertyInfo` plus a setter/getter pair named by method.
//! Accessor names are resolved against the declaring class chain on first
//! use and the hit is cached in the `PropertySetGet`; with
//! `strict_accessors` they are also checked when the property is added.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};

use classdb_core::{
    CallError, ClassDbError, LookupError, MethodBind, Object, PropertyInfo, PropertySetGet,
    PropertyUsage, RegistrationError, Variant, VariantType,
};

use crate::registry::{ClassDb, ClassTable, reject};

/// Which half of a setter/getter pair an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accessor {
    Setter,
    Getter,
}

impl Accessor {
    fn kind(self) -> &'static str {
        match self {
            Accessor::Setter => "setter",
            Accessor::Getter => "getter",
        }
    }
}

/// Method `name` bound on `class` or one of its ancestors.
fn find_accessor(table: &ClassTable, class: &str, name: &str) -> Option<Arc<MethodBind>> {
    table.find_in_chain(class, false, |entry| entry.methods.get(name).cloned())
}

impl ClassDb {
    // ==========================================================================
    // Property registration
    // ==========================================================================

    /// Start a property group; later properties whose names begin with
    /// `prefix` are shown under it.
    pub fn add_property_group(
        &self,
        class: &str,
        name: &str,
        prefix: &str,
    ) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = table.expect_mut(class)?;
        entry.property_list.push(PropertyInfo::group(name, prefix));
        Ok(())
    }

    pub fn add_property_subgroup(
        &self,
        class: &str,
        name: &str,
        prefix: &str,
    ) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = table.expect_mut(class)?;
        entry.property_list.push(PropertyInfo::subgroup(name, prefix));
        Ok(())
    }

    /// Register the count property of a property array. Elements are the
    /// properties whose names start with `element_prefix`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_property_array_count(
        &self,
        class: &str,
        label: &str,
        count_property: &str,
        count_setter: &str,
        count_getter: &str,
        element_prefix: &str,
        count_usage: PropertyUsage,
    ) -> Result<(), RegistrationError> {
        let info = PropertyInfo::array_count(count_property, label, element_prefix, count_usage);
        self.add_property(class, info, count_setter, count_getter, -1)
    }

    /// Declare an array whose elements live under `path`. The entry has no
    /// accessors and is not stored.
    pub fn add_property_array(
        &self,
        class: &str,
        path: &str,
        element_prefix: &str,
    ) -> Result<(), RegistrationError> {
        self.add_property(class, PropertyInfo::array(path, element_prefix), "", "", -1)
    }

    /// Register a property backed by `setter`/`getter` methods.
    ///
    /// Either accessor may be empty (read-only or write-only property). A
    /// non-negative `index` is passed as the leading `Int` argument of both
    /// accessors, so one accessor pair can serve several properties.
    pub fn add_property(
        &self,
        class: &str,
        info: PropertyInfo,
        setter: &str,
        getter: &str,
        index: i64,
    ) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let Some(entry) = table.find(class) else {
            return reject(RegistrationError::ClassNotFound(class.to_owned()));
        };
        if entry.property_map.contains_key(&info.name) {
            return reject(RegistrationError::DuplicateProperty {
                class: class.to_owned(),
                property: info.name,
            });
        }

        if self.config().strict_accessors {
            for (accessor, name) in [(Accessor::Setter, setter), (Accessor::Getter, getter)] {
                if !name.is_empty() && find_accessor(&table, class, name).is_none() {
                    return reject(RegistrationError::UnknownAccessor {
                        class: class.to_owned(),
                        property: info.name,
                        kind: accessor.kind(),
                        accessor: name.to_owned(),
                    });
                }
            }
        }

        let entry = table.expect_mut(class)?;
        for name in [setter, getter] {
            if !name.is_empty() {
                entry.methods_in_properties.insert(name.to_owned());
            }
        }
        let setget = PropertySetGet::new(info.variant_type, setter, getter, index);
        entry.property_setget.insert(info.name.clone(), setget);
        entry.property_map.insert(info.name.clone(), info.clone());
        entry.property_list.push(info);
        Ok(())
    }

    /// Record that editing `property` may change `linked`.
    pub fn add_linked_property(
        &self,
        class: &str,
        property: &str,
        linked: &str,
    ) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = table.expect_mut(class)?;
        if !entry.property_map.contains_key(property) {
            return reject(RegistrationError::PropertyNotFound {
                class: class.to_owned(),
                property: property.to_owned(),
            });
        }
        let links = entry.linked_properties.entry(property.to_owned()).or_default();
        if !links.iter().any(|l| l == linked) {
            links.push(linked.to_owned());
        }
        Ok(())
    }

    pub fn get_linked_properties(&self, class: &str, property: &str) -> Vec<String> {
        self.read()
            .find_in_chain(class, false, |entry| entry.linked_properties.get(property).cloned())
            .unwrap_or_default()
    }

    // ==========================================================================
    // Property queries
    // ==========================================================================

    /// Properties of `class`, most-derived first, declaration order within a
    /// class. Group and subgroup markers are kept in place.
    pub fn get_property_list(
        &self,
        class: &str,
        no_inheritance: bool,
    ) -> Result<Vec<PropertyInfo>, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        let depth = if no_inheritance { 1 } else { usize::MAX };
        let mut seen = FxHashSet::default();
        Ok(table
            .ancestors(class)
            .take(depth)
            .flat_map(|entry| entry.property_list.iter())
            .filter(|p| p.is_marker() || seen.insert(p.name.clone()))
            .cloned()
            .collect())
    }

    pub fn get_property_info(
        &self,
        class: &str,
        property: &str,
        no_inheritance: bool,
    ) -> Result<PropertyInfo, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        table
            .find_in_chain(class, no_inheritance, |entry| entry.property_map.get(property).cloned())
            .ok_or_else(|| unknown_property(class, property))
    }

    pub fn has_property(&self, class: &str, property: &str, no_inheritance: bool) -> bool {
        self.read()
            .find_in_chain(class, no_inheritance, |entry| entry.property_map.get(property))
            .is_some()
    }

    /// Accessor index of a property, `-1` when it has none.
    pub fn get_property_index(&self, class: &str, property: &str) -> Result<i64, LookupError> {
        self.with_setget(class, property, |setget| setget.index)
    }

    pub fn get_property_type(&self, class: &str, property: &str) -> Result<VariantType, LookupError> {
        self.with_setget(class, property, |setget| setget.variant_type)
    }

    /// Setter method name; empty for read-only properties.
    pub fn get_property_setter(&self, class: &str, property: &str) -> Result<String, LookupError> {
        self.with_setget(class, property, |setget| setget.setter.clone())
    }

    /// Getter method name; empty for write-only properties.
    pub fn get_property_getter(&self, class: &str, property: &str) -> Result<String, LookupError> {
        self.with_setget(class, property, |setget| setget.getter.clone())
    }

    fn with_setget<R>(
        &self,
        class: &str,
        property: &str,
        f: impl FnOnce(&PropertySetGet) -> R,
    ) -> Result<R, LookupError> {
        let table = self.read();
        table.lookup(class)?;
        table
            .find_in_chain(class, false, |entry| entry.property_setget.get(property))
            .map(f)
            .ok_or_else(|| unknown_property(class, property))
    }

    /// Resolve the accessor `which` of `property` for an object of `class`.
    ///
    /// Returns `Ok(None)` when `class` has no such property.
    fn property_accessor(
        &self,
        class: &str,
        property: &str,
        which: Accessor,
    ) -> Result<Option<(Arc<MethodBind>, i64)>, CallError> {
        let table = self.read();
        let Some((owner, setget)) = table.find_in_chain(class, false, |entry| {
            entry.property_setget.get(property).map(|setget| (entry, setget))
        }) else {
            return Ok(None);
        };

        let (declared, resolved) = match which {
            Accessor::Setter => (
                setget.has_setter(),
                setget.resolve_setter(|name| find_accessor(&table, &owner.name, name)),
            ),
            Accessor::Getter => (
                setget.has_getter(),
                setget.resolve_getter(|name| find_accessor(&table, &owner.name, name)),
            ),
        };

        match resolved {
            Some(bind) => Ok(Some((bind, setget.index))),
            None if !declared => Err(match which {
                Accessor::Setter => CallError::ReadOnlyProperty {
                    class: owner.name.clone(),
                    property: property.to_owned(),
                },
                Accessor::Getter => CallError::WriteOnlyProperty {
                    class: owner.name.clone(),
                    property: property.to_owned(),
                },
            }),
            None => Err(CallError::UnresolvedAccessor {
                class: owner.name.clone(),
                property: property.to_owned(),
                accessor: match which {
                    Accessor::Setter => setget.setter.clone(),
                    Accessor::Getter => setget.getter.clone(),
                },
            }),
        }
    }

    // ==========================================================================
    // Property access on live objects
    // ==========================================================================

    /// Assign `property` on `object` through its setter.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn set_property(
        &self,
        object: &mut (dyn Object + 'static),
        property: &str,
        value: Variant,
    ) -> Result<(), ClassDbError> {
        let class = object.get_class().to_owned();
        let Some((setter, index)) = self.property_accessor(&class, property, Accessor::Setter)?
        else {
            return Err(unknown_property(&class, property).into());
        };

        let args = if index >= 0 {
            vec![Variant::Int(index), value]
        } else {
            vec![value]
        };
        setter.call(Some(object), &args)?;
        Ok(())
    }

    /// Read `property` from `object` through its getter.
    ///
    /// A name that is not a property but an integer constant of the class
    /// yields the constant.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_property(
        &self,
        object: &mut (dyn Object + 'static),
        property: &str,
    ) -> Result<Variant, ClassDbError> {
        let class = object.get_class().to_owned();
        let Some((getter, index)) = self.property_accessor(&class, property, Accessor::Getter)?
        else {
            let constant = self
                .read()
                .find_in_chain(&class, false, |entry| entry.constants.get(property).copied());
            return match constant {
                Some(value) => Ok(Variant::Int(value)),
                None => Err(unknown_property(&class, property).into()),
            };
        };

        let args = if index >= 0 { vec![Variant::Int(index)] } else { Vec::new() };
        Ok(getter.call(Some(object), &args)?)
    }

    // ==========================================================================
    // Default values
    // ==========================================================================

    /// Override the default reported for `property` of `class` and its
    /// subclasses.
    pub fn set_property_default_value(
        &self,
        class: &str,
        property: &str,
        value: Variant,
    ) -> Result<(), RegistrationError> {
        let mut table = self.write();
        let entry = table.expect_mut(class)?;
        entry.default_overrides.insert(property.to_owned(), value);
        Ok(())
    }

    /// Default value of `property` on a fresh instance of `class`.
    ///
    /// Explicit overrides win. Otherwise the class is instantiated once, its
    /// stored properties are read and the result is memoized for the class;
    /// concurrent first calls compute it only once.
    pub fn class_get_default_property_value(
        &self,
        class: &str,
        property: &str,
    ) -> Result<Variant, LookupError> {
        let cache = {
            let table = self.read();
            let entry = table.lookup(class)?;
            if let Some(value) = table
                .find_in_chain(class, false, |entry| entry.default_overrides.get(property).cloned())
            {
                return Ok(value);
            }
            Arc::clone(&entry.default_values)
        };

        cache
            .get_or_init(|| self.compute_default_values(class))
            .get(property)
            .cloned()
            .ok_or_else(|| LookupError::NoDefaultValue {
                class: class.to_owned(),
                property: property.to_owned(),
            })
    }

    fn compute_default_values(&self, class: &str) -> FxHashMap<String, Variant> {
        let mut defaults = FxHashMap::default();
        let mut object = match self.instantiate(class) {
            Ok(object) => object,
            Err(err) => {
                log::debug!("no default values for {}: {}", class, err);
                return defaults;
            }
        };
        let Ok(properties) = self.get_property_list(class, false) else {
            return defaults;
        };

        for info in properties {
            if info.is_marker() || !info.usage.contains(PropertyUsage::STORAGE) {
                continue;
            }
            match self.get_property(object.as_mut(), &info.name) {
                Ok(value) => {
                    defaults.insert(info.name, value);
                }
                Err(err) => log::debug!("skipping default of {}.{}: {}", class, info.name, err),
            }
        }
        defaults
    }

    /// Forget memoized default values of every class.
    pub fn cleanup_defaults(&self) {
        let mut table = self.write();
        for entry in table.entries_mut() {
            entry.default_values = Arc::new(OnceCell::new());
        }
    }

    // ==========================================================================
    // Validation
    // ==========================================================================

    /// Every property accessor that names a method not bound on the
    /// declaring class chain, sorted by class and property.
    pub fn validate(&self) -> Vec<RegistrationError> {
        let table = self.read();
        let mut errors = Vec::new();
        for entry in table.entries() {
            let mut names: Vec<_> = entry.property_setget.keys().collect();
            names.sort();
            for name in names {
                let setget = &entry.property_setget[name];
                for (accessor, method) in [
                    (Accessor::Setter, &setget.setter),
                    (Accessor::Getter, &setget.getter),
                ] {
                    if !method.is_empty() && find_accessor(&table, &entry.name, method).is_none() {
                        errors.push(RegistrationError::UnknownAccessor {
                            class: entry.name.clone(),
                            property: name.clone(),
                            kind: accessor.kind(),
                            accessor: method.clone(),
                        });
                    }
                }
            }
        }
        errors.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        errors
    }
}

fn unknown_property(class: &str, property: &str) -> LookupError {
    LookupError::UnknownProperty {
        class: class.to_owned(),
        property: property.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classdb_core::{BaseObject, ClassFactory, MethodKind, StaticClass};
    use std::any::{Any, TypeId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Sprite {
        base: BaseObject,
        frame: i64,
        offsets: [i64; 2],
    }

    impl StaticClass for Sprite {
        const CLASS_NAME: &'static str = "Sprite";
        const PARENT_CLASS_NAME: &'static str = "Object";
    }

    impl Object for Sprite {
        fn class_name(&self) -> &'static str {
            Self::CLASS_NAME
        }

        fn cast_ref(&self, id: TypeId) -> Option<&dyn Any> {
            if id == TypeId::of::<Self>() {
                Some(self as &dyn Any)
            } else {
                None
            }
        }

        fn cast_mut(&mut self, id: TypeId) -> Option<&mut dyn Any> {
            if id == TypeId::of::<Self>() {
                Some(self as &mut dyn Any)
            } else {
                None
            }
        }

        fn base_object(&self) -> &BaseObject {
            &self.base
        }

        fn base_object_mut(&mut self) -> &mut BaseObject {
            &mut self.base
        }
    }

    fn sprite_db(config: crate::ClassDbConfig) -> ClassDb {
        let db = ClassDb::with_config(config);
        db.add_class("Object", "").unwrap();
        db.add_class("Sprite", "Object").unwrap();
        let factory: ClassFactory = Arc::new(|| Box::new(Sprite::default()) as Box<dyn Object>);
        db.write().find_mut("Sprite").unwrap().factory = Some(factory);

        db.bind_method("set_frame", |s: &mut Sprite, frame: i64| s.frame = frame, [])
            .unwrap();
        db.bind_method("get_frame", |s: &Sprite| s.frame, []).unwrap();
        db.bind_method(
            "set_offset",
            |s: &mut Sprite, axis: i64, value: i64| s.offsets[axis as usize] = value,
            [],
        )
        .unwrap();
        db.bind_method("get_offset", |s: &Sprite, axis: i64| s.offsets[axis as usize], [])
            .unwrap();
        db
    }

    fn db() -> ClassDb {
        let db = sprite_db(crate::ClassDbConfig::new());
        db.add_property_group("Sprite", "Animation", "").unwrap();
        db.add_property(
            "Sprite",
            PropertyInfo::new(VariantType::Int, "frame"),
            "set_frame",
            "get_frame",
            -1,
        )
        .unwrap();
        db.add_property(
            "Sprite",
            PropertyInfo::new(VariantType::Int, "offset_x"),
            "set_offset",
            "get_offset",
            0,
        )
        .unwrap();
        db.add_property(
            "Sprite",
            PropertyInfo::new(VariantType::Int, "offset_y"),
            "set_offset",
            "get_offset",
            1,
        )
        .unwrap();
        db
    }

    #[test]
    fn set_and_get_through_accessors() {
        let db = db();
        let mut sprite = Sprite::default();
        let object: &mut (dyn Object + 'static) = &mut sprite;

        db.set_property(object, "frame", Variant::Int(4)).unwrap();
        db.set_property(object, "offset_y", Variant::Int(9)).unwrap();
        assert_eq!(db.get_property(object, "frame").unwrap(), Variant::Int(4));
        assert_eq!(db.get_property(object, "offset_x").unwrap(), Variant::Int(0));
        assert_eq!(db.get_property(object, "offset_y").unwrap(), Variant::Int(9));
        assert_eq!(sprite.offsets, [0, 9]);
    }

    #[test]
    fn unknown_property_is_a_lookup_error() {
        let db = db();
        let mut sprite = Sprite::default();
        let err = db.set_property(&mut sprite, "speed", Variant::Int(1)).unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn wrong_value_type_is_a_call_error() {
        let db = db();
        let mut sprite = Sprite::default();
        let err = db
            .set_property(&mut sprite, "frame", Variant::String("x".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            ClassDbError::Call(CallError::InvalidArgument { index: 0, .. })
        ));
    }

    #[test]
    fn read_only_and_write_only() {
        let db = db();
        db.add_property(
            "Sprite",
            PropertyInfo::new(VariantType::Int, "current"),
            "",
            "get_frame",
            -1,
        )
        .unwrap();
        db.add_property(
            "Sprite",
            PropertyInfo::new(VariantType::Int, "target"),
            "set_frame",
            "",
            -1,
        )
        .unwrap();

        let mut sprite = Sprite::default();
        assert!(matches!(
            db.set_property(&mut sprite, "current", Variant::Int(1)),
            Err(ClassDbError::Call(CallError::ReadOnlyProperty { .. }))
        ));
        assert!(matches!(
            db.get_property(&mut sprite, "target"),
            Err(ClassDbError::Call(CallError::WriteOnlyProperty { .. }))
        ));
    }

    #[test]
    fn constant_fallback() {
        let db = db();
        db.bind_integer_constant("Sprite", "", "MAX_FRAMES", 64).unwrap();
        let mut sprite = Sprite::default();
        assert_eq!(
            db.get_property(&mut sprite, "MAX_FRAMES").unwrap(),
            Variant::Int(64)
        );
    }

    #[test]
    fn property_queries() {
        let db = db();
        assert!(db.has_property("Sprite", "frame", true));
        assert!(!db.has_property("Object", "frame", false));
        assert_eq!(db.get_property_index("Sprite", "offset_y"), Ok(1));
        assert_eq!(db.get_property_index("Sprite", "frame"), Ok(-1));
        assert_eq!(db.get_property_type("Sprite", "frame"), Ok(VariantType::Int));
        assert_eq!(db.get_property_setter("Sprite", "frame").as_deref(), Ok("set_frame"));
        assert_eq!(db.get_property_getter("Sprite", "frame").as_deref(), Ok("get_frame"));

        let list = db.get_property_list("Sprite", false).unwrap();
        assert!(list[0].is_marker());
        let names: Vec<_> = list[1..].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["frame", "offset_x", "offset_y"]);

        assert!(matches!(
            db.add_property("Sprite", PropertyInfo::new(VariantType::Int, "frame"), "", "", -1),
            Err(RegistrationError::DuplicateProperty { .. })
        ));
    }

    #[test]
    fn accessors_hidden_from_method_list_on_request() {
        let db = db();
        db.bind_method("flip", |_s: &mut Sprite| (), []).unwrap();
        let names: Vec<_> = db
            .get_method_list("Sprite", true, true)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["flip"]);
        assert_eq!(db.get_method_list("Sprite", true, false).unwrap().len(), 5);
    }

    #[test]
    fn linked_properties() {
        let db = db();
        db.add_linked_property("Sprite", "offset_x", "offset_y").unwrap();
        db.add_linked_property("Sprite", "offset_x", "offset_y").unwrap();
        assert_eq!(db.get_linked_properties("Sprite", "offset_x"), ["offset_y"]);
        assert!(db.add_linked_property("Sprite", "speed", "frame").is_err());
    }

    #[test]
    fn property_arrays() {
        let db = db();
        db.add_property_array_count(
            "Sprite",
            "Frames",
            "frame_count",
            "set_frame",
            "get_frame",
            "frames/frame_",
            PropertyUsage::DEFAULT,
        )
        .unwrap();
        db.add_property_array("Sprite", "frames", "frames/frame_").unwrap();

        let count = db.get_property_info("Sprite", "frame_count", true).unwrap();
        assert_eq!(count.variant_type, VariantType::Int);
        assert_eq!(count.hint_string, "Frames,frames/frame_");
        assert!(count.usage.contains(PropertyUsage::ARRAY | PropertyUsage::STORAGE));
        assert!(!count.is_marker());

        let array = db.get_property_info("Sprite", "frames", true).unwrap();
        assert_eq!(array.variant_type, VariantType::Nil);
        assert_eq!(array.hint_string, "frames/frame_");
        assert_eq!(array.usage, PropertyUsage::EDITOR | PropertyUsage::ARRAY);

        let mut sprite = Sprite::default();
        db.set_property(&mut sprite, "frame_count", Variant::Int(4)).unwrap();
        assert_eq!(sprite.frame, 4);

        assert_eq!(
            db.class_get_default_property_value("Sprite", "frame_count"),
            Ok(Variant::Int(0))
        );
        assert!(matches!(
            db.class_get_default_property_value("Sprite", "frames"),
            Err(LookupError::NoDefaultValue { .. })
        ));
        assert!(db.validate().is_empty());
    }

    #[test]
    fn strict_accessors_reject_unknown_methods() {
        let db = sprite_db(crate::ClassDbConfig::new().with_strict_accessors(true));
        let err = db
            .add_property(
                "Sprite",
                PropertyInfo::new(VariantType::Int, "speed"),
                "set_speed",
                "get_frame",
                -1,
            )
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::UnknownAccessor {
                class: "Sprite".into(),
                property: "speed".into(),
                kind: "setter",
                accessor: "set_speed".into(),
            }
        );
        assert!(!db.has_property("Sprite", "speed", true));
    }

    #[test]
    fn lazy_accessors_resolve_after_late_binding() {
        let db = db();
        db.add_property(
            "Sprite",
            PropertyInfo::new(VariantType::Int, "speed"),
            "set_speed",
            "",
            -1,
        )
        .unwrap();
        assert_eq!(db.validate().len(), 1);

        let mut sprite = Sprite::default();
        assert!(matches!(
            db.set_property(&mut sprite, "speed", Variant::Int(2)),
            Err(ClassDbError::Call(CallError::UnresolvedAccessor { .. }))
        ));

        let bind = MethodBind::raw("set_speed", MethodKind::Instance, |ctx| {
            let speed = ctx.arg::<i64>(0)?;
            ctx.this_mut::<Sprite>()?.frame = speed * 10;
            Ok(())
        })
        .with_arguments([PropertyInfo::new(VariantType::Int, "speed")]);
        db.bind_method_custom("Sprite", bind).unwrap();

        db.set_property(&mut sprite, "speed", Variant::Int(2)).unwrap();
        assert_eq!(sprite.frame, 20);
        assert!(db.validate().is_empty());
    }

    #[test]
    fn default_values_are_memoized() {
        let db = db();
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let factory: ClassFactory = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(Sprite {
                frame: 3,
                ..Sprite::default()
            }) as Box<dyn Object>
        });
        db.write().find_mut("Sprite").unwrap().factory = Some(factory);

        assert_eq!(
            db.class_get_default_property_value("Sprite", "frame"),
            Ok(Variant::Int(3))
        );
        assert_eq!(
            db.class_get_default_property_value("Sprite", "offset_x"),
            Ok(Variant::Int(0))
        );
        assert_eq!(created.load(Ordering::SeqCst), 1);

        db.set_property_default_value("Sprite", "frame", Variant::Int(7)).unwrap();
        assert_eq!(
            db.class_get_default_property_value("Sprite", "frame"),
            Ok(Variant::Int(7))
        );
        assert!(matches!(
            db.class_get_default_property_value("Sprite", "speed"),
            Err(LookupError::NoDefaultValue { .. })
        ));

        db.cleanup_defaults();
        db.class_get_default_property_value("Sprite", "offset_x").unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn method_flag_change_drops_cached_accessors() {
        let db = db();
        let mut sprite = Sprite::default();
        let object: &mut (dyn Object + 'static) = &mut sprite;
        db.get_property(object, "frame").unwrap();

        let flags = classdb_core::MethodFlags::DEFAULT | classdb_core::MethodFlags::OBJECT_CORE;
        db.set_method_flags("Sprite", "get_frame", flags).unwrap();

        let table = db.read();
        let setget = &table.find("Sprite").unwrap().property_setget["frame"];
        let getter = setget
            .resolve_getter(|name| find_accessor(&table, "Sprite", name))
            .unwrap();
        assert_eq!(getter.flags(), flags);
    }

    #[test]
    fn concurrent_first_default_lookup_instantiates_once() {
        const THREADS: usize = 8;

        let db = db();
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let factory: ClassFactory = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            Box::new(Sprite {
                frame: 9,
                ..Sprite::default()
            }) as Box<dyn Object>
        });
        db.write().find_mut("Sprite").unwrap().factory = Some(factory);

        let barrier = std::sync::Barrier::new(THREADS);
        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    barrier.wait();
                    assert_eq!(
                        db.class_get_default_property_value("Sprite", "frame"),
                        Ok(Variant::Int(9))
                    );
                });
            }
        });
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_defaults_for_uninstantiable_class() {
        let db = db();
        db.add_class("Shape", "Object").unwrap();
        db.add_property(
            "Shape",
            PropertyInfo::new(VariantType::Int, "points"),
            "",
            "",
            -1,
        )
        .unwrap();
        assert!(matches!(
            db.class_get_default_property_value("Shape", "points"),
            Err(LookupError::NoDefaultValue { .. })
        ));
    }
}
