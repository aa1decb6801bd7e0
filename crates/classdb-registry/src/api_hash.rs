//! Stable hash of the API registered under one category.
//!
//! Extensions compare this hash against the one they were built for. Every
//! collection is fed in sorted order and strings are length-prefixed, so the
//! value depends only on the registered API and not on registration order
//! or hash-map layout.

use xxhash_rust::xxh64::Xxh64;

use classdb_core::{ApiType, ClassEntry, MethodBind, PropertyInfo};

use crate::registry::ClassDb;

fn hash_str(hasher: &mut Xxh64, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_u32(hasher: &mut Xxh64, value: u32) {
    hasher.update(&value.to_le_bytes());
}

fn hash_property(hasher: &mut Xxh64, info: &PropertyInfo) {
    hash_str(hasher, &info.name);
    hash_u32(hasher, info.variant_type.into());
    hash_u32(hasher, info.hint.into());
    hash_str(hasher, &info.hint_string);
    hash_str(hasher, &info.class_name);
    hash_u32(hasher, info.usage.bits());
}

fn hash_method(hasher: &mut Xxh64, bind: &MethodBind) {
    hash_str(hasher, bind.name());
    hash_u32(hasher, bind.flags().bits());
    hash_u32(hasher, bind.argument_count() as u32);
    for argument in bind.arguments() {
        hash_u32(hasher, argument.variant_type.into());
        hash_str(hasher, &argument.class_name);
    }
    hash_u32(hasher, bind.return_info().variant_type.into());
    hash_u32(hasher, bind.default_arguments().len() as u32);
    for default in bind.default_arguments() {
        default.hash_into(hasher);
    }
}

fn hash_class(hasher: &mut Xxh64, entry: &ClassEntry) {
    hash_str(hasher, &entry.name);
    hash_str(hasher, &entry.parent_name);

    let mut methods: Vec<_> = entry.methods.values().collect();
    methods.sort_by(|a, b| a.name().cmp(b.name()));
    for bind in methods {
        hash_method(hasher, bind);
    }

    let mut constants: Vec<_> = entry.ordered_constants().collect();
    constants.sort_unstable();
    for (name, value) in constants {
        hash_str(hasher, name);
        hasher.update(&value.to_le_bytes());
    }

    let mut signals: Vec<_> = entry.signals.values().collect();
    signals.sort_by(|a, b| a.name.cmp(&b.name));
    for signal in signals {
        hash_str(hasher, &signal.name);
        for argument in &signal.arguments {
            hash_property(hasher, argument);
        }
    }

    let mut properties: Vec<_> = entry.property_map.values().collect();
    properties.sort_by(|a, b| a.name.cmp(&b.name));
    for info in properties {
        hash_property(hasher, info);
        if let Some(setget) = entry.property_setget.get(&info.name) {
            hash_str(hasher, &setget.setter);
            hash_str(hasher, &setget.getter);
            hasher.update(&setget.index.to_le_bytes());
        }
    }
}

impl ClassDb {
    /// Hash of every exposed class registered under `api`.
    pub fn get_api_hash(&self, api: ApiType) -> u64 {
        let table = self.read();
        let mut classes: Vec<&ClassEntry> = table
            .entries()
            .filter(|e| e.api == api && e.exposed)
            .collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));

        let mut hasher = Xxh64::new(0);
        for entry in classes {
            hash_class(&mut hasher, entry);
        }
        hasher.digest()
    }
}
