//! Plain structs whose layout is shared with extension libraries.

use classdb_core::{LookupError, NativeStruct, RegistrationError};

use crate::registry::{ClassDb, reject};

impl ClassDb {
    /// Register the layout of a native struct.
    pub fn register_native_struct(
        &self,
        name: &str,
        code: &str,
        size: u64,
    ) -> Result<(), RegistrationError> {
        let mut table = self.write();
        if table.native_structs.contains_key(name) {
            return reject(RegistrationError::DuplicateNativeStruct(name.to_owned()));
        }
        table
            .native_structs
            .insert(name.to_owned(), NativeStruct::new(name, code, size));
        log::debug!("registered native struct '{}' ({} bytes)", name, size);
        Ok(())
    }

    /// Every native struct name, sorted.
    pub fn get_native_struct_list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().native_structs.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn get_native_struct_code(&self, name: &str) -> Result<String, LookupError> {
        self.read()
            .native_structs
            .get(name)
            .map(|s| s.code.clone())
            .ok_or_else(|| LookupError::UnknownNativeStruct(name.to_owned()))
    }

    pub fn get_native_struct_size(&self, name: &str) -> Result<u64, LookupError> {
        self.read()
            .native_structs
            .get(name)
            .map(|s| s.size)
            .ok_or_else(|| LookupError::UnknownNativeStruct(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_query() {
        let db = ClassDb::new();
        db.register_native_struct("ObjectID", "uint64_t id = 0", 8).unwrap();
        db.register_native_struct("AudioFrame", "float left; float right", 8)
            .unwrap();

        assert_eq!(db.get_native_struct_list(), ["AudioFrame", "ObjectID"]);
        assert_eq!(db.get_native_struct_code("ObjectID").as_deref(), Ok("uint64_t id = 0"));
        assert_eq!(db.get_native_struct_size("AudioFrame"), Ok(8));
        assert_eq!(
            db.get_native_struct_size("Glyph"),
            Err(LookupError::UnknownNativeStruct("Glyph".into()))
        );
    }

    #[test]
    fn duplicate_struct_is_rejected() {
        let db = ClassDb::new();
        db.register_native_struct("ObjectID", "uint64_t id = 0", 8).unwrap();
        assert_eq!(
            db.register_native_struct("ObjectID", "int id", 4),
            Err(RegistrationError::DuplicateNativeStruct("ObjectID".into()))
        );
        assert_eq!(db.get_native_struct_size("ObjectID"), Ok(8));
    }

    #[test]
    fn cleanup_drops_structs() {
        let db = ClassDb::new();
        db.register_native_struct("ObjectID", "uint64_t id = 0", 8).unwrap();
        db.cleanup();
        assert!(db.get_native_struct_list().is_empty());
    }
}
