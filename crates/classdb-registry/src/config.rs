//! Registry configuration.

use classdb_core::ApiType;

/// Options fixed when a [`ClassDb`](crate::ClassDb) is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDbConfig {
    /// Allow instantiating classes registered under an editor API.
    pub editor_hint: bool,
    /// Check property setters/getters when the property is added instead of
    /// on first use.
    pub strict_accessors: bool,
    /// API category in effect before the first `set_current_api`.
    pub initial_api: ApiType,
}

impl ClassDbConfig {
    pub fn new() -> Self {
        Self {
            editor_hint: false,
            strict_accessors: false,
            initial_api: ApiType::Core,
        }
    }

    pub fn with_editor_hint(mut self, editor_hint: bool) -> Self {
        self.editor_hint = editor_hint;
        self
    }

    pub fn with_strict_accessors(mut self, strict: bool) -> Self {
        self.strict_accessors = strict;
        self
    }

    pub fn with_initial_api(mut self, api: ApiType) -> Self {
        self.initial_api = api;
        self
    }
}

impl Default for ClassDbConfig {
    fn default() -> Self {
        Self::new()
    }
}
