//! Flag sets and integer-tagged enums shared by metadata entries.
//!
//! The integer tags are stable so that extension descriptors built outside
//! Rust can pass them as plain numbers and convert with `TryFrom`.

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

bitflags! {
    /// Flags describing a bound method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u32 {
        /// Ordinary method, callable from any context.
        const NORMAL = 1 << 0;
        /// Only meaningful inside the editor.
        const EDITOR = 1 << 1;
        /// Does not mutate the receiver.
        const CONST = 1 << 2;
        /// Meant to be overridden by scripts or extensions.
        const VIRTUAL = 1 << 3;
        /// Accepts arguments past the declared prefix.
        const VARARG = 1 << 4;
        /// No receiver.
        const STATIC = 1 << 5;
        /// Implemented by the root object class.
        const OBJECT_CORE = 1 << 6;

        const DEFAULT = Self::NORMAL.bits();
    }
}

impl Default for MethodFlags {
    fn default() -> Self {
        MethodFlags::DEFAULT
    }
}

bitflags! {
    /// How a property is stored, shown and grouped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyUsage: u32 {
        /// Serialized with the object.
        const STORAGE = 1 << 1;
        /// Shown in the inspector.
        const EDITOR = 1 << 2;
        const CHECKABLE = 1 << 3;
        const CHECKED = 1 << 4;
        const INTERNATIONALIZED = 1 << 5;
        /// Marker entry starting a property group.
        const GROUP = 1 << 6;
        /// Marker entry starting a category.
        const CATEGORY = 1 << 7;
        /// Marker entry starting a subgroup.
        const SUBGROUP = 1 << 8;
        const READ_ONLY = 1 << 9;
        /// Count property or element path of a property array.
        const ARRAY = 1 << 10;

        const DEFAULT = Self::STORAGE.bits() | Self::EDITOR.bits();
        const NO_EDITOR = Self::STORAGE.bits();
    }
}

impl Default for PropertyUsage {
    fn default() -> Self {
        PropertyUsage::DEFAULT
    }
}

impl PropertyUsage {
    /// Whether this entry is a group, subgroup or category marker rather
    /// than a real property.
    pub fn is_marker(self) -> bool {
        self.intersects(PropertyUsage::GROUP | PropertyUsage::SUBGROUP | PropertyUsage::CATEGORY)
    }
}

/// Editor hint attached to a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum PropertyHint {
    None = 0,
    Range = 1,
    Enum = 2,
    Flags = 3,
    File = 4,
    Dir = 5,
    MultilineText = 6,
    ResourceType = 7,
}

/// API category a class was registered under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u32)]
pub enum ApiType {
    Core = 0,
    Editor = 1,
    Extension = 2,
    EditorExtension = 3,
    None = 4,
}

impl Default for PropertyHint {
    fn default() -> Self {
        PropertyHint::None
    }
}

impl Default for ApiType {
    fn default() -> Self {
        ApiType::Core
    }
}

impl ApiType {
    /// Classes of this category are only instantiable with the editor hint set.
    pub fn is_editor(self) -> bool {
        matches!(self, ApiType::Editor | ApiType::EditorExtension)
    }

    pub fn is_extension(self) -> bool {
        matches!(self, ApiType::Extension | ApiType::EditorExtension)
    }
}
