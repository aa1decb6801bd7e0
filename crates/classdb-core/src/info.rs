//! Descriptive metadata for properties, method signatures and signals.

use crate::flags::{MethodFlags, PropertyHint, PropertyUsage};
use crate::variant::{Variant, VariantType};

/// Description of a property, argument or return value.
///
/// Group and subgroup markers are also `PropertyInfo` entries, flagged with
/// [`PropertyUsage::GROUP`] / [`PropertyUsage::SUBGROUP`]; their `hint_string`
/// holds the name prefix shared by the grouped properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub variant_type: VariantType,
    pub name: String,
    /// Class name for object-typed values, empty otherwise.
    pub class_name: String,
    pub hint: PropertyHint,
    pub hint_string: String,
    pub usage: PropertyUsage,
}

impl PropertyInfo {
    pub fn new(variant_type: VariantType, name: impl Into<String>) -> Self {
        Self {
            variant_type,
            name: name.into(),
            class_name: String::new(),
            hint: PropertyHint::None,
            hint_string: String::new(),
            usage: PropertyUsage::DEFAULT,
        }
    }

    /// Nameless description of a return type.
    pub fn returning(variant_type: VariantType) -> Self {
        Self::new(variant_type, "")
    }

    /// Marker starting a property group.
    pub fn group(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            hint_string: prefix.into(),
            usage: PropertyUsage::GROUP,
            ..Self::new(VariantType::Nil, name)
        }
    }

    /// Marker starting a property subgroup.
    pub fn subgroup(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            hint_string: prefix.into(),
            usage: PropertyUsage::SUBGROUP,
            ..Self::new(VariantType::Nil, name)
        }
    }

    /// `Int` property holding the element count of a property array. The
    /// `hint_string` is `"label,element_prefix"`.
    pub fn array_count(
        name: impl Into<String>,
        label: &str,
        element_prefix: &str,
        usage: PropertyUsage,
    ) -> Self {
        Self {
            hint_string: format!("{},{}", label, element_prefix),
            usage: usage | PropertyUsage::ARRAY,
            ..Self::new(VariantType::Int, name)
        }
    }

    /// Editor entry declaring the properties under `path` as array elements.
    pub fn array(path: impl Into<String>, element_prefix: impl Into<String>) -> Self {
        Self {
            hint_string: element_prefix.into(),
            usage: PropertyUsage::EDITOR | PropertyUsage::ARRAY,
            ..Self::new(VariantType::Nil, path)
        }
    }

    pub fn with_hint(mut self, hint: PropertyHint, hint_string: impl Into<String>) -> Self {
        self.hint = hint;
        self.hint_string = hint_string.into();
        self
    }

    pub fn with_usage(mut self, usage: PropertyUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn is_marker(&self) -> bool {
        self.usage.is_marker()
    }
}

/// Signature description of a bound method, virtual method or signal.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    pub flags: MethodFlags,
    pub return_value: PropertyInfo,
    pub arguments: Vec<PropertyInfo>,
    /// Defaults for the trailing arguments, in declaration order.
    pub default_arguments: Vec<Variant>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: MethodFlags::DEFAULT,
            return_value: PropertyInfo::returning(VariantType::Nil),
            arguments: Vec::new(),
            default_arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: PropertyInfo) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = PropertyInfo>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn with_return(mut self, return_value: PropertyInfo) -> Self {
        self.return_value = return_value;
        self
    }

    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_defaults(mut self, defaults: impl IntoIterator<Item = Variant>) -> Self {
        self.default_arguments.extend(defaults);
        self
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }
}
