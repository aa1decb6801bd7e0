//! Dynamic values passed through bound methods and properties.
//!
//! [`Variant`] is the runtime currency of the registry: bound method
//! arguments, return values, property values, default arguments and
//! default property values are all carried as `Variant`. [`VariantType`] is
//! the matching type tag recorded in method and property metadata.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use xxhash_rust::xxh64::Xxh64;

/// Type tag for a [`Variant`].
///
/// `Any` is only used in metadata: a parameter declared as `Any` accepts a
/// value of every type without conversion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive,
)]
#[repr(u32)]
pub enum VariantType {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Vector2i = 5,
    Array = 6,
    Any = 255,
}

impl VariantType {
    /// Human-readable name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            VariantType::Nil => "nil",
            VariantType::Bool => "bool",
            VariantType::Int => "int",
            VariantType::Float => "float",
            VariantType::String => "String",
            VariantType::Vector2i => "Vector2i",
            VariantType::Array => "Array",
            VariantType::Any => "Variant",
        }
    }

    /// Whether a value of type `self` may be passed where `target` is declared.
    ///
    /// Exact matches always pass, `Any` accepts everything and integers
    /// widen to floats.
    pub fn can_convert_to(self, target: VariantType) -> bool {
        self == target
            || target == VariantType::Any
            || (self == VariantType::Int && target == VariantType::Float)
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vector2i(i32, i32),
    Array(Vec<Variant>),
}

impl Variant {
    /// The type tag of this value.
    pub fn get_type(&self) -> VariantType {
        match self {
            Variant::Nil => VariantType::Nil,
            Variant::Bool(_) => VariantType::Bool,
            Variant::Int(_) => VariantType::Int,
            Variant::Float(_) => VariantType::Float,
            Variant::String(_) => VariantType::String,
            Variant::Vector2i(..) => VariantType::Vector2i,
            Variant::Array(_) => VariantType::Array,
        }
    }

    /// Human-readable type name of this value.
    pub fn type_name(&self) -> &'static str {
        self.get_type().name()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    /// The zero value for a type, as used for properties with no default.
    pub fn zero(ty: VariantType) -> Self {
        match ty {
            VariantType::Nil | VariantType::Any => Variant::Nil,
            VariantType::Bool => Variant::Bool(false),
            VariantType::Int => Variant::Int(0),
            VariantType::Float => Variant::Float(0.0),
            VariantType::String => Variant::String(String::new()),
            VariantType::Vector2i => Variant::Vector2i(0, 0),
            VariantType::Array => Variant::Array(Vec::new()),
        }
    }

    /// Feed a stable encoding of this value into `hasher`.
    ///
    /// Used by the API hash; the encoding does not depend on process state.
    pub fn hash_into(&self, hasher: &mut Xxh64) {
        hasher.update(&u32::from(self.get_type()).to_le_bytes());
        match self {
            Variant::Nil => {}
            Variant::Bool(b) => hasher.update(&[*b as u8]),
            Variant::Int(i) => hasher.update(&i.to_le_bytes()),
            Variant::Float(f) => hasher.update(&f.to_bits().to_le_bytes()),
            Variant::String(s) => hasher.update(s.as_bytes()),
            Variant::Vector2i(x, y) => {
                hasher.update(&x.to_le_bytes());
                hasher.update(&y.to_le_bytes());
            }
            Variant::Array(items) => {
                hasher.update(&(items.len() as u64).to_le_bytes());
                for item in items {
                    item.hash_into(hasher);
                }
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Nil => write!(f, "null"),
            Variant::Bool(b) => write!(f, "{}", b),
            Variant::Int(i) => write!(f, "{}", i),
            Variant::Float(v) => write!(f, "{}", v),
            Variant::String(s) => write!(f, "{}", s),
            Variant::Vector2i(x, y) => write!(f, "({}, {})", x, y),
            Variant::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags() {
        assert_eq!(Variant::Nil.get_type(), VariantType::Nil);
        assert_eq!(Variant::Int(3).get_type(), VariantType::Int);
        assert_eq!(Variant::Vector2i(1, 2).get_type(), VariantType::Vector2i);
        assert_eq!(Variant::Array(vec![]).type_name(), "Array");
    }

    #[test]
    fn conversion_rules() {
        assert!(VariantType::Int.can_convert_to(VariantType::Int));
        assert!(VariantType::Int.can_convert_to(VariantType::Float));
        assert!(!VariantType::Float.can_convert_to(VariantType::Int));
        assert!(VariantType::String.can_convert_to(VariantType::Any));
        assert!(!VariantType::Nil.can_convert_to(VariantType::Bool));
    }

    #[test]
    fn integer_tags_round_trip_through_num_enum() {
        assert_eq!(VariantType::try_from(4u32).ok(), Some(VariantType::String));
        assert!(VariantType::try_from(42u32).is_err());
        assert_eq!(u32::from(VariantType::Any), 255);
    }

    #[test]
    fn zero_values() {
        assert_eq!(Variant::zero(VariantType::Int), Variant::Int(0));
        assert_eq!(Variant::zero(VariantType::Any), Variant::Nil);
    }

    #[test]
    fn display() {
        let v = Variant::Array(vec![Variant::Int(1), Variant::String("a".into())]);
        assert_eq!(v.to_string(), "[1, a]");
        assert_eq!(Variant::Vector2i(3, 4).to_string(), "(3, 4)");
    }

    #[test]
    fn hash_distinguishes_types() {
        let mut a = Xxh64::new(0);
        Variant::Int(1).hash_into(&mut a);
        let mut b = Xxh64::new(0);
        Variant::Bool(true).hash_into(&mut b);
        assert_ne!(a.digest(), b.digest());
    }
}
