//! Conversion traits between Rust values and [`Variant`].
//!
//! - [`FromVariant`]: extract a Rust value from a bound-method argument
//! - [`ToVariant`]: turn a Rust value into a return or property value
//! - [`VariantTyped`]: the [`VariantType`] recorded in metadata for a Rust type
//!
//! ## Supported Types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`, `u64`
//! - Floats: `f32`, `f64` (integers widen implicitly)
//! - `bool`, `String`, `&str` (return only), `()` (void)
//! - `(i32, i32)` as `Vector2i`, `Vec<T>` as `Array`
//! - [`Variant`] itself, declared as `Any`

use crate::error::ConversionError;
use crate::variant::{Variant, VariantType};

/// Metadata type tag for a Rust type.
pub trait VariantTyped {
    const VARIANT_TYPE: VariantType;
}

/// Extract a value from a [`Variant`].
pub trait FromVariant: VariantTyped + Sized {
    /// Returns a `ConversionError` if the variant holds an incompatible value.
    fn from_variant(value: &Variant) -> Result<Self, ConversionError>;
}

/// Convert a value into a [`Variant`].
pub trait ToVariant: VariantTyped {
    fn to_variant(self) -> Variant;
}

fn mismatch(expected: VariantType, value: &Variant) -> ConversionError {
    ConversionError::TypeMismatch {
        expected: expected.name(),
        actual: value.type_name(),
    }
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_variant_int {
    ($($ty:ty),*) => {
        $(
            impl VariantTyped for $ty {
                const VARIANT_TYPE: VariantType = VariantType::Int;
            }

            impl FromVariant for $ty {
                fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
                    match value {
                        Variant::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        _ => Err(mismatch(VariantType::Int, value)),
                    }
                }
            }

            impl ToVariant for $ty {
                fn to_variant(self) -> Variant {
                    Variant::Int(self as i64)
                }
            }
        )*
    };
}

impl_variant_int!(i8, i16, i32, i64, u8, u16, u32);

// u64 keeps its bit pattern so the full range survives a round trip.
impl VariantTyped for u64 {
    const VARIANT_TYPE: VariantType = VariantType::Int;
}

impl FromVariant for u64 {
    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        match value {
            Variant::Int(v) => Ok(*v as u64),
            _ => Err(mismatch(VariantType::Int, value)),
        }
    }
}

impl ToVariant for u64 {
    fn to_variant(self) -> Variant {
        Variant::Int(self as i64)
    }
}

// ============================================================================
// Float implementations
// ============================================================================

impl VariantTyped for f32 {
    const VARIANT_TYPE: VariantType = VariantType::Float;
}

impl FromVariant for f32 {
    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        match value {
            Variant::Float(v) => {
                if v.is_finite() && (*v > f32::MAX as f64 || *v < f32::MIN as f64) {
                    Err(ConversionError::FloatConversion {
                        value: *v,
                        target_type: "f32",
                    })
                } else {
                    Ok(*v as f32)
                }
            }
            Variant::Int(v) => Ok(*v as f32),
            _ => Err(mismatch(VariantType::Float, value)),
        }
    }
}

impl ToVariant for f32 {
    fn to_variant(self) -> Variant {
        Variant::Float(self as f64)
    }
}

impl VariantTyped for f64 {
    const VARIANT_TYPE: VariantType = VariantType::Float;
}

impl FromVariant for f64 {
    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        match value {
            Variant::Float(v) => Ok(*v),
            Variant::Int(v) => Ok(*v as f64),
            _ => Err(mismatch(VariantType::Float, value)),
        }
    }
}

impl ToVariant for f64 {
    fn to_variant(self) -> Variant {
        Variant::Float(self)
    }
}

// ============================================================================
// Bool, string, unit
// ============================================================================

impl VariantTyped for bool {
    const VARIANT_TYPE: VariantType = VariantType::Bool;
}

impl FromVariant for bool {
    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        match value {
            Variant::Bool(b) => Ok(*b),
            _ => Err(mismatch(VariantType::Bool, value)),
        }
    }
}

impl ToVariant for bool {
    fn to_variant(self) -> Variant {
        Variant::Bool(self)
    }
}

impl VariantTyped for String {
    const VARIANT_TYPE: VariantType = VariantType::String;
}

impl FromVariant for String {
    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        match value {
            Variant::String(s) => Ok(s.clone()),
            _ => Err(mismatch(VariantType::String, value)),
        }
    }
}

impl ToVariant for String {
    fn to_variant(self) -> Variant {
        Variant::String(self)
    }
}

impl VariantTyped for &str {
    const VARIANT_TYPE: VariantType = VariantType::String;
}

impl ToVariant for &str {
    fn to_variant(self) -> Variant {
        Variant::String(self.to_owned())
    }
}

impl VariantTyped for () {
    const VARIANT_TYPE: VariantType = VariantType::Nil;
}

impl ToVariant for () {
    fn to_variant(self) -> Variant {
        Variant::Nil
    }
}

// ============================================================================
// Compound types
// ============================================================================

impl VariantTyped for (i32, i32) {
    const VARIANT_TYPE: VariantType = VariantType::Vector2i;
}

impl FromVariant for (i32, i32) {
    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        match value {
            Variant::Vector2i(x, y) => Ok((*x, *y)),
            _ => Err(mismatch(VariantType::Vector2i, value)),
        }
    }
}

impl ToVariant for (i32, i32) {
    fn to_variant(self) -> Variant {
        Variant::Vector2i(self.0, self.1)
    }
}

impl<T> VariantTyped for Vec<T> {
    const VARIANT_TYPE: VariantType = VariantType::Array;
}

impl<T: FromVariant> FromVariant for Vec<T> {
    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        match value {
            Variant::Array(items) => items.iter().map(T::from_variant).collect(),
            _ => Err(mismatch(VariantType::Array, value)),
        }
    }
}

impl<T: ToVariant> ToVariant for Vec<T> {
    fn to_variant(self) -> Variant {
        Variant::Array(self.into_iter().map(ToVariant::to_variant).collect())
    }
}

impl VariantTyped for Variant {
    const VARIANT_TYPE: VariantType = VariantType::Any;
}

impl FromVariant for Variant {
    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl ToVariant for Variant {
    fn to_variant(self) -> Variant {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_checks_bounds() {
        assert_eq!(i8::from_variant(&Variant::Int(127)), Ok(127));
        assert!(matches!(
            i8::from_variant(&Variant::Int(128)),
            Err(ConversionError::IntegerOverflow { value: 128, target_type: "i8" })
        ));
        assert!(u32::from_variant(&Variant::Int(-1)).is_err());
    }

    #[test]
    fn u64_keeps_bit_pattern() {
        let v = u64::MAX.to_variant();
        assert_eq!(v, Variant::Int(-1));
        assert_eq!(u64::from_variant(&v), Ok(u64::MAX));
    }

    #[test]
    fn ints_widen_to_floats() {
        assert_eq!(f64::from_variant(&Variant::Int(3)), Ok(3.0));
        assert_eq!(f32::from_variant(&Variant::Int(2)), Ok(2.0));
        assert!(f32::from_variant(&Variant::Float(1e300)).is_err());
        assert!(f32::from_variant(&Variant::Float(f64::INFINITY)).is_ok());
    }

    #[test]
    fn floats_do_not_narrow_to_ints() {
        let err = i32::from_variant(&Variant::Float(1.5)).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: "int",
                actual: "float"
            }
        );
    }

    #[test]
    fn strings_and_unit() {
        assert_eq!("hi".to_variant(), Variant::String("hi".into()));
        assert_eq!(().to_variant(), Variant::Nil);
        assert!(String::from_variant(&Variant::Bool(true)).is_err());
    }

    #[test]
    fn arrays_convert_elementwise() {
        let v = vec![1i32, 2, 3].to_variant();
        assert_eq!(Vec::<i64>::from_variant(&v), Ok(vec![1, 2, 3]));

        let mixed = Variant::Array(vec![Variant::Int(1), Variant::Bool(false)]);
        assert!(Vec::<i64>::from_variant(&mixed).is_err());
    }

    #[test]
    fn vector2i() {
        assert_eq!((640, 480).to_variant(), Variant::Vector2i(640, 480));
        assert_eq!(<(i32, i32)>::from_variant(&Variant::Vector2i(1, 2)), Ok((1, 2)));
    }

    #[test]
    fn declared_types() {
        assert_eq!(<i16 as VariantTyped>::VARIANT_TYPE, VariantType::Int);
        assert_eq!(<Variant as VariantTyped>::VARIANT_TYPE, VariantType::Any);
        assert_eq!(<Vec<bool> as VariantTyped>::VARIANT_TYPE, VariantType::Array);
        assert_eq!(<() as VariantTyped>::VARIANT_TYPE, VariantType::Nil);
    }
}
