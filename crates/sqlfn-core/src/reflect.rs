//! Traits connecting Rust types to the host type model.
//!
//! - [`Reflect`]: the [`HostType`] a Rust type stands for
//! - [`FromHost`]: build a Rust value from a [`HostValue`]
//! - [`IntoHost`]: turn a Rust value into a [`HostValue`]
//!
//! ## Supported Types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`, `u64`
//! - Floats: `f32`, `f64`
//! - `bool`, `String`
//! - `Vec<T>` (slice), `Option<T>` (pointer), `HashMap<K, V, S>` and `BTreeMap<K, V>` (map)
//! - `DateTime<Utc>` (timestamp)
//! - [`Value`] (the open kind; receives any foreign value unchanged)
//! - [`Variadic<T>`] as the last parameter of a variadic function
//! - named structs through `#[derive(Record)]`

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::ops::Deref;

use chrono::{DateTime, Utc};

use crate::error::ConversionError;
use crate::host_type::HostType;
use crate::host_value::HostValue;
use crate::value::Value;

/// A Rust type with a host type descriptor.
pub trait Reflect {
    /// Whether this type collects the trailing arguments of a variadic function.
    const VARIADIC: bool = false;

    /// The host type descriptor of `Self`.
    fn host_type() -> HostType;
}

/// Build a value from a host value.
pub trait FromHost: Sized {
    /// Returns a `ConversionError` if the host value has the wrong kind.
    fn from_host(value: HostValue) -> Result<Self, ConversionError>;
}

/// Convert a value into a host value.
pub trait IntoHost {
    fn into_host(self) -> HostValue;
}

// ============================================================================
// Scalar implementations
// ============================================================================

macro_rules! impl_host_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn host_type() -> HostType {
                    HostType::$variant
                }
            }

            impl FromHost for $ty {
                fn from_host(value: HostValue) -> Result<Self, ConversionError> {
                    match value {
                        HostValue::$variant(v) => Ok(v),
                        other => Err(ConversionError::extract(HostType::$variant, other.kind_name())),
                    }
                }
            }

            impl IntoHost for $ty {
                fn into_host(self) -> HostValue {
                    HostValue::$variant(self)
                }
            }
        )*
    };
}

impl_host_scalar!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    String => String,
    DateTime<Utc> => Timestamp,
);

// ============================================================================
// Open kind
// ============================================================================

impl Reflect for Value {
    fn host_type() -> HostType {
        HostType::Any
    }
}

impl FromHost for Value {
    fn from_host(value: HostValue) -> Result<Self, ConversionError> {
        match value {
            HostValue::Any(v) => Ok(v),
            HostValue::Nil => Ok(Value::Null),
            other => Err(ConversionError::extract(HostType::Any, other.kind_name())),
        }
    }
}

impl IntoHost for Value {
    fn into_host(self) -> HostValue {
        HostValue::Any(self)
    }
}

// ============================================================================
// Sequences
// ============================================================================

fn collect_slice<T: FromHost>(value: HostValue, expected: HostType) -> Result<Vec<T>, ConversionError> {
    match value {
        HostValue::Nil => Ok(Vec::new()),
        HostValue::Slice(items) => items.into_iter().map(T::from_host).collect(),
        HostValue::Bytes(bytes) => bytes
            .into_iter()
            .map(|b| T::from_host(HostValue::Uint8(b)))
            .collect(),
        other => Err(ConversionError::extract(expected, other.kind_name())),
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn host_type() -> HostType {
        HostType::slice(T::host_type())
    }
}

impl<T: Reflect + FromHost> FromHost for Vec<T> {
    fn from_host(value: HostValue) -> Result<Self, ConversionError> {
        collect_slice(value, Self::host_type())
    }
}

impl<T: IntoHost> IntoHost for Vec<T> {
    fn into_host(self) -> HostValue {
        HostValue::Slice(self.into_iter().map(IntoHost::into_host).collect())
    }
}

/// Trailing arguments of a variadic function.
///
/// As the last parameter of a host function it marks the function variadic:
/// every argument past the fixed ones is converted to `T` and collected here.
/// With no trailing arguments the sequence is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variadic<T>(pub Vec<T>);

impl<T> Variadic<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for Variadic<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for Variadic<T> {
    fn from(values: Vec<T>) -> Self {
        Variadic(values)
    }
}

impl<T: Reflect> Reflect for Variadic<T> {
    const VARIADIC: bool = true;

    fn host_type() -> HostType {
        HostType::slice(T::host_type())
    }
}

impl<T: Reflect + FromHost> FromHost for Variadic<T> {
    fn from_host(value: HostValue) -> Result<Self, ConversionError> {
        collect_slice(value, Self::host_type()).map(Variadic)
    }
}

impl<T: IntoHost> IntoHost for Variadic<T> {
    fn into_host(self) -> HostValue {
        self.0.into_host()
    }
}

// ============================================================================
// Pointers
// ============================================================================

impl<T: Reflect> Reflect for Option<T> {
    fn host_type() -> HostType {
        HostType::pointer(T::host_type())
    }
}

impl<T: Reflect + FromHost> FromHost for Option<T> {
    fn from_host(value: HostValue) -> Result<Self, ConversionError> {
        match value {
            HostValue::Nil => Ok(None),
            HostValue::Pointer(inner) => T::from_host(*inner).map(Some),
            other => Err(ConversionError::extract(Self::host_type(), other.kind_name())),
        }
    }
}

impl<T: IntoHost> IntoHost for Option<T> {
    fn into_host(self) -> HostValue {
        match self {
            Some(v) => HostValue::Pointer(Box::new(v.into_host())),
            None => HostValue::Nil,
        }
    }
}

// ============================================================================
// Maps
// ============================================================================

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn host_type() -> HostType {
        HostType::map(K::host_type(), V::host_type())
    }
}

impl<K, V, S> FromHost for HashMap<K, V, S>
where
    K: Reflect + FromHost + Eq + Hash,
    V: Reflect + FromHost,
    S: BuildHasher + Default,
{
    fn from_host(value: HostValue) -> Result<Self, ConversionError> {
        match value {
            HostValue::Nil => Ok(HashMap::default()),
            HostValue::Map(entries) => {
                let mut map = HashMap::with_capacity_and_hasher(entries.len(), S::default());
                for (k, v) in entries {
                    map.insert(K::from_host(k)?, V::from_host(v)?);
                }
                Ok(map)
            }
            other => Err(ConversionError::extract(Self::host_type(), other.kind_name())),
        }
    }
}

impl<K: IntoHost, V: IntoHost, S> IntoHost for HashMap<K, V, S> {
    fn into_host(self) -> HostValue {
        HostValue::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_host(), v.into_host()))
                .collect(),
        )
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn host_type() -> HostType {
        HostType::map(K::host_type(), V::host_type())
    }
}

impl<K, V> FromHost for BTreeMap<K, V>
where
    K: Reflect + FromHost + Ord,
    V: Reflect + FromHost,
{
    fn from_host(value: HostValue) -> Result<Self, ConversionError> {
        match value {
            HostValue::Nil => Ok(BTreeMap::new()),
            HostValue::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_host(k)?, V::from_host(v)?)))
                .collect(),
            other => Err(ConversionError::extract(Self::host_type(), other.kind_name())),
        }
    }
}

impl<K: IntoHost, V: IntoHost> IntoHost for BTreeMap<K, V> {
    fn into_host(self) -> HostValue {
        HostValue::Map(
            self.into_iter()
                .map(|(k, v)| (k.into_host(), v.into_host()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_host_types() {
        assert_eq!(i32::host_type(), HostType::Int32);
        assert_eq!(u16::host_type(), HostType::Uint16);
        assert_eq!(String::host_type(), HostType::String);
        assert_eq!(DateTime::<Utc>::host_type(), HostType::Timestamp);
        assert_eq!(Value::host_type(), HostType::Any);
    }

    #[test]
    fn composite_host_types() {
        assert_eq!(Vec::<u8>::host_type(), HostType::slice(HostType::Uint8));
        assert_eq!(Option::<i64>::host_type(), HostType::pointer(HostType::Int64));
        assert_eq!(
            HashMap::<String, f64>::host_type(),
            HostType::map(HostType::String, HostType::Float64)
        );
        assert!(Variadic::<i32>::VARIADIC);
        assert!(!Vec::<i32>::VARIADIC);
    }

    #[test]
    fn scalar_extract_checks_kind() {
        assert_eq!(i32::from_host(HostValue::Int32(4)), Ok(4));
        let err = i32::from_host(HostValue::Int64(4)).unwrap_err();
        assert_eq!(err.to_string(), "expected host value of type i32, found i64");
    }

    #[test]
    fn vec_accepts_bytes_and_nil() {
        assert_eq!(Vec::<u8>::from_host(HostValue::Bytes(vec![1, 2])), Ok(vec![1, 2]));
        assert_eq!(Vec::<i32>::from_host(HostValue::Nil), Ok(vec![]));
    }

    #[test]
    fn option_round_trip() {
        assert_eq!(Some(3i32).into_host(), HostValue::Pointer(Box::new(HostValue::Int32(3))));
        assert_eq!(Option::<i32>::from_host(HostValue::Nil), Ok(None));
        assert_eq!(
            Option::<i32>::from_host(HostValue::Pointer(Box::new(HostValue::Int32(3)))),
            Ok(Some(3))
        );
    }

    #[test]
    fn map_from_host() {
        let value = HostValue::Map(vec![
            (HostValue::String("a".into()), HostValue::Int32(1)),
            (HostValue::String("b".into()), HostValue::Int32(2)),
        ]);
        let map = HashMap::<String, i32>::from_host(value).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["b"], 2);
        assert!(HashMap::<String, i32>::from_host(HostValue::Nil).unwrap().is_empty());
    }

    #[test]
    fn variadic_derefs_to_slice() {
        let v = Variadic::<i32>::from_host(HostValue::Slice(vec![HostValue::Int32(1), HostValue::Int32(2)])).unwrap();
        assert_eq!(v.iter().sum::<i32>(), 3);
        assert_eq!(v.len(), 2);
    }
}
