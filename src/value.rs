//! Dynamically typed field values passed to and returned from a [crate::token::Token].

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;

/// A field value in decoded form.
///
/// [crate::token::Token::get] returns [Value::Str] for text fields, [Value::Int] for
/// single-element integer fields and [Value::Array] of [Value::Int] otherwise.
/// [Value::Bool] is only ever supplied by callers, for one-bit fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(BigInt),
    Str(String),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_int()?.to_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_int()?.to_u64()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(BigInt::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, BigUint);

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
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
    fn test_from_primitives() {
        assert_eq!(Value::from(-5i32), Value::Int(BigInt::from(-5)));
        assert_eq!(Value::from(u128::MAX).as_u64(), None);
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
    }

    #[test]
    fn test_from_collections() {
        let v = Value::from([1u8, 2, 3]);
        assert_eq!(v, Value::from(vec![1u8, 2, 3]));
        assert_eq!(v.as_array().map(<[Value]>::len), Some(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(vec![-1i8, 2]).to_string(), "[-1, 2]");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::from("say \"hi\"").to_string(), r#""say \"hi\"""#);
        assert_eq!(Value::from(42u8).to_string(), "42");
    }
}
