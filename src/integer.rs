//! Signed and unsigned integer fields, including fixed-length arrays.
//!
//! Element 0 of an array occupies the most significant bits of the field's span. Negative
//! values are stored in two's complement, `2^width + v`.

use num_bigint::{BigInt, BigUint};
use num_traits::One;

use crate::{bits, errors::TokenError, field::FieldDef, value::Value};

/// Inclusive range of values one element of `def` can hold.
pub fn bounds(def: &FieldDef) -> (BigInt, BigInt) {
    if def.signed() {
        let half = BigInt::one() << (def.bit_width() - 1);
        (-half.clone(), half - 1)
    } else {
        (BigInt::from(0), (BigInt::one() << def.bit_width()) - 1)
    }
}

/// Converts a caller-supplied [Value] into the field's element list.
///
/// A scalar is accepted for single-element fields; booleans are accepted on one-bit
/// fields and become 0 or 1. Range is not checked here, see [validate].
pub fn from_value(def: &FieldDef, value: Value) -> Result<Vec<BigInt>, TokenError> {
    let mismatch = || TokenError::TypeMismatch {
        field: def.name().to_string(),
        expected: if def.bit_width() == 1 {
            "an integer or boolean, or an array of them"
        } else {
            "an integer or an array of integers"
        },
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Str(_) => return Err(mismatch()),
        scalar => vec![scalar],
    };

    if items.len() != def.array_len() {
        return Err(TokenError::ArrayLength {
            field: def.name().to_string(),
            expected: def.array_len(),
            actual: items.len(),
        });
    }

    items
        .into_iter()
        .map(|item| match item {
            Value::Int(v) => Ok(v),
            Value::Bool(b) if def.bit_width() == 1 => Ok(BigInt::from(u8::from(b))),
            _ => Err(mismatch()),
        })
        .collect()
}

/// Checks every element lies within [bounds].
pub fn validate(def: &FieldDef, values: &[BigInt]) -> Result<(), TokenError> {
    if values.len() != def.array_len() {
        return Err(TokenError::ArrayLength {
            field: def.name().to_string(),
            expected: def.array_len(),
            actual: values.len(),
        });
    }

    let (min, max) = bounds(def);
    match values.iter().find(|v| **v < min || **v > max) {
        Some(v) => Err(TokenError::Range {
            field: def.name().to_string(),
            value: v.clone(),
            min,
            max,
        }),
        None => Ok(()),
    }
}

/// Concatenates already validated elements into the field's bit pattern.
pub fn pack(def: &FieldDef, values: &[BigInt]) -> BigUint {
    let width = def.bit_width();

    values.iter().fold(BigUint::from(0u8), |acc, v| {
        (acc << width) | bits::to_twos_complement(v, width)
    })
}

/// Validates then packs.
pub fn encode(def: &FieldDef, values: &[BigInt]) -> Result<BigUint, TokenError> {
    validate(def, values)?;
    Ok(pack(def, values))
}

/// Splits a field's bit pattern back into elements, sign-extending when the field is signed.
pub fn decode(def: &FieldDef, packed: &BigUint) -> Vec<BigInt> {
    let width = def.bit_width();

    bits::split_units(packed, width, def.array_len())
        .into_iter()
        .map(|unit| {
            if def.signed() {
                bits::from_twos_complement(&unit, width)
            } else {
                BigInt::from(unit)
            }
        })
        .collect()
}
