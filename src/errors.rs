//! Error types for schema compilation and token access.

use num_bigint::BigInt;

/// Errors produced when compiling a schema description into a [crate::schema::Schema].
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema text is not a JSON object of field names to type strings.
    #[error("schema is not a valid JSON object of type strings: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The type expression does not match the type grammar.
    #[error("field `{field}`: type `{expr}` does not match `[u](int|char)<bits>_t[<len>]`, `bit` or `bool`")]
    InvalidType { field: String, expr: String },

    /// Character types must be unsigned.
    #[error("field `{field}`: character types must be unsigned")]
    SignedChar { field: String },

    /// Character width is not one of the three supported encodings.
    #[error(
        "field `{field}`: no character encoding is {bits} bits wide (use uchar6_t, uchar7_t or uchar8_t, or an int type for custom encodings)"
    )]
    UnsupportedCharWidth { field: String, bits: usize },

    /// Integer width is outside 1..=152.
    #[error("field `{field}`: bit width {bits} is outside 1..=152")]
    InvalidWidth { field: String, bits: usize },

    /// Single bits cannot carry a sign.
    #[error("field `{field}`: single bits cannot be signed")]
    SignedBit { field: String },

    /// Array length is zero.
    #[error("field `{field}`: array length must be at least 1")]
    InvalidArrayLength { field: String },

    /// The same field name was declared twice.
    #[error("duplicate field `{field}`")]
    DuplicateField { field: String },

    /// `type` or `subtype` is absent or has the wrong shape.
    #[error("mandatory `{field}` field must be declared as {expected}")]
    MissingMandatoryField {
        field: &'static str,
        expected: &'static str,
    },

    /// Sum of all field widths is zero or exceeds the token size.
    #[error("schema packs {bits} bits, must be between 1 and 160")]
    TotalBits { bits: usize },
}

/// Errors produced by get/set/parse on a [crate::token::Token].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// No field with this name in the schema.
    #[error("field `{0}` not found in schema")]
    UnknownField(String),

    /// The supplied value has the wrong kind for the field.
    #[error("field `{field}`: expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// An integer lies outside the field's representable range.
    #[error("field `{field}`: value {value} is outside {min}..={max}")]
    Range {
        field: String,
        value: BigInt,
        min: BigInt,
        max: BigInt,
    },

    /// Wrong number of array elements.
    #[error("field `{field}`: expected {expected} values, got {actual}")]
    ArrayLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// A character cannot be represented in the field's encoding.
    #[error("field `{field}`: character {ch:?} is not valid in {encoding} encoding")]
    Encoding {
        field: String,
        ch: char,
        encoding: &'static str,
    },

    /// The string does not fit and truncation was not allowed.
    #[error(
        "field `{field}`: {len} characters do not fit in {units} units (six-bit capitals take two units)"
    )]
    Truncation {
        field: String,
        len: usize,
        units: usize,
    },

    /// Token text is not exactly 40 hex digits.
    #[error("token must be exactly 40 hexadecimal digits")]
    Format,
}
