//! Field declarations: the type-expression grammar and compiled [FieldDef]s.

use std::fmt;

use crate::{charset::Encoding, errors::SchemaError};

/// Widest single unit an integer field may declare.
pub const MAX_FIELD_BITS: usize = 152;

/// A parsed type expression such as `uint16_t`, `int4_t[3]`, `uchar6_t[12]` or `bool`.
///
/// Parsing only checks the grammar; width and signedness rules are enforced when the
/// expression is compiled into a [FieldDef].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeExpr {
    pub signed: bool,
    pub is_char: bool,
    pub bits: usize,
    pub array_len: usize,
}

impl TypeExpr {
    /// Parses `("u")? ("int"|"char") <bits> "_t" ("[" <len> "]")?`, or `bit` / `bool`.
    /// Matching is case-insensitive and must cover the whole string.
    pub fn parse(expr: &str) -> Option<Self> {
        let lower = expr.to_ascii_lowercase();

        if lower == "bit" || lower == "bool" {
            return Some(TypeExpr {
                signed: false,
                is_char: false,
                bits: 1,
                array_len: 1,
            });
        }

        let (signed, rest) = match lower.strip_prefix('u') {
            Some(rest) => (false, rest),
            None => (true, lower.as_str()),
        };

        let (is_char, rest) = if let Some(rest) = rest.strip_prefix("int") {
            (false, rest)
        } else if let Some(rest) = rest.strip_prefix("char") {
            (true, rest)
        } else {
            return None;
        };

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, rest) = rest.split_at(digits_end);
        let bits = parse_number(digits)?;

        let rest = rest.strip_prefix("_t")?;
        let array_len = if rest.is_empty() {
            1
        } else {
            parse_number(rest.strip_prefix('[')?.strip_suffix(']')?)?
        };

        Some(TypeExpr {
            signed,
            is_char,
            bits,
            array_len,
        })
    }
}

fn parse_number(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

/// Whether a field holds integers or fixed-length text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed or unsigned integers, possibly an array.
    Int,
    /// A fixed-length string in one of the character encodings.
    Char(Encoding),
}

/// A compiled field: name, type and its place in the packed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    signed: bool,
    kind: FieldKind,
    bit_width: usize,
    array_len: usize,
    position: usize,
    offset_bits: usize,
}

impl FieldDef {
    /// Validates `expr` and builds the field at `position`, starting `offset_bits` from
    /// the top of the token.
    pub(crate) fn compile(
        name: &str,
        expr: &str,
        position: usize,
        offset_bits: usize,
    ) -> Result<Self, SchemaError> {
        let field = || name.to_string();

        let ty = TypeExpr::parse(expr).ok_or_else(|| SchemaError::InvalidType {
            field: field(),
            expr: expr.to_string(),
        })?;

        let kind = if ty.is_char {
            if ty.signed {
                return Err(SchemaError::SignedChar { field: field() });
            }
            let encoding =
                Encoding::from_bits(ty.bits).ok_or_else(|| SchemaError::UnsupportedCharWidth {
                    field: field(),
                    bits: ty.bits,
                })?;
            FieldKind::Char(encoding)
        } else {
            if ty.bits == 0 || ty.bits > MAX_FIELD_BITS {
                return Err(SchemaError::InvalidWidth {
                    field: field(),
                    bits: ty.bits,
                });
            }
            FieldKind::Int
        };

        if ty.bits == 1 && ty.signed {
            return Err(SchemaError::SignedBit { field: field() });
        }

        if ty.array_len == 0 {
            return Err(SchemaError::InvalidArrayLength { field: field() });
        }

        Ok(FieldDef {
            name: field(),
            signed: ty.signed,
            kind,
            bit_width: ty.bits,
            array_len: ty.array_len,
            position,
            offset_bits,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signed(&self) -> bool {
        self.signed
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_char(&self) -> bool {
        matches!(self.kind, FieldKind::Char(_))
    }

    /// Bits per unit (one integer element or one character).
    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    /// Number of units: array elements, or characters for text fields.
    pub fn array_len(&self) -> usize {
        self.array_len
    }

    /// Zero-based declaration index.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Distance of the field's first bit from the most significant bit of the token.
    pub fn offset_bits(&self) -> usize {
        self.offset_bits
    }

    /// Bits the field occupies in the token. Saturates for absurd array lengths so the
    /// schema-wide bound check rejects them.
    pub fn total_bits(&self) -> usize {
        self.bit_width.saturating_mul(self.array_len)
    }
}

/// Renders the normalized type expression, e.g. `uint16_t`, `int4_t[3]`, `uchar6_t[12]`.
impl fmt::Display for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.signed { "" } else { "u" };
        let base = if self.is_char() { "char" } else { "int" };
        write!(f, "{sign}{base}{}_t", self.bit_width)?;
        if self.array_len > 1 {
            write!(f, "[{}]", self.array_len)?;
        }

        Ok(())
    }
}
