//! Fixed-length text fields in six-bit, 7-bit ASCII and 8-bit encodings.
//!
//! A text field of `n` units is stored as one packed unsigned integer of `n * width`
//! bits. The first character lives in the most significant unit; unused trailing units
//! are zero.
//!
//! ## Six-bit alphabet
//!
//! | index  | symbols                                               |
//! |--------|-------------------------------------------------------|
//! | 0      | capital shift                                         |
//! | 1–26   | `a`–`z`                                               |
//! | 27–36  | `0`–`9`                                               |
//! | 37–60  | `. - _ : / ? # [ ] @ ! $ & ( ) * ' + , ; = ~ % \`     |
//! | 61–63  | `.com` `.org` `.io`                                   |
//!
//! An uppercase letter costs two units: the shift marker, then the lowercase letter.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::{bits, errors::TokenError, field::FieldDef};

/// The six-bit alphabet. Index 0 is the capital-shift marker and never matches input.
pub const SIXBIT: [&str; 64] = [
    "", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q",
    "r", "s", "t", "u", "v", "w", "x", "y", "z", "0", "1", "2", "3", "4", "5", "6", "7", "8",
    "9", ".", "-", "_", ":", "/", "?", "#", "[", "]", "@", "!", "$", "&", "(", ")", "*", "'",
    "+", ",", ";", "=", "~", "%", "\\", ".com", ".org", ".io",
];

const CAPITAL_SHIFT: u32 = 0;

/// Multi-character symbols, tried before single characters when encoding.
const SUFFIXES: [u32; 3] = [61, 62, 63];

/// Character encoding of a text field, selected by its unit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `uchar6_t`: the six-bit alphabet with capital shift.
    SixBit,
    /// `uchar7_t`: code points 0..=127.
    Ascii,
    /// `uchar8_t`: code points 0..=255, one byte per character.
    Byte,
}

impl Encoding {
    pub fn from_bits(bits: usize) -> Option<Self> {
        match bits {
            6 => Some(Encoding::SixBit),
            7 => Some(Encoding::Ascii),
            8 => Some(Encoding::Byte),
            _ => None,
        }
    }

    pub fn bits(self) -> usize {
        match self {
            Encoding::SixBit => 6,
            Encoding::Ascii => 7,
            Encoding::Byte => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::SixBit => "six-bit",
            Encoding::Ascii => "7-bit ASCII",
            Encoding::Byte => "8-bit",
        }
    }
}

/// Looks up the six-bit symbol at the start of `rest`, returning its index and the
/// number of characters it covers.
fn sixbit_symbol(rest: &[char]) -> Option<(u32, usize)> {
    for index in SUFFIXES {
        let suffix = SIXBIT[index as usize];
        let len = suffix.chars().count();
        if rest.len() >= len && suffix.chars().zip(rest).all(|(a, &b)| a == b) {
            return Some((index, len));
        }
    }

    let first = rest.first()?.to_string();
    SIXBIT
        .iter()
        .skip(1)
        .position(|symbol| *symbol == first)
        .map(|index| (index as u32 + 1, 1))
}

/// Packs `text` into the field's units.
///
/// Units are filled from the first position to the last; once the text runs out the
/// remaining units are zero. Fails with [TokenError::Truncation] if characters are left
/// over, unless `allow_truncation` is set, in which case the fitted prefix is kept.
pub fn encode(
    def: &FieldDef,
    encoding: Encoding,
    text: &str,
    allow_truncation: bool,
) -> Result<BigUint, TokenError> {
    let chars: Vec<char> = text.chars().collect();
    let width = encoding.bits();

    let invalid = |ch: char| TokenError::Encoding {
        field: def.name().to_string(),
        ch,
        encoding: encoding.name(),
    };

    let mut packed = BigUint::zero();
    let mut cursor = 0;
    let mut shifted = false;

    for _ in 0..def.array_len() {
        let unit = match chars.get(cursor) {
            None => 0,
            Some(&ch) => match encoding {
                Encoding::SixBit if ch.is_ascii_uppercase() && !shifted => {
                    // Same character goes again, lowercased, in the next unit.
                    shifted = true;
                    CAPITAL_SHIFT
                }
                Encoding::SixBit if shifted => {
                    let (index, consumed) =
                        sixbit_symbol(&[ch.to_ascii_lowercase()]).ok_or_else(|| invalid(ch))?;
                    shifted = false;
                    cursor += consumed;
                    index
                }
                Encoding::SixBit => {
                    let (index, consumed) =
                        sixbit_symbol(&chars[cursor..]).ok_or_else(|| invalid(ch))?;
                    cursor += consumed;
                    index
                }
                Encoding::Ascii | Encoding::Byte => {
                    let code = u32::from(ch);
                    if code >= 1 << width {
                        return Err(invalid(ch));
                    }
                    cursor += 1;
                    code
                }
            },
        };

        packed = (packed << width) | BigUint::from(unit);
    }

    if cursor < chars.len() && !allow_truncation {
        return Err(TokenError::Truncation {
            field: def.name().to_string(),
            len: chars.len(),
            units: def.array_len(),
        });
    }

    Ok(packed)
}

/// Unpacks a stored text value.
///
/// Zero units are omitted. Under the six-bit encoding a zero unit also marks the next
/// decoded symbol as uppercase; a marker with nothing after it produces nothing.
pub fn decode(def: &FieldDef, encoding: Encoding, packed: &BigUint) -> String {
    let mut out = String::with_capacity(def.array_len());
    let mut upper = false;

    for unit in bits::split_units(packed, encoding.bits(), def.array_len()) {
        let unit = unit.to_u32().unwrap_or(0);

        if unit == 0 {
            if encoding == Encoding::SixBit {
                upper = true;
            }
            continue;
        }

        match encoding {
            Encoding::SixBit => {
                let symbol = SIXBIT[unit as usize];
                if upper {
                    out.push_str(&symbol.to_ascii_uppercase());
                } else {
                    out.push_str(symbol);
                }
                upper = false;
            }
            Encoding::Ascii | Encoding::Byte => {
                if let Some(ch) = char::from_u32(unit) {
                    out.push(ch);
                }
            }
        }
    }

    out
}
