//! Token: per-field values bound to a shared [Schema], with get/set access and the
//! 40-digit hex wire form.

use std::{fmt, sync::Arc};

use num_bigint::{BigInt, BigUint};
use tracing::{debug, trace};

use crate::{
    bits,
    charset::{self, Encoding},
    errors::TokenError,
    field::{FieldDef, FieldKind},
    integer,
    schema::{Schema, TOKEN_BITS},
    value::Value,
};

/// Hex digits in a serialized token.
pub const TOKEN_HEX_LEN: usize = TOKEN_BITS / 4;

/// Stored state of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    /// Packed character units, first character most significant.
    Chars(Encoding, BigUint),
    /// One element per array entry.
    Ints(Vec<BigInt>),
}

impl Slot {
    fn zero(def: &FieldDef) -> Self {
        match def.kind() {
            FieldKind::Char(encoding) => Slot::Chars(encoding, BigUint::default()),
            FieldKind::Int => Slot::Ints(vec![BigInt::default(); def.array_len()]),
        }
    }

    fn unpack(def: &FieldDef, packed: BigUint) -> Self {
        match def.kind() {
            FieldKind::Char(encoding) => Slot::Chars(encoding, packed),
            FieldKind::Int => Slot::Ints(integer::decode(def, &packed)),
        }
    }

    fn pack(&self, def: &FieldDef) -> BigUint {
        match self {
            Slot::Chars(_, packed) => packed.clone(),
            Slot::Ints(values) => integer::pack(def, values),
        }
    }
}

/// A token instance: one value per schema field, all zero until set or parsed.
///
/// ```
/// use std::sync::Arc;
/// use xls10::{Schema, Token};
///
/// let schema = Arc::new(Schema::from_json(
///     r#"{"type":"uint8_t","subtype":"uint16_t","name":"uchar6_t[8]"}"#,
/// ).unwrap());
///
/// let mut token = Token::new(Arc::clone(&schema));
/// token.set("type", 1u8).unwrap();
/// token.set("name", "Alice").unwrap();
///
/// let hex = token.tokenize();
/// let copy = Token::from_hex(schema, &hex).unwrap();
/// assert_eq!(copy.get("name").unwrap().as_str(), Some("Alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    schema: Arc<Schema>,
    slots: Vec<Slot>,
}

impl Token {
    pub fn new(schema: Arc<Schema>) -> Self {
        let slots = schema.fields().iter().map(Slot::zero).collect();
        Self { schema, slots }
    }

    /// Builds a token and loads `hex` into it.
    pub fn from_hex(schema: Arc<Schema>, hex: &str) -> Result<Self, TokenError> {
        let mut token = Self::new(schema);
        token.parse(hex)?;
        Ok(token)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn lookup(&self, name: &str) -> Result<&FieldDef, TokenError> {
        self.schema
            .field(name)
            .ok_or_else(|| TokenError::UnknownField(name.to_string()))
    }

    /// Returns a field's decoded value: a string for text fields, an integer for scalar
    /// integer fields, an array of integers otherwise.
    pub fn get(&self, name: &str) -> Result<Value, TokenError> {
        let def = self.lookup(name)?;
        Ok(decode_slot(def, &self.slots[def.position()]))
    }

    /// Sets a field. Text that does not fit is an error.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), TokenError> {
        self.store(name, value.into(), false)
    }

    /// Sets a field, keeping the prefix of text that does not fit.
    pub fn set_truncating(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), TokenError> {
        self.store(name, value.into(), true)
    }

    fn store(&mut self, name: &str, value: Value, allow_truncation: bool) -> Result<(), TokenError> {
        let def = self.lookup(name)?;

        let slot = encode_slot(def, value, allow_truncation).inspect_err(|err| {
            debug!(field = name, error = %err, "rejected field value");
        })?;

        let position = def.position();
        self.slots[position] = slot;
        Ok(())
    }

    /// Zeroes every field.
    pub fn reset(&mut self) {
        for (slot, def) in self.slots.iter_mut().zip(self.schema.fields()) {
            *slot = Slot::zero(def);
        }
    }

    /// Replaces every field with the values packed in `text`, 40 hex digits in either case.
    /// Padding bits past the schema's width are ignored. On error the token is unchanged.
    pub fn parse(&mut self, text: &str) -> Result<(), TokenError> {
        trace!(token = text, "parsing token");

        let mut data = [0u8; TOKEN_BITS / 8];
        hex::decode_to_slice(text, &mut data).map_err(|_| TokenError::Format)?;

        self.slots = self
            .schema
            .fields()
            .iter()
            .map(|def| {
                let packed = bits::read_bits_at(&data, def.offset_bits(), def.total_bits());
                Slot::unpack(def, packed)
            })
            .collect();

        Ok(())
    }

    /// Packs all fields, in declaration order from the most significant bit, and renders
    /// the 160 bits as 40 lowercase hex digits. Unused low-order bits are zero.
    pub fn tokenize(&self) -> String {
        let mut data = [0u8; TOKEN_BITS / 8];

        for (slot, def) in self.slots.iter().zip(self.schema.fields()) {
            bits::write_bits_at(&mut data, def.offset_bits(), def.total_bits(), &slot.pack(def));
        }

        let text = hex::encode(data);
        trace!(token = %text, "tokenized");
        text
    }
}

fn decode_slot(def: &FieldDef, slot: &Slot) -> Value {
    match slot {
        Slot::Chars(encoding, packed) => Value::Str(charset::decode(def, *encoding, packed)),
        Slot::Ints(values) if values.len() == 1 => Value::Int(values[0].clone()),
        Slot::Ints(values) => Value::Array(values.iter().cloned().map(Value::Int).collect()),
    }
}

fn encode_slot(def: &FieldDef, value: Value, allow_truncation: bool) -> Result<Slot, TokenError> {
    match def.kind() {
        FieldKind::Char(encoding) => {
            let Value::Str(text) = value else {
                return Err(TokenError::TypeMismatch {
                    field: def.name().to_string(),
                    expected: "a string",
                });
            };
            charset::encode(def, encoding, &text, allow_truncation)
                .map(|packed| Slot::Chars(encoding, packed))
        }
        FieldKind::Int => {
            let values = integer::from_value(def, value)?;
            integer::validate(def, &values)?;
            Ok(Slot::Ints(values))
        }
    }
}

/// Human-readable dump of the current values, one field per line in declaration order.
/// Not a serialization format.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        let last = self.slots.len().saturating_sub(1);
        for (i, (slot, def)) in self.slots.iter().zip(self.schema.fields()).enumerate() {
            let sep = if i == last { "" } else { "," };
            writeln!(f, "\t\"{}\": {}{sep}", def.name(), decode_slot(def, slot))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"{"type":"uint8_t","subtype":"uint16_t","flag":"bool","id":"uint16_t"}"#;

    fn token(schema: &str) -> Token {
        Token::new(Arc::new(Schema::from_json(schema).unwrap()))
    }

    #[test]
    fn test_new_token_is_zero() {
        let t = token(EXAMPLE);
        assert_eq!(t.get("type").unwrap(), Value::from(0u8));
        assert_eq!(t.tokenize(), "0".repeat(40));
    }

    #[test]
    fn test_example_layout() {
        let mut t = token(EXAMPLE);
        t.set("type", 5u8).unwrap();
        t.set("subtype", 1000u16).unwrap();
        t.set("flag", true).unwrap();
        t.set("id", 42u16).unwrap();

        // 00000101 0000001111101000 1 0000000000101010, then zero padding
        assert_eq!(t.tokenize(), "0503e88015000000000000000000000000000000");
    }

    #[test]
    fn test_parse_example() {
        let mut t = token(EXAMPLE);
        t.parse("0503E88015000000000000000000000000000000").unwrap();
        assert_eq!(t.get("type").unwrap(), Value::from(5u8));
        assert_eq!(t.get("subtype").unwrap(), Value::from(1000u16));
        assert_eq!(t.get("flag").unwrap(), Value::from(1u8));
        assert_eq!(t.get("id").unwrap(), Value::from(42u16));
    }

    #[test]
    fn test_parse_ignores_padding_bits() {
        let mut t = token(EXAMPLE);
        t.parse("0503e880150000000000000000000000000000ff").unwrap();
        assert_eq!(t.get("id").unwrap(), Value::from(42u16));
        assert_eq!(t.tokenize(), "0503e88015000000000000000000000000000000");
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        let mut t = token(EXAMPLE);
        t.set("id", 7u8).unwrap();

        for bad in [
            "",
            "0503e88015",
            "0503e880150000000000000000000000000000000",
            "0503e8801500000000000000000000000000000g",
            "0x03e88015000000000000000000000000000000",
        ] {
            assert_eq!(t.parse(bad), Err(TokenError::Format), "{bad}");
        }
        assert_eq!(t.get("id").unwrap(), Value::from(7u8));
    }

    #[test]
    fn test_parse_hex_input() {
        let mut t = token(EXAMPLE);

        // 40 bytes but 20 characters
        assert_eq!(t.parse(&"é".repeat(20)), Err(TokenError::Format));
        assert_eq!(t.parse(&" ".repeat(TOKEN_HEX_LEN)), Err(TokenError::Format));

        t.parse("0503E88015000000000000000000000000000000").unwrap();
        assert_eq!(t.tokenize().len(), TOKEN_HEX_LEN);
        assert_eq!(t.tokenize(), "0503e88015000000000000000000000000000000");
    }

    #[test]
    fn test_text_slot_survives_parse() {
        let schema = r#"{"type":"uint8_t","subtype":"uint16_t","tag":"uchar8_t[2]","n":"uint8_t"}"#;
        let mut t = token(schema);
        t.set("tag", "hi").unwrap();
        t.set("n", 0x68u8).unwrap();

        let copy = Token::from_hex(Arc::clone(t.schema()), &t.tokenize()).unwrap();
        assert_eq!(copy.get("tag").unwrap(), Value::from("hi"));
        assert_eq!(copy.get("n").unwrap(), Value::from(0x68u8));
    }

    #[test]
    fn test_unknown_field() {
        let mut t = token(EXAMPLE);
        assert_eq!(
            t.get("missing"),
            Err(TokenError::UnknownField("missing".to_string()))
        );
        assert_eq!(
            t.set("missing", 1u8),
            Err(TokenError::UnknownField("missing".to_string()))
        );
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let mut t = token(EXAMPLE);
        t.set("id", 9u8).unwrap();
        assert!(matches!(
            t.set("id", 70000u32),
            Err(TokenError::Range { .. })
        ));
        assert!(matches!(
            t.set("id", "nine"),
            Err(TokenError::TypeMismatch { .. })
        ));
        assert_eq!(t.get("id").unwrap(), Value::from(9u8));
    }

    #[test]
    fn test_char_field_requires_string() {
        let mut t = token(r#"{"type":"uint8_t","subtype":"uint16_t","name":"uchar8_t[4]"}"#);
        assert_eq!(
            t.set("name", 5u8),
            Err(TokenError::TypeMismatch {
                field: "name".to_string(),
                expected: "a string"
            })
        );
    }

    #[test]
    fn test_array_field_get_and_set() {
        let mut t = token(r#"{"type":"uint8_t","subtype":"uint16_t","deltas":"int4_t[3]"}"#);
        t.set("deltas", [1, -1, -8]).unwrap();
        assert_eq!(t.get("deltas").unwrap(), Value::from(vec![1, -1, -8]));

        // type, subtype, then 0001 1111 1000
        assert_eq!(&t.tokenize()[..9], "0000001f8");
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut t = token(r#"{"type":"uint8_t","subtype":"uint16_t","name":"uchar6_t[4]"}"#);
        t.set("type", 3u8).unwrap();
        t.set("name", "Hi").unwrap();

        t.reset();
        let once = t.clone();
        t.reset();
        assert_eq!(t, once);
        assert_eq!(t.get("name").unwrap(), Value::from(""));
        assert_eq!(t, token(r#"{"type":"uint8_t","subtype":"uint16_t","name":"uchar6_t[4]"}"#));
    }

    #[test]
    fn test_display_dump() {
        let mut t = token(
            r#"{"type":"uint8_t","subtype":"uint16_t","name":"uchar7_t[4]","d":"int4_t[2]"}"#,
        );
        t.set("type", 2u8).unwrap();
        t.set("name", "ok").unwrap();
        t.set("d", [-2, 3]).unwrap();

        assert_eq!(
            t.to_string(),
            "{\n\t\"type\": 2,\n\t\"subtype\": 0,\n\t\"name\": \"ok\",\n\t\"d\": [-2, 3]\n}"
        );
    }

    #[test]
    fn test_display_dump_escapes_text() {
        let mut t = token(r#"{"type":"uint8_t","subtype":"uint16_t","name":"uchar7_t[4]"}"#);
        t.set("name", "a\"b\\").unwrap();

        assert_eq!(
            t.to_string(),
            "{\n\t\"type\": 0,\n\t\"subtype\": 0,\n\t\"name\": \"a\\\"b\\\\\"\n}"
        );
    }
}
