//! # xls10
//!
//! Schema-driven packing of named fields into 160-bit XLS-10 tokens, written as 40 hex
//! digits.
//!
//! A schema is a JSON object mapping field names to type expressions. Key order is the
//! bit layout: the first field occupies the most significant bits, and any bits left
//! after the last field are zero padding. Every schema must declare `type` (`uint8_t`)
//! and `subtype` (`uint16_t`).
//!
//! | expression        | meaning                                         |
//! |-------------------|-------------------------------------------------|
//! | `uint<N>_t`       | unsigned integer, 1 to 152 bits                 |
//! | `int<N>_t`        | two's-complement signed integer, 2 to 152 bits  |
//! | `bit`, `bool`     | `uint1_t`                                       |
//! | `uchar6_t`        | six-bit alphabet text, see [charset]            |
//! | `uchar7_t`        | 7-bit ASCII text                                |
//! | `uchar8_t`        | one byte per character                          |
//! | `<type>[<len>]`   | fixed-length array, or string of `len` units    |
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use xls10::{Schema, Token, Value};
//!
//! let schema = Schema::from_json(
//!     r#"{"type":"uint8_t","subtype":"uint16_t","flag":"bool","id":"uint16_t"}"#,
//! ).unwrap();
//!
//! let mut token = Token::new(Arc::new(schema));
//! token.set("type", 5u8).unwrap();
//! token.set("subtype", 1000u16).unwrap();
//! token.set("flag", true).unwrap();
//! token.set("id", 42u16).unwrap();
//!
//! assert_eq!(token.tokenize(), "0503e88015000000000000000000000000000000");
//! assert_eq!(token.get("id").unwrap(), Value::from(42u16));
//! ```

pub mod bits;
pub mod charset;
pub mod errors;
pub mod field;
pub mod integer;
pub mod schema;
pub mod serde;
pub mod token;
pub mod value;

pub use charset::Encoding;
pub use errors::{SchemaError, TokenError};
pub use field::{FieldDef, FieldKind, MAX_FIELD_BITS};
pub use schema::{Schema, TOKEN_BITS};
pub use token::{TOKEN_HEX_LEN, Token};
pub use value::Value;
