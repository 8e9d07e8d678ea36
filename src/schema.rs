//! Schema: the compiled, ordered set of fields that partitions a token's 160 bits.

use std::{collections::BTreeMap, fmt};

use tracing::debug;

use crate::{
    errors::SchemaError,
    field::{FieldDef, FieldKind},
    serde::SchemaDef,
};

/// Bits in a packed token.
pub const TOKEN_BITS: usize = 160;

/// A compiled schema. Build with [Schema::compile] or [Schema::from_json], then share it
/// between any number of [crate::token::Token]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDef>,
    index: BTreeMap<String, usize>,
    total_bits: usize,
}

impl Schema {
    /// Compiles `(name, type expression)` pairs. Declaration order fixes each field's
    /// position in the token.
    pub fn compile<N, T>(decls: &[(N, T)]) -> Result<Self, SchemaError>
    where
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let mut fields: Vec<FieldDef> = Vec::with_capacity(decls.len());
        let mut index = BTreeMap::new();
        let mut total_bits = 0usize;

        for (position, (name, expr)) in decls.iter().enumerate() {
            let name: &str = name.as_ref();
            let field = FieldDef::compile(name, expr.as_ref(), position, total_bits)?;

            if index.insert(name.to_string(), position).is_some() {
                return Err(SchemaError::DuplicateField {
                    field: name.to_string(),
                });
            }

            total_bits = total_bits.saturating_add(field.total_bits());
            fields.push(field);
        }

        let schema = Self {
            fields,
            index,
            total_bits,
        };

        schema.require_mandatory("type", 8, "uint8_t")?;
        schema.require_mandatory("subtype", 16, "uint16_t")?;

        if total_bits == 0 || total_bits > TOKEN_BITS {
            return Err(SchemaError::TotalBits { bits: total_bits });
        }

        debug!(
            fields = schema.fields.len(),
            total_bits, "compiled token schema"
        );

        Ok(schema)
    }

    /// Compiles a JSON object of field names to type expressions, in key order.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let def: SchemaDef = serde_json::from_str(text)?;
        Self::compile(&def.fields)
    }

    fn require_mandatory(
        &self,
        name: &'static str,
        bits: usize,
        expected: &'static str,
    ) -> Result<(), SchemaError> {
        match self.field(name) {
            Some(field)
                if field.kind() == FieldKind::Int
                    && !field.signed()
                    && field.bit_width() == bits
                    && field.array_len() == 1 =>
            {
                Ok(())
            }
            _ => Err(SchemaError::MissingMandatoryField {
                field: name,
                expected,
            }),
        }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.index.get(name).map(|&position| &self.fields[position])
    }

    /// All fields in position order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Bits used by all fields; the rest of the token is zero padding.
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// The schema as compact JSON with normalized type strings, in declaration order.
    /// Compiling this text yields an identical schema.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            let name = serde_json::Value::from(field.name());
            write!(f, "{name}:\"{field}\"")?;
        }
        write!(f, "}}")
    }
}
