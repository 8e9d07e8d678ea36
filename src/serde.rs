//! JSON schema description.
//!
//! A schema is written as a JSON object mapping field names to type expressions:
//!
//! ```json
//! { "type": "uint8_t", "subtype": "uint16_t", "flag": "bool", "name": "uchar6_t[12]" }
//! ```
//!
//! Key order decides bit layout, so the object is read as an ordered list of pairs
//! rather than a map. Repeated keys are kept so compilation can report them.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

/// Field declarations in the order they appear in the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDef {
    pub fields: Vec<(String, String)>,
}

impl<'de> Deserialize<'de> for SchemaDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedFields;

        impl<'de> Visitor<'de> for OrderedFields {
            type Value = SchemaDef;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping field names to type strings")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    fields.push(entry);
                }

                Ok(SchemaDef { fields })
            }
        }

        deserializer.deserialize_map(OrderedFields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_declaration_order() {
        let def: SchemaDef = serde_json::from_str(
            r#"{
                "type": "uint8_t",
                "subtype": "uint16_t",
                "zeta": "bool",
                "alpha": "uint4_t"
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = def.fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["type", "subtype", "zeta", "alpha"]);
    }

    #[test]
    fn test_keeps_duplicate_keys() {
        let def: SchemaDef =
            serde_json::from_str(r#"{"a": "bit", "a": "uint8_t"}"#).unwrap();
        assert_eq!(
            def.fields,
            vec![
                ("a".to_string(), "bit".to_string()),
                ("a".to_string(), "uint8_t".to_string())
            ]
        );
    }

    #[test]
    fn test_rejects_non_string_types() {
        assert!(serde_json::from_str::<SchemaDef>(r#"{"type": 8}"#).is_err());
        assert!(serde_json::from_str::<SchemaDef>(r#"["type"]"#).is_err());
    }
}
