// License: MIT

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::ast::{Value, ValueKind};
use crate::error::SigilError;

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.kind() {
            ValueKind::Null => serializer.serialize_unit(),
            ValueKind::Bool(b) => serializer.serialize_bool(*b),
            ValueKind::Number(n) => {
                // whole numbers print without a fractional part
                if n.fract() == 0.0
                    && n.is_finite()
                    && *n >= i64::MIN as f64
                    && *n <= i64::MAX as f64
                {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            ValueKind::String(s) => serializer.serialize_str(s),
            ValueKind::Array(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in elements {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            ValueKind::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            ValueKind::Substitution(sub) => serializer.serialize_str(&sub.to_string()),
        }
    }
}

/// Render a value tree as pretty-printed JSON.
///
/// Converts values to their JSON equivalents:
/// - Strings, numbers, booleans, null → direct mapping
/// - Arrays, objects → nested JSON structures, object key order kept
/// - Unresolved substitutions → their source text, as a string
///
/// Resolve the tree first if substitutions should be looked up rather
/// than printed.
///
/// # Examples
/// ```
/// use sigil_cfg::{Mode, export, parse_str};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = parse_str("{ port: 8080 }", Mode::Permissive)?;
/// let json = export::to_json_string(&root)?;
/// assert!(json.contains("8080"));
/// # Ok(())
/// # }
/// ```
pub fn to_json_string(value: &Value) -> Result<String, SigilError> {
    serde_json::to_string_pretty(value).map_err(|e| SigilError::Io {
        message: format!("Failed to render JSON: {}", e),
        origin: value.origin().clone(),
        code: Some(407),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Mode, parse_str};
    use crate::resolver::resolve;

    #[test]
    fn test_exports_nested_objects_and_arrays() {
        let root = parse_str(
            r#"{ server: { host: "localhost", ports: [80, 8080] }, debug: false }"#,
            Mode::Permissive,
        )
        .expect("Failed to parse");

        let json = to_json_string(&root).expect("Failed to export");
        let v: serde_json::Value = serde_json::from_str(&json).expect("Export was not valid JSON");

        assert_eq!(v["server"]["host"], "localhost");
        assert_eq!(v["server"]["ports"][1], 8080);
        assert_eq!(v["debug"], false);
    }

    #[test]
    fn test_whole_numbers_export_without_a_fraction() {
        let root = parse_str("{ n: 42, f: 1.5 }", Mode::Permissive).expect("Failed to parse");
        let json = to_json_string(&root).expect("Failed to export");

        let v: serde_json::Value = serde_json::from_str(&json).expect("Export was not valid JSON");
        assert_eq!(v["n"].to_string(), "42");
        assert_eq!(v["f"].to_string(), "1.5");
    }

    #[test]
    fn test_unresolved_substitutions_export_as_their_source_text() {
        let root = parse_str("{ a: ${b} }", Mode::Permissive).expect("Failed to parse");
        let json = to_json_string(&root).expect("Failed to export");

        let v: serde_json::Value = serde_json::from_str(&json).expect("Export was not valid JSON");
        assert_eq!(v["a"], "${b}");
    }

    #[test]
    fn test_resolved_output_round_trips_through_strict_parsing() {
        let root = parse_str(
            r#"{ base: { timeout: 30 }, service: { retries: 3 }, service: ${base} }"#,
            Mode::Permissive,
        )
        .expect("Failed to parse");
        let resolved = resolve(&root).expect("Failed to resolve");

        let json = to_json_string(&resolved).expect("Failed to export");
        let reparsed = parse_str(&json, Mode::Strict).expect("Export did not parse as JSON");
        assert_eq!(reparsed, resolved);
    }
}
