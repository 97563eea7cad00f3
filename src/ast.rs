use std::fmt;

use indexmap::IndexMap;

use crate::path::Path;

/// Where a value or error came from: a source description plus the line
/// it was seen on, when one is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub description: String,
    pub line: Option<usize>,
}

impl Origin {
    pub fn new(description: impl Into<String>) -> Self {
        Origin { description: description.into(), line: None }
    }

    pub fn with_line(description: impl Into<String>, line: usize) -> Self {
        Origin { description: description.into(), line: Some(line) }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}: line {}", self.description, line),
            None => write!(f, "{}", self.description),
        }
    }
}

/// One piece of an unresolved substitution.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Reference { path: Path, optional: bool },
}

/// A `${...}` placeholder, possibly concatenated with literal text.
///
/// Parsing never looks references up; the placeholder sits in the tree
/// until `resolve` runs. When a substitution shadows earlier values during
/// merging, those values are kept here for resolution time.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub segments: Vec<Segment>,
    pub fallback: Option<Box<Value>>,
}

impl Substitution {
    pub fn new(segments: Vec<Segment>) -> Self {
        Substitution { segments, fallback: None }
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => write!(f, "{}", text)?,
                Segment::Reference { path, optional } => {
                    if *optional {
                        write!(f, "${{?{}}}", path)?;
                    } else {
                        write!(f, "${{{}}}", path)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Object(IndexMap<String, Value>),
    Array(Vec<Value>),
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Substitution(Substitution),
}

/// A node of the parsed tree. Immutable once built; every node knows
/// where it came from. Equality is structural and ignores origins.
#[derive(Debug, Clone)]
pub struct Value {
    kind: ValueKind,
    origin: Origin,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Value {
    pub fn new(kind: ValueKind, origin: Origin) -> Self {
        Value { kind, origin }
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub(crate) fn into_kind(self) -> ValueKind {
        self.kind
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match &self.kind {
            ValueKind::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            ValueKind::Object(_) => "object",
            ValueKind::Array(_) => "array",
            ValueKind::String(_) => "string",
            ValueKind::Number(_) => "number",
            ValueKind::Bool(_) => "boolean",
            ValueKind::Null => "null",
            ValueKind::Substitution(_) => "substitution",
        }
    }

    /// The text a scalar contributes when values are glued together on one
    /// line, and when non-string tokens appear inside a path.
    pub(crate) fn render_scalar(&self) -> Option<String> {
        match &self.kind {
            ValueKind::String(s) => Some(s.clone()),
            ValueKind::Number(n) => Some(n.to_string()),
            ValueKind::Bool(b) => Some(b.to_string()),
            ValueKind::Null => Some("null".to_string()),
            _ => None,
        }
    }

    /// Merge `self` over `fallback`. Declarations seen later in the text
    /// are always the `self` side.
    ///
    /// Two objects merge key by key: `self`'s entry wins, and entries that
    /// are objects on both sides merge recursively. A substitution cannot
    /// be merged yet, so it records the shadowed value for resolution
    /// time. Anything else shadows the fallback completely.
    pub fn with_fallback(mut self, fallback: Value) -> Value {
        match (&mut self.kind, fallback.kind) {
            (ValueKind::Object(primary), ValueKind::Object(older)) => {
                // Keys keep first-declaration order.
                let mut merged = IndexMap::with_capacity(primary.len() + older.len());
                for (key, old) in older {
                    match primary.shift_remove(&key) {
                        Some(new) => {
                            merged.insert(key, new.with_fallback(old));
                        }
                        None => {
                            merged.insert(key, old);
                        }
                    }
                }
                for (key, new) in primary.drain(..) {
                    merged.insert(key, new);
                }
                *primary = merged;
                self
            }
            (ValueKind::Substitution(sub), older_kind) => {
                let older = Value::new(older_kind, fallback.origin);
                // Fallbacks recorded earlier sit closer to the
                // substitution and win over later ones.
                sub.fallback = Some(Box::new(match sub.fallback.take() {
                    Some(chain) => chain.with_fallback(older),
                    None => older,
                }));
                self
            }
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Origin {
        Origin::new("test")
    }

    fn num(n: f64) -> Value {
        Value::new(ValueKind::Number(n), origin())
    }

    fn string(s: &str) -> Value {
        Value::new(ValueKind::String(s.into()), origin())
    }

    fn obj(entries: Vec<(&str, Value)>) -> Value {
        let map: IndexMap<String, Value> =
            entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        Value::new(ValueKind::Object(map), origin())
    }

    fn subst(key: &str) -> Value {
        let sub = Substitution::new(vec![Segment::Reference {
            path: Path::from_key(key),
            optional: false,
        }]);
        Value::new(ValueKind::Substitution(sub), origin())
    }

    #[test]
    fn test_object_merge_is_key_union() {
        let merged = obj(vec![("a", num(1.0))]).with_fallback(obj(vec![("b", num(2.0))]));
        assert_eq!(merged, obj(vec![("b", num(2.0)), ("a", num(1.0))]));
    }

    #[test]
    fn test_primary_wins_per_key() {
        let merged = obj(vec![("x", num(2.0))]).with_fallback(obj(vec![("x", num(1.0))]));
        let entries = merged.as_object().expect("Failed to get merged object");
        assert_eq!(entries["x"], num(2.0));
    }

    #[test]
    fn test_nested_objects_merge_recursively() {
        let merged = obj(vec![("o", obj(vec![("b", num(2.0))]))])
            .with_fallback(obj(vec![("o", obj(vec![("a", num(1.0))]))]));
        assert_eq!(
            merged,
            obj(vec![("o", obj(vec![("a", num(1.0)), ("b", num(2.0))]))])
        );
    }

    #[test]
    fn test_scalar_primary_shadows_object() {
        let merged = string("flat").with_fallback(obj(vec![("a", num(1.0))]));
        assert_eq!(merged, string("flat"));
    }

    #[test]
    fn test_object_primary_shadows_scalar() {
        let primary = obj(vec![("a", num(1.0))]);
        let merged = primary.clone().with_fallback(string("flat"));
        assert_eq!(merged, primary);
    }

    #[test]
    fn test_substitution_remembers_fallback() {
        let merged = subst("ref").with_fallback(obj(vec![("a", num(1.0))]));
        match merged.kind() {
            ValueKind::Substitution(sub) => {
                let fallback = sub.fallback.as_deref().expect("Failed to record fallback");
                assert_eq!(*fallback, obj(vec![("a", num(1.0))]));
            }
            other => panic!("Expected a substitution, got {:?}", other),
        }
    }

    #[test]
    fn test_substitution_fallback_chain_prefers_earlier() {
        let chained = subst("ref")
            .with_fallback(obj(vec![("x", num(1.0))]))
            .with_fallback(obj(vec![("x", num(9.0)), ("y", num(2.0))]));
        match chained.kind() {
            ValueKind::Substitution(sub) => {
                let fallback = sub.fallback.as_deref().expect("Failed to record fallback");
                assert_eq!(
                    *fallback,
                    obj(vec![("x", num(1.0)), ("y", num(2.0))])
                );
            }
            other => panic!("Expected a substitution, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_is_associative() {
        let a = obj(vec![("x", num(1.0)), ("n", obj(vec![("p", num(1.0))]))]);
        let b = obj(vec![("x", num(2.0)), ("n", obj(vec![("q", num(2.0))]))]);
        let c = obj(vec![("y", num(3.0)), ("n", obj(vec![("r", num(3.0))]))]);

        let left = a.clone().with_fallback(b.clone()).with_fallback(c.clone());
        let right = a.with_fallback(b.with_fallback(c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_equality_ignores_origins() {
        let here = Value::new(ValueKind::Number(7.0), Origin::with_line("a.sigil", 3));
        let there = Value::new(ValueKind::Number(7.0), Origin::with_line("b.sigil", 9));
        assert_eq!(here, there);
    }

    #[test]
    fn test_substitution_display() {
        let sub = Substitution::new(vec![
            Segment::Literal("foo ".into()),
            Segment::Reference { path: Path::from_key("bar"), optional: false },
            Segment::Literal(" baz".into()),
            Segment::Reference { path: Path::from_key("opt"), optional: true },
        ]);
        assert_eq!(sub.to_string(), "foo ${bar} baz${?opt}");
    }
}
