// License: MIT

//! Substitution resolution. Parsing leaves every `${...}` placeholder in
//! the tree; this pass looks the references up against the root and
//! produces a tree with no substitutions left.

use indexmap::IndexMap;

use crate::ast::{Origin, Segment, Substitution, Value, ValueKind};
use crate::error::SigilError;
use crate::path::Path;

/// Resolve every substitution in the tree, looking paths up from `root`.
///
/// A `${?path}` whose target is missing drops its field, or becomes null
/// as an array element. A `${path}` whose target is missing is an error,
/// as is any reference chain that reaches itself again.
pub fn resolve(root: &Value) -> Result<Value, SigilError> {
    let mut stack = Vec::new();
    match resolve_value(root, root, &mut stack)? {
        Some(value) => Ok(value),
        None => Ok(Value::new(ValueKind::Null, root.origin().clone())),
    }
}

/// `None` means the value vanishes: an optional substitution with no
/// target. Containers decide what that does to them.
fn resolve_value(
    value: &Value,
    root: &Value,
    stack: &mut Vec<Path>,
) -> Result<Option<Value>, SigilError> {
    match value.kind() {
        ValueKind::Object(entries) => {
            let mut resolved = IndexMap::with_capacity(entries.len());
            for (key, field) in entries {
                if let Some(field) = resolve_value(field, root, stack)? {
                    resolved.insert(key.clone(), field);
                }
            }
            Ok(Some(Value::new(
                ValueKind::Object(resolved),
                value.origin().clone(),
            )))
        }
        ValueKind::Array(elements) => {
            let mut resolved = Vec::with_capacity(elements.len());
            for element in elements {
                match resolve_value(element, root, stack)? {
                    Some(element) => resolved.push(element),
                    None => resolved.push(Value::new(ValueKind::Null, element.origin().clone())),
                }
            }
            Ok(Some(Value::new(
                ValueKind::Array(resolved),
                value.origin().clone(),
            )))
        }
        ValueKind::Substitution(sub) => resolve_substitution(sub, value.origin(), root, stack),
        _ => Ok(Some(value.clone())),
    }
}

fn resolve_substitution(
    sub: &Substitution,
    origin: &Origin,
    root: &Value,
    stack: &mut Vec<Path>,
) -> Result<Option<Value>, SigilError> {
    // a lone reference passes its value through with its type intact
    if let [Segment::Reference { path, optional }] = sub.segments.as_slice() {
        return match resolve_reference(path, origin, root, stack)? {
            Some(found) => match &sub.fallback {
                Some(fallback) if found.as_object().is_some() => {
                    match resolve_value(fallback, root, stack)? {
                        Some(older) => Ok(Some(found.with_fallback(older))),
                        None => Ok(Some(found)),
                    }
                }
                _ => Ok(Some(found)),
            },
            None => match &sub.fallback {
                Some(fallback) => resolve_value(fallback, root, stack),
                None if *optional => Ok(None),
                None => Err(unresolved(path, origin)),
            },
        };
    }

    // mixed segments interpolate into a string
    let mut rendered = String::new();
    for segment in &sub.segments {
        match segment {
            Segment::Literal(text) => rendered.push_str(text),
            Segment::Reference { path, optional } => {
                match resolve_reference(path, origin, root, stack)? {
                    Some(found) => match found.render_scalar() {
                        Some(text) => rendered.push_str(&text),
                        None => {
                            return Err(SigilError::Resolve {
                                message: format!(
                                    "Cannot interpolate a {} into text: ${{{}}}",
                                    found.type_name(),
                                    path
                                ),
                                origin: origin.clone(),
                                hint: None,
                                code: Some(503),
                            });
                        }
                    },
                    None if *optional => {}
                    None => return Err(unresolved(path, origin)),
                }
            }
        }
    }
    Ok(Some(Value::new(ValueKind::String(rendered), origin.clone())))
}

fn unresolved(path: &Path, origin: &Origin) -> SigilError {
    SigilError::Resolve {
        message: format!("Could not resolve substitution to a value: ${{{}}}", path),
        origin: origin.clone(),
        hint: Some(format!(
            "Set '{}', or write ${{?{}}} to drop the field when it is unset",
            path, path
        )),
        code: Some(501),
    }
}

/// Look a path up in the raw tree and resolve whatever it holds.
/// `None` means no such field. The stack holds the reference chain being
/// followed, for cycle detection.
fn resolve_reference(
    path: &Path,
    origin: &Origin,
    root: &Value,
    stack: &mut Vec<Path>,
) -> Result<Option<Value>, SigilError> {
    if stack.contains(path) {
        let chain = stack
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(SigilError::Resolve {
            message: format!("Substitution cycle while resolving ${{{}}}", path),
            origin: origin.clone(),
            hint: Some(format!("Cycle: {} -> {}", chain, path)),
            code: Some(502),
        });
    }

    let mut current = root;
    for key in path.keys() {
        match current.as_object().and_then(|entries| entries.get(key)) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    stack.push(path.clone());
    let resolved = resolve_value(current, root, stack);
    stack.pop();
    resolved
}
