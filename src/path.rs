use std::fmt;

/// A key path into nested objects, like `server.ports.http`.
///
/// Always holds at least one key. An individual key may be empty only
/// when it was written as a quoted empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    keys: Vec<String>,
}

impl Path {
    pub fn from_key(key: impl Into<String>) -> Self {
        Path { keys: vec![key.into()] }
    }

    /// Build from a key list. Panics on an empty list; callers go through
    /// `PathBuilder` or the path parser, which never produce one.
    pub fn from_keys(keys: Vec<String>) -> Self {
        if keys.is_empty() {
            panic!("a path must contain at least one key");
        }
        Path { keys }
    }

    pub fn first(&self) -> &str {
        &self.keys[0]
    }

    /// The path after the first key, or `None` for a single-key path.
    pub fn remainder(&self) -> Option<Path> {
        if self.keys.len() > 1 {
            Some(Path { keys: self.keys[1..].to_vec() })
        } else {
            None
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keys.join("."))
    }
}

/// Accumulates keys front to back while a path expression is parsed.
pub struct PathBuilder {
    keys: Vec<String>,
}

impl PathBuilder {
    pub fn new() -> Self {
        PathBuilder { keys: Vec::new() }
    }

    pub fn append_key(&mut self, key: String) {
        self.keys.push(key);
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Panics when no key was appended; the path parser rejects empty
    /// expressions before getting here.
    pub fn result(self) -> Path {
        Path::from_keys(self.keys)
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        PathBuilder::new()
    }
}
