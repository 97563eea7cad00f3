// License: MIT

//! Include handlers. An `include "name"` statement asks the installed
//! handler for an object to splice into the one being built; the
//! handlers here cover the filesystem, in-memory documents, and the
//! refuse-everything case.

use std::collections::HashSet;
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::ast::{Origin, Value, ValueKind};
use crate::error::SigilError;
use crate::parser::{Mode, Parser, mode_from_extension};

/// Supplies the object spliced in by an `include "name"` statement.
///
/// The handler is consulted with the name exactly as written. The
/// returned entries merge into the object under construction; an
/// included field wins over one declared earlier in the same object,
/// keeping the earlier value as its fallback.
pub trait IncludeHandler {
    fn include(&mut self, name: &str) -> Result<IndexMap<String, Value>, SigilError>;
}

/// Refuses every include. Installed when parsing bare strings, which
/// have no sensible place to load includes from.
pub struct NoIncludes;

impl IncludeHandler for NoIncludes {
    fn include(&mut self, name: &str) -> Result<IndexMap<String, Value>, SigilError> {
        Err(SigilError::Io {
            message: format!("Cannot include '{}': no include handler is installed", name),
            origin: Origin::new(name),
            code: Some(403),
        })
    }
}

/// Loads includes from the filesystem, relative to a base directory.
///
/// Included files may include further files, resolved against their own
/// directory. `~/` expands to the home directory and absolute paths are
/// taken as written. A `.json` include parses strictly, everything else
/// permissively. A file in the middle of being included may not be
/// included again beneath itself.
pub struct FsIncluder {
    base_dir: PathBuf,
    visited: HashSet<PathBuf>,
}

impl FsIncluder {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FsIncluder {
            base_dir: base_dir.into(),
            visited: HashSet::new(),
        }
    }

    fn resolve_name(&self, name: &str) -> PathBuf {
        if let Some(rest) = name.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        let candidate = PathBuf::from(name);
        if candidate.is_absolute() {
            candidate
        } else {
            self.base_dir.join(candidate)
        }
    }

    fn load(
        &self,
        path: &std::path::Path,
        name: &str,
    ) -> Result<IndexMap<String, Value>, SigilError> {
        let description = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|e| SigilError::Io {
            message: format!("Failed to read include '{}': {}", name, e),
            origin: Origin::new(description.clone()),
            code: Some(401),
        })?;
        let mut nested = FsIncluder {
            base_dir: path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| self.base_dir.clone()),
            // carry the in-flight set down so nested includes see their ancestors
            visited: self.visited.clone(),
        };
        let mode = mode_from_extension(path);
        let root = Parser::new(&source, &description, mode, &mut nested).parse_document()?;
        object_entries(root, name)
    }
}

impl IncludeHandler for FsIncluder {
    fn include(&mut self, name: &str) -> Result<IndexMap<String, Value>, SigilError> {
        let resolved = self.resolve_name(name);
        let canonical = resolved.canonicalize().map_err(|e| SigilError::Io {
            message: format!("Cannot include '{}': {}", name, e),
            origin: Origin::new(resolved.display().to_string()),
            code: Some(401),
        })?;
        if !self.visited.insert(canonical.clone()) {
            return Err(SigilError::Io {
                message: format!("Include cycle detected while loading '{}'", name),
                origin: Origin::new(canonical.display().to_string()),
                code: Some(402),
            });
        }
        let result = self.load(&canonical, name);
        self.visited.remove(&canonical);
        result
    }
}

/// Serves includes from named in-memory documents. Handy in tests and
/// for configuration assembled at runtime.
#[derive(Default)]
pub struct MemoryIncluder {
    documents: IndexMap<String, String>,
    visited: HashSet<String>,
}

impl MemoryIncluder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.documents.insert(name.into(), source.into());
    }
}

impl IncludeHandler for MemoryIncluder {
    fn include(&mut self, name: &str) -> Result<IndexMap<String, Value>, SigilError> {
        let source = match self.documents.get(name) {
            Some(source) => source.clone(),
            None => {
                return Err(SigilError::Io {
                    message: format!("No document named '{}' is registered", name),
                    origin: Origin::new(name),
                    code: Some(404),
                });
            }
        };
        if !self.visited.insert(name.to_string()) {
            return Err(SigilError::Io {
                message: format!("Include cycle detected while loading '{}'", name),
                origin: Origin::new(name),
                code: Some(402),
            });
        }
        let root = Parser::new(&source, name, Mode::Permissive, self).parse_document();
        self.visited.remove(name);
        object_entries(root?, name)
    }
}

fn object_entries(root: Value, name: &str) -> Result<IndexMap<String, Value>, SigilError> {
    let type_name = root.type_name();
    let origin = root.origin().clone();
    match root.into_kind() {
        ValueKind::Object(entries) => Ok(entries),
        _ => Err(SigilError::Parse {
            message: format!(
                "Included document '{}' must have an object at the root, got: {}",
                name, type_name
            ),
            origin,
            hint: None,
            code: Some(405),
        }),
    }
}
