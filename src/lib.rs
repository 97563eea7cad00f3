pub mod ast;
pub mod error;
pub mod export;
pub mod include;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod resolver;

pub use ast::{Origin, Segment, Substitution, Value, ValueKind};
pub use error::SigilError;
pub use include::{FsIncluder, IncludeHandler, MemoryIncluder, NoIncludes};
pub use parser::{Mode, Parser, mode_from_extension, parse_file, parse_path, parse_str, parse_str_named};
pub use path::Path;
pub use resolver::resolve;
