use std::{
    collections::BTreeMap,
    fmt::Display,
    path::{Path, PathBuf},
};

use linked_hash_map::LinkedHashMap;

mod export;
mod line;
mod parser;

pub use export::{Contents, ExportError};
pub use line::{LineKind, classify};
pub use parser::parse_assignment;

/// File names `make` looks for, in the order it tries them
pub const MAKEFILE_NAMES: &[&str] = &["GNUmakefile", "makefile", "Makefile"];

/// The structure recovered from a Makefile: variables, targets and comments.
///
/// Both tables keep the order in which entries were (last) declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Makefile {
    pub variables: LinkedHashMap<String, Variable>,
    pub targets: LinkedHashMap<String, Target>,
    /// Comment text keyed by zero-based line index
    pub comments: BTreeMap<usize, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub operator: Operator,
    /// Whitespace separated tokens, possibly containing `$(NAME)` references
    pub value: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub dependencies: Vec<String>,
    /// Raw recipe lines, leading tab included
    pub statements: Vec<String>,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            statements: Vec::new(),
        }
    }
}

/// Assignment operator of a variable.
///
/// All of them are treated as "expand at lookup time", the distinction is
/// only kept to reproduce the source faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// `=`
    Recursive,
    /// `:=`
    Immediate,
    /// `?=`
    Conditional,
    /// `+=`
    Append,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Recursive => "=",
            Operator::Immediate => ":=",
            Operator::Conditional => "?=",
            Operator::Append => "+=",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Makefile {
    /// Parses Makefile text. Never fails: lines that cannot be understood are dropped.
    pub fn parse(text: &str) -> Self {
        parser::parse(text)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MakefileLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MakefileLoadError::NotFound(path.to_path_buf()),
            _ => MakefileLoadError::Io(path.to_path_buf(), e),
        })?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }
}

/// Finds a Makefile inside `dir`, using the same names `make` would.
pub fn find_makefile(dir: impl AsRef<Path>) -> Option<PathBuf> {
    MAKEFILE_NAMES
        .iter()
        .map(|name| dir.as_ref().join(name))
        .find(|path| path.is_file())
}

#[derive(Debug, thiserror::Error)]
pub enum MakefileLoadError {
    #[error("Makefile not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read Makefile {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
}
