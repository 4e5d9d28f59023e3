//! Recovers variables, targets and recipes from Makefiles and infers the
//! native libraries (`-lfoo`) a project links against.

pub mod cli;
pub mod dependency;
pub mod expand;
pub mod extractor;
pub mod libraries;
pub mod makefile;

pub use dependency::{Confidence, Dependency, DependencySet, DependencySink, Evidence};
pub use extractor::{Extractor, MakeExtractor};
pub use libraries::{LibraryUsage, extract_libraries};
pub use makefile::{Makefile, Operator, Target, Variable};
