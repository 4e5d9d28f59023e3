use std::{fmt::Debug, path::{Path, PathBuf}};

use crate::{
    dependency::{Confidence, Dependency, DependencySink},
    libraries::{LIBRARY_FLAG_PREFIX, LibraryUsage, extract_libraries},
    makefile::{Makefile, MakefileLoadError},
};

/// Something that inspects a project file and reports the dependencies it declares
pub trait Extractor: Debug {
    /// Short name recorded in the evidence of every dependency found
    fn kind(&self) -> &'static str;

    fn run(&self, sink: &mut dyn DependencySink);
}

/// Maps `-lfoo` to `libfoo.so`
pub fn dependency_name(token: &str) -> Option<String> {
    let base = token.strip_prefix(LIBRARY_FLAG_PREFIX)?;
    (!base.is_empty()).then(|| format!("lib{base}.so"))
}

/// Builds one dependency per library flag, with high confidence evidence pointing at `source`
pub fn library_dependencies(usage: &LibraryUsage, kind: &str, source: &str) -> Vec<Dependency> {
    usage
        .all_libraries()
        .iter()
        .filter_map(|token| dependency_name(token))
        .map(|name| {
            let mut dependency = Dependency::new(name, None);
            dependency.add_evidence(kind, source, Confidence::High);
            dependency
        })
        .collect()
}

/// Finds native libraries linked by a Makefile
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MakeExtractor {
    target: PathBuf,
}

impl MakeExtractor {
    pub const KIND: &'static str = "make";

    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The Makefile path as recorded in the evidence
    pub fn source(&self) -> PathBuf {
        std::path::absolute(&self.target).unwrap_or_else(|_| self.target.clone())
    }

    pub fn parse(&self) -> Result<Makefile, MakefileLoadError> {
        let makefile = Makefile::from_file(self.source())?;
        log::debug!("variables: {:?}", makefile.variables);
        log::debug!("targets: {:?}", makefile.targets);
        Ok(makefile)
    }

    /// Parses the Makefile and extracts its library usage.
    ///
    /// A missing or unreadable file is reported and treated as an empty Makefile.
    pub fn library_usage(&self) -> LibraryUsage {
        match self.parse() {
            Ok(makefile) => extract_libraries(&makefile),
            Err(e) => {
                log::warn!("{e}");
                LibraryUsage::default()
            }
        }
    }

    pub fn dependencies(&self) -> Vec<Dependency> {
        let source = self.source();
        library_dependencies(&self.library_usage(), Self::KIND, &source.to_string_lossy())
    }
}

impl Extractor for MakeExtractor {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn run(&self, sink: &mut dyn DependencySink) {
        for dependency in self.dependencies() {
            log::trace!("{} found {}", Self::KIND, dependency.name);
            sink.add_dependency(dependency);
        }
    }
}
