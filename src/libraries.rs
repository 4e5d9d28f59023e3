use std::sync::LazyLock;

use linked_hash_map::LinkedHashMap;
use linked_hash_set::LinkedHashSet;
use regex::Regex;

use crate::{
    expand::{expand_statement, expand_variable},
    makefile::Makefile,
};

/// Prefix of a linker flag requesting a library
pub const LIBRARY_FLAG_PREFIX: &str = "-l";

static LIBRARY_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-l\w+").expect("library flag pattern must compile"));

/// Where `-lxxx` flags were found in a Makefile
#[derive(Debug, Clone, Default)]
pub struct LibraryUsage {
    /// Flags carried by variables whose expansion holds at least one `-l` token
    pub libraries: LinkedHashSet<String>,
    /// Targets whose expanded recipe mentions one of `libraries`
    pub used_in_targets: LinkedHashSet<String>,
    /// Every `-l` flag appearing in a target's expanded recipe, in order of appearance
    pub direct_library_usage: LinkedHashMap<String, Vec<String>>,
}

impl LibraryUsage {
    /// All library flags found, from variables and from recipes, without duplicates
    pub fn all_libraries(&self) -> LinkedHashSet<String> {
        self.libraries
            .iter()
            .chain(self.direct_library_usage.values().flatten())
            .filter(|token| token.starts_with(LIBRARY_FLAG_PREFIX))
            .cloned()
            .collect()
    }
}

pub fn is_library_flag(token: &str) -> bool {
    token.starts_with(LIBRARY_FLAG_PREFIX)
}

pub fn extract_libraries(makefile: &Makefile) -> LibraryUsage {
    let variables = &makefile.variables;
    let mut usage = LibraryUsage::default();

    for name in variables.keys() {
        let Some(expanded) = expand_variable(name, variables) else {
            continue;
        };
        if !expanded.iter().any(|token| is_library_flag(token)) {
            continue;
        }
        log::trace!("variable {name} carries libraries: {expanded:?}");
        for token in expanded.into_iter().filter(|token| is_library_flag(token)) {
            usage.libraries.insert(token);
        }
    }

    for (name, target) in makefile.targets.iter() {
        let statements = target
            .statements
            .iter()
            .map(|statement| expand_statement(statement, variables))
            .collect::<Vec<_>>();

        let uses_known_library = statements.iter().any(|statement| {
            usage
                .libraries
                .iter()
                .any(|library| statement.contains(library.as_str()))
        });
        if uses_known_library {
            usage.used_in_targets.insert(name.clone());
        }

        // second pass, catches flags typed straight into the recipe
        for statement in &statements {
            let found = LIBRARY_FLAG
                .find_iter(statement)
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>();
            if !found.is_empty() {
                usage
                    .direct_library_usage
                    .entry(name.clone())
                    .or_insert_with(Vec::new)
                    .extend(found);
            }
        }
    }

    log::debug!(
        "libraries: {:?}, used in targets: {:?}, direct usage: {:?}",
        usage.libraries,
        usage.used_in_targets,
        usage.direct_library_usage
    );

    usage
}
