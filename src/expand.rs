use linked_hash_map::LinkedHashMap;

use crate::makefile::Variable;

/// Names being expanded on the current path, innermost first.
///
/// Each call frame only sees its own ancestors, so the same variable can be
/// expanded twice in sibling positions without being mistaken for a cycle.
#[derive(Debug, Clone, Copy)]
struct Chain<'a> {
    name: &'a str,
    parent: Option<&'a Chain<'a>>,
}

impl Chain<'_> {
    fn contains(&self, name: &str) -> bool {
        let mut link = Some(self);
        while let Some(current) = link {
            if current.name == name {
                return true;
            }
            link = current.parent;
        }
        false
    }
}

/// Returns `NAME` if `token` is exactly `$(NAME)`
pub fn reference_name(token: &str) -> Option<&str> {
    let name = token.strip_prefix("$(")?.strip_suffix(')')?;
    let valid = !name.is_empty()
        && !name.chars().any(|c| c.is_whitespace() || matches!(c, '$' | '(' | ')'));
    valid.then_some(name)
}

/// Replaces every `$(NAME)` token naming a known variable with that variable's
/// expanded tokens.
///
/// Unknown references are kept as they are (they usually come from the
/// environment or are built into make), and so are references that would
/// re-enter a variable already being expanded.
pub fn expand(tokens: &[String], variables: &LinkedHashMap<String, Variable>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    expand_into(tokens, variables, None, &mut out);
    out
}

/// Expands the value of the variable `name`, or `None` if there is no such variable.
///
/// The variable itself counts as visited, so a self reference is left unexpanded.
pub fn expand_variable(
    name: &str,
    variables: &LinkedHashMap<String, Variable>,
) -> Option<Vec<String>> {
    let variable = variables.get(name)?;
    let chain = Chain { name, parent: None };
    let mut out = Vec::with_capacity(variable.value.len());
    expand_into(&variable.value, variables, Some(&chain), &mut out);
    Some(out)
}

/// Expands the whitespace separated tokens of a recipe line and joins them
/// back with single spaces.
pub fn expand_statement(statement: &str, variables: &LinkedHashMap<String, Variable>) -> String {
    let tokens = statement
        .split_whitespace()
        .map(str::to_string)
        .collect::<Vec<_>>();
    expand(&tokens, variables).join(" ")
}

fn expand_into(
    tokens: &[String],
    variables: &LinkedHashMap<String, Variable>,
    chain: Option<&Chain<'_>>,
    out: &mut Vec<String>,
) {
    for token in tokens {
        let known = reference_name(token)
            .filter(|name| !chain.is_some_and(|chain| chain.contains(name)))
            .and_then(|name| Some((name, variables.get(name)?)));

        match known {
            Some((name, variable)) => {
                let chain = Chain { name, parent: chain };
                expand_into(&variable.value, variables, Some(&chain), out);
            }
            None => out.push(token.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::makefile::Makefile;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reference_names() {
        assert_eq!(reference_name("$(CC)"), Some("CC"));
        assert_eq!(reference_name("$(lib_base)"), Some("lib_base"));
        assert_eq!(reference_name("$()"), None);
        assert_eq!(reference_name("$(CC"), None);
        assert_eq!(reference_name("-I$(INC)"), None);
        assert_eq!(reference_name("$(patsubst"), None);
        assert_eq!(reference_name("$(a(b))"), None);
        assert_eq!(reference_name("${CC}"), None);
    }

    #[test]
    fn identity_without_references() {
        let makefile = Makefile::parse("CC = gcc\n");
        let input = tokens(&["gcc", "-o", "app", "main.c", "-lm", "$@"]);
        assert_eq!(expand(&input, &makefile.variables), input);
    }

    #[test]
    fn nested_references_are_flattened_in_order() {
        let makefile = Makefile::parse(
            "lib_base = -lssl -lcrypto\n\
             LD_Dependencies = -lb\n\
             LIB_RECURSIVE = $(LD_Dependencies) -la\n\
             LIBS = $(lib_base) $(LIB_RECURSIVE)\n\
             CUSTOM_LIBS = $(LIBS) -lpthread\n",
        );
        assert_eq!(
            expand_variable("CUSTOM_LIBS", &makefile.variables),
            Some(tokens(&["-lssl", "-lcrypto", "-lb", "-la", "-lpthread"]))
        );
    }

    #[test]
    fn unknown_references_pass_through() {
        let makefile = Makefile::parse("FLAGS = $(HOME_FLAGS) -g\n");
        assert_eq!(
            expand_variable("FLAGS", &makefile.variables),
            Some(tokens(&["$(HOME_FLAGS)", "-g"]))
        );
        assert_eq!(expand_variable("MISSING", &makefile.variables), None);
    }

    #[test]
    fn mutual_cycle_terminates() {
        let makefile = Makefile::parse("A = $(B) -la\nB = $(A) -lb\n");
        assert_eq!(
            expand_variable("A", &makefile.variables),
            Some(tokens(&["$(A)", "-lb", "-la"]))
        );
        assert_eq!(
            expand(&tokens(&["$(A)"]), &makefile.variables),
            tokens(&["$(A)", "-lb", "-la"])
        );
        assert_eq!(
            expand_variable("B", &makefile.variables),
            Some(tokens(&["$(B)", "-la", "-lb"]))
        );
    }

    #[test]
    fn self_reference_terminates() {
        let makefile = Makefile::parse("X = $(X) -lx\n");
        assert_eq!(expand_variable("X", &makefile.variables), Some(tokens(&["$(X)", "-lx"])));
    }

    #[test]
    fn siblings_are_not_cycles() {
        let makefile = Makefile::parse("M = -lm\nBOTH = $(M) $(M)\n");
        assert_eq!(
            expand_variable("BOTH", &makefile.variables),
            Some(tokens(&["-lm", "-lm"]))
        );
    }

    #[test]
    fn statements() {
        let makefile = Makefile::parse("CC = gcc\nLIBS = -lz\n");
        assert_eq!(
            expand_statement("\t$(CC)  main.o -o app $(LIBS)", &makefile.variables),
            "gcc main.o -o app -lz"
        );
    }
}
