use std::collections::{BTreeMap, BTreeSet};

use birb_libscan::{
    Makefile, Operator, Target, Variable,
    expand::{expand, expand_variable, reference_name},
};
use linked_hash_map::LinkedHashMap;
use proptest::prelude::*;

fn operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Recursive),
        Just(Operator::Immediate),
        Just(Operator::Conditional),
        Just(Operator::Append),
    ]
}

fn plain_token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_./+@%-]{1,10}"
}

fn variables() -> impl Strategy<Value = LinkedHashMap<String, Variable>> {
    prop::collection::btree_map(
        "[A-Za-z_][A-Za-z0-9_]{0,8}",
        (operator(), prop::collection::vec(plain_token(), 0..5)),
        0..6,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(name, (operator, value))| {
                let variable = Variable {
                    name: name.clone(),
                    operator,
                    value,
                };
                (name, variable)
            })
            .collect()
    })
}

fn statement() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z0-9_./$()=:@<-]{1,8}", 1..5)
        .prop_map(|words| format!("\t{}", words.join(" ")))
}

fn targets() -> impl Strategy<Value = LinkedHashMap<String, Target>> {
    prop::collection::btree_map(
        "[a-z_][a-z0-9_./-]{0,8}",
        (
            prop::collection::vec("[a-z0-9_./-]{1,8}", 0..4),
            prop::collection::vec(statement(), 0..4),
        ),
        0..5,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(name, (dependencies, statements))| {
                let target = Target {
                    name: name.clone(),
                    dependencies,
                    statements,
                };
                (name, target)
            })
            .collect()
    })
}

/// Variables named `V0..Vn` whose values mix references to each other and library flags
fn reference_graph() -> impl Strategy<Value = LinkedHashMap<String, Variable>> {
    (1usize..6).prop_flat_map(|count| {
        let token = prop_oneof![
            (0..count).prop_map(|i| format!("$(V{i})")),
            "-l[a-z]{1,4}",
        ];
        prop::collection::vec(prop::collection::vec(token, 0..4), count).prop_map(|values| {
            values
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    let name = format!("V{i}");
                    let variable = Variable {
                        name: name.clone(),
                        operator: Operator::Recursive,
                        value,
                    };
                    (name, variable)
                })
                .collect()
        })
    })
}

/// Names reachable from `name` in one or more steps
fn reachable(name: &str, variables: &LinkedHashMap<String, Variable>) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![name.to_string()];
    while let Some(current) = stack.pop() {
        let Some(variable) = variables.get(&current) else {
            continue;
        };
        for next in variable.value.iter().filter_map(|token| reference_name(token)) {
            if seen.insert(next.to_string()) {
                stack.push(next.to_string());
            }
        }
    }
    seen
}

proptest! {
    #[test]
    fn expansion_is_identity_without_references(
        tokens in prop::collection::vec(plain_token(), 0..12),
        variables in variables(),
    ) {
        prop_assert_eq!(expand(&tokens, &variables), tokens);
    }

    #[test]
    fn exported_tables_parse_back(variables in variables(), targets in targets()) {
        let makefile = Makefile {
            variables,
            targets,
            comments: BTreeMap::new(),
        };
        let reparsed = Makefile::parse(&makefile.to_makefile_string());
        prop_assert_eq!(reparsed.variables, makefile.variables);
        prop_assert_eq!(reparsed.targets, makefile.targets);
    }

    #[test]
    fn cyclic_expansion_terminates(variables in reference_graph()) {
        for name in variables.keys() {
            let expanded = expand_variable(name, &variables).unwrap();
            // leftover references can only be the ones closing a cycle
            for leftover in expanded.iter().filter_map(|token| reference_name(token)) {
                prop_assert!(
                    reachable(leftover, &variables).contains(leftover),
                    "{leftover} left unexpanded in {name} but is not on a cycle"
                );
            }
            let flags = expanded.iter().filter(|token| token.starts_with("-l")).count();
            let references = expanded.iter().filter_map(|token| reference_name(token)).count();
            prop_assert_eq!(flags + references, expanded.len());
        }
    }
}
