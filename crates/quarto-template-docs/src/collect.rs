//! Identifier collection over a tree's top-level actions.
//!
//! Source-mode pages have no function map, so the functions they list are the
//! bare identifiers that templates call. Only top-level actions are visited;
//! identifiers inside control-structure bodies are not collected.

use std::collections::BTreeMap;

use quarto_gotemplate::{Arg, Node, NodeType, Tree};

/// Map each identifier used in `tree` to the argument nodes it appears as.
pub fn collect_function_names(tree: &Tree) -> BTreeMap<String, Vec<&Arg>> {
    let mut functions = BTreeMap::new();
    collect_into(tree, &mut functions);
    functions
}

/// Accumulate identifiers from `tree` into an existing map.
pub fn collect_into<'a>(tree: &'a Tree, functions: &mut BTreeMap<String, Vec<&'a Arg>>) {
    let Some(root) = &tree.root else {
        return;
    };
    for node in &root.nodes {
        let Node::Action(action) = node else {
            continue;
        };
        for cmd in &action.pipe.cmds {
            for arg in &cmd.args {
                if arg.node_type() != NodeType::Identifier {
                    continue;
                }
                functions.entry(arg.to_string()).or_default().push(arg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarto_gotemplate::TreeSet;

    fn parse_tree(source: &str) -> Tree {
        let mut set = TreeSet::new();
        set.parse("t", source).expect("source should parse");
        set.get("t").cloned().expect("tree t exists")
    }

    #[test]
    fn test_collects_identifiers_from_actions() {
        let tree = parse_tree(r#"{{now | printf "%v"}} {{markdown .Body}} {{printf "%d" 1}}"#);
        let functions = collect_function_names(&tree);
        let names: Vec<&str> = functions.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["markdown", "now", "printf"]);
        assert_eq!(functions["printf"].len(), 2);
    }

    #[test]
    fn test_ignores_non_identifiers() {
        let tree = parse_tree(r#"{{.Field}} {{$x := "lit"}} {{$x}} {{1}} {{true}} {{nil}}"#);
        assert!(collect_function_names(&tree).is_empty());
    }

    #[test]
    fn test_does_not_descend_into_control_structures() {
        let tree = parse_tree("{{if .A}}{{upper .B}}{{end}}{{lower .C}}");
        let functions = collect_function_names(&tree);
        assert!(functions.contains_key("lower"));
        assert!(!functions.contains_key("upper"));
    }

    #[test]
    fn test_nested_pipes_are_not_identifiers() {
        let tree = parse_tree("{{len (slice .A 1)}}");
        let names: Vec<String> = collect_function_names(&tree).into_keys().collect();
        assert_eq!(names, vec!["len".to_string()]);
    }

    #[test]
    fn test_rootless_tree_yields_nothing() {
        assert!(collect_function_names(&Tree::new("x")).is_empty());
    }

    #[test]
    fn test_accumulates_across_trees() {
        let a = parse_tree("{{upper .A}}");
        let b = parse_tree("{{upper .B}}{{lower .C}}");
        let mut functions = BTreeMap::new();
        collect_into(&a, &mut functions);
        collect_into(&b, &mut functions);
        assert_eq!(functions["upper"].len(), 2);
        assert_eq!(functions["lower"].len(), 1);
    }
}
