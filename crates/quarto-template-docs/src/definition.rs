//! Documentation subjects: the non-empty trees of a set.

use quarto_gotemplate::{Tree, TreeSet};
use serde::Serialize;

use crate::anchor::{AnchorKind, identifier};
use crate::linker::linkify;

/// Decide whether a tree should be left out of the documentation.
///
/// A tree is empty when it is absent, unnamed, has no root, or its
/// reproduced source is only whitespace.
pub fn is_empty_tree(tree: Option<&Tree>) -> bool {
    match tree {
        None => true,
        Some(tree) => {
            tree.name.is_empty()
                || tree
                    .root
                    .as_ref()
                    .is_none_or(|root| root.to_string().trim().is_empty())
        }
    }
}

/// A documented template, ready for the page layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub name: String,
    /// Anchor of this template's section.
    pub id: String,
    /// Escaped source with `{{template}}` calls turned into links.
    pub source_html: String,
}

impl Definition {
    pub fn from_tree(tree: &Tree) -> Self {
        Self {
            name: tree.name.clone(),
            id: identifier(AnchorKind::Template, &tree.name),
            source_html: linkify(Some(tree)),
        }
    }
}

/// One definition per non-empty tree, sorted by name.
pub fn definitions_from_tree_set(set: &TreeSet) -> Vec<Definition> {
    definitions_from_trees(set.iter())
}

pub fn definitions_from_trees<'a>(trees: impl IntoIterator<Item = &'a Tree>) -> Vec<Definition> {
    let mut result: Vec<Definition> = trees
        .into_iter()
        .filter(|tree| !is_empty_tree(Some(*tree)))
        .map(Definition::from_tree)
        .collect();
    sort_definitions(&mut result);
    result
}

pub fn sort_definitions(definitions: &mut [Definition]) {
    definitions.sort_by(|a, b| a.name.cmp(&b.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarto_gotemplate::{CommentNode, ListNode, Node, TextNode};

    fn tree(name: &str, text: &str) -> Tree {
        let mut root = ListNode::new();
        root.push(Node::Text(TextNode { text: text.into() }));
        Tree::with_root(name, root)
    }

    #[test]
    fn test_empty_trees() {
        assert!(is_empty_tree(None));
        assert!(is_empty_tree(Some(&Tree::new("rootless"))));
        assert!(is_empty_tree(Some(&tree("", "body"))));
        assert!(is_empty_tree(Some(&tree("blank", " \n\t "))));
        assert!(is_empty_tree(Some(&Tree::with_root("none", ListNode::new()))));
    }

    #[test]
    fn test_non_empty_trees() {
        assert!(!is_empty_tree(Some(&tree("a", "x"))));

        // A comment reproduces as text, so it is documented.
        let mut root = ListNode::new();
        root.push(Node::Comment(CommentNode {
            text: "/* only a note */".into(),
        }));
        assert!(!is_empty_tree(Some(&Tree::with_root("note", root))));
    }

    #[test]
    fn test_definitions_are_filtered_and_sorted() {
        let set: TreeSet = [
            tree("nav", "<nav/>"),
            tree("empty", "   "),
            tree("Footer", "<footer/>"),
            tree("header", "<header/>"),
        ]
        .into_iter()
        .collect();
        let defs = definitions_from_tree_set(&set);
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Footer", "header", "nav"]);
        assert_eq!(defs[2].id, "template--nav");
        assert_eq!(defs[2].source_html, "&lt;nav/&gt;");
    }

    #[test]
    fn test_empty_set_yields_empty_definitions() {
        assert!(definitions_from_tree_set(&TreeSet::new()).is_empty());
    }
}
