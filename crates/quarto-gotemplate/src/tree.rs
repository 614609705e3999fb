/*
 * tree.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Named syntax trees and the set that collects them.

use std::collections::BTreeMap;

use tracing::debug;

use crate::ast::{ListNode, Node};
use crate::error::ParseResult;
use crate::parser;

/// A named template definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    /// Template name, as used by `{{template "name"}}`.
    pub name: String,
    /// Top-level nodes. `None` for a tree that was declared but never parsed.
    pub root: Option<ListNode>,
}

impl Tree {
    /// Create a tree with no root.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: None,
        }
    }

    pub fn with_root(name: impl Into<String>, root: ListNode) -> Self {
        Self {
            name: name.into(),
            root: Some(root),
        }
    }

    /// Reproduce the tree's source text, or an empty string without a root.
    pub fn source(&self) -> String {
        self.root.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    /// True when the root holds nothing but whitespace text and comments.
    ///
    /// This is the parser's own notion of emptiness, used to decide whether a
    /// later definition may replace an earlier one.
    pub fn is_blank(&self) -> bool {
        self.root.as_ref().is_none_or(list_is_blank)
    }
}

fn list_is_blank(list: &ListNode) -> bool {
    list.nodes.iter().all(node_is_blank)
}

fn node_is_blank(node: &Node) -> bool {
    match node {
        Node::Text(text) => text.text.trim().is_empty(),
        Node::Comment(_) => true,
        _ => false,
    }
}

/// A collection of trees keyed by name.
///
/// Iteration is in name order. When a name is added twice, the later tree
/// wins unless it is blank and the earlier one is not; this lets a
/// `{{block}}` default be overridden from another source unit regardless of
/// parse order.
#[derive(Debug, Clone, Default)]
pub struct TreeSet {
    trees: BTreeMap<String, Tree>,
}

impl TreeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one source unit and add every tree it defines.
    ///
    /// The set is left untouched if the unit fails to parse.
    pub fn parse(&mut self, name: &str, source: &str) -> ParseResult<()> {
        let trees = parser::parse(name, source)?;
        debug!(name, trees = trees.len(), "parsed template unit");
        for tree in trees {
            self.insert(tree);
        }
        Ok(())
    }

    /// Add a tree, applying the replacement rule described on [`TreeSet`].
    pub fn insert(&mut self, tree: Tree) {
        if let Some(existing) = self.trees.get(&tree.name) {
            if tree.is_blank() && !existing.is_blank() {
                return;
            }
        }
        self.trees.insert(tree.name.clone(), tree);
    }

    pub fn get(&self, name: &str) -> Option<&Tree> {
        self.trees.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.trees.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tree> {
        self.trees.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a TreeSet {
    type Item = &'a Tree;
    type IntoIter = std::collections::btree_map::Values<'a, String, Tree>;

    fn into_iter(self) -> Self::IntoIter {
        self.trees.values()
    }
}

impl FromIterator<Tree> for TreeSet {
    fn from_iter<I: IntoIterator<Item = Tree>>(iter: I) -> Self {
        let mut set = TreeSet::new();
        for tree in iter {
            set.insert(tree);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TextNode;

    fn text_tree(name: &str, text: &str) -> Tree {
        let mut root = ListNode::new();
        root.push(Node::Text(TextNode { text: text.into() }));
        Tree::with_root(name, root)
    }

    #[test]
    fn test_later_definition_wins() {
        let set: TreeSet = [text_tree("a", "first"), text_tree("a", "second")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().source(), "second");
    }

    #[test]
    fn test_blank_definition_does_not_replace() {
        let set: TreeSet = [text_tree("a", "body"), text_tree("a", "  \n")]
            .into_iter()
            .collect();
        assert_eq!(set.get("a").unwrap().source(), "body");
    }

    #[test]
    fn test_failed_parse_leaves_set_untouched() {
        let mut set = TreeSet::new();
        set.parse("ok", "{{define \"a\"}}A{{end}}").unwrap();
        assert!(set.parse("bad", "{{define \"b\"}}B{{end}}{{if}}").is_err());
        assert!(set.contains("a"));
        assert!(!set.contains("b"));
        assert!(!set.contains("bad"));
    }

    #[test]
    fn test_units_share_one_set() {
        let mut set = TreeSet::new();
        set.parse("layout.gohtml", "{{define \"page\"}}{{template \"body\" .}}{{end}}")
            .unwrap();
        set.parse("body.gohtml", "{{define \"body\"}}hi{{end}}").unwrap();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["body", "body.gohtml", "layout.gohtml", "page"]);
    }

    #[test]
    fn test_blank_roots() {
        assert!(Tree::new("x").is_blank());
        assert!(text_tree("x", " \t\n").is_blank());
        assert!(!text_tree("x", "x").is_blank());
    }
}
