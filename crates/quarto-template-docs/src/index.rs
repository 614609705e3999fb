//! Page models: the sorted navigation lists and definitions a page shows.
//!
//! There are two ways to obtain the functions a page lists. [`IndexPage`]
//! enumerates a supplied [`FuncMap`], which is exact. [`SourceIndex`] works
//! from raw sources alone and lists the identifiers its templates call.

use std::collections::BTreeMap;

use quarto_gotemplate::{TreeSet, ast::quote};
use serde::Serialize;

use crate::anchor::{AnchorKind, identifier};
use crate::collect::collect_into;
use crate::definition::{Definition, definitions_from_tree_set, is_empty_tree};
use crate::functions::{FuncMap, Function};

/// A navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Label shown in the index.
    pub name: String,
    /// Anchor the entry points at.
    pub safe_id: String,
    /// Parameter and result types, for links backed by a function map.
    pub signature: Option<String>,
}

impl Link {
    pub fn new(kind: AnchorKind, name: &str) -> Self {
        Self {
            name: name.to_string(),
            safe_id: identifier(kind, name),
            signature: None,
        }
    }

    /// `{{template "name" . }}`
    pub fn template(name: &str) -> Self {
        let mut link = Self::new(AnchorKind::Template, name);
        link.name = format!("{{{{template {} . }}}}", quote(name));
        link
    }

    /// `func name(params) results`
    pub fn function(name: &str, function: &Function) -> Self {
        let signature = normalize_signature(&function.signature());
        let mut link = Self::new(AnchorKind::Function, name);
        link.name = format!("func {}{}", name, signature);
        link.signature = Some(signature);
        link
    }
}

/// Drop a leading `func` keyword and shorten `interface {}` to `any`.
fn normalize_signature(signature: &str) -> String {
    signature
        .strip_prefix("func")
        .unwrap_or(signature)
        .replace("interface {}", "any")
}

fn sort_links(links: &mut [Link]) {
    links.sort_by(|a, b| a.name.cmp(&b.name));
}

fn template_links(set: &TreeSet) -> Vec<Link> {
    let mut links: Vec<Link> = set
        .iter()
        .filter(|tree| !is_empty_tree(Some(*tree)))
        .map(|tree| Link::template(&tree.name))
        .collect();
    sort_links(&mut links);
    links
}

/// Everything the page layout reads.
pub trait PageModel {
    /// One link per documented template, sorted by label.
    fn template_links(&self) -> Vec<Link>;

    /// One link per function, sorted by label.
    fn function_links(&self) -> Vec<Link>;

    /// One definition per documented template, sorted by name.
    fn definitions(&self) -> Vec<Definition>;
}

/// Page model for an already-assembled template set and its function map.
#[derive(Debug, Clone, Copy)]
pub struct IndexPage<'a> {
    templates: &'a TreeSet,
    functions: &'a FuncMap,
}

impl<'a> IndexPage<'a> {
    pub fn new(templates: &'a TreeSet, functions: &'a FuncMap) -> Self {
        Self {
            templates,
            functions,
        }
    }
}

impl PageModel for IndexPage<'_> {
    fn template_links(&self) -> Vec<Link> {
        template_links(self.templates)
    }

    fn function_links(&self) -> Vec<Link> {
        let mut links: Vec<Link> = self
            .functions
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, function)| Link::function(name, function))
            .collect();
        sort_links(&mut links);
        links
    }

    fn definitions(&self) -> Vec<Definition> {
        definitions_from_tree_set(self.templates)
    }
}

/// Page model for templates parsed from source files, without a function map.
#[derive(Debug, Clone, Copy)]
pub struct SourceIndex<'a> {
    set: &'a TreeSet,
}

impl<'a> SourceIndex<'a> {
    pub fn new(set: &'a TreeSet) -> Self {
        Self { set }
    }

    fn collected_functions(&self) -> BTreeMap<String, Vec<&'a quarto_gotemplate::Arg>> {
        let mut functions = BTreeMap::new();
        for tree in self.set.iter() {
            collect_into(tree, &mut functions);
        }
        functions
    }
}

impl PageModel for SourceIndex<'_> {
    fn template_links(&self) -> Vec<Link> {
        template_links(self.set)
    }

    fn function_links(&self) -> Vec<Link> {
        let mut links: Vec<Link> = self
            .collected_functions()
            .keys()
            .map(|name| Link::new(AnchorKind::Function, name))
            .collect();
        sort_links(&mut links);
        links
    }

    fn definitions(&self) -> Vec<Definition> {
        definitions_from_tree_set(self.set)
    }
}
