/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parser for Go `text/template` syntax.
//!
//! This crate turns template sources into named syntax trees with the same
//! shape as Go's `text/template/parse` package:
//!
//! - Text and actions: `{{.Field}}`, `{{fn .A "b" | other}}`
//! - Trim markers: `{{- ... -}}`
//! - Comments: `{{/* ... */}}` (kept in the tree)
//! - Control structures: `if`, `else if`, `range`, `with`, `break`, `continue`
//! - Definitions: `{{define "name"}}...{{end}}` and `{{block "name" .}}...{{end}}`
//! - Invocations: `{{template "name" .}}`
//!
//! Every node reproduces source-like text through `Display`, which is what
//! documentation tooling shows to readers.
//!
//! # Example
//!
//! ```
//! use quarto_gotemplate::TreeSet;
//!
//! let mut set = TreeSet::new();
//! set.parse("page.gohtml", r#"{{define "nav"}}<nav>{{.Title}}</nav>{{end}}"#)?;
//!
//! let nav = set.get("nav").expect("nav is defined");
//! assert_eq!(nav.source(), "<nav>{{.Title}}</nav>");
//! # Ok::<(), quarto_gotemplate::ParseError>(())
//! ```

pub mod ast;
pub mod error;
mod lexer;
pub mod parser;
pub mod tree;

pub use ast::{
    ActionNode, Arg, BranchNode, CommandNode, CommentNode, ListNode, Node, NodeType, PipeNode,
    TemplateNode, TextNode,
};
pub use error::{ParseError, ParseResult};
pub use parser::parse;
pub use tree::{Tree, TreeSet};
