//! Browsable HTML reference pages for Go `text/template` sources.
//!
//! Every named template in a set gets a section showing its reproduced
//! source, with each `{{template "name"}}` call turned into a link to the
//! invoked template's section. An index at the top lists the templates and
//! the helper functions available to them.
//!
//! Pages come from one of two places:
//!
//! - [`server::documentation_router`] documents a [`TreeSet`] and [`FuncMap`]
//!   assembled by the caller, so function signatures are exact.
//! - [`server::source_router`] parses a directory of template files on each
//!   request and lists the function names the templates call.
//!
//! [`TreeSet`]: quarto_gotemplate::TreeSet

pub mod anchor;
pub mod collect;
pub mod config;
pub mod definition;
pub mod error;
pub mod functions;
pub mod index;
pub mod layout;
pub mod linker;
pub mod server;
pub mod source;

pub use anchor::{AnchorKind, identifier};
pub use config::DocsConfig;
pub use definition::{Definition, definitions_from_tree_set, is_empty_tree};
pub use error::{Error, Result};
pub use functions::{DescribeSignature, FuncMap, Function, Signature};
pub use index::{IndexPage, Link, PageModel, SourceIndex};
pub use layout::render_page;
pub use linker::linkify;
