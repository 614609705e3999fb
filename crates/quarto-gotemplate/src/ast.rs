/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template syntax tree types.
//!
//! The node shapes follow Go's `text/template/parse` package. Every node
//! implements [`Display`](std::fmt::Display) to reproduce source-like text in
//! the same format as the Go parser's `String()` methods: trim markers are
//! dropped, whitespace inside actions is normalised, and string literals keep
//! their original quoting.

use std::fmt;

/// The kind of an argument node inside a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Bool,
    Chain,
    Dot,
    Field,
    Identifier,
    Nil,
    Number,
    Pipe,
    String,
    Variable,
}

/// A node in a template's top-level or nested list.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Plain text between actions.
    Text(TextNode),

    /// A non-control action: `{{pipeline}}`.
    Action(ActionNode),

    /// A comment: `{{/* ... */}}`.
    Comment(CommentNode),

    /// `{{if pipeline}} list {{else}} list {{end}}`
    If(BranchNode),

    /// `{{range pipeline}} list {{else}} list {{end}}`
    Range(BranchNode),

    /// `{{with pipeline}} list {{else}} list {{end}}`
    With(BranchNode),

    /// `{{template "name" pipeline}}`, also produced in place of a `{{block}}`.
    Template(TemplateNode),

    /// `{{break}}`
    Break,

    /// `{{continue}}`
    Continue,
}

/// An ordered sequence of nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListNode {
    pub nodes: Vec<Node>,
}

impl ListNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
}

/// Comment text, including the `/*` and `*/` markers.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionNode {
    /// 1-based line where the action starts.
    pub line: usize,
    pub pipe: PipeNode,
}

/// A pipeline with optional variable declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipeNode {
    /// True for `$x = value` (assignment), false for `$x := value`.
    pub is_assign: bool,
    /// Declared or assigned variables, with their `$` prefix.
    pub decl: Vec<String>,
    pub cmds: Vec<CommandNode>,
}

/// A single command: an operand followed by its arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandNode {
    pub args: Vec<Arg>,
}

/// An operand within a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Bool(bool),
    /// A term followed by field accesses, such as `(pipe).Field` or `fn.Field`.
    Chain { node: Box<Arg>, fields: Vec<String> },
    Dot,
    /// A field chain rooted at dot: `.A.B` is `["A", "B"]`.
    Field(Vec<String>),
    /// A bare identifier, typically a function name.
    Identifier(String),
    Nil,
    /// A numeric or character constant, kept as written.
    Number(String),
    /// A parenthesised pipeline.
    Pipe(PipeNode),
    /// A string constant: the original quoted form and the unquoted value.
    String { quoted: String, text: String },
    /// A variable with optional field accesses: `$x.A` is `["$x", "A"]`.
    Variable(Vec<String>),
}

impl Arg {
    pub fn node_type(&self) -> NodeType {
        match self {
            Arg::Bool(_) => NodeType::Bool,
            Arg::Chain { .. } => NodeType::Chain,
            Arg::Dot => NodeType::Dot,
            Arg::Field(_) => NodeType::Field,
            Arg::Identifier(_) => NodeType::Identifier,
            Arg::Nil => NodeType::Nil,
            Arg::Number(_) => NodeType::Number,
            Arg::Pipe(_) => NodeType::Pipe,
            Arg::String { .. } => NodeType::String,
            Arg::Variable(_) => NodeType::Variable,
        }
    }
}

/// Shared shape of `if`, `range` and `with`.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub line: usize,
    pub pipe: PipeNode,
    pub list: ListNode,
    /// `{{else if ...}}` and `{{else with ...}}` appear here as a single nested
    /// branch node, as in Go's parser.
    pub else_list: Option<ListNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateNode {
    pub line: usize,
    /// Name of the invoked template (unquoted).
    pub name: String,
    pub pipe: Option<PipeNode>,
}

/// Quote a string the way Go's `strconv.Quote` does.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0B}' => out.push_str("\\v"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if !is_print(c) && (c as u32) < 0x10000 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c if !is_print(c) => out.push_str(&format!("\\U{:08x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Format characters (Unicode category Cf).
const FORMAT_RANGES: &[(u32, u32)] = &[
    (0x00AD, 0x00AD),
    (0x0600, 0x0605),
    (0x061C, 0x061C),
    (0x06DD, 0x06DD),
    (0x070F, 0x070F),
    (0x0890, 0x0891),
    (0x08E2, 0x08E2),
    (0x180E, 0x180E),
    (0x200B, 0x200F),
    (0x202A, 0x202E),
    (0x2060, 0x2064),
    (0x2066, 0x206F),
    (0xFEFF, 0xFEFF),
    (0xFFF9, 0xFFFB),
    (0x110BD, 0x110BD),
    (0x110CD, 0x110CD),
    (0x13430, 0x1343F),
    (0x1BCA0, 0x1BCA3),
    (0x1D173, 0x1D17A),
    (0xE0001, 0xE0001),
    (0xE0020, 0xE007F),
];

/// Approximates Go's `unicode.IsPrint`: the ASCII space is printable; other
/// spaces, controls, format characters, private-use code points and
/// noncharacters are not.
fn is_print(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    let code = c as u32;
    let private_use = (0xE000..=0xF8FF).contains(&code) || code >= 0xF0000;
    let noncharacter = (0xFDD0..=0xFDEF).contains(&code) || code & 0xFFFE == 0xFFFE;
    let format = FORMAT_RANGES
        .iter()
        .any(|(start, end)| (*start..=*end).contains(&code));
    !(c.is_control() || c.is_whitespace() || private_use || noncharacter || format)
}

/// Decode a double-quoted Go string literal, as produced by [`quote`].
///
/// Returns `None` when `quoted` is not a well-formed literal.
pub fn unquote(quoted: &str) -> Option<String> {
    let body = quoted.strip_prefix('"')?.strip_suffix('"')?;
    crate::lexer::unquote(body).ok()
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(text) => f.write_str(&text.text),
            Node::Action(action) => write!(f, "{{{{{}}}}}", action.pipe),
            Node::Comment(comment) => write!(f, "{{{{{}}}}}", comment.text),
            Node::If(branch) => branch.write_to(f, "if"),
            Node::Range(branch) => branch.write_to(f, "range"),
            Node::With(branch) => branch.write_to(f, "with"),
            Node::Template(template) => match &template.pipe {
                Some(pipe) => write!(f, "{{{{template {} {}}}}}", quote(&template.name), pipe),
                None => write!(f, "{{{{template {}}}}}", quote(&template.name)),
            },
            Node::Break => f.write_str("{{break}}"),
            Node::Continue => f.write_str("{{continue}}"),
        }
    }
}

impl BranchNode {
    fn write_to(&self, f: &mut fmt::Formatter<'_>, keyword: &str) -> fmt::Result {
        write!(f, "{{{{{} {}}}}}{}", keyword, self.pipe, self.list)?;
        if let Some(else_list) = &self.else_list {
            write!(f, "{{{{else}}}}{}", else_list)?;
        }
        f.write_str("{{end}}")
    }
}

impl fmt::Display for ListNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

impl fmt::Display for PipeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.decl.is_empty() {
            f.write_str(&self.decl.join(", "))?;
            f.write_str(if self.is_assign { " = " } else { " := " })?;
        }
        for (i, cmd) in self.cmds.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", cmd)?;
        }
        Ok(())
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match arg {
                Arg::Pipe(pipe) => write!(f, "({})", pipe)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Bool(value) => write!(f, "{}", value),
            Arg::Chain { node, fields } => {
                match node.as_ref() {
                    Arg::Pipe(pipe) => write!(f, "({})", pipe)?,
                    other => write!(f, "{}", other)?,
                }
                for field in fields {
                    write!(f, ".{}", field)?;
                }
                Ok(())
            }
            Arg::Dot => f.write_str("."),
            Arg::Field(idents) => {
                for ident in idents {
                    write!(f, ".{}", ident)?;
                }
                Ok(())
            }
            Arg::Identifier(name) => f.write_str(name),
            Arg::Nil => f.write_str("nil"),
            Arg::Number(text) => f.write_str(text),
            Arg::Pipe(pipe) => write!(f, "{}", pipe),
            Arg::String { quoted, .. } => f.write_str(quoted),
            Arg::Variable(idents) => f.write_str(&idents.join(".")),
        }
    }
}
