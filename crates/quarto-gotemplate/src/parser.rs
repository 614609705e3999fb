/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parser for Go `text/template` sources.
//!
//! Parsing happens in two passes. The scanner splits the source into text,
//! comment and action items, applying `{{-`/`-}}` whitespace trimming as it
//! goes. The second pass is a recursive descent over those items that builds
//! the node lists and splits `{{define}}` and `{{block}}` bodies out into their
//! own trees.
//!
//! Function names are never checked against a function map: any bare
//! identifier is accepted as a function call.

use std::cell::Cell;

use tracing::trace;

use crate::ast::{
    ActionNode, Arg, BranchNode, CommandNode, CommentNode, ListNode, Node, PipeNode, TemplateNode,
    TextNode,
};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Keyword, LexError, Token, TokenKind, lex_action};
use crate::tree::Tree;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";

/// Deepest nesting of parenthesized pipelines, control structures and
/// blocks that a source may use.
pub const MAX_DEPTH: usize = 256;

/// Parse one source unit.
///
/// Returns every tree the unit defines: one per `{{define}}` and `{{block}}`
/// in source order, followed by the tree named `name` holding the top-level
/// content.
pub fn parse(name: &str, source: &str) -> ParseResult<Vec<Tree>> {
    let items = scan(name, source)?;
    trace!(name, items = items.len(), "scanned template source");

    let mut parser = Parser {
        name,
        source,
        items,
        index: 0,
        range_depth: 0,
        depth: Cell::new(0),
        trees: Vec::new(),
    };
    let root = parser.parse_top_level()?;
    let mut trees = parser.trees;
    trees.push(Tree::with_root(name, root));
    Ok(trees)
}

/// A scanned piece of source.
#[derive(Debug)]
enum Item {
    Text(String),
    Comment(String),
    Action {
        tokens: Vec<Token>,
        offset: usize,
    },
}

fn line_at(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    1 + source.as_bytes()[..end].iter().filter(|b| **b == b'\n').count()
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn scan(name: &str, source: &str) -> ParseResult<Vec<Item>> {
    let bytes = source.as_bytes();
    let mut items = Vec::new();
    let mut cursor = 0usize;
    let mut pending_text = String::new();

    let error_at =
        |offset: usize, message: &str| ParseError::new(name, line_at(source, offset), message);

    loop {
        let Some(open) = source[cursor..].find(LEFT_DELIM).map(|i| cursor + i) else {
            pending_text.push_str(&source[cursor..]);
            break;
        };
        pending_text.push_str(&source[cursor..open]);

        let mut body_start = open + LEFT_DELIM.len();
        let trim_left = bytes.get(body_start) == Some(&b'-')
            && bytes.get(body_start + 1).copied().is_some_and(is_space);
        if trim_left {
            body_start += 1;
            let trimmed = pending_text.trim_end_matches([' ', '\t', '\r', '\n']).len();
            pending_text.truncate(trimmed);
        }

        let Some(close) = find_action_end(bytes, body_start) else {
            let rest = source[body_start..].trim_start();
            let message = if rest.starts_with("/*") {
                "unclosed comment"
            } else {
                "unclosed action"
            };
            return Err(error_at(open, message));
        };

        let mut body_end = close;
        let trim_right = body_end > body_start
            && bytes[body_end - 1] == b'-'
            && body_end - 1 > body_start
            && is_space(bytes[body_end - 2]);
        if trim_right {
            body_end -= 1;
        }

        if !pending_text.is_empty() {
            items.push(Item::Text(std::mem::take(&mut pending_text)));
        }

        let raw = &source[body_start..body_end];
        let body = raw.trim();
        if body.starts_with("/*") {
            if !body.ends_with("*/") || body.len() < 4 {
                return Err(error_at(open, "comment ends before closing delimiter"));
            }
            items.push(Item::Comment(body.to_string()));
        } else {
            let leading = raw.len() - raw.trim_start().len();
            let tokens = lex_action(body, body_start + leading)
                .map_err(|LexError { offset, message }| error_at(offset, &message))?;
            items.push(Item::Action {
                tokens,
                offset: open,
            });
        }

        cursor = close + RIGHT_DELIM.len();
        if trim_right {
            while cursor < bytes.len() && is_space(bytes[cursor]) {
                cursor += 1;
            }
        }
    }

    if !pending_text.is_empty() {
        items.push(Item::Text(pending_text));
    }
    Ok(items)
}

/// Find the `}}` closing an action, skipping over quoted strings, raw
/// strings, character constants and comments.
fn find_action_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    let mut in_raw = false;
    let mut in_quote: Option<u8> = None;
    let mut in_comment = false;
    while i + 1 < bytes.len() {
        let current = bytes[i];

        if in_comment {
            if current == b'*' && bytes[i + 1] == b'/' {
                in_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if in_raw {
            if current == b'`' {
                in_raw = false;
            }
            i += 1;
            continue;
        }

        if let Some(quote) = in_quote {
            match current {
                b'\\' => i += 2,
                b'\n' => {
                    // Let the lexer report the unterminated literal.
                    in_quote = None;
                    i += 1;
                }
                c if c == quote => {
                    in_quote = None;
                    i += 1;
                }
                _ => i += 1,
            }
            continue;
        }

        match current {
            b'/' if bytes[i + 1] == b'*' => {
                in_comment = true;
                i += 2;
            }
            b'`' => {
                in_raw = true;
                i += 1;
            }
            b'"' | b'\'' => {
                in_quote = Some(current);
                i += 1;
            }
            b'}' if bytes[i + 1] == b'}' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// How a nested item list ended.
enum Terminator {
    End { offset: usize },
    /// `{{else ...}}` with the tokens following `else`.
    Else { tokens: Vec<Token>, offset: usize },
}

/// Result of parsing one item inside a list.
enum Step {
    Node(Node),
    Terminator(Terminator),
}

#[derive(Clone, Copy)]
enum Control {
    If,
    Range,
    With,
}

impl Control {
    fn as_str(self) -> &'static str {
        match self {
            Control::If => "if",
            Control::Range => "range",
            Control::With => "with",
        }
    }
}

struct Parser<'a> {
    name: &'a str,
    source: &'a str,
    items: Vec<Item>,
    index: usize,
    range_depth: usize,
    /// Current nesting, checked against [`MAX_DEPTH`].
    depth: Cell<usize>,
    trees: Vec<Tree>,
}

impl Parser<'_> {
    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.name, line_at(self.source, offset), message)
    }

    fn enter(&self, offset: usize) -> ParseResult<()> {
        let depth = self.depth.get() + 1;
        if depth > MAX_DEPTH {
            return Err(self.error(offset, "max expression depth exceeded"));
        }
        self.depth.set(depth);
        Ok(())
    }

    fn leave(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }

    fn next_item(&mut self) -> Option<Item> {
        if self.index >= self.items.len() {
            return None;
        }
        let item = std::mem::replace(&mut self.items[self.index], Item::Text(String::new()));
        self.index += 1;
        Some(item)
    }

    fn parse_top_level(&mut self) -> ParseResult<ListNode> {
        let mut root = ListNode::new();
        while let Some(item) = self.next_item() {
            if let Item::Action { tokens, offset } = &item {
                if matches!(
                    tokens.first().map(|t| &t.kind),
                    Some(TokenKind::Keyword(Keyword::Define))
                ) {
                    self.parse_define(&tokens[1..], *offset)?;
                    continue;
                }
            }
            match self.parse_item(item)? {
                Step::Node(node) => root.push(node),
                Step::Terminator(Terminator::End { offset }) => {
                    return Err(self.error(offset, "unexpected {{end}}"));
                }
                Step::Terminator(Terminator::Else { offset, .. }) => {
                    return Err(self.error(offset, "unexpected {{else}}"));
                }
            }
        }
        Ok(root)
    }

    /// Parse items until `{{end}}` or `{{else}}`.
    fn item_list(&mut self, context: &str, offset: usize) -> ParseResult<(ListNode, Terminator)> {
        let mut list = ListNode::new();
        while let Some(item) = self.next_item() {
            match self.parse_item(item)? {
                Step::Node(node) => list.push(node),
                Step::Terminator(terminator) => return Ok((list, terminator)),
            }
        }
        Err(self.error(offset, format!("unexpected EOF in {}", context)))
    }

    fn parse_item(&mut self, item: Item) -> ParseResult<Step> {
        match item {
            Item::Text(text) => Ok(Step::Node(Node::Text(TextNode { text }))),
            Item::Comment(text) => Ok(Step::Node(Node::Comment(CommentNode { text }))),
            Item::Action { tokens, offset } => self.parse_action(tokens, offset),
        }
    }

    fn parse_action(&mut self, tokens: Vec<Token>, offset: usize) -> ParseResult<Step> {
        let Some(first) = tokens.first() else {
            return Err(self.error(offset, "missing value for command"));
        };
        let line = line_at(self.source, offset);

        let keyword = match &first.kind {
            TokenKind::Keyword(keyword) => *keyword,
            _ => {
                let pipe = self.pipeline(&tokens, "command", offset)?;
                return Ok(Step::Node(Node::Action(ActionNode { line, pipe })));
            }
        };

        let rest = &tokens[1..];
        match keyword {
            Keyword::Block => self.parse_block(rest, offset).map(Step::Node),
            Keyword::Break | Keyword::Continue => {
                if let Some(extra) = rest.first() {
                    return Err(self.error(
                        offset,
                        format!("unexpected {} in {{{{{}}}}}", extra.kind, keyword.as_str()),
                    ));
                }
                if self.range_depth == 0 {
                    return Err(self.error(
                        offset,
                        format!("{{{{{}}}}} outside {{{{range}}}}", keyword.as_str()),
                    ));
                }
                Ok(Step::Node(if keyword == Keyword::Break {
                    Node::Break
                } else {
                    Node::Continue
                }))
            }
            Keyword::Define => Err(self.error(offset, "unexpected <define> in command")),
            Keyword::Else => Ok(Step::Terminator(Terminator::Else {
                tokens: rest.to_vec(),
                offset,
            })),
            Keyword::End => {
                if let Some(extra) = rest.first() {
                    return Err(self.error(offset, format!("unexpected {} in end", extra.kind)));
                }
                Ok(Step::Terminator(Terminator::End { offset }))
            }
            Keyword::If => self.parse_control(Control::If, rest, offset).map(Step::Node),
            Keyword::Range => self.parse_control(Control::Range, rest, offset).map(Step::Node),
            Keyword::With => self.parse_control(Control::With, rest, offset).map(Step::Node),
            Keyword::Template => {
                let (name, rest) = self.template_name(rest, "template clause", offset)?;
                let pipe = if rest.is_empty() {
                    None
                } else {
                    Some(self.pipeline(rest, "template clause", offset)?)
                };
                Ok(Step::Node(Node::Template(TemplateNode { line, name, pipe })))
            }
            // Only nil reaches here; it is an ordinary operand.
            Keyword::Nil => {
                let pipe = self.pipeline(&tokens, "command", offset)?;
                Ok(Step::Node(Node::Action(ActionNode { line, pipe })))
            }
        }
    }

    fn template_name<'t>(
        &self,
        tokens: &'t [Token],
        context: &str,
        offset: usize,
    ) -> ParseResult<(String, &'t [Token])> {
        match tokens.first() {
            Some(Token {
                kind: TokenKind::String { text, .. },
                ..
            }) => Ok((text.clone(), &tokens[1..])),
            Some(other) => Err(self.error(offset, format!("unexpected {} in {}", other.kind, context))),
            None => Err(self.error(offset, format!("missing name in {}", context))),
        }
    }

    fn parse_define(&mut self, tokens: &[Token], offset: usize) -> ParseResult<()> {
        let (name, rest) = self.template_name(tokens, "define clause", offset)?;
        if let Some(extra) = rest.first() {
            return Err(self.error(offset, format!("unexpected {} in define clause", extra.kind)));
        }
        let body = self.definition_body("define", offset)?;
        self.trees.push(Tree::with_root(name, body));
        Ok(())
    }

    fn parse_block(&mut self, tokens: &[Token], offset: usize) -> ParseResult<Node> {
        let (name, rest) = self.template_name(tokens, "block clause", offset)?;
        let pipe = self.pipeline(rest, "block clause", offset)?;
        let body = self.definition_body("block", offset)?;
        self.trees.push(Tree::with_root(name.clone(), body));
        Ok(Node::Template(TemplateNode {
            line: line_at(self.source, offset),
            name,
            pipe: Some(pipe),
        }))
    }

    /// Parse a `define` or `block` body, which is a fresh scope for `break`.
    fn definition_body(&mut self, context: &str, offset: usize) -> ParseResult<ListNode> {
        self.enter(offset)?;
        let saved_depth = std::mem::take(&mut self.range_depth);
        let result = self.item_list(context, offset);
        self.range_depth = saved_depth;
        self.leave();
        match result? {
            (body, Terminator::End { .. }) => Ok(body),
            (_, Terminator::Else { offset, .. }) => {
                Err(self.error(offset, format!("unexpected {{{{else}}}} in {}", context)))
            }
        }
    }

    fn parse_control(&mut self, control: Control, tokens: &[Token], offset: usize) -> ParseResult<Node> {
        self.enter(offset)?;
        let result = self.control_body(control, tokens, offset);
        self.leave();
        result
    }

    fn control_body(&mut self, control: Control, tokens: &[Token], offset: usize) -> ParseResult<Node> {
        let context = control.as_str();
        let pipe = self.pipeline(tokens, context, offset)?;

        if matches!(control, Control::Range) {
            self.range_depth += 1;
        }
        let result = self.item_list(context, offset);
        if matches!(control, Control::Range) {
            self.range_depth -= 1;
        }
        let (list, terminator) = result?;

        let else_list = match terminator {
            Terminator::End { .. } => None,
            Terminator::Else {
                tokens: else_tokens,
                offset: else_offset,
            } => Some(self.parse_else(&else_tokens, else_offset, context)?),
        };

        let branch = BranchNode {
            line: line_at(self.source, offset),
            pipe,
            list,
            else_list,
        };
        Ok(match control {
            Control::If => Node::If(branch),
            Control::Range => Node::Range(branch),
            Control::With => Node::With(branch),
        })
    }

    /// Parse what follows `{{else ...}}`. A chained `{{else if}}` or
    /// `{{else with}}` becomes a nested branch that consumes the shared
    /// `{{end}}`.
    fn parse_else(&mut self, tokens: &[Token], offset: usize, context: &str) -> ParseResult<ListNode> {
        let mut else_list = ListNode::new();
        match tokens.first().map(|t| &t.kind) {
            Some(TokenKind::Keyword(Keyword::If)) => {
                else_list.push(self.parse_control(Control::If, &tokens[1..], offset)?);
            }
            Some(TokenKind::Keyword(Keyword::With)) => {
                else_list.push(self.parse_control(Control::With, &tokens[1..], offset)?);
            }
            Some(other) => {
                return Err(self.error(offset, format!("unexpected {} in else", other)));
            }
            None => match self.item_list(context, offset)? {
                (list, Terminator::End { .. }) => else_list = list,
                (_, Terminator::Else { offset, .. }) => {
                    return Err(self.error(offset, "expected end; found {{else}}"));
                }
            },
        }
        Ok(else_list)
    }

    fn pipeline(&self, tokens: &[Token], context: &str, offset: usize) -> ParseResult<PipeNode> {
        let mut pipe = PipeNode::default();
        let mut index = 0usize;

        let mut vars = Vec::new();
        let mut cursor = 0usize;
        while let Some(Token {
            kind: TokenKind::Variable(name),
            ..
        }) = tokens.get(cursor)
        {
            vars.push(name.clone());
            match tokens.get(cursor + 1).map(|t| &t.kind) {
                Some(TokenKind::Comma) => cursor += 2,
                Some(TokenKind::Declare) | Some(TokenKind::Assign) => {
                    pipe.is_assign = matches!(tokens[cursor + 1].kind, TokenKind::Assign);
                    pipe.decl = std::mem::take(&mut vars);
                    index = cursor + 2;
                    break;
                }
                _ => break,
            }
        }

        let rest = &tokens[index..];
        if rest.is_empty() {
            return Err(self.error(offset, format!("missing value for {}", context)));
        }

        for segment in split_commands(rest) {
            if segment.is_empty() {
                return Err(self.error(offset, "missing value for command"));
            }
            pipe.cmds.push(self.command(segment, offset)?);
        }
        Ok(pipe)
    }

    fn command(&self, tokens: &[Token], offset: usize) -> ParseResult<CommandNode> {
        let mut args = Vec::new();
        let mut index = 0usize;
        while index < tokens.len() {
            let (arg, next) = self.operand(tokens, index, offset)?;
            args.push(arg);
            index = next;
        }
        Ok(CommandNode { args })
    }

    /// Parse one term plus any directly attached field accesses.
    fn operand(&self, tokens: &[Token], index: usize, offset: usize) -> ParseResult<(Arg, usize)> {
        let token = &tokens[index];
        let mut next = index + 1;
        let mut last_end = token.end;

        let mut arg = match &token.kind {
            TokenKind::Identifier(name) => Arg::Identifier(name.clone()),
            TokenKind::Keyword(Keyword::Nil) => Arg::Nil,
            TokenKind::Bool(value) => Arg::Bool(*value),
            TokenKind::Dot => Arg::Dot,
            TokenKind::Field(name) => Arg::Field(vec![name.clone()]),
            TokenKind::Variable(name) => Arg::Variable(vec![name.clone()]),
            TokenKind::Number(text) => Arg::Number(text.clone()),
            TokenKind::String { quoted, text } => Arg::String {
                quoted: quoted.clone(),
                text: text.clone(),
            },
            TokenKind::LeftParen => {
                let close = matching_paren(tokens, index)
                    .ok_or_else(|| self.error(offset, "unclosed left paren"))?;
                self.enter(offset)?;
                let pipe = self.pipeline(&tokens[index + 1..close], "parenthesized pipeline", offset);
                self.leave();
                let pipe = pipe?;
                next = close + 1;
                last_end = tokens[close].end;
                Arg::Pipe(pipe)
            }
            TokenKind::RightParen => return Err(self.error(offset, "unexpected right paren")),
            other => return Err(self.error(offset, format!("unexpected {} in operand", other))),
        };

        while let Some(Token {
            kind: TokenKind::Field(field),
            start,
            end,
        }) = tokens.get(next)
        {
            if *start != last_end {
                break;
            }
            arg = match arg {
                Arg::Field(mut idents) => {
                    idents.push(field.clone());
                    Arg::Field(idents)
                }
                Arg::Variable(mut idents) => {
                    idents.push(field.clone());
                    Arg::Variable(idents)
                }
                Arg::Chain { node, mut fields } => {
                    fields.push(field.clone());
                    Arg::Chain { node, fields }
                }
                node @ (Arg::Identifier(_) | Arg::Pipe(_)) => Arg::Chain {
                    node: Box::new(node),
                    fields: vec![field.clone()],
                },
                _ => return Err(self.error(offset, "unexpected . after term")),
            };
            last_end = *end;
            next += 1;
        }

        Ok((arg, next))
    }
}

/// Split tokens on `|` at parenthesis depth zero.
fn split_commands(tokens: &[Token]) -> Vec<&[Token]> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Pipe if depth == 0 => {
                segments.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&tokens[start..]);
    segments
}

fn matching_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_one(source: &str) -> Tree {
        parse("t", source)
            .expect("source should parse")
            .pop()
            .expect("main tree is always returned")
    }

    fn reproduce(source: &str) -> String {
        parse_one(source).source()
    }

    #[test]
    fn test_text_only() {
        assert_eq!(reproduce("hello\nworld"), "hello\nworld");
    }

    #[test]
    fn test_action_whitespace_is_normalised() {
        assert_eq!(reproduce("{{  .Name  }}"), "{{.Name}}");
        assert_eq!(reproduce("{{printf   \"%d\"  .Count}}"), "{{printf \"%d\" .Count}}");
        assert_eq!(reproduce("{{.A | html | printf \"%s\"}}"), "{{.A | html | printf \"%s\"}}");
    }

    #[test]
    fn test_trim_markers() {
        assert_eq!(reproduce("a  {{- .X -}}  \n b"), "a{{.X}}b");
        assert_eq!(reproduce("{{-3}}"), "{{-3}}");
    }

    #[test]
    fn test_comments_are_kept() {
        assert_eq!(reproduce("x{{/* note */}}y"), "x{{/* note */}}y");
        assert_eq!(reproduce("x {{- /* note */ -}} y"), "x{{/* note */}}y");
    }

    #[test]
    fn test_declarations() {
        assert_eq!(reproduce("{{$x := .A}}{{$x = 1}}"), "{{$x := .A}}{{$x = 1}}");
        assert_eq!(
            reproduce("{{range $i, $e := .Items}}{{$i}}{{end}}"),
            "{{range $i, $e := .Items}}{{$i}}{{end}}"
        );
    }

    #[test]
    fn test_chains_and_parens() {
        assert_eq!(reproduce("{{(index .M \"k\").Name}}"), "{{(index .M \"k\").Name}}");
        assert_eq!(reproduce("{{$x.A.B}}"), "{{$x.A.B}}");
        assert_eq!(reproduce("{{len (slice .A 1 2)}}"), "{{len (slice .A 1 2)}}");
    }

    #[test]
    fn test_control_structures() {
        assert_eq!(
            reproduce("{{if .A}}a{{else if .B}}b{{else}}c{{end}}"),
            "{{if .A}}a{{else}}{{if .B}}b{{else}}c{{end}}{{end}}"
        );
        assert_eq!(
            reproduce("{{with .A}}{{.}}{{else}}none{{end}}"),
            "{{with .A}}{{.}}{{else}}none{{end}}"
        );
        assert_eq!(
            reproduce("{{range .A}}{{if .}}{{break}}{{end}}{{continue}}{{end}}"),
            "{{range .A}}{{if .}}{{break}}{{end}}{{continue}}{{end}}"
        );
    }

    #[test]
    fn test_template_invocations() {
        assert_eq!(reproduce("{{template \"nav\" .}}"), "{{template \"nav\" .}}");
        assert_eq!(reproduce("{{template `raw` }}"), "{{template \"raw\"}}");
    }

    #[test]
    fn test_define_splits_trees() {
        let trees = parse("file.gohtml", "{{define \"a\"}}A{{end}}\n{{define \"b\"}}{{template \"a\" .}}{{end}}\n")
            .unwrap();
        let names: Vec<&str> = trees.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "file.gohtml"]);
        assert_eq!(trees[1].source(), "{{template \"a\" .}}");
        assert_eq!(trees[2].source(), "\n\n");
    }

    #[test]
    fn test_block_defines_and_invokes() {
        let trees = parse("page", "<main>{{block \"content\" .}}default{{end}}</main>").unwrap();
        assert_eq!(trees[0].name, "content");
        assert_eq!(trees[0].source(), "default");
        assert_eq!(trees[1].source(), "<main>{{template \"content\" .}}</main>");
    }

    #[test]
    fn test_nested_braces_in_strings() {
        assert_eq!(reproduce("{{print \"}}\"}}"), "{{print \"}}\"}}");
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("{{template \"unterminated", "unclosed action"),
            ("{{if .A}}", "unexpected EOF in if"),
            ("{{end}}", "unexpected {{end}}"),
            ("{{break}}", "{{break}} outside {{range}}"),
            ("{{}}", "missing value for command"),
            ("{{/* open }}", "unclosed comment"),
            ("{{.A | }}", "missing value for command"),
            ("{{(.A}}", "unclosed left paren"),
            ("{{\"s\".A}}", "unexpected . after term"),
            ("{{if .A}}{{define \"x\"}}{{end}}{{end}}", "unexpected <define> in command"),
        ];
        for (source, message) in cases {
            let err = parse("t", source).expect_err(source);
            assert_eq!(err.message, message, "for {:?}", source);
        }
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let levels = 20_000;
        let parens = format!("{{{{{}1{}}}}}", "(".repeat(levels), ")".repeat(levels));
        let err = parse("deep", &parens).unwrap_err();
        assert_eq!(err.message, "max expression depth exceeded");

        let ifs = format!("{}x{}", "{{if 1}}".repeat(levels), "{{end}}".repeat(levels));
        let err = parse("deep", &ifs).unwrap_err();
        assert_eq!(err.message, "max expression depth exceeded");

        let blocks = format!(
            "{}x{}",
            "{{range .}}{{block \"b\" .}}".repeat(levels / 2),
            "{{end}}{{end}}".repeat(levels / 2)
        );
        assert!(parse("deep", &blocks).is_err());
    }

    #[test]
    fn test_nesting_within_limit_parses() {
        let levels = MAX_DEPTH - 1;
        let parens = format!("{{{{{}1{}}}}}", "(".repeat(levels), ")".repeat(levels));
        assert_eq!(reproduce(&parens), parens);

        let ifs = format!("{}x{}", "{{if 1}}".repeat(levels), "{{end}}".repeat(levels));
        assert_eq!(reproduce(&ifs), ifs);
    }

    #[test]
    fn test_error_reports_line() {
        let err = parse("page.gohtml", "a\nb\n{{if}}").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.to_string(), "template: page.gohtml:3: missing value for if");
    }
}
