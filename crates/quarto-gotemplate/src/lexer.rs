/*
 * lexer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tokenizer for the body of a single action.
//!
//! The scanner in [`crate::parser`] splits the source into text and action
//! windows; this module turns the inside of one window into tokens. Token
//! offsets are absolute positions in the template source so the parser can
//! detect adjacency (`.A.B` versus `.A .B`) and report line numbers.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Block,
    Break,
    Continue,
    Define,
    Else,
    End,
    If,
    Nil,
    Range,
    Template,
    With,
}

impl Keyword {
    fn from_ident(ident: &str) -> Option<Self> {
        Some(match ident {
            "block" => Keyword::Block,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            "define" => Keyword::Define,
            "else" => Keyword::Else,
            "end" => Keyword::End,
            "if" => Keyword::If,
            "nil" => Keyword::Nil,
            "range" => Keyword::Range,
            "template" => Keyword::Template,
            "with" => Keyword::With,
            _ => return None,
        })
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Keyword::Block => "block",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::Define => "define",
            Keyword::Else => "else",
            Keyword::End => "end",
            Keyword::If => "if",
            Keyword::Nil => "nil",
            Keyword::Range => "range",
            Keyword::Template => "template",
            Keyword::With => "with",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Assign,
    Bool(bool),
    Comma,
    Declare,
    Dot,
    /// `.Name`, stored without the leading dot.
    Field(String),
    Identifier(String),
    Keyword(Keyword),
    LeftParen,
    /// Numbers and character constants, as written.
    Number(String),
    Pipe,
    RightParen,
    String { quoted: String, text: String },
    /// `$name`, stored with the leading `$`.
    Variable(String),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Assign => f.write_str("\"=\""),
            TokenKind::Bool(value) => write!(f, "<{}>", value),
            TokenKind::Comma => f.write_str("\",\""),
            TokenKind::Declare => f.write_str("\":=\""),
            TokenKind::Dot => f.write_str("<.>"),
            TokenKind::Field(name) => write!(f, "<.{}>", name),
            TokenKind::Identifier(name) => write!(f, "<{}>", name),
            TokenKind::Keyword(keyword) => write!(f, "<{}>", keyword.as_str()),
            TokenKind::LeftParen => f.write_str("\"(\""),
            TokenKind::Number(text) => write!(f, "<{}>", text),
            TokenKind::Pipe => f.write_str("\"|\""),
            TokenKind::RightParen => f.write_str("\")\""),
            TokenKind::String { quoted, .. } => f.write_str(quoted),
            TokenKind::Variable(name) => write!(f, "<{}>", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexError {
    pub offset: usize,
    pub message: String,
}

impl LexError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Lex an action body that starts at absolute offset `base`.
pub(crate) fn lex_action(body: &str, base: usize) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer {
        body,
        bytes: body.as_bytes(),
        pos: 0,
        base,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    body: &'a str,
    bytes: &'a [u8],
    pos: usize,
    base: usize,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), LexError> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'|' => self.single(TokenKind::Pipe),
                b',' => self.single(TokenKind::Comma),
                b'(' => self.single(TokenKind::LeftParen),
                b')' => self.single(TokenKind::RightParen),
                b'=' => self.single(TokenKind::Assign),
                b':' => {
                    if self.bytes.get(self.pos + 1) != Some(&b'=') {
                        return Err(self.error(start, "expected :="));
                    }
                    self.pos += 2;
                    self.emit(TokenKind::Declare, start);
                }
                b'"' => self.lex_quote(start)?,
                b'`' => self.lex_raw_quote(start)?,
                b'\'' => self.lex_char(start)?,
                b'$' => {
                    self.pos += 1;
                    self.take_alphanumeric();
                    let name = self.body[start..self.pos].to_string();
                    self.emit(TokenKind::Variable(name), start);
                }
                b'.' => {
                    if self.bytes.get(self.pos + 1).is_some_and(u8::is_ascii_digit) {
                        self.lex_number(start)?;
                    } else {
                        self.pos += 1;
                        let name_start = self.pos;
                        self.take_alphanumeric();
                        if self.pos == name_start {
                            self.emit(TokenKind::Dot, start);
                        } else {
                            let name = self.body[name_start..self.pos].to_string();
                            self.emit(TokenKind::Field(name), start);
                        }
                    }
                }
                b'+' | b'-' | b'0'..=b'9' => self.lex_number(start)?,
                c if c == b'_' || c.is_ascii_alphabetic() || c >= 0x80 => {
                    self.take_alphanumeric();
                    let word = &self.body[start..self.pos];
                    let kind = match word {
                        "true" => TokenKind::Bool(true),
                        "false" => TokenKind::Bool(false),
                        _ => match Keyword::from_ident(word) {
                            Some(keyword) => TokenKind::Keyword(keyword),
                            None => TokenKind::Identifier(word.to_string()),
                        },
                    };
                    self.emit(kind, start);
                }
                other => {
                    return Err(self.error(
                        start,
                        format!("unrecognized character in action: {:?}", other as char),
                    ));
                }
            }
        }
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn single(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.pos += 1;
        self.emit(kind, start);
    }

    fn emit(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            start: self.base + start,
            end: self.base + self.pos,
        });
    }

    fn error(&self, at: usize, message: impl Into<String>) -> LexError {
        LexError::new(self.base + at, message)
    }

    /// Consume identifier characters. Non-ASCII bytes are accepted so that
    /// Unicode letters in identifiers stay on char boundaries.
    fn take_alphanumeric(&mut self) {
        while let Some(c) = self.peek() {
            if c == b'_' || c.is_ascii_alphanumeric() || c >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn lex_number(&mut self, start: usize) -> Result<(), LexError> {
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let digits_start = self.pos;
        let mut prev = 0u8;
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, b'+' | b'-') && matches!(prev, b'e' | b'E' | b'p' | b'P');
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || exponent_sign {
                prev = c;
                self.pos += 1;
            } else {
                break;
            }
        }
        let digits = &self.body[digits_start..self.pos];
        let valid = digits
            .bytes()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == b'.')
            && digits.bytes().any(|c| c.is_ascii_digit());
        if !valid {
            return Err(self.error(
                start,
                format!("bad number syntax: {:?}", &self.body[start..self.pos]),
            ));
        }
        let text = self.body[start..self.pos].to_string();
        self.emit(TokenKind::Number(text), start);
        Ok(())
    }

    fn lex_quote(&mut self, start: usize) -> Result<(), LexError> {
        self.pos += 1;
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(self.error(start, "unterminated quoted string"));
                }
                Some(b'\\') => {
                    if matches!(self.bytes.get(self.pos + 1), None | Some(b'\n')) {
                        return Err(self.error(start, "unterminated quoted string"));
                    }
                    self.pos += 2;
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        let quoted = self.body[start..self.pos].to_string();
        let text = unquote(&quoted[1..quoted.len() - 1])
            .map_err(|message| self.error(start, message))?;
        self.emit(TokenKind::String { quoted, text }, start);
        Ok(())
    }

    fn lex_raw_quote(&mut self, start: usize) -> Result<(), LexError> {
        self.pos += 1;
        let Some(len) = self.body[self.pos..].find('`') else {
            return Err(self.error(start, "unterminated raw quoted string"));
        };
        let text = self.body[self.pos..self.pos + len].to_string();
        self.pos += len + 1;
        let quoted = self.body[start..self.pos].to_string();
        self.emit(TokenKind::String { quoted, text }, start);
        Ok(())
    }

    fn lex_char(&mut self, start: usize) -> Result<(), LexError> {
        self.pos += 1;
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(self.error(start, "unterminated character constant"));
                }
                Some(b'\\') => self.pos += 2,
                Some(b'\'') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        let text = self.body[start..self.pos.min(self.body.len())].to_string();
        self.emit(TokenKind::Number(text), start);
        Ok(())
    }
}

/// Interpret the escapes of a double-quoted string body.
pub(crate) fn unquote(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next().ok_or("invalid syntax")?;
        match escaped {
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' | 'u' | 'U' => {
                let width = match escaped {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = chars.by_ref().take(width).collect();
                let value = (hex.len() == width)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .ok_or("invalid syntax")?;
                out.push(char::from_u32(value).ok_or("invalid syntax")?);
            }
            '0'..='7' => {
                let rest: String = chars.by_ref().take(2).collect();
                let octal = format!("{}{}", escaped, rest);
                let value = (octal.len() == 3)
                    .then(|| u32::from_str_radix(&octal, 8).ok())
                    .flatten()
                    .filter(|v| *v <= 0xff)
                    .ok_or("invalid syntax")?;
                out.push(char::from_u32(value).ok_or("invalid syntax")?);
            }
            _ => return Err("invalid syntax".to_string()),
        }
    }
    Ok(out)
}
