// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Content-line scanner and component tree builder.
//!
//! ```text
//! Source Text → Tokens → Content Lines → Component Tree
//! ```
//!
//! A content line has the format:
//! ```text
//! contentline = name *(";" param) ":" value CRLF
//! ```

use std::mem;

use logos::Logos;

use crate::component::{Component, Property};

/// Errors that can occur while parsing an item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The source did not contain any component.
    #[error("no component found")]
    Empty,

    /// A content line has no unquoted colon separating name and value.
    #[error("line {line}: missing colon")]
    MissingColon {
        /// 1-based index of the unfolded line
        line: usize,
    },

    /// A content line has an empty name.
    #[error("line {line}: empty property name")]
    EmptyName {
        /// 1-based index of the unfolded line
        line: usize,
    },

    /// A property appears outside of any component.
    #[error("line {line}: property {name} outside of a component")]
    Orphan {
        /// 1-based index of the unfolded line
        line: usize,
        /// Property name
        name: String,
    },

    /// An `END` does not match the innermost open `BEGIN`.
    #[error("line {line}: expected END:{expected}, found END:{found}")]
    MismatchedEnd {
        /// 1-based index of the unfolded line
        line: usize,
        /// Name of the innermost open component
        expected: String,
        /// Name found after `END:`
        found: String,
    },

    /// An `END` without any open component.
    #[error("line {line}: END:{name} without BEGIN")]
    UnexpectedEnd {
        /// 1-based index of the unfolded line
        line: usize,
        /// Name found after `END:`
        name: String,
    },

    /// The source ended while components were still open.
    #[error("unterminated component {0}")]
    Unterminated(String),
}

/// Parse every top-level component in `src`.
///
/// # Errors
///
/// Returns an error if a content line is malformed or `BEGIN`/`END` lines
/// are unbalanced.
///
/// # Examples
///
/// ```
/// # use davsync_vobject::parse;
/// let src = "BEGIN:VCARD\r\nVERSION:4.0\r\nUID:abc\r\nFN:Ada\r\nEND:VCARD\r\n";
/// let items = parse(src).unwrap();
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].uid(), Some("abc"));
/// ```
pub fn parse(src: &str) -> Result<Vec<Component>, ParseError> {
    let mut roots = Vec::new();
    let mut stack: Vec<Component> = Vec::new();

    for (line_no, property) in content_lines(src)? {
        if property.name == "BEGIN" {
            stack.push(Component::new(property.value.to_ascii_uppercase()));
        } else if property.name == "END" {
            let name = property.value.to_ascii_uppercase();
            let Some(component) = stack.pop() else {
                return Err(ParseError::UnexpectedEnd {
                    line: line_no,
                    name,
                });
            };
            if component.name != name {
                return Err(ParseError::MismatchedEnd {
                    line: line_no,
                    expected: component.name,
                    found: name,
                });
            }
            match stack.last_mut() {
                Some(parent) => parent.children.push(component),
                None => roots.push(component),
            }
        } else {
            match stack.last_mut() {
                Some(component) => component.properties.push(property),
                None => {
                    return Err(ParseError::Orphan {
                        line: line_no,
                        name: property.name,
                    });
                }
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Unterminated(open.name));
    }
    Ok(roots)
}

/// Parse the first top-level component in `src`.
///
/// # Errors
///
/// Returns [`ParseError::Empty`] if there is no component, or any error
/// [`parse`] returns.
pub fn read_one(src: &str) -> Result<Component, ParseError> {
    parse(src)?.into_iter().next().ok_or(ParseError::Empty)
}

/// Token of a content line. Folded line breaks never reach the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
#[logos(skip r"\r?\n[ \t]")] // skip folding
enum Token<'a> {
    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token("\"")]
    DQuote,

    /// CRLF, or a bare LF as some producers write
    #[regex(r"\r?\n")]
    Newline,

    /// Carriage return not followed by a line feed
    #[token("\r")]
    Return,

    #[regex(r#"[^:;"\r\n]+"#)]
    Text(&'a str),
}

impl<'a> Token<'a> {
    fn as_str(self) -> &'a str {
        match self {
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::DQuote => "\"",
            Self::Newline => "\n",
            Self::Return => "\r",
            Self::Text(s) => s,
        }
    }
}

fn tokenize(src: &str) -> impl Iterator<Item = Token<'_>> {
    Token::lexer(src).spanned().map(|(token, span)| match token {
        Ok(token) => token,
        Err(()) => Token::Text(src.get(span).unwrap_or_default()),
    })
}

/// Numbered content lines of `src`, blank lines skipped.
fn content_lines(src: &str) -> Result<Vec<(usize, Property)>, ParseError> {
    let mut lines = Vec::new();
    let mut line = LineBuilder::default();
    let mut line_no = 1;
    for token in tokenize(src) {
        if token == Token::Newline {
            if let Some(property) = mem::take(&mut line).finish(line_no)? {
                lines.push((line_no, property));
            }
            line_no += 1;
        } else {
            line.push(token);
        }
    }
    if let Some(property) = line.finish(line_no)? {
        lines.push((line_no, property));
    }
    Ok(lines)
}

/// Accumulates the tokens of one unfolded line.
///
/// The first unquoted colon ends the head; everything after it is value.
/// Within the head the first semicolon separates name and parameters.
#[derive(Debug, Default)]
struct LineBuilder {
    name: String,
    params: Option<String>,
    value: Option<String>,
    quoted: bool,
}

impl LineBuilder {
    fn push(&mut self, token: Token<'_>) {
        if let Some(value) = &mut self.value {
            value.push_str(token.as_str());
            return;
        }

        match token {
            Token::Colon if !self.quoted => self.value = Some(String::new()),
            Token::Semicolon if self.params.is_none() => self.params = Some(String::new()),
            Token::DQuote => {
                self.quoted = !self.quoted;
                self.head_mut().push('"');
            }
            _ => self.head_mut().push_str(token.as_str()),
        }
    }

    fn head_mut(&mut self) -> &mut String {
        match &mut self.params {
            Some(params) => params,
            None => &mut self.name,
        }
    }

    fn finish(self, line_no: usize) -> Result<Option<Property>, ParseError> {
        let Some(mut value) = self.value else {
            if self.params.is_none() && self.name.trim().is_empty() {
                return Ok(None);
            }
            return Err(ParseError::MissingColon { line: line_no });
        };

        let name = self.name.trim();
        if name.is_empty() {
            return Err(ParseError::EmptyName { line: line_no });
        }
        if value.ends_with('\r') {
            value.pop();
        }

        Ok(Some(Property {
            name: name.to_ascii_uppercase(),
            params: self.params,
            value,
        }))
    }
}
