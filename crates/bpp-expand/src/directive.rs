/*
 * directive.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Directive syntax.
//!
//! A directive is `[$name arg1 arg2 ...]`. Each argument is either a bare
//! token (no whitespace, no `]`) or a brace literal `{...}` that may contain
//! whitespace and is passed through with its braces intact.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\$([\w_]+)((?:\s+(?:\{.*?\}|[^\]\s]+))*)\]").unwrap()
});

/// One located, not-yet-expanded directive invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The complete matched text, brackets included.
    pub full_text: String,
    /// Directive name (the word after `[$`).
    pub name: String,
    /// Raw argument tokens, in order.
    pub args: Vec<String>,
    /// Byte offset of the opening `[`.
    pub start: usize,
    /// Byte offset just past the closing `]`.
    pub end: usize,
}

impl Directive {
    /// The byte range this directive occupies in the scanned buffer.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Find the leftmost directive in `text`.
///
/// Returns `None` once the buffer holds no directive, which is what ends
/// the expansion loop for a source.
pub fn find_directive(text: &str) -> Option<Directive> {
    find_directive_at(text, 0)
}

/// Find the leftmost directive starting at or after byte offset `from`.
///
/// `from` must lie on a character boundary.
pub fn find_directive_at(text: &str, from: usize) -> Option<Directive> {
    if from > text.len() {
        return None;
    }
    let caps = DIRECTIVE_RE.captures_at(text, from)?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?.as_str().to_string();
    let args = caps
        .get(2)
        .map(|m| split_args(m.as_str().trim()))
        .unwrap_or_default();

    Some(Directive {
        full_text: whole.as_str().to_string(),
        name,
        args,
        start: whole.start(),
        end: whole.end(),
    })
}

/// Split a directive's argument string into tokens.
///
/// Whitespace separates tokens except while inside a brace literal. Brace
/// state is a plain toggle: `{` turns it on and `}` turns it off, with no
/// depth counting, so `{a {b} c}` splits after `{b}`.
pub fn split_args(args: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_braces = false;

    for ch in args.chars() {
        match ch {
            '{' => {
                in_braces = true;
                current.push(ch);
            }
            '}' => {
                in_braces = false;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_braces => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
