/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-frame expansion state.

use crate::value::{ArgValue, Scope};

/// State handed to every directive handler invoked inside one source.
///
/// A new context is built each time a source is entered. Its `args` are the
/// dictionary passed at the inclusion site (or the top-level scope), never
/// the enclosing frame's scope.
#[derive(Debug, Clone)]
pub struct ExpansionContext {
    /// Depth to pass to nested inclusions made from this frame.
    pub depth: usize,

    /// Argument scope visible to `arg`, `fileif` and `generate_recursive`.
    pub args: Scope,

    /// Name of the source being expanded.
    pub source_name: String,
}

impl ExpansionContext {
    /// Create the context for a frame entered at `depth`.
    pub fn new(source_name: impl Into<String>, args: Scope, depth: usize) -> Self {
        Self {
            depth: depth + 1,
            args,
            source_name: source_name.into(),
        }
    }

    /// Look up an argument in this frame's scope.
    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args.get(name)
    }
}
