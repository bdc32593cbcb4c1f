/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for directive expansion.
//!
//! Only [`ExpandError`] ever unwinds past a single directive site. Everything
//! else ([`LoadError`], [`ArgsError`], [`EvalError`]) is turned into a
//! placeholder string by the handler that hit it.

use thiserror::Error;

/// Errors that abort the expansion of one source.
///
/// The `file` and `fileif` handlers catch both variants and substitute an
/// inert placeholder, so they only reach the caller of a top-level expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// A source was entered while it was still being expanded.
    #[error("Circular reference detected: {}", path.join(" -> "))]
    CircularReference {
        /// The source that was re-entered.
        name: String,
        /// The call stack at the time of re-entry, outermost first, ending
        /// with `name`.
        path: Vec<String>,
    },

    /// Nested inclusion went deeper than the configured ceiling.
    #[error("Maximum recursion depth exceeded (depth {depth} > {max_depth}): {name}")]
    DepthExceeded {
        name: String,
        depth: usize,
        max_depth: usize,
    },
}

/// Result type for expansion operations.
pub type ExpandResult<T> = Result<T, ExpandError>;

/// Errors reported by a [`SourceLoader`](crate::loader::SourceLoader).
#[derive(Debug, Error)]
pub enum LoadError {
    /// No source exists under this name.
    #[error("File {name} not found")]
    NotFound { name: String },

    /// The source exists but could not be read.
    #[error("Error reading file {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors parsing the structured-argument literal of `file`/`fileif`.
#[derive(Debug, Error)]
pub enum ArgsError {
    /// The literal is not valid flow-mapping syntax.
    #[error("Failed to parse arguments for {target}: {message}")]
    Parse { target: String, message: String },

    /// The literal parsed, but to something other than a mapping.
    #[error("Arguments for {target} must be a dictionary")]
    NotAMapping { target: String },
}

/// Errors from an [`ExpressionEvaluator`](crate::evaluator::ExpressionEvaluator).
#[derive(Debug, Error)]
pub enum EvalError {
    /// No evaluator was installed on the engine.
    #[error("Expression evaluation is disabled")]
    Disabled,

    /// The expression failed to compile or run.
    #[error("Error evaluating expression: {message}")]
    Evaluation { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_reference_reports_full_path() {
        let err = ExpandError::CircularReference {
            name: "a.bpp".to_string(),
            path: vec!["a.bpp".into(), "b.bpp".into(), "a.bpp".into()],
        };
        assert_eq!(
            err.to_string(),
            "Circular reference detected: a.bpp -> b.bpp -> a.bpp"
        );
    }

    #[test]
    fn test_depth_exceeded_message() {
        let err = ExpandError::DepthExceeded {
            name: "deep.bpp".to_string(),
            depth: 101,
            max_depth: 100,
        };
        assert_eq!(
            err.to_string(),
            "Maximum recursion depth exceeded (depth 101 > 100): deep.bpp"
        );
    }

    #[test]
    fn test_args_error_messages() {
        let err = ArgsError::NotAMapping {
            target: "inc.bpp".to_string(),
        };
        assert_eq!(err.to_string(), "Arguments for inc.bpp must be a dictionary");
    }
}
