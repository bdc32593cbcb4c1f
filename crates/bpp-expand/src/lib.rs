/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Directive expansion engine for b++ sources.
//!
//! Sources contain bracketed directives such as `[$file header.bpp]` or
//! `[$arg name]`. Expanding a source replaces each directive with computed
//! text and rescans until none are left. Built-in directives:
//!
//! - File inclusion: `[$file name]`, `[$file name {'key': 'value'}]`
//! - Conditional inclusion: `[$fileif name flag]`
//! - Argument substitution: `[$arg name]`
//! - Expression evaluation: `[$python_eval 6 * 7]` (opt-in, see [`evaluator`])
//! - Pattern generation: `[$generate_recursive level math x +]`
//!
//! Further directives can be added through [`Engine::register`].
//!
//! # Architecture
//!
//! The engine does no I/O of its own: sources come from a [`SourceLoader`].
//! A source that cannot be loaded is replaced by the `[$file <name>]`
//! directive that would have included it, so the gap stays visible in the
//! output. Circular and over-deep inclusions are caught at the directive that
//! caused them, so the rest of the document still expands.
//!
//! # Example
//!
//! ```ignore
//! use bpp_expand::{Engine, MemoryLoader, Scope};
//!
//! let loader = MemoryLoader::with_sources([
//!     ("main.bpp", "[$file greet.bpp {'name': 'World'}]"),
//!     ("greet.bpp", "Hello, [$arg name]!"),
//! ]);
//! let engine = Engine::new(loader);
//!
//! let expansion = engine.expand_source("main.bpp", Scope::new())?;
//! assert_eq!(expansion.content, "Hello, World!");
//! ```

pub mod builtins;
pub mod context;
pub mod diagnostics;
pub mod directive;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod registry;
pub mod value;

// Re-export main types at crate root
pub use context::ExpansionContext;
pub use diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticKind};
pub use directive::{Directive, find_directive};
pub use engine::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_SUBSTITUTIONS, Engine, EngineConfig, Expander, Expansion,
    LoadedSource,
};
pub use error::{ArgsError, EvalError, ExpandError, ExpandResult, LoadError};
#[cfg(feature = "rhai")]
pub use evaluator::RhaiEvaluator;
pub use evaluator::ExpressionEvaluator;
pub use loader::{FileSystemLoader, MemoryLoader, NullLoader, SourceLoader};
pub use registry::{DirectiveHandler, Registry};
pub use value::{ArgValue, Scope};

/// Version string injected into every top-level scope as `_preproc_version`.
pub const PREPROCESSOR_VERSION: &str = "2024.11.23.1";

/// Build the scope every top-level run starts from.
///
/// Holds `_preproc_version` and the `_bppcomp` marker; callers add their own
/// definitions on top.
pub fn initial_scope() -> Scope {
    let mut scope = Scope::new();
    scope.insert("_preproc_version", PREPROCESSOR_VERSION);
    scope.insert("_bppcomp", ArgValue::Int(1));
    scope
}
