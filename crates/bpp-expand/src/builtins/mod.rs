/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in directives.
//!
//! | Directive | Arguments | Replacement |
//! |---|---|---|
//! | `file` | `name [{dict}]` | expanded content of `name` |
//! | `fileif` | `name key [{dict}]` | as `file` when `key` is truthy, else nothing |
//! | `arg` | `name` | value of `name` in the current frame |
//! | `python_eval` | `expr...` | result of evaluating `expr` |
//! | `generate_recursive` | `level_var math prefix op` | nested `[MATH ...]` pattern |
//!
//! None of these fail the expansion. Bad input produces a placeholder in
//! place of the directive and a diagnostic on the expander.

mod arg;
mod eval;
mod file;
mod generate;

use crate::registry::Registry;

pub use generate::build_math_pattern;

pub const FILE: &str = "file";
pub const FILEIF: &str = "fileif";
pub const ARG: &str = "arg";
pub const PYTHON_EVAL: &str = "python_eval";
pub const GENERATE_RECURSIVE: &str = "generate_recursive";

/// Register every built-in directive on `registry`.
pub fn register_builtins(registry: &mut Registry) {
    registry.register(FILE, file::handle_file);
    registry.register(FILEIF, file::handle_fileif);
    registry.register(ARG, arg::handle_arg);
    registry.register(PYTHON_EVAL, eval::handle_python_eval);
    registry.register(GENERATE_RECURSIVE, generate::handle_generate_recursive);
}
