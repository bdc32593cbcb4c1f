/*
 * file.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `file` and `fileif`: nested source inclusion.

use crate::context::ExpansionContext;
use crate::engine::Expander;
use crate::value::{Scope, parse_arg_dict};

/// `[$file name {dict}]`
///
/// Circular and too-deep inclusions are caught here and replaced with an
/// "infinite loop" comment, so only this directive site is affected.
pub(crate) fn handle_file(
    args: &[String],
    ctx: &ExpansionContext,
    expander: &mut Expander<'_>,
) -> String {
    let Some(filename) = args.first() else {
        expander.warn(ctx, "file directive without a filename");
        return "[$file missing_filename]".to_string();
    };

    let file_args = include_args(args.get(1), filename, ctx, expander);
    match expander.expand(filename, file_args, ctx.depth) {
        Ok(content) => content,
        Err(e) => {
            expander.error(ctx, format!("Error processing {}: {}", filename, e));
            format!("[# $file {}: infinite loop]", filename)
        }
    }
}

/// `[$fileif name key {dict}]`
///
/// A falsy or unbound `key` removes the directive without touching `name`.
pub(crate) fn handle_fileif(
    args: &[String],
    ctx: &ExpansionContext,
    expander: &mut Expander<'_>,
) -> String {
    let Some(filename) = args.first() else {
        expander.warn(ctx, "fileif directive without a filename");
        return "[# $file missing_filename]".to_string();
    };
    let Some(check) = args.get(1) else {
        expander.warn(
            ctx,
            format!("fileif directive for {} without a condition", filename),
        );
        return format!("[# $fileif {} missing_condition]", filename);
    };

    tracing::debug!(
        source = %ctx.source_name,
        condition = %check,
        value = ?ctx.arg(check),
        "Checking fileif condition"
    );
    if !ctx.args.is_truthy(check) {
        return String::new();
    }

    let file_args = include_args(args.get(2), filename, ctx, expander);
    match expander.expand(filename, file_args, ctx.depth) {
        Ok(content) => content,
        Err(e) => {
            expander.error(ctx, format!("Error processing {}: {}", filename, e));
            format!("[# $file {}]", filename)
        }
    }
}

/// Parse the optional argument dictionary of an inclusion.
///
/// A bad literal is reported and treated as no dictionary at all.
fn include_args(
    literal: Option<&String>,
    target: &str,
    ctx: &ExpansionContext,
    expander: &mut Expander<'_>,
) -> Option<Scope> {
    let literal = literal?;
    match parse_arg_dict(literal, target) {
        Ok(scope) => Some(scope),
        Err(e) => {
            expander.warn(ctx, e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::DiagnosticKind;
    use crate::engine::Engine;
    use crate::loader::MemoryLoader;
    use crate::value::Scope;

    fn run(sources: &[(&str, &str)], args: Scope) -> crate::engine::Expansion {
        let engine = Engine::new(MemoryLoader::with_sources(sources.iter().copied()));
        engine
            .expand_source("main", args)
            .expect("top-level expansion should succeed")
    }

    #[test]
    fn test_file_includes_content() {
        let out = run(
            &[("main", "<[$file header]>"), ("header", "HEAD")],
            Scope::new(),
        );
        assert_eq!(out.content, "<HEAD>");
    }

    #[test]
    fn test_file_passes_argument_dictionary() {
        let out = run(
            &[
                ("main", "[$file greet {'name': 'World'}]"),
                ("greet", "Hello, [$arg name]!"),
            ],
            Scope::new(),
        );
        assert_eq!(out.content, "Hello, World!");
    }

    #[test]
    fn test_file_bad_dictionary_degrades() {
        let out = run(
            &[
                ("main", "[$file greet {'name: 1}]"),
                ("greet", "Hello, [$arg name]!"),
            ],
            Scope::new(),
        );
        assert_eq!(out.content, "Hello, [# $arg name]!");
        assert!(
            out.diagnostics
                .iter()
                .any(|d| d.message.starts_with("Failed to parse arguments for greet"))
        );
    }

    #[test]
    fn test_file_non_mapping_dictionary_degrades() {
        let out = run(&[("main", "[$file greet 42]"), ("greet", "hi")], Scope::new());
        assert_eq!(out.content, "hi");
        assert_eq!(
            out.diagnostics[0].message,
            "Arguments for greet must be a dictionary"
        );
    }

    #[test]
    fn test_file_without_filename() {
        let out = run(&[("main", "a[$file]b")], Scope::new());
        assert_eq!(out.content, "a[$file missing_filename]b");
    }

    #[test]
    fn test_file_self_inclusion() {
        let out = run(&[("main", "x[$file main]y")], Scope::new());
        assert_eq!(out.content, "x[# $file main: infinite loop]y");
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::Error);
        assert!(
            out.diagnostics[0]
                .message
                .contains("Circular reference detected: main -> main")
        );
    }

    #[test]
    fn test_file_same_source_twice_is_not_a_cycle() {
        let out = run(
            &[("main", "[$file part][$file part]"), ("part", "P")],
            Scope::new(),
        );
        assert_eq!(out.content, "PP");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_fileif_falsy_gate() {
        let args: Scope = [("flag", false)].into_iter().collect();
        let out = run(&[("main", "a[$fileif other flag]b")], args);
        assert_eq!(out.content, "ab");
        // `other` does not exist; it was never loaded, so nothing was reported.
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_fileif_unbound_gate() {
        let out = run(&[("main", "a[$fileif other flag]b")], Scope::new());
        assert_eq!(out.content, "ab");
    }

    #[test]
    fn test_fileif_truthy_gate_with_dictionary() {
        let args: Scope = [("flag", true)].into_iter().collect();
        let out = run(
            &[
                ("main", "[$fileif other flag {'who': 'you'}]"),
                ("other", "for [$arg who]"),
            ],
            args,
        );
        assert_eq!(out.content, "for you");
    }

    #[test]
    fn test_fileif_none_gate_from_dictionary() {
        let out = run(
            &[
                ("main", "[$file inner {'flag': None, 'label': 'None'}]"),
                ("inner", "<[$fileif other flag]|[$fileif other label]>"),
                ("other", "OTHER"),
            ],
            Scope::new(),
        );
        assert_eq!(out.content, "<|OTHER>");
    }

    #[test]
    fn test_fileif_missing_condition() {
        let out = run(&[("main", "[$fileif other]")], Scope::new());
        assert_eq!(out.content, "[# $fileif other missing_condition]");
    }

    #[test]
    fn test_fileif_without_filename() {
        let out = run(&[("main", "[$fileif]")], Scope::new());
        assert_eq!(out.content, "[# $file missing_filename]");
    }

    #[test]
    fn test_fileif_cycle_placeholder() {
        let args: Scope = [("on", "yes")].into_iter().collect();
        let out = run(&[("main", "[$fileif main on]")], args);
        assert_eq!(out.content, "[# $file main]");
    }
}
