/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Top-level driver for the `bppcomp` preprocessor.
//!
//! Builds the starting scope from command-line definitions, sets up an
//! [`Engine`] reading from the file system, and runs one input through it.
//! If expansion or writing the result fails, the input is copied to the
//! output unchanged so downstream build steps still find a file.

use anyhow::{Context, Result};
use bpp_expand::{DEFAULT_MAX_DEPTH, Engine, FileSystemLoader, RhaiEvaluator, Scope, initial_scope};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything needed to configure one run, independent of how it was parsed.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// `KEY VALUE` pairs, applied last and in order.
    pub defines: Vec<(String, String)>,
    /// YAML mapping applied before `defines`.
    pub define_file: Option<PathBuf>,
    pub evaluate: bool,
    pub max_depth: usize,
    /// Directory that relative source names resolve against.
    pub base_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            defines: Vec::new(),
            define_file: None,
            evaluate: true,
            max_depth: DEFAULT_MAX_DEPTH,
            base_dir: None,
        }
    }
}

/// Which path [`process_file`] took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The expanded text was written; `characters` is its length in chars.
    Processed { characters: usize },
    /// Expansion or writing failed and the input was copied instead.
    CopiedOriginal { reason: String },
}

/// Build the top-level scope.
///
/// Order: the fixed `_preproc_version`/`_bppcomp` entries, then the mapping
/// in `define_file`, then each `defines` pair. Later entries win.
/// Values from `defines` are always strings.
pub fn build_scope(defines: &[(String, String)], define_file: Option<&Path>) -> Result<Scope> {
    let mut scope = initial_scope();

    if let Some(path) = define_file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read definitions from {}", path.display()))?;
        let defined = Scope::from_yaml(&text, &path.display().to_string())?;
        scope.extend(defined);
    }

    for (key, value) in defines {
        scope.insert(key.as_str(), value.as_str());
    }

    Ok(scope)
}

/// Create an engine configured from `options`.
pub fn build_engine(options: &RunOptions) -> Engine {
    let loader = match &options.base_dir {
        Some(dir) => FileSystemLoader::with_base_dir(dir),
        None => FileSystemLoader::new(),
    };

    let engine = Engine::new(loader).with_max_depth(options.max_depth);
    if options.evaluate {
        engine.with_evaluator(RhaiEvaluator::new())
    } else {
        engine
    }
}

/// Expand `input` and write the result to `output`.
///
/// `input` is the top-level source name exactly as given; the engine's
/// loader resolves it like any included name, so a source that includes
/// itself under that name is caught as circular. If expansion or writing
/// fails, the raw bytes of `input` are copied to `output` instead. Errors
/// are returned only when `input` cannot be read or the copy fails too.
pub fn process_file(engine: &Engine, input: &str, output: &Path, args: Scope) -> Result<RunOutcome> {
    let raw = read_input(engine, input)?;

    match expand_and_write(engine, input, &raw, output, args) {
        Ok(characters) => {
            info!(
                "Successfully processed {} to {} in {} characters",
                input,
                output.display(),
                characters
            );
            Ok(RunOutcome::Processed { characters })
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            warn!("Error processing file: {}", reason);
            write_output(output, &raw)?;
            warn!("Copied original file to {} due to error", output.display());
            Ok(RunOutcome::CopiedOriginal { reason })
        }
    }
}

/// Copy the raw bytes of `input` to `output` without expanding anything.
///
/// Used when a run cannot start at all, so the output is never left absent.
pub fn copy_original(engine: &Engine, input: &str, output: &Path) -> Result<()> {
    let raw = read_input(engine, input)?;
    write_output(output, &raw)
}

fn read_input(engine: &Engine, input: &str) -> Result<Vec<u8>> {
    engine
        .loader()
        .load_bytes(input)
        .with_context(|| format!("Failed to read input {}", input))
}

fn expand_and_write(
    engine: &Engine,
    input: &str,
    raw: &[u8],
    output: &Path,
    args: Scope,
) -> Result<usize> {
    std::str::from_utf8(raw).with_context(|| format!("{} is not valid UTF-8", input))?;

    let expansion = engine.expand_source(input, args)?;

    if !expansion.diagnostics.is_empty() {
        info!(
            count = expansion.diagnostics.len(),
            "Expansion finished with diagnostics"
        );
    }

    write_output(output, expansion.content.as_bytes())?;
    Ok(expansion.content.chars().count())
}

fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bpp_expand::ArgValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_scope_fixed_entries() {
        let scope = build_scope(&[], None).unwrap();
        assert_eq!(
            scope.get("_preproc_version"),
            Some(&ArgValue::from("2024.11.23.1"))
        );
        assert_eq!(scope.get("_bppcomp"), Some(&ArgValue::Int(1)));
    }

    #[test]
    fn test_defines_override_define_file() {
        let dir = tempfile::tempdir().unwrap();
        let defs = dir.path().join("defs.yaml");
        fs::write(&defs, "mode: release\ncount: 3\n").unwrap();

        let defines = vec![("mode".to_string(), "debug".to_string())];
        let scope = build_scope(&defines, Some(&defs)).unwrap();

        assert_eq!(scope.get("mode"), Some(&ArgValue::from("debug")));
        assert_eq!(scope.get("count"), Some(&ArgValue::Int(3)));
    }

    #[test]
    fn test_define_file_must_be_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let defs = dir.path().join("defs.yaml");
        fs::write(&defs, "- a\n- b\n").unwrap();

        let err = build_scope(&[], Some(&defs)).unwrap_err();
        assert!(err.to_string().contains("must be a dictionary"));
    }

    #[test]
    fn test_missing_define_file() {
        let err = build_scope(&[], Some(Path::new("/nonexistent/defs.yaml"))).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read definitions"));
    }

    #[test]
    fn test_process_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bpp");
        let output = dir.path().join("out").join("nested").join("out.b");
        fs::write(&input, "v=[$arg _bppcomp]").unwrap();

        let engine = build_engine(&RunOptions::default());
        let outcome = process_file(&engine, input.to_str().unwrap(), &output, initial_scope()).unwrap();

        assert_eq!(outcome, RunOutcome::Processed { characters: 3 });
        assert_eq!(fs::read_to_string(&output).unwrap(), "v=1");
    }

    #[test]
    fn test_invalid_utf8_input_is_copied() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bpp");
        let output = dir.path().join("out.b");
        let raw = b"[$arg x] \xff\xfe".to_vec();
        fs::write(&input, &raw).unwrap();

        let engine = build_engine(&RunOptions::default());
        let outcome = process_file(&engine, input.to_str().unwrap(), &output, Scope::new()).unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::CopiedOriginal { ref reason } if reason.contains("not valid UTF-8")
        ));
        assert_eq!(fs::read(&output).unwrap(), raw);
    }

    #[test]
    fn test_unwritable_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bpp");
        fs::write(&input, "raw").unwrap();
        // A directory already occupies the output path, so the copy fails too.
        let output = dir.path().join("taken");
        fs::create_dir(&output).unwrap();

        let engine = build_engine(&RunOptions::default());
        assert!(process_file(&engine, input.to_str().unwrap(), &output, Scope::new()).is_err());
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let engine = build_engine(&RunOptions::default());
        let err = process_file(
            &engine,
            dir.path().join("absent.bpp").to_str().unwrap(),
            &dir.path().join("out.b"),
            Scope::new(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Failed to read input"));
        assert!(!dir.path().join("out.b").exists());
    }

    #[test]
    fn test_evaluation_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bpp");
        let output = dir.path().join("out.b");
        fs::write(&input, "[$python_eval 6 * 7]").unwrap();

        let enabled = build_engine(&RunOptions::default());
        process_file(&enabled, input.to_str().unwrap(), &output, Scope::new()).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "42");

        let options = RunOptions {
            evaluate: false,
            ..RunOptions::default()
        };
        let disabled = build_engine(&options);
        process_file(&disabled, input.to_str().unwrap(), &output, Scope::new()).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "[# $python_eval 6 * 7]");
    }

    #[test]
    fn test_self_inclusion_caught_under_given_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.bpp"), "A[$file main.bpp]").unwrap();
        let output = dir.path().join("main.b");

        let options = RunOptions {
            base_dir: Some(dir.path().to_path_buf()),
            ..RunOptions::default()
        };
        let engine = build_engine(&options);
        process_file(&engine, "main.bpp", &output, Scope::new()).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "A[# $file main.bpp: infinite loop]"
        );
    }

    #[test]
    fn test_copy_original_resolves_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.bpp"), "raw [$arg x]").unwrap();
        let output = dir.path().join("out").join("main.b");

        let options = RunOptions {
            base_dir: Some(dir.path().to_path_buf()),
            ..RunOptions::default()
        };
        copy_original(&build_engine(&options), "main.bpp", &output).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "raw [$arg x]");
    }
}
