/*
 * loader.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Source loading.
//!
//! This module provides the [`SourceLoader`] trait and implementations for
//! reading sources from various places (filesystem, memory, nowhere). The
//! engine turns a failed load into the `[$file <name>]` fallback placeholder,
//! so loaders only have to report what went wrong.

use crate::error::LoadError;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Trait for loading source text by name.
pub trait SourceLoader: Send + Sync {
    /// Load the source called `name`.
    ///
    /// `name` is exactly the first argument of the `file`/`fileif` directive
    /// (or the top-level input name).
    fn load(&self, name: &str) -> Result<String, LoadError>;

    /// Load the raw bytes of `name`, without requiring valid UTF-8.
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>, LoadError> {
        self.load(name).map(String::into_bytes)
    }
}

/// The placeholder substituted for a source that cannot be loaded.
///
/// It is the directive that would have included the source, so the missing
/// inclusion stays visible and can be found again by a later pass.
pub fn fallback_placeholder(name: &str) -> String {
    format!("[$file {}]", name)
}

/// Loader that reads sources from the filesystem.
///
/// Relative names resolve against `base_dir` when one is set, otherwise
/// against the process working directory. Absolute names are used as-is.
#[derive(Debug, Clone, Default)]
pub struct FileSystemLoader {
    base_dir: Option<PathBuf>,
}

impl FileSystemLoader {
    /// Create a loader that resolves names against the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that resolves relative names against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// The path a source name refers to.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn io_error(name: &str, e: std::io::Error) -> LoadError {
    match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound {
            name: name.to_string(),
        },
        _ => LoadError::Io {
            name: name.to_string(),
            source: e,
        },
    }
}

impl SourceLoader for FileSystemLoader {
    fn load(&self, name: &str) -> Result<String, LoadError> {
        std::fs::read_to_string(self.resolve(name)).map_err(|e| io_error(name, e))
    }

    fn load_bytes(&self, name: &str) -> Result<Vec<u8>, LoadError> {
        std::fs::read(self.resolve(name)).map_err(|e| io_error(name, e))
    }
}

/// Loader that reports every source as missing.
///
/// Useful for expanding text that should not pull anything in.
#[derive(Debug, Clone, Default)]
pub struct NullLoader;

impl SourceLoader for NullLoader {
    fn load(&self, name: &str) -> Result<String, LoadError> {
        Err(LoadError::NotFound {
            name: name.to_string(),
        })
    }
}

/// Loader that serves sources from an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: HashMap<String, String>,
}

impl MemoryLoader {
    /// Create a new empty memory loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source under `name`, replacing any existing one.
    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.sources.insert(name.into(), content.into());
        self
    }

    /// Create a loader holding the given sources.
    pub fn with_sources(
        sources: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let mut loader = Self::new();
        for (name, content) in sources {
            loader.add(name, content);
        }
        loader
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<String, LoadError> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
            })
    }
}
