/*
 * registry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Directive registry.
//!
//! Maps directive names to handlers. Registration is last-wins: adding a
//! handler under an existing name replaces the old one. The registry is owned
//! by an [`Engine`](crate::engine::Engine) and is read-only while that engine
//! expands sources.

use crate::context::ExpansionContext;
use crate::engine::Expander;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Trait for directive handlers.
///
/// A handler computes the replacement text for one directive occurrence.
/// Failures must be reported as placeholder text (and a diagnostic through
/// `expander`), never by panicking. The replacement is spliced back into the
/// buffer and scanned again, so it may itself contain directives.
///
/// Closures with the matching signature implement this trait; annotate the
/// parameter types so the closure is general over their lifetimes.
pub trait DirectiveHandler: Send + Sync {
    /// Compute the replacement for a directive with raw `args`.
    fn handle(&self, args: &[String], ctx: &ExpansionContext, expander: &mut Expander<'_>)
    -> String;
}

impl<F> DirectiveHandler for F
where
    F: Fn(&[String], &ExpansionContext, &mut Expander<'_>) -> String + Send + Sync,
{
    fn handle(
        &self,
        args: &[String],
        ctx: &ExpansionContext,
        expander: &mut Expander<'_>,
    ) -> String {
        self(args, ctx, expander)
    }
}

/// Mapping from directive name to handler.
#[derive(Clone, Default)]
pub struct Registry {
    handlers: HashMap<String, Arc<dyn DirectiveHandler>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in directives.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_builtins(&mut registry);
        registry
    }

    /// Register `handler` under `name`, returning the handler it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl DirectiveHandler + 'static,
    ) -> Option<Arc<dyn DirectiveHandler>> {
        self.handlers.insert(name.into(), Arc::new(handler))
    }

    /// Remove the handler registered under `name`.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn DirectiveHandler>> {
        self.handlers.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn DirectiveHandler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered directive names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke the handler for `name`.
    ///
    /// Returns `None` when no handler is registered; the engine then leaves
    /// the directive text in place.
    pub fn dispatch(
        &self,
        name: &str,
        args: &[String],
        ctx: &ExpansionContext,
        expander: &mut Expander<'_>,
    ) -> Option<String> {
        self.get(name)
            .map(|handler| handler.handle(args, ctx, expander))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("directives", &self.names())
            .finish()
    }
}
