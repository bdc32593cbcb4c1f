/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Recursive expansion engine.
//!
//! An [`Engine`] owns the immutable pieces (directive registry, source
//! loader, optional expression evaluator, configuration). Each run gets a
//! fresh [`Expander`] holding the mutable pieces: the call stack used for
//! cycle detection and the diagnostics collected so far. Independent runs
//! can therefore share one engine, even across threads.
//!
//! Expanding a source repeats, until no directive is left:
//! find the leftmost directive, dispatch it by name, splice the replacement
//! over the matched span, and start scanning from the top of the buffer
//! again. Replacement text is scanned like any other text, so handler output
//! may contain further directives.

use crate::context::ExpansionContext;
use crate::diagnostics::{Diagnostic, DiagnosticCollector};
use crate::directive::find_directive_at;
use crate::error::{ExpandError, ExpandResult};
use crate::evaluator::ExpressionEvaluator;
use crate::loader::{SourceLoader, fallback_placeholder};
use crate::registry::{DirectiveHandler, Registry};
use crate::value::Scope;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Default ceiling on nested inclusion depth.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Default ceiling on substitutions within one source.
pub const DEFAULT_MAX_SUBSTITUTIONS: usize = 10_000;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Expansion of a source entered deeper than this fails with
    /// [`ExpandError::DepthExceeded`].
    pub max_depth: usize,
    /// Substitutions allowed in one source before the rest of its
    /// directives are left unexpanded. Stops directives whose replacements
    /// keep producing new directives, such as two arguments bound to each
    /// other.
    pub max_substitutions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_substitutions: DEFAULT_MAX_SUBSTITUTIONS,
        }
    }
}

/// Result of loading a source through the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedSource {
    /// The source's content.
    Text(String),
    /// The source could not be loaded.
    Fallback {
        /// The `[$file <name>]` placeholder to use instead.
        placeholder: String,
        /// Why loading failed.
        reason: String,
    },
}

/// Output of a top-level expansion.
#[derive(Debug, Clone)]
pub struct Expansion {
    /// The fully expanded text.
    pub content: String,
    /// Everything that degraded along the way, in the order it happened.
    pub diagnostics: Vec<Diagnostic>,
}

/// The directive expansion engine.
pub struct Engine {
    registry: Registry,
    loader: Box<dyn SourceLoader>,
    evaluator: Option<Box<dyn ExpressionEvaluator>>,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine reading sources through `loader`, with the built-in
    /// directives registered and no expression evaluator.
    pub fn new(loader: impl SourceLoader + 'static) -> Self {
        Self {
            registry: Registry::with_builtins(),
            loader: Box::new(loader),
            evaluator: None,
            config: EngineConfig::default(),
        }
    }

    /// Enable `python_eval` directives, evaluated by `evaluator`.
    pub fn with_evaluator(mut self, evaluator: impl ExpressionEvaluator + 'static) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    /// Set the maximum nested inclusion depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Set the maximum number of substitutions within one source.
    pub fn with_max_substitutions(mut self, max_substitutions: usize) -> Self {
        self.config.max_substitutions = max_substitutions;
        self
    }

    /// Replace the directive registry wholesale.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Register a directive handler, replacing any handler with that name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl DirectiveHandler + 'static,
    ) -> Option<Arc<dyn DirectiveHandler>> {
        self.registry.register(name, handler)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn evaluator(&self) -> Option<&dyn ExpressionEvaluator> {
        self.evaluator.as_deref()
    }

    pub fn loader(&self) -> &dyn SourceLoader {
        self.loader.as_ref()
    }

    /// Load a source, substituting the fallback placeholder on failure.
    ///
    /// Never fails: the error is logged and the placeholder returned instead.
    pub fn load_source(&self, name: &str) -> LoadedSource {
        match self.loader.load(name) {
            Ok(text) => LoadedSource::Text(text),
            Err(e) => {
                tracing::warn!(source = name, "{}. Keeping original placeholder.", e);
                LoadedSource::Fallback {
                    placeholder: fallback_placeholder(name),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Expand the source `name` as a top-level document with scope `args`.
    pub fn expand_source(&self, name: &str, args: Scope) -> ExpandResult<Expansion> {
        let mut expander = Expander::new(self);
        let content = expander.expand(name, Some(args), 0)?;
        Ok(Expansion {
            content,
            diagnostics: expander.into_diagnostics(),
        })
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("evaluator", &self.evaluator.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Mutable state of one expansion run.
///
/// Handlers receive the expander so they can expand nested sources and
/// report diagnostics.
pub struct Expander<'e> {
    engine: &'e Engine,
    /// Names of the sources currently being expanded, outermost first.
    call_stack: Vec<String>,
    diagnostics: DiagnosticCollector,
}

impl<'e> Expander<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            call_stack: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    /// Sources currently being expanded, outermost first.
    pub fn call_stack(&self) -> &[String] {
        &self.call_stack
    }

    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_diagnostics()
    }

    /// Log and record a warning against the frame `ctx`.
    pub fn warn(&mut self, ctx: &ExpansionContext, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(source = %ctx.source_name, "{}", message);
        self.diagnostics.warn(ctx.source_name.as_str(), message);
    }

    /// Log and record an error against the frame `ctx`.
    ///
    /// Errors are still local: the directive degrades and expansion goes on.
    pub fn error(&mut self, ctx: &ExpansionContext, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(source = %ctx.source_name, "{}", message);
        self.diagnostics.error(ctx.source_name.as_str(), message);
    }

    /// Expand the source `name` with argument dictionary `args`, entered at
    /// `depth`.
    ///
    /// Fails if `depth` exceeds the configured ceiling or if `name` is
    /// already being expanded further up the call stack. On return, success
    /// or failure, the call stack is as it was on entry.
    pub fn expand(&mut self, name: &str, args: Option<Scope>, depth: usize) -> ExpandResult<String> {
        let max_depth = self.engine.config.max_depth;
        if depth > max_depth {
            return Err(ExpandError::DepthExceeded {
                name: name.to_string(),
                depth,
                max_depth,
            });
        }

        if self.call_stack.iter().any(|entry| entry == name) {
            let mut path = self.call_stack.clone();
            path.push(name.to_string());
            return Err(ExpandError::CircularReference {
                name: name.to_string(),
                path,
            });
        }

        self.call_stack.push(name.to_string());
        let content = self.expand_frame(name, args.unwrap_or_default(), depth);
        self.call_stack.pop();
        Ok(content)
    }

    /// Run the fixed-point loop over one source.
    fn expand_frame(&mut self, name: &str, args: Scope, depth: usize) -> String {
        let ctx = ExpansionContext::new(name, args, depth);

        let mut content = match self.engine.load_source(name) {
            LoadedSource::Text(text) => text,
            LoadedSource::Fallback {
                placeholder,
                reason,
            } => {
                self.diagnostics
                    .warn(name, format!("{}. Keeping original placeholder.", reason));
                return placeholder;
            }
        };

        tracing::debug!(source = name, depth, "Expanding source");

        // Directive texts that expand to themselves. They stay in the buffer
        // and are skipped by later scans.
        let mut inert: HashSet<String> = HashSet::new();
        let mut from = 0;
        let mut substitutions = 0;
        let engine = self.engine;

        while let Some(directive) = find_directive_at(&content, from) {
            if inert.contains(&directive.full_text) {
                from = directive.start + 1;
                continue;
            }

            if substitutions == engine.config.max_substitutions {
                self.error(
                    &ctx,
                    format!(
                        "Substitution limit of {} reached; leaving remaining directives unexpanded",
                        engine.config.max_substitutions
                    ),
                );
                break;
            }

            let dispatched = engine
                .registry
                .dispatch(&directive.name, &directive.args, &ctx, self);
            let replacement = match dispatched {
                Some(text) => text,
                None => {
                    self.warn(&ctx, format!("Unknown directive '{}'", directive.name));
                    directive.full_text.clone()
                }
            };

            if replacement == directive.full_text {
                from = directive.start + 1;
                inert.insert(replacement);
                continue;
            }

            content.replace_range(directive.span(), &replacement);
            substitutions += 1;
            from = 0;
        }

        content
    }
}

impl fmt::Debug for Expander<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expander")
            .field("call_stack", &self.call_stack)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
