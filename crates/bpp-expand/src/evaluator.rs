/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Embedded expression evaluation for `python_eval` directives.
//!
//! Evaluating expressions found in source text runs arbitrary code with
//! whatever capability the evaluator has. The engine therefore ships
//! without one: an embedder opts in with
//! [`Engine::with_evaluator`](crate::engine::Engine::with_evaluator), and
//! until then every `python_eval` directive degrades to its placeholder.

use crate::error::EvalError;
use crate::value::Scope;

/// Trait for evaluating an embedded expression to substitution text.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate `expression` and return the textual form of its result.
    ///
    /// `scope` is the argument scope of the frame containing the directive.
    fn evaluate(&self, expression: &str, scope: &Scope) -> Result<String, EvalError>;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, &Scope) -> Result<String, EvalError> + Send + Sync,
{
    fn evaluate(&self, expression: &str, scope: &Scope) -> Result<String, EvalError> {
        self(expression, scope)
    }
}

#[cfg(feature = "rhai")]
pub use self::rhai_eval::RhaiEvaluator;

#[cfg(feature = "rhai")]
mod rhai_eval {
    use super::ExpressionEvaluator;
    use crate::error::EvalError;
    use crate::value::{ArgValue, Scope};
    use rhai::{Dynamic, Engine};

    /// Evaluator backed by the Rhai scripting engine.
    ///
    /// Frame arguments are visible to the expression as constants: strings,
    /// integers, floats and booleans keep their type, anything else is bound
    /// as its rendered text.
    pub struct RhaiEvaluator {
        engine: Engine,
    }

    impl RhaiEvaluator {
        pub fn new() -> Self {
            Self {
                engine: Engine::new(),
            }
        }
    }

    impl Default for RhaiEvaluator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for RhaiEvaluator {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RhaiEvaluator").finish_non_exhaustive()
        }
    }

    fn to_dynamic(value: &ArgValue) -> Dynamic {
        match value {
            ArgValue::String(s) => Dynamic::from(s.clone()),
            ArgValue::Bool(b) => Dynamic::from(*b),
            ArgValue::Int(i) => Dynamic::from(*i),
            ArgValue::Float(x) => Dynamic::from(*x),
            other => Dynamic::from(other.render()),
        }
    }

    impl ExpressionEvaluator for RhaiEvaluator {
        fn evaluate(&self, expression: &str, scope: &Scope) -> Result<String, EvalError> {
            let mut rhai_scope = rhai::Scope::new();
            for (name, value) in scope.iter() {
                rhai_scope.push_constant_dynamic(name.as_str(), to_dynamic(value));
            }

            self.engine
                .eval_expression_with_scope::<Dynamic>(&mut rhai_scope, expression)
                .map(|result| result.to_string())
                .map_err(|e| EvalError::Evaluation {
                    message: e.to_string(),
                })
        }
    }
}
