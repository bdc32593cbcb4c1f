/*
 * eval.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `python_eval`: embedded expression evaluation.

use crate::context::ExpansionContext;
use crate::engine::Expander;
use crate::error::EvalError;

/// `[$python_eval expr...]`
///
/// The arguments are joined with single spaces and handed to the engine's
/// evaluator. Without an evaluator, or on any evaluation error, the
/// expression is echoed back as a comment.
pub(crate) fn handle_python_eval(
    args: &[String],
    ctx: &ExpansionContext,
    expander: &mut Expander<'_>,
) -> String {
    if args.is_empty() {
        expander.warn(ctx, "python_eval directive without an expression");
        return "[# $python_eval missing_expression]".to_string();
    }

    let expression = args.join(" ");
    let result = match expander.engine().evaluator() {
        Some(evaluator) => evaluator.evaluate(&expression, &ctx.args),
        None => Err(EvalError::Disabled),
    };

    match result {
        Ok(text) => text,
        Err(e) => {
            expander.error(ctx, format!("{}: {}", e, expression));
            format!("[# $python_eval {}]", expression)
        }
    }
}
