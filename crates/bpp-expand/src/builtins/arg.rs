/*
 * arg.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `arg`: argument substitution.

use crate::context::ExpansionContext;
use crate::engine::Expander;

/// `[$arg name]`
///
/// Only the current frame's scope is consulted. An unbound name is echoed
/// back as a comment so unresolved substitutions stay visible in the output.
pub(crate) fn handle_arg(
    args: &[String],
    ctx: &ExpansionContext,
    expander: &mut Expander<'_>,
) -> String {
    let Some(name) = args.first() else {
        expander.warn(ctx, "arg directive without a name");
        return "[# $arg missing_name]".to_string();
    };

    match ctx.arg(name) {
        Some(value) => value.render(),
        None => {
            expander.warn(ctx, format!("Argument '{}' is not bound", name));
            format!("[# $arg {}]", name)
        }
    }
}
