/*
 * generate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `generate_recursive`: nested pattern generation.

use crate::context::ExpansionContext;
use crate::engine::Expander;
use crate::value::ArgValue;

/// Build a right-nested arithmetic pattern of depth `level`.
///
/// ```text
/// 0 => [VAR x0]
/// 2 => [MATH [VAR x2] + [MATH [VAR x1] + [VAR x0]]]
/// ```
///
/// The result is directive-shaped text for a downstream consumer, not
/// something this engine expands further.
pub fn build_math_pattern(level: u64, prefix: &str, op: &str) -> String {
    let mut pattern = format!("[VAR {}0]", prefix);
    for n in 1..=level {
        pattern = format!("[MATH [VAR {}{}] {} {}]", prefix, n, op, pattern);
    }
    pattern
}

/// `[$generate_recursive level_var type prefix op]`
///
/// `level_var` is looked up in the current scope (unbound means level 0).
/// `math` is the only pattern type.
pub(crate) fn handle_generate_recursive(
    args: &[String],
    ctx: &ExpansionContext,
    expander: &mut Expander<'_>,
) -> String {
    if args.len() < 3 {
        expander.warn(ctx, "generate_recursive directive needs at least 3 arguments");
        return "[$generate_recursive missing_arguments]".to_string();
    }

    let level = match ctx.arg(&args[0]) {
        Some(value) => value.as_level(),
        None => ArgValue::from("0").as_level(),
    };
    let built = level.and_then(|level| {
        let op = args.get(3).ok_or("missing operator")?;
        match args[1].as_str() {
            "math" => Ok(Some(build_math_pattern(level, &args[2], op))),
            _ => Ok(None),
        }
    });

    match built {
        Ok(Some(pattern)) => pattern,
        Ok(None) => {
            expander.warn(ctx, format!("Unknown pattern type '{}'", args[1]));
            format!("[$generate_recursive unknown_pattern_type {}]", args[1])
        }
        Err(message) => {
            expander.error(
                ctx,
                format!("Error generating recursive pattern: {}", message),
            );
            format!("[$generate_recursive {}]", args.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::loader::MemoryLoader;
    use crate::value::Scope;

    fn expand(text: &str, args: Scope) -> String {
        let engine = Engine::new(MemoryLoader::with_sources([("main", text)]));
        engine.expand_source("main", args).unwrap().content
    }

    #[test]
    fn test_build_math_pattern() {
        assert_eq!(build_math_pattern(0, "x", "+"), "[VAR x0]");
        assert_eq!(build_math_pattern(1, "x", "*"), "[MATH [VAR x1] * [VAR x0]]");
        assert_eq!(
            build_math_pattern(2, "x", "+"),
            "[MATH [VAR x2] + [MATH [VAR x1] + [VAR x0]]]"
        );
    }

    #[test]
    fn test_generate_from_scope_level() {
        let args: Scope = [("lvl", "2")].into_iter().collect();
        assert_eq!(
            expand("[$generate_recursive lvl math v +]", args),
            "[MATH [VAR v2] + [MATH [VAR v1] + [VAR v0]]]"
        );
    }

    #[test]
    fn test_generate_unbound_level_is_zero() {
        assert_eq!(
            expand("[$generate_recursive lvl math v -]", Scope::new()),
            "[VAR v0]"
        );
    }

    #[test]
    fn test_generate_missing_arguments() {
        assert_eq!(
            expand("[$generate_recursive lvl math]", Scope::new()),
            "[$generate_recursive missing_arguments]"
        );
    }

    #[test]
    fn test_generate_unknown_pattern_type() {
        // The placeholder is itself a directive with too few arguments, so
        // it settles on the missing-arguments form.
        assert_eq!(
            expand("[$generate_recursive lvl tree v +]", Scope::new()),
            "[$generate_recursive missing_arguments]"
        );
    }

    #[test]
    fn test_generate_missing_operator_echoes_arguments() {
        assert_eq!(
            expand("[$generate_recursive lvl math v]", Scope::new()),
            "[$generate_recursive lvl math v]"
        );
    }

    #[test]
    fn test_generate_bad_level_echoes_arguments() {
        let args: Scope = [("lvl", "many")].into_iter().collect();
        assert_eq!(
            expand("[$generate_recursive lvl math v +]", args),
            "[$generate_recursive lvl math v +]"
        );
    }
}
