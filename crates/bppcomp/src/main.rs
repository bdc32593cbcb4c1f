/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! bppcomp binary - expands directives in a b++ source file

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bppcomp::{RunOptions, build_engine, build_scope, copy_original, process_file};

#[derive(Parser, Debug)]
#[command(name = "bppcomp")]
#[command(about = "Process b++ files with configurable arguments")]
#[command(version)]
struct Cli {
    /// Input file to process (resolved like an included name)
    input: String,

    /// Output file path
    output: PathBuf,

    /// Define a top-level argument (can be specified multiple times)
    #[arg(
        short = 'D',
        long = "define",
        num_args = 2,
        value_names = ["KEY", "VALUE"],
        action = clap::ArgAction::Append
    )]
    define: Vec<String>,

    /// YAML file with a mapping of top-level arguments, applied before --define
    #[arg(long, value_name = "FILE")]
    define_file: Option<PathBuf>,

    /// Leave python_eval directives unevaluated
    #[arg(long)]
    no_eval: bool,

    /// Maximum nesting depth of file inclusions
    #[arg(long, default_value_t = bpp_expand::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Directory that included file names are resolved against
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "bppcomp=warn,bpp_expand=warn"
    } else {
        "bppcomp=info,bpp_expand=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let defines: Vec<(String, String)> = cli
        .define
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();

    let options = RunOptions {
        defines,
        define_file: cli.define_file,
        evaluate: !cli.no_eval,
        max_depth: cli.max_depth,
        base_dir: cli.base_dir,
    };

    let engine = build_engine(&options);

    let args = match build_scope(&options.defines, options.define_file.as_deref()) {
        Ok(args) => args,
        Err(e) => {
            warn!("Error preparing arguments: {:#}", e);
            copy_original(&engine, &cli.input, &cli.output)?;
            warn!("Copied original file to {} due to error", cli.output.display());
            return Err(e);
        }
    };
    let mut initial: Vec<String> = args
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    initial.sort();
    info!(args = ?initial, "Initial arguments");

    process_file(&engine, &cli.input, &cli.output, args)?;
    Ok(())
}
