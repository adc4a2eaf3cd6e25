//! `nodegraphc`: tokenize, parse, peephole, and print the resulting graph
//! for a single source file.
//!
//! Exit code is zero on parse success; non-zero on a recoverable parse
//! error (message on stderr, via `anyhow`) or on a fatal invariant
//! violation (the process aborts through Rust's panic handler, per
//! the two-tier error design).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// A fallback program used when no source file is given, so the binary is
/// runnable with zero setup.
const DEFAULT_SOURCE: &str = "return 1+2;\n";

#[derive(Parser)]
#[command(name = "nodegraphc", version, about = "Parse and peephole-optimize a small expression language, printing its sea-of-nodes graph")]
struct Cli {
    /// Source file to compile. Defaults to a small built-in program if
    /// omitted.
    path: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let source = match &cli.path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source file '{}'", path.display()))?,
        None => {
            log::info!("no source file given, using the built-in default program");
            DEFAULT_SOURCE.to_string()
        }
    };

    let unit = nodegraph_ir::parser::parse(&source)?;
    log::debug!("parsed {} live nodes", unit.graph.live_count());

    print!("{}", nodegraph_ir::printer::print_graph(&unit.graph, &unit.pool));
    Ok(())
}
