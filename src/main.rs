// Soteria: parse an interface specification and print its syntax tree

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser as ClapParser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use soteria::Grammar;

#[derive(ClapParser)]
#[clap(
    name = "soteria",
    about = "Parse a Soteria interface specification and print its syntax tree"
)]
struct Args {
    /// Specification file to parse
    #[clap(required_unless_present = "inline")]
    file: Option<PathBuf>,
    /// Parse the input as a single statement instead of a whole program
    #[clap(long)]
    expr: bool,
    /// Source text to parse instead of reading a file
    #[clap(long, conflicts_with = "file")]
    inline: Option<String>,
    /// Only report success or failure
    #[clap(long, short)]
    quiet: bool,
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let (origin, source) = match (&args.inline, &args.file) {
        (Some(source), _) => ("<inline>".to_string(), source.clone()),
        (None, Some(path)) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            (path.display().to_string(), source)
        }
        (None, None) => anyhow::bail!("no input file provided"),
    };

    debug!(%origin, bytes = source.len(), expr = args.expr, "parsing input");
    let grammar = Grammar::new();

    if args.expr {
        let expr = grammar
            .parse_expr(&source)
            .with_context(|| format!("failed to parse {origin}"))?;
        println!("Parsed successfully.");
        if !args.quiet {
            println!("{expr:#?}");
        }
        return Ok(());
    }

    let program = grammar
        .parse_program(&source)
        .with_context(|| format!("failed to parse {origin}"))?;

    println!(
        "Parsed successfully. Found {} top-level declarations.",
        program.statements.len()
    );
    if !args.quiet {
        println!("{program:#?}");
    }

    Ok(())
}
