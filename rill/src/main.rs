use clap::Parser;
use log::debug;
use miette::{MietteHandlerOpts, Result};
use rill_interpreter::interp;
use rill_parser::tokenizer;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "rill",
    version,
    about = "The rill programming language",
    long_about = "rill is a small indentation-based scripting language with a data-driven operator grammar."
)]
struct Cli {
    /// Rill source file to run
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Arguments passed through to the program's main function
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Print the token stream
    #[arg(short = 't', long = "tokens")]
    tokens: bool,

    /// Print the syntax tree after all rewrite passes
    #[arg(short = 'a', long = "ast")]
    ast: bool,

    /// Parse only, do not evaluate
    #[arg(short = 'n', long = "dry-run")]
    dry_run: bool,

    /// Enable debug logging (same as RUST_LOG=debug)
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    setup_miette_handler();

    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(report) => {
            // Use miette's error reporting
            eprintln!("{:?}", report);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let source = fs::read_to_string(&cli.input)
        .map_err(|error| miette::miette!("Cannot read {}: {error}", cli.input.display()))?;
    debug!("read {} bytes from {}", source.len(), cli.input.display());

    let tokens = tokenizer::tokenize(&source)?;
    if cli.tokens {
        for token in &tokens {
            println!("{token:?}");
        }
    }

    let tree = rill_parser::parse_tokens(tokens)?;
    if cli.ast {
        println!("{tree}");
    }

    if cli.dry_run {
        return Ok(0);
    }

    let mut argv = Vec::with_capacity(cli.args.len() + 1);
    argv.push(cli.input.display().to_string());
    argv.extend(cli.args.iter().cloned());

    let code = interp::run(tree, argv)?;
    Ok(code as i32)
}

/// Configure miette error reporting for the terminal
fn setup_miette_handler() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .color(true)
                .tab_width(4)
                .with_cause_chain()
                .build(),
        )
    }))
    .ok();
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
