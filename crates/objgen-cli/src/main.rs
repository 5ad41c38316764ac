use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use objgen::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "objgen")]
#[command(about = "Generate Go bindings for Objective-C frameworks from documentation indexes", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Go source file
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// Go package name (default: appkit)
        #[arg(short, long = "pkg")]
        package: Option<String>,

        /// Emit only these classes; repeatable
        #[arg(short, long = "class")]
        classes: Vec<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the run summary to stderr
        #[arg(long)]
        summary: bool,
    },

    /// Load and generate without writing code, then print the run summary
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Documentation index directory; repeatable, loaded in order
    #[arg(short, long = "index")]
    indexes: Vec<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    if let Err(err) = run(cli.command) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("trace")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Generate {
            input,
            package,
            classes,
            output,
            summary,
        } => {
            let settings = Settings::resolve(
                input.config.as_deref(),
                Overrides {
                    indexes: input.indexes,
                    package,
                    classes,
                    output,
                },
            )?;
            let generated = objgen::generate(&settings)?;
            objgen::write_output(&generated.code, settings.output.as_deref())?;
            if summary {
                eprint!("{}", objgen::render_report(&generated)?);
            }
            info!(
                "{} diagnostics; run `objgen summary` for details",
                generated.diagnostics.count()
            );
            Ok(())
        }
        Commands::Summary { input, json } => {
            let settings = Settings::resolve(
                input.config.as_deref(),
                Overrides {
                    indexes: input.indexes,
                    ..Default::default()
                },
            )?;
            let generated = objgen::generate(&settings)?;
            if json {
                println!("{}", objgen::render_json(&generated)?);
            } else {
                print!("{}", objgen::render_report(&generated)?);
            }
            Ok(())
        }
    }
}
