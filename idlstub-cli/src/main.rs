// idlstub: CLI entry point for the stub generator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

#[derive(Parser)]
#[command(name = "idlstub", about = "idlstub - native stubs from resolved IDL descriptors")]
struct Cli {
    /// Log every wrapper as it is emitted.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate stubs, prototypes and managed declarations for one module.
    Generate {
        /// Path to idlstub.toml.
        #[arg(long, default_value = "idlstub.toml")]
        config: PathBuf,
    },
    /// Print the stub source of a descriptor file to stdout.
    Emit {
        /// Descriptor JSON of one module.
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let result = match cli.command {
        Commands::Generate { config } => idlstub_codegen::run_generate(&config),
        Commands::Emit { input } => idlstub_codegen::emit_stubs(&input).map(|stubs| print!("{stubs}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
