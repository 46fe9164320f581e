//! mdmprofile CLI - canonicalize, extract and check configuration profiles.

use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod output;

use commands::{canonicalize, check, compare, digest, extract};

#[derive(Parser)]
#[command(name = "mdmprofile")]
#[command(about = "Configuration profile canonicalization and checking CLI")]
struct Cli {
    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of a plist
    Canonicalize {
        /// Input plist file (or stdin if not provided)
        input: Option<String>,
        /// Print the hygiene report as JSON on stderr
        #[arg(long)]
        report: bool,
    },
    /// Print each payload of a profile as a standalone canonical plist
    Extract {
        /// Input profile file (or stdin if not provided)
        input: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the formatting, payload-count and cross-field checks
    Check {
        /// Input profile file
        input: String,
        /// Declared level to compare against PayloadScope
        #[arg(long)]
        level: Option<String>,
        /// Declared distribution method
        #[arg(long)]
        distribution_method: Option<String>,
        /// A self-service block is configured
        #[arg(long)]
        self_service: bool,
    },
    /// Compare two attribute documents (JSON) for ID-ordering-only changes
    Compare {
        /// Prior attributes (JSON file)
        old: String,
        /// Proposed attributes (JSON file)
        new: String,
        /// Comparator configuration (JSON file)
        #[arg(long)]
        config: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the structural digest of a plist
    Digest {
        /// Input plist file (or stdin if not provided)
        input: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let result = match cli.command {
        Commands::Canonicalize { input, report } => canonicalize::run(input, report),
        Commands::Extract { input, json } => extract::run(input, json),
        Commands::Check {
            input,
            level,
            distribution_method,
            self_service,
        } => check::run(input, level, distribution_method, self_service),
        Commands::Compare {
            old,
            new,
            config,
            json,
        } => compare::run(old, new, config, json),
        Commands::Digest { input } => digest::run(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
