mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "statface",
    version,
    about = "Geometry-based table extraction for financial statement faces"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a statement table from a token dump (JSON, or words XML)
    Extract {
        /// Path to the token dump produced by a PDF text-layer reader
        input_file: PathBuf,

        /// Statement type: sfp, sci, cf or soce (default: auto-detect)
        #[arg(short, long)]
        statement: Option<String>,

        /// Page number to extract (default: first page in the dump)
        #[arg(short, long)]
        page: Option<usize>,

        /// Custom extraction profile JSON file
        #[arg(long = "profile", value_name = "FILE")]
        profile: Option<PathBuf>,

        /// Built-in profile preset
        #[arg(long = "preset", default_value = "default")]
        preset: String,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the extraction to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Fail when the accounting identities stay violated after the
        /// column-shift search
        #[arg(long)]
        strict: bool,
    },
    /// Show detection diagnostics (type, halves, region, bands) without
    /// extracting rows
    Inspect {
        /// Path to the token dump
        input_file: PathBuf,

        /// Statement type: sfp, sci, cf or soce (default: auto-detect)
        #[arg(short, long)]
        statement: Option<String>,

        /// Page number to inspect (default: first page in the dump)
        #[arg(short, long)]
        page: Option<usize>,

        /// Custom extraction profile JSON file
        #[arg(long = "profile", value_name = "FILE")]
        profile: Option<PathBuf>,

        /// Built-in profile preset
        #[arg(long = "preset", default_value = "default")]
        preset: String,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Manage and inspect extraction profiles
    Profiles {
        #[command(subcommand)]
        action: ProfilesAction,
    },
}

#[derive(Subcommand)]
enum ProfilesAction {
    /// List built-in profile presets
    List,
    /// Explain a profile in plain language
    Explain {
        /// Preset name (e.g., "default")
        preset: String,
    },
    /// Print an annotated example profile JSON
    Schema,
    /// Validate a custom profile file
    Validate {
        /// Path to the profile JSON file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input_file,
            statement,
            page,
            profile,
            preset,
            output,
            out,
            strict,
        } => commands::extract::run(
            input_file, statement, page, profile, &preset, &output, out, strict,
        ),
        Commands::Inspect {
            input_file,
            statement,
            page,
            profile,
            preset,
            output,
        } => commands::inspect::run(input_file, statement, page, profile, &preset, &output),
        Commands::Profiles { action } => match action {
            ProfilesAction::List => commands::profiles::list(),
            ProfilesAction::Explain { preset } => commands::profiles::explain(&preset),
            ProfilesAction::Schema => commands::profiles::schema(),
            ProfilesAction::Validate { file } => commands::profiles::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
