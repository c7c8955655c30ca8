mod commands;
mod settings;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Schema-driven mapping between JSON/CSV documents and typed objects.
#[derive(Parser)]
#[command(
    name = "modelson",
    version,
    about = "Schema-driven mapping between JSON/CSV documents and typed objects"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML configuration file with a [converter] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Schema, target class and input document shared by the decoding commands.
#[derive(Args)]
pub(crate) struct Target {
    /// Path to the schema descriptor JSON
    #[arg(long)]
    pub(crate) schema: PathBuf,
    /// Class to decode the document into
    #[arg(long)]
    pub(crate) class: String,
    /// Path to the input document
    pub(crate) file: PathBuf,
    /// Keep unrecognized keys as auxiliary attributes instead of failing
    #[arg(long)]
    pub(crate) accept_unknown: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a document and summarize the resulting objects
    Decode {
        #[command(flatten)]
        target: Target,
        /// Treat the input as CSV with a header row
        #[arg(long)]
        csv: bool,
    },

    /// Decode then re-encode a JSON document, printing canonical JSON
    Normalize {
        #[command(flatten)]
        target: Target,
    },

    /// Decode CSV rows and print them as a JSON array
    Csv {
        #[command(flatten)]
        target: Target,
        /// The first row is data; columns follow the class's field order
        #[arg(long)]
        no_header: bool,
        /// Line separator between rows
        #[arg(long, default_value = "\n")]
        separator: String,
    },

    /// List the classes and adapters of a schema descriptor
    Describe {
        /// Path to the schema descriptor JSON
        #[arg(long)]
        schema: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let settings = match settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Decode { target, csv } => commands::decode::cmd_decode(&target, csv, &settings, cli.output),
        Commands::Normalize { target } => commands::decode::cmd_normalize(&target, &settings),
        Commands::Csv {
            target,
            no_header,
            separator,
        } => commands::decode::cmd_csv(&target, !no_header, &separator, &settings),
        Commands::Describe { schema } => commands::describe::cmd_describe(&schema, cli.output),
    };

    if let Err(msg) = result {
        report_error(&msg, cli.output, cli.quiet);
        process::exit(1);
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
