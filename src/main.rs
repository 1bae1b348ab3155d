use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use jobmeta::{
    configuration::get_configuration,
    domain::ERROR_MARKER,
    services::batch::{self, DEFAULT_PARTS},
    startup::{build_enricher, run_enrichment},
};

#[derive(Parser)]
#[command(name = "jobmeta")]
#[command(about = "Enrich job records with metadata scraped from their posting pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every record's application_url and stream the results (default)
    Enrich {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Separate errored records from finished ones across a directory of outputs
    Partition {
        #[arg(long)]
        input_dir: PathBuf,
        #[arg(long, default_value = "final_output.json")]
        output: PathBuf,
        #[arg(long, default_value = "final_output_redo.json")]
        redo_output: PathBuf,
        #[arg(long, default_value = ERROR_MARKER)]
        prefix: String,
    },

    /// Split a record array into evenly sized part files
    Split {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_PARTS)]
        parts: usize,
        /// File name prefix for the parts; defaults to the input file's stem
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Build job records with titles from a CSV of posting links
    ExtractTitles {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "job_titles.json")]
        output: PathBuf,
    },

    /// Drop links to blocked sites from a CSV of posting links
    FilterUrls {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },

    /// Keep the first link for every host in a CSV of posting links
    OnePerDomain {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },

    /// Concatenate record arrays into one file
    Combine {
        #[arg(long)]
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Enrich {
        input: None,
        output: None,
    });

    match command {
        Commands::Enrich { input, output } => {
            let mut configuration =
                get_configuration().context("Failed to read configuration.")?;
            if let Some(input) = input {
                configuration.application.input_file = input;
            }
            if let Some(output) = output {
                configuration.application.output_file = output;
            }

            let enricher = build_enricher(&configuration.fetcher, &configuration.application)?;
            run_enrichment(&configuration.application, &enricher).await?;
        }
        Commands::Partition {
            input_dir,
            output,
            redo_output,
            prefix,
        } => {
            batch::partition_to_files(&input_dir, &prefix, &output, &redo_output)?;
        }
        Commands::Split {
            input,
            output_dir,
            parts,
            prefix,
        } => {
            batch::split_file(&input, &output_dir, parts, prefix.as_deref())?;
        }
        Commands::ExtractTitles { input, output } => {
            batch::extract_titles_to_file(&input, &output)?;
        }
        Commands::FilterUrls { input, output } => {
            batch::remove_blocked_to_file(&input, &output)?;
        }
        Commands::OnePerDomain { input, output } => {
            batch::first_per_host_to_file(&input, &output)?;
        }
        Commands::Combine { output, inputs } => {
            batch::combine_to_file(&inputs, &output)?;
        }
    }

    Ok(())
}
