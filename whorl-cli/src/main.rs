mod display;

use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use whorl_core::colors::CatppuccinExt;
use whorl_core::output::{get_formatter, OutputFormat};

use display::progress::{clear_bulk_progress_bar, set_bulk_progress_bar, ProgressWriterFactory};
use display::spinner::Spinner;

#[derive(Parser)]
#[command(name = "whorl")]
#[command(about = "Follow the WHOIS referral chain from IANA to the registry and registrar")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (human or json)
    #[arg(short, long, default_value = "human")]
    format: String,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the WHOIS record for a domain
    Lookup {
        /// Domain name to look up
        domain: String,
        /// Give up after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Resolve every domain listed in a file
    Bulk {
        /// File containing domains: one per line, # for comments, or CSV (uses first column)
        file: String,
        /// Number of resolutions running at once
        #[arg(short, long, default_value_t = 10)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(ProgressWriterFactory::new())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let output_format: OutputFormat = cli.format.parse().unwrap_or_default();

    execute_command(cli.command, output_format, !cli.no_color).await
}

async fn execute_command(
    command: Commands,
    output_format: OutputFormat,
    use_colors: bool,
) -> anyhow::Result<()> {
    let formatter = get_formatter(output_format, use_colors);

    match command {
        Commands::Lookup { domain, timeout } => {
            let resolver = whorl_core::Resolver::new();
            let spinner = (output_format == OutputFormat::Human)
                .then(|| Spinner::new(&format!("Resolving {}...", domain)));

            let lookup = resolver.resolve_traced(&domain);
            let result = match timeout {
                Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), lookup).await {
                    Ok(result) => result.map_err(anyhow::Error::from),
                    Err(_) => Err(anyhow::anyhow!(
                        "lookup for {} timed out after {}s",
                        domain,
                        secs
                    )),
                },
                None => lookup.await.map_err(anyhow::Error::from),
            };

            if let Some(spinner) = spinner {
                spinner.finish();
            }

            match result {
                Ok(resolution) => {
                    println!("{}", formatter.format_resolution(&resolution));
                }
                Err(e) => {
                    eprintln!("{} {}", "Error:".ctp_red(), e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Bulk { file, concurrency } => {
            let content = std::fs::read_to_string(&file)?;
            let domains = whorl_core::bulk::parse_domains_from_file(&content);

            if domains.is_empty() {
                eprintln!(
                    "{} No valid domains found in file. Expected format: one domain per line, # for comments, or CSV (first column)",
                    "Error:".ctp_red()
                );
                std::process::exit(1);
            }

            let progress = ProgressBar::new(domains.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("=> "),
            );
            set_bulk_progress_bar(progress.clone());

            let bar = progress.clone();
            let callback: whorl_core::bulk::ProgressCallback =
                Box::new(move |count, _total, domain| {
                    bar.set_position(count as u64);
                    bar.set_message(domain.to_string());
                });

            let bulk = whorl_core::BulkResolver::new().with_concurrency(concurrency);
            let results = bulk.execute(domains, Some(callback)).await;

            clear_bulk_progress_bar();
            progress.finish_and_clear();

            println!("{}", formatter.format_bulk(&results));
        }
    }

    Ok(())
}
