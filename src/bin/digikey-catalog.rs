use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use digikey_catalog::config::proc_loader;
use digikey_catalog::observability::events::{FanoutEvents, TracingEvents};
use digikey_catalog::observability::metrics::Metrics;
use digikey_catalog::utils::logging::{self, LogLevel};
use digikey_catalog::{CatalogClient, CatalogError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "digikey-catalog.yaml")]
    config: String,
    #[arg(long, env = "DIGIKEY_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,
    #[arg(long, env = "DIGIKEY_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// print Prometheus metrics to stderr before exiting
    #[arg(long)]
    metrics: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Product details for one product number
    Product { product_number: String },
    /// Keyword search; prints the tariff codes found unless --raw
    Keyword {
        keyword: String,
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, start logging
    // -------------------------------

    let args = Args::parse();
    let service_config = proc_loader::file_to_config_or_default(Path::new(&args.config)).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Build the client; bad credentials stop here
    // -------------------------------

    let credentials = service_config
        .credentials
        .resolve(args.client_id.clone(), args.client_secret.clone())?;
    let metrics = Arc::new(Metrics::new()?);
    let events = FanoutEvents::default()
        .with(Arc::new(TracingEvents))
        .with(metrics.clone());
    let client = CatalogClient::builder(credentials)
        .api_config(&service_config.settings.api)
        .events(Arc::new(events))
        .build()?;

    // -------------------------------
    // 3. Run one search, from arguments or interactively
    // -------------------------------

    let command = match args.command {
        Some(command) => Some(command),
        None => Prompt::new().ask_command().await?,
    };
    match command {
        Some(command) => run(&client, command).await?,
        None => println!("Invalid option selected."),
    }

    if args.metrics {
        eprintln!("{}", metrics.render()?);
    }
    info!("done");
    Ok(())
}

async fn run(client: &CatalogClient, command: Command) -> Result<()> {
    match command {
        Command::Product { product_number } => match client.search_by_product_number(&product_number).await {
            Ok(result) => {
                println!("Product details found:");
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Err(err) => report(err)?,
        },
        Command::Keyword { keyword, raw } => match client.search_by_keyword(&keyword).await {
            Ok(result) => {
                println!("Search results found:");
                if raw {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    let codes = client.extract_hts().await.unwrap_or_default();
                    println!("{}", serde_json::to_string(&codes)?);
                }
            }
            Err(err) => report(err)?,
        },
    }
    Ok(())
}

/// Request-level failures are logged and swallowed; only fatal ones propagate.
fn report(err: CatalogError) -> Result<()> {
    if err.is_fatal() {
        return Err(err.into());
    }
    error!(error = %err, rate_limited = err.is_rate_limited(), "search failed");
    Ok(())
}

/// Line-oriented prompt over stdin. One reader for the whole session so
/// piped input is not lost between questions.
struct Prompt {
    reader: BufReader<Stdin>,
}

impl Prompt {
    fn new() -> Self {
        Self { reader: BufReader::new(tokio::io::stdin()) }
    }

    async fn ask(&mut self, question: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(question.as_bytes()).await?;
        stdout.flush().await?;

        let mut line = String::new();
        self.reader.read_line(&mut line).await?;
        Ok(line.trim().to_owned())
    }

    async fn ask_command(&mut self) -> Result<Option<Command>> {
        let action = self
            .ask("Do you want to search by (1) Product Number or (2) Keyword? ")
            .await?;
        let command = match action.as_str() {
            "1" => Command::Product {
                product_number: self.ask("Enter the product number to search: ").await?,
            },
            "2" => Command::Keyword {
                keyword: self.ask("Enter the keyword to search: ").await?,
                raw: false,
            },
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}
