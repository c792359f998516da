//! ratecache - print currency exchange rates, served from a local cache while fresh

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratecache::cli::{format_rates, Cli, Command};
use ratecache::{Config, CurrencyClient};

/// Installs the log subscriber on stderr so stdout only carries rates.
/// Defaults to warnings; override with RUST_LOG (e.g. `RUST_LOG=ratecache=debug`).
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratecache=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = Some(dir);
    }

    match cli.command {
        Command::Get { symbols, base, ttl } => {
            if let Some(ttl) = ttl {
                config.ttl = ttl;
            }
            let client = CurrencyClient::from_config(&config)?;
            let result = client.get_currency(&base, &symbols).await?;
            print!("{}", format_rates(&result));
        }
        Command::Clear { symbols, base } => {
            let client = CurrencyClient::from_config(&config)?;
            let key = client.clear_cache(&base, &symbols)?;
            println!("Cleared cached rates for {}", key);
        }
    }

    Ok(())
}
