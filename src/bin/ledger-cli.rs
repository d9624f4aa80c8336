use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use ledger_client::api::{BalanceParams, KeyListParams, QueryParams};
use ledger_client::config::{load_config, ClientConfig};
use ledger_client::observability::logging;
use ledger_client::{Client, Query};

#[derive(Parser)]
#[command(name = "ledger-cli")]
#[command(about = "Management CLI for a hosted ledger", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "LEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger name (overrides the config file).
    #[arg(short, long, env = "LEDGER_NAME")]
    ledger: Option<String>,

    /// API credential (overrides the config file).
    #[arg(long, env = "LEDGER_CREDENTIAL", hide_env_values = true)]
    credential: Option<String>,

    /// Handshake host (overrides the config file).
    #[arg(long, env = "LEDGER_API_URL")]
    api_url: Option<String>,

    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show ledger usage counters
    Stats,
    /// List accounts
    Accounts(ListArgs),
    /// List keys
    Keys {
        /// Restrict to these ids
        #[arg(long)]
        id: Vec<String>,
    },
    /// List flavors
    Flavors(ListArgs),
    /// Show balances
    Balances {
        #[command(flatten)]
        list: ListArgs,
        /// Fields to sum by, in wire case, e.g. account_id
        #[arg(long)]
        sum_by: Vec<String>,
    },
    /// List transactions
    Transactions(ListArgs),
    /// Delete all ledger data (development ledgers only)
    Reset {
        /// Required to actually reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Args)]
struct ListArgs {
    /// Filter expression, e.g. "tags.type=$1"
    #[arg(long)]
    filter: Option<String>,

    /// Filter parameter values, in order
    #[arg(long = "param")]
    params: Vec<String>,

    /// Items per request
    #[arg(long, default_value_t = 100)]
    page_size: u32,
}

impl ListArgs {
    fn query_params(&self) -> QueryParams {
        QueryParams {
            filter: self.filter.clone(),
            filter_params: self.params.iter().cloned().map(Value::from).collect(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(ledger) = &cli.ledger {
        config.ledger_name = ledger.clone();
    }
    if let Some(credential) = &cli.credential {
        config.credential = Some(credential.clone());
    }
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }

    logging::init(&config.observability);
    let client = Client::new(config)?;

    match cli.command {
        Commands::Stats => print_json(&client.stats().get().await?)?,
        Commands::Accounts(args) => {
            print_all(client.accounts().list(args.query_params())?, args.page_size).await?
        }
        Commands::Keys { id } => {
            print_all(client.keys().list(KeyListParams { ids: id })?, 100).await?
        }
        Commands::Flavors(args) => {
            print_all(client.flavors().list(args.query_params())?, args.page_size).await?
        }
        Commands::Balances { list, sum_by } => {
            let params = list.query_params();
            let query = client.balances().list(BalanceParams {
                filter: params.filter,
                filter_params: params.filter_params,
                sum_by,
            })?;
            print_all(query, list.page_size).await?
        }
        Commands::Transactions(args) => {
            print_all(client.transactions().list(args.query_params())?, args.page_size).await?
        }
        Commands::Reset { yes } => {
            if !yes {
                eprintln!("Refusing to reset without --yes");
                std::process::exit(2);
            }
            client.dev_utils().reset().await?;
            println!("Ledger reset");
        }
    }

    Ok(())
}

async fn print_all<T>(query: Query<T>, page_size: u32) -> Result<(), Box<dyn std::error::Error>>
where
    T: DeserializeOwned + Serialize,
{
    let mut items = query.all().page_size(page_size);
    let mut out = Vec::new();
    while let Some(item) = items.next().await? {
        out.push(item);
    }
    print_json(&out)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
