use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dbase_client::{Base, ClientConfig, Deta, Item, Query, QueryRequest, Record, Updater};
use serde_json::{json, Value};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Pretty JSON (default)
    Json,
    /// JSON Lines (one item per line)
    Jsonl,
}

#[derive(Parser)]
#[command(name = "dbase")]
#[command(about = "Deta Base CLI", long_about = None)]
struct Cli {
    /// Project key (the project id is its prefix)
    #[arg(long, env = "DETA_PROJECT_KEY", hide_env_values = true)]
    project_key: String,

    /// Base name
    #[arg(short, long)]
    base: String,

    /// Database host, e.g. https://database.deta.sh
    #[arg(long)]
    host: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Put items, overwriting existing keys
    Put {
        /// Items as JSON objects
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Insert items, failing on existing keys
    Insert {
        /// Items as JSON objects
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Get items by key; without keys, fetch the whole Base
    Get {
        keys: Vec<String>,
    },
    /// Delete items by key
    Delete {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Update one item
    Update {
        key: String,
        /// field=json
        #[arg(long)]
        set: Vec<String>,
        /// field=number
        #[arg(long)]
        increment: Vec<String>,
        /// field=json
        #[arg(long)]
        append: Vec<String>,
        /// field=json
        #[arg(long)]
        prepend: Vec<String>,
        /// field
        #[arg(long)]
        remove: Vec<String>,
    },
    /// Run a filtered query (one page)
    Query {
        /// Clause object as JSON, e.g. '{"age?gt": 20}'; repeat to OR clauses
        #[arg(short = 'w', long = "where")]
        clauses: Vec<String>,
        /// Maximum number of items to return
        #[arg(short, long)]
        limit: Option<u32>,
        /// Continuation token from a previous page
        #[arg(long)]
        last: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base = open_base(&cli)?;

    match cli.command {
        Commands::Put { items } => {
            let records = parse_records(&items)?;
            let result = base.put(&records).await.context("Failed to put items")?;
            if !result.is_complete() {
                eprintln!("{} item(s) failed", result.failed().len());
            }
            emit(
                cli.output,
                &[json!({ "processed": result.processed(), "failed": result.failed() })],
            )?;
        }

        Commands::Insert { items } => {
            let records = parse_records(&items)?;
            let created = base
                .insert(&records)
                .await
                .context("Failed to insert items")?
                .unwrap_or_default();
            emit(cli.output, &created)?;
        }

        Commands::Get { keys } => {
            let items = base.get(keys.as_slice()).await.context("Failed to get items")?;
            match items {
                Some(items) => emit(cli.output, &objects(items))?,
                None => eprintln!("No items found"),
            }
        }

        Commands::Delete { keys } => {
            base.delete(keys.as_slice()).await.context("Failed to delete items")?;
            eprintln!("{} key(s) deleted", keys.len());
        }

        Commands::Update {
            key,
            set,
            increment,
            append,
            prepend,
            remove,
        } => {
            let mut updater = Updater::new();
            for arg in &set {
                let (field, value) = parse_assignment(arg)?;
                updater = updater.set(field, value);
            }
            for arg in &increment {
                let (field, value) = parse_assignment(arg)?;
                updater = updater.increment(field, value);
            }
            for arg in &append {
                let (field, value) = parse_assignment(arg)?;
                updater = updater.append(field, value);
            }
            for arg in &prepend {
                let (field, value) = parse_assignment(arg)?;
                updater = updater.prepend(field, value);
            }
            for field in remove {
                updater = updater.delete(field);
            }

            let response = base
                .update(&key, &updater)
                .await
                .context("Failed to update item")?;
            emit(cli.output, &[response])?;
        }

        Commands::Query {
            clauses,
            limit,
            last,
        } => {
            let queries = clauses
                .iter()
                .map(|raw| parse_object(raw).map(Query::from))
                .collect::<Result<Vec<_>>>()?;

            let mut request = QueryRequest::new(queries);
            if let Some(limit) = limit {
                request = request.limit(limit);
            }
            if let Some(last) = last {
                request = request.last(last);
            }

            let page = base.query(&request).await.context("Failed to run query")?;
            let token = page.continuation().map(str::to_string);
            emit(cli.output, &objects(page.items))?;
            if let Some(token) = token {
                eprintln!("More results available: --last {}", token);
            }
        }
    }

    Ok(())
}

fn open_base(cli: &Cli) -> Result<Base> {
    let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(host) = &cli.host {
        config = config.with_database_host(host.as_str());
    }
    if let Some(secs) = cli.timeout {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }

    let deta = Deta::with_config(cli.project_key.as_str(), config).context("Failed to create client")?;
    Ok(deta.base(cli.base.as_str())?)
}

fn parse_object(raw: &str) -> Result<Item> {
    match serde_json::from_str::<Value>(raw).with_context(|| format!("Invalid JSON: {}", raw))? {
        Value::Object(map) => Ok(map),
        other => bail!("Expected a JSON object, got {}", other),
    }
}

fn parse_records(raw: &[String]) -> Result<Vec<Record>> {
    raw.iter()
        .map(|item| Ok(Record::from_value(Value::Object(parse_object(item)?))?))
        .collect()
}

/// Split `field=value`; the value is JSON, or a plain string when it does not parse
fn parse_assignment(arg: &str) -> Result<(String, Value)> {
    let Some((field, raw)) = arg.split_once('=') else {
        bail!("Expected field=value, got '{}'", arg);
    };
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((field.to_string(), value))
}

fn objects(items: Vec<Item>) -> Vec<Value> {
    items.into_iter().map(Value::Object).collect()
}

fn emit(format: OutputFormat, values: &[Value]) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(values)?),
        OutputFormat::Jsonl => {
            for value in values {
                println!("{}", serde_json::to_string(value)?);
            }
        }
    }
    Ok(())
}
