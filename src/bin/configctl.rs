use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "configctl")]
#[command(about = "Management CLI for the site configuration engine", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "CONFIGCTL_URL")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION", env = "CONFIGCTL_KEY")]
    key: String,

    /// Recorded as the acting admin.
    #[arg(short, long, default_value = "admin")]
    actor: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// List scopes with version counts
    Scopes,
    /// List versions of a scope, newest first
    Versions {
        scope_type: String,
        #[arg(short, long)]
        qualifier: Option<String>,
        #[arg(long)]
        cursor: Option<u64>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one version with its payload and report
    Show { id: String },
    /// Save a JSON file as a new draft
    Save {
        scope_type: String,
        file: PathBuf,
        #[arg(short, long)]
        qualifier: Option<String>,
    },
    /// Validate and publish a version
    Publish { id: String },
    /// Dry-run validation of a stored version or a JSON file
    Validate {
        /// Version id, or a scope type when --file is given
        target: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        qualifier: Option<String>,
    },
    /// Show the configuration consumers currently receive
    Current {
        scope_type: String,
        #[arg(short, long)]
        qualifier: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );
    headers.insert("x-actor", HeaderValue::from_str(&cli.actor)?);

    let request = match cli.command {
        Commands::Status => client.get(format!("{base}/admin/status")),
        Commands::Scopes => client.get(format!("{base}/api/v1/scopes")),
        Commands::Versions {
            scope_type,
            qualifier,
            cursor,
            limit,
        } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(q) = qualifier {
                query.push(("qualifier", q));
            }
            if let Some(c) = cursor {
                query.push(("cursor", c.to_string()));
            }
            if let Some(l) = limit {
                query.push(("limit", l.to_string()));
            }
            client
                .get(format!("{base}/api/v1/scopes/{scope_type}/versions"))
                .query(&query)
        }
        Commands::Show { id } => client.get(format!("{base}/api/v1/versions/{id}")),
        Commands::Save {
            scope_type,
            file,
            qualifier,
        } => client
            .post(format!("{base}/api/v1/scopes/{scope_type}/versions"))
            .query(&qualifier_query(qualifier))
            .json(&json!({ "payload": read_payload(&file)? })),
        Commands::Publish { id } => client.post(format!("{base}/api/v1/versions/{id}/publish")),
        Commands::Validate {
            target,
            file: Some(file),
            qualifier,
        } => client
            .post(format!("{base}/api/v1/scopes/{target}/validate"))
            .query(&qualifier_query(qualifier))
            .json(&json!({ "payload": read_payload(&file)? })),
        Commands::Validate { target, .. } => {
            client.post(format!("{base}/api/v1/versions/{target}/validate"))
        }
        Commands::Current {
            scope_type,
            qualifier,
        } => client
            .get(format!("{base}/api/v1/scopes/{scope_type}/current"))
            .query(&qualifier_query(qualifier)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

fn qualifier_query(qualifier: Option<String>) -> Vec<(&'static str, String)> {
    qualifier.map(|q| vec![("qualifier", q)]).unwrap_or_default()
}

fn read_payload(path: &PathBuf) -> Result<Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let body = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or(text);

    if status.is_success() {
        println!("{body}");
        return Ok(());
    }

    eprintln!("Error: engine returned status {status}");
    eprintln!("{body}");
    std::process::exit(1);
}
