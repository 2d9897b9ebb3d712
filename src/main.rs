//! Site configuration engine.
//!
//! Versioned, validated storefront configuration (themes, layouts, menus)
//! behind an admin API and a public read endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//!                ┌──────────────────────────────────────────────────────────┐
//!                │                   SITE CONFIG ENGINE                     │
//!                │                                                          │
//!   Admin API    │  ┌─────────┐   ┌──────────────┐   ┌──────────────────┐   │
//!   ─────────────┼─▶│  admin  │──▶│   publish    │──▶│    validators    │   │
//!                │  │handlers │   │ coordinator  │   │ contrast/layout  │   │
//!                │  └────┬────┘   └──────┬───────┘   └──────────────────┘   │
//!                │       │               ▼                                  │
//!                │       │        ┌──────────────┐   ┌──────────────────┐   │
//!                │       └───────▶│    store     │──▶│     journal      │   │
//!                │                │ scope ledgers│   │ (append-only)    │   │
//!   Storefront   │  ┌─────────┐   └──────┬───────┘   └──────────────────┘   │
//!   ◀────────────┼──│ public  │◀──┌──────┴───────┐                         │
//!                │  │ current │   │   resolver   │                         │
//!                │  └─────────┘   └──────────────┘                         │
//!                │                                                          │
//!                │   config + watcher · observability · lifecycle · tls    │
//!                └──────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use site_config_engine::lifecycle::startup;

#[derive(Parser)]
#[command(name = "site-config-engine", version, about = "Versioned site configuration service")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config/engine.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    startup::run(&args.config).await?;
    Ok(())
}
