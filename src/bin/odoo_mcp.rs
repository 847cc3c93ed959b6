//! Odoo MCP Server Binary
//!
//! Serves the Odoo tools over stdio for Claude integration.
//!
//! ## Usage
//!
//! ```bash
//! ODOO_URL=https://erp.example.com ODOO_DB=prod ODOO_USER=bot ODOO_PASSWORD=... ./target/debug/odoo_mcp
//! ```
//!
//! ## Environment Variables
//!
//! - `ODOO_URL`, `ODOO_DB`, `ODOO_USER`, `ODOO_PASSWORD` (required)
//! - `ODOO_TIMEOUT` (optional): seconds per network call, default 30
//! - `RUST_LOG` (optional): log filter, default `info`; logs go to stderr

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use odoo_mcp::odoo::XmlRpcConnector;
use odoo_mcp::{Blacklist, Dispatcher, McpServer, OdooConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = OdooConfig::from_env().context("Invalid Odoo configuration")?;
    info!(
        "Odoo endpoint {} (db '{}', user '{}', timeout {}s)",
        config.display_url(),
        config.database,
        config.username,
        config.timeout.as_secs()
    );

    let connector = XmlRpcConnector::new(config).context("Failed to create Odoo connector")?;
    let blacklist = Blacklist::default();
    if blacklist.is_empty() {
        warn!("Blacklist is empty, every operation is forwarded");
    }
    for (model, method) in blacklist.entries() {
        info!(model, method, "Blacklisted operation");
    }

    let dispatcher = Dispatcher::new(Arc::new(connector), blacklist);
    McpServer::new(dispatcher).run().await
}
