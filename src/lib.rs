//! Odoo MCP bridge
//!
//! Exposes model discovery, field inspection, domain search and a generic,
//! blacklist-guarded method dispatcher over the Odoo XML-RPC API as MCP
//! tools.

pub mod config;
pub mod error;
pub mod mcp;
pub mod odoo;

pub use config::OdooConfig;
pub use error::{OdooError, Result};
pub use mcp::McpServer;
pub use odoo::{Blacklist, Dispatcher};
