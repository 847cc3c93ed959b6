//! MCP (Model Context Protocol) Server Module
//!
//! Exposes the Odoo bridge as an MCP server for Claude integration.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Claude Agent                          │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ MCP Protocol (JSON-RPC over stdio)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MCP Server (Rust)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Tools:                                                      │
//! │  ├── ping              - Liveness, no ERP call              │
//! │  ├── health_check      - Connection/auth/access/latency     │
//! │  ├── discover_models   - List models by term                │
//! │  ├── get_model_fields  - Describe a model's fields          │
//! │  ├── search            - Domain search with pagination      │
//! │  └── execute           - Any method, blacklist-guarded      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ XML-RPC over HTTP
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                            Odoo                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! ODOO_URL=https://erp.example.com ODOO_DB=prod ODOO_USER=bot ODOO_PASSWORD=... \
//!     ./target/debug/odoo_mcp
//! ```

pub mod envelope;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub use handlers::ToolHandlers;
pub use server::McpServer;
