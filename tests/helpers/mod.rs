//! Shared fixtures for integration tests
//!
//! - `fake_odoo`: in-memory `Connector`/`RemoteSession` that records every call
//! - `fake_http`: loopback HTTP server answering canned XML-RPC bodies

#![allow(dead_code)]

pub mod fake_http;
pub mod fake_odoo;
