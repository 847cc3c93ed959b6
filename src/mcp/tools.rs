//! MCP Tool Definitions
//!
//! Defines all available tools for the Odoo MCP server.

use super::protocol::Tool;
use crate::odoo::search::{DEFAULT_LIMIT, MAX_LIMIT};
use serde_json::json;

pub const PING: &str = "ping";
pub const HEALTH_CHECK: &str = "health_check";
pub const DISCOVER_MODELS: &str = "discover_models";
pub const GET_MODEL_FIELDS: &str = "get_model_fields";
pub const SEARCH: &str = "search";
pub const EXECUTE: &str = "execute";

/// Map the older `odoo_`-prefixed names onto the current ones
pub fn canonical_name(name: &str) -> &str {
    match name {
        "odoo_health_check" => HEALTH_CHECK,
        "odoo_discover_models" => DISCOVER_MODELS,
        "odoo_get_model_fields" => GET_MODEL_FIELDS,
        "odoo_search" => SEARCH,
        "odoo_execute" => EXECUTE,
        other => other,
    }
}

/// Get all available MCP tools
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: PING.into(),
            description: "Check that the MCP server is running. Does not contact Odoo.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: HEALTH_CHECK.into(),
            description: "Check the Odoo connection: server reachable, authentication, core model access, latency.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: DISCOVER_MODELS.into(),
            description: "List Odoo models, optionally filtered by a case-insensitive term matched against technical and display names.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "search_term": {
                        "type": "string",
                        "description": "Filter, e.g. 'partner' or 'invoice'. Empty lists every model."
                    }
                }
            }),
        },
        Tool {
            name: GET_MODEL_FIELDS.into(),
            description: "Describe every field of an Odoo model: label, type, required, readonly, relation.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "model_name": {
                        "type": "string",
                        "description": "Technical model name, e.g. 'res.partner'"
                    }
                },
                "required": ["model_name"]
            }),
        },
        Tool {
            name: SEARCH.into(),
            description: "Search and read records of any Odoo model with a domain filter and pagination.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "model": {
                        "type": "string",
                        "description": "Technical model name, e.g. 'res.partner'"
                    },
                    "domain": {
                        "type": "array",
                        "description": "Odoo domain, e.g. [[\"name\", \"ilike\", \"john\"]] or [\"|\", [\"a\", \"=\", 1], [\"b\", \"=\", 2]]"
                    },
                    "fields": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Fields to return; all fields when omitted"
                    },
                    "limit": {
                        "type": "integer",
                        "default": DEFAULT_LIMIT,
                        "minimum": 1,
                        "maximum": MAX_LIMIT,
                        "description": "Max records to return (values above the maximum are clamped)"
                    },
                    "offset": {
                        "type": "integer",
                        "default": 0,
                        "minimum": 0,
                        "description": "Records to skip, for pagination"
                    },
                    "order": {
                        "type": "string",
                        "description": "Sort order, e.g. 'name desc, id'"
                    }
                },
                "required": ["model"]
            }),
        },
        Tool {
            name: EXECUTE.into(),
            description: "Execute any method on an Odoo model (create, write, unlink, action_*, ...). A fixed set of destructive operations is refused.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "model": {
                        "type": "string",
                        "description": "Technical model name, e.g. 'res.partner'"
                    },
                    "method": {
                        "type": "string",
                        "description": "Method name, e.g. 'create', 'write', 'search'"
                    },
                    "args": {
                        "type": "array",
                        "description": "Positional arguments"
                    },
                    "kwargs": {
                        "type": "object",
                        "description": "Keyword arguments"
                    }
                },
                "required": ["model", "method"]
            }),
        },
    ]
}
