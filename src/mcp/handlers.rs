//! MCP Tool Handlers
//!
//! Implements the business logic for each MCP tool. Every handler returns an
//! envelope (see [`super::envelope`]); nothing propagates to the transport.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::envelope;
use super::protocol::ToolCallResult;
use super::tools;
use crate::error::{OdooError, Result};
use crate::odoo::{
    describe_fields, discover_entity_types, run_health_check, search_records, Dispatcher,
    OperationRequest, SearchParams,
};

pub const SERVER_NAME: &str = "Odoo MCP Server";

#[derive(Debug, Default, Deserialize)]
struct DiscoverArgs {
    #[serde(default)]
    search_term: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelFieldsArgs {
    model_name: String,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    model: String,
    #[serde(default)]
    domain: Value,
    #[serde(default)]
    fields: Option<Vec<String>>,
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default)]
    offset: Option<u64>,
    #[serde(default)]
    order: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecuteArgs {
    model: String,
    method: String,
    #[serde(default)]
    args: Option<Vec<Value>>,
    #[serde(default)]
    kwargs: Option<Map<String, Value>>,
}

/// Tool handlers over a shared dispatcher
#[derive(Clone)]
pub struct ToolHandlers {
    dispatcher: Dispatcher,
}

impl ToolHandlers {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle a tool call by name
    pub async fn handle(&self, name: &str, args: Value) -> ToolCallResult {
        let envelope = self.dispatch(name, args).await;
        ToolCallResult::envelope(&envelope, envelope::is_error(&envelope))
    }

    /// Route a tool call and return its envelope
    pub async fn dispatch(&self, name: &str, args: Value) -> Value {
        debug!(tool = name, "Dispatching tool call");
        match tools::canonical_name(name) {
            tools::PING => self.ping(),
            tools::HEALTH_CHECK => self.health_check().await,
            tools::DISCOVER_MODELS => envelope::normalize(
                self.discover_models(args).await,
                "Error discovering models",
            ),
            tools::GET_MODEL_FIELDS => envelope::normalize(
                self.get_model_fields(args).await,
                "Error getting model fields",
            ),
            tools::SEARCH => envelope::normalize(self.search(args).await, "Error searching"),
            tools::EXECUTE => {
                envelope::normalize(self.execute(args).await, "Error executing method")
            }
            _ => envelope::error(format!("Unknown tool: {}", name)),
        }
    }

    fn ping(&self) -> Value {
        envelope::with_status(
            "ok",
            object(json!({
                "message": "MCP server is running",
                "server": SERVER_NAME,
            })),
        )
    }

    async fn health_check(&self) -> Value {
        let report = run_health_check(&self.dispatcher).await;
        envelope::with_status(
            report.status.as_str(),
            object(json!({ "report": report.render() })),
        )
    }

    async fn discover_models(&self, args: Value) -> Result<Map<String, Value>> {
        let args: DiscoverArgs = parse_args(args)?;
        let term = args
            .search_term
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let scope = self.dispatcher.open().await?;
        let models = discover_entity_types(&scope, term.as_deref()).await?;

        info!(found = models.len(), "Discovered models");
        Ok(object(json!({
            "total_found": models.len(),
            "search_term": term.as_deref().unwrap_or("all models"),
            "models": models,
        })))
    }

    async fn get_model_fields(&self, args: Value) -> Result<Map<String, Value>> {
        let args: ModelFieldsArgs = parse_args(args)?;
        let model = args.model_name.trim();

        let scope = self.dispatcher.open().await?;
        let fields = describe_fields(&scope, model).await?;

        Ok(object(json!({
            "model": model,
            "total_fields": fields.len(),
            "fields": fields,
        })))
    }

    async fn search(&self, args: Value) -> Result<Map<String, Value>> {
        let args: SearchArgs = parse_args(args)?;
        let params = SearchParams::new(
            args.model.trim(),
            &args.domain,
            args.fields,
            args.limit,
            args.offset,
            args.order,
        )?;

        let scope = self.dispatcher.open().await?;
        let page = search_records(&scope, params).await?;

        serde_json::to_value(&page)
            .map(object)
            .map_err(|e| OdooError::protocol(format!("could not encode search results: {}", e)))
    }

    async fn execute(&self, args: Value) -> Result<Map<String, Value>> {
        let args: ExecuteArgs = parse_args(args)?;
        let request = OperationRequest::new(args.model.trim(), args.method.trim())
            .with_args(args.args.unwrap_or_default())
            .with_kwargs(args.kwargs.unwrap_or_default());

        let model = request.model.clone();
        let method = request.method.clone();
        let result = self.dispatcher.execute(request).await?;

        Ok(object(json!({
            "model": model,
            "method": method,
            "result": result,
        })))
    }
}

/// Deserialize tool arguments; missing arguments count as `{}`
fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| OdooError::validation(format!("invalid arguments: {}", e)))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".into(), other);
            map
        }
    }
}
