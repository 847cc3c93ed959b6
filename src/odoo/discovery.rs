//! Model and field discovery
//!
//! Read-only introspection over `ir.model` and `ir.model.fields`, issued
//! through the dispatcher like any other call.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::dispatcher::{validate_model_name, DispatchScope, OperationRequest};
use super::domain::Domain;
use crate::error::{OdooError, Result};

/// One entry of the model catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Technical name, e.g. `res.partner`
    pub model: String,
    /// Display name, e.g. `Contact`
    pub name: String,
    pub description: String,
}

/// One field of a model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// List models whose technical or display name contains `search_term`
/// (case-insensitive). An empty or missing term returns the whole catalog.
pub async fn discover_entity_types(
    scope: &DispatchScope<'_>,
    search_term: Option<&str>,
) -> Result<Vec<ModelInfo>> {
    let mut kwargs = Map::new();
    kwargs.insert("fields".into(), json!(["model", "name", "info"]));
    kwargs.insert("order".into(), json!("model"));

    let rows = scope
        .call(
            OperationRequest::new("ir.model", "search_read")
                .with_args(vec![Domain::all().to_value()])
                .with_kwargs(kwargs),
        )
        .await?;

    let needle = search_term
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());

    let mut models: Vec<ModelInfo> = records(rows)?
        .iter()
        .map(|row| ModelInfo {
            model: string_field(row, "model").unwrap_or_default(),
            name: string_field(row, "name").unwrap_or_default(),
            description: string_field(row, "info")
                .unwrap_or_else(|| "No description".to_string()),
        })
        .filter(|info| match &needle {
            Some(needle) => {
                info.model.to_lowercase().contains(needle)
                    || info.name.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    models.sort_by(|a, b| a.model.cmp(&b.model));
    Ok(models)
}

/// True when `ir.model` has an entry for `model`
pub async fn model_exists(scope: &DispatchScope<'_>, model: &str) -> Result<bool> {
    let count = scope
        .call_args(
            "ir.model",
            "search_count",
            vec![Domain::leaf("model", "=", model).to_value()],
        )
        .await?;
    let count = count
        .as_u64()
        .ok_or_else(|| OdooError::protocol(format!("search_count returned {}", count)))?;
    Ok(count > 0)
}

/// Fail with a Validation error unless `model` exists
pub async fn require_model(scope: &DispatchScope<'_>, model: &str) -> Result<()> {
    validate_model_name(model)?;
    if model_exists(scope, model).await? {
        Ok(())
    } else {
        Err(OdooError::validation(format!("Model '{}' not found", model)))
    }
}

/// Describe every field of `model`, ordered by name
pub async fn describe_fields(scope: &DispatchScope<'_>, model: &str) -> Result<Vec<FieldInfo>> {
    require_model(scope, model).await?;

    let mut kwargs = Map::new();
    kwargs.insert(
        "fields".into(),
        json!([
            "name",
            "field_description",
            "ttype",
            "required",
            "readonly",
            "relation",
            "relation_field",
            "help"
        ]),
    );
    kwargs.insert("order".into(), json!("name"));

    let rows = scope
        .call(
            OperationRequest::new("ir.model.fields", "search_read")
                .with_args(vec![Domain::leaf("model", "=", model).to_value()])
                .with_kwargs(kwargs),
        )
        .await?;

    let mut fields: Vec<FieldInfo> = records(rows)?
        .iter()
        .map(|row| FieldInfo {
            name: string_field(row, "name").unwrap_or_default(),
            label: string_field(row, "field_description").unwrap_or_else(|| "N/A".to_string()),
            kind: string_field(row, "ttype").unwrap_or_default(),
            required: truthy(row.get("required")),
            readonly: truthy(row.get("readonly")),
            relation: string_field(row, "relation"),
            relation_field: string_field(row, "relation")
                .and_then(|_| string_field(row, "relation_field")),
            help: string_field(row, "help"),
        })
        .collect();

    fields.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(fields)
}

/// `search_read` answers a list of record structs
pub(crate) fn records(rows: Value) -> Result<Vec<Map<String, Value>>> {
    match rows {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(OdooError::protocol(format!(
                    "expected a record, got {}",
                    other
                ))),
            })
            .collect(),
        other => Err(OdooError::protocol(format!(
            "expected a list of records, got {}",
            other
        ))),
    }
}

/// Odoo sends `false` for empty text fields
fn string_field(row: &Map<String, Value>, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Null) | None => false,
    }
}
