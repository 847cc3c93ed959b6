//! Paginated record search
//!
//! `search_read` for one page plus `search_count` for the total, both with
//! the same validated domain on the same session.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::discovery::{records, require_model};
use super::dispatcher::{DispatchScope, OperationRequest};
use super::domain::Domain;
use crate::error::{OdooError, Result};

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Search parameters after validation
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub model: String,
    pub domain: Domain,
    pub fields: Option<Vec<String>>,
    /// Always within `1..=MAX_LIMIT`
    pub limit: u64,
    pub offset: u64,
    pub order: Option<String>,
}

impl SearchParams {
    /// Validate raw tool arguments. `limit` is clamped into `1..=MAX_LIMIT`.
    pub fn new(
        model: impl Into<String>,
        domain: &Value,
        fields: Option<Vec<String>>,
        limit: Option<u64>,
        offset: Option<u64>,
        order: Option<String>,
    ) -> Result<Self> {
        let domain = Domain::parse(domain)?;

        let fields = match fields {
            Some(fields) if fields.iter().any(|f| f.trim().is_empty()) => {
                return Err(OdooError::validation("field names must be non-empty strings"))
            }
            Some(fields) if fields.is_empty() => None,
            other => other,
        };

        let order = order.filter(|o| !o.trim().is_empty());

        Ok(Self {
            model: model.into(),
            domain,
            fields,
            limit: clamp_limit(limit),
            offset: offset.unwrap_or(0),
            order,
        })
    }
}

/// Clamp a requested page size into `1..=MAX_LIMIT`
pub fn clamp_limit(requested: Option<u64>) -> u64 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub model: String,
    pub total_count: u64,
    pub returned_count: u64,
    pub offset: u64,
    pub limit: u64,
    pub domain: Domain,
    pub has_more: bool,
    pub next_offset: Option<u64>,
    pub records: Vec<Map<String, Value>>,
}

impl SearchPage {
    fn new(params: SearchParams, total_count: u64, records: Vec<Map<String, Value>>) -> Self {
        let returned_count = records.len() as u64;
        let (has_more, next_offset) = pagination(params.offset, returned_count, total_count);
        Self {
            model: params.model,
            total_count,
            returned_count,
            offset: params.offset,
            limit: params.limit,
            domain: params.domain,
            has_more,
            next_offset,
            records,
        }
    }
}

/// `has_more` iff `offset + returned < total`; `next_offset` only then
pub fn pagination(offset: u64, returned_count: u64, total_count: u64) -> (bool, Option<u64>) {
    let consumed = offset.saturating_add(returned_count);
    if consumed < total_count {
        (true, Some(consumed))
    } else {
        (false, None)
    }
}

/// Run one paginated search on an open scope
pub async fn search_records(scope: &DispatchScope<'_>, params: SearchParams) -> Result<SearchPage> {
    require_model(scope, &params.model).await?;

    let mut kwargs = Map::new();
    kwargs.insert("limit".into(), json!(params.limit));
    kwargs.insert("offset".into(), json!(params.offset));
    if let Some(fields) = &params.fields {
        kwargs.insert("fields".into(), json!(fields));
    }
    if let Some(order) = &params.order {
        kwargs.insert("order".into(), json!(order));
    }

    let rows = scope
        .call(
            OperationRequest::new(params.model.as_str(), "search_read")
                .with_args(vec![params.domain.to_value()])
                .with_kwargs(kwargs),
        )
        .await?;
    let mut rows = records(rows)?;
    // page bound holds even if the server ignores `limit`
    rows.truncate(params.limit as usize);

    let total = scope
        .call_args(
            &params.model,
            "search_count",
            vec![params.domain.to_value()],
        )
        .await?;
    let total_count = total
        .as_u64()
        .ok_or_else(|| OdooError::protocol(format!("search_count returned {}", total)))?;

    Ok(SearchPage::new(params, total_count, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(150)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(100)), 100);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(42)), 42);
    }

    #[test]
    fn pagination_flags() {
        assert_eq!(pagination(0, 10, 25), (true, Some(10)));
        assert_eq!(pagination(20, 5, 25), (false, None));
        assert_eq!(pagination(0, 0, 0), (false, None));
        assert_eq!(pagination(30, 0, 25), (false, None));
    }

    #[test]
    fn params_validate_domain_and_fields() {
        let params = SearchParams::new(
            "res.partner",
            &json!([["is_company", "=", true]]),
            Some(vec![]),
            Some(500),
            None,
            Some("  ".into()),
        )
        .unwrap();
        assert_eq!(params.limit, MAX_LIMIT);
        assert_eq!(params.offset, 0);
        assert_eq!(params.fields, None);
        assert_eq!(params.order, None);

        assert!(SearchParams::new("res.partner", &json!([["name", "x"]]), None, None, None, None).is_err());
        assert!(SearchParams::new(
            "res.partner",
            &Value::Null,
            Some(vec!["name".into(), " ".into()]),
            None,
            None,
            None
        )
        .is_err());
    }

    #[test]
    fn page_serializes_null_next_offset() {
        let params = SearchParams::new("res.partner", &Value::Null, None, None, None, None).unwrap();
        let page = SearchPage::new(params, 0, vec![]);
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["has_more"], json!(false));
        assert_eq!(value["next_offset"], Value::Null);
        assert_eq!(value["domain"], json!([]));
        assert_eq!(value["records"], json!([]));
    }
}
