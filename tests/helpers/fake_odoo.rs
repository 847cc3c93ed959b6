//! In-memory Odoo
//!
//! Holds a small catalog (`res.partner`, `res.users`, `ir.model`, `sale.order`)
//! and answers the calls the tools make. Domains support `=` and `ilike`
//! leaves, implicitly AND-ed; logical operators are ignored.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use odoo_mcp::odoo::{Blacklist, Connector, Dispatcher, RemoteSession};
use odoo_mcp::{OdooError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model: String,
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct FakeField {
    pub name: &'static str,
    pub label: &'static str,
    pub ttype: &'static str,
    pub required: bool,
    pub relation: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct FakeModel {
    pub model: &'static str,
    pub name: &'static str,
    pub info: Option<&'static str>,
    pub fields: Vec<FakeField>,
    pub records: Vec<Map<String, Value>>,
}

fn field(name: &'static str, label: &'static str, ttype: &'static str) -> FakeField {
    FakeField {
        name,
        label,
        ttype,
        required: false,
        relation: None,
    }
}

fn record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

type Overrides = HashMap<(String, String), Value>;

pub struct FakeOdoo {
    models: Arc<Vec<FakeModel>>,
    overrides: Arc<Overrides>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    connects: AtomicUsize,
    reject_auth: bool,
    delay: Option<Duration>,
    timeout: Duration,
}

impl FakeOdoo {
    /// Catalog with `partner_count` partners
    pub fn with_partners(partner_count: usize) -> Self {
        let partners = (1..=partner_count)
            .map(|id| {
                record(json!({
                    "id": id,
                    "name": format!("Partner {:03}", id),
                    "email": format!("p{}@example.com", id),
                    "is_company": id % 2 == 0,
                    "parent_id": false,
                }))
            })
            .collect();

        let models = vec![
            FakeModel {
                model: "res.partner",
                name: "Contact",
                info: Some("Partners: companies and people"),
                fields: vec![
                    field("email", "Email", "char"),
                    field("id", "ID", "integer"),
                    field("is_company", "Is a Company", "boolean"),
                    FakeField {
                        required: true,
                        ..field("name", "Name", "char")
                    },
                    FakeField {
                        relation: Some("res.partner"),
                        ..field("parent_id", "Related Company", "many2one")
                    },
                ],
                records: partners,
            },
            FakeModel {
                model: "res.users",
                name: "User",
                info: None,
                fields: vec![field("id", "ID", "integer"), field("login", "Login", "char")],
                records: vec![record(json!({"id": 2, "login": "admin"}))],
            },
            FakeModel {
                model: "ir.model",
                name: "Models",
                info: None,
                fields: vec![field("id", "ID", "integer"), field("model", "Model", "char")],
                records: Vec::new(),
            },
            FakeModel {
                model: "sale.order",
                name: "Sales Order",
                info: Some("Quotations and orders"),
                fields: vec![field("id", "ID", "integer"), field("name", "Order Reference", "char")],
                records: vec![record(json!({"id": 1, "name": "S00001"}))],
            },
        ];

        Self {
            models: Arc::new(models),
            overrides: Arc::new(HashMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            connects: AtomicUsize::new(0),
            reject_auth: false,
            delay: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn new() -> Self {
        Self::with_partners(25)
    }

    pub fn rejecting_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    /// Every `invoke` sleeps this long first
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer `model.method` with `reply` regardless of arguments
    pub fn replying(mut self, model: &str, method: &str, reply: Value) -> Self {
        Arc::make_mut(&mut self.overrides).insert((model.to_string(), method.to_string()), reply);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn into_dispatcher(self) -> (Arc<FakeOdoo>, Dispatcher) {
        self.into_dispatcher_with(Blacklist::default())
    }

    pub fn into_dispatcher_with(self, blacklist: Blacklist) -> (Arc<FakeOdoo>, Dispatcher) {
        let fake = Arc::new(self);
        let dispatcher = Dispatcher::new(fake.clone(), blacklist);
        (fake, dispatcher)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn models(&self) -> &[FakeModel] {
        &self.models
    }
}

struct FakeSession {
    models: Arc<Vec<FakeModel>>,
    overrides: Arc<Overrides>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    delay: Option<Duration>,
}

impl FakeSession {
    fn model(&self, name: &str) -> Option<&FakeModel> {
        self.models.iter().find(|m| m.model == name)
    }

    fn answer(&self, call: &RecordedCall) -> Result<Value> {
        if let Some(reply) = self.overrides.get(&(call.model.clone(), call.method.clone())) {
            return Ok(reply.clone());
        }
        let domain = call.args.first().cloned().unwrap_or(json!([]));

        match (call.model.as_str(), call.method.as_str()) {
            ("ir.model", "search_count") => {
                let count = self
                    .models
                    .iter()
                    .filter(|m| matches(&model_row(m), &domain))
                    .count();
                return Ok(json!(count));
            }
            ("ir.model", "search_read") => {
                let rows: Vec<Value> = self
                    .models
                    .iter()
                    .map(|m| Value::Object(model_row(m)))
                    .collect();
                return Ok(Value::Array(rows));
            }
            ("ir.model.fields", "search_read") => {
                let rows: Vec<Value> = self
                    .models
                    .iter()
                    .flat_map(|m| m.fields.iter().map(move |f| (m, f)))
                    .map(|(m, f)| {
                        json!({
                            "model": m.model,
                            "name": f.name,
                            "field_description": f.label,
                            "ttype": f.ttype,
                            "required": f.required,
                            "readonly": f.name == "id",
                            "relation": f.relation.map(Value::from).unwrap_or(Value::Bool(false)),
                            "relation_field": false,
                            "help": false,
                        })
                    })
                    .filter(|row| matches(row.as_object().unwrap(), &domain))
                    .collect();
                return Ok(Value::Array(rows));
            }
            _ => {}
        }

        let model = self.model(&call.model).ok_or_else(|| {
            OdooError::Remote(format!("Object {} doesn't exist", call.model))
        })?;

        match call.method.as_str() {
            "search_read" => {
                let fields: Option<Vec<String>> = call
                    .kwargs
                    .get("fields")
                    .and_then(|f| serde_json::from_value(f.clone()).ok());
                if let Some(fields) = &fields {
                    for name in fields {
                        if !model.fields.iter().any(|f| f.name == name) {
                            return Err(OdooError::Remote(format!(
                                "Invalid field '{}' on model '{}'",
                                name, model.model
                            )));
                        }
                    }
                }
                let offset = call.kwargs.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize;
                let limit = call
                    .kwargs
                    .get("limit")
                    .and_then(Value::as_u64)
                    .map(|l| l as usize)
                    .unwrap_or(usize::MAX);

                let rows: Vec<Value> = model
                    .records
                    .iter()
                    .filter(|r| matches(r, &domain))
                    .skip(offset)
                    .take(limit)
                    .map(|r| match &fields {
                        Some(fields) => {
                            let mut projected = Map::new();
                            projected.insert("id".into(), r["id"].clone());
                            for name in fields {
                                projected.insert(name.clone(), r.get(name).cloned().unwrap_or(Value::Bool(false)));
                            }
                            Value::Object(projected)
                        }
                        None => Value::Object(r.clone()),
                    })
                    .collect();
                Ok(Value::Array(rows))
            }
            "search_count" => Ok(json!(model.records.iter().filter(|r| matches(r, &domain)).count())),
            "echo_error" => Ok(json!({"error": "remote says no"})),
            _ => Ok(json!(true)),
        }
    }
}

fn model_row(model: &FakeModel) -> Map<String, Value> {
    record(json!({
        "model": model.model,
        "name": model.name,
        "info": model.info.map(Value::from).unwrap_or(Value::Bool(false)),
    }))
}

/// `=` and `ilike` leaves, AND-ed; anything else matches
fn matches(row: &Map<String, Value>, domain: &Value) -> bool {
    let Some(terms) = domain.as_array() else {
        return true;
    };
    terms.iter().all(|term| {
        let Some(leaf) = term.as_array() else {
            return true;
        };
        let (Some(field), Some(op)) = (leaf[0].as_str(), leaf[1].as_str()) else {
            return true;
        };
        let actual = row.get(field).cloned().unwrap_or(Value::Bool(false));
        match op {
            "=" => actual == leaf[2],
            "ilike" => match (actual.as_str(), leaf[2].as_str()) {
                (Some(a), Some(needle)) => a.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            _ => true,
        }
    })
}

#[async_trait]
impl Connector for FakeOdoo {
    async fn server_version(&self) -> Result<Value> {
        Ok(json!({"server_version": "17.0", "protocol_version": 1}))
    }

    async fn connect(&self) -> Result<Box<dyn RemoteSession>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.reject_auth {
            return Err(OdooError::Authentication {
                user: "bot@example.com".into(),
            });
        }
        Ok(Box::new(FakeSession {
            models: self.models.clone(),
            overrides: self.overrides.clone(),
            calls: self.calls.clone(),
            delay: self.delay,
        }))
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl RemoteSession for FakeSession {
    fn uid(&self) -> i64 {
        2
    }

    async fn invoke(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value> {
        let call = RecordedCall {
            model: model.to_string(),
            method: method.to_string(),
            args,
            kwargs,
        };
        self.calls.lock().unwrap().push(call.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer(&call)
    }
}
