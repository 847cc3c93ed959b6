//! Generic dispatcher
//!
//! Forwards any `(model, method, args, kwargs)` call to a fresh session after
//! the blacklist and identifier checks. The dispatcher never looks at what a
//! method does or what it returns; the blacklist is the only operation-level
//! guard.
//!
//! ```text
//! execute(model, method, args, kwargs)
//!     ├── blacklist      -> Security
//!     ├── identifiers    -> Validation
//!     ├── connect        -> Connectivity / Authentication / Timeout
//!     └── invoke         -> Remote / Timeout, or the raw result
//! ```

use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::blacklist::Blacklist;
use super::session::{Connector, RemoteSession};
use crate::error::{OdooError, Result};

static MODEL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)*$").expect("valid model name pattern")
});

static METHOD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid method name pattern"));

/// A single forwarded call
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub model: String,
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl OperationRequest {
    pub fn new(model: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            method: method.into(),
            args: Vec::new(),
            kwargs: Map::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_kwargs(mut self, kwargs: Map<String, Value>) -> Self {
        self.kwargs = kwargs;
        self
    }
}

/// Check a model name like `res.partner` or `x_custom.line`
pub fn validate_model_name(model: &str) -> Result<()> {
    if model.is_empty() {
        return Err(OdooError::validation("model name is required"));
    }
    if !MODEL_NAME.is_match(model) {
        return Err(OdooError::validation(format!(
            "invalid model name '{}'",
            model
        )));
    }
    Ok(())
}

/// Check a method name like `search_read` or `action_confirm`
pub fn validate_method_name(method: &str) -> Result<()> {
    if method.is_empty() {
        return Err(OdooError::validation("method name is required"));
    }
    if !METHOD_NAME.is_match(method) {
        return Err(OdooError::validation(format!(
            "invalid method name '{}'",
            method
        )));
    }
    Ok(())
}

/// Blacklist-guarded, operation-agnostic forwarder
#[derive(Clone)]
pub struct Dispatcher {
    connector: Arc<dyn Connector>,
    blacklist: Arc<Blacklist>,
}

impl Dispatcher {
    pub fn new(connector: Arc<dyn Connector>, blacklist: Blacklist) -> Self {
        Self {
            connector,
            blacklist: Arc::new(blacklist),
        }
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    pub fn timeout(&self) -> Duration {
        self.connector.timeout()
    }

    /// Reject blocked or malformed requests without touching the network
    pub fn check(&self, model: &str, method: &str) -> Result<()> {
        if self.blacklist.is_blocked(model, method) {
            warn!(model, method, "Blocked blacklisted operation");
            return Err(OdooError::Security {
                model: model.to_string(),
                method: method.to_string(),
            });
        }
        validate_model_name(model)?;
        validate_method_name(method)
    }

    /// Forward one call on its own session and return the raw result
    pub async fn execute(&self, request: OperationRequest) -> Result<Value> {
        self.check(&request.model, &request.method)?;
        let scope = self.open().await?;
        scope.call(request).await
    }

    /// Authenticate once and return a scope for several calls.
    /// The session is released when the scope is dropped.
    pub async fn open(&self) -> Result<DispatchScope<'_>> {
        let session = bounded(self.timeout(), self.connector.connect()).await?;
        Ok(DispatchScope {
            dispatcher: self,
            session,
        })
    }
}

/// Session held for the duration of one tool call
pub struct DispatchScope<'a> {
    dispatcher: &'a Dispatcher,
    session: Box<dyn RemoteSession>,
}

impl DispatchScope<'_> {
    pub fn uid(&self) -> i64 {
        self.session.uid()
    }

    /// Forward a call through the blacklist on the scoped session
    pub async fn call(&self, request: OperationRequest) -> Result<Value> {
        let OperationRequest {
            model,
            method,
            args,
            kwargs,
        } = request;
        self.dispatcher.check(&model, &method)?;

        debug!(
            model = %model,
            method = %method,
            args = args.len(),
            kwargs = kwargs.len(),
            "Forwarding call"
        );

        let result = bounded(
            self.dispatcher.timeout(),
            self.session.invoke(&model, &method, args, kwargs),
        )
        .await;

        if let Err(err) = &result {
            warn!(model = %model, method = %method, kind = err.kind(), "Remote call failed: {}", err);
        }
        result
    }

    /// Shorthand for `call` with positional arguments only
    pub async fn call_args(&self, model: &str, method: &str, args: Vec<Value>) -> Result<Value> {
        self.call(OperationRequest::new(model, method).with_args(args))
            .await
    }
}

async fn bounded<T>(limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(OdooError::Timeout {
            seconds: limit.as_secs(),
        }),
    }
}
