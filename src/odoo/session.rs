//! Connection Provider
//!
//! [`Connector`] authenticates against the endpoint and hands out a
//! [`RemoteSession`]; the session is the only thing the dispatcher talks to.
//! The XML-RPC implementation posts `methodCall` documents with `reqwest`,
//! bounded by the configured timeout.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::xmlrpc::{decode_response, encode_call};
use crate::config::OdooConfig;
use crate::error::{OdooError, Result};

/// Authenticated handle permitting remote operation calls
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// User id the session is bound to
    fn uid(&self) -> i64;

    /// Invoke `method` on `model` with positional and keyword arguments
    async fn invoke(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value>;
}

/// Produces sessions from static configuration
#[async_trait]
pub trait Connector: Send + Sync {
    /// Unauthenticated server version probe
    async fn server_version(&self) -> Result<Value>;

    /// Authenticate and open a fresh session
    async fn connect(&self) -> Result<Box<dyn RemoteSession>>;

    /// Upper bound for any single network call
    fn timeout(&self) -> Duration;
}

/// HTTP transport shared by the connector and its sessions
#[derive(Clone)]
struct XmlRpcTransport {
    http: Client,
    endpoint_label: String,
    timeout: Duration,
}

impl XmlRpcTransport {
    async fn call(&self, url: &str, method: &str, params: &[Value]) -> Result<Value> {
        let body = encode_call(method, params);

        let response = self
            .http
            .post(url)
            .header("Content-Type", "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OdooError::Connectivity {
                endpoint: self.endpoint_label.clone(),
                message: format!("HTTP {}", status),
            });
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        decode_response(&text)
    }

    fn transport_error(&self, err: reqwest::Error) -> OdooError {
        if err.is_timeout() {
            return OdooError::Timeout {
                seconds: self.timeout.as_secs(),
            };
        }
        // reqwest errors embed the request URL; the configured URL may carry userinfo
        OdooError::Connectivity {
            endpoint: self.endpoint_label.clone(),
            message: describe_transport_error(&err),
        }
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    let kind = if err.is_connect() {
        "connection failed"
    } else if err.is_body() || err.is_decode() {
        "response body could not be read"
    } else if err.is_request() {
        "request failed"
    } else {
        "transport error"
    };
    // walk the source chain, skipping reqwest's own message which repeats the URL
    let mut detail = None;
    let mut source = err.source();
    while let Some(inner) = source {
        detail = Some(inner.to_string());
        source = inner.source();
    }
    match detail {
        Some(detail) => format!("{} ({})", kind, detail),
        None => kind.to_string(),
    }
}

/// Connector speaking XML-RPC to `/xmlrpc/2/common` and `/xmlrpc/2/object`
pub struct XmlRpcConnector {
    config: OdooConfig,
    transport: XmlRpcTransport,
}

impl XmlRpcConnector {
    pub fn new(config: OdooConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| OdooError::Connectivity {
                endpoint: config.display_url(),
                message: format!("failed to create HTTP client: {}", describe_transport_error(&e)),
            })?;

        let transport = XmlRpcTransport {
            http,
            endpoint_label: config.display_url(),
            timeout: config.timeout,
        };
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &OdooConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for XmlRpcConnector {
    async fn server_version(&self) -> Result<Value> {
        self.transport
            .call(&self.config.common_endpoint(), "version", &[])
            .await
    }

    async fn connect(&self) -> Result<Box<dyn RemoteSession>> {
        debug!("Connecting to Odoo at {}", self.config.display_url());

        let uid = self
            .transport
            .call(
                &self.config.common_endpoint(),
                "authenticate",
                &[
                    json!(self.config.database),
                    json!(self.config.username),
                    json!(self.config.password.expose()),
                    json!({}),
                ],
            )
            .await?;

        // authenticate answers `false` when the credentials are rejected
        let uid = match uid.as_i64() {
            Some(uid) if uid > 0 => uid,
            _ => {
                warn!("Authentication rejected for user '{}'", self.config.username);
                return Err(OdooError::Authentication {
                    user: self.config.username.clone(),
                });
            }
        };

        info!("Connected to Odoo with UID: {}", uid);
        Ok(Box::new(XmlRpcSession {
            transport: self.transport.clone(),
            object_endpoint: self.config.object_endpoint(),
            database: self.config.database.clone(),
            password: self.config.password.clone(),
            uid,
        }))
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }
}

/// Session bound to one authenticated uid
pub struct XmlRpcSession {
    transport: XmlRpcTransport,
    object_endpoint: String,
    database: String,
    password: crate::config::Credential,
    uid: i64,
}

#[async_trait]
impl RemoteSession for XmlRpcSession {
    fn uid(&self) -> i64 {
        self.uid
    }

    async fn invoke(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value> {
        let params = [
            json!(self.database),
            json!(self.uid),
            json!(self.password.expose()),
            json!(model),
            json!(method),
            Value::Array(args),
            Value::Object(kwargs),
        ];
        self.transport
            .call(&self.object_endpoint, "execute_kw", &params)
            .await
    }
}
