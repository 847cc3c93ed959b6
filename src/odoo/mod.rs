//! Odoo bridge
//!
//! ```text
//! ┌──────────────┐   ┌───────────┐   ┌───────────────┐   ┌──────────┐
//! │  discovery   │──▶│           │──▶│   Connector   │──▶│ XML-RPC  │
//! │  search      │   │ Dispatcher│   │ RemoteSession │   │ over HTTP│
//! │  health      │──▶│ +Blacklist│   └───────────────┘   └──────────┘
//! └──────────────┘   └───────────┘
//! ```

pub mod blacklist;
pub mod discovery;
pub mod dispatcher;
pub mod domain;
pub mod health;
pub mod search;
pub mod session;
pub mod xmlrpc;

pub use blacklist::Blacklist;
pub use discovery::{describe_fields, discover_entity_types, FieldInfo, ModelInfo};
pub use dispatcher::{DispatchScope, Dispatcher, OperationRequest};
pub use domain::{Domain, DomainTerm, LogicalOp};
pub use health::{run_health_check, HealthReport, HealthStatus};
pub use search::{search_records, SearchPage, SearchParams};
pub use session::{Connector, RemoteSession, XmlRpcConnector, XmlRpcSession};
