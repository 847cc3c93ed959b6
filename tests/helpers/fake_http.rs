//! Loopback XML-RPC server for transport tests
//!
//! An axum router with the two Odoo endpoints. Every request is recorded,
//! then answered by the test's responder.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Xml(String),
    Status(StatusCode),
    /// Accept the request and never answer
    Hang,
}

type Responder = dyn Fn(&CapturedRequest) -> Reply + Send + Sync;

#[derive(Clone)]
struct FakeState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    responder: Arc<Responder>,
}

pub struct FakeHttp {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeHttp {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&CapturedRequest) -> Reply + Send + Sync + 'static,
    {
        let state = FakeState {
            requests: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        };
        let requests = state.requests.clone();

        let app = Router::new()
            .route("/xmlrpc/2/common", post(xmlrpc))
            .route("/xmlrpc/2/object", post(xmlrpc))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn xmlrpc(State(state): State<FakeState>, uri: Uri, body: String) -> Response {
    let request = CapturedRequest {
        path: uri.path().to_string(),
        body,
    };
    state.requests.lock().unwrap().push(request.clone());

    match (state.responder)(&request) {
        Reply::Xml(xml) => ([(header::CONTENT_TYPE, "text/xml")], xml).into_response(),
        Reply::Status(status) => status.into_response(),
        Reply::Hang => std::future::pending::<Response>().await,
    }
}

/// `<methodResponse>` carrying one value
pub fn xml_response(value_xml: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<methodResponse><params><param><value>{}</value></param></params></methodResponse>",
        value_xml
    )
}

/// `<methodResponse>` carrying a fault
pub fn xml_fault(code: i32, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<methodResponse><fault><value><struct>\
         <member><name>faultCode</name><value><int>{}</int></value></member>\
         <member><name>faultString</name><value><string>{}</string></value></member>\
         </struct></value></fault></methodResponse>",
        code, message
    )
}
