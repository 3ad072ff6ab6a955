// crates/vpc-assert-providers/tests/common/mod.rs
// ============================================================================
// Module: Common Provider Test Fixtures
// Description: Local Compute API stand-in and settings helpers.
// Purpose: Exercise HTTP behavior without reaching a real cloud endpoint.
// Dependencies: vpc-assert-config, tiny_http, serde_json
// ============================================================================

//! ## Overview
//! [`MockCompute`] serves canned JSON bodies keyed by request path and query,
//! answers 404 for anything else, and records every request it sees.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use serde_json::Value;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;
use vpc_assert_config::GcpSettings;

// ============================================================================
// SECTION: Mock Server
// ============================================================================

/// Request observed by the mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    /// Path and query string.
    pub url: String,
    /// Authorization header value, if sent.
    pub authorization: Option<String>,
}

/// Canned response for one path.
#[derive(Debug, Clone)]
pub struct Canned {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

/// Local HTTP server answering Compute-style requests.
pub struct MockCompute {
    /// Base URL including the `/compute/v1` prefix.
    pub base_url: String,
    /// Requests received so far.
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    /// Server handle used for shutdown.
    server: Arc<Server>,
    /// Serving thread.
    handle: Option<JoinHandle<()>>,
}

impl MockCompute {
    /// Starts a server answering each path with its canned response.
    pub fn start(routes: Vec<(&str, Canned)>) -> Self {
        let routes: BTreeMap<String, Canned> =
            routes.into_iter().map(|(path, canned)| (format!("/compute/v1{path}"), canned)).collect();
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = {
            let server = Arc::clone(&server);
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    let authorization = request
                        .headers()
                        .iter()
                        .find(|header| header.field.equiv("Authorization"))
                        .map(|header| header.value.as_str().to_string());
                    seen.lock().unwrap().push(SeenRequest {
                        url: request.url().to_string(),
                        authorization,
                    });
                    let canned = routes.get(request.url()).cloned().unwrap_or(Canned {
                        status: 404,
                        body: serde_json::json!({"error": {"code": 404}}),
                    });
                    let content_type =
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                    let response = Response::from_string(canned.body.to_string())
                        .with_status_code(canned.status)
                        .with_header(content_type);
                    let _ = request.respond(response);
                }
            })
        };
        Self {
            base_url: format!("http://{addr}/compute/v1"),
            seen,
            server,
            handle: Some(handle),
        }
    }

    /// Returns provider settings pointed at this server.
    pub fn settings(&self) -> GcpSettings {
        GcpSettings {
            base_url: self.base_url.clone(),
            timeout_ms: 2_000,
            max_pages: 3,
            ..GcpSettings::default()
        }
    }

    /// Returns the requests received so far.
    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for MockCompute {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Canned 200 response.
pub fn ok(body: Value) -> Canned {
    Canned {
        status: 200,
        body,
    }
}

/// Canned error response.
pub fn status(code: u16) -> Canned {
    Canned {
        status: code,
        body: serde_json::json!({"error": {"code": code}}),
    }
}
