#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use findora::config::TelemetryConfig;
use findora::routes::Route;
use findora::telemetry::{Telemetry, TelemetryError, TelemetryUser};
use findora::ui::{Navigator, Notifier, Toast};

/// Records every notification and navigation
#[derive(Default)]
pub struct RecordingUi {
    toasts: Mutex<Vec<Toast>>,
    routes: Mutex<Vec<Route>>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.message).collect()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }

    /// Wait until a navigation to `route` has been recorded
    pub async fn wait_for_route(&self, route: Route) -> bool {
        for _ in 0..200 {
            if self.routes().contains(&route) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Wait until a notification with `message` has been recorded
    pub async fn wait_for_message(&self, message: &str) -> bool {
        for _ in 0..200 {
            if self.messages().iter().any(|m| m == message) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl Notifier for RecordingUi {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

impl Navigator for RecordingUi {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Init,
    User(TelemetryUser),
    Action(String, Value),
    Error(String, String),
}

/// Telemetry fake that records calls, optionally failing every one
#[derive(Default)]
pub struct RecordingTelemetry {
    pub fail: bool,
    calls: Mutex<Vec<Recorded>>,
}

impl RecordingTelemetry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn users(&self) -> Vec<TelemetryUser> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::User(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    pub fn actions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::Action(name, _) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::Error(message, source) => Some((message, source)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Recorded) -> Result<(), TelemetryError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(TelemetryError::Vendor("vendor unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Telemetry for RecordingTelemetry {
    fn vendor(&self) -> &'static str {
        "recording"
    }

    async fn init(&self, _config: &TelemetryConfig) -> Result<(), TelemetryError> {
        self.record(Recorded::Init)
    }

    async fn set_user(&self, user: &TelemetryUser) -> Result<(), TelemetryError> {
        self.record(Recorded::User(user.clone()))
    }

    async fn record_action(&self, name: &str, context: Value) -> Result<(), TelemetryError> {
        self.record(Recorded::Action(name.to_string(), context))
    }

    async fn record_error(
        &self,
        message: &str,
        source: &str,
        _context: Value,
    ) -> Result<(), TelemetryError> {
        self.record(Recorded::Error(message.to_string(), source.to_string()))
    }
}

pub fn user_json(id: &str) -> Value {
    json!({
        "id": id,
        "email": "ada@example.com",
        "user_metadata": { "name": "Ada" },
        "app_metadata": {},
        "role": "authenticated"
    })
}

pub fn session_json(id: &str) -> Value {
    json!({
        "access_token": format!("token-{}", id),
        "refresh_token": "refresh",
        "token_type": "bearer",
        "expires_in": 3600,
        "user": user_json(id)
    })
}

/// Answer password sign-in with a session for `id`
pub async fn mount_sign_in(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json(id)))
        .mount(server)
        .await;
}

/// Answer the startup checks: the image bucket exists and the item table is readable
pub async fn mount_startup(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/storage/v1/bucket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "lost-items", "name": "lost-items", "public": true }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/lost_items"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

/// Wait until the server has seen a `method` request for `path`
pub async fn wait_for_request(server: &MockServer, method: &str, path: &str) -> bool {
    for _ in 0..200 {
        let seen = server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .any(|r| r.method.to_string() == method && r.url.path() == path);
        if seen {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

pub async fn mount_logout(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

pub fn item_json(id: &str, name: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "phone": "678308859",
        "place_found": "Library",
        "location_to_collect": "Front desk",
        "image_url": null,
        "user_id": "u-1",
        "created_at": created_at
    })
}
