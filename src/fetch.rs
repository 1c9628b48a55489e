//! HTTP client abstraction for making requests to the backend services

use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    multipart, Client, Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use url::Url;

use crate::error::Error;
use crate::telemetry::Monitor;

/// Value sent in the `X-Client-Info` header
pub const CLIENT_INFO: &str = concat!("findora/", env!("CARGO_PKG_VERSION"));

/// A file sent as the single part of a `multipart/form-data` body
struct FilePart {
    field: &'static str,
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Option<HashMap<String, String>>,
    body: Option<Vec<u8>>,
    file: Option<FilePart>,
    on_error: fn(String) -> Error,
    monitor: Option<&'a Monitor>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            query_params: None,
            body: None,
            file: None,
            on_error: Error::General,
            monitor: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Add query parameters to the request
    pub fn query(mut self, params: HashMap<String, String>) -> Self {
        self.query_params = Some(params);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(json);
        Ok(self)
    }

    /// Send a file as a multipart form instead of a JSON body
    pub fn file(mut self, field: &'static str, file_name: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        self.file = Some(FilePart {
            field,
            file_name: file_name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes,
        });
        self
    }

    /// Map backend-reported failures into the given error category
    pub fn on_error(mut self, on_error: fn(String) -> Error) -> Self {
        self.on_error = on_error;
        self
    }

    /// Report the request and its outcome to telemetry
    pub fn monitor(mut self, monitor: Option<&'a Monitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Build the request
    fn build(&self) -> Result<RequestBuilder, Error> {
        let mut url = Url::parse(&self.url)?;

        if let Some(params) = &self.query_params {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in params {
                query_pairs.append_pair(key, value);
            }
        }

        let mut req = self.client.request(self.method.clone(), url.as_str());

        if let Some(file) = &self.file {
            // The multipart body sets its own boundary content type
            let mut headers = self.headers.clone();
            headers.remove(CONTENT_TYPE);
            req = req.headers(headers);

            let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type)?;
            }
            return Ok(req.multipart(multipart::Form::new().part(file.field, part)));
        }

        req = req.headers(self.headers.clone());
        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }

    /// Send the request and fail on a non-success status
    async fn send(&self) -> Result<Response, Error> {
        let req = self.build()?;
        let path = Url::parse(&self.url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| self.url.clone());
        let method = self.method.as_str();

        log::debug!("backend request: {} {}", method, path);
        if let Some(monitor) = self.monitor {
            monitor.track("backend_request", json!({ "method": method, "path": path }));
        }

        let started = Instant::now();
        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                if let Some(monitor) = self.monitor {
                    monitor.track_error(
                        &e.to_string(),
                        "backend_request",
                        json!({
                            "method": method,
                            "path": path,
                            "duration_ms": started.elapsed().as_millis() as u64,
                        }),
                    );
                }
                return Err(e.into());
            }
        };

        let status = response.status();
        log::debug!(
            "backend response: {} {} ({}) in {}ms",
            method,
            path,
            status.as_u16(),
            started.elapsed().as_millis()
        );
        if let Some(monitor) = self.monitor {
            monitor.track(
                "backend_response",
                json!({
                    "method": method,
                    "path": path,
                    "status": status.as_u16(),
                    "duration_ms": started.elapsed().as_millis() as u64,
                }),
            );
        }

        if !status.is_success() {
            let text = response.text().await?;
            let message = backend_message(&text)
                .unwrap_or_else(|| format!("Request failed with status {}: {}", status, text));
            return Err((self.on_error)(message));
        }

        Ok(response)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let response = self.send().await?;
        let result = response.json::<T>().await?;
        Ok(result)
    }

    /// Execute the request and return the raw response body
    pub async fn execute_text(&self) -> Result<String, Error> {
        let response = self.send().await?;
        Ok(response.text().await?)
    }

    /// Execute the request and discard the response body
    pub async fn execute_empty(&self) -> Result<(), Error> {
        self.send().await?;
        Ok(())
    }
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::POST)
    }
}

/// Credentials and plumbing shared by every backend request
#[derive(Clone)]
pub(crate) struct ApiContext {
    pub(crate) client: Client,
    pub(crate) key: String,
    pub(crate) token: Option<String>,
    pub(crate) monitor: Option<Monitor>,
}

impl ApiContext {
    /// Start a request carrying the API key, client info and bearer token.
    ///
    /// Without a session the anonymous key doubles as the bearer token.
    pub(crate) fn request(&self, method: Method, url: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(&self.client, url, method)
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .bearer_auth(self.token.as_deref().unwrap_or(&self.key))
            .monitor(self.monitor.as_ref())
    }
}

/// Pull the human-readable message out of a backend error body.
///
/// The auth service uses `msg`/`error_description`, the table API and
/// storage use `message`, and some paths return a bare `error`.
fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
