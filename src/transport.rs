//! HTTP transport shared by every operation, the voice list callbacks and the
//! polling trigger.
//!
//! [`ApiClient`] is the only place that talks to the network. Everything else
//! builds an [`ApiRequest`] and hands it to a [`Transport`], which keeps the
//! request-building code testable without a server.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, Result};
use crate::types::{ApiResponse, BinaryPayload, Record};

/// HTTP verbs used by the API
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    /// GET
    Get,
    /// POST
    Post,
}

impl Verb {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
        }
    }

    fn method(&self) -> reqwest::Method {
        match self {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a multipart form
#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    /// Plain text field
    Text(String),
    /// File upload
    File(BinaryPayload),
}

/// Request body encodings
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// `application/json`
    Json(Record),
    /// `multipart/form-data`
    Multipart(Vec<(String, FormValue)>),
    /// `application/x-www-form-urlencoded`
    UrlEncoded(Vec<(String, String)>),
}

impl RequestBody {
    /// Whether the body carries a field called `name`
    pub fn contains(&self, name: &str) -> bool {
        match self {
            RequestBody::Empty => false,
            RequestBody::Json(map) => map.contains_key(name),
            RequestBody::Multipart(parts) => parts.iter().any(|(key, _)| key == name),
            RequestBody::UrlEncoded(pairs) => pairs.iter().any(|(key, _)| key == name),
        }
    }

    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            RequestBody::Empty => "empty",
            RequestBody::Json(_) => "json",
            RequestBody::Multipart(_) => "multipart",
            RequestBody::UrlEncoded(_) => "form",
        }
    }
}

/// A fully assembled API request, relative to the base URL
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb
    pub verb: Verb,
    /// Path including the version prefix, e.g. `/api/public/v1/MusicAI`
    pub path: String,
    /// Query string pairs
    pub query: Vec<(String, String)>,
    /// Body
    pub body: RequestBody,
}

impl ApiRequest {
    /// GET request without query parameters
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            verb: Verb::Get,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// POST request with an empty body
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            verb: Verb::Post,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Add a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Replace the body
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Value of a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sends requests to the API
///
/// Implementations must send exactly one request per call and never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the decoded response object
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed [`Transport`] authenticating with the stored API key
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the given credentials
    ///
    /// # Errors
    /// Returns error if the credentials are invalid or the HTTP client cannot
    /// be created
    pub fn new(credentials: &Credentials, config: &ClientConfig) -> Result<Self> {
        credentials.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: credentials.base_url().to_string(),
            api_key: credentials.api_key.clone(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_error(request: &ApiRequest, source: reqwest::Error) -> Error {
        Error::Request {
            method: request.verb.to_string(),
            path: request.path.clone(),
            source,
        }
    }

    fn build(&self, request: &ApiRequest) -> Result<reqwest::RequestBuilder> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .http_client
            .request(request.verb.method(), url)
            .header(reqwest::header::AUTHORIZATION, self.api_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(map) => builder.json(map),
            RequestBody::UrlEncoded(pairs) => builder.form(pairs),
            RequestBody::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in parts {
                    form = match value {
                        FormValue::Text(text) => form.text(name.clone(), text.clone()),
                        FormValue::File(payload) => {
                            let part = reqwest::multipart::Part::bytes(payload.data.clone())
                                .file_name(payload.file_name.clone())
                                .mime_str(&payload.content_type)
                                .map_err(|e| Self::request_error(request, e))?;
                            form.part(name.clone(), part)
                        }
                    };
                }
                builder.multipart(form)
            }
        };

        Ok(builder)
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!(
            method = %request.verb,
            path = %request.path,
            body = request.body.kind(),
            "sending MusicGPT request"
        );

        let response = self
            .build(&request)?
            .send()
            .await
            .map_err(|e| Self::request_error(&request, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Self::request_error(&request, e))?;

        debug!(path = %request.path, status = status.as_u16(), "MusicGPT response received");

        if !status.is_success() {
            return Err(Error::Api {
                method: request.verb.to_string(),
                path: request.path,
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(ApiResponse(map)),
            Ok(other) => Err(Error::UnexpectedResponse {
                method: request.verb.to_string(),
                path: request.path,
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
            Err(e) => Err(Error::UnexpectedResponse {
                method: request.verb.to_string(),
                path: request.path,
                reason: format!("invalid JSON: {}", e),
            }),
        }
    }
}

/// Pull the API's own error text out of an error body, falling back to the
/// raw body
fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
