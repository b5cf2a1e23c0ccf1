//! Request body assembly shared by every operation.
//!
//! Values are collected in declaration order and only encoded once the
//! operation's encoding is known: a body carrying a file becomes a multipart
//! form, anything else is sent as JSON (or as a query string / URL-encoded
//! form for the endpoints that expect those).

use serde_json::Value;

use super::table::{BodyField, Encoding, Presence, ValueKind};
use crate::error::{Error, Result};
use crate::transport::{ApiRequest, FormValue, RequestBody, Verb};
use crate::types::{AudioReference, BinaryPayload, Parameters, Record, json_number};

/// Voice selector value meaning "no voice"
pub(crate) const NO_VOICE: &str = "none";

/// A value collected for the outbound request
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum BodyValue {
    Text(String),
    Number(f64),
    Flag(bool),
    File(BinaryPayload),
}

impl BodyValue {
    fn to_json(&self) -> Value {
        match self {
            BodyValue::Text(text) => Value::String(text.clone()),
            BodyValue::Number(number) => json_number(*number),
            BodyValue::Flag(flag) => Value::Bool(*flag),
            BodyValue::File(_) => Value::Null,
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            BodyValue::Text(text) => Some(text.clone()),
            BodyValue::Number(number) => Some(number.to_string()),
            BodyValue::Flag(flag) => Some(flag.to_string()),
            BodyValue::File(_) => None,
        }
    }
}

/// Collects named values for one request
#[derive(Debug, Default)]
pub(crate) struct RequestBuilder {
    entries: Vec<(String, BodyValue)>,
}

impl RequestBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, value: BodyValue) {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub(crate) fn text(&mut self, name: &str, value: impl Into<String>) {
        self.push(name, BodyValue::Text(value.into()));
    }

    pub(crate) fn optional_text(&mut self, name: &str, value: Option<String>) {
        if let Some(value) = value {
            self.text(name, value);
        }
    }

    pub(crate) fn number(&mut self, name: &str, value: f64) {
        self.push(name, BodyValue::Number(value));
    }

    pub(crate) fn flag(&mut self, name: &str, value: bool) {
        self.push(name, BodyValue::Flag(value));
    }

    /// Add an audio reference as either `url_field` or `file_field`, never both
    pub(crate) fn audio(&mut self, url_field: &str, file_field: &str, reference: AudioReference) {
        match reference {
            AudioReference::Url(url) => self.text(url_field, url),
            AudioReference::Binary(payload) => self.push(file_field, BodyValue::File(payload)),
        }
    }

    pub(crate) fn has_file(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, value)| matches!(value, BodyValue::File(_)))
    }

    /// Read one declared field from `params` and add it, honouring the
    /// omit-if-empty rule for optional fields
    pub(crate) fn field(&mut self, params: &Parameters, field: &BodyField) -> Result<()> {
        let name = field.name;

        match field.kind {
            ValueKind::Text => match field.presence {
                Presence::Required => self.text(name, params.required_text(name)?),
                Presence::Optional => self.optional_text(name, params.optional_text(name)),
                Presence::Default(default) => self.text(name, params.text_or(name, default)),
            },
            ValueKind::Number => {
                let value = match field.presence {
                    Presence::Required => Some(
                        params
                            .number(name)?
                            .ok_or_else(|| Error::MissingParameter(name.to_string()))?,
                    ),
                    Presence::Optional => params.number(name)?,
                    Presence::Default(default) => match params.number(name)? {
                        Some(value) => Some(value),
                        None => Some(default.parse::<f64>().map_err(|_| {
                            Error::Other(format!("invalid default '{default}' for '{name}'"))
                        })?),
                    },
                };

                if let Some(value) = value {
                    field.check_bounds(value)?;
                    self.number(name, value);
                }
            }
            ValueKind::Flag => self.flag(name, params.flag(name)),
            ValueKind::List => {
                let items = params.text_list(name);
                if items.is_empty() {
                    if matches!(field.presence, Presence::Required) {
                        return Err(Error::validation(name, "select at least one value"));
                    }
                } else {
                    // The API expects the list as a JSON-encoded string
                    self.text(name, serde_json::to_string(&items)?);
                }
            }
            ValueKind::Voice => {
                let voice = params
                    .optional_text(name)
                    .filter(|voice| voice != NO_VOICE);
                match (voice, field.presence) {
                    (Some(voice), _) => self.text(name, voice),
                    (None, Presence::Required) => {
                        return Err(Error::MissingParameter(name.to_string()));
                    }
                    (None, _) => {}
                }
            }
        }

        Ok(())
    }

    /// Encode the collected values
    pub(crate) fn into_request(
        self,
        verb: Verb,
        path: String,
        encoding: Encoding,
    ) -> Result<ApiRequest> {
        let request = ApiRequest {
            verb,
            path,
            query: Vec::new(),
            body: RequestBody::Empty,
        };

        match encoding {
            Encoding::Query => {
                let query = self.into_pairs(&request)?;
                Ok(ApiRequest { query, ..request })
            }
            Encoding::UrlEncoded => {
                let pairs = self.into_pairs(&request)?;
                Ok(request.with_body(RequestBody::UrlEncoded(pairs)))
            }
            Encoding::Body if self.has_file() => {
                let parts = self
                    .entries
                    .into_iter()
                    .map(|(name, value)| match value {
                        BodyValue::File(payload) => (name, FormValue::File(payload)),
                        other => (name, FormValue::Text(other.to_text().unwrap_or_default())),
                    })
                    .collect();
                Ok(request.with_body(RequestBody::Multipart(parts)))
            }
            Encoding::Body => {
                let map: Record = self
                    .entries
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect();
                Ok(request.with_body(RequestBody::Json(map)))
            }
        }
    }

    fn into_pairs(self, request: &ApiRequest) -> Result<Vec<(String, String)>> {
        self.entries
            .into_iter()
            .map(|(name, value)| match value.to_text() {
                Some(text) => Ok((name, text)),
                None => Err(Error::Other(format!(
                    "{} {} cannot carry file field '{}'",
                    request.verb, request.path, name
                ))),
            })
            .collect()
    }
}
