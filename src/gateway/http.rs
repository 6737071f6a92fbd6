//! HTTP adapter for the CRM REST API
//!
//! Blocking `ureq` agent with connect/read timeouts. The API wraps every
//! response in a `{success, data, error, duplicate}` envelope, including
//! non-2xx responses, so the error path also tries to parse one.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::core::{DuplicateRecord, Result, StoreError};
use crate::entities::EntityKind;

use super::Backend;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Uniform response envelope used by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    duplicate: Option<DuplicateRecord>,
}

pub struct HttpGateway {
    agent: ureq::Agent,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(REQUEST_TIMEOUT)
            .timeout_write(REQUEST_TIMEOUT)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}/{}", self.base_url, path);
        let mut req = self.agent.request(method, &url);
        if let Some(key) = &self.api_key {
            req = req.set("Authorization", &format!("Bearer {}", key));
        }
        req
    }

    /// Execute a request and unwrap the envelope into data or an error
    fn call(&self, req: ureq::Request, body: Option<Value>, id: Option<&str>) -> Result<Value> {
        let outcome = match body {
            Some(v) => req.send_json(v),
            None => req.call(),
        };

        match outcome {
            Ok(resp) => {
                let env: Envelope = resp
                    .into_json()
                    .map_err(|e| StoreError::Transport(format!("malformed envelope: {}", e)))?;
                if env.success {
                    Ok(env.data.unwrap_or(Value::Null))
                } else {
                    Err(envelope_error(200, env, id))
                }
            }
            Err(ureq::Error::Status(code, resp)) => match resp.into_json::<Envelope>() {
                Ok(env) => Err(envelope_error(code, env, id)),
                Err(_) => Err(StoreError::Transport(format!("http status {}", code))),
            },
            Err(ureq::Error::Transport(err)) => Err(StoreError::Transport(err.to_string())),
        }
    }

    fn expect_array(&self, data: Value) -> Result<Vec<Value>> {
        match data {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(StoreError::Transport(format!(
                "expected an array, got {}",
                type_name(&other)
            ))),
        }
    }
}

impl Backend for HttpGateway {
    fn list(&self, kind: EntityKind) -> Result<Vec<Value>> {
        let data = self.call(self.request("GET", kind.path()), None, None)?;
        self.expect_array(data)
    }

    fn get(&self, kind: EntityKind, id: &str) -> Result<Value> {
        self.call(
            self.request("GET", &format!("{}/{}", kind.path(), id)),
            None,
            Some(id),
        )
    }

    fn create(&self, kind: EntityKind, input: Value) -> Result<Value> {
        self.call(self.request("POST", kind.path()), Some(input), None)
    }

    fn update(&self, kind: EntityKind, id: &str, partial: Value) -> Result<Value> {
        self.call(
            self.request("PUT", &format!("{}/{}", kind.path(), id)),
            Some(partial),
            Some(id),
        )
    }

    fn delete(&self, kind: EntityKind, id: &str) -> Result<()> {
        self.call(
            self.request("DELETE", &format!("{}/{}", kind.path(), id)),
            None,
            Some(id),
        )?;
        Ok(())
    }

    fn contacts_by_company(&self, company_id: &str) -> Result<Vec<Value>> {
        let data = self.call(
            self.request("GET", &format!("contacts/company/{}", company_id)),
            None,
            Some(company_id),
        )?;
        self.expect_array(data)
    }

    fn import_batch(&self, kind: EntityKind, records: Vec<Value>) -> Result<Vec<Value>> {
        let data = self.call(
            self.request("POST", &format!("{}/import", kind.path())),
            Some(Value::Array(records)),
            None,
        )?;
        self.expect_array(data)
    }

    fn settings(&self) -> Result<Value> {
        self.call(self.request("GET", "settings"), None, None)
    }
}

/// Map a non-success envelope onto the error taxonomy
fn envelope_error(status: u16, env: Envelope, id: Option<&str>) -> StoreError {
    if let Some(existing) = env.duplicate {
        return StoreError::Duplicate { existing };
    }

    let message = env.error.unwrap_or_else(|| format!("http status {}", status));
    if status == 404 || message.to_lowercase().contains("not found") {
        return StoreError::NotFound {
            id: id.unwrap_or("<unknown>").to_string(),
        };
    }

    StoreError::Transport(message)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> Envelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn duplicate_envelope_maps_to_duplicate_error() {
        let env = envelope(
            r#"{"success":false,"error":"Company already exists in the system.",
                "duplicate":{"_id":"co9","name":"Acme","website":"https://acme.example.com"}}"#,
        );
        let err = envelope_error(200, env, None);
        match err {
            StoreError::Duplicate { existing } => {
                assert_eq!(existing.name.as_deref(), Some("Acme"));
                assert_eq!(existing.id.as_deref(), Some("co9"));
            }
            other => panic!("expected duplicate, got {:?}", other),
        }
    }

    #[test]
    fn not_found_envelope_maps_to_not_found() {
        let env = envelope(r#"{"success":false,"error":"Contact not found"}"#);
        let err = envelope_error(404, env, Some("ct1"));
        assert!(matches!(err, StoreError::NotFound { id } if id == "ct1"));
    }

    #[test]
    fn plain_failure_maps_to_transport() {
        let env = envelope(r#"{"success":false,"error":"database unavailable"}"#);
        let err = envelope_error(500, env, None);
        assert!(matches!(err, StoreError::Transport(msg) if msg == "database unavailable"));
    }
}
