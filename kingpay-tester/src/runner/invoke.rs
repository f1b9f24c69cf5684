//! Invocation wrapper: one authenticated edge function call, timed,
//! classified and handed to the recorder. Nothing raised here ever leaves
//! this boundary; failures come back as data.

use super::recorder::{Detail, Recorder};
use super::state::TestState;
use crate::client::{FunctionGateway, InvokeRequest, Method, RemoteError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Result of one remote call
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub result: Result<Value, String>,
    pub status: Option<u16>,
    pub duration_ms: u64,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn data(&self) -> Option<&Value> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }

    /// Field of a successful payload, addressed by JSON pointer
    pub fn at(&self, pointer: &str) -> Option<&Value> {
        self.data().and_then(|data| data.pointer(pointer))
    }

    /// Identifier at `pointer`, accepted as a non-empty string or a number
    pub fn id_at(&self, pointer: &str) -> Option<String> {
        self.at(pointer).and_then(value_id)
    }

    /// Array at `pointer`; missing or non-array fields read as empty
    pub fn items_at(&self, pointer: &str) -> &[Value] {
        self.at(pointer)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Identifier carried by a JSON value
pub fn value_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Name printed for an edge function call
pub fn display_name(method: Method, operation: &str) -> String {
    format!("{} /functions/v1/{}", method, operation)
}

/// Performs edge function calls on behalf of the modules
#[derive(Clone)]
pub struct Invoker {
    gateway: Arc<dyn FunctionGateway>,
}

impl Invoker {
    pub fn new(gateway: Arc<dyn FunctionGateway>) -> Self {
        Self { gateway }
    }

    /// Call under the session stored in `state`
    pub async fn call(
        &self,
        state: &TestState,
        recorder: &mut Recorder,
        operation: &str,
        method: Method,
        body: Option<Value>,
        tag: Option<u16>,
    ) -> Outcome {
        match &state.session {
            Some(session) => {
                self.call_with_bearer(&session.access_token, recorder, operation, method, body, tag)
                    .await
            }
            None => {
                let name = display_name(method, operation);
                let error = RemoteError::NotAuthenticated.to_string();
                recorder.record(&name, false, 0, Detail::Error(&error), tag);
                Outcome {
                    result: Err(error),
                    status: None,
                    duration_ms: 0,
                }
            }
        }
    }

    /// Call under an explicit bearer credential
    pub async fn call_with_bearer(
        &self,
        bearer: &str,
        recorder: &mut Recorder,
        operation: &str,
        method: Method,
        body: Option<Value>,
        tag: Option<u16>,
    ) -> Outcome {
        let name = display_name(method, operation);
        let started = Instant::now();

        let request = InvokeRequest {
            operation: operation.to_string(),
            method,
            body: body.filter(|b| !is_empty_body(b)),
            bearer: bearer.to_string(),
        };
        let result = self.gateway.invoke(request).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(data) => {
                recorder.record(&name, true, duration_ms, Detail::Payload(Some(&data)), tag);
                Outcome {
                    result: Ok(data),
                    status: None,
                    duration_ms,
                }
            }
            Err(e) => {
                let message = e.to_string();
                recorder.record(&name, false, duration_ms, Detail::Error(&message), tag);
                Outcome {
                    result: Err(message),
                    status: e.status(),
                    duration_ms,
                }
            }
        }
    }
}

fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
