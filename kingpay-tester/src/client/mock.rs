//! Scripted collaborators for unit tests.

use super::{AuthProvider, AuthSession, FunctionGateway, InvokeRequest, Method, RemoteError};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

type Handler = Box<dyn Fn(&InvokeRequest) -> Result<Value, RemoteError> + Send + Sync>;

/// Gateway answering every call through a closure and keeping a call log
pub struct ScriptedGateway {
    handler: Handler,
    calls: Mutex<Vec<(Method, String, Option<Value>)>>,
}

impl ScriptedGateway {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&InvokeRequest) -> Result<Value, RemoteError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds with an empty object
    pub fn accepting() -> Self {
        Self::new(|_| Ok(serde_json::json!({})))
    }

    pub fn calls(&self) -> Vec<(Method, String, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    /// "METHOD operation" for each call, in order
    pub fn call_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|(method, op, _)| format!("{} {}", method, op))
            .collect()
    }
}

#[async_trait]
impl FunctionGateway for ScriptedGateway {
    async fn invoke(&self, request: InvokeRequest) -> Result<Value, RemoteError> {
        self.calls.lock().unwrap().push((
            request.method,
            request.operation.clone(),
            request.body.clone(),
        ));
        (self.handler)(&request)
    }
}

/// Auth double with a fixed sign-in answer
pub struct ScriptedAuth {
    pub session: Option<AuthSession>,
    pub sign_up_error: Option<RemoteError>,
}

impl ScriptedAuth {
    pub fn accepting() -> Self {
        Self {
            session: Some(AuthSession {
                access_token: "token".to_string(),
                user_id: "user-1".to_string(),
            }),
            sign_up_error: None,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            session: None,
            sign_up_error: None,
        }
    }
}

#[async_trait]
impl AuthProvider for ScriptedAuth {
    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<AuthSession, RemoteError> {
        self.session.clone().ok_or(RemoteError::Http {
            status: 400,
            message: "Invalid login credentials".to_string(),
        })
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<(), RemoteError> {
        match &self.sign_up_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}
