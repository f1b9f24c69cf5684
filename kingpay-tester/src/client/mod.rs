//! Collaborator seams towards the remote backend.
//!
//! The runner only needs two capabilities: obtain a session for the test
//! account, and invoke a named edge function with a payload. Both are traits
//! so the suite can run against the real Supabase project or a scripted double.

pub mod overview;
pub mod supabase;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use supabase::SupabaseClient;

/// HTTP verb used for an edge function call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated session for the test account
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub user_id: String,
}

/// One edge function call
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    /// Function path relative to `/functions/v1/`, may carry sub-paths and a query
    pub operation: String,
    pub method: Method,
    pub body: Option<Value>,
    pub bearer: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RemoteError {
    #[error("user not authenticated")]
    NotAuthenticated,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// HTTP status carried by the error, when the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Password grant for an existing account
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, RemoteError>;

    /// Self-registration of a new account
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), RemoteError>;
}

#[async_trait]
pub trait FunctionGateway: Send + Sync {
    /// Invoke a named edge function and return its decoded payload.
    /// Non-JSON bodies come back as `Value::String`.
    async fn invoke(&self, request: InvokeRequest) -> Result<Value, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_error_status() {
        let err = RemoteError::Http {
            status: 422,
            message: "card declined".to_string(),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "HTTP 422: card declined");
        assert_eq!(RemoteError::NotAuthenticated.status(), None);
    }
}
