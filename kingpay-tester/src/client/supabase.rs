//! Supabase HTTP client
//!
//! Speaks the two Supabase surfaces the runner needs: GoTrue password auth
//! (`/auth/v1/*`) and edge functions (`/functions/v1/*`). Every request carries
//! the anonymous `apikey` header and is bounded by the configured timeout.

use super::{AuthProvider, AuthSession, FunctionGateway, InvokeRequest, Method, RemoteError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Supabase project client
pub struct SupabaseClient {
    /// Project base URL (e.g., "https://xyz.supabase.co")
    base_url: String,
    /// Anonymous key
    anon_key: String,
    /// HTTP client
    client: reqwest::Client,
    /// Upper bound for one request/response exchange
    timeout: Duration,
}

/// GoTrue token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: Option<TokenUser>,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            client,
            timeout,
        })
    }

    fn function_url(&self, operation: &str) -> String {
        format!(
            "{}/functions/v1/{}",
            self.base_url,
            operation.trim_start_matches('/')
        )
    }

    /// Send a request and decode the body, bounded by the client timeout
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, RemoteError> {
        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| RemoteError::Transport(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| RemoteError::Transport(e.to_string()))?;

            if !status.is_success() {
                return Err(RemoteError::Http {
                    status: status.as_u16(),
                    message: error_message(&text)
                        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
                });
            }

            Ok(decode_body(&text))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, RemoteError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        log::debug!("POST {}", url);

        let body = serde_json::json!({ "email": email, "password": password });
        let request = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body);

        let value = self.execute(request).await?;
        let token: TokenResponse = serde_json::from_value(value)
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        match (token.access_token, token.user) {
            (Some(access_token), Some(user)) => Ok(AuthSession {
                access_token,
                user_id: user.id,
            }),
            _ => Err(RemoteError::InvalidResponse(
                "session not returned".to_string(),
            )),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), RemoteError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        log::debug!("POST {}", url);

        let body = serde_json::json!({ "email": email, "password": password });
        let request = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body);

        self.execute(request).await.map(|_| ())
    }
}

#[async_trait]
impl FunctionGateway for SupabaseClient {
    async fn invoke(&self, request: InvokeRequest) -> Result<Value, RemoteError> {
        let url = self.function_url(&request.operation);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&request.bearer);
        if let Some(body) = &request.body {
            log::trace!("payload for {}: {}", url, body);
            builder = builder.json(body);
        }

        let started = Instant::now();
        let result = self.execute(builder).await;
        let elapsed = started.elapsed().as_millis();

        match &result {
            Ok(_) => log::debug!("{} {} -> ok ({}ms)", request.method, url, elapsed),
            Err(e) => log::debug!("{} {} -> {} ({}ms)", request.method, url, e, elapsed),
        }

        result
    }
}

/// JSON when possible, raw text otherwise, `Null` for empty bodies
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Pull a readable message out of an error body
fn error_message(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        for key in ["error_description", "message", "msg", "error"] {
            match value.get(key) {
                Some(Value::String(s)) => return Some(s.clone()),
                Some(Value::Object(inner)) => {
                    if let Some(Value::String(s)) = inner.get("message") {
                        return Some(s.clone());
                    }
                }
                _ => {}
            }
        }
        return Some(value.to_string());
    }

    Some(trimmed.to_string())
}
