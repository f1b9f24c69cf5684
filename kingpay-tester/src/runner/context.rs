use super::events::{EventEmitter, LogLevel};
use super::invoke::{display_name, Invoker, Outcome};
use super::recorder::Recorder;
use super::state::TestState;
use crate::client::{AuthProvider, FunctionGateway, Method};
use serde_json::Value;
use std::sync::Arc;

/// Account and provider settings the modules read
#[derive(Debug, Clone, Default)]
pub struct SuiteSettings {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Sub-account provider token
    pub provider_token: Option<String>,
}

/// Test execution context passed to every module.
///
/// Owns the state store and the recorder for the whole run; modules borrow it
/// mutably one at a time.
pub struct TestContext {
    pub state: TestState,
    pub recorder: Recorder,
    pub settings: SuiteSettings,
    invoker: Invoker,
    auth: Arc<dyn AuthProvider>,
}

impl TestContext {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        gateway: Arc<dyn FunctionGateway>,
        settings: SuiteSettings,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            state: TestState::new(),
            recorder: Recorder::new(emitter),
            settings,
            invoker: Invoker::new(gateway),
            auth,
        }
    }

    pub fn auth(&self) -> Arc<dyn AuthProvider> {
        self.auth.clone()
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Print a module header
    pub fn header(&mut self, title: &str) {
        self.recorder.begin_module(title);
    }

    /// Authenticated call; `Value::Null` or `{}` means "no body"
    pub async fn invoke(
        &mut self,
        operation: &str,
        method: Method,
        body: Value,
        tag: Option<u16>,
    ) -> Outcome {
        self.invoker
            .call(
                &self.state,
                &mut self.recorder,
                operation,
                method,
                Some(body),
                tag,
            )
            .await
    }

    /// Authenticated GET without a body
    pub async fn get(&mut self, operation: &str, tag: u16) -> Outcome {
        self.invoke(operation, Method::Get, Value::Null, Some(tag))
            .await
    }

    /// Call under an explicit bearer instead of the session
    pub async fn invoke_as(
        &mut self,
        bearer: &str,
        operation: &str,
        method: Method,
        tag: Option<u16>,
    ) -> Outcome {
        self.invoker
            .call_with_bearer(bearer, &mut self.recorder, operation, method, None, tag)
            .await
    }

    pub fn skip(&mut self, name: &str, tag: Option<u16>, reason: &str) {
        self.recorder.skip(name, tag, Some(reason));
    }

    /// Skip an edge function call named the way `invoke` would name it
    pub fn skip_call(&mut self, method: Method, operation: &str, tag: u16, reason: &str) {
        self.skip(&display_name(method, operation), Some(tag), reason);
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.recorder.emitter().log(level, message);
    }
}

/// Millisecond timestamp used to make created entities unique
pub fn unique_suffix() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
