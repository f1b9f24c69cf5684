use crate::runner::context::{unique_suffix, TestContext};
use crate::runner::events::TestEvent;
use crate::runner::recorder::Detail;
use std::time::Instant;

const LOGIN: &str = "POST /auth/v1/token (login)";
const SIGNUP: &str = "POST /auth/v1/signup (create account)";

/// Sign in with the test account (#1) and exercise self-registration (#2).
///
/// Returns `false` when no session could be obtained; the runner treats that
/// as fatal and the failed login is shown but not counted. Sign-up problems
/// never fail the run, they become a skip.
pub async fn authenticate(ctx: &mut TestContext) -> bool {
    ctx.header("Auth");

    let (email, password) = match (ctx.settings.email.clone(), ctx.settings.password.clone()) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            gate_failed(ctx, 0, "TEST_REAL_EMAIL / TEST_REAL_PASSWORD not configured");
            return false;
        }
    };

    let auth = ctx.auth();
    let started = Instant::now();
    let result = auth.sign_in_with_password(&email, &password).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(session) => {
            let summary = serde_json::json!({ "userId": session.user_id });
            ctx.recorder
                .record(LOGIN, true, duration_ms, Detail::Payload(Some(&summary)), Some(1));
            ctx.state.user_id = Some(session.user_id.clone());
            ctx.state.session = Some(session);
        }
        Err(e) => {
            gate_failed(ctx, duration_ms, &e.to_string());
            return false;
        }
    }

    let signup_email = format!("teste.{}@example.com", unique_suffix());
    let started = Instant::now();
    match auth.sign_up(&signup_email, "a_strong_password").await {
        Ok(()) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            ctx.recorder
                .record(SIGNUP, true, duration_ms, Detail::Payload(None), Some(2));
        }
        Err(e) => {
            let reason = format!("sign-up is not essential to the suite ({})", e);
            ctx.skip(SIGNUP, Some(2), &reason);
        }
    }

    true
}

// Shown on the console only; an aborted run keeps all counts at zero
fn gate_failed(ctx: &TestContext, duration_ms: u64, error: &str) {
    ctx.recorder.emitter().emit(TestEvent::OperationFailed {
        tag: Some(1),
        name: LOGIN.to_string(),
        duration_ms,
        error: error.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{ScriptedAuth, ScriptedGateway};
    use crate::client::RemoteError;
    use crate::runner::modules::test_support::context_with;

    #[tokio::test]
    async fn test_successful_login_seeds_session() {
        let (mut ctx, _rx) = context_with(ScriptedAuth::accepting(), ScriptedGateway::accepting());

        assert!(authenticate(&mut ctx).await);
        assert!(ctx.state.session.is_some());
        assert_eq!(ctx.state.user_id.as_deref(), Some("user-1"));
        assert_eq!(ctx.recorder.summary().succeeded, 2);
    }

    #[tokio::test]
    async fn test_rejected_login_is_shown_but_not_counted() {
        let (mut ctx, mut rx) =
            context_with(ScriptedAuth::rejecting(), ScriptedGateway::accepting());

        assert!(!authenticate(&mut ctx).await);
        assert!(ctx.state.session.is_none());
        assert_eq!(ctx.recorder.summary().total(), 0);
        assert!(ctx.recorder.modules().iter().all(|m| m.operations.is_empty()));

        let mut failed_login = false;
        while let Ok(event) = rx.try_recv() {
            if let TestEvent::OperationFailed { tag, name, .. } = event {
                failed_login |= tag == Some(1) && name == LOGIN;
            }
        }
        assert!(failed_login);
    }

    #[tokio::test]
    async fn test_sign_up_error_is_absorbed_as_skip() {
        let mut auth = ScriptedAuth::accepting();
        auth.sign_up_error = Some(RemoteError::Transport("connection reset".to_string()));
        let (mut ctx, _rx) = context_with(auth, ScriptedGateway::accepting());

        assert!(authenticate(&mut ctx).await);
        let summary = ctx.recorder.summary();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_the_gate() {
        let (mut ctx, _rx) = context_with(ScriptedAuth::accepting(), ScriptedGateway::accepting());
        ctx.settings.password = None;

        assert!(!authenticate(&mut ctx).await);
        assert!(ctx.state.session.is_none());
        assert_eq!(ctx.recorder.summary().total(), 0);
    }
}
