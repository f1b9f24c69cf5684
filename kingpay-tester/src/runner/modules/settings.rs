use super::first_id;
use crate::client::Method;
use crate::runner::context::{unique_suffix, TestContext};
use crate::runner::events::LogLevel;
use serde_json::json;

/// Terms, platform configuration and whitelabel personalization.
///
/// The current personalization is snapshotted before anything is written so
/// `restore_personalization` can put it back at the end of the run.
pub async fn settings(ctx: &mut TestContext) {
    ctx.header("Settings & Personalization");

    let current = ctx.get("personalization", 25).await;
    if let Some(snapshot) = current.data().filter(|data| !data.is_null()) {
        ctx.state.original_personalization = Some(snapshot.clone());
        ctx.log(
            LogLevel::Notice,
            "Original personalization saved for later restore.",
        );
    }

    ctx.get("configuracoes/termos", 21).await;
    ctx.invoke(
        "configuracoes/termos",
        Method::Put,
        json!({ "termos": "Este é o novo texto dos Termos de Uso." }),
        Some(22),
    )
    .await;
    ctx.invoke(
        "configuracoes",
        Method::Put,
        json!({ "descontarChargebackSaldoDisponivel": true, "aprovar_chave_pix": false }),
        Some(23),
    )
    .await;
    // Only the gateway name changes; colors stay untouched
    ctx.invoke(
        "personalization",
        Method::Put,
        json!({ "gateway_name": "KingPay Test Runner" }),
        Some(24),
    )
    .await;
    ctx.get("config-companie-view", 26).await;
}

pub async fn pixel_tracker(ctx: &mut TestContext) {
    ctx.header("Pixel Tracker");

    let pixel = json!({
        "name": "Teste UtmFy",
        "platform": "utmify",
        "pixel_id": format!("pixel-{}", unique_suffix()),
        "api_key": "uma-chave-api-de-teste",
        "configuration": { "trigger_on_payment": true, "trigger_on_creation": false },
        "status": true
    });
    let created = ctx.invoke("pixelTracker", Method::Post, pixel, Some(28)).await;
    let list = ctx.get("pixelTracker", 27).await;

    let Some(id) = created
        .id_at("/pixel/id")
        .or_else(|| first_id(&list, "/pixels"))
    else {
        ctx.skip_call(Method::Patch, "pixelTracker/:id", 29, "no tracker to update");
        return;
    };
    ctx.state.tracker_id = Some(id.clone());

    ctx.invoke(
        &format!("pixelTracker/{}", id),
        Method::Patch,
        json!({ "name": "Teste UtmFy Editado" }),
        Some(29),
    )
    .await;
}

/// Write the saved personalization back. Untagged; a failure is reported
/// but never aborts the run.
pub async fn restore_personalization(ctx: &mut TestContext) -> bool {
    let Some(original) = ctx.state.original_personalization.clone() else {
        ctx.log(
            LogLevel::Warn,
            "No original personalization was saved; nothing to restore.",
        );
        return false;
    };

    ctx.header("Restoring Original Personalization");
    let restored = ctx
        .invoke("personalization", Method::Put, original, None)
        .await;
    if restored.is_success() {
        ctx.log(LogLevel::Success, "Original personalization restored.");
    } else {
        ctx.log(LogLevel::Error, "Failed to restore the original personalization.");
    }
    restored.is_success()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::ScriptedGateway;
    use crate::client::RemoteError;
    use crate::runner::modules::test_support::authed_context;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    /// Gateway keeping a single personalization document
    fn personalization_store(initial: Value) -> (Arc<ScriptedGateway>, Arc<Mutex<Value>>) {
        let store = Arc::new(Mutex::new(initial));
        let shared = store.clone();
        let gateway = ScriptedGateway::new(move |req| {
            if req.operation != "personalization" {
                return Ok(json!({}));
            }
            let mut doc = shared.lock().unwrap();
            match req.method {
                Method::Get => Ok(doc.clone()),
                Method::Put => {
                    let body = req.body.clone().unwrap_or(Value::Null);
                    // Partial update: merge the given fields
                    if let (Some(target), Some(fields)) = (doc.as_object_mut(), body.as_object()) {
                        for (k, v) in fields {
                            target.insert(k.clone(), v.clone());
                        }
                    }
                    Ok(doc.clone())
                }
                _ => Err(RemoteError::Http {
                    status: 405,
                    message: "method not allowed".to_string(),
                }),
            }
        });
        (Arc::new(gateway), store)
    }

    #[tokio::test]
    async fn test_personalization_round_trip() {
        let original = json!({ "gateway_name": "KingPay", "primary_color": "#0a0" });
        let (gateway, store) = personalization_store(original.clone());
        let (mut ctx, _rx) = authed_context(gateway.clone());

        settings(&mut ctx).await;
        assert_eq!(store.lock().unwrap()["gateway_name"], "KingPay Test Runner");

        assert!(restore_personalization(&mut ctx).await);
        assert_eq!(*store.lock().unwrap(), original);

        let record = ctx.recorder.modules().last().unwrap().operations[0].clone();
        assert_eq!(record.tag, None);
        assert_eq!(record.name, "PUT /functions/v1/personalization");
    }

    #[tokio::test]
    async fn test_restore_without_snapshot_is_a_no_op() {
        let gateway = Arc::new(ScriptedGateway::accepting());
        let (mut ctx, _rx) = authed_context(gateway.clone());

        assert!(!restore_personalization(&mut ctx).await);
        assert!(gateway.calls().is_empty());
        assert_eq!(ctx.recorder.summary().total(), 0);
    }

    #[tokio::test]
    async fn test_tracker_falls_back_to_listed_pixel() {
        let gateway = Arc::new(ScriptedGateway::new(|req| match req.method {
            Method::Post => Ok(json!({ "error": "duplicated" })),
            Method::Get => Ok(json!({ "pixels": [{ "id": "px-1" }, { "id": "px-2" }] })),
            _ => Ok(json!({})),
        }));
        let (mut ctx, _rx) = authed_context(gateway.clone());

        pixel_tracker(&mut ctx).await;

        assert_eq!(ctx.state.tracker_id.as_deref(), Some("px-1"));
        assert_eq!(gateway.call_names()[2], "PATCH pixelTracker/px-1");
    }

    #[tokio::test]
    async fn test_tracker_update_skipped_without_any_pixel() {
        let gateway = Arc::new(ScriptedGateway::accepting());
        let (mut ctx, _rx) = authed_context(gateway.clone());

        pixel_tracker(&mut ctx).await;

        assert_eq!(gateway.calls().len(), 2);
        assert_eq!(ctx.recorder.summary().skipped, 1);
    }
}
