//! Account-facing support areas: security codes, tickets, audit log,
//! alerts and webhooks.

use super::skip_all;
use crate::client::Method;
use crate::runner::context::{unique_suffix, TestContext};
use serde_json::json;

pub async fn security_codes(ctx: &mut TestContext) {
    ctx.header("Security Codes");

    let generated = ctx
        .invoke("validation-codes/generate", Method::Post, json!({}), Some(3))
        .await;
    // Expected to be rejected by the backend
    ctx.invoke("validation-codes/validate", Method::Post, json!({ "code": "XXXXXX" }), Some(4))
        .await;

    match generated.at("/code").filter(|code| !code.is_null()).cloned() {
        Some(code) => {
            ctx.invoke("validation-codes/validate", Method::Post, json!({ "code": code }), Some(4))
                .await;
        }
        None => ctx.skip_call(
            Method::Post,
            "validation-codes/validate",
            4,
            "no generated code to validate",
        ),
    }
}

pub async fn tickets(ctx: &mut TestContext) {
    ctx.header("Tickets");

    let create = json!({
        "action": "create_ticket",
        "payload": {
            "subject": format!("Teste {}", chrono::Utc::now().to_rfc3339()),
            "message": "Teste"
        }
    });
    let created = ctx.invoke("support-tickets", Method::Post, create, Some(5)).await;
    if let Some(id) = created.id_at("/ticket/id") {
        ctx.state.ticket_id = Some(id);
    }

    ctx.invoke(
        "support-tickets",
        Method::Post,
        json!({ "action": "list_tickets", "payload": {} }),
        Some(5),
    )
    .await;

    let Some(ticket_id) = ctx.state.ticket_id.clone() else {
        skip_all(
            ctx,
            &[
                (Method::Post, "support-tickets (send_message)", 5),
                (Method::Post, "support-tickets (list_messages)", 5),
            ],
            "ticket id not found",
        );
        return;
    };

    let message = json!({
        "action": "send_message",
        "payload": { "ticket_id": ticket_id, "message": "Nova mensagem" }
    });
    ctx.invoke("support-tickets", Method::Post, message, Some(5)).await;
    let list = json!({ "action": "list_messages", "payload": { "ticket_id": ticket_id } });
    ctx.invoke("support-tickets", Method::Post, list, Some(5)).await;
}

pub async fn audit_logs(ctx: &mut TestContext) {
    ctx.header("Audit Logs");
    ctx.get("audit-log", 16).await;
}

pub async fn alerts(ctx: &mut TestContext) {
    ctx.header("Alerts");

    let alert = json!({
        "title": "Alerta de Teste",
        "body": "Corpo do alerta de teste.",
        "checkout": false
    });
    let created = ctx.invoke("alerts", Method::Post, alert, Some(46)).await;
    ctx.get("alerts", 45).await;

    let Some(id) = created.id_at("/alert/id") else {
        skip_all(
            ctx,
            &[
                (Method::Post, "alerts/mark-viewed", 47),
                (Method::Delete, "alerts/:id", 48),
            ],
            "alert id not found",
        );
        return;
    };
    ctx.state.alert_id = Some(id.clone());

    ctx.invoke("alerts/mark-viewed", Method::Post, json!({ "alertId": id }), Some(47))
        .await;
    ctx.invoke(&format!("alerts/{}", id), Method::Delete, json!({}), Some(48))
        .await;
}

pub async fn webhooks(ctx: &mut TestContext) {
    ctx.header("Webhooks");

    let hook = json!({
        "url": format!("https://t.com/h/{}", unique_suffix()),
        "event": "t.paid"
    });
    let created = ctx.invoke("webhook", Method::Post, hook, Some(84)).await;
    ctx.get("webhook", 83).await;

    let Some(id) = created.id_at("/id") else {
        skip_all(
            ctx,
            &[
                (Method::Put, "webhook/:id", 85),
                (Method::Delete, "webhook/:id", 86),
            ],
            "webhook id not found",
        );
        return;
    };
    ctx.state.webhook_id = Some(id.clone());

    let update = json!({ "url": format!("https://t.com/h/edit/{}", unique_suffix()) });
    ctx.invoke(&format!("webhook/{}", id), Method::Put, update, Some(85))
        .await;
    ctx.invoke(&format!("webhook/{}", id), Method::Delete, json!({}), Some(86))
        .await;
}
