//! Balance-related areas: pix keys, withdrawals, anticipations, the wallet
//! itself and billing.

use super::{first_id, skip_all};
use crate::client::Method;
use crate::runner::context::{unique_suffix, TestContext};
use crate::runner::events::LogLevel;
use crate::runner::invoke::value_id;
use serde_json::json;

/// Removes every existing key, then creates one and edits it. Running it
/// repeatedly leaves at most one key on the account.
pub async fn pix_keys(ctx: &mut TestContext) {
    ctx.header("Pix Keys (Client)");

    let list = ctx.get("pix-key", 42).await;
    let existing: Vec<String> = list
        .items_at("/data")
        .iter()
        .filter_map(|key| key.get("id").and_then(value_id))
        .collect();

    if !existing.is_empty() {
        ctx.log(
            LogLevel::Notice,
            format!("Found {} pix keys. Cleaning up...", existing.len()),
        );
        for id in &existing {
            ctx.invoke(&format!("pix-key/{}", id), Method::Delete, json!({}), None)
                .await;
        }
        ctx.log(LogLevel::Notice, "Old keys cleaned up.");
    }

    let key = json!({ "key": format!("t-{}@t.com", unique_suffix()), "type": "email" });
    let created = ctx.invoke("pix-key", Method::Post, key, Some(43)).await;

    let Some(id) = created.id_at("/data/id") else {
        ctx.skip_call(Method::Put, "pix-key/:id", 44, "pix key was not created");
        return;
    };
    ctx.state.pix_key_id = Some(id.clone());

    let edit = json!({ "description": format!("t-edit-{}", unique_suffix()) });
    ctx.invoke(&format!("pix-key/{}", id), Method::Put, edit, Some(44))
        .await;
}

pub async fn withdrawals(ctx: &mut TestContext) {
    ctx.header("Withdrawals");

    ctx.get("saques", 62).await;

    match ctx.state.pix_key_id.clone() {
        Some(pix_key_id) => {
            let request = json!({ "pixkeyid": pix_key_id, "requestedamount": 10000 });
            let created = ctx.invoke("withdrawals", Method::Post, request, Some(63)).await;
            match created.id_at("/id") {
                Some(id) => {
                    ctx.state.withdrawal_id = Some(id.clone());
                    ctx.invoke(
                        &format!("withdrawals/{}", id),
                        Method::Patch,
                        json!({ "status": "denied" }),
                        Some(64),
                    )
                    .await;
                }
                None => ctx.skip_call(
                    Method::Patch,
                    "withdrawals/:id",
                    64,
                    "withdrawal was not created",
                ),
            }
        }
        None => skip_all(
            ctx,
            &[
                (Method::Post, "withdrawals", 63),
                (Method::Patch, "withdrawals/:id", 64),
            ],
            "pix key id not found",
        ),
    }

    ctx.get("saques/aggregates", 65).await;
}

pub async fn anticipations(ctx: &mut TestContext) {
    ctx.header("Anticipations");

    ctx.get("antecipacoes/anticipations", 66).await;

    match ctx.state.user_id.clone() {
        Some(user_id) => {
            let created = ctx
                .invoke("antecipacoes/create", Method::Post, json!({ "userId": user_id }), Some(67))
                .await;
            if let Some(id) = created.id_at("/id") {
                ctx.state.anticipation_id = Some(id);
            }
        }
        None => ctx.skip_call(Method::Post, "antecipacoes/create", 67, "user id not found"),
    }

    let Some(id) = ctx.state.anticipation_id.clone() else {
        skip_all(
            ctx,
            &[
                (Method::Post, "antecipacoes/approve", 68),
                (Method::Patch, "antecipacoes/deny", 69),
            ],
            "anticipation id not found",
        );
        return;
    };

    ctx.invoke(
        "antecipacoes/approve",
        Method::Post,
        json!({ "anticipation_id": id, "approve": true }),
        Some(68),
    )
    .await;
    ctx.invoke(
        "antecipacoes/deny",
        Method::Patch,
        json!({ "anticipation_id": id, "motivo": "Teste Automatizado" }),
        Some(69),
    )
    .await;
}

pub async fn wallet(ctx: &mut TestContext) {
    ctx.header("Wallet");

    let user_id = ctx.state.user_id.clone();

    match &user_id {
        Some(user_id) => {
            ctx.invoke("antecipacoes/create", Method::Post, json!({ "userId": user_id }), Some(78))
                .await;
        }
        None => ctx.skip_call(Method::Post, "antecipacoes/create", 78, "user id not found"),
    }

    match ctx.state.company_id.clone() {
        Some(company_id) => {
            let balance = json!({ "companyId": company_id, "amount": 1 });
            ctx.invoke("wallet/remove-balance", Method::Post, balance.clone(), Some(79))
                .await;
            ctx.invoke("wallet/balance-management", Method::Post, balance, Some(80))
                .await;
        }
        None => skip_all(
            ctx,
            &[
                (Method::Post, "wallet/remove-balance", 79),
                (Method::Post, "wallet/balance-management", 80),
            ],
            "company id not found",
        ),
    }

    match &user_id {
        Some(user_id) => {
            ctx.get(&format!("wallet?userId={}", user_id), 81).await;
            ctx.get(&format!("extrato/{}", user_id), 82).await;
        }
        None => skip_all(
            ctx,
            &[
                (Method::Get, "wallet?userId=:id", 81),
                (Method::Get, "extrato/:id", 82),
            ],
            "user id not found",
        ),
    }
}

pub async fn billing(ctx: &mut TestContext) {
    ctx.header("Billing");

    let list = ctx.get("billings", 87).await;
    match first_id(&list, "/invoices") {
        Some(bill_id) => {
            ctx.invoke("billings/pay", Method::Patch, json!({ "bill_id": bill_id }), Some(88))
                .await;
        }
        None => ctx.skip_call(Method::Patch, "billings/pay", 88, "no open invoice"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::ScriptedGateway;
    use crate::client::RemoteError;
    use crate::runner::modules::test_support::authed_context;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    /// Gateway holding a real list of pix keys
    fn key_store(initial: Vec<u64>) -> (Arc<ScriptedGateway>, Arc<Mutex<Vec<u64>>>) {
        let keys = Arc::new(Mutex::new(initial));
        let shared = keys.clone();
        let next = Arc::new(Mutex::new(100u64));
        let gateway = ScriptedGateway::new(move |req| {
            let mut keys = shared.lock().unwrap();
            match (req.method, req.operation.as_str()) {
                (Method::Get, "pix-key") => {
                    let data: Vec<Value> = keys.iter().map(|id| json!({ "id": id })).collect();
                    Ok(json!({ "data": data }))
                }
                (Method::Post, "pix-key") => {
                    let mut next = next.lock().unwrap();
                    *next += 1;
                    keys.push(*next);
                    Ok(json!({ "data": { "id": *next } }))
                }
                (Method::Delete, op) => {
                    let id: u64 = op.trim_start_matches("pix-key/").parse().unwrap();
                    keys.retain(|k| *k != id);
                    Ok(json!({ "deleted": true }))
                }
                _ => Ok(json!({})),
            }
        });
        (Arc::new(gateway), keys)
    }

    #[tokio::test]
    async fn test_pix_keys_are_idempotent() {
        let (gateway, keys) = key_store(vec![1, 2, 3]);
        let (mut ctx, _rx) = authed_context(gateway.clone());

        pix_keys(&mut ctx).await;
        assert_eq!(keys.lock().unwrap().len(), 1);
        let first = ctx.state.pix_key_id.clone();

        pix_keys(&mut ctx).await;
        assert_eq!(keys.lock().unwrap().len(), 1);
        assert_ne!(ctx.state.pix_key_id, first);

        let summary = ctx.recorder.summary();
        // run 1: list + 3 deletes + create + edit; run 2: list + 1 delete + create + edit
        assert_eq!(summary.succeeded, 10);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_withdrawal_needs_pix_key() {
        let gateway = Arc::new(ScriptedGateway::accepting());
        let (mut ctx, _rx) = authed_context(gateway.clone());

        withdrawals(&mut ctx).await;

        assert_eq!(gateway.call_names(), vec!["GET saques", "GET saques/aggregates"]);
        assert_eq!(ctx.recorder.summary().skipped, 2);
    }

    #[tokio::test]
    async fn test_withdrawal_is_created_then_denied() {
        let gateway = Arc::new(ScriptedGateway::new(|req| {
            if req.operation == "withdrawals" {
                Ok(json!({ "id": 900 }))
            } else {
                Ok(json!({}))
            }
        }));
        let (mut ctx, _rx) = authed_context(gateway.clone());
        ctx.state.pix_key_id = Some("pk-1".to_string());

        withdrawals(&mut ctx).await;

        assert_eq!(ctx.state.withdrawal_id.as_deref(), Some("900"));
        let calls = gateway.calls();
        assert_eq!(calls[1].2, Some(json!({ "pixkeyid": "pk-1", "requestedamount": 10000 })));
        assert_eq!(calls[2].1, "withdrawals/900");
        assert_eq!(calls[2].2, Some(json!({ "status": "denied" })));
    }

    #[tokio::test]
    async fn test_anticipation_review_skipped_when_create_fails() {
        let gateway = Arc::new(ScriptedGateway::new(|req| {
            if req.operation == "antecipacoes/create" {
                Err(RemoteError::Http {
                    status: 400,
                    message: "no receivables".to_string(),
                })
            } else {
                Ok(json!([]))
            }
        }));
        let (mut ctx, _rx) = authed_context(gateway.clone());

        anticipations(&mut ctx).await;

        let summary = ctx.recorder.summary();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 2);
    }

    #[tokio::test]
    async fn test_wallet_without_company() {
        let gateway = Arc::new(ScriptedGateway::accepting());
        let (mut ctx, _rx) = authed_context(gateway.clone());

        wallet(&mut ctx).await;

        assert_eq!(
            gateway.call_names(),
            vec![
                "POST antecipacoes/create",
                "GET wallet?userId=user-1",
                "GET extrato/user-1",
            ]
        );
        assert_eq!(ctx.recorder.summary().skipped, 2);
    }

    #[tokio::test]
    async fn test_billing_pays_first_invoice() {
        let gateway = Arc::new(ScriptedGateway::new(|req| {
            if req.operation == "billings" {
                Ok(json!({ "invoices": [{ "id": "inv-1" }, { "id": "inv-2" }] }))
            } else {
                Ok(json!({}))
            }
        }));
        let (mut ctx, _rx) = authed_context(gateway.clone());

        billing(&mut ctx).await;

        assert_eq!(gateway.calls()[1].2, Some(json!({ "bill_id": "inv-1" })));
    }
}
