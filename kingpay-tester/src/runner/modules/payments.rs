//! Money-moving areas: transactions, sub-accounts, risk, clients and
//! payment links.

use super::{first_id, skip_all};
use crate::client::Method;
use crate::runner::context::{unique_suffix, TestContext};
use crate::runner::events::LogLevel;
use crate::runner::invoke::value_id;
use serde_json::{json, Value};

/// Card number the processor must refuse
pub const INVALID_CARD_NUMBER: &str = "4111111111111112";

const POSTBACK_URL: &str = "https://webhook.site/kingpay-test";

fn pix_payment() -> Value {
    json!({
        "customer": {
            "name": "Cliente Teste PIX",
            "email": "t.pix@t.com",
            "document": { "number": "11122233344", "type": "CPF" },
            "phone": "11999998888"
        },
        "shipping": {
            "address": {
                "street": "Rua Teste",
                "streetNumber": "123",
                "zipCode": "01001000",
                "city": "São Paulo",
                "state": "SP",
                "country": "BR"
            }
        },
        "paymentMethod": "PIX",
        "items": [{ "title": "Produto Teste PIX", "unitPrice": 15000, "quantity": 1, "externalRef": "SKU-PIX-001" }],
        "amount": 15000,
        "postbackUrl": POSTBACK_URL
    })
}

fn card_payment(card_number: &str) -> Value {
    json!({
        "customer": {
            "name": "Cliente Teste Cartão",
            "email": "t.card@t.com",
            "document": { "number": "22233344455", "type": "CPF" },
            "phone": "11988887777"
        },
        "paymentMethod": "CARD",
        "items": [{ "title": "Produto Teste Cartão", "unitPrice": 25000, "quantity": 1, "externalRef": "SKU-CARD-001" }],
        "amount": 25000,
        "card": {
            "holderName": "JOAO DA SILVA",
            "number": card_number,
            "expirationDate": "12/2030",
            "securityCode": "123"
        },
        "installments": 1,
        "postbackUrl": POSTBACK_URL
    })
}

/// PIX charge, a valid card charge and a card charge that must be refused.
/// All three go through the normal recording path; the refused card shows
/// up as a failure.
pub async fn transactions(ctx: &mut TestContext) {
    ctx.header("Transactions");

    ctx.invoke("transactions", Method::Post, pix_payment(), Some(6)).await;
    ctx.invoke("transactions", Method::Post, card_payment("4111111111111111"), Some(6))
        .await;
    ctx.invoke("transactions", Method::Post, card_payment(INVALID_CARD_NUMBER), Some(6))
        .await;

    match ctx.state.api_secret_key.clone() {
        Some(secret) => {
            ctx.invoke_as(&secret, "credentials", Method::Get, Some(7)).await;
        }
        None => ctx.skip_call(Method::Get, "credentials", 7, "api secret key not found"),
    }

    ctx.skip_call(
        Method::Post,
        "webhookfx",
        8,
        "endpoint is meant to be called by external servers",
    );
}

/// Provider-backed sub-account creation and KYC. Needs both the provider
/// token and a company.
pub async fn sub_accounts(ctx: &mut TestContext) {
    ctx.header("Sub-accounts");

    let (Some(token), Some(company_id)) = (
        ctx.settings.provider_token.clone(),
        ctx.state.company_id.clone(),
    ) else {
        let reason = "IUGU_API_TOKEN or company id not configured";
        ctx.skip("POST /proxy (create provider account)", Some(9), reason);
        ctx.skip("POST /request_verification (provider KYC)", Some(10), reason);
        ctx.skip("POST /v1/web_hooks (provider webhooks)", Some(11), reason);
        skip_all(
            ctx,
            &[
                (Method::Post, "subconta", 12),
                (Method::Put, "subconta/resend_documents", 13),
                (Method::Post, "subconta/checkstatus", 14),
                (Method::Post, "subconta/check_kyc", 15),
            ],
            reason,
        );
        return;
    };

    let proxy = json!({
        "apiToken": token,
        "endpoint": "/v1/marketplace/create_account",
        "payload": { "name": format!("Subconta Proxy {}", unique_suffix()) }
    });
    let created = ctx.invoke("proxy", Method::Post, proxy, Some(9)).await;

    match created.id_at("/account_id") {
        Some(account_id) => {
            ctx.log(
                LogLevel::Info,
                format!("Provider sub-account created with ID: {}", account_id),
            );
            ctx.state.provider_account_id = Some(account_id.clone());
            let kyc = json!({
                "apiToken": token,
                "endpoint": format!("/v1/marketplace/{}/request_verification", account_id),
                "payload": {
                    "data": {
                        "price_range": "Até R$1.000,00",
                        "physical_products": "false",
                        "business_type": "Software",
                        "person_type": "Pessoa Jurídica",
                        "automatic_transfer": "true"
                    }
                }
            });
            ctx.invoke("request_verification", Method::Post, kyc, Some(10))
                .await;
        }
        None => ctx.skip_call(
            Method::Post,
            "request_verification",
            10,
            "provider account id not returned",
        ),
    }

    ctx.skip("POST /v1/web_hooks (provider webhooks)", Some(11), "complex test payload");

    let sub_account = json!({
        "companyId": company_id,
        "subconta_nome": "Subconta Teste Automatizado",
        "banco": "001",
        "agencia": "1234",
        "conta": "56789-0",
        "tipo_conta": "Corrente",
        "adquirente_nome": "IUGU_SUBCONTA"
    });
    let created = ctx.invoke("subconta", Method::Post, sub_account, Some(12)).await;

    let Some(sub_account_id) = created.id_at("/sub_account_id") else {
        skip_all(
            ctx,
            &[
                (Method::Put, "subconta/resend_documents", 13),
                (Method::Post, "subconta/checkstatus", 14),
                (Method::Post, "subconta/check_kyc", 15),
            ],
            "internal sub-account was not created",
        );
        return;
    };
    ctx.log(
        LogLevel::Info,
        format!("Internal sub-account created with ID: {}", sub_account_id),
    );

    let resend = json!({ "sub_account_id": sub_account_id, "identification": "url_do_documento" });
    ctx.invoke("subconta/resend_documents", Method::Put, resend, Some(13))
        .await;
    let check = json!({ "sub_account_id": sub_account_id });
    ctx.invoke("subconta/checkstatus", Method::Post, check.clone(), Some(14))
        .await;
    ctx.invoke("subconta/check_kyc", Method::Post, check, Some(15))
        .await;
}

pub async fn client_sub_account(ctx: &mut TestContext) {
    ctx.header("Sub-account (Client)");
    ctx.get("subconta", 20).await;
}

pub async fn risk(ctx: &mut TestContext) {
    ctx.header("Risk Analysis");
    let payload = json!({
        "amount": 15000,
        "customer": { "name": "Cliente Risco", "email": "risco@t.com", "document": "11122233344" },
        "payment": { "credit_card": { "bin": "411111" } }
    });
    ctx.invoke("risk", Method::Post, payload, Some(30)).await;
}

pub async fn clients(ctx: &mut TestContext) {
    ctx.header("Clients");

    let suffix = unique_suffix();
    let client = json!({
        "name": format!("Cliente Teste {}", suffix),
        "email": format!("c.{}@t.com", suffix),
        "taxid": "00011122233",
        "phone": "11999998888",
        "documenttype": "CPF"
    });
    let created = ctx.invoke("clientes", Method::Post, client, Some(32)).await;
    ctx.get("clientes", 31).await;

    let Some(id) = created.id_at("/client/id") else {
        skip_all(
            ctx,
            &[(Method::Get, "clientes/:id", 34), (Method::Put, "clientes", 33)],
            "client was not created",
        );
        return;
    };
    ctx.state.client_id = Some(id.clone());

    ctx.get(&format!("clientes/{}", id), 34).await;
    ctx.invoke("clientes", Method::Put, json!({ "id": id, "name": "t-edit" }), Some(33))
        .await;
}

pub async fn payment_links(ctx: &mut TestContext) {
    ctx.header("Payment Links");

    let list = ctx.get("link-pagamentos", 35).await;
    // Some deployments answer with the JSON document as a string
    let first = match list.data() {
        Some(Value::String(text)) => serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|doc| doc.pointer("/data/0/id").and_then(value_id)),
        _ => first_id(&list, "/data"),
    };

    match first {
        Some(id) => {
            ctx.state.payment_link_id = Some(id.clone());
            ctx.get(&format!("link-pagamentos?id={}", id), 36).await;
            ctx.get(&format!("link-pagamento-view/{}", id), 37).await;
            let update = json!({ "nome": format!("Link Editado {}", unique_suffix()) });
            ctx.invoke(&format!("link-pagamentos/{}", id), Method::Patch, update, Some(39))
                .await;
        }
        None => skip_all(
            ctx,
            &[
                (Method::Get, "link-pagamentos?id=:id", 36),
                (Method::Get, "link-pagamento-view/:id", 37),
                (Method::Patch, "link-pagamentos/:id", 39),
            ],
            "listing returned no payment link",
        ),
    }

    let link = json!({
        "nome": "Link Teste",
        "valor": 1000,
        "formas_de_pagamento": ["pix"],
        "max_parcelamento": 1
    });
    let created = ctx.invoke("link-pagamentos", Method::Post, link, Some(38)).await;
    if let Some(id) = created.id_at("/data/id").or_else(|| created.id_at("/id")) {
        ctx.state.payment_link_id = Some(id);
    }
}
