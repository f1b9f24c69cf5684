//! Back-office areas: BaaS providers, acquirers, companies, fees, users,
//! pix key approval, platform standards and admin settings.

use super::{first_id, last_chars, skip_all};
use crate::client::Method;
use crate::runner::context::{unique_suffix, TestContext};
use crate::runner::events::LogLevel;
use serde_json::{json, Value};

pub async fn baas_admin(ctx: &mut TestContext) {
    ctx.header("BaaS (Admin)");

    let list = ctx.get("baas", 89).await;
    let Some(id) = first_id(&list, "/Baas") else {
        skip_all(
            ctx,
            &[
                (Method::Get, "baas/:id", 90),
                (Method::Get, "baas/:id/taxas", 91),
                (Method::Patch, "baas/:id/active", 92),
                (Method::Patch, "baas/:id/taxa", 93),
            ],
            "listing returned no BaaS provider",
        );
        return;
    };
    ctx.state.baas_id = Some(id.clone());

    ctx.get(&format!("baas/{}", id), 90).await;
    ctx.get(&format!("baas/{}/taxas", id), 91).await;
    ctx.invoke(&format!("baas/{}/active", id), Method::Patch, json!({ "active": false }), Some(92))
        .await;
    ctx.invoke(&format!("baas/{}/taxa", id), Method::Patch, json!({ "fee": 500 }), Some(93))
        .await;
}

pub async fn acquirers_admin(ctx: &mut TestContext) {
    ctx.header("Acquirers (Admin)");

    let list = ctx.get("acquirers", 94).await;
    let Some(id) = first_id(&list, "/acquirers") else {
        skip_all(
            ctx,
            &[
                (Method::Get, "acquirers/:id", 95),
                (Method::Get, "acquirers/:id/taxas", 96),
                (Method::Patch, "acquirers/:id/active", 97),
                (Method::Patch, "acquirers/:id/taxas", 98),
            ],
            "listing returned no acquirer",
        );
        return;
    };
    ctx.state.acquirer_id = Some(id.clone());

    ctx.get(&format!("acquirers/{}", id), 95).await;
    ctx.get(&format!("acquirers/{}/taxas", id), 96).await;
    ctx.invoke(
        &format!("acquirers/{}/active", id),
        Method::Patch,
        json!({ "active": false }),
        Some(97),
    )
    .await;
    let fees = json!({ "mdr_pix": 0.85, "mdr_1x": 3.49, "mdr_2x": 4.59, "boleto_fee_fixed": 2.50 });
    ctx.invoke(&format!("acquirers/{}/taxas", id), Method::Patch, fees, Some(98))
        .await;
}

const COMPANY_READS: [(&str, u16); 7] = [
    ("", 101),
    ("/taxas", 102),
    ("/reserva", 103),
    ("/config", 104),
    ("/docs", 105),
    ("/adq", 106),
    ("/financial-info", 107),
];

/// `(path, body, tag)` of every company update; `acquirer` fills the adq body
fn company_updates(acquirer: &str) -> [(&'static str, Value, u16); 9] {
    [
        (
            "taxas",
            json!({ "pix_fee_percentage": 0.98, "pix_fee_fixed": 50, "mdr_1x_adquirente": 4.98 }),
            109,
        ),
        ("taxas-bulk", json!({ "mdr_2x_adquirente": 5.5 }), 110),
        ("docs", json!({ "selfie_url": "https://t.com/doc.jpg" }), 111),
        ("config", json!({ "autotransfer": true }), 112),
        (
            "config-bulk",
            json!({ "autotransfer": false, "maxtransferamount": 600000 }),
            113,
        ),
        ("reserva", json!({ "reservepercentagepix": 10 }), 114),
        ("adq", json!({ "acquirers_pix": acquirer }), 115),
        ("status", json!({ "status": "approved" }), 116),
        (
            "reserva-bulk",
            json!({ "reservedayspix": 5, "reservepercentagepix": 12 }),
            117,
        ),
    ]
}

/// Creates a fresh company and drives every company endpoint against it.
/// The new id replaces `company_id` for all later modules.
pub async fn company(ctx: &mut TestContext) {
    ctx.header("Company");

    let suffix = unique_suffix();
    let payload = json!({
        "name": format!("Empresa Teste {}", suffix),
        "taxid": last_chars(&format!("00000000000{}", suffix), 14),
        "averagebilling": 10000,
        "averageticket": 100,
        "website": "https://teste.com",
        "phone": "11988887777",
        "street": "Rua Teste",
        "number": "123",
        "city": "Cidade Teste",
        "state": "TS",
        "zip": "12345000"
    });
    let created = ctx.invoke("companies", Method::Post, payload, Some(108)).await;

    match created.id_at("/data/id") {
        Some(id) => {
            ctx.log(LogLevel::Info, format!("Test company created with ID: {}", id));
            ctx.state.company_id = Some(id.clone());

            for (path, tag) in COMPANY_READS {
                ctx.get(&format!("companies/{}{}", id, path), tag).await;
            }

            let acquirer = ctx.state.acquirer_id.clone().unwrap_or_else(|| "p".to_string());
            for (path, body, tag) in company_updates(&acquirer) {
                ctx.invoke(&format!("companies/{}/{}", id, path), Method::Patch, body, Some(tag))
                    .await;
            }
        }
        None => {
            ctx.log(
                LogLevel::Error,
                "Could not create the test company; skipping company-scoped calls.",
            );
            let reason = "test company was not created";
            for (path, tag) in COMPANY_READS {
                ctx.skip_call(Method::Get, &format!("companies/:id{}", path), tag, reason);
            }
            for (path, _, tag) in company_updates("") {
                ctx.skip_call(Method::Patch, &format!("companies/:id/{}", path), tag, reason);
            }
        }
    }

    ctx.get("companies", 99).await;
    ctx.get("companies/contagem", 100).await;
}

pub async fn fees(ctx: &mut TestContext) {
    ctx.header("Fees");

    let Some(company_id) = ctx.state.company_id.clone() else {
        ctx.skip_call(Method::Post, "taxas", 17, "company id not found");
        return;
    };
    let payload = json!({
        "company_id": company_id,
        "valor": 10000,
        "payment_method": "PIX",
        "parcelas": 1
    });
    ctx.invoke("taxas", Method::Post, payload, Some(17)).await;
}

pub async fn users(ctx: &mut TestContext) {
    ctx.header("Users");

    let list = ctx.get("users", 70).await;
    match first_id(&list, "/users") {
        Some(id) => {
            ctx.state.user_id_to_test = Some(id.clone());
            ctx.get(&format!("users/{}", id), 71).await;

            let api_key = ctx.get(&format!("users/{}/apikey", id), 72).await;
            if let Some(secret) = api_key
                .at("/api_secret_key")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
            {
                ctx.state.api_secret_key = Some(secret.to_string());
            }

            ctx.get(&format!("users/{}/permissions", id), 73).await;
            ctx.invoke(
                &format!("users/{}/edit", id),
                Method::Patch,
                json!({ "fullname": "t-edit" }),
                Some(75),
            )
            .await;
            ctx.invoke(
                &format!("users/{}/permissions", id),
                Method::Patch,
                json!({ "permissions": { "d_gen": true } }),
                Some(76),
            )
            .await;
        }
        None => skip_all(
            ctx,
            &[
                (Method::Get, "users/:id", 71),
                (Method::Get, "users/:id/apikey", 72),
                (Method::Get, "users/:id/permissions", 73),
                (Method::Patch, "users/:id/edit", 75),
                (Method::Patch, "users/:id/permissions", 76),
            ],
            "listing returned no user",
        ),
    }

    let suffix = unique_suffix();
    let user = json!({
        "fullname": "Nome Completo",
        "email": format!("u.{}@t.com", suffix),
        "document": "12345678901",
        "birthdate": "2000-01-01"
    });
    ctx.invoke("users/create", Method::Post, user, Some(74)).await;

    let registration = json!({
        "userData": {
            "email": format!("u-comp-{}@t.com", suffix),
            "password": "a_strong_password",
            "fullname": "Usuário Empresa"
        },
        "companyData": {
            "name": "Empresa do Novo Usuário",
            "taxid": last_chars(&format!("11111111111{}", suffix), 14)
        }
    });
    ctx.invoke("users/register", Method::Post, registration, Some(77))
        .await;
}

pub async fn admin_pix_keys(ctx: &mut TestContext) {
    ctx.header("Pix Keys (Admin)");

    let list = ctx.get("pix-key", 18).await;
    match first_id(&list, "/data") {
        Some(id) => {
            ctx.state.admin_pix_key_id = Some(id.clone());
            ctx.invoke(
                &format!("pix-key/{}/approve", id),
                Method::Patch,
                json!({ "approved": true }),
                Some(19),
            )
            .await;
        }
        None => {
            ctx.log(
                LogLevel::Warn,
                "[# 18] (/pix-key): call failed or returned no keys for the admin.",
            );
            ctx.skip_call(Method::Patch, "pix-key/:id/approve", 19, "no pix key to approve");
        }
    }
}

pub async fn standards(ctx: &mut TestContext) {
    ctx.header("Standards (Admin)");
    ctx.get("standard", 40).await;
    ctx.invoke(
        "standard/last",
        Method::Patch,
        json!({ "juros": 2.99, "aceita_boleto": false }),
        Some(41),
    )
    .await;
}

pub async fn admin_settings(ctx: &mut TestContext) {
    ctx.header("Admin Settings");
    ctx.get("configuracoes/termos", 49).await;
    ctx.invoke(
        "configuracoes/emails",
        Method::Put,
        json!({ "template_name": "teste", "content": "conteudo" }),
        Some(50),
    )
    .await;
    ctx.invoke("configuracoes/acecitar-termos", Method::Put, json!({}), Some(51))
        .await;
}
