//! Test modules, one per functional area of the backend.
//!
//! Every module takes the shared context by `&mut`, reads the identifiers it
//! depends on and records exactly one outcome or skip per endpoint it covers.

mod admin;
mod auth;
mod dashboard;
mod payments;
mod settings;
mod support;
mod wallet;

pub use auth::authenticate;
pub use settings::restore_personalization;

use crate::client::Method;
use crate::runner::context::TestContext;
use crate::runner::invoke::{value_id, Outcome};

/// A functional area of the suite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    BaasAdmin,
    AcquirersAdmin,
    Company,
    Fees,
    Users,
    SecurityCodes,
    Tickets,
    Transactions,
    SubAccounts,
    AuditLogs,
    AdminPixKeys,
    ClientSubAccount,
    Settings,
    PixelTracker,
    Risk,
    Clients,
    PaymentLinks,
    Standards,
    PixKeys,
    Alerts,
    AdminSettings,
    Dashboard,
    Withdrawals,
    Anticipations,
    Wallet,
    Webhooks,
    Billing,
}

/// Seeding modules; they run first and always run
pub const PRIORITY: [Module; 5] = [
    Module::BaasAdmin,
    Module::AcquirersAdmin,
    Module::Company,
    Module::Fees,
    Module::Users,
];

/// Main list, run in this order with a pause between modules
pub const SEQUENCE: [Module; 22] = [
    Module::SecurityCodes,
    Module::Tickets,
    Module::Transactions,
    Module::SubAccounts,
    Module::AuditLogs,
    Module::AdminPixKeys,
    Module::ClientSubAccount,
    Module::Settings,
    Module::PixelTracker,
    Module::Risk,
    Module::Clients,
    Module::PaymentLinks,
    Module::Standards,
    Module::PixKeys,
    Module::Alerts,
    Module::AdminSettings,
    Module::Dashboard,
    Module::Withdrawals,
    Module::Anticipations,
    Module::Wallet,
    Module::Webhooks,
    Module::Billing,
];

impl Module {
    /// Every module, priority ones first
    pub fn all() -> impl Iterator<Item = Module> {
        PRIORITY.into_iter().chain(SEQUENCE)
    }

    /// Header printed when the module starts
    pub fn title(&self) -> &'static str {
        match self {
            Module::BaasAdmin => "BaaS (Admin)",
            Module::AcquirersAdmin => "Acquirers (Admin)",
            Module::Company => "Company",
            Module::Fees => "Fees",
            Module::Users => "Users",
            Module::SecurityCodes => "Security Codes",
            Module::Tickets => "Tickets",
            Module::Transactions => "Transactions",
            Module::SubAccounts => "Sub-accounts",
            Module::AuditLogs => "Audit Logs",
            Module::AdminPixKeys => "Pix Keys (Admin)",
            Module::ClientSubAccount => "Sub-account (Client)",
            Module::Settings => "Settings & Personalization",
            Module::PixelTracker => "Pixel Tracker",
            Module::Risk => "Risk Analysis",
            Module::Clients => "Clients",
            Module::PaymentLinks => "Payment Links",
            Module::Standards => "Standards (Admin)",
            Module::PixKeys => "Pix Keys (Client)",
            Module::Alerts => "Alerts",
            Module::AdminSettings => "Admin Settings",
            Module::Dashboard => "Dashboard",
            Module::Withdrawals => "Withdrawals",
            Module::Anticipations => "Anticipations",
            Module::Wallet => "Wallet",
            Module::Webhooks => "Webhooks",
            Module::Billing => "Billing",
        }
    }

    /// Name accepted by `--module`
    pub fn slug(&self) -> &'static str {
        match self {
            Module::BaasAdmin => "baas-admin",
            Module::AcquirersAdmin => "acquirers-admin",
            Module::Company => "company",
            Module::Fees => "fees",
            Module::Users => "users",
            Module::SecurityCodes => "security-codes",
            Module::Tickets => "tickets",
            Module::Transactions => "transactions",
            Module::SubAccounts => "sub-accounts",
            Module::AuditLogs => "audit-logs",
            Module::AdminPixKeys => "admin-pix-keys",
            Module::ClientSubAccount => "client-sub-account",
            Module::Settings => "settings",
            Module::PixelTracker => "pixel-tracker",
            Module::Risk => "risk",
            Module::Clients => "clients",
            Module::PaymentLinks => "payment-links",
            Module::Standards => "standards",
            Module::PixKeys => "pix-keys",
            Module::Alerts => "alerts",
            Module::AdminSettings => "admin-settings",
            Module::Dashboard => "dashboard",
            Module::Withdrawals => "withdrawals",
            Module::Anticipations => "anticipations",
            Module::Wallet => "wallet",
            Module::Webhooks => "webhooks",
            Module::Billing => "billing",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Module> {
        let slug = slug.trim().to_lowercase();
        Module::all().find(|m| m.slug() == slug)
    }

    pub fn is_priority(&self) -> bool {
        PRIORITY.contains(self)
    }

    pub async fn run(self, ctx: &mut TestContext) {
        match self {
            Module::BaasAdmin => admin::baas_admin(ctx).await,
            Module::AcquirersAdmin => admin::acquirers_admin(ctx).await,
            Module::Company => admin::company(ctx).await,
            Module::Fees => admin::fees(ctx).await,
            Module::Users => admin::users(ctx).await,
            Module::SecurityCodes => support::security_codes(ctx).await,
            Module::Tickets => support::tickets(ctx).await,
            Module::Transactions => payments::transactions(ctx).await,
            Module::SubAccounts => payments::sub_accounts(ctx).await,
            Module::AuditLogs => support::audit_logs(ctx).await,
            Module::AdminPixKeys => admin::admin_pix_keys(ctx).await,
            Module::ClientSubAccount => payments::client_sub_account(ctx).await,
            Module::Settings => settings::settings(ctx).await,
            Module::PixelTracker => settings::pixel_tracker(ctx).await,
            Module::Risk => payments::risk(ctx).await,
            Module::Clients => payments::clients(ctx).await,
            Module::PaymentLinks => payments::payment_links(ctx).await,
            Module::Standards => admin::standards(ctx).await,
            Module::PixKeys => wallet::pix_keys(ctx).await,
            Module::Alerts => support::alerts(ctx).await,
            Module::AdminSettings => admin::admin_settings(ctx).await,
            Module::Dashboard => dashboard::dashboard(ctx).await,
            Module::Withdrawals => wallet::withdrawals(ctx).await,
            Module::Anticipations => wallet::anticipations(ctx).await,
            Module::Wallet => wallet::wallet(ctx).await,
            Module::Webhooks => support::webhooks(ctx).await,
            Module::Billing => wallet::billing(ctx).await,
        }
    }
}

/// Resolve `--module` names into a main-list filter; `None` when no names are given
pub fn parse_module_filter(names: &[String]) -> anyhow::Result<Option<Vec<Module>>> {
    if names.is_empty() {
        return Ok(None);
    }

    let mut selected = Vec::new();
    for name in names {
        match Module::from_slug(name) {
            Some(m) if m.is_priority() => anyhow::bail!(
                "{} is a priority module; priority modules always run and cannot be selected",
                m.slug()
            ),
            Some(m) => selected.push(m),
            None => anyhow::bail!("Unknown module: {} (see `kingpay-tester modules`)", name),
        }
    }
    Ok(Some(selected))
}

/// Id of the first element of the array at `pointer`
fn first_id(outcome: &Outcome, pointer: &str) -> Option<String> {
    outcome
        .items_at(pointer)
        .first()
        .and_then(|item| item.get("id"))
        .and_then(value_id)
}

/// Last `n` characters of `text`
fn last_chars(text: &str, n: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(n)).collect()
}

fn skip_all(ctx: &mut TestContext, calls: &[(Method, &str, u16)], reason: &str) {
    for (method, operation, tag) in calls {
        ctx.skip_call(*method, operation, *tag, reason);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slugs_round_trip_and_are_unique() {
        let all: Vec<Module> = Module::all().collect();
        assert_eq!(all.len(), 27);
        for module in &all {
            assert_eq!(Module::from_slug(module.slug()), Some(*module));
        }
        let mut slugs: Vec<&str> = all.iter().map(|m| m.slug()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), 27);
        assert_eq!(Module::from_slug(" Pix-Keys "), Some(Module::PixKeys));
        assert_eq!(Module::from_slug("nope"), None);
    }

    #[test]
    fn test_priority_modules_are_not_in_sequence() {
        assert!(SEQUENCE.iter().all(|m| !m.is_priority()));
        assert!(Module::Company.is_priority());
    }

    #[test]
    fn test_module_filter_rejects_priority_and_unknown_names() {
        assert!(parse_module_filter(&[]).unwrap().is_none());

        let names = vec!["alerts".to_string(), " Billing".to_string()];
        assert_eq!(
            parse_module_filter(&names).unwrap(),
            Some(vec![Module::Alerts, Module::Billing])
        );

        let err = parse_module_filter(&["company".to_string()]).unwrap_err();
        assert!(err.to_string().contains("priority modules always run"));

        let err = parse_module_filter(&["alerts".to_string(), "nope".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown module: nope"));
    }

    #[test]
    fn test_first_id_and_last_chars() {
        let outcome = Outcome {
            result: Ok(json!({ "data": [{ "id": 7 }, { "id": 8 }], "empty": [] })),
            status: None,
            duration_ms: 0,
        };
        assert_eq!(first_id(&outcome, "/data").as_deref(), Some("7"));
        assert_eq!(first_id(&outcome, "/empty"), None);
        assert_eq!(last_chars("000001700000000123", 14), "01700000000123");
        assert_eq!(last_chars("abc", 14), "abc");
    }
}
