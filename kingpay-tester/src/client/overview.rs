//! Wallet overview: the three read-only lookups behind the wallet screen,
//! issued together and settled independently.

use super::{AuthSession, FunctionGateway, InvokeRequest, Method, RemoteError};
use serde_json::Value;

/// Independently settled results; one failed read never hides the others
#[derive(Debug)]
pub struct WalletOverview {
    pub wallet: Result<Value, RemoteError>,
    pub financial: Result<Value, RemoteError>,
    pub extract: Result<Vec<Value>, RemoteError>,
}

impl WalletOverview {
    /// Number of reads that resolved
    pub fn resolved(&self) -> usize {
        [
            self.wallet.is_ok(),
            self.financial.is_ok(),
            self.extract.is_ok(),
        ]
        .iter()
        .filter(|ok| **ok)
        .count()
    }
}

/// Fetch wallet, financial summary and extract concurrently
pub async fn fetch_wallet_overview(
    gateway: &dyn FunctionGateway,
    session: &AuthSession,
) -> WalletOverview {
    let request = |operation: String, method: Method, body: Option<Value>| InvokeRequest {
        operation,
        method,
        body,
        bearer: session.access_token.clone(),
    };

    let (wallet, financial, extract) = tokio::join!(
        gateway.invoke(request(
            format!("wallet?userId={}", session.user_id),
            Method::Get,
            None
        )),
        gateway.invoke(request(
            "whitelabel-financeiro".to_string(),
            Method::Post,
            Some(serde_json::json!({}))
        )),
        gateway.invoke(request(
            format!("extrato/{}", session.user_id),
            Method::Get,
            None
        )),
    );

    let extract = extract.map(|value| {
        value
            .get("extrato")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    });

    WalletOverview {
        wallet,
        financial,
        extract,
    }
}
