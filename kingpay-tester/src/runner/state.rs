use crate::client::AuthSession;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifiers and tokens threaded between modules.
///
/// Every field starts empty and is only written by the module that produces
/// it, after a successful call. Consumers treat `None` as "skip".
#[derive(Debug, Clone, Default)]
pub struct TestState {
    pub session: Option<AuthSession>,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
    pub user_id_to_test: Option<String>,
    pub pix_key_id: Option<String>,
    pub ticket_id: Option<String>,
    pub payment_link_id: Option<String>,
    pub alert_id: Option<String>,
    pub baas_id: Option<String>,
    pub acquirer_id: Option<String>,
    pub webhook_id: Option<String>,
    pub withdrawal_id: Option<String>,
    pub anticipation_id: Option<String>,
    pub client_id: Option<String>,
    pub admin_pix_key_id: Option<String>,
    pub tracker_id: Option<String>,
    pub provider_account_id: Option<String>,
    pub api_secret_key: Option<String>,
    /// Personalization read before the run mutates it
    pub original_personalization: Option<Value>,
}

impl TestState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Operation outcome status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OperationStatus {
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

/// One recorded or skipped operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    pub tag: Option<u16>,
    pub name: String,
    pub status: OperationStatus,
    pub duration_ms: Option<u64>,
}

/// All operations attributed to one module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleReport {
    pub module_name: String,
    pub operations: Vec<OperationRecord>,
}

impl ModuleReport {
    pub fn new(name: &str) -> Self {
        Self {
            module_name: name.to_string(),
            operations: Vec::new(),
        }
    }

    pub fn failures(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op.status, OperationStatus::Failed { .. }))
            .count()
    }

    pub fn skips(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op.status, OperationStatus::Skipped { .. }))
            .count()
    }

    pub fn duration_ms(&self) -> u64 {
        self.operations.iter().filter_map(|op| op.duration_ms).sum()
    }
}

/// Final tallies of a run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub succeeded: u32,
    pub failed: u32,
    pub skipped: u32,
}

impl RunSummary {
    /// Operations actually sent to the backend
    pub fn executed(&self) -> u32 {
        self.succeeded + self.failed
    }

    /// Executed plus skipped
    pub fn total(&self) -> u32 {
        self.executed() + self.skipped
    }
}
