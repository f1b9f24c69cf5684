use crate::runner::state::{ModuleReport, RunSummary};
use crate::runner::RunReport;
use serde::{Deserialize, Serialize};

/// Test results for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub run_id: String,
    pub backend: String,
    pub modules: Vec<ModuleReport>,
    pub summary: RunSummary,
    #[serde(default)]
    pub interrupted: bool,
    pub generated_at: String,
}

impl TestResults {
    pub fn from_run(report: &RunReport, backend: &str) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            backend: backend.to_string(),
            modules: report.modules.clone(),
            summary: report.summary,
            interrupted: report.interrupted,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
