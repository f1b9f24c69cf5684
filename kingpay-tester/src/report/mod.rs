pub mod json;
pub mod junit;
pub mod types;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub use types::TestResults;

/// Generate report from a saved `test-results.json`
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let test_results = json::read(results_path)?;

    let rendered = match format {
        "json" => json::render(&test_results)?,
        "junit" => junit::generate_junit_xml(&test_results)?,
        _ => anyhow::bail!("Unknown format: {}", format),
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            println!("Report saved to: {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Write `test-results.json` and `junit.xml` into `output_dir`
pub async fn write_reports(results: &TestResults, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let report_path = output_dir.join(json::RESULTS_FILE);
    json::write(results, &report_path)?;
    println!(
        "\n{} JSON report saved to: {}",
        "📄".blue(),
        report_path.display().to_string().cyan()
    );

    junit::write_report(results, output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::{ModuleReport, OperationRecord, OperationStatus, RunSummary};

    fn results() -> TestResults {
        let mut billing = ModuleReport::new("Billing");
        billing.operations.push(OperationRecord {
            tag: Some(88),
            name: "POST /functions/v1/billings/pay".to_string(),
            status: OperationStatus::Skipped {
                reason: "billing id not found".to_string(),
            },
            duration_ms: None,
        });
        TestResults {
            run_id: "run-7".to_string(),
            backend: "http://localhost:54321".to_string(),
            modules: vec![billing],
            summary: RunSummary {
                succeeded: 0,
                failed: 0,
                skipped: 1,
            },
            interrupted: true,
            generated_at: "2024-01-01 12:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_saved_results_feed_the_report_command() {
        let dir = std::env::temp_dir().join(format!("kingpay-report-{}", uuid::Uuid::new_v4()));

        write_reports(&results(), &dir).await.unwrap();
        assert!(dir.join("junit.xml").is_file());

        let saved = json::read(&dir.join(json::RESULTS_FILE)).unwrap();
        assert_eq!(saved.run_id, "run-7");
        assert!(saved.interrupted);
        assert_eq!(saved.summary.total(), 1);

        let output = dir.join("again.json");
        generate_report(&dir.join(json::RESULTS_FILE), "json", Some(&output))
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            json::render(&results()).unwrap()
        );

        let err = generate_report(&dir.join(json::RESULTS_FILE), "html", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown format"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
