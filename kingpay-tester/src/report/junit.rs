use super::types::TestResults;
use crate::runner::events::format_tag;
use crate::runner::state::{ModuleReport, OperationRecord, OperationStatus};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total_duration: u64 = results.modules.iter().map(ModuleReport::duration_ms).sum();

    // <testsuites>
    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "kingpay-tester-run"));
    suites_start.push_attribute(("tests", results.summary.total().to_string().as_str()));
    suites_start.push_attribute(("failures", results.summary.failed.to_string().as_str()));
    suites_start.push_attribute(("skipped", results.summary.skipped.to_string().as_str()));
    suites_start.push_attribute(("time", seconds(total_duration).as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // One <testsuite> per module
    for (index, module) in results.modules.iter().enumerate() {
        let mut suite_start = BytesStart::new("testsuite");
        suite_start.push_attribute(("name", module.module_name.as_str()));
        suite_start.push_attribute(("tests", module.operations.len().to_string().as_str()));
        suite_start.push_attribute(("failures", module.failures().to_string().as_str()));
        suite_start.push_attribute(("skipped", module.skips().to_string().as_str()));
        suite_start.push_attribute(("id", index.to_string().as_str()));
        suite_start.push_attribute(("time", seconds(module.duration_ms()).as_str()));
        suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
        writer.write_event(Event::Start(suite_start))?;

        for operation in &module.operations {
            write_test_case(&mut writer, &module.module_name, operation)?;
        }

        writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let result = writer.into_inner().into_inner();
    let xml = String::from_utf8(result)?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    module_name: &str,
    operation: &OperationRecord,
) -> Result<()> {
    let name = format!("{} {}", format_tag(operation.tag), operation.name);
    let classname = format!("kingpay.{}", module_name.replace(' ', "_"));

    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", name.as_str()));
    case_start.push_attribute(("classname", classname.as_str()));
    case_start.push_attribute(("time", seconds(operation.duration_ms.unwrap_or(0)).as_str()));
    writer.write_event(Event::Start(case_start))?;

    match &operation.status {
        OperationStatus::Failed { error } => {
            let mut fail_start = BytesStart::new("failure");
            fail_start.push_attribute(("message", error.as_str()));
            fail_start.push_attribute(("type", "RemoteError"));
            writer.write_event(Event::Start(fail_start))?;
            writer.write_event(Event::Text(BytesText::new(error)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
        }
        OperationStatus::Skipped { reason } => {
            let mut skipped = BytesStart::new("skipped");
            if !reason.is_empty() {
                skipped.push_attribute(("message", reason.as_str()));
            }
            writer.write_event(Event::Empty(skipped))?;
        }
        OperationStatus::Passed => {}
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write report to file
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::RunSummary;

    fn results() -> TestResults {
        let mut alerts = ModuleReport::new("Alerts");
        alerts.operations = vec![
            OperationRecord {
                tag: Some(46),
                name: "POST /functions/v1/alerts".to_string(),
                status: OperationStatus::Passed,
                duration_ms: Some(1500),
            },
            OperationRecord {
                tag: Some(45),
                name: "GET /functions/v1/alerts".to_string(),
                status: OperationStatus::Failed {
                    error: "HTTP 500: <boom> & co".to_string(),
                },
                duration_ms: Some(500),
            },
            OperationRecord {
                tag: Some(47),
                name: "POST /functions/v1/alerts/mark-viewed".to_string(),
                status: OperationStatus::Skipped {
                    reason: "alert id not found".to_string(),
                },
                duration_ms: None,
            },
        ];
        let mut restore = ModuleReport::new("Restoring Original Personalization");
        restore.operations.push(OperationRecord {
            tag: None,
            name: "PUT /functions/v1/personalization".to_string(),
            status: OperationStatus::Passed,
            duration_ms: Some(100),
        });

        TestResults {
            run_id: "run-1".to_string(),
            backend: "http://localhost:54321".to_string(),
            modules: vec![alerts, restore],
            summary: RunSummary {
                succeeded: 2,
                failed: 1,
                skipped: 1,
            },
            interrupted: false,
            generated_at: "2024-01-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn test_generate_junit_xml() {
        let xml = generate_junit_xml(&results()).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="kingpay-tester-run" tests="4" failures="1" skipped="1" time="2.1">"#));
        assert!(xml.contains(r#"<testsuite name="Alerts" tests="3" failures="1" skipped="1""#));
        assert!(xml.contains(r#"<testcase name="[# 46] POST /functions/v1/alerts""#));
        assert!(xml.contains(r#"classname="kingpay.Alerts""#));
        assert!(xml.contains(r#"<skipped message="alert id not found"/>"#));
        assert!(xml.contains("HTTP 500: &lt;boom&gt; &amp; co"));
        assert!(xml.contains(r#"<testcase name="[---] PUT /functions/v1/personalization""#));
        assert_eq!(xml.matches("<testsuite ").count(), 2);
    }

    #[test]
    fn test_results_json_round_trip_keeps_status_tags() {
        let json = serde_json::to_string(&results()).unwrap();
        assert!(json.contains(r#""runId":"run-1""#));
        assert!(json.contains(r#""type":"skipped""#));

        let back: TestResults = serde_json::from_str(&json).unwrap();
        assert_eq!(back.modules[0].operations.len(), 3);
        assert_eq!(back.summary, results().summary);
    }
}
