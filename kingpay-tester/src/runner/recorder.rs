use super::events::{EventEmitter, TestEvent};
use super::state::{ModuleReport, OperationRecord, OperationStatus, RunSummary};
use serde_json::Value;

/// Longest response preview printed for a passed operation
pub const PREVIEW_LIMIT: usize = 150;

/// Payload or error attached to a recorded outcome
#[derive(Debug, Clone, Copy)]
pub enum Detail<'a> {
    Payload(Option<&'a Value>),
    Error(&'a str),
}

/// Running tallies of every recorded and skipped operation.
///
/// Counts only ever grow; each `record` or `skip` call bumps exactly one of
/// them and emits exactly one operation event.
pub struct Recorder {
    emitter: EventEmitter,
    summary: RunSummary,
    modules: Vec<ModuleReport>,
}

impl Recorder {
    pub fn new(emitter: EventEmitter) -> Self {
        Self {
            emitter,
            summary: RunSummary::default(),
            modules: Vec::new(),
        }
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Open a new module section; later records are attributed to it
    pub fn begin_module(&mut self, name: &str) {
        self.modules.push(ModuleReport::new(name));
        self.emitter.emit(TestEvent::ModuleStarted {
            name: name.to_string(),
        });
    }

    pub fn record(
        &mut self,
        name: &str,
        success: bool,
        duration_ms: u64,
        detail: Detail<'_>,
        tag: Option<u16>,
    ) {
        let status = if success {
            self.summary.succeeded += 1;
            let preview = match detail {
                Detail::Payload(Some(value)) if !value.is_null() => Some(preview(value)),
                _ => None,
            };
            self.emitter.emit(TestEvent::OperationPassed {
                tag,
                name: name.to_string(),
                duration_ms,
                preview,
            });
            OperationStatus::Passed
        } else {
            self.summary.failed += 1;
            let error = match detail {
                Detail::Error(message) => message.to_string(),
                Detail::Payload(Some(value)) => preview(value),
                Detail::Payload(None) => "unknown error".to_string(),
            };
            self.emitter.emit(TestEvent::OperationFailed {
                tag,
                name: name.to_string(),
                duration_ms,
                error: error.clone(),
            });
            OperationStatus::Failed { error }
        };

        self.push(OperationRecord {
            tag,
            name: name.to_string(),
            status,
            duration_ms: Some(duration_ms),
        });
    }

    pub fn skip(&mut self, name: &str, tag: Option<u16>, reason: Option<&str>) {
        self.summary.skipped += 1;
        self.emitter.emit(TestEvent::OperationSkipped {
            tag,
            name: name.to_string(),
            reason: reason.map(str::to_string),
        });
        self.push(OperationRecord {
            tag,
            name: name.to_string(),
            status: OperationStatus::Skipped {
                reason: reason.unwrap_or_default().to_string(),
            },
            duration_ms: None,
        });
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Emit the summary block
    pub fn print_summary(&self) {
        self.emitter.emit(TestEvent::SuiteFinished {
            summary: self.summary,
        });
    }

    pub fn modules(&self) -> &[ModuleReport] {
        &self.modules
    }

    fn push(&mut self, record: OperationRecord) {
        if self.modules.is_empty() {
            self.modules.push(ModuleReport::new("Runner"));
        }
        if let Some(module) = self.modules.last_mut() {
            module.operations.push(record);
        }
    }
}

/// Compact JSON, cut at `PREVIEW_LIMIT` characters
pub fn preview(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    truncate(&text, PREVIEW_LIMIT)
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn recorder() -> (Recorder, UnboundedReceiver<TestEvent>) {
        let (emitter, receiver) = EventEmitter::new();
        (Recorder::new(emitter), receiver)
    }

    fn drain(receiver: &mut UnboundedReceiver<TestEvent>) -> Vec<TestEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_each_call_bumps_exactly_one_counter() {
        let (mut recorder, mut receiver) = recorder();
        recorder.begin_module("Risk");
        let payload = serde_json::json!({ "score": 10 });
        recorder.record("POST /functions/v1/risk", true, 12, Detail::Payload(Some(&payload)), Some(30));
        recorder.record("POST /functions/v1/risk", false, 8, Detail::Error("HTTP 500: boom"), Some(30));
        recorder.skip("POST /functions/v1/webhookfx", Some(8), Some("external caller"));

        let summary = recorder.summary();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total(), 3);

        let operation_events = drain(&mut receiver)
            .into_iter()
            .filter(|e| !matches!(e, TestEvent::ModuleStarted { .. }))
            .count();
        assert_eq!(operation_events as u32, summary.total());
        assert_eq!(recorder.modules()[0].operations.len(), 3);
    }

    #[test]
    fn test_records_before_any_module_are_kept() {
        let (mut recorder, _receiver) = recorder();
        recorder.record("PUT /functions/v1/personalization", true, 5, Detail::Payload(None), None);
        assert_eq!(recorder.modules()[0].module_name, "Runner");
        assert_eq!(recorder.modules()[0].operations.len(), 1);
    }

    #[test]
    fn test_preview_truncates_long_payloads() {
        let long = Value::String("x".repeat(400));
        let text = preview(&long);
        assert_eq!(text.len(), PREVIEW_LIMIT + 3);
        assert!(text.ends_with("..."));

        let short = serde_json::json!({ "ok": true });
        assert_eq!(preview(&short), r#"{"ok":true}"#);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("ação", 2), "aç...");
        assert_eq!(truncate("ação", 4), "ação");
    }

    #[test]
    fn test_null_payload_has_no_preview() {
        let (mut recorder, mut receiver) = recorder();
        recorder.record("POST /auth/v1/signup", true, 0, Detail::Payload(Some(&Value::Null)), Some(2));
        match drain(&mut receiver).pop() {
            Some(TestEvent::OperationPassed { preview, .. }) => assert!(preview.is_none()),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
