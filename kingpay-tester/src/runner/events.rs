use super::state::RunSummary;
use colored::Colorize;
use tokio::sync::mpsc;

/// Severity of a free-form log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Notice,
    Success,
    Warn,
    Error,
}

/// Test execution events for real-time updates
#[derive(Debug, Clone, PartialEq)]
pub enum TestEvent {
    // Suite events
    SuiteStarted {
        backend: String,
    },
    SuiteFinished {
        summary: RunSummary,
    },
    SuiteAborted {
        reason: String,
    },

    // Module events
    ModuleStarted {
        name: String,
    },

    // Operation events
    OperationPassed {
        tag: Option<u16>,
        name: String,
        duration_ms: u64,
        preview: Option<String>,
    },
    OperationFailed {
        tag: Option<u16>,
        name: String,
        duration_ms: u64,
        error: String,
    },
    OperationSkipped {
        tag: Option<u16>,
        name: String,
        reason: Option<String>,
    },

    Log {
        level: LogLevel,
        message: String,
    },
}

/// Event emitter feeding a single listener.
///
/// The channel is unbounded so a slow terminal never drops lines; dropping
/// every emitter ends the listener.
#[derive(Clone)]
pub struct EventEmitter {
    sender: mpsc::UnboundedSender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TestEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(TestEvent::Log {
            level,
            message: message.into(),
        });
    }
}

/// `[#  7]` for tagged operations, `[---]` otherwise
pub fn format_tag(tag: Option<u16>) -> String {
    match tag {
        Some(n) => format!("[#{:>3}]", n),
        None => "[---]".to_string(),
    }
}

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    /// Print events until every emitter is dropped
    pub async fn listen(mut receiver: mpsc::UnboundedReceiver<TestEvent>) {
        while let Some(event) = receiver.recv().await {
            for line in Self::render(&event) {
                println!("{}", line);
            }
        }
    }

    pub fn render(event: &TestEvent) -> Vec<String> {
        match event {
            TestEvent::SuiteStarted { backend } => vec![format!(
                "{} Starting full endpoint coverage suite against {}",
                "▶".green().bold(),
                backend.cyan()
            )],

            TestEvent::ModuleStarted { name } => {
                let title = format!(" Module: {} ", name.to_uppercase());
                vec![
                    format!("\n{}", title.cyan().bold()),
                    "=".repeat(name.len() + 10).cyan().to_string(),
                ]
            }

            TestEvent::OperationPassed {
                tag,
                name,
                duration_ms,
                preview,
            } => {
                let mut lines = vec![format!(
                    "{} {} {} ({}ms)",
                    format_tag(*tag).green(),
                    "✓ PASSED".green().bold(),
                    name.green(),
                    duration_ms
                )];
                if let Some(preview) = preview {
                    lines.push(format!("  -> Response: {}", preview).white().to_string());
                }
                lines
            }

            TestEvent::OperationFailed {
                tag,
                name,
                duration_ms,
                error,
            } => vec![
                format!(
                    "{} {} {} ({}ms)",
                    format_tag(*tag).red(),
                    "✗ FAILED".red().bold(),
                    name.red(),
                    duration_ms
                ),
                format!("  -> Error: {}", error).yellow().to_string(),
            ],

            TestEvent::OperationSkipped { tag, name, reason } => {
                let mut lines = vec![format!(
                    "{} {} {}",
                    format_tag(*tag).yellow(),
                    "○ SKIPPED".yellow().bold(),
                    name.yellow()
                )];
                if let Some(reason) = reason {
                    lines.push(format!("  -> Reason: {}", reason).yellow().to_string());
                }
                lines
            }

            TestEvent::Log { level, message } => {
                let line = format!("  -> {}", message);
                let line = match level {
                    LogLevel::Info => line.white(),
                    LogLevel::Notice => line.cyan(),
                    LogLevel::Success => line.green(),
                    LogLevel::Warn => line.yellow(),
                    LogLevel::Error => line.red(),
                };
                vec![line.to_string()]
            }

            TestEvent::SuiteAborted { reason } => {
                vec![format!("\n{} Aborting: {}", "■".red().bold(), reason.red())]
            }

            TestEvent::SuiteFinished { summary } => {
                let rule = "=".repeat(40).blue().to_string();
                vec![
                    format!("\n{} Endpoint coverage suite finished.", "■".blue().bold()),
                    format!("\n{}", rule),
                    "TEST SUMMARY".blue().bold().to_string(),
                    rule.clone(),
                    format!("Total covered (executed + skipped): {}", summary.total())
                        .cyan()
                        .to_string(),
                    format!("Total executed: {}", summary.executed())
                        .cyan()
                        .to_string(),
                    format!("✓ Passed: {}", summary.succeeded).green().to_string(),
                    format!("✗ Failed: {}", summary.failed).red().to_string(),
                    format!("○ Skipped: {}", summary.skipped).yellow().to_string(),
                    rule,
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tag() {
        assert_eq!(format_tag(Some(7)), "[#  7]");
        assert_eq!(format_tag(Some(117)), "[#117]");
        assert_eq!(format_tag(None), "[---]");
    }

    #[test]
    fn test_skip_renders_reason_line() {
        let lines = ConsoleEventListener::render(&TestEvent::OperationSkipped {
            tag: Some(63),
            name: "POST /functions/v1/withdrawals".to_string(),
            reason: Some("pix key id not found".to_string()),
        });
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[# 63]"));
        assert!(lines[1].contains("pix key id not found"));
    }

    #[test]
    fn test_summary_lines() {
        let lines = ConsoleEventListener::render(&TestEvent::SuiteFinished {
            summary: RunSummary {
                succeeded: 3,
                failed: 1,
                skipped: 2,
            },
        });
        assert!(lines.iter().any(|l| l.contains("Total covered (executed + skipped): 6")));
        assert!(lines.iter().any(|l| l.contains("Total executed: 4")));
    }

    #[tokio::test]
    async fn test_emitter_delivers_in_order_until_dropped() {
        let (emitter, mut receiver) = EventEmitter::new();
        emitter.log(LogLevel::Info, "first");
        emitter.emit(TestEvent::ModuleStarted {
            name: "Risk".to_string(),
        });
        drop(emitter);

        assert!(matches!(receiver.recv().await, Some(TestEvent::Log { .. })));
        assert!(matches!(
            receiver.recv().await,
            Some(TestEvent::ModuleStarted { .. })
        ));
        assert!(receiver.recv().await.is_none());
    }
}
