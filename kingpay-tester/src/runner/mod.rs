pub mod context;
pub mod events;
pub mod invoke;
pub mod modules;
pub mod recorder;
pub mod state;

use crate::client::SupabaseClient;
use crate::report::{self, TestResults};
use crate::utils::config::{Config, DEFAULT_MODULE_DELAY_MS};
use colored::Colorize;
use modules::{Module, PRIORITY, SEQUENCE};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use context::{SuiteSettings, TestContext};
pub use events::*;
pub use state::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SuiteError {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("interrupted before authentication")]
    InterruptedBeforeAuth,
}

/// Stages of one run, advanced one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Authenticating,
    SeedingSharedState,
    RunningModules,
    RestoringConfig,
    Summarizing,
    Done,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Shown in the start banner
    pub backend: String,
    /// Restricts the main list; priority modules always run
    pub only: Option<Vec<Module>>,
    pub module_delay: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            backend: String::new(),
            only: None,
            module_delay: Duration::from_millis(DEFAULT_MODULE_DELAY_MS),
        }
    }
}

/// What a finished run leaves behind
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,
    pub modules: Vec<ModuleReport>,
    pub executed: Vec<Module>,
    pub interrupted: bool,
    pub restored: bool,
}

/// Drives a run through its phases
pub struct SuiteRunner {
    ctx: TestContext,
    options: RunOptions,
    phase: RunPhase,
    stop: Arc<AtomicBool>,
    executed: Vec<Module>,
    interrupted: bool,
    restored: bool,
}

impl SuiteRunner {
    pub fn new(ctx: TestContext, options: RunOptions) -> Self {
        Self {
            ctx,
            options,
            phase: RunPhase::NotStarted,
            stop: Arc::new(AtomicBool::new(false)),
            executed: Vec::new(),
            interrupted: false,
            restored: false,
        }
    }

    /// Flag checked between modules; setting it ends the module loop early
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Main list after the `only` filter, in declared order
    pub fn selected_modules(&self) -> Vec<Module> {
        SEQUENCE
            .into_iter()
            .filter(|m| match &self.options.only {
                Some(only) => only.contains(m),
                None => true,
            })
            .collect()
    }

    pub async fn run(mut self) -> Result<RunReport, SuiteError> {
        while self.phase != RunPhase::Done {
            self.advance().await?;
        }
        Ok(RunReport {
            summary: self.ctx.recorder.summary(),
            modules: self.ctx.recorder.modules().to_vec(),
            executed: self.executed,
            interrupted: self.interrupted,
            restored: self.restored,
        })
    }

    /// Execute the current phase and move to the next one
    pub async fn advance(&mut self) -> Result<(), SuiteError> {
        let next = match self.phase {
            RunPhase::NotStarted => {
                self.ctx.recorder.emitter().emit(TestEvent::SuiteStarted {
                    backend: self.options.backend.clone(),
                });
                RunPhase::Authenticating
            }
            RunPhase::Authenticating => {
                if self.stopped() {
                    self.phase = RunPhase::Done;
                    return Err(SuiteError::InterruptedBeforeAuth);
                }
                if !modules::authenticate(&mut self.ctx).await {
                    self.ctx.recorder.emitter().emit(TestEvent::SuiteAborted {
                        reason: "authentication failed".to_string(),
                    });
                    self.phase = RunPhase::Done;
                    return Err(SuiteError::AuthenticationFailed);
                }
                RunPhase::SeedingSharedState
            }
            RunPhase::SeedingSharedState => {
                self.run_modules(&PRIORITY, Duration::ZERO).await;
                RunPhase::RunningModules
            }
            RunPhase::RunningModules => {
                if !self.interrupted {
                    let selected = self.selected_modules();
                    self.run_modules(&selected, self.options.module_delay)
                        .await;
                }
                RunPhase::RestoringConfig
            }
            RunPhase::RestoringConfig => {
                self.restored = modules::restore_personalization(&mut self.ctx).await;
                RunPhase::Summarizing
            }
            RunPhase::Summarizing => {
                self.ctx.recorder.print_summary();
                RunPhase::Done
            }
            RunPhase::Done => RunPhase::Done,
        };
        log::debug!("phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    async fn run_modules(&mut self, list: &[Module], delay: Duration) {
        for (i, module) in list.iter().enumerate() {
            if self.stopped() {
                self.interrupted = true;
                self.ctx.log(
                    LogLevel::Warn,
                    "Interrupted; skipping the remaining modules.",
                );
                return;
            }
            module.run(&mut self.ctx).await;
            self.executed.push(*module);

            if i + 1 < list.len() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Run the suite against the configured backend, printing as it goes.
///
/// Ctrl+C stops the module loop after the current module; restore and
/// summary still run. Reports are written when `report_dir` is given.
pub async fn run_tests(
    config: &Config,
    only: Option<Vec<Module>>,
    report_dir: Option<&Path>,
) -> anyhow::Result<RunReport> {
    let client = Arc::new(SupabaseClient::new(
        &config.backend_url,
        &config.anon_key,
        config.call_timeout,
    )?);

    let (emitter, receiver) = EventEmitter::new();
    let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

    let settings = SuiteSettings {
        email: config.email.clone(),
        password: config.password.clone(),
        provider_token: config.provider_token.clone(),
    };
    let ctx = TestContext::new(client.clone(), client, settings, emitter);
    let runner = SuiteRunner::new(
        ctx,
        RunOptions {
            backend: config.backend_url.clone(),
            only,
            module_delay: Duration::from_millis(config.module_delay_ms),
        },
    );

    let stop_flag = runner.stop_flag();
    ctrlc::set_handler(move || {
        println!(
            "\n{} Stopping after the current module...",
            "⏹".yellow()
        );
        stop_flag.store(true, Ordering::SeqCst);
    })?;

    // The runner owns the only emitter; once it is gone the listener drains and ends
    let result = runner.run().await;
    listener.await?;
    let run = result?;

    if let Some(dir) = report_dir {
        let results = TestResults::from_run(&run, &config.backend_url);
        report::write_reports(&results, dir).await?;
    }

    Ok(run)
}
