use crate::config::SweConfig;
use crate::driver::{ArtifactExporter, DichotomyDriver, VoltageMonitor};
use crate::job::{DirectionTask, RunStatus, SweDichotomyResult};
use crate::manifest::{write_swe_manifest, SweManifest};
use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use swe_algo::{
    build_dispatcher, net_positions, CancellationToken, DcExchangeMeasurement, Direction,
    ExchangeMeasurement, NetworkShifter, ShiftError, ZonalScaling,
};
use tracing::{error, info, warn};

/// Results of one run, ordered by direction.
#[derive(Debug)]
pub struct SweRunSummary {
    pub results: Vec<SweDichotomyResult>,
    pub manifest_path: Option<PathBuf>,
}

impl SweRunSummary {
    pub fn result(&self, direction: Direction) -> Option<&SweDichotomyResult> {
        self.results.iter().find(|r| r.direction == direction)
    }

    pub fn count(&self, status: RunStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}

/// Runs the capacity search of several directions in parallel.
///
/// Each direction owns its network, so workers share nothing but the
/// read-only collaborators and the cancellation flag. A worker that errors
/// or panics only fails its own direction.
pub struct SweOrchestrator {
    config: SweConfig,
    driver: Arc<dyn DichotomyDriver>,
    scaling: Arc<dyn ZonalScaling>,
    measurement: Arc<dyn ExchangeMeasurement>,
    voltage: Option<Arc<dyn VoltageMonitor>>,
    exporter: Option<Arc<dyn ArtifactExporter>>,
    cancel: CancellationToken,
}

impl SweOrchestrator {
    pub fn new(
        config: SweConfig,
        driver: Arc<dyn DichotomyDriver>,
        scaling: Arc<dyn ZonalScaling>,
    ) -> Self {
        let measurement = Arc::new(DcExchangeMeasurement::with_kind(config.solver));
        Self {
            config,
            driver,
            scaling,
            measurement,
            voltage: None,
            exporter: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_measurement(mut self, measurement: Arc<dyn ExchangeMeasurement>) -> Self {
        self.measurement = measurement;
        self
    }

    pub fn with_voltage_monitor(mut self, monitor: Arc<dyn VoltageMonitor>) -> Self {
        self.voltage = Some(monitor);
        self
    }

    pub fn with_exporter(mut self, exporter: Arc<dyn ArtifactExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that interrupts the run when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn run_directions(&self, tasks: Vec<DirectionTask>) -> Result<SweRunSummary> {
        let thread_count = if self.config.threads == 0 {
            num_cpus::get()
        } else {
            self.config.threads
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .context("building Rayon thread pool for direction runs")?;

        info!(
            directions = tasks.len(),
            threads = thread_count,
            process = %self.config.process,
            "starting SWE run"
        );
        let mut results: Vec<SweDichotomyResult> = pool.install(|| {
            tasks
                .into_par_iter()
                .map(|task| self.run_direction(task))
                .collect()
        });
        results.sort_by_key(|r| r.direction);

        let manifest_path = match &self.config.output_root {
            Some(root) => {
                let path = root.join("swe_manifest.json");
                let manifest = SweManifest::from_results(self.config.process, &results);
                match write_swe_manifest(&path, &manifest) {
                    Ok(()) => Some(path),
                    Err(err) => {
                        warn!(error = %format!("{err:#}"), "manifest not written");
                        None
                    }
                }
            }
            None => None,
        };
        Ok(SweRunSummary {
            results,
            manifest_path,
        })
    }

    fn run_direction(&self, task: DirectionTask) -> SweDichotomyResult {
        let direction = task.direction;
        if self.cancel.is_cancelled() {
            info!(%direction, "run interrupted before start");
            return SweDichotomyResult::interrupted(direction);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.execute(task))) {
            Ok(Ok(result)) => {
                info!(%direction, status = result.status.as_str(), "direction finished");
                result
            }
            Ok(Err(err)) if self.cancel.is_cancelled() || is_interruption(&err) => {
                info!(%direction, "direction interrupted");
                SweDichotomyResult::interrupted(direction)
            }
            Ok(Err(err)) => {
                warn!(%direction, error = %format!("{err:#}"), "direction failed");
                SweDichotomyResult::run_failed(direction, format!("{err:#}"))
            }
            Err(payload) => {
                let message = panic_message(payload);
                error!(%direction, %message, "direction worker panicked");
                SweDichotomyResult::run_failed(direction, message)
            }
        }
    }

    fn execute(&self, task: DirectionTask) -> Result<SweDichotomyResult> {
        let DirectionTask {
            direction,
            mut network,
        } = task;

        let initial = net_positions(network.grid(), self.measurement.as_ref())
            .with_context(|| format!("measuring initial net positions for {direction}"))?;
        let dispatcher = build_dispatcher(self.config.process, direction, &initial)?;
        let shifter = NetworkShifter::new(
            dispatcher,
            Arc::clone(&self.scaling),
            Arc::clone(&self.measurement),
            self.config.shifting.clone(),
        )
        .with_cancellation(self.cancel.clone());

        let dichotomy = self
            .driver
            .run(direction, &mut network, &shifter, &self.cancel)
            .with_context(|| format!("dichotomy for {direction}"))?;
        if dichotomy.interrupted || self.cancel.is_cancelled() {
            return Ok(SweDichotomyResult {
                dichotomy: Some(dichotomy),
                ..SweDichotomyResult::interrupted(direction)
            });
        }

        let status = if dichotomy.rao_failed {
            RunStatus::RaoFailed
        } else {
            RunStatus::Completed
        };
        let mut result = SweDichotomyResult {
            direction,
            status,
            dichotomy: None,
            voltage_check: None,
            artifacts: Vec::new(),
            error: None,
        };

        if let Some(monitor) = &self.voltage {
            match monitor.check(direction, network.grid()) {
                Ok(check) => result.voltage_check = Some(check),
                Err(err) => {
                    warn!(%direction, error = %err, "voltage check failed");
                    record_failure(&mut result, format!("voltage check: {err:#}"));
                }
            }
        }
        if let Some(exporter) = &self.exporter {
            match exporter.export(direction, &network, &dichotomy) {
                Ok(artifacts) => result.artifacts = artifacts,
                Err(err) => {
                    warn!(%direction, error = %err, "export failed");
                    record_failure(&mut result, format!("export: {err:#}"));
                }
            }
        }
        result.dichotomy = Some(dichotomy);
        Ok(result)
    }
}

/// A failed post-search step fails a completed direction. A RAO failure
/// stays the verdict; the error is recorded either way.
fn record_failure(result: &mut SweDichotomyResult, message: String) {
    if result.status == RunStatus::Completed {
        result.status = RunStatus::RunFailed;
    }
    result.error = Some(match result.error.take() {
        Some(previous) => format!("{previous}; {message}"),
        None => message,
    });
}

fn is_interruption(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ShiftError>(),
            Some(ShiftError::Interrupted)
        )
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {text}")
    } else if let Some(text) = payload.downcast_ref::<String>() {
        format!("worker panicked: {text}")
    } else {
        "worker panicked".to_string()
    }
}
