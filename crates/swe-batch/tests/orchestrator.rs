//! Parallel direction runs against the fixture grid with scripted drivers.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use swe_algo::test_utils::{swe_catalog, swe_grid};
use swe_algo::{CancellationToken, Direction, NetworkShifting, ShiftError};
use swe_batch::*;
use swe_core::{write_network_json, Grid, Network};
use tempfile::tempdir;

/// Tries steps in increasing order until one fails.
struct ScanDriver {
    steps: Vec<f64>,
}

impl DichotomyDriver for ScanDriver {
    fn run(
        &self,
        _direction: Direction,
        network: &mut Network,
        shifter: &dyn NetworkShifting,
        cancel: &CancellationToken,
    ) -> Result<DichotomyResult> {
        let mut result = DichotomyResult::default();
        for &step in &self.steps {
            if cancel.is_cancelled() {
                result.interrupted = true;
                break;
            }
            let mut trial = network.clone();
            match shifter.shift(step, &mut trial) {
                Ok(_) => result.highest_valid_step = Some(step),
                Err(err) if err.is_step_failure() => {
                    result.lowest_invalid_step = Some(step);
                    result.limiting_cause = Some(err.to_string());
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(result)
    }
}

/// Misbehaves for one direction and scans the others.
struct FaultyDriver {
    faulty: Direction,
    panic: bool,
    inner: ScanDriver,
}

impl DichotomyDriver for FaultyDriver {
    fn run(
        &self,
        direction: Direction,
        network: &mut Network,
        shifter: &dyn NetworkShifting,
        cancel: &CancellationToken,
    ) -> Result<DichotomyResult> {
        if direction == self.faulty {
            if self.panic {
                panic!("corrupted CGM for {direction}");
            }
            return Err(anyhow!("RAO service unreachable"));
        }
        self.inner.run(direction, network, shifter, cancel)
    }
}

/// Cancels the whole run from inside one direction.
struct CancellingDriver;

impl DichotomyDriver for CancellingDriver {
    fn run(
        &self,
        _direction: Direction,
        _network: &mut Network,
        _shifter: &dyn NetworkShifting,
        cancel: &CancellationToken,
    ) -> Result<DichotomyResult> {
        cancel.cancel();
        Err(ShiftError::Interrupted.into())
    }
}

struct RaoFailingDriver;

impl DichotomyDriver for RaoFailingDriver {
    fn run(
        &self,
        _direction: Direction,
        _network: &mut Network,
        _shifter: &dyn NetworkShifting,
        _cancel: &CancellationToken,
    ) -> Result<DichotomyResult> {
        Ok(DichotomyResult {
            rao_failed: true,
            limiting_cause: Some("RAO did not converge".to_string()),
            ..DichotomyResult::default()
        })
    }
}

struct SecureMonitor;

impl VoltageMonitor for SecureMonitor {
    fn check(&self, _direction: Direction, grid: &Grid) -> Result<VoltageCheckResult> {
        assert!(grid.stats().num_buses > 0);
        Ok(VoltageCheckResult {
            secure: true,
            violations: Vec::new(),
        })
    }
}

struct JsonExporter {
    root: std::path::PathBuf,
}

impl ArtifactExporter for JsonExporter {
    fn export(
        &self,
        direction: Direction,
        network: &Network,
        _result: &DichotomyResult,
    ) -> Result<Vec<String>> {
        let path = self.root.join(format!("{direction}.json"));
        write_network_json(network, &path)?;
        Ok(vec![path.display().to_string()])
    }
}

fn scan() -> ScanDriver {
    ScanDriver {
        steps: vec![500.0, 1000.0, 2000.0, 3000.0],
    }
}

fn tasks() -> Vec<DirectionTask> {
    DirectionTask::all_directions(&Network::from_grid("case", swe_grid(0.0, 0.0)))
}

fn orchestrator(config: SweConfig, driver: Arc<dyn DichotomyDriver>) -> SweOrchestrator {
    SweOrchestrator::new(config, driver, Arc::new(swe_catalog()))
}

fn config(threads: usize) -> SweConfig {
    SweConfig {
        threads,
        ..SweConfig::default()
    }
}

#[test]
fn every_direction_finds_its_glsk_limit() {
    let summary = orchestrator(config(2), Arc::new(scan()))
        .run_directions(tasks())
        .unwrap();

    assert_eq!(summary.results.len(), 4);
    assert_eq!(summary.count(RunStatus::Completed), 4);
    let directions: Vec<Direction> = summary.results.iter().map(|r| r.direction).collect();
    assert_eq!(directions, Direction::ALL.to_vec());

    // FR can only go down by its 2000 MW of generation.
    let es_fr = summary.result(Direction::EsFr).unwrap();
    let dichotomy = es_fr.dichotomy.as_ref().unwrap();
    assert_eq!(dichotomy.highest_valid_step, Some(2000.0));
    assert_eq!(dichotomy.lowest_invalid_step, Some(3000.0));
    assert!(dichotomy
        .limiting_cause
        .as_deref()
        .unwrap()
        .contains("GLSK"));

    let es_pt = summary.result(Direction::EsPt).unwrap();
    let dichotomy = es_pt.dichotomy.as_ref().unwrap();
    assert_eq!(dichotomy.highest_valid_step, Some(1000.0));
    assert_eq!(dichotomy.lowest_invalid_step, Some(2000.0));
    assert!(summary.manifest_path.is_none());
}

#[test]
fn driver_error_only_fails_its_direction() {
    let driver = FaultyDriver {
        faulty: Direction::FrEs,
        panic: false,
        inner: scan(),
    };
    let summary = orchestrator(config(4), Arc::new(driver))
        .run_directions(tasks())
        .unwrap();

    let failed = summary.result(Direction::FrEs).unwrap();
    assert!(failed.is_run_failed());
    assert!(failed.error.as_deref().unwrap().contains("RAO service unreachable"));
    assert!(failed.dichotomy.is_none());
    assert_eq!(summary.count(RunStatus::Completed), 3);
}

#[test]
fn worker_panic_only_fails_its_direction() {
    let driver = FaultyDriver {
        faulty: Direction::EsPt,
        panic: true,
        inner: scan(),
    };
    let summary = orchestrator(config(2), Arc::new(driver))
        .run_directions(tasks())
        .unwrap();

    let failed = summary.result(Direction::EsPt).unwrap();
    assert!(failed.is_run_failed());
    assert!(failed.error.as_deref().unwrap().contains("corrupted CGM for ES_PT"));
    assert_eq!(summary.count(RunStatus::Completed), 3);
}

#[test]
fn cancelled_run_reports_every_direction_interrupted() {
    let token = CancellationToken::new();
    token.cancel();
    let summary = orchestrator(config(2), Arc::new(scan()))
        .with_cancellation(token)
        .run_directions(tasks())
        .unwrap();

    assert_eq!(summary.count(RunStatus::Interrupted), 4);
    assert!(summary.results.iter().all(|r| r.dichotomy.is_none()));
}

#[test]
fn interruption_inside_a_direction_is_not_a_failure() {
    let orchestrator = orchestrator(config(1), Arc::new(CancellingDriver));
    let token = orchestrator.cancellation_token();
    let summary = orchestrator.run_directions(tasks()).unwrap();

    assert!(token.is_cancelled());
    assert_eq!(summary.count(RunStatus::Interrupted), 4);
    assert_eq!(summary.count(RunStatus::RunFailed), 0);
}

#[test]
fn rao_failure_is_its_own_status() {
    let summary = orchestrator(config(1), Arc::new(RaoFailingDriver))
        .run_directions(tasks())
        .unwrap();

    assert_eq!(summary.count(RunStatus::RaoFailed), 4);
    let result = summary.result(Direction::PtEs).unwrap();
    assert!(result.is_rao_failed());
    assert!(result.dichotomy.as_ref().unwrap().rao_failed);
}

#[test]
fn outputs_and_manifest_are_written() {
    let dir = tempdir().unwrap();
    let config = SweConfig {
        threads: 2,
        output_root: Some(dir.path().to_path_buf()),
        ..SweConfig::default()
    };
    let summary = orchestrator(config, Arc::new(scan()))
        .with_voltage_monitor(Arc::new(SecureMonitor))
        .with_exporter(Arc::new(JsonExporter {
            root: dir.path().to_path_buf(),
        }))
        .run_directions(tasks())
        .unwrap();

    for result in &summary.results {
        assert_eq!(result.status, RunStatus::Completed);
        assert!(result.voltage_check.as_ref().unwrap().secure);
        assert_eq!(result.artifacts.len(), 1);
        assert!(std::path::Path::new(&result.artifacts[0]).exists());
    }
    assert!(dir.path().join("ES_FR.json").exists());

    let manifest_path = summary.manifest_path.unwrap();
    assert_eq!(manifest_path, dir.path().join("swe_manifest.json"));
    let manifest = load_swe_manifest(&manifest_path).unwrap();
    assert_eq!(manifest.num_directions, 4);
    assert_eq!(manifest.completed, 4);
    assert_eq!(manifest.run_failed, 0);
    assert_eq!(manifest.directions, summary.results);
}

#[test]
fn export_failure_keeps_rao_failed_status() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();
    let summary = orchestrator(config(2), Arc::new(RaoFailingDriver))
        .with_exporter(Arc::new(JsonExporter {
            root: blocker.join("out"),
        }))
        .run_directions(tasks())
        .unwrap();

    assert_eq!(summary.count(RunStatus::RaoFailed), 4);
    for result in &summary.results {
        assert!(result.error.as_deref().unwrap().starts_with("export:"));
        assert!(result.artifacts.is_empty());
    }
}

#[test]
fn export_failure_fails_a_completed_direction() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();
    let summary = orchestrator(config(2), Arc::new(scan()))
        .with_exporter(Arc::new(JsonExporter {
            root: blocker.join("out"),
        }))
        .run_directions(tasks())
        .unwrap();

    assert_eq!(summary.count(RunStatus::RunFailed), 4);
    let es_fr = summary.result(Direction::EsFr).unwrap();
    assert!(es_fr.error.as_deref().unwrap().starts_with("export:"));
    assert!(es_fr.dichotomy.is_some());
}

#[test]
fn unwritable_manifest_keeps_direction_results() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "").unwrap();
    let config = SweConfig {
        threads: 2,
        output_root: Some(blocker.join("run")),
        ..SweConfig::default()
    };
    let summary = orchestrator(config, Arc::new(scan()))
        .run_directions(tasks())
        .unwrap();

    assert_eq!(summary.results.len(), 4);
    assert_eq!(summary.count(RunStatus::Completed), 4);
    assert!(summary.manifest_path.is_none());
}
