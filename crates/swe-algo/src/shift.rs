//! Network shifting for one bisection step.
//!
//! [`NetworkShifter::shift`] works on a scratch copy of the working variant
//! (`<working>-shift`). Each iteration rescales the zones from a fresh copy
//! of the original state, measures the border exchanges, and corrects the
//! plan by the observed mismatches. The scratch state is copied over the
//! working variant only when both borders are within tolerance; on any
//! error the working variant is left exactly as it was.

use crate::cancel::CancellationToken;
use crate::connectivity::ConnectivityPreparer;
use crate::dispatch::{BorderTargets, DispatchPlan, ShiftDispatcher};
use crate::error::{LimitingZone, ShiftError, ShiftResult};
use crate::exchange::{Border, BorderExchanges, ExchangeMeasurement};
use crate::scaling::ZonalScaling;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use swe_core::{Grid, Network, Zone};
use tracing::{debug, info, warn};

/// Knobs of the shift loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShiftingConfig {
    /// Scale-measure-correct rounds before giving up
    pub max_iterations: usize,
    /// Allowed gap between requested and realized zone delta (MW)
    pub glsk_epsilon_mw: f64,
    pub tolerance_es_fr_mw: f64,
    pub tolerance_es_pt_mw: f64,
    /// Below this output a prepared generator counts as unused (MW)
    pub zero_output_epsilon_mw: f64,
}

impl Default for ShiftingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 4,
            glsk_epsilon_mw: 1.0,
            tolerance_es_fr_mw: 10.0,
            tolerance_es_pt_mw: 10.0,
            zero_output_epsilon_mw: 1e-5,
        }
    }
}

impl ShiftingConfig {
    pub fn tolerance(&self, border: Border) -> f64 {
        let foreign = if border.from == Zone::Es {
            border.to
        } else {
            border.from
        };
        match foreign {
            Zone::Pt => self.tolerance_es_pt_mw,
            _ => self.tolerance_es_fr_mw,
        }
    }
}

/// Requested and realized delta of one zone in the accepted iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneScaling {
    pub zone: Zone,
    pub requested: f64,
    pub realized: f64,
}

/// What a committed shift did.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftOutcome {
    pub step: f64,
    pub iterations: usize,
    pub plan: DispatchPlan,
    pub scalings: Vec<ZoneScaling>,
    pub exchanges: BorderExchanges,
}

/// Applies one bisection step to a network.
pub trait NetworkShifting: Send + Sync {
    fn shift(&self, step: f64, network: &mut Network) -> ShiftResult<ShiftOutcome>;
}

pub struct NetworkShifter {
    dispatcher: Box<dyn ShiftDispatcher>,
    scaling: Arc<dyn ZonalScaling>,
    measurement: Arc<dyn ExchangeMeasurement>,
    config: ShiftingConfig,
    cancel: CancellationToken,
}

impl NetworkShifter {
    pub fn new(
        dispatcher: Box<dyn ShiftDispatcher>,
        scaling: Arc<dyn ZonalScaling>,
        measurement: Arc<dyn ExchangeMeasurement>,
        config: ShiftingConfig,
    ) -> Self {
        Self {
            dispatcher,
            scaling,
            measurement,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ShiftingConfig {
        &self.config
    }

    fn check_cancelled(&self) -> ShiftResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ShiftError::Interrupted);
        }
        Ok(())
    }

    /// Scale every zone of `plan` on `grid`, with isolated units prepared
    /// beforehand and restored afterwards when unused.
    fn scale_zones(&self, grid: &mut Grid, plan: &DispatchPlan) -> ShiftResult<Vec<ZoneScaling>> {
        let generators: Vec<_> = plan
            .iter()
            .flat_map(|(zone, _)| self.scaling.generators(zone))
            .collect();
        let prepared = ConnectivityPreparer::prepare(grid, &generators)?;

        let mut scalings = Vec::new();
        for (zone, requested) in plan.iter() {
            let realized = self.scaling.scale(grid, zone, requested)?;
            scalings.push(ZoneScaling {
                zone,
                requested,
                realized,
            });
        }

        prepared.revert_unused(grid, self.config.zero_output_epsilon_mw)?;
        Ok(scalings)
    }

    fn iterate(
        &self,
        network: &mut Network,
        original: &str,
        scratch: &str,
        step: f64,
        targets: &BorderTargets,
    ) -> ShiftResult<ShiftOutcome> {
        let mut plan = self.dispatcher.dispatch(step);
        let mut last = BorderExchanges::new();

        for iteration in 1..=self.config.max_iterations {
            self.check_cancelled()?;
            let scalings = self.scale_zones(network.grid_mut(), &plan)?;

            let limiting: Vec<LimitingZone> = scalings
                .iter()
                .filter(|s| (s.requested - s.realized).abs() > self.config.glsk_epsilon_mw)
                .map(|s| LimitingZone {
                    zone: s.zone,
                    requested: s.requested,
                    realized: s.realized,
                })
                .collect();
            if !limiting.is_empty() {
                return Err(ShiftError::GlskLimitation { zones: limiting });
            }

            let exchanges = self.measurement.compute_exchanges(network.grid())?;
            let reference = targets.reference.target - exchanges.exchange(targets.reference.border);
            let secondary = targets.secondary.target - exchanges.exchange(targets.secondary.border);
            debug!(
                direction = %self.dispatcher.direction(),
                step,
                iteration,
                reference_mismatch = reference,
                secondary_mismatch = secondary,
                "measured exchanges"
            );

            if reference.abs() <= self.config.tolerance(targets.reference.border)
                && secondary.abs() <= self.config.tolerance(targets.secondary.border)
            {
                return Ok(ShiftOutcome {
                    step,
                    iterations: iteration,
                    plan,
                    scalings,
                    exchanges,
                });
            }

            // restart the next attempt from the untouched state
            network.clone_variant_overwrite(original, scratch)?;
            plan.correct(targets.reference.border, reference);
            plan.correct(targets.secondary.border, secondary);
            last = exchanges;
        }

        Err(ShiftError::BalanceTolerance {
            iterations: self.config.max_iterations,
            exchanges: last,
        })
    }
}

/// First free `<original>-shift[-n]` name, so existing variants are never
/// overwritten by the scratch copy.
fn scratch_variant_id(network: &Network, original: &str) -> String {
    let base = format!("{original}-shift");
    let mut id = base.clone();
    let mut n = 1;
    while network.has_variant(&id) {
        id = format!("{base}-{n}");
        n += 1;
    }
    id
}

impl NetworkShifting for NetworkShifter {
    fn shift(&self, step: f64, network: &mut Network) -> ShiftResult<ShiftOutcome> {
        self.check_cancelled()?;
        let targets = self.dispatcher.targets(step);
        let original = network.working_variant_id().to_string();
        let scratch = scratch_variant_id(network, &original);

        network.clone_variant(&original, &scratch)?;
        network.set_working_variant(&scratch)?;
        let result = self.iterate(network, &original, &scratch, step, &targets);

        network.set_working_variant(&original)?;
        if result.is_ok() {
            network.clone_variant_overwrite(&scratch, &original)?;
        }
        network.remove_variant(&scratch)?;

        match &result {
            Ok(outcome) => info!(
                direction = %self.dispatcher.direction(),
                step,
                iterations = outcome.iterations,
                "shift committed"
            ),
            Err(err) => warn!(
                direction = %self.dispatcher.direction(),
                step,
                error = %err,
                "shift rejected"
            ),
        }
        result
    }
}
