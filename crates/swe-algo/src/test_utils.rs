//! Small FR/ES/PT fixtures shared by unit and integration tests.

use crate::scaling::{ScalableEntry, ScalingPolicy, ZonalScalableCatalog, ZoneScalable};
use swe_core::{Branch, Bus, Gen, Grid, Kilovolts, Load, Megawatts, Zone};

/// Radial three-zone grid: FR1 and PT1 hang on ES1, ES2 sits behind ES1.
///
/// Every zone has one load and generation set so that FR exports `fr_np`
/// and PT exports `pt_np`; the two Spanish units cover the rest equally.
/// Generator limits: FR and ES units 0..5000 MW, PT unit 0..3000 MW.
pub fn swe_grid(fr_np: f64, pt_np: f64) -> Grid {
    let mut grid = Grid::new();
    for (id, zone) in [
        ("ES1", Zone::Es),
        ("ES2", Zone::Es),
        ("FR1", Zone::Fr),
        ("PT1", Zone::Pt),
    ] {
        grid.add_bus(Bus::new(id, zone, Kilovolts(400.0)))
            .expect("fixture bus");
    }

    let es_each = (3000.0 - fr_np - pt_np) / 2.0;
    let units = [
        ("G_FR", "FR1", 2000.0 + fr_np, 5000.0),
        ("G_PT", "PT1", 1000.0 + pt_np, 3000.0),
        ("G_ES1", "ES1", es_each, 5000.0),
        ("G_ES2", "ES2", es_each, 5000.0),
    ];
    for (id, bus, p, pmax) in units {
        grid.add_generator(Gen::new(id, bus).with_p_limits(0.0, pmax).with_target_p(p))
            .expect("fixture generator");
    }

    for (id, bus, p) in [("L_FR", "FR1", 2000.0), ("L_PT", "PT1", 1000.0), ("L_ES", "ES1", 3000.0)] {
        grid.add_load(Load::new(id, bus, Megawatts(p)))
            .expect("fixture load");
    }

    for (id, from, to) in [("ES1-FR1", "ES1", "FR1"), ("ES1-PT1", "ES1", "PT1"), ("ES1-ES2", "ES1", "ES2")] {
        grid.add_line(Branch::new(id, from, to, 0.0, 0.01))
            .expect("fixture line");
    }
    grid
}

/// Merit-order catalog over the generators of [`swe_grid`].
pub fn swe_catalog() -> ZonalScalableCatalog {
    let mut catalog = ZonalScalableCatalog::new();
    catalog.insert(Zone::Fr, ZoneScalable::new(ScalingPolicy::MeritOrder, [ScalableEntry::new("G_FR")]));
    catalog.insert(Zone::Pt, ZoneScalable::new(ScalingPolicy::MeritOrder, [ScalableEntry::new("G_PT")]));
    catalog.insert(
        Zone::Es,
        ZoneScalable::new(
            ScalingPolicy::Proportional,
            [ScalableEntry::new("G_ES1"), ScalableEntry::new("G_ES2")],
        ),
    );
    catalog
}
